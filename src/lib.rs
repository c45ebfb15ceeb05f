//! Destructuring-binding and iterator-protocol evaluation core of a
//! JavaScript-like engine: completion records, an object arena, the
//! iterator protocol (GetIterator / IteratorStep / IteratorClose), binding
//! patterns, parameter-list binding, generators as explicit state machines,
//! and token-keyed private class members.

pub mod ast;
pub mod conformance;
pub mod engine;
pub mod types;

pub use engine::{Completion, Engine};
pub use types::JsValue;
