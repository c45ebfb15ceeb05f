/// Binding-pattern AST.
/// Patterns are built by an external parser and are immutable once
/// constructed; `validate_pattern` rejects malformed shapes before any
/// evaluation takes place.
use crate::engine::{Completion, Engine, EnvRef};
use crate::types::JsValue;
use std::fmt;
use std::rc::Rc;

#[derive(Clone, Debug)]
pub enum Pattern {
    Identifier(String),
    /// `None` entries are elisions (holes).
    Array(Vec<Option<ArrayPatternElement>>),
    Object(Vec<ObjectPatternProperty>),
    /// Pattern with a default initializer, evaluated only against undefined.
    Assign(Box<Pattern>, Initializer),
    /// Rest target; valid only as the last element of a pattern or
    /// parameter list.
    Rest(Box<Pattern>),
}

#[derive(Clone, Debug)]
pub enum ArrayPatternElement {
    Pattern(Pattern),
    Rest(Pattern),
}

#[derive(Clone, Debug)]
pub enum ObjectPatternProperty {
    Shorthand(String),
    KeyValue(PropertyKey, Pattern),
    Rest(Pattern),
}

#[derive(Clone, Debug)]
pub enum PropertyKey {
    Identifier(String),
    String(String),
    Number(f64),
    Computed(Initializer),
}

/// An opaque evaluable supplied by the parser: a default initializer or a
/// computed property key. Either a literal value or a native thunk standing
/// in for user-level code.
#[derive(Clone)]
pub struct Initializer {
    kind: Rc<InitializerKind>,
}

enum InitializerKind {
    Literal(JsValue),
    Thunk(Box<dyn Fn(&mut Engine, &EnvRef) -> Completion>),
}

impl Initializer {
    pub fn literal(value: JsValue) -> Self {
        Initializer {
            kind: Rc::new(InitializerKind::Literal(value)),
        }
    }

    pub fn thunk(f: impl Fn(&mut Engine, &EnvRef) -> Completion + 'static) -> Self {
        Initializer {
            kind: Rc::new(InitializerKind::Thunk(Box::new(f))),
        }
    }

    pub fn evaluate(&self, engine: &mut Engine, env: &EnvRef) -> Completion {
        match &*self.kind {
            InitializerKind::Literal(v) => Completion::Normal(v.clone()),
            InitializerKind::Thunk(f) => f(engine, env),
        }
    }
}

impl fmt::Debug for Initializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.kind {
            InitializerKind::Literal(v) => write!(f, "Initializer::Literal({v:?})"),
            InitializerKind::Thunk(_) => write!(f, "Initializer::Thunk"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatternError {
    /// A rest element appears anywhere but the final position.
    RestElementNotLast,
    /// A rest target carries a default initializer.
    RestElementWithDefault,
    InvalidBindingIdentifier(String),
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::RestElementNotLast => {
                write!(f, "rest element must be last element")
            }
            PatternError::RestElementWithDefault => {
                write!(f, "rest element may not have a default initializer")
            }
            PatternError::InvalidBindingIdentifier(name) => {
                write!(f, "invalid binding identifier `{name}`")
            }
        }
    }
}

impl std::error::Error for PatternError {}

// §12.7 IdentifierName: XID plus `$` and `_`.
fn is_binding_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '$' || c == '_' || unicode_ident::is_xid_start(c) => {}
        _ => return false,
    }
    chars.all(|c| c == '$' || unicode_ident::is_xid_continue(c))
}

/// Shape validation, performed once per pattern before evaluation.
pub fn validate_pattern(pat: &Pattern) -> Result<(), PatternError> {
    match pat {
        Pattern::Identifier(name) => {
            if is_binding_identifier(name) {
                Ok(())
            } else {
                Err(PatternError::InvalidBindingIdentifier(name.clone()))
            }
        }
        Pattern::Assign(inner, _) => {
            if matches!(**inner, Pattern::Rest(_)) {
                return Err(PatternError::RestElementWithDefault);
            }
            validate_pattern(inner)
        }
        Pattern::Rest(inner) => validate_pattern(inner),
        Pattern::Array(elements) => {
            let last = elements.len().saturating_sub(1);
            for (i, elem) in elements.iter().enumerate() {
                match elem {
                    None => {}
                    Some(ArrayPatternElement::Pattern(p)) => {
                        // Rest in element position must use the dedicated
                        // element form; a wrapped rest would bind a single
                        // value instead of draining.
                        if matches!(p, Pattern::Rest(_)) {
                            return Err(PatternError::RestElementNotLast);
                        }
                        validate_pattern(p)?;
                    }
                    Some(ArrayPatternElement::Rest(p)) => {
                        if i != last {
                            return Err(PatternError::RestElementNotLast);
                        }
                        if matches!(p, Pattern::Assign(..)) {
                            return Err(PatternError::RestElementWithDefault);
                        }
                        validate_pattern(p)?;
                    }
                }
            }
            Ok(())
        }
        Pattern::Object(props) => {
            let last = props.len().saturating_sub(1);
            for (i, prop) in props.iter().enumerate() {
                match prop {
                    ObjectPatternProperty::Shorthand(name) => {
                        if !is_binding_identifier(name) {
                            return Err(PatternError::InvalidBindingIdentifier(name.clone()));
                        }
                    }
                    ObjectPatternProperty::KeyValue(_, p) => validate_pattern(p)?,
                    ObjectPatternProperty::Rest(p) => {
                        if i != last {
                            return Err(PatternError::RestElementNotLast);
                        }
                        validate_pattern(p)?;
                    }
                }
            }
            Ok(())
        }
    }
}

/// Validation for a formal parameter list: each parameter is a pattern, and
/// only the final parameter may be a rest target.
pub fn validate_params(params: &[Pattern]) -> Result<(), PatternError> {
    let last = params.len().saturating_sub(1);
    for (i, param) in params.iter().enumerate() {
        if matches!(param, Pattern::Rest(_)) && i != last {
            return Err(PatternError::RestElementNotLast);
        }
        validate_pattern(param)?;
    }
    Ok(())
}
