use super::*;
use crate::types::{JsValue, to_boolean};

/// Iterator Record (§7.4.1): the iterator object, its `next` capability read
/// once at open time and cached for the record's lifetime, and the `done`
/// flag. Once `done` is true no further `next` invocations occur through the
/// record, and IteratorClose becomes a no-op.
///
/// A record is exclusively owned by one evaluation and never escapes it.
pub struct IteratorRecord {
    pub iterator: JsValue,
    next_method: JsValue,
    pub done: bool,
}

impl Engine {
    // §7.4.3 GetIterator: the @@iterator capability is read exactly once and
    // invoked with no arguments; the result must be an object.
    pub fn get_iterator(&mut self, value: &JsValue) -> Result<IteratorRecord, JsValue> {
        let JsValue::Object(o) = value else {
            return Err(self.create_type_error("is not iterable"));
        };
        let method = match self.get_object_property(o.id, SYMBOL_ITERATOR, value) {
            Completion::Normal(v) => v,
            Completion::Throw(e) => return Err(e),
        };
        if method.is_nullish() {
            return Err(self.create_type_error("is not iterable"));
        }
        let iterator = match self.call_function(&method, value, &[]) {
            Completion::Normal(v) => v,
            Completion::Throw(e) => return Err(e),
        };
        if !iterator.is_object() {
            return Err(
                self.create_iterator_protocol_error(
                    "result of the Symbol.iterator method is not an object",
                ),
            );
        }
        self.iterator_record_from(iterator)
    }

    /// Builds a record directly over an iterator object, caching `next`.
    /// Used by GetIterator and by parameter binding, whose argument-list
    /// iterators are obtained without a @@iterator lookup.
    pub(crate) fn iterator_record_from(
        &mut self,
        iterator: JsValue,
    ) -> Result<IteratorRecord, JsValue> {
        let next_method = match self.get_property(&iterator, "next") {
            Completion::Normal(v) => v,
            Completion::Throw(e) => return Err(e),
        };
        Ok(IteratorRecord {
            iterator,
            next_method,
            done: false,
        })
    }

    // §7.4.8 IteratorStep (with IteratorComplete/IteratorValue folded in):
    // one invocation of the cached `next` with no arguments, then one read
    // of `done`, then only when not exhausted one read of `value`. A
    // non-callable `next` is a protocol violation. Any failure marks the
    // record done, so the close that follows an abrupt step is a no-op.
    pub fn iterator_step(
        &mut self,
        record: &mut IteratorRecord,
    ) -> Result<Option<JsValue>, JsValue> {
        if record.done {
            return Ok(None);
        }
        let next_method = record.next_method.clone();
        if !self.is_callable(&next_method) {
            record.done = true;
            return Err(self.create_iterator_protocol_error("iterator next is not callable"));
        }
        let result = match self.call_function(&next_method, &record.iterator, &[]) {
            Completion::Normal(v) => v,
            Completion::Throw(e) => {
                record.done = true;
                return Err(e);
            }
        };
        let JsValue::Object(res) = result else {
            record.done = true;
            return Err(self.create_iterator_protocol_error("iterator result is not an object"));
        };
        let result_val = JsValue::Object(res);
        let done = match self.get_object_property(res.id, "done", &result_val) {
            Completion::Normal(v) => to_boolean(&v),
            Completion::Throw(e) => {
                record.done = true;
                return Err(e);
            }
        };
        if done {
            record.done = true;
            return Ok(None);
        }
        match self.get_object_property(res.id, "value", &result_val) {
            Completion::Normal(v) => Ok(Some(v)),
            Completion::Throw(e) => {
                record.done = true;
                Err(e)
            }
        }
    }

    // §7.4.11 IteratorClose. Skipped entirely when the record is already
    // done; otherwise runs at most once (closing marks the record done).
    // The `return` capability is read once; absent or nullish `return` is a
    // no-op. An abrupt incoming completion always wins over anything
    // `return` does; under a normal completion a throwing `return` (or a
    // non-object result from it) becomes the outcome.
    pub fn iterator_close(
        &mut self,
        record: &mut IteratorRecord,
        completion: Completion,
    ) -> Completion {
        if record.done {
            return completion;
        }
        record.done = true;
        let JsValue::Object(o) = record.iterator else {
            return completion;
        };
        let iterator_val = record.iterator.clone();
        let return_method = match self.get_object_property(o.id, "return", &iterator_val) {
            Completion::Normal(v) => v,
            Completion::Throw(e) => {
                return match completion {
                    abrupt @ Completion::Throw(_) => abrupt,
                    Completion::Normal(_) => Completion::Throw(e),
                };
            }
        };
        if return_method.is_nullish() {
            return completion;
        }
        let inner = self.call_function(&return_method, &iterator_val, &[]);
        match completion {
            abrupt @ Completion::Throw(_) => abrupt,
            Completion::Normal(value) => match inner {
                Completion::Throw(e) => Completion::Throw(e),
                Completion::Normal(r) if !r.is_object() => Completion::Throw(
                    self.create_iterator_protocol_error("iterator return result is not an object"),
                ),
                Completion::Normal(_) => Completion::Normal(value),
            },
        }
    }
}
