use super::*;
use crate::types::JsValue;
use std::cell::RefCell;
use std::rc::Rc;

/// Property key of the well-known iteration capability. Symbol-keyed
/// properties use stable string keys in the arena, so hardcoded lookups
/// stay cheap and observable.
pub const SYMBOL_ITERATOR: &str = "Symbol(Symbol.iterator)";

impl Engine {
    pub(crate) fn setup_intrinsics(&mut self) {
        let object_proto = Rc::new(RefCell::new(JsObjectData::new()));
        self.allocate_object_slot(object_proto.clone());
        self.object_prototype = Some(object_proto);

        self.setup_array_iterator_prototype();
        self.setup_array_prototype();
        self.setup_generator_prototype();
    }

    fn setup_array_prototype(&mut self) {
        let proto = self.create_object();
        proto.borrow_mut().class_name = "Array".to_string();

        // %Array.prototype% [ @@iterator ]
        let iter_fn = self.create_function(JsFunction::native(
            "[Symbol.iterator]".to_string(),
            0,
            |engine, this, _args| {
                let JsValue::Object(o) = this else {
                    return Completion::Throw(
                        engine.create_type_error("Symbol.iterator called on a non-object"),
                    );
                };
                let iter = engine.create_object();
                iter.borrow_mut().class_name = "Array Iterator".to_string();
                iter.borrow_mut().prototype = engine.array_iterator_prototype.clone();
                iter.borrow_mut().iterator_state = Some(IteratorState::ArrayIterator {
                    array_id: o.id,
                    index: 0,
                    done: false,
                });
                Completion::Normal(Engine::object_value(&iter))
            },
        ));
        proto
            .borrow_mut()
            .insert_builtin(SYMBOL_ITERATOR.to_string(), iter_fn);
        self.array_prototype = Some(proto);
    }

    fn setup_array_iterator_prototype(&mut self) {
        let proto = self.create_object();
        proto.borrow_mut().class_name = "Array Iterator".to_string();

        let next_fn = self.create_function(JsFunction::native(
            "next".to_string(),
            0,
            |engine, this, _args| {
                let JsValue::Object(o) = this else {
                    return Completion::Throw(
                        engine.create_type_error("next called on a non-object"),
                    );
                };
                let Some(obj) = engine.get_object(o.id) else {
                    return Completion::Throw(
                        engine.create_type_error("next called on a non-iterator"),
                    );
                };
                let state = obj.borrow_mut().iterator_state.take();
                match state {
                    Some(IteratorState::ArrayIterator {
                        array_id,
                        mut index,
                        mut done,
                    }) => {
                        let current = if done {
                            None
                        } else {
                            engine.get_object(array_id).and_then(|arr| {
                                arr.borrow()
                                    .array_elements
                                    .as_ref()
                                    .and_then(|e| e.get(index).cloned())
                            })
                        };
                        let result = match current {
                            Some(v) => {
                                index += 1;
                                engine.create_iter_result(v, false)
                            }
                            None => {
                                done = true;
                                engine.create_iter_result(JsValue::Undefined, true)
                            }
                        };
                        obj.borrow_mut().iterator_state = Some(IteratorState::ArrayIterator {
                            array_id,
                            index,
                            done,
                        });
                        Completion::Normal(result)
                    }
                    other => {
                        obj.borrow_mut().iterator_state = other;
                        Completion::Throw(
                            engine.create_type_error("next called on a non-iterator"),
                        )
                    }
                }
            },
        ));
        proto.borrow_mut().insert_builtin("next".to_string(), next_fn);
        self.array_iterator_prototype = Some(proto);
    }

    fn setup_generator_prototype(&mut self) {
        let proto = self.create_object();
        proto.borrow_mut().class_name = "Generator".to_string();

        let next_fn = self.create_function(JsFunction::native(
            "next".to_string(),
            1,
            |engine, this, args| {
                let sent = args.first().cloned().unwrap_or(JsValue::Undefined);
                engine.generator_next(this, sent)
            },
        ));
        proto.borrow_mut().insert_builtin("next".to_string(), next_fn);

        let return_fn = self.create_function(JsFunction::native(
            "return".to_string(),
            1,
            |engine, this, args| {
                let value = args.first().cloned().unwrap_or(JsValue::Undefined);
                engine.generator_return(this, value)
            },
        ));
        proto
            .borrow_mut()
            .insert_builtin("return".to_string(), return_fn);

        // Generators are themselves iterable.
        let self_iter = self.create_function(JsFunction::native(
            "[Symbol.iterator]".to_string(),
            0,
            |_engine, this, _args| Completion::Normal(this.clone()),
        ));
        proto
            .borrow_mut()
            .insert_builtin(SYMBOL_ITERATOR.to_string(), self_iter);
        self.generator_prototype = Some(proto);
    }

    // §7.4.12 CreateIteratorResultObject
    pub fn create_iter_result(&mut self, value: JsValue, done: bool) -> JsValue {
        let obj = self.create_object();
        obj.borrow_mut().insert_value("value".to_string(), value);
        obj.borrow_mut()
            .insert_value("done".to_string(), JsValue::Boolean(done));
        Engine::object_value(&obj)
    }

    pub fn create_error(&mut self, name: &str, msg: &str) -> JsValue {
        let obj = self.create_object();
        {
            let mut o = obj.borrow_mut();
            o.class_name = name.to_string();
            o.insert_builtin("name".to_string(), JsValue::string(name));
            o.insert_builtin("message".to_string(), JsValue::string(msg));
        }
        Engine::object_value(&obj)
    }

    pub fn create_type_error(&mut self, msg: &str) -> JsValue {
        self.create_error("TypeError", msg)
    }

    /// Malformed `next` result, non-object iterator, or a broken `return`
    /// capability.
    pub fn create_iterator_protocol_error(&mut self, msg: &str) -> JsValue {
        self.create_error("IteratorProtocolError", msg)
    }

    pub fn create_private_name_error(&mut self, msg: &str) -> JsValue {
        self.create_error("PrivateNameAccessError", msg)
    }

    /// `name` property of a thrown error object, for callers classifying
    /// failures.
    pub fn error_name(&self, val: &JsValue) -> Option<String> {
        if let JsValue::Object(o) = val
            && let Some(obj) = self.get_object(o.id)
            && let Some(JsValue::String(name)) = obj.borrow().get_property_value("name")
        {
            return Some(name);
        }
        None
    }
}
