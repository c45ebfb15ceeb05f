use super::*;
use crate::types::JsValue;

/// Generators are explicit state machines rather than stack coroutines: a
/// machine plus a suspension status, resumed with a sent value. The binding
/// evaluator's synchronous iterator protocol composes with them through the
/// ordinary `next`/`return` surface on the generator prototype.
#[derive(Debug)]
pub(crate) struct GeneratorState {
    pub(crate) machine: GeneratorMachine,
    pub(crate) status: GeneratorStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GeneratorStatus {
    SuspendedStart,
    SuspendedYield,
    Completed,
}

/// One resumption's outcome.
#[derive(Debug)]
pub enum GeneratorStep {
    Yield(JsValue),
    Done(JsValue),
}

pub(crate) enum GeneratorMachine {
    /// Yields a fixed list of values in order. Also serves as the
    /// argument-list iterator for parameter binding.
    Values { items: Vec<JsValue>, index: usize },
    /// Runs a declared native body once to completion on first resume.
    Body {
        body: BodyFn,
        env: EnvRef,
        this: JsValue,
    },
}

impl std::fmt::Debug for GeneratorMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneratorMachine::Values { items, index } => {
                write!(f, "GeneratorMachine::Values({}/{})", index, items.len())
            }
            GeneratorMachine::Body { .. } => write!(f, "GeneratorMachine::Body"),
        }
    }
}

impl GeneratorMachine {
    fn resume(&mut self, engine: &mut Engine, _sent: JsValue) -> Result<GeneratorStep, JsValue> {
        match self {
            GeneratorMachine::Values { items, index } => {
                if *index < items.len() {
                    let v = items[*index].clone();
                    *index += 1;
                    Ok(GeneratorStep::Yield(v))
                } else {
                    Ok(GeneratorStep::Done(JsValue::Undefined))
                }
            }
            GeneratorMachine::Body { body, env, this } => {
                let (body, env, this) = (body.clone(), env.clone(), this.clone());
                match body(engine, &env, &this) {
                    Completion::Normal(v) => Ok(GeneratorStep::Done(v)),
                    Completion::Throw(e) => Err(e),
                }
            }
        }
    }
}

impl Engine {
    fn create_generator(&mut self, machine: GeneratorMachine) -> JsValue {
        let obj = self.create_object();
        obj.borrow_mut().class_name = "Generator".to_string();
        obj.borrow_mut().prototype = self.generator_prototype.clone();
        obj.borrow_mut().iterator_state = Some(IteratorState::Generator(GeneratorState {
            machine,
            status: GeneratorStatus::SuspendedStart,
        }));
        Engine::object_value(&obj)
    }

    /// CreateListIterator: yields `values` in order, no `return`
    /// observable beyond the generator surface, fresh per call.
    pub fn create_list_iterator(&mut self, values: Vec<JsValue>) -> JsValue {
        self.create_generator(GeneratorMachine::Values {
            items: values,
            index: 0,
        })
    }

    pub(crate) fn create_body_generator(
        &mut self,
        body: BodyFn,
        env: EnvRef,
        this: JsValue,
    ) -> JsValue {
        self.create_generator(GeneratorMachine::Body { body, env, this })
    }

    pub(crate) fn generator_next(&mut self, this: &JsValue, sent: JsValue) -> Completion {
        let Some(obj) = self.generator_object(this) else {
            return Completion::Throw(self.create_type_error("next called on a non-generator"));
        };
        // The state is taken out for the duration of the resume; a nested
        // resume of the same generator finds it missing and errors, which
        // enforces that step N+1 is never requested before step N finishes.
        let state = obj.borrow_mut().iterator_state.take();
        let mut state = match state {
            Some(IteratorState::Generator(g)) => g,
            Some(other) => {
                obj.borrow_mut().iterator_state = Some(other);
                return Completion::Throw(
                    self.create_type_error("next called on a non-generator"),
                );
            }
            None => {
                return Completion::Throw(
                    self.create_type_error("generator is already running"),
                );
            }
        };
        if state.status == GeneratorStatus::Completed {
            obj.borrow_mut().iterator_state = Some(IteratorState::Generator(state));
            let result = self.create_iter_result(JsValue::Undefined, true);
            return Completion::Normal(result);
        }
        let outcome = state.machine.resume(self, sent);
        let completion = match outcome {
            Ok(GeneratorStep::Yield(v)) => {
                state.status = GeneratorStatus::SuspendedYield;
                let result = self.create_iter_result(v, false);
                Completion::Normal(result)
            }
            Ok(GeneratorStep::Done(v)) => {
                state.status = GeneratorStatus::Completed;
                let result = self.create_iter_result(v, true);
                Completion::Normal(result)
            }
            Err(e) => {
                state.status = GeneratorStatus::Completed;
                Completion::Throw(e)
            }
        };
        obj.borrow_mut().iterator_state = Some(IteratorState::Generator(state));
        completion
    }

    pub(crate) fn generator_return(&mut self, this: &JsValue, value: JsValue) -> Completion {
        let Some(obj) = self.generator_object(this) else {
            return Completion::Throw(self.create_type_error("return called on a non-generator"));
        };
        let state = obj.borrow_mut().iterator_state.take();
        match state {
            Some(IteratorState::Generator(mut g)) => {
                g.status = GeneratorStatus::Completed;
                obj.borrow_mut().iterator_state = Some(IteratorState::Generator(g));
                let result = self.create_iter_result(value, true);
                Completion::Normal(result)
            }
            other => {
                obj.borrow_mut().iterator_state = other;
                Completion::Throw(self.create_type_error("return called on a non-generator"))
            }
        }
    }

    fn generator_object(&self, this: &JsValue) -> Option<std::rc::Rc<std::cell::RefCell<JsObjectData>>> {
        if let JsValue::Object(o) = this {
            self.get_object(o.id)
        } else {
            None
        }
    }
}
