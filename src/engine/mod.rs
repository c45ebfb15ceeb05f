use crate::ast::Pattern;
use crate::types::{JsObject, JsValue};
use std::cell::RefCell;
use std::rc::Rc;

mod types;
pub use types::*;

mod builtins;
pub use builtins::SYMBOL_ITERATOR;
mod binding;
mod class;
pub use class::{ClassSpec, PrivateName};
mod generator;
pub use generator::GeneratorStep;
mod iterator;
pub use iterator::IteratorRecord;

/// Evaluation engine for the binding core: an object arena, a global
/// environment, and the intrinsic prototypes the iterator protocol needs.
pub struct Engine {
    global_env: EnvRef,
    objects: Vec<Option<Rc<RefCell<JsObjectData>>>>,
    object_prototype: Option<Rc<RefCell<JsObjectData>>>,
    array_prototype: Option<Rc<RefCell<JsObjectData>>>,
    array_iterator_prototype: Option<Rc<RefCell<JsObjectData>>>,
    generator_prototype: Option<Rc<RefCell<JsObjectData>>>,
    next_private_id: u64,
}

impl Engine {
    pub fn new() -> Self {
        let mut engine = Self {
            global_env: Environment::new(None),
            objects: Vec::new(),
            object_prototype: None,
            array_prototype: None,
            array_iterator_prototype: None,
            generator_prototype: None,
            next_private_id: 1,
        };
        engine.setup_intrinsics();
        engine
    }

    pub fn global_env(&self) -> EnvRef {
        self.global_env.clone()
    }

    pub(crate) fn allocate_object_slot(&mut self, obj: Rc<RefCell<JsObjectData>>) -> u64 {
        let id = self.objects.len() as u64;
        obj.borrow_mut().id = Some(id);
        self.objects.push(Some(obj));
        id
    }

    pub(crate) fn get_object(&self, id: u64) -> Option<Rc<RefCell<JsObjectData>>> {
        self.objects.get(id as usize).and_then(|slot| slot.clone())
    }

    pub fn create_object(&mut self) -> Rc<RefCell<JsObjectData>> {
        let mut data = JsObjectData::new();
        data.prototype = self.object_prototype.clone();
        let obj = Rc::new(RefCell::new(data));
        self.allocate_object_slot(obj.clone());
        obj
    }

    pub(crate) fn object_value(obj: &Rc<RefCell<JsObjectData>>) -> JsValue {
        // Slot ids are assigned at allocation; every object reachable here
        // went through allocate_object_slot.
        let id = obj.borrow().id.unwrap_or(u64::MAX);
        JsValue::Object(JsObject { id })
    }

    pub fn create_function(&mut self, func: JsFunction) -> JsValue {
        let (fn_name, fn_length) = match &func {
            JsFunction::Native(name, arity, _) => (name.clone(), *arity),
            JsFunction::Declared { name, params, .. } => {
                let len = params
                    .iter()
                    .filter(|p| !matches!(p, Pattern::Rest(_)))
                    .count();
                (name.clone(), len)
            }
        };
        let mut data = JsObjectData::new();
        data.prototype = self.object_prototype.clone();
        data.callable = Some(func);
        data.class_name = "Function".to_string();
        data.insert_property(
            "length".to_string(),
            PropertyDescriptor::data(JsValue::Number(fn_length as f64), false, false, true),
        );
        data.insert_property(
            "name".to_string(),
            PropertyDescriptor::data(JsValue::String(fn_name), false, false, true),
        );
        let obj = Rc::new(RefCell::new(data));
        self.allocate_object_slot(obj.clone());
        Self::object_value(&obj)
    }

    /// Fresh array object over `values`; never aliases its input.
    pub fn create_array(&mut self, values: Vec<JsValue>) -> JsValue {
        let mut data = JsObjectData::new();
        data.prototype = self.array_prototype.clone();
        data.class_name = "Array".to_string();
        data.array_elements = Some(values);
        let obj = Rc::new(RefCell::new(data));
        self.allocate_object_slot(obj.clone());
        Self::object_value(&obj)
    }

    pub fn is_callable(&self, val: &JsValue) -> bool {
        if let JsValue::Object(o) = val
            && let Some(obj) = self.get_object(o.id)
        {
            return obj.borrow().callable.is_some();
        }
        false
    }

    /// Observable property read: accessor getters run with `this_val`.
    pub fn get_object_property(&mut self, obj_id: u64, key: &str, this_val: &JsValue) -> Completion {
        let desc = match self.get_object(obj_id) {
            Some(obj) => obj.borrow().get_property_descriptor(key),
            None => None,
        };
        match desc {
            Some(d) => {
                if let Some(getter) = d.get {
                    self.call_function(&getter, this_val, &[])
                } else {
                    Completion::Normal(d.value.unwrap_or(JsValue::Undefined))
                }
            }
            None => Completion::Normal(JsValue::Undefined),
        }
    }

    /// GetV for the value kinds this core handles: objects only.
    pub fn get_property(&mut self, target: &JsValue, key: &str) -> Completion {
        match target {
            JsValue::Object(o) => self.get_object_property(o.id, key, target),
            _ => Completion::Normal(JsValue::Undefined),
        }
    }

    pub fn set_property(&mut self, target: &JsValue, key: &str, value: JsValue) {
        if let JsValue::Object(o) = target
            && let Some(obj) = self.get_object(o.id)
        {
            obj.borrow_mut().insert_value(key.to_string(), value);
        }
    }

    pub fn call_function(
        &mut self,
        func_val: &JsValue,
        this_val: &JsValue,
        args: &[JsValue],
    ) -> Completion {
        let callable = if let JsValue::Object(o) = func_val {
            self.get_object(o.id).and_then(|obj| obj.borrow().callable.clone())
        } else {
            None
        };
        let Some(func) = callable else {
            return Completion::Throw(self.create_type_error("is not a function"));
        };
        match func {
            JsFunction::Native(_, _, f) => f(self, this_val, args),
            JsFunction::Declared {
                params,
                body,
                closure,
                is_generator,
                ..
            } => {
                // FunctionDeclarationInstantiation: formals are bound by
                // iterator binding over a list iterator of the arguments.
                let func_env = Environment::new(Some(closure));
                if let Err(e) = self.bind_parameters(&params, args, &func_env) {
                    return Completion::Throw(e);
                }
                if is_generator {
                    let generator = self.create_body_generator(body, func_env, this_val.clone());
                    Completion::Normal(generator)
                } else {
                    body(self, &func_env, this_val)
                }
            }
        }
    }

    /// GetV + Call in one step.
    pub fn invoke(&mut self, target: &JsValue, key: &str, args: &[JsValue]) -> Completion {
        let method = match self.get_property(target, key) {
            Completion::Normal(v) => v,
            abrupt => return abrupt,
        };
        self.call_function(&method, target, args)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
