use crate::ast::{Initializer, Pattern};
use crate::types::JsValue;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

/// Completion record threaded through every evaluation step. An abrupt
/// completion carries the thrown value unchanged; control-flow completions
/// (return/break/continue) belong to the statement layer, which is outside
/// this core.
#[derive(Debug)]
pub enum Completion {
    Normal(JsValue),
    Throw(JsValue),
}

impl Completion {
    pub fn is_abrupt(&self) -> bool {
        !matches!(self, Completion::Normal(_))
    }
}

pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug)]
pub struct Environment {
    pub(crate) bindings: FxHashMap<String, Binding>,
    pub(crate) parent: Option<EnvRef>,
}

#[derive(Debug, Clone)]
pub(crate) struct Binding {
    pub(crate) value: JsValue,
    pub(crate) kind: BindingKind,
    pub(crate) initialized: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Var,
    Let,
    Const,
}

impl Environment {
    pub fn new(parent: Option<EnvRef>) -> EnvRef {
        Rc::new(RefCell::new(Environment {
            bindings: FxHashMap::default(),
            parent,
        }))
    }

    pub fn declare(&mut self, name: &str, kind: BindingKind) {
        self.bindings.insert(
            name.to_string(),
            Binding {
                value: JsValue::Undefined,
                kind,
                initialized: kind == BindingKind::Var,
            },
        );
    }

    pub fn set(&mut self, name: &str, value: JsValue) -> Result<(), JsValue> {
        if let Some(binding) = self.bindings.get_mut(name) {
            if binding.kind == BindingKind::Const && binding.initialized {
                return Err(JsValue::string("Assignment to constant variable."));
            }
            binding.value = value;
            binding.initialized = true;
            Ok(())
        } else if let Some(parent) = &self.parent {
            parent.borrow_mut().set(name, value)
        } else {
            self.bindings.insert(
                name.to_string(),
                Binding {
                    value,
                    kind: BindingKind::Var,
                    initialized: true,
                },
            );
            Ok(())
        }
    }

    /// `None` for unbound names and for let/const bindings still in their
    /// temporal dead zone.
    pub fn get(&self, name: &str) -> Option<JsValue> {
        if let Some(binding) = self.bindings.get(name) {
            if !binding.initialized {
                return None;
            }
            Some(binding.value.clone())
        } else if let Some(parent) = &self.parent {
            parent.borrow().get(name)
        } else {
            None
        }
    }

    pub fn has(&self, name: &str) -> bool {
        if self.bindings.contains_key(name) {
            true
        } else if let Some(parent) = &self.parent {
            parent.borrow().has(name)
        } else {
            false
        }
    }
}

pub type NativeFn = Rc<dyn Fn(&mut super::Engine, &JsValue, &[JsValue]) -> Completion>;
pub type BodyFn = Rc<dyn Fn(&mut super::Engine, &EnvRef, &JsValue) -> Completion>;

/// Callable payload of a function object. `Native` is host code; `Declared`
/// carries formal parameter patterns bound through the iterator machinery at
/// call time, with a native body standing in for parsed statements.
pub enum JsFunction {
    Native(String, usize, NativeFn),
    Declared {
        name: String,
        params: Vec<Pattern>,
        body: BodyFn,
        closure: EnvRef,
        is_generator: bool,
    },
}

impl JsFunction {
    pub fn native(
        name: String,
        arity: usize,
        f: impl Fn(&mut super::Engine, &JsValue, &[JsValue]) -> Completion + 'static,
    ) -> Self {
        JsFunction::Native(name, arity, Rc::new(f))
    }

    pub fn declared(
        name: String,
        params: Vec<Pattern>,
        body: impl Fn(&mut super::Engine, &EnvRef, &JsValue) -> Completion + 'static,
        closure: EnvRef,
        is_generator: bool,
    ) -> Self {
        JsFunction::Declared {
            name,
            params,
            body: Rc::new(body),
            closure,
            is_generator,
        }
    }
}

impl Clone for JsFunction {
    fn clone(&self) -> Self {
        match self {
            JsFunction::Native(name, arity, f) => {
                JsFunction::Native(name.clone(), *arity, f.clone())
            }
            JsFunction::Declared {
                name,
                params,
                body,
                closure,
                is_generator,
            } => JsFunction::Declared {
                name: name.clone(),
                params: params.clone(),
                body: body.clone(),
                closure: closure.clone(),
                is_generator: *is_generator,
            },
        }
    }
}

impl std::fmt::Debug for JsFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JsFunction::Native(name, arity, _) => {
                write!(f, "JsFunction::Native({name:?}, {arity})")
            }
            JsFunction::Declared { name, .. } => write!(f, "JsFunction::Declared({name:?})"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    pub value: Option<JsValue>,
    pub writable: Option<bool>,
    pub get: Option<JsValue>,
    pub set: Option<JsValue>,
    pub enumerable: Option<bool>,
    pub configurable: Option<bool>,
}

impl PropertyDescriptor {
    pub fn data(value: JsValue, writable: bool, enumerable: bool, configurable: bool) -> Self {
        Self {
            value: Some(value),
            writable: Some(writable),
            get: None,
            set: None,
            enumerable: Some(enumerable),
            configurable: Some(configurable),
        }
    }

    pub fn data_default(value: JsValue) -> Self {
        Self::data(value, true, true, true)
    }

    pub fn accessor(get: Option<JsValue>, set: Option<JsValue>) -> Self {
        Self {
            value: None,
            writable: None,
            get,
            set,
            enumerable: Some(false),
            configurable: Some(true),
        }
    }

    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }
}

/// Per-class private member definitions, recorded on the constructor and
/// instantiated on each new object. Keys are private-name token ids.
#[derive(Clone, Debug)]
pub(crate) enum PrivateFieldDef {
    Field {
        key: u64,
        initializer: Option<Initializer>,
    },
    Method {
        key: u64,
        value: JsValue,
    },
}

/// Installed private member, keyed by token id in `JsObjectData`.
#[derive(Clone, Debug)]
pub enum PrivateElement {
    Field(JsValue),
    Method(JsValue),
    Accessor {
        get: Option<JsValue>,
        set: Option<JsValue>,
    },
}

#[derive(Debug)]
pub(crate) enum IteratorState {
    ArrayIterator {
        array_id: u64,
        index: usize,
        done: bool,
    },
    Generator(super::generator::GeneratorState),
}

pub struct JsObjectData {
    pub id: Option<u64>,
    pub properties: FxHashMap<String, PropertyDescriptor>,
    pub property_order: Vec<String>,
    pub prototype: Option<Rc<RefCell<JsObjectData>>>,
    pub callable: Option<JsFunction>,
    pub array_elements: Option<Vec<JsValue>>,
    pub class_name: String,
    pub private_fields: FxHashMap<u64, PrivateElement>,
    pub(crate) class_private_field_defs: Vec<PrivateFieldDef>,
    pub(crate) iterator_state: Option<IteratorState>,
}

impl JsObjectData {
    pub(crate) fn new() -> Self {
        Self {
            id: None,
            properties: FxHashMap::default(),
            property_order: Vec::new(),
            prototype: None,
            callable: None,
            array_elements: None,
            class_name: "Object".to_string(),
            private_fields: FxHashMap::default(),
            class_private_field_defs: Vec::new(),
            iterator_state: None,
        }
    }

    pub fn get_property_descriptor(&self, key: &str) -> Option<PropertyDescriptor> {
        if let Some(desc) = self.properties.get(key) {
            return Some(desc.clone());
        }
        if let Some(elems) = &self.array_elements {
            if key == "length" {
                return Some(PropertyDescriptor::data(
                    JsValue::Number(elems.len() as f64),
                    true,
                    false,
                    false,
                ));
            }
            if let Ok(idx) = key.parse::<usize>()
                && idx < elems.len()
            {
                return Some(PropertyDescriptor::data_default(elems[idx].clone()));
            }
        }
        if let Some(proto) = &self.prototype {
            return proto.borrow().get_property_descriptor(key);
        }
        None
    }

    pub fn has_own_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Own enumerable data-property keys, in insertion order. Array element
    /// indices come first, matching ordinary own-key ordering.
    pub fn own_enumerable_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        if let Some(elems) = &self.array_elements {
            for i in 0..elems.len() {
                keys.push(i.to_string());
            }
        }
        for k in &self.property_order {
            if let Some(desc) = self.properties.get(k)
                && desc.enumerable != Some(false)
                && desc.is_data_descriptor()
            {
                keys.push(k.clone());
            }
        }
        keys
    }

    pub fn insert_value(&mut self, key: String, value: JsValue) {
        if !self.properties.contains_key(&key) {
            self.property_order.push(key.clone());
        }
        self.properties
            .insert(key, PropertyDescriptor::data_default(value));
    }

    pub fn insert_builtin(&mut self, key: String, value: JsValue) {
        if !self.properties.contains_key(&key) {
            self.property_order.push(key.clone());
        }
        self.properties
            .insert(key, PropertyDescriptor::data(value, true, false, true));
    }

    pub fn insert_property(&mut self, key: String, desc: PropertyDescriptor) {
        if !self.properties.contains_key(&key) {
            self.property_order.push(key.clone());
        }
        self.properties.insert(key, desc);
    }

    pub fn get_property_value(&self, key: &str) -> Option<JsValue> {
        self.properties.get(key).and_then(|d| d.value.clone())
    }
}
