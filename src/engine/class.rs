use super::*;
use crate::ast::Initializer;
use crate::types::JsValue;

/// Unforgeable private-name token. Only the engine mints ids, and the id
/// field is private, so a slot is reachable only by code that was handed
/// the token by the defining scope — access is capability-based, not
/// string-keyed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PrivateName {
    id: u64,
    description: String,
}

impl PrivateName {
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Class definition input: the narrow slice this core needs — public
/// prototype/static methods plus private instance and static members.
pub struct ClassSpec {
    pub name: String,
    pub constructor: Option<JsFunction>,
    pub methods: Vec<(String, JsFunction)>,
    pub static_methods: Vec<(String, JsFunction)>,
    pub private_fields: Vec<(PrivateName, Option<Initializer>)>,
    pub private_methods: Vec<(PrivateName, JsFunction)>,
    pub static_private_fields: Vec<(PrivateName, Option<Initializer>)>,
    pub static_private_methods: Vec<(PrivateName, JsFunction)>,
}

impl ClassSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            constructor: None,
            methods: Vec::new(),
            static_methods: Vec::new(),
            private_fields: Vec::new(),
            private_methods: Vec::new(),
            static_private_fields: Vec::new(),
            static_private_methods: Vec::new(),
        }
    }
}

impl Engine {
    pub fn private_name(&mut self, description: &str) -> PrivateName {
        let id = self.next_private_id;
        self.next_private_id += 1;
        PrivateName {
            id,
            description: description.to_string(),
        }
    }

    /// ClassDefinitionEvaluation, narrowed: builds the constructor and
    /// prototype, installs public methods, records instance private
    /// definitions for construction, and installs static private members on
    /// the constructor object itself — exactly once, before any instance
    /// can exist.
    pub fn define_class(&mut self, spec: ClassSpec) -> Result<JsValue, JsValue> {
        let proto = self.create_object();
        let ctor_fn = spec.constructor.unwrap_or_else(|| {
            JsFunction::native(spec.name.clone(), 0, |_, _, _| {
                Completion::Normal(JsValue::Undefined)
            })
        });
        let ctor_val = self.create_function(ctor_fn);
        let JsValue::Object(ctor_handle) = ctor_val else {
            return Err(self.create_type_error("class constructor allocation failed"));
        };
        let ctor_val = JsValue::Object(ctor_handle);

        let proto_val = Engine::object_value(&proto);
        if let Some(ctor_obj) = self.get_object(ctor_handle.id) {
            ctor_obj.borrow_mut().insert_property(
                "prototype".to_string(),
                PropertyDescriptor::data(proto_val.clone(), false, false, false),
            );
        }
        proto
            .borrow_mut()
            .insert_builtin("constructor".to_string(), ctor_val.clone());

        for (name, func) in spec.methods {
            let method = self.create_function(func);
            proto.borrow_mut().insert_builtin(name, method);
        }
        for (name, func) in spec.static_methods {
            let method = self.create_function(func);
            if let Some(ctor_obj) = self.get_object(ctor_handle.id) {
                ctor_obj.borrow_mut().insert_builtin(name, method);
            }
        }

        // Instance private definitions, instantiated per construct.
        let mut defs = Vec::new();
        for (name, func) in spec.private_methods {
            let method = self.create_function(func);
            defs.push(PrivateFieldDef::Method {
                key: name.id,
                value: method,
            });
        }
        for (name, initializer) in spec.private_fields {
            defs.push(PrivateFieldDef::Field {
                key: name.id,
                initializer,
            });
        }
        if let Some(ctor_obj) = self.get_object(ctor_handle.id) {
            ctor_obj.borrow_mut().class_private_field_defs = defs;
        }

        // Static private members live on the constructor object.
        for (name, func) in spec.static_private_methods {
            let method = self.create_function(func);
            if let Some(ctor_obj) = self.get_object(ctor_handle.id) {
                ctor_obj
                    .borrow_mut()
                    .private_fields
                    .insert(name.id, PrivateElement::Method(method));
            }
        }
        let env = self.global_env();
        for (name, initializer) in spec.static_private_fields {
            let value = match initializer {
                Some(init) => match init.evaluate(self, &env) {
                    Completion::Normal(v) => v,
                    Completion::Throw(e) => return Err(e),
                },
                None => JsValue::Undefined,
            };
            if let Some(ctor_obj) = self.get_object(ctor_handle.id) {
                ctor_obj
                    .borrow_mut()
                    .private_fields
                    .insert(name.id, PrivateElement::Field(value));
            }
        }

        Ok(ctor_val)
    }

    /// Ordinary construction: a fresh object with the class prototype,
    /// instance private methods installed, field initializers run in
    /// definition order with the new instance as `this`, then the
    /// constructor body.
    pub fn construct(&mut self, ctor_val: &JsValue, args: &[JsValue]) -> Result<JsValue, JsValue> {
        let JsValue::Object(c) = ctor_val else {
            return Err(self.create_type_error("is not a constructor"));
        };
        let Some(ctor_obj) = self.get_object(c.id) else {
            return Err(self.create_type_error("is not a constructor"));
        };
        if ctor_obj.borrow().callable.is_none() {
            return Err(self.create_type_error("is not a constructor"));
        }

        let instance = self.create_object();
        if let Some(JsValue::Object(p)) = ctor_obj.borrow().get_property_value("prototype")
            && let Some(proto) = self.get_object(p.id)
        {
            instance.borrow_mut().prototype = Some(proto);
        }
        let instance_val = Engine::object_value(&instance);

        let defs = ctor_obj.borrow().class_private_field_defs.clone();
        let env = self.global_env();
        for def in defs {
            match def {
                PrivateFieldDef::Method { key, value } => {
                    instance
                        .borrow_mut()
                        .private_fields
                        .insert(key, PrivateElement::Method(value));
                }
                PrivateFieldDef::Field { key, initializer } => {
                    let value = match initializer {
                        Some(init) => match init.evaluate(self, &env) {
                            Completion::Normal(v) => v,
                            Completion::Throw(e) => return Err(e),
                        },
                        None => JsValue::Undefined,
                    };
                    instance
                        .borrow_mut()
                        .private_fields
                        .insert(key, PrivateElement::Field(value));
                }
            }
        }

        match self.call_function(ctor_val, &instance_val, args) {
            Completion::Normal(_) => Ok(instance_val),
            Completion::Throw(e) => Err(e),
        }
    }

    // PrivateGet: requires the token and a matching slot.
    pub fn private_get(&mut self, target: &JsValue, name: &PrivateName) -> Result<JsValue, JsValue> {
        let elem = self.private_element(target, name)?;
        match elem {
            PrivateElement::Field(v) | PrivateElement::Method(v) => Ok(v),
            PrivateElement::Accessor { get, .. } => match get {
                Some(getter) => match self.call_function(&getter, target, &[]) {
                    Completion::Normal(v) => Ok(v),
                    Completion::Throw(e) => Err(e),
                },
                None => Err(self.create_private_name_error(&format!(
                    "Cannot read private member #{} which has no getter",
                    name.description
                ))),
            },
        }
    }

    pub fn private_set(
        &mut self,
        target: &JsValue,
        name: &PrivateName,
        value: JsValue,
    ) -> Result<(), JsValue> {
        let elem = self.private_element(target, name)?;
        match elem {
            PrivateElement::Field(_) => {
                if let JsValue::Object(o) = target
                    && let Some(obj) = self.get_object(o.id)
                {
                    obj.borrow_mut()
                        .private_fields
                        .insert(name.id, PrivateElement::Field(value));
                }
                Ok(())
            }
            PrivateElement::Method(_) => Err(self.create_private_name_error(&format!(
                "Cannot write private method #{}",
                name.description
            ))),
            PrivateElement::Accessor { set, .. } => match set {
                Some(setter) => match self.call_function(&setter, target, &[value]) {
                    Completion::Normal(_) => Ok(()),
                    Completion::Throw(e) => Err(e),
                },
                None => Err(self.create_private_name_error(&format!(
                    "Cannot write private member #{} which has no setter",
                    name.description
                ))),
            },
        }
    }

    /// PrivateGet followed by Call with the target as `this`.
    pub fn private_call(
        &mut self,
        target: &JsValue,
        name: &PrivateName,
        args: &[JsValue],
    ) -> Completion {
        let method = match self.private_get(target, name) {
            Ok(v) => v,
            Err(e) => return Completion::Throw(e),
        };
        self.call_function(&method, target, args)
    }

    fn private_element(
        &mut self,
        target: &JsValue,
        name: &PrivateName,
    ) -> Result<PrivateElement, JsValue> {
        let JsValue::Object(o) = target else {
            return Err(self.create_private_name_error(&format!(
                "Cannot read private member #{} from a non-object",
                name.description
            )));
        };
        let elem = self
            .get_object(o.id)
            .and_then(|obj| obj.borrow().private_fields.get(&name.id).cloned());
        elem.ok_or_else(|| {
            self.create_private_name_error(&format!(
                "Cannot read private member #{} from an object whose class did not declare it",
                name.description
            ))
        })
    }
}
