use super::*;
use crate::ast::{
    ArrayPatternElement, ObjectPatternProperty, Pattern, PatternError, PropertyKey,
    validate_params, validate_pattern,
};
use crate::types::{JsValue, to_property_key};

impl Engine {
    /// BindingInitialization: destructures `val` through `pat`, declaring
    /// and initializing bindings in `env`. The pattern shape is validated
    /// before any evaluation side effect; any iterator opened for an array
    /// pattern is closed exactly once on every exit path, and abrupt
    /// completions are re-raised unchanged after that close.
    pub fn bind_pattern(
        &mut self,
        pat: &Pattern,
        val: JsValue,
        kind: BindingKind,
        env: &EnvRef,
    ) -> Result<(), JsValue> {
        if let Err(e) = validate_pattern(pat) {
            return Err(self.pattern_error_value(&e));
        }
        self.bind_target(pat, val, kind, env)
    }

    /// FunctionDeclarationInstantiation's formal binding: the arguments
    /// become a list iterator and the parameter list is bound through the
    /// same element walk as an array pattern. Argument-list iterators have
    /// no `return` capability and are not closed.
    pub fn bind_parameters(
        &mut self,
        params: &[Pattern],
        args: &[JsValue],
        env: &EnvRef,
    ) -> Result<(), JsValue> {
        if let Err(e) = validate_params(params) {
            return Err(self.pattern_error_value(&e));
        }
        let list_iter = self.create_list_iterator(args.to_vec());
        let mut record = self.iterator_record_from(list_iter)?;
        let elements: Vec<Option<ArrayPatternElement>> = params
            .iter()
            .map(|p| {
                Some(match p {
                    Pattern::Rest(inner) => ArrayPatternElement::Rest((**inner).clone()),
                    other => ArrayPatternElement::Pattern(other.clone()),
                })
            })
            .collect();
        self.bind_array_elements(&elements, &mut record, BindingKind::Var, env)
    }

    pub(crate) fn pattern_error_value(&mut self, err: &PatternError) -> JsValue {
        match err {
            PatternError::RestElementNotLast | PatternError::RestElementWithDefault => {
                self.create_error("RestElementNotLastError", &err.to_string())
            }
            PatternError::InvalidBindingIdentifier(_) => {
                self.create_error("SyntaxError", &err.to_string())
            }
        }
    }

    fn bind_target(
        &mut self,
        pat: &Pattern,
        val: JsValue,
        kind: BindingKind,
        env: &EnvRef,
    ) -> Result<(), JsValue> {
        match pat {
            Pattern::Identifier(name) => {
                if kind != BindingKind::Var || !env.borrow().bindings.contains_key(name) {
                    env.borrow_mut().declare(name, kind);
                }
                env.borrow_mut().set(name, val)
            }
            Pattern::Assign(inner, default) => {
                let v = if val.is_undefined() {
                    match default.evaluate(self, env) {
                        Completion::Normal(v) => v,
                        Completion::Throw(e) => return Err(e),
                    }
                } else {
                    val
                };
                self.bind_target(inner, v, kind, env)
            }
            Pattern::Array(elements) => {
                let mut record = self.get_iterator(&val)?;
                let result = self.bind_array_elements(elements, &mut record, kind, env);
                self.close_after_binding(&mut record, result)
            }
            Pattern::Object(props) => self.bind_object_props(props, &val, kind, env),
            Pattern::Rest(inner) => self.bind_target(inner, val, kind, env),
        }
    }

    /// IteratorBindingInitialization over the elements of an array pattern
    /// (or a parameter list). The record's `done` flag gates every `next`
    /// invocation: once exhaustion (or a failed step) is observed, the
    /// remaining elements bind undefined — defaults still run — without
    /// touching the iterator again.
    pub(crate) fn bind_array_elements(
        &mut self,
        elements: &[Option<ArrayPatternElement>],
        record: &mut IteratorRecord,
        kind: BindingKind,
        env: &EnvRef,
    ) -> Result<(), JsValue> {
        for elem in elements {
            match elem {
                // Elision: one step, value discarded, no binding.
                None => {
                    if !record.done {
                        self.iterator_step(record)?;
                    }
                }
                Some(ArrayPatternElement::Pattern(p)) => {
                    let item = if record.done {
                        JsValue::Undefined
                    } else {
                        self.iterator_step(record)?.unwrap_or(JsValue::Undefined)
                    };
                    self.bind_target(p, item, kind, env)?;
                }
                Some(ArrayPatternElement::Rest(p)) => {
                    let rest = self.collect_rest(record)?;
                    let arr = self.create_array(rest);
                    self.bind_target(p, arr, kind, env)?;
                }
            }
        }
        Ok(())
    }

    /// Rest collector: drains the record into a fresh ordered container.
    /// Exhaustion marks the record done, so the enclosing close is a no-op.
    fn collect_rest(&mut self, record: &mut IteratorRecord) -> Result<Vec<JsValue>, JsValue> {
        let mut rest = Vec::new();
        while !record.done {
            match self.iterator_step(record)? {
                Some(v) => rest.push(v),
                None => break,
            }
        }
        Ok(rest)
    }

    /// Final close of an array-pattern evaluation: exactly once, unless the
    /// record's `done` flag is already true. An abrupt element result is
    /// re-raised unchanged; a close failure under a normal walk surfaces.
    fn close_after_binding(
        &mut self,
        record: &mut IteratorRecord,
        result: Result<(), JsValue>,
    ) -> Result<(), JsValue> {
        let completion = match result {
            Ok(()) => Completion::Normal(JsValue::Undefined),
            Err(e) => Completion::Throw(e),
        };
        match self.iterator_close(record, completion) {
            Completion::Normal(_) => Ok(()),
            Completion::Throw(e) => Err(e),
        }
    }

    fn bind_object_props(
        &mut self,
        props: &[ObjectPatternProperty],
        val: &JsValue,
        kind: BindingKind,
        env: &EnvRef,
    ) -> Result<(), JsValue> {
        if val.is_nullish() {
            return Err(self.create_type_error("Cannot destructure a nullish value"));
        }
        let mut excluded_keys: Vec<String> = Vec::new();
        for prop in props {
            match prop {
                ObjectPatternProperty::Shorthand(name) => {
                    excluded_keys.push(name.clone());
                    let v = match self.get_property(val, name) {
                        Completion::Normal(v) => v,
                        Completion::Throw(e) => return Err(e),
                    };
                    self.bind_target(&Pattern::Identifier(name.clone()), v, kind, env)?;
                }
                ObjectPatternProperty::KeyValue(key, pat) => {
                    let key_str = match key {
                        PropertyKey::Identifier(s) | PropertyKey::String(s) => s.clone(),
                        PropertyKey::Number(n) => {
                            to_property_key(&JsValue::Number(*n))
                        }
                        PropertyKey::Computed(init) => match init.evaluate(self, env) {
                            Completion::Normal(v) => to_property_key(&v),
                            Completion::Throw(e) => return Err(e),
                        },
                    };
                    excluded_keys.push(key_str.clone());
                    let v = match self.get_property(val, &key_str) {
                        Completion::Normal(v) => v,
                        Completion::Throw(e) => return Err(e),
                    };
                    self.bind_target(pat, v, kind, env)?;
                }
                ObjectPatternProperty::Rest(pat) => {
                    let rest_obj = self.create_object();
                    if let JsValue::Object(o) = val
                        && let Some(src) = self.get_object(o.id)
                    {
                        let keys = src.borrow().own_enumerable_keys();
                        for key in keys {
                            if excluded_keys.contains(&key) {
                                continue;
                            }
                            let v = match self.get_property(val, &key) {
                                Completion::Normal(v) => v,
                                Completion::Throw(e) => return Err(e),
                            };
                            rest_obj.borrow_mut().insert_value(key, v);
                        }
                    }
                    let rest_val = Engine::object_value(&rest_obj);
                    self.bind_target(pat, rest_val, kind, env)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Initializer;
    use crate::types::strict_equality;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn ident(name: &str) -> Pattern {
        Pattern::Identifier(name.to_string())
    }

    fn elem(pat: Pattern) -> Option<ArrayPatternElement> {
        Some(ArrayPatternElement::Pattern(pat))
    }

    fn number(env: &EnvRef, name: &str) -> f64 {
        match env.borrow().get(name) {
            Some(JsValue::Number(n)) => n,
            other => panic!("binding {name} is {other:?}"),
        }
    }

    /// Handles to a scripted iterable whose next/return behavior and call
    /// counts the test controls.
    struct Scripted {
        iterable: JsValue,
        next_calls: Rc<Cell<u32>>,
        return_calls: Rc<Cell<u32>>,
    }

    /// Iterable yielding `items` in order, counting next/return calls.
    /// `next_throws` poisons the first next call with the given error.
    fn scripted_iterable(
        engine: &mut Engine,
        items: Vec<JsValue>,
        next_throws: Option<JsValue>,
    ) -> Scripted {
        let next_calls = Rc::new(Cell::new(0u32));
        let return_calls = Rc::new(Cell::new(0u32));
        let cursor = Rc::new(Cell::new(0usize));

        let nc = next_calls.clone();
        let next_fn = engine.create_function(JsFunction::native(
            "next".to_string(),
            0,
            move |engine, _this, _args| {
                nc.set(nc.get() + 1);
                if let Some(err) = &next_throws {
                    return Completion::Throw(err.clone());
                }
                let i = cursor.get();
                cursor.set(i + 1);
                let result = match items.get(i) {
                    Some(v) => engine.create_iter_result(v.clone(), false),
                    None => engine.create_iter_result(JsValue::Undefined, true),
                };
                Completion::Normal(result)
            },
        ));
        let rc = return_calls.clone();
        let return_fn = engine.create_function(JsFunction::native(
            "return".to_string(),
            0,
            move |engine, _this, _args| {
                rc.set(rc.get() + 1);
                let result = engine.create_iter_result(JsValue::Undefined, true);
                Completion::Normal(result)
            },
        ));

        let iterator = engine.create_object();
        iterator.borrow_mut().insert_value("next".to_string(), next_fn);
        iterator
            .borrow_mut()
            .insert_value("return".to_string(), return_fn);
        let iterator_val = Engine::object_value(&iterator);

        let iterable = engine.create_object();
        let iter_fn = engine.create_function(JsFunction::native(
            "[Symbol.iterator]".to_string(),
            0,
            move |_, _, _| Completion::Normal(iterator_val.clone()),
        ));
        iterable
            .borrow_mut()
            .insert_value(SYMBOL_ITERATOR.to_string(), iter_fn);

        Scripted {
            iterable: Engine::object_value(&iterable),
            next_calls,
            return_calls,
        }
    }

    #[test]
    fn array_pattern_binds_in_order() {
        let mut engine = Engine::new();
        let env = Environment::new(None);
        let src = engine.create_array(vec![
            JsValue::Number(1.0),
            JsValue::Number(2.0),
            JsValue::Number(3.0),
        ]);
        let pat = Pattern::Array(vec![elem(ident("a")), elem(ident("b")), elem(ident("c"))]);
        engine
            .bind_pattern(&pat, src, BindingKind::Let, &env)
            .unwrap();
        assert_eq!(number(&env, "a"), 1.0);
        assert_eq!(number(&env, "b"), 2.0);
        assert_eq!(number(&env, "c"), 3.0);
    }

    #[test]
    fn exactly_n_next_calls_for_n_elements() {
        let mut engine = Engine::new();
        let env = Environment::new(None);
        let s = scripted_iterable(
            &mut engine,
            vec![
                JsValue::Number(1.0),
                JsValue::Number(2.0),
                JsValue::Number(3.0),
                JsValue::Number(4.0),
            ],
            None,
        );
        let pat = Pattern::Array(vec![elem(ident("a")), elem(ident("b"))]);
        engine
            .bind_pattern(&pat, s.iterable, BindingKind::Let, &env)
            .unwrap();
        assert_eq!(s.next_calls.get(), 2);
        // The iterator is still open after two of four values, so the
        // pattern close calls return exactly once.
        assert_eq!(s.return_calls.get(), 1);
    }

    #[test]
    fn elision_steps_and_discards() {
        let mut engine = Engine::new();
        let env = Environment::new(None);
        let s = scripted_iterable(
            &mut engine,
            vec![JsValue::Number(1.0), JsValue::Number(2.0)],
            None,
        );
        let pat = Pattern::Array(vec![None, elem(ident("b"))]);
        engine
            .bind_pattern(&pat, s.iterable, BindingKind::Let, &env)
            .unwrap();
        assert_eq!(s.next_calls.get(), 2);
        assert_eq!(number(&env, "b"), 2.0);
        assert!(!env.borrow().has("a"));
    }

    // The array-elision-iter-abpt scenario: `[ , ]` against an iterable
    // whose next throws. next is called exactly once, return is never
    // called (the failing step marked the record done), and the original
    // error propagates with its identity intact.
    #[test]
    fn elision_abrupt_step_skips_close() {
        let mut engine = Engine::new();
        let env = Environment::new(None);
        let boom = engine.create_error("Test262Error", "boom");
        let s = scripted_iterable(&mut engine, vec![], Some(boom.clone()));
        let pat = Pattern::Array(vec![None]);
        let err = engine
            .bind_pattern(&pat, s.iterable, BindingKind::Let, &env)
            .unwrap_err();
        assert!(strict_equality(&err, &boom));
        assert_eq!(s.next_calls.get(), 1);
        assert_eq!(s.return_calls.get(), 0);
    }

    #[test]
    fn exhausted_iterator_feeds_undefined_and_defaults_still_run() {
        let mut engine = Engine::new();
        let env = Environment::new(None);
        let s = scripted_iterable(&mut engine, vec![JsValue::Number(1.0)], None);
        let evals = Rc::new(Cell::new(0u32));
        let ev = evals.clone();
        let pat = Pattern::Array(vec![
            elem(ident("a")),
            elem(ident("b")),
            elem(Pattern::Assign(
                Box::new(ident("c")),
                Initializer::thunk(move |_, _| {
                    ev.set(ev.get() + 1);
                    Completion::Normal(JsValue::Number(42.0))
                }),
            )),
        ]);
        engine
            .bind_pattern(&pat, s.iterable, BindingKind::Let, &env)
            .unwrap();
        assert_eq!(number(&env, "a"), 1.0);
        assert!(matches!(env.borrow().get("b"), Some(JsValue::Undefined)));
        assert_eq!(number(&env, "c"), 42.0);
        assert_eq!(evals.get(), 1);
        // Two next calls: the value, then the exhaustion step. The third
        // element never touches the iterator, and the exhausted record is
        // not closed.
        assert_eq!(s.next_calls.get(), 2);
        assert_eq!(s.return_calls.get(), 0);
    }

    #[test]
    fn default_skipped_when_value_present() {
        let mut engine = Engine::new();
        let env = Environment::new(None);
        let src = engine.create_array(vec![JsValue::Number(5.0)]);
        let evals = Rc::new(Cell::new(0u32));
        let ev = evals.clone();
        let pat = Pattern::Array(vec![elem(Pattern::Assign(
            Box::new(ident("a")),
            Initializer::thunk(move |_, _| {
                ev.set(ev.get() + 1);
                Completion::Normal(JsValue::Number(9.0))
            }),
        ))]);
        engine
            .bind_pattern(&pat, src, BindingKind::Let, &env)
            .unwrap();
        assert_eq!(number(&env, "a"), 5.0);
        assert_eq!(evals.get(), 0);
    }

    #[test]
    fn initializer_throw_closes_open_iterator_once() {
        let mut engine = Engine::new();
        let env = Environment::new(None);
        let boom = engine.create_error("Test262Error", "init boom");
        let boom_clone = boom.clone();
        let s = scripted_iterable(
            &mut engine,
            vec![JsValue::Undefined, JsValue::Number(2.0)],
            None,
        );
        let pat = Pattern::Array(vec![
            elem(Pattern::Assign(
                Box::new(ident("a")),
                Initializer::thunk(move |_, _| Completion::Throw(boom_clone.clone())),
            )),
            elem(ident("b")),
        ]);
        let err = engine
            .bind_pattern(&pat, s.iterable, BindingKind::Let, &env)
            .unwrap_err();
        assert!(strict_equality(&err, &boom));
        // No further next calls after the throw; return invoked exactly
        // once since the iterator was still open.
        assert_eq!(s.next_calls.get(), 1);
        assert_eq!(s.return_calls.get(), 1);
    }

    #[test]
    fn rest_collects_remaining_into_fresh_array() {
        let mut engine = Engine::new();
        let env = Environment::new(None);
        let src = engine.create_array(vec![
            JsValue::Number(1.0),
            JsValue::Number(2.0),
            JsValue::Number(3.0),
        ]);
        let pat = Pattern::Array(vec![Some(ArrayPatternElement::Rest(ident("x")))]);
        engine
            .bind_pattern(&pat, src.clone(), BindingKind::Let, &env)
            .unwrap();
        let x = env.borrow().get("x").unwrap();
        assert!(!strict_equality(&x, &src));
        for (i, expected) in [1.0, 2.0, 3.0].iter().enumerate() {
            let v = match engine.get_property(&x, &i.to_string()) {
                Completion::Normal(v) => v,
                other => panic!("unexpected completion: {other:?}"),
            };
            assert!(matches!(v, JsValue::Number(n) if n == *expected));
        }
        let len = match engine.get_property(&x, "length") {
            Completion::Normal(v) => v,
            other => panic!("unexpected completion: {other:?}"),
        };
        assert!(matches!(len, JsValue::Number(n) if n == 3.0));
    }

    #[test]
    fn rest_after_named_elements() {
        let mut engine = Engine::new();
        let env = Environment::new(None);
        let s = scripted_iterable(
            &mut engine,
            vec![
                JsValue::Number(1.0),
                JsValue::Number(2.0),
                JsValue::Number(3.0),
            ],
            None,
        );
        let pat = Pattern::Array(vec![
            elem(ident("head")),
            Some(ArrayPatternElement::Rest(ident("tail"))),
        ]);
        engine
            .bind_pattern(&pat, s.iterable, BindingKind::Let, &env)
            .unwrap();
        assert_eq!(number(&env, "head"), 1.0);
        let tail = env.borrow().get("tail").unwrap();
        let len = match engine.get_property(&tail, "length") {
            Completion::Normal(v) => v,
            other => panic!("unexpected completion: {other:?}"),
        };
        assert!(matches!(len, JsValue::Number(n) if n == 2.0));
        // Rest drained to exhaustion: 1 value step + 2 rest steps + the
        // final done step; the drained record is not closed.
        assert_eq!(s.next_calls.get(), 4);
        assert_eq!(s.return_calls.get(), 0);
    }

    #[test]
    fn nested_array_pattern_closes_inner_iterator() {
        let mut engine = Engine::new();
        let env = Environment::new(None);
        let inner = scripted_iterable(
            &mut engine,
            vec![JsValue::Number(7.0), JsValue::Number(8.0)],
            None,
        );
        let outer = engine.create_array(vec![inner.iterable.clone()]);
        let pat = Pattern::Array(vec![elem(Pattern::Array(vec![elem(ident("a"))]))]);
        engine
            .bind_pattern(&pat, outer, BindingKind::Let, &env)
            .unwrap();
        assert_eq!(number(&env, "a"), 7.0);
        assert_eq!(inner.next_calls.get(), 1);
        assert_eq!(inner.return_calls.get(), 1);
    }

    #[test]
    fn rest_not_last_rejected_before_any_step() {
        let mut engine = Engine::new();
        let env = Environment::new(None);
        let s = scripted_iterable(&mut engine, vec![JsValue::Number(1.0)], None);
        let pat = Pattern::Array(vec![
            Some(ArrayPatternElement::Rest(ident("x"))),
            elem(ident("y")),
        ]);
        let err = engine
            .bind_pattern(&pat, s.iterable, BindingKind::Let, &env)
            .unwrap_err();
        assert_eq!(
            engine.error_name(&err).as_deref(),
            Some("RestElementNotLastError")
        );
        assert_eq!(s.next_calls.get(), 0);
        assert_eq!(s.return_calls.get(), 0);
    }

    #[test]
    fn object_pattern_reads_properties_without_iterator() {
        let mut engine = Engine::new();
        let env = Environment::new(None);
        let obj = engine.create_object();
        obj.borrow_mut()
            .insert_value("a".to_string(), JsValue::Number(1.0));
        obj.borrow_mut()
            .insert_value("b".to_string(), JsValue::Number(2.0));
        let src = Engine::object_value(&obj);
        let pat = Pattern::Object(vec![
            ObjectPatternProperty::Shorthand("a".to_string()),
            ObjectPatternProperty::KeyValue(
                PropertyKey::Identifier("b".to_string()),
                ident("renamed"),
            ),
        ]);
        engine
            .bind_pattern(&pat, src, BindingKind::Let, &env)
            .unwrap();
        assert_eq!(number(&env, "a"), 1.0);
        assert_eq!(number(&env, "renamed"), 2.0);
    }

    #[test]
    fn object_pattern_reads_left_to_right_with_getters() {
        let mut engine = Engine::new();
        let env = Environment::new(None);
        let order = Rc::new(RefCell::new(Vec::new()));
        let obj = engine.create_object();
        for key in ["first", "second"] {
            let order = order.clone();
            let getter = engine.create_function(JsFunction::native(
                format!("get {key}"),
                0,
                move |_, _, _| {
                    order.borrow_mut().push(key);
                    Completion::Normal(JsValue::Number(0.0))
                },
            ));
            obj.borrow_mut().insert_property(
                key.to_string(),
                PropertyDescriptor::accessor(Some(getter), None),
            );
        }
        let src = Engine::object_value(&obj);
        let pat = Pattern::Object(vec![
            ObjectPatternProperty::Shorthand("first".to_string()),
            ObjectPatternProperty::Shorthand("second".to_string()),
        ]);
        engine
            .bind_pattern(&pat, src, BindingKind::Let, &env)
            .unwrap();
        assert_eq!(*order.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn object_pattern_computed_key_and_default() {
        let mut engine = Engine::new();
        let env = Environment::new(None);
        let obj = engine.create_object();
        obj.borrow_mut()
            .insert_value("k1".to_string(), JsValue::Number(10.0));
        let src = Engine::object_value(&obj);
        let pat = Pattern::Object(vec![
            ObjectPatternProperty::KeyValue(
                PropertyKey::Computed(Initializer::literal(JsValue::string("k1"))),
                ident("a"),
            ),
            ObjectPatternProperty::KeyValue(
                PropertyKey::Identifier("missing".to_string()),
                Pattern::Assign(
                    Box::new(ident("b")),
                    Initializer::literal(JsValue::Number(4.0)),
                ),
            ),
        ]);
        engine
            .bind_pattern(&pat, src, BindingKind::Let, &env)
            .unwrap();
        assert_eq!(number(&env, "a"), 10.0);
        assert_eq!(number(&env, "b"), 4.0);
    }

    #[test]
    fn object_rest_copies_remaining_own_enumerable() {
        let mut engine = Engine::new();
        let env = Environment::new(None);
        let obj = engine.create_object();
        obj.borrow_mut()
            .insert_value("a".to_string(), JsValue::Number(1.0));
        obj.borrow_mut()
            .insert_value("b".to_string(), JsValue::Number(2.0));
        obj.borrow_mut()
            .insert_value("c".to_string(), JsValue::Number(3.0));
        let src = Engine::object_value(&obj);
        let pat = Pattern::Object(vec![
            ObjectPatternProperty::Shorthand("a".to_string()),
            ObjectPatternProperty::Rest(ident("rest")),
        ]);
        engine
            .bind_pattern(&pat, src.clone(), BindingKind::Let, &env)
            .unwrap();
        let rest = env.borrow().get("rest").unwrap();
        assert!(!strict_equality(&rest, &src));
        let b = match engine.get_property(&rest, "b") {
            Completion::Normal(v) => v,
            other => panic!("unexpected completion: {other:?}"),
        };
        assert!(matches!(b, JsValue::Number(n) if n == 2.0));
        let a = match engine.get_property(&rest, "a") {
            Completion::Normal(v) => v,
            other => panic!("unexpected completion: {other:?}"),
        };
        assert!(a.is_undefined());
    }

    #[test]
    fn nullish_object_source_throws_type_error() {
        let mut engine = Engine::new();
        let env = Environment::new(None);
        let pat = Pattern::Object(vec![ObjectPatternProperty::Shorthand("a".to_string())]);
        let err = engine
            .bind_pattern(&pat, JsValue::Undefined, BindingKind::Let, &env)
            .unwrap_err();
        assert_eq!(engine.error_name(&err).as_deref(), Some("TypeError"));
    }

    #[test]
    fn single_name_binding_with_default() {
        let mut engine = Engine::new();
        let env = Environment::new(None);
        let pat = Pattern::Assign(
            Box::new(ident("x")),
            Initializer::literal(JsValue::Number(1.0)),
        );
        engine
            .bind_pattern(&pat, JsValue::Undefined, BindingKind::Const, &env)
            .unwrap();
        assert_eq!(number(&env, "x"), 1.0);
        // Const binding is initialized; reassignment fails.
        assert!(env.borrow_mut().set("x", JsValue::Number(2.0)).is_err());
    }

    #[test]
    fn generator_source_composes_with_destructuring() {
        let mut engine = Engine::new();
        let env = Environment::new(None);
        let generator = engine.create_list_iterator(vec![
            JsValue::Number(10.0),
            JsValue::Number(20.0),
            JsValue::Number(30.0),
        ]);
        let pat = Pattern::Array(vec![
            elem(ident("a")),
            Some(ArrayPatternElement::Rest(ident("rest"))),
        ]);
        engine
            .bind_pattern(&pat, generator, BindingKind::Let, &env)
            .unwrap();
        assert_eq!(number(&env, "a"), 10.0);
        let rest = env.borrow().get("rest").unwrap();
        let len = match engine.get_property(&rest, "length") {
            Completion::Normal(v) => v,
            other => panic!("unexpected completion: {other:?}"),
        };
        assert!(matches!(len, JsValue::Number(n) if n == 2.0));
    }
}
