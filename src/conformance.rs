//! Named conformance scenarios, each exercising an observable protocol
//! guarantee end to end against a fresh engine. The CLI runs these; the
//! unit tests under `engine/` cover the same ground at finer grain.

use crate::ast::{ArrayPatternElement, Initializer, ObjectPatternProperty, Pattern, PropertyKey};
use crate::engine::{
    BindingKind, ClassSpec, Completion, Engine, JsFunction, PropertyDescriptor, SYMBOL_ITERATOR,
};
use crate::types::{JsValue, strict_equality};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub struct Case {
    pub name: &'static str,
    pub run: fn() -> Result<(), String>,
}

pub fn cases() -> Vec<Case> {
    vec![
        Case {
            name: "array-elision-abrupt-skips-close",
            run: array_elision_abrupt_skips_close,
        },
        Case {
            name: "array-pattern-closes-unfinished-iterator",
            run: array_pattern_closes_unfinished_iterator,
        },
        Case {
            name: "array-pattern-exhausted-skips-close",
            run: array_pattern_exhausted_skips_close,
        },
        Case {
            name: "rest-element-builds-fresh-array",
            run: rest_element_builds_fresh_array,
        },
        Case {
            name: "default-initializer-throw-closes-once",
            run: default_initializer_throw_closes_once,
        },
        Case {
            name: "iterator-close-return-error-surfaces",
            run: iterator_close_return_error_surfaces,
        },
        Case {
            name: "object-pattern-nullish-throws-typeerror",
            run: object_pattern_nullish_throws_typeerror,
        },
        Case {
            name: "object-getters-read-left-to-right",
            run: object_getters_read_left_to_right,
        },
        Case {
            name: "object-rest-excludes-bound-keys",
            run: object_rest_excludes_bound_keys,
        },
        Case {
            name: "parameter-rest-receives-all-arguments",
            run: parameter_rest_receives_all_arguments,
        },
        Case {
            name: "generator-as-destructuring-source",
            run: generator_as_destructuring_source,
        },
        Case {
            name: "private-static-generator-method",
            run: private_static_generator_method,
        },
    ]
}

fn check(cond: bool, msg: &str) -> Result<(), String> {
    if cond { Ok(()) } else { Err(msg.to_string()) }
}

/// Iterable whose `next` and `return` calls are counted. `fail_next_at`
/// makes the nth `next` call throw `next_thrown`; `return_throws` makes
/// `return` throw `return_thrown` instead of completing normally.
struct Probe {
    iterable: JsValue,
    next_calls: Rc<Cell<u32>>,
    return_calls: Rc<Cell<u32>>,
    next_thrown: JsValue,
    return_thrown: JsValue,
}

fn probe_iterable(
    engine: &mut Engine,
    values: Vec<JsValue>,
    fail_next_at: Option<u32>,
    return_throws: bool,
) -> Probe {
    let next_calls = Rc::new(Cell::new(0u32));
    let return_calls = Rc::new(Cell::new(0u32));
    let next_thrown = engine.create_error("Test262Error", "next throws");
    let return_thrown = engine.create_error("Test262Error", "return throws");

    let iter = engine.create_object();
    let items = Rc::new(RefCell::new(values));
    let index = Rc::new(Cell::new(0usize));
    let nc = next_calls.clone();
    let thrown = next_thrown.clone();
    let next_fn = engine.create_function(JsFunction::native(
        "next".to_string(),
        0,
        move |engine, _, _| {
            nc.set(nc.get() + 1);
            if fail_next_at == Some(nc.get()) {
                return Completion::Throw(thrown.clone());
            }
            let i = index.get();
            let items = items.borrow();
            if i < items.len() {
                index.set(i + 1);
                Completion::Normal(engine.create_iter_result(items[i].clone(), false))
            } else {
                Completion::Normal(engine.create_iter_result(JsValue::Undefined, true))
            }
        },
    ));
    iter.borrow_mut().insert_builtin("next".to_string(), next_fn);

    let rc = return_calls.clone();
    let thrown = return_thrown.clone();
    let return_fn = engine.create_function(JsFunction::native(
        "return".to_string(),
        0,
        move |engine, _, _| {
            rc.set(rc.get() + 1);
            if return_throws {
                Completion::Throw(thrown.clone())
            } else {
                Completion::Normal(engine.create_iter_result(JsValue::Undefined, true))
            }
        },
    ));
    iter.borrow_mut()
        .insert_builtin("return".to_string(), return_fn);

    let iter_val = Engine::object_value(&iter);
    let iterable = engine.create_object();
    let capability = engine.create_function(JsFunction::native(
        "[Symbol.iterator]".to_string(),
        0,
        move |_, _, _| Completion::Normal(iter_val.clone()),
    ));
    iterable
        .borrow_mut()
        .insert_builtin(SYMBOL_ITERATOR.to_string(), capability);

    Probe {
        iterable: Engine::object_value(&iterable),
        next_calls,
        return_calls,
        next_thrown,
        return_thrown,
    }
}

// `[ , ]` against an iterator whose first `next` throws: the elision steps
// once, the step failure marks the record done, and close never runs.
fn array_elision_abrupt_skips_close() -> Result<(), String> {
    let mut engine = Engine::new();
    let env = engine.global_env();
    let probe = probe_iterable(&mut engine, vec![], Some(1), false);
    let pat = Pattern::Array(vec![None]);
    let err = engine
        .bind_pattern(&pat, probe.iterable, BindingKind::Let, &env)
        .err()
        .ok_or("binding should have thrown")?;
    check(
        strict_equality(&err, &probe.next_thrown),
        "thrown value identity was not preserved",
    )?;
    check(probe.next_calls.get() == 1, "expected exactly one next call")?;
    check(probe.return_calls.get() == 0, "return must not be called")
}

fn array_pattern_closes_unfinished_iterator() -> Result<(), String> {
    let mut engine = Engine::new();
    let env = engine.global_env();
    let probe = probe_iterable(
        &mut engine,
        vec![JsValue::Number(1.0), JsValue::Number(2.0), JsValue::Number(3.0)],
        None,
        false,
    );
    let pat = Pattern::Array(vec![Some(ArrayPatternElement::Pattern(Pattern::Identifier(
        "x".to_string(),
    )))]);
    engine
        .bind_pattern(&pat, probe.iterable, BindingKind::Let, &env)
        .map_err(|e| format!("binding threw: {e}"))?;
    check(probe.next_calls.get() == 1, "expected exactly one next call")?;
    check(probe.return_calls.get() == 1, "expected exactly one return call")?;
    let x = env.borrow().get("x").ok_or("x not bound")?;
    check(strict_equality(&x, &JsValue::Number(1.0)), "x != 1")
}

fn array_pattern_exhausted_skips_close() -> Result<(), String> {
    let mut engine = Engine::new();
    let env = engine.global_env();
    let probe = probe_iterable(&mut engine, vec![JsValue::Number(1.0)], None, false);
    let pat = Pattern::Array(vec![
        Some(ArrayPatternElement::Pattern(Pattern::Identifier("x".to_string()))),
        Some(ArrayPatternElement::Pattern(Pattern::Identifier("y".to_string()))),
    ]);
    engine
        .bind_pattern(&pat, probe.iterable, BindingKind::Let, &env)
        .map_err(|e| format!("binding threw: {e}"))?;
    check(probe.next_calls.get() == 2, "expected two next calls")?;
    check(
        probe.return_calls.get() == 0,
        "exhausted iterator must not be closed",
    )?;
    let y = env.borrow().get("y").ok_or("y not bound")?;
    check(y.is_undefined(), "y should be undefined past exhaustion")
}

fn rest_element_builds_fresh_array() -> Result<(), String> {
    let mut engine = Engine::new();
    let env = engine.global_env();
    let source = engine.create_array(vec![
        JsValue::Number(1.0),
        JsValue::Number(2.0),
        JsValue::Number(3.0),
    ]);
    let pat = Pattern::Array(vec![Some(ArrayPatternElement::Rest(Pattern::Identifier(
        "x".to_string(),
    )))]);
    engine
        .bind_pattern(&pat, source.clone(), BindingKind::Let, &env)
        .map_err(|e| format!("binding threw: {e}"))?;
    let x = env.borrow().get("x").ok_or("x not bound")?;
    check(!strict_equality(&x, &source), "rest container must be fresh")?;
    for (i, expected) in [1.0, 2.0, 3.0].iter().enumerate() {
        let v = match engine.get_property(&x, &i.to_string()) {
            Completion::Normal(v) => v,
            abrupt => return Err(format!("element read threw: {abrupt:?}")),
        };
        check(
            strict_equality(&v, &JsValue::Number(*expected)),
            "rest element mismatch",
        )?;
    }
    Ok(())
}

// A default that throws after a successful step: the iterator is still
// live, so close runs exactly once and the initializer's error wins.
fn default_initializer_throw_closes_once() -> Result<(), String> {
    let mut engine = Engine::new();
    let env = engine.global_env();
    let probe = probe_iterable(&mut engine, vec![JsValue::Undefined], None, false);
    let marker = engine.create_error("Test262Error", "initializer throws");
    let m = marker.clone();
    let pat = Pattern::Array(vec![Some(ArrayPatternElement::Pattern(Pattern::Assign(
        Box::new(Pattern::Identifier("x".to_string())),
        Initializer::thunk(move |_, _| Completion::Throw(m.clone())),
    )))]);
    let err = engine
        .bind_pattern(&pat, probe.iterable, BindingKind::Let, &env)
        .err()
        .ok_or("binding should have thrown")?;
    check(
        strict_equality(&err, &marker),
        "initializer error identity was not preserved",
    )?;
    check(probe.next_calls.get() == 1, "expected exactly one next call")?;
    check(probe.return_calls.get() == 1, "expected exactly one return call")
}

fn iterator_close_return_error_surfaces() -> Result<(), String> {
    let mut engine = Engine::new();
    let env = engine.global_env();
    let probe = probe_iterable(
        &mut engine,
        vec![JsValue::Number(1.0), JsValue::Number(2.0)],
        None,
        true,
    );
    let pat = Pattern::Array(vec![Some(ArrayPatternElement::Pattern(Pattern::Identifier(
        "x".to_string(),
    )))]);
    let err = engine
        .bind_pattern(&pat, probe.iterable, BindingKind::Let, &env)
        .err()
        .ok_or("close failure should surface")?;
    check(
        strict_equality(&err, &probe.return_thrown),
        "return error identity was not preserved",
    )?;
    // The binding itself still completed before close threw.
    let x = env.borrow().get("x").ok_or("x not bound")?;
    check(strict_equality(&x, &JsValue::Number(1.0)), "x != 1")
}

fn object_pattern_nullish_throws_typeerror() -> Result<(), String> {
    let mut engine = Engine::new();
    let env = engine.global_env();
    let pat = Pattern::Object(vec![ObjectPatternProperty::Shorthand("a".to_string())]);
    for nullish in [JsValue::Undefined, JsValue::Null] {
        let err = engine
            .bind_pattern(&pat, nullish, BindingKind::Let, &env)
            .err()
            .ok_or("destructuring a nullish value should throw")?;
        check(
            engine.error_name(&err).as_deref() == Some("TypeError"),
            "expected a TypeError",
        )?;
    }
    Ok(())
}

fn object_getters_read_left_to_right() -> Result<(), String> {
    let mut engine = Engine::new();
    let env = engine.global_env();
    let order = Rc::new(RefCell::new(Vec::new()));
    let source = engine.create_object();
    for key in ["a", "b", "c"] {
        let log = order.clone();
        let getter = engine.create_function(JsFunction::native(
            format!("get {key}"),
            0,
            move |_, _, _| {
                log.borrow_mut().push(key.to_string());
                Completion::Normal(JsValue::Undefined)
            },
        ));
        source
            .borrow_mut()
            .insert_property(key.to_string(), PropertyDescriptor::accessor(Some(getter), None));
    }
    let pat = Pattern::Object(vec![
        ObjectPatternProperty::Shorthand("a".to_string()),
        ObjectPatternProperty::KeyValue(
            PropertyKey::Identifier("b".to_string()),
            Pattern::Identifier("bee".to_string()),
        ),
        ObjectPatternProperty::Shorthand("c".to_string()),
    ]);
    let source_val = Engine::object_value(&source);
    engine
        .bind_pattern(&pat, source_val, BindingKind::Let, &env)
        .map_err(|e| format!("binding threw: {e}"))?;
    check(*order.borrow() == ["a", "b", "c"], "getter order mismatch")
}

fn object_rest_excludes_bound_keys() -> Result<(), String> {
    let mut engine = Engine::new();
    let env = engine.global_env();
    let source = engine.create_object();
    {
        let mut s = source.borrow_mut();
        s.insert_value("a".to_string(), JsValue::Number(1.0));
        s.insert_value("b".to_string(), JsValue::Number(2.0));
        s.insert_value("c".to_string(), JsValue::Number(3.0));
    }
    let pat = Pattern::Object(vec![
        ObjectPatternProperty::Shorthand("a".to_string()),
        ObjectPatternProperty::Rest(Pattern::Identifier("rest".to_string())),
    ]);
    let source_val = Engine::object_value(&source);
    engine
        .bind_pattern(&pat, source_val, BindingKind::Let, &env)
        .map_err(|e| format!("binding threw: {e}"))?;
    let rest = env.borrow().get("rest").ok_or("rest not bound")?;
    let a = match engine.get_property(&rest, "a") {
        Completion::Normal(v) => v,
        abrupt => return Err(format!("read threw: {abrupt:?}")),
    };
    check(a.is_undefined(), "rest must exclude already-bound keys")?;
    for (key, expected) in [("b", 2.0), ("c", 3.0)] {
        let v = match engine.get_property(&rest, key) {
            Completion::Normal(v) => v,
            abrupt => return Err(format!("read threw: {abrupt:?}")),
        };
        check(
            strict_equality(&v, &JsValue::Number(expected)),
            "rest property mismatch",
        )?;
    }
    Ok(())
}

fn parameter_rest_receives_all_arguments() -> Result<(), String> {
    let mut engine = Engine::new();
    let global = engine.global_env();
    let seen = Rc::new(RefCell::new(JsValue::Undefined));
    let s = seen.clone();
    let func = engine.create_function(JsFunction::declared(
        "f".to_string(),
        vec![Pattern::Rest(Box::new(Pattern::Identifier("args".to_string())))],
        move |_, env, _| {
            *s.borrow_mut() = env.borrow().get("args").unwrap_or(JsValue::Undefined);
            Completion::Normal(JsValue::Undefined)
        },
        global,
        false,
    ));
    let args = [
        JsValue::Number(1.0),
        JsValue::string("two"),
        JsValue::Boolean(true),
    ];
    if let abrupt @ Completion::Throw(_) = engine.call_function(&func, &JsValue::Undefined, &args) {
        return Err(format!("call threw: {abrupt:?}"));
    }
    let rest = seen.borrow().clone();
    let len = match engine.get_property(&rest, "length") {
        Completion::Normal(v) => v,
        abrupt => return Err(format!("length read threw: {abrupt:?}")),
    };
    check(
        strict_equality(&len, &JsValue::Number(3.0)),
        "rest parameter must hold every argument",
    )
}

fn generator_as_destructuring_source() -> Result<(), String> {
    let mut engine = Engine::new();
    let env = engine.global_env();
    let generator = engine.create_list_iterator(vec![
        JsValue::Number(1.0),
        JsValue::Number(2.0),
        JsValue::Number(3.0),
    ]);
    let pat = Pattern::Array(vec![
        Some(ArrayPatternElement::Pattern(Pattern::Identifier("a".to_string()))),
        Some(ArrayPatternElement::Rest(Pattern::Identifier("rest".to_string()))),
    ]);
    engine
        .bind_pattern(&pat, generator, BindingKind::Let, &env)
        .map_err(|e| format!("binding threw: {e}"))?;
    let a = env.borrow().get("a").ok_or("a not bound")?;
    check(strict_equality(&a, &JsValue::Number(1.0)), "a != 1")?;
    let rest = env.borrow().get("rest").ok_or("rest not bound")?;
    let len = match engine.get_property(&rest, "length") {
        Completion::Normal(v) => v,
        abrupt => return Err(format!("length read threw: {abrupt:?}")),
    };
    check(strict_equality(&len, &JsValue::Number(2.0)), "rest length != 2")
}

// `static * #method([...x])`: invoking through the private name returns a
// suspended generator; the first resume runs the body exactly once with a
// fresh rest array holding the argument iterable's values.
fn private_static_generator_method() -> Result<(), String> {
    let mut engine = Engine::new();
    let name = engine.private_name("method");
    let call_count = Rc::new(Cell::new(0u32));
    let seen = Rc::new(RefCell::new(JsValue::Undefined));

    let cc = call_count.clone();
    let s = seen.clone();
    let global = engine.global_env();
    let method = JsFunction::declared(
        "#method".to_string(),
        vec![Pattern::Array(vec![Some(ArrayPatternElement::Rest(
            Pattern::Identifier("x".to_string()),
        ))])],
        move |_, env, _| {
            cc.set(cc.get() + 1);
            *s.borrow_mut() = env.borrow().get("x").unwrap_or(JsValue::Undefined);
            Completion::Normal(JsValue::Undefined)
        },
        global,
        true,
    );
    let mut spec = ClassSpec::new("C");
    spec.static_private_methods.push((name.clone(), method));
    let ctor = engine
        .define_class(spec)
        .map_err(|e| format!("class definition threw: {e}"))?;

    let values = engine.create_array(vec![
        JsValue::Number(1.0),
        JsValue::Number(2.0),
        JsValue::Number(3.0),
    ]);
    let generator = match engine.private_call(&ctor, &name, &[values.clone()]) {
        Completion::Normal(v) => v,
        abrupt => return Err(format!("private call threw: {abrupt:?}")),
    };
    check(call_count.get() == 0, "body must not run before first resume")?;
    if let abrupt @ Completion::Throw(_) = engine.invoke(&generator, "next", &[]) {
        return Err(format!("resume threw: {abrupt:?}"));
    }
    check(call_count.get() == 1, "body must run exactly once")?;

    let x = seen.borrow().clone();
    check(!strict_equality(&x, &values), "rest array must be fresh")?;
    for (i, expected) in [1.0, 2.0, 3.0].iter().enumerate() {
        let v = match engine.get_property(&x, &i.to_string()) {
            Completion::Normal(v) => v,
            abrupt => return Err(format!("element read threw: {abrupt:?}")),
        };
        check(
            strict_equality(&v, &JsValue::Number(*expected)),
            "rest element mismatch",
        )?;
    }
    Ok(())
}
