/// Language value model for the binding core.
/// Strings are Rust strings; full UTF-16 string semantics, BigInt, and
/// Symbol values live outside this subsystem.
use std::fmt;

#[derive(Clone, Debug)]
pub enum JsValue {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Object(JsObject),
}

/// Handle into the engine's object arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JsObject {
    pub id: u64,
}

impl JsValue {
    pub fn is_undefined(&self) -> bool {
        matches!(self, JsValue::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, JsValue::Null)
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, JsValue::Undefined | JsValue::Null)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, JsValue::Object(_))
    }

    pub fn string(s: &str) -> JsValue {
        JsValue::String(s.to_string())
    }
}

// §7.1.3 ToBoolean
pub fn to_boolean(val: &JsValue) -> bool {
    match val {
        JsValue::Undefined | JsValue::Null => false,
        JsValue::Boolean(b) => *b,
        JsValue::Number(n) => *n != 0.0 && !n.is_nan(),
        JsValue::String(s) => !s.is_empty(),
        JsValue::Object(_) => true,
    }
}

// §7.2.15 IsStrictlyEqual; objects compare by identity.
pub fn strict_equality(a: &JsValue, b: &JsValue) -> bool {
    match (a, b) {
        (JsValue::Undefined, JsValue::Undefined) => true,
        (JsValue::Null, JsValue::Null) => true,
        (JsValue::Boolean(x), JsValue::Boolean(y)) => x == y,
        (JsValue::Number(x), JsValue::Number(y)) => x == y,
        (JsValue::String(x), JsValue::String(y)) => x == y,
        (JsValue::Object(x), JsValue::Object(y)) => x.id == y.id,
        _ => false,
    }
}

pub mod number_ops {
    // §6.1.6.1.20 Number::toString (radix 10)
    pub fn to_string(n: f64) -> String {
        if n.is_nan() {
            return "NaN".to_string();
        }
        if n.is_infinite() {
            return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
        }
        let mut buf = ryu_js::Buffer::new();
        buf.format_finite(n).to_string()
    }
}

// §7.1.19 ToPropertyKey for the value kinds this core produces.
pub fn to_property_key(val: &JsValue) -> String {
    match val {
        JsValue::Number(n) => number_ops::to_string(*n),
        other => format!("{other}"),
    }
}

impl fmt::Display for JsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsValue::Undefined => write!(f, "undefined"),
            JsValue::Null => write!(f, "null"),
            JsValue::Boolean(b) => write!(f, "{b}"),
            JsValue::Number(n) => write!(f, "{}", number_ops::to_string(*n)),
            JsValue::String(s) => write!(f, "{s}"),
            JsValue::Object(_) => write!(f, "[object Object]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_special_values() {
        assert_eq!(number_ops::to_string(f64::NAN), "NaN");
        assert_eq!(number_ops::to_string(0.0), "0");
        assert_eq!(number_ops::to_string(-0.0), "0");
        assert_eq!(number_ops::to_string(f64::INFINITY), "Infinity");
        assert_eq!(number_ops::to_string(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(number_ops::to_string(42.0), "42");
        assert_eq!(number_ops::to_string(0.5), "0.5");
    }

    #[test]
    fn strict_equality_basics() {
        assert!(strict_equality(&JsValue::Undefined, &JsValue::Undefined));
        assert!(!strict_equality(&JsValue::Undefined, &JsValue::Null));
        assert!(!strict_equality(
            &JsValue::Number(f64::NAN),
            &JsValue::Number(f64::NAN)
        ));
        assert!(strict_equality(
            &JsValue::Object(JsObject { id: 3 }),
            &JsValue::Object(JsObject { id: 3 })
        ));
        assert!(!strict_equality(
            &JsValue::Object(JsObject { id: 3 }),
            &JsValue::Object(JsObject { id: 4 })
        ));
    }

    #[test]
    fn property_key_conversion() {
        assert_eq!(to_property_key(&JsValue::Number(1.0)), "1");
        assert_eq!(to_property_key(&JsValue::string("x")), "x");
        assert_eq!(to_property_key(&JsValue::Undefined), "undefined");
    }

    #[test]
    fn to_boolean_basics() {
        assert!(!to_boolean(&JsValue::Undefined));
        assert!(!to_boolean(&JsValue::Number(0.0)));
        assert!(!to_boolean(&JsValue::String(String::new())));
        assert!(to_boolean(&JsValue::Object(JsObject { id: 0 })));
        assert!(to_boolean(&JsValue::Number(1.0)));
    }
}
