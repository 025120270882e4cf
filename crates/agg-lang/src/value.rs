use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Value: the only runtime value type
// ---------------------------------------------------------------------------

/// Scalar value produced by every expression and carried inside events,
/// variables and aggregator state.
///
/// Serialises to the matching JSON scalar (`null`, `true`, `1.5`, `"str"`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
}

impl Value {
    /// Host-boolean coercion: `false`, `null`, `0`, `NaN` and `""` are falsy,
    /// everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
        }
    }

    /// Numeric coercion used by arithmetic and ordering operators.
    ///
    /// Numbers pass through. A string coerces when its whole text, after
    /// trimming whitespace, is a Rust float literal: optional sign, digits
    /// with optional fraction and exponent, or `inf`/`infinity`
    /// (case-insensitive). Trailing text is not skipped, so `"12px"` fails.
    /// `"NaN"`, booleans and null never coerce.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Str(s) => s.trim().parse::<f64>().ok().filter(|n| !n.is_nan()),
            Value::Null | Value::Bool(_) => None,
        }
    }

    /// The number held by a `Number` value, without coercion.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

// ---------------------------------------------------------------------------
// Form: the literal input grammar
// ---------------------------------------------------------------------------

/// Literal expression form, as emitted by authoring tools.
///
/// `number | boolean | null | string | [Form, ...]`. JSON objects are not
/// part of the grammar and fail to deserialise.
///
/// Equality is structural and drives change detection: two forms are equal
/// exactly when they are the same tree of equal literals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Form {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    List(Vec<Form>),
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Form::Null => f.write_str("null"),
            Form::Bool(b) => write!(f, "{b}"),
            Form::Number(n) => write!(f, "{n}"),
            Form::Str(s) => write!(f, "{s:?}"),
            Form::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<Value> for Form {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Form::Null,
            Value::Bool(b) => Form::Bool(b),
            Value::Number(n) => Form::Number(n),
            Value::Str(s) => Form::Str(s),
        }
    }
}

impl From<&str> for Form {
    fn from(s: &str) -> Self {
        Form::Str(s.to_string())
    }
}

impl From<f64> for Form {
    fn from(n: f64) -> Self {
        Form::Number(n)
    }
}

impl From<bool> for Form {
    fn from(b: bool) -> Self {
        Form::Bool(b)
    }
}

impl From<Vec<Form>> for Form {
    fn from(items: Vec<Form>) -> Self {
        Form::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_follows_host_convention() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
        assert!(Value::Number(-1.0).is_truthy());
        assert!(Value::from("0").is_truthy());
        assert!(Value::Bool(true).is_truthy());
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(Value::from(" 12.5 ").to_number(), Some(12.5));
        assert_eq!(Value::from("abc").to_number(), None);
        assert_eq!(Value::from("NaN").to_number(), None);
        assert_eq!(Value::from("+5").to_number(), Some(5.0));
        assert_eq!(Value::from("-1e3").to_number(), Some(-1000.0));
        assert_eq!(Value::from("Infinity").to_number(), Some(f64::INFINITY));
        assert_eq!(Value::from("12px").to_number(), None);
        assert_eq!(Value::from("").to_number(), None);
        assert_eq!(Value::Bool(true).to_number(), None);
        assert_eq!(Value::Null.to_number(), None);
    }

    #[test]
    fn form_deserialises_nested_literals() {
        let form: Form = serde_json::from_str(r#"["=", "event.name", null, 3, true]"#).unwrap();
        assert_eq!(
            form,
            Form::List(vec![
                Form::from("="),
                Form::from("event.name"),
                Form::Null,
                Form::Number(3.0),
                Form::Bool(true),
            ])
        );
    }

    #[test]
    fn form_rejects_objects() {
        assert!(serde_json::from_str::<Form>(r#"{"a": 1}"#).is_err());
    }

    #[test]
    fn value_serialises_as_json_scalar() {
        assert_eq!(serde_json::to_string(&Value::Null).unwrap(), "null");
        assert_eq!(serde_json::to_string(&Value::from("x")).unwrap(), "\"x\"");
        let v: Value = serde_json::from_str("2").unwrap();
        assert_eq!(v, Value::Number(2.0));
    }
}
