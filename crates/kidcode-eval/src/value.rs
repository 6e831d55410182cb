//! Runtime values.

use std::fmt;

/// A value produced by evaluating an expression.
///
/// Errors are not values: expression evaluation returns
/// `Result<Value, RuntimeError>` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    String(String),
    Boolean(bool),
    List(Vec<Value>),
}

impl Value {
    /// Name used in type error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "number",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::List(_) => "list",
        }
    }

    /// Condition value for `if`: booleans as is, everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            _ => true,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::List(items) => {
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

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Value::from(-7).to_string(), "-7");
        assert_eq!(Value::from("hi there").to_string(), "hi there");
        assert_eq!(Value::from(false).to_string(), "false");
        let nested = Value::List(vec![
            Value::from(1),
            Value::from("a"),
            Value::List(vec![Value::from(true)]),
        ]);
        assert_eq!(nested.to_string(), "[1, a, [true]]");
        assert_eq!(Value::List(Vec::new()).to_string(), "[]");
    }

    #[test]
    fn test_truthiness() {
        assert!(Value::from(true).is_truthy());
        assert!(!Value::from(false).is_truthy());
        assert!(Value::from(0).is_truthy());
        assert!(Value::from("").is_truthy());
        assert!(Value::List(Vec::new()).is_truthy());
    }
}
