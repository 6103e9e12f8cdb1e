//! Runtime value representation
//!
//! Kata is dynamically typed; every operand is a [`Value`]. Operator
//! semantics live here so the interpreter's dispatch loop stays a thin
//! fetch-execute cycle. Type errors are reported as plain messages which
//! the sandbox wraps into runtime faults.

use std::fmt;
use std::rc::Rc;

/// A runtime value
#[derive(Debug, Clone)]
pub enum Value {
    /// The null value
    Null,
    /// A boolean
    Bool(bool),
    /// A 64-bit integer
    Int(i64),
    /// A 64-bit float
    Float(f64),
    /// An immutable string
    Str(Rc<str>),
}

impl Value {
    /// Build a string value
    pub fn str(s: impl AsRef<str>) -> Self {
        Value::Str(Rc::from(s.as_ref()))
    }

    /// Type name used in fault messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
        }
    }

    /// Interpret this value as a branch condition.
    ///
    /// Only booleans are valid conditions; anything else is a fault.
    pub fn as_condition(&self) -> Result<bool, String> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(format!(
                "condition must be a boolean, got {}",
                other.type_name()
            )),
        }
    }

    /// `a + b`: numeric addition, or concatenation if either side is a string
    pub fn add(&self, other: &Value) -> Result<Value, String> {
        match (self, other) {
            (Value::Str(_), _) | (_, Value::Str(_)) => {
                Ok(Value::str(format!("{self}{other}")))
            }
            (Value::Int(a), Value::Int(b)) => a
                .checked_add(*b)
                .map(Value::Int)
                .ok_or_else(|| "integer overflow".to_string()),
            (a, b) => numeric_pair(a, b, "add")
                .map(|(x, y)| Value::Float(x + y)),
        }
    }

    /// `a - b`
    pub fn sub(&self, other: &Value) -> Result<Value, String> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_sub(*b)
                .map(Value::Int)
                .ok_or_else(|| "integer overflow".to_string()),
            (a, b) => numeric_pair(a, b, "subtract").map(|(x, y)| Value::Float(x - y)),
        }
    }

    /// `a * b`
    pub fn mul(&self, other: &Value) -> Result<Value, String> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_mul(*b)
                .map(Value::Int)
                .ok_or_else(|| "integer overflow".to_string()),
            (a, b) => numeric_pair(a, b, "multiply").map(|(x, y)| Value::Float(x * y)),
        }
    }

    /// `a / b`: integer division truncates; division by integer zero faults
    pub fn div(&self, other: &Value) -> Result<Value, String> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => {
                if *b == 0 {
                    return Err("division by zero".to_string());
                }
                a.checked_div(*b)
                    .map(Value::Int)
                    .ok_or_else(|| "integer overflow".to_string())
            }
            (a, b) => numeric_pair(a, b, "divide").map(|(x, y)| Value::Float(x / y)),
        }
    }

    /// `a % b`
    pub fn rem(&self, other: &Value) -> Result<Value, String> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => {
                if *b == 0 {
                    return Err("modulo by zero".to_string());
                }
                a.checked_rem(*b)
                    .map(Value::Int)
                    .ok_or_else(|| "integer overflow".to_string())
            }
            (a, b) => numeric_pair(a, b, "take the modulo of").map(|(x, y)| Value::Float(x % y)),
        }
    }

    /// Unary `-a`
    pub fn neg(&self) -> Result<Value, String> {
        match self {
            Value::Int(a) => a
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| "integer overflow".to_string()),
            Value::Float(a) => Ok(Value::Float(-a)),
            other => Err(format!("cannot negate {}", other.type_name())),
        }
    }

    /// Unary `!a`
    pub fn not(&self) -> Result<Value, String> {
        match self {
            Value::Bool(b) => Ok(Value::Bool(!b)),
            other => Err(format!("cannot apply '!' to {}", other.type_name())),
        }
    }

    /// `a == b`: same-type comparison; int and float compare numerically;
    /// values of different non-numeric types are unequal, never an error
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            _ => false,
        }
    }

    /// Ordered comparison for `< <= > >=`
    ///
    /// Numbers compare numerically, strings lexicographically; anything
    /// else is a fault.
    pub fn compare(&self, other: &Value) -> Result<std::cmp::Ordering, String> {
        use std::cmp::Ordering;
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Ok(a.as_ref().cmp(b.as_ref())),
            (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
            (a, b) => {
                let (x, y) = numeric_pair(a, b, "compare")?;
                x.partial_cmp(&y)
                    .ok_or_else(|| "cannot compare NaN".to_string())
            }
        }
    }
}

/// Coerce two values to floats for mixed-numeric arithmetic
fn numeric_pair(a: &Value, b: &Value, verb: &str) -> Result<(f64, f64), String> {
    let coerce = |v: &Value| match v {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    };
    match (coerce(a), coerce(b)) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(format!(
            "cannot {verb} {} and {}",
            a.type_name(),
            b.type_name()
        )),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(s) => write!(f, "{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_arithmetic() {
        assert!(matches!(
            Value::Int(2).add(&Value::Int(3)),
            Ok(Value::Int(5))
        ));
        assert!(matches!(
            Value::Int(7).div(&Value::Int(2)),
            Ok(Value::Int(3))
        ));
        assert!(Value::Int(1).div(&Value::Int(0)).is_err());
        assert!(Value::Int(i64::MAX).add(&Value::Int(1)).is_err());
    }

    #[test]
    fn test_mixed_numeric_promotes_to_float() {
        let Ok(Value::Float(v)) = Value::Int(1).add(&Value::Float(0.5)) else {
            panic!("Expected float");
        };
        assert!((v - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_string_concat() {
        let result = Value::str("n = ").add(&Value::Int(3)).unwrap();
        assert_eq!(result.to_string(), "n = 3");
    }

    #[test]
    fn test_type_errors() {
        assert!(Value::Bool(true).add(&Value::Int(1)).is_err());
        assert!(Value::Null.neg().is_err());
        assert!(Value::Int(1).not().is_err());
        assert!(Value::Bool(true).compare(&Value::Bool(false)).is_err());
    }

    #[test]
    fn test_equality() {
        assert!(Value::Int(1).equals(&Value::Float(1.0)));
        assert!(!Value::Int(1).equals(&Value::str("1")));
        assert!(Value::Null.equals(&Value::Null));
        assert!(!Value::Null.equals(&Value::Int(0)));
    }

    #[test]
    fn test_condition_requires_bool() {
        assert_eq!(Value::Bool(true).as_condition(), Ok(true));
        assert!(Value::Int(1).as_condition().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Int(-7).to_string(), "-7");
    }
}
