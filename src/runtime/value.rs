//! Runtime values.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use pascalc_core::RuntimeError;

/// Shared, mutable backing store of an array.
pub type ArrayRef = Rc<RefCell<Vec<i32>>>;

/// A value on the operand stack, in a local slot or in a field.
///
/// Integers and booleans are both `Int`; booleans are 0 or 1.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// 32-bit integer or boolean
    Int(i32),
    /// Reference to an array backing store
    Array(ArrayRef),
    /// Unallocated array reference
    #[default]
    Null,
}

impl Value {
    /// Allocate a zero-filled array of `len` cells.
    pub fn new_array(len: usize) -> Self {
        Value::Array(Rc::new(RefCell::new(vec![0; len])))
    }

    /// The integer payload.
    pub fn as_int(&self) -> Result<i32, RuntimeError> {
        match self {
            Value::Int(v) => Ok(*v),
            other => Err(RuntimeError::TypeMismatch {
                expected: "integer",
                actual: other.type_name(),
            }),
        }
    }

    /// The array reference; `Null` is a [`RuntimeError::NullReference`].
    pub fn as_array(&self) -> Result<&ArrayRef, RuntimeError> {
        match self {
            Value::Array(array) => Ok(array),
            Value::Null => Err(RuntimeError::NullReference),
            Value::Int(_) => Err(RuntimeError::TypeMismatch {
                expected: "array",
                actual: "integer",
            }),
        }
    }

    /// Name of the value's shape, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Array(_) => "array",
            Value::Null => "null",
        }
    }
}

impl PartialEq for Value {
    /// Integers compare by value, arrays by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Null, Value::Null) => true,
            _ => false,
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Int(v as i32)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Array(a) => write!(f, "array[{}]", a.borrow().len()),
            Value::Null => f.write_str("null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrays_compare_by_identity() {
        let a = Value::new_array(3);
        let b = Value::new_array(3);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn shape_errors() {
        assert_eq!(Value::Null.as_array().unwrap_err(), RuntimeError::NullReference);
        assert_eq!(
            Value::new_array(1).as_int().unwrap_err(),
            RuntimeError::TypeMismatch {
                expected: "integer",
                actual: "array"
            }
        );
        assert_eq!(Value::from(true).as_int(), Ok(1));
        assert_eq!(Value::from(-3).to_string(), "-3");
    }
}
