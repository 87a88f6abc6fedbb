use crate::common::Value;
use crate::errors::{EntidocResult, EntidocError, ErrorKind};

/// Conversion seam between typed objects and the [Value] tree model.
///
/// Entities, DTO projections and scalar result types all implement this
/// trait; the repository layer never inspects concrete types beyond it.
/// Entity implementations must return a [Value::Document] from `to_value`.
pub trait Convertible {
    type Output;

    fn to_value(&self) -> EntidocResult<Value>;
    fn from_value(value: &Value) -> EntidocResult<Self::Output>;

    /// Lenient conversion used for scalar projection results: a value that
    /// has no representation in the target type yields `None` instead of an
    /// error, and the caller skips it.
    fn convert_value(value: &Value) -> Option<Self::Output> {
        Self::from_value(value).ok()
    }
}

impl Convertible for bool {
    type Output = bool;

    fn to_value(&self) -> EntidocResult<Value> {
        Ok(Value::Bool(*self))
    }

    fn from_value(value: &Value) -> EntidocResult<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            _ => {
                log::error!("Value {} is not a bool", value);
                Err(EntidocError::new(
                    "Value is not a bool",
                    ErrorKind::ObjectMappingError,
                ))
            }
        }
    }
}

impl Convertible for i32 {
    type Output = i32;

    fn to_value(&self) -> EntidocResult<Value> {
        Ok(Value::I32(*self))
    }

    fn from_value(value: &Value) -> EntidocResult<Self> {
        match value {
            Value::I32(i) => Ok(*i),
            _ => {
                log::error!("Value {} is not an i32", value);
                Err(EntidocError::new(
                    "Value is not an i32",
                    ErrorKind::ObjectMappingError,
                ))
            }
        }
    }
}

impl Convertible for i64 {
    type Output = i64;

    fn to_value(&self) -> EntidocResult<Value> {
        Ok(Value::I64(*self))
    }

    fn from_value(value: &Value) -> EntidocResult<Self> {
        match value {
            Value::I64(i) => Ok(*i),
            _ => {
                log::error!("Value {} is not an i64", value);
                Err(EntidocError::new(
                    "Value is not an i64",
                    ErrorKind::ObjectMappingError,
                ))
            }
        }
    }

    // Stores commonly narrow small integers; widen them back.
    fn convert_value(value: &Value) -> Option<i64> {
        match value {
            Value::I32(i) => Some(*i as i64),
            Value::I64(i) => Some(*i),
            _ => None,
        }
    }
}

impl Convertible for f64 {
    type Output = f64;

    fn to_value(&self) -> EntidocResult<Value> {
        Ok(Value::F64(*self))
    }

    fn from_value(value: &Value) -> EntidocResult<Self> {
        match value {
            Value::F64(f) => Ok(*f),
            _ => {
                log::error!("Value {} is not an f64", value);
                Err(EntidocError::new(
                    "Value is not an f64",
                    ErrorKind::ObjectMappingError,
                ))
            }
        }
    }

    fn convert_value(value: &Value) -> Option<f64> {
        match value {
            Value::I32(i) => Some(*i as f64),
            Value::I64(i) => Some(*i as f64),
            Value::F64(f) => Some(*f),
            _ => None,
        }
    }
}

impl Convertible for String {
    type Output = String;

    fn to_value(&self) -> EntidocResult<Value> {
        Ok(Value::String(self.clone()))
    }

    fn from_value(value: &Value) -> EntidocResult<Self> {
        match value {
            Value::String(s) => Ok(s.clone()),
            _ => {
                log::error!("Value {} is not a string", value);
                Err(EntidocError::new(
                    "Value is not a string",
                    ErrorKind::ObjectMappingError,
                ))
            }
        }
    }

    fn convert_value(value: &Value) -> Option<String> {
        value.as_text()
    }
}
