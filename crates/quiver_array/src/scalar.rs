use std::fmt;

use serde::{Deserialize, Serialize};

use crate::array::{Array, BooleanArray, Float64Array, Int32Array, Int64Array, NullArray, Utf8Array};
use crate::bitmap::Bitmap;
use crate::datatype::DataType;

/// A single owned scalar value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    Null,
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    Utf8(String),
}

impl ScalarValue {
    pub fn datatype(&self) -> DataType {
        match self {
            ScalarValue::Null => DataType::Null,
            ScalarValue::Boolean(_) => DataType::Boolean,
            ScalarValue::Int32(_) => DataType::Int32,
            ScalarValue::Int64(_) => DataType::Int64,
            ScalarValue::Float64(_) => DataType::Float64,
            ScalarValue::Utf8(_) => DataType::Utf8,
        }
    }

    /// Broadcast this scalar into an array of the given length.
    pub fn as_array(&self, len: usize) -> Array {
        match self {
            ScalarValue::Null => Array::Null(NullArray::new(len)),
            ScalarValue::Boolean(v) => {
                Array::Boolean(BooleanArray::new(Bitmap::new_with_val(*v, len), None))
            }
            ScalarValue::Int32(v) => Array::Int32(Int32Array::from_iter(
                std::iter::repeat(*v).take(len),
            )),
            ScalarValue::Int64(v) => Array::Int64(Int64Array::from_iter(
                std::iter::repeat(*v).take(len),
            )),
            ScalarValue::Float64(v) => Array::Float64(Float64Array::from_iter(
                std::iter::repeat(*v).take(len),
            )),
            ScalarValue::Utf8(v) => {
                Array::Utf8(Utf8Array::from_iter(std::iter::repeat(v.as_str()).take(len)))
            }
        }
    }

    pub fn try_as_bool(&self) -> Option<bool> {
        match self {
            ScalarValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Null => write!(f, "NULL"),
            ScalarValue::Boolean(v) => write!(f, "{v}"),
            ScalarValue::Int32(v) => write!(f, "{v}"),
            ScalarValue::Int64(v) => write!(f, "{v}"),
            ScalarValue::Float64(v) => write!(f, "{v}"),
            ScalarValue::Utf8(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        ScalarValue::Boolean(v)
    }
}

impl From<i32> for ScalarValue {
    fn from(v: i32) -> Self {
        ScalarValue::Int32(v)
    }
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        ScalarValue::Int64(v)
    }
}

impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        ScalarValue::Float64(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::Utf8(v.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        ScalarValue::Utf8(v)
    }
}
