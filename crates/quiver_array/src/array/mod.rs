mod boolean;
mod null;
mod primitive;
mod varlen;

pub use boolean::BooleanArray;
pub use null::NullArray;
pub use primitive::{Float64Array, Int32Array, Int64Array, PrimitiveArray};
pub use varlen::Utf8Array;

use crate::bitmap::Bitmap;
use crate::datatype::DataType;
use crate::scalar::ScalarValue;

/// A single contiguous chunk of typed values.
#[derive(Debug, Clone, PartialEq)]
pub enum Array {
    Null(NullArray),
    Boolean(BooleanArray),
    Int32(Int32Array),
    Int64(Int64Array),
    Float64(Float64Array),
    Utf8(Utf8Array),
}

impl Array {
    pub fn datatype(&self) -> DataType {
        match self {
            Array::Null(_) => DataType::Null,
            Array::Boolean(_) => DataType::Boolean,
            Array::Int32(_) => DataType::Int32,
            Array::Int64(_) => DataType::Int64,
            Array::Float64(_) => DataType::Float64,
            Array::Utf8(_) => DataType::Utf8,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Array::Null(arr) => arr.len(),
            Array::Boolean(arr) => arr.len(),
            Array::Int32(arr) => arr.len(),
            Array::Int64(arr) => arr.len(),
            Array::Float64(arr) => arr.len(),
            Array::Utf8(arr) => arr.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_valid(&self, idx: usize) -> Option<bool> {
        match self {
            Array::Null(arr) => {
                if idx >= arr.len() {
                    return None;
                }
                Some(false)
            }
            Array::Boolean(arr) => arr.is_valid(idx),
            Array::Int32(arr) => arr.is_valid(idx),
            Array::Int64(arr) => arr.is_valid(idx),
            Array::Float64(arr) => arr.is_valid(idx),
            Array::Utf8(arr) => arr.is_valid(idx),
        }
    }

    /// Get the logical value at the given index, taking validity into
    /// account.
    pub fn scalar(&self, idx: usize) -> Option<ScalarValue> {
        if idx >= self.len() {
            return None;
        }
        if !self.is_valid(idx)? {
            return Some(ScalarValue::Null);
        }

        Some(match self {
            Array::Null(_) => ScalarValue::Null,
            Array::Boolean(arr) => ScalarValue::Boolean(arr.value(idx)?),
            Array::Int32(arr) => ScalarValue::Int32(*arr.value(idx)?),
            Array::Int64(arr) => ScalarValue::Int64(*arr.value(idx)?),
            Array::Float64(arr) => ScalarValue::Float64(*arr.value(idx)?),
            Array::Utf8(arr) => ScalarValue::Utf8(arr.value(idx)?.to_string()),
        })
    }

    /// Create an all-null array of the given type and length.
    pub fn new_nulls(datatype: &DataType, len: usize) -> Array {
        match datatype {
            DataType::Null | DataType::Unknown => Array::Null(NullArray::new(len)),
            DataType::Boolean => Array::Boolean(BooleanArray::new_nulls(len)),
            DataType::Int32 => Array::Int32(Int32Array::new_nulls(len)),
            DataType::Int64 => Array::Int64(Int64Array::new_nulls(len)),
            DataType::Float64 => Array::Float64(Float64Array::new_nulls(len)),
            DataType::Utf8 => Array::Utf8(Utf8Array::new_nulls(len)),
        }
    }
}

/// Check validity at an index against an optional bitmap, a missing
/// bitmap means all values are valid.
pub(crate) fn is_valid(validity: Option<&Bitmap>, idx: usize) -> bool {
    match validity {
        Some(bm) => bm.value(idx),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_respects_validity() {
        let arr = Array::Int64(Int64Array::from_iter([Some(1), None]));
        assert_eq!(Some(ScalarValue::Int64(1)), arr.scalar(0));
        assert_eq!(Some(ScalarValue::Null), arr.scalar(1));
        assert_eq!(None, arr.scalar(2));
    }
}
