use quiver_error::{ErrorKind, QuiverError, Result};

use crate::array::{Array, PrimitiveArray};
use crate::datatype::DataType;

/// Cast an array to another type.
///
/// Only identity casts and promotion casts along the numeric lattice
/// (`Int32 -> Int64 -> Float64`) are supported, plus casting an
/// all-null array to any type. Anything else is a kernel error.
pub fn cast(arr: &Array, to: &DataType) -> Result<Array> {
    if &arr.datatype() == to {
        return Ok(arr.clone());
    }

    Ok(match (arr, to) {
        (Array::Null(arr), to) => Array::new_nulls(to, arr.len()),
        (Array::Int32(arr), DataType::Int64) => {
            Array::Int64(cast_primitive(arr, |v| v as i64))
        }
        (Array::Int32(arr), DataType::Float64) => {
            Array::Float64(cast_primitive(arr, |v| v as f64))
        }
        (Array::Int64(arr), DataType::Float64) => {
            Array::Float64(cast_primitive(arr, |v| v as f64))
        }
        (arr, to) => {
            return Err(QuiverError::with_kind(
                ErrorKind::Kernel,
                format!("Unsupported cast from {} to {}", arr.datatype(), to),
            ))
        }
    })
}

fn cast_primitive<T: Copy, U, F: Fn(T) -> U>(arr: &PrimitiveArray<T>, f: F) -> PrimitiveArray<U> {
    let values: Vec<U> = arr.values().iter().map(|v| f(*v)).collect();
    PrimitiveArray::new(values, arr.validity().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::{Float64Array, Int32Array, Int64Array};

    #[test]
    fn promote_int32_to_float64() {
        let arr = Array::Int32(Int32Array::from_iter([Some(1), None, Some(3)]));
        let got = cast(&arr, &DataType::Float64).unwrap();
        let expected = Array::Float64(Float64Array::from_iter([Some(1.0), None, Some(3.0)]));
        assert_eq!(expected, got);
    }

    #[test]
    fn null_casts_to_anything() {
        let arr = Array::new_nulls(&DataType::Null, 3);
        let got = cast(&arr, &DataType::Utf8).unwrap();
        assert_eq!(DataType::Utf8, got.datatype());
        assert_eq!(3, got.len());
        assert_eq!(Some(false), got.is_valid(0));
    }

    #[test]
    fn demotion_is_an_error() {
        let arr = Array::Int64(Int64Array::from_iter([1]));
        let err = cast(&arr, &DataType::Int32).unwrap_err();
        assert_eq!(ErrorKind::Kernel, err.kind());
    }
}
