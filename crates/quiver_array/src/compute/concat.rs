use quiver_error::{QuiverError, Result};

use crate::array::{Array, BooleanArray, NullArray, PrimitiveArray, Utf8Array};
use crate::bitmap::Bitmap;

/// Concat multiple arrays into a single array.
///
/// All arrays must be of the same type.
pub fn concat(arrays: &[&Array]) -> Result<Array> {
    if arrays.is_empty() {
        return Err(QuiverError::new("Cannot concat zero arrays"));
    }

    let datatype = arrays[0].datatype();
    for arr in arrays {
        if arr.datatype() != datatype {
            return Err(QuiverError::new(format!(
                "Cannot concat arrays of different types, got {} and {}",
                datatype,
                arr.datatype()
            )));
        }
    }

    Ok(match arrays[0] {
        Array::Null(_) => Array::Null(NullArray::new(arrays.iter().map(|a| a.len()).sum())),
        Array::Boolean(_) => {
            let arrs: Vec<_> = arrays
                .iter()
                .map(|a| match a {
                    Array::Boolean(arr) => arr,
                    _ => unreachable!("type checked above"),
                })
                .collect();
            Array::Boolean(concat_boolean(&arrs))
        }
        Array::Int32(_) => {
            let arrs: Vec<_> = arrays
                .iter()
                .map(|a| match a {
                    Array::Int32(arr) => arr,
                    _ => unreachable!("type checked above"),
                })
                .collect();
            Array::Int32(concat_primitive(&arrs))
        }
        Array::Int64(_) => {
            let arrs: Vec<_> = arrays
                .iter()
                .map(|a| match a {
                    Array::Int64(arr) => arr,
                    _ => unreachable!("type checked above"),
                })
                .collect();
            Array::Int64(concat_primitive(&arrs))
        }
        Array::Float64(_) => {
            let arrs: Vec<_> = arrays
                .iter()
                .map(|a| match a {
                    Array::Float64(arr) => arr,
                    _ => unreachable!("type checked above"),
                })
                .collect();
            Array::Float64(concat_primitive(&arrs))
        }
        Array::Utf8(_) => {
            let arrs: Vec<_> = arrays
                .iter()
                .map(|a| match a {
                    Array::Utf8(arr) => arr,
                    _ => unreachable!("type checked above"),
                })
                .collect();
            Array::Utf8(concat_varlen(&arrs))
        }
    })
}

fn concat_validities<'a, I>(parts: I) -> Option<Bitmap>
where
    I: IntoIterator<Item = (usize, Option<&'a Bitmap>)>,
{
    let parts: Vec<_> = parts.into_iter().collect();
    if parts.iter().all(|(_, v)| v.is_none()) {
        return None;
    }

    let mut out = Bitmap::new();
    for (len, validity) in parts {
        match validity {
            Some(validity) => validity.iter().for_each(|v| out.push(v)),
            None => (0..len).for_each(|_| out.push(true)),
        }
    }
    Some(out)
}

fn concat_primitive<T: Copy>(arrays: &[&PrimitiveArray<T>]) -> PrimitiveArray<T> {
    let values: Vec<T> = arrays
        .iter()
        .flat_map(|arr| arr.values().iter().copied())
        .collect();

    let validity = concat_validities(arrays.iter().map(|arr| (arr.len(), arr.validity())));

    PrimitiveArray::new(values, validity)
}

fn concat_boolean(arrays: &[&BooleanArray]) -> BooleanArray {
    let values: Bitmap = arrays.iter().flat_map(|arr| arr.values().iter()).collect();
    let validity = concat_validities(arrays.iter().map(|arr| (arr.len(), arr.validity())));
    BooleanArray::new(values, validity)
}

fn concat_varlen(arrays: &[&Utf8Array]) -> Utf8Array {
    let any_validity = arrays.iter().any(|arr| arr.validity().is_some());
    if any_validity {
        arrays
            .iter()
            .flat_map(|arr| {
                (0..arr.len()).map(move |idx| {
                    if arr.is_valid(idx).unwrap_or(false) {
                        arr.value(idx)
                    } else {
                        None
                    }
                })
            })
            .collect()
    } else {
        arrays.iter().flat_map(|arr| arr.values_iter()).collect()
    }
}
