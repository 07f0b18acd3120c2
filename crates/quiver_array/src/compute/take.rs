use quiver_error::{QuiverError, Result};

use crate::array::{Array, BooleanArray, NullArray, PrimitiveArray, Utf8Array};
use crate::bitmap::Bitmap;

/// Gather values from an array at the given indices.
///
/// Output length equals `indices.len()`, in index order.
pub fn take(arr: &Array, indices: &[usize]) -> Result<Array> {
    if let Some(&idx) = indices.iter().find(|&&idx| idx >= arr.len()) {
        return Err(QuiverError::new(format!(
            "Take index {idx} out of bounds for array of length {}",
            arr.len()
        )));
    }

    Ok(match arr {
        Array::Null(_) => Array::Null(NullArray::new(indices.len())),
        Array::Boolean(arr) => Array::Boolean(take_boolean(arr, indices)),
        Array::Int32(arr) => Array::Int32(take_primitive(arr, indices)),
        Array::Int64(arr) => Array::Int64(take_primitive(arr, indices)),
        Array::Float64(arr) => Array::Float64(take_primitive(arr, indices)),
        Array::Utf8(arr) => Array::Utf8(take_varlen(arr, indices)),
    })
}

fn take_primitive<T: Copy>(arr: &PrimitiveArray<T>, indices: &[usize]) -> PrimitiveArray<T> {
    let values: Vec<T> = indices.iter().map(|&idx| arr.values()[idx]).collect();
    let validity = take_validity(arr.validity(), indices);
    PrimitiveArray::new(values, validity)
}

fn take_boolean(arr: &BooleanArray, indices: &[usize]) -> BooleanArray {
    let values: Bitmap = indices.iter().map(|&idx| arr.values().value(idx)).collect();
    let validity = take_validity(arr.validity(), indices);
    BooleanArray::new(values, validity)
}

fn take_varlen(arr: &Utf8Array, indices: &[usize]) -> Utf8Array {
    match arr.validity() {
        Some(validity) => indices
            .iter()
            .map(|&idx| {
                if validity.value(idx) {
                    arr.value(idx)
                } else {
                    None
                }
            })
            .collect(),
        None => indices.iter().filter_map(|&idx| arr.value(idx)).collect(),
    }
}

fn take_validity(validity: Option<&Bitmap>, indices: &[usize]) -> Option<Bitmap> {
    validity.map(|validity| indices.iter().map(|&idx| validity.value(idx)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::Int64Array;

    #[test]
    fn take_reorders() {
        let arr = Array::Int64(Int64Array::from_iter([10, 20, 30]));
        let got = take(&arr, &[2, 0, 1, 0]).unwrap();
        assert_eq!(Array::Int64(Int64Array::from_iter([30, 10, 20, 10])), got);
    }

    #[test]
    fn take_out_of_bounds() {
        let arr = Array::Int64(Int64Array::from_iter([10]));
        take(&arr, &[1]).unwrap_err();
    }
}
