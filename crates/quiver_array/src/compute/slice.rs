use quiver_error::{QuiverError, Result};

use crate::array::{Array, BooleanArray, NullArray, PrimitiveArray, Utf8Array};
use crate::bitmap::Bitmap;

/// Slice an array at the given range.
pub fn slice(arr: &Array, start: usize, count: usize) -> Result<Array> {
    if start + count > arr.len() {
        return Err(QuiverError::new(format!(
            "Slice range out of bounds, start: {start}, count: {count}, len: {}",
            arr.len()
        )));
    }

    Ok(match arr {
        Array::Null(_) => Array::Null(NullArray::new(count)),
        Array::Boolean(arr) => Array::Boolean(slice_boolean(arr, start, count)),
        Array::Int32(arr) => Array::Int32(slice_primitive(arr, start, count)),
        Array::Int64(arr) => Array::Int64(slice_primitive(arr, start, count)),
        Array::Float64(arr) => Array::Float64(slice_primitive(arr, start, count)),
        Array::Utf8(arr) => Array::Utf8(slice_varlen(arr, start, count)),
    })
}

fn slice_boolean(arr: &BooleanArray, start: usize, count: usize) -> BooleanArray {
    let values: Bitmap = arr.values().iter().skip(start).take(count).collect();
    let validity = slice_validity(arr.validity(), start, count);
    BooleanArray::new(values, validity)
}

fn slice_primitive<T: Copy>(arr: &PrimitiveArray<T>, start: usize, count: usize) -> PrimitiveArray<T> {
    let values = arr.values()[start..start + count].to_vec();
    let validity = slice_validity(arr.validity(), start, count);
    PrimitiveArray::new(values, validity)
}

fn slice_varlen(arr: &Utf8Array, start: usize, count: usize) -> Utf8Array {
    (start..start + count)
        .map(|idx| {
            if arr.is_valid(idx).unwrap_or(false) {
                arr.value(idx)
            } else {
                None
            }
        })
        .collect()
}

fn slice_validity(validity: Option<&Bitmap>, start: usize, count: usize) -> Option<Bitmap> {
    validity.map(|validity| validity.iter().skip(start).take(count).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::Int64Array;

    #[test]
    fn slice_middle() {
        let arr = Array::Int64(Int64Array::from_iter([1, 2, 3, 4, 5]));
        let out = slice(&arr, 1, 3).unwrap();
        assert_eq!(Array::Int64(Int64Array::from_iter([2, 3, 4])), out);
    }

    #[test]
    fn slice_out_of_bounds() {
        let arr = Array::Int64(Int64Array::from_iter([1, 2]));
        slice(&arr, 1, 2).unwrap_err();
    }
}
