use quiver_error::{QuiverError, Result};

use crate::array::{Array, BooleanArray, NullArray, PrimitiveArray, Utf8Array};
use crate::bitmap::Bitmap;

/// Filter an array using the given selection bitmap.
///
/// Rows are kept in their original order; no reordering happens.
pub fn filter(arr: &Array, selection: &Bitmap) -> Result<Array> {
    if arr.len() != selection.len() {
        return Err(QuiverError::new(format!(
            "Selection length doesn't equal array length, got {}, want {}",
            selection.len(),
            arr.len()
        )));
    }

    Ok(match arr {
        Array::Null(_) => Array::Null(NullArray::new(selection.count_trues())),
        Array::Boolean(arr) => Array::Boolean(filter_boolean(arr, selection)),
        Array::Int32(arr) => Array::Int32(filter_primitive(arr, selection)),
        Array::Int64(arr) => Array::Int64(filter_primitive(arr, selection)),
        Array::Float64(arr) => Array::Float64(filter_primitive(arr, selection)),
        Array::Utf8(arr) => Array::Utf8(filter_varlen(arr, selection)),
    })
}

fn filter_boolean(arr: &BooleanArray, selection: &Bitmap) -> BooleanArray {
    let values: Bitmap = arr
        .values()
        .iter()
        .zip(selection.iter())
        .filter_map(|(v, take)| if take { Some(v) } else { None })
        .collect();

    let validity = filter_validity(arr.validity(), selection);

    BooleanArray::new(values, validity)
}

fn filter_primitive<T: Copy>(arr: &PrimitiveArray<T>, selection: &Bitmap) -> PrimitiveArray<T> {
    let values: Vec<_> = arr
        .values()
        .iter()
        .zip(selection.iter())
        .filter_map(|(v, take)| if take { Some(*v) } else { None })
        .collect();

    let validity = filter_validity(arr.validity(), selection);

    PrimitiveArray::new(values, validity)
}

fn filter_varlen(arr: &Utf8Array, selection: &Bitmap) -> Utf8Array {
    match arr.validity() {
        Some(validity) => (0..arr.len())
            .zip(selection.iter())
            .filter_map(|(idx, take)| {
                if take {
                    let val = if validity.value(idx) {
                        arr.value(idx)
                    } else {
                        None
                    };
                    Some(val)
                } else {
                    None
                }
            })
            .collect(),
        None => arr
            .values_iter()
            .zip(selection.iter())
            .filter_map(|(v, take)| if take { Some(v) } else { None })
            .collect(),
    }
}

fn filter_validity(validity: Option<&Bitmap>, selection: &Bitmap) -> Option<Bitmap> {
    validity.map(|validity| {
        validity
            .iter()
            .zip(selection.iter())
            .filter_map(|(v, take)| if take { Some(v) } else { None })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::Int32Array;

    #[test]
    fn simple_filter_primitive() {
        let arr = Array::Int32(Int32Array::from_iter([6, 7, 8, 9]));
        let selection = Bitmap::from_iter([true, false, true, false]);

        let filtered = filter(&arr, &selection).unwrap();
        let expected = Array::Int32(Int32Array::from_iter([6, 8]));
        assert_eq!(expected, filtered);
    }

    #[test]
    fn filter_primitive_with_nulls() {
        let arr = Array::Int32(Int32Array::from_iter([Some(6), Some(7), None, None]));
        let selection = Bitmap::from_iter([true, false, true, false]);

        let filtered = filter(&arr, &selection).unwrap();
        let expected = Array::Int32(Int32Array::from_iter([Some(6), None]));
        assert_eq!(expected, filtered);
    }

    #[test]
    fn filter_varlen_with_nulls() {
        let arr = Array::Utf8(Utf8Array::from_iter([Some("aaa"), None, Some("ccc"), None]));
        let selection = Bitmap::from_iter([true, true, true, false]);

        let filtered = filter(&arr, &selection).unwrap();
        let expected = Array::Utf8(Utf8Array::from_iter([Some("aaa"), None, Some("ccc")]));
        assert_eq!(expected, filtered);
    }

    #[test]
    fn length_mismatch_errors() {
        let arr = Array::Int32(Int32Array::from_iter([1, 2]));
        let selection = Bitmap::from_iter([true]);
        filter(&arr, &selection).unwrap_err();
    }
}
