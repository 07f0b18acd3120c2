use std::cmp::Ordering;

use quiver_error::{QuiverError, Result};

use crate::array::Array;

/// A single sort key.
#[derive(Debug, Clone, Copy)]
pub struct SortColumn<'a> {
    pub array: &'a Array,
    pub desc: bool,
}

/// Compute a stable multi-key sort permutation over the given columns.
///
/// Returns row indices in sorted order. Rows comparing equal on every
/// key keep their original relative order. Nulls sort first for
/// ascending keys and last for descending keys.
pub fn sort_permutation(keys: &[SortColumn], num_rows: usize) -> Result<Vec<usize>> {
    if keys.is_empty() {
        return Err(QuiverError::new("Cannot sort with zero sort keys"));
    }
    for key in keys {
        if key.array.len() != num_rows {
            return Err(QuiverError::new(format!(
                "Sort key length {} doesn't match row count {num_rows}",
                key.array.len()
            )));
        }
    }

    let mut indices: Vec<usize> = (0..num_rows).collect();
    // Stable sort keeps ties in source order.
    indices.sort_by(|&a, &b| {
        for key in keys {
            let ord = cmp_rows(key.array, a, b);
            let ord = if key.desc { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });

    Ok(indices)
}

/// Compare two rows within a single array, nulls first.
fn cmp_rows(arr: &Array, a: usize, b: usize) -> Ordering {
    let a_valid = arr.is_valid(a).unwrap_or(false);
    let b_valid = arr.is_valid(b).unwrap_or(false);
    match (a_valid, b_valid) {
        (false, false) => return Ordering::Equal,
        (false, true) => return Ordering::Less,
        (true, false) => return Ordering::Greater,
        (true, true) => (),
    }

    match arr {
        Array::Null(_) => Ordering::Equal,
        Array::Boolean(arr) => arr.value(a).cmp(&arr.value(b)),
        Array::Int32(arr) => arr.value(a).cmp(&arr.value(b)),
        Array::Int64(arr) => arr.value(a).cmp(&arr.value(b)),
        Array::Float64(arr) => match (arr.value(a), arr.value(b)) {
            (Some(a), Some(b)) => a.total_cmp(b),
            (a, b) => a.is_some().cmp(&b.is_some()),
        },
        Array::Utf8(arr) => arr.value(a).cmp(&arr.value(b)),
    }
}
