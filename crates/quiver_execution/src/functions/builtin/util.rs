use quiver_array::array::{Array, PrimitiveArray, Utf8Array};
use quiver_array::bitmap::Bitmap;
use quiver_array::compute::cast::cast;
use quiver_array::datatype::{common_type, DataType};
use quiver_error::{ErrorKind, QuiverError, Result};

/// Promote a pair of arrays to their common type, copying only when a
/// cast is required.
pub(crate) fn promote_pair(left: &Array, right: &Array) -> Result<(Array, Array, DataType)> {
    let ty = common_type(&left.datatype(), &right.datatype()).ok_or_else(|| {
        QuiverError::with_kind(
            ErrorKind::Kernel,
            format!(
                "No common type for inputs: {} and {}",
                left.datatype(),
                right.datatype()
            ),
        )
    })?;

    Ok((cast(left, &ty)?, cast(right, &ty)?, ty))
}

/// Null union: valid only where both sides are valid.
pub(crate) fn union_validity(
    a: Option<&Bitmap>,
    b: Option<&Bitmap>,
    len: usize,
) -> Option<Bitmap> {
    match (a, b) {
        (None, None) => None,
        (Some(a), None) => Some(a.clone()),
        (None, Some(b)) => Some(b.clone()),
        (Some(a), Some(b)) => Some((0..len).map(|idx| a.value(idx) && b.value(idx)).collect()),
    }
}

/// Apply a fallible binary op element-wise over two same-typed
/// primitive arrays. The op is skipped for rows where either side is
/// null; those rows get the default value and a null validity bit.
pub(crate) fn try_binary_primitive<T, U, F>(
    a: &PrimitiveArray<T>,
    b: &PrimitiveArray<T>,
    f: F,
) -> Result<(Vec<U>, Option<Bitmap>)>
where
    T: Copy,
    U: Default,
    F: Fn(T, T) -> Result<U>,
{
    let len = a.len();
    let validity = union_validity(a.validity(), b.validity(), len);

    let mut values = Vec::with_capacity(len);
    for idx in 0..len {
        let valid = validity.as_ref().map(|v| v.value(idx)).unwrap_or(true);
        if valid {
            values.push(f(a.values()[idx], b.values()[idx])?);
        } else {
            values.push(U::default());
        }
    }

    Ok((values, validity))
}

/// Element-wise binary op over two utf8 arrays producing bools.
pub(crate) fn binary_utf8_bool<F>(
    a: &Utf8Array,
    b: &Utf8Array,
    f: F,
) -> (Vec<bool>, Option<Bitmap>)
where
    F: Fn(&str, &str) -> bool,
{
    let len = a.len();
    let validity = union_validity(a.validity(), b.validity(), len);

    let values = (0..len)
        .map(|idx| {
            let valid = validity.as_ref().map(|v| v.value(idx)).unwrap_or(true);
            if valid {
                f(a.value(idx).unwrap_or(""), b.value(idx).unwrap_or(""))
            } else {
                false
            }
        })
        .collect();

    (values, validity)
}

pub(crate) fn length_mismatch(name: &str, got: usize, want: usize) -> QuiverError {
    QuiverError::with_kind(
        ErrorKind::Kernel,
        format!("Input length mismatch for {name}: got {got}, want {want}"),
    )
}

/// Verify every input has the expected row count.
pub(crate) fn check_input_lens(name: &str, inputs: &[&Array], num_rows: usize) -> Result<()> {
    for input in inputs {
        if input.len() != num_rows {
            return Err(length_mismatch(name, input.len(), num_rows));
        }
    }
    Ok(())
}
