use quiver_array::array::{Array, NullArray, PrimitiveArray};
use quiver_array::datatype::{DataType, DataTypeId};
use quiver_error::{ErrorKind, QuiverError, Result};

use super::util::check_input_lens;
use crate::expr::FunctionOptions;
use crate::functions::{check_num_args, check_options, ScalarKernel, Signature};

const SIGNATURES: &[Signature] = &[
    Signature {
        input: &[DataTypeId::Int32],
        return_type: DataTypeId::Int32,
    },
    Signature {
        input: &[DataTypeId::Int64],
        return_type: DataTypeId::Int64,
    },
    Signature {
        input: &[DataTypeId::Float64],
        return_type: DataTypeId::Float64,
    },
];

fn check_numeric(kernel: &dyn ScalarKernel, ty: &DataType) -> Result<()> {
    if !ty.is_numeric() && *ty != DataType::Null {
        return Err(QuiverError::with_kind(
            ErrorKind::Kernel,
            format!("{} expects a numeric input, got {ty}", kernel.name()),
        ));
    }
    Ok(())
}

fn try_unary_primitive<T, F>(arr: &PrimitiveArray<T>, f: F) -> Result<PrimitiveArray<T>>
where
    T: Copy + Default,
    F: Fn(T) -> Result<T>,
{
    let mut values = Vec::with_capacity(arr.len());
    for idx in 0..arr.len() {
        if arr.is_valid(idx).unwrap_or(false) {
            values.push(f(arr.values()[idx])?);
        } else {
            values.push(T::default());
        }
    }
    Ok(PrimitiveArray::new(values, arr.validity().cloned()))
}

fn overflow(name: &str) -> QuiverError {
    QuiverError::with_kind(ErrorKind::Kernel, format!("Integer overflow in {name}"))
}

/// Absolute value.
#[derive(Debug, Clone, Copy)]
pub struct Abs;

impl ScalarKernel for Abs {
    fn name(&self) -> &'static str {
        "abs"
    }

    fn signatures(&self) -> &[Signature] {
        SIGNATURES
    }

    fn return_type(&self, inputs: &[DataType]) -> Result<DataType> {
        check_num_args(self, inputs.len(), 1)?;
        check_numeric(self, &inputs[0])?;
        Ok(inputs[0])
    }

    fn execute(
        &self,
        inputs: &[&Array],
        options: &FunctionOptions,
        num_rows: usize,
    ) -> Result<Array> {
        check_num_args(self, inputs.len(), 1)?;
        check_options(self, options, &[])?;
        check_input_lens(self.name(), inputs, num_rows)?;

        Ok(match inputs[0] {
            Array::Null(arr) => Array::Null(NullArray::new(arr.len())),
            Array::Int32(arr) => Array::Int32(try_unary_primitive(arr, |v| {
                v.checked_abs().ok_or_else(|| overflow(self.name()))
            })?),
            Array::Int64(arr) => Array::Int64(try_unary_primitive(arr, |v| {
                v.checked_abs().ok_or_else(|| overflow(self.name()))
            })?),
            Array::Float64(arr) => {
                Array::Float64(try_unary_primitive(arr, |v| Ok(v.abs()))?)
            }
            other => {
                check_numeric(self, &other.datatype())?;
                unreachable!("non-numeric rejected above")
            }
        })
    }
}

/// Numeric negation.
#[derive(Debug, Clone, Copy)]
pub struct Negate;

impl ScalarKernel for Negate {
    fn name(&self) -> &'static str {
        "negate"
    }

    fn signatures(&self) -> &[Signature] {
        SIGNATURES
    }

    fn return_type(&self, inputs: &[DataType]) -> Result<DataType> {
        check_num_args(self, inputs.len(), 1)?;
        check_numeric(self, &inputs[0])?;
        Ok(inputs[0])
    }

    fn execute(
        &self,
        inputs: &[&Array],
        options: &FunctionOptions,
        num_rows: usize,
    ) -> Result<Array> {
        check_num_args(self, inputs.len(), 1)?;
        check_options(self, options, &[])?;
        check_input_lens(self.name(), inputs, num_rows)?;

        Ok(match inputs[0] {
            Array::Null(arr) => Array::Null(NullArray::new(arr.len())),
            Array::Int32(arr) => Array::Int32(try_unary_primitive(arr, |v| {
                v.checked_neg().ok_or_else(|| overflow(self.name()))
            })?),
            Array::Int64(arr) => Array::Int64(try_unary_primitive(arr, |v| {
                v.checked_neg().ok_or_else(|| overflow(self.name()))
            })?),
            Array::Float64(arr) => Array::Float64(try_unary_primitive(arr, |v| Ok(-v))?),
            other => {
                check_numeric(self, &other.datatype())?;
                unreachable!("non-numeric rejected above")
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use quiver_array::array::Int64Array;

    use super::*;

    #[test]
    fn abs_preserves_nulls() {
        let arr = Array::Int64(Int64Array::from_iter([Some(-3), None, Some(2)]));
        let out = Abs.execute(&[&arr], &FunctionOptions::new(), 3).unwrap();
        let expected = Array::Int64(Int64Array::from_iter([Some(3), None, Some(2)]));
        assert_eq!(expected, out);
    }

    #[test]
    fn negate_non_numeric_errors() {
        let arr = Array::Utf8(quiver_array::array::Utf8Array::from_iter(["x"]));
        let err = Negate
            .execute(&[&arr], &FunctionOptions::new(), 1)
            .unwrap_err();
        assert_eq!(ErrorKind::Kernel, err.kind());
    }
}
