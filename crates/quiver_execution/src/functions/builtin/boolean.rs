use quiver_array::array::{Array, BooleanArray};
use quiver_array::bitmap::Bitmap;
use quiver_array::datatype::{DataType, DataTypeId};
use quiver_error::{ErrorKind, QuiverError, Result};

use super::util::{check_input_lens, union_validity};
use crate::expr::FunctionOptions;
use crate::functions::{check_num_args, check_options, ScalarKernel, Signature};

fn expect_boolean<'a>(name: &str, arr: &'a Array) -> Result<&'a BooleanArray> {
    match arr {
        Array::Boolean(arr) => Ok(arr),
        other => Err(QuiverError::with_kind(
            ErrorKind::Kernel,
            format!("{name} expects boolean inputs, got {}", other.datatype()),
        )),
    }
}

const BINARY_SIGNATURES: &[Signature] = &[Signature {
    input: &[DataTypeId::Boolean, DataTypeId::Boolean],
    return_type: DataTypeId::Boolean,
}];

const UNARY_SIGNATURES: &[Signature] = &[Signature {
    input: &[DataTypeId::Boolean],
    return_type: DataTypeId::Boolean,
}];

/// Logical conjunction, null-propagating.
#[derive(Debug, Clone, Copy)]
pub struct And;

/// Logical disjunction, null-propagating.
#[derive(Debug, Clone, Copy)]
pub struct Or;

/// Logical negation.
#[derive(Debug, Clone, Copy)]
pub struct Not;

fn binary_bool(
    kernel: &dyn ScalarKernel,
    inputs: &[&Array],
    options: &FunctionOptions,
    num_rows: usize,
    f: impl Fn(bool, bool) -> bool,
) -> Result<Array> {
    check_num_args(kernel, inputs.len(), 2)?;
    check_options(kernel, options, &[])?;
    check_input_lens(kernel.name(), inputs, num_rows)?;

    let a = expect_boolean(kernel.name(), inputs[0])?;
    let b = expect_boolean(kernel.name(), inputs[1])?;

    let validity = union_validity(a.validity(), b.validity(), num_rows);
    let values: Bitmap = (0..num_rows)
        .map(|idx| f(a.values().value(idx), b.values().value(idx)))
        .collect();

    Ok(Array::Boolean(BooleanArray::new(values, validity)))
}

impl ScalarKernel for And {
    fn name(&self) -> &'static str {
        "and"
    }

    fn signatures(&self) -> &[Signature] {
        BINARY_SIGNATURES
    }

    fn return_type(&self, inputs: &[DataType]) -> Result<DataType> {
        check_num_args(self, inputs.len(), 2)?;
        Ok(DataType::Boolean)
    }

    fn execute(
        &self,
        inputs: &[&Array],
        options: &FunctionOptions,
        num_rows: usize,
    ) -> Result<Array> {
        binary_bool(self, inputs, options, num_rows, |a, b| a && b)
    }
}

impl ScalarKernel for Or {
    fn name(&self) -> &'static str {
        "or"
    }

    fn signatures(&self) -> &[Signature] {
        BINARY_SIGNATURES
    }

    fn return_type(&self, inputs: &[DataType]) -> Result<DataType> {
        check_num_args(self, inputs.len(), 2)?;
        Ok(DataType::Boolean)
    }

    fn execute(
        &self,
        inputs: &[&Array],
        options: &FunctionOptions,
        num_rows: usize,
    ) -> Result<Array> {
        binary_bool(self, inputs, options, num_rows, |a, b| a || b)
    }
}

impl ScalarKernel for Not {
    fn name(&self) -> &'static str {
        "not"
    }

    fn signatures(&self) -> &[Signature] {
        UNARY_SIGNATURES
    }

    fn return_type(&self, inputs: &[DataType]) -> Result<DataType> {
        check_num_args(self, inputs.len(), 1)?;
        Ok(DataType::Boolean)
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

        let arr = expect_boolean(self.name(), inputs[0])?;
        let values: Bitmap = arr.values().iter().map(|v| !v).collect();

        Ok(Array::Boolean(BooleanArray::new(
            values,
            arr.validity().cloned(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_propagates_nulls() {
        let a = Array::Boolean(BooleanArray::from_iter([Some(true), Some(true), None]));
        let b = Array::Boolean(BooleanArray::from_iter([Some(true), Some(false), Some(true)]));

        let out = And.execute(&[&a, &b], &FunctionOptions::new(), 3).unwrap();
        let expected = Array::Boolean(BooleanArray::from_iter([Some(true), Some(false), None]));
        assert_eq!(expected, out);
    }

    #[test]
    fn not_flips_values() {
        let a = Array::Boolean(BooleanArray::from_iter([true, false]));
        let out = Not.execute(&[&a], &FunctionOptions::new(), 2).unwrap();
        assert_eq!(Array::Boolean(BooleanArray::from_iter([false, true])), out);
    }

    #[test]
    fn non_boolean_input_errors() {
        let a = Array::Boolean(BooleanArray::from_iter([true]));
        let b = Array::Int64(quiver_array::array::Int64Array::from_iter([1]));
        let err = And
            .execute(&[&a, &b], &FunctionOptions::new(), 1)
            .unwrap_err();
        assert_eq!(ErrorKind::Kernel, err.kind());
    }
}
