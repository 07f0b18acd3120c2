use quiver_array::array::{Array, BooleanArray};
use quiver_array::bitmap::Bitmap;
use quiver_array::datatype::{DataType, DataTypeId};
use quiver_array::scalar::ScalarValue;
use quiver_error::{ErrorKind, QuiverError, Result};

use super::util::check_input_lens;
use crate::expr::FunctionOptions;
use crate::functions::{check_num_args, check_options, ScalarKernel, Signature};

const SIGNATURES: &[Signature] = &[Signature {
    input: &[DataTypeId::Any],
    return_type: DataTypeId::Boolean,
}];

fn nan_is_null_option(kernel: &dyn ScalarKernel, options: &FunctionOptions) -> Result<bool> {
    match options.get("nan_is_null") {
        None => Ok(false),
        Some(ScalarValue::Boolean(v)) => Ok(*v),
        Some(other) => Err(QuiverError::with_kind(
            ErrorKind::Kernel,
            format!(
                "Option 'nan_is_null' for {} must be a boolean, got {other}",
                kernel.name()
            ),
        )),
    }
}

/// Check if a value is null.
///
/// With the `nan_is_null` option set, floating point NaN values also
/// count as null.
#[derive(Debug, Clone, Copy)]
pub struct IsNull;

impl ScalarKernel for IsNull {
    fn name(&self) -> &'static str {
        "is_null"
    }

    fn signatures(&self) -> &[Signature] {
        SIGNATURES
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
        check_options(self, options, &["nan_is_null"])?;
        check_input_lens(self.name(), inputs, num_rows)?;
        let nan_is_null = nan_is_null_option(self, options)?;

        let arr = inputs[0];
        let values: Bitmap = (0..num_rows)
            .map(|idx| {
                if !arr.is_valid(idx).unwrap_or(false) {
                    return true;
                }
                if nan_is_null {
                    if let Array::Float64(arr) = arr {
                        return arr.value(idx).map(|v| v.is_nan()).unwrap_or(false);
                    }
                }
                false
            })
            .collect();

        Ok(Array::Boolean(BooleanArray::new(values, None)))
    }
}

/// Check if a value is not null.
#[derive(Debug, Clone, Copy)]
pub struct IsNotNull;

impl ScalarKernel for IsNotNull {
    fn name(&self) -> &'static str {
        "is_not_null"
    }

    fn signatures(&self) -> &[Signature] {
        SIGNATURES
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
        check_options(self, options, &["nan_is_null"])?;
        check_input_lens(self.name(), inputs, num_rows)?;
        let nan_is_null = nan_is_null_option(self, options)?;

        let values: Bitmap = (0..num_rows)
            .map(|idx| {
                let arr = inputs[0];
                if !arr.is_valid(idx).unwrap_or(false) {
                    return false;
                }
                if nan_is_null {
                    if let Array::Float64(arr) = arr {
                        return !arr.value(idx).map(|v| v.is_nan()).unwrap_or(false);
                    }
                }
                true
            })
            .collect();

        Ok(Array::Boolean(BooleanArray::new(values, None)))
    }
}

#[cfg(test)]
mod tests {
    use quiver_array::array::Float64Array;

    use super::*;

    fn input() -> Array {
        Array::Float64(Float64Array::from_iter([
            Some(1.0),
            Some(2.0),
            Some(3.0),
            None,
            Some(f64::NAN),
        ]))
    }

    #[test]
    fn nan_counts_as_null_when_asked() {
        let arr = input();
        let options =
            FunctionOptions::from([("nan_is_null".to_string(), ScalarValue::Boolean(true))]);

        let out = IsNull.execute(&[&arr], &options, 5).unwrap();
        let expected =
            Array::Boolean(BooleanArray::from_iter([false, false, false, true, true]));
        assert_eq!(expected, out);
    }

    #[test]
    fn nan_is_not_null_by_default() {
        let arr = input();

        let out = IsNull.execute(&[&arr], &FunctionOptions::new(), 5).unwrap();
        let expected =
            Array::Boolean(BooleanArray::from_iter([false, false, false, true, false]));
        assert_eq!(expected, out);
    }

    #[test]
    fn unknown_option_errors() {
        let arr = input();
        let options = FunctionOptions::from([("typo".to_string(), ScalarValue::Boolean(true))]);
        let err = IsNull.execute(&[&arr], &options, 5).unwrap_err();
        assert_eq!(ErrorKind::Kernel, err.kind());
    }

    #[test]
    fn is_not_null_inverts() {
        let arr = input();
        let out = IsNotNull
            .execute(&[&arr], &FunctionOptions::new(), 5)
            .unwrap();
        let expected =
            Array::Boolean(BooleanArray::from_iter([true, true, true, false, true]));
        assert_eq!(expected, out);
    }
}
