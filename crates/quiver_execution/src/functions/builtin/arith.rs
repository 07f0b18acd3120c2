use quiver_array::array::{Array, NullArray, PrimitiveArray};
use quiver_array::datatype::{common_type, DataType, DataTypeId};
use quiver_error::{ErrorKind, QuiverError, Result};

use super::util::{check_input_lens, promote_pair, try_binary_primitive};
use crate::expr::FunctionOptions;
use crate::functions::{check_num_args, check_options, ScalarKernel, Signature};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Element-wise binary arithmetic kernel.
///
/// Inputs are promoted to their common numeric type. Integer overflow
/// and integer division by zero are kernel errors.
#[derive(Debug, Clone, Copy)]
pub struct Arith {
    pub op: ArithOp,
}

const SIGNATURES: &[Signature] = &[
    Signature {
        input: &[DataTypeId::Int32, DataTypeId::Int32],
        return_type: DataTypeId::Int32,
    },
    Signature {
        input: &[DataTypeId::Int64, DataTypeId::Int64],
        return_type: DataTypeId::Int64,
    },
    Signature {
        input: &[DataTypeId::Float64, DataTypeId::Float64],
        return_type: DataTypeId::Float64,
    },
];

fn overflow(name: &str) -> QuiverError {
    QuiverError::with_kind(ErrorKind::Kernel, format!("Integer overflow in {name}"))
}

fn div_by_zero(name: &str) -> QuiverError {
    QuiverError::with_kind(ErrorKind::Kernel, format!("Division by zero in {name}"))
}

impl Arith {
    fn checked_i64(&self, a: i64, b: i64) -> Result<i64> {
        let name = self.name();
        match self.op {
            ArithOp::Add => a.checked_add(b).ok_or_else(|| overflow(name)),
            ArithOp::Sub => a.checked_sub(b).ok_or_else(|| overflow(name)),
            ArithOp::Mul => a.checked_mul(b).ok_or_else(|| overflow(name)),
            ArithOp::Div => {
                if b == 0 {
                    return Err(div_by_zero(name));
                }
                a.checked_div(b).ok_or_else(|| overflow(name))
            }
        }
    }

    fn checked_i32(&self, a: i32, b: i32) -> Result<i32> {
        let name = self.name();
        match self.op {
            ArithOp::Add => a.checked_add(b).ok_or_else(|| overflow(name)),
            ArithOp::Sub => a.checked_sub(b).ok_or_else(|| overflow(name)),
            ArithOp::Mul => a.checked_mul(b).ok_or_else(|| overflow(name)),
            ArithOp::Div => {
                if b == 0 {
                    return Err(div_by_zero(name));
                }
                a.checked_div(b).ok_or_else(|| overflow(name))
            }
        }
    }

    fn apply_f64(&self, a: f64, b: f64) -> f64 {
        match self.op {
            ArithOp::Add => a + b,
            ArithOp::Sub => a - b,
            ArithOp::Mul => a * b,
            ArithOp::Div => a / b,
        }
    }
}

impl ScalarKernel for Arith {
    fn name(&self) -> &'static str {
        match self.op {
            ArithOp::Add => "add",
            ArithOp::Sub => "sub",
            ArithOp::Mul => "mul",
            ArithOp::Div => "div",
        }
    }

    fn signatures(&self) -> &[Signature] {
        SIGNATURES
    }

    fn return_type(&self, inputs: &[DataType]) -> Result<DataType> {
        check_num_args(self, inputs.len(), 2)?;

        let ty = common_type(&inputs[0], &inputs[1]).ok_or_else(|| {
            QuiverError::with_kind(
                ErrorKind::Kernel,
                format!(
                    "No common type for {}: {} and {}",
                    self.name(),
                    inputs[0],
                    inputs[1]
                ),
            )
        })?;

        if !ty.is_numeric() && ty != DataType::Null {
            return Err(QuiverError::with_kind(
                ErrorKind::Kernel,
                format!("{} expects numeric inputs, got {ty}", self.name()),
            ));
        }

        Ok(ty)
    }

    fn execute(
        &self,
        inputs: &[&Array],
        options: &FunctionOptions,
        num_rows: usize,
    ) -> Result<Array> {
        check_num_args(self, inputs.len(), 2)?;
        check_options(self, options, &[])?;
        check_input_lens(self.name(), inputs, num_rows)?;

        let (left, right, ty) = promote_pair(inputs[0], inputs[1])?;
        Ok(match (&left, &right) {
            (Array::Null(a), Array::Null(_)) => Array::Null(NullArray::new(a.len())),
            (Array::Int32(a), Array::Int32(b)) => {
                let (values, validity) = try_binary_primitive(a, b, |a, b| self.checked_i32(a, b))?;
                Array::Int32(PrimitiveArray::new(values, validity))
            }
            (Array::Int64(a), Array::Int64(b)) => {
                let (values, validity) = try_binary_primitive(a, b, |a, b| self.checked_i64(a, b))?;
                Array::Int64(PrimitiveArray::new(values, validity))
            }
            (Array::Float64(a), Array::Float64(b)) => {
                let (values, validity) =
                    try_binary_primitive(a, b, |a, b| Ok(self.apply_f64(a, b)))?;
                Array::Float64(PrimitiveArray::new(values, validity))
            }
            _ => {
                return Err(QuiverError::with_kind(
                    ErrorKind::Kernel,
                    format!("{} expects numeric inputs, got {ty}", self.name()),
                ))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use quiver_array::array::{Float64Array, Int64Array};

    use super::*;

    #[test]
    fn add_with_promotion() {
        let a = Array::Int64(Int64Array::from_iter([1, 2]));
        let b = Array::Float64(Float64Array::from_iter([0.5, 0.5]));

        let kernel = Arith { op: ArithOp::Add };
        let out = kernel
            .execute(&[&a, &b], &FunctionOptions::new(), 2)
            .unwrap();

        assert_eq!(Array::Float64(Float64Array::from_iter([1.5, 2.5])), out);
    }

    #[test]
    fn null_rows_skip_the_op() {
        // The null row pairs a default value with a zero divisor; it
        // must not trip the division-by-zero check.
        let a = Array::Int64(Int64Array::from_iter([Some(10), None]));
        let b = Array::Int64(Int64Array::from_iter([Some(2), None]));

        let kernel = Arith { op: ArithOp::Div };
        let out = kernel
            .execute(&[&a, &b], &FunctionOptions::new(), 2)
            .unwrap();

        let expected = Array::Int64(Int64Array::from_iter([Some(5), None]));
        assert_eq!(expected, out);
    }

    #[test]
    fn int_division_by_zero_errors() {
        let a = Array::Int64(Int64Array::from_iter([1]));
        let b = Array::Int64(Int64Array::from_iter([0]));

        let kernel = Arith { op: ArithOp::Div };
        let err = kernel
            .execute(&[&a, &b], &FunctionOptions::new(), 1)
            .unwrap_err();
        assert_eq!(ErrorKind::Kernel, err.kind());
    }
}
