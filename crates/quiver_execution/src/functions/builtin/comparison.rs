use std::cmp::Ordering;

use quiver_array::array::{Array, BooleanArray};
use quiver_array::bitmap::Bitmap;
use quiver_array::datatype::{DataType, DataTypeId};
use quiver_error::{ErrorKind, QuiverError, Result};

use super::util::{binary_utf8_bool, check_input_lens, promote_pair, try_binary_primitive, union_validity};
use crate::expr::FunctionOptions;
use crate::functions::{check_num_args, check_options, ScalarKernel, Signature};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Neq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl CmpOp {
    fn matches(&self, ord: Ordering) -> bool {
        match self {
            CmpOp::Eq => ord == Ordering::Equal,
            CmpOp::Neq => ord != Ordering::Equal,
            CmpOp::Lt => ord == Ordering::Less,
            CmpOp::LtEq => ord != Ordering::Greater,
            CmpOp::Gt => ord == Ordering::Greater,
            CmpOp::GtEq => ord != Ordering::Less,
        }
    }
}

/// Element-wise comparison kernel.
///
/// Numeric inputs are promoted to their common type first. Rows where
/// either side is null compare to null.
#[derive(Debug, Clone, Copy)]
pub struct Compare {
    pub op: CmpOp,
}

const SIGNATURES: &[Signature] = &[Signature {
    input: &[DataTypeId::Any, DataTypeId::Any],
    return_type: DataTypeId::Boolean,
}];

impl ScalarKernel for Compare {
    fn name(&self) -> &'static str {
        match self.op {
            CmpOp::Eq => "eq",
            CmpOp::Neq => "neq",
            CmpOp::Lt => "lt",
            CmpOp::LtEq => "lt_eq",
            CmpOp::Gt => "gt",
            CmpOp::GtEq => "gt_eq",
        }
    }

    fn signatures(&self) -> &[Signature] {
        SIGNATURES
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
        check_num_args(self, inputs.len(), 2)?;
        check_options(self, options, &[])?;
        check_input_lens(self.name(), inputs, num_rows)?;

        let op = self.op;
        let (left, right, ty) = promote_pair(inputs[0], inputs[1])?;
        let (values, validity) = match (&left, &right) {
            (Array::Null(a), Array::Null(_)) => {
                return Ok(Array::Boolean(BooleanArray::new_nulls(a.len())));
            }
            (Array::Boolean(a), Array::Boolean(b)) => {
                let len = a.len();
                let validity = union_validity(a.validity(), b.validity(), len);
                let values = (0..len)
                    .map(|idx| op.matches(a.values().value(idx).cmp(&b.values().value(idx))))
                    .collect();
                (values, validity)
            }
            (Array::Int32(a), Array::Int32(b)) => {
                try_binary_primitive(a, b, |a, b| Ok(op.matches(a.cmp(&b))))?
            }
            (Array::Int64(a), Array::Int64(b)) => {
                try_binary_primitive(a, b, |a, b| Ok(op.matches(a.cmp(&b))))?
            }
            (Array::Float64(a), Array::Float64(b)) => {
                try_binary_primitive(a, b, |a, b| Ok(op.matches(a.total_cmp(&b))))?
            }
            (Array::Utf8(a), Array::Utf8(b)) => binary_utf8_bool(a, b, |a, b| op.matches(a.cmp(b))),
            _ => {
                return Err(QuiverError::with_kind(
                    ErrorKind::Kernel,
                    format!("Cannot compare values of type {ty}"),
                ))
            }
        };

        Ok(Array::Boolean(BooleanArray::new(
            Bitmap::from_iter(values),
            validity,
        )))
    }
}

#[cfg(test)]
mod tests {
    use quiver_array::array::Int64Array;

    use super::*;

    #[test]
    fn gt_with_promotion() {
        let a = Array::Int64(Int64Array::from_iter([1, 5, 10]));
        let b = Array::Float64(quiver_array::array::Float64Array::from_iter([2.0, 2.0, 2.0]));

        let kernel = Compare { op: CmpOp::Gt };
        let out = kernel
            .execute(&[&a, &b], &FunctionOptions::new(), 3)
            .unwrap();

        assert_eq!(
            Array::Boolean(BooleanArray::from_iter([false, true, true])),
            out
        );
    }

    #[test]
    fn eq_propagates_nulls() {
        let a = Array::Int64(Int64Array::from_iter([Some(1), None]));
        let b = Array::Int64(Int64Array::from_iter([Some(1), Some(2)]));

        let kernel = Compare { op: CmpOp::Eq };
        let out = kernel
            .execute(&[&a, &b], &FunctionOptions::new(), 2)
            .unwrap();

        assert_eq!(Some(true), match &out {
            Array::Boolean(arr) => arr.value(0),
            _ => None,
        });
        assert_eq!(Some(false), out.is_valid(1));
    }

    #[test]
    fn incomparable_types_error() {
        let a = Array::Int64(Int64Array::from_iter([1]));
        let b = Array::Utf8(quiver_array::array::Utf8Array::from_iter(["x"]));

        let kernel = Compare { op: CmpOp::Eq };
        let err = kernel
            .execute(&[&a, &b], &FunctionOptions::new(), 1)
            .unwrap_err();
        assert_eq!(ErrorKind::Kernel, err.kind());
    }
}
