pub mod builtin;
pub mod registry;

use std::fmt::Debug;

use quiver_array::array::Array;
use quiver_array::datatype::{DataType, DataTypeId};
use quiver_error::{ErrorKind, QuiverError, Result};

use crate::expr::FunctionOptions;

/// Function signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    /// Expected input types for this signature.
    pub input: &'static [DataTypeId],

    /// The return type for these inputs.
    pub return_type: DataTypeId,
}

impl Signature {
    /// Return if the given input datatypes exactly satisfy the
    /// signature. `Any` matches every concrete type.
    pub fn exact_match(&self, inputs: &[DataType]) -> bool {
        if self.input.len() != inputs.len() {
            return false;
        }

        for (&expected, have) in self.input.iter().zip(inputs.iter()) {
            if expected == DataTypeId::Any {
                continue;
            }
            if have.datatype_id() != expected {
                return false;
            }
        }

        true
    }
}

/// A native compute kernel bound to a canonical name.
///
/// Kernels are stateless and cheap to share; the registry hands out
/// `Arc` clones. Inputs to `execute` are already-evaluated argument
/// arrays, all of length `num_rows` (literals get broadcast before
/// the call).
pub trait ScalarKernel: Debug + Send + Sync {
    /// Canonical name of the kernel.
    fn name(&self) -> &'static str;

    /// Signatures accepted by this kernel, for introspection.
    fn signatures(&self) -> &[Signature];

    /// Compute the output type for the given input types without
    /// executing. Errors if the input types are unsupported.
    fn return_type(&self, inputs: &[DataType]) -> Result<DataType>;

    /// Invoke the kernel.
    fn execute(
        &self,
        inputs: &[&Array],
        options: &FunctionOptions,
        num_rows: usize,
    ) -> Result<Array>;
}

pub(crate) fn check_num_args(
    kernel: &dyn ScalarKernel,
    inputs_len: usize,
    expected: usize,
) -> Result<()> {
    if inputs_len != expected {
        return Err(QuiverError::with_kind(
            ErrorKind::Kernel,
            format!(
                "Expected {expected} argument(s) for {}, got {inputs_len}",
                kernel.name()
            ),
        ));
    }
    Ok(())
}

/// Error on any provided option not in the allowed set.
pub(crate) fn check_options(
    kernel: &dyn ScalarKernel,
    options: &FunctionOptions,
    allowed: &[&str],
) -> Result<()> {
    for key in options.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(QuiverError::with_kind(
                ErrorKind::Kernel,
                format!("Unknown option '{key}' for {}", kernel.name()),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_with_any() {
        let sig = Signature {
            input: &[DataTypeId::Any],
            return_type: DataTypeId::Boolean,
        };
        assert!(sig.exact_match(&[DataType::Utf8]));
        assert!(!sig.exact_match(&[DataType::Utf8, DataType::Utf8]));

        let sig = Signature {
            input: &[DataTypeId::Int64, DataTypeId::Int64],
            return_type: DataTypeId::Int64,
        };
        assert!(sig.exact_match(&[DataType::Int64, DataType::Int64]));
        assert!(!sig.exact_match(&[DataType::Int64, DataType::Utf8]));
    }
}
