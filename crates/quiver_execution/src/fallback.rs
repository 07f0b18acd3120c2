use std::fmt::Debug;

use quiver_array::array::Array;
use quiver_error::Result;

/// Host-language evaluator for expressions without a native kernel.
///
/// The executor hands over the canonical text of the unsupported
/// expression plus the materialized columns it references, and splices
/// the returned column into the in-progress result. Failures should
/// carry `ErrorKind::Eval`.
pub trait FallbackEvaluator: Debug + Send + Sync {
    fn evaluate(&self, expr_text: &str, inputs: &[(String, Array)]) -> Result<Array>;
}
