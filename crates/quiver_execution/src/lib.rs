//! Lazy columnar query-expression engine.
//!
//! Relational verbs against a table are captured as an unevaluated,
//! persistent plan chain. Nothing touches data until `collect`, which
//! compiles expressions against the function registry (or routes them
//! through the fallback bridge) and materializes a result table.

pub mod diagnostics;
pub mod executor;
pub mod expr;
pub mod fallback;
pub mod functions;
pub mod plan;

pub use executor::CollectContext;
pub use plan::{QueryPlan, SortKey};
