use std::collections::HashSet;
use std::sync::Arc;

use quiver_array::datatype::DataType;
use quiver_array::table::{Field, Table};
use quiver_error::{ErrorKind, QuiverError, Result};
use serde::{Deserialize, Serialize};

use crate::executor::CollectContext;
use crate::expr::Expression;
use crate::functions::registry::{default_registry, FunctionRegistry};

/// A single sort key with an explicit direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column: String,
    pub desc: bool,
}

impl SortKey {
    pub fn asc(column: impl Into<String>) -> Self {
        SortKey {
            column: column.into(),
            desc: false,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        SortKey {
            column: column.into(),
            desc: true,
        }
    }
}

/// One relational operation in a plan chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlanOp {
    /// Keep rows where the predicate evaluates to true.
    Filter(Expression),
    /// Add or replace a column computed from an expression.
    Mutate { name: String, expr: Expression },
    /// Project to the named columns, in the requested order.
    Select(Vec<String>),
    /// Truncate to the first n rows.
    Head(usize),
    /// Stable multi-key sort.
    Arrange(Vec<SortKey>),
}

/// One node in the persistent plan chain.
#[derive(Debug)]
enum PlanState {
    Source(Arc<Table>),
    Op {
        input: Arc<PlanState>,
        op: PlanOp,
        /// Schema after this operation, computed statically.
        schema: Vec<Field>,
    },
}

/// An unevaluated sequence of relational operations bound to a source
/// table.
///
/// Plans are immutable and persistent: every verb returns a new plan
/// whose node references (shares, never copies) the prior plan. No
/// verb touches data; the schema after each operation is derived by
/// static propagation. Materialization happens only in
/// [`collect`](QueryPlan::collect).
#[derive(Debug, Clone)]
pub struct QueryPlan {
    registry: Arc<FunctionRegistry>,
    state: Arc<PlanState>,
}

impl QueryPlan {
    /// Wrap a table into a lazy plan using the builtin registry.
    pub fn scan(table: Table) -> Self {
        Self::scan_with_registry(table, default_registry())
    }

    pub fn scan_with_registry(table: Table, registry: Arc<FunctionRegistry>) -> Self {
        QueryPlan {
            registry,
            state: Arc::new(PlanState::Source(Arc::new(table))),
        }
    }

    /// Schema of the plan's output, known without executing.
    pub fn schema(&self) -> &[Field] {
        match self.state.as_ref() {
            PlanState::Source(table) => table.fields(),
            PlanState::Op { schema, .. } => schema,
        }
    }

    pub fn registry(&self) -> &Arc<FunctionRegistry> {
        &self.registry
    }

    fn push(&self, op: PlanOp, schema: Vec<Field>) -> QueryPlan {
        QueryPlan {
            registry: self.registry.clone(),
            state: Arc::new(PlanState::Op {
                input: self.state.clone(),
                op,
                schema,
            }),
        }
    }

    /// Append a filter operation.
    ///
    /// The predicate's columns must exist; its type, when statically
    /// known, must be boolean.
    pub fn filter(&self, predicate: Expression) -> Result<QueryPlan> {
        let ty = predicate.output_type(self.schema(), &self.registry)?;
        if !matches!(ty, DataType::Boolean | DataType::Unknown | DataType::Null) {
            return Err(QuiverError::with_kind(
                ErrorKind::InvalidArgument,
                format!("Filter predicate must be boolean, got {ty}: {predicate}"),
            ));
        }

        let schema = self.schema().to_vec();
        Ok(self.push(PlanOp::Filter(predicate), schema))
    }

    /// Append a mutate operation adding (or replacing) a column.
    pub fn mutate(&self, name: impl Into<String>, expr: Expression) -> Result<QueryPlan> {
        let name = name.into();
        let ty = expr.output_type(self.schema(), &self.registry)?;

        let mut schema = self.schema().to_vec();
        match schema.iter_mut().find(|f| f.name == name) {
            Some(field) => field.datatype = ty,
            None => schema.push(Field::new(name.clone(), ty)),
        }

        Ok(self.push(PlanOp::Mutate { name, expr }, schema))
    }

    /// Append a projection to the named columns, preserving the
    /// requested order.
    pub fn select<I, S>(&self, columns: I) -> Result<QueryPlan>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();

        let mut seen = HashSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(QuiverError::with_kind(
                    ErrorKind::InvalidArgument,
                    format!("Duplicate column in select: {name}"),
                ));
            }
        }

        let schema = columns
            .iter()
            .map(|name| {
                self.schema()
                    .iter()
                    .find(|f| &f.name == name)
                    .cloned()
                    .ok_or_else(|| {
                        QuiverError::with_kind(
                            ErrorKind::UnknownColumn,
                            format!("Unknown column: {name}"),
                        )
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(self.push(PlanOp::Select(columns), schema))
    }

    /// Append a head operation truncating to the first `count` rows.
    ///
    /// A count larger than the row count keeps the full table.
    pub fn head(&self, count: i64) -> Result<QueryPlan> {
        if count < 0 {
            return Err(QuiverError::with_kind(
                ErrorKind::InvalidArgument,
                format!("Head count must not be negative, got {count}"),
            ));
        }

        let schema = self.schema().to_vec();
        Ok(self.push(PlanOp::Head(count as usize), schema))
    }

    /// Append a stable multi-key sort.
    pub fn arrange(&self, keys: Vec<SortKey>) -> Result<QueryPlan> {
        if keys.is_empty() {
            return Err(QuiverError::with_kind(
                ErrorKind::InvalidArgument,
                "Arrange requires at least one sort key",
            ));
        }
        for key in &keys {
            if !self.schema().iter().any(|f| f.name == key.column) {
                return Err(QuiverError::with_kind(
                    ErrorKind::UnknownColumn,
                    format!("Unknown column: {}", key.column),
                ));
            }
        }

        let schema = self.schema().to_vec();
        Ok(self.push(PlanOp::Arrange(keys), schema))
    }

    /// Materialize the plan with the default execution context.
    pub fn collect(&self) -> Result<Table> {
        CollectContext::new(self.registry.clone()).collect(self)
    }

    /// Materialize the plan with an explicit execution context.
    pub fn collect_with(&self, context: &CollectContext) -> Result<Table> {
        context.collect(self)
    }

    /// Walk the chain from source to tip: the source table plus
    /// operations in append order (oldest first).
    pub(crate) fn linearize(&self) -> (Arc<Table>, Vec<&PlanOp>) {
        let mut ops = Vec::new();
        let mut state = self.state.as_ref();
        loop {
            match state {
                PlanState::Source(table) => {
                    ops.reverse();
                    return (table.clone(), ops);
                }
                PlanState::Op { input, op, .. } => {
                    ops.push(op);
                    state = input.as_ref();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use quiver_array::array::{Array, Int64Array};

    use super::*;
    use crate::expr::{col, lit};

    fn source() -> Table {
        Table::try_from_arrays([
            ("a", Array::Int64(Int64Array::from_iter([1, 2, 3]))),
            ("b", Array::Int64(Int64Array::from_iter([4, 5, 6]))),
        ])
        .unwrap()
    }

    #[test]
    fn verbs_share_prior_state() {
        let plan = QueryPlan::scan(source());
        let filtered = plan.filter(col("a").gt(lit(1i64))).unwrap();

        // The original plan is untouched and still usable.
        assert!(Arc::ptr_eq(
            &plan.state,
            match filtered.state.as_ref() {
                PlanState::Op { input, .. } => input,
                PlanState::Source(_) => panic!("expected op node"),
            }
        ));
        assert_eq!(plan.schema(), filtered.schema());
    }

    #[test]
    fn mutate_extends_schema_statically() {
        let plan = QueryPlan::scan(source());
        let plan = plan.mutate("c", col("a").add(col("b"))).unwrap();

        let fields = plan.schema();
        assert_eq!(3, fields.len());
        assert_eq!(Field::new("c", DataType::Int64), fields[2]);
    }

    #[test]
    fn mutate_with_existing_name_replaces_in_place() {
        let plan = QueryPlan::scan(source());
        let plan = plan.mutate("a", col("a").gt(lit(1i64))).unwrap();

        let fields = plan.schema();
        assert_eq!(2, fields.len());
        assert_eq!(Field::new("a", DataType::Boolean), fields[0]);
    }

    #[test]
    fn mutate_with_unresolvable_call_infers_unknown() {
        let plan = QueryPlan::scan(source());
        let plan = plan
            .mutate("c", crate::expr::call("pkg::custom", vec![col("a")]))
            .unwrap();
        assert_eq!(DataType::Unknown, plan.schema()[2].datatype);
    }

    #[test]
    fn unknown_column_fails_at_build_time() {
        let plan = QueryPlan::scan(source());

        let err = plan.filter(col("missing").gt(lit(1i64))).unwrap_err();
        assert_eq!(ErrorKind::UnknownColumn, err.kind());

        let err = plan.select(["a", "missing"]).unwrap_err();
        assert_eq!(ErrorKind::UnknownColumn, err.kind());

        let err = plan.arrange(vec![SortKey::asc("missing")]).unwrap_err();
        assert_eq!(ErrorKind::UnknownColumn, err.kind());
    }

    #[test]
    fn select_tracks_requested_order() {
        let plan = QueryPlan::scan(source());
        let plan = plan.select(["b", "a"]).unwrap();
        let names: Vec<_> = plan.schema().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(vec!["b", "a"], names);
    }

    #[test]
    fn negative_head_is_invalid() {
        let plan = QueryPlan::scan(source());
        let err = plan.head(-1).unwrap_err();
        assert_eq!(ErrorKind::InvalidArgument, err.kind());
    }

    #[test]
    fn non_boolean_filter_is_invalid() {
        let plan = QueryPlan::scan(source());
        let err = plan.filter(col("a").add(lit(1i64))).unwrap_err();
        assert_eq!(ErrorKind::InvalidArgument, err.kind());
    }

    #[test]
    fn later_ops_see_mutated_columns() {
        let plan = QueryPlan::scan(source());
        let plan = plan.mutate("c", col("a").add(col("b"))).unwrap();
        // `c` doesn't exist on the source, only in the propagated schema.
        let plan = plan.filter(col("c").gt(lit(5i64))).unwrap();
        let plan = plan.select(["c"]).unwrap();
        assert_eq!(1, plan.schema().len());
    }
}
