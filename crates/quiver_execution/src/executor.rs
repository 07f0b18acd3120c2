use std::sync::Arc;

use quiver_array::array::Array;
use quiver_array::bitmap::Bitmap;
use quiver_array::chunked::ChunkedArray;
use quiver_array::compute::filter::filter;
use quiver_array::compute::sort::{sort_permutation, SortColumn};
use quiver_array::compute::take::take;
use quiver_array::datatype::DataType;
use quiver_array::table::{Field, Table};
use quiver_error::{ErrorKind, QuiverError, Result};
use rayon::prelude::*;
use tracing::debug;

use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::expr::Expression;
use crate::fallback::FallbackEvaluator;
use crate::functions::registry::FunctionRegistry;
use crate::plan::{PlanOp, QueryPlan, SortKey};

/// Execution context for `collect`.
///
/// Holds the function registry, an optional fallback evaluator for
/// expressions without a native kernel, and the sink receiving
/// non-fatal diagnostics.
#[derive(Debug, Clone)]
pub struct CollectContext {
    registry: Arc<FunctionRegistry>,
    fallback: Option<Arc<dyn FallbackEvaluator>>,
    sink: Arc<dyn DiagnosticSink>,
}

impl CollectContext {
    pub fn new(registry: Arc<FunctionRegistry>) -> Self {
        CollectContext {
            registry,
            fallback: None,
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn FallbackEvaluator>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Materialize a plan into a table.
    ///
    /// Operations run in append order against the source table. The
    /// plan itself is untouched; collecting twice produces the same
    /// result.
    pub fn collect(&self, plan: &QueryPlan) -> Result<Table> {
        let (source, ops) = plan.linearize();
        debug!(num_ops = ops.len(), num_rows = source.num_rows(), "collecting plan");

        let mut table = source.as_ref().clone();
        for op in ops {
            table = match op {
                PlanOp::Filter(predicate) => self.apply_filter(table, predicate)?,
                PlanOp::Mutate { name, expr } => self.apply_mutate(table, name, expr)?,
                PlanOp::Select(columns) => table.project(columns)?,
                PlanOp::Head(count) => table.head(*count)?,
                PlanOp::Arrange(keys) => self.apply_arrange(table, keys)?,
            };
        }
        Ok(table)
    }

    fn apply_filter(&self, table: Table, predicate: &Expression) -> Result<Table> {
        let (table, outputs) = self.eval_per_chunk(table, predicate)?;

        let selections = outputs
            .iter()
            .map(|arr| selection_bitmap(arr))
            .collect::<Result<Vec<_>>>()?;

        let columns = table
            .columns()
            .iter()
            .map(|column| {
                let chunks = column
                    .chunks()
                    .iter()
                    .zip(&selections)
                    .map(|(chunk, selection)| Ok(Arc::new(filter(chunk, selection)?)))
                    .collect::<Result<Vec<_>>>()?;
                if chunks.is_empty() {
                    return Ok(ChunkedArray::empty(column.datatype()));
                }
                ChunkedArray::try_new(chunks)
            })
            .collect::<Result<Vec<_>>>()?;

        Table::try_new(table.fields().to_vec(), columns)
    }

    fn apply_mutate(&self, table: Table, name: &str, expr: &Expression) -> Result<Table> {
        let (table, outputs) = self.eval_per_chunk(table, expr)?;

        let column = if outputs.is_empty() {
            // No chunks to evaluate against, fall back to the inferred
            // type for an empty column.
            let ty = match expr.output_type(table.fields(), &self.registry)? {
                DataType::Unknown => DataType::Null,
                other => other,
            };
            ChunkedArray::empty(ty)
        } else {
            ChunkedArray::try_new(outputs)?
        };

        let mut fields = table.fields().to_vec();
        let mut columns = table.columns().to_vec();
        let field = Field::new(name, column.datatype());
        match table.field_index(name) {
            Some(idx) => {
                fields[idx] = field;
                columns[idx] = column;
            }
            None => {
                fields.push(field);
                columns.push(column);
            }
        }

        Table::try_new(fields, columns)
    }

    fn apply_arrange(&self, table: Table, keys: &[SortKey]) -> Result<Table> {
        if table.num_rows() == 0 {
            return Ok(table);
        }

        // Sorting needs contiguous key columns.
        let table = table.rechunk()?;

        let key_arrays = keys
            .iter()
            .map(|key| {
                let column = table.column_by_name(&key.column)?;
                let chunk = column.chunk(0).ok_or_else(|| {
                    QuiverError::new(format!("Missing chunk for sort key '{}'", key.column))
                })?;
                Ok((chunk.clone(), key.desc))
            })
            .collect::<Result<Vec<_>>>()?;
        let sort_columns: Vec<SortColumn> = key_arrays
            .iter()
            .map(|(arr, desc)| SortColumn {
                array: arr.as_ref(),
                desc: *desc,
            })
            .collect();

        let perm = sort_permutation(&sort_columns, table.num_rows())?;

        let columns = table
            .columns()
            .par_iter()
            .map(|column| {
                let chunk = column.chunk(0).ok_or_else(|| {
                    QuiverError::new("Missing chunk in rechunked column")
                })?;
                Ok(ChunkedArray::from_array(take(chunk, &perm)?))
            })
            .collect::<Result<Vec<_>>>()?;

        Table::try_new(table.fields().to_vec(), columns)
    }

    /// Evaluate an expression against every chunk of a table.
    ///
    /// Fully resolvable expressions evaluate chunk-parallel. An
    /// expression containing an unresolvable call first collapses the
    /// table to a single chunk so the fallback bridge sees contiguous
    /// columns and runs exactly once per unsupported node; resolvable
    /// parts of the tree still execute natively.
    ///
    /// Returns the (possibly rechunked) table along with one output
    /// array per chunk, aligned with the table's chunk layout.
    fn eval_per_chunk(
        &self,
        table: Table,
        expr: &Expression,
    ) -> Result<(Table, Vec<Arc<Array>>)> {
        let table = if expr.is_fully_resolvable(&self.registry) {
            table
        } else {
            table.rechunk()?
        };

        let chunk_lens = table.chunk_lens();
        let outputs = (0..table.num_chunks())
            .into_par_iter()
            .map(|chunk_idx| {
                let view = ChunkView::new(&table, chunk_idx);
                let out = self.eval(expr, &view)?;
                if out.len() != chunk_lens[chunk_idx] {
                    return Err(QuiverError::with_kind(
                        ErrorKind::Eval,
                        format!(
                            "Expression produced {} rows, expected {}: {expr}",
                            out.len(),
                            chunk_lens[chunk_idx]
                        ),
                    ));
                }
                Ok(out)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok((table, outputs))
    }

    /// Route a call without a native kernel through the fallback
    /// bridge: materialize the columns the subtree references, hand
    /// them to the host evaluator with the expression's canonical
    /// text, and splice the returned column back in.
    fn eval_unsupported(&self, expr: &Expression, view: &ChunkView) -> Result<Arc<Array>> {
        let evaluator = self.fallback.as_ref().ok_or_else(|| {
            QuiverError::with_kind(
                ErrorKind::Kernel,
                format!("No kernel and no fallback evaluator for expression: {expr}"),
            )
        })?;

        let expr_text = expr.to_string();
        self.sink
            .emit(Diagnostic::unsupported_expression(expr_text.clone()));

        let inputs = expr
            .referenced_columns()
            .into_iter()
            .map(|name| {
                let arr = view.column(&name)?;
                Ok((name, arr.as_ref().clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        let out = evaluator.evaluate(&expr_text, &inputs)?;
        if out.len() != view.num_rows {
            return Err(QuiverError::with_kind(
                ErrorKind::Eval,
                format!(
                    "Fallback evaluator produced {} rows, expected {}: {expr_text}",
                    out.len(),
                    view.num_rows
                ),
            ));
        }
        Ok(Arc::new(out))
    }

    /// Post-order evaluation against a single chunk.
    fn eval(&self, expr: &Expression, view: &ChunkView) -> Result<Arc<Array>> {
        match expr {
            Expression::Column(name) => view.column(name),
            Expression::Literal(value) => Ok(Arc::new(value.as_array(view.num_rows))),
            Expression::Call {
                name,
                args,
                options,
            } => {
                let binding = match self.registry.resolve(name) {
                    Some(binding) => binding,
                    None => return self.eval_unsupported(expr, view),
                };

                let inputs = args
                    .iter()
                    .map(|arg| self.eval(arg, view))
                    .collect::<Result<Vec<_>>>()?;
                let input_refs: Vec<&Array> = inputs.iter().map(|arr| arr.as_ref()).collect();

                let merged = binding.merge_options(options);
                let out = binding
                    .kernel
                    .execute(&input_refs, &merged, view.num_rows)?;
                Ok(Arc::new(out))
            }
        }
    }
}

/// A single chunk's worth of a table: one aligned chunk per column.
struct ChunkView<'a> {
    fields: &'a [Field],
    columns: Vec<&'a Arc<Array>>,
    num_rows: usize,
}

impl<'a> ChunkView<'a> {
    fn new(table: &'a Table, chunk_idx: usize) -> Self {
        let columns: Vec<&Arc<Array>> = table
            .columns()
            .iter()
            .filter_map(|column| column.chunk(chunk_idx))
            .collect();
        let num_rows = columns.first().map(|arr| arr.len()).unwrap_or(0);
        ChunkView {
            fields: table.fields(),
            columns,
            num_rows,
        }
    }

    fn column(&self, name: &str) -> Result<Arc<Array>> {
        let idx = self
            .fields
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| {
                QuiverError::with_kind(
                    ErrorKind::ColumnNotFound,
                    format!("Column not found: {name}"),
                )
            })?;
        Ok(self.columns[idx].clone())
    }
}

/// Turn a predicate output into a selection bitmap, null rows drop.
fn selection_bitmap(arr: &Array) -> Result<Bitmap> {
    match arr {
        Array::Boolean(arr) => Ok((0..arr.len())
            .map(|idx| {
                arr.is_valid(idx).unwrap_or(false) && arr.value(idx).unwrap_or(false)
            })
            .collect()),
        Array::Null(arr) => Ok(Bitmap::new_with_val(false, arr.len())),
        other => Err(QuiverError::with_kind(
            ErrorKind::Kernel,
            format!(
                "Filter predicate evaluated to {}, expected Boolean",
                other.datatype()
            ),
        )),
    }
}
