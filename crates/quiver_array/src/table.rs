use std::collections::HashSet;
use std::sync::Arc;

use quiver_error::{ErrorKind, QuiverError, Result};
use serde::{Deserialize, Serialize};

use crate::array::{Array, BooleanArray, Float64Array, Int32Array, Int64Array, NullArray, Utf8Array};
use crate::chunked::ChunkedArray;
use crate::compute::slice::slice;
use crate::datatype::{common_type, DataType};
use crate::scalar::ScalarValue;

/// A named, typed column in a table schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub datatype: DataType,
}

impl Field {
    pub fn new(name: impl Into<String>, datatype: DataType) -> Self {
        Field {
            name: name.into(),
            datatype,
        }
    }
}

/// An ordered collection of equal-length named columns.
///
/// Column order is significant and preserved. All columns share a
/// common chunk layout: chunk `k` has the same number of rows in every
/// column, which lets kernels execute chunk-aligned.
#[derive(Debug, Clone)]
pub struct Table {
    fields: Vec<Field>,
    columns: Vec<ChunkedArray>,
    num_rows: usize,
}

impl Table {
    pub fn empty() -> Self {
        Table {
            fields: Vec::new(),
            columns: Vec::new(),
            num_rows: 0,
        }
    }

    pub fn try_new(fields: Vec<Field>, columns: Vec<ChunkedArray>) -> Result<Self> {
        if fields.len() != columns.len() {
            return Err(QuiverError::with_kind(
                ErrorKind::Schema,
                format!(
                    "Field count {} doesn't match column count {}",
                    fields.len(),
                    columns.len()
                ),
            ));
        }

        let mut names = HashSet::new();
        for field in &fields {
            if !names.insert(field.name.as_str()) {
                return Err(QuiverError::with_kind(
                    ErrorKind::Schema,
                    format!("Duplicate column name: {}", field.name),
                ));
            }
        }

        for (field, column) in fields.iter().zip(&columns) {
            if field.datatype != column.datatype() {
                return Err(QuiverError::with_kind(
                    ErrorKind::Schema,
                    format!(
                        "Column '{}' declared as {} but holds {}",
                        field.name,
                        field.datatype,
                        column.datatype()
                    ),
                ));
            }
        }

        let num_rows = columns.first().map(|c| c.logical_len()).unwrap_or(0);
        let chunk_lens: Vec<usize> = columns
            .first()
            .map(|c| c.chunks().iter().map(|chunk| chunk.len()).collect())
            .unwrap_or_default();

        for (field, column) in fields.iter().zip(&columns) {
            if column.logical_len() != num_rows {
                return Err(QuiverError::with_kind(
                    ErrorKind::Schema,
                    format!(
                        "Expected column '{}' to have {num_rows} rows, got {}",
                        field.name,
                        column.logical_len()
                    ),
                ));
            }

            let lens: Vec<usize> = column.chunks().iter().map(|chunk| chunk.len()).collect();
            if lens != chunk_lens {
                return Err(QuiverError::with_kind(
                    ErrorKind::Schema,
                    format!("Column '{}' chunk layout doesn't align", field.name),
                ));
            }
        }

        Ok(Table {
            fields,
            columns,
            num_rows,
        })
    }

    /// Create a table from named single-chunk arrays.
    pub fn try_from_arrays<I, S>(arrays: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Array)>,
        S: Into<String>,
    {
        let mut fields = Vec::new();
        let mut columns = Vec::new();
        for (name, arr) in arrays {
            fields.push(Field::new(name, arr.datatype()));
            columns.push(ChunkedArray::from_array(arr));
        }
        Table::try_new(fields, columns)
    }

    /// Create a table from row-major input, transposing column-wise.
    pub fn try_from_rows(fields: Vec<Field>, rows: &[Vec<ScalarValue>]) -> Result<Self> {
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != fields.len() {
                return Err(QuiverError::with_kind(
                    ErrorKind::Schema,
                    format!(
                        "Row {idx} has {} values, expected {}",
                        row.len(),
                        fields.len()
                    ),
                ));
            }
        }

        let columns = fields
            .iter()
            .enumerate()
            .map(|(col_idx, field)| {
                let arr = array_from_scalars(
                    &field.datatype,
                    rows.iter().map(|row| &row[col_idx]),
                    field,
                )?;
                Ok(ChunkedArray::from_array(arr))
            })
            .collect::<Result<Vec<_>>>()?;

        Table::try_new(fields, columns)
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[ChunkedArray] {
        &self.columns
    }

    pub fn column(&self, idx: usize) -> Option<&ChunkedArray> {
        self.columns.get(idx)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn column_by_name(&self, name: &str) -> Result<&ChunkedArray> {
        let idx = self.field_index(name).ok_or_else(|| {
            QuiverError::with_kind(
                ErrorKind::ColumnNotFound,
                format!("Column not found: {name}"),
            )
        })?;
        Ok(&self.columns[idx])
    }

    /// Number of chunks in the shared chunk layout.
    pub fn num_chunks(&self) -> usize {
        self.columns.first().map(|c| c.num_chunks()).unwrap_or(0)
    }

    /// Row counts per chunk in the shared chunk layout.
    pub fn chunk_lens(&self) -> Vec<usize> {
        self.columns
            .first()
            .map(|c| c.chunks().iter().map(|chunk| chunk.len()).collect())
            .unwrap_or_default()
    }

    /// Project to the given columns, preserving the requested order.
    pub fn project(&self, names: &[String]) -> Result<Table> {
        let mut fields = Vec::with_capacity(names.len());
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let idx = self.field_index(name).ok_or_else(|| {
                QuiverError::with_kind(
                    ErrorKind::ColumnNotFound,
                    format!("Column not found: {name}"),
                )
            })?;
            fields.push(self.fields[idx].clone());
            columns.push(self.columns[idx].clone());
        }
        Table::try_new(fields, columns)
    }

    /// Truncate to the first `count` rows, slicing chunks as needed.
    ///
    /// Whole chunks that fall inside the range are shared, not copied.
    /// A count larger than the row count returns the full table.
    pub fn head(&self, count: usize) -> Result<Table> {
        let count = count.min(self.num_rows);
        if count == self.num_rows {
            return Ok(self.clone());
        }

        let chunk_lens = self.chunk_lens();
        let columns = self
            .columns
            .iter()
            .map(|column| {
                let mut remaining = count;
                let mut chunks = Vec::new();
                for (chunk, &len) in column.chunks().iter().zip(&chunk_lens) {
                    if remaining == 0 {
                        break;
                    }
                    if remaining >= len {
                        chunks.push(chunk.clone());
                        remaining -= len;
                    } else {
                        chunks.push(Arc::new(slice(chunk, 0, remaining)?));
                        remaining = 0;
                    }
                }
                if chunks.is_empty() {
                    return Ok(ChunkedArray::empty(column.datatype()));
                }
                ChunkedArray::try_new(chunks)
            })
            .collect::<Result<Vec<_>>>()?;

        Table::try_new(self.fields.clone(), columns)
    }

    /// Concatenate two tables with identical schemas.
    ///
    /// Chunk lists are concatenated, not copied, except when a column
    /// pair requires a type promotion, which forces a copy and a cast
    /// pass for that column.
    pub fn concat(&self, other: &Table) -> Result<Table> {
        if self.fields.len() != other.fields.len() {
            return Err(QuiverError::with_kind(
                ErrorKind::Schema,
                format!(
                    "Cannot concat tables with {} and {} columns",
                    self.fields.len(),
                    other.fields.len()
                ),
            ));
        }

        let mut fields = Vec::with_capacity(self.fields.len());
        let mut columns = Vec::with_capacity(self.columns.len());

        for idx in 0..self.fields.len() {
            let left_field = &self.fields[idx];
            let right_field = &other.fields[idx];
            if left_field.name != right_field.name {
                return Err(QuiverError::with_kind(
                    ErrorKind::Schema,
                    format!(
                        "Column name mismatch at position {idx}: '{}' vs '{}'",
                        left_field.name, right_field.name
                    ),
                ));
            }

            let left = &self.columns[idx];
            let right = &other.columns[idx];

            let (datatype, merged) = if left.datatype() == right.datatype() {
                (left.datatype(), left.extend_shared(right)?)
            } else {
                let common =
                    common_type(&left.datatype(), &right.datatype()).ok_or_else(|| {
                        QuiverError::with_kind(
                            ErrorKind::Schema,
                            format!(
                                "No common type for column '{}': {} vs {}",
                                left_field.name,
                                left.datatype(),
                                right.datatype()
                            ),
                        )
                    })?;
                let left = left.cast_to(&common)?;
                let right = right.cast_to(&common)?;
                (common, left.extend_shared(&right)?)
            };

            fields.push(Field::new(left_field.name.clone(), datatype));
            columns.push(merged);
        }

        Table::try_new(fields, columns)
    }

    /// Collapse every column to a single chunk.
    pub fn rechunk(&self) -> Result<Table> {
        let columns = self
            .columns
            .iter()
            .map(|c| c.rechunk())
            .collect::<Result<Vec<_>>>()?;
        Table::try_new(self.fields.clone(), columns)
    }

    /// Get the logical value at the given row/column position.
    pub fn scalar(&self, col: usize, row: usize) -> Option<ScalarValue> {
        self.columns.get(col)?.scalar(row)
    }
}

/// Tables compare by logical value: schema, row count, and per-row
/// values, independent of physical chunking.
impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        if self.fields != other.fields || self.num_rows != other.num_rows {
            return false;
        }
        for col in 0..self.columns.len() {
            for row in 0..self.num_rows {
                if self.scalar(col, row) != other.scalar(col, row) {
                    return false;
                }
            }
        }
        true
    }
}

fn array_from_scalars<'a, I>(datatype: &DataType, scalars: I, field: &Field) -> Result<Array>
where
    I: Iterator<Item = &'a ScalarValue>,
{
    fn mismatch(field: &Field, got: &ScalarValue) -> QuiverError {
        QuiverError::with_kind(
            ErrorKind::Schema,
            format!(
                "Value {got} doesn't match declared type {} for column '{}'",
                field.datatype, field.name
            ),
        )
    }

    Ok(match datatype {
        DataType::Null | DataType::Unknown => {
            let mut len = 0;
            for scalar in scalars {
                match scalar {
                    ScalarValue::Null => len += 1,
                    other => return Err(mismatch(field, other)),
                }
            }
            Array::Null(NullArray::new(len))
        }
        DataType::Boolean => {
            let values = scalars
                .map(|s| match s {
                    ScalarValue::Null => Ok(None),
                    ScalarValue::Boolean(v) => Ok(Some(*v)),
                    other => Err(mismatch(field, other)),
                })
                .collect::<Result<Vec<_>>>()?;
            Array::Boolean(BooleanArray::from_iter(values))
        }
        DataType::Int32 => {
            let values = scalars
                .map(|s| match s {
                    ScalarValue::Null => Ok(None),
                    ScalarValue::Int32(v) => Ok(Some(*v)),
                    other => Err(mismatch(field, other)),
                })
                .collect::<Result<Vec<_>>>()?;
            Array::Int32(Int32Array::from_iter(values))
        }
        DataType::Int64 => {
            let values = scalars
                .map(|s| match s {
                    ScalarValue::Null => Ok(None),
                    ScalarValue::Int64(v) => Ok(Some(*v)),
                    other => Err(mismatch(field, other)),
                })
                .collect::<Result<Vec<_>>>()?;
            Array::Int64(Int64Array::from_iter(values))
        }
        DataType::Float64 => {
            let values = scalars
                .map(|s| match s {
                    ScalarValue::Null => Ok(None),
                    ScalarValue::Float64(v) => Ok(Some(*v)),
                    other => Err(mismatch(field, other)),
                })
                .collect::<Result<Vec<_>>>()?;
            Array::Float64(Float64Array::from_iter(values))
        }
        DataType::Utf8 => {
            let values = scalars
                .map(|s| match s {
                    ScalarValue::Null => Ok(None),
                    ScalarValue::Utf8(v) => Ok(Some(v.as_str())),
                    other => Err(mismatch(field, other)),
                })
                .collect::<Result<Vec<_>>>()?;
            Array::Utf8(Utf8Array::from_iter(values))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_col(vals: &[i64]) -> Array {
        Array::Int64(Int64Array::from_iter(vals.iter().copied()))
    }

    #[test]
    fn duplicate_names_error() {
        let err = Table::try_from_arrays([("a", int_col(&[1])), ("a", int_col(&[2]))]).unwrap_err();
        assert_eq!(ErrorKind::Schema, err.kind());
    }

    #[test]
    fn length_mismatch_errors() {
        let err =
            Table::try_from_arrays([("a", int_col(&[1])), ("b", int_col(&[1, 2]))]).unwrap_err();
        assert_eq!(ErrorKind::Schema, err.kind());
    }

    #[test]
    fn column_lookup() {
        let table = Table::try_from_arrays([("a", int_col(&[1, 2]))]).unwrap();
        assert_eq!(2, table.column_by_name("a").unwrap().logical_len());

        let err = table.column_by_name("missing").unwrap_err();
        assert_eq!(ErrorKind::ColumnNotFound, err.kind());
    }

    #[test]
    fn project_preserves_requested_order() {
        let table =
            Table::try_from_arrays([("a", int_col(&[1, 2])), ("b", int_col(&[3, 4]))]).unwrap();
        let out = table.project(&["b".to_string(), "a".to_string()]).unwrap();

        assert_eq!("b", out.fields()[0].name);
        assert_eq!("a", out.fields()[1].name);
        assert_eq!(Some(ScalarValue::Int64(3)), out.scalar(0, 0));
        assert_eq!(Some(ScalarValue::Int64(1)), out.scalar(1, 0));
    }

    #[test]
    fn concat_shares_chunks() {
        let a = Table::try_from_arrays([("n", int_col(&[21, 12]))]).unwrap();
        let b = Table::try_from_arrays([("n", int_col(&[12, 10]))]).unwrap();

        let out = a.concat(&b).unwrap();
        assert_eq!(4, out.num_rows());
        assert_eq!(2, out.num_chunks());

        let expected: Vec<_> = [21, 12, 12, 10]
            .iter()
            .map(|&v| Some(ScalarValue::Int64(v)))
            .collect();
        let got: Vec<_> = (0..4).map(|row| out.scalar(0, row)).collect();
        assert_eq!(expected, got);

        // Chunks shared with the inputs.
        assert!(Arc::ptr_eq(
            &a.column(0).unwrap().chunks()[0],
            &out.column(0).unwrap().chunks()[0]
        ));
    }

    #[test]
    fn concat_with_promotion_copies() {
        let a = Table::try_from_arrays([("n", int_col(&[1]))]).unwrap();
        let b = Table::try_from_arrays([(
            "n",
            Array::Float64(Float64Array::from_iter([2.5])),
        )])
        .unwrap();

        let out = a.concat(&b).unwrap();
        assert_eq!(DataType::Float64, out.fields()[0].datatype);
        assert_eq!(Some(ScalarValue::Float64(1.0)), out.scalar(0, 0));
        assert_eq!(Some(ScalarValue::Float64(2.5)), out.scalar(0, 1));

        // Promotion forces a copy.
        assert!(!Arc::ptr_eq(
            &a.column(0).unwrap().chunks()[0],
            &out.column(0).unwrap().chunks()[0]
        ));
    }

    #[test]
    fn concat_incompatible_types_error() {
        let a = Table::try_from_arrays([("n", int_col(&[1]))]).unwrap();
        let b =
            Table::try_from_arrays([("n", Array::Utf8(Utf8Array::from_iter(["x"])))]).unwrap();
        let err = a.concat(&b).unwrap_err();
        assert_eq!(ErrorKind::Schema, err.kind());
    }

    #[test]
    fn head_slices_chunks() {
        let a = Table::try_from_arrays([("n", int_col(&[1, 2]))]).unwrap();
        let b = Table::try_from_arrays([("n", int_col(&[3, 4]))]).unwrap();
        let table = a.concat(&b).unwrap();

        let out = table.head(3).unwrap();
        assert_eq!(3, out.num_rows());
        assert_eq!(Some(ScalarValue::Int64(3)), out.scalar(0, 2));

        // First chunk fully included, shared.
        assert!(Arc::ptr_eq(
            &table.column(0).unwrap().chunks()[0],
            &out.column(0).unwrap().chunks()[0]
        ));
    }

    #[test]
    fn row_major_ingestion_transposes() {
        let fields = vec![
            Field::new("id", DataType::Int64),
            Field::new("name", DataType::Utf8),
        ];
        let rows = vec![
            vec![ScalarValue::Int64(1), ScalarValue::Utf8("a".to_string())],
            vec![ScalarValue::Int64(2), ScalarValue::Null],
        ];

        let table = Table::try_from_rows(fields, &rows).unwrap();
        assert_eq!(2, table.num_rows());
        assert_eq!(Some(ScalarValue::Int64(2)), table.scalar(0, 1));
        assert_eq!(Some(ScalarValue::Null), table.scalar(1, 1));
    }

    #[test]
    fn row_major_type_mismatch_errors() {
        let fields = vec![Field::new("id", DataType::Int64)];
        let rows = vec![vec![ScalarValue::Utf8("nope".to_string())]];
        let err = Table::try_from_rows(fields, &rows).unwrap_err();
        assert_eq!(ErrorKind::Schema, err.kind());
    }

    #[test]
    fn logical_equality_ignores_chunking() {
        let a = Table::try_from_arrays([("n", int_col(&[1, 2]))]).unwrap();
        let b = Table::try_from_arrays([("n", int_col(&[3]))]).unwrap();
        let chunked = a.concat(&b).unwrap();
        let flat = chunked.rechunk().unwrap();

        assert_eq!(1, flat.num_chunks());
        assert_eq!(chunked, flat);
    }
}
