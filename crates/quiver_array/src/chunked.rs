use std::sync::Arc;

use quiver_error::{ErrorKind, QuiverError, Result};

use crate::array::Array;
use crate::compute::{cast, concat};
use crate::datatype::DataType;
use crate::scalar::ScalarValue;

/// An immutable column physically split into one or more contiguous
/// chunks.
///
/// Chunks are shared (`Arc`), so concatenating chunked arrays never
/// copies values. All chunks have the same data type.
#[derive(Debug, Clone)]
pub struct ChunkedArray {
    datatype: DataType,
    chunks: Vec<Arc<Array>>,
}

impl ChunkedArray {
    pub fn try_new(chunks: Vec<Arc<Array>>) -> Result<Self> {
        let datatype = match chunks.first() {
            Some(chunk) => chunk.datatype(),
            None => DataType::Null,
        };

        for chunk in &chunks {
            if chunk.datatype() != datatype {
                return Err(QuiverError::with_kind(
                    ErrorKind::Schema,
                    format!(
                        "Chunk type mismatch, expected {datatype}, got {}",
                        chunk.datatype()
                    ),
                ));
            }
        }

        Ok(ChunkedArray { datatype, chunks })
    }

    /// An empty column that still remembers its type.
    pub fn empty(datatype: DataType) -> Self {
        ChunkedArray {
            datatype,
            chunks: Vec::new(),
        }
    }

    pub fn from_array(arr: Array) -> Self {
        ChunkedArray {
            datatype: arr.datatype(),
            chunks: vec![Arc::new(arr)],
        }
    }

    pub fn datatype(&self) -> DataType {
        self.datatype
    }

    /// Total logical length, the sum of all chunk lengths.
    pub fn logical_len(&self) -> usize {
        self.chunks.iter().map(|c| c.len()).sum()
    }

    pub fn num_chunks(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunks(&self) -> &[Arc<Array>] {
        &self.chunks
    }

    pub fn chunk(&self, idx: usize) -> Option<&Arc<Array>> {
        self.chunks.get(idx)
    }

    /// Get the logical value at a global row index.
    pub fn scalar(&self, mut idx: usize) -> Option<ScalarValue> {
        for chunk in &self.chunks {
            if idx < chunk.len() {
                return chunk.scalar(idx);
            }
            idx -= chunk.len();
        }
        None
    }

    /// Concatenate chunk lists without copying values.
    ///
    /// Both arrays must already be of the same type; promotion happens
    /// a layer up.
    pub fn extend_shared(&self, other: &ChunkedArray) -> Result<ChunkedArray> {
        if self.datatype != other.datatype {
            return Err(QuiverError::with_kind(
                ErrorKind::Schema,
                format!(
                    "Cannot share chunks across types, got {} and {}",
                    self.datatype, other.datatype
                ),
            ));
        }

        let mut chunks = Vec::with_capacity(self.chunks.len() + other.chunks.len());
        chunks.extend(self.chunks.iter().cloned());
        chunks.extend(other.chunks.iter().cloned());

        Ok(ChunkedArray {
            datatype: self.datatype,
            chunks,
        })
    }

    /// Cast every chunk to the given type. Copies.
    pub fn cast_to(&self, to: &DataType) -> Result<ChunkedArray> {
        let chunks = self
            .chunks
            .iter()
            .map(|chunk| Ok(Arc::new(cast::cast(chunk, to)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(ChunkedArray {
            datatype: *to,
            chunks,
        })
    }

    /// Collapse into a single chunk.
    ///
    /// Zero-copy when the array already holds exactly one chunk.
    pub fn rechunk(&self) -> Result<ChunkedArray> {
        if self.chunks.len() <= 1 {
            return Ok(self.clone());
        }

        let refs: Vec<&Array> = self.chunks.iter().map(|c| c.as_ref()).collect();
        let merged = concat::concat(&refs)?;

        Ok(ChunkedArray {
            datatype: self.datatype,
            chunks: vec![Arc::new(merged)],
        })
    }
}
