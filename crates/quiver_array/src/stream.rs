use quiver_error::{ErrorKind, QuiverError, Result};

use crate::table::Table;

/// Consume a stream of tables from a partitioned source and
/// concatenate them into one table.
///
/// The source is an opaque iterator; each partition may carry its own
/// chunking. Concatenation is zero-copy except where a partition
/// requires a type promotion.
pub fn concat_stream<I>(tables: I) -> Result<Table>
where
    I: IntoIterator<Item = Result<Table>>,
{
    let mut iter = tables.into_iter();
    let mut out = match iter.next() {
        Some(table) => table?,
        None => {
            return Err(QuiverError::with_kind(
                ErrorKind::InvalidArgument,
                "Cannot concat an empty table stream",
            ))
        }
    };

    for table in iter {
        out = out.concat(&table?)?;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::{Array, Int64Array};

    fn part(vals: &[i64]) -> Result<Table> {
        Table::try_from_arrays([("n", Array::Int64(Int64Array::from_iter(vals.iter().copied())))])
    }

    #[test]
    fn concat_partitions() {
        let parts = vec![part(&[1, 2]), part(&[3]), part(&[4, 5])];
        let table = concat_stream(parts).unwrap();
        assert_eq!(5, table.num_rows());
        assert_eq!(3, table.num_chunks());
    }

    #[test]
    fn empty_stream_errors() {
        let err = concat_stream(std::iter::empty()).unwrap_err();
        assert_eq!(ErrorKind::InvalidArgument, err.kind());
    }
}
