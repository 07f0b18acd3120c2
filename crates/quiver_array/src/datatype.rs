use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical data types supported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// All-null type, castable to any other type.
    Null,
    Boolean,
    Int32,
    Int64,
    Float64,
    Utf8,
    /// Placeholder type for plan schemas where the output type of an
    /// expression cannot be derived statically (e.g. a call that will
    /// resolve through the fallback bridge). Never materialized.
    Unknown,
}

impl DataType {
    pub fn datatype_id(&self) -> DataTypeId {
        match self {
            DataType::Null => DataTypeId::Null,
            DataType::Boolean => DataTypeId::Boolean,
            DataType::Int32 => DataTypeId::Int32,
            DataType::Int64 => DataTypeId::Int64,
            DataType::Float64 => DataTypeId::Float64,
            DataType::Utf8 => DataTypeId::Utf8,
            DataType::Unknown => DataTypeId::Any,
        }
    }

    pub const fn is_numeric(&self) -> bool {
        matches!(self, DataType::Int32 | DataType::Int64 | DataType::Float64)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Null => write!(f, "Null"),
            DataType::Boolean => write!(f, "Boolean"),
            DataType::Int32 => write!(f, "Int32"),
            DataType::Int64 => write!(f, "Int64"),
            DataType::Float64 => write!(f, "Float64"),
            DataType::Utf8 => write!(f, "Utf8"),
            DataType::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Data type identifiers used in function signatures.
///
/// `Any` matches every concrete type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataTypeId {
    Any,
    Null,
    Boolean,
    Int32,
    Int64,
    Float64,
    Utf8,
}

/// Find the common type two types promote to, if any.
///
/// Numeric promotion follows the lattice `Int32 -> Int64 -> Float64`.
/// `Null` promotes to anything.
pub fn common_type(a: &DataType, b: &DataType) -> Option<DataType> {
    if a == b {
        return Some(*a);
    }

    match (a, b) {
        (DataType::Null, other) | (other, DataType::Null) => Some(*other),
        (DataType::Int32, DataType::Int64) | (DataType::Int64, DataType::Int32) => {
            Some(DataType::Int64)
        }
        (DataType::Int32, DataType::Float64) | (DataType::Float64, DataType::Int32) => {
            Some(DataType::Float64)
        }
        (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
            Some(DataType::Float64)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_promotion() {
        assert_eq!(
            Some(DataType::Float64),
            common_type(&DataType::Int32, &DataType::Float64)
        );
        assert_eq!(
            Some(DataType::Int64),
            common_type(&DataType::Int64, &DataType::Int32)
        );
        assert_eq!(None, common_type(&DataType::Utf8, &DataType::Int64));
    }

    #[test]
    fn null_promotes_to_anything() {
        assert_eq!(
            Some(DataType::Utf8),
            common_type(&DataType::Null, &DataType::Utf8)
        );
    }
}
