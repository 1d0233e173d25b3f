//! Data type definitions for flatframe schemas.

use serde::{Deserialize, Serialize};

/// A named field inside a nested record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NestedField {
    /// Field name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl NestedField {
    /// Create a new nested field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Data type for schema columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 32-bit floating point.
    Float32,
    /// 64-bit floating point.
    Float64,
    /// UTF-8 string.
    String,
    /// Date (days since epoch).
    Date,
    /// Array of fixed-shape records, serialized as a JSON string.
    NestedRecordArray(Vec<NestedField>),
}

impl DataType {
    /// Check if this type is numeric.
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int64 | Self::Float32 | Self::Float64)
    }

    /// Check if this type is a nested array-of-record type.
    pub const fn is_nested(&self) -> bool {
        matches!(self, Self::NestedRecordArray(_))
    }

    /// Check if values of this type can serve as a grouping key.
    pub const fn is_groupable(&self) -> bool {
        matches!(self, Self::Int64 | Self::String | Self::Date)
    }

    /// Get the display name for this type.
    pub fn display_name(&self) -> String {
        match self {
            Self::Int64 => "Int64".to_string(),
            Self::Float32 => "Float32".to_string(),
            Self::Float64 => "Float64".to_string(),
            Self::String => "String".to_string(),
            Self::Date => "Date".to_string(),
            Self::NestedRecordArray(fields) => {
                let inner: Vec<String> = fields
                    .iter()
                    .map(|f| format!("{}: {}", f.name, f.data_type.display_name()))
                    .collect();
                format!("NestedRecordArray<{}>", inner.join(", "))
            }
        }
    }

    /// Convert to the equivalent Arrow data type.
    ///
    /// A `NestedRecordArray` column maps to Utf8 since its physical
    /// encoding is the raw JSON string; the nested shape only matters to
    /// the flatten operator.
    pub fn to_arrow(&self) -> arrow_schema::DataType {
        match self {
            Self::Int64 => arrow_schema::DataType::Int64,
            Self::Float32 => arrow_schema::DataType::Float32,
            Self::Float64 => arrow_schema::DataType::Float64,
            Self::String | Self::NestedRecordArray(_) => arrow_schema::DataType::Utf8,
            Self::Date => arrow_schema::DataType::Date32,
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
