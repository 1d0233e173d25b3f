//! Parsing of JSON-encoded nested array-of-record cells.

use crate::types::{DataType, NestedField, Value};

/// One parsed record out of a nested array cell.
///
/// Values are aligned with the nested schema's field order.
#[derive(Debug, Clone, PartialEq)]
pub struct NestedRecord {
    /// Field values in nested-schema order.
    pub values: Vec<Value>,
}

/// Parse one raw cell into its records.
///
/// Returns `None` for an absent cell, malformed JSON, a JSON value that
/// is not an array, or an empty array — callers drop such rows entirely.
/// A record element that is not an object, or whose field is missing or
/// has the wrong JSON type, yields `Value::Null` for the affected field
/// but still produces a record.
pub fn parse_nested_cell(raw: Option<&str>, fields: &[NestedField]) -> Option<Vec<NestedRecord>> {
    let raw = raw?;
    let parsed: serde_json::Value = serde_json::from_str(raw).ok()?;
    let items = parsed.as_array()?;
    if items.is_empty() {
        return None;
    }

    let records = items
        .iter()
        .map(|item| NestedRecord {
            values: fields
                .iter()
                .map(|field| extract_field(item, field))
                .collect(),
        })
        .collect();

    Some(records)
}

fn extract_field(item: &serde_json::Value, field: &NestedField) -> Value {
    let Some(raw) = item.get(&field.name) else {
        return Value::Null;
    };

    match field.data_type {
        DataType::Int64 => raw.as_i64().map_or(Value::Null, Value::Int64),
        DataType::String => raw
            .as_str()
            .map_or(Value::Null, |s| Value::String(s.to_string())),
        // Nested fields are validated to be Int64 or String at schema
        // construction.
        _ => Value::Null,
    }
}
