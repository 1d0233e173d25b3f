//! Scalar values extracted from Arrow arrays, shared by the sort and
//! aggregate operators.

use std::cmp::Ordering;

use arrow::array::{Array, ArrayRef, Date32Array, Float32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::DataType as ArrowDataType;

use common_error::{FrameError, FrameResult};

/// A single scalar taken out of or destined for an Arrow array.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ScalarValue {
    Null,
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Str(String),
    Date(i32),
}

impl ScalarValue {
    /// Extract the value at `row` from an array.
    pub(crate) fn try_from_array(array: &ArrayRef, row: usize) -> FrameResult<Self> {
        if array.is_null(row) {
            return Ok(Self::Null);
        }

        match array.data_type() {
            ArrowDataType::Int64 => Ok(Self::Int64(downcast::<Int64Array>(array)?.value(row))),
            ArrowDataType::Float32 => {
                Ok(Self::Float32(downcast::<Float32Array>(array)?.value(row)))
            }
            ArrowDataType::Float64 => {
                Ok(Self::Float64(downcast::<Float64Array>(array)?.value(row)))
            }
            ArrowDataType::Utf8 => Ok(Self::Str(
                downcast::<StringArray>(array)?.value(row).to_string(),
            )),
            ArrowDataType::Date32 => Ok(Self::Date(downcast::<Date32Array>(array)?.value(row))),
            other => Err(FrameError::execution(format!(
                "unsupported array type {other}"
            ))),
        }
    }

    /// Compare two scalars of the same column type.
    ///
    /// Nulls compare greater than every value, so they land last in an
    /// ascending sort. Floats use a total order.
    pub(crate) fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Null, _) => Ordering::Greater,
            (_, Self::Null) => Ordering::Less,
            (Self::Int64(a), Self::Int64(b)) => a.cmp(b),
            (Self::Float32(a), Self::Float32(b)) => a.total_cmp(b),
            (Self::Float64(a), Self::Float64(b)) => a.total_cmp(b),
            (Self::Str(a), Self::Str(b)) => a.cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            // Mixed variants cannot occur within one column.
            _ => Ordering::Equal,
        }
    }

    /// Check if this scalar is null.
    pub(crate) fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Downcast an array reference, surfacing a typed failure instead of a
/// panic.
pub(crate) fn downcast<'a, T: 'static>(array: &'a ArrayRef) -> FrameResult<&'a T> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| FrameError::execution("array downcast failed"))
}
