//! Arrow value extraction
//!
//! Null-aware accessors that read a single value out of an Arrow array,
//! widening compatible physical types so the record store may use any
//! reasonable encoding for a column.

use arrow::array::{
    Array, ArrayRef, BooleanArray, Date32Array, Date64Array, Float32Array, Float64Array,
    Int8Array, Int16Array, Int32Array, Int64Array, LargeStringArray, StringArray, UInt8Array,
    UInt16Array, UInt32Array, UInt64Array,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;

use crate::error::{AnalyticsError, Result};

/// Date formats accepted in string columns, tried in order
pub const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d-%m-%Y", "%Y/%m/%d", "%d/%m/%Y"];

/// Get a column that must be present
///
/// # Errors
/// Returns an error if the batch has no column of that name
pub fn required_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .ok_or_else(|| AnalyticsError::column_not_found(name))
}

/// Get a column that may be absent
#[must_use]
pub fn optional_column<'a>(batch: &'a RecordBatch, name: &str) -> Option<&'a ArrayRef> {
    batch.column_by_name(name)
}

/// Extract a string value, handling nulls
pub fn arrow_array_to_string(array: &ArrayRef, index: usize) -> Option<String> {
    if array.is_null(index) {
        return None;
    }

    match array.data_type() {
        DataType::Utf8 => {
            let string_array = array.as_any().downcast_ref::<StringArray>()?;
            Some(string_array.value(index).to_string())
        }
        DataType::LargeUtf8 => {
            let string_array = array.as_any().downcast_ref::<LargeStringArray>()?;
            Some(string_array.value(index).to_string())
        }
        _ => None,
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value.trim(), format).ok())
}

/// Extract a date value, handling nulls
///
/// Reads `Date32`, `Date64` and strings in one of [`DATE_FORMATS`].
pub fn arrow_array_to_date(array: &ArrayRef, index: usize) -> Option<NaiveDate> {
    if array.is_null(index) {
        return None;
    }

    match array.data_type() {
        DataType::Date32 => {
            let date_array = array.as_any().downcast_ref::<Date32Array>()?;
            date_array.value_as_date(index)
        }
        DataType::Date64 => {
            let date_array = array.as_any().downcast_ref::<Date64Array>()?;
            date_array.value_as_date(index)
        }
        DataType::Utf8 | DataType::LargeUtf8 => parse_date(&arrow_array_to_string(array, index)?),
        _ => None,
    }
}

macro_rules! integer_value {
    ($array:expr, $index:expr, $ty:ty) => {{
        let int_array = $array.as_any().downcast_ref::<$ty>()?;
        i64::try_from(int_array.value($index)).ok()
    }};
}

/// Extract an integer value, handling nulls
///
/// Floats are truncated toward zero; unsigned values beyond `i64` yield `None`.
pub fn arrow_array_to_i64(array: &ArrayRef, index: usize) -> Option<i64> {
    if array.is_null(index) {
        return None;
    }

    match array.data_type() {
        DataType::Int8 => integer_value!(array, index, Int8Array),
        DataType::Int16 => integer_value!(array, index, Int16Array),
        DataType::Int32 => integer_value!(array, index, Int32Array),
        DataType::Int64 => integer_value!(array, index, Int64Array),
        DataType::UInt8 => integer_value!(array, index, UInt8Array),
        DataType::UInt16 => integer_value!(array, index, UInt16Array),
        DataType::UInt32 => integer_value!(array, index, UInt32Array),
        DataType::UInt64 => integer_value!(array, index, UInt64Array),
        DataType::Float32 | DataType::Float64 => {
            arrow_array_to_f64(array, index).filter(|v| v.is_finite()).map(|v| v as i64)
        }
        _ => None,
    }
}

/// Extract a float value, handling nulls
pub fn arrow_array_to_f64(array: &ArrayRef, index: usize) -> Option<f64> {
    if array.is_null(index) {
        return None;
    }

    match array.data_type() {
        DataType::Float32 => {
            let float_array = array.as_any().downcast_ref::<Float32Array>()?;
            Some(f64::from(float_array.value(index)))
        }
        DataType::Float64 => {
            let float_array = array.as_any().downcast_ref::<Float64Array>()?;
            Some(float_array.value(index))
        }
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => arrow_array_to_i64(array, index).map(|v| v as f64),
        _ => None,
    }
}

/// Extract a boolean value, handling nulls
///
/// Integer columns are read as `value != 0`.
pub fn arrow_array_to_bool(array: &ArrayRef, index: usize) -> Option<bool> {
    if array.is_null(index) {
        return None;
    }

    match array.data_type() {
        DataType::Boolean => {
            let bool_array = array.as_any().downcast_ref::<BooleanArray>()?;
            Some(bool_array.value(index))
        }
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => arrow_array_to_i64(array, index).map(|v| v != 0),
        _ => None,
    }
}
