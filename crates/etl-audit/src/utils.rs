//! Shared utilities for the ETL audit pipeline.
//!
//! Column-presence checks, dtype predicates, cell text renderings for the
//! reporter and locale-aware numeric parsing.

use polars::prelude::*;

// =============================================================================
// Schema Utilities
// =============================================================================

/// Column names of a DataFrame, in order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect()
}

/// Check that every named column is present in the DataFrame.
pub fn has_columns<S: AsRef<str>>(df: &DataFrame, required: &[S]) -> bool {
    required
        .iter()
        .all(|name| df.get_column_index(name.as_ref()).is_some())
}

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a floating point type.
#[inline]
pub fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Check if a DataType is a date or datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Date)
}

// =============================================================================
// Text Rendering Utilities
// =============================================================================

/// Textual rendering of every value of a Series; missing values stay `None`.
pub fn series_to_text(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let text = series.cast(&DataType::String)?;
    let values = text.str()?;
    Ok(values
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

/// Render the cells of a Series for display: floats with two decimals,
/// everything else in its default text form, missing values as `null`.
pub fn display_cells(series: &Series) -> PolarsResult<Vec<String>> {
    if is_float_dtype(series.dtype()) {
        let floats = series.cast(&DataType::Float64)?;
        return Ok(floats
            .f64()?
            .into_iter()
            .map(|value| match value {
                Some(v) => format!("{:.2}", v),
                None => "null".to_string(),
            })
            .collect());
    }

    Ok(series_to_text(series)?
        .into_iter()
        .map(|value| value.unwrap_or_else(|| "null".to_string()))
        .collect())
}

// =============================================================================
// Numeric Parsing Utilities
// =============================================================================

/// Characters commonly used in numeric formatting that should be stripped.
pub const NUMERIC_FORMAT_CHARS: [char; 5] = ['$', '%', '€', '£', ' '];

/// Try to parse a string as `f64` given the dataset's decimal separator.
///
/// With a `,` decimal separator, `.` is treated as a thousands separator;
/// with `.`, commas are thousands separators.
pub fn parse_numeric_string(s: &str, decimal_separator: char) -> Option<f64> {
    let mut cleaned: String = s
        .trim()
        .chars()
        .filter(|c| !NUMERIC_FORMAT_CHARS.contains(c))
        .collect();

    if decimal_separator == ',' {
        cleaned = cleaned.replace('.', "").replace(',', ".");
    } else {
        cleaned = cleaned.replace(',', "");
    }

    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
///
/// The result is a Float64 Series with the same name.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let floats = series.cast(&DataType::Float64)?;
    let filled: Vec<f64> = floats
        .f64()?
        .into_iter()
        .map(|value| value.unwrap_or(fill_value))
        .collect();

    Ok(Series::new(series.name().clone(), filled))
}

// =============================================================================
// Tests
// =============================================================================
