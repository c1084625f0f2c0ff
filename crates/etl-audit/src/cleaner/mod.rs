//! Data cleaning module for the audited dataset.
//!
//! This module provides functionality for:
//! - Normalizing column names to lowercase snake_case
//! - Removing exact duplicate rows (keeping the first occurrence)
//! - Parsing date columns
//! - Coercing text columns that should be numeric

mod converters;

pub use converters::{DEFAULT_DATE_FORMATS, parse_date_value};

use crate::utils::is_datetime_dtype;
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Normalize one column name: trim, spaces to underscores, lowercase.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().replace(' ', "_").to_lowercase()
}

/// Data cleaner for the standardization passes of a run.
pub struct DataCleaner;

impl DataCleaner {
    /// Rename every column with [`normalize_column_name`].
    ///
    /// Fails when two columns normalize to the same name.
    pub fn normalize_column_names(df: &mut DataFrame) -> PolarsResult<()> {
        let normalized: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|name| normalize_column_name(name))
            .collect();

        df.set_column_names(normalized)?;
        debug!("Normalized column names: {:?}", df.get_column_names());
        Ok(())
    }

    /// Remove rows that exactly repeat an earlier row, preserving order.
    ///
    /// Returns the deduplicated DataFrame and the number of rows removed.
    pub fn drop_duplicates(df: DataFrame) -> PolarsResult<(DataFrame, usize)> {
        let before = df.height();
        let df = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
        let removed = before - df.height();

        if removed > 0 {
            info!("Removed {} duplicate rows", removed);
        } else {
            debug!("No duplicate rows found");
        }
        Ok((df, removed))
    }

    /// Convert a column to datetime. Unparseable values become missing.
    ///
    /// An empty `formats` slice selects [`DEFAULT_DATE_FORMATS`]. Returns the
    /// number of present values that could not be parsed, or `None` when the
    /// column is absent.
    pub fn parse_date_column<S: AsRef<str>>(
        df: &mut DataFrame,
        column: &str,
        formats: &[S],
    ) -> PolarsResult<Option<usize>> {
        let Ok(col) = df.column(column) else {
            debug!("Skipping date parsing of '{}': column not present", column);
            return Ok(None);
        };
        let series = col.as_materialized_series();

        if is_datetime_dtype(series.dtype()) {
            debug!("Column '{}' is already temporal", column);
            return Ok(Some(0));
        }

        let (parsed, unparseable) = if formats.is_empty() {
            converters::text_to_datetime(series, DEFAULT_DATE_FORMATS)?
        } else {
            let formats: Vec<&str> = formats.iter().map(|f| f.as_ref()).collect();
            converters::text_to_datetime(series, &formats)?
        };

        df.replace(column, parsed)?;
        if unparseable > 0 {
            warn!(
                "{} values in '{}' could not be parsed as dates and were set to missing",
                unparseable, column
            );
        }
        Ok(Some(unparseable))
    }

    /// Convert a text column to Float64 using the dataset's decimal separator.
    ///
    /// Columns that are absent or not text are left alone and yield `None`.
    /// Otherwise returns the number of present values that could not be parsed.
    pub fn coerce_numeric_column(
        df: &mut DataFrame,
        column: &str,
        decimal_separator: char,
    ) -> PolarsResult<Option<usize>> {
        let Ok(col) = df.column(column) else {
            return Ok(None);
        };
        let series = col.as_materialized_series();
        if series.dtype() != &DataType::String {
            return Ok(None);
        }

        let (coerced, unparseable) = converters::text_to_float(series, decimal_separator)?;
        df.replace(column, coerced)?;

        info!("Coerced text column '{}' to numeric", column);
        if unparseable > 0 {
            warn!(
                "{} values in '{}' were not numeric and were set to missing",
                unparseable, column
            );
        }
        Ok(Some(unparseable))
    }
}
