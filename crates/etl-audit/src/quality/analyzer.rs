use crate::types::MissingValueCount;
use crate::utils::{has_columns, is_numeric_dtype};
use polars::prelude::*;
use tracing::debug;

/// Completeness and redundancy measurements over a DataFrame.
pub struct QualityAssessor;

impl QualityAssessor {
    /// Missing-value counts for every column that has at least one, in column order.
    pub fn count_missing(df: &DataFrame) -> Vec<MissingValueCount> {
        df.get_columns()
            .iter()
            .filter(|col| col.null_count() > 0)
            .map(|col| MissingValueCount {
                column: col.name().to_string(),
                missing: col.null_count(),
            })
            .collect()
    }

    /// The missing-value counts as a two-column table for the report.
    pub fn missing_summary(df: &DataFrame) -> PolarsResult<DataFrame> {
        let counts = Self::count_missing(df);
        let columns: Vec<&str> = counts.iter().map(|c| c.column.as_str()).collect();
        let missing: Vec<u64> = counts.iter().map(|c| c.missing as u64).collect();

        DataFrame::new(vec![
            Column::new("column".into(), columns),
            Column::new("missing_count".into(), missing),
        ])
    }

    /// Rows that exactly repeat an earlier row. The first occurrence is not counted.
    pub fn count_full_duplicates(df: &DataFrame) -> PolarsResult<usize> {
        let unique = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
        Ok(df.height() - unique.height())
    }

    /// Rows whose primary-key tuple repeats an earlier row's tuple.
    ///
    /// Returns `None` when the key list is empty or any key column is absent.
    pub fn count_key_duplicates<S: AsRef<str>>(
        df: &DataFrame,
        key_columns: &[S],
    ) -> PolarsResult<Option<usize>> {
        if key_columns.is_empty() || !has_columns(df, key_columns) {
            debug!("Skipping primary key check: key columns not present");
            return Ok(None);
        }

        let keys: Vec<String> = key_columns.iter().map(|k| k.as_ref().to_string()).collect();
        let unique = df.unique_stable(Some(keys.as_slice()), UniqueKeepStrategy::First, None)?;
        Ok(Some(df.height() - unique.height()))
    }

    /// Min, median, max and mean of the named numeric columns.
    ///
    /// Columns that are absent or not numeric are left out.
    pub fn numeric_summary<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> PolarsResult<DataFrame> {
        let mut names = Vec::new();
        let mut mins = Vec::new();
        let mut medians = Vec::new();
        let mut maxs = Vec::new();
        let mut means = Vec::new();

        for name in columns {
            let Ok(col) = df.column(name.as_ref()) else {
                continue;
            };
            let series = col.as_materialized_series();
            if !is_numeric_dtype(series.dtype()) {
                continue;
            }

            names.push(name.as_ref().to_string());
            mins.push(series.min::<f64>()?);
            medians.push(series.median());
            maxs.push(series.max::<f64>()?);
            means.push(series.mean());
        }

        DataFrame::new(vec![
            Column::new("column".into(), names),
            Column::new("min".into(), mins),
            Column::new("median".into(), medians),
            Column::new("max".into(), maxs),
            Column::new("mean".into(), means),
        ])
    }
}
