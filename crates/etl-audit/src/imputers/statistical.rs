//! Statistical imputation methods.

use crate::types::Imputation;
use crate::utils::{fill_numeric_nulls, is_numeric_dtype};
use polars::prelude::*;
use tracing::{debug, info};

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill missing values in one numeric column with its median.
    ///
    /// Returns `None` when the column is absent, not numeric, complete, or
    /// entirely missing. Filled columns become Float64.
    pub fn apply_numeric_median(
        df: &mut DataFrame,
        col_name: &str,
    ) -> PolarsResult<Option<Imputation>> {
        let Ok(col) = df.column(col_name) else {
            return Ok(None);
        };
        let series = col.as_materialized_series();

        let missing = series.null_count();
        if !is_numeric_dtype(series.dtype()) || missing == 0 {
            return Ok(None);
        }

        let Some(median) = series.median() else {
            debug!("Column '{}' has no present values, leaving it as is", col_name);
            return Ok(None);
        };

        let filled = fill_numeric_nulls(series, median)?;
        df.replace(col_name, filled)?;
        info!("Imputed {} values in '{}' with median {}", missing, col_name, median);

        Ok(Some(Imputation {
            column: col_name.to_string(),
            median,
            filled: missing,
        }))
    }

    /// Median-impute every numeric column with missing values, in column order.
    pub fn impute_numeric_medians(df: &mut DataFrame) -> PolarsResult<Vec<Imputation>> {
        let candidates: Vec<String> = df
            .get_columns()
            .iter()
            .filter(|col| is_numeric_dtype(col.dtype()) && col.null_count() > 0)
            .map(|col| col.name().to_string())
            .collect();

        let mut imputations = Vec::with_capacity(candidates.len());
        for name in candidates {
            if let Some(imputation) = Self::apply_numeric_median(df, &name)? {
                imputations.push(imputation);
            }
        }
        Ok(imputations)
    }
}
