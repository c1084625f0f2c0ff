//! KPI and attribute derivation.
//!
//! Adds computed columns declared as [`Derivation`]s. A derivation is applied
//! only when all of its source columns are present.

use crate::config::Derivation;
use crate::utils::{has_columns, series_to_text};
use polars::prelude::*;
use tracing::{debug, info};

/// Text written in place of a missing source value in a concatenation.
pub const MISSING_TEXT: &str = "nan";

/// Applies configured derivations to a DataFrame.
pub struct KpiDeriver;

impl KpiDeriver {
    /// Apply one derivation in place.
    ///
    /// Returns `false` without touching the DataFrame when a source column is absent.
    pub fn apply(df: &mut DataFrame, derivation: &Derivation) -> PolarsResult<bool> {
        if !has_columns(df, &derivation.source_columns()) {
            debug!(
                "Skipping derivation of '{}': source columns not present",
                derivation.output()
            );
            return Ok(false);
        }

        let derived = match derivation {
            Derivation::Ratio {
                numerator,
                denominator,
                output,
            } => Self::ratio(df, numerator, denominator, output)?,
            Derivation::Concat {
                columns,
                separator,
                output,
            } => Self::concat(df, columns, separator, output)?,
        };

        df.with_column(derived)?;
        info!("Derived column '{}'", derivation.output());
        Ok(true)
    }

    /// Report line for an applied derivation.
    pub fn describe(derivation: &Derivation) -> String {
        match derivation {
            Derivation::Ratio {
                numerator,
                denominator,
                output,
            } => format!("Added KPI: {} ({} / {})", output, numerator, denominator),
            Derivation::Concat { output, .. } => format!("Added Attribute: {}", output),
        }
    }

    /// `numerator / denominator` with every non-finite result replaced by 0.
    fn ratio(
        df: &DataFrame,
        numerator: &str,
        denominator: &str,
        output: &str,
    ) -> PolarsResult<Series> {
        let num = df
            .column(numerator)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        let den = df
            .column(denominator)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;

        let values: Vec<Option<f64>> = num
            .f64()?
            .into_iter()
            .zip(den.f64()?.into_iter())
            .map(|pair| match pair {
                (Some(n), Some(d)) => {
                    let ratio = n / d;
                    Some(if ratio.is_finite() { ratio } else { 0.0 })
                }
                _ => None,
            })
            .collect();

        Ok(Series::new(output.into(), values))
    }

    /// Text concatenation of every source value; missing values are written as [`MISSING_TEXT`].
    fn concat(
        df: &DataFrame,
        columns: &[String],
        separator: &str,
        output: &str,
    ) -> PolarsResult<Series> {
        let mut sources = Vec::with_capacity(columns.len());
        for name in columns {
            sources.push(series_to_text(df.column(name)?.as_materialized_series())?);
        }

        let values: Vec<String> = (0..df.height())
            .map(|row| {
                sources
                    .iter()
                    .map(|col| col[row].as_deref().unwrap_or(MISSING_TEXT))
                    .collect::<Vec<&str>>()
                    .join(separator)
            })
            .collect();

        Ok(Series::new(output.into(), values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn profit_margin() -> Derivation {
        Derivation::Ratio {
            numerator: "Profit".to_string(),
            denominator: "Sales".to_string(),
            output: "Profit_Margin".to_string(),
        }
    }

    fn full_name() -> Derivation {
        Derivation::Concat {
            columns: vec!["Product ID".to_string(), "Product Name".to_string()],
            separator: " | ".to_string(),
            output: "Product_Full_Name".to_string(),
        }
    }

    fn margins(df: &DataFrame) -> Vec<Option<f64>> {
        df.column("Profit_Margin")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_profit_margin() {
        let mut df = df![
            "Sales" => [Some(100.0), Some(0.0), Some(0.0), None, Some(-4.0)],
            "Profit" => [Some(25.0), Some(5.0), Some(0.0), Some(1.0), Some(2.0)],
        ]
        .unwrap();

        assert!(KpiDeriver::apply(&mut df, &profit_margin()).unwrap());

        assert_eq!(
            margins(&df),
            vec![Some(0.25), Some(0.0), Some(0.0), None, Some(-0.5)]
        );
    }

    #[test]
    fn test_profit_margin_from_integer_columns() {
        let mut df = df!["Sales" => [200, 0], "Profit" => [50, -3]].unwrap();

        KpiDeriver::apply(&mut df, &profit_margin()).unwrap();

        assert_eq!(margins(&df), vec![Some(0.25), Some(0.0)]);
    }

    #[test]
    fn test_product_full_name() {
        let mut df = df![
            "Product ID" => [Some("FUR-1"), Some("OFF-2"), None],
            "Product Name" => [Some("Chair"), None, Some("Desk")],
        ]
        .unwrap();

        assert!(KpiDeriver::apply(&mut df, &full_name()).unwrap());

        let names: Vec<Option<&str>> = df
            .column("Product_Full_Name")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(
            names,
            vec![Some("FUR-1 | Chair"), Some("OFF-2 | nan"), Some("nan | Desk")]
        );
        assert_eq!(df.column("Product_Full_Name").unwrap().null_count(), 0);
    }

    #[test]
    fn test_absent_source_is_skipped() {
        let mut df = df!["Sales" => [1.0, 2.0]].unwrap();

        assert!(!KpiDeriver::apply(&mut df, &profit_margin()).unwrap());
        assert_eq!(df.width(), 1);
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            KpiDeriver::describe(&profit_margin()),
            "Added KPI: Profit_Margin (Profit / Sales)"
        );
        assert_eq!(
            KpiDeriver::describe(&full_name()),
            "Added Attribute: Product_Full_Name"
        );
    }
}
