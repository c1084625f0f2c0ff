use crate::config::RelationalCheck;
use crate::utils::has_columns;
use polars::prelude::*;
use tracing::debug;

const ROW_INDEX: &str = "__row_index";

/// Find rows whose key does not functionally determine the dependent columns.
///
/// Rows with a missing key or a missing dependent value are excluded. A key is
/// flagged when at least one dependent column takes more than one distinct
/// value for it. The result holds the key and dependent columns of every
/// flagged row, without duplicate tuples, sorted by key (stable).
pub fn detect_inconsistencies<S: AsRef<str>>(
    df: &DataFrame,
    key_column: &str,
    dependent_columns: &[S],
) -> PolarsResult<DataFrame> {
    let dependents: Vec<&str> = dependent_columns.iter().map(|c| c.as_ref()).collect();
    let mut columns: Vec<&str> = Vec::with_capacity(dependents.len() + 1);
    columns.push(key_column);
    columns.extend(dependents.iter().copied());

    let complete = columns
        .iter()
        .map(|c| col(*c).is_not_null())
        .reduce(|acc, e| acc.and(e))
        .unwrap_or(lit(true));

    let projected = df
        .clone()
        .lazy()
        .select(columns.iter().map(|c| col(*c)).collect::<Vec<_>>())
        .filter(complete)
        .with_row_index(ROW_INDEX, None);

    let splits_any = dependents
        .iter()
        .map(|c| col(*c).gt(lit(1)))
        .reduce(|acc, e| acc.or(e))
        .unwrap_or(lit(false));

    let flagged_keys = projected
        .clone()
        .group_by([col(key_column)])
        .agg(
            dependents
                .iter()
                .map(|c| col(*c).n_unique())
                .collect::<Vec<_>>(),
        )
        .filter(splits_any)
        .select([col(key_column)]);

    let violating = projected
        .join(
            flagged_keys,
            [col(key_column)],
            [col(key_column)],
            JoinArgs::new(JoinType::Inner),
        )
        .sort_by_exprs(
            vec![col(key_column), col(ROW_INDEX)],
            SortMultipleOptions::default(),
        )
        .select(columns.iter().map(|c| col(*c)).collect::<Vec<_>>())
        .collect()?;

    violating.unique_stable(None, UniqueKeepStrategy::First, None)
}

/// Result of running one configured relational check.
#[derive(Debug, Clone)]
pub struct InconsistencyReport {
    pub title: String,
    pub records: DataFrame,
}

impl InconsistencyReport {
    /// Run a check against the DataFrame.
    ///
    /// Returns `None` when the key or any dependent column is absent.
    pub fn run(df: &DataFrame, check: &RelationalCheck) -> PolarsResult<Option<Self>> {
        if !has_columns(df, &check.columns()) {
            debug!(
                "Skipping relational check on '{}': columns not present",
                check.key_column
            );
            return Ok(None);
        }

        let records = detect_inconsistencies(df, &check.key_column, &check.dependent_columns)?;
        Ok(Some(Self {
            title: check.title(),
            records,
        }))
    }

    /// Number of distinct key values in violation.
    pub fn flagged_keys(&self) -> PolarsResult<usize> {
        if self.records.height() == 0 {
            return Ok(0);
        }
        let key = self.records.get_columns()[0].as_materialized_series();
        Ok(key.n_unique()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::series_to_text;
    use pretty_assertions::assert_eq;

    fn text_column(df: &DataFrame, name: &str) -> Vec<Option<String>> {
        series_to_text(df.column(name).unwrap().as_materialized_series()).unwrap()
    }

    fn texts(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    #[test]
    fn test_one_postal_code_to_many_cities() {
        let df = df![
            "Postal Code" => [10001, 10001, 20002],
            "City" => ["Los Angeles", "San Francisco", "Boston"],
        ]
        .unwrap();

        let result = detect_inconsistencies(&df, "Postal Code", &["City"]).unwrap();

        assert_eq!(result.height(), 2);
        assert_eq!(text_column(&result, "Postal Code"), texts(&["10001", "10001"]));
        assert_eq!(
            text_column(&result, "City"),
            texts(&["Los Angeles", "San Francisco"])
        );
    }

    #[test]
    fn test_functional_mapping_is_empty() {
        let df = df![
            "Product ID" => ["P1", "P1", "P2"],
            "Product Name" => ["Chair", "Chair", "Desk"],
        ]
        .unwrap();

        let result = detect_inconsistencies(&df, "Product ID", &["Product Name"]).unwrap();

        assert_eq!(result.height(), 0);
        assert_eq!(
            crate::utils::column_names(&result),
            vec!["Product ID", "Product Name"]
        );
    }

    #[test]
    fn test_missing_values_are_excluded() {
        let df = df![
            "key" => [Some("A"), Some("A"), None, Some("B")],
            "dep" => [Some("x"), None, Some("y"), Some("z")],
        ]
        .unwrap();

        let result = detect_inconsistencies(&df, "key", &["dep"]).unwrap();

        assert_eq!(result.height(), 0);
    }

    #[test]
    fn test_any_dependent_flags_the_key() {
        let df = df![
            "id" => ["K", "K", "J", "J"],
            "name" => ["same", "same", "a", "a"],
            "group" => ["g1", "g2", "h", "h"],
        ]
        .unwrap();

        let result = detect_inconsistencies(&df, "id", &["name", "group"]).unwrap();

        assert_eq!(result.height(), 2);
        assert_eq!(text_column(&result, "id"), texts(&["K", "K"]));
        assert_eq!(text_column(&result, "group"), texts(&["g1", "g2"]));
    }

    #[test]
    fn test_result_is_deduplicated_and_sorted() {
        let df = df![
            "key" => ["B", "A", "B", "A", "B", "C"],
            "dep" => ["y", "p", "x", "q", "y", "only"],
        ]
        .unwrap();

        let result = detect_inconsistencies(&df, "key", &["dep"]).unwrap();

        assert_eq!(text_column(&result, "key"), texts(&["A", "A", "B", "B"]));
        assert_eq!(text_column(&result, "dep"), texts(&["p", "q", "y", "x"]));
    }

    #[test]
    fn test_report_skips_absent_columns() {
        let df = df!["Postal Code" => [1, 2]].unwrap();
        let check = RelationalCheck::new("Postal Code", ["City"]);

        assert!(InconsistencyReport::run(&df, &check).unwrap().is_none());
    }

    #[test]
    fn test_report_counts_flagged_keys() {
        let df = df![
            "Postal Code" => [1, 1, 2, 2, 3],
            "City" => ["a", "b", "c", "d", "e"],
        ]
        .unwrap();
        let check = RelationalCheck::new("Postal Code", ["City"]).with_label("Test");

        let report = InconsistencyReport::run(&df, &check).unwrap().unwrap();

        assert_eq!(report.title, "Inconsistent Mapping: Test");
        assert_eq!(report.records.height(), 4);
        assert_eq!(report.flagged_keys().unwrap(), 2);
    }
}
