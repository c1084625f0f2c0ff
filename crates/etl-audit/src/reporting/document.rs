//! In-memory structure of the audit report.

use crate::utils::{column_names, display_cells};
use chrono::Local;
use polars::prelude::*;
use serde::Serialize;

/// Paragraph written in place of an empty table.
pub const EMPTY_TABLE_NOTICE: &str = "No issues/data found for this metric.";

/// Ordered blocks of the report, built up during a run and rendered once.
#[derive(Debug, Clone, Serialize)]
pub struct ReportDocument {
    pub title: String,
    pub generated_at: String,
    pub blocks: Vec<DocumentBlock>,
}

/// One block of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentBlock {
    Heading { text: String, level: u8 },
    Paragraph { text: String },
    Table(TableBlock),
}

/// A bordered table with a bold header row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableBlock {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableBlock {
    /// Render the first `max_rows` rows of a DataFrame as display text.
    pub fn from_dataframe(df: &DataFrame, max_rows: usize) -> PolarsResult<Self> {
        let shown = df.head(Some(max_rows));

        let mut columns = Vec::with_capacity(shown.width());
        for col in shown.get_columns() {
            columns.push(display_cells(col.as_materialized_series())?);
        }

        let rows = (0..shown.height())
            .map(|row| columns.iter().map(|cells| cells[row].clone()).collect())
            .collect();

        Ok(Self {
            header: column_names(&shown),
            rows,
        })
    }
}

impl ReportDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            blocks: Vec::new(),
        }
    }

    pub fn add_heading(&mut self, text: impl Into<String>, level: u8) {
        self.blocks.push(DocumentBlock::Heading {
            text: text.into(),
            level,
        });
    }

    pub fn add_paragraph(&mut self, text: impl Into<String>) {
        self.blocks.push(DocumentBlock::Paragraph { text: text.into() });
    }

    pub fn add_table(&mut self, table: TableBlock) {
        self.blocks.push(DocumentBlock::Table(table));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_table_from_dataframe_truncates_and_formats() {
        let df = df![
            "postal_code" => [10001, 10001, 20002],
            "margin" => [Some(0.256), None, Some(1.0)],
        ]
        .unwrap();

        let table = TableBlock::from_dataframe(&df, 2).unwrap();

        assert_eq!(table.header, vec!["postal_code", "margin"]);
        assert_eq!(
            table.rows,
            vec![
                vec!["10001".to_string(), "0.26".to_string()],
                vec!["10001".to_string(), "null".to_string()],
            ]
        );
    }

    #[test]
    fn test_document_serializes_tagged_blocks() {
        let mut doc = ReportDocument::new("Audit");
        doc.add_heading("1. Data Quality Assessment", 1);
        doc.add_paragraph("Initial Shape: 3 rows, 2 columns.");

        let json = serde_json::to_value(&doc).unwrap();

        assert_eq!(json["title"], "Audit");
        assert_eq!(json["blocks"][0]["type"], "heading");
        assert_eq!(json["blocks"][0]["level"], 1);
        assert_eq!(json["blocks"][1]["type"], "paragraph");
    }
}
