//! Rendering of the finished report document to a file.

use super::document::{DocumentBlock, ReportDocument};
use crate::config::ReportFormat;
use crate::error::{EtlError, Result, ResultExt};
use docx_rs::{Docx, Paragraph, Run, Style, StyleType, Table, TableCell, TableRow};
use std::fs::{self, File};
use std::path::Path;

/// Writes a [`ReportDocument`] to disk in a specific format.
pub trait DocumentRenderer {
    /// Short name of the output format, used in log lines.
    fn format_name(&self) -> &'static str;

    /// Write the document to `path`, replacing any existing file.
    fn render(&self, document: &ReportDocument, path: &Path) -> Result<()>;
}

/// Select the renderer for a configured report format.
pub fn renderer_for(format: ReportFormat) -> Box<dyn DocumentRenderer + Send> {
    match format {
        ReportFormat::Docx => Box::new(DocxRenderer),
        ReportFormat::Json => Box::new(JsonRenderer),
    }
}

fn create_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).context(format!("Creating '{}'", parent.display()))?;
    }
    Ok(())
}

// ============================================================================
// Word document
// ============================================================================

/// Renders the report as a Word document.
pub struct DocxRenderer;

const TITLE_STYLE: &str = "Title";

/// (style id, display name, size in half-points)
const HEADING_STYLES: [(&str, &str, usize); 3] = [
    ("Heading1", "Heading 1", 32),
    ("Heading2", "Heading 2", 26),
    ("Heading3", "Heading 3", 24),
];

impl DocxRenderer {
    fn heading_style(level: u8) -> &'static str {
        match level {
            0 => TITLE_STYLE,
            1 => HEADING_STYLES[0].0,
            2 => HEADING_STYLES[1].0,
            _ => HEADING_STYLES[2].0,
        }
    }

    fn build(document: &ReportDocument) -> Docx {
        let mut docx = Docx::new().add_style(
            Style::new(TITLE_STYLE, StyleType::Paragraph)
                .name("Title")
                .size(52)
                .bold(),
        );
        for (id, name, size) in HEADING_STYLES {
            docx = docx.add_style(Style::new(id, StyleType::Paragraph).name(name).size(size).bold());
        }

        docx = docx.add_paragraph(
            Paragraph::new()
                .add_run(Run::new().add_text(document.title.as_str()))
                .style(TITLE_STYLE),
        );

        for block in &document.blocks {
            docx = match block {
                DocumentBlock::Heading { text, level } => docx.add_paragraph(
                    Paragraph::new()
                        .add_run(Run::new().add_text(text.as_str()))
                        .style(Self::heading_style(*level)),
                ),
                DocumentBlock::Paragraph { text } => docx.add_paragraph(
                    Paragraph::new().add_run(Run::new().add_text(text.as_str())),
                ),
                DocumentBlock::Table(table) => {
                    let header = TableRow::new(
                        table
                            .header
                            .iter()
                            .map(|name| {
                                TableCell::new().add_paragraph(
                                    Paragraph::new()
                                        .add_run(Run::new().add_text(name.as_str()).bold()),
                                )
                            })
                            .collect(),
                    );
                    let mut rows = vec![header];
                    rows.extend(table.rows.iter().map(|row| {
                        TableRow::new(
                            row.iter()
                                .map(|cell| {
                                    TableCell::new().add_paragraph(
                                        Paragraph::new().add_run(Run::new().add_text(cell.as_str())),
                                    )
                                })
                                .collect(),
                        )
                    }));
                    docx.add_table(Table::new(rows))
                }
            };
        }
        docx
    }
}

impl DocumentRenderer for DocxRenderer {
    fn format_name(&self) -> &'static str {
        "docx"
    }

    fn render(&self, document: &ReportDocument, path: &Path) -> Result<()> {
        create_parent_dirs(path)?;
        let file = File::create(path).context(format!("Creating '{}'", path.display()))?;
        Self::build(document)
            .build()
            .pack(file)
            .map_err(|e| EtlError::Report(e.to_string()))
    }
}

// ============================================================================
// JSON
// ============================================================================

/// Renders the report block structure as pretty-printed JSON.
pub struct JsonRenderer;

impl DocumentRenderer for JsonRenderer {
    fn format_name(&self) -> &'static str {
        "json"
    }

    fn render(&self, document: &ReportDocument, path: &Path) -> Result<()> {
        create_parent_dirs(path)?;
        let json = serde_json::to_string_pretty(document)?;
        fs::write(path, json).context(format!("Writing '{}'", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::document::TableBlock;

    fn sample_document() -> ReportDocument {
        let mut doc = ReportDocument::new("Technical Data Analysis Report");
        doc.add_heading("1. Data Quality Assessment", 1);
        doc.add_paragraph("Fully Duplicated Rows: 0");
        doc.add_table(TableBlock {
            header: vec!["column".to_string(), "missing_count".to_string()],
            rows: vec![vec!["City".to_string(), "2".to_string()]],
        });
        doc
    }

    #[test]
    fn test_json_renderer_writes_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");

        JsonRenderer.render(&sample_document(), &path).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["blocks"].as_array().unwrap().len(), 3);
        assert_eq!(written["blocks"][2]["header"][1], "missing_count");
    }

    #[test]
    fn test_docx_renderer_writes_zip_package() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.docx");

        DocxRenderer.render(&sample_document(), &path).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_renderer_for_format() {
        assert_eq!(renderer_for(ReportFormat::Docx).format_name(), "docx");
        assert_eq!(renderer_for(ReportFormat::Json).format_name(), "json");
    }
}
