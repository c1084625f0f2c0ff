use super::document::{EMPTY_TABLE_NOTICE, ReportDocument, TableBlock};
use super::render::DocumentRenderer;
use crate::error::{Result, ResultExt};
use chrono::Local;
use polars::prelude::DataFrame;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info};

const HEADER_RULE_WIDTH: usize = 80;
const SECTION_RULE_WIDTH: usize = 40;

/// Dual-sink audit log.
///
/// Every message goes to the console (through `tracing`), to an append-only
/// text sink flushed after each write, and into a [`ReportDocument`] that is
/// rendered once by [`AuditReporter::finalize`].
pub struct AuditReporter<W: Write> {
    sink: W,
    document: ReportDocument,
    renderer: Box<dyn DocumentRenderer + Send>,
    report_path: PathBuf,
}

impl AuditReporter<File> {
    /// Truncate (or create) the text log at `text_log_path` and start a new document.
    pub fn create(
        text_log_path: &Path,
        report_path: &Path,
        title: &str,
        renderer: Box<dyn DocumentRenderer + Send>,
    ) -> Result<Self> {
        if let Some(parent) = text_log_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context(format!("Creating '{}'", parent.display()))?;
        }
        let file = File::create(text_log_path)
            .context(format!("Opening text log '{}'", text_log_path.display()))?;
        Self::new(file, report_path, title, renderer)
    }
}

impl<W: Write> AuditReporter<W> {
    /// Start a reporter over any text sink; the log header is written immediately.
    pub fn new(
        sink: W,
        report_path: &Path,
        title: &str,
        renderer: Box<dyn DocumentRenderer + Send>,
    ) -> Result<Self> {
        let mut reporter = Self {
            sink,
            document: ReportDocument::new(title),
            renderer,
            report_path: report_path.to_path_buf(),
        };

        let header = format!(
            "DATA ANALYSIS LOG | Generated: {}\n{}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            "=".repeat(HEADER_RULE_WIDTH)
        );
        reporter.write_text(&header)?;
        Ok(reporter)
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.sink
            .write_all(text.as_bytes())
            .and_then(|_| self.sink.flush())
            .context("Writing text log")
    }

    fn write_line(&mut self, message: &str) -> Result<()> {
        let line = format!("{} | {}\n", Local::now().format("%H:%M:%S"), message);
        self.write_text(&line)
    }

    /// Start a titled section at the given heading level.
    pub fn open_section(&mut self, title: &str, level: u8) -> Result<()> {
        info!("--- {} ---", title.to_uppercase());
        let block = format!("\n\nSECTION: {}\n{}\n", title, "-".repeat(SECTION_RULE_WIDTH));
        self.write_text(&block)?;
        self.document.add_heading(title, level);
        Ok(())
    }

    /// Record a message as a timestamped log line and a document paragraph.
    pub fn log(&mut self, message: &str) -> Result<()> {
        info!("{}", message);
        self.write_line(message)?;
        self.document.add_paragraph(message);
        Ok(())
    }

    /// Record a critical condition.
    pub fn critical(&mut self, message: &str) -> Result<()> {
        let message = format!("CRITICAL: {}", message);
        error!("{}", message);
        self.write_line(&message)?;
        self.document.add_paragraph(message);
        Ok(())
    }

    /// Log `title` and add up to `max_rows` rows of `df` as a table.
    ///
    /// An empty DataFrame adds a notice paragraph instead. `None` or `Some(0)`
    /// shows every row; otherwise omitted rows are reported with a truncation
    /// notice.
    pub fn log_table(
        &mut self,
        df: &DataFrame,
        title: &str,
        max_rows: Option<usize>,
    ) -> Result<()> {
        self.log(title)?;

        if df.height() == 0 {
            self.document.add_paragraph(EMPTY_TABLE_NOTICE);
            return Ok(());
        }

        let limit = max_rows.filter(|&n| n > 0).unwrap_or(df.height());
        let table = TableBlock::from_dataframe(df, limit).context("Rendering report table")?;
        self.document.add_table(table);

        if df.height() > limit {
            self.document.add_paragraph(format!(
                "... [Truncated: {} more rows]",
                df.height() - limit
            ));
        }
        self.document.add_paragraph("");
        Ok(())
    }

    /// The document built so far.
    pub fn document(&self) -> &ReportDocument {
        &self.document
    }

    /// Render the document to the report path and release the text sink.
    pub fn finalize(mut self) -> Result<W> {
        self.renderer.render(&self.document, &self.report_path)?;
        info!(
            "Report ({}) saved to: {}",
            self.renderer.format_name(),
            self.report_path.display()
        );
        self.sink.flush().context("Flushing text log")?;
        Ok(self.sink)
    }

    /// Release the text sink without rendering the document.
    pub fn abandon(mut self) -> Result<W> {
        self.sink.flush().context("Flushing text log")?;
        Ok(self.sink)
    }
}
