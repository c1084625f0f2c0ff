//! Report generation module.
//!
//! [`AuditReporter`] writes every message to the console, a plain-text log
//! and an in-memory [`ReportDocument`]. The document is rendered once at the
//! end of a run by a [`DocumentRenderer`] chosen from the configured
//! [`ReportFormat`](crate::config::ReportFormat). [`export_csv`] writes the
//! cleaned dataset.
//!
//! # Example
//!
//! ```rust,ignore
//! use etl_audit::reporting::{AuditReporter, renderer_for};
//!
//! let mut reporter = AuditReporter::create(
//!     "audit_log.txt".as_ref(),
//!     "audit_report.docx".as_ref(),
//!     "Technical Data Analysis Report",
//!     renderer_for(ReportFormat::Docx),
//! )?;
//! reporter.open_section("1. Data Quality Assessment", 1)?;
//! reporter.log_table(&missing_summary, "Missing Values Summary", 15)?;
//! reporter.finalize()?;
//! ```

mod document;
mod export;
mod logger;
mod render;

pub use document::{DocumentBlock, EMPTY_TABLE_NOTICE, ReportDocument, TableBlock};
pub use export::export_csv;
pub use logger::AuditReporter;
pub use render::{DocumentRenderer, DocxRenderer, JsonRenderer, renderer_for};
