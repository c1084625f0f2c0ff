//! Report sections of an audit run.

/// Stages of an audit run, in execution order.
///
/// Each stage opens one section of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    /// Completeness and redundancy measurements
    QualityAssessment,
    /// Relational (functional dependency) checks
    InconsistencyCheck,
    /// Derived KPI and attribute columns
    Enrichment,
    /// Standardization, deduplication, date parsing and imputation
    Cleaning,
    /// Final row count, numeric summary and export
    FinalSummary,
}

impl PipelineStage {
    /// Section title used in the log and the report.
    pub fn title(&self) -> &'static str {
        match self {
            Self::QualityAssessment => "1. Data Quality Assessment",
            Self::InconsistencyCheck => "2. Logical Inconsistency Check",
            Self::Enrichment => "3. Calculations & KPI Enrichment",
            Self::Cleaning => "4. Data Cleaning & Transformation Log",
            Self::FinalSummary => "5. Final Dataset Summary",
        }
    }

    /// Heading level of the section in the report.
    pub fn heading_level(&self) -> u8 {
        match self {
            Self::InconsistencyCheck => 2,
            _ => 1,
        }
    }
}
