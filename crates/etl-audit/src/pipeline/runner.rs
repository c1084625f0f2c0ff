//! Main audit pipeline module.
//!
//! This module provides the `Pipeline` struct and builder that sequence a
//! complete run: load, assess, check, derive, clean, export and report.

use crate::cleaner::{DataCleaner, normalize_column_name};
use crate::config::PipelineConfig;
use crate::enrichment::KpiDeriver;
use crate::error::{EtlError, Result, ResultExt};
use crate::imputers::StatisticalImputer;
use crate::loader::{LoadOptions, load_table};
use crate::pipeline::PipelineStage;
use crate::quality::{InconsistencyReport, QualityAssessor};
use crate::reporting::{AuditReporter, DocumentRenderer, export_csv, renderer_for};
use crate::types::{InconsistencyCount, ParseWarning, RunOutcome, RunSummary};
use polars::prelude::*;
use std::fs::File;
use std::time::Instant;
use tracing::{error, info};

type Reporter = AuditReporter<File>;

/// The audit pipeline.
///
/// Use [`Pipeline::builder()`] to create a pipeline with a custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use etl_audit::{Pipeline, PipelineConfig, RunOutcome};
///
/// let outcome = Pipeline::builder()
///     .config(PipelineConfig::builder().input_path("orders.csv").build()?)
///     .build()?
///     .run()?;
///
/// if let RunOutcome::Completed(summary) = outcome {
///     println!("{} rows exported", summary.final_shape.0);
/// }
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    renderer: Option<Box<dyn DocumentRenderer + Send>>,
}

// Pipeline can be moved to a worker thread before running
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage once, top to bottom.
    ///
    /// A missing input file is not an error: it is logged as critical in the
    /// text log and reported as [`RunOutcome::MissingInput`], and neither the
    /// cleaned dataset nor the report is written.
    ///
    /// # Errors
    ///
    /// Fails when an output cannot be written or the data cannot be processed.
    pub fn run(self) -> Result<RunOutcome> {
        let Self { config, renderer } = self;
        let renderer = renderer.unwrap_or_else(|| renderer_for(config.report_format));

        let mut reporter = AuditReporter::create(
            &config.text_log_path,
            &config.report_path,
            &config.report_title,
            renderer,
        )?;

        match Self::run_stages(&config, &mut reporter) {
            Ok(Some(summary)) => {
                reporter.finalize()?;
                info!(
                    "Process complete. See '{}' for the full analysis.",
                    config.report_path.display()
                );
                Ok(RunOutcome::Completed(summary))
            }
            Ok(None) => {
                reporter.abandon()?;
                Ok(RunOutcome::MissingInput(config.input_path.clone()))
            }
            Err(e) => {
                error!("Pipeline error: {}", e);
                reporter.abandon()?;
                Err(e)
            }
        }
    }

    fn run_stages(config: &PipelineConfig, reporter: &mut Reporter) -> Result<Option<RunSummary>> {
        let start_time = Instant::now();

        info!("Step 1: Loading dataset...");
        let df = match load_table(&LoadOptions::from_config(config)) {
            Ok(df) => df,
            Err(EtlError::MissingInput(path)) => {
                reporter.critical(&format!("{} not found.", path.display()))?;
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let mut summary = RunSummary::new();
        summary.initial_shape = df.shape();

        info!("Step 2: Assessing data quality...");
        Self::assess_quality(config, reporter, &df, &mut summary)?;

        info!("Step 3: Checking relational consistency...");
        Self::check_inconsistencies(config, reporter, &df, &mut summary)?;

        info!("Step 4: Deriving KPIs and attributes...");
        let mut df = df;
        Self::derive_columns(config, reporter, &mut df, &mut summary)?;

        info!("Step 5: Cleaning dataset...");
        let mut df = Self::clean(config, reporter, df, &mut summary)?;

        info!("Step 6: Exporting results...");
        Self::finish(config, reporter, &mut df, &mut summary)?;

        summary.duration_ms = start_time.elapsed().as_millis() as u64;
        Ok(Some(summary))
    }

    fn open_stage(reporter: &mut Reporter, stage: PipelineStage) -> Result<()> {
        reporter.open_section(stage.title(), stage.heading_level())
    }

    fn assess_quality(
        config: &PipelineConfig,
        reporter: &mut Reporter,
        df: &DataFrame,
        summary: &mut RunSummary,
    ) -> Result<()> {
        Self::open_stage(reporter, PipelineStage::QualityAssessment)?;
        let (rows, columns) = df.shape();
        reporter.log(&format!("Initial Shape: {} rows, {} columns.", rows, columns))?;

        summary.missing_values = QualityAssessor::count_missing(df);
        let missing = QualityAssessor::missing_summary(df).context("Counting missing values")?;
        reporter.log_table(&missing, "Missing Values Summary", config.max_table_rows)?;

        summary.full_duplicates =
            QualityAssessor::count_full_duplicates(df).context("Counting duplicate rows")?;
        reporter.log(&format!("Fully Duplicated Rows: {}", summary.full_duplicates))?;

        summary.key_duplicates =
            QualityAssessor::count_key_duplicates(df, &config.primary_key_columns)
                .context("Counting duplicate keys")?;
        if let Some(count) = summary.key_duplicates {
            reporter.log(&format!(
                "Duplicate Primary Keys ({}): {}",
                config.primary_key_columns.join(", "),
                count
            ))?;
        }
        Ok(())
    }

    fn check_inconsistencies(
        config: &PipelineConfig,
        reporter: &mut Reporter,
        df: &DataFrame,
        summary: &mut RunSummary,
    ) -> Result<()> {
        Self::open_stage(reporter, PipelineStage::InconsistencyCheck)?;

        for check in &config.relational_checks {
            let Some(report) =
                InconsistencyReport::run(df, check).context("Detecting inconsistencies")?
            else {
                continue;
            };

            reporter.log_table(&report.records, &report.title, config.max_table_rows)?;
            summary.inconsistencies.push(InconsistencyCount {
                title: report.title.clone(),
                key_column: check.key_column.clone(),
                dependent_columns: check.dependent_columns.clone(),
                records: report.records.height(),
                keys: report.flagged_keys()?,
            });
        }
        Ok(())
    }

    fn derive_columns(
        config: &PipelineConfig,
        reporter: &mut Reporter,
        df: &mut DataFrame,
        summary: &mut RunSummary,
    ) -> Result<()> {
        Self::open_stage(reporter, PipelineStage::Enrichment)?;

        for derivation in &config.derivations {
            if KpiDeriver::apply(df, derivation)
                .context(format!("Deriving '{}'", derivation.output()))?
            {
                reporter.log(&KpiDeriver::describe(derivation))?;
                summary.derived_columns.push(derivation.output().to_string());
            }
        }
        Ok(())
    }

    fn clean(
        config: &PipelineConfig,
        reporter: &mut Reporter,
        df: DataFrame,
        summary: &mut RunSummary,
    ) -> Result<DataFrame> {
        Self::open_stage(reporter, PipelineStage::Cleaning)?;

        let mut df = df;
        DataCleaner::normalize_column_names(&mut df).context("Normalizing column names")?;
        reporter.log("Standardized column names to lowercase snake_case.")?;

        let (mut df, removed) =
            DataCleaner::drop_duplicates(df).context("Dropping duplicate rows")?;
        summary.duplicates_removed = removed;
        reporter.log(&format!("Dropped {} duplicate rows.", removed))?;

        for column in config.date_columns.iter().map(|c| normalize_column_name(c)) {
            let Some(unparseable) =
                DataCleaner::parse_date_column(&mut df, &column, &config.date_formats)
                    .context(format!("Parsing dates in '{}'", column))?
            else {
                continue;
            };

            reporter.log(&format!("Converted '{}' to datetime.", column))?;
            summary.parsed_date_columns.push(column.clone());
            Self::record_parse_warning(reporter, summary, column, unparseable)?;
        }

        for column in config.numeric_columns.iter().map(|c| normalize_column_name(c)) {
            let Some(unparseable) =
                DataCleaner::coerce_numeric_column(&mut df, &column, config.decimal_separator)
                    .context(format!("Coercing '{}' to numeric", column))?
            else {
                continue;
            };

            reporter.log(&format!("Coerced '{}' from text to numeric.", column))?;
            summary.coerced_numeric_columns.push(column.clone());
            Self::record_parse_warning(reporter, summary, column, unparseable)?;
        }

        summary.imputations =
            StatisticalImputer::impute_numeric_medians(&mut df).context("Imputing medians")?;
        for imputation in &summary.imputations {
            reporter.log(&format!(
                "Imputed missing values in '{}' with median: {}",
                imputation.column, imputation.median
            ))?;
        }

        Ok(df)
    }

    fn record_parse_warning(
        reporter: &mut Reporter,
        summary: &mut RunSummary,
        column: String,
        unparseable: usize,
    ) -> Result<()> {
        if unparseable == 0 {
            return Ok(());
        }
        reporter.log(&format!(
            "Warning: {} values in '{}' could not be parsed and were set to missing.",
            unparseable, column
        ))?;
        summary.parse_warnings.push(ParseWarning {
            column,
            unparseable,
        });
        Ok(())
    }

    fn finish(
        config: &PipelineConfig,
        reporter: &mut Reporter,
        df: &mut DataFrame,
        summary: &mut RunSummary,
    ) -> Result<()> {
        Self::open_stage(reporter, PipelineStage::FinalSummary)?;
        reporter.log(&format!("Final Row Count: {}", df.height()))?;

        let numeric_columns: Vec<String> = config
            .numeric_columns
            .iter()
            .map(|c| normalize_column_name(c))
            .collect();
        let stats = QualityAssessor::numeric_summary(df, &numeric_columns)
            .context("Summarizing numeric columns")?;
        if stats.height() > 0 {
            reporter.log_table(&stats, "Numeric Summary", config.max_table_rows)?;
        }

        export_csv(df, &config.clean_output_path)?;
        reporter.log(&format!(
            "Cleaned dataset exported to: {}",
            config.clean_output_path.display()
        ))?;

        summary.final_shape = df.shape();
        summary.clean_output_path = config.clean_output_path.clone();
        summary.text_log_path = config.text_log_path.clone();
        summary.report_path = config.report_path.clone();
        Ok(())
    }
}

/// Builder for creating a [`Pipeline`] instance.
///
/// Use [`Pipeline::builder()`] to get started.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    renderer: Option<Box<dyn DocumentRenderer + Send>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the document renderer chosen from `report_format`.
    pub fn renderer(mut self, renderer: Box<dyn DocumentRenderer + Send>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Build the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::InvalidConfig`] when the configuration fails validation.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.unwrap_or_default();
        config
            .validate()
            .map_err(|e| EtlError::InvalidConfig(e.to_string()))?;

        Ok(Pipeline {
            config,
            renderer: self.renderer,
        })
    }
}
