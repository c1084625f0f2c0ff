//! Configuration types for the ETL audit pipeline.
//!
//! This module provides the run configuration using the builder pattern.
//! Every option has a default matching the sales dataset the tool was first
//! written for, so `PipelineConfig::default()` is a complete configuration.

use crate::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default number of rows shown in a report table before truncation.
pub const DEFAULT_MAX_TABLE_ROWS: usize = 15;

/// Default number of rows used for CSV schema inference.
pub const DEFAULT_INFER_SCHEMA_ROWS: usize = 10_000;

/// A functional-dependency check: every value of `key_column` should map to
/// exactly one value in each of `dependent_columns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationalCheck {
    pub key_column: String,
    pub dependent_columns: Vec<String>,
    /// Human-readable description used as the report table title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl RelationalCheck {
    pub fn new<S: Into<String>>(
        key_column: impl Into<String>,
        dependent_columns: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            key_column: key_column.into(),
            dependent_columns: dependent_columns.into_iter().map(Into::into).collect(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Key column followed by the dependent columns.
    pub fn columns(&self) -> Vec<&str> {
        std::iter::once(self.key_column.as_str())
            .chain(self.dependent_columns.iter().map(String::as_str))
            .collect()
    }

    /// Title used for the report table of this check.
    pub fn title(&self) -> String {
        match &self.label {
            Some(label) => format!("Inconsistent Mapping: {}", label),
            None => format!(
                "Inconsistent Mapping: One {} to Many {}",
                self.key_column,
                self.dependent_columns.join(" / ")
            ),
        }
    }
}

/// A derived column computed from existing columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Derivation {
    /// `output = numerator / denominator`; non-finite results become 0.
    Ratio {
        numerator: String,
        denominator: String,
        output: String,
    },
    /// `output = columns[0] + separator + columns[1] + ...` as text.
    Concat {
        columns: Vec<String>,
        separator: String,
        output: String,
    },
}

impl Derivation {
    pub fn source_columns(&self) -> Vec<&str> {
        match self {
            Self::Ratio {
                numerator,
                denominator,
                ..
            } => vec![numerator.as_str(), denominator.as_str()],
            Self::Concat { columns, .. } => columns.iter().map(String::as_str).collect(),
        }
    }

    pub fn output(&self) -> &str {
        match self {
            Self::Ratio { output, .. } | Self::Concat { output, .. } => output,
        }
    }
}

/// Output format of the structured report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// Word document (`.docx`)
    #[default]
    Docx,
    /// The document block structure as pretty-printed JSON
    Json,
}

/// Configuration for one pipeline run.
///
/// Use [`PipelineConfig::builder()`] for a validated configuration, or
/// deserialize it from JSON; missing JSON fields take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Delimited input file.
    pub input_path: PathBuf,
    /// Destination of the cleaned, comma-separated dataset.
    pub clean_output_path: PathBuf,
    /// Plain-text audit log, truncated at the start of each run.
    pub text_log_path: PathBuf,
    /// Structured report, written once at the end of the run.
    pub report_path: PathBuf,
    /// Format of `report_path`.
    pub report_format: ReportFormat,
    /// Title at the top of the structured report.
    pub report_title: String,

    /// Field separator of the input file.
    pub delimiter: char,
    /// Decimal separator of numbers in the input file (`.` or `,`).
    pub decimal_separator: char,
    /// Field values read as missing (empty fields are always missing).
    pub null_values: Vec<String>,
    /// Number of rows used to infer column types.
    pub infer_schema_rows: usize,

    /// Columns that together should identify a row.
    pub primary_key_columns: Vec<String>,
    /// Functional-dependency checks.
    pub relational_checks: Vec<RelationalCheck>,
    /// Derived KPI and attribute columns.
    pub derivations: Vec<Derivation>,
    /// Columns parsed as dates (names as they appear before normalization).
    pub date_columns: Vec<String>,
    /// `chrono` formats tried in order; empty means the built-in list.
    pub date_formats: Vec<String>,
    /// Columns expected to be numeric (names as they appear before normalization).
    pub numeric_columns: Vec<String>,

    /// Rows shown per report table; `None` or `0` shows every row.
    pub max_table_rows: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("GBP_DataSource_Pr.csv"),
            clean_output_path: PathBuf::from("GBP_DataSource_clean.csv"),
            text_log_path: PathBuf::from("GBP_DataSource_data_quality_log.txt"),
            report_path: PathBuf::from("GBP_DataSource_Analysis_Report.docx"),
            report_format: ReportFormat::default(),
            report_title: "Technical Data Analysis Report".to_string(),
            delimiter: ';',
            decimal_separator: ',',
            null_values: default_null_values(),
            infer_schema_rows: DEFAULT_INFER_SCHEMA_ROWS,
            primary_key_columns: vec!["Order ID".to_string(), "Row ID".to_string()],
            relational_checks: default_relational_checks(),
            derivations: default_derivations(),
            date_columns: vec!["Order Date".to_string(), "Ship Date".to_string()],
            date_formats: Vec::new(),
            numeric_columns: ["Sales", "Quantity", "Discount", "Profit"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_table_rows: Some(DEFAULT_MAX_TABLE_ROWS),
        }
    }
}

fn default_null_values() -> Vec<String> {
    ["NA", "N/A", "NaN", "null"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_relational_checks() -> Vec<RelationalCheck> {
    vec![
        RelationalCheck::new("Postal Code", ["City"])
            .with_label("One Postal Code to Many Cities"),
        RelationalCheck::new("Product ID", ["Product Name"])
            .with_label("One Product ID to Many Names"),
    ]
}

fn default_derivations() -> Vec<Derivation> {
    vec![
        Derivation::Ratio {
            numerator: "Profit".to_string(),
            denominator: "Sales".to_string(),
            output: "Profit_Margin".to_string(),
        },
        Derivation::Concat {
            columns: vec!["Product ID".to_string(), "Product Name".to_string()],
            separator: " | ".to_string(),
            output: "Product_Full_Name".to_string(),
        },
    ]
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Read a configuration from a JSON file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            EtlError::Io(e).with_context(format!("Reading config '{}'", path.display()))
        })?;
        let config: PipelineConfig = serde_json::from_str(&raw)?;
        config
            .validate()
            .map_err(|e| EtlError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        for (field, path) in [
            ("input_path", &self.input_path),
            ("clean_output_path", &self.clean_output_path),
            ("text_log_path", &self.text_log_path),
            ("report_path", &self.report_path),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigValidationError::EmptyPath(field.to_string()));
            }
        }

        if !self.delimiter.is_ascii() || self.delimiter == '"' {
            return Err(ConfigValidationError::InvalidDelimiter(self.delimiter));
        }

        if !matches!(self.decimal_separator, '.' | ',') {
            return Err(ConfigValidationError::InvalidDecimalSeparator(
                self.decimal_separator,
            ));
        }

        if self.delimiter == self.decimal_separator {
            return Err(ConfigValidationError::SeparatorClash(self.delimiter));
        }

        if self.infer_schema_rows == 0 {
            return Err(ConfigValidationError::InvalidInferSchemaRows);
        }

        for check in &self.relational_checks {
            if check.dependent_columns.is_empty() {
                return Err(ConfigValidationError::NoDependentColumns(
                    check.key_column.clone(),
                ));
            }
            if check.dependent_columns.contains(&check.key_column) {
                return Err(ConfigValidationError::KeyAmongDependents(
                    check.key_column.clone(),
                ));
            }
        }

        for derivation in &self.derivations {
            if derivation.output().trim().is_empty() {
                return Err(ConfigValidationError::EmptyDerivationOutput);
            }
            if let Derivation::Concat { columns, output, .. } = derivation
                && columns.is_empty()
            {
                return Err(ConfigValidationError::EmptyConcat(output.clone()));
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Path option '{0}' must not be empty")]
    EmptyPath(String),

    #[error("Invalid delimiter {0:?} (must be a single ASCII character other than '\"')")]
    InvalidDelimiter(char),

    #[error("Invalid decimal separator {0:?} (must be '.' or ',')")]
    InvalidDecimalSeparator(char),

    #[error("Delimiter and decimal separator are both {0:?}")]
    SeparatorClash(char),

    #[error("infer_schema_rows must be at least 1")]
    InvalidInferSchemaRows,

    #[error("Relational check on '{0}' has no dependent columns")]
    NoDependentColumns(String),

    #[error("Relational check key '{0}' is also listed as a dependent column")]
    KeyAmongDependents(String),

    #[error("Derived column name must not be empty")]
    EmptyDerivationOutput,

    #[error("Concatenation for '{0}' has no source columns")]
    EmptyConcat(String),
}

/// Builder for [`PipelineConfig`] with fluent API.
///
/// Unset options keep the [`PipelineConfig::default()`] values.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    input_path: Option<PathBuf>,
    clean_output_path: Option<PathBuf>,
    text_log_path: Option<PathBuf>,
    report_path: Option<PathBuf>,
    report_format: Option<ReportFormat>,
    report_title: Option<String>,
    delimiter: Option<char>,
    decimal_separator: Option<char>,
    null_values: Option<Vec<String>>,
    infer_schema_rows: Option<usize>,
    primary_key_columns: Option<Vec<String>>,
    relational_checks: Option<Vec<RelationalCheck>>,
    derivations: Option<Vec<Derivation>>,
    date_columns: Option<Vec<String>>,
    date_formats: Option<Vec<String>>,
    numeric_columns: Option<Vec<String>>,
    max_table_rows: Option<Option<usize>>,
}

fn owned<S: Into<String>>(items: impl IntoIterator<Item = S>) -> Vec<String> {
    items.into_iter().map(Into::into).collect()
}

impl PipelineConfigBuilder {
    /// Start from an existing configuration instead of the defaults.
    pub fn from_config(config: PipelineConfig) -> Self {
        Self {
            input_path: Some(config.input_path),
            clean_output_path: Some(config.clean_output_path),
            text_log_path: Some(config.text_log_path),
            report_path: Some(config.report_path),
            report_format: Some(config.report_format),
            report_title: Some(config.report_title),
            delimiter: Some(config.delimiter),
            decimal_separator: Some(config.decimal_separator),
            null_values: Some(config.null_values),
            infer_schema_rows: Some(config.infer_schema_rows),
            primary_key_columns: Some(config.primary_key_columns),
            relational_checks: Some(config.relational_checks),
            derivations: Some(config.derivations),
            date_columns: Some(config.date_columns),
            date_formats: Some(config.date_formats),
            numeric_columns: Some(config.numeric_columns),
            max_table_rows: Some(config.max_table_rows),
        }
    }

    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    pub fn clean_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.clean_output_path = Some(path.into());
        self
    }

    pub fn text_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.text_log_path = Some(path.into());
        self
    }

    pub fn report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = Some(path.into());
        self
    }

    pub fn report_format(mut self, format: ReportFormat) -> Self {
        self.report_format = Some(format);
        self
    }

    pub fn report_title(mut self, title: impl Into<String>) -> Self {
        self.report_title = Some(title.into());
        self
    }

    /// Set the field separator of the input file.
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Set the decimal separator used by numbers in the input file.
    pub fn decimal_separator(mut self, separator: char) -> Self {
        self.decimal_separator = Some(separator);
        self
    }

    pub fn null_values<S: Into<String>>(mut self, values: impl IntoIterator<Item = S>) -> Self {
        self.null_values = Some(owned(values));
        self
    }

    pub fn infer_schema_rows(mut self, rows: usize) -> Self {
        self.infer_schema_rows = Some(rows);
        self
    }

    pub fn primary_key_columns<S: Into<String>>(
        mut self,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        self.primary_key_columns = Some(owned(columns));
        self
    }

    /// Replace the functional-dependency checks.
    pub fn relational_checks(mut self, checks: Vec<RelationalCheck>) -> Self {
        self.relational_checks = Some(checks);
        self
    }

    /// Replace the derived-column definitions.
    pub fn derivations(mut self, derivations: Vec<Derivation>) -> Self {
        self.derivations = Some(derivations);
        self
    }

    pub fn date_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.date_columns = Some(owned(columns));
        self
    }

    pub fn date_formats<S: Into<String>>(mut self, formats: impl IntoIterator<Item = S>) -> Self {
        self.date_formats = Some(owned(formats));
        self
    }

    pub fn numeric_columns<S: Into<String>>(
        mut self,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        self.numeric_columns = Some(owned(columns));
        self
    }

    /// Set the number of rows shown per report table; `0` shows every row.
    pub fn max_table_rows(mut self, rows: usize) -> Self {
        self.max_table_rows = Some((rows > 0).then_some(rows));
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> std::result::Result<PipelineConfig, ConfigValidationError> {
        let defaults = PipelineConfig::default();
        let config = PipelineConfig {
            input_path: self.input_path.unwrap_or(defaults.input_path),
            clean_output_path: self.clean_output_path.unwrap_or(defaults.clean_output_path),
            text_log_path: self.text_log_path.unwrap_or(defaults.text_log_path),
            report_path: self.report_path.unwrap_or(defaults.report_path),
            report_format: self.report_format.unwrap_or(defaults.report_format),
            report_title: self.report_title.unwrap_or(defaults.report_title),
            delimiter: self.delimiter.unwrap_or(defaults.delimiter),
            decimal_separator: self.decimal_separator.unwrap_or(defaults.decimal_separator),
            null_values: self.null_values.unwrap_or(defaults.null_values),
            infer_schema_rows: self.infer_schema_rows.unwrap_or(defaults.infer_schema_rows),
            primary_key_columns: self
                .primary_key_columns
                .unwrap_or(defaults.primary_key_columns),
            relational_checks: self.relational_checks.unwrap_or(defaults.relational_checks),
            derivations: self.derivations.unwrap_or(defaults.derivations),
            date_columns: self.date_columns.unwrap_or(defaults.date_columns),
            date_formats: self.date_formats.unwrap_or(defaults.date_formats),
            numeric_columns: self.numeric_columns.unwrap_or(defaults.numeric_columns),
            max_table_rows: self.max_table_rows.unwrap_or(defaults.max_table_rows),
        };

        config.validate()?;
        Ok(config)
    }
}
