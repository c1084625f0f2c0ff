//! Delimited-file loading.
//!
//! Reads the input dataset into a DataFrame using the configured field
//! separator, decimal separator and null markers. A leading UTF-8 byte-order
//! mark is stripped before parsing so the first header keeps its verbatim name.

use crate::config::PipelineConfig;
use crate::error::{EtlError, Result, ResultExt};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::io::Cursor;
use std::path::PathBuf;
use tracing::{debug, info, warn};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// How to read the input file.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub path: PathBuf,
    pub delimiter: char,
    pub decimal_separator: char,
    pub null_values: Vec<String>,
    pub infer_schema_rows: usize,
}

impl LoadOptions {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            path: config.input_path.clone(),
            delimiter: config.delimiter,
            decimal_separator: config.decimal_separator,
            null_values: config.null_values.clone(),
            infer_schema_rows: config.infer_schema_rows,
        }
    }
}

/// Load the input file into a DataFrame.
///
/// # Errors
///
/// Returns [`EtlError::MissingInput`] when the file does not exist; any other
/// read or parse failure is returned with the file path as context.
pub fn load_table(options: &LoadOptions) -> Result<DataFrame> {
    let path = options.path.as_path();
    if !path.exists() {
        return Err(EtlError::MissingInput(path.to_path_buf()));
    }

    info!("Loading dataset from: {}", path.display());
    let bytes = std::fs::read(path).context(format!("Reading '{}'", path.display()))?;
    let df = parse_delimited(strip_bom(&bytes), options)
        .context(format!("Parsing '{}'", path.display()))?;

    debug!("Loaded columns: {:?}", df.get_column_names());
    info!("Dataset loaded successfully: {:?}", df.shape());
    Ok(df)
}

/// Parse delimited text that is already in memory.
///
/// The schema is inferred from the first `infer_schema_rows` rows. When a later
/// value does not fit that schema, the text is parsed again with the schema
/// inferred from every row.
pub fn parse_delimited(content: &[u8], options: &LoadOptions) -> PolarsResult<DataFrame> {
    match read_delimited(content, options, Some(options.infer_schema_rows)) {
        Ok(df) => Ok(df),
        Err(e) => {
            warn!(
                "Schema inferred from the first {} rows did not fit ({}); rescanning all rows",
                options.infer_schema_rows, e
            );
            read_delimited(content, options, None)
        }
    }
}

fn read_delimited(
    content: &[u8],
    options: &LoadOptions,
    infer_schema_rows: Option<usize>,
) -> PolarsResult<DataFrame> {
    let null_values = if options.null_values.is_empty() {
        None
    } else {
        Some(NullValues::AllColumns(
            options
                .null_values
                .iter()
                .map(|s| PlSmallStr::from(s.as_str()))
                .collect(),
        ))
    };

    let parse_options = CsvParseOptions::default()
        .with_separator(options.delimiter as u8)
        .with_quote_char(Some(b'"'))
        .with_decimal_comma(options.decimal_separator == ',')
        .with_encoding(CsvEncoding::Utf8)
        .with_null_values(null_values);

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(infer_schema_rows)
        .with_parse_options(parse_options)
        .into_reader_with_file_handle(Cursor::new(content.to_vec()))
        .finish()
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}
