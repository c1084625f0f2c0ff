use crate::error::{Result, ResultExt};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use tracing::info;

/// Write the cleaned table as comma-separated text with a header row.
///
/// Parent directories are created and an existing file is overwritten.
pub fn export_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).context(format!("Creating '{}'", parent.display()))?;
    }

    let mut file = File::create(path).context(format!("Creating '{}'", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .with_datetime_format(Some("%Y-%m-%d %H:%M:%S".to_string()))
        .finish(df)
        .context(format!("Writing '{}'", path.display()))?;

    info!("Dataset saved: {}", path.display());
    Ok(())
}
