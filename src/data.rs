//! Dataset loading
//!
//! Reads the insurance CSV with Polars. The dashboard re-reads the file
//! on every view, so changes to the dataset on disk show up without a
//! restart; there is deliberately no caching layer here.

use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::Path;

/// Load the insurance dataset from disk.
pub fn load_dataset(path: &Path) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.into()))
        .with_context(|| format!("Failed to open dataset: {}", path.display()))?
        .finish()
        .with_context(|| format!("Failed to parse dataset CSV: {}", path.display()))
}

/// Which of `wanted` are absent from the frame.
pub fn missing_columns(df: &DataFrame, wanted: &[&str]) -> Vec<String> {
    wanted
        .iter()
        .filter(|name| df.column(name).is_err())
        .map(|name| name.to_string())
        .collect()
}
