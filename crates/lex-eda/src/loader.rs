//! Table loading from delimited text.
//!
//! Columns are typed by scanning every value: a column is numeric when all
//! of its non-missing values parse as numbers, otherwise it is read as text.
//! Empty fields and the usual placeholder tokens (`NA`, `N/A`, `null`, `NaN`,
//! ...) become missing markers. A column with no values at all is numeric.

use crate::error::{EdaError, Result};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

/// Field contents read as missing, in addition to the empty field.
const NULL_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Reads CSV input into a [`DataFrame`], enforcing an upload size limit.
#[derive(Debug, Clone)]
pub struct TableLoader {
    max_bytes: u64,
}

impl Default for TableLoader {
    fn default() -> Self {
        Self {
            max_bytes: crate::config::EdaConfig::default().max_upload_bytes,
        }
    }
}

impl TableLoader {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// Load a CSV file from disk.
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let size = std::fs::metadata(path)
            .map_err(|e| EdaError::Load(format!("cannot read '{}': {}", path.display(), e)))?
            .len();
        self.check_size(size)?;
        let bytes = std::fs::read(path)
            .map_err(|e| EdaError::Load(format!("cannot read '{}': {}", path.display(), e)))?;
        info!("Loading table from: {}", path.display());
        self.load_bytes(&bytes)
    }

    /// Load CSV content already held in memory (e.g. an uploaded file).
    pub fn load_bytes(&self, bytes: &[u8]) -> Result<DataFrame> {
        self.check_size(bytes.len() as u64)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(EdaError::Load("input is empty".to_string()));
        }

        // Strategy 1: read as-is
        let first_error = match read_csv(bytes.to_vec()) {
            Ok(df) => return finish(df),
            Err(e) => {
                debug!("Standard loading failed: {}", e);
                e
            }
        };

        // Strategy 2: pre-clean content
        let content = String::from_utf8_lossy(bytes);
        let cleaned = clean_csv_content(&content);
        match read_csv(cleaned.into_bytes()) {
            Ok(df) => finish(df),
            Err(e) => {
                debug!("Loading cleaned content failed: {}", e);
                Err(EdaError::Load(first_error.to_string()))
            }
        }
    }

    fn check_size(&self, size: u64) -> Result<()> {
        if size > self.max_bytes {
            return Err(EdaError::Load(format!(
                "input is {} bytes, the limit is {} bytes",
                size, self.max_bytes
            )));
        }
        Ok(())
    }
}

fn read_csv(bytes: Vec<u8>) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(
            CsvParseOptions::default()
                .with_quote_char(Some(b'"'))
                .with_null_values(Some(NullValues::AllColumns(
                    NULL_TOKENS.iter().map(|t| PlSmallStr::from_static(t)).collect(),
                ))),
        )
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
}

fn finish(mut df: DataFrame) -> Result<DataFrame> {
    if df.width() == 0 {
        return Err(EdaError::Load("input has no columns".to_string()));
    }

    // no value to infer from: type as numeric so the gap is still profiled
    if df.height() > 0 {
        let empty: Vec<String> = df
            .get_columns()
            .iter()
            .filter(|c| c.dtype() == &DataType::String && c.null_count() == c.len())
            .map(|c| c.name().to_string())
            .collect();
        for name in empty {
            let cast = df.column(&name)?.cast(&DataType::Float64)?;
            df.with_column(cast)?;
            debug!("Column {} has no values; read as Float64", name);
        }
    }

    info!("Table loaded successfully: {:?}", df.shape());
    Ok(df)
}

/// Collapse doubled quotes and drop blank lines.
fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Load a CSV file with the default size limit.
pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    TableLoader::default().load_path(path)
}

/// Load in-memory CSV content with the default size limit.
pub fn load_csv_from_bytes(bytes: &[u8]) -> Result<DataFrame> {
    TableLoader::default().load_bytes(bytes)
}

/// First `n` rows of the table.
pub fn preview(df: &DataFrame, n: usize) -> DataFrame {
    df.head(Some(n))
}

/// (rows, columns)
pub fn shape(df: &DataFrame) -> (usize, usize) {
    df.shape()
}
