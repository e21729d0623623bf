//! Helpers shared by the profiler, insight engine, report and plots:
//! dtype checks, value extraction with NaN-as-missing, value counts and
//! markup-safe text.

use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use std::collections::HashMap;

// =============================================================================
// Dtypes
// =============================================================================

/// Integer and float dtypes; the only ones the engine computes statistics on.
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    dtype.is_integer() || dtype.is_float()
}

/// Text-like dtypes, counted as categories.
#[inline]
pub fn is_text_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String | DataType::Categorical(_, _))
}

// =============================================================================
// Value Extraction
// =============================================================================

/// Read a numeric Series as `Option<f64>` per row.
///
/// Nulls and NaN both come back as `None`; they are the table's missing markers.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let float_series = series.cast(&DataType::Float64)?;
    let values = float_series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values)
}

/// Non-missing values of a numeric Series, in row order.
pub fn valid_numeric_values(series: &Series) -> PolarsResult<Vec<f64>> {
    Ok(numeric_values(series)?.into_iter().flatten().collect())
}

/// Read any Series as `Option<String>` per row, rendering non-string values.
pub fn string_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let str_series = series.cast(&DataType::String)?;
    let values = str_series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

/// Number of missing values in a Series (nulls, plus NaN for numeric dtypes).
pub fn count_missing(series: &Series) -> PolarsResult<usize> {
    if is_numeric_dtype(series.dtype()) {
        Ok(numeric_values(series)?
            .iter()
            .filter(|v| v.is_none())
            .count())
    } else {
        Ok(series.null_count())
    }
}

/// Count occurrences of each value, most frequent first.
///
/// Ties keep the order in which values were first seen.
pub fn ordered_value_counts<'a, I>(values: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for val in values {
        match index.get(val) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(val, counts.len());
                counts.push((val.to_string(), 1));
            }
        }
    }

    // stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

// =============================================================================
// Formatting Utilities
// =============================================================================

/// Render a statistic for tables: six decimals, `NaN` for undefined values.
pub fn format_stat(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.6}", value)
    }
}

/// Escape text for inclusion in HTML or SVG markup.
pub fn escape_markup(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

static UNSAFE_FILE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\-]+").expect("Invalid regex: file stem"));

/// Turn a column name into something safe to use in a file name.
pub fn sanitize_file_stem(name: &str) -> String {
    let cleaned = UNSAFE_FILE_CHARS.replace_all(name.trim(), "_");
    let cleaned = cleaned.trim_matches('_');
    if cleaned.is_empty() {
        "column".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Truncate a string to max length with ellipsis
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

// =============================================================================
// Tests
// =============================================================================
