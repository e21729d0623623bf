//! Column classification by declared dtype.

use crate::error::{EdaError, Result};
use crate::types::ColumnKind;
use crate::utils::{is_numeric_dtype, is_text_dtype};
use polars::prelude::*;

/// Map a polars dtype to the engine's column kind.
///
/// Booleans and temporal columns are neither summed nor counted as
/// categories, so they land in [`ColumnKind::Other`].
pub fn kind_of_dtype(dtype: &DataType) -> ColumnKind {
    if is_numeric_dtype(dtype) {
        ColumnKind::Numeric
    } else if is_text_dtype(dtype) {
        ColumnKind::Categorical
    } else {
        ColumnKind::Other
    }
}

/// Classify every column, in column order. An empty table yields an empty list.
pub fn classify_columns(df: &DataFrame) -> Vec<(String, ColumnKind)> {
    df.get_columns()
        .iter()
        .map(|col| (col.name().to_string(), kind_of_dtype(col.dtype())))
        .collect()
}

/// Kind of a single column.
pub fn column_kind(df: &DataFrame, name: &str) -> Result<ColumnKind> {
    let col = df
        .column(name)
        .map_err(|_| EdaError::ColumnNotFound(name.to_string()))?;
    Ok(kind_of_dtype(col.dtype()))
}

/// Names of the columns of the given kind, in column order.
pub fn columns_of_kind(df: &DataFrame, kind: ColumnKind) -> Vec<String> {
    classify_columns(df)
        .into_iter()
        .filter(|(_, k)| *k == kind)
        .map(|(name, _)| name)
        .collect()
}

pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
    columns_of_kind(df, ColumnKind::Numeric)
}

pub fn categorical_columns(df: &DataFrame) -> Vec<String> {
    columns_of_kind(df, ColumnKind::Categorical)
}

/// Fail unless `name` exists and is numeric.
pub fn require_numeric(df: &DataFrame, name: &str) -> Result<()> {
    match column_kind(df, name)? {
        ColumnKind::Numeric => Ok(()),
        other => Err(EdaError::invalid_column(
            name,
            format!("expected a numeric column, found {}", other),
        )),
    }
}
