//! Data profiling module for dataset analysis.
//!
//! This module provides functionality for profiling datasets, including:
//! - Column classification (numeric / categorical / other)
//! - Descriptive statistics per column
//! - Missing value diagnostics

pub mod classifier;
pub mod statistics;

use crate::error::{EdaError, Result};
use crate::types::{
    CategoricalProfile, ColumnKind, DatasetProfile, MissingEntry, MissingReport, NumericProfile,
};
use crate::utils::{
    count_missing, numeric_values, ordered_value_counts, string_values, valid_numeric_values,
};
use polars::prelude::*;
use tracing::debug;

pub use classifier::{
    categorical_columns, classify_columns, column_kind, numeric_columns, require_numeric,
};

/// Data profiler for analyzing dataset structure and characteristics.
pub struct DataProfiler;

impl DataProfiler {
    /// Profile every column of the table according to its kind.
    ///
    /// Numeric columns get descriptive statistics, categorical columns get
    /// frequency statistics, other columns are listed without statistics.
    pub fn profile(df: &DataFrame) -> Result<DatasetProfile> {
        let mut numeric = Vec::new();
        let mut categorical = Vec::new();
        let mut other = Vec::new();

        for (name, kind) in classify_columns(df) {
            let series = df.column(&name)?.as_materialized_series();
            match kind {
                ColumnKind::Numeric => numeric.push(Self::profile_numeric(series)?),
                ColumnKind::Categorical => categorical.push(Self::profile_categorical(series)?),
                ColumnKind::Other => other.push(name),
            }
        }

        debug!(
            "Profiled {} numeric, {} categorical, {} other columns",
            numeric.len(),
            categorical.len(),
            other.len()
        );

        Ok(DatasetProfile {
            shape: (df.height(), df.width()),
            numeric,
            categorical,
            other,
        })
    }

    /// Descriptive statistics of a numeric Series.
    pub fn profile_numeric(series: &Series) -> Result<NumericProfile> {
        let values = valid_numeric_values(series)?;
        let sorted = statistics::sorted(&values);
        let q = |p: f64| statistics::quantile_sorted(&sorted, p).unwrap_or(f64::NAN);

        Ok(NumericProfile {
            name: series.name().to_string(),
            count: values.len(),
            mean: statistics::mean(&values).unwrap_or(f64::NAN),
            std: statistics::sample_std(&values).unwrap_or(f64::NAN),
            min: sorted.first().copied().unwrap_or(f64::NAN),
            q25: q(0.25),
            q50: q(0.5),
            q75: q(0.75),
            max: sorted.last().copied().unwrap_or(f64::NAN),
            median: q(0.5),
            mode: statistics::mode(&values),
        })
    }

    /// Frequency statistics of a categorical Series.
    pub fn profile_categorical(series: &Series) -> Result<CategoricalProfile> {
        let values = string_values(series)?;
        let counts = ordered_value_counts(values.iter().flatten().map(String::as_str));
        let top = counts.first();

        Ok(CategoricalProfile {
            name: series.name().to_string(),
            unique_count: counts.len(),
            top: top.map(|(value, _)| value.clone()),
            freq: top.map(|(_, count)| *count),
        })
    }

    /// Missing-value report restricted to columns with at least one missing
    /// value, highest percentage first. Ties keep column order.
    ///
    /// # Errors
    ///
    /// Returns [`EdaError::Precondition`] for a table with zero rows, where a
    /// percentage is undefined.
    pub fn missing_data(df: &DataFrame) -> Result<MissingReport> {
        let rows = df.height();
        if rows == 0 {
            return Err(EdaError::Precondition(
                "missing-data analysis needs at least one row".to_string(),
            ));
        }

        let mut entries: Vec<MissingEntry> = Self::missing_summary(df)?
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(column, missing_count)| MissingEntry {
                column,
                missing_count,
                missing_percent: 100.0 * missing_count as f64 / rows as f64,
            })
            .collect();

        entries.sort_by(|a, b| b.missing_percent.total_cmp(&a.missing_percent));

        Ok(MissingReport { entries })
    }

    /// Pearson matrix over the given numeric columns, pairwise-complete rows.
    ///
    /// Cells are `None` where the coefficient is undefined. The diagonal is
    /// 1.0 for any column with non-zero variance.
    pub fn correlation_matrix(df: &DataFrame, columns: &[String]) -> Result<Vec<Vec<Option<f64>>>> {
        let values = columns
            .iter()
            .map(|name| {
                require_numeric(df, name)?;
                Ok(numeric_values(df.column(name)?.as_materialized_series())?)
            })
            .collect::<Result<Vec<_>>>()?;

        let n = values.len();
        let mut matrix = vec![vec![None; n]; n];
        for i in 0..n {
            for j in i..n {
                let r = statistics::pearson(&values[i], &values[j]);
                matrix[i][j] = r;
                matrix[j][i] = r;
            }
        }
        Ok(matrix)
    }

    /// Missing count of every column, in column order, including zeros.
    pub fn missing_summary(df: &DataFrame) -> Result<Vec<(String, usize)>> {
        df.get_columns()
            .iter()
            .map(|col| {
                let count = count_missing(col.as_materialized_series())?;
                Ok((col.name().to_string(), count))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_profile_numeric_describe_stats() {
        let df = df!["x" => [1.0f64, 2.0, 3.0, 4.0]].unwrap();
        let profile = DataProfiler::profile(&df).unwrap();
        let x = profile.numeric_profile("x").unwrap();

        assert_eq!(x.count, 4);
        assert!(approx(x.mean, 2.5));
        assert!(approx(x.std, (5.0f64 / 3.0).sqrt()));
        assert_eq!(x.min, 1.0);
        assert!(approx(x.q25, 1.75));
        assert!(approx(x.q50, 2.5));
        assert!(approx(x.q75, 3.25));
        assert_eq!(x.max, 4.0);
        assert_eq!(x.median, x.q50);
        // all values tie, the smallest wins
        assert_eq!(x.mode, Some(1.0));
    }

    #[test]
    fn test_profile_numeric_ignores_missing() {
        let df = df!["x" => [Some(10.0f64), None, Some(30.0), None]].unwrap();
        let profile = DataProfiler::profile(&df).unwrap();
        let x = profile.numeric_profile("x").unwrap();
        assert_eq!(x.count, 2);
        assert!(approx(x.mean, 20.0));
    }

    #[test]
    fn test_profile_numeric_all_missing() {
        let df = df!["x" => [None::<f64>, None]].unwrap();
        let profile = DataProfiler::profile(&df).unwrap();
        let x = profile.numeric_profile("x").unwrap();
        assert_eq!(x.count, 0);
        assert!(x.mean.is_nan());
        assert!(x.max.is_nan());
        assert_eq!(x.mode, None);
    }

    #[test]
    fn test_profile_categorical() {
        let df = df!["city" => [Some("Rome"), Some("Oslo"), None, Some("Oslo"), Some("Rome"), Some("Oslo")]]
            .unwrap();
        let profile = DataProfiler::profile(&df).unwrap();
        let city = profile.categorical_profile("city").unwrap();

        assert_eq!(city.unique_count, 2);
        assert_eq!(city.top.as_deref(), Some("Oslo"));
        assert_eq!(city.freq, Some(3));
    }

    #[test]
    fn test_profile_categorical_tie_first_seen() {
        let df = df!["c" => ["b", "a", "a", "b"]].unwrap();
        let profile = DataProfiler::profile(&df).unwrap();
        assert_eq!(profile.categorical[0].top.as_deref(), Some("b"));
    }

    #[test]
    fn test_every_column_profiled_once_by_kind() {
        let df = df![
            "n" => [1i64, 2, 3],
            "c" => ["a", "b", "c"],
            "flag" => [true, false, true],
        ]
        .unwrap();
        let profile = DataProfiler::profile(&df).unwrap();

        assert_eq!(profile.shape, (3, 3));
        assert_eq!(profile.numeric.len(), 1);
        assert_eq!(profile.categorical.len(), 1);
        assert_eq!(profile.other, vec!["flag".to_string()]);
    }

    #[test]
    fn test_missing_data_filters_and_sorts() {
        let df = df![
            "a" => [Some(1.0f64), None, Some(3.0), Some(4.0)],
            "b" => [Some("x"), None, None, Some("y")],
            "c" => [1i64, 2, 3, 4],
            "d" => [None, Some(2.0f64), Some(3.0), Some(4.0)],
        ]
        .unwrap();

        let report = DataProfiler::missing_data(&df).unwrap();
        let names: Vec<&str> = report.entries.iter().map(|e| e.column.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "d"]);

        let b = report.get("b").unwrap();
        assert_eq!(b.missing_count, 2);
        assert_eq!(b.missing_percent, 50.0);
        assert_eq!(report.get("a").unwrap().missing_percent, 25.0);
        assert!(report.get("c").is_none());
    }

    #[test]
    fn test_missing_data_no_missing() {
        let df = df!["a" => [1.0f64, 2.0]].unwrap();
        assert!(DataProfiler::missing_data(&df).unwrap().is_empty());
    }

    #[test]
    fn test_missing_data_zero_rows_is_precondition_error() {
        let df = df!["a" => Vec::<f64>::new()].unwrap();
        assert!(matches!(
            DataProfiler::missing_data(&df),
            Err(EdaError::Precondition(_))
        ));
    }

    #[test]
    fn test_correlation_matrix() {
        let df = df![
            "x" => [1.0f64, 2.0, 3.0, 4.0],
            "y" => [2.0f64, 4.0, 6.0, 8.0],
            "k" => [1.0f64, 1.0, 1.0, 1.0],
        ]
        .unwrap();
        let names = vec!["x".to_string(), "y".to_string(), "k".to_string()];
        let matrix = DataProfiler::correlation_matrix(&df, &names).unwrap();

        assert!(approx(matrix[0][0].unwrap(), 1.0));
        assert!(approx(matrix[0][1].unwrap(), 1.0));
        assert_eq!(matrix[0][1], matrix[1][0]);
        assert_eq!(matrix[2][0], None);
        assert_eq!(matrix[2][2], None);
    }

    #[test]
    fn test_missing_summary_includes_zero_counts() {
        let df = df![
            "a" => [Some(1.0f64), None],
            "b" => [1i64, 2],
        ]
        .unwrap();
        let summary = DataProfiler::missing_summary(&df).unwrap();
        assert_eq!(
            summary,
            vec![("a".to_string(), 1), ("b".to_string(), 0)]
        );
    }
}
