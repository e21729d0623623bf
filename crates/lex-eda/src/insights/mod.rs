//! Automated textual findings.
//!
//! Checks run in a fixed order and the output order is part of the contract:
//!
//! 1. high missingness, every column in column order
//! 2. IQR outliers, numeric columns
//! 3. skew, numeric columns
//! 4. correlated numeric pairs `(i, j)` with `i < j`
//!
//! When none of them fires a single [`InsightKind::None`] sentinel is
//! returned, so the output is never empty.
//!
//! [`InsightKind::None`]: crate::types::InsightKind::None

use crate::config::InsightThresholds;
use crate::error::Result;
use crate::profiler::{DataProfiler, numeric_columns, statistics};
use crate::types::Insight;
use crate::utils::{count_missing, valid_numeric_values};
use polars::prelude::*;
use tracing::{debug, info};

/// Scans a table and produces ordered [`Insight`]s.
pub struct InsightEngine;

impl InsightEngine {
    /// Run every check with the given thresholds.
    pub fn extract(df: &DataFrame, thresholds: &InsightThresholds) -> Result<Vec<Insight>> {
        let numeric = numeric_columns(df);

        let mut insights = Self::missing_insights(df, thresholds)?;
        insights.extend(Self::outlier_insights(df, &numeric, thresholds)?);
        insights.extend(Self::skew_insights(df, &numeric, thresholds)?);
        insights.extend(Self::correlation_insights(df, &numeric, thresholds)?);

        if insights.is_empty() {
            debug!("No findings, emitting sentinel");
            insights.push(Insight::none());
        } else {
            info!("Extracted {} insight(s)", insights.len());
        }

        Ok(insights)
    }

    /// Columns whose missing percentage exceeds the threshold.
    ///
    /// A table without rows has no defined percentage; the step is skipped.
    pub fn missing_insights(df: &DataFrame, thresholds: &InsightThresholds) -> Result<Vec<Insight>> {
        let rows = df.height();
        if rows == 0 {
            debug!("Skipping missingness check on an empty table");
            return Ok(Vec::new());
        }

        let mut out = Vec::new();
        for col in df.get_columns() {
            let missing = count_missing(col.as_materialized_series())?;
            let percent = 100.0 * missing as f64 / rows as f64;
            if percent > thresholds.high_missing_percent {
                out.push(Insight::high_missing(col.name(), percent));
            }
        }
        Ok(out)
    }

    /// One finding per column with at least one value strictly outside the
    /// Tukey fences.
    pub fn outlier_insights(
        df: &DataFrame,
        numeric: &[String],
        thresholds: &InsightThresholds,
    ) -> Result<Vec<Insight>> {
        let mut out = Vec::new();
        for name in numeric {
            let values = valid_numeric_values(df.column(name)?.as_materialized_series())?;
            let Some(fences) = statistics::IqrFences::from_values(&values, thresholds.iqr_multiplier)
            else {
                continue;
            };
            let flagged = values.iter().filter(|v| fences.is_outlier(**v)).count();
            if flagged > 0 {
                debug!(
                    "{}: {} value(s) outside [{:.4}, {:.4}]",
                    name, flagged, fences.lower, fences.upper
                );
                out.push(Insight::outlier(name));
            }
        }
        Ok(out)
    }

    pub fn skew_insights(
        df: &DataFrame,
        numeric: &[String],
        thresholds: &InsightThresholds,
    ) -> Result<Vec<Insight>> {
        let mut out = Vec::new();
        for name in numeric {
            let values = valid_numeric_values(df.column(name)?.as_materialized_series())?;
            if let Some(skew) = statistics::skewness(&values)
                && skew.abs() > thresholds.skewness
            {
                out.push(Insight::skew(name, skew));
            }
        }
        Ok(out)
    }

    /// Pairs whose |r| exceeds the threshold, each reported once with the
    /// earlier column first.
    pub fn correlation_insights(
        df: &DataFrame,
        numeric: &[String],
        thresholds: &InsightThresholds,
    ) -> Result<Vec<Insight>> {
        if numeric.len() < 2 {
            return Ok(Vec::new());
        }

        let matrix = DataProfiler::correlation_matrix(df, numeric)?;
        let mut out = Vec::new();
        for i in 0..numeric.len() {
            for j in (i + 1)..numeric.len() {
                if let Some(r) = matrix[i][j]
                    && r.abs() > thresholds.correlation
                {
                    out.push(Insight::correlation(&numeric[i], &numeric[j], r));
                }
            }
        }
        Ok(out)
    }
}

/// Findings with the default thresholds (30 %, 1.5 x IQR, |skew| > 1,
/// |r| > 0.75).
pub fn extract_insights(df: &DataFrame) -> Result<Vec<Insight>> {
    InsightEngine::extract(df, &InsightThresholds::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InsightKind;
    use pretty_assertions::assert_eq;

    fn kinds(insights: &[Insight]) -> Vec<InsightKind> {
        insights.iter().map(|i| i.kind).collect()
    }

    fn uniform(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn test_single_high_missing_column() {
        // 100 rows, 40 missing in a text column, nothing else unusual
        let labels: Vec<Option<&str>> = (0..100)
            .map(|i| if i < 40 { None } else { Some(if i % 2 == 0 { "a" } else { "b" }) })
            .collect();
        let df = df!["x" => uniform(100), "label" => labels].unwrap();

        let insights = extract_insights(&df).unwrap();
        assert_eq!(kinds(&insights), vec![InsightKind::HighMissing]);
        assert_eq!(
            insights[0].message,
            "Column 'label' has high missing rate: 40.00%"
        );
        assert_eq!(insights[0].evidence, Some(40.0));
    }

    #[test]
    fn test_exactly_thirty_percent_is_not_high() {
        let values: Vec<Option<f64>> = (0..10).map(|i| (i >= 3).then_some(i as f64)).collect();
        let df = df!["x" => values].unwrap();
        let insights = extract_insights(&df).unwrap();
        assert_eq!(kinds(&insights), vec![InsightKind::None]);
    }

    #[test]
    fn test_linear_pair_is_correlated_only() {
        let x = uniform(100);
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v).collect();
        let df = df!["x" => x, "y" => y].unwrap();

        let insights = extract_insights(&df).unwrap();
        assert_eq!(kinds(&insights), vec![InsightKind::Correlation]);
        assert_eq!(insights[0].columns, vec!["x", "y"]);
        assert!((insights[0].evidence.unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(
            insights[0].message,
            "Columns 'x' and 'y' are highly correlated (corr = 1.00)"
        );
    }

    #[test]
    fn test_negative_correlation_counts() {
        let x = uniform(20);
        let y: Vec<f64> = x.iter().map(|v| 100.0 - 3.0 * v).collect();
        let df = df!["x" => x, "y" => y].unwrap();

        let insights = extract_insights(&df).unwrap();
        assert_eq!(kinds(&insights), vec![InsightKind::Correlation]);
        assert!(insights[0].evidence.unwrap() < -0.99);
    }

    #[test]
    fn test_fixed_order_across_checks() {
        let df = df![
            "m" => [Some(1.0f64), Some(2.0), Some(3.0), Some(4.0), Some(5.0), None, None, None, None, None],
            "s" => [1.0f64, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 50.0],
            "x" => uniform(10),
            "y" => uniform(10).iter().map(|v| 2.0 * v).collect::<Vec<f64>>(),
        ]
        .unwrap();

        let insights = extract_insights(&df).unwrap();
        assert_eq!(
            kinds(&insights),
            vec![
                InsightKind::HighMissing,
                InsightKind::Outlier,
                InsightKind::Skew,
                InsightKind::Correlation,
                InsightKind::Correlation,
                InsightKind::Correlation,
            ]
        );

        let pairs: Vec<Vec<String>> = insights[3..].iter().map(|i| i.columns.clone()).collect();
        assert_eq!(
            pairs,
            vec![
                vec!["m".to_string(), "x".to_string()],
                vec!["m".to_string(), "y".to_string()],
                vec!["x".to_string(), "y".to_string()],
            ]
        );
        assert!(insights.iter().all(|i| i.kind != InsightKind::None));
    }

    #[test]
    fn test_outlier_reported_once_per_column() {
        let mut values = uniform(20);
        values.push(500.0);
        values.push(-500.0);
        let df = df!["v" => values].unwrap();

        let insights = InsightEngine::outlier_insights(
            &df,
            &["v".to_string()],
            &InsightThresholds::default(),
        )
        .unwrap();
        assert_eq!(insights.len(), 1);
        assert_eq!(
            insights[0].message,
            "Column 'v' has potential outliers detected by IQR method"
        );
    }

    #[test]
    fn test_categorical_columns_skip_numeric_checks() {
        let df = df!["c" => ["a", "a", "a", "a", "zzz"]].unwrap();
        assert_eq!(kinds(&extract_insights(&df).unwrap()), vec![InsightKind::None]);
    }

    #[test]
    fn test_empty_table_yields_sentinel() {
        let df = df!["a" => Vec::<f64>::new(), "b" => Vec::<f64>::new()].unwrap();
        let insights = extract_insights(&df).unwrap();
        assert_eq!(kinds(&insights), vec![InsightKind::None]);
        assert_eq!(insights[0].message, "No critical insights or warnings detected.");
    }

    #[test]
    fn test_custom_thresholds() {
        let values: Vec<Option<f64>> = (0..10).map(|i| (i >= 2).then_some(i as f64)).collect();
        let df = df!["x" => values].unwrap();
        let thresholds = InsightThresholds {
            high_missing_percent: 10.0,
            ..InsightThresholds::default()
        };

        let insights = InsightEngine::extract(&df, &thresholds).unwrap();
        assert_eq!(kinds(&insights), vec![InsightKind::HighMissing]);
    }
}
