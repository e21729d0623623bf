//! Derived features from two numeric columns.
//!
//! The synthesizer does not check whether the result name is already taken:
//! an existing column of that name is replaced. Deciding whether that is
//! allowed belongs to the caller, see
//! [`AnalysisPipeline`](crate::pipeline::AnalysisPipeline), which rejects
//! duplicate names before calling in.

use crate::error::{EdaError, Result};
use crate::profiler::require_numeric;
use crate::types::{FeatureOperator, FeatureSpec};
use crate::utils::numeric_values;
use polars::prelude::*;
use tracing::{debug, info};

/// Builds derived columns from [`FeatureSpec`]s.
pub struct FeatureSynthesizer;

impl FeatureSynthesizer {
    /// Return a copy of the table with `spec.name` appended.
    ///
    /// Rows where either operand is missing, or where a division has a zero
    /// divisor, get a missing result; other rows are unaffected.
    pub fn create_feature(df: &DataFrame, spec: &FeatureSpec) -> Result<DataFrame> {
        require_numeric(df, &spec.left)?;
        require_numeric(df, &spec.right)?;
        if spec.name.trim().is_empty() {
            return Err(EdaError::invalid_column(
                &spec.name,
                "feature name must not be empty",
            ));
        }

        let left = numeric_values(df.column(&spec.left)?.as_materialized_series())?;
        let right = numeric_values(df.column(&spec.right)?.as_materialized_series())?;

        let mut guarded = 0usize;
        let result: Vec<Option<f64>> = left
            .iter()
            .zip(right.iter())
            .map(|(l, r)| match (l, r) {
                (Some(l), Some(r)) => {
                    let value = spec.operator.apply(*l, *r);
                    if value.is_none() {
                        guarded += 1;
                    }
                    value
                }
                _ => None,
            })
            .collect();

        if guarded > 0 && spec.operator == FeatureOperator::Divide {
            debug!(
                "{} row(s) of {} had a zero divisor and were left missing",
                guarded, spec.name
            );
        }

        let mut out = df.clone();
        out.with_column(Series::new(spec.name.as_str().into(), result))?;

        info!(
            "Created feature {} = {} {} {}",
            spec.name, spec.left, spec.operator, spec.right
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        numeric_values(df.column(name).unwrap().as_materialized_series()).unwrap()
    }

    fn sample() -> DataFrame {
        df![
            "a" => [6.0f64, 8.0, 3.0, 5.0],
            "b" => [Some(2.0f64), Some(0.0), None, Some(-1.0)],
            "city" => ["x", "y", "z", "w"],
        ]
        .unwrap()
    }

    #[test]
    fn test_add_subtract_multiply() {
        let df = sample();
        let cases = [
            (FeatureOperator::Add, vec![Some(8.0), Some(8.0), None, Some(4.0)]),
            (FeatureOperator::Subtract, vec![Some(4.0), Some(8.0), None, Some(6.0)]),
            (FeatureOperator::Multiply, vec![Some(12.0), Some(0.0), None, Some(-5.0)]),
        ];

        for (op, expected) in cases {
            let spec = FeatureSpec::new("a", "b", op, "out");
            let out = FeatureSynthesizer::create_feature(&df, &spec).unwrap();
            assert_eq!(column_values(&out, "out"), expected, "operator {}", op);
        }
    }

    #[test]
    fn test_divide_by_zero_yields_missing_for_that_row_only() {
        let df = sample();
        let spec = FeatureSpec::new("a", "b", FeatureOperator::Divide, "ratio");
        let out = FeatureSynthesizer::create_feature(&df, &spec).unwrap();

        assert_eq!(
            column_values(&out, "ratio"),
            vec![Some(3.0), None, None, Some(-5.0)]
        );
    }

    #[test]
    fn test_input_table_unchanged() {
        let df = sample();
        let spec = FeatureSpec::with_default_name("a", "b", FeatureOperator::Add);
        let out = FeatureSynthesizer::create_feature(&df, &spec).unwrap();

        assert_eq!(df.width(), 3);
        assert_eq!(out.width(), 4);
        assert!(out.column("a_Add_b").is_ok());
    }

    #[test]
    fn test_unknown_column() {
        let spec = FeatureSpec::new("a", "nope", FeatureOperator::Add, "out");
        assert!(matches!(
            FeatureSynthesizer::create_feature(&sample(), &spec),
            Err(EdaError::ColumnNotFound(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_non_numeric_operand() {
        let spec = FeatureSpec::new("a", "city", FeatureOperator::Add, "out");
        assert!(matches!(
            FeatureSynthesizer::create_feature(&sample(), &spec),
            Err(EdaError::InvalidColumn { .. })
        ));
    }

    #[test]
    fn test_existing_name_is_overwritten() {
        let spec = FeatureSpec::new("a", "a", FeatureOperator::Add, "b");
        let out = FeatureSynthesizer::create_feature(&sample(), &spec).unwrap();
        assert_eq!(out.width(), 3);
        assert_eq!(
            column_values(&out, "b"),
            vec![Some(12.0), Some(16.0), Some(6.0), Some(10.0)]
        );
    }
}
