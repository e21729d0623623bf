//! Column-wise transformations.
//!
//! Every operation takes the table by reference and returns a new table;
//! the input is left untouched so a caller can preview a transformation and
//! fall back to the original.
//!
//! Standardization divides by the population standard deviation (ddof = 0).
//! A column whose valid values are all equal is centred to 0.0 rather than
//! divided by zero.

use crate::error::Result;
use crate::profiler::{require_numeric, statistics};
use crate::types::{TransformKind, TransformSpec};
use crate::utils::numeric_values;
use polars::prelude::*;
use tracing::{debug, info};

/// Applies [`TransformSpec`]s to tables.
pub struct Transformer;

impl Transformer {
    /// Apply a transformation request. Kind `None` or an empty column set
    /// returns an unchanged copy.
    pub fn apply(df: &DataFrame, spec: &TransformSpec) -> Result<DataFrame> {
        if spec.is_noop() {
            return Ok(df.clone());
        }
        match spec.kind {
            TransformKind::Standardize => Self::standardize(df, &spec.columns),
            TransformKind::Logarithm => Self::log_transform(df, &spec.columns),
            TransformKind::None => Ok(df.clone()),
        }
    }

    /// Replace each target column with `(x - mean) / std`.
    pub fn standardize(df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
        Self::validate_targets(df, columns)?;

        let mut out = df.clone();
        for name in columns {
            let series = df.column(name)?.as_materialized_series();
            let values = numeric_values(series)?;
            let valid: Vec<f64> = values.iter().flatten().copied().collect();

            let mean = statistics::mean(&valid).unwrap_or(0.0);
            let std = statistics::population_std(&valid).unwrap_or(0.0);
            let scale = if std > 0.0 { std } else { 1.0 };

            let scaled: Vec<Option<f64>> = values
                .iter()
                .map(|v| v.map(|x| (x - mean) / scale))
                .collect();

            out.replace(name, Series::new(name.as_str().into(), scaled))?;
            debug!("Standardized {} (mean = {:.4}, std = {:.4})", name, mean, std);
        }

        info!("Standardized {} column(s)", columns.len());
        Ok(out)
    }

    /// Replace each target column with `ln(1 + max(x, 0))`, keeping missing
    /// values missing.
    pub fn log_transform(df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
        Self::validate_targets(df, columns)?;

        let mut out = df.clone();
        for name in columns {
            let values = numeric_values(df.column(name)?.as_materialized_series())?;
            let clipped = values.iter().flatten().filter(|x| **x < 0.0).count();
            let logged: Vec<Option<f64>> = values
                .into_iter()
                .map(|v| v.map(|x| x.max(0.0).ln_1p()))
                .collect();

            if clipped > 0 {
                debug!("Clipped {} negative value(s) in {} to 0", clipped, name);
            }

            out.replace(name, Series::new(name.as_str().into(), logged))?;
        }

        info!("Log-transformed {} column(s)", columns.len());
        Ok(out)
    }

    /// Every target must exist and be numeric; checked before any work so a
    /// failed request never produces a half-transformed table.
    fn validate_targets(df: &DataFrame, columns: &[String]) -> Result<()> {
        for name in columns {
            require_numeric(df, name)?;
        }
        Ok(())
    }
}
