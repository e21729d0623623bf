use crate::error::EdaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Column classification
// ============================================================================

/// Semantic kind of a column, derived from its declared dtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Categorical,
    Other,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

// ============================================================================
// Profiles
// ============================================================================

/// Descriptive statistics of a numeric column, over its non-missing values.
///
/// Every field except `count` is NaN (or `None` for `mode`) when the column
/// has no valid values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericProfile {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1).
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
    pub median: f64,
    /// Most frequent value; ties go to the smallest value.
    pub mode: Option<f64>,
}

/// Frequency statistics of a categorical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalProfile {
    pub name: String,
    pub unique_count: usize,
    /// Most frequent value; ties go to the value seen first.
    pub top: Option<String>,
    pub freq: Option<usize>,
}

/// Profiles of every column of a table, split by kind, in column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub shape: (usize, usize),
    pub numeric: Vec<NumericProfile>,
    pub categorical: Vec<CategoricalProfile>,
    /// Columns of kind [`ColumnKind::Other`]; they carry no statistics.
    pub other: Vec<String>,
}

impl DatasetProfile {
    pub fn numeric_profile(&self, name: &str) -> Option<&NumericProfile> {
        self.numeric.iter().find(|p| p.name == name)
    }

    pub fn categorical_profile(&self, name: &str) -> Option<&CategoricalProfile> {
        self.categorical.iter().find(|p| p.name == name)
    }
}

// ============================================================================
// Missing data
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingEntry {
    pub column: String,
    pub missing_count: usize,
    /// 100 * missing_count / row_count
    pub missing_percent: f64,
}

/// Columns with at least one missing value, highest percentage first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissingReport {
    pub entries: Vec<MissingEntry>,
}

impl MissingReport {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, column: &str) -> Option<&MissingEntry> {
        self.entries.iter().find(|e| e.column == column)
    }
}

// ============================================================================
// Transformations
// ============================================================================

/// Column-wise transformation offered to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransformKind {
    /// Leave the table as it is.
    #[default]
    None,
    /// (x - mean) / std
    Standardize,
    /// ln(1 + max(x, 0))
    Logarithm,
}

impl FromStr for TransformKind {
    type Err = EdaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standardize" => Ok(Self::Standardize),
            "logarithm" | "log" => Ok(Self::Logarithm),
            other => Err(EdaError::UnsupportedOperation(format!(
                "unknown transformation '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "None",
            Self::Standardize => "Standardize",
            Self::Logarithm => "Logarithm",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransformSpec {
    pub kind: TransformKind,
    pub columns: Vec<String>,
}

impl TransformSpec {
    pub fn new(kind: TransformKind, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            kind,
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// A spec that changes nothing when applied.
    pub fn is_noop(&self) -> bool {
        self.kind == TransformKind::None || self.columns.is_empty()
    }
}

// ============================================================================
// Derived features
// ============================================================================

/// Binary arithmetic operator for derived features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl FeatureOperator {
    /// Apply the operator to one row. Division by zero yields `None`.
    pub fn apply(self, left: f64, right: f64) -> Option<f64> {
        match self {
            Self::Add => Some(left + right),
            Self::Subtract => Some(left - right),
            Self::Multiply => Some(left * right),
            Self::Divide if right == 0.0 => None,
            Self::Divide => Some(left / right),
        }
    }
}

impl FromStr for FeatureOperator {
    type Err = EdaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" => Ok(Self::Add),
            "subtract" => Ok(Self::Subtract),
            "multiply" => Ok(Self::Multiply),
            "divide" => Ok(Self::Divide),
            other => Err(EdaError::UnsupportedOperation(format!(
                "unknown feature operator '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for FeatureOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Add => "Add",
            Self::Subtract => "Subtract",
            Self::Multiply => "Multiply",
            Self::Divide => "Divide",
        };
        f.write_str(s)
    }
}

/// Request to derive `name` from `left <operator> right`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub left: String,
    pub right: String,
    pub operator: FeatureOperator,
    pub name: String,
}

impl FeatureSpec {
    pub fn new(
        left: impl Into<String>,
        right: impl Into<String>,
        operator: FeatureOperator,
        name: impl Into<String>,
    ) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            operator,
            name: name.into(),
        }
    }

    /// Spec named `{left}_{Operator}_{right}`.
    pub fn with_default_name(
        left: impl Into<String>,
        right: impl Into<String>,
        operator: FeatureOperator,
    ) -> Self {
        let left = left.into();
        let right = right.into();
        let name = Self::default_name(&left, operator, &right);
        Self::new(left, right, operator, name)
    }

    pub fn default_name(left: &str, operator: FeatureOperator, right: &str) -> String {
        format!("{}_{}_{}", left, operator, right)
    }
}

// ============================================================================
// Insights
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    HighMissing,
    Outlier,
    Skew,
    Correlation,
    /// Sentinel emitted when nothing else was found.
    None,
}

/// A single textual finding plus the number that triggered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub message: String,
    /// Columns the finding refers to (two for correlations).
    pub columns: Vec<String>,
    /// Missing percent, skewness or Pearson r; `None` for outliers and the sentinel.
    pub evidence: Option<f64>,
}

impl Insight {
    pub fn high_missing(column: &str, percent: f64) -> Self {
        Self {
            kind: InsightKind::HighMissing,
            message: format!("Column '{}' has high missing rate: {:.2}%", column, percent),
            columns: vec![column.to_string()],
            evidence: Some(percent),
        }
    }

    pub fn outlier(column: &str) -> Self {
        Self {
            kind: InsightKind::Outlier,
            message: format!(
                "Column '{}' has potential outliers detected by IQR method",
                column
            ),
            columns: vec![column.to_string()],
            evidence: None,
        }
    }

    pub fn skew(column: &str, skewness: f64) -> Self {
        Self {
            kind: InsightKind::Skew,
            message: format!(
                "Column '{}' is highly skewed (skewness = {:.2})",
                column, skewness
            ),
            columns: vec![column.to_string()],
            evidence: Some(skewness),
        }
    }

    pub fn correlation(first: &str, second: &str, r: f64) -> Self {
        Self {
            kind: InsightKind::Correlation,
            message: format!(
                "Columns '{}' and '{}' are highly correlated (corr = {:.2})",
                first, second, r
            ),
            columns: vec![first.to_string(), second.to_string()],
            evidence: Some(r),
        }
    }

    pub fn none() -> Self {
        Self {
            kind: InsightKind::None,
            message: "No critical insights or warnings detected.".to_string(),
            columns: Vec::new(),
            evidence: None,
        }
    }
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
