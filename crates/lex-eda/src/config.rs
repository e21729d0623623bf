//! Run configuration: insight thresholds, upload limit, plot sizes and
//! output locations. Build with [`EdaConfig::builder()`]; `build()` validates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Thresholds used by the insight engine.
///
/// The defaults are the documented contract values. Changing them changes
/// which findings are reported, so callers that compare insight lists across
/// runs should leave them alone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InsightThresholds {
    /// Missing percentage (0-100) above which a column is reported. Default: 30.0
    pub high_missing_percent: f64,
    /// IQR multiplier for the outlier fences. Default: 1.5
    pub iqr_multiplier: f64,
    /// Absolute skewness above which a column is reported. Default: 1.0
    pub skewness: f64,
    /// Absolute Pearson r above which a pair is reported. Default: 0.75
    pub correlation: f64,
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self {
            high_missing_percent: 30.0,
            iqr_multiplier: 1.5,
            skewness: 1.0,
            correlation: 0.75,
        }
    }
}

/// Configuration for an analysis run.
///
/// Use [`EdaConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use lex_eda::config::EdaConfig;
///
/// let config = EdaConfig::builder()
///     .output_dir("reports")
///     .plot_size(800, 500)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdaConfig {
    /// Insight thresholds.
    pub thresholds: InsightThresholds,

    /// Largest accepted input file, in bytes.
    /// Default: 10 MiB
    pub max_upload_bytes: u64,

    /// Number of rows shown in the data preview.
    /// Default: 10
    pub preview_rows: usize,

    /// Width and height of single-column plots, in pixels.
    /// Default: 600 x 400
    pub plot_width: u32,
    pub plot_height: u32,

    /// Width and height of the correlation heatmap, in pixels.
    /// Default: 800 x 600
    pub heatmap_width: u32,
    pub heatmap_height: u32,

    /// How many numeric columns get histograms/boxplots when none are selected.
    /// Default: 3
    pub default_numeric_plots: usize,

    /// How many categorical columns get bar charts when none are selected.
    /// Default: 3
    pub default_categorical_plots: usize,

    /// How many numeric columns enter the heatmap when none are selected.
    /// Default: 5
    pub default_heatmap_columns: usize,

    /// Directory for the HTML report and image artifacts.
    /// Default: "outputs"
    pub output_dir: PathBuf,

    /// Report file name (without extension).
    /// Default: "eda_report"
    pub report_name: String,

    /// Whether to write the report and artifacts to disk.
    /// When false, results are kept in memory only.
    /// Default: true
    pub write_artifacts: bool,
}

impl Default for EdaConfig {
    fn default() -> Self {
        Self {
            thresholds: InsightThresholds::default(),
            max_upload_bytes: 10 * 1024 * 1024,
            preview_rows: 10,
            plot_width: 600,
            plot_height: 400,
            heatmap_width: 800,
            heatmap_height: 600,
            default_numeric_plots: 3,
            default_categorical_plots: 3,
            default_heatmap_columns: 5,
            output_dir: PathBuf::from("outputs"),
            report_name: "eda_report".to_string(),
            write_artifacts: true,
        }
    }
}

impl EdaConfig {
    /// Create a new configuration builder.
    pub fn builder() -> EdaConfigBuilder {
        EdaConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let t = &self.thresholds;
        if !(0.0..=100.0).contains(&t.high_missing_percent) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "high_missing_percent".to_string(),
                value: t.high_missing_percent,
            });
        }
        if !(t.iqr_multiplier > 0.0) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "iqr_multiplier".to_string(),
                value: t.iqr_multiplier,
            });
        }
        if !(t.skewness >= 0.0) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "skewness".to_string(),
                value: t.skewness,
            });
        }
        if !(0.0..=1.0).contains(&t.correlation) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "correlation".to_string(),
                value: t.correlation,
            });
        }

        if self.max_upload_bytes == 0 {
            return Err(ConfigValidationError::InvalidUploadLimit);
        }

        for (field, w, h) in [
            ("plot", self.plot_width, self.plot_height),
            ("heatmap", self.heatmap_width, self.heatmap_height),
        ] {
            if w < 100 || h < 100 {
                return Err(ConfigValidationError::InvalidPlotSize {
                    field: field.to_string(),
                    width: w,
                    height: h,
                });
            }
        }

        if self.report_name.trim().is_empty() {
            return Err(ConfigValidationError::EmptyReportName);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value}")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Upload limit must be greater than zero")]
    InvalidUploadLimit,

    #[error("Invalid {field} size {width}x{height} (both sides must be at least 100px)")]
    InvalidPlotSize {
        field: String,
        width: u32,
        height: u32,
    },

    #[error("Report name must not be empty")]
    EmptyReportName,
}

impl From<ConfigValidationError> for crate::error::EdaError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::EdaError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`EdaConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct EdaConfigBuilder {
    thresholds: Option<InsightThresholds>,
    max_upload_bytes: Option<u64>,
    preview_rows: Option<usize>,
    plot_size: Option<(u32, u32)>,
    heatmap_size: Option<(u32, u32)>,
    default_numeric_plots: Option<usize>,
    default_categorical_plots: Option<usize>,
    default_heatmap_columns: Option<usize>,
    output_dir: Option<PathBuf>,
    report_name: Option<String>,
    write_artifacts: Option<bool>,
}

impl EdaConfigBuilder {
    /// Override the insight thresholds.
    pub fn thresholds(mut self, thresholds: InsightThresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    /// Set the largest accepted input size in bytes.
    pub fn max_upload_bytes(mut self, bytes: u64) -> Self {
        self.max_upload_bytes = Some(bytes);
        self
    }

    /// Set the number of preview rows.
    pub fn preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = Some(rows);
        self
    }

    /// Set the size of single-column plots.
    pub fn plot_size(mut self, width: u32, height: u32) -> Self {
        self.plot_size = Some((width, height));
        self
    }

    /// Set the size of the correlation heatmap.
    pub fn heatmap_size(mut self, width: u32, height: u32) -> Self {
        self.heatmap_size = Some((width, height));
        self
    }

    /// Set how many numeric columns are plotted by default.
    pub fn default_numeric_plots(mut self, n: usize) -> Self {
        self.default_numeric_plots = Some(n);
        self
    }

    /// Set how many categorical columns are plotted by default.
    pub fn default_categorical_plots(mut self, n: usize) -> Self {
        self.default_categorical_plots = Some(n);
        self
    }

    /// Set how many numeric columns enter the default heatmap.
    pub fn default_heatmap_columns(mut self, n: usize) -> Self {
        self.default_heatmap_columns = Some(n);
        self
    }

    /// Set the output directory for the report and artifacts.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the report file name (without extension).
    pub fn report_name(mut self, name: impl Into<String>) -> Self {
        self.report_name = Some(name.into());
        self
    }

    /// Enable or disable writing the report and artifacts to disk.
    pub fn write_artifacts(mut self, write: bool) -> Self {
        self.write_artifacts = Some(write);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `EdaConfig` or an error if validation fails.
    pub fn build(self) -> Result<EdaConfig, ConfigValidationError> {
        let defaults = EdaConfig::default();
        let (plot_width, plot_height) = self
            .plot_size
            .unwrap_or((defaults.plot_width, defaults.plot_height));
        let (heatmap_width, heatmap_height) = self
            .heatmap_size
            .unwrap_or((defaults.heatmap_width, defaults.heatmap_height));

        let config = EdaConfig {
            thresholds: self.thresholds.unwrap_or_default(),
            max_upload_bytes: self.max_upload_bytes.unwrap_or(defaults.max_upload_bytes),
            preview_rows: self.preview_rows.unwrap_or(defaults.preview_rows),
            plot_width,
            plot_height,
            heatmap_width,
            heatmap_height,
            default_numeric_plots: self
                .default_numeric_plots
                .unwrap_or(defaults.default_numeric_plots),
            default_categorical_plots: self
                .default_categorical_plots
                .unwrap_or(defaults.default_categorical_plots),
            default_heatmap_columns: self
                .default_heatmap_columns
                .unwrap_or(defaults.default_heatmap_columns),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            report_name: self.report_name.unwrap_or(defaults.report_name),
            write_artifacts: self.write_artifacts.unwrap_or(defaults.write_artifacts),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EdaConfig::default();
        assert_eq!(config.thresholds.high_missing_percent, 30.0);
        assert_eq!(config.thresholds.iqr_multiplier, 1.5);
        assert_eq!(config.thresholds.skewness, 1.0);
        assert_eq!(config.thresholds.correlation, 0.75);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.report_name, "eda_report");
        assert!(config.write_artifacts);
    }

    #[test]
    fn test_builder_defaults() {
        let config = EdaConfig::builder().build().unwrap();
        assert_eq!(config.preview_rows, 10);
        assert_eq!(config.default_heatmap_columns, 5);
        assert_eq!((config.plot_width, config.plot_height), (600, 400));
    }

    #[test]
    fn test_builder_custom_values() {
        let config = EdaConfig::builder()
            .plot_size(900, 300)
            .preview_rows(5)
            .output_dir("reports")
            .report_name("sales")
            .write_artifacts(false)
            .build()
            .unwrap();

        assert_eq!((config.plot_width, config.plot_height), (900, 300));
        assert_eq!(config.preview_rows, 5);
        assert_eq!(config.output_dir, PathBuf::from("reports"));
        assert_eq!(config.report_name, "sales");
        assert!(!config.write_artifacts);
    }

    #[test]
    fn test_validation_invalid_correlation_threshold() {
        let result = EdaConfig::builder()
            .thresholds(InsightThresholds {
                correlation: 1.5,
                ..Default::default()
            })
            .build();

        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidThreshold { .. }
        ));
    }

    #[test]
    fn test_validation_small_plot() {
        let result = EdaConfig::builder().plot_size(50, 400).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidPlotSize { .. }
        ));
    }

    #[test]
    fn test_validation_empty_report_name() {
        let result = EdaConfig::builder().report_name("  ").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptyReportName
        ));
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "thresholds": {
                "high_missing_percent": 50.0,
                "iqr_multiplier": 3.0,
                "skewness": 2.0,
                "correlation": 0.9
            },
            "max_upload_bytes": 1024,
            "preview_rows": 3,
            "plot_width": 640,
            "plot_height": 480,
            "heatmap_width": 640,
            "heatmap_height": 480,
            "default_numeric_plots": 1,
            "default_categorical_plots": 1,
            "default_heatmap_columns": 2,
            "output_dir": "custom_output",
            "report_name": "my_report",
            "write_artifacts": false
        }"#;

        let config: EdaConfig = serde_json::from_str(json).expect("Should deserialize");
        assert_eq!(config.thresholds.iqr_multiplier, 3.0);
        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(config.output_dir.to_str().unwrap(), "custom_output");
        assert!(config.validate().is_ok());
    }
}
