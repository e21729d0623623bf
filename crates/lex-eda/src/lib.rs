//! Exploratory Data Analysis Library
//!
//! Turns a raw table into structured statistics and natural-language
//! findings, built on Polars.
//!
//! # Overview
//!
//! - **Column Classification**: numeric / categorical / other by declared dtype
//! - **Profiling**: descriptive statistics, mode, categorical frequencies,
//!   missing-data diagnostics
//! - **Transformations**: standardization and clipped `ln(1 + x)`, always
//!   returning a new table
//! - **Derived Features**: elementwise arithmetic on two numeric columns with
//!   guarded division
//! - **Insights**: high missingness, IQR outliers, skew and correlated pairs,
//!   in a fixed order
//! - **Reports and Plots**: deterministic HTML report and SVG plots
//! - **Progress Reporting**: stage-by-stage updates from the pipeline
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lex_eda::{AnalysisPipeline, AnalysisRequest, FeatureOperator, FeatureSpec, load_csv};
//!
//! let df = load_csv("data.csv")?;
//!
//! let request = AnalysisRequest::new()
//!     .feature(FeatureSpec::new("price", "qty", FeatureOperator::Divide, "unit_price"));
//!
//! let result = AnalysisPipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run(&df, &request)?;
//!
//! for insight in &result.insights {
//!     println!("{}", insight);
//! }
//! result.write_outputs("outputs", "eda_report")?;
//! ```
//!
//! # Using the components directly
//!
//! Every stage is usable on its own:
//!
//! ```rust,ignore
//! use lex_eda::{DataProfiler, Transformer, extract_insights, generate_report};
//!
//! let profile = DataProfiler::profile(&df)?;
//! let missing = DataProfiler::missing_data(&df)?;
//! let scaled = Transformer::standardize(&df, &["age".to_string()])?;
//! let insights = extract_insights(&scaled)?;
//! let report = generate_report(&scaled)?;
//! ```
//!
//! # Configuration
//!
//! Use [`EdaConfig`] to change thresholds, plot sizes and output locations:
//!
//! ```rust,ignore
//! use lex_eda::config::*;
//!
//! let config = EdaConfig::builder()
//!     .plot_size(800, 500)
//!     .default_heatmap_columns(8)
//!     .output_dir("reports")
//!     .build()?;
//! ```

pub mod config;
pub mod error;
pub mod features;
pub mod insights;
pub mod loader;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod transform;
pub mod types;
pub mod utils;
pub mod visualization;

// Re-exports for convenient access
pub use config::{ConfigValidationError, EdaConfig, EdaConfigBuilder, InsightThresholds};
pub use error::{EdaError, Result as EdaResult, ResultExt};
pub use features::FeatureSynthesizer;
pub use insights::{InsightEngine, extract_insights};
pub use loader::{TableLoader, load_csv, load_csv_from_bytes, preview, shape};
pub use pipeline::{
    AnalysisPipeline, AnalysisPipelineBuilder, AnalysisRequest, AnalysisResult, AnalysisStage,
    ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
pub use profiler::{DataProfiler, classify_columns};
pub use reporting::{AnalysisSummary, Report, ReportGenerator, generate_report};
pub use transform::Transformer;
pub use types::{
    CategoricalProfile, ColumnKind, DatasetProfile, FeatureOperator, FeatureSpec, Insight,
    InsightKind, MissingEntry, MissingReport, NumericProfile, TransformKind, TransformSpec,
};
pub use visualization::{ArtifactKind, ImageArtifact, PlotSelection, Visualizer};
