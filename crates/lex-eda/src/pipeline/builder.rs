//! The analysis pipeline.
//!
//! This module provides [`AnalysisPipeline`] and its builder. One call to
//! [`AnalysisPipeline::run`] performs a whole invocation: classify,
//! transform, derive a feature, profile, extract insights, render.

use crate::config::EdaConfig;
use crate::error::{EdaError, Result};
use crate::features::FeatureSynthesizer;
use crate::insights::InsightEngine;
use crate::pipeline::progress::{
    AnalysisStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::profiler::{DataProfiler, classify_columns, numeric_columns};
use crate::reporting::{AnalysisSummary, Report, ReportGenerator};
use crate::transform::Transformer;
use crate::types::{
    ColumnKind, DatasetProfile, FeatureSpec, Insight, MissingReport, TransformSpec,
};
use crate::visualization::{ImageArtifact, PlotSelection, Visualizer};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// What a single run should do beyond profiling and insights.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Applied first; the default changes nothing.
    pub transform: TransformSpec,
    /// Derived from the transformed table.
    pub feature: Option<FeatureSpec>,
    /// Explicit plot selection; `None` plots the default columns.
    pub plots: Option<PlotSelection>,
    /// Skip plot rendering entirely when false.
    pub render_plots: bool,
}

impl Default for AnalysisRequest {
    fn default() -> Self {
        Self {
            transform: TransformSpec::default(),
            feature: None,
            plots: None,
            render_plots: true,
        }
    }
}

impl AnalysisRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transform(mut self, spec: TransformSpec) -> Self {
        self.transform = spec;
        self
    }

    pub fn feature(mut self, spec: FeatureSpec) -> Self {
        self.feature = Some(spec);
        self
    }

    pub fn plots(mut self, selection: PlotSelection) -> Self {
        self.plots = Some(selection);
        self
    }

    pub fn without_plots(mut self) -> Self {
        self.render_plots = false;
        self
    }
}

/// Everything one run produced. The input table is kept unmodified in
/// `original`; `table` is the transformed table every other field was
/// computed from.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub original: DataFrame,
    pub table: DataFrame,
    /// Kinds of the input columns, before any feature was added.
    pub column_kinds: Vec<(String, ColumnKind)>,
    pub profile: DatasetProfile,
    /// Empty for a table without rows.
    pub missing: MissingReport,
    pub insights: Vec<Insight>,
    pub report: Report,
    pub artifacts: Vec<ImageArtifact>,
}

impl AnalysisResult {
    pub fn summary(&self) -> AnalysisSummary {
        AnalysisSummary {
            shape: self.table.shape(),
            column_kinds: classify_columns(&self.table),
            profile: self.profile.clone(),
            missing: self.missing.clone(),
            insights: self.insights.iter().map(|i| i.message.clone()).collect(),
        }
    }

    /// Write the HTML report and every artifact into `dir`.
    pub fn write_outputs(&self, dir: impl AsRef<Path>, report_name: &str) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let mut written = vec![self.report.write_to_file(dir, report_name)?];
        for artifact in &self.artifacts {
            written.push(artifact.write_to(dir)?);
        }
        info!("Wrote {} file(s) to {}", written.len(), dir.display());
        Ok(written)
    }
}

/// The exploratory analysis pipeline.
///
/// Use [`AnalysisPipeline::builder()`] to create one. The pipeline holds only
/// configuration; every run owns its tables, so one pipeline can serve many
/// runs, including from different threads.
///
/// # Example
///
/// ```rust,ignore
/// use lex_eda::{AnalysisPipeline, AnalysisRequest, EdaConfig};
///
/// let result = AnalysisPipeline::builder()
///     .config(EdaConfig::default())
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run(&df, &AnalysisRequest::default())?;
///
/// for insight in &result.insights {
///     println!("{}", insight);
/// }
/// ```
pub struct AnalysisPipeline {
    config: EdaConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    visualizer: Visualizer,
}

static_assertions::assert_impl_all!(AnalysisPipeline: Send, Sync);

impl AnalysisPipeline {
    pub fn builder() -> AnalysisPipelineBuilder {
        AnalysisPipelineBuilder::default()
    }

    pub fn config(&self) -> &EdaConfig {
        &self.config
    }

    /// Analyze `df` as described by `request`.
    ///
    /// # Errors
    ///
    /// Any engine error aborts the run and is returned unchanged; a
    /// [`AnalysisStage::Failed`] update is reported first.
    pub fn run(&self, df: &DataFrame, request: &AnalysisRequest) -> Result<AnalysisResult> {
        match self.run_internal(df, request) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Analysis completed successfully"));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Analysis error: {}", e);
                Err(e)
            }
        }
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn run_internal(&self, df: &DataFrame, request: &AnalysisRequest) -> Result<AnalysisResult> {
        info!("Starting analysis of table with shape {:?}", df.shape());

        // Step 1: Classify columns
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Classifying,
            0.0,
            "Classifying columns...",
        ));
        let column_kinds = classify_columns(df);
        for (name, kind) in &column_kinds {
            debug!("  {}: {}", name, kind);
        }

        // Step 2: Transformation
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Transforming,
            0.0,
            format!("Applying transformation: {}", request.transform.kind),
        ));
        let table = Transformer::apply(df, &request.transform)?;

        // Step 3: Derived feature
        let table = match &request.feature {
            Some(spec) => {
                self.report_progress(ProgressUpdate::new(
                    AnalysisStage::SynthesizingFeature,
                    0.0,
                    format!("Creating feature {}", spec.name),
                ));
                Self::check_feature_request(&table, spec)?;
                FeatureSynthesizer::create_feature(&table, spec)?
            }
            None => table,
        };

        // Step 4: Profile
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Profiling,
            0.0,
            "Profiling dataset...",
        ));
        let profile = DataProfiler::profile(&table)?;
        let missing = if table.height() == 0 {
            warn!("Table has no rows; skipping missing-data report");
            MissingReport::default()
        } else {
            DataProfiler::missing_data(&table)?
        };

        // Step 5: Insights
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::ExtractingInsights,
            0.0,
            "Extracting insights...",
        ));
        let insights = InsightEngine::extract(&table, &self.config.thresholds)?;

        // Step 6: Report and plots
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Rendering,
            0.0,
            "Rendering report...",
        ));
        let report = ReportGenerator::generate(&table)?;
        let artifacts = if request.render_plots {
            self.render_plots(&table, request.plots.as_ref())?
        } else {
            Vec::new()
        };

        info!(
            "Analysis finished: {} insight(s), {} artifact(s)",
            insights.len(),
            artifacts.len()
        );

        Ok(AnalysisResult {
            original: df.clone(),
            table,
            column_kinds,
            profile,
            missing,
            insights,
            report,
            artifacts,
        })
    }

    /// Caller-side checks the synthesizer leaves to us: two numeric columns
    /// must exist and the new name must be free.
    fn check_feature_request(df: &DataFrame, spec: &FeatureSpec) -> Result<()> {
        let found = numeric_columns(df).len();
        if found < 2 {
            return Err(EdaError::InsufficientColumns { required: 2, found });
        }
        if df.column(&spec.name).is_ok() {
            return Err(EdaError::DuplicateColumn(spec.name.clone()));
        }
        Ok(())
    }

    /// Explicit selections fail on the first unplottable column; the default
    /// selection skips such columns with a warning.
    fn render_plots(
        &self,
        df: &DataFrame,
        selection: Option<&PlotSelection>,
    ) -> Result<Vec<ImageArtifact>> {
        let strict = selection.is_some();
        let selection = selection
            .cloned()
            .unwrap_or_else(|| PlotSelection::defaults(df, &self.config));

        let total = 2 * selection.numeric.len() + selection.categorical.len() + 1;
        let mut done = 0;
        let mut artifacts = Vec::with_capacity(total);

        let keep = |result: Result<ImageArtifact>, artifacts: &mut Vec<ImageArtifact>| {
            match result {
                Ok(artifact) => artifacts.push(artifact),
                Err(e) if !strict => warn!("Skipping plot: {}", e),
                Err(e) => return Err(e),
            }
            Ok(())
        };

        for column in &selection.numeric {
            self.report_progress(ProgressUpdate::with_items(
                AnalysisStage::Rendering,
                format!("Column: {}", column),
                done,
                total,
                format!("Plotting distribution of {}", column),
            ));
            keep(self.visualizer.histogram(df, column), &mut artifacts)?;
            keep(self.visualizer.boxplot(df, column), &mut artifacts)?;
            done += 2;
        }

        for column in &selection.categorical {
            self.report_progress(ProgressUpdate::with_items(
                AnalysisStage::Rendering,
                format!("Column: {}", column),
                done,
                total,
                format!("Plotting value counts of {}", column),
            ));
            keep(self.visualizer.barplot(df, column), &mut artifacts)?;
            done += 1;
        }

        self.report_progress(ProgressUpdate::with_items(
            AnalysisStage::Rendering,
            "Heatmap",
            done,
            total,
            "Plotting correlation heatmap",
        ));
        match self.visualizer.correlation_heatmap(df, &selection.heatmap) {
            Ok(Some(artifact)) => artifacts.push(artifact),
            Ok(None) => debug!("Not enough numeric columns for a heatmap"),
            Err(e) => keep(Err(e), &mut artifacts)?,
        }

        Ok(artifacts)
    }
}

/// Builder for creating an [`AnalysisPipeline`] instance.
#[derive(Default)]
pub struct AnalysisPipelineBuilder {
    config: Option<EdaConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(AnalysisPipelineBuilder: Send);

impl AnalysisPipelineBuilder {
    pub fn config(mut self, config: EdaConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a custom progress reporter.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<AnalysisPipeline, crate::config::ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(AnalysisPipeline {
            visualizer: Visualizer::from_config(&config),
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FeatureOperator, InsightKind, TransformKind};
    use std::sync::Mutex;

    fn sample() -> DataFrame {
        df![
            "x" => [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0],
            "y" => [2.0f64, 0.0, 6.0, 8.0, 10.0, 12.0],
            "city" => ["a", "b", "a", "c", "a", "b"],
        ]
        .unwrap()
    }

    fn pipeline() -> AnalysisPipeline {
        AnalysisPipeline::builder().build().unwrap()
    }

    #[test]
    fn test_builder_default_config() {
        let pipeline = pipeline();
        assert_eq!(pipeline.config().thresholds.correlation, 0.75);
        assert!(pipeline.progress_reporter.is_none());
    }

    #[test]
    fn test_run_leaves_input_alone() {
        let df = sample();
        let request = AnalysisRequest::new()
            .transform(TransformSpec::new(TransformKind::Standardize, ["x"]))
            .feature(FeatureSpec::new("x", "y", FeatureOperator::Divide, "ratio"));

        let result = pipeline().run(&df, &request).unwrap();

        assert!(result.original.equals_missing(&df));
        assert_eq!(result.table.width(), 4);
        assert!(result.table.column("ratio").is_ok());
        assert_eq!(result.profile.numeric.len(), 3);
        assert!(!result.artifacts.is_empty());
    }

    #[test]
    fn test_feature_name_collision_rejected() {
        let request =
            AnalysisRequest::new().feature(FeatureSpec::new("x", "y", FeatureOperator::Add, "y"));
        assert!(matches!(
            pipeline().run(&sample(), &request),
            Err(EdaError::DuplicateColumn(name)) if name == "y"
        ));
    }

    #[test]
    fn test_feature_needs_two_numeric_columns() {
        let df = df!["x" => [1.0f64, 2.0], "c" => ["a", "b"]].unwrap();
        let request =
            AnalysisRequest::new().feature(FeatureSpec::new("x", "x", FeatureOperator::Add, "z"));
        assert!(matches!(
            pipeline().run(&df, &request),
            Err(EdaError::InsufficientColumns { required: 2, found: 1 })
        ));
    }

    #[test]
    fn test_progress_stages_in_order() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let sink = stages.clone();
        let pipeline = AnalysisPipeline::builder()
            .on_progress(move |update| sink.lock().unwrap().push(update.stage))
            .build()
            .unwrap();

        let request = AnalysisRequest::new()
            .feature(FeatureSpec::new("x", "y", FeatureOperator::Multiply, "xy"))
            .without_plots();
        pipeline.run(&sample(), &request).unwrap();

        let mut seen = stages.lock().unwrap().clone();
        seen.dedup();
        assert_eq!(
            seen,
            vec![
                AnalysisStage::Classifying,
                AnalysisStage::Transforming,
                AnalysisStage::SynthesizingFeature,
                AnalysisStage::Profiling,
                AnalysisStage::ExtractingInsights,
                AnalysisStage::Rendering,
                AnalysisStage::Complete,
            ]
        );
    }

    #[test]
    fn test_failure_is_reported() {
        let last = Arc::new(Mutex::new(None));
        let sink = last.clone();
        let pipeline = AnalysisPipeline::builder()
            .on_progress(move |update| *sink.lock().unwrap() = Some(update.stage))
            .build()
            .unwrap();

        let request =
            AnalysisRequest::new().transform(TransformSpec::new(TransformKind::Logarithm, ["city"]));
        assert!(pipeline.run(&sample(), &request).is_err());
        assert_eq!(*last.lock().unwrap(), Some(AnalysisStage::Failed));
    }

    #[test]
    fn test_explicit_plot_selection_is_strict() {
        let selection = PlotSelection {
            numeric: vec!["city".to_string()],
            ..PlotSelection::default()
        };
        let request = AnalysisRequest::new().plots(selection);
        assert!(matches!(
            pipeline().run(&sample(), &request),
            Err(EdaError::InvalidColumn { .. })
        ));
    }

    #[test]
    fn test_default_plots() {
        let result = pipeline().run(&sample(), &AnalysisRequest::default()).unwrap();
        // 2 numeric columns x (histogram + boxplot), 1 bar chart, 1 heatmap
        assert_eq!(result.artifacts.len(), 6);
    }

    #[test]
    fn test_summary_matches_result() {
        let result = pipeline()
            .run(&sample(), &AnalysisRequest::new().without_plots())
            .unwrap();
        let summary = result.summary();

        assert_eq!(summary.shape, (6, 3));
        assert_eq!(summary.insights.len(), result.insights.len());
        assert!(result.insights.iter().any(|i| i.kind == InsightKind::Correlation));
    }
}
