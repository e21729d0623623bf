//! Progress reporting for an analysis run.
//!
//! A run is synchronous; the reporter is called inline between stages. The
//! reporter must still be `Send + Sync` so a front end can run the analysis
//! on a worker thread and forward updates to its UI.
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_eda::{AnalysisPipeline, AnalysisRequest};
//!
//! let result = AnalysisPipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run(&df, &AnalysisRequest::default())?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of an analysis run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStage {
    /// Partitioning columns into numeric / categorical / other
    Classifying,
    /// Applying the requested transformation
    Transforming,
    /// Deriving the requested feature column
    SynthesizingFeature,
    /// Descriptive statistics and missing-data report
    Profiling,
    /// Running the insight checks
    ExtractingInsights,
    /// Rendering the report and plots
    Rendering,
    /// Run completed successfully
    Complete,
    /// Run failed with an error
    Failed,
}

impl AnalysisStage {
    /// Label shown next to the progress bar.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Classifying => "Classifying Columns",
            Self::Transforming => "Transforming Columns",
            Self::SynthesizingFeature => "Creating Feature",
            Self::Profiling => "Profiling Dataset",
            Self::ExtractingInsights => "Extracting Insights",
            Self::Rendering => "Rendering Outputs",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of the overall run taken by this stage. The working stages sum
    /// to 1.0.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Classifying => 0.05,
            Self::Transforming => 0.15,
            Self::SynthesizingFeature => 0.10,
            Self::Profiling => 0.25,
            Self::ExtractingInsights => 0.25,
            Self::Rendering => 0.20,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Classifying => 0.0,
            Self::Transforming => 0.05,
            Self::SynthesizingFeature => 0.20,
            Self::Profiling => 0.30,
            Self::ExtractingInsights => 0.55,
            Self::Rendering => 0.80,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// Progress update emitted to a [`ProgressReporter`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: AnalysisStage,

    /// Optional detail such as the column being plotted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_stage: Option<String>,

    /// Fraction of the whole run, in [0, 1].
    pub progress: f32,

    /// Fraction of the current stage, in [0, 1].
    pub stage_progress: f32,

    pub message: String,
}

impl ProgressUpdate {
    pub fn new(stage: AnalysisStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            sub_stage: None,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    /// Update for item `current` of `total` within a stage.
    pub fn with_items(
        stage: AnalysisStage,
        sub_stage: impl Into<String>,
        current: usize,
        total: usize,
        message: impl Into<String>,
    ) -> Self {
        let stage_progress = match total {
            0 => 0.0,
            _ => current as f32 / total as f32,
        };
        Self {
            sub_stage: Some(sub_stage.into()),
            ..Self::new(stage, stage_progress, message)
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: AnalysisStage::Complete,
            sub_stage: None,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: AnalysisStage::Failed,
            sub_stage: None,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
        }
    }
}

/// Receives progress updates during an analysis run.
///
/// # Example
///
/// ```rust,ignore
/// use lex_eda::{ProgressReporter, ProgressUpdate};
///
/// struct StderrReporter;
///
/// impl ProgressReporter for StderrReporter {
///     fn report(&self, update: ProgressUpdate) {
///         eprintln!("{}: {}", update.stage.display_name(), update.message);
///     }
/// }
/// ```
pub trait ProgressReporter: Send + Sync {
    /// Called inline by the pipeline; keep it cheap.
    fn report(&self, update: ProgressUpdate);
}

/// [`ProgressReporter`] backed by a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
static_assertions::assert_impl_all!(AnalysisStage: Send, Sync, Copy);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_progress_update_new() {
        let update = ProgressUpdate::new(AnalysisStage::Profiling, 0.5, "Profiling...");
        assert_eq!(update.stage, AnalysisStage::Profiling);
        assert!(update.sub_stage.is_none());
        assert_eq!(update.stage_progress, 0.5);
        assert!((update.progress - 0.425).abs() < 1e-6);
    }

    #[test]
    fn test_progress_update_with_items() {
        let update = ProgressUpdate::with_items(
            AnalysisStage::Rendering,
            "Column: age",
            1,
            4,
            "Rendering histogram of age",
        );
        assert_eq!(update.sub_stage, Some("Column: age".to_string()));
        assert_eq!(update.stage_progress, 0.25);
        assert!((update.progress - 0.85).abs() < 1e-6);
    }

    #[test]
    fn test_progress_update_terminal() {
        let done = ProgressUpdate::complete("Done");
        assert_eq!(done.stage, AnalysisStage::Complete);
        assert_eq!(done.progress, 1.0);

        let failed = ProgressUpdate::failed("boom");
        assert_eq!(failed.stage, AnalysisStage::Failed);
        assert_eq!(failed.message, "boom");
    }

    #[test]
    fn test_stage_weights_sum() {
        let stages = [
            AnalysisStage::Classifying,
            AnalysisStage::Transforming,
            AnalysisStage::SynthesizingFeature,
            AnalysisStage::Profiling,
            AnalysisStage::ExtractingInsights,
            AnalysisStage::Rendering,
        ];

        let total: f32 = stages.iter().map(|s| s.weight()).sum();
        assert!((total - 1.0).abs() < 0.01, "Weights should sum to ~1.0");

        // each stage starts where the previous one ends
        for pair in stages.windows(2) {
            let end = pair[0].base_progress() + pair[0].weight();
            assert!((end - pair[1].base_progress()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_stage_json_values() {
        let expectations = [
            (AnalysisStage::Classifying, "\"classifying\""),
            (AnalysisStage::SynthesizingFeature, "\"synthesizing_feature\""),
            (AnalysisStage::ExtractingInsights, "\"extracting_insights\""),
            (AnalysisStage::Failed, "\"failed\""),
        ];

        for (stage, expected) in expectations {
            assert_eq!(serde_json::to_string(&stage).unwrap(), expected);
        }
    }

    #[test]
    fn test_reporter_shared_with_worker_thread() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let reporter: Arc<dyn ProgressReporter> =
            Arc::new(ClosureProgressReporter::new(move |update: ProgressUpdate| {
                sink.lock().unwrap().push(update.stage);
            }));

        let worker = reporter.clone();
        std::thread::spawn(move || {
            worker.report(ProgressUpdate::new(AnalysisStage::Profiling, 0.0, "profiling"));
            worker.report(ProgressUpdate::failed("column vanished"));
        })
        .join()
        .unwrap();
        reporter.report(ProgressUpdate::complete("done"));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                AnalysisStage::Profiling,
                AnalysisStage::Failed,
                AnalysisStage::Complete
            ]
        );
    }
}
