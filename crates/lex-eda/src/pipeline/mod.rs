//! Pipeline module.
//!
//! This module provides the analysis pipeline that drives one invocation
//! end to end, plus progress reporting.

mod builder;
pub mod progress;

pub use builder::{AnalysisPipeline, AnalysisPipelineBuilder, AnalysisRequest, AnalysisResult};
pub use progress::{AnalysisStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate};
