//! Report generation module.
//!
//! Two outputs are produced from a table:
//!
//! - [`Report`]: a static HTML document with the numeric descriptive
//!   statistics followed by the per-column missing counts. Rendering is
//!   deterministic, so identical tables give byte-identical reports.
//! - [`AnalysisSummary`]: the same data plus insights, serializable for the
//!   `--json` CLI flag and for programmatic access.
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_eda::reporting::ReportGenerator;
//!
//! let report = ReportGenerator::generate(&df)?;
//! report.write_to_file("outputs", "eda_report")?;
//! ```

mod generator;

pub use generator::{AnalysisSummary, Report, ReportGenerator, generate_report};
