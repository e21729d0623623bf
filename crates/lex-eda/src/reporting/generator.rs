use crate::error::{EdaError, Result, ResultExt};
use crate::profiler::{DataProfiler, classify_columns};
use crate::types::{ColumnKind, DatasetProfile, Insight, MissingReport, NumericProfile};
use crate::utils::{escape_markup, format_stat, sanitize_file_stem};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const STYLE: &str = "body { font-family: sans-serif; margin: 2em; }\n\
table { border-collapse: collapse; margin-bottom: 2em; }\n\
th, td { border: 1px solid #ccc; padding: 4px 8px; text-align: right; }\n\
thead th { background: #f0f0f0; }\n";

/// Row labels of the descriptive-statistics table, top to bottom.
const STAT_ROWS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

// ============================================================================
// Report
// ============================================================================

/// A rendered, self-contained HTML report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    html: String,
}

impl Report {
    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn into_html(self) -> String {
        self.html
    }

    /// Write the report as `<dir>/<name>.html`, creating `dir` when needed.
    pub fn write_to_file(&self, dir: impl AsRef<Path>, name: &str) -> Result<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .context(format!("creating report directory {}", dir.display()))?;

        let path = dir.join(format!("{}.html", sanitize_file_stem(name)));
        let mut file = File::create(&path).context(format!("creating {}", path.display()))?;
        file.write_all(self.html.as_bytes())?;

        info!("Report saved: {}", path.display());
        Ok(path)
    }
}

// ============================================================================
// Machine-readable summary
// ============================================================================

/// Everything the engine computed about a table, for JSON output and
/// programmatic access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// (rows, columns)
    pub shape: (usize, usize),
    pub column_kinds: Vec<(String, ColumnKind)>,
    pub profile: DatasetProfile,
    /// Empty for a table without rows.
    pub missing: MissingReport,
    pub insights: Vec<String>,
}

// ============================================================================
// Generator
// ============================================================================

/// Renders profiling output into a static document.
pub struct ReportGenerator;

impl ReportGenerator {
    /// Render the numeric descriptive statistics and the unfiltered missing
    /// counts into one HTML document.
    ///
    /// The output depends only on the table content; it carries no timestamp.
    pub fn generate(df: &DataFrame) -> Result<Report> {
        let profile = DataProfiler::profile(df)
            .map_err(|e| EdaError::ReportGenerationFailed(e.to_string()))?;
        let missing = DataProfiler::missing_summary(df)
            .map_err(|e| EdaError::ReportGenerationFailed(e.to_string()))?;

        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str("<title>EDA Report</title>\n");
        html.push_str(&format!("<style>\n{}</style>\n", STYLE));
        html.push_str("</head>\n<body>\n");
        html.push_str("<h1>Exploratory Data Analysis Report</h1>\n");

        html.push_str("<h2>Descriptive Statistics (Numeric Columns)</h2>\n");
        html.push_str(&Self::describe_table(&profile.numeric));

        html.push_str("<h2>Missing Data Summary</h2>\n");
        html.push_str(&Self::missing_table(&missing));

        html.push_str("</body>\n</html>\n");

        debug!(
            "Rendered report: {} numeric column(s), {} column(s) in missing summary",
            profile.numeric.len(),
            missing.len()
        );
        Ok(Report { html })
    }

    /// Statistic per row, numeric column per column.
    fn describe_table(profiles: &[NumericProfile]) -> String {
        if profiles.is_empty() {
            return "<p>No numeric columns.</p>\n".to_string();
        }

        let mut out = String::from("<table class=\"describe\">\n<thead>\n<tr><th></th>");
        for p in profiles {
            out.push_str(&format!("<th>{}</th>", escape_markup(&p.name)));
        }
        out.push_str("</tr>\n</thead>\n<tbody>\n");

        for label in STAT_ROWS {
            out.push_str(&format!("<tr><th>{}</th>", escape_markup(label)));
            for p in profiles {
                out.push_str(&format!("<td>{}</td>", format_stat(stat_value(p, label))));
            }
            out.push_str("</tr>\n");
        }

        out.push_str("</tbody>\n</table>\n");
        out
    }

    fn missing_table(missing: &[(String, usize)]) -> String {
        let mut out = String::from(
            "<table class=\"missing\">\n<thead>\n<tr><th></th><th>missing_count</th></tr>\n</thead>\n<tbody>\n",
        );
        for (name, count) in missing {
            out.push_str(&format!(
                "<tr><th>{}</th><td>{}</td></tr>\n",
                escape_markup(name),
                count
            ));
        }
        out.push_str("</tbody>\n</table>\n");
        out
    }

    /// Collect profile, missing report and insight messages for `df`.
    pub fn build_summary(df: &DataFrame, insights: &[Insight]) -> Result<AnalysisSummary> {
        let missing = if df.height() == 0 {
            MissingReport::default()
        } else {
            DataProfiler::missing_data(df)?
        };

        Ok(AnalysisSummary {
            shape: df.shape(),
            column_kinds: classify_columns(df),
            profile: DataProfiler::profile(df)?,
            missing,
            insights: insights.iter().map(|i| i.message.clone()).collect(),
        })
    }

    /// Write a summary as pretty JSON to `<dir>/<base_name>_summary.json`.
    pub fn write_summary_to_file(
        summary: &AnalysisSummary,
        dir: impl AsRef<Path>,
        base_name: &str,
    ) -> Result<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let path = dir.join(format!("{}_summary.json", sanitize_file_stem(base_name)));
        let mut file = File::create(&path)?;
        file.write_all(serde_json::to_string_pretty(summary)?.as_bytes())?;

        info!("Summary saved: {}", path.display());
        Ok(path)
    }
}

fn stat_value(p: &NumericProfile, label: &str) -> f64 {
    match label {
        "count" => p.count as f64,
        "mean" => p.mean,
        "std" => p.std,
        "min" => p.min,
        "25%" => p.q25,
        "50%" => p.q50,
        "75%" => p.q75,
        "max" => p.max,
        _ => f64::NAN,
    }
}

/// Render the report for `df`.
pub fn generate_report(df: &DataFrame) -> Result<Report> {
    ReportGenerator::generate(df)
}
