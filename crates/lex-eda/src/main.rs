//! CLI entry point for the exploratory analysis engine.

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use lex_eda::utils::{format_stat, truncate_str};
use lex_eda::{
    AnalysisPipeline, AnalysisRequest, AnalysisResult, EdaConfig, FeatureOperator, FeatureSpec,
    PlotSelection, ReportGenerator, TableLoader, TransformKind, TransformSpec, preview,
    shape,
};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// CLI-compatible transformation enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliTransform {
    /// Leave the table unchanged
    None,
    /// Rescale to zero mean and unit variance
    Standardize,
    /// ln(1 + x), negatives clipped to zero
    Logarithm,
}

impl From<CliTransform> for TransformKind {
    fn from(cli: CliTransform) -> Self {
        match cli {
            CliTransform::None => TransformKind::None,
            CliTransform::Standardize => TransformKind::Standardize,
            CliTransform::Logarithm => TransformKind::Logarithm,
        }
    }
}

/// CLI-compatible feature operator enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFeatureOperator {
    Add,
    Subtract,
    Multiply,
    /// Rows with a zero divisor become missing
    Divide,
}

impl From<CliFeatureOperator> for FeatureOperator {
    fn from(cli: CliFeatureOperator) -> Self {
        match cli {
            CliFeatureOperator::Add => FeatureOperator::Add,
            CliFeatureOperator::Subtract => FeatureOperator::Subtract,
            CliFeatureOperator::Multiply => FeatureOperator::Multiply,
            CliFeatureOperator::Divide => FeatureOperator::Divide,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    author = "Lex Machina Team",
    version,
    about = "Exploratory Data Analysis for tabular data",
    long_about = "Profiles a CSV file, applies optional transformations and derived \
                  features, extracts insights and writes an HTML report with plots.\n\n\
                  EXAMPLES:\n  \
                  # Profile a file with default plots\n  \
                  lex-eda -i data.csv\n\n  \
                  # Standardize two columns before profiling\n  \
                  lex-eda -i data.csv --transform standardize --columns age,income\n\n  \
                  # Derive price per unit\n  \
                  lex-eda -i data.csv --feature-left price --feature-right qty --feature-op divide\n\n  \
                  # Machine-readable summary only\n  \
                  lex-eda -i data.csv --json --no-artifacts"
)]
struct Args {
    /// Path to the CSV file to analyze
    #[arg(short, long)]
    input: String,

    /// Output directory for the report and plots
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// Report file name (without extension)
    #[arg(long, default_value = "eda_report")]
    report_name: String,

    /// Transformation applied before profiling
    #[arg(long, value_enum, default_value = "none")]
    transform: CliTransform,

    /// Columns the transformation applies to (comma separated)
    #[arg(long, value_delimiter = ',')]
    columns: Vec<String>,

    /// Left operand of the derived feature
    #[arg(long, requires_all = ["feature_right", "feature_op"])]
    feature_left: Option<String>,

    /// Right operand of the derived feature
    #[arg(long, requires = "feature_left")]
    feature_right: Option<String>,

    /// Operator of the derived feature
    #[arg(long, value_enum, requires = "feature_left")]
    feature_op: Option<CliFeatureOperator>,

    /// Name of the derived feature
    ///
    /// Defaults to "<left>_<Operator>_<right>"
    #[arg(long, requires = "feature_left")]
    feature_name: Option<String>,

    /// Numeric columns to draw histograms and boxplots for (comma separated)
    #[arg(long, value_delimiter = ',')]
    plot_columns: Vec<String>,

    /// Categorical columns to draw bar charts for (comma separated)
    #[arg(long, value_delimiter = ',')]
    bar_columns: Vec<String>,

    /// Columns entering the correlation heatmap (comma separated)
    #[arg(long, value_delimiter = ',')]
    heatmap_columns: Vec<String>,

    /// Skip plot rendering
    #[arg(long)]
    no_plots: bool,

    /// Do not write the report or plots to disk
    #[arg(long)]
    no_artifacts: bool,

    /// Largest accepted input file, in MiB
    #[arg(long, default_value = "10")]
    max_upload_mb: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output the JSON summary to stdout instead of the human-readable one
    ///
    /// Disables all progress logs.
    /// Useful for piping to other tools: `... --json | jq .insights`
    #[arg(long)]
    json: bool,

    /// Write the JSON summary to the output directory
    ///
    /// The summary will be saved as <report_name>_summary.json
    #[arg(short = 'r', long)]
    emit_summary: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    // Load environment variables from .env file
    dotenv().ok();

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let config = EdaConfig::builder()
        .max_upload_bytes(upload_limit_bytes(args.max_upload_mb)?)
        .output_dir(&args.output)
        .report_name(&args.report_name)
        .write_artifacts(!args.no_artifacts)
        .build()?;

    let data = TableLoader::new(config.max_upload_bytes).load_path(&args.input)?;

    if !args.json {
        print_overview(&args, &data, &config);
    }

    let request = build_request(&args);
    let pipeline = build_pipeline(&args, config)?;

    let result = match pipeline.run(&data, &request) {
        Ok(result) => result,
        Err(e) => {
            error!("Analysis failed: {}", e);
            return Err(anyhow!("Analysis failed: {}", e));
        }
    };

    handle_output(&result, pipeline.config(), &args)
}

/// `--max-upload-mb` in bytes.
fn upload_limit_bytes(mebibytes: u64) -> Result<u64> {
    mebibytes
        .checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow!("--max-upload-mb {} is too large", mebibytes))
}

/// Assemble the run request from the CLI flags.
fn build_request(args: &Args) -> AnalysisRequest {
    let mut request = AnalysisRequest::new().transform(TransformSpec::new(
        args.transform.into(),
        args.columns.iter().cloned(),
    ));

    if let (Some(left), Some(right), Some(op)) =
        (&args.feature_left, &args.feature_right, args.feature_op)
    {
        let spec = match &args.feature_name {
            Some(name) => FeatureSpec::new(left, right, op.into(), name),
            None => FeatureSpec::with_default_name(left, right, op.into()),
        };
        request = request.feature(spec);
    }

    if args.no_plots {
        return request.without_plots();
    }

    let explicit = !args.plot_columns.is_empty()
        || !args.bar_columns.is_empty()
        || !args.heatmap_columns.is_empty();
    if explicit {
        request = request.plots(PlotSelection {
            numeric: args.plot_columns.clone(),
            categorical: args.bar_columns.clone(),
            heatmap: args.heatmap_columns.clone(),
        });
    }

    request
}

fn build_pipeline(args: &Args, config: EdaConfig) -> Result<AnalysisPipeline> {
    let mut builder = AnalysisPipeline::builder().config(config);

    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }

    Ok(builder.build()?)
}

/// Handle run output based on CLI flags.
///
/// Output behavior:
/// - Default: Print human-readable summary to stdout
/// - `--json`: Print JSON to stdout only (no logs)
/// - `--emit-summary`: Write JSON summary to file
/// - `--no-artifacts`: Keep the report and plots in memory only
fn handle_output(result: &AnalysisResult, config: &EdaConfig, args: &Args) -> Result<()> {
    let summary = result.summary();

    let mut written: Vec<PathBuf> = Vec::new();
    if config.write_artifacts {
        written = result.write_outputs(&config.output_dir, &config.report_name)?;
    }
    if args.emit_summary {
        let path = ReportGenerator::write_summary_to_file(
            &summary,
            &config.output_dir,
            &config.report_name,
        )?;
        info!("Summary written to: {}", path.display());
        written.push(path);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print_human_readable_summary(result, &written);
    Ok(())
}

/// Input file, shape and the first rows.
///
/// Note: uses `println!` intentionally; this is the primary CLI output and
/// must be visible regardless of log level.
fn print_overview(args: &Args, data: &polars::prelude::DataFrame, config: &EdaConfig) {
    println!("\n{}", "=".repeat(80));
    println!("EXPLORATORY DATA ANALYSIS");
    println!("{}\n", "=".repeat(80));

    println!("DATASET OVERVIEW");
    println!("{}", "-".repeat(40));
    println!("  File: {}", args.input);
    let (rows, columns) = shape(data);
    println!("  Rows: {}", rows);
    println!("  Columns: {}", columns);
    println!();

    println!("PREVIEW (first {} rows)", config.preview_rows);
    println!("{}", "-".repeat(40));
    println!("{}", preview(data, config.preview_rows));
    println!();
}

fn print_human_readable_summary(result: &AnalysisResult, written: &[PathBuf]) {
    println!("COLUMN KINDS");
    println!("{}", "-".repeat(40));
    for (name, kind) in &result.column_kinds {
        println!("  {:<30} {}", truncate_str(name, 29), kind);
    }
    println!();

    if !result.profile.numeric.is_empty() {
        println!("NUMERIC COLUMNS");
        println!("{}", "-".repeat(40));
        println!(
            "{:<20} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "Column", "Count", "Mean", "Std", "Min", "Median", "Max"
        );
        println!("{}", "-".repeat(94));
        for p in &result.profile.numeric {
            println!(
                "{:<20} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12}",
                truncate_str(&p.name, 19),
                p.count,
                format_stat(p.mean),
                format_stat(p.std),
                format_stat(p.min),
                format_stat(p.median),
                format_stat(p.max)
            );
        }
        println!();
    }

    if !result.profile.categorical.is_empty() {
        println!("CATEGORICAL COLUMNS");
        println!("{}", "-".repeat(40));
        println!("{:<20} {:>8} {:<20} {:>8}", "Column", "Unique", "Top", "Freq");
        println!("{}", "-".repeat(60));
        for p in &result.profile.categorical {
            println!(
                "{:<20} {:>8} {:<20} {:>8}",
                truncate_str(&p.name, 19),
                p.unique_count,
                truncate_str(p.top.as_deref().unwrap_or("-"), 19),
                p.freq.map_or_else(|| "-".to_string(), |f| f.to_string())
            );
        }
        println!();
    }

    println!("MISSING DATA");
    println!("{}", "-".repeat(40));
    if result.missing.is_empty() {
        println!("  No missing values");
    } else {
        for entry in &result.missing.entries {
            println!(
                "  {:<30} {:>8} ({:.2}%)",
                truncate_str(&entry.column, 29),
                entry.missing_count,
                entry.missing_percent
            );
        }
    }
    println!();

    println!("INSIGHTS");
    println!("{}", "-".repeat(40));
    for insight in &result.insights {
        println!("  - {}", insight);
    }
    println!();

    if !written.is_empty() {
        println!("OUTPUT FILES");
        println!("{}", "-".repeat(40));
        for path in written {
            println!("  {}", path.display());
        }
        println!();
    }
}
