//! Plot rendering.
//!
//! Every plot is returned as an [`ImageArtifact`] holding a self-contained
//! SVG document. Rendering is read-only with respect to the table.
//!
//! The correlation heatmap is the one soft failure: with fewer than two
//! numeric columns selected it returns `Ok(None)` instead of an error.

pub mod layout;
pub mod svg;

use crate::config::EdaConfig;
use crate::error::{EdaError, Result};
use crate::profiler::{
    DataProfiler, categorical_columns, column_kind, numeric_columns, require_numeric,
};
use crate::types::ColumnKind;
use crate::utils::{
    ordered_value_counts, sanitize_file_stem, string_values, truncate_str, valid_numeric_values,
};
use layout::{BoxStats, KDE_POINTS, linspace};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use svg::{Anchor, LinearScale, Margins, SvgCanvas};
use tracing::{debug, info, warn};

const BAR_FILL: &str = "#4c72b0";
const CURVE_STROKE: &str = "#dd8452";
const BOX_FILL: &str = "#a1c9f4";

/// Kind of plot an artifact holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Histogram,
    Boxplot,
    BarChart,
    Heatmap,
}

impl ArtifactKind {
    fn file_prefix(self) -> &'static str {
        match self {
            Self::Histogram => "histogram",
            Self::Boxplot => "boxplot",
            Self::BarChart => "barchart",
            Self::Heatmap => "heatmap",
        }
    }
}

/// A rendered plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageArtifact {
    pub kind: ArtifactKind,
    pub title: String,
    /// Columns the plot was drawn from.
    pub columns: Vec<String>,
    /// Always `"svg"`.
    pub format: String,
    pub content: String,
}

impl ImageArtifact {
    fn svg(kind: ArtifactKind, title: String, columns: Vec<String>, content: String) -> Self {
        Self {
            kind,
            title,
            columns,
            format: "svg".to_string(),
            content,
        }
    }

    /// `<kind>_<column>.svg`, or `heatmap.svg` for the correlation heatmap.
    pub fn file_name(&self) -> String {
        match (self.kind, self.columns.first()) {
            (ArtifactKind::Heatmap, _) | (_, None) => {
                format!("{}.{}", self.kind.file_prefix(), self.format)
            }
            (_, Some(column)) => format!(
                "{}_{}.{}",
                self.kind.file_prefix(),
                sanitize_file_stem(column),
                self.format
            ),
        }
    }

    /// Write the artifact into `dir`, creating it when needed.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        fs::write(&path, &self.content)?;
        debug!("Artifact saved: {}", path.display());
        Ok(path)
    }
}

/// Columns to plot. [`PlotSelection::defaults`] picks them when the caller
/// selects none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotSelection {
    /// Histogram and boxplot per column.
    pub numeric: Vec<String>,
    /// Bar chart per column.
    pub categorical: Vec<String>,
    pub heatmap: Vec<String>,
}

impl PlotSelection {
    /// First numeric / categorical columns, counts taken from the config.
    pub fn defaults(df: &DataFrame, config: &EdaConfig) -> Self {
        let numeric = numeric_columns(df);
        let categorical = categorical_columns(df);
        Self {
            numeric: numeric.iter().take(config.default_numeric_plots).cloned().collect(),
            categorical: categorical
                .into_iter()
                .take(config.default_categorical_plots)
                .collect(),
            heatmap: numeric.into_iter().take(config.default_heatmap_columns).collect(),
        }
    }
}

/// Renders distribution and correlation plots.
#[derive(Debug, Clone)]
pub struct Visualizer {
    width: u32,
    height: u32,
    heatmap_width: u32,
    heatmap_height: u32,
    iqr_multiplier: f64,
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::from_config(&EdaConfig::default())
    }
}

impl Visualizer {
    pub fn from_config(config: &EdaConfig) -> Self {
        Self {
            width: config.plot_width,
            height: config.plot_height,
            heatmap_width: config.heatmap_width,
            heatmap_height: config.heatmap_height,
            iqr_multiplier: config.thresholds.iqr_multiplier,
        }
    }

    /// Histogram with a kernel density overlay scaled to bin counts.
    pub fn histogram(&self, df: &DataFrame, column: &str) -> Result<ImageArtifact> {
        let values = plottable_values(df, column)?;
        let hist = layout::histogram(&values)
            .ok_or_else(|| EdaError::invalid_column(column, "no values to plot"))?;

        let margins = Margins::default();
        let mut canvas = SvgCanvas::new(self.width, self.height);
        let (x0, x1) = (hist.edges[0], hist.edges[hist.edges.len() - 1]);
        let x = LinearScale::new((x0, x1), (margins.left, canvas.width() - margins.right));

        let grid = linspace(x0, x1, KDE_POINTS);
        let density = layout::kde(&values, &grid);
        let scale_to_counts = values.len() as f64 * hist.bin_width();
        let curve_max = density
            .as_ref()
            .map(|d| d.iter().fold(0.0f64, |m, v| m.max(v * scale_to_counts)))
            .unwrap_or(0.0);

        let y_max = (hist.max_count() as f64).max(curve_max);
        let y = LinearScale::new((0.0, y_max), (canvas.height() - margins.bottom, margins.top));

        for (i, count) in hist.counts.iter().enumerate() {
            let left = x.map(hist.edges[i]);
            let right = x.map(hist.edges[i + 1]);
            let top = y.map(*count as f64);
            canvas.rect(left, top, right - left, y.map(0.0) - top, BAR_FILL, Some("#ffffff"));
        }

        if let Some(density) = density {
            let points: Vec<(f64, f64)> = grid
                .iter()
                .zip(density.iter())
                .map(|(gx, d)| (x.map(*gx), y.map(d * scale_to_counts)))
                .collect();
            canvas.polyline(&points, CURVE_STROKE, 2.0);
        }

        let title = format!("Distribution of {}", column);
        canvas.title(&title);
        canvas.axes(margins, Some(&x), Some(&y));
        canvas.text(
            (margins.left + canvas.width() - margins.right) / 2.0,
            canvas.height() - 12.0,
            column,
            12,
            Anchor::Middle,
        );
        canvas.vertical_text(16.0, canvas.height() / 2.0, "Count", 12);

        debug!("Rendered histogram of {} ({} bins)", column, hist.counts.len());
        Ok(ImageArtifact::svg(
            ArtifactKind::Histogram,
            title,
            vec![column.to_string()],
            canvas.finish(),
        ))
    }

    /// Vertical box-and-whisker plot.
    pub fn boxplot(&self, df: &DataFrame, column: &str) -> Result<ImageArtifact> {
        let values = plottable_values(df, column)?;
        let stats = BoxStats::from_values(&values, self.iqr_multiplier)
            .ok_or_else(|| EdaError::invalid_column(column, "no values to plot"))?;

        let margins = Margins::default();
        let mut canvas = SvgCanvas::new(self.width, self.height);
        let y = LinearScale::new(
            stats.extent(),
            (canvas.height() - margins.bottom, margins.top),
        );

        let center = (margins.left + canvas.width() - margins.right) / 2.0;
        let half = (canvas.width() - margins.left - margins.right) * 0.2;

        canvas.line(center, y.map(stats.whisker_low), center, y.map(stats.q1), "#333333", 1.0);
        canvas.line(center, y.map(stats.q3), center, y.map(stats.whisker_high), "#333333", 1.0);
        for whisker in [stats.whisker_low, stats.whisker_high] {
            let py = y.map(whisker);
            canvas.line(center - half / 2.0, py, center + half / 2.0, py, "#333333", 1.0);
        }

        let top = y.map(stats.q3);
        canvas.rect(center - half, top, 2.0 * half, y.map(stats.q1) - top, BOX_FILL, Some("#333333"));
        let median = y.map(stats.median);
        canvas.line(center - half, median, center + half, median, CURVE_STROKE, 2.0);

        for flier in &stats.fliers {
            canvas.circle(center, y.map(*flier), 3.0, "#333333");
        }

        let title = format!("Boxplot of {}", column);
        canvas.title(&title);
        canvas.axes(margins, None, Some(&y));
        canvas.text(center, canvas.height() - 12.0, column, 12, Anchor::Middle);

        debug!("Rendered boxplot of {} ({} flier(s))", column, stats.fliers.len());
        Ok(ImageArtifact::svg(
            ArtifactKind::Boxplot,
            title,
            vec![column.to_string()],
            canvas.finish(),
        ))
    }

    /// Horizontal bar chart of value counts, most frequent at the top.
    pub fn barplot(&self, df: &DataFrame, column: &str) -> Result<ImageArtifact> {
        column_kind(df, column)?;
        let values = string_values(df.column(column)?.as_materialized_series())?;
        let counts = ordered_value_counts(values.iter().flatten().map(String::as_str));
        if counts.is_empty() {
            return Err(EdaError::invalid_column(column, "no values to plot"));
        }

        let margins = Margins {
            left: 140.0,
            ..Margins::default()
        };
        let mut canvas = SvgCanvas::new(self.width, self.height);
        let max_count = counts[0].1 as f64;
        let x = LinearScale::new((0.0, max_count), (margins.left, canvas.width() - margins.right));

        let band = (canvas.height() - margins.top - margins.bottom) / counts.len() as f64;
        for (i, (label, count)) in counts.iter().enumerate() {
            let top = margins.top + band * i as f64 + band * 0.1;
            canvas.rect(
                margins.left,
                top,
                x.map(*count as f64) - margins.left,
                band * 0.8,
                BAR_FILL,
                None,
            );
            canvas.text(
                margins.left - 6.0,
                top + band * 0.4 + 4.0,
                &truncate_str(label, 20),
                11,
                Anchor::End,
            );
        }

        let title = format!("Value counts of {}", column);
        canvas.title(&title);
        canvas.axes(margins, Some(&x), None);
        canvas.text(
            (margins.left + canvas.width() - margins.right) / 2.0,
            canvas.height() - 12.0,
            "Count",
            12,
            Anchor::Middle,
        );

        debug!("Rendered bar chart of {} ({} categories)", column, counts.len());
        Ok(ImageArtifact::svg(
            ArtifactKind::BarChart,
            title,
            vec![column.to_string()],
            canvas.finish(),
        ))
    }

    /// Annotated Pearson heatmap over the selected numeric columns.
    ///
    /// Non-numeric selections are skipped with a warning. Returns `Ok(None)`
    /// when fewer than two numeric columns remain.
    pub fn correlation_heatmap(
        &self,
        df: &DataFrame,
        columns: &[String],
    ) -> Result<Option<ImageArtifact>> {
        let mut selected = Vec::with_capacity(columns.len());
        for name in columns {
            match column_kind(df, name)? {
                ColumnKind::Numeric => selected.push(name.clone()),
                other => warn!("Skipping {} column {} in heatmap", other, name),
            }
        }
        if selected.len() < 2 {
            info!(
                "Heatmap needs at least 2 numeric columns, {} selected",
                selected.len()
            );
            return Ok(None);
        }

        let matrix = DataProfiler::correlation_matrix(df, &selected)?;
        let n = selected.len();

        let margins = Margins {
            left: 140.0,
            right: 20.0,
            top: 50.0,
            bottom: 120.0,
        };
        let mut canvas = SvgCanvas::new(self.heatmap_width, self.heatmap_height);
        let cell_w = (canvas.width() - margins.left - margins.right) / n as f64;
        let cell_h = (canvas.height() - margins.top - margins.bottom) / n as f64;

        for (i, row) in matrix.iter().enumerate() {
            let top = margins.top + cell_h * i as f64;
            for (j, cell) in row.iter().enumerate() {
                let left = margins.left + cell_w * j as f64;
                canvas.rect(left, top, cell_w, cell_h, &diverging_color(*cell), Some("#ffffff"));
                let label = cell.map_or_else(|| "nan".to_string(), |r| format!("{:.2}", r));
                canvas.text(
                    left + cell_w / 2.0,
                    top + cell_h / 2.0 + 4.0,
                    &label,
                    11,
                    Anchor::Middle,
                );
            }
            canvas.text(
                margins.left - 6.0,
                top + cell_h / 2.0 + 4.0,
                &truncate_str(&selected[i], 20),
                11,
                Anchor::End,
            );
        }

        let label_y = canvas.height() - margins.bottom + 16.0;
        for (j, name) in selected.iter().enumerate() {
            let cx = margins.left + cell_w * (j as f64 + 0.5);
            canvas.text(cx, label_y, &truncate_str(name, 20), 11, Anchor::Middle);
        }

        let title = "Correlation Heatmap".to_string();
        canvas.title(&title);

        debug!("Rendered correlation heatmap of {} columns", n);
        Ok(Some(ImageArtifact::svg(
            ArtifactKind::Heatmap,
            title,
            selected,
            canvas.finish(),
        )))
    }
}

/// Valid values of a numeric column, or an error naming why it cannot be
/// plotted.
fn plottable_values(df: &DataFrame, column: &str) -> Result<Vec<f64>> {
    require_numeric(df, column)?;
    let values = valid_numeric_values(df.column(column)?.as_materialized_series())?;
    if values.is_empty() {
        return Err(EdaError::invalid_column(column, "column has no valid values"));
    }
    Ok(values)
}

/// Blue for -1, white for 0, red for +1; grey when undefined.
fn diverging_color(r: Option<f64>) -> String {
    const BLUE: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const RED: (f64, f64, f64) = (180.0, 4.0, 38.0);

    let Some(r) = r else {
        return "#dddddd".to_string();
    };
    let t = r.clamp(-1.0, 1.0);
    let (target, weight) = if t < 0.0 { (BLUE, -t) } else { (RED, t) };
    let mix = |c: f64| (255.0 + (c - 255.0) * weight).round() as u8;
    format!("#{:02x}{:02x}{:02x}", mix(target.0), mix(target.1), mix(target.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df![
            "x" => [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 40.0],
            "y" => [2.0f64, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0, 80.0],
            "city" => ["Oslo", "Rome", "Oslo", "Lima", "Rome", "Oslo", "Lima", "Oslo"],
            "empty" => [None::<f64>, None, None, None, None, None, None, None],
        ]
        .unwrap()
    }

    fn visualizer() -> Visualizer {
        Visualizer::default()
    }

    #[test]
    fn test_histogram_artifact() {
        let artifact = visualizer().histogram(&sample(), "x").unwrap();

        assert_eq!(artifact.kind, ArtifactKind::Histogram);
        assert_eq!(artifact.format, "svg");
        assert_eq!(artifact.file_name(), "histogram_x.svg");
        assert!(artifact.content.contains("width=\"600\" height=\"400\""));
        assert!(artifact.content.contains("<polyline"));
        assert!(artifact.content.contains("Distribution of x"));
    }

    #[test]
    fn test_boxplot_draws_fliers() {
        let artifact = visualizer().boxplot(&sample(), "x").unwrap();
        assert_eq!(artifact.content.matches("<circle").count(), 1);
    }

    #[test]
    fn test_numeric_plots_reject_text_and_empty_columns() {
        let v = visualizer();
        assert!(matches!(
            v.histogram(&sample(), "city"),
            Err(EdaError::InvalidColumn { .. })
        ));
        assert!(matches!(
            v.boxplot(&sample(), "empty"),
            Err(EdaError::InvalidColumn { .. })
        ));
        assert!(matches!(
            v.histogram(&sample(), "nope"),
            Err(EdaError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_barplot_orders_by_frequency() {
        let artifact = visualizer().barplot(&sample(), "city").unwrap();
        let svg = &artifact.content;

        let oslo = svg.find(">Oslo<").unwrap();
        let rome = svg.find(">Rome<").unwrap();
        let lima = svg.find(">Lima<").unwrap();
        // Rome and Lima tie; Rome was seen first
        assert!(oslo < rome && rome < lima);
    }

    #[test]
    fn test_heatmap_needs_two_numeric_columns() {
        let v = visualizer();
        let df = sample();

        assert!(v.correlation_heatmap(&df, &["x".to_string()]).unwrap().is_none());
        assert!(
            v.correlation_heatmap(&df, &["x".to_string(), "city".to_string()])
                .unwrap()
                .is_none()
        );
        assert!(matches!(
            v.correlation_heatmap(&df, &["x".to_string(), "nope".to_string()]),
            Err(EdaError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_heatmap_annotations() {
        let artifact = visualizer()
            .correlation_heatmap(&sample(), &["x".to_string(), "y".to_string()])
            .unwrap()
            .unwrap();

        assert_eq!(artifact.file_name(), "heatmap.svg");
        assert!(artifact.content.contains("width=\"800\" height=\"600\""));
        assert_eq!(artifact.content.matches(">1.00<").count(), 4);
    }

    #[test]
    fn test_diverging_color() {
        assert_eq!(diverging_color(Some(0.0)), "#ffffff");
        assert_eq!(diverging_color(Some(1.0)), "#b40426");
        assert_eq!(diverging_color(Some(-1.0)), "#3b4cc0");
        assert_eq!(diverging_color(None), "#dddddd");
    }

    #[test]
    fn test_default_selection() {
        let config = EdaConfig::builder().default_numeric_plots(1).build().unwrap();
        let selection = PlotSelection::defaults(&sample(), &config);

        assert_eq!(selection.numeric, vec!["x"]);
        assert_eq!(selection.categorical, vec!["city"]);
        assert_eq!(selection.heatmap, vec!["x", "y", "empty"]);
    }
}
