//! Plot geometry: histogram bins, kernel density and box statistics.

use crate::profiler::statistics::{self, IqrFences};
use std::f64::consts::PI;

/// Upper bound on histogram bins, so a tiny IQR cannot explode the count.
const MAX_BINS: usize = 200;

/// Number of points the density curve is evaluated at.
pub const KDE_POINTS: usize = 200;

/// Histogram bins.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Bin edges (length = bins + 1).
    pub edges: Vec<f64>,
    /// Count of observations in each bin.
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn bin_width(&self) -> f64 {
        match (self.edges.first(), self.edges.get(1)) {
            (Some(a), Some(b)) => b - a,
            _ => 0.0,
        }
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Sturges' rule: k = ceil(log2(n)) + 1, expressed as a bin width.
fn sturges_width(range: f64, n: usize) -> f64 {
    range / ((n as f64).log2() + 1.0)
}

/// Freedman-Diaconis rule: h = 2 * IQR * n^(-1/3). Zero when IQR is zero.
fn freedman_diaconis_width(sorted: &[f64]) -> f64 {
    let q1 = statistics::quantile_sorted(sorted, 0.25).unwrap_or(0.0);
    let q3 = statistics::quantile_sorted(sorted, 0.75).unwrap_or(0.0);
    2.0 * (q3 - q1) * (sorted.len() as f64).powf(-1.0 / 3.0)
}

/// Bin the values with the larger of the Sturges and Freedman-Diaconis bin
/// counts (the smaller width). Falls back to Sturges when the IQR is zero.
///
/// `None` for an empty slice. A constant column gets one unit-wide bin.
pub fn histogram(values: &[f64]) -> Option<Histogram> {
    if values.is_empty() {
        return None;
    }
    let sorted = statistics::sorted(values);
    let (min, max) = (sorted[0], sorted[sorted.len() - 1]);

    if max - min == 0.0 {
        return Some(Histogram {
            edges: vec![min - 0.5, max + 0.5],
            counts: vec![values.len()],
        });
    }

    let range = max - min;
    let sturges = sturges_width(range, sorted.len());
    let fd = freedman_diaconis_width(&sorted);
    let width = if fd > 0.0 { fd.min(sturges) } else { sturges };
    let bins = ((range / width).ceil() as usize).clamp(1, MAX_BINS);

    let step = range / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| min + step * i as f64).collect();
    let mut counts = vec![0usize; bins];
    for v in &sorted {
        // the last bin is closed on the right
        let idx = (((v - min) / step) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Some(Histogram { edges, counts })
}

/// Gaussian kernel density with Scott's bandwidth (`std * n^(-1/5)`),
/// evaluated at `grid`.
///
/// `None` with fewer than two values or zero spread.
pub fn kde(values: &[f64], grid: &[f64]) -> Option<Vec<f64>> {
    let std = statistics::sample_std(values)?;
    if std <= 0.0 {
        return None;
    }
    let n = values.len() as f64;
    let bandwidth = std * n.powf(-0.2);
    let norm = 1.0 / (n * bandwidth * (2.0 * PI).sqrt());

    Some(
        grid.iter()
            .map(|x| {
                let sum: f64 = values
                    .iter()
                    .map(|v| {
                        let z = (x - v) / bandwidth;
                        (-0.5 * z * z).exp()
                    })
                    .sum();
                sum * norm
            })
            .collect(),
    )
}

/// `count` evenly spaced points from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Box-and-whisker statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Smallest value inside the lower fence.
    pub whisker_low: f64,
    /// Largest value inside the upper fence.
    pub whisker_high: f64,
    /// Values beyond the fences, ascending.
    pub fliers: Vec<f64>,
}

impl BoxStats {
    pub fn from_values(values: &[f64], multiplier: f64) -> Option<Self> {
        let sorted = statistics::sorted(values);
        let fences = IqrFences::from_values(&sorted, multiplier)?;
        let median = statistics::quantile_sorted(&sorted, 0.5)?;

        let inside: Vec<f64> = sorted
            .iter()
            .copied()
            .filter(|v| !fences.is_outlier(*v))
            .collect();
        let fliers = sorted
            .iter()
            .copied()
            .filter(|v| fences.is_outlier(*v))
            .collect();

        Some(Self {
            q1: fences.q1,
            median,
            q3: fences.q3,
            whisker_low: inside.first().copied().unwrap_or(fences.q1),
            whisker_high: inside.last().copied().unwrap_or(fences.q3),
            fliers,
        })
    }

    /// Lowest and highest point drawn.
    pub fn extent(&self) -> (f64, f64) {
        let low = self.fliers.first().map_or(self.whisker_low, |f| f.min(self.whisker_low));
        let high = self.fliers.last().map_or(self.whisker_high, |f| f.max(self.whisker_high));
        (low, high)
    }
}
