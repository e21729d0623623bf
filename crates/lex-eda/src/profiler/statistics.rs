//! Statistical primitives shared by the profiler, transformer, insight engine
//! and visualizer.
//!
//! All functions take plain slices of valid (non-missing) values. Undefined
//! results are reported as `None` or NaN, never as a panic.

use std::cmp::Ordering;

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Variance with `ddof` delta degrees of freedom.
fn variance(values: &[f64], ddof: usize) -> Option<f64> {
    let n = values.len();
    if n <= ddof {
        return None;
    }
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some(sum_sq / (n - ddof) as f64)
}

/// Sample standard deviation (n - 1). `None` with fewer than two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    variance(values, 1).map(f64::sqrt)
}

/// Population standard deviation (n). `None` for an empty slice.
pub fn population_std(values: &[f64]) -> Option<f64> {
    variance(values, 0).map(f64::sqrt)
}

/// Sort a copy of the values ascending.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.total_cmp(b));
    out
}

/// Quantile of already sorted values using linear interpolation between
/// closest ranks (position `(n - 1) * q`).
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let pos = (sorted.len() - 1) as f64 * q;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Quantile of unsorted values.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    quantile_sorted(&sorted(values), q)
}

/// Most frequent value. Ties resolve to the smallest value.
pub fn mode(values: &[f64]) -> Option<f64> {
    let sorted = sorted(values);
    let mut best: Option<(f64, usize)> = None;

    let mut i = 0;
    while i < sorted.len() {
        let value = sorted[i];
        let mut j = i;
        while j < sorted.len() && sorted[j].total_cmp(&value) == Ordering::Equal {
            j += 1;
        }
        let run = j - i;
        // strict comparison keeps the earlier (smaller) value on ties
        if best.is_none_or(|(_, count)| run > count) {
            best = Some((value, run));
        }
        i = j;
    }

    best.map(|(value, _)| value)
}

/// Adjusted Fisher-Pearson sample skewness (G1).
///
/// `None` with fewer than three values; `Some(0.0)` when all values are equal.
pub fn skewness(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 3 {
        return None;
    }
    let m = mean(values)?;
    let nf = n as f64;
    let m2: f64 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / nf;
    let m3: f64 = values.iter().map(|v| (v - m).powi(3)).sum::<f64>() / nf;

    // rounding noise in a constant column must not read as skew
    if m2 < 1e-14 {
        return Some(0.0);
    }

    let g1 = m3 / m2.powf(1.5);
    Some(g1 * (nf * (nf - 1.0)).sqrt() / (nf - 2.0))
}

/// Tukey fences `[Q1 - k*IQR, Q3 + k*IQR]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrFences {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrFences {
    pub fn from_values(values: &[f64], multiplier: f64) -> Option<Self> {
        let sorted = sorted(values);
        let q1 = quantile_sorted(&sorted, 0.25)?;
        let q3 = quantile_sorted(&sorted, 0.75)?;
        let iqr = q3 - q1;
        Some(Self {
            q1,
            q3,
            lower: q1 - multiplier * iqr,
            upper: q3 + multiplier * iqr,
        })
    }

    /// Strictly outside the fences.
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

/// Pearson correlation over rows where both values are present.
///
/// `None` when fewer than two complete rows remain or either side has zero
/// variance.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys.iter())
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // ==================== mean / std tests ====================

    #[test]
    fn test_mean_basic() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_sample_std_basic() {
        // Mean = 3, sum of squares = 10, variance = 10/4 = 2.5
        let std = sample_std(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!(approx(std, 2.5f64.sqrt()));
    }

    #[test]
    fn test_population_std_basic() {
        // variance = 10/5 = 2
        let std = population_std(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!(approx(std, 2.0f64.sqrt()));
    }

    #[test]
    fn test_std_single_value() {
        assert_eq!(sample_std(&[5.0]), None);
        assert_eq!(population_std(&[5.0]), Some(0.0));
    }

    // ==================== quantile tests ====================

    #[test]
    fn test_quantile_linear_interpolation() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert!(approx(quantile(&values, 0.25).unwrap(), 1.75));
        assert!(approx(quantile(&values, 0.5).unwrap(), 2.5));
        assert!(approx(quantile(&values, 0.75).unwrap(), 3.25));
        assert_eq!(quantile(&values, 0.0), Some(1.0));
        assert_eq!(quantile(&values, 1.0), Some(4.0));
    }

    #[test]
    fn test_quantile_unsorted_input() {
        assert_eq!(quantile(&[9.0, 1.0, 5.0], 0.5), Some(5.0));
    }

    #[test]
    fn test_quantile_empty() {
        assert_eq!(quantile(&[], 0.5), None);
    }

    // ==================== mode tests ====================

    #[test]
    fn test_mode_unique_winner() {
        assert_eq!(mode(&[3.0, 1.0, 3.0, 2.0]), Some(3.0));
    }

    #[test]
    fn test_mode_tie_picks_smallest() {
        assert_eq!(mode(&[5.0, 2.0, 5.0, 2.0, 9.0]), Some(2.0));
        assert_eq!(mode(&[7.0, 3.0, 1.0]), Some(1.0));
    }

    #[test]
    fn test_mode_empty() {
        assert_eq!(mode(&[]), None);
    }

    // ==================== skewness tests ====================

    #[test]
    fn test_skewness_symmetric() {
        let skew = skewness(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!(skew.abs() < 1e-12);
    }

    #[test]
    fn test_skewness_positive() {
        // adjusted G1 for [1, 1, 1, 1, 10] is 2.236...
        let skew = skewness(&[1.0, 1.0, 1.0, 1.0, 10.0]).unwrap();
        assert!((skew - 5.0f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_skewness_constant_is_zero() {
        assert_eq!(skewness(&[5.0, 5.0, 5.0, 5.0]), Some(0.0));
    }

    #[test]
    fn test_skewness_too_few_values() {
        assert_eq!(skewness(&[1.0, 100.0]), None);
    }

    // ==================== IQR tests ====================

    #[test]
    fn test_iqr_fences_flag_outlier() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0];
        let fences = IqrFences::from_values(&values, 1.5).unwrap();
        assert!(fences.is_outlier(100.0));
        assert!(!fences.is_outlier(9.0));
    }

    #[test]
    fn test_iqr_fences_boundary_is_not_outlier() {
        // q1 = 2, q3 = 4, iqr = 2 -> fences [-1, 7]
        let fences = IqrFences::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0], 1.5).unwrap();
        assert_eq!(fences.lower, -1.0);
        assert_eq!(fences.upper, 7.0);
        assert!(!fences.is_outlier(7.0));
        assert!(fences.is_outlier(7.000001));
    }

    // ==================== pearson tests ====================

    #[test]
    fn test_pearson_perfect_linear() {
        let xs: Vec<Option<f64>> = (0..10).map(|i| Some(i as f64)).collect();
        let ys: Vec<Option<f64>> = (0..10).map(|i| Some(2.0 * i as f64)).collect();
        assert!(approx(pearson(&xs, &ys).unwrap(), 1.0));

        let neg: Vec<Option<f64>> = (0..10).map(|i| Some(-(i as f64))).collect();
        assert!(approx(pearson(&xs, &neg).unwrap(), -1.0));
    }

    #[test]
    fn test_pearson_skips_incomplete_rows() {
        let xs = [Some(1.0), Some(2.0), None, Some(4.0)];
        let ys = [Some(2.0), Some(4.0), Some(100.0), Some(8.0)];
        assert!(approx(pearson(&xs, &ys).unwrap(), 1.0));
    }

    #[test]
    fn test_pearson_zero_variance() {
        let xs = [Some(1.0), Some(1.0), Some(1.0)];
        let ys = [Some(1.0), Some(2.0), Some(3.0)];
        assert_eq!(pearson(&xs, &ys), None);
    }
}
