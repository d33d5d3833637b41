use statrs::statistics::Statistics;

use super::filter::Subset;
use super::model::NumericColumn;

// ---------------------------------------------------------------------------
// Summary statistics (`describe`)
// ---------------------------------------------------------------------------

/// Row labels of a summary table, in display order.
pub const STATISTICS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// Descriptive statistics of one numeric column.
#[derive(Debug, Clone)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n − 1).
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnSummary {
    /// Summarise the non-NaN `values`. No values gives count 0 and NaN
    /// everywhere else.
    pub fn from_values(column: &str, mut values: Vec<f64>) -> Self {
        values.retain(|v| !v.is_nan());
        values.sort_by(f64::total_cmp);

        ColumnSummary {
            column: column.to_string(),
            count: values.len(),
            mean: values.iter().mean(),
            std: values.iter().std_dev(),
            min: values.first().copied().unwrap_or(f64::NAN),
            q25: quantile(&values, 0.25),
            median: quantile(&values, 0.5),
            q75: quantile(&values, 0.75),
            max: values.last().copied().unwrap_or(f64::NAN),
        }
    }

    fn statistics(&self) -> [f64; 7] {
        [self.mean, self.std, self.min, self.q25, self.median, self.q75, self.max]
    }

    /// Value of the statistic at `STATISTICS[index]`.
    pub fn statistic(&self, index: usize) -> f64 {
        match index {
            0 => self.count as f64,
            1 => self.mean,
            2 => self.std,
            3 => self.min,
            4 => self.q25,
            5 => self.median,
            6 => self.q75,
            _ => self.max,
        }
    }
}

// NaN marks an undefined statistic and compares equal to itself.
impl PartialEq for ColumnSummary {
    fn eq(&self, other: &Self) -> bool {
        self.column == other.column
            && self.count == other.count
            && all_same(&self.statistics(), &other.statistics())
    }
}

/// Element-wise equality where NaN equals NaN.
pub fn all_same(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.total_cmp(y).is_eq())
}

/// One [`ColumnSummary`] per numeric column of a subset.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub columns: Vec<ColumnSummary>,
}

/// count, mean, std, min, quartiles and max of every numeric column of the
/// subset, in header order.
pub fn describe(subset: &Subset<'_>) -> Summary {
    let columns = subset
        .dataset()
        .numeric_columns
        .iter()
        .map(|col| column_summary(subset, col))
        .collect();
    Summary { columns }
}

fn column_summary(subset: &Subset<'_>, column: &NumericColumn) -> ColumnSummary {
    let values = subset.rows().filter_map(|t| t.numeric(column)).collect();
    ColumnSummary::from_values(column.name(), values)
}

/// Quantile of ascending `sorted` data with linear interpolation between
/// the closest ranks. NaN for empty input.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

// ---------------------------------------------------------------------------
// Box plot statistics
// ---------------------------------------------------------------------------

/// Quartiles with Tukey whiskers (1.5 × IQR) and the points beyond them.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    /// `None` when no finite values remain.
    pub fn from_values(mut values: Vec<f64>) -> Option<Self> {
        values.retain(|v| v.is_finite());
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);

        let q1 = quantile(&values, 0.25);
        let median = quantile(&values, 0.5);
        let q3 = quantile(&values, 0.75);
        let reach = 1.5 * (q3 - q1);
        let (low_fence, high_fence) = (q1 - reach, q3 + reach);

        let inside = || values.iter().copied().filter(|v| (low_fence..=high_fence).contains(v));
        let lower_whisker = inside().next().unwrap_or(q1);
        let upper_whisker = inside().last().unwrap_or(q3);
        let outliers = values
            .iter()
            .copied()
            .filter(|v| !(low_fence..=high_fence).contains(v))
            .collect();

        Some(BoxStats {
            q1,
            median,
            q3,
            lower_whisker,
            upper_whisker,
            outliers,
        })
    }
}

// ---------------------------------------------------------------------------
// Histogram binning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl Bin {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub bins: Vec<Bin>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }
}

/// Finite (min, max) of `values`, `None` if there is none.
pub fn value_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Equal-width histogram of `values` over their own range.
pub fn histogram(values: &[f64], bins: usize) -> Histogram {
    match value_range(values) {
        Some(range) => histogram_over(values, range, bins),
        None => Histogram { bins: Vec::new() },
    }
}

/// Equal-width histogram over a fixed `range`, so several groups can share
/// bin edges. The last bin is closed; values outside the range are dropped.
/// A zero-width range gives a single unit-wide bin centred on the value.
pub fn histogram_over(values: &[f64], range: (f64, f64), bins: usize) -> Histogram {
    let (min, max) = range;
    let (start, n, width) = if max > min {
        let n = bins.max(1);
        (min, n, (max - min) / n as f64)
    } else {
        (min - 0.5, 1, 1.0)
    };

    let mut out: Vec<Bin> = (0..n)
        .map(|i| Bin {
            start: start + i as f64 * width,
            end: start + (i + 1) as f64 * width,
            count: 0,
        })
        .collect();

    for &v in values {
        if !v.is_finite() || v < min || v > max {
            continue;
        }
        let idx = (((v - start) / width).floor() as usize).min(n - 1);
        out[idx].count += 1;
    }

    Histogram { bins: out }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::data::fixtures::{dataset, row};

    #[test]
    fn describe_uses_sample_std_and_linear_quartiles() {
        let ds = dataset(vec![
            row("M", "F", 20, "shirt", 1.0),
            row("M", "F", 30, "shirt", 2.0),
            row("M", "F", 40, "shirt", 3.0),
            row("M", "F", 50, "shirt", 4.0),
        ]);
        let summary = describe(&Subset::all(&ds));
        let names: Vec<&str> = summary.columns.iter().map(|c| c.column.as_str()).collect();
        assert_eq!(names, vec!["age", "total_price", "quantity"]);

        let price = &summary.columns[1];
        assert_eq!(price.count, 4);
        assert_relative_eq!(price.mean, 2.5);
        assert_relative_eq!(price.std, 1.2909944487358056, epsilon = 1e-12);
        assert_eq!(price.min, 1.0);
        assert_relative_eq!(price.q25, 1.75);
        assert_relative_eq!(price.median, 2.5);
        assert_relative_eq!(price.q75, 3.25);
        assert_eq!(price.max, 4.0);

        let quantity = &summary.columns[2];
        assert_eq!(quantity.std, 0.0);
    }

    #[test]
    fn describe_of_empty_subset_is_nan() {
        let ds = dataset(vec![row("M", "F", 20, "shirt", 1.0)]);
        let summary = describe(&Subset::from_indices(&ds, vec![]));
        assert_eq!(summary.columns.len(), 3);
        for col in &summary.columns {
            assert_eq!(col.count, 0);
            for i in 1..STATISTICS.len() {
                assert!(col.statistic(i).is_nan());
            }
        }
    }

    #[test]
    fn single_value_has_undefined_std() {
        let s = ColumnSummary::from_values("x", vec![7.0]);
        assert_eq!(s.count, 1);
        assert_eq!(s.mean, 7.0);
        assert!(s.std.is_nan());
        assert_eq!(s.median, 7.0);
    }

    #[test]
    fn undefined_statistics_compare_equal() {
        let a = ColumnSummary::from_values("x", vec![]);
        assert_eq!(a, ColumnSummary::from_values("x", vec![]));
        assert_ne!(a, ColumnSummary::from_values("x", vec![1.0]));
        assert!(all_same(&[f64::NAN, 1.0], &[f64::NAN, 1.0]));
        assert!(!all_same(&[f64::NAN], &[1.0]));
    }

    #[test]
    fn nan_values_are_not_counted() {
        let s = ColumnSummary::from_values("x", vec![1.0, f64::NAN, 3.0]);
        assert_eq!(s.count, 2);
        assert_eq!(s.mean, 2.0);
    }

    #[test]
    fn quantile_interpolates_linearly() {
        let data = [10.0, 20.0, 30.0];
        assert_eq!(quantile(&data, 0.0), 10.0);
        assert_eq!(quantile(&data, 0.25), 15.0);
        assert_eq!(quantile(&data, 1.0), 30.0);
        assert!(quantile(&[], 0.5).is_nan());
    }

    #[test]
    fn box_stats_separate_outliers() {
        let stats = BoxStats::from_values(vec![1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        assert_relative_eq!(stats.q1, 2.25);
        assert_relative_eq!(stats.median, 3.5);
        assert_relative_eq!(stats.q3, 4.75);
        assert_eq!(stats.lower_whisker, 1.0);
        assert_eq!(stats.upper_whisker, 5.0);
        assert_eq!(stats.outliers, vec![100.0]);
        assert!(BoxStats::from_values(vec![f64::NAN]).is_none());
    }

    #[test]
    fn histogram_counts_every_value_once() {
        let values = [0.0, 1.0, 2.5, 5.0, 7.5, 10.0];
        let h = histogram(&values, 4);
        assert_eq!(h.bins.len(), 4);
        assert_eq!(h.bins[0].start, 0.0);
        assert_eq!(h.bins[3].end, 10.0);
        let counts: Vec<usize> = h.bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![2, 1, 1, 2]);
        assert_eq!(h.total(), values.len());
    }

    #[test]
    fn constant_values_fall_in_one_bin() {
        let h = histogram(&[3.0, 3.0], 30);
        assert_eq!(h.bins.len(), 1);
        assert_eq!(h.bins[0].count, 2);
        assert_eq!(h.bins[0].center(), 3.0);
        assert!(histogram(&[], 30).bins.is_empty());
    }

    #[test]
    fn shared_edges_drop_values_outside_range() {
        let h = histogram_over(&[1.0, 5.0, 11.0], (0.0, 10.0), 2);
        assert_eq!(h.total(), 1 + 1);
        assert_eq!(h.bins[1].width(), 5.0);
    }
}
