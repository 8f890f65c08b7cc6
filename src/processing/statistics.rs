use serde::{Deserialize, Serialize};

/// Quantile of ascending-sorted values using linear interpolation between
/// order statistics at index `(n - 1) * p`.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 || p.is_nan() {
        return None;
    }
    if p <= 0.0 || n < 2 {
        return Some(sorted[0]);
    }
    if p >= 1.0 {
        return Some(sorted[n - 1]);
    }
    let i = (n - 1) as f64 * p;
    let i0 = i.floor() as usize;
    let v0 = sorted[i0];
    let v1 = sorted[i0 + 1];
    Some(v0 + (v1 - v0) * (i - i0 as f64))
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Tukey box-plot statistics for one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiveNumberSummary {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub iqr: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    /// All member values, ascending. Points outside the whiskers are kept.
    pub values: Vec<f64>,
}

impl FiveNumberSummary {
    /// Compute the summary, filtering out non-finite values.
    pub fn compute(values: &[f64]) -> Option<Self> {
        let mut vals: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if vals.is_empty() {
            return None;
        }
        vals.sort_by(f64::total_cmp);

        let q1 = quantile_sorted(&vals, 0.25)?;
        let median = quantile_sorted(&vals, 0.5)?;
        let q3 = quantile_sorted(&vals, 0.75)?;
        let iqr = q3 - q1;
        let min = vals[0];
        let max = vals[vals.len() - 1];

        Some(Self {
            q1,
            median,
            q3,
            iqr,
            whisker_low: (q1 - 1.5 * iqr).max(min),
            whisker_high: (q3 + 1.5 * iqr).min(max),
            values: vals,
        })
    }

    /// Values lying beyond either whisker.
    pub fn outliers(&self) -> impl Iterator<Item = f64> + '_ {
        self.values
            .iter()
            .copied()
            .filter(|v| *v < self.whisker_low || *v > self.whisker_high)
    }

    /// Format as a multi-line report string.
    pub fn report(&self, label: &str) -> String {
        format!(
            "{}:\n  Count: {}\n  Whisker Low: {:.3}\n  Q1: {:.3}\n  Median: {:.3}\n  Q3: {:.3}\n  Whisker High: {:.3}\n  Outliers: {}\n",
            label,
            self.values.len(),
            self.whisker_low,
            self.q1,
            self.median,
            self.q3,
            self.whisker_high,
            self.outliers().count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn quantiles_interpolate() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        assert_relative_eq!(quantile_sorted(&v, 0.25).unwrap(), 2.25);
        assert_relative_eq!(quantile_sorted(&v, 0.5).unwrap(), 3.5);
        assert_relative_eq!(quantile_sorted(&v, 0.75).unwrap(), 4.75);
        assert_eq!(quantile_sorted(&v, 0.0), Some(1.0));
        assert_eq!(quantile_sorted(&v, 1.0), Some(100.0));
        assert_eq!(quantile_sorted(&[], 0.5), None);
        assert_eq!(quantile_sorted(&[4.0], 0.75), Some(4.0));
    }

    #[test]
    fn summary_keeps_outliers() {
        let s = FiveNumberSummary::compute(&[100.0, 3.0, 1.0, 5.0, 2.0, 4.0]).unwrap();
        assert_relative_eq!(s.q1, 2.25);
        assert_relative_eq!(s.median, 3.5);
        assert_relative_eq!(s.q3, 4.75);
        assert_relative_eq!(s.iqr, 2.5);
        assert_relative_eq!(s.whisker_high, 8.5);
        assert_relative_eq!(s.whisker_low, 1.0);
        assert_eq!(s.values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 100.0]);
        assert_eq!(s.outliers().collect::<Vec<_>>(), vec![100.0]);
    }

    #[test]
    fn summary_of_single_value() {
        let s = FiveNumberSummary::compute(&[7.0]).unwrap();
        assert_eq!((s.whisker_low, s.q1, s.median, s.q3, s.whisker_high), (7.0, 7.0, 7.0, 7.0, 7.0));
        assert!(FiveNumberSummary::compute(&[f64::NAN]).is_none());
    }

    #[test]
    fn mean_of_values() {
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn report_mentions_outliers() {
        let s = FiveNumberSummary::compute(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        let text = s.report("6-7");
        assert!(text.starts_with("6-7:\n"));
        assert!(text.contains("Median: 3.500"));
        assert!(text.contains("Outliers: 1"));
    }

    proptest! {
        #[test]
        fn quartiles_are_ordered(values in prop::collection::vec(-1_000.0f64..1_000.0, 1..60)) {
            let s = FiveNumberSummary::compute(&values).unwrap();
            prop_assert!(s.whisker_low <= s.q1);
            prop_assert!(s.q1 <= s.median);
            prop_assert!(s.median <= s.q3);
            prop_assert!(s.q3 <= s.whisker_high);
            prop_assert_eq!(s.values.len(), values.len());
        }
    }
}
