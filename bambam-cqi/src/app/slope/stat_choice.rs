use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// statistic used to summarize the slope samples of a segment. when the chosen
/// statistic cannot be computed the next one in `q3 -> max -> mean` is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatChoice {
    #[default]
    Q3,
    Max,
    Mean,
}

impl StatChoice {
    pub fn fallback(&self) -> Option<StatChoice> {
        match self {
            StatChoice::Q3 => Some(StatChoice::Max),
            StatChoice::Max => Some(StatChoice::Mean),
            StatChoice::Mean => None,
        }
    }

    /// this statistic over `values`, or None when it is undefined for them.
    pub fn compute(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        match self {
            StatChoice::Q3 => third_quartile(values),
            StatChoice::Max => values.iter().copied().reduce(f64::max),
            StatChoice::Mean => Some(values.iter().sum::<f64>() / values.len() as f64),
        }
    }

    /// the first statistic in the fallback chain that is defined for `values`.
    pub fn resolve(&self, values: &[f64]) -> Option<f64> {
        let mut choice = Some(*self);
        while let Some(c) = choice {
            if let Some(v) = c.compute(values) {
                return Some(v);
            }
            choice = c.fallback();
        }
        None
    }
}

/// third quartile by the exclusive method: the 0.75 quantile of `n` sorted
/// values sits at rank 0.75 * (n + 1), interpolated between neighbors and
/// clamped to the inner ranks. undefined for fewer than two values.
fn third_quartile(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let sorted = values.iter().copied().sorted_by(f64::total_cmp).collect_vec();
    let m = 3 * (n + 1);
    let j = (m / 4).clamp(1, n - 1);
    let delta = m as f64 - (j * 4) as f64;
    Some((sorted[j - 1] * (4.0 - delta) + sorted[j] * delta) / 4.0)
}

#[cfg(test)]
mod tests {
    use super::StatChoice;

    #[test]
    fn third_quartile_interpolates() {
        assert_eq!(StatChoice::Q3.compute(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]), Some(6.0));
        assert_eq!(StatChoice::Q3.compute(&[4.0, 1.0, 3.0, 2.0]), Some(3.75));
    }

    #[test]
    fn max_and_mean() {
        let values = [2.0, 8.0, 5.0];
        assert_eq!(StatChoice::Max.compute(&values), Some(8.0));
        assert_eq!(StatChoice::Mean.compute(&values), Some(5.0));
    }

    #[test]
    fn q3_falls_back_to_max_for_one_value() {
        assert_eq!(StatChoice::Q3.compute(&[3.0]), None);
        assert_eq!(StatChoice::Q3.resolve(&[3.0]), Some(3.0));
        assert_eq!(StatChoice::Mean.resolve(&[]), None);
    }
}
