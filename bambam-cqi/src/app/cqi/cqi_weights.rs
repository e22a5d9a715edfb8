use crate::model::network::{CqiError, Segment};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BARRIER_WEIGHT: f64 = 0.3;
pub const DEFAULT_SIDEPATH_WEIGHT: f64 = 0.3;
pub const DEFAULT_SPEED_WEIGHT: f64 = 0.4;

/// speed at or above which the inverse speed term contributes nothing
pub const MAX_SPEED: f64 = 60.0;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// weights of the three CQI terms. the speed weight applies to the inverse of
/// normalized speed, so slower streets score higher.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CqiWeights {
    pub barrier: f64,
    pub sidepath: f64,
    pub speed: f64,
}

impl Default for CqiWeights {
    fn default() -> Self {
        Self {
            barrier: DEFAULT_BARRIER_WEIGHT,
            sidepath: DEFAULT_SIDEPATH_WEIGHT,
            speed: DEFAULT_SPEED_WEIGHT,
        }
    }
}

impl CqiWeights {
    /// weights must be non-negative and sum to one, which keeps scores in [0, 1].
    pub fn validate(&self) -> Result<(), CqiError> {
        let weights = [self.barrier, self.sidepath, self.speed];
        if weights.iter().any(|w| !(w.is_finite() && *w >= 0.0)) {
            return Err(CqiError::ConfigurationError(format!(
                "CQI weights must be non-negative numbers, found {self:?}"
            )));
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(CqiError::ConfigurationError(format!(
                "CQI weights must sum to 1.0, found {sum}"
            )));
        }
        Ok(())
    }

    /// the cycling quality index for one set of inputs. speed is clamped to
    /// [0, MAX_SPEED] and a missing speed counts as 0.
    pub fn score(&self, has_barrier: bool, has_sidepath: bool, speed: Option<f64>) -> f64 {
        let speed = speed.filter(|s| !s.is_nan()).unwrap_or(0.0);
        let normalized = speed.clamp(0.0, MAX_SPEED) / MAX_SPEED;
        self.barrier * indicator(has_barrier)
            + self.sidepath * indicator(has_sidepath)
            + self.speed * (1.0 - normalized)
    }

    /// scores a segment from its processed attributes. attributes that were not
    /// computed count as false or missing.
    pub fn score_segment(&self, segment: &Segment) -> f64 {
        self.score(
            segment.has_physical_barrier.unwrap_or_default(),
            segment.sidepath_presence.unwrap_or_default(),
            segment.proc_maxspeed,
        )
    }
}

fn indicator(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}
