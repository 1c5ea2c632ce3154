//! Weighted multi-criteria scoring and best-route selection.

use serde::{Deserialize, Serialize};

use crate::error::ScoreError;
use crate::models::{Candidate, RouteMetrics, RouteScore};

/// Weights for the linear score combination.
///
/// The defaults are comfort-first: snow risk dominates, wind exposure
/// next, raw distance least. They are tunable parameters, not derived
/// from any calibration; there is no normalization, so weights must
/// account for the natural magnitude gap between meters and the
/// accumulated cost terms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub distance: f64,
    pub wind: f64,
    pub snow: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            distance: 1.0,
            wind: 20.0,
            snow: 50.0,
        }
    }
}

/// Scores routes based on distance, wind and snow. Lower is better.
#[derive(Debug, Clone, Default)]
pub struct RouteScorer {
    weights: ScoreWeights,
}

impl RouteScorer {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn score_route(&self, metrics: RouteMetrics) -> RouteScore {
        let total_score = self.weights.distance * metrics.distance_m
            + self.weights.wind * metrics.wind_cost
            + self.weights.snow * metrics.snow_cost;

        RouteScore {
            total_score,
            breakdown: metrics,
        }
    }
}

/// Pick the candidate with the lowest total score.
///
/// Ties resolve to the first candidate in input order. An empty slice is
/// a request-level failure.
pub fn choose_best(candidates: &[Candidate]) -> Result<&Candidate, ScoreError> {
    let mut iter = candidates.iter();
    let mut best = iter.next().ok_or(ScoreError::NoCandidates)?;
    for candidate in iter {
        if candidate.total_score < best.total_score {
            best = candidate;
        }
    }
    Ok(best)
}
