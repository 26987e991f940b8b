use crate::config::Thresholds;
use crate::metrics::Metrics;
use serde::{Deserialize, Serialize};
use std::fmt;

const SLOW_BUILD_PENALTY_STEP_MS: f64 = 10_000.0;
const SLOW_BUILD_PENALTY_PER_STEP: i64 = 5;
const SLOW_BUILD_PENALTY_CAP: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthLevel {
    Excellent,
    Good,
    Average,
    Poor,
}

impl HealthLevel {
    pub fn from_score(score: u8) -> Self {
        if score >= 85 {
            HealthLevel::Excellent
        } else if score >= 70 {
            HealthLevel::Good
        } else if score >= 50 {
            HealthLevel::Average
        } else {
            HealthLevel::Poor
        }
    }
}

impl fmt::Display for HealthLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HealthLevel::Excellent => "Excellent",
            HealthLevel::Good => "Good",
            HealthLevel::Average => "Average",
            HealthLevel::Poor => "Poor",
        };
        write!(f, "{name}")
    }
}

/// Score build health on a 0-100 scale.
///
/// Start at 100, charge the configured penalty per error and per warning,
/// then charge up to 30 points for a longest build over the slow-build
/// threshold (5 points per started 10s over it). Total over any input.
pub fn score(metrics: &Metrics, thresholds: &Thresholds) -> (u8, HealthLevel) {
    let mut score: i64 = 100;
    score -= metrics.errors.len() as i64 * thresholds.error_penalty as i64;
    score -= metrics.warnings.len() as i64 * thresholds.warning_penalty as i64;

    if let Some(summary) = &metrics.summary {
        if let Some(longest) = summary.longest_build_ms {
            let slow = thresholds.slow_build_ms as f64;
            if longest > slow {
                let steps = ((longest - slow) / SLOW_BUILD_PENALTY_STEP_MS).ceil() as i64;
                score -= (steps * SLOW_BUILD_PENALTY_PER_STEP).min(SLOW_BUILD_PENALTY_CAP);
            }
        }
    }

    let score = score.clamp(0, 100) as u8;
    (score, HealthLevel::from_score(score))
}
