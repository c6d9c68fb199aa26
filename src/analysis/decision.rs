//! Decision Engine - verdict, winner, early stopping, recommendations

use serde::{Deserialize, Serialize};

use crate::experiment::Experiment;

use super::StatisticalAnalysis;

/// Fixed confidence bar for early stopping, independent of the experiment's
/// own configured confidence level.
pub const EARLY_STOP_CONFIDENCE: f64 = 0.99;

/// Verdict produced from one analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Whether `overall_confidence ≥ confidence_level`.
    pub is_significant: bool,
    /// Winning variant id when significant; `None` means inconclusive.
    pub winner: Option<String>,
    /// Whether the experiment may stop before its planned duration.
    pub can_stop_early: bool,
    /// Human-readable, additive recommendations.
    pub recommendations: Vec<String>,
}

/// Derive the decision from the statistical analysis.
#[must_use]
pub fn decide(experiment: &Experiment, analysis: &StatisticalAnalysis) -> Decision {
    let is_significant = analysis.overall_confidence >= experiment.confidence_level();
    let winner = is_significant.then(|| analysis.best_variant.clone());
    let can_stop_early =
        is_significant && analysis.overall_confidence >= EARLY_STOP_CONFIDENCE;

    let mut recommendations = Vec::new();
    let winner_is_control = analysis.best_variant == analysis.control_variant;

    if is_significant && !winner_is_control {
        let label = experiment
            .variant(&analysis.best_variant)
            .map_or(analysis.best_variant.as_str(), |v| v.label());
        recommendations.push(format!(
            "Implement variant '{label}': it significantly outperforms the control on {}.",
            experiment.target_metric()
        ));
    }
    if is_significant && winner_is_control {
        recommendations.push(
            "Keep the control and investigate why the alternatives underperformed.".to_string(),
        );
    }
    if !is_significant {
        recommendations.push(
            "Continue testing: the observed difference is not yet statistically significant."
                .to_string(),
        );
    }
    if !analysis.sample_size_adequate {
        recommendations.push(format!(
            "Increase sample size: each variant needs at least {} interactions on {}.",
            experiment.minimum_sample_size(),
            experiment.target_metric()
        ));
    }

    Decision {
        is_significant,
        winner,
        can_stop_early,
        recommendations,
    }
}
