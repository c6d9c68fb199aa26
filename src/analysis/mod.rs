//! Statistical Analyzer - pairwise Welch comparisons against the control
//!
//! Every non-control variant is tested against the control (first variant in
//! the experiment's list) on the target metric. Aggregates are deliberately
//! simple: `overall_confidence` is the arithmetic mean of per-comparison
//! confidences, with no multiple-comparison correction.

mod decision;
mod impact;

pub use decision::{decide, Decision, EARLY_STOP_CONFIDENCE};
pub use impact::{estimate_impact, BusinessImpact, MeanInterval, VariantProjection};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::experiment::Experiment;
use crate::stats::{welch_t_test, StatsTable, VariantStatistics, SE_FLOOR};

/// One variant-vs-control comparison on the target metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantComparison {
    /// Variant compared against the control.
    pub variant_id: String,
    /// Welch t statistic.
    pub t_statistic: f64,
    /// Welch–Satterthwaite degrees of freedom.
    pub degrees_of_freedom: f64,
    /// Two-tailed p-value (normal approximation).
    pub p_value: f64,
    /// `1 − p_value`.
    pub confidence: f64,
    /// Cohen's d (pooled standard deviation).
    pub effect_size: f64,
    /// `mean_variant − mean_control`.
    pub mean_difference: f64,
    /// Percent improvement over the control mean; 0 when the control mean
    /// is 0.
    pub relative_improvement: f64,
    /// Whether `p_value < 1 − confidence_level`.
    pub is_significant: bool,
}

/// Aggregated analysis of all variants against the control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticalAnalysis {
    /// Control variant id (first in the experiment's variant list).
    pub control_variant: String,
    /// One comparison per non-control variant, in variant order.
    pub comparisons: Vec<VariantComparison>,
    /// Arithmetic mean of per-comparison confidences.
    pub overall_confidence: f64,
    /// Variant (control included) with the highest target-metric mean;
    /// ties resolve to the first in variant order.
    pub best_variant: String,
    /// Whether `overall_confidence ≥ confidence_level`.
    pub is_significant: bool,
    /// Whether every variant's target-metric sample size meets the
    /// configured minimum.
    pub sample_size_adequate: bool,
}

/// Persisted outcome of one analysis pass: statistics, hypothesis tests,
/// business projection, and the resulting decision.
///
/// Always structurally complete; numerical degeneracy and empty logs are
/// reported through defined fallbacks and the `error` field, never by
/// failing the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Experiment the snapshot belongs to.
    pub experiment_id: String,
    /// When the analysis ran.
    pub analyzed_at: DateTime<Utc>,
    /// Per-variant, per-metric descriptive statistics.
    pub variants: StatsTable,
    /// Pairwise Welch comparisons and aggregates.
    pub statistical_analysis: StatisticalAnalysis,
    /// Projected business outcome of each variant's lift.
    pub business_impact: BusinessImpact,
    /// Significance verdict, winner, early-stopping eligibility, and
    /// recommendations.
    pub decision: Decision,
    /// Observability note for degenerate inputs (e.g. an empty event log);
    /// never fatal.
    pub error: Option<String>,
}

/// Target-metric statistics for a variant, with the empty-group fallback.
pub(crate) fn metric_stats(table: &StatsTable, variant_id: &str, metric: &str) -> VariantStatistics {
    table
        .get(variant_id)
        .and_then(|metrics| metrics.get(metric))
        .cloned()
        .unwrap_or_else(VariantStatistics::empty)
}

/// Run pairwise Welch's t-tests of every non-control variant against the
/// control on the experiment's target metric.
#[must_use]
pub fn analyze_experiment(experiment: &Experiment, table: &StatsTable) -> StatisticalAnalysis {
    let metric = experiment.target_metric();
    let control_id = experiment
        .control()
        .map(|v| v.variant_id().to_string())
        .unwrap_or_default();
    let control_stats = metric_stats(table, &control_id, metric);

    let alpha = 1.0 - experiment.confidence_level();
    let mut comparisons = Vec::with_capacity(experiment.variants().len().saturating_sub(1));

    for variant in experiment.variants().iter().skip(1) {
        let stats = metric_stats(table, variant.variant_id(), metric);
        let test = welch_t_test(&control_stats, &stats);
        let mean_difference = stats.mean - control_stats.mean;
        let relative_improvement = if control_stats.mean == 0.0 {
            0.0
        } else {
            mean_difference / control_stats.mean * 100.0
        };

        comparisons.push(VariantComparison {
            variant_id: variant.variant_id().to_string(),
            t_statistic: test.t_statistic,
            degrees_of_freedom: test.degrees_of_freedom,
            p_value: test.p_value,
            confidence: 1.0 - test.p_value,
            effect_size: cohens_d(&control_stats, &stats),
            mean_difference,
            relative_improvement,
            is_significant: test.p_value < alpha,
        });
    }

    #[allow(clippy::cast_precision_loss)]
    let overall_confidence = if comparisons.is_empty() {
        0.0
    } else {
        comparisons.iter().map(|c| c.confidence).sum::<f64>() / comparisons.len() as f64
    };

    let best_variant = experiment
        .variants()
        .iter()
        .map(|v| (v.variant_id(), metric_stats(table, v.variant_id(), metric).mean))
        .fold(None::<(&str, f64)>, |best, (id, mean)| match best {
            // Strict greater-than keeps the first variant on ties.
            Some((_, best_mean)) if mean > best_mean => Some((id, mean)),
            Some(b) => Some(b),
            None => Some((id, mean)),
        })
        .map(|(id, _)| id.to_string())
        .unwrap_or_default();

    let sample_size_adequate = experiment.variants().iter().all(|v| {
        metric_stats(table, v.variant_id(), metric).sample_size >= experiment.minimum_sample_size()
    });

    StatisticalAnalysis {
        control_variant: control_id,
        is_significant: overall_confidence >= experiment.confidence_level(),
        overall_confidence,
        best_variant,
        comparisons,
        sample_size_adequate,
    }
}

/// Cohen's d with the pooled standard deviation of the two samples.
///
/// Zero pooled spread with equal means is no effect; with distinct means it
/// is complete separation, handled with the same denominator floor as the
/// t statistic.
fn cohens_d(control: &VariantStatistics, variant: &VariantStatistics) -> f64 {
    let pooled = ((control.variance() + variant.variance()) / 2.0).sqrt();
    let diff = variant.mean - control.mean;
    if pooled == 0.0 {
        if diff == 0.0 {
            0.0
        } else {
            diff / SE_FLOOR
        }
    } else {
        diff / pooled
    }
}
