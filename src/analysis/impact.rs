//! Business Impact Estimator - statistical lift to projected annual outcome

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::experiment::Experiment;
use crate::stats::StatsTable;

use super::metric_stats;

/// z-value of the fixed 95% interval used for per-variant means, regardless
/// of the experiment's configured confidence level. A known simplification.
const Z_95: f64 = 1.96;

/// Annualization factor for daily lift.
const DAYS_PER_YEAR: f64 = 365.0;

/// Business weight of a metric: how much one unit of daily lift is worth
/// per user. Unknown metrics default to 1.0.
fn metric_multiplier(metric: &str) -> f64 {
    match metric {
        "match_rate" => 2.0,
        "message_rate" => 1.5,
        "subscription_rate" => 10.0,
        "like_rate" => 0.5,
        "profile_view_rate" => 0.25,
        _ => 1.0,
    }
}

/// Normal-approximation confidence interval for a variant's mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanInterval {
    /// Observed mean.
    pub mean: f64,
    /// Lower bound (`mean − 1.96·std/√n`).
    pub lower: f64,
    /// Upper bound (`mean + 1.96·std/√n`).
    pub upper: f64,
}

/// Projected outcome of one non-control variant's lift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantProjection {
    /// Variant the projection is for.
    pub variant_id: String,
    /// `mean_variant − mean_control`.
    pub absolute_lift: f64,
    /// Percent lift over the control mean; 0 when the control mean is 0.
    pub relative_lift_pct: f64,
    /// `absolute_lift × assumed_user_base × metric_multiplier × 365`.
    pub estimated_annual_impact: f64,
}

/// Business projection of an experiment's statistical lift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessImpact {
    /// Metric the projection is keyed on.
    pub target_metric: String,
    /// Assumed user population (a configuration constant, not measured).
    pub assumed_user_base: u64,
    /// Multiplier looked up for the target metric.
    pub metric_multiplier: f64,
    /// One projection per non-control variant, in variant order.
    pub projections: Vec<VariantProjection>,
    /// 95% interval for every variant's mean, control included.
    pub mean_intervals: BTreeMap<String, MeanInterval>,
}

/// Translate per-variant lift on the target metric into a projected annual
/// outcome plus mean confidence intervals.
#[must_use]
pub fn estimate_impact(
    experiment: &Experiment,
    table: &StatsTable,
    assumed_user_base: u64,
) -> BusinessImpact {
    let metric = experiment.target_metric();
    let multiplier = metric_multiplier(metric);
    let control_id = experiment.control().map_or("", |v| v.variant_id());
    let control_mean = metric_stats(table, control_id, metric).mean;

    let mut projections = Vec::new();
    let mut mean_intervals = BTreeMap::new();

    for variant in experiment.variants() {
        let stats = metric_stats(table, variant.variant_id(), metric);

        #[allow(clippy::cast_precision_loss)]
        let half_width = if stats.sample_size == 0 {
            0.0
        } else {
            Z_95 * stats.std_dev / (stats.sample_size as f64).sqrt()
        };
        mean_intervals.insert(
            variant.variant_id().to_string(),
            MeanInterval {
                mean: stats.mean,
                lower: stats.mean - half_width,
                upper: stats.mean + half_width,
            },
        );

        if variant.variant_id() == control_id {
            continue;
        }

        let absolute_lift = stats.mean - control_mean;
        let relative_lift_pct = if control_mean == 0.0 {
            0.0
        } else {
            absolute_lift / control_mean * 100.0
        };
        #[allow(clippy::cast_precision_loss)]
        let estimated_annual_impact =
            absolute_lift * assumed_user_base as f64 * multiplier * DAYS_PER_YEAR;

        projections.push(VariantProjection {
            variant_id: variant.variant_id().to_string(),
            absolute_lift,
            relative_lift_pct,
            estimated_annual_impact,
        });
    }

    BusinessImpact {
        target_metric: metric.to_string(),
        assumed_user_base,
        metric_multiplier: multiplier,
        projections,
        mean_intervals,
    }
}
