//! Variant Statistics Aggregator - pure descriptive statistics over the log

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::experiment::InteractionEvent;

/// Descriptive statistics for one (variant, metric) group.
///
/// Derived data, recomputed from the full event log on every analysis;
/// never a source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantStatistics {
    /// Number of events in the group.
    pub sample_size: usize,
    /// Arithmetic mean of event values.
    pub mean: f64,
    /// Population standard deviation (biased, `/n`), matching the simple
    /// estimator used across the pipeline.
    pub std_dev: f64,
    /// Events for this metric as a fraction of all events for the variant.
    pub conversion_rate: f64,
}

impl VariantStatistics {
    /// Statistics of an empty group: defined fallbacks, never an error.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            sample_size: 0,
            mean: 0.0,
            std_dev: 0.0,
            conversion_rate: 0.0,
        }
    }

    /// Population variance (`std_dev²`).
    #[must_use]
    pub fn variance(&self) -> f64 {
        self.std_dev * self.std_dev
    }
}

/// Per-variant, per-metric statistics table.
///
/// `BTreeMap` keeps key order deterministic so that two computations over an
/// identical log serialize byte-for-byte equal.
pub type StatsTable = BTreeMap<String, BTreeMap<String, VariantStatistics>>;

/// Recompute per-variant, per-metric statistics from the full event log.
///
/// Pure function of the log: identical input yields identical output
/// regardless of invocation time or prior calls. Sums accumulate in log
/// (append) order, so even floating-point rounding is reproducible.
#[must_use]
pub fn compute_statistics(events: &[InteractionEvent]) -> StatsTable {
    // Group values by (variant, metric) preserving log order within groups.
    let mut groups: BTreeMap<String, BTreeMap<String, Vec<f64>>> = BTreeMap::new();
    let mut variant_totals: BTreeMap<String, usize> = BTreeMap::new();

    for event in events {
        groups
            .entry(event.variant_id().to_string())
            .or_default()
            .entry(event.metric_type().to_string())
            .or_default()
            .push(event.value());
        *variant_totals.entry(event.variant_id().to_string()).or_default() += 1;
    }

    let mut table = StatsTable::new();
    for (variant_id, metrics) in groups {
        let total = variant_totals.get(&variant_id).copied().unwrap_or(0);
        let mut per_metric = BTreeMap::new();
        for (metric, values) in metrics {
            per_metric.insert(metric, describe(&values, total));
        }
        table.insert(variant_id, per_metric);
    }
    table
}

/// Descriptive statistics of one group given the variant's total event count.
fn describe(values: &[f64], variant_total: usize) -> VariantStatistics {
    if values.is_empty() {
        return VariantStatistics::empty();
    }
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    #[allow(clippy::cast_precision_loss)]
    let conversion_rate = if variant_total == 0 {
        0.0
    } else {
        n / variant_total as f64
    };
    VariantStatistics {
        sample_size: values.len(),
        mean,
        std_dev: variance.sqrt(),
        conversion_rate,
    }
}
