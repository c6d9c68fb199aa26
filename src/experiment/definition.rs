//! Experiment - root entity of the analysis engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisReport;

use super::{ExperimentConfig, Variant};

/// Stop reason recorded when early stopping triggers completion.
pub const STOP_REASON_EARLY: &str = "early_stopping";

/// Stop reason recorded when an external scheduler forces completion.
pub const STOP_REASON_DURATION: &str = "duration_exceeded";

/// Lifecycle status of an experiment.
///
/// `Completed` and `Cancelled` are terminal; no transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperimentStatus {
    /// Accepting interaction events and eligible for analysis.
    Active,
    /// Finished, either explicitly or by early stopping.
    Completed,
    /// Abandoned; results are not acted on.
    Cancelled,
}

impl ExperimentStatus {
    /// Whether this status admits no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl std::fmt::Display for ExperimentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// A registered experiment.
///
/// The variant set is immutable once the experiment is active; the only
/// mutable parts are the lifecycle fields and the last analysis snapshot,
/// and both are only written through the store under its entry lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experiment {
    experiment_id: String,
    owner_id: String,
    experiment_type: String,
    name: String,
    description: Option<String>,
    variants: Vec<Variant>,
    target_metric: String,
    confidence_level: f64,
    minimum_sample_size: usize,
    required_sample_size: usize,
    max_duration_days: u32,
    status: ExperimentStatus,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    stop_reason: Option<String>,
    last_analysis: Option<AnalysisReport>,
}

impl Experiment {
    /// Materialize an active experiment from a validated configuration.
    #[must_use]
    pub fn from_config(experiment_id: impl Into<String>, config: ExperimentConfig) -> Self {
        let required_sample_size = config.required_sample_size();
        Self {
            experiment_id: experiment_id.into(),
            owner_id: config.owner_id,
            experiment_type: config.experiment_type,
            name: config.name,
            description: config.description,
            variants: config.variants,
            target_metric: config.target_metric,
            confidence_level: config.confidence_level,
            minimum_sample_size: config.minimum_sample_size,
            required_sample_size,
            max_duration_days: config.max_duration_days,
            status: ExperimentStatus::Active,
            started_at: Utc::now(),
            ended_at: None,
            stop_reason: None,
            last_analysis: None,
        }
    }

    /// Get the experiment id.
    #[must_use]
    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    /// Get the owner id.
    #[must_use]
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Get the experiment type tag.
    #[must_use]
    pub fn experiment_type(&self) -> &str {
        &self.experiment_type
    }

    /// Get the experiment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Get the ordered variant list. The first entry is the control.
    #[must_use]
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Look up a variant by id.
    #[must_use]
    pub fn variant(&self, variant_id: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.variant_id() == variant_id)
    }

    /// The control variant (positional convention: first in the list).
    #[must_use]
    pub fn control(&self) -> Option<&Variant> {
        self.variants.first()
    }

    /// Get the target metric name.
    #[must_use]
    pub fn target_metric(&self) -> &str {
        &self.target_metric
    }

    /// Get the configured confidence level.
    #[must_use]
    pub const fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    /// Get the per-variant minimum sample size.
    #[must_use]
    pub const fn minimum_sample_size(&self) -> usize {
        self.minimum_sample_size
    }

    /// Get the computed total required sample size.
    #[must_use]
    pub const fn required_sample_size(&self) -> usize {
        self.required_sample_size
    }

    /// Get the maximum duration in days.
    #[must_use]
    pub const fn max_duration_days(&self) -> u32 {
        self.max_duration_days
    }

    /// Get the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> ExperimentStatus {
        self.status
    }

    /// Whether the experiment is accepting events.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.status, ExperimentStatus::Active)
    }

    /// Get the start timestamp.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Get the end timestamp, if terminal.
    #[must_use]
    pub const fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Get the stop reason, if terminal.
    #[must_use]
    pub fn stop_reason(&self) -> Option<&str> {
        self.stop_reason.as_deref()
    }

    /// Get the most recent analysis snapshot, if any.
    #[must_use]
    pub const fn last_analysis(&self) -> Option<&AnalysisReport> {
        self.last_analysis.as_ref()
    }

    /// Record an analysis snapshot without changing status.
    pub fn set_last_analysis(&mut self, report: AnalysisReport) {
        self.last_analysis = Some(report);
    }

    /// Transition to a terminal status.
    ///
    /// The caller (the store, under its entry lock) is responsible for the
    /// optimistic "still active" check; this method only applies the write.
    pub fn finish(
        &mut self,
        status: ExperimentStatus,
        reason: impl Into<String>,
        snapshot: Option<AnalysisReport>,
    ) {
        self.status = status;
        self.ended_at = Some(Utc::now());
        self.stop_reason = Some(reason.into());
        if let Some(report) = snapshot {
            self.last_analysis = Some(report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn experiment() -> Experiment {
        let config = ExperimentConfig::builder("user-1", "bio_variation", "Bio test")
            .variant(Variant::new("control", "Original"))
            .variant(Variant::new("v-1", "AI generated"))
            .target_metric("match_rate")
            .build();
        Experiment::from_config("exp-1", config)
    }

    #[test]
    fn test_created_active_with_control_first() {
        let exp = experiment();
        assert!(exp.is_active());
        assert_eq!(exp.control().map(Variant::variant_id), Some("control"));
        assert_eq!(exp.required_sample_size(), 200);
        assert!(exp.ended_at().is_none());
    }

    #[test]
    fn test_finish_records_reason_and_timestamp() {
        let mut exp = experiment();
        exp.finish(ExperimentStatus::Completed, "manual", None);
        assert_eq!(exp.status(), ExperimentStatus::Completed);
        assert!(exp.status().is_terminal());
        assert_eq!(exp.stop_reason(), Some("manual"));
        assert!(exp.ended_at().is_some());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&ExperimentStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }
}
