//! Experiment configuration and registry-side validation

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::Variant;

/// Per-variant floor applied on top of the configured minimum when sizing
/// an experiment.
const SAMPLE_SIZE_FLOOR: usize = 100;

/// Default confidence level for significance testing.
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Default per-variant minimum sample size.
pub const DEFAULT_MINIMUM_SAMPLE_SIZE: usize = 30;

/// Default maximum experiment duration in days.
pub const DEFAULT_MAX_DURATION_DAYS: u32 = 14;

/// Caller-supplied definition of an experiment, validated by the registry
/// before anything is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Owner (user or feature) requesting the experiment.
    pub owner_id: String,
    /// Free-form experiment type tag, e.g. "bio_variation", "photo_order".
    pub experiment_type: String,
    /// Human-readable name.
    pub name: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Ordered variant list; the first entry is the control.
    pub variants: Vec<Variant>,
    /// Metric the analysis compares variants on.
    pub target_metric: String,
    /// Confidence level for significance testing (default 0.95).
    pub confidence_level: f64,
    /// Per-variant minimum sample size (default 30).
    pub minimum_sample_size: usize,
    /// Maximum duration in days before an external scheduler forces a stop.
    pub max_duration_days: u32,
}

impl ExperimentConfig {
    /// Create a builder with required fields and defaulted tuning knobs.
    #[must_use]
    pub fn builder(
        owner_id: impl Into<String>,
        experiment_type: impl Into<String>,
        name: impl Into<String>,
    ) -> ExperimentConfigBuilder {
        ExperimentConfigBuilder::new(owner_id, experiment_type, name)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when a required field is empty, fewer
    /// than two variants are supplied, variant ids collide, or the
    /// confidence level is outside (0, 1).
    pub fn validate(&self) -> Result<()> {
        if self.owner_id.is_empty() {
            return Err(Error::validation("owner_id is required"));
        }
        if self.experiment_type.is_empty() {
            return Err(Error::validation("experiment_type is required"));
        }
        if self.name.is_empty() {
            return Err(Error::validation("name is required"));
        }
        if self.target_metric.is_empty() {
            return Err(Error::validation("target_metric is required"));
        }
        if self.variants.len() < 2 {
            return Err(Error::validation(format!(
                "at least 2 variants are required, got {}",
                self.variants.len()
            )));
        }
        for (i, variant) in self.variants.iter().enumerate() {
            if variant.variant_id().is_empty() {
                return Err(Error::validation(format!("variant {i} has an empty id")));
            }
            if self.variants[..i]
                .iter()
                .any(|v| v.variant_id() == variant.variant_id())
            {
                return Err(Error::validation(format!(
                    "duplicate variant id: {}",
                    variant.variant_id()
                )));
            }
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(Error::validation(format!(
                "confidence_level must be in (0, 1), got {}",
                self.confidence_level
            )));
        }
        Ok(())
    }

    /// Total sample size the experiment needs before its analysis is
    /// considered adequately powered:
    /// `max(minimum_sample_size, 100)` per variant, times the variant count.
    #[must_use]
    pub fn required_sample_size(&self) -> usize {
        let per_variant = self.minimum_sample_size.max(SAMPLE_SIZE_FLOOR);
        per_variant * self.variants.len()
    }

    /// Estimated days to reach [`Self::required_sample_size`] at an assumed
    /// daily interaction rate (a configuration constant, not a measurement).
    #[must_use]
    pub fn estimated_duration_days(&self, daily_interaction_rate: f64) -> u32 {
        if daily_interaction_rate <= 0.0 {
            return self.max_duration_days;
        }
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
        #[allow(clippy::cast_sign_loss)]
        let days = (self.required_sample_size() as f64 / daily_interaction_rate).ceil() as u32;
        days.max(1)
    }
}

/// Builder for `ExperimentConfig`.
#[derive(Debug)]
pub struct ExperimentConfigBuilder {
    owner_id: String,
    experiment_type: String,
    name: String,
    description: Option<String>,
    variants: Vec<Variant>,
    target_metric: String,
    confidence_level: f64,
    minimum_sample_size: usize,
    max_duration_days: u32,
}

impl ExperimentConfigBuilder {
    /// Create a new builder with required identity fields.
    #[must_use]
    pub fn new(
        owner_id: impl Into<String>,
        experiment_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            experiment_type: experiment_type.into(),
            name: name.into(),
            description: None,
            variants: Vec::new(),
            target_metric: String::new(),
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            minimum_sample_size: DEFAULT_MINIMUM_SAMPLE_SIZE,
            max_duration_days: DEFAULT_MAX_DURATION_DAYS,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a variant. The first variant added is the control.
    #[must_use]
    pub fn variant(mut self, variant: Variant) -> Self {
        self.variants.push(variant);
        self
    }

    /// Replace the full variant list.
    #[must_use]
    pub fn variants(mut self, variants: Vec<Variant>) -> Self {
        self.variants = variants;
        self
    }

    /// Set the target metric the analysis compares on.
    #[must_use]
    pub fn target_metric(mut self, metric: impl Into<String>) -> Self {
        self.target_metric = metric.into();
        self
    }

    /// Set the confidence level (default 0.95).
    #[must_use]
    pub const fn confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = level;
        self
    }

    /// Set the per-variant minimum sample size (default 30).
    #[must_use]
    pub const fn minimum_sample_size(mut self, size: usize) -> Self {
        self.minimum_sample_size = size;
        self
    }

    /// Set the maximum duration in days (default 14).
    #[must_use]
    pub const fn max_duration_days(mut self, days: u32) -> Self {
        self.max_duration_days = days;
        self
    }

    /// Build the `ExperimentConfig`. Validation happens at registry time,
    /// not here.
    #[must_use]
    pub fn build(self) -> ExperimentConfig {
        ExperimentConfig {
            owner_id: self.owner_id,
            experiment_type: self.experiment_type,
            name: self.name,
            description: self.description,
            variants: self.variants,
            target_metric: self.target_metric,
            confidence_level: self.confidence_level,
            minimum_sample_size: self.minimum_sample_size,
            max_duration_days: self.max_duration_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_variant_config() -> ExperimentConfig {
        ExperimentConfig::builder("user-1", "bio_variation", "Bio test")
            .variant(Variant::new("control", "Original"))
            .variant(Variant::new("v-1", "AI generated"))
            .target_metric("match_rate")
            .build()
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(two_variant_config().validate().is_ok());
    }

    #[test]
    fn test_rejects_single_variant() {
        let config = ExperimentConfig::builder("user-1", "bio_variation", "Bio test")
            .variant(Variant::new("control", "Original"))
            .target_metric("match_rate")
            .build();
        assert!(matches!(config.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_rejects_missing_owner() {
        let mut config = two_variant_config();
        config.owner_id = String::new();
        assert!(matches!(config.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_rejects_duplicate_variant_ids() {
        let config = ExperimentConfig::builder("user-1", "bio_variation", "Bio test")
            .variant(Variant::new("v-1", "First"))
            .variant(Variant::new("v-1", "Second"))
            .target_metric("match_rate")
            .build();
        assert!(matches!(config.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_required_sample_size_floor() {
        // Default minimum (30) is below the 100-per-variant floor.
        let config = two_variant_config();
        assert_eq!(config.required_sample_size(), 200);
    }

    #[test]
    fn test_required_sample_size_large_minimum() {
        let mut config = two_variant_config();
        config.minimum_sample_size = 250;
        assert_eq!(config.required_sample_size(), 500);
    }

    #[test]
    fn test_estimated_duration_rounds_up() {
        let config = two_variant_config();
        // 200 samples at 60/day => 4 days (3.33 rounded up).
        assert_eq!(config.estimated_duration_days(60.0), 4);
    }
}
