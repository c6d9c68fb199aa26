//! Interaction Event - append-only log entry for a user action

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single user interaction recorded against an experiment variant.
///
/// Events are append-only: they are never mutated or deleted, and multiple
/// events per user per experiment are permitted (no deduplication, so one
/// user may contribute several samples to the same variant's statistics —
/// a documented limitation carried over from the original product).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractionEvent {
    experiment_id: String,
    variant_id: String,
    user_id: String,
    metric_type: String,
    value: f64,
    metadata: Option<serde_json::Value>,
    timestamp: DateTime<Utc>,
}

impl InteractionEvent {
    /// Create a new event with the default value of 1.0 (a simple count,
    /// e.g. "the user clicked").
    #[must_use]
    pub fn new(
        experiment_id: impl Into<String>,
        variant_id: impl Into<String>,
        user_id: impl Into<String>,
        metric_type: impl Into<String>,
    ) -> Self {
        Self {
            experiment_id: experiment_id.into(),
            variant_id: variant_id.into(),
            user_id: user_id.into(),
            metric_type: metric_type.into(),
            value: 1.0,
            metadata: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a builder for constructing an event with optional fields.
    #[must_use]
    pub fn builder(
        experiment_id: impl Into<String>,
        variant_id: impl Into<String>,
        user_id: impl Into<String>,
        metric_type: impl Into<String>,
    ) -> InteractionEventBuilder {
        InteractionEventBuilder::new(experiment_id, variant_id, user_id, metric_type)
    }

    /// Get the experiment id.
    #[must_use]
    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    /// Get the variant id.
    #[must_use]
    pub fn variant_id(&self) -> &str {
        &self.variant_id
    }

    /// Get the user id.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Get the metric name (e.g. "match_rate", "click_rate").
    #[must_use]
    pub fn metric_type(&self) -> &str {
        &self.metric_type
    }

    /// Get the numeric value of the interaction.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Get the caller-supplied metadata, if any.
    #[must_use]
    pub const fn metadata(&self) -> Option<&serde_json::Value> {
        self.metadata.as_ref()
    }

    /// Get the timestamp when the event was recorded.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Builder for `InteractionEvent`.
#[derive(Debug)]
pub struct InteractionEventBuilder {
    experiment_id: String,
    variant_id: String,
    user_id: String,
    metric_type: String,
    value: f64,
    metadata: Option<serde_json::Value>,
    timestamp: DateTime<Utc>,
}

impl InteractionEventBuilder {
    /// Create a new builder with required fields and value 1.0.
    #[must_use]
    pub fn new(
        experiment_id: impl Into<String>,
        variant_id: impl Into<String>,
        user_id: impl Into<String>,
        metric_type: impl Into<String>,
    ) -> Self {
        Self {
            experiment_id: experiment_id.into(),
            variant_id: variant_id.into(),
            user_id: user_id.into(),
            metric_type: metric_type.into(),
            value: 1.0,
            metadata: None,
            timestamp: Utc::now(),
        }
    }

    /// Set the numeric value (defaults to 1.0).
    #[must_use]
    pub const fn value(mut self, value: f64) -> Self {
        self.value = value;
        self
    }

    /// Attach caller-supplied metadata.
    #[must_use]
    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Set a custom timestamp (useful for deserialization/testing).
    #[must_use]
    pub const fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Build the `InteractionEvent`.
    #[must_use]
    pub fn build(self) -> InteractionEvent {
        InteractionEvent {
            experiment_id: self.experiment_id,
            variant_id: self.variant_id,
            user_id: self.user_id,
            metric_type: self.metric_type,
            value: self.value,
            metadata: self.metadata,
            timestamp: self.timestamp,
        }
    }
}
