//! Variant - one treatment/content option under test

use serde::{Deserialize, Serialize};

/// A single treatment being tested.
///
/// The payload is owned by the caller (a bio text, a photo reference, a
/// notification template id) and is never interpreted by the engine. By
/// convention the first variant in an experiment's list is the control.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Variant {
    variant_id: String,
    label: String,
    payload: Option<serde_json::Value>,
}

impl Variant {
    /// Create a new variant with no payload.
    #[must_use]
    pub fn new(variant_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            variant_id: variant_id.into(),
            label: label.into(),
            payload: None,
        }
    }

    /// Create a variant carrying an opaque content payload.
    #[must_use]
    pub fn with_payload(
        variant_id: impl Into<String>,
        label: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            variant_id: variant_id.into(),
            label: label.into(),
            payload: Some(payload),
        }
    }

    /// Get the variant id.
    #[must_use]
    pub fn variant_id(&self) -> &str {
        &self.variant_id
    }

    /// Get the human-readable label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Get the opaque content payload, if any.
    #[must_use]
    pub const fn payload(&self) -> Option<&serde_json::Value> {
        self.payload.as_ref()
    }
}
