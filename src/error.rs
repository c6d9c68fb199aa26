//! Error types for veredicto
//!
//! Clear error messages with actionable guidance: every variant names the
//! experiment or field that caused the failure.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Veredicto error types
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed experiment configuration; the experiment is never
    /// partially created.
    #[error("invalid experiment configuration: {0}")]
    Validation(String),

    /// Operation referenced an unknown experiment id.
    #[error("experiment not found: {0}")]
    ExperimentNotFound(String),

    /// Operation referenced a variant id that is not part of the experiment.
    #[error("variant {variant_id} not found in experiment {experiment_id}")]
    VariantNotFound {
        /// Experiment that was targeted
        experiment_id: String,
        /// Variant id that did not match any of its variants
        variant_id: String,
    },

    /// Lifecycle violation: recording against a non-active experiment,
    /// stopping an already-terminal one, or overlapping analysis triggers.
    #[error("invalid experiment state: {0}")]
    State(String),

    /// Persistence collaborator failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Build a [`Error::State`] from anything displayable.
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    /// Build a [`Error::Validation`] from anything displayable.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
