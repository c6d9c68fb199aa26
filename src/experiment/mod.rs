//! Experiment data model
//!
//! Root entities of the analysis engine:
//!
//! ```text
//! Experiment (1) ──< Variant (N, first is control)
//!      │
//!      └──< InteractionEvent (N) [append-only log]
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use veredicto::experiment::{ExperimentConfig, Experiment, InteractionEvent, Variant};
//!
//! let config = ExperimentConfig::builder("user-42", "bio_variation", "Bio A/B")
//!     .variant(Variant::new("control", "Original bio"))
//!     .variant(Variant::new("v-1", "AI-generated bio"))
//!     .target_metric("match_rate")
//!     .build();
//! config.validate().unwrap();
//!
//! let experiment = Experiment::from_config("exp-001", config);
//! let event = InteractionEvent::new("exp-001", "v-1", "user-7", "match_rate");
//! assert_eq!(event.experiment_id(), experiment.experiment_id());
//! ```

mod config;
mod definition;
mod event;
mod variant;

pub use config::{
    ExperimentConfig, ExperimentConfigBuilder, DEFAULT_CONFIDENCE_LEVEL,
    DEFAULT_MAX_DURATION_DAYS, DEFAULT_MINIMUM_SAMPLE_SIZE,
};
pub use definition::{Experiment, ExperimentStatus, STOP_REASON_DURATION, STOP_REASON_EARLY};
pub use event::{InteractionEvent, InteractionEventBuilder};
pub use variant::Variant;
