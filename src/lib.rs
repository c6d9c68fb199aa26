//! # Veredicto: Experiment Analysis Engine
//!
//! Veredicto is the A/B-testing core of a profile-optimization backend:
//! variant bookkeeping, streaming interaction aggregation, two-sample
//! hypothesis testing (Welch's t-test), business-impact projection, and a
//! decision/lifecycle state machine that determines when an experiment is
//! significant, when it may stop early, and what to recommend.
//!
//! ## Design Principles
//!
//! - **Append-only log**: interactions are independent appends; statistics
//!   are a pure, deterministic function of the log.
//! - **Defined degeneracy**: zero variance, zero-mean control, and empty
//!   groups produce documented fallback values, never panics or errors.
//! - **Guarded lifecycle**: `active → completed | cancelled` with an
//!   optimistic check, so racing stop triggers cannot both succeed.
//!
//! ## Example Usage
//!
//! ```rust
//! use veredicto::engine::{EngineConfig, ExperimentEngine};
//! use veredicto::experiment::{ExperimentConfig, InteractionEvent, Variant};
//!
//! let engine = ExperimentEngine::in_memory(EngineConfig::default());
//!
//! let receipt = engine.create_experiment(
//!     ExperimentConfig::builder("user-42", "bio_variation", "Bio A/B")
//!         .variant(Variant::new("control", "Original bio"))
//!         .variant(Variant::new("v-1", "AI-generated bio"))
//!         .target_metric("match_rate")
//!         .build(),
//! )?;
//!
//! engine.record_interaction(InteractionEvent::new(
//!     &receipt.experiment_id,
//!     "v-1",
//!     "user-7",
//!     "match_rate",
//! ))?;
//!
//! let report = engine.analyze(&receipt.experiment_id)?;
//! println!("confidence: {}", report.statistical_analysis.overall_confidence);
//! # Ok::<(), veredicto::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod analysis;
pub mod engine;
pub mod error;
pub mod experiment;
pub mod stats;
pub mod store;

pub use engine::{EngineConfig, ExperimentEngine, ExperimentReceipt};
pub use error::{Error, Result};
