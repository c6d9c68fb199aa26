//! Persistence collaborator for experiments and the interaction log
//!
//! The engine performs no caching of its own: experiment metadata, the
//! append-only event log, and analysis snapshots all live behind
//! [`ExperimentStore`], which is assumed durable and crash-consistent.
//! [`MemoryStore`] is the default in-process backend.

mod memory;

pub use memory::MemoryStore;

use crate::analysis::AnalysisReport;
use crate::error::Result;
use crate::experiment::{Experiment, ExperimentStatus, InteractionEvent};

/// Storage contract required from outside the core.
///
/// Implementations must allow concurrent `append_event` calls for the same
/// experiment (events are independent appends) and must make
/// [`Self::finish_experiment`] a compare-and-set: when two stop triggers
/// race, exactly one succeeds and the loser observes a state error.
pub trait ExperimentStore: Send + Sync {
    /// Persist a newly created experiment.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the id already exists.
    fn insert_experiment(&self, experiment: Experiment) -> Result<()>;

    /// Read an experiment by id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ExperimentNotFound`] for unknown ids.
    fn read_experiment(&self, experiment_id: &str) -> Result<Experiment>;

    /// Append an event to the durable log. Never mutates prior events.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the append cannot be made durable.
    fn append_event(&self, event: InteractionEvent) -> Result<()>;

    /// Read a snapshot of the full event log for an experiment, in append
    /// order. Unknown experiments read as an empty log.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the log cannot be read.
    fn read_all_events(&self, experiment_id: &str) -> Result<Vec<InteractionEvent>>;

    /// Attach an analysis snapshot to an experiment without changing status.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ExperimentNotFound`] for unknown ids.
    fn store_snapshot(&self, experiment_id: &str, report: AnalysisReport) -> Result<()>;

    /// Transition an experiment from active to a terminal status,
    /// optionally storing the triggering analysis snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ExperimentNotFound`] for unknown ids and
    /// [`crate::Error::State`] when the experiment is already terminal
    /// (the optimistic guard for racing stop triggers).
    fn finish_experiment(
        &self,
        experiment_id: &str,
        status: ExperimentStatus,
        reason: &str,
        snapshot: Option<AnalysisReport>,
    ) -> Result<Experiment>;

    /// List all experiments, ordered by id for stable output.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the listing cannot be read.
    fn list_experiments(&self) -> Result<Vec<Experiment>>;
}
