//! In-memory store implementation using `DashMap`.
//!
//! This is the default backend - data is lost on process restart. Durable
//! backends implement the same trait against a database.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rustc_hash::FxBuildHasher;

use crate::analysis::AnalysisReport;
use crate::error::{Error, Result};
use crate::experiment::{Experiment, ExperimentStatus, InteractionEvent};

use super::ExperimentStore;

/// In-memory experiment store using a lock-free concurrent hashmap.
///
/// Thread-safe: event appends for different experiments never contend, and
/// appends for the same experiment only take that experiment's shard lock.
/// The active→terminal transition runs under the entry lock, which gives the
/// compare-and-set semantics [`ExperimentStore::finish_experiment`] requires.
pub struct MemoryStore {
    experiments: DashMap<String, Experiment, FxBuildHasher>,
    events: DashMap<String, Vec<InteractionEvent>, FxBuildHasher>,
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            experiments: DashMap::with_hasher(FxBuildHasher),
            events: DashMap::with_hasher(FxBuildHasher),
        }
    }

    /// Get the number of experiments in the store.
    #[must_use]
    pub fn experiment_count(&self) -> usize {
        self.experiments.len()
    }

    /// Get the number of logged events across all experiments.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.iter().map(|entry| entry.value().len()).sum()
    }

    /// Check if the store holds no experiments and no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty() && self.events.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ExperimentStore for MemoryStore {
    fn insert_experiment(&self, experiment: Experiment) -> Result<()> {
        let id = experiment.experiment_id().to_string();
        match self.experiments.entry(id.clone()) {
            Entry::Occupied(_) => Err(Error::Storage(format!("experiment {id} already exists"))),
            Entry::Vacant(entry) => {
                entry.insert(experiment);
                Ok(())
            }
        }
    }

    fn read_experiment(&self, experiment_id: &str) -> Result<Experiment> {
        self.experiments
            .get(experiment_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::ExperimentNotFound(experiment_id.to_string()))
    }

    fn append_event(&self, event: InteractionEvent) -> Result<()> {
        self.events
            .entry(event.experiment_id().to_string())
            .or_default()
            .push(event);
        Ok(())
    }

    fn read_all_events(&self, experiment_id: &str) -> Result<Vec<InteractionEvent>> {
        Ok(self
            .events
            .get(experiment_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    fn store_snapshot(&self, experiment_id: &str, report: AnalysisReport) -> Result<()> {
        let mut entry = self
            .experiments
            .get_mut(experiment_id)
            .ok_or_else(|| Error::ExperimentNotFound(experiment_id.to_string()))?;
        entry.value_mut().set_last_analysis(report);
        Ok(())
    }

    fn finish_experiment(
        &self,
        experiment_id: &str,
        status: ExperimentStatus,
        reason: &str,
        snapshot: Option<AnalysisReport>,
    ) -> Result<Experiment> {
        let mut entry = self
            .experiments
            .get_mut(experiment_id)
            .ok_or_else(|| Error::ExperimentNotFound(experiment_id.to_string()))?;
        let experiment = entry.value_mut();

        // Optimistic guard: the loser of a stop race lands here.
        if !experiment.is_active() {
            return Err(Error::state(format!(
                "experiment {experiment_id} is already {} (stop_reason: {})",
                experiment.status(),
                experiment.stop_reason().unwrap_or("none"),
            )));
        }
        if !status.is_terminal() {
            return Err(Error::state(format!(
                "cannot finish experiment {experiment_id} with non-terminal status {status}"
            )));
        }

        experiment.finish(status, reason, snapshot);
        Ok(experiment.clone())
    }

    fn list_experiments(&self) -> Result<Vec<Experiment>> {
        let mut experiments: Vec<Experiment> = self
            .experiments
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        experiments.sort_by(|a, b| a.experiment_id().cmp(b.experiment_id()));
        Ok(experiments)
    }
}
