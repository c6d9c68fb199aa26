//! Experiment Engine - registry, recorder, and lifecycle controller
//!
//! [`ExperimentEngine`] is the facade external collaborators call into:
//!
//! - `create_experiment` validates a configuration and persists an active
//!   experiment (the registry);
//! - `record_interaction` appends to the durable log (the recorder, the only
//!   write path into the statistics model);
//! - `analyze` runs aggregation → Welch analysis → impact projection →
//!   decision in sequence, persists the snapshot, and may complete the
//!   experiment early;
//! - `stop_test` / `cancel_test` drive the `active → completed | cancelled`
//!   state machine, whose terminal transition is guarded against races.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashSet;
use rustc_hash::FxBuildHasher;
use tracing::{debug, info, warn};

use crate::analysis::{analyze_experiment, decide, estimate_impact, AnalysisReport};
use crate::error::{Error, Result};
use crate::experiment::{
    Experiment, ExperimentConfig, ExperimentStatus, InteractionEvent, STOP_REASON_DURATION,
    STOP_REASON_EARLY,
};
use crate::stats::compute_statistics;
use crate::store::{ExperimentStore, MemoryStore};

/// Tuning constants the engine assumes rather than measures.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Assumed interactions per day across an experiment, used only for the
    /// duration estimate returned at creation.
    pub daily_interaction_rate: f64,
    /// Assumed user population for business-impact projection.
    pub assumed_user_base: u64,
    /// Whether a `can_stop_early` decision completes the experiment
    /// immediately. When false, the caller applies the decision itself.
    pub auto_stop_early: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            daily_interaction_rate: 50.0,
            assumed_user_base: 10_000,
            auto_stop_early: true,
        }
    }
}

/// What the registry hands back after creating an experiment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentReceipt {
    /// Generated experiment id.
    pub experiment_id: String,
    /// Computed total required sample size.
    pub required_sample_size: usize,
    /// Estimated days to reach it at the assumed daily interaction rate.
    pub estimated_duration_days: u32,
}

/// The experiment analysis engine.
///
/// Stateless computation over the durable log plus a small amount of
/// experiment metadata; safe to share across threads behind an `Arc`.
/// Different experiments may be analyzed in parallel, but analysis is
/// non-reentrant per experiment id.
pub struct ExperimentEngine<S: ExperimentStore = MemoryStore> {
    store: S,
    config: EngineConfig,
    sequence: AtomicU64,
    analyses_in_flight: DashSet<String, FxBuildHasher>,
}

impl ExperimentEngine<MemoryStore> {
    /// Create an engine backed by the in-memory store.
    #[must_use]
    pub fn in_memory(config: EngineConfig) -> Self {
        Self::with_store(MemoryStore::new(), config)
    }
}

impl Default for ExperimentEngine<MemoryStore> {
    fn default() -> Self {
        Self::in_memory(EngineConfig::default())
    }
}

impl<S: ExperimentStore> ExperimentEngine<S> {
    /// Create an engine over an externally supplied store.
    #[must_use]
    pub fn with_store(store: S, config: EngineConfig) -> Self {
        Self {
            store,
            config,
            sequence: AtomicU64::new(0),
            analyses_in_flight: DashSet::with_hasher(FxBuildHasher),
        }
    }

    /// Access the underlying store (read paths for collaborators).
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Validate and persist a new experiment (registry).
    ///
    /// No side effects beyond the single insert: an invalid configuration is
    /// rejected synchronously and nothing is partially created.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for malformed configurations and
    /// storage errors from the persistence collaborator.
    pub fn create_experiment(&self, config: ExperimentConfig) -> Result<ExperimentReceipt> {
        config.validate()?;

        let required_sample_size = config.required_sample_size();
        let estimated_duration_days =
            config.estimated_duration_days(self.config.daily_interaction_rate);
        let experiment_id = self.next_experiment_id();

        let experiment = Experiment::from_config(&experiment_id, config);
        self.store.insert_experiment(experiment)?;

        info!(
            experiment_id = %experiment_id,
            required_sample_size, estimated_duration_days, "experiment created"
        );
        Ok(ExperimentReceipt {
            experiment_id,
            required_sample_size,
            estimated_duration_days,
        })
    }

    /// Append a user interaction to the durable log (recorder).
    ///
    /// Safe to call concurrently from many independent callers; events are
    /// independent appends with no cross-event locking.
    ///
    /// # Errors
    ///
    /// [`Error::ExperimentNotFound`] / [`Error::VariantNotFound`] for
    /// unknown ids, [`Error::State`] when the experiment is not active.
    pub fn record_interaction(&self, event: InteractionEvent) -> Result<()> {
        let experiment = self.store.read_experiment(event.experiment_id())?;
        if !experiment.is_active() {
            return Err(Error::state(format!(
                "experiment {} is {}, not accepting interactions",
                experiment.experiment_id(),
                experiment.status()
            )));
        }
        if experiment.variant(event.variant_id()).is_none() {
            return Err(Error::VariantNotFound {
                experiment_id: event.experiment_id().to_string(),
                variant_id: event.variant_id().to_string(),
            });
        }

        debug!(
            experiment_id = event.experiment_id(),
            variant_id = event.variant_id(),
            metric = event.metric_type(),
            value = event.value(),
            "interaction recorded"
        );
        self.store.append_event(event)
    }

    /// Run the full analysis pipeline and persist the snapshot.
    ///
    /// Reads a point-in-time snapshot of the log; concurrent appends during
    /// the read are fine (a later analysis simply sees more data). When the
    /// decision allows early stopping and the engine is configured to act on
    /// it, the experiment is completed with `stop_reason = "early_stopping"`.
    ///
    /// Numerical degeneracy never fails the call: the report is always
    /// structurally complete, with `error` set for observability.
    ///
    /// # Errors
    ///
    /// [`Error::ExperimentNotFound`] for unknown ids, [`Error::State`] when
    /// an analysis for the same experiment is already in flight, and storage
    /// errors from the persistence collaborator.
    pub fn analyze(&self, experiment_id: &str) -> Result<AnalysisReport> {
        let _guard = self.acquire_analysis_slot(experiment_id)?;

        let experiment = self.store.read_experiment(experiment_id)?;
        let events = self.store.read_all_events(experiment_id)?;

        let table = compute_statistics(&events);
        let statistical_analysis = analyze_experiment(&experiment, &table);
        let business_impact =
            estimate_impact(&experiment, &table, self.config.assumed_user_base);
        let decision = decide(&experiment, &statistical_analysis);

        let error = events
            .is_empty()
            .then(|| "no interaction events recorded yet".to_string());
        if error.is_some() {
            warn!(experiment_id, "analysis ran against an empty event log");
        }

        let report = AnalysisReport {
            experiment_id: experiment_id.to_string(),
            analyzed_at: chrono::Utc::now(),
            variants: table,
            statistical_analysis,
            business_impact,
            decision,
            error,
        };
        self.store.store_snapshot(experiment_id, report.clone())?;

        info!(
            experiment_id,
            overall_confidence = report.statistical_analysis.overall_confidence,
            is_significant = report.decision.is_significant,
            can_stop_early = report.decision.can_stop_early,
            "analysis persisted"
        );

        if report.decision.can_stop_early && self.config.auto_stop_early && experiment.is_active()
        {
            match self.store.finish_experiment(
                experiment_id,
                ExperimentStatus::Completed,
                STOP_REASON_EARLY,
                Some(report.clone()),
            ) {
                Ok(_) => info!(experiment_id, "experiment completed by early stopping"),
                // A concurrent stop won the race; the snapshot is persisted
                // either way.
                Err(Error::State(msg)) => debug!(experiment_id, %msg, "early stop lost the race"),
                Err(e) => return Err(e),
            }
        }

        Ok(report)
    }

    /// Explicitly complete an active experiment.
    ///
    /// # Errors
    ///
    /// [`Error::ExperimentNotFound`] for unknown ids; [`Error::State`] when
    /// the experiment is already terminal (a second stop call never silently
    /// succeeds or alters `ended_at` / `stop_reason`).
    pub fn stop_test(&self, experiment_id: &str, reason: &str) -> Result<ExperimentStatus> {
        let experiment = self.store.finish_experiment(
            experiment_id,
            ExperimentStatus::Completed,
            reason,
            None,
        )?;
        info!(experiment_id, reason, "experiment completed");
        Ok(experiment.status())
    }

    /// Cancel an active experiment; its results are not acted on.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::stop_test`].
    pub fn cancel_test(&self, experiment_id: &str, reason: &str) -> Result<ExperimentStatus> {
        let experiment = self.store.finish_experiment(
            experiment_id,
            ExperimentStatus::Cancelled,
            reason,
            None,
        )?;
        info!(experiment_id, reason, "experiment cancelled");
        Ok(experiment.status())
    }

    /// Force completion when an external scheduler observes that the
    /// experiment exceeded its maximum duration.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::stop_test`].
    pub fn mark_duration_exceeded(&self, experiment_id: &str) -> Result<ExperimentStatus> {
        self.stop_test(experiment_id, STOP_REASON_DURATION)
    }

    /// Read an experiment by id.
    ///
    /// # Errors
    ///
    /// [`Error::ExperimentNotFound`] for unknown ids.
    pub fn get_experiment(&self, experiment_id: &str) -> Result<Experiment> {
        self.store.read_experiment(experiment_id)
    }

    /// List all experiments.
    ///
    /// # Errors
    ///
    /// Storage errors from the persistence collaborator.
    pub fn list_experiments(&self) -> Result<Vec<Experiment>> {
        self.store.list_experiments()
    }

    /// List experiments still accepting interactions.
    ///
    /// # Errors
    ///
    /// Storage errors from the persistence collaborator.
    pub fn list_active_experiments(&self) -> Result<Vec<Experiment>> {
        Ok(self
            .store
            .list_experiments()?
            .into_iter()
            .filter(Experiment::is_active)
            .collect())
    }

    fn next_experiment_id(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!(
            "exp-{}-{seq:04}",
            chrono::Utc::now().format("%Y%m%d%H%M%S")
        )
    }

    /// Mark an analysis as in flight for the experiment; the returned guard
    /// releases the slot on drop. Analyses for different experiments do not
    /// contend.
    fn acquire_analysis_slot(&self, experiment_id: &str) -> Result<AnalysisSlot<'_>> {
        if !self.analyses_in_flight.insert(experiment_id.to_string()) {
            return Err(Error::state(format!(
                "analysis already in progress for experiment {experiment_id}"
            )));
        }
        Ok(AnalysisSlot {
            set: &self.analyses_in_flight,
            experiment_id: experiment_id.to_string(),
        })
    }
}

/// Drop guard releasing the per-experiment analysis slot.
struct AnalysisSlot<'a> {
    set: &'a DashSet<String, FxBuildHasher>,
    experiment_id: String,
}

impl Drop for AnalysisSlot<'_> {
    fn drop(&mut self) {
        self.set.remove(&self.experiment_id);
    }
}
