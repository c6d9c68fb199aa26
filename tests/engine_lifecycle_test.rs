//! Engine lifecycle integration tests
//!
//! Drives the full facade the way product features do: create an
//! experiment, record interactions, analyze, stop.

use veredicto::engine::{EngineConfig, ExperimentEngine};
use veredicto::experiment::{
    ExperimentConfig, ExperimentStatus, InteractionEvent, Variant, STOP_REASON_EARLY,
};
use veredicto::Error;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn bio_experiment_config() -> ExperimentConfig {
    ExperimentConfig::builder("user-42", "bio_variation", "AI bio vs original")
        .description("Does the generated bio get more matches?")
        .variant(Variant::with_payload(
            "control",
            "Original bio",
            serde_json::json!({"bio": "I like hiking"}),
        ))
        .variant(Variant::with_payload(
            "v-1",
            "AI-generated bio",
            serde_json::json!({"bio": "Trail runner, amateur chef, terrible at mini golf"}),
        ))
        .target_metric("click_rate")
        .build()
}

// =============================================================================
// Creation (registry)
// =============================================================================

#[test]
fn test_create_experiment_computes_parameters() {
    init_tracing();
    let engine = ExperimentEngine::default();
    let receipt = engine.create_experiment(bio_experiment_config()).unwrap();

    // 2 variants, default minimum 30, floored at 100 per variant.
    assert_eq!(receipt.required_sample_size, 200);
    assert!(receipt.estimated_duration_days >= 1);

    let experiment = engine.get_experiment(&receipt.experiment_id).unwrap();
    assert_eq!(experiment.status(), ExperimentStatus::Active);
    assert_eq!(experiment.variants().len(), 2);
    assert_eq!(experiment.owner_id(), "user-42");
}

#[test]
fn test_create_rejects_fewer_than_two_variants() {
    let engine = ExperimentEngine::default();
    let config = ExperimentConfig::builder("user-42", "bio_variation", "Solo")
        .variant(Variant::new("control", "Only one"))
        .target_metric("click_rate")
        .build();

    assert!(matches!(
        engine.create_experiment(config),
        Err(Error::Validation(_))
    ));
}

// =============================================================================
// Recording (recorder)
// =============================================================================

#[test]
fn test_recorded_counts_are_exact() {
    let engine = ExperimentEngine::default();
    let receipt = engine.create_experiment(bio_experiment_config()).unwrap();

    for i in 0..37 {
        let event = InteractionEvent::new(
            &receipt.experiment_id,
            "v-1",
            format!("user-{i}"),
            "click_rate",
        );
        engine.record_interaction(event).unwrap();
    }

    let report = engine.analyze(&receipt.experiment_id).unwrap();
    assert_eq!(report.variants["v-1"]["click_rate"].sample_size, 37);
}

#[test]
fn test_same_user_may_record_multiple_events() {
    // No deduplication: one user can contribute several samples.
    let engine = ExperimentEngine::default();
    let receipt = engine.create_experiment(bio_experiment_config()).unwrap();

    for _ in 0..5 {
        let event =
            InteractionEvent::new(&receipt.experiment_id, "control", "user-1", "click_rate");
        engine.record_interaction(event).unwrap();
    }

    let report = engine.analyze(&receipt.experiment_id).unwrap();
    assert_eq!(report.variants["control"]["click_rate"].sample_size, 5);
}

#[test]
fn test_concurrent_recording_loses_nothing() {
    use std::sync::Arc;

    let engine = Arc::new(ExperimentEngine::default());
    let receipt = engine.create_experiment(bio_experiment_config()).unwrap();

    let mut handles = Vec::new();
    for t in 0..4 {
        let engine = Arc::clone(&engine);
        let experiment_id = receipt.experiment_id.clone();
        handles.push(std::thread::spawn(move || {
            for i in 0..250 {
                let variant = if i % 2 == 0 { "control" } else { "v-1" };
                let event = InteractionEvent::new(
                    &experiment_id,
                    variant,
                    format!("user-{t}-{i}"),
                    "click_rate",
                );
                engine.record_interaction(event).unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let report = engine.analyze(&receipt.experiment_id).unwrap();
    assert_eq!(report.variants["control"]["click_rate"].sample_size, 500);
    assert_eq!(report.variants["v-1"]["click_rate"].sample_size, 500);
}

// =============================================================================
// Lifecycle (state machine)
// =============================================================================

#[test]
fn test_stop_then_stop_again_is_state_error() {
    let engine = ExperimentEngine::default();
    let receipt = engine.create_experiment(bio_experiment_config()).unwrap();

    let status = engine.stop_test(&receipt.experiment_id, "done").unwrap();
    assert_eq!(status, ExperimentStatus::Completed);
    let first = engine.get_experiment(&receipt.experiment_id).unwrap();

    assert!(matches!(
        engine.stop_test(&receipt.experiment_id, "done again"),
        Err(Error::State(_))
    ));
    assert!(matches!(
        engine.cancel_test(&receipt.experiment_id, "changed my mind"),
        Err(Error::State(_))
    ));

    // Terminal record untouched by the failed calls.
    let second = engine.get_experiment(&receipt.experiment_id).unwrap();
    assert_eq!(first.ended_at(), second.ended_at());
    assert_eq!(second.stop_reason(), Some("done"));
}

#[test]
fn test_cancel_is_terminal() {
    let engine = ExperimentEngine::default();
    let receipt = engine.create_experiment(bio_experiment_config()).unwrap();

    let status = engine.cancel_test(&receipt.experiment_id, "abandoned").unwrap();
    assert_eq!(status, ExperimentStatus::Cancelled);

    let event = InteractionEvent::new(&receipt.experiment_id, "v-1", "user-1", "click_rate");
    assert!(matches!(engine.record_interaction(event), Err(Error::State(_))));
}

#[test]
fn test_racing_stops_have_exactly_one_winner() {
    use std::sync::Arc;

    let engine = Arc::new(ExperimentEngine::default());
    let receipt = engine.create_experiment(bio_experiment_config()).unwrap();

    let mut handles = Vec::new();
    for t in 0..8 {
        let engine = Arc::clone(&engine);
        let experiment_id = receipt.experiment_id.clone();
        handles.push(std::thread::spawn(move || {
            engine.stop_test(&experiment_id, &format!("stopper-{t}")).is_ok()
        }));
    }
    let wins: usize = handles
        .into_iter()
        .map(|h| usize::from(h.join().unwrap()))
        .sum();
    assert_eq!(wins, 1);
}

#[test]
fn test_early_stopping_stores_triggering_snapshot() {
    let engine = ExperimentEngine::default();
    let receipt = engine.create_experiment(bio_experiment_config()).unwrap();

    // Complete separation drives overall confidence past the 0.99 bar.
    for i in 0..50 {
        engine
            .record_interaction(
                InteractionEvent::builder(
                    &receipt.experiment_id,
                    "control",
                    format!("user-c{i}"),
                    "click_rate",
                )
                .value(0.0)
                .build(),
            )
            .unwrap();
        engine
            .record_interaction(
                InteractionEvent::builder(
                    &receipt.experiment_id,
                    "v-1",
                    format!("user-v{i}"),
                    "click_rate",
                )
                .value(1.0)
                .build(),
            )
            .unwrap();
    }

    let report = engine.analyze(&receipt.experiment_id).unwrap();
    assert!(report.decision.can_stop_early);

    let experiment = engine.get_experiment(&receipt.experiment_id).unwrap();
    assert_eq!(experiment.status(), ExperimentStatus::Completed);
    assert_eq!(experiment.stop_reason(), Some(STOP_REASON_EARLY));
    let snapshot = experiment.last_analysis().unwrap();
    assert!(snapshot.decision.can_stop_early);
}

#[test]
fn test_auto_stop_can_be_disabled() {
    let engine = ExperimentEngine::in_memory(EngineConfig {
        auto_stop_early: false,
        ..EngineConfig::default()
    });
    let receipt = engine.create_experiment(bio_experiment_config()).unwrap();

    for i in 0..50 {
        for (variant, value) in [("control", 0.0), ("v-1", 1.0)] {
            engine
                .record_interaction(
                    InteractionEvent::builder(
                        &receipt.experiment_id,
                        variant,
                        format!("user-{variant}-{i}"),
                        "click_rate",
                    )
                    .value(value)
                    .build(),
                )
                .unwrap();
        }
    }

    let report = engine.analyze(&receipt.experiment_id).unwrap();
    assert!(report.decision.can_stop_early);
    // Decision surfaced but not acted on.
    let experiment = engine.get_experiment(&receipt.experiment_id).unwrap();
    assert_eq!(experiment.status(), ExperimentStatus::Active);
}
