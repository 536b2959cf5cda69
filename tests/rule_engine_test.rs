//! End-to-end tests for the reactive safety rules.

mod common;

use common::{check_in, collect_alerts, harness, seed_athlete_with_plan};
use peakform::athletes::{AthleteStatus, SessionStatus, TrainingPhase};
use peakform::events::{Event, EventKind, FeedbackKind, FnListener};
use peakform::storage::AthleteStore;
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn test_high_intensity_gate_fires_end_to_end() {
    let h = harness();
    let alerts = collect_alerts(&h.bus);
    let athlete_id = seed_athlete_with_plan(&h.store, AthleteStatus::HighRisk, 5).await;

    // A painful check-in keeps the athlete high risk and triggers the
    // update event the engine reacts to.
    h.orchestrator
        .ingest_data("checkin-app", "recovery-metrics", check_in(athlete_id, 500.0, 6))
        .await
        .unwrap();

    let alerts = alerts.lock().unwrap();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].contains("high-intensity"));
    assert!(alerts[0].contains("Jo"));
}

#[tokio::test]
async fn test_easy_plan_suppresses_the_gate() {
    let h = harness();
    let alerts = collect_alerts(&h.bus);
    let athlete_id = seed_athlete_with_plan(&h.store, AthleteStatus::HighRisk, 2).await;

    h.orchestrator
        .ingest_data("checkin-app", "recovery-metrics", check_in(athlete_id, 500.0, 6))
        .await
        .unwrap();

    assert!(alerts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_completed_sessions_do_not_trigger_the_gate() {
    let h = harness();
    let alerts = collect_alerts(&h.bus);
    let athlete_id = seed_athlete_with_plan(&h.store, AthleteStatus::HighRisk, 5).await;

    // Mark the only session completed before the check-in arrives
    let mut plan = h.store.weekly_plan(athlete_id).await.unwrap().unwrap();
    plan.sessions[0].status = SessionStatus::Completed;
    h.store.update_weekly_plan(&plan).await.unwrap();

    h.orchestrator
        .ingest_data("checkin-app", "recovery-metrics", check_in(athlete_id, 500.0, 6))
        .await
        .unwrap();

    assert!(alerts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_regenerated_plan_for_risky_athlete_is_safe() {
    let h = harness();
    let alerts = collect_alerts(&h.bus);
    let athlete_id = seed_athlete_with_plan(&h.store, AthleteStatus::HighRisk, 5).await;

    // Regeneration goes through the offline fallback planner, which strips
    // intensity for a high-risk athlete; republishing the plan must
    // therefore not fire the gate.
    let plan = h
        .orchestrator
        .regenerate_plan(athlete_id, TrainingPhase::Competitive)
        .await
        .unwrap();

    assert!(!plan.sessions.iter().any(|s| s.is_high_intensity()));
    assert!(alerts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_regeneration_publishes_success_feedback() {
    let h = harness();
    let feedback: Arc<Mutex<Vec<FeedbackKind>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = feedback.clone();
    h.bus.subscribe(
        EventKind::UiFeedback,
        Arc::new(FnListener::new(move |event: &Event| {
            if let Event::UiFeedback { kind, .. } = event {
                sink.lock().unwrap().push(*kind);
            }
        })),
    );

    let athlete_id = seed_athlete_with_plan(&h.store, AthleteStatus::Optimal, 3).await;
    h.orchestrator
        .regenerate_plan(athlete_id, TrainingPhase::PreSeason)
        .await
        .unwrap();

    assert_eq!(*feedback.lock().unwrap(), vec![FeedbackKind::Success]);
}
