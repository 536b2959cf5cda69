//! Integration tests for the ingestion pipeline.

mod common;

use common::{check_in, harness, seed_athlete};
use peakform::athletes::{AthleteStatus, Role};
use peakform::notify::NotificationKind;
use peakform::orchestrator::{IngestOutcome, SkipReason};
use peakform::storage::AthleteStore;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_unknown_kind_leaves_store_untouched() {
    let h = harness();
    let athlete_id = seed_athlete(&h.store, "Jo").await;
    let before = serde_json::to_string(&h.store.athlete(athlete_id).await.unwrap()).unwrap();

    let outcome = h
        .orchestrator
        .ingest_data("test", "NOT_A_TYPE", json!({"athlete_id": athlete_id}))
        .await
        .unwrap();

    assert_eq!(outcome, IngestOutcome::Skipped(SkipReason::UnknownKind));
    let after = serde_json::to_string(&h.store.athlete(athlete_id).await.unwrap()).unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_check_in_flows_to_store_and_cache() {
    let h = harness();
    let athlete_id = seed_athlete(&h.store, "Jo").await;
    h.orchestrator
        .refresh_cache(athlete_id, Role::Athlete)
        .await
        .unwrap();

    for (load, pain) in [(300.0, 0), (350.0, 1), (400.0, 0)] {
        h.orchestrator
            .ingest_data("checkin-app", "recovery-metrics", check_in(athlete_id, load, pain))
            .await
            .unwrap();
    }

    let stored = h.store.athlete(athlete_id).await.unwrap().unwrap();
    assert_eq!(stored.load_history, vec![300.0, 350.0, 400.0]);
    // Same-day check-ins collapse into one daily log entry
    assert_eq!(stored.daily_logs.len(), 1);
    assert_eq!(stored.daily_logs[0].load, 400.0);

    let cached = h.orchestrator.athlete(athlete_id).unwrap();
    assert_eq!(cached.load_history.len(), 3);
}

#[tokio::test]
async fn test_painful_check_in_escalates_and_notifies() {
    let h = harness();
    let athlete_id = seed_athlete(&h.store, "Jo").await;

    h.orchestrator
        .ingest_data("checkin-app", "recovery-metrics", check_in(athlete_id, 500.0, 6))
        .await
        .unwrap();

    let stored = h.store.athlete(athlete_id).await.unwrap().unwrap();
    assert_eq!(stored.status, AthleteStatus::HighRisk);

    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, NotificationKind::RiskAlert);
}

#[tokio::test]
async fn test_pb_invariant_through_the_pipeline() {
    let h = harness();
    let athlete_id = seed_athlete(&h.store, "Jo").await;

    for value in [11.2, 11.0, 10.8] {
        h.orchestrator
            .ingest_data(
                "results-feed",
                "stat-update",
                json!({
                    "athlete_id": athlete_id,
                    "stat": {
                        "id": Uuid::new_v4(),
                        "event": "100m",
                        "value": value,
                        "unit": "s",
                        "is_pb": true,
                        "recorded_at": chrono::Utc::now()
                    }
                }),
            )
            .await
            .unwrap();
    }

    let stored = h.store.athlete(athlete_id).await.unwrap().unwrap();
    assert_eq!(stored.performance_stats.len(), 3);
    let pbs: Vec<_> = stored
        .performance_stats
        .iter()
        .filter(|s| s.event == "100m" && s.is_pb)
        .collect();
    assert_eq!(pbs.len(), 1);
    assert_eq!(pbs[0].value, 10.8);
}

#[tokio::test]
async fn test_feedback_is_recorded_without_a_write() {
    let h = harness();
    let athlete_id = seed_athlete(&h.store, "Jo").await;
    let before = serde_json::to_string(&h.store.athlete(athlete_id).await.unwrap()).unwrap();

    let outcome = h
        .orchestrator
        .ingest_data(
            "coach-app",
            "ai-feedback",
            json!({
                "athlete_id": athlete_id,
                "subject": "weekly-plan",
                "helpful": false,
                "comments": "Thursday is too hard"
            }),
        )
        .await
        .unwrap();

    assert!(matches!(outcome, IngestOutcome::Processed { .. }));
    let after = serde_json::to_string(&h.store.athlete(athlete_id).await.unwrap()).unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_injury_lifecycle_through_the_pipeline() {
    let h = harness();
    let athlete_id = seed_athlete(&h.store, "Jo").await;
    let injury_id = Uuid::new_v4();

    h.orchestrator
        .ingest_data(
            "physio-app",
            "injury-update",
            json!({
                "athlete_id": athlete_id,
                "injury": {
                    "id": injury_id,
                    "body_part": "hamstring",
                    "severity": 4,
                    "status": "active",
                    "reported_at": chrono::Utc::now(),
                    "resolved_at": null
                }
            }),
        )
        .await
        .unwrap();
    assert_eq!(
        h.store.athlete(athlete_id).await.unwrap().unwrap().status,
        AthleteStatus::HighRisk
    );

    h.orchestrator
        .ingest_data(
            "physio-app",
            "injury-resolved",
            json!({ "athlete_id": athlete_id, "injury_id": injury_id }),
        )
        .await
        .unwrap();
    assert_eq!(
        h.store.athlete(athlete_id).await.unwrap().unwrap().status,
        AthleteStatus::Optimal
    );
}
