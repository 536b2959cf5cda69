//! Shared test harness: in-memory store, recording notifier, offline
//! provider, fully wired orchestrator.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use peakform::ai::{AgentMessage, AiError, AiGateway, AiProvider, VideoAnalysis};
use peakform::athletes::{
    Athlete, AthleteStatus, DayOfWeek, Role, SessionStatus, SessionType, TrainingPhase,
    TrainingSession, WeeklyPlan,
};
use peakform::config::CoreConfig;
use peakform::context::ContextSnapshot;
use peakform::events::{Event, EventBus, EventKind, FnListener};
use peakform::knowledge::KnowledgeBase;
use peakform::notify::RecordingNotifier;
use peakform::rules::RuleEngine;
use peakform::storage::{AthleteStore, InMemoryStore};
use peakform::StateOrchestrator;

/// Provider that is always unreachable; every call takes the fallback path.
pub struct OfflineProvider;

#[async_trait]
impl AiProvider for OfflineProvider {
    async fn generate_plan(&self, _ctx: &ContextSnapshot) -> Result<Option<WeeklyPlan>, AiError> {
        Err(AiError::Offline)
    }

    async fn run_critic_loop(
        &self,
        _ctx: &ContextSnapshot,
        _topic: &str,
        _knowledge: &str,
    ) -> Result<Vec<AgentMessage>, AiError> {
        Err(AiError::Offline)
    }

    async fn chat(
        &self,
        _message: &str,
        _ctx: &ContextSnapshot,
        _knowledge: &str,
        _role: Role,
    ) -> Result<String, AiError> {
        Err(AiError::Offline)
    }

    async fn analyze_video(
        &self,
        _frames: &[String],
        _context_text: &str,
    ) -> Result<VideoAnalysis, AiError> {
        Err(AiError::Offline)
    }
}

pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub bus: Arc<EventBus>,
    pub notifier: Arc<RecordingNotifier>,
    pub engine: Arc<RuleEngine>,
    pub orchestrator: Arc<StateOrchestrator>,
}

/// Install a test log subscriber. Repeated calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Build a fully wired core with the rule engine attached to the bus.
pub fn harness() -> Harness {
    init_tracing();
    let mut config = CoreConfig::with_defaults();
    config.provider.timeout_secs = 1;
    config.provider.chat_backoff_ms = 1;

    let store = Arc::new(InMemoryStore::new());
    let bus = Arc::new(EventBus::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let gateway = AiGateway::new(Arc::new(OfflineProvider), &config.provider, &config.locale);
    let engine = Arc::new(RuleEngine::new(
        store.clone() as Arc<dyn AthleteStore>,
        Arc::new(KnowledgeBase::default()),
        bus.clone(),
        gateway,
    ));
    engine.attach();

    let orchestrator = Arc::new(StateOrchestrator::new(
        store.clone(),
        bus.clone(),
        notifier.clone(),
        engine.clone(),
        &config,
    ));

    Harness {
        store,
        bus,
        notifier,
        engine,
        orchestrator,
    }
}

/// Store a fresh athlete and return its id.
pub async fn seed_athlete(store: &InMemoryStore, name: &str) -> Uuid {
    let athlete = Athlete::new(name);
    store.update_athlete(&athlete).await.unwrap();
    athlete.id
}

/// Store an athlete in the given status with a one-session plan.
pub async fn seed_athlete_with_plan(
    store: &InMemoryStore,
    status: AthleteStatus,
    zone: u8,
) -> Uuid {
    let mut athlete = Athlete::new("Jo");
    athlete.status = status;
    store.update_athlete(&athlete).await.unwrap();

    let mut plan = WeeklyPlan::new(athlete.id, TrainingPhase::Competitive);
    plan.sessions.push(TrainingSession {
        id: Uuid::new_v4(),
        day: DayOfWeek::Thursday,
        title: "track intervals".into(),
        session_type: if zone >= 4 {
            SessionType::HighIntensity
        } else {
            SessionType::Endurance
        },
        zone,
        status: SessionStatus::Planned,
        sub_phases: Vec::new(),
        feedback: None,
        completed_at: None,
    });
    store.update_weekly_plan(&plan).await.unwrap();
    athlete.id
}

/// Collect system alert messages published on the bus.
pub fn collect_alerts(bus: &EventBus) -> Arc<Mutex<Vec<String>>> {
    let alerts = Arc::new(Mutex::new(Vec::new()));
    let sink = alerts.clone();
    bus.subscribe(
        EventKind::SystemAlert,
        Arc::new(FnListener::new(move |event: &Event| {
            if let Event::SystemAlert { message, .. } = event {
                sink.lock().unwrap().push(message.clone());
            }
        })),
    );
    alerts
}

/// A recovery check-in payload for the wire.
pub fn check_in(athlete_id: Uuid, load: f64, pain: u8) -> serde_json::Value {
    json!({
        "athlete_id": athlete_id,
        "load": load,
        "pain": pain,
        "rpe": 4,
        "sleep_quality": 7
    })
}
