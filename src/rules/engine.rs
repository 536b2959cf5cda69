//! Reactive rule engine.
//!
//! Subscribes to update events. On each one it reassembles a fresh context
//! snapshot, retrieves knowledge for a topic derived from the event kind,
//! and walks the rule catalog; a rule whose condition holds and whose
//! knowledge keyword was retrieved publishes a critical alert. The engine
//! also fronts every AI provider call for the rest of the crate.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::ai::{
    AgentMessage, AiGateway, ChatMessage, ChatSender, GeneratedPlan, VideoAnalysis,
};
use crate::athletes::{Athlete, Role, TrainingPhase, WeeklySummary};
use crate::context::ContextSnapshot;
use crate::events::{AlertLevel, Event, EventBus, EventKind, EventListener, ListenerError, SubscriptionId};
use crate::knowledge::KnowledgeBase;
use crate::processors::DataKind;
use crate::storage::{AthleteStore, StoreError};

use super::catalog::{default_rules, SafetyRule};

/// Weeks of rolling memory kept per athlete.
const MEMORY_WEEKS: usize = 8;

/// Errors from the rule engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No athlete with this id in the store
    #[error("unknown athlete: {0}")]
    UnknownAthlete(Uuid),

    /// Store failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// The reactive rule engine.
pub struct RuleEngine {
    store: Arc<dyn AthleteStore>,
    knowledge: Arc<KnowledgeBase>,
    bus: Arc<EventBus>,
    gateway: AiGateway,
    rules: Vec<SafetyRule>,
    memory: RwLock<HashMap<Uuid, Vec<WeeklySummary>>>,
}

impl RuleEngine {
    /// Create an engine with the built-in rule catalog.
    pub fn new(
        store: Arc<dyn AthleteStore>,
        knowledge: Arc<KnowledgeBase>,
        bus: Arc<EventBus>,
        gateway: AiGateway,
    ) -> Self {
        Self::with_rules(store, knowledge, bus, gateway, default_rules())
    }

    /// Create an engine with an explicit rule catalog.
    pub fn with_rules(
        store: Arc<dyn AthleteStore>,
        knowledge: Arc<KnowledgeBase>,
        bus: Arc<EventBus>,
        gateway: AiGateway,
        rules: Vec<SafetyRule>,
    ) -> Self {
        Self {
            store,
            knowledge,
            bus,
            gateway,
            rules,
            memory: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribe this engine to update events. Call once at startup.
    pub fn attach(self: &Arc<Self>) -> SubscriptionId {
        self.bus
            .subscribe(EventKind::DataUpdated, Arc::clone(self) as Arc<dyn EventListener>)
    }

    /// Build a fresh context snapshot for an athlete.
    pub async fn assemble_context(&self, athlete_id: Uuid) -> Result<ContextSnapshot, EngineError> {
        let athlete = self
            .store
            .athlete(athlete_id)
            .await?
            .ok_or(EngineError::UnknownAthlete(athlete_id))?;
        let plan = self.store.weekly_plan(athlete_id).await?;
        let macrocycle = self.store.macrocycle(athlete_id).await?;
        let memory = self.memory_for(athlete_id);

        Ok(ContextSnapshot::assemble(athlete, plan, memory, macrocycle))
    }

    /// Evaluate the rule catalog for one update. Returns how many rules
    /// fired.
    pub async fn evaluate(&self, athlete_id: Uuid, kind: DataKind) -> Result<usize, EngineError> {
        let ctx = self.assemble_context(athlete_id).await?;
        self.note_update(&ctx.athlete, kind);

        let knowledge = self.knowledge.retrieve(topic_for(kind));
        let knowledge_lower = knowledge.to_lowercase();

        let mut fired = 0;
        for rule in &self.rules {
            if (rule.condition)(&ctx) && knowledge_lower.contains(rule.required_knowledge) {
                let message = (rule.message)(&ctx);
                tracing::warn!(rule = rule.name, %athlete_id, "safety rule fired");
                self.bus
                    .publish(Event::SystemAlert {
                        level: AlertLevel::Critical,
                        message,
                    })
                    .await;
                fired += 1;
            }
        }
        Ok(fired)
    }

    /// Generate a weekly plan for a target phase. Provider-backed with a
    /// deterministic fallback; never fails on provider trouble.
    pub async fn generate_plan(
        &self,
        athlete_id: Uuid,
        phase: TrainingPhase,
    ) -> Result<GeneratedPlan, EngineError> {
        let mut ctx = self.assemble_context(athlete_id).await?;
        ctx.phase = phase;

        let mut generated = self.gateway.generate_plan(&ctx).await;
        generated.plan.athlete_id = athlete_id;
        generated.plan.phase = phase;
        Ok(generated)
    }

    /// Answer a chat message for an athlete, persisting both turns.
    pub async fn chat(
        &self,
        athlete_id: Uuid,
        message: &str,
        role: Role,
    ) -> Result<String, EngineError> {
        let ctx = self.assemble_context(athlete_id).await?;
        let knowledge = self.knowledge.retrieve(message);

        let reply = self.gateway.chat(message, &ctx, &knowledge, role).await;

        // Chat history is best-effort; a failed write never loses the reply.
        for turn in [
            ChatMessage::new(ChatSender::User, message),
            ChatMessage::new(ChatSender::Assistant, reply.clone()),
        ] {
            if let Err(err) = self.store.save_chat_message(athlete_id, &turn).await {
                tracing::warn!(%athlete_id, %err, "failed to persist chat message");
            }
        }

        Ok(reply)
    }

    /// Run a critic-loop review over a topic.
    pub async fn critic_review(
        &self,
        athlete_id: Uuid,
        topic: &str,
    ) -> Result<Vec<AgentMessage>, EngineError> {
        let ctx = self.assemble_context(athlete_id).await?;
        let knowledge = self.knowledge.retrieve(topic);
        Ok(self.gateway.critic_loop(&ctx, topic, &knowledge).await)
    }

    /// Analyze video frames against the athlete's current context.
    pub async fn analyze_video(
        &self,
        athlete_id: Uuid,
        frames: &[String],
    ) -> Result<VideoAnalysis, EngineError> {
        let ctx = self.assemble_context(athlete_id).await?;
        Ok(self.gateway.analyze_video(frames, &ctx.summary_line()).await)
    }

    /// Rolling weekly summaries recorded for an athlete.
    pub fn memory_for(&self, athlete_id: Uuid) -> Vec<WeeklySummary> {
        self.memory
            .read()
            .expect("memory table poisoned")
            .get(&athlete_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Update the rolling summary for the current week.
    fn note_update(&self, athlete: &Athlete, kind: DataKind) {
        let today = Utc::now().date_naive();
        let week_start = today - chrono::Duration::days(i64::from(today.weekday().num_days_from_monday()));
        let summary = format!(
            "Week of {}: latest update {}, status {}, load ratio {:.2}",
            week_start, kind, athlete.status, athlete.load_ratio
        );

        let mut memory = self.memory.write().expect("memory table poisoned");
        let summaries = memory.entry(athlete.id).or_default();
        match summaries.iter_mut().find(|s| s.week_start == week_start) {
            Some(existing) => existing.summary = summary,
            None => summaries.push(WeeklySummary {
                week_start,
                summary,
            }),
        }
        if summaries.len() > MEMORY_WEEKS {
            let excess = summaries.len() - MEMORY_WEEKS;
            summaries.drain(..excess);
        }
    }
}

#[async_trait]
impl EventListener for RuleEngine {
    async fn on_event(&self, event: &Event) -> Result<(), ListenerError> {
        if let Event::DataUpdated {
            kind, athlete_id, ..
        } = event
        {
            self.evaluate(*athlete_id, *kind)
                .await
                .map_err(|e| ListenerError(e.to_string()))?;
        }
        Ok(())
    }
}

/// Knowledge query derived from the event kind.
fn topic_for(kind: DataKind) -> &'static str {
    match kind {
        DataKind::RecoveryMetrics => "recovery check-in sleep readiness load ratio",
        DataKind::InjuryUpdate | DataKind::InjuryResolved => {
            "injury pain return to play load ratio"
        }
        DataKind::TherapySession => "recovery therapy treatment",
        DataKind::StatUpdate => "performance trend technique",
        DataKind::ProfileUpdate => "athlete profile",
        DataKind::AiFeedback => "plan feedback adjustment",
        DataKind::LinkRequest => "coaching staff team",
        DataKind::PlanGenerated => "training plan phase taper load ratio",
    }
}
