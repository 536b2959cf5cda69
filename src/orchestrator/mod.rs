//! State orchestrator.
//!
//! Owns the in-memory cache of athlete state and serializes every write
//! through the processor table. All ingestion goes through [`ingest_data`]:
//! resolve the kind, take the per-athlete lock, fetch the current store
//! copy (never the cache), run the processor, persist, publish, refresh.
//! The per-athlete lock is what makes concurrent check-ins for the same
//! athlete last-writer-safe instead of last-writer-wins.
//!
//! [`ingest_data`]: StateOrchestrator::ingest_data

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use uuid::Uuid;

use crate::athletes::{Athlete, Role, TrainingPhase, WeeklyPlan};
use crate::config::CoreConfig;
use crate::events::{Event, EventBus, FeedbackKind};
use crate::notify::{NotificationKind, Notifier};
use crate::processors::{DataKind, IngestPayload, ProcessorError, ProcessorSet};
use crate::rules::{EngineError, RuleEngine};
use crate::storage::{AthleteStore, StoreError};

/// Errors surfaced to ingestion and regeneration callers.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Store failure (validation, size limit, database)
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Processor failure
    #[error("processor error: {0}")]
    Processor(#[from] ProcessorError),

    /// Rule engine failure
    #[error("rule engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Why an ingestion call became a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Wire tag did not parse
    UnknownKind,
    /// Payload JSON did not match the kind's shape
    MalformedPayload,
    /// The kind is published but never ingested
    NoProcessor,
    /// No athlete with the payload's id in the store
    UnknownAthlete,
}

/// Result of one ingestion call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The payload was processed and the update event published
    Processed { kind: DataKind, athlete_id: Uuid },
    /// The call was a deliberate no-op
    Skipped(SkipReason),
}

/// The orchestrator's read snapshot. Replaced wholesale on refresh.
#[derive(Debug, Clone, Default)]
struct CacheSnapshot {
    athletes: HashMap<Uuid, Athlete>,
    plan: Option<WeeklyPlan>,
    athlete_id: Option<Uuid>,
    role: Role,
    version: u64,
}

/// Orchestrates athlete state: cached reads, serialized writes.
pub struct StateOrchestrator {
    store: Arc<dyn AthleteStore>,
    bus: Arc<EventBus>,
    notifier: Arc<dyn Notifier>,
    engine: Arc<RuleEngine>,
    processors: ProcessorSet,
    cache: RwLock<CacheSnapshot>,
    cache_tx: watch::Sender<u64>,
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl StateOrchestrator {
    /// Create an orchestrator with its collaborators.
    pub fn new(
        store: Arc<dyn AthleteStore>,
        bus: Arc<EventBus>,
        notifier: Arc<dyn Notifier>,
        engine: Arc<RuleEngine>,
        config: &CoreConfig,
    ) -> Self {
        let (cache_tx, _) = watch::channel(0);
        Self {
            store,
            bus,
            notifier: notifier.clone(),
            engine,
            processors: ProcessorSet::new(notifier, config),
            cache: RwLock::new(CacheSnapshot::default()),
            cache_tx,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// A cached athlete, if present.
    pub fn athlete(&self, id: Uuid) -> Option<Athlete> {
        self.cache().athletes.get(&id).cloned()
    }

    /// Every cached athlete.
    pub fn all_athletes(&self) -> Vec<Athlete> {
        let mut athletes: Vec<Athlete> = self.cache().athletes.values().cloned().collect();
        athletes.sort_by(|a, b| a.name.cmp(&b.name));
        athletes
    }

    /// The cached weekly plan, if present.
    pub fn weekly_plan(&self) -> Option<WeeklyPlan> {
        self.cache().plan.clone()
    }

    /// Monotonic cache version. Bumps on every refresh.
    pub fn cache_version(&self) -> u64 {
        self.cache().version
    }

    /// Watch cache versions to react to refreshes.
    pub fn cache_updates(&self) -> watch::Receiver<u64> {
        self.cache_tx.subscribe()
    }

    fn cache(&self) -> std::sync::RwLockReadGuard<'_, CacheSnapshot> {
        self.cache.read().expect("cache poisoned")
    }

    /// Reload the cache from the store: the full roster for staff roles,
    /// otherwise just the named athlete and their plan. The new snapshot
    /// is built completely before it replaces the old one.
    pub async fn refresh_cache(
        &self,
        athlete_id: Uuid,
        role: Role,
    ) -> Result<u64, OrchestratorError> {
        let (athletes, plan) = if role.is_staff() {
            let (all, plan) = futures::try_join!(
                self.store.all_athletes(),
                self.store.weekly_plan(athlete_id)
            )?;
            (all.into_iter().map(|a| (a.id, a)).collect(), plan)
        } else {
            let (athlete, plan) = futures::try_join!(
                self.store.athlete(athlete_id),
                self.store.weekly_plan(athlete_id)
            )?;
            let mut map = HashMap::new();
            if let Some(athlete) = athlete {
                map.insert(athlete.id, athlete);
            }
            (map, plan)
        };

        let version = {
            let mut cache = self.cache.write().expect("cache poisoned");
            let version = cache.version + 1;
            *cache = CacheSnapshot {
                athletes,
                plan,
                athlete_id: Some(athlete_id),
                role,
                version,
            };
            version
        };
        let _ = self.cache_tx.send(version);
        Ok(version)
    }

    /// Ingest one payload from an external writer.
    ///
    /// Unknown tags, malformed payloads and unknown athletes are logged
    /// no-ops. Persistence failures propagate. On success the update event
    /// is published and the cache refreshed.
    pub async fn ingest_data(
        &self,
        source: &str,
        kind_tag: &str,
        payload: Value,
    ) -> Result<IngestOutcome, OrchestratorError> {
        let Some(kind) = DataKind::parse(kind_tag) else {
            tracing::warn!(source, kind_tag, "ignoring payload with unknown kind");
            return Ok(IngestOutcome::Skipped(SkipReason::UnknownKind));
        };

        let decoded = match IngestPayload::decode(kind, payload) {
            Ok(Some(decoded)) => decoded,
            Ok(None) => {
                tracing::warn!(source, %kind, "kind has no ingestion processor");
                return Ok(IngestOutcome::Skipped(SkipReason::NoProcessor));
            }
            Err(err) => {
                tracing::warn!(source, %kind, %err, "ignoring malformed payload");
                return Ok(IngestOutcome::Skipped(SkipReason::MalformedPayload));
            }
        };
        let athlete_id = decoded.athlete_id();

        let Some(processor) = self.processors.for_kind(kind) else {
            tracing::warn!(source, %kind, "kind has no ingestion processor");
            return Ok(IngestOutcome::Skipped(SkipReason::NoProcessor));
        };

        // Serialize the read-process-write span per athlete. Without this,
        // two concurrent check-ins read the same store copy and the second
        // write-back silently drops the first.
        let lock = self.lock_for(athlete_id).await;
        let event_data;
        {
            let _guard = lock.lock().await;

            let Some(athlete) = self.store.athlete(athlete_id).await? else {
                tracing::warn!(source, %kind, %athlete_id, "ignoring payload for unknown athlete");
                return Ok(IngestOutcome::Skipped(SkipReason::UnknownAthlete));
            };

            let outcome = processor.process(&decoded, athlete)?;
            if !outcome.skip_persistence {
                self.store.update_athlete(&outcome.athlete).await?;
            }
            event_data = outcome.event_data;
        }

        self.bus
            .publish(Event::DataUpdated {
                kind,
                athlete_id,
                data: event_data,
            })
            .await;

        let (current_id, role) = {
            let cache = self.cache();
            (cache.athlete_id.unwrap_or(athlete_id), cache.role)
        };
        self.refresh_cache(current_id, role).await?;

        tracing::debug!(source, %kind, %athlete_id, "ingested");
        Ok(IngestOutcome::Processed { kind, athlete_id })
    }

    /// Regenerate an athlete's weekly plan for a target phase.
    ///
    /// On success the plan is persisted, the update republished and the
    /// athlete notified. Failures publish a user-facing error and
    /// propagate.
    pub async fn regenerate_plan(
        &self,
        athlete_id: Uuid,
        phase: TrainingPhase,
    ) -> Result<WeeklyPlan, OrchestratorError> {
        let generated = match self.engine.generate_plan(athlete_id, phase).await {
            Ok(generated) => generated,
            Err(err) => {
                self.publish_failure(format!("Plan generation failed: {}", err)).await;
                return Err(err.into());
            }
        };

        if let Err(err) = self.store.update_weekly_plan(&generated.plan).await {
            self.publish_failure(format!("Plan could not be saved: {}", err)).await;
            return Err(err.into());
        }

        self.notifier.notify(
            athlete_id,
            NotificationKind::PlanReady,
            json!({
                "plan_id": generated.plan.id,
                "phase": generated.plan.phase,
                "source": generated.source.label(),
            }),
        );
        self.bus
            .publish(Event::DataUpdated {
                kind: DataKind::PlanGenerated,
                athlete_id,
                data: json!({
                    "plan_id": generated.plan.id,
                    "phase": generated.plan.phase,
                }),
            })
            .await;
        self.bus
            .publish(Event::UiFeedback {
                kind: FeedbackKind::Success,
                message: format!("New {} plan is ready.", generated.plan.phase),
            })
            .await;

        let (current_id, role) = {
            let cache = self.cache();
            (cache.athlete_id.unwrap_or(athlete_id), cache.role)
        };
        self.refresh_cache(current_id, role).await?;

        Ok(generated.plan)
    }

    async fn publish_failure(&self, message: String) {
        tracing::warn!(%message, "plan regeneration failed");
        self.bus
            .publish(Event::UiFeedback {
                kind: FeedbackKind::Error,
                message,
            })
            .await;
    }

    async fn lock_for(&self, athlete_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(athlete_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
