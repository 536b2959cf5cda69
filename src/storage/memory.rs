//! In-memory implementation of the store contract. For tests and demos.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::ai::ChatMessage;
use crate::athletes::{Athlete, Macrocycle, WeeklyPlan};

use super::store::{
    encode_athlete_document, validate_athlete, validate_chat_message, validate_macrocycle,
    validate_plan, AthleteStore, StoreError, MAX_DOCUMENT_BYTES,
};

/// Document store held entirely in memory.
///
/// Documents are stored serialized so the size limit behaves exactly like
/// the SQLite implementation.
pub struct InMemoryStore {
    athletes: RwLock<HashMap<Uuid, String>>,
    plans: RwLock<HashMap<Uuid, String>>,
    macrocycles: RwLock<HashMap<Uuid, String>>,
    chat_log: RwLock<Vec<(Uuid, ChatMessage)>>,
    max_document_bytes: usize,
}

impl InMemoryStore {
    /// Create an empty store with the default size limit.
    pub fn new() -> Self {
        Self {
            athletes: RwLock::new(HashMap::new()),
            plans: RwLock::new(HashMap::new()),
            macrocycles: RwLock::new(HashMap::new()),
            chat_log: RwLock::new(Vec::new()),
            max_document_bytes: MAX_DOCUMENT_BYTES,
        }
    }

    /// Override the document size limit.
    pub fn with_document_limit(mut self, bytes: usize) -> Self {
        self.max_document_bytes = bytes;
        self
    }

    /// Chat messages stored for an athlete. For test assertions.
    pub fn chat_messages(&self, athlete_id: Uuid) -> Vec<ChatMessage> {
        self.chat_log
            .read()
            .expect("chat log poisoned")
            .iter()
            .filter(|(id, _)| *id == athlete_id)
            .map(|(_, msg)| msg.clone())
            .collect()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AthleteStore for InMemoryStore {
    async fn athlete(&self, id: Uuid) -> Result<Option<Athlete>, StoreError> {
        self.athletes
            .read()
            .expect("athlete table poisoned")
            .get(&id)
            .map(|doc| serde_json::from_str(doc).map_err(StoreError::from))
            .transpose()
    }

    async fn all_athletes(&self) -> Result<Vec<Athlete>, StoreError> {
        let table = self.athletes.read().expect("athlete table poisoned");
        let mut athletes = Vec::with_capacity(table.len());
        for doc in table.values() {
            athletes.push(serde_json::from_str(doc)?);
        }
        Ok(athletes)
    }

    async fn update_athlete(&self, athlete: &Athlete) -> Result<(), StoreError> {
        validate_athlete(athlete)?;
        let document = encode_athlete_document(athlete, self.max_document_bytes)?;
        self.athletes
            .write()
            .expect("athlete table poisoned")
            .insert(athlete.id, document);
        Ok(())
    }

    async fn weekly_plan(&self, athlete_id: Uuid) -> Result<Option<WeeklyPlan>, StoreError> {
        self.plans
            .read()
            .expect("plan table poisoned")
            .get(&athlete_id)
            .map(|doc| serde_json::from_str(doc).map_err(StoreError::from))
            .transpose()
    }

    async fn update_weekly_plan(&self, plan: &WeeklyPlan) -> Result<(), StoreError> {
        validate_plan(plan)?;
        let document = serde_json::to_string(plan)?;
        self.plans
            .write()
            .expect("plan table poisoned")
            .insert(plan.athlete_id, document);
        Ok(())
    }

    async fn macrocycle(&self, athlete_id: Uuid) -> Result<Option<Macrocycle>, StoreError> {
        self.macrocycles
            .read()
            .expect("macrocycle table poisoned")
            .get(&athlete_id)
            .map(|doc| serde_json::from_str(doc).map_err(StoreError::from))
            .transpose()
    }

    async fn save_macrocycle(
        &self,
        athlete_id: Uuid,
        cycle: &Macrocycle,
    ) -> Result<(), StoreError> {
        validate_macrocycle(cycle)?;
        let document = serde_json::to_string(cycle)?;
        self.macrocycles
            .write()
            .expect("macrocycle table poisoned")
            .insert(athlete_id, document);
        Ok(())
    }

    async fn save_chat_message(
        &self,
        athlete_id: Uuid,
        message: &ChatMessage,
    ) -> Result<(), StoreError> {
        validate_chat_message(message)?;
        self.chat_log
            .write()
            .expect("chat log poisoned")
            .push((athlete_id, message.clone()));
        Ok(())
    }
}
