//! SQLite-backed reference implementation of the store contract.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::ai::ChatMessage;
use crate::athletes::{Athlete, Macrocycle, WeeklyPlan};

use super::store::{
    encode_athlete_document, validate_athlete, validate_chat_message, validate_macrocycle,
    validate_plan, AthleteStore, StoreError, MAX_DOCUMENT_BYTES,
};
use super::schema::{CURRENT_VERSION, SCHEMA, SCHEMA_VERSION_TABLE};

/// Document store on SQLite.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    max_document_bytes: usize,
}

impl SqliteStore {
    /// Open or create a store at the given path.
    pub fn open(path: &PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io(e.to_string()))?;
        }
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::from_connection(conn)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::from_connection(conn)
    }

    /// Override the document size limit.
    pub fn with_document_limit(mut self, bytes: usize) -> Self {
        self.max_document_bytes = bytes;
        self
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        let store = Self {
            conn: Mutex::new(conn),
            max_document_bytes: MAX_DOCUMENT_BYTES,
        };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute_batch(SCHEMA_VERSION_TABLE)?;

        let current: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        if current < CURRENT_VERSION {
            conn.execute_batch(SCHEMA)?;
            conn.execute(
                "INSERT INTO schema_version (version, applied_at) VALUES (?, datetime('now'))",
                [CURRENT_VERSION],
            )?;
            tracing::info!("store migrated to schema version {}", CURRENT_VERSION);
        }

        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("connection lock poisoned".into()))
    }
}

#[async_trait]
impl AthleteStore for SqliteStore {
    async fn athlete(&self, id: Uuid) -> Result<Option<Athlete>, StoreError> {
        let conn = self.lock()?;
        let document: Option<String> = conn
            .query_row(
                "SELECT document FROM athletes WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        document
            .map(|doc| serde_json::from_str(&doc).map_err(StoreError::from))
            .transpose()
    }

    async fn all_athletes(&self) -> Result<Vec<Athlete>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT document FROM athletes ORDER BY id")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut athletes = Vec::new();
        for row in rows {
            let document = row?;
            athletes.push(serde_json::from_str(&document)?);
        }
        Ok(athletes)
    }

    async fn update_athlete(&self, athlete: &Athlete) -> Result<(), StoreError> {
        validate_athlete(athlete)?;
        let document = encode_athlete_document(athlete, self.max_document_bytes)?;

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO athletes (id, document, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET document = ?2, updated_at = ?3",
            params![athlete.id.to_string(), document, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    async fn weekly_plan(&self, athlete_id: Uuid) -> Result<Option<WeeklyPlan>, StoreError> {
        let conn = self.lock()?;
        let document: Option<String> = conn
            .query_row(
                "SELECT document FROM weekly_plans WHERE athlete_id = ?1",
                params![athlete_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        document
            .map(|doc| serde_json::from_str(&doc).map_err(StoreError::from))
            .transpose()
    }

    async fn update_weekly_plan(&self, plan: &WeeklyPlan) -> Result<(), StoreError> {
        validate_plan(plan)?;
        let document = serde_json::to_string(plan)?;

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO weekly_plans (athlete_id, document, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(athlete_id) DO UPDATE SET document = ?2, updated_at = ?3",
            params![plan.athlete_id.to_string(), document, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    async fn macrocycle(&self, athlete_id: Uuid) -> Result<Option<Macrocycle>, StoreError> {
        let conn = self.lock()?;
        let document: Option<String> = conn
            .query_row(
                "SELECT document FROM macrocycles WHERE athlete_id = ?1",
                params![athlete_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        document
            .map(|doc| serde_json::from_str(&doc).map_err(StoreError::from))
            .transpose()
    }

    async fn save_macrocycle(
        &self,
        athlete_id: Uuid,
        cycle: &Macrocycle,
    ) -> Result<(), StoreError> {
        validate_macrocycle(cycle)?;
        let document = serde_json::to_string(cycle)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO macrocycles (athlete_id, document, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(athlete_id) DO UPDATE SET document = ?2, updated_at = ?3",
            params![athlete_id.to_string(), document, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    async fn save_chat_message(
        &self,
        athlete_id: Uuid,
        message: &ChatMessage,
    ) -> Result<(), StoreError> {
        validate_chat_message(message)?;
        let document = serde_json::to_string(message)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO chat_messages (athlete_id, document, created_at) VALUES (?1, ?2, ?3)",
            params![athlete_id.to_string(), document, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}
