//! Durable document store.
//!
//! The [`AthleteStore`] trait is the orchestration core's only persistence
//! seam. Two reference implementations ship: SQLite-backed for real use and
//! in-memory for tests.

pub mod memory;
pub mod schema;
pub mod sqlite;
pub mod store;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
pub use store::{
    encode_athlete_document, validate_athlete, validate_chat_message, validate_macrocycle,
    validate_plan, AthleteStore, StoreError, MAX_DOCUMENT_BYTES,
};
