//! Profile update processor.

use chrono::Utc;
use serde_json::json;

use crate::athletes::Athlete;

use super::{IngestPayload, Processor, ProcessorError, ProcessorOutcome};

/// Shallow-merges profile fields. Absent fields are left untouched.
pub struct ProfileProcessor;

impl Processor for ProfileProcessor {
    fn process(
        &self,
        payload: &IngestPayload,
        mut athlete: Athlete,
    ) -> Result<ProcessorOutcome, ProcessorError> {
        let IngestPayload::Profile(p) = payload else {
            return Err(ProcessorError::PayloadMismatch);
        };

        let mut changed = Vec::new();
        if let Some(name) = &p.name {
            athlete.name = name.clone();
            changed.push("name");
        }
        if let Some(sport) = &p.sport {
            athlete.sport = Some(sport.clone());
            changed.push("sport");
        }
        if let Some(age) = p.age {
            athlete.age = Some(age);
            changed.push("age");
        }
        athlete.updated_at = Utc::now();

        Ok(ProcessorOutcome::persist(
            athlete,
            json!({ "changed": changed }),
        ))
    }
}
