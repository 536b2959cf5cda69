//! Performance stat processor.

use chrono::Utc;
use serde_json::json;

use crate::athletes::Athlete;

use super::{IngestPayload, Processor, ProcessorError, ProcessorOutcome, StatPayload};

/// Upserts or removes performance records.
///
/// Invariant: at most one personal-best record per event name. Inserting a
/// new PB clears the flag on every sibling record for the same event.
pub struct StatProcessor;

impl StatProcessor {
    fn apply(&self, payload: &StatPayload, mut athlete: Athlete) -> ProcessorOutcome {
        if payload.remove {
            athlete.performance_stats.retain(|s| s.id != payload.stat.id);
        } else {
            let stat = payload.stat.clone();

            if stat.is_pb {
                for existing in athlete
                    .performance_stats
                    .iter_mut()
                    .filter(|s| s.event == stat.event && s.id != stat.id)
                {
                    existing.is_pb = false;
                }
            }

            if let Some(existing) = athlete
                .performance_stats
                .iter_mut()
                .find(|s| s.id == stat.id)
            {
                *existing = stat;
            } else {
                athlete.performance_stats.push(stat);
            }
        }
        athlete.updated_at = Utc::now();

        let event_data = json!({
            "stat_id": payload.stat.id,
            "event": payload.stat.event,
            "removed": payload.remove,
        });
        ProcessorOutcome::persist(athlete, event_data)
    }
}

impl Processor for StatProcessor {
    fn process(
        &self,
        payload: &IngestPayload,
        athlete: Athlete,
    ) -> Result<ProcessorOutcome, ProcessorError> {
        match payload {
            IngestPayload::Stat(p) => Ok(self.apply(p, athlete)),
            _ => Err(ProcessorError::PayloadMismatch),
        }
    }
}
