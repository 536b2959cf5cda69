//! Therapy session processor.

use chrono::Utc;
use serde_json::json;

use crate::athletes::Athlete;

use super::{IngestPayload, Processor, ProcessorError, ProcessorOutcome};

/// Prepends therapy log entries. Newest entry first.
pub struct TherapyProcessor;

impl Processor for TherapyProcessor {
    fn process(
        &self,
        payload: &IngestPayload,
        mut athlete: Athlete,
    ) -> Result<ProcessorOutcome, ProcessorError> {
        let IngestPayload::Therapy(p) = payload else {
            return Err(ProcessorError::PayloadMismatch);
        };

        athlete.therapy_log.insert(0, p.entry.clone());
        athlete.updated_at = Utc::now();

        let event_data = json!({
            "entry_id": p.entry.id,
            "modality": p.entry.modality,
            "log_len": athlete.therapy_log.len(),
        });
        Ok(ProcessorOutcome::persist(athlete, event_data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::athletes::TherapyEntry;
    use crate::processors::TherapyPayload;
    use uuid::Uuid;

    fn entry(modality: &str) -> TherapyEntry {
        TherapyEntry {
            id: Uuid::new_v4(),
            therapist: Some("M. Ilic".into()),
            modality: modality.into(),
            notes: "responded well".into(),
            performed_at: Utc::now(),
        }
    }

    #[test]
    fn test_entries_prepend() {
        let athlete = Athlete::new("Jo");
        let athlete_id = athlete.id;

        let first = TherapyProcessor
            .process(
                &IngestPayload::Therapy(TherapyPayload {
                    athlete_id,
                    entry: entry("massage"),
                }),
                athlete,
            )
            .unwrap();
        let second = TherapyProcessor
            .process(
                &IngestPayload::Therapy(TherapyPayload {
                    athlete_id,
                    entry: entry("cryotherapy"),
                }),
                first.athlete,
            )
            .unwrap();

        assert_eq!(second.athlete.therapy_log.len(), 2);
        assert_eq!(second.athlete.therapy_log[0].modality, "cryotherapy");
        assert_eq!(second.athlete.therapy_log[1].modality, "massage");
    }
}
