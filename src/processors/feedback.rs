//! AI feedback processor.

use serde_json::json;

use crate::athletes::Athlete;

use super::{IngestPayload, Processor, ProcessorError, ProcessorOutcome};

/// Pass-through recorder for human feedback on AI output.
///
/// The athlete record is untouched and persistence is skipped; the
/// feedback travels on the update event for whoever collects it.
pub struct FeedbackProcessor;

impl Processor for FeedbackProcessor {
    fn process(
        &self,
        payload: &IngestPayload,
        athlete: Athlete,
    ) -> Result<ProcessorOutcome, ProcessorError> {
        let IngestPayload::Feedback(p) = payload else {
            return Err(ProcessorError::PayloadMismatch);
        };

        let event_data = json!({
            "subject": p.subject,
            "helpful": p.helpful,
            "comments": p.comments,
        });
        Ok(ProcessorOutcome::pass_through(athlete, event_data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::FeedbackPayload;

    #[test]
    fn test_feedback_skips_persistence_and_mutation() {
        let athlete = Athlete::new("Jo");
        let before = serde_json::to_string(&athlete).unwrap();
        let athlete_id = athlete.id;

        let outcome = FeedbackProcessor
            .process(
                &IngestPayload::Feedback(FeedbackPayload {
                    athlete_id,
                    subject: "weekly-plan".into(),
                    helpful: false,
                    comments: Some("too much intensity".into()),
                }),
                athlete,
            )
            .unwrap();

        assert!(outcome.skip_persistence);
        assert_eq!(serde_json::to_string(&outcome.athlete).unwrap(), before);
        assert_eq!(outcome.event_data["helpful"], false);
    }
}
