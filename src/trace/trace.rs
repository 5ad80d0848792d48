use chrono::Utc;
use serde::Serialize;

use crate::report::report_model::{FieldOutcome, FieldState};

/// One JSONL line per field decision.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: i64,
    pub field: String,
    pub kind: String,

    pub semantic: Option<String>,
    pub source: Option<String>,
    pub confidence: Option<u8>,

    pub state: FieldState,
    pub note: Option<String>,
}

impl TraceEvent {
    pub fn now(field: &str, kind: &str, state: FieldState) -> Self {
        Self {
            timestamp_ms: Utc::now().timestamp_millis(),
            field: field.to_string(),
            kind: kind.to_string(),
            semantic: None,
            source: None,
            confidence: None,
            state,
            note: None,
        }
    }

    pub fn for_outcome(outcome: &FieldOutcome) -> Self {
        let mut event = Self::now(&outcome.path, outcome.kind.as_str(), outcome.state);
        event.semantic = outcome.semantic.map(|s| s.to_string());
        event.source = outcome.source.map(|s| s.as_str().to_string());
        event.confidence = outcome.confidence;
        event.note = outcome.note.clone();
        event
    }
}
