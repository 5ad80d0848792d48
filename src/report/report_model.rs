use std::fmt;

use serde::Serialize;

use crate::classify::patterns::SemanticType;
use crate::classify::resolver::{Classification, ClassificationSource};
use crate::config::settings::ConfigIssue;
use crate::field::field_model::{ControlKind, FieldDescriptor};

// ============================================================================
// Per-field outcome
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldState {
    Filled,
    Skipped,
}

/// Why a field was left alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "kebab-case")]
pub enum SkipReason {
    HiddenInput,
    NotVisible,
    Disabled,
    Readonly,
    IgnoredKeyword(String),
    AlreadyFilled,
    FileInputDisabled,
    NoOptions,
    /// Another member of the radio group was checked.
    NotChosen,
    Constraint(String),
    Generation(String),
    Host(String),
}

impl SkipReason {
    /// Recoverable errors, as opposed to deliberate skips.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            SkipReason::Constraint(_) | SkipReason::Generation(_) | SkipReason::Host(_)
        )
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::HiddenInput => write!(f, "hidden input"),
            SkipReason::NotVisible => write!(f, "not visible"),
            SkipReason::Disabled => write!(f, "disabled"),
            SkipReason::Readonly => write!(f, "readonly"),
            SkipReason::IgnoredKeyword(k) => write!(f, "matches ignore keyword `{k}`"),
            SkipReason::AlreadyFilled => write!(f, "already filled"),
            SkipReason::FileInputDisabled => write!(f, "file inputs disabled"),
            SkipReason::NoOptions => write!(f, "no selectable options"),
            SkipReason::NotChosen => write!(f, "other radio in group chosen"),
            SkipReason::Constraint(e) => write!(f, "constraint: {e}"),
            SkipReason::Generation(e) => write!(f, "generation failed: {e}"),
            SkipReason::Host(e) => write!(f, "host error: {e}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldOutcome {
    pub path: String,
    pub kind: ControlKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic: Option<SemanticType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ClassificationSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,
    pub state: FieldState,
    /// Value written, for filled fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SkipReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl FieldOutcome {
    pub fn filled(field: &FieldDescriptor, classification: &Classification, value: String) -> Self {
        Self {
            path: field.path.clone(),
            kind: field.control_kind,
            semantic: Some(classification.semantic),
            source: Some(classification.source),
            confidence: classification.confidence,
            state: FieldState::Filled,
            value: Some(value),
            reason: None,
            note: None,
        }
    }

    pub fn skipped(field: &FieldDescriptor, reason: SkipReason) -> Self {
        Self {
            path: field.path.clone(),
            kind: field.control_kind,
            semantic: None,
            source: None,
            confidence: None,
            state: FieldState::Skipped,
            value: None,
            note: Some(reason.to_string()),
            reason: Some(reason),
        }
    }

    pub fn classified(mut self, classification: &Classification) -> Self {
        self.semantic = Some(classification.semantic);
        self.source = Some(classification.source);
        self.confidence = classification.confidence;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn is_filled(&self) -> bool {
        self.state == FieldState::Filled
    }
}

// ============================================================================
// Pass report
// ============================================================================

/// Everything one fill pass did, in document order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FillReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    pub domain_ignored: bool,
    pub total: usize,
    pub filled: usize,
    pub skipped: usize,
    /// Iframes the pass could not or was not allowed to enter.
    pub skipped_frames: usize,
    pub fields: Vec<FieldOutcome>,
    pub warnings: Vec<ConfigIssue>,
    /// Recoverable per-field errors.
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,
}

impl FillReport {
    /// No-op result for a hostname on the ignore list.
    pub fn domain_ignored(hostname: Option<String>) -> Self {
        Self {
            hostname,
            domain_ignored: true,
            ..Self::default()
        }
    }

    pub fn from_outcomes(hostname: Option<String>, fields: Vec<FieldOutcome>) -> Self {
        let total = fields.len();
        let filled = fields.iter().filter(|f| f.is_filled()).count();
        let errors = fields
            .iter()
            .filter_map(|f| {
                f.reason
                    .as_ref()
                    .filter(|r| r.is_error())
                    .map(|r| format!("{}: {r}", f.path))
            })
            .collect();
        Self {
            hostname,
            domain_ignored: false,
            total,
            filled,
            skipped: total - filled,
            skipped_frames: 0,
            fields,
            warnings: Vec::new(),
            errors,
            duration_ms: None,
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<ConfigIssue>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn with_skipped_frames(mut self, skipped_frames: usize) -> Self {
        self.skipped_frames = skipped_frames;
        self
    }

    pub fn with_duration(mut self, duration_ms: u128) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn outcome(&self, path: &str) -> Option<&FieldOutcome> {
        self.fields.iter().find(|f| f.path == path)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
