use serde::{Deserialize, Serialize};

use crate::dom::host::NodeId;

/// Synthetic events the executor dispatches after a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Focus,
    Input,
    Change,
    Blur,
    Click,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Focus => "focus",
            EventKind::Input => "input",
            EventKind::Change => "change",
            EventKind::Blur => "blur",
            EventKind::Click => "click",
        }
    }

    /// `input`/`change`/`click` bubble so delegated framework listeners see them;
    /// focus and blur never bubble. None of the synthetic events are cancelable.
    pub fn init(&self) -> EventInit {
        let bubbles = !matches!(self, EventKind::Focus | EventKind::Blur);
        EventInit {
            bubbles,
            cancelable: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventInit {
    pub bubbles: bool,
    pub cancelable: bool,
}

/// Text inputs and textareas.
pub const TEXT_SEQUENCE: &[EventKind] = &[EventKind::Input, EventKind::Change];

/// Select controls.
pub const SELECT_SEQUENCE: &[EventKind] = &[EventKind::Change];

/// Checkboxes and radios. `click` is left out: it would toggle the state back.
pub const TOGGLE_SEQUENCE: &[EventKind] = &[
    EventKind::Focus,
    EventKind::Input,
    EventKind::Change,
    EventKind::Blur,
];

/// One event as recorded by a host that keeps an event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchedEvent {
    pub target: NodeId,
    pub kind: EventKind,
    pub bubbles: bool,
    pub cancelable: bool,
}
