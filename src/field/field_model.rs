use serde::{Deserialize, Serialize};

use crate::dom::host::NodeId;
use crate::field::normalize::TokenSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlKind {
    TextInput,
    Textarea,
    Select,
    Checkbox,
    Radio,
    File,
}

impl ControlKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlKind::TextInput => "text-input",
            ControlKind::Textarea => "textarea",
            ControlKind::Select => "select",
            ControlKind::Checkbox => "checkbox",
            ControlKind::Radio => "radio",
            ControlKind::File => "file",
        }
    }

    pub fn is_text_like(&self) -> bool {
        matches!(self, ControlKind::TextInput | ControlKind::Textarea)
    }
}

/// Native validation attributes a generated value must respect.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ControlConstraints {
    pub max_length: Option<usize>,
    pub min_length: Option<usize>,
    pub pattern: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub accept: Option<String>,
    pub required: bool,
}

/// One form control found during a traversal pass.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub node: NodeId,
    /// Human-readable locator, e.g. `input[name="email"]`.
    pub path: String,
    pub tag_name: String,
    pub control_kind: ControlKind,
    /// Lowercased `type` attribute; `textarea` / `select` for those tags.
    pub input_type: String,
    pub name: Option<String>,
    pub id: Option<String>,
    pub class_list: Vec<String>,
    pub placeholder: Option<String>,
    pub aria_label: Option<String>,
    pub autocomplete: Option<String>,
    pub existing_value: String,
    pub visible: bool,
    pub readonly: bool,
    pub disabled: bool,
    /// Radio/checkbox `name`.
    pub group_name: Option<String>,
    pub constraints: ControlConstraints,
    pub in_frame: bool,
}

impl FieldDescriptor {
    /// Name, else id, else path.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or(&self.path)
    }
}

// ============================================================================
// AttributeBag: normalized view used by every classifier
// ============================================================================

/// Lowercased identifying attributes of one field plus its nearest label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeBag {
    pub input_type: String,
    pub name: String,
    pub id: String,
    pub class_name: String,
    pub placeholder: String,
    pub aria_label: String,
    pub autocomplete: String,
    pub label: Option<String>,
    /// Text surrounding the control inside its container.
    pub context: String,

    identifiers: TokenSet,
    placeholder_tokens: TokenSet,
    aria_tokens: TokenSet,
    label_tokens: TokenSet,
    context_tokens: TokenSet,
}

impl AttributeBag {
    pub fn new(input_type: &str) -> Self {
        let mut bag = Self {
            input_type: input_type.trim().to_lowercase(),
            ..Self::default()
        };
        bag.refresh();
        bag
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.trim().to_lowercase();
        self.refresh();
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.trim().to_lowercase();
        self.refresh();
        self
    }

    pub fn with_class(mut self, class_name: &str) -> Self {
        self.class_name = class_name.trim().to_lowercase();
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.trim().to_lowercase();
        self.refresh();
        self
    }

    pub fn with_aria_label(mut self, aria_label: &str) -> Self {
        self.aria_label = aria_label.trim().to_lowercase();
        self.refresh();
        self
    }

    pub fn with_autocomplete(mut self, autocomplete: &str) -> Self {
        self.autocomplete = autocomplete.trim().to_lowercase();
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        let label = label.trim().to_lowercase();
        self.label = (!label.is_empty()).then_some(label);
        self.refresh();
        self
    }

    pub fn with_context(mut self, context: &str) -> Self {
        self.context = context.trim().to_lowercase();
        self.refresh();
        self
    }

    fn refresh(&mut self) {
        self.identifiers = TokenSet::from_sources(&[self.name.as_str(), self.id.as_str()]);
        self.placeholder_tokens = TokenSet::new(&self.placeholder);
        self.aria_tokens = TokenSet::new(&self.aria_label);
        self.label_tokens = TokenSet::new(self.label.as_deref().unwrap_or(""));
        self.context_tokens = TokenSet::new(&self.context);
    }

    /// Name and id tokens.
    pub fn identifiers(&self) -> &TokenSet {
        &self.identifiers
    }

    pub fn placeholder_tokens(&self) -> &TokenSet {
        &self.placeholder_tokens
    }

    pub fn aria_tokens(&self) -> &TokenSet {
        &self.aria_tokens
    }

    pub fn label_tokens(&self) -> &TokenSet {
        &self.label_tokens
    }

    pub fn context_tokens(&self) -> &TokenSet {
        &self.context_tokens
    }

    /// The `autocomplete` hint with section/shipping/billing prefixes dropped.
    pub fn autocomplete_token(&self) -> Option<&str> {
        self.autocomplete
            .split_whitespace()
            .rfind(|t| !t.starts_with("section-") && *t != "shipping" && *t != "billing")
    }
}

// ============================================================================
// Groups
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    Radio,
    Checkbox,
}

/// Radios or checkboxes sharing a `name` within one form.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub name: String,
    pub kind: GroupKind,
    /// Enclosing `<form>`, if any.
    pub scope: Option<NodeId>,
    /// Indices into the pass's field list, in document order.
    pub members: Vec<usize>,
}

impl Group {
    /// At most one member may end up checked.
    pub fn is_exclusive(&self) -> bool {
        self.kind == GroupKind::Radio
    }
}
