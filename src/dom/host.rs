use serde::{Deserialize, Serialize};

use crate::dom::events::EventKind;
use crate::error::DomError;
use crate::generate::value::FileBlob;

/// Stable handle to a node owned by a host. Identity, not content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Whether the engine may look inside an iframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameAccess {
    SameOrigin,
    CrossOrigin,
}

// ============================================================================
// FormHost trait: platform binding layer
// ============================================================================

/// Everything the engine needs from a live document.
///
/// Reads are infallible lookups; writes and dispatches return `DomError` so
/// the executor can isolate a failing control and move on. Checked state is
/// only ever written through `set_checked_native`, the low-level property
/// write that reactive frameworks cannot intercept.
pub trait FormHost {
    fn root(&self) -> NodeId;

    /// Page hostname, used by the domain gate.
    fn hostname(&self) -> Option<String>;

    /// Lowercased tag name, `None` for text nodes.
    fn tag_name(&self, node: NodeId) -> Option<&str>;

    fn attr(&self, node: NodeId, name: &str) -> Option<&str>;

    fn set_attr(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Raw text of a text node, `None` for elements.
    fn node_text(&self, node: NodeId) -> Option<&str>;

    /// Whether the node and all of its ancestors are rendered.
    fn is_rendered(&self, node: NodeId) -> bool;

    /// `Some` when the node is an iframe boundary.
    fn frame_access(&self, node: NodeId) -> Option<FrameAccess>;

    fn value(&self, node: NodeId) -> Result<String, DomError>;

    fn set_value(&mut self, node: NodeId, value: &str) -> Result<(), DomError>;

    fn checked(&self, node: NodeId) -> Result<bool, DomError>;

    fn set_checked_native(&mut self, node: NodeId, checked: bool) -> Result<(), DomError>;

    /// Index into the select's options in document order.
    fn selected_index(&self, node: NodeId) -> Result<Option<usize>, DomError>;

    fn set_selected_index(&mut self, node: NodeId, index: usize) -> Result<(), DomError>;

    fn set_files(&mut self, node: NodeId, blob: &FileBlob) -> Result<(), DomError>;

    fn dispatch_event(&mut self, node: NodeId, kind: EventKind) -> Result<(), DomError>;

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|n| *n == node)?;
        pos.checked_sub(1).map(|p| siblings[p])
    }

    fn is_element(&self, node: NodeId) -> bool {
        self.tag_name(node).is_some()
    }

    /// Descendants of `node` in document order, `node` excluded.
    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).into_iter().rev());
        }
        out
    }

    /// Concatenated text of the subtree, whitespace preserved.
    fn text_content(&self, node: NodeId) -> String {
        if let Some(text) = self.node_text(node) {
            return text.to_string();
        }
        let mut out = String::new();
        for child in self.descendants(node) {
            if let Some(text) = self.node_text(child) {
                out.push_str(text);
            }
        }
        out
    }

    fn has_attr(&self, node: NodeId, name: &str) -> bool {
        self.attr(node, name).is_some()
    }

    /// `<option>` elements of a select, in document order.
    fn select_options(&self, select: NodeId) -> Vec<NodeId> {
        self.descendants(select)
            .into_iter()
            .filter(|n| self.tag_name(*n) == Some("option"))
            .collect()
    }

    /// Effective option value: the `value` attribute, else its trimmed text.
    fn option_value(&self, option: NodeId) -> String {
        match self.attr(option, "value") {
            Some(v) => v.to_string(),
            None => self.text_content(option).trim().to_string(),
        }
    }
}
