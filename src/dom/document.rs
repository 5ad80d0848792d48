use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::dom::events::{DispatchedEvent, EventKind};
use crate::dom::host::{FormHost, FrameAccess, NodeId};
use crate::error::DomError;
use crate::generate::value::FileBlob;

// ============================================================================
// Page snapshot: JSON wire format produced by the page extractor
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub root: SnapshotNode,
}

/// One node of a snapshot. A node without `tag` is a text node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SnapshotNode>,
    /// Computed invisibility reported by the extractor (CSS, layout).
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<FrameInfo>,

    // Live control state. Written back on export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameInfo {
    pub same_origin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    pub name: String,
    pub mime: String,
    pub size: usize,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl SnapshotNode {
    pub fn element(tag: &str) -> Self {
        Self {
            tag: Some(tag.to_lowercase()),
            ..Self::default()
        }
    }

    pub fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Self::default()
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_lowercase(), value.to_string());
        self
    }

    pub fn child(mut self, child: SnapshotNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.children.push(SnapshotNode::text(text));
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn frame(mut self, same_origin: bool) -> Self {
        self.frame = Some(FrameInfo { same_origin });
        self
    }
}

// ============================================================================
// Document: arena DOM implementing FormHost
// ============================================================================

#[derive(Debug, Clone)]
enum NodeKind {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Element {
    tag_name: String,
    attrs: BTreeMap<String, String>,
    hidden: bool,
    frame: Option<FrameAccess>,
    value: String,
    checked: bool,
    selected_index: Option<usize>,
    files: Vec<FileBlob>,
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// In-memory document built from a `PageSnapshot`.
///
/// Keeps a log of every dispatched event so callers can inspect the exact
/// sequence a fill pass produced. Nodes can be locked to simulate a host
/// that throws on write.
#[derive(Debug, Clone)]
pub struct Document {
    url: Option<String>,
    nodes: Vec<Node>,
    root: NodeId,
    events: Vec<DispatchedEvent>,
    locked: HashSet<NodeId>,
}

impl Document {
    pub fn from_snapshot(snapshot: &PageSnapshot) -> Self {
        let mut doc = Self {
            url: snapshot.url.clone(),
            nodes: Vec::new(),
            root: NodeId(0),
            events: Vec::new(),
            locked: HashSet::new(),
        };
        doc.root = doc.import(None, &snapshot.root);
        doc.initialize_selects();
        doc
    }

    /// Convenience for tests and tools: a document whose root is `root`.
    pub fn from_root(url: Option<&str>, root: SnapshotNode) -> Self {
        Self::from_snapshot(&PageSnapshot {
            url: url.map(str::to_string),
            root,
        })
    }

    fn push(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            kind,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    fn import(&mut self, parent: Option<NodeId>, node: &SnapshotNode) -> NodeId {
        let Some(tag) = node.tag.as_deref() else {
            return self.push(parent, NodeKind::Text(node.text.clone().unwrap_or_default()));
        };

        let tag_name = tag.to_lowercase();
        let attrs: BTreeMap<String, String> = node
            .attrs
            .iter()
            .map(|(k, v)| (k.to_lowercase(), v.clone()))
            .collect();

        let value = match node.value.clone() {
            Some(v) => v,
            None if tag_name == "input" => attrs.get("value").cloned().unwrap_or_default(),
            None => String::new(),
        };
        let checked = node.checked.unwrap_or_else(|| attrs.contains_key("checked"));
        let frame = node.frame.map(|f| {
            if f.same_origin {
                FrameAccess::SameOrigin
            } else {
                FrameAccess::CrossOrigin
            }
        });

        let id = self.push(
            parent,
            NodeKind::Element(Element {
                tag_name: tag_name.clone(),
                attrs,
                hidden: node.hidden,
                frame,
                value,
                checked,
                selected_index: node.selected_index,
                files: Vec::new(),
            }),
        );

        if let Some(text) = &node.text {
            self.push(Some(id), NodeKind::Text(text.clone()));
        }
        for child in &node.children {
            self.import(Some(id), child);
        }

        if tag_name == "textarea" && node.value.is_none() {
            let text = self.text_content(id);
            if let Some(el) = self.element_mut(id) {
                el.value = text;
            }
        }

        id
    }

    fn initialize_selects(&mut self) {
        let selects: Vec<NodeId> = (0..self.nodes.len())
            .map(NodeId)
            .filter(|n| self.tag_name(*n) == Some("select"))
            .collect();

        for select in selects {
            let already = self.element(select).and_then(|e| e.selected_index);
            if already.is_some() {
                continue;
            }
            let options = self.select_options(select);
            let index = options
                .iter()
                .position(|o| self.has_attr(*o, "selected"))
                .or(if options.is_empty() { None } else { Some(0) });
            if let Some(el) = self.element_mut(select) {
                el.selected_index = index;
            }
        }
    }

    fn element(&self, node: NodeId) -> Option<&Element> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element(el) => Some(el),
            NodeKind::Text(_) => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(node.0)?.kind {
            NodeKind::Element(el) => Some(el),
            NodeKind::Text(_) => None,
        }
    }

    fn writable(&mut self, node: NodeId) -> Result<&mut Element, DomError> {
        if self.locked.contains(&node) {
            return Err(DomError::Rejected(format!("node {} is locked", node.0)));
        }
        self.element_mut(node).ok_or(DomError::NotAnElement(node.0))
    }

    fn input_type(&self, node: NodeId) -> Option<String> {
        let el = self.element(node)?;
        if el.tag_name != "input" {
            return None;
        }
        Some(
            el.attrs
                .get("type")
                .map(|t| t.trim().to_lowercase())
                .unwrap_or_else(|| "text".to_string()),
        )
    }

    /// Make every write or dispatch on `node` fail.
    pub fn lock_node(&mut self, node: NodeId) {
        self.locked.insert(node);
    }

    pub fn events(&self) -> &[DispatchedEvent] {
        &self.events
    }

    pub fn events_for(&self, node: NodeId) -> Vec<EventKind> {
        self.events
            .iter()
            .filter(|e| e.target == node)
            .map(|e| e.kind)
            .collect()
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    pub fn files(&self, node: NodeId) -> &[FileBlob] {
        self.element(node).map(|e| e.files.as_slice()).unwrap_or(&[])
    }

    /// All elements with the given tag, in document order.
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        let tag = tag.to_lowercase();
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .filter(|n| self.tag_name(*n) == Some(tag.as_str()))
            .collect()
    }

    /// First element whose attribute `name` equals `value`.
    pub fn find_by_attr(&self, name: &str, value: &str) -> Option<NodeId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .find(|n| self.attr(*n, name) == Some(value))
    }

    /// All elements whose attribute `name` equals `value`, in document order.
    pub fn find_all_by_attr(&self, name: &str, value: &str) -> Vec<NodeId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .filter(|n| self.attr(*n, name) == Some(value))
            .collect()
    }

    pub fn to_snapshot(&self) -> PageSnapshot {
        PageSnapshot {
            url: self.url.clone(),
            root: self.export(self.root),
        }
    }

    fn export(&self, node: NodeId) -> SnapshotNode {
        let children = self.nodes[node.0]
            .children
            .iter()
            .map(|c| self.export(*c))
            .collect();

        let el = match &self.nodes[node.0].kind {
            NodeKind::Text(text) => return SnapshotNode::text(text),
            NodeKind::Element(el) => el,
        };

        let mut out = SnapshotNode {
            tag: Some(el.tag_name.clone()),
            attrs: el.attrs.clone(),
            children,
            hidden: el.hidden,
            frame: el.frame.map(|f| FrameInfo {
                same_origin: f == FrameAccess::SameOrigin,
            }),
            ..SnapshotNode::default()
        };

        match el.tag_name.as_str() {
            "input" => match self.input_type(node).as_deref() {
                Some("checkbox") | Some("radio") => out.checked = Some(el.checked),
                Some("file") => {
                    out.files = el
                        .files
                        .iter()
                        .map(|f| FileSummary {
                            name: f.name.clone(),
                            mime: f.mime.clone(),
                            size: f.bytes.len(),
                        })
                        .collect()
                }
                _ if !el.value.is_empty() => out.value = Some(el.value.clone()),
                _ => {}
            },
            "textarea" if !el.value.is_empty() => out.value = Some(el.value.clone()),
            "select" => out.selected_index = el.selected_index,
            _ => {}
        }
        out
    }

    fn style_hides(style: &str) -> bool {
        let compact: String = style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        compact.contains("display:none") || compact.contains("visibility:hidden")
    }

    /// Radios sharing a name inside the same form (or document) are exclusive.
    fn radio_group_owner(&self, node: NodeId) -> Option<NodeId> {
        let mut current = self.parent(node);
        while let Some(n) = current {
            if self.tag_name(n) == Some("form") {
                return Some(n);
            }
            current = self.parent(n);
        }
        None
    }
}

impl FormHost for Document {
    fn root(&self) -> NodeId {
        self.root
    }

    fn hostname(&self) -> Option<String> {
        let url = Url::parse(self.url.as_deref()?).ok()?;
        url.host_str().map(|h| h.to_lowercase())
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.tag_name.as_str())
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)
            .and_then(|e| e.attrs.get(name))
            .map(String::as_str)
    }

    fn set_attr(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let el = self.writable(node)?;
        el.attrs.insert(name.to_lowercase(), value.to_string());
        Ok(())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(node.0)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn node_text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Text(text) => Some(text.as_str()),
            NodeKind::Element(_) => None,
        }
    }

    fn is_rendered(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if let Some(el) = self.element(n) {
                if el.hidden
                    || el.attrs.contains_key("hidden")
                    || el.attrs.get("style").is_some_and(|s| Self::style_hides(s))
                {
                    return false;
                }
            }
            current = self.parent(n);
        }
        true
    }

    fn frame_access(&self, node: NodeId) -> Option<FrameAccess> {
        self.element(node).and_then(|e| e.frame)
    }

    fn value(&self, node: NodeId) -> Result<String, DomError> {
        let el = self.element(node).ok_or(DomError::NotAnElement(node.0))?;
        if el.tag_name == "select" {
            let options = self.select_options(node);
            return Ok(el
                .selected_index
                .and_then(|i| options.get(i))
                .map(|o| self.option_value(*o))
                .unwrap_or_default());
        }
        Ok(el.value.clone())
    }

    fn set_value(&mut self, node: NodeId, value: &str) -> Result<(), DomError> {
        if self.tag_name(node) == Some("select") {
            let options = self.select_options(node);
            let index = options
                .iter()
                .position(|o| self.option_value(*o) == value)
                .ok_or_else(|| DomError::Rejected(format!("no option with value `{value}`")))?;
            return self.set_selected_index(node, index);
        }

        let el = self.writable(node)?;
        match el.tag_name.as_str() {
            "input" | "textarea" => {
                el.value = value.to_string();
                Ok(())
            }
            other => Err(DomError::UnsupportedProperty {
                node: node.0,
                tag: other.to_string(),
                property: "value",
            }),
        }
    }

    fn checked(&self, node: NodeId) -> Result<bool, DomError> {
        self.element(node)
            .map(|e| e.checked)
            .ok_or(DomError::NotAnElement(node.0))
    }

    fn set_checked_native(&mut self, node: NodeId, checked: bool) -> Result<(), DomError> {
        let input_type = self.input_type(node);
        if !matches!(input_type.as_deref(), Some("checkbox") | Some("radio")) {
            return Err(DomError::UnsupportedProperty {
                node: node.0,
                tag: self.tag_name(node).unwrap_or("#text").to_string(),
                property: "checked",
            });
        }

        self.writable(node)?.checked = checked;

        // Platform behaviour: checking a radio unchecks the rest of its group.
        if checked && input_type.as_deref() == Some("radio") {
            if let Some(name) = self.attr(node, "name").map(str::to_string) {
                let owner = self.radio_group_owner(node);
                let peers: Vec<NodeId> = self
                    .find_all_by_attr("name", &name)
                    .into_iter()
                    .filter(|p| {
                        *p != node
                            && self.input_type(*p).as_deref() == Some("radio")
                            && self.radio_group_owner(*p) == owner
                    })
                    .collect();
                for peer in peers {
                    if let Some(el) = self.element_mut(peer) {
                        el.checked = false;
                    }
                }
            }
        }
        Ok(())
    }

    fn selected_index(&self, node: NodeId) -> Result<Option<usize>, DomError> {
        self.element(node)
            .map(|e| e.selected_index)
            .ok_or(DomError::NotAnElement(node.0))
    }

    fn set_selected_index(&mut self, node: NodeId, index: usize) -> Result<(), DomError> {
        let len = self.select_options(node).len();
        let el = self.writable(node)?;
        if el.tag_name != "select" {
            return Err(DomError::UnsupportedProperty {
                node: node.0,
                tag: el.tag_name.clone(),
                property: "selectedIndex",
            });
        }
        if index >= len {
            return Err(DomError::OptionOutOfRange { index, len });
        }
        el.selected_index = Some(index);
        Ok(())
    }

    fn set_files(&mut self, node: NodeId, blob: &FileBlob) -> Result<(), DomError> {
        if self.input_type(node).as_deref() != Some("file") {
            return Err(DomError::UnsupportedProperty {
                node: node.0,
                tag: self.tag_name(node).unwrap_or("#text").to_string(),
                property: "files",
            });
        }
        self.writable(node)?.files = vec![blob.clone()];
        Ok(())
    }

    fn dispatch_event(&mut self, node: NodeId, kind: EventKind) -> Result<(), DomError> {
        self.writable(node)?;
        let init = kind.init();
        self.events.push(DispatchedEvent {
            target: node,
            kind,
            bubbles: init.bubbles,
            cancelable: init.cancelable,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::from_root(
            Some("https://shop.example.com/checkout"),
            SnapshotNode::element("form")
                .child(
                    SnapshotNode::element("select")
                        .attr("name", "size")
                        .child(SnapshotNode::element("option").attr("value", "s").with_text("Small"))
                        .child(
                            SnapshotNode::element("option")
                                .attr("value", "m")
                                .attr("selected", "")
                                .with_text("Medium"),
                        ),
                )
                .child(SnapshotNode::element("textarea").attr("name", "bio").with_text("hi"))
                .child(SnapshotNode::element("input").attr("type", "radio").attr("name", "r").attr("checked", ""))
                .child(SnapshotNode::element("input").attr("type", "radio").attr("name", "r")),
        )
    }

    #[test]
    fn select_initial_index_follows_selected_attribute() {
        let doc = sample();
        let select = doc.find_by_attr("name", "size").unwrap();
        assert_eq!(doc.selected_index(select).unwrap(), Some(1));
        assert_eq!(doc.value(select).unwrap(), "m");
    }

    #[test]
    fn textarea_value_comes_from_text() {
        let doc = sample();
        let bio = doc.find_by_attr("name", "bio").unwrap();
        assert_eq!(doc.value(bio).unwrap(), "hi");
    }

    #[test]
    fn native_radio_write_unchecks_peers() {
        let mut doc = sample();
        let radios = doc.find_all_by_attr("name", "r");
        doc.set_checked_native(radios[1], true).unwrap();
        assert!(!doc.checked(radios[0]).unwrap());
        assert!(doc.checked(radios[1]).unwrap());
    }

    #[test]
    fn hostname_is_parsed_from_url() {
        assert_eq!(sample().hostname().as_deref(), Some("shop.example.com"));
    }

    #[test]
    fn locked_node_rejects_writes() {
        let mut doc = sample();
        let bio = doc.find_by_attr("name", "bio").unwrap();
        doc.lock_node(bio);
        assert!(matches!(doc.set_value(bio, "x"), Err(DomError::Rejected(_))));
        assert!(doc.dispatch_event(bio, EventKind::Input).is_err());
    }
}
