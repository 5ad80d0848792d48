use std::collections::HashMap;

use tracing::trace;

use crate::dom::host::{FormHost, NodeId};
use crate::field::field_model::{AttributeBag, FieldDescriptor};
use crate::field::normalize::normalize_text;

/// How many ancestor levels the label search may climb.
pub const LABEL_HOP_LIMIT: usize = 3;

/// Surrounding-text budget recorded per field.
const CONTEXT_LIMIT: usize = 160;

const CONTROL_TAGS: &[&str] = &["input", "select", "textarea", "button"];
const SILENT_TAGS: &[&str] = &["script", "style", "option", "noscript", "template"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Memoized per-element attribute extraction.
///
/// Keyed by node identity. Entries are only dropped by `clear()`; the memory
/// manager decides when that happens.
#[derive(Debug, Default)]
pub struct AttributeCache {
    entries: HashMap<NodeId, AttributeBag>,
    label_index: Option<HashMap<String, NodeId>>,
    hits: u64,
    misses: u64,
}

impl AttributeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_attributes<H: FormHost + ?Sized>(
        &mut self,
        host: &H,
        field: &FieldDescriptor,
    ) -> &AttributeBag {
        if self.entries.contains_key(&field.node) {
            self.hits += 1;
        } else {
            self.misses += 1;
            let bag = self.extract(host, field);
            trace!(field = %field.path, label = ?bag.label, "attributes extracted");
            self.entries.insert(field.node, bag);
        }
        &self.entries[&field.node]
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.label_index = None;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }

    fn extract<H: FormHost + ?Sized>(&mut self, host: &H, field: &FieldDescriptor) -> AttributeBag {
        let label = self.nearest_label(host, field.node);
        let context = host
            .parent(field.node)
            .map(|p| visible_text(host, p))
            .map(|t| truncate_chars(&t, CONTEXT_LIMIT))
            .unwrap_or_default();

        let mut bag = AttributeBag::new(&field.input_type)
            .with_name(field.name.as_deref().unwrap_or(""))
            .with_id(field.id.as_deref().unwrap_or(""))
            .with_class(&field.class_list.join(" "))
            .with_placeholder(field.placeholder.as_deref().unwrap_or(""))
            .with_aria_label(field.aria_label.as_deref().unwrap_or(""))
            .with_autocomplete(field.autocomplete.as_deref().unwrap_or(""))
            .with_context(&context);
        if let Some(label) = label {
            bag = bag.with_label(&label);
        }
        bag
    }

    /// `label[for]`, then `aria-labelledby`, then a wrapping label, then
    /// the nearest preceding text within `LABEL_HOP_LIMIT` levels.
    fn nearest_label<H: FormHost + ?Sized>(&mut self, host: &H, node: NodeId) -> Option<String> {
        if let Some(id) = host.attr(node, "id") {
            if let Some(label) = self.labels_for(host).get(id).copied() {
                let text = visible_text(host, label);
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }

        if let Some(ids) = host.attr(node, "aria-labelledby") {
            let index = self.element_ids(host);
            let text = ids
                .split_whitespace()
                .filter_map(|id| index.get(id).copied())
                .map(|n| visible_text(host, n))
                .collect::<Vec<_>>()
                .join(" ");
            if !text.trim().is_empty() {
                return Some(normalize_text(&text));
            }
        }

        let mut current = host.parent(node);
        for _ in 0..LABEL_HOP_LIMIT {
            let Some(n) = current else { break };
            if host.tag_name(n) == Some("label") {
                let text = visible_text(host, n);
                if !text.is_empty() {
                    return Some(text);
                }
            }
            current = host.parent(n);
        }

        preceding_text(host, node)
    }

    fn labels_for<H: FormHost + ?Sized>(&mut self, host: &H) -> &HashMap<String, NodeId> {
        self.label_index.get_or_insert_with(|| {
            let mut index = HashMap::new();
            for n in host.descendants(host.root()) {
                if host.tag_name(n) == Some("label") {
                    if let Some(target) = host.attr(n, "for") {
                        index.entry(target.to_string()).or_insert(n);
                    }
                }
            }
            index
        })
    }

    fn element_ids<H: FormHost + ?Sized>(&self, host: &H) -> HashMap<String, NodeId> {
        let mut ids = HashMap::new();
        for n in host.descendants(host.root()) {
            if let Some(id) = host.attr(n, "id") {
                ids.entry(id.to_string()).or_insert(n);
            }
        }
        ids
    }
}

/// Text before the control, nearest first. Stops at another control since
/// any text further back belongs to it.
fn preceding_text<H: FormHost + ?Sized>(host: &H, node: NodeId) -> Option<String> {
    let mut current = node;
    for _ in 0..LABEL_HOP_LIMIT {
        let mut sibling = host.previous_sibling(current);
        while let Some(s) = sibling {
            if contains_control(host, s) {
                return None;
            }
            let text = visible_text(host, s);
            if !text.is_empty() {
                return Some(text);
            }
            sibling = host.previous_sibling(s);
        }
        current = host.parent(current)?;
        if host.tag_name(current) == Some("form") {
            return None;
        }
    }
    None
}

fn contains_control<H: FormHost + ?Sized>(host: &H, node: NodeId) -> bool {
    let is_control = |n: NodeId| {
        host.tag_name(n)
            .is_some_and(|t| CONTROL_TAGS.contains(&t) && !(t == "input" && host.attr(n, "type") == Some("hidden")))
    };
    is_control(node) || host.descendants(node).into_iter().any(is_control)
}

/// Normalized text of a subtree, skipping controls and non-rendered content.
pub fn visible_text<H: FormHost + ?Sized>(host: &H, node: NodeId) -> String {
    let mut out = String::new();
    collect_text(host, node, &mut out);
    normalize_text(&out)
}

fn collect_text<H: FormHost + ?Sized>(host: &H, node: NodeId, out: &mut String) {
    if let Some(text) = host.node_text(node) {
        out.push_str(text);
        out.push(' ');
        return;
    }
    if let Some(tag) = host.tag_name(node) {
        if CONTROL_TAGS.contains(&tag) || SILENT_TAGS.contains(&tag) {
            return;
        }
    }
    for child in host.children(node) {
        collect_text(host, child, out);
    }
}

fn truncate_chars(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}
