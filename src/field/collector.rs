use std::collections::HashMap;

use tracing::debug;

use crate::dom::host::{FormHost, FrameAccess, NodeId};
use crate::field::field_model::{
    ControlConstraints, ControlKind, FieldDescriptor, Group, GroupKind,
};

/// Input types that are buttons, never fields.
const BUTTON_TYPES: &[&str] = &["submit", "button", "reset", "image"];

/// Fields of one pass in document order, plus their radio/checkbox groups.
#[derive(Debug, Clone, Default)]
pub struct FieldSet {
    pub fields: Vec<FieldDescriptor>,
    pub groups: Vec<Group>,
    /// Iframes whose content was not entered (cross-origin or disabled).
    pub skipped_frames: usize,
}

impl FieldSet {
    /// Group containing the field at `index`, if any.
    pub fn group_of(&self, index: usize) -> Option<&Group> {
        self.groups.iter().find(|g| g.members.contains(&index))
    }
}

/// Walk `root` in document order and describe every form control.
///
/// Same-origin iframes are entered only when `enter_frames` is set;
/// cross-origin frames are never entered.
pub fn collect_fields<H: FormHost + ?Sized>(host: &H, root: NodeId, enter_frames: bool) -> FieldSet {
    let mut set = FieldSet::default();
    let mut stack = vec![(root, false)];

    while let Some((node, in_frame)) = stack.pop() {
        if node != root {
            if let Some(access) = host.frame_access(node) {
                if access == FrameAccess::SameOrigin && enter_frames {
                    push_children(host, node, true, &mut stack);
                } else {
                    debug!(node = node.0, ?access, "iframe not entered");
                    set.skipped_frames += 1;
                }
                continue;
            }
        }

        match host.tag_name(node) {
            Some("input") | Some("textarea") | Some("select") => {
                let index = set.fields.len();
                if let Some(field) = describe(host, node, index, in_frame) {
                    set.fields.push(field);
                }
            }
            _ => push_children(host, node, in_frame, &mut stack),
        }
    }

    set.groups = build_groups(host, &set.fields);
    set
}

fn push_children<H: FormHost + ?Sized>(
    host: &H,
    node: NodeId,
    in_frame: bool,
    stack: &mut Vec<(NodeId, bool)>,
) {
    for child in host.children(node).into_iter().rev() {
        stack.push((child, in_frame));
    }
}

fn describe<H: FormHost + ?Sized>(
    host: &H,
    node: NodeId,
    index: usize,
    in_frame: bool,
) -> Option<FieldDescriptor> {
    let tag_name = host.tag_name(node)?.to_string();
    let input_type = match tag_name.as_str() {
        "input" => host
            .attr(node, "type")
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "text".to_string()),
        other => other.to_string(),
    };
    if BUTTON_TYPES.contains(&input_type.as_str()) {
        return None;
    }

    let control_kind = match (tag_name.as_str(), input_type.as_str()) {
        ("textarea", _) => ControlKind::Textarea,
        ("select", _) => ControlKind::Select,
        (_, "checkbox") => ControlKind::Checkbox,
        (_, "radio") => ControlKind::Radio,
        (_, "file") => ControlKind::File,
        _ => ControlKind::TextInput,
    };

    let attr = |name: &str| {
        host.attr(node, name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    let name = attr("name");
    let id = attr("id");

    let group_name = match control_kind {
        ControlKind::Radio | ControlKind::Checkbox => name.clone(),
        _ => None,
    };

    let path = match (&id, &name) {
        (Some(id), _) => format!("{tag_name}#{id}"),
        (None, Some(name)) if group_name.is_some() => match attr("value") {
            Some(value) => format!("{tag_name}[name=\"{name}\"][value=\"{value}\"]"),
            None => format!("{tag_name}[name=\"{name}\"]:nth-field({index})"),
        },
        (None, Some(name)) => format!("{tag_name}[name=\"{name}\"]"),
        (None, None) => format!("{tag_name}:nth-field({index})"),
    };

    Some(FieldDescriptor {
        node,
        path,
        tag_name,
        control_kind,
        name,
        id,
        class_list: host
            .attr(node, "class")
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default(),
        placeholder: attr("placeholder"),
        aria_label: attr("aria-label"),
        autocomplete: attr("autocomplete"),
        existing_value: host.value(node).unwrap_or_default(),
        visible: host.is_rendered(node),
        readonly: host.has_attr(node, "readonly"),
        disabled: host.has_attr(node, "disabled") || in_disabled_fieldset(host, node),
        group_name,
        constraints: read_constraints(host, node),
        input_type,
        in_frame,
    })
}

fn in_disabled_fieldset<H: FormHost + ?Sized>(host: &H, node: NodeId) -> bool {
    let mut current = host.parent(node);
    while let Some(n) = current {
        if host.tag_name(n) == Some("fieldset") && host.has_attr(n, "disabled") {
            return true;
        }
        current = host.parent(n);
    }
    false
}

fn read_constraints<H: FormHost + ?Sized>(host: &H, node: NodeId) -> ControlConstraints {
    let usize_attr = |name: &str| host.attr(node, name).and_then(|v| v.trim().parse::<usize>().ok());
    let f64_attr = |name: &str| {
        host.attr(node, name)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
    };

    ControlConstraints {
        max_length: usize_attr("maxlength"),
        min_length: usize_attr("minlength"),
        pattern: host
            .attr(node, "pattern")
            .filter(|p| !p.is_empty())
            .map(str::to_string),
        min: f64_attr("min"),
        max: f64_attr("max"),
        step: f64_attr("step").filter(|s| *s > 0.0),
        accept: host
            .attr(node, "accept")
            .filter(|a| !a.trim().is_empty())
            .map(str::to_string),
        required: host.has_attr(node, "required"),
    }
}

fn form_owner<H: FormHost + ?Sized>(host: &H, node: NodeId) -> Option<NodeId> {
    let mut current = host.parent(node);
    while let Some(n) = current {
        if host.tag_name(n) == Some("form") {
            return Some(n);
        }
        current = host.parent(n);
    }
    None
}

fn build_groups<H: FormHost + ?Sized>(host: &H, fields: &[FieldDescriptor]) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut by_key: HashMap<(GroupKind, Option<NodeId>, String), usize> = HashMap::new();

    for (index, field) in fields.iter().enumerate() {
        let kind = match field.control_kind {
            ControlKind::Radio => GroupKind::Radio,
            ControlKind::Checkbox => GroupKind::Checkbox,
            _ => continue,
        };
        let Some(name) = field.group_name.clone() else {
            continue;
        };
        let scope = form_owner(host, field.node);
        let key = (kind, scope, name.clone());

        match by_key.get(&key) {
            Some(&g) => groups[g].members.push(index),
            None => {
                by_key.insert(key, groups.len());
                groups.push(Group {
                    name,
                    kind,
                    scope,
                    members: vec![index],
                });
            }
        }
    }
    groups
}
