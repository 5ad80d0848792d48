#![allow(dead_code)]

use chrono::NaiveDate;
use form_autofill::config::settings::FillConfig;
use form_autofill::dom::document::{Document, SnapshotNode};
use form_autofill::dom::host::{FormHost, NodeId};
use form_autofill::engine::session::{FillOptions, fill_form_with};
use form_autofill::field::collector::{FieldSet, collect_fields};
use form_autofill::field::field_model::FieldDescriptor;
use form_autofill::generate::generators::ValueGenerator;
use form_autofill::report::report_model::FillReport;

// ============================================================================
// Snapshot builders
// ============================================================================

pub fn form(children: Vec<SnapshotNode>) -> SnapshotNode {
    children
        .into_iter()
        .fold(SnapshotNode::element("form"), |f, c| f.child(c))
}

pub fn input(input_type: &str, name: &str) -> SnapshotNode {
    SnapshotNode::element("input")
        .attr("type", input_type)
        .attr("name", name)
}

pub fn text_input(name: &str) -> SnapshotNode {
    input("text", name)
}

pub fn radio(name: &str, value: &str) -> SnapshotNode {
    input("radio", name).attr("value", value)
}

pub fn option(value: &str, label: &str) -> SnapshotNode {
    SnapshotNode::element("option")
        .attr("value", value)
        .with_text(label)
}

pub fn select(name: &str, options: Vec<SnapshotNode>) -> SnapshotNode {
    options
        .into_iter()
        .fold(SnapshotNode::element("select").attr("name", name), |s, o| s.child(o))
}

pub fn labelled(label: &str, id: &str, control: SnapshotNode) -> SnapshotNode {
    SnapshotNode::element("div")
        .child(SnapshotNode::element("label").attr("for", id).with_text(label))
        .child(control.attr("id", id))
}

pub fn page(url: &str, root: SnapshotNode) -> Document {
    Document::from_root(Some(url), root)
}

pub fn doc(root: SnapshotNode) -> Document {
    page("https://forms.example.com/signup", root)
}

// ============================================================================
// Lookups
// ============================================================================

pub fn by_name(doc: &Document, name: &str) -> NodeId {
    doc.find_by_attr("name", name)
        .unwrap_or_else(|| panic!("no element named {name}"))
}

pub fn field<'a>(set: &'a FieldSet, name: &str) -> &'a FieldDescriptor {
    set.fields
        .iter()
        .find(|f| f.name.as_deref() == Some(name))
        .unwrap_or_else(|| panic!("no field named {name}"))
}

pub fn fields_of(doc: &Document) -> FieldSet {
    collect_fields(doc, doc.root(), true)
}

// ============================================================================
// Pass helpers
// ============================================================================

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
}

pub fn run(doc: &mut Document, config: &FillConfig, seed: u64) -> FillReport {
    let root = doc.root();
    fill_form_with(
        doc,
        root,
        config,
        FillOptions {
            seed: Some(seed),
            today: Some(today()),
            ..FillOptions::default()
        },
    )
}

pub fn generator(config: &FillConfig, seed: u64) -> ValueGenerator {
    ValueGenerator::new(config, Some(seed), today())
}
