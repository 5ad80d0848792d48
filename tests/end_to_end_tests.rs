mod common;

use std::time::{Duration, Instant};

use chrono::NaiveDate;

use common::*;
use form_autofill::classify::patterns::SemanticType;
use form_autofill::config::settings::FillConfig;
use form_autofill::dom::document::{Document, SnapshotNode};
use form_autofill::dom::host::FormHost;
use form_autofill::engine::memory::MemoryManager;
use form_autofill::engine::session::{FillOptions, classify_form, fill_form, fill_form_with};
use form_autofill::fill::executor::MARKER_ATTR;
use form_autofill::generate::generators::age_on;
use form_autofill::report::report_model::SkipReason;
use form_autofill::trace::logger::TraceLogger;

fn signup_form() -> SnapshotNode {
    form(vec![
        SnapshotNode::element("input").attr("name", "user_email"),
        input("tel", "contact"),
        select(
            "country",
            vec![
                option("", "Select"),
                option("us", "United States"),
                option("de", "Germany"),
            ],
        ),
        radio("gender", "male"),
        radio("gender", "female"),
    ])
}

// ============================================================================
// 1. Whole pass
// ============================================================================

#[test]
fn signup_form_is_filled_end_to_end() {
    let mut doc = doc(signup_form());
    let report = run(&mut doc, &FillConfig::default(), 42);

    let email = doc.value(by_name(&doc, "user_email")).unwrap();
    let (local, domain) = email.split_once('@').expect("email has an @");
    assert!(!local.is_empty() && domain.contains('.'), "{email}");

    let phone = doc.value(by_name(&doc, "contact")).unwrap();
    assert!(phone.chars().filter(char::is_ascii_digit).count() >= 7, "{phone}");

    assert_eq!(doc.value(by_name(&doc, "country")).unwrap(), "us");

    let checked = doc
        .find_all_by_attr("name", "gender")
        .into_iter()
        .filter(|n| doc.checked(*n).unwrap())
        .count();
    assert_eq!(checked, 1);

    let semantic = |path: &str| report.outcome(path).and_then(|o| o.semantic);
    assert_eq!(semantic("input[name=\"user_email\"]"), Some(SemanticType::Email));
    assert_eq!(semantic("input[name=\"contact\"]"), Some(SemanticType::Phone));

    assert_eq!(report.hostname.as_deref(), Some("forms.example.com"));
    assert_eq!(report.total, 5);
    assert_eq!(report.filled, 4);
    assert_eq!(report.skipped, 1);
    assert!(report.errors.is_empty());
    assert!(report.warnings.is_empty());
    assert!(report.duration_ms.is_some());
}

#[test]
fn outcomes_follow_document_order() {
    let mut doc = doc(signup_form());
    let report = run(&mut doc, &FillConfig::default(), 1);
    let paths: Vec<&str> = report.fields.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "input[name=\"user_email\"]",
            "input[name=\"contact\"]",
            "select[name=\"country\"]",
            "input[name=\"gender\"][value=\"male\"]",
            "input[name=\"gender\"][value=\"female\"]",
        ]
    );
}

#[test]
fn same_seed_same_values() {
    let mut a = doc(signup_form());
    let mut b = doc(signup_form());
    let ra = run(&mut a, &FillConfig::default(), 77);
    let rb = run(&mut b, &FillConfig::default(), 77);
    let values = |r: &form_autofill::FillReport| r.fields.iter().map(|f| f.value.clone()).collect::<Vec<_>>();
    assert_eq!(values(&ra), values(&rb));
}

#[test]
fn fill_form_without_options_still_fills() {
    let mut doc = doc(signup_form());
    let root = doc.root();
    let report = fill_form(&mut doc, root, &FillConfig::default(), Some(5));
    assert_eq!(report.filled, 4);
}

#[test]
fn pass_can_be_scoped_to_one_form() {
    let mut doc = doc(
        SnapshotNode::element("body")
            .child(form(vec![text_input("city")]).attr("id", "first"))
            .child(form(vec![text_input("street")]).attr("id", "second")),
    );
    let scope = doc.find_by_attr("id", "second").unwrap();
    let report = fill_form(&mut doc, scope, &FillConfig::default(), Some(0));

    assert_eq!(report.total, 1);
    assert_eq!(doc.value(by_name(&doc, "city")).unwrap(), "");
    assert!(!doc.value(by_name(&doc, "street")).unwrap().is_empty());
}

#[test]
fn huge_age_bounds_still_fill_birthdates() {
    for max_age in [400_000_000, u32::MAX] {
        let config = FillConfig {
            min_age: 18,
            max_age,
            ..FillConfig::default()
        };
        let mut doc = doc(form(vec![text_input("birthdate")]));
        let report = run(&mut doc, &config, 4);

        assert_eq!(report.filled, 1);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].field, "maxAge");
        let born = NaiveDate::parse_from_str(&doc.value(by_name(&doc, "birthdate")).unwrap(), "%Y-%m-%d").unwrap();
        let age = age_on(born, today());
        assert!((18..=150).contains(&age), "{born}");
    }
}

// ============================================================================
// 2. Domain gate
// ============================================================================

#[test]
fn ignored_domains_are_left_alone() {
    let config = FillConfig {
        ignore_domains: vec!["bank.io".into()],
        ..FillConfig::default()
    };
    let mut doc = page("https://login.bank.io/account", signup_form());
    let report = run(&mut doc, &config, 0);

    assert!(report.domain_ignored);
    assert_eq!(report.total, 0);
    assert!(doc.events().is_empty());
    assert_eq!(doc.value(by_name(&doc, "user_email")).unwrap(), "");
}

#[test]
fn lookalike_domains_are_not_ignored() {
    let config = FillConfig {
        ignore_domains: vec!["bank.io".into()],
        ..FillConfig::default()
    };
    let mut doc = page("https://notbank.io/", signup_form());
    assert!(!run(&mut doc, &config, 0).domain_ignored);
}

// ============================================================================
// 3. Frames
// ============================================================================

fn framed_page() -> Document {
    doc(SnapshotNode::element("body")
        .child(form(vec![text_input("city")]))
        .child(SnapshotNode::element("iframe").frame(true).child(form(vec![text_input("street")])))
        .child(SnapshotNode::element("iframe").frame(false).child(form(vec![text_input("company")]))))
}

#[test]
fn same_origin_frames_are_entered() {
    let mut doc = framed_page();
    let report = run(&mut doc, &FillConfig::default(), 0);

    assert!(!doc.value(by_name(&doc, "street")).unwrap().is_empty());
    assert_eq!(doc.value(by_name(&doc, "company")).unwrap(), "");
    assert_eq!(report.total, 2);
    assert_eq!(report.skipped_frames, 1);
}

#[test]
fn frames_are_skipped_when_disabled() {
    let config = FillConfig {
        disable_iframe_fill: true,
        ..FillConfig::default()
    };
    let mut doc = framed_page();
    let report = run(&mut doc, &config, 0);

    assert_eq!(doc.value(by_name(&doc, "street")).unwrap(), "");
    assert_eq!(report.total, 1);
    assert_eq!(report.skipped_frames, 2);
}

// ============================================================================
// 4. Report serialization and tracing
// ============================================================================

#[test]
fn report_serializes_to_json() {
    let mut doc = doc(signup_form());
    let report = run(&mut doc, &FillConfig::default(), 3);
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["filled"], 4);
    assert_eq!(json["domain_ignored"], false);
    let first = &json["fields"][0];
    assert_eq!(first["semantic"], "email");
    assert_eq!(first["source"], "rule-based");
    assert_eq!(first["state"], "filled");
    assert_eq!(first["kind"], "text-input");

    let skipped = json["fields"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["state"] == "skipped")
        .unwrap();
    assert_eq!(skipped["reason"]["reason"], "not-chosen");
}

#[test]
fn trace_logger_writes_one_line_per_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");
    let tracer = TraceLogger::new(path.to_str().unwrap());
    assert!(tracer.is_enabled());

    let mut doc = doc(signup_form());
    let root = doc.root();
    fill_form_with(
        &mut doc,
        root,
        &FillConfig::default(),
        FillOptions {
            seed: Some(0),
            today: Some(today()),
            tracer: Some(&tracer),
            ..FillOptions::default()
        },
    );

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0]["field"], "input[name=\"user_email\"]");
    assert_eq!(lines[0]["semantic"], "email");
    assert!(lines[0]["timestamp_ms"].as_i64().unwrap() > 0);
}

#[test]
fn disabled_trace_logger_is_silent() {
    let tracer = TraceLogger::disabled();
    assert!(!tracer.is_enabled());
    let mut doc = doc(signup_form());
    let root = doc.root();
    let report = fill_form_with(
        &mut doc,
        root,
        &FillConfig::default(),
        FillOptions {
            seed: Some(0),
            tracer: Some(&tracer),
            ..FillOptions::default()
        },
    );
    assert_eq!(report.filled, 4);
}

// ============================================================================
// 5. Memory manager across passes
// ============================================================================

#[test]
fn cache_is_returned_and_cleanup_scheduled_after_a_pass() {
    let start = Instant::now();
    let mut memory = MemoryManager::with_intervals(start, Duration::from_millis(500), Duration::from_secs(300));
    let mut doc = doc(signup_form());
    let root = doc.root();

    fill_form_with(
        &mut doc,
        root,
        &FillConfig::default(),
        FillOptions {
            seed: Some(0),
            memory: Some(&mut memory),
            ..FillOptions::default()
        },
    );

    assert_eq!(memory.cached_entries(), 5);
    assert!(memory.cleanup_pending());
    assert!(memory.on_idle().is_some());
    assert_eq!(memory.cached_entries(), 0);
    assert_eq!(memory.evictions(), 1);
}

#[test]
fn destroyed_manager_still_allows_passes() {
    let mut memory = MemoryManager::new(Instant::now());
    memory.destroy();
    let mut doc = doc(signup_form());
    let root = doc.root();

    let report = fill_form_with(
        &mut doc,
        root,
        &FillConfig::default(),
        FillOptions {
            seed: Some(0),
            memory: Some(&mut memory),
            ..FillOptions::default()
        },
    );
    assert_eq!(report.filled, 4);
    assert_eq!(memory.cached_entries(), 0);
    assert!(!memory.cleanup_pending());
}

// ============================================================================
// 6. Classification only and refill
// ============================================================================

#[test]
fn classify_form_writes_nothing() {
    let doc = doc(signup_form());
    let (fields, warnings) = classify_form(&doc, doc.root(), &FillConfig::default());

    assert!(warnings.is_empty());
    assert_eq!(fields.len(), 5);
    assert_eq!(fields[0].classification.semantic.as_str(), "email");
    assert!(doc.events().is_empty());
    assert_eq!(doc.attr(by_name(&doc, "user_email"), MARKER_ATTR), None);
}

#[test]
fn second_pass_with_ignore_filled_changes_nothing() {
    let mut doc = doc(form(vec![
        input("email", "user_email"),
        input("tel", "contact"),
        input("checkbox", "terms").attr("required", ""),
        radio("gender", "male"),
        radio("gender", "female"),
    ]));
    run(&mut doc, &FillConfig::default(), 9);
    let before = doc.value(by_name(&doc, "user_email")).unwrap();
    doc.clear_events();

    let config = FillConfig {
        ignore_filled: true,
        ..FillConfig::default()
    };
    let report = run(&mut doc, &config, 10);

    assert_eq!(doc.value(by_name(&doc, "user_email")).unwrap(), before);
    assert_eq!(report.filled, 0);
    assert!(doc.events().is_empty());
    assert!(
        report
            .fields
            .iter()
            .all(|f| f.reason == Some(SkipReason::AlreadyFilled))
    );
}
