mod common;

use common::*;
use form_autofill::classify::custom_rules::{CustomRule, GenerationStrategy};
use form_autofill::classify::resolver::ClassificationSource;
use form_autofill::config::settings::FillConfig;
use form_autofill::dom::document::{Document, SnapshotNode};
use form_autofill::dom::events::EventKind;
use form_autofill::dom::host::FormHost;
use form_autofill::field::normalize::text_fingerprint;
use form_autofill::fill::executor::{MARKER_ATTR, MARKER_HASH_ATTR};
use form_autofill::report::report_model::{FieldState, SkipReason};
use regex::Regex;

fn with_rules(rules: Vec<CustomRule>) -> FillConfig {
    FillConfig {
        custom_fields: rules,
        ..FillConfig::default()
    }
}

fn reason_for(report: &form_autofill::FillReport, path: &str) -> SkipReason {
    report
        .outcome(path)
        .and_then(|o| o.reason.clone())
        .unwrap_or_else(|| panic!("{path} was not skipped"))
}

// ============================================================================
// 1. Event sequences
// ============================================================================

#[test]
fn text_inputs_get_input_then_change() {
    let mut doc = doc(form(vec![text_input("city")]));
    let report = run(&mut doc, &FillConfig::default(), 1);
    let node = by_name(&doc, "city");

    assert_eq!(report.filled, 1);
    assert_eq!(doc.events_for(node), vec![EventKind::Input, EventKind::Change]);
    assert!(!doc.value(node).unwrap().is_empty());
}

#[test]
fn dispatched_events_bubble_except_focus_and_blur() {
    let mut doc = doc(form(vec![text_input("city"), input("checkbox", "terms").attr("required", "")]));
    run(&mut doc, &FillConfig::default(), 1);
    for event in doc.events() {
        assert!(!event.cancelable);
        let expect_bubbles = !matches!(event.kind, EventKind::Focus | EventKind::Blur);
        assert_eq!(event.bubbles, expect_bubbles, "{:?}", event.kind);
    }
}

#[test]
fn checkboxes_use_native_write_and_toggle_sequence() {
    let mut doc = doc(form(vec![input("checkbox", "terms").attr("required", "")]));
    let report = run(&mut doc, &FillConfig::default(), 1);
    let node = by_name(&doc, "terms");

    assert!(doc.checked(node).unwrap());
    assert_eq!(
        doc.events_for(node),
        vec![EventKind::Focus, EventKind::Input, EventKind::Change, EventKind::Blur]
    );
    assert!(!doc.events_for(node).contains(&EventKind::Click));
    assert_eq!(report.outcome("input[name=\"terms\"]:nth-field(0)").unwrap().value.as_deref(), Some("true"));
}

#[test]
fn selects_only_get_change() {
    let mut doc = doc(form(vec![select("plan", vec![option("a", "A"), option("b", "B")])]));
    run(&mut doc, &FillConfig::default(), 1);
    assert_eq!(doc.events_for(by_name(&doc, "plan")), vec![EventKind::Change]);
}

// ============================================================================
// 2. Markers
// ============================================================================

#[test]
fn filled_fields_are_marked_with_source_and_hash() {
    let mut doc = doc(form(vec![input("email", "email"), text_input("qwerty_zz")]));
    run(&mut doc, &FillConfig::default(), 4);

    let email = by_name(&doc, "email");
    let value = doc.value(email).unwrap();
    assert_eq!(doc.attr(email, MARKER_ATTR), Some("rule-based"));
    assert_eq!(doc.attr(email, MARKER_HASH_ATTR), Some(text_fingerprint(&value).as_str()));

    let other = by_name(&doc, "qwerty_zz");
    assert_eq!(doc.attr(other, MARKER_ATTR), Some("default"));
}

#[test]
fn skipped_fields_are_not_marked() {
    let mut doc = doc(form(vec![text_input("city").attr("readonly", "")]));
    run(&mut doc, &FillConfig::default(), 4);
    assert_eq!(doc.attr(by_name(&doc, "city"), MARKER_ATTR), None);
}

// ============================================================================
// 3. Radio groups
// ============================================================================

fn gender_form() -> SnapshotNode {
    form(vec![
        radio("gender", "female"),
        radio("gender", "male"),
        radio("gender", "other"),
    ])
}

fn checked_radios(doc: &Document, name: &str) -> Vec<String> {
    doc.find_all_by_attr("name", name)
        .into_iter()
        .filter(|n| doc.checked(*n).unwrap())
        .map(|n| doc.attr(n, "value").unwrap_or("").to_string())
        .collect()
}

#[test]
fn exactly_one_radio_per_group_is_checked() {
    for seed in 0..25 {
        let mut doc = doc(gender_form());
        let report = run(&mut doc, &FillConfig::default(), seed);
        assert_eq!(checked_radios(&doc, "gender").len(), 1, "seed {seed}");
        assert_eq!(report.filled, 1);
        assert_eq!(report.skipped, 2);
    }
}

#[test]
fn radio_choice_varies_with_seed() {
    let mut seen = std::collections::HashSet::new();
    for seed in 0..40 {
        let mut doc = doc(gender_form());
        run(&mut doc, &FillConfig::default(), seed);
        seen.extend(checked_radios(&doc, "gender"));
    }
    assert_eq!(seen.len(), 3);
}

#[test]
fn unchosen_radios_are_left_untouched() {
    let mut doc = doc(gender_form());
    let report = run(&mut doc, &FillConfig::default(), 2);
    let chosen = checked_radios(&doc, "gender").remove(0);

    for node in doc.find_all_by_attr("name", "gender") {
        let value = doc.attr(node, "value").unwrap();
        let path = format!("input[name=\"gender\"][value=\"{value}\"]");
        if value == chosen {
            assert_eq!(doc.events_for(node).len(), 4);
            assert!(report.outcome(&path).unwrap().is_filled());
        } else {
            assert!(doc.events_for(node).is_empty());
            assert_eq!(reason_for(&report, &path), SkipReason::NotChosen);
        }
    }
}

#[test]
fn separate_groups_each_get_one() {
    let mut doc = doc(form(vec![
        radio("size", "s"),
        radio("size", "m"),
        radio("color", "red"),
        radio("color", "blue"),
    ]));
    run(&mut doc, &FillConfig::default(), 6);
    assert_eq!(checked_radios(&doc, "size").len(), 1);
    assert_eq!(checked_radios(&doc, "color").len(), 1);
}

#[test]
fn disabled_radios_are_never_chosen() {
    for seed in 0..15 {
        let mut doc = doc(form(vec![
            radio("plan", "free").attr("disabled", ""),
            radio("plan", "paid"),
        ]));
        run(&mut doc, &FillConfig::default(), seed);
        assert_eq!(checked_radios(&doc, "plan"), vec!["paid".to_string()]);
    }
}

#[test]
fn radio_rule_selects_named_value() {
    let config = with_rules(vec![CustomRule::new("gender", GenerationStrategy::List, "other")]);
    for seed in 0..10 {
        let mut doc = doc(gender_form());
        run(&mut doc, &config, seed);
        assert_eq!(checked_radios(&doc, "gender"), vec!["other".to_string()]);
    }
}

#[test]
fn refused_radio_falls_back_to_next_member() {
    for seed in 0..10 {
        let mut doc = doc(gender_form());
        let locked: Vec<_> = doc.find_all_by_attr("name", "gender").into_iter().take(2).collect();
        for node in &locked {
            doc.lock_node(*node);
        }
        run(&mut doc, &FillConfig::default(), seed);
        assert_eq!(checked_radios(&doc, "gender"), vec!["other".to_string()]);
    }
}

#[test]
fn prechecked_group_counts_as_filled() {
    let mut doc = doc(form(vec![
        radio("gender", "female"),
        radio("gender", "male").attr("checked", ""),
    ]));
    let config = FillConfig {
        ignore_filled: true,
        ..FillConfig::default()
    };
    let report = run(&mut doc, &config, 0);
    assert_eq!(checked_radios(&doc, "gender"), vec!["male".to_string()]);
    assert_eq!(report.filled, 0);
    assert!(doc.events().is_empty());
}

// ============================================================================
// 4. Selects
// ============================================================================

fn plan_select() -> SnapshotNode {
    select(
        "plan",
        vec![
            option("", "Choose..."),
            option("basic", "Basic"),
            option("legacy", "Legacy").attr("disabled", ""),
            option("pro", "Pro"),
        ],
    )
}

#[test]
fn placeholder_and_disabled_options_are_never_picked() {
    for seed in 0..30 {
        let mut doc = doc(form(vec![plan_select()]));
        run(&mut doc, &FillConfig::default(), seed);
        let value = doc.value(by_name(&doc, "plan")).unwrap();
        assert!(value == "basic" || value == "pro", "seed {seed}: {value}");
    }
}

#[test]
fn generated_country_names_pick_matching_option() {
    let mut doc = doc(form(vec![select(
        "country",
        vec![option("", "--"), option("de", "Germany"), option("us", "United States")],
    )]));
    let report = run(&mut doc, &FillConfig::default(), 0);
    assert_eq!(doc.value(by_name(&doc, "country")).unwrap(), "us");
    assert_eq!(report.outcome("select[name=\"country\"]").unwrap().value.as_deref(), Some("us"));
}

#[test]
fn custom_list_names_an_option() {
    let config = with_rules(vec![CustomRule::new("plan", GenerationStrategy::List, "PRO")]);
    let mut doc = doc(form(vec![plan_select()]));
    run(&mut doc, &config, 3);
    assert_eq!(doc.value(by_name(&doc, "plan")).unwrap(), "pro");
}

#[test]
fn select_without_options_is_skipped() {
    let mut doc = doc(form(vec![select("empty", vec![option("", "None")])]));
    let report = run(&mut doc, &FillConfig::default(), 0);
    assert_eq!(reason_for(&report, "select[name=\"empty\"]"), SkipReason::NoOptions);
    assert!(doc.events().is_empty());
}

// ============================================================================
// 5. Eligibility
// ============================================================================

#[test]
fn ineligible_fields_report_their_reason() {
    let mut doc = doc(form(vec![
        input("hidden", "token").attr("value", "abc"),
        text_input("city").attr("disabled", ""),
        text_input("street").attr("readonly", ""),
        text_input("phone").hidden(),
        text_input("captcha_answer"),
        input("file", "avatar"),
    ]));
    let config = FillConfig {
        ignore_fields: "captcha, honeypot".into(),
        ..FillConfig::default()
    };
    let report = run(&mut doc, &config, 0);

    assert_eq!(report.filled, 0);
    assert_eq!(reason_for(&report, "input[name=\"token\"]"), SkipReason::HiddenInput);
    assert_eq!(reason_for(&report, "input[name=\"city\"]"), SkipReason::Disabled);
    assert_eq!(reason_for(&report, "input[name=\"street\"]"), SkipReason::Readonly);
    assert_eq!(reason_for(&report, "input[name=\"phone\"]"), SkipReason::NotVisible);
    assert_eq!(
        reason_for(&report, "input[name=\"captcha_answer\"]"),
        SkipReason::IgnoredKeyword("captcha".into())
    );
    assert_eq!(reason_for(&report, "input[name=\"avatar\"]"), SkipReason::FileInputDisabled);
    assert!(!report.has_errors());
    assert_eq!(doc.value(by_name(&doc, "token")).unwrap(), "abc");
}

#[test]
fn invisible_fields_fill_when_allowed() {
    let mut doc = doc(form(vec![text_input("city").hidden()]));
    let config = FillConfig {
        ignore_hidden: false,
        ..FillConfig::default()
    };
    assert_eq!(run(&mut doc, &config, 0).filled, 1);
}

#[test]
fn prefilled_fields_respect_ignore_filled() {
    let root = form(vec![text_input("city").attr("value", "Leipzig"), text_input("street")]);

    let mut kept = doc(root.clone());
    let config = FillConfig {
        ignore_filled: true,
        ..FillConfig::default()
    };
    let report = run(&mut kept, &config, 0);
    assert_eq!(reason_for(&report, "input[name=\"city\"]"), SkipReason::AlreadyFilled);
    assert_eq!(kept.value(by_name(&kept, "city")).unwrap(), "Leipzig");

    let mut overwritten = doc(root);
    run(&mut overwritten, &FillConfig::default(), 0);
    assert_ne!(overwritten.value(by_name(&overwritten, "city")).unwrap(), "Leipzig");
}

// ============================================================================
// 6. Constraints
// ============================================================================

#[test]
fn values_are_truncated_to_maxlength() {
    for seed in 0..10 {
        let mut doc = doc(form(vec![text_input("street").attr("maxlength", "4")]));
        run(&mut doc, &FillConfig::default(), seed);
        assert!(doc.value(by_name(&doc, "street")).unwrap().chars().count() <= 4);
    }
}

#[test]
fn control_pattern_is_used_when_generated_value_misses_it() {
    let mut doc = doc(form(vec![text_input("employee_code").attr("pattern", "EMP[0-9]{6}")]));
    let report = run(&mut doc, &FillConfig::default(), 0);
    let value = doc.value(by_name(&doc, "employee_code")).unwrap();
    assert!(Regex::new("^EMP[0-9]{6}$").unwrap().is_match(&value), "{value}");
    assert_eq!(report.filled, 1);
}

#[test]
fn unsatisfiable_minlength_skips_instead_of_writing() {
    let mut doc = doc(form(vec![text_input("first_name").attr("minlength", "60")]));
    let report = run(&mut doc, &FillConfig::default(), 0);
    let reason = reason_for(&report, "input[name=\"first_name\"]");
    assert!(matches!(reason, SkipReason::Constraint(_)), "{reason:?}");
    assert!(report.has_errors());
    assert_eq!(doc.value(by_name(&doc, "first_name")).unwrap(), "");
}

#[test]
fn numbers_are_snapped_to_step() {
    let mut doc = doc(form(vec![input("number", "quantity")
        .attr("min", "0")
        .attr("max", "50")
        .attr("step", "5")]));
    run(&mut doc, &FillConfig::default(), 12);
    let n: f64 = doc.value(by_name(&doc, "quantity")).unwrap().parse().unwrap();
    assert!((0.0..=50.0).contains(&n));
    assert_eq!(n % 5.0, 0.0);
}

#[test]
fn fine_steps_survive_number_formatting() {
    for seed in 0..40 {
        let mut doc = doc(form(vec![input("number", "quantity")
            .attr("min", "0")
            .attr("max", "5")
            .attr("step", "0.007")]));
        let report = run(&mut doc, &FillConfig::default(), seed);
        assert_eq!(report.filled, 1);

        let written = doc.value(by_name(&doc, "quantity")).unwrap();
        let n: f64 = written.parse().unwrap();
        let k = n / 0.007;
        assert!((0.0..=5.0).contains(&n), "{written}");
        assert!((k - k.round()).abs() < 1e-6, "seed {seed}: {written} is off step");
    }
}

// ============================================================================
// 7. Isolation and custom strategies
// ============================================================================

#[test]
fn a_failing_field_does_not_stop_the_pass() {
    let mut doc = doc(form(vec![text_input("city"), text_input("street")]));
    let city = by_name(&doc, "city");
    doc.lock_node(city);

    let report = run(&mut doc, &FillConfig::default(), 0);
    let reason = reason_for(&report, "input[name=\"city\"]");
    assert!(matches!(reason, SkipReason::Host(_)), "{reason:?}");
    assert!(report.outcome("input[name=\"street\"]").unwrap().is_filled());
    assert_eq!(report.errors.len(), 1);
}

#[test]
fn custom_rules_drive_the_value() {
    let config = with_rules(vec![
        CustomRule::new("*code*", GenerationStrategy::Regex, "EMP[0-9]{6}"),
        CustomRule::new("#nick", GenerationStrategy::List, "neo"),
        CustomRule::new("newsletter", GenerationStrategy::List, "false"),
    ]);
    let mut doc = doc(form(vec![
        text_input("employee_code"),
        text_input("handle").attr("id", "nick"),
        input("checkbox", "newsletter").attr("checked", ""),
    ]));
    let report = run(&mut doc, &config, 0);

    let code = doc.value(by_name(&doc, "employee_code")).unwrap();
    assert!(Regex::new("^EMP[0-9]{6}$").unwrap().is_match(&code));
    assert_eq!(doc.value(by_name(&doc, "handle")).unwrap(), "neo");
    assert!(!doc.checked(by_name(&doc, "newsletter")).unwrap());

    let outcome = report.outcome("input#nick").unwrap();
    assert_eq!(outcome.source, Some(ClassificationSource::CustomRule));
    assert_eq!(doc.attr(by_name(&doc, "handle"), MARKER_ATTR), Some("custom-rule"));
}

#[test]
fn unsafe_rule_falls_through_with_warning() {
    let config = with_rules(vec![CustomRule::new("city", GenerationStrategy::Regex, "(a+)+$")]);
    let mut doc = doc(form(vec![text_input("city")]));
    let report = run(&mut doc, &config, 0);

    assert_eq!(report.warnings.len(), 1);
    let outcome = report.outcome("input[name=\"city\"]").unwrap();
    assert_eq!(outcome.state, FieldState::Filled);
    assert_eq!(outcome.source, Some(ClassificationSource::RuleBased));
}

#[test]
fn file_inputs_receive_a_blob_when_enabled() {
    let mut doc = doc(form(vec![input("file", "avatar").attr("accept", "image/*")]));
    let config = FillConfig {
        enable_file_input: true,
        ..FillConfig::default()
    };
    let report = run(&mut doc, &config, 0);
    let node = by_name(&doc, "avatar");

    assert_eq!(report.filled, 1);
    assert_eq!(doc.files(node)[0].mime, "image/png");
    assert_eq!(doc.events_for(node), vec![EventKind::Input, EventKind::Change]);
}
