use form_autofill::error::PatternError;
use form_autofill::generate::regex_guard::{MAX_PATTERN_LEN, check_pattern};
use form_autofill::generate::regex_synth::{MAX_OUTPUT_LEN, RegexTemplate};
use rand::SeedableRng;
use rand::rngs::StdRng;
use regex::Regex;

fn samples(pattern: &str, n: u64) -> Vec<String> {
    let template = RegexTemplate::compile(pattern).unwrap();
    (0..n)
        .map(|seed| template.synthesize(&mut StdRng::seed_from_u64(seed)).unwrap())
        .collect()
}

// ============================================================================
// 1. Guard
// ============================================================================

#[test]
fn nested_quantifiers_are_rejected() {
    for p in [r"(\w+)+$", "(a+)+$", r"(\w*)*$", "(a+)*b", "(x{2,})+"] {
        assert!(
            matches!(check_pattern(p), Err(PatternError::NestedQuantifier { .. })),
            "{p} should be rejected"
        );
    }
}

#[test]
fn repeated_optional_and_overlap_are_rejected() {
    assert!(matches!(check_pattern("(x?)+"), Err(PatternError::RepeatedOptional { .. })));
    assert!(matches!(check_pattern("(a|a)+"), Err(PatternError::OverlappingAlternation { .. })));
    assert!(matches!(check_pattern("(a|ab)*c"), Err(PatternError::OverlappingAlternation { .. })));
}

#[test]
fn backreferences_are_rejected() {
    assert_eq!(check_pattern(r"(a)\1"), Err(PatternError::Backreference));
}

#[test]
fn long_patterns_are_rejected() {
    let p = "a".repeat(MAX_PATTERN_LEN + 1);
    assert!(matches!(check_pattern(&p), Err(PatternError::TooLong { .. })));
    assert!(check_pattern(&"a".repeat(MAX_PATTERN_LEN)).is_ok());
}

#[test]
fn ordinary_patterns_pass_the_guard() {
    for p in [
        "EMP[0-9]{6}",
        r"[A-Z]{2}\d{2}-[a-z]+",
        r"(\d{3}-){2}\d{4}",
        "(foo|bar)baz",
        r"[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,4}",
    ] {
        assert!(check_pattern(p).is_ok(), "{p} should pass");
    }
}

#[test]
fn rejected_patterns_never_reach_synthesis() {
    for p in [r"(\w+)+$", "(a+)+$", r"(\w*)*$"] {
        let err = RegexTemplate::compile(p).unwrap_err();
        assert!(err.is_unsafe());
    }
}

#[test]
fn syntax_errors_are_not_unsafe() {
    let err = RegexTemplate::compile("[abc").unwrap_err();
    assert!(!err.is_unsafe());
}

// ============================================================================
// 2. Synthesis
// ============================================================================

#[test]
fn employee_code_always_matches() {
    let anchored = Regex::new("^EMP[0-9]{6}$").unwrap();
    for value in samples("EMP[0-9]{6}", 50) {
        assert!(anchored.is_match(&value), "{value}");
    }
}

#[test]
fn alternation_and_groups_are_expanded() {
    let anchored = Regex::new(r"^(?:(foo|bar)-\d{2}(x|yz)?)$").unwrap();
    for value in samples(r"(foo|bar)-\d{2}(x|yz)?", 40) {
        assert!(anchored.is_match(&value), "{value}");
    }
}

#[test]
fn unbounded_repeats_stay_short() {
    for value in samples("[a-z]+@[a-z]+\\.com", 30) {
        assert!(value.len() <= MAX_OUTPUT_LEN);
        assert!(value.ends_with(".com"));
        assert!(value.contains('@'));
    }
}

#[test]
fn negated_classes_avoid_listed_chars() {
    for value in samples("[^0-9]{8}", 30) {
        assert_eq!(value.chars().count(), 8);
        assert!(!value.chars().any(|c| c.is_ascii_digit()), "{value}");
    }
}

#[test]
fn same_seed_same_value() {
    let template = RegexTemplate::compile(r"[A-Z]{3}-\d{4}").unwrap();
    let a = template.synthesize(&mut StdRng::seed_from_u64(7)).unwrap();
    let b = template.synthesize(&mut StdRng::seed_from_u64(7)).unwrap();
    assert_eq!(a, b);
    assert!(template.is_match(&a));
    assert_eq!(template.source(), r"[A-Z]{3}-\d{4}");
}
