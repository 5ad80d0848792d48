use serde::Serialize;

use crate::classify::patterns::{PATTERN_LIBRARY, PatternEntry, SemanticType};
use crate::classify::rule_classifier::is_excluded;
use crate::field::field_model::AttributeBag;
use crate::field::normalize::TokenSet;

// ============================================================================
// Signal weights
// ============================================================================

const IDENTIFIER_EXACT: u32 = 50;
const IDENTIFIER_PARTIAL: u32 = 25;
const LABEL_MATCH: u32 = 30;
const PLACEHOLDER_MATCH: u32 = 20;
const CONTEXT_MATCH: u32 = 10;

/// Best possible raw score: every category hit at its top weight.
const MAX_RAW: u32 = IDENTIFIER_EXACT + LABEL_MATCH + PLACEHOLDER_MATCH + CONTEXT_MATCH;

pub const DEFAULT_THRESHOLD: u8 = 60;
pub const MIN_THRESHOLD: u8 = 30;
pub const MAX_THRESHOLD: u8 = 95;

pub fn clamp_threshold(threshold: i64) -> u8 {
    threshold.clamp(MIN_THRESHOLD as i64, MAX_THRESHOLD as i64) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoredType {
    pub semantic: SemanticType,
    /// 0-100.
    pub score: u8,
}

/// Weighted-sum scorer used when the rule walk found nothing specific.
///
/// Every library row is scored over four signal categories; each category
/// contributes at most once. Ties keep the earlier row.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceClassifier {
    use_labels: bool,
}

impl Default for ConfidenceClassifier {
    fn default() -> Self {
        Self { use_labels: true }
    }
}

impl ConfidenceClassifier {
    pub fn new(use_labels: bool) -> Self {
        Self { use_labels }
    }

    pub fn classify_with_confidence(&self, attrs: &AttributeBag, threshold: u8) -> Option<ScoredType> {
        let threshold = clamp_threshold(threshold as i64);
        let best = self.best(attrs)?;
        (best.score >= threshold).then_some(best)
    }

    /// Highest-scoring row regardless of threshold.
    pub fn best(&self, attrs: &AttributeBag) -> Option<ScoredType> {
        let mut best: Option<ScoredType> = None;
        for pattern in PATTERN_LIBRARY {
            let score = self.score(pattern, attrs);
            if score == 0 {
                continue;
            }
            if best.is_none_or(|b| score > b.score) {
                best = Some(ScoredType {
                    semantic: pattern.semantic,
                    score,
                });
            }
        }
        best
    }

    pub fn score(&self, pattern: &PatternEntry, attrs: &AttributeBag) -> u8 {
        if is_excluded(pattern, attrs, self.use_labels) {
            return 0;
        }
        let keywords = || pattern.tokens.iter().chain(pattern.hints.iter());
        let any_in = |set: &TokenSet| keywords().any(|k| set.contains_keyword(k));

        let mut raw = 0;
        if keywords().any(|k| attrs.identifiers().has_exact(k)) {
            raw += IDENTIFIER_EXACT;
        } else if any_in(attrs.identifiers()) {
            raw += IDENTIFIER_PARTIAL;
        }
        if any_in(attrs.aria_tokens()) || (self.use_labels && any_in(attrs.label_tokens())) {
            raw += LABEL_MATCH;
        }
        if any_in(attrs.placeholder_tokens()) {
            raw += PLACEHOLDER_MATCH;
        }
        if any_in(attrs.context_tokens()) {
            raw += CONTEXT_MATCH;
        }
        ((raw * 100 + MAX_RAW / 2) / MAX_RAW) as u8
    }
}
