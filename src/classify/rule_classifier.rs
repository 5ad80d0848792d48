use crate::classify::patterns::{PATTERN_LIBRARY, PatternEntry, SemanticType};
use crate::field::field_model::AttributeBag;

/// Which attribute tier produced a rule-based match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    InputType,
    Autocomplete,
    Identifier,
    Descriptive,
}

impl MatchTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchTier::InputType => "input-type",
            MatchTier::Autocomplete => "autocomplete",
            MatchTier::Identifier => "identifier",
            MatchTier::Descriptive => "descriptive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch {
    pub semantic: SemanticType,
    pub tier: MatchTier,
    /// Row of the pattern library that matched.
    pub entry: usize,
}

/// Ordered, first-match-wins walk over the pattern library.
///
/// Tiers are tried in order; inside a tier the library is walked top to
/// bottom. A row whose exclusion keywords appear in the field is skipped in
/// every tier.
#[derive(Debug, Clone, Copy)]
pub struct RuleClassifier {
    use_labels: bool,
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self { use_labels: true }
    }
}

impl RuleClassifier {
    pub fn new(use_labels: bool) -> Self {
        Self { use_labels }
    }

    /// Semantic type for `attrs`, or `Text` when nothing matches.
    pub fn classify(&self, attrs: &AttributeBag) -> SemanticType {
        self.find(attrs)
            .map(|m| m.semantic)
            .unwrap_or(SemanticType::Text)
    }

    pub fn find(&self, attrs: &AttributeBag) -> Option<RuleMatch> {
        let tiers = [
            MatchTier::InputType,
            MatchTier::Autocomplete,
            MatchTier::Identifier,
            MatchTier::Descriptive,
        ];
        for tier in tiers {
            for (entry, pattern) in PATTERN_LIBRARY.iter().enumerate() {
                if self.matches_tier(pattern, attrs, tier) && !is_excluded(pattern, attrs, self.use_labels) {
                    return Some(RuleMatch {
                        semantic: pattern.semantic,
                        tier,
                        entry,
                    });
                }
            }
        }
        None
    }

    fn matches_tier(&self, pattern: &PatternEntry, attrs: &AttributeBag, tier: MatchTier) -> bool {
        match tier {
            MatchTier::InputType => pattern.input_types.contains(&attrs.input_type.as_str()),
            MatchTier::Autocomplete => attrs
                .autocomplete_token()
                .is_some_and(|t| pattern.autocomplete.contains(&t)),
            MatchTier::Identifier => pattern
                .tokens
                .iter()
                .any(|t| attrs.identifiers().contains_keyword(t)),
            MatchTier::Descriptive => pattern.tokens.iter().any(|t| {
                attrs.placeholder_tokens().contains_keyword(t)
                    || attrs.aria_tokens().contains_keyword(t)
                    || (self.use_labels && attrs.label_tokens().contains_keyword(t))
            }),
        }
    }
}

/// True when any exclusion keyword shows up in the identifying attributes.
pub(crate) fn is_excluded(pattern: &PatternEntry, attrs: &AttributeBag, use_labels: bool) -> bool {
    pattern.excludes.iter().any(|x| {
        attrs.identifiers().contains_keyword(x)
            || attrs.placeholder_tokens().contains_keyword(x)
            || attrs.aria_tokens().contains_keyword(x)
            || (use_labels && attrs.label_tokens().contains_keyword(x))
    })
}
