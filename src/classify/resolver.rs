use serde::Serialize;
use tracing::{debug, trace};

use crate::classify::confidence::ConfidenceClassifier;
use crate::classify::custom_rules::{CompiledRule, CustomRuleSet};
use crate::classify::patterns::SemanticType;
use crate::classify::rule_classifier::RuleClassifier;
use crate::config::settings::FillConfig;
use crate::dom::host::FormHost;
use crate::field::field_model::{AttributeBag, FieldDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassificationSource {
    CustomRule,
    RuleBased,
    ConfidenceFallback,
    Default,
}

impl ClassificationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationSource::CustomRule => "custom-rule",
            ClassificationSource::RuleBased => "rule-based",
            ClassificationSource::ConfidenceFallback => "confidence-fallback",
            ClassificationSource::Default => "default",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub semantic: SemanticType,
    pub source: ClassificationSource,
    /// Only set for confidence-fallback results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,
    /// Configured position of the custom rule that matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_index: Option<usize>,
}

impl Classification {
    fn of(semantic: SemanticType, source: ClassificationSource) -> Self {
        Self {
            semantic,
            source,
            confidence: None,
            rule_index: None,
        }
    }
}

/// Custom rules, then the rule walk, then the confidence fallback.
#[derive(Debug, Clone)]
pub struct FieldClassifier {
    rules: CustomRuleSet,
    rule_based: RuleClassifier,
    fallback: Option<ConfidenceClassifier>,
    threshold: u8,
}

impl FieldClassifier {
    pub fn new(config: &FillConfig, rules: CustomRuleSet) -> Self {
        let use_labels = config.enable_label_matching;
        Self {
            rules,
            rule_based: RuleClassifier::new(use_labels),
            fallback: config
                .enable_ai_detection
                .then(|| ConfidenceClassifier::new(use_labels)),
            threshold: config.threshold(),
        }
    }

    pub fn rules(&self) -> &CustomRuleSet {
        &self.rules
    }

    pub fn resolve<H: FormHost + ?Sized>(
        &self,
        host: &H,
        field: &FieldDescriptor,
        attrs: &AttributeBag,
    ) -> (Classification, Option<&CompiledRule>) {
        if let Some(rule) = self.rules.find_match(host, field, attrs) {
            debug!(field = %field.path, rule = rule.index, matcher = %rule.source.matcher, "custom rule matched");
            let classification = Classification {
                rule_index: Some(rule.index),
                ..Classification::of(SemanticType::Custom, ClassificationSource::CustomRule)
            };
            return (classification, Some(rule));
        }
        (self.classify_attributes(attrs), None)
    }

    /// Built-in classifiers only.
    pub fn classify_attributes(&self, attrs: &AttributeBag) -> Classification {
        if let Some(m) = self.rule_based.find(attrs).filter(|m| m.semantic != SemanticType::Text) {
            trace!(semantic = %m.semantic, tier = m.tier.as_str(), entry = m.entry, "pattern rule matched");
            return Classification::of(m.semantic, ClassificationSource::RuleBased);
        }

        if let Some(scored) = self
            .fallback
            .and_then(|c| c.classify_with_confidence(attrs, self.threshold))
        {
            return Classification {
                confidence: Some(scored.score),
                ..Classification::of(scored.semantic, ClassificationSource::ConfidenceFallback)
            };
        }
        Classification::of(SemanticType::Text, ClassificationSource::Default)
    }
}
