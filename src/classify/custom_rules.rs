use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::settings::ConfigIssue;
use crate::dom::host::{FormHost, NodeId};
use crate::dom::selector::{SelectorList, looks_like_selector, parse_selector};
use crate::field::field_model::{AttributeBag, FieldDescriptor};
use crate::generate::generators::GeneratorRef;
use crate::generate::regex_synth::RegexTemplate;

// ============================================================================
// Configuration model
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStrategy {
    /// Comma-separated values, one sampled uniformly.
    List,
    /// Pattern expanded into a matching literal.
    Regex,
    /// Dotted generator path such as `person.firstName`.
    #[serde(alias = "generator-reference")]
    Generator,
}

impl GenerationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStrategy::List => "list",
            GenerationStrategy::Regex => "regex",
            GenerationStrategy::Generator => "generator",
        }
    }
}

/// A user-authored override, as written in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRule {
    pub matcher: String,
    pub strategy: GenerationStrategy,
    pub payload: String,
}

impl CustomRule {
    pub fn new(matcher: &str, strategy: GenerationStrategy, payload: &str) -> Self {
        Self {
            matcher: matcher.to_string(),
            strategy,
            payload: payload.to_string(),
        }
    }
}

// ============================================================================
// Compiled rules
// ============================================================================

#[derive(Debug, Clone)]
pub enum RuleMatcher {
    Selector(SelectorList),
    /// Anchored, case-insensitive glob over name, id and class.
    Wildcard(Regex),
    /// Lowercased substring over name, id, class and label.
    Literal(String),
}

impl RuleMatcher {
    pub fn compile(matcher: &str) -> Result<Self, String> {
        let matcher = matcher.trim();
        if matcher.is_empty() {
            return Err("matcher is empty".to_string());
        }
        if looks_like_selector(matcher) {
            return parse_selector(matcher)
                .map(RuleMatcher::Selector)
                .map_err(|e| e.to_string());
        }
        if matcher.contains(['*', '?']) {
            return glob_regex(matcher)
                .map(RuleMatcher::Wildcard)
                .map_err(|e| e.to_string());
        }
        Ok(RuleMatcher::Literal(matcher.to_lowercase()))
    }

    pub fn matches<H: FormHost + ?Sized>(
        &self,
        host: &H,
        node: NodeId,
        field: &FieldDescriptor,
        attrs: &AttributeBag,
    ) -> bool {
        match self {
            RuleMatcher::Selector(selector) => selector.matches(host, node),
            RuleMatcher::Wildcard(glob) => {
                let mut candidates = vec![attrs.name.as_str(), attrs.id.as_str(), attrs.class_name.as_str()];
                candidates.extend(field.class_list.iter().map(String::as_str));
                candidates.iter().any(|c| !c.is_empty() && glob.is_match(c))
            }
            RuleMatcher::Literal(needle) => {
                let label = attrs.label.as_deref().unwrap_or("");
                [attrs.name.as_str(), attrs.id.as_str(), attrs.class_name.as_str(), label]
                    .iter()
                    .any(|hay| hay.contains(needle.as_str()))
            }
        }
    }
}

fn glob_regex(glob: &str) -> Result<Regex, regex::Error> {
    let mut source = String::from("^");
    for c in glob.chars() {
        match c {
            '*' => source.push_str(".*"),
            '?' => source.push('.'),
            other => source.push_str(&regex::escape(&other.to_string())),
        }
    }
    source.push('$');
    RegexBuilder::new(&source).case_insensitive(true).build()
}

/// Ready-to-use payload of a rule.
#[derive(Debug, Clone)]
pub enum CompiledStrategy {
    List(Vec<String>),
    Regex(RegexTemplate),
    Generator(GeneratorRef),
}

#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// Position in the configured list.
    pub index: usize,
    pub matcher: RuleMatcher,
    pub strategy: CompiledStrategy,
    pub source: CustomRule,
}

/// Rules that survived validation, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct CustomRuleSet {
    rules: Vec<CompiledRule>,
}

impl CustomRuleSet {
    /// Compile every rule; rejected rules are dropped and reported.
    pub fn compile(rules: &[CustomRule]) -> (Self, Vec<ConfigIssue>) {
        let mut compiled = Vec::new();
        let mut issues = Vec::new();

        for (index, rule) in rules.iter().enumerate() {
            let field = format!("customFields[{index}]");
            let matcher = match RuleMatcher::compile(&rule.matcher) {
                Ok(m) => m,
                Err(e) => {
                    issues.push(ConfigIssue::error(&field, format!("invalid matcher `{}`: {e}", rule.matcher)));
                    continue;
                }
            };
            let strategy = match compile_strategy(rule) {
                Ok(s) => s,
                Err(issue) => {
                    issues.push(issue.at(&field));
                    continue;
                }
            };
            compiled.push(CompiledRule {
                index,
                matcher,
                strategy,
                source: rule.clone(),
            });
        }

        for issue in &issues {
            warn!(field = %issue.field, "{}", issue.message);
        }
        (Self { rules: compiled }, issues)
    }

    /// First rule, in declaration order, whose matcher accepts the field.
    pub fn find_match<H: FormHost + ?Sized>(
        &self,
        host: &H,
        field: &FieldDescriptor,
        attrs: &AttributeBag,
    ) -> Option<&CompiledRule> {
        self.rules
            .iter()
            .find(|r| r.matcher.matches(host, field.node, field, attrs))
    }

    pub fn get(&self, index: usize) -> Option<&CompiledRule> {
        self.rules.iter().find(|r| r.index == index)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn compile_strategy(rule: &CustomRule) -> Result<CompiledStrategy, ConfigIssue> {
    match rule.strategy {
        GenerationStrategy::List => {
            let items = split_list(&rule.payload);
            if items.is_empty() {
                return Err(ConfigIssue::error("", "list payload has no values"));
            }
            Ok(CompiledStrategy::List(items))
        }
        GenerationStrategy::Regex => RegexTemplate::compile(&rule.payload)
            .map(CompiledStrategy::Regex)
            .map_err(|e| {
                let message = format!("regex `{}` rejected: {e}", rule.payload);
                if e.is_unsafe() {
                    ConfigIssue::warning("", message)
                } else {
                    ConfigIssue::error("", message)
                }
            }),
        GenerationStrategy::Generator => GeneratorRef::parse(&rule.payload)
            .map(CompiledStrategy::Generator)
            .map_err(|e| ConfigIssue::error("", e.to_string())),
    }
}

pub fn split_list(payload: &str) -> Vec<String> {
    payload
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_is_anchored() {
        let re = glob_regex("user_*").unwrap();
        assert!(re.is_match("user_email"));
        assert!(re.is_match("USER_x"));
        assert!(!re.is_match("my_user_email"));
        let re = glob_regex("*.id?").unwrap();
        assert!(re.is_match("a.id7"));
        assert!(!re.is_match("a_id7"));
    }

    #[test]
    fn matcher_kind_follows_first_character() {
        assert!(matches!(RuleMatcher::compile("#email").unwrap(), RuleMatcher::Selector(_)));
        assert!(matches!(RuleMatcher::compile("[name=x]").unwrap(), RuleMatcher::Selector(_)));
        assert!(matches!(RuleMatcher::compile("*zip*").unwrap(), RuleMatcher::Wildcard(_)));
        assert!(matches!(RuleMatcher::compile("Coupon").unwrap(), RuleMatcher::Literal(ref s) if s == "coupon"));
        assert!(RuleMatcher::compile("  ").is_err());
    }

    #[test]
    fn list_payload_splits_and_trims() {
        assert_eq!(split_list(" a, b ,,c "), vec!["a", "b", "c"]);
        assert!(split_list(" , ").is_empty());
    }
}
