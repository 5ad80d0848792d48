use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::confidence::{DEFAULT_THRESHOLD, clamp_threshold};
use crate::classify::custom_rules::{CustomRule, CustomRuleSet};
use crate::error::ConfigError;
use crate::generate::locale::LocaleData;

pub const DEFAULT_CONFIG_PATH: &str = "form-autofill.yaml";

/// Upper bound for `minAge` / `maxAge`.
pub const AGE_LIMIT: u32 = 150;

// ============================================================================
// Fill configuration snapshot
// ============================================================================

/// Immutable settings for one fill pass.
///
/// Field names follow the settings store (`camelCase` on the wire). Every
/// option has a default so a partial file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FillConfig {
    pub locale: String,
    /// Comma-separated keywords; a field whose name, id, placeholder or
    /// label contains one is never filled.
    pub ignore_fields: String,
    pub ignore_hidden: bool,
    pub ignore_filled: bool,
    /// Hostname suffixes on which no pass runs.
    pub ignore_domains: Vec<String>,
    pub enable_label_matching: bool,
    #[serde(rename = "enableAIDetection")]
    pub enable_ai_detection: bool,
    pub ai_confidence_threshold: i64,
    pub custom_fields: Vec<CustomRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_password: Option<String>,
    pub min_age: u32,
    pub max_age: u32,
    pub enable_file_input: bool,
    pub disable_iframe_fill: bool,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
            ignore_fields: String::new(),
            ignore_hidden: true,
            ignore_filled: false,
            ignore_domains: Vec::new(),
            enable_label_matching: true,
            enable_ai_detection: true,
            ai_confidence_threshold: DEFAULT_THRESHOLD as i64,
            custom_fields: Vec::new(),
            default_password: None,
            min_age: 18,
            max_age: 65,
            enable_file_input: false,
            disable_iframe_fill: false,
        }
    }
}

impl FillConfig {
    /// Lowercased, trimmed ignore keywords.
    pub fn ignore_keywords(&self) -> Vec<String> {
        self.ignore_fields
            .split(',')
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect()
    }

    /// Threshold clamped into the accepted range.
    pub fn threshold(&self) -> u8 {
        clamp_threshold(self.ai_confidence_threshold)
    }

    /// Age bounds clamped to `AGE_LIMIT`, with `min <= max`.
    pub fn age_range(&self) -> (u32, u32) {
        let (min, max) = (self.min_age.min(AGE_LIMIT), self.max_age.min(AGE_LIMIT));
        if min <= max { (min, max) } else { (max, min) }
    }

    /// Suffix match of `hostname` against `ignoreDomains`, on label boundaries.
    pub fn is_domain_ignored(&self, hostname: &str) -> bool {
        let host = hostname.trim_end_matches('.').to_lowercase();
        self.ignore_domains.iter().any(|d| {
            let d = d.trim().trim_start_matches("*.").trim_start_matches('.').to_lowercase();
            !d.is_empty() && (host == d || host.ends_with(&format!(".{d}")))
        })
    }

    /// Every problem a pass would work around, without changing `self`.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.validate_options();
        let (_, rule_issues) = CustomRuleSet::compile(&self.custom_fields);
        issues.extend(rule_issues);
        issues
    }

    /// Scalar option checks; custom rules are reported by their compiler.
    pub fn validate_options(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if clamp_threshold(self.ai_confidence_threshold) as i64 != self.ai_confidence_threshold {
            issues.push(ConfigIssue::warning(
                "aiConfidenceThreshold",
                format!(
                    "{} is outside [30, 95], using {}",
                    self.ai_confidence_threshold,
                    self.threshold()
                ),
            ));
        }
        for (field, age) in [("minAge", self.min_age), ("maxAge", self.max_age)] {
            if age > AGE_LIMIT {
                issues.push(ConfigIssue::warning(
                    field,
                    format!("{age} is above {AGE_LIMIT}, using {AGE_LIMIT}"),
                ));
            }
        }
        if self.min_age > self.max_age {
            issues.push(ConfigIssue::warning(
                "minAge",
                format!("minAge {} exceeds maxAge {}, bounds swapped", self.min_age, self.max_age),
            ));
        }
        if LocaleData::for_code(&self.locale).is_none() {
            issues.push(ConfigIssue::warning(
                "locale",
                format!("unknown locale `{}`, falling back to en", self.locale),
            ));
        }
        if self.default_password.as_deref().is_some_and(str::is_empty) {
            issues.push(ConfigIssue::warning("defaultPassword", "empty, a generated password is used"));
        }
        issues
    }
}

// ============================================================================
// Validation issues
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigIssue {
    pub severity: Severity,
    /// Option path, e.g. `customFields[2]`.
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    pub fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn at(mut self, field: &str) -> Self {
        self.field = field.to_string();
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "[{level}] {}: {}", self.field, self.message)
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load a YAML (or JSON) config. A missing file yields the defaults.
pub fn load_config(path: Option<&str>) -> Result<FillConfig, ConfigError> {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = config_path, "config not found, using defaults");
            return Ok(FillConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: config_path.to_string(),
                source,
            });
        }
    };
    parse_config(&content).map_err(|source| ConfigError::Parse {
        path: config_path.to_string(),
        source,
    })
}

pub fn parse_config(content: &str) -> Result<FillConfig, serde_yaml::Error> {
    if content.trim().is_empty() {
        return Ok(FillConfig::default());
    }
    serde_yaml::from_str(content)
}
