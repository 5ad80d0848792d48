pub mod confidence;
pub mod custom_rules;
pub mod patterns;
pub mod resolver;
pub mod rule_classifier;
