use tracing::{debug, warn};

use crate::classify::custom_rules::{CompiledRule, CompiledStrategy};
use crate::classify::patterns::SemanticType;
use crate::classify::resolver::{Classification, ClassificationSource, FieldClassifier};
use crate::config::settings::FillConfig;
use crate::dom::events::{EventKind, SELECT_SEQUENCE, TEXT_SEQUENCE, TOGGLE_SEQUENCE};
use crate::dom::host::{FormHost, NodeId};
use crate::error::{ConstraintViolation, DomError, GenerateError};
use crate::field::attribute_cache::AttributeCache;
use crate::field::collector::FieldSet;
use crate::field::field_model::{AttributeBag, ControlKind, FieldDescriptor, Group};
use crate::field::normalize::text_fingerprint;
use crate::generate::constraints::{conform, render_number};
use crate::generate::generators::ValueGenerator;
use crate::generate::regex_synth::RegexTemplate;
use crate::generate::value::GeneratedValue;
use crate::report::report_model::{FieldOutcome, SkipReason};

/// Set on every element the engine wrote; the value is the classification source.
pub const MARKER_ATTR: &str = "data-autofill";
/// SHA-1 of the value written, so an undo can tell whether the user changed it since.
pub const MARKER_HASH_ATTR: &str = "data-autofill-hash";

// ============================================================================
// Eligibility
// ============================================================================

/// `Eligible` unless one of the skip conditions holds.
pub fn check_eligibility<H: FormHost + ?Sized>(
    host: &H,
    field: &FieldDescriptor,
    attrs: &AttributeBag,
    config: &FillConfig,
    ignore_keywords: &[String],
) -> Result<(), SkipReason> {
    if field.input_type == "hidden" {
        return Err(SkipReason::HiddenInput);
    }
    if field.disabled {
        return Err(SkipReason::Disabled);
    }
    if field.readonly {
        return Err(SkipReason::Readonly);
    }
    if config.ignore_hidden && !field.visible {
        return Err(SkipReason::NotVisible);
    }
    if field.control_kind == ControlKind::File && !config.enable_file_input {
        return Err(SkipReason::FileInputDisabled);
    }
    if let Some(keyword) = matching_keyword(attrs, ignore_keywords) {
        return Err(SkipReason::IgnoredKeyword(keyword.to_string()));
    }
    if config.ignore_filled && is_filled(host, field) {
        return Err(SkipReason::AlreadyFilled);
    }
    Ok(())
}

fn matching_keyword<'k>(attrs: &AttributeBag, keywords: &'k [String]) -> Option<&'k str> {
    let label = attrs.label.as_deref().unwrap_or("");
    let haystacks = [
        attrs.name.as_str(),
        attrs.id.as_str(),
        attrs.placeholder.as_str(),
        attrs.aria_label.as_str(),
        label,
    ];
    keywords
        .iter()
        .find(|k| haystacks.iter().any(|h| h.contains(k.as_str())))
        .map(String::as_str)
}

fn is_filled<H: FormHost + ?Sized>(host: &H, field: &FieldDescriptor) -> bool {
    match field.control_kind {
        ControlKind::Checkbox | ControlKind::Radio => host.checked(field.node).unwrap_or(false),
        ControlKind::Select => {
            let options = host.select_options(field.node);
            host.selected_index(field.node)
                .ok()
                .flatten()
                .and_then(|i| options.get(i).copied())
                .is_some_and(|o| host.has_attr(o, "selected") && !host.option_value(o).trim().is_empty())
        }
        ControlKind::File => false,
        ControlKind::TextInput | ControlKind::Textarea => !field.existing_value.trim().is_empty(),
    }
}

// ============================================================================
// Executor
// ============================================================================

/// Applies generated values to the controls of one pass.
pub struct FillExecutor<'a> {
    config: &'a FillConfig,
    classifier: &'a FieldClassifier,
    ignore_keywords: Vec<String>,
}

impl<'a> FillExecutor<'a> {
    pub fn new(config: &'a FillConfig, classifier: &'a FieldClassifier) -> Self {
        Self {
            config,
            classifier,
            ignore_keywords: config.ignore_keywords(),
        }
    }

    /// Fill every field in document order. Radio groups are handled as a
    /// unit when their first member is reached. Never fails as a whole.
    pub fn fill_all<H: FormHost + ?Sized>(
        &self,
        host: &mut H,
        set: &FieldSet,
        cache: &mut AttributeCache,
        generator: &mut ValueGenerator,
    ) -> Vec<FieldOutcome> {
        let mut outcomes: Vec<Option<FieldOutcome>> = vec![None; set.fields.len()];

        for (index, field) in set.fields.iter().enumerate() {
            if outcomes[index].is_some() {
                continue;
            }
            match set.group_of(index).filter(|g| g.is_exclusive()) {
                Some(group) => {
                    for (member, outcome) in self.fill_radio_group(host, set, group, cache, generator) {
                        outcomes[member] = Some(outcome);
                    }
                }
                None => outcomes[index] = Some(self.fill_field(host, field, cache, generator)),
            }
        }

        outcomes.into_iter().flatten().collect()
    }

    pub fn fill_field<H: FormHost + ?Sized>(
        &self,
        host: &mut H,
        field: &FieldDescriptor,
        cache: &mut AttributeCache,
        generator: &mut ValueGenerator,
    ) -> FieldOutcome {
        let attrs = cache.get_attributes(&*host, field).clone();
        if let Err(reason) = check_eligibility(&*host, field, &attrs, self.config, &self.ignore_keywords) {
            debug!(field = field.display_name(), %reason, "skipped");
            return FieldOutcome::skipped(field, reason);
        }

        let (classification, rule) = self.classifier.resolve(&*host, field, &attrs);
        debug!(
            field = %field.path,
            semantic = %classification.semantic,
            source = classification.source.as_str(),
            confidence = ?classification.confidence,
            "classified"
        );

        let mut note = None;
        let value = match self.generate(generator, field, &classification, rule) {
            Ok((value, fallback_note)) => {
                note = fallback_note;
                value
            }
            Err(e) => {
                warn!(field = %field.path, error = %e, "value generation failed");
                return FieldOutcome::skipped(field, SkipReason::Generation(e.to_string())).classified(&classification);
            }
        };

        let written = match field.control_kind {
            ControlKind::TextInput | ControlKind::Textarea => self.write_text(host, field, value, generator),
            ControlKind::Select => {
                let wanted = (classification.semantic != SemanticType::Text).then(|| value.as_text());
                write_select(host, field, wanted.as_deref(), generator)
            }
            ControlKind::Checkbox => {
                let checked = match value {
                    GeneratedValue::Boolean(b) => b,
                    _ => true,
                };
                write_toggle(host, field.node, checked).map_err(host_error)
            }
            ControlKind::Radio => write_toggle(host, field.node, true).map_err(host_error),
            ControlKind::File => write_file(host, field.node, value),
        };

        let outcome = match written.and_then(|text| {
            mark(host, field.node, classification.source, &text)
                .map(|_| text)
                .map_err(host_error)
        }) {
            Ok(text) => FieldOutcome::filled(field, &classification, text),
            Err(reason) => {
                warn!(field = %field.path, %reason, "fill failed");
                FieldOutcome::skipped(field, reason).classified(&classification)
            }
        };
        match note {
            Some(n) => outcome.with_note(n),
            None => outcome,
        }
    }

    /// Check exactly one eligible member, chosen uniformly at random.
    pub fn fill_radio_group<H: FormHost + ?Sized>(
        &self,
        host: &mut H,
        set: &FieldSet,
        group: &Group,
        cache: &mut AttributeCache,
        generator: &mut ValueGenerator,
    ) -> Vec<(usize, FieldOutcome)> {
        let mut outcomes = Vec::new();
        let mut eligible: Vec<(usize, AttributeBag)> = Vec::new();

        for &member in &group.members {
            let field = &set.fields[member];
            let attrs = cache.get_attributes(&*host, field).clone();
            let mut config = self.config.clone();
            // Filled-ness is a property of the whole group.
            config.ignore_filled = false;
            match check_eligibility(&*host, field, &attrs, &config, &self.ignore_keywords) {
                Ok(()) => eligible.push((member, attrs)),
                Err(reason) => outcomes.push((member, FieldOutcome::skipped(field, reason))),
            }
        }
        if eligible.is_empty() {
            return outcomes;
        }

        let group_checked = group
            .members
            .iter()
            .any(|m| host.checked(set.fields[*m].node).unwrap_or(false));
        if self.config.ignore_filled && group_checked {
            for (member, _) in eligible {
                outcomes.push((member, FieldOutcome::skipped(&set.fields[member], SkipReason::AlreadyFilled)));
            }
            return outcomes;
        }

        let (first, first_attrs) = &eligible[0];
        let (classification, rule) = self.classifier.resolve(&*host, &set.fields[*first], first_attrs);

        let preferred = rule
            .and_then(|r| generator.for_rule(&r.strategy, &set.fields[*first]).ok())
            .and_then(|v| {
                let wanted = v.as_text().to_lowercase();
                eligible.iter().position(|(m, attrs)| {
                    let field = &set.fields[*m];
                    host.attr(field.node, "value").is_some_and(|v| v.to_lowercase() == wanted)
                        || attrs.label.as_deref() == Some(wanted.as_str())
                })
            });
        let start = preferred
            .or_else(|| generator.pick_index(eligible.len()))
            .unwrap_or(0);

        // Try the chosen member first, then the rest in order if the host refuses.
        let order: Vec<usize> = (0..eligible.len()).map(|i| (start + i) % eligible.len()).collect();
        let mut chosen = None;
        for pos in order {
            let (member, _) = &eligible[pos];
            let field = &set.fields[*member];
            let value = host.attr(field.node, "value").unwrap_or("on").to_string();
            let result = write_toggle(host, field.node, true)
                .and_then(|_| mark(host, field.node, classification.source, &value));
            match result {
                Ok(()) => {
                    debug!(group = %group.name, field = %field.path, "radio chosen");
                    outcomes.push((*member, FieldOutcome::filled(field, &classification, value)));
                    chosen = Some(*member);
                    break;
                }
                Err(e) => {
                    warn!(group = %group.name, field = %field.path, error = %e, "radio write failed");
                    outcomes.push((*member, FieldOutcome::skipped(field, host_error(e)).classified(&classification)));
                }
            }
        }

        for (member, _) in &eligible {
            let already = outcomes.iter().any(|(m, _)| m == member);
            if !already && Some(*member) != chosen {
                outcomes.push((
                    *member,
                    FieldOutcome::skipped(&set.fields[*member], SkipReason::NotChosen).classified(&classification),
                ));
            }
        }
        outcomes
    }

    /// Generated value plus an optional note when a fallback was used.
    fn generate(
        &self,
        generator: &mut ValueGenerator,
        field: &FieldDescriptor,
        classification: &Classification,
        rule: Option<&CompiledRule>,
    ) -> Result<(GeneratedValue, Option<String>), GenerateError> {
        let Some(rule) = rule else {
            return generator.for_semantic(classification.semantic, field).map(|v| (v, None));
        };
        match generator.for_rule(&rule.strategy, field) {
            Ok(v) => Ok((v, None)),
            Err(e @ GenerateError::Unsatisfiable(_)) if matches!(rule.strategy, CompiledStrategy::Regex(_)) => {
                warn!(field = %field.path, error = %e, "regex rule fell back to default text");
                let v = generator.for_semantic(SemanticType::Text, field)?;
                Ok((v, Some(format!("fallback: {e}"))))
            }
            Err(e) => Err(e),
        }
    }

    fn write_text<H: FormHost + ?Sized>(
        &self,
        host: &mut H,
        field: &FieldDescriptor,
        value: GeneratedValue,
        generator: &mut ValueGenerator,
    ) -> Result<String, SkipReason> {
        let value = match conform(value, &field.input_type, &field.constraints) {
            Ok(v) => v,
            Err(ConstraintViolation::PatternMismatch { pattern }) => {
                // Fall back to a value synthesized from the control's own pattern.
                let template = RegexTemplate::compile(&pattern)
                    .map_err(|e| SkipReason::Constraint(format!("pattern `{pattern}` unusable: {e}")))?;
                let synthesized = template
                    .synthesize(generator.rng())
                    .map_err(|e| SkipReason::Constraint(e.to_string()))?;
                conform(GeneratedValue::Text(synthesized), &field.input_type, &field.constraints)
                    .map_err(|e| SkipReason::Constraint(e.to_string()))?
            }
            Err(e) => return Err(SkipReason::Constraint(e.to_string())),
        };

        let text = match value {
            GeneratedValue::Numeric(n) => {
                render_number(n, &field.constraints).map_err(|e| SkipReason::Constraint(e.to_string()))?
            }
            other => other.as_text(),
        };
        host.set_value(field.node, &text).map_err(host_error)?;
        dispatch_all(host, field.node, TEXT_SEQUENCE).map_err(host_error)?;
        Ok(text)
    }
}

fn write_select<H: FormHost + ?Sized>(
    host: &mut H,
    field: &FieldDescriptor,
    wanted: Option<&str>,
    generator: &mut ValueGenerator,
) -> Result<String, SkipReason> {
    let options = host.select_options(field.node);
    let eligible: Vec<(usize, NodeId)> = options
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, o)| {
            !host.option_value(*o).trim().is_empty()
                && !host.has_attr(*o, "disabled")
                && !host
                    .parent(*o)
                    .is_some_and(|p| host.tag_name(p) == Some("optgroup") && host.has_attr(p, "disabled"))
        })
        .collect();
    if eligible.is_empty() {
        return Err(SkipReason::NoOptions);
    }

    let matched = wanted.map(str::trim).filter(|w| !w.is_empty()).and_then(|w| {
        eligible.iter().position(|(_, o)| {
            host.option_value(*o).eq_ignore_ascii_case(w) || host.text_content(*o).trim().eq_ignore_ascii_case(w)
        })
    });
    let pick = matched
        .or_else(|| generator.pick_index(eligible.len()))
        .ok_or(SkipReason::NoOptions)?;
    let (index, option) = eligible[pick];
    let value = host.option_value(option);

    host.set_selected_index(field.node, index).map_err(host_error)?;
    dispatch_all(host, field.node, SELECT_SEQUENCE).map_err(host_error)?;
    Ok(value)
}

/// Native checked write followed by focus, input, change, blur. No click.
fn write_toggle<H: FormHost + ?Sized>(host: &mut H, node: NodeId, checked: bool) -> Result<String, DomError> {
    host.set_checked_native(node, checked)?;
    dispatch_all(host, node, TOGGLE_SEQUENCE)?;
    Ok(checked.to_string())
}

fn write_file<H: FormHost + ?Sized>(host: &mut H, node: NodeId, value: GeneratedValue) -> Result<String, SkipReason> {
    let GeneratedValue::File(blob) = value else {
        return Err(SkipReason::Generation("file input needs a file value".into()));
    };
    host.set_files(node, &blob).map_err(host_error)?;
    dispatch_all(host, node, TEXT_SEQUENCE).map_err(host_error)?;
    Ok(blob.name)
}

fn dispatch_all<H: FormHost + ?Sized>(host: &mut H, node: NodeId, events: &[EventKind]) -> Result<(), DomError> {
    for kind in events {
        host.dispatch_event(node, *kind)?;
    }
    Ok(())
}

fn mark<H: FormHost + ?Sized>(
    host: &mut H,
    node: NodeId,
    source: ClassificationSource,
    written: &str,
) -> Result<(), DomError> {
    host.set_attr(node, MARKER_ATTR, source.as_str())?;
    host.set_attr(node, MARKER_HASH_ATTR, &text_fingerprint(written))
}

fn host_error(e: DomError) -> SkipReason {
    SkipReason::Host(e.to_string())
}
