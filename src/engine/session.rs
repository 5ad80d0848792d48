use std::time::Instant;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{info, warn};

use crate::classify::custom_rules::CustomRuleSet;
use crate::classify::resolver::{Classification, FieldClassifier};
use crate::config::settings::{ConfigIssue, FillConfig};
use crate::dom::host::{FormHost, NodeId};
use crate::engine::memory::{FillSession, MemoryManager};
use crate::field::attribute_cache::AttributeCache;
use crate::field::collector::collect_fields;
use crate::field::field_model::ControlKind;
use crate::fill::executor::FillExecutor;
use crate::generate::generators::ValueGenerator;
use crate::report::report_model::FillReport;
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceEvent;

/// Optional collaborators of a pass.
#[derive(Default)]
pub struct FillOptions<'a> {
    /// Fixed RNG seed for reproducible values.
    pub seed: Option<u64>,
    /// Reference date for ages and recent dates; the local date otherwise.
    pub today: Option<NaiveDate>,
    /// Cache owner; a throwaway cache is used when absent.
    pub memory: Option<&'a mut MemoryManager>,
    pub tracer: Option<&'a TraceLogger>,
}

// ============================================================================
// fill_form
// ============================================================================

/// Run one fill pass over the controls under `root`.
pub fn fill_form<H: FormHost + ?Sized>(
    host: &mut H,
    root: NodeId,
    config: &FillConfig,
    rng_seed: Option<u64>,
) -> FillReport {
    fill_form_with(
        host,
        root,
        config,
        FillOptions {
            seed: rng_seed,
            ..FillOptions::default()
        },
    )
}

pub fn fill_form_with<H: FormHost + ?Sized>(
    host: &mut H,
    root: NodeId,
    config: &FillConfig,
    options: FillOptions<'_>,
) -> FillReport {
    let started = Instant::now();
    let hostname = host.hostname();

    if let Some(name) = hostname.as_deref() {
        if config.is_domain_ignored(name) {
            info!(hostname = name, "domain on ignore list, pass skipped");
            return FillReport::domain_ignored(hostname);
        }
    }

    let (classifier, warnings) = prepare(config);
    let set = collect_fields(&*host, root, !config.disable_iframe_fill);
    let today = options.today.unwrap_or_else(|| Local::now().date_naive());
    let mut generator = ValueGenerator::new(config, options.seed, today);
    let executor = FillExecutor::new(config, &classifier);

    let outcomes = match options.memory {
        Some(memory) => {
            let mut session = FillSession::begin(memory);
            let outcomes = executor.fill_all(host, &set, session.cache(), &mut generator);
            session.finish(Instant::now());
            outcomes
        }
        None => {
            let mut cache = AttributeCache::new();
            executor.fill_all(host, &set, &mut cache, &mut generator)
        }
    };

    if let Some(tracer) = options.tracer {
        for outcome in &outcomes {
            tracer.log(&TraceEvent::for_outcome(outcome));
        }
    }

    let report = FillReport::from_outcomes(hostname, outcomes)
        .with_warnings(warnings)
        .with_skipped_frames(set.skipped_frames)
        .with_duration(started.elapsed().as_millis());

    info!(
        filled = report.filled,
        skipped = report.skipped,
        total = report.total,
        errors = report.errors.len(),
        "fill pass complete"
    );
    report
}

fn prepare(config: &FillConfig) -> (FieldClassifier, Vec<ConfigIssue>) {
    let mut warnings = config.validate_options();
    for issue in &warnings {
        warn!(field = %issue.field, "{}", issue.message);
    }
    let (rules, rule_issues) = CustomRuleSet::compile(&config.custom_fields);
    warnings.extend(rule_issues);
    (FieldClassifier::new(config, rules), warnings)
}

// ============================================================================
// classify_form
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedField {
    pub path: String,
    pub kind: ControlKind,
    #[serde(flatten)]
    pub classification: Classification,
}

/// Classification of every collected field, without writing anything.
pub fn classify_form<H: FormHost + ?Sized>(
    host: &H,
    root: NodeId,
    config: &FillConfig,
) -> (Vec<ClassifiedField>, Vec<ConfigIssue>) {
    let (classifier, warnings) = prepare(config);
    let set = collect_fields(host, root, !config.disable_iframe_fill);
    let mut cache = AttributeCache::new();

    let fields = set
        .fields
        .iter()
        .map(|field| {
            let attrs = cache.get_attributes(host, field);
            let (classification, _) = classifier.resolve(host, field, attrs);
            ClassifiedField {
                path: field.path.clone(),
                kind: field.control_kind,
                classification,
            }
        })
        .collect();
    (fields, warnings)
}
