//! Validation engine: parse, run the rule set, aggregate.
//!
//! Each call walks `Received -> Parsed -> RulesRunning -> Aggregated -> Done`
//! and always ends with a complete report.
//!
//! # Fault containment
//!
//! - Empty or unparsable input: one `Error` finding from the adapter.
//! - Rule returns `Err`: one `Warning` naming the rule, other rules continue.
//! - Rule panics: caught via `std::panic::catch_unwind`, same as above.
//! - Findings above a rule's severity cap are lowered to the cap.
//!
//! With `parallel` enabled the rules run on rayon; indexed collection keeps
//! the documented rule order, so reports are identical either way.

use crate::error::ConfigError;
use crate::models::report::ValidationReport;
use crate::models::structure::TestStructure;
use crate::models::Finding;
use crate::parse::parse_artifact;
use crate::rules::{self, BuiltinRule, Rule};
use rayon::prelude::*;
use regex::Regex;
use std::any::Any;
use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Engine options. Built by the caller; the engine reads no environment.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub parallel: bool,
    /// Built-in rule ids to skip.
    pub disabled: BTreeSet<String>,
    /// Fixture names declared elsewhere (e.g. `conftest.py`).
    pub known_fixtures: BTreeSet<String>,
    /// Extra regexes marking selectors as fragile.
    pub fragile_patterns: Vec<String>,
    /// Minimum words in a test name after `test_`.
    pub min_name_words: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            parallel: false,
            disabled: BTreeSet::new(),
            known_fixtures: BTreeSet::new(),
            fragile_patterns: Vec::new(),
            min_name_words: 2,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Received,
    Parsed,
    RulesRunning,
    Aggregated,
    Done,
}

fn enter(phase: Phase) {
    debug!(?phase, "validation phase");
}

pub struct Validator {
    rules: Vec<Box<dyn Rule>>,
    parallel: bool,
}

impl Default for Validator {
    fn default() -> Self {
        Validator {
            rules: rules::default_rules()
                .into_iter()
                .map(|r| Box::new(r) as Box<dyn Rule>)
                .collect(),
            parallel: false,
        }
    }
}

impl Validator {
    /// Build the built-in rule set from `config`, in documented order.
    pub fn new(config: &EngineConfig) -> Result<Self, ConfigError> {
        if let Some(unknown) = config.disabled.iter().find(|id| !rules::is_builtin(id)) {
            return Err(ConfigError::UnknownRule(unknown.clone()));
        }
        let extra = config
            .fragile_patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|source| ConfigError::Pattern {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut extra = Some(extra);
        let rules = rules::default_rules()
            .into_iter()
            .map(|r| match r {
                BuiltinRule::FixtureConsistency { .. } => BuiltinRule::FixtureConsistency {
                    known: config.known_fixtures.clone(),
                },
                BuiltinRule::SelectorRobustness { .. } => BuiltinRule::SelectorRobustness {
                    extra: extra.take().unwrap_or_default(),
                },
                BuiltinRule::NamingReadability { .. } => BuiltinRule::NamingReadability {
                    min_words: config.min_name_words,
                },
                other => other,
            })
            .filter(|r| !config.disabled.contains(r.id()))
            .map(|r| Box::new(r) as Box<dyn Rule>)
            .collect();
        Ok(Validator {
            rules,
            parallel: config.parallel,
        })
    }

    /// Append a rule after the built-in set.
    pub fn with_rule(mut self, rule: Box<dyn Rule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Enabled rules in evaluation order.
    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn rule_ids(&self) -> Vec<&str> {
        self.rules().map(|r| r.id()).collect()
    }

    /// Validate artifact text. Never panics; always returns a full report.
    pub fn validate(&self, artifact: &str) -> ValidationReport {
        enter(Phase::Received);
        let parsed = parse_artifact(artifact);
        enter(Phase::Parsed);

        enter(Phase::RulesRunning);
        let structure = &parsed.structure;
        let per_rule: Vec<Vec<Finding>> = if self.parallel {
            self.rules
                .par_iter()
                .map(|r| run_rule(r.as_ref(), structure))
                .collect()
        } else {
            self.rules
                .iter()
                .map(|r| run_rule(r.as_ref(), structure))
                .collect()
        };

        let mut findings = parsed.findings;
        findings.extend(per_rule.into_iter().flatten());
        let report = ValidationReport::from_findings(findings);
        enter(Phase::Aggregated);
        debug!(
            valid = report.is_valid(),
            findings = report.findings().len(),
            "validation aggregated"
        );
        enter(Phase::Done);
        report
    }

    /// Validate raw bytes; invalid UTF-8 is replaced rather than rejected.
    pub fn validate_bytes(&self, artifact: &[u8]) -> ValidationReport {
        self.validate(&String::from_utf8_lossy(artifact))
    }
}

/// Validate with the default built-in rule set.
pub fn validate(artifact: &str) -> ValidationReport {
    Validator::default().validate(artifact)
}

fn run_rule(rule: &dyn Rule, structure: &TestStructure) -> Vec<Finding> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| rule.evaluate(structure)));
    let cap = rule.severity_cap();
    match outcome {
        Ok(Ok(found)) => {
            debug!(rule = rule.id(), findings = found.len(), "rule evaluated");
            found
                .into_iter()
                .map(|mut f| {
                    f.severity = f.severity.min(cap);
                    f
                })
                .collect()
        }
        Ok(Err(e)) => vec![rule_fault(rule.id(), &e.to_string())],
        Err(payload) => vec![rule_fault(rule.id(), &panic_message(payload.as_ref()))],
    }
}

fn rule_fault(id: &str, detail: &str) -> Finding {
    warn!(rule = id, detail, "rule failed to execute");
    Finding::warning(id, format!("rule `{}` failed to execute: {}", id, detail))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panicked".to_string()
    }
}
