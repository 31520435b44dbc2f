//! Rule set for generated pytest/Playwright tests.
//!
//! Built-in rules form a closed set (`BuiltinRule`) evaluated in the order of
//! `BUILTIN_RULES`. Each rule reads the `TestStructure` and returns findings;
//! no rule sees another rule's output. Only the two presence rules may emit
//! `Error`: the engine clamps every finding to its rule's `severity_cap`.

mod fixtures;
mod naming;
mod presence;
mod selectors;
mod symbols;
mod waits;

use crate::error::RuleError;
use crate::models::structure::TestStructure;
use crate::models::{Finding, Severity};
use regex::Regex;
use std::collections::BTreeSet;

/// A single independent check over the structure of one artifact.
pub trait Rule: Send + Sync {
    fn id(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Highest severity this rule may report.
    fn severity_cap(&self) -> Severity {
        Severity::Warning
    }

    fn evaluate(&self, structure: &TestStructure) -> Result<Vec<Finding>, RuleError>;
}

/// Static metadata for a built-in rule.
pub struct RuleInfo {
    pub id: &'static str,
    pub severity: Severity,
    pub description: &'static str,
}

/// Built-in rules in evaluation order.
pub static BUILTIN_RULES: [RuleInfo; 7] = [
    RuleInfo {
        id: "test-definition",
        severity: Severity::Error,
        description: "at least one test function or Test* class method is defined",
    },
    RuleInfo {
        id: "assertion-presence",
        severity: Severity::Error,
        description: "at least one assert, expect(...) check or assert* call exists",
    },
    RuleInfo {
        id: "fixture-consistency",
        severity: Severity::Warning,
        description: "requested fixtures and setup/teardown helpers are declared",
    },
    RuleInfo {
        id: "selector-robustness",
        severity: Severity::Warning,
        description: "selectors avoid index-based or deeply positional patterns",
    },
    RuleInfo {
        id: "hardcoded-wait",
        severity: Severity::Warning,
        description: "no fixed-duration sleeps or wait_for_timeout calls",
    },
    RuleInfo {
        id: "naming-readability",
        severity: Severity::Suggestion,
        description: "test names describe behavior; no magic numbers or inline URLs",
    },
    RuleInfo {
        id: "unused-symbols",
        severity: Severity::Suggestion,
        description: "no unused or duplicate imports and no unrequested fixtures",
    },
];

pub fn is_builtin(id: &str) -> bool {
    BUILTIN_RULES.iter().any(|r| r.id == id)
}

pub enum BuiltinRule {
    PresenceOfTest,
    PresenceOfAssertion,
    FixtureConsistency { known: BTreeSet<String> },
    SelectorRobustness { extra: Vec<Regex> },
    HardcodedWait,
    NamingReadability { min_words: usize },
    UnusedSymbols,
}

impl BuiltinRule {
    fn index(&self) -> usize {
        match self {
            BuiltinRule::PresenceOfTest => 0,
            BuiltinRule::PresenceOfAssertion => 1,
            BuiltinRule::FixtureConsistency { .. } => 2,
            BuiltinRule::SelectorRobustness { .. } => 3,
            BuiltinRule::HardcodedWait => 4,
            BuiltinRule::NamingReadability { .. } => 5,
            BuiltinRule::UnusedSymbols => 6,
        }
    }

    pub fn info(&self) -> &'static RuleInfo {
        &BUILTIN_RULES[self.index()]
    }
}

impl Rule for BuiltinRule {
    fn id(&self) -> &str {
        self.info().id
    }

    fn description(&self) -> &str {
        self.info().description
    }

    fn severity_cap(&self) -> Severity {
        self.info().severity
    }

    fn evaluate(&self, s: &TestStructure) -> Result<Vec<Finding>, RuleError> {
        let id = self.id();
        let found = match self {
            BuiltinRule::PresenceOfTest => presence::tests(id, s),
            BuiltinRule::PresenceOfAssertion => presence::assertions(id, s),
            BuiltinRule::FixtureConsistency { known } => fixtures::check(id, s, known),
            BuiltinRule::SelectorRobustness { extra } => selectors::check(id, s, extra),
            BuiltinRule::HardcodedWait => waits::check(id, s),
            BuiltinRule::NamingReadability { min_words } => naming::check(id, s, *min_words),
            BuiltinRule::UnusedSymbols => symbols::check(id, s),
        };
        Ok(found)
    }
}

/// The full built-in set with default options, in evaluation order.
pub fn default_rules() -> Vec<BuiltinRule> {
    vec![
        BuiltinRule::PresenceOfTest,
        BuiltinRule::PresenceOfAssertion,
        BuiltinRule::FixtureConsistency {
            known: BTreeSet::new(),
        },
        BuiltinRule::SelectorRobustness { extra: Vec::new() },
        BuiltinRule::HardcodedWait,
        BuiltinRule::NamingReadability { min_words: 2 },
        BuiltinRule::UnusedSymbols,
    ]
}

/// Render a call as `callee(arg, ...)` for messages.
fn call_text(call: &crate::models::structure::CallSite) -> String {
    let args: Vec<String> = call
        .args
        .iter()
        .map(|a| match &a.keyword {
            Some(k) => format!("{}={}", k, a.text),
            None => a.text.clone(),
        })
        .collect();
    let text = format!("{}({})", call.callee, args.join(", "));
    if text.chars().count() > 80 {
        let cut: String = text.chars().take(77).collect();
        format!("{}...", cut)
    } else {
        text
    }
}

#[cfg(test)]
pub(crate) fn structure(src: &str) -> TestStructure {
    crate::parse::parse_artifact(src).structure
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_follow_documented_order() {
        let ids: Vec<_> = default_rules().iter().map(|r| r.id().to_string()).collect();
        let expected: Vec<_> = BUILTIN_RULES.iter().map(|r| r.id.to_string()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_only_presence_rules_may_error() {
        for r in default_rules() {
            let errors = r.severity_cap() == Severity::Error;
            let presence = matches!(r, BuiltinRule::PresenceOfTest | BuiltinRule::PresenceOfAssertion);
            assert_eq!(errors, presence, "{}", r.id());
        }
    }

    #[test]
    fn test_call_text_truncates_long_calls() {
        let s = structure(&format!("page.locator(\"{}\")\n", "a".repeat(120)));
        let t = call_text(&s.calls[0]);
        assert!(t.ends_with("..."));
        assert_eq!(t.chars().count(), 80);
    }
}
