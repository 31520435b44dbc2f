//! Aggregated validation report.
//!
//! The report owns the ordered findings and derives everything else from
//! them, so validity and the error list can never disagree.

use super::{Finding, Severity};
use serde::ser::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    findings: Vec<Finding>,
}

#[derive(serde::Serialize)]
/// Per-severity counts used by printers.
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub suggestions: usize,
}

impl ValidationReport {
    pub(crate) fn from_findings(findings: Vec<Finding>) -> Self {
        ValidationReport { findings }
    }

    /// True when no finding has `Severity::Error`.
    pub fn is_valid(&self) -> bool {
        !self.findings.iter().any(|f| f.severity == Severity::Error)
    }

    /// All findings in rule order.
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages(Severity::Error)
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages(Severity::Warning)
    }

    pub fn suggestions(&self) -> Vec<String> {
        self.messages(Severity::Suggestion)
    }

    pub fn summary(&self) -> Summary {
        let count = |sev| self.findings.iter().filter(|f| f.severity == sev).count();
        Summary {
            errors: count(Severity::Error),
            warnings: count(Severity::Warning),
            suggestions: count(Severity::Suggestion),
        }
    }

    fn messages(&self, severity: Severity) -> Vec<String> {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .map(Finding::display_message)
            .collect()
    }
}

impl Serialize for ValidationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(serde::Serialize)]
        struct View<'a> {
            is_valid: bool,
            errors: Vec<String>,
            warnings: Vec<String>,
            suggestions: Vec<String>,
            findings: &'a [Finding],
            summary: Summary,
        }
        View {
            is_valid: self.is_valid(),
            errors: self.errors(),
            warnings: self.warnings(),
            suggestions: self.suggestions(),
            findings: &self.findings,
            summary: self.summary(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ValidationReport {
        ValidationReport::from_findings(vec![
            Finding::warning("hardcoded-wait", "avoid sleep").at_line(3),
            Finding::suggestion("unused-symbols", "unused import `re`"),
            Finding::warning("selector-robustness", "fragile selector"),
        ])
    }

    #[test]
    fn test_partitions_keep_rule_order() {
        let r = sample();
        assert!(r.is_valid());
        assert!(r.errors().is_empty());
        assert_eq!(r.warnings(), vec!["avoid sleep (line 3)", "fragile selector"]);
        assert_eq!(r.suggestions().len(), 1);
    }

    #[test]
    fn test_single_error_invalidates() {
        let r = ValidationReport::from_findings(vec![Finding::error("test-definition", "no tests")]);
        assert!(!r.is_valid());
        assert_eq!(r.summary().errors, 1);
    }

    #[test]
    fn test_serialized_shape() {
        let v = serde_json::to_value(sample()).unwrap();
        assert_eq!(v["is_valid"], true);
        assert_eq!(v["summary"]["warnings"], 2);
        assert_eq!(v["findings"][0]["location"]["line"], 3);
        assert_eq!(v["findings"][1]["severity"], "suggestion");
    }
}
