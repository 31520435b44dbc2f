//! Shared data models: findings, the aggregated report, and the structural
//! view of a test artifact that rules operate on.

pub mod report;
pub mod structure;

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
/// Finding severity. Ordered so that `Error` is the most severe.
pub enum Severity {
    Suggestion,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Suggestion => "suggestion",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
/// Where a finding points: a 1-based source line or a symbol name.
pub enum Location {
    Line(usize),
    Symbol(String),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Line(n) => write!(f, "line {}", n),
            Location::Symbol(s) => write!(f, "`{}`", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A single issue produced by a rule.
pub struct Finding {
    pub rule: String,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Finding {
    pub fn new(rule: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Finding {
            rule: rule.into(),
            severity,
            message: message.into(),
            location: None,
        }
    }

    pub fn error(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule, Severity::Error, message)
    }

    pub fn warning(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule, Severity::Warning, message)
    }

    pub fn suggestion(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule, Severity::Suggestion, message)
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.location = Some(Location::Line(line));
        self
    }

    pub fn at_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.location = Some(Location::Symbol(symbol.into()));
        self
    }

    /// Message with the location appended, as shown to users.
    pub fn display_message(&self) -> String {
        match &self.location {
            Some(Location::Line(n)) => format!("{} (line {})", self.message, n),
            _ => self.message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order_puts_error_last() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Suggestion);
        assert_eq!(Severity::Warning.min(Severity::Error), Severity::Warning);
    }

    #[test]
    fn test_display_message_appends_line_only() {
        let f = Finding::warning("r", "msg").at_line(4);
        assert_eq!(f.display_message(), "msg (line 4)");
        let g = Finding::warning("r", "msg").at_symbol("page");
        assert_eq!(g.display_message(), "msg");
    }
}
