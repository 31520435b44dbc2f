//! Output rendering for validation reports and the rule list.
//!
//! Supports `human` (default) and `json` outputs. The plain human rendering
//! can be read back with `parse_rendered`, which preserves the per-severity
//! message lists.

use crate::engine::Validator;
use crate::models::report::ValidationReport;
use crate::models::Severity;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

const RULE: &str = "────────────────────────────────────────────────────────────";
const ERRORS: &str = "ERRORS:";
const WARNINGS: &str = "WARNINGS:";
const SUGGESTIONS: &str = "SUGGESTIONS:";
const ITEM: &str = "  - ";

fn use_colors(output: &str) -> bool {
    output != "json" && crate::utils::colors_enabled()
}

/// Print reports for one or more validated files.
pub fn print_reports(results: &[(String, ValidationReport)], output: &str) {
    match output {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_reports_json(results))
                .unwrap_or_else(|_| "{}".to_string())
        ),
        _ => {
            let color = use_colors(output);
            for (label, report) in results {
                print!("{}", render_human(label, report, color));
            }
            if results.len() > 1 {
                let invalid = results.iter().filter(|(_, r)| !r.is_valid()).count();
                let line = format!(
                    "— Files — total={} valid={} invalid={}",
                    results.len(),
                    results.len() - invalid,
                    invalid
                );
                if color {
                    println!("{}", line.bold());
                } else {
                    println!("{}", line);
                }
            }
        }
    }
}

/// Render one report for terminals. With `color` off the text is stable and
/// can be parsed back by `parse_rendered`.
pub fn render_human(label: &str, report: &ValidationReport, color: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!("pwlint: {}\n{}\n", label, RULE));
    let status = if report.is_valid() {
        if color {
            format!("{} {}", "✔".green(), "VALID".green().bold())
        } else {
            "✔ VALID".to_string()
        }
    } else if color {
        format!("{} {}", "✖".red(), "FAILED".red().bold())
    } else {
        "✖ FAILED".to_string()
    };
    out.push_str(&status);
    out.push('\n');

    let sections = [
        (ERRORS, report.errors(), "✖"),
        (WARNINGS, report.warnings(), "▲"),
        (SUGGESTIONS, report.suggestions(), "◆"),
    ];
    for (title, items, icon) in sections.iter() {
        if items.is_empty() {
            continue;
        }
        out.push('\n');
        if color {
            let header = match *title {
                ERRORS => title.red().bold().to_string(),
                WARNINGS => title.yellow().bold().to_string(),
                _ => title.cyan().bold().to_string(),
            };
            out.push_str(&format!("{} {}\n", icon, header));
        } else {
            out.push_str(title);
            out.push('\n');
        }
        for msg in items {
            out.push_str(ITEM);
            out.push_str(&msg.replace(['\n', '\r'], " "));
            out.push('\n');
        }
    }

    let s = report.summary();
    let summary = format!(
        "— Summary — errors={} warnings={} suggestions={}",
        s.errors, s.warnings, s.suggestions
    );
    out.push_str(RULE);
    out.push('\n');
    if color {
        out.push_str(&summary.bold().to_string());
    } else {
        out.push_str(&summary);
    }
    out.push('\n');
    out
}

#[derive(Debug, Default, PartialEq, Eq)]
/// Message lists recovered from a plain human rendering.
pub struct RenderedReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Parse the plain output of `render_human` back into message lists.
pub fn parse_rendered(text: &str) -> RenderedReport {
    let mut parsed = RenderedReport::default();
    let mut section: Option<Severity> = None;
    for line in text.lines() {
        // an empty message renders as a bare `  -` once trailing space is gone
        let item = line
            .strip_prefix(ITEM)
            .or_else(|| (line == ITEM.trim_end()).then_some(""));
        if let Some(item) = item {
            let list = match section {
                Some(Severity::Error) => &mut parsed.errors,
                Some(Severity::Warning) => &mut parsed.warnings,
                Some(Severity::Suggestion) => &mut parsed.suggestions,
                None => continue,
            };
            list.push(item.to_string());
            continue;
        }
        match line.trim_end() {
            ERRORS => section = Some(Severity::Error),
            WARNINGS => section = Some(Severity::Warning),
            SUGGESTIONS => section = Some(Severity::Suggestion),
            "" => {}
            _ => section = None,
        }
    }
    parsed
}

/// Compose the JSON document for a set of reports (pure, for tests).
pub fn compose_reports_json(results: &[(String, ValidationReport)]) -> JsonVal {
    let items: Vec<_> = results
        .iter()
        .map(|(label, report)| {
            let mut v = serde_json::to_value(report).unwrap_or(JsonVal::Null);
            if let JsonVal::Object(map) = &mut v {
                map.insert("file".to_string(), json!(label));
            }
            v
        })
        .collect();
    let invalid = results.iter().filter(|(_, r)| !r.is_valid()).count();
    let summary = json!({
        "files": results.len(),
        "valid": results.len() - invalid,
        "invalid": invalid,
    });
    json!({"results": items, "summary": summary})
}

/// JSON listing of the validator's enabled rules (pure, for tests).
pub fn compose_rules_json(validator: &Validator) -> JsonVal {
    let items: Vec<_> = validator
        .rules()
        .map(|r| {
            json!({
                "id": r.id(),
                "severity": r.severity_cap(),
                "description": r.description(),
            })
        })
        .collect();
    JsonVal::Array(items)
}

/// Print the enabled rules in evaluation order.
pub fn print_rules(validator: &Validator, output: &str) {
    match output {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_rules_json(validator))
                .unwrap_or_else(|_| "[]".to_string())
        ),
        _ => {
            let color = use_colors(output);
            for (i, r) in validator.rules().enumerate() {
                let sev = format!("{:<10}", r.severity_cap().as_str());
                if color {
                    println!("{}. {} {} {}", i + 1, r.id().bold(), sev.dimmed(), r.description());
                } else {
                    println!("{}. {} {} {}", i + 1, r.id(), sev, r.description());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Finding;

    fn sample() -> ValidationReport {
        ValidationReport::from_findings(vec![
            Finding::error("assertion-presence", "no assertions found"),
            Finding::warning("hardcoded-wait", "hardcoded wait `time.sleep(2)`").at_line(7),
            Finding::warning("selector-robustness", "fragile selector \"a\nb\""),
            Finding::suggestion("unused-symbols", "unused import `re`").at_line(1),
        ])
    }

    #[test]
    fn test_render_and_parse_round_trip_counts() {
        let report = sample();
        let text = render_human("tests/test_x.py", &report, false);
        let parsed = parse_rendered(&text);
        assert_eq!(parsed.errors.len(), report.errors().len());
        assert_eq!(parsed.warnings.len(), report.warnings().len());
        assert_eq!(parsed.suggestions.len(), report.suggestions().len());
        assert_eq!(parsed.warnings[0], "hardcoded wait `time.sleep(2)` (line 7)");
    }

    #[test]
    fn test_render_valid_report_has_no_sections() {
        let report = ValidationReport::from_findings(Vec::new());
        let text = render_human("a.py", &report, false);
        assert!(text.contains("✔ VALID"));
        assert!(!text.contains(ERRORS));
        assert_eq!(parse_rendered(&text), RenderedReport::default());
    }

    #[test]
    fn test_compose_reports_json_shape() {
        let results = vec![
            ("a.py".to_string(), sample()),
            ("b.py".to_string(), ValidationReport::from_findings(Vec::new())),
        ];
        let out = compose_reports_json(&results);
        assert_eq!(out["summary"]["files"], 2);
        assert_eq!(out["summary"]["invalid"], 1);
        assert_eq!(out["results"][0]["file"], "a.py");
        assert_eq!(out["results"][0]["is_valid"], false);
        assert_eq!(out["results"][0]["summary"]["warnings"], 2);
        assert_eq!(out["results"][1]["errors"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_parse_keeps_empty_messages_in_section() {
        let report = ValidationReport::from_findings(vec![
            Finding::warning("custom", ""),
            Finding::warning("custom", "second"),
            Finding::suggestion("custom", "third"),
        ]);
        let text = render_human("t.py", &report, false);
        let parsed = parse_rendered(&text);
        assert_eq!(parsed.warnings, vec!["", "second"]);
        assert_eq!(parsed.suggestions, vec!["third"]);
        // same result when an editor strips trailing whitespace
        let stripped: String = text.lines().map(|l| format!("{}\n", l.trim_end())).collect();
        assert_eq!(parse_rendered(&stripped), parsed);
    }

    #[test]
    fn test_rules_json_lists_enabled_rules_with_caps() {
        let mut cfg = crate::engine::EngineConfig::default();
        cfg.disabled.insert("hardcoded-wait".to_string());
        let v = Validator::new(&cfg).unwrap();
        let out = compose_rules_json(&v);
        let rules = out.as_array().unwrap();
        assert_eq!(rules.len(), 6);
        assert_eq!(rules[0]["id"], "test-definition");
        assert_eq!(rules[0]["severity"], "error");
        assert!(rules.iter().all(|r| r["id"] != "hardcoded-wait"));
        assert!(rules.iter().all(|r| !r["description"].as_str().unwrap().is_empty()));
    }
}
