//! Selector robustness: flag locators that depend on element position.

use super::call_text;
use crate::models::structure::{Argument, CallSite, TestStructure};
use crate::models::Finding;
use regex::Regex;
use std::sync::OnceLock;

/// Methods whose first positional argument is a selector.
const SELECTOR_FIRST: &[&str] = &[
    "locator",
    "query_selector",
    "query_selector_all",
    "wait_for_selector",
    "click",
    "dblclick",
    "hover",
    "focus",
    "tap",
    "check",
    "uncheck",
    "is_visible",
    "is_hidden",
    "is_enabled",
    "is_disabled",
    "is_checked",
    "is_editable",
    "inner_text",
    "inner_html",
    "text_content",
    "eval_on_selector",
    "eval_on_selector_all",
    "set_input_files",
];

/// Methods taking `(selector, value)` on a page and `(value)` on a locator.
const SELECTOR_AND_VALUE: &[&str] = &["fill", "type", "press", "select_option"];

/// Deepest chain of `>` child combinators tolerated in a CSS selector.
const MAX_CHILD_COMBINATORS: usize = 2;

struct Fragile {
    regex: Regex,
    reason: &'static str,
}

fn builtin_patterns() -> &'static [Fragile] {
    static PATTERNS: OnceLock<Vec<Fragile>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (
                r":nth-(child|last-child|of-type|last-of-type)\(",
                "positional pseudo-class",
            ),
            (r":nth-match\(", "index-based :nth-match"),
            (r"(^|\s|>>)\s*nth=-?\d+", "index-based nth= selector"),
            (r"^(xpath=)?/html", "absolute XPath"),
            (r"^(xpath=)?(\(|/|\.\.).*\[\d+\]", "index-based XPath"),
        ]
        .into_iter()
        .map(|(p, reason)| Fragile {
            regex: Regex::new(p).expect("static regex"),
            reason,
        })
        .collect()
    })
}

pub fn check(id: &str, s: &TestStructure, extra: &[Regex]) -> Vec<Finding> {
    let mut out = Vec::new();
    for c in &s.calls {
        if c.method == "nth" && !c.is_bare() {
            out.push(
                Finding::warning(
                    id,
                    format!(
                        "index-based locator `{}`: prefer filtering by role, text or test id",
                        call_text(c)
                    ),
                )
                .at_line(c.line),
            );
            continue;
        }
        for selector in selector_args(c) {
            if let Some(reason) = fragility(selector, extra) {
                out.push(
                    Finding::warning(
                        id,
                        format!(
                            "fragile selector \"{}\" ({}): prefer get_by_role, get_by_text or get_by_test_id",
                            selector, reason
                        ),
                    )
                    .at_line(c.line),
                );
            }
        }
    }
    out
}

fn selector_args(c: &CallSite) -> Vec<&str> {
    let positional: Vec<&Argument> = c.positional().collect();
    let take = if c.method == "drag_and_drop" {
        2
    } else if SELECTOR_FIRST.contains(&c.method.as_str()) {
        1
    } else if SELECTOR_AND_VALUE.contains(&c.method.as_str()) && positional.len() >= 2 {
        1
    } else {
        0
    };
    positional
        .into_iter()
        .take(take)
        .filter_map(Argument::as_str)
        .collect()
}

/// Reason a selector is considered fragile, if any.
fn fragility(selector: &str, extra: &[Regex]) -> Option<String> {
    let sel = selector.trim();
    if let Some(p) = builtin_patterns().iter().find(|p| p.regex.is_match(sel)) {
        return Some(p.reason.to_string());
    }
    if child_combinators(sel) > MAX_CHILD_COMBINATORS {
        return Some("deeply nested CSS path".to_string());
    }
    extra
        .iter()
        .find(|r| r.is_match(sel))
        .map(|r| format!("matches configured pattern `{}`", r.as_str()))
}

/// Count single `>` combinators; `>>` chains Playwright selector engines.
fn child_combinators(sel: &str) -> usize {
    let chars: Vec<char> = sel.chars().collect();
    (0..chars.len())
        .filter(|&i| {
            chars[i] == '>'
                && (i == 0 || chars[i - 1] != '>')
                && chars.get(i + 1).map_or(true, |c| *c != '>')
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::structure;

    fn run(src: &str) -> Vec<Finding> {
        check("selector-robustness", &structure(src), &[])
    }

    #[test]
    fn test_positional_css_is_flagged() {
        let f = run("page.locator(\"ul > li:nth-child(3)\").click()\n");
        assert_eq!(f.len(), 1);
        assert!(f[0].message.contains("positional pseudo-class"));
    }

    #[test]
    fn test_xpath_indexes_and_absolute_paths() {
        let f = run("page.click(\"//div[2]/span\")\npage.locator(\"xpath=/html/body/div\")\n");
        assert_eq!(f.len(), 2);
        assert!(f[0].message.contains("index-based XPath"));
        assert!(f[1].message.contains("absolute XPath"));
    }

    #[test]
    fn test_deep_child_chain_but_not_engine_chain() {
        assert_eq!(child_combinators("main > div > ul > li"), 3);
        assert_eq!(child_combinators("css=div >> text=Save"), 0);
        assert_eq!(run("page.locator(\"main > div > ul > li\")\n").len(), 1);
        assert!(run("page.locator(\"form >> text=Save\")\n").is_empty());
    }

    #[test]
    fn test_role_and_test_id_locators_pass() {
        let src = "page.get_by_role(\"button\", name=\"Save\").click()\npage.get_by_test_id(\"row-2\").click()\n";
        assert!(run(src).is_empty());
    }

    #[test]
    fn test_nth_call_and_fill_value_handling() {
        let f = run("page.locator(\".row\").nth(4).click()\n");
        assert_eq!(f.len(), 1);
        assert!(f[0].message.contains("nth(4)"));
        // locator.fill(value) has no selector argument
        assert!(run("page.get_by_label(\"Email\").fill(\"li:nth-child(2)\")\n").is_empty());
        assert_eq!(run("page.fill(\"li:nth-child(2) input\", \"x\")\n").len(), 1);
    }

    #[test]
    fn test_configured_extra_pattern() {
        let extra = vec![Regex::new(r"\.css-[0-9a-z]{6}").unwrap()];
        let f = check(
            "selector-robustness",
            &structure("page.click(\".css-1x2y3z\")\n"),
            &extra,
        );
        assert_eq!(f.len(), 1);
        assert!(f[0].message.contains("configured pattern"));
    }
}
