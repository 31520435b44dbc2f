//! Naming and readability suggestions.

use super::call_text;
use super::waits::is_fixed_wait;
use crate::models::structure::{Literal, TestStructure};
use crate::models::Finding;

/// Words that say nothing about the behavior under test.
const GENERIC_WORDS: &[&str] = &[
    "basic", "case", "check", "default", "demo", "example", "first", "foo", "bar", "baz", "it",
    "main", "my", "new", "one", "sample", "second", "simple", "something", "stuff", "temp",
    "test", "tests", "tmp", "two", "works",
];

/// Builtins whose numeric arguments are not magic numbers.
const NUMERIC_BUILTINS: &[&str] = &["range", "round", "int", "float", "len", "min", "max", "enumerate"];

pub fn check(id: &str, s: &TestStructure, min_words: usize) -> Vec<Finding> {
    let mut out = Vec::new();
    for t in s.tests() {
        if let Some(msg) = name_problem(&t.name, min_words) {
            out.push(Finding::suggestion(id, msg).at_line(t.line));
        }
    }
    for c in &s.calls {
        if c.method == "goto" {
            if let Some(url) = c.positional().next().and_then(|a| a.as_str()) {
                if url.starts_with("http://") || url.starts_with("https://") {
                    out.push(
                        Finding::suggestion(
                            id,
                            format!(
                                "hardcoded URL \"{}\" in `{}`: move it to a named constant or use the `base_url` fixture",
                                url, c.callee
                            ),
                        )
                        .at_line(c.line),
                    );
                }
            }
        }
        if c.function.is_none()
            || c.from_expect
            || c.method == "nth"
            || is_fixed_wait(s, c)
            || (c.is_bare() && NUMERIC_BUILTINS.contains(&c.method.as_str()))
        {
            continue;
        }
        for a in &c.args {
            let magic = match a.literal {
                Some(Literal::Int(i)) => i.abs() > 1,
                Some(Literal::Float(f)) => f.abs() > 1.0,
                _ => false,
            };
            if magic {
                out.push(
                    Finding::suggestion(
                        id,
                        format!(
                            "magic number {} in `{}`: give it a named constant",
                            a.text,
                            call_text(c)
                        ),
                    )
                    .at_line(c.line),
                );
            }
        }
    }
    out
}

fn name_problem(name: &str, min_words: usize) -> Option<String> {
    let words: Vec<&str> = name
        .trim_start_matches("test")
        .split('_')
        .filter(|w| !w.is_empty())
        .collect();
    let meaningful = words
        .iter()
        .filter(|w| {
            let lower = w.to_ascii_lowercase();
            !GENERIC_WORDS.contains(&lower.as_str()) && !w.chars().all(|c| c.is_ascii_digit())
        })
        .count();
    if meaningful == 0 {
        return Some(format!(
            "test name `{}` does not describe the behavior under test; \
             use a name like `test_<action>_<expected_result>`",
            name
        ));
    }
    if words.len() < min_words {
        return Some(format!(
            "test name `{}` is terse; consider stating the expected outcome \
             (at least {} words after `test_`)",
            name, min_words
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::structure;

    #[test]
    fn test_generic_and_numbered_names() {
        assert!(name_problem("test_1", 2).unwrap().contains("does not describe"));
        assert!(name_problem("test_example_works", 2).is_some());
        assert!(name_problem("test", 2).is_some());
        assert!(name_problem("test_login", 2).unwrap().contains("terse"));
        assert!(name_problem("test_login_redirects_to_dashboard", 2).is_none());
        assert!(name_problem("test_login", 1).is_none());
    }

    #[test]
    fn test_magic_numbers_skip_waits_and_expectations() {
        let src = r#"
import time
def test_cart_shows_items(page):
    page.set_viewport_size(1280, 720)
    time.sleep(3)
    expect(page.locator(".item")).to_have_count(3)
    for i in range(10):
        pass
"#;
        let f = check("naming-readability", &structure(src), 2);
        assert_eq!(f.len(), 2);
        assert!(f[0].message.contains("1280"));
        assert!(f[1].message.contains("720"));
    }

    #[test]
    fn test_inline_url_in_goto() {
        let src = "def test_home_has_title(page):\n    page.goto(\"https://shop.example.com\")\n    assert page\n";
        let f = check("naming-readability", &structure(src), 2);
        assert_eq!(f.len(), 1);
        assert!(f[0].message.contains("base_url"));
    }
}
