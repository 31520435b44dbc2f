//! Fixture and setup/teardown consistency.
//!
//! A requested fixture resolves when it is declared in the file, provided by
//! pytest or pytest-playwright, bound by `parametrize`, or configured as
//! known (typically a `conftest.py` fixture). Anything else is a dangling
//! reference: the test may still partly run, so this is a warning.

use crate::models::structure::{FunctionDef, Literal, TestStructure};
use crate::models::Finding;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Fixtures provided by pytest itself and by pytest-playwright.
pub const BUILTIN_FIXTURES: &[&str] = &[
    // pytest
    "cache",
    "capfd",
    "capfdbinary",
    "caplog",
    "capsys",
    "capsysbinary",
    "doctest_namespace",
    "monkeypatch",
    "pytestconfig",
    "pytester",
    "record_property",
    "record_testsuite_property",
    "record_xml_attribute",
    "recwarn",
    "request",
    "testdir",
    "tmp_path",
    "tmp_path_factory",
    "tmpdir",
    "tmpdir_factory",
    // pytest-playwright and pytest-base-url
    "base_url",
    "browser",
    "browser_channel",
    "browser_context_args",
    "browser_name",
    "browser_type",
    "browser_type_launch_args",
    "connect_options",
    "context",
    "device",
    "is_chromium",
    "is_firefox",
    "is_webkit",
    "launch_browser",
    "new_context",
    "output_path",
    "page",
    "playwright",
];

pub fn check(id: &str, s: &TestStructure, known: &BTreeSet<String>) -> Vec<Finding> {
    let declared: BTreeSet<&str> = s.fixtures().filter_map(FunctionDef::fixture_name).collect();
    let resolves = |name: &str| {
        declared.contains(name) || BUILTIN_FIXTURES.contains(&name) || known.contains(name)
    };

    let mut out = Vec::new();
    for f in s.functions.iter().filter(|f| f.is_test() || f.is_fixture()) {
        let bound = parametrized_names(f);
        let kind = if f.is_fixture() { "fixture" } else { "test" };
        let mut seen = BTreeSet::new();
        for p in &f.params {
            if resolves(p) || bound.contains(p.as_str()) || !seen.insert(p.as_str()) {
                continue;
            }
            out.push(
                Finding::warning(
                    id,
                    format!(
                        "{} `{}` requests fixture `{}`, which is not declared in this file",
                        kind, f.name, p
                    ),
                )
                .at_line(f.line),
            );
        }
    }

    for (name, via, line) in explicit_requests(s) {
        if !resolves(&name) {
            out.push(
                Finding::warning(
                    id,
                    format!("`{}` references undeclared fixture `{}`", via, name),
                )
                .at_line(line),
            );
        }
    }

    let mut reported = BTreeSet::new();
    for c in s.calls.iter().filter(|c| c.is_bare()) {
        let lower = c.method.to_ascii_lowercase();
        if !(lower.starts_with("setup") || lower.starts_with("teardown")) {
            continue;
        }
        if s.is_defined(&c.method) || s.is_imported(&c.method) {
            continue;
        }
        if reported.insert(c.method.as_str()) {
            out.push(
                Finding::warning(
                    id,
                    format!(
                        "call to `{}()` but no setup/teardown helper with that name is declared",
                        c.method
                    ),
                )
                .at_line(c.line),
            );
        }
    }
    out
}

/// Fixture names requested by string: `usefixtures(...)` and
/// `request.getfixturevalue(...)`. Returns `(name, api, line)`.
pub(crate) fn explicit_requests(s: &TestStructure) -> Vec<(String, &'static str, usize)> {
    let mut out = Vec::new();
    for c in &s.calls {
        let via = match c.method.as_str() {
            "usefixtures" => "usefixtures",
            "getfixturevalue" => "getfixturevalue",
            _ => continue,
        };
        for a in c.positional() {
            if let Some(name) = a.as_str() {
                out.push((name.to_string(), via, c.line));
            }
        }
    }
    out
}

/// Argument names bound by `@pytest.mark.parametrize` on a function.
fn parametrized_names(f: &FunctionDef) -> BTreeSet<&str> {
    static QUOTED: OnceLock<Regex> = OnceLock::new();
    let quoted = QUOTED.get_or_init(|| {
        Regex::new(r#"["']([A-Za-z_][A-Za-z0-9_]*)["']"#).expect("static regex")
    });

    let mut names = BTreeSet::new();
    for d in f.decorators.iter().filter(|d| d.name.ends_with("parametrize")) {
        let first = d
            .args
            .iter()
            .find(|a| a.keyword.is_none() || a.keyword.as_deref() == Some("argnames"));
        if let Some(a) = first {
            match &a.literal {
                Some(Literal::Str(s)) => {
                    names.extend(s.split(',').map(str::trim).filter(|n| !n.is_empty()))
                }
                _ => names.extend(
                    quoted
                        .captures_iter(&a.text)
                        .filter_map(|c| c.get(1))
                        .map(|m| m.as_str()),
                ),
            }
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::structure;

    fn run(src: &str) -> Vec<Finding> {
        check("fixture-consistency", &structure(src), &BTreeSet::new())
    }

    #[test]
    fn test_builtin_and_declared_fixtures_resolve() {
        let src = r#"
import pytest

@pytest.fixture
def user(page):
    return {"name": "a"}

def test_profile_shows_name(page, user, tmp_path):
    assert user
"#;
        assert!(run(src).is_empty());
    }

    #[test]
    fn test_dangling_fixture_is_warning() {
        let src = "def test_cart_total(page, logged_in_user):\n    assert True\n";
        let f = run(src);
        assert_eq!(f.len(), 1);
        assert!(f[0].message.contains("logged_in_user"));
        assert_eq!(f[0].severity, crate::models::Severity::Warning);
    }

    #[test]
    fn test_renamed_fixture_and_known_list() {
        let src = r#"
import pytest

@pytest.fixture(name="admin")
def _admin_fixture():
    return 1

def test_admin_can_delete(admin, db):
    assert admin
"#;
        let known: BTreeSet<String> = ["db".to_string()].into_iter().collect();
        assert!(check("fixture-consistency", &structure(src), &known).is_empty());
    }

    #[test]
    fn test_parametrize_names_are_not_fixtures() {
        let src = r#"
import pytest

@pytest.mark.parametrize("email, password", [("a", "b")])
def test_login_rejects_bad_credentials(page, email, password):
    assert email

@pytest.mark.parametrize(["size"], [(1,)])
def test_resize_keeps_layout(page, size):
    assert size
"#;
        assert!(run(src).is_empty());
    }

    #[test]
    fn test_usefixtures_and_setup_helpers() {
        let src = r#"
import pytest

@pytest.mark.usefixtures("seed_data")
def test_listing_shows_items(page):
    setup_database()
    setup_database()
    assert True
"#;
        let f = run(src);
        assert_eq!(f.len(), 2);
        assert!(f[0].message.contains("seed_data"));
        assert!(f[1].message.contains("setup_database"));
    }

    #[test]
    fn test_defaulted_params_are_not_fixture_requests() {
        let src = "def test_login_retries_on_failure(page, retries=3, delay: float = 0.5):\n    assert retries\n";
        assert!(run(src).is_empty());
    }
}
