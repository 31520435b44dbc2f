//! Unused and duplicate imports, and fixtures nothing requests.

use super::fixtures::explicit_requests;
use crate::models::structure::TestStructure;
use crate::models::Finding;
use std::collections::BTreeSet;

pub fn check(id: &str, s: &TestStructure) -> Vec<Finding> {
    let mut out = Vec::new();

    let mut seen = BTreeSet::new();
    for imp in &s.imports {
        if !seen.insert(imp.name.as_str()) {
            out.push(
                Finding::suggestion(id, format!("`{}` is imported more than once", imp.name))
                    .at_line(imp.line),
            );
        } else if !s.references.contains(&imp.name) {
            out.push(
                Finding::suggestion(id, format!("unused import `{}`", imp.name))
                    .at_line(imp.line),
            );
        }
    }

    let mut requested: BTreeSet<String> = explicit_requests(s)
        .into_iter()
        .map(|(name, _, _)| name)
        .collect();
    for f in &s.functions {
        requested.extend(f.params.iter().cloned());
    }
    for f in s.fixtures() {
        let name = f.fixture_name().unwrap_or(&f.name);
        if f.is_autouse() || requested.contains(name) {
            continue;
        }
        out.push(
            Finding::suggestion(
                id,
                format!("fixture `{}` is declared but never requested", name),
            )
            .at_line(f.line),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::structure;

    #[test]
    fn test_unused_and_duplicate_imports() {
        let src = "import re\nimport pytest\nimport pytest\nfrom playwright.sync_api import expect\n\ndef test_a_b(page):\n    expect(page).to_have_url(\"x\")\n";
        let f = check("unused-symbols", &structure(src));
        let msgs: Vec<_> = f.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(
            msgs,
            vec![
                "unused import `re`",
                "unused import `pytest`",
                "`pytest` is imported more than once",
            ]
        );
    }

    #[test]
    fn test_unrequested_fixture_but_not_autouse() {
        let src = r#"
import pytest

@pytest.fixture
def stale_data():
    return 1

@pytest.fixture(autouse=True)
def reset_state():
    yield

@pytest.fixture
def user():
    return 2

def test_user_sees_profile(user):
    assert user
"#;
        let f = check("unused-symbols", &structure(src));
        assert_eq!(f.len(), 1);
        assert!(f[0].message.contains("stale_data"));
    }
}
