//! Structural presence checks: a runnable test and something that can fail.
//!
//! Both checks stay quiet on a degraded structure; the adapter has already
//! reported why there is nothing to inspect.

use crate::models::structure::{CallSite, TestStructure};
use crate::models::Finding;

pub fn tests(id: &str, s: &TestStructure) -> Vec<Finding> {
    if s.degraded || s.tests().next().is_some() {
        return Vec::new();
    }
    vec![Finding::error(
        id,
        "no test function found: define at least one `test_*` function \
         or a `test_*` method inside a `Test*` class",
    )]
}

pub fn assertions(id: &str, s: &TestStructure) -> Vec<Finding> {
    if s.degraded || !s.asserts.is_empty() || s.calls.iter().any(is_assertion) {
        return Vec::new();
    }
    let finding = Finding::error(
        id,
        "no assertions found: add `assert` statements or `expect(...)` checks \
         so the test can fail meaningfully",
    );
    // anchor to the test when there is exactly one
    let mut tests = s.tests();
    match (tests.next(), tests.next()) {
        (Some(only), None) => vec![finding.at_symbol(only.name.clone())],
        _ => vec![finding],
    }
}

fn is_assertion(call: &CallSite) -> bool {
    if call.from_expect && (call.method.starts_with("to_") || call.method.starts_with("not_to_")) {
        return true;
    }
    if call.method.starts_with("assert") {
        return true;
    }
    call.method == "raises" && call.receiver_root.as_deref() == Some("pytest")
}
