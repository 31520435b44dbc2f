//! Fixed-duration pauses: `time.sleep`, `asyncio.sleep`, `wait_for_timeout`.

use super::call_text;
use crate::models::structure::{CallSite, TestStructure};
use crate::models::Finding;

const SLEEP_MODULES: &[&str] = &["time", "asyncio"];

pub fn check(id: &str, s: &TestStructure) -> Vec<Finding> {
    s.calls
        .iter()
        .filter(|c| is_fixed_wait(s, c))
        .map(|c| {
            Finding::warning(
                id,
                format!(
                    "hardcoded wait `{}`: sleep-style pauses make tests slow and flaky; \
                     wait on a condition instead (expect(...), wait_for_selector, wait_for_url)",
                    call_text(c)
                ),
            )
            .at_line(c.line)
        })
        .collect()
}

pub(crate) fn is_fixed_wait(s: &TestStructure, c: &CallSite) -> bool {
    if c.method == "wait_for_timeout" {
        return true;
    }
    match c.receiver_root.as_deref() {
        // `sleep(..)` or `pause(..)` after `from time import sleep [as pause]`
        None => s.import_of(&c.method).map_or(false, |i| {
            i.original == "sleep" && SLEEP_MODULES.contains(&i.module.as_str())
        }),
        // `t.sleep(..)` after `import time as t`
        Some(root) => {
            c.method == "sleep"
                && SLEEP_MODULES.contains(&s.import_source(root).unwrap_or(root))
        }
    }
}
