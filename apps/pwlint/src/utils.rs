//! Small helpers shared by the binary: colored prefixes and path labels.

use owo_colors::OwoColorize;
use std::path::Path;

/// Colors are on unless `NO_COLOR` is set.
pub fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

fn prefix(label: &str, paint: fn(&str) -> String) -> String {
    if colors_enabled() {
        paint(label)
    } else {
        label.to_string()
    }
}

pub fn error_prefix() -> String {
    prefix("error:", |s| s.red().bold().to_string())
}

pub fn note_prefix() -> String {
    prefix("note:", |s| s.yellow().bold().to_string())
}

pub fn info_prefix() -> String {
    prefix("info:", |s| s.blue().bold().to_string())
}

/// Path shown relative to `base` when possible.
pub fn display_path(path: &Path, base: &Path) -> String {
    let abs_base = std::fs::canonicalize(base).unwrap_or_else(|_| base.to_path_buf());
    let abs_path = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    pathdiff::diff_paths(&abs_path, &abs_base)
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| path.to_path_buf())
        .to_string_lossy()
        .to_string()
}
