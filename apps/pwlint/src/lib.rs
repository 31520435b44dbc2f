//! pwlint core library.
//!
//! This crate exposes programmatic APIs for validating generated
//! pytest/Playwright test scripts before they are accepted into a suite.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `engine`: The `Validator`, running every enabled rule over one artifact.
//! - `parse`: Python parsing and structure extraction (tree-sitter).
//! - `rules`: Built-in rules and the `Rule` trait for custom ones.
//! - `models`: Findings, the extracted structure, and the report.
//! - `generation`: Contract with the test generation collaborator.
//! - `output`: Human/JSON printers and the plain-text reader.
//! - `utils`: Supporting helpers.
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod generation;
pub mod models;
pub mod output;
pub mod parse;
pub mod rules;
pub mod utils;

pub use engine::{validate, EngineConfig, Validator};
pub use models::report::ValidationReport;
pub use models::{Finding, Severity};
