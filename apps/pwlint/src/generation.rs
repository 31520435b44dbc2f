//! Contract with the test generation collaborator.
//!
//! The collaborator turns a user story into Gherkin and a candidate test.
//! Only its result shape lives here; pwlint validates the `code` part and
//! never calls a model itself.

use crate::engine::Validator;
use crate::error::GenerateError;
use crate::models::report::ValidationReport;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Collaborator output: `{ "code": ..., "gherkin": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedTest {
    pub code: String,
    #[serde(default)]
    pub gherkin: String,
}

/// Credentials and model choice, handed to a generator at construction.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub api_key: String,
    pub model: String,
}

impl GeneratorConfig {
    pub const DEFAULT_MODEL: &'static str = "claude-3-5-sonnet-latest";

    pub fn new(api_key: impl Into<String>) -> Result<Self, GenerateError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GenerateError::NotConfigured("API key is empty".into()));
        }
        Ok(GeneratorConfig {
            api_key,
            model: Self::DEFAULT_MODEL.to_string(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

pub trait TestGenerator {
    fn generate(&self, user_story: &str) -> Result<GeneratedTest, GenerateError>;
}

pub struct GenerationOutcome {
    pub test: GeneratedTest,
    pub report: ValidationReport,
}

/// Generate a test and validate its code.
pub fn generate_and_validate(
    generator: &dyn TestGenerator,
    validator: &Validator,
    user_story: &str,
) -> Result<GenerationOutcome, GenerateError> {
    let test = generator.generate(user_story)?;
    let report = validator.validate(&test.code);
    Ok(GenerationOutcome { test, report })
}

/// Decode a saved collaborator result.
pub fn load_generated(json: &str) -> Result<GeneratedTest, GenerateError> {
    Ok(serde_json::from_str(json)?)
}

const STOP_WORDS: &[&str] = &["as", "a", "an", "i", "want", "to", "the", "so", "that"];

/// `test_<first three keywords>.py` derived from the user story.
pub fn default_test_filename(user_story: &str) -> String {
    static WORD: OnceLock<Regex> = OnceLock::new();
    let word = WORD.get_or_init(|| Regex::new(r"\w+").expect("static regex"));
    let lower = user_story.to_lowercase();
    let keywords: Vec<&str> = word
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|w| !STOP_WORDS.contains(w))
        .take(3)
        .collect();
    if keywords.is_empty() {
        "test_generated.py".to_string()
    } else {
        format!("test_{}.py", keywords.join("_"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned(&'static str);

    impl TestGenerator for Canned {
        fn generate(&self, _: &str) -> Result<GeneratedTest, GenerateError> {
            Ok(GeneratedTest {
                code: self.0.to_string(),
                gherkin: "Feature: login".to_string(),
            })
        }
    }

    struct Offline;

    impl TestGenerator for Offline {
        fn generate(&self, _: &str) -> Result<GeneratedTest, GenerateError> {
            Err(GenerateError::Failed("network unavailable".into()))
        }
    }

    #[test]
    fn test_filename_skips_story_boilerplate() {
        assert_eq!(
            default_test_filename("As a user I want to login so that I see my cart"),
            "test_user_login_see.py"
        );
        assert_eq!(default_test_filename("As a, I want to"), "test_generated.py");
    }

    #[test]
    fn test_load_generated_shape() {
        let g = load_generated(r#"{"code": "def test_a(): assert 1", "gherkin": "Feature: x"}"#)
            .unwrap();
        assert!(g.code.starts_with("def test_a"));
        let g = load_generated(r#"{"code": "x = 1"}"#).unwrap();
        assert!(g.gherkin.is_empty());
        assert!(matches!(load_generated("{"), Err(GenerateError::Decode(_))));
    }

    #[test]
    fn test_generate_and_validate_checks_code_only() {
        let v = Validator::default();
        let out = generate_and_validate(
            &Canned("def test_login_works_now(page):\n    assert page\n"),
            &v,
            "story",
        )
        .unwrap();
        assert!(out.report.is_valid());
        assert_eq!(out.test.gherkin, "Feature: login");
        assert!(generate_and_validate(&Offline, &v, "story").is_err());
    }

    #[test]
    fn test_config_requires_key() {
        assert!(GeneratorConfig::new("  ").is_err());
        let c = GeneratorConfig::new("sk-test").unwrap().with_model("m");
        assert_eq!(c.model, "m");
    }
}
