//! Configuration discovery and effective settings resolution.
//!
//! pwlint reads `pwlint.toml|yaml|yml` from the repository root (or closest
//! ancestor) and merges it with CLI flags to produce an `Effective` config.
//! Defaults:
//! - `output`: `human`
//! - `engine.parallel`: false
//! - `rules.disable`: none
//! - `fixtures.known`: none
//! - `selectors.fragile`: none
//! - `naming.min_words`: 2
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::engine::EngineConfig;
use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILES: [&str; 3] = ["pwlint.toml", "pwlint.yaml", "pwlint.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Engine execution settings under `[engine]`.
pub struct EngineCfg {
    pub parallel: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Rule selection under `[rules]`.
pub struct RulesCfg {
    #[serde(default)]
    pub disable: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Fixtures declared outside the validated file, e.g. in `conftest.py`.
pub struct FixturesCfg {
    #[serde(default)]
    pub known: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct SelectorsCfg {
    /// Extra regexes that mark a selector as fragile.
    #[serde(default)]
    pub fragile: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct NamingCfg {
    pub min_words: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `pwlint.toml|yaml`.
pub struct PwlintConfig {
    pub output: Option<String>,
    pub engine: Option<EngineCfg>,
    pub rules: Option<RulesCfg>,
    pub fixtures: Option<FixturesCfg>,
    pub selectors: Option<SelectorsCfg>,
    pub naming: Option<NamingCfg>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub config_path: Option<PathBuf>,
    pub output: String,
    pub engine: EngineConfig,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `pwlint.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Path of the config file under `root`, if one exists.
pub fn find_config(root: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|f| root.join(f))
        .find(|p| p.is_file())
}

/// Load `PwlintConfig` from `pwlint.toml` or `pwlint.yaml|yml` if present.
pub fn load_config(root: &Path) -> Result<Option<PwlintConfig>, ConfigError> {
    let path = match find_config(root) {
        Some(p) => p,
        None => return Ok(None),
    };
    let s = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let cfg = if path.extension().map_or(false, |e| e == "toml") {
        toml::from_str(&s).map_err(|source| ConfigError::Toml {
            path: path.clone(),
            source,
        })?
    } else {
        serde_yaml::from_str(&s).map_err(|source| ConfigError::Yaml {
            path: path.clone(),
            source,
        })?
    };
    Ok(Some(cfg))
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(
    cli_repo_root: Option<&str>,
    cli_output: Option<&str>,
    cli_parallel: Option<bool>,
) -> Result<Effective, ConfigError> {
    let start = PathBuf::from(cli_repo_root.unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let config_path = find_config(&repo_root);
    let cfg = load_config(&repo_root)?.unwrap_or_default();

    let output = cli_output
        .map(|s| s.to_string())
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());

    let defaults = EngineConfig::default();
    let engine = EngineConfig {
        parallel: cli_parallel
            .or_else(|| cfg.engine.as_ref().and_then(|e| e.parallel))
            .unwrap_or(defaults.parallel),
        disabled: cfg
            .rules
            .map(|r| r.disable.into_iter().collect())
            .unwrap_or_default(),
        known_fixtures: cfg
            .fixtures
            .map(|f| f.known.into_iter().collect())
            .unwrap_or_default(),
        fragile_patterns: cfg.selectors.map(|s| s.fragile).unwrap_or_default(),
        min_name_words: cfg
            .naming
            .and_then(|n| n.min_words)
            .unwrap_or(defaults.min_name_words),
    };

    Ok(Effective {
        repo_root,
        config_path,
        output,
        engine,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("pwlint.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
output = "json"
[engine]
parallel = true
[rules]
disable = ["naming-readability"]
[fixtures]
known = ["db_session"]
[selectors]
fragile = ["\\.css-[0-9a-z]+"]
[naming]
min_words = 3
    "#
        )
        .unwrap();

        // Resolve using explicit repo_root to avoid global CWD races
        let eff = resolve_effective(root.to_str(), None, None).unwrap();
        assert_eq!(eff.output, "json");
        assert!(eff.engine.parallel);
        assert!(eff.engine.disabled.contains("naming-readability"));
        assert!(eff.engine.known_fixtures.contains("db_session"));
        assert_eq!(eff.engine.fragile_patterns, vec![r"\.css-[0-9a-z]+"]);
        assert_eq!(eff.engine.min_name_words, 3);
        assert_eq!(eff.config_path, Some(root.join("pwlint.toml")));
    }

    #[test]
    fn test_load_yaml_and_defaults() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("pwlint.yaml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
fixtures:
  known: [api_client]
            "#
        )
        .unwrap();

        let eff = resolve_effective(root.to_str(), None, None).unwrap();
        assert_eq!(eff.output, "human");
        assert!(!eff.engine.parallel);
        assert!(eff.engine.known_fixtures.contains("api_client"));
        assert_eq!(eff.engine.min_name_words, 2);
    }

    #[test]
    fn test_cli_overrides_config() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("pwlint.toml"), "output = \"json\"\n[engine]\nparallel = true\n")
            .unwrap();
        let eff = resolve_effective(root.to_str(), Some("human"), Some(false)).unwrap();
        assert_eq!(eff.output, "human");
        assert!(!eff.engine.parallel);
    }

    #[test]
    fn test_detect_walks_up_to_git_root() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("tests/e2e")).unwrap();
        assert_eq!(detect_repo_root(&root.join("tests/e2e")), root.to_path_buf());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("pwlint.toml"), "output = [").unwrap();
        assert!(matches!(
            resolve_effective(root.to_str(), None, None),
            Err(ConfigError::Toml { .. })
        ));
    }
}
