//! pwlint CLI binary entry point.
//! Delegates to the library for validation and prints results.

use clap::Parser;
use pwlint::cli::{Cli, Commands};
use pwlint::config::{self, Effective};
use pwlint::generation::{self, GeneratorConfig};
use pwlint::utils::{display_path, error_prefix, info_prefix, note_prefix};
use pwlint::{output, ValidationReport, Validator};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("PWLINT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Validate {
            paths,
            repo_root,
            output,
            parallel,
        } => {
            let eff = effective(
                repo_root.as_deref(),
                output.as_deref(),
                if parallel { Some(true) } else { None },
            );
            let validator = build_validator(&eff);
            let files = expand_paths(&paths);
            let mut results: Vec<(String, ValidationReport)> = Vec::new();
            for path in files.iter() {
                let bytes = match fs::read(path) {
                    Ok(b) => b,
                    Err(e) => fail(&format!("Cannot read {}: {}", path.to_string_lossy(), e)),
                };
                debug!(file = %path.display(), bytes = bytes.len(), "validating");
                let report = validator.validate_bytes(&bytes);
                results.push((display_path(path, &eff.repo_root), report));
            }
            output::print_reports(&results, &eff.output);
            if results.iter().any(|(_, r)| !r.is_valid()) {
                std::process::exit(1);
            }
        }
        Commands::Accept {
            generated,
            story,
            story_file,
            out_dir,
            filename,
            show_gherkin,
            repo_root,
            output,
        } => {
            let eff = effective(repo_root.as_deref(), output.as_deref(), None);
            let validator = build_validator(&eff);
            let raw = match fs::read_to_string(&generated) {
                Ok(s) => s,
                Err(e) => fail(&format!("Cannot read {}: {}", generated, e)),
            };
            let test = match generation::load_generated(&raw) {
                Ok(t) => t,
                Err(e) => fail(&format!("Invalid generator result {}: {}", generated, e)),
            };
            let story = match (story, story_file) {
                (Some(s), _) => s,
                (None, Some(p)) => match fs::read_to_string(&p) {
                    Ok(s) => s,
                    Err(e) => fail(&format!("Cannot read {}: {}", p, e)),
                },
                (None, None) => String::new(),
            };
            if show_gherkin && eff.output != "json" {
                if test.gherkin.trim().is_empty() {
                    eprintln!("{} No Gherkin scenario in generator result.", note_prefix());
                } else {
                    println!("{}\n", test.gherkin.trim_end());
                }
            }

            let name = filename.unwrap_or_else(|| generation::default_test_filename(&story));
            let target = PathBuf::from(&out_dir).join(&name);
            let report = validator.validate(&test.code);
            output::print_reports(
                &[(target.to_string_lossy().to_string(), report.clone())],
                &eff.output,
            );

            if let Err(e) = fs::create_dir_all(&out_dir) {
                fail(&format!("Cannot create {}: {}", out_dir, e));
            }
            if let Err(e) = fs::write(&target, &test.code) {
                fail(&format!("Cannot write {}: {}", target.to_string_lossy(), e));
            }
            eprintln!(
                "{} Saved test to {}",
                info_prefix(),
                target.to_string_lossy()
            );
            eprintln!(
                "{} Run it with: pytest {} -v",
                info_prefix(),
                target.to_string_lossy()
            );
            if !report.is_valid() {
                eprintln!(
                    "{} Test has validation errors; review it before adding it to the suite.",
                    note_prefix()
                );
                std::process::exit(1);
            }
        }
        Commands::Rules { repo_root, output } => {
            let eff = effective(repo_root.as_deref(), output.as_deref(), None);
            let validator = build_validator(&eff);
            output::print_rules(&validator, &eff.output);
        }
        Commands::Info { repo_root } => {
            let eff = effective(repo_root.as_deref(), Some("human"), None);
            let cwd = std::env::current_dir()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_else(|_| "?".to_string());
            let key = std::env::var("ANTHROPIC_API_KEY").unwrap_or_default();
            let key_status = match GeneratorConfig::new(key) {
                Ok(_) => "set",
                Err(_) => "not set",
            };
            println!("pwlint {}", env!("CARGO_PKG_VERSION"));
            println!("working directory: {}", cwd);
            println!("repository root: {}", eff.repo_root.to_string_lossy());
            println!(
                "config: {}",
                eff.config_path
                    .as_deref()
                    .map(|p| p.to_string_lossy().to_string())
                    .unwrap_or_else(|| "none".to_string())
            );
            println!("ANTHROPIC_API_KEY: {}", key_status);
            for entry in ["src", "tests", ".env"] {
                let present = eff.repo_root.join(entry).exists();
                println!(
                    "{}: {}",
                    entry,
                    if present { "present" } else { "missing" }
                );
            }
        }
    }
}

fn fail(msg: &str) -> ! {
    eprintln!("{} {}", error_prefix(), msg);
    std::process::exit(2);
}

/// Resolve settings, exiting with code 2 on configuration problems.
fn effective(repo_root: Option<&str>, output: Option<&str>, parallel: Option<bool>) -> Effective {
    let eff = match config::resolve_effective(repo_root, output, parallel) {
        Ok(e) => e,
        Err(e) => fail(&e.to_string()),
    };
    if eff.config_path.is_none() && eff.output != "json" {
        eprintln!(
            "{} No pwlint.toml found; using defaults.",
            note_prefix()
        );
    }
    eff
}

fn build_validator(eff: &Effective) -> Validator {
    match Validator::new(&eff.engine) {
        Ok(v) => v,
        Err(e) => fail(&e.to_string()),
    }
}

/// Literal paths are used as given; anything else is expanded as a glob.
fn expand_paths(args: &[String]) -> Vec<PathBuf> {
    let mut seen: BTreeSet<PathBuf> = BTreeSet::new();
    let mut files = Vec::new();
    for arg in args {
        if Path::new(arg).is_file() {
            if seen.insert(PathBuf::from(arg)) {
                files.push(PathBuf::from(arg));
            }
            continue;
        }
        let entries = match glob::glob(arg) {
            Ok(g) => g,
            Err(e) => fail(&format!("Invalid pattern {}: {}", arg, e)),
        };
        let mut matched = false;
        for path in entries.flatten() {
            if path.is_file() {
                matched = true;
                if seen.insert(path.clone()) {
                    files.push(path);
                }
            }
        }
        if !matched {
            fail(&format!("No files match {}", arg));
        }
    }
    files
}
