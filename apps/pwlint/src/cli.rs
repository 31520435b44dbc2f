//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "pwlint",
    version,
    about = "pwlint: static validation for generated pytest/Playwright tests",
    long_about = "pwlint checks generated pytest/Playwright test scripts for structural defects and quality smells before they are accepted into a suite.\n\nConfiguration precedence: CLI > pwlint.toml > defaults.",
    after_help = "Examples:\n  pwlint validate tests/test_login.py\n  pwlint validate 'tests/**/*.py' --output json\n  pwlint accept generated.json --story 'As a user I want to login'\n  pwlint rules",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands for validating and accepting generated tests.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current pwlint version.")]
    Version,
    /// Validate test files
    #[command(
        about = "Validate test files",
        long_about = "Parse each file and run every enabled rule. Any error finding makes the file invalid and the exit code 1.",
        after_help = "Examples:\n  pwlint validate tests/test_login.py\n  pwlint validate 'tests/**/*.py' --parallel --output json"
    )]
    Validate {
        #[arg(required = true, help = "Files or glob patterns to validate")]
        paths: Vec<String>,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Evaluate rules in parallel")]
        parallel: bool,
    },
    /// Accept a generated test
    #[command(
        about = "Validate and save a generated test",
        long_about = "Read a generator result ({\"code\": ..., \"gherkin\": ...}), validate its code and save it under the output directory.",
        after_help = "Examples:\n  pwlint accept generated.json --story 'As a shopper I want to add items to my cart'\n  pwlint accept generated.json --filename test_cart.py --show-gherkin"
    )]
    Accept {
        #[arg(help = "Path to the generator result JSON")]
        generated: String,
        #[arg(long, conflicts_with = "story_file", help = "User story the test was generated from")]
        story: Option<String>,
        #[arg(long, help = "Read the user story from a file")]
        story_file: Option<String>,
        #[arg(long, default_value = "tests", help = "Directory to save the test into")]
        out_dir: String,
        #[arg(long, help = "File name override (default: derived from the story)")]
        filename: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Print the generated Gherkin scenario")]
        show_gherkin: bool,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
    /// List enabled rules
    #[command(
        about = "List enabled rules",
        long_about = "Print the enabled rules (after `[rules] disable`) with their severities and descriptions, in evaluation order."
    )]
    Rules {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
    /// Show environment information
    #[command(
        about = "Show environment information",
        long_about = "Print version, working directory, discovered config, API key status and project layout."
    )]
    Info {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_validate_args() {
        let cli = Cli::parse_from(["pwlint", "validate", "a.py", "b/*.py", "--parallel"]);
        match cli.cmd {
            Commands::Validate {
                paths, parallel, ..
            } => {
                assert_eq!(paths, vec!["a.py", "b/*.py"]);
                assert!(parallel);
            }
            _ => panic!("expected validate"),
        }
    }

    #[test]
    fn test_accept_defaults_out_dir() {
        let cli = Cli::parse_from(["pwlint", "accept", "gen.json", "--story", "As a user"]);
        match cli.cmd {
            Commands::Accept { out_dir, story, .. } => {
                assert_eq!(out_dir, "tests");
                assert_eq!(story.as_deref(), Some("As a user"));
            }
            _ => panic!("expected accept"),
        }
    }

    #[test]
    fn test_story_sources_conflict() {
        let res = Cli::try_parse_from([
            "pwlint", "accept", "g.json", "--story", "x", "--story-file", "s.txt",
        ]);
        assert!(res.is_err());
    }
}
