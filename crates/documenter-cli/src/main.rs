//! `documenter`: generate, review and package documents under a spend budget.
//!
//! Every command loads settings, opens the ledger (running pending
//! migrations) and builds the orchestrator explicitly; nothing is global.
//! Results are printed to stdout as pretty JSON.
//!
//! Exit codes: `budget` exits `0` for OK/INFO, `1` for CRITICAL and `2` for
//! WARNING. Any error exits `3`.

#![deny(unsafe_code)]

mod commands;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use documenter_settings::{load_settings, load_settings_from_path};

/// Exit code for any command failure.
const EXIT_ERROR: u8 = 3;

#[derive(Debug, Parser)]
#[command(
    name = "documenter",
    about = "Document governance engine: generation, review and licensing under a cost budget",
    version
)]
struct Cli {
    /// Settings file (default: `~/.documenter/settings.json`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open the ledger and apply pending schema migrations.
    Migrate,

    /// Generate a draft document.
    Generate {
        /// Document type (`technical_spec`, `api_docs`, `user_manual`, ...).
        #[arg(long, default_value = "technical_spec")]
        doc_type: String,
        /// Product context for the prompt.
        #[arg(long)]
        context: String,
        /// Feature list for the prompt.
        #[arg(long)]
        features: Option<String>,
        /// Requester label stored on the activity.
        #[arg(long, default_value = "cli")]
        source: String,
        /// Write a review copy right away.
        #[arg(long)]
        review: bool,
    },

    /// Write the review copy of a draft.
    Stage {
        /// Document id.
        document_id: i64,
    },

    /// Reconcile a reviewed file with its document.
    SubmitReview {
        /// The reviewed file.
        path: PathBuf,
        /// Use this document instead of matching by filename.
        #[arg(long)]
        document_id: Option<i64>,
        /// Reviewer name.
        #[arg(long)]
        reviewer: String,
        /// Summary of the changes made.
        #[arg(long, default_value = "")]
        changes: String,
        /// Time spent reviewing, in seconds.
        #[arg(long)]
        review_seconds: Option<i64>,
        /// Quality score in `[0, 1]`.
        #[arg(long)]
        quality: Option<f64>,
        /// Prepare the licensing file in the same step.
        #[arg(long)]
        prepare_licensing: bool,
    },

    /// Wrap a reviewed document for licensing.
    PrepareLicensing {
        /// Document id.
        document_id: i64,
    },

    /// Bundle all licensing-ready files into a package.
    Package {
        /// Product name.
        product: String,
        /// Product version.
        #[arg(long, default_value = "1.0")]
        version: String,
    },

    /// Check month-to-date spend against the budget.
    Budget {
        /// Turn the force-local switch off after the check.
        #[arg(long)]
        clear_force_local: bool,
    },

    /// Derive insights from recent reviews and learned patterns.
    Insights {
        /// Window in days (default: `learning.insight_window_days`).
        #[arg(long)]
        days: Option<u32>,
    },

    /// Activity totals and per-day spend.
    Costs {
        /// Window in days.
        #[arg(long, default_value_t = 30)]
        days: u32,
    },

    /// Documents waiting for review, and those stuck there.
    Status,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "command failed");
            eprintln!("error: {e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    let settings = match &cli.config {
        Some(path) => load_settings_from_path(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => load_settings().context("failed to load settings")?,
    };
    logging::init(&settings.logging);
    commands::dispatch(cli.command, &settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn submit_review_arguments() {
        let cli = Cli::try_parse_from([
            "documenter",
            "submit-review",
            "docs/review/reviewed_api_docs_3.md",
            "--reviewer",
            "Sam",
            "--quality",
            "0.9",
            "--prepare-licensing",
        ])
        .unwrap();
        match cli.command {
            Command::SubmitReview {
                path,
                reviewer,
                quality,
                prepare_licensing,
                document_id,
                ..
            } => {
                assert_eq!(path, PathBuf::from("docs/review/reviewed_api_docs_3.md"));
                assert_eq!(reviewer, "Sam");
                assert_eq!(quality, Some(0.9));
                assert!(prepare_licensing);
                assert_eq!(document_id, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["documenter", "budget", "--config", "/etc/documenter.json"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/documenter.json")));
        assert!(matches!(
            cli.command,
            Command::Budget {
                clear_force_local: false
            }
        ));
    }

    #[test]
    fn generate_requires_context() {
        assert!(Cli::try_parse_from(["documenter", "generate"]).is_err());
    }
}
