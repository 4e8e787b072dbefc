//! # sentinel
//!
//! Command-line entry point: capsule generation and context linting over a
//! repository root.

#![deny(unsafe_code)]

mod commands;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use sentinel_core::constants::VERSION;
use sentinel_core::init_subscriber;

use crate::output::{Outcome, OutputFormat};

/// Context integrity and capsule packaging.
#[derive(Parser, Debug)]
#[command(name = "sentinel", version, about = "Context integrity and capsule packaging")]
struct Cli {
    /// Repository root.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log level when `RUST_LOG` is unset (overrides settings).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Capsule operations.
    #[command(subcommand)]
    Capsule(CapsuleCommand),
    /// Allowed Context and limits operations.
    #[command(subcommand)]
    Context(ContextCommand),
}

#[derive(Subcommand, Debug)]
enum CapsuleCommand {
    /// Render capsule.md for a spec directory.
    Generate(GenerateArgs),
}

#[derive(Subcommand, Debug)]
enum ContextCommand {
    /// Check line budgets and embedded Allowed Context lists.
    Lint(LintArgs),
    /// Print the resolved Allowed Context list.
    List(ListArgs),
    /// Print the effective limits configuration.
    Limits(LimitsArgs),
}

/// Arguments for `capsule generate`.
#[derive(Args, Debug)]
struct GenerateArgs {
    /// Spec directory holding spec.md, plan.md, tasks.md.
    spec_dir: PathBuf,
    /// Decision identifier recorded in the header.
    #[arg(long)]
    decision: String,
    /// Producing agent (defaults to settings).
    #[arg(long)]
    agent: Option<String>,
    /// Rules hash (defaults to `<agent>@1.0`).
    #[arg(long)]
    rules_hash: Option<String>,
    /// Print the capsule instead of writing it.
    #[arg(long)]
    dry_run: bool,
}

/// Limits config location flags shared by `lint` and `limits`.
#[derive(Args, Debug, Default)]
struct LimitsLocation {
    /// Limits config (JSON or YAML), relative to the root.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Limits schema, relative to the root. Embedded when omitted.
    #[arg(long)]
    schema: Option<PathBuf>,
}

/// Arguments for `context lint`.
#[derive(Args, Debug)]
struct LintArgs {
    /// Lint only these capsule files.
    #[arg(long = "capsule")]
    capsules: Vec<String>,
    /// Fail on warnings as well as errors.
    #[arg(long)]
    strict: bool,
    #[command(flatten)]
    limits: LimitsLocation,
}

/// Arguments for `context list`.
#[derive(Args, Debug)]
struct ListArgs {
    /// Extra paths to include.
    #[arg(long = "seed")]
    seeds: Vec<String>,
}

/// Arguments for `context limits`.
#[derive(Args, Debug)]
struct LimitsArgs {
    #[command(flatten)]
    limits: LimitsLocation,
}

impl Command {
    /// Label used in failure messages.
    fn label(&self) -> &'static str {
        match self {
            Self::Capsule(CapsuleCommand::Generate(_)) => "capsule:generate",
            Self::Context(ContextCommand::Lint(_)) => "context:lint",
            Self::Context(ContextCommand::List(_)) => "context:list",
            Self::Context(ContextCommand::Limits(_)) => "context:limits",
        }
    }
}

async fn run(cli: Cli) -> Result<Outcome> {
    let Cli {
        root,
        format,
        log_level,
        command,
    } = cli;
    let settings = sentinel_settings::load_settings(&root)
        .with_context(|| format!("failed to load settings under {}", root.display()))?;
    init_subscriber(log_level.as_deref().unwrap_or(&settings.logging.level));
    tracing::debug!(version = VERSION, root = %root.display(), "sentinel starting");

    match command {
        Command::Capsule(CapsuleCommand::Generate(args)) => {
            commands::capsule::generate(&root, &settings, args, format).await
        }
        Command::Context(ContextCommand::Lint(args)) => {
            commands::context::lint(&root, &settings, args, format)
        }
        Command::Context(ContextCommand::List(args)) => {
            commands::context::list(&root, args, format)
        }
        Command::Context(ContextCommand::Limits(args)) => {
            commands::context::limits(&root, &settings, args, format)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let label = cli.command.label();
    let format = cli.format;

    match run(cli).await {
        Ok(outcome) => {
            print!("{}", outcome.stdout);
            if outcome.ok {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            output::report_failure(label, &err, format);
            ExitCode::FAILURE
        }
    }
}
