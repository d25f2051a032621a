//! CLI argument parsing using clap derive API
//!
//! Purely declarative; no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// trustcheck -- IPA-AD trust / SSSD integration scenario runner.
///
/// Use `trustcheck <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "trustcheck", version, about, long_about = None)]
pub struct Cli {
    /// Path to the trustcheck.toml configuration file.
    #[arg(short, long, global = true, default_value = "trustcheck.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios against the configured topology.
    Run(RunArgs),

    /// List available scenarios.
    List(ListArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- run ----

/// Run scenarios sequentially; teardown always runs for each scenario.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Scenario names to run (default: all).
    pub scenarios: Vec<String>,

    /// Only run scenarios carrying this tag.
    #[arg(long)]
    pub tag: Option<String>,

    /// Skip remaining scenarios after the first failure.
    #[arg(long)]
    pub fail_fast: bool,
}

// ---- list ----

/// List scenario names, ids and titles.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only list scenarios carrying this tag.
    #[arg(long)]
    pub tag: Option<String>,
}

// ---- config ----

/// Manage trustcheck configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, ssh, hosts, runner, adtrust).
        #[arg(long)]
        section: Option<String>,
    },
}
