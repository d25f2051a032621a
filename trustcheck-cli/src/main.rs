//! trustcheck -- runs IPA-AD trust integration scenarios.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;
use colored::Colorize;

use trustcheck_core::config::{GeneralConfig, TrustcheckConfig};

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // 설정 파일이 없거나 잘못되어도 로깅은 기본값으로 시작한다
    let general = TrustcheckConfig::load(&cli.config)
        .await
        .map(|c| c.general)
        .unwrap_or_else(|_| GeneralConfig::default());
    if let Err(e) = logging::init_tracing(&general, cli.log_level.as_deref()) {
        eprintln!("{} {e:#}", "error:".red().bold());
        std::process::exit(2);
    }

    trustcheck_core::metrics::describe_metrics();
    tracing::debug!(config = %cli.config.display(), "trustcheck starting");

    if let Err(e) = dispatch(cli).await {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

async fn dispatch(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);
    match cli.command {
        Commands::Run(args) => commands::run::execute(args, &cli.config, &writer).await,
        Commands::List(args) => commands::list::execute(args, &writer),
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
    }
}
