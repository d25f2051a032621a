//! `trustcheck run` command handler

use std::io::Write;
use std::path::Path;

use tracing::info;

use trustcheck_core::config::TrustcheckConfig;
use trustcheck_core::error::TrustcheckError;
use trustcheck_remote::build_topology;
use trustcheck_runner::report::{ScenarioOutcome, ScenarioReport, SuiteReport};
use trustcheck_runner::runner::{RunnerSettings, ScenarioRunner};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `run` command.
///
/// Returns `CliError::ScenariosFailed` when any scenario failed, errored or was skipped.
pub async fn execute(
    args: RunArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = TrustcheckConfig::load(config_path).await?;

    let scenarios = trustcheck_adtrust::select(&config.adtrust, &args.scenarios, args.tag.as_deref())
        .map_err(TrustcheckError::from)?;
    if scenarios.is_empty() {
        return Err(CliError::Command("no scenarios matched the selection".to_owned()));
    }
    if config.hosts.is_empty() {
        return Err(CliError::Config(format!(
            "{} defines no [[hosts]]",
            config_path.display()
        )));
    }

    let topology = build_topology(&config).map_err(TrustcheckError::from)?;
    let mut settings = RunnerSettings::from(&config.runner);
    settings.stop_on_first_failure |= args.fail_fast;

    info!(scenarios = scenarios.len(), hosts = topology.len(), "starting run");
    let suite = ScenarioRunner::new(topology, settings).run_all(&scenarios).await;

    writer.render(&suite)?;

    if suite.is_success() {
        Ok(())
    } else {
        Err(CliError::ScenariosFailed {
            failed: suite.scenarios.len() - suite.passed() + suite.skipped.len(),
            total: suite.scenarios.len() + suite.skipped.len(),
        })
    }
}

impl Render for SuiteReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Run {}", self.run_id.to_string().bold())?;
        writeln!(w)?;

        for scenario in &self.scenarios {
            render_scenario(scenario, w)?;
        }
        for name in &self.skipped {
            writeln!(w, "  {:<7} {}", "SKIP".yellow().bold(), name)?;
        }

        writeln!(w)?;
        let summary = format!(
            "{} passed, {} failed, {} errored, {} skipped",
            self.passed(),
            self.failed(),
            self.errored(),
            self.skipped.len()
        );
        let summary = if self.is_success() {
            summary.green().bold()
        } else {
            summary.red().bold()
        };
        writeln!(w, "Summary: {} ({} ms)", summary, self.duration_ms)?;

        Ok(())
    }
}

fn render_scenario(report: &ScenarioReport, w: &mut dyn Write) -> std::io::Result<()> {
    use colored::Colorize;

    let label = match &report.outcome {
        ScenarioOutcome::Passed => "PASS".green().bold(),
        ScenarioOutcome::Failed { .. } => "FAIL".red().bold(),
        ScenarioOutcome::Errored { .. } => "ERROR".red().bold(),
    };
    writeln!(
        w,
        "  {:<7} {} ({} ms)",
        label, report.name, report.duration_ms
    )?;

    match &report.outcome {
        ScenarioOutcome::Passed => {}
        ScenarioOutcome::Failed { failure } => {
            writeln!(w, "          {}", failure)?;
            if let Some(code) = failure.exit_code {
                writeln!(w, "          exit code: {code}")?;
            }
            let stderr = failure.stderr.trim();
            if !stderr.is_empty() {
                writeln!(w, "          stderr: {}", stderr.dimmed())?;
            }
        }
        ScenarioOutcome::Errored { error } => writeln!(w, "          {}", error.red())?,
    }

    for poll in &report.polls {
        writeln!(w, "          {}: {}", poll.label, poll.counts)?;
    }
    if report.teardown.failed > 0 {
        writeln!(
            w,
            "          teardown: {} of {} steps failed",
            report.teardown.failed.to_string().yellow(),
            report.teardown.executed
        )?;
        for err in &report.teardown.errors {
            writeln!(w, "            {}", err.yellow())?;
        }
    }

    Ok(())
}
