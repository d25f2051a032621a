//! `trustcheck list` command handler

use std::io::Write;

use serde::Serialize;

use trustcheck_core::config::AdTrustConfig;
use trustcheck_runner::scenario::matches_filter;

use crate::cli::ListArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `list` command.
///
/// Scenario metadata does not depend on the configuration, so no config file is read.
pub fn execute(args: ListArgs, writer: &OutputWriter) -> Result<(), CliError> {
    let report = build_list(args.tag.as_deref());
    writer.render(&report)
}

fn build_list(tag: Option<&str>) -> ScenarioList {
    let scenarios = trustcheck_adtrust::catalog(&AdTrustConfig::default())
        .iter()
        .filter(|s| matches_filter(s.as_ref(), &[], tag))
        .map(|s| ScenarioEntry {
            name: s.name().to_owned(),
            id: s.id().to_owned(),
            title: s.title().to_owned(),
            tags: s.tags().iter().map(|t| (*t).to_owned()).collect(),
            bugzilla: s.bugzilla().iter().map(|b| (*b).to_owned()).collect(),
        })
        .collect();
    ScenarioList { scenarios }
}

/// Scenario listing.
#[derive(Serialize)]
pub struct ScenarioList {
    pub scenarios: Vec<ScenarioEntry>,
}

#[derive(Serialize)]
pub struct ScenarioEntry {
    pub name: String,
    pub id: String,
    pub title: String,
    pub tags: Vec<String>,
    pub bugzilla: Vec<String>,
}

impl Render for ScenarioList {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.scenarios.is_empty() {
            writeln!(w, "No scenarios matched.")?;
            return Ok(());
        }

        writeln!(w, "{:<40} {:<38} {}", "NAME", "ID", "TAGS")?;
        writeln!(w, "{}", "-".repeat(96))?;
        for s in &self.scenarios {
            writeln!(w, "{:<40} {:<38} {}", s.name.bold(), s.id, s.tags.join(","))?;
            writeln!(w, "  {}", s.title.dimmed())?;
        }

        Ok(())
    }
}
