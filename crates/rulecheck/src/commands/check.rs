//! Load a ruleset and report what the upgrader did to it.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use rules_core::Upgraded;

use super::{OutputFormat, RulesetArgs};

/// Load, upgrade and sanity check a ruleset
#[derive(Parser)]
pub struct Check {
    #[command(flatten)]
    ruleset: RulesetArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Fail when the upgrade produced any warning
    #[arg(long)]
    strict: bool,
}

impl Check {
    pub fn execute(self) -> Result<()> {
        let upgraded = self
            .ruleset
            .factory()
            .load_ruleset()
            .with_context(|| format!("Failed to load ruleset {}", self.ruleset.dir.display()))?;

        match self.format {
            OutputFormat::Text => print_text(&upgraded),
            OutputFormat::Json => print_json(&upgraded)?,
        }

        if self.strict && !upgraded.warnings.is_empty() {
            anyhow::bail!("{} upgrade warning(s)", upgraded.warnings.len());
        }
        Ok(())
    }
}

fn print_text(upgraded: &Upgraded) {
    let ruleset = &upgraded.context.ruleset;
    println!("{} {}", style("Ruleset:").bold().cyan(), ruleset.name);
    println!("{} {:?}", style("Stage:").bold().cyan(), upgraded.stage);
    println!();

    println!("{}", style("Entities:").bold().yellow());
    println!("  Unit types: {}", ruleset.unit_types.len());
    println!("  Unit classes: {}", ruleset.unit_classes.len());
    println!("  Terrains: {}", ruleset.terrains.len());
    println!("  Extras: {}", ruleset.extras.len());
    println!("  Buildings: {}", ruleset.improvements.len());
    println!("  Effects: {}", ruleset.effects.len());
    println!();

    let enablers = &upgraded.context.enablers;
    let disabled = enablers.iter().filter(|enabler| !enabler.is_active()).count();
    println!("{}", style("Enablers:").bold().yellow());
    println!("  Total: {}", enablers.len());
    println!("  Disabled: {}", disabled);
    println!();

    if upgraded.warnings.is_empty() {
        println!("{}", style("No upgrade warnings").green());
        return;
    }
    println!(
        "{}",
        style(format!("Upgrade warnings ({}):", upgraded.warnings.len()))
            .bold()
            .red()
    );
    for warning in &upgraded.warnings {
        println!("  [{}] {}", style(warning.kind).yellow(), warning.message);
    }
}

fn print_json(upgraded: &Upgraded) -> Result<()> {
    let warnings: Vec<_> = upgraded
        .warnings
        .iter()
        .map(|warning| {
            serde_json::json!({
                "kind": warning.kind.as_ref(),
                "message": warning.message,
            })
        })
        .collect();
    let report = serde_json::json!({
        "ruleset": upgraded.context.ruleset.name,
        "stage": format!("{:?}", upgraded.stage),
        "enablers": upgraded.context.enablers.len(),
        "warnings": warnings,
    });
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report to JSON")?;
    println!("{}", json);
    Ok(())
}
