//! Dump the enabler store of an upgraded ruleset.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use rules_core::{ActionEnabler, ActionId, ReqVec, Ruleset};

use super::{RulesetArgs, describe_req};

/// Dump the enabler store after the upgrade
#[derive(Parser)]
pub struct Enablers {
    #[command(flatten)]
    ruleset: RulesetArgs,

    /// Only show enablers of this action (rule name, e.g. "Found City")
    #[arg(short, long, value_name = "ACTION")]
    action: Option<String>,

    /// Include enablers the upgrader disabled
    #[arg(long)]
    disabled: bool,
}

impl Enablers {
    pub fn execute(self) -> Result<()> {
        let filter = match self.action.as_deref() {
            Some(name) => Some(
                ActionId::from_rule_name(name).with_context(|| format!("Unknown action: {}", name))?,
            ),
            None => None,
        };
        let upgraded = self
            .ruleset
            .factory()
            .load_ruleset()
            .with_context(|| format!("Failed to load ruleset {}", self.ruleset.dir.display()))?;
        let context = &upgraded.context;

        let actions = ActionId::all().filter(|id| filter.is_none_or(|wanted| wanted == *id));
        for action in actions {
            let enablers: Vec<&ActionEnabler> = context
                .enablers
                .all_for_action(action)
                .iter()
                .filter(|enabler| self.disabled || enabler.is_active())
                .collect();
            if enablers.is_empty() {
                continue;
            }
            println!(
                "{} ({})",
                style(action.rule_name()).bold().green(),
                context.catalog.get(action).ui_name
            );
            for (index, enabler) in enablers.iter().enumerate() {
                let marker = if enabler.is_active() {
                    style(format!("#{}", index)).cyan()
                } else {
                    style(format!("#{} disabled", index)).red()
                };
                println!("  {}", marker);
                print_reqs("actor", &enabler.actor_reqs, &context.ruleset);
                print_reqs("target", &enabler.target_reqs, &context.ruleset);
            }
            println!();
        }
        Ok(())
    }
}

fn print_reqs(side: &str, reqs: &ReqVec, ruleset: &Ruleset) {
    if reqs.is_empty() {
        println!("    {}: -", side);
        return;
    }
    println!("    {} ({}):", side, reqs.mode());
    for req in reqs.iter() {
        println!("      {}", describe_req(req, ruleset));
    }
}
