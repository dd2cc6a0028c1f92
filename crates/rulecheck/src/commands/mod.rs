//! Command implementations for rulecheck
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod check;
mod enablers;
mod query;

pub use check::Check;
pub use enablers::Enablers;
pub use query::Query;

use std::path::PathBuf;

use clap::Args;
use rules_content::ContentFactory;
use rules_core::{Requirement, Ruleset};

/// Where the ruleset lives and how to read it.
#[derive(Args)]
pub struct RulesetArgs {
    /// Ruleset directory containing game.toml, units.toml, ...
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Accept and upgrade rulesets of the previous format
    #[arg(short, long)]
    pub compat: bool,
}

impl RulesetArgs {
    pub fn factory(&self) -> ContentFactory {
        ContentFactory::new(&self.dir).with_compat_mode(self.compat)
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human readable text
    Text,
    /// JSON output
    Json,
}

pub fn describe_req(req: &Requirement, ruleset: &Ruleset) -> String {
    let mut text = req.describe(ruleset);
    if req.quiet {
        text.push_str(" (quiet)");
    }
    text
}
