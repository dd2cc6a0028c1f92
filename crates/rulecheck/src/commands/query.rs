//! Ask the engine about one action in a world snapshot.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use rules_content::WorldLoader;
use rules_core::{ActionEngine, ActionId, ActionTarget, CityId, TilePos, UnitId};

use super::{OutputFormat, RulesetArgs};

/// Legality and probability of one action in a world snapshot
#[derive(Parser)]
pub struct Query {
    #[command(flatten)]
    ruleset: RulesetArgs,

    /// World snapshot (RON)
    #[arg(short, long, value_name = "FILE")]
    snapshot: PathBuf,

    /// Action rule name, e.g. "Establish Embassy Stay"
    #[arg(short, long, value_name = "ACTION")]
    action: String,

    /// Id of the acting unit
    #[arg(long, value_name = "UNIT")]
    actor: u32,

    /// Target: `city:ID`, `unit:ID`, `units:X,Y`, `tile:X,Y` or `self`
    #[arg(short, long, value_name = "TARGET", default_value = "self")]
    target: TargetArg,

    /// Extra picked as sub target of a tile target
    #[arg(long, value_name = "EXTRA")]
    extra: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

/// Target as typed on the command line. Extras are named separately since
/// they need the ruleset to resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TargetArg {
    City(u32),
    Unit(u32),
    Units(i32, i32),
    Tile(i32, i32),
    SelfTarget,
}

impl FromStr for TargetArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("self") {
            return Ok(Self::SelfTarget);
        }
        let (kind, value) = s
            .split_once(':')
            .ok_or_else(|| format!("expected KIND:VALUE or `self`, got `{}`", s))?;
        let id = || value.parse::<u32>().map_err(|e| format!("bad id `{}`: {}", value, e));
        let pos = || -> Result<(i32, i32), String> {
            let (x, y) = value
                .split_once(',')
                .ok_or_else(|| format!("expected X,Y, got `{}`", value))?;
            let coord = |c: &str| c.trim().parse::<i32>().map_err(|e| format!("bad coordinate `{}`: {}", c, e));
            Ok((coord(x)?, coord(y)?))
        };
        match kind.to_ascii_lowercase().as_str() {
            "city" => Ok(Self::City(id()?)),
            "unit" => Ok(Self::Unit(id()?)),
            "units" => pos().map(|(x, y)| Self::Units(x, y)),
            "tile" => pos().map(|(x, y)| Self::Tile(x, y)),
            other => Err(format!("unknown target kind `{}`", other)),
        }
    }
}

impl Query {
    pub fn execute(self) -> Result<()> {
        let action =
            ActionId::from_rule_name(&self.action).with_context(|| format!("Unknown action: {}", self.action))?;
        let upgraded = self
            .ruleset
            .factory()
            .load_ruleset()
            .with_context(|| format!("Failed to load ruleset {}", self.ruleset.dir.display()))?;
        let context = &upgraded.context;
        let world = WorldLoader::load(&self.snapshot, &context.ruleset)?;

        let extra = match self.extra.as_deref() {
            Some(name) => Some(
                context
                    .ruleset
                    .find_extra(name)
                    .with_context(|| format!("Unknown extra: {}", name))?,
            ),
            None => None,
        };
        let target = match self.target {
            TargetArg::City(id) => ActionTarget::City(CityId(id)),
            TargetArg::Unit(id) => ActionTarget::Unit(UnitId(id)),
            TargetArg::Units(x, y) => ActionTarget::Units(TilePos::new(x, y)),
            TargetArg::Tile(x, y) => ActionTarget::Tile {
                tile: TilePos::new(x, y),
                extra,
            },
            TargetArg::SelfTarget => ActionTarget::SelfTarget,
        };

        let actor = world
            .unit(UnitId(self.actor))
            .with_context(|| format!("No unit {} in snapshot", self.actor))?;
        let target_ref = target
            .resolve(&world)
            .with_context(|| format!("Target {:?} not found in snapshot", target))?;

        let engine = ActionEngine::new(context, &world);
        let enabled = engine.is_action_enabled(action, actor, target_ref);
        let local = engine.action_enabled_local(action, actor, target_ref);
        let prob = engine.action_prob(action, actor, target_ref);
        tracing::debug!(action = %action, actor = self.actor, ?target, "query evaluated");

        match self.format {
            OutputFormat::Text => {
                println!("{} {}", style("Action:").bold().cyan(), action.rule_name());
                println!("{} {} ({})", style("Actor:").bold().cyan(), actor.id, actor.owner);
                println!("{} {:?}", style("Target:").bold().cyan(), target);
                println!();
                let verdict = if enabled {
                    style("legal").green()
                } else {
                    style("illegal").red()
                };
                println!("  Legality: {}", verdict);
                println!("  As the owner knows it: {}", local);
                println!("  Success chance: {}", prob);
            }
            OutputFormat::Json => {
                let report = serde_json::json!({
                    "action": action.rule_name(),
                    "actor": self.actor,
                    "target": format!("{:?}", target),
                    "enabled": enabled,
                    "enabled_local": local.as_ref(),
                    "prob": prob.to_string(),
                    "prob_wire": prob.to_wire(),
                });
                let json = serde_json::to_string_pretty(&report).context("Failed to serialize query to JSON")?;
                println!("{}", json);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_args_parse() {
        assert_eq!("self".parse::<TargetArg>(), Ok(TargetArg::SelfTarget));
        assert_eq!("city:12".parse::<TargetArg>(), Ok(TargetArg::City(12)));
        assert_eq!("Tile:3, 4".parse::<TargetArg>(), Ok(TargetArg::Tile(3, 4)));
        assert_eq!("units:0,-1".parse::<TargetArg>(), Ok(TargetArg::Units(0, -1)));
        assert!("unit:x".parse::<TargetArg>().is_err());
        assert!("road:1,1".parse::<TargetArg>().is_err());
    }
}
