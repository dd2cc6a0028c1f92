//! `effects.toml`.
//!
//! Only the effect types the action engine reads are kept. The rest belong
//! to other parts of a game server and are skipped.

use rules_core::{Effect, EffectKind, Ruleset};
use serde::{Deserialize, Serialize};

use super::reqs::{ReqSpec, resolve_reqs};
use crate::error::LoadError;

pub const FILE: &str = "effects.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectsFile {
    pub datafile: super::DatafileHeader,
    #[serde(default, rename = "effect")]
    pub effects: Vec<EffectSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: i32,
    #[serde(default)]
    pub reqs: Vec<ReqSpec>,
}

/// Appends the effects the engine reads. Returns how many were skipped.
pub fn load_effects(file: &EffectsFile, ruleset: &mut Ruleset, version: u32) -> Result<usize, LoadError> {
    let mut skipped = 0;
    for spec in &file.effects {
        let Ok(kind) = spec.kind.parse::<EffectKind>() else {
            tracing::debug!(effect = %spec.kind, "skipping effect type");
            skipped += 1;
            continue;
        };
        let reqs = resolve_reqs(&spec.reqs, ruleset, version, FILE, &spec.kind)?;
        ruleset.effects.push(Effect::new(kind, spec.value, reqs));
    }
    Ok(skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rules_core::compat::RSFORMAT_CURRENT;

    #[test]
    fn unknown_types_are_skipped() {
        let file: EffectsFile = toml::from_str(
            r#"
[datafile]
options = "+Freeciv-ruleset-3.1-Devel-2021.Jan.01"

[[effect]]
type = "Spy_Resistant"
value = 25
reqs = [{ type = "MinSize", name = "8", range = "City" }]

[[effect]]
type = "Output_Bonus"
value = 50
"#,
        )
        .unwrap();
        let mut ruleset = Ruleset::new("effects");
        let skipped = load_effects(&file, &mut ruleset, RSFORMAT_CURRENT).unwrap();
        assert_eq!(skipped, 1);
        assert_eq!(ruleset.effects.len(), 1);
        assert_eq!(ruleset.effects[0].kind, EffectKind::SpyResistant);
    }
}
