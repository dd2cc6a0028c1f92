//! Ruleset effects: signed values that apply while their requirements hold.

use crate::metaknowledge::mke_eval_reqs;
use crate::requirement::{Env, ReqContext, ReqProbType, ReqVec, are_reqs_active};
use crate::state::Player;
use crate::tri::Tri;

/// Effect types the action engine reads or the upgrader rewrites.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum EffectKind {
    /// Percent reduction of a diplomatic attacker's odds.
    #[strum(serialize = "Spy_Resistant")]
    SpyResistant,
    #[strum(serialize = "Saboteur_Resistant")]
    SaboteurResistant,
    /// Move fragments lost when an illegal action is attempted.
    #[strum(serialize = "Illegal_Action_Move_Cost")]
    IllegalActionMoveCost,
    #[strum(serialize = "Irrig_Possible")]
    IrrigPossible,
    #[strum(serialize = "Mining_Possible")]
    MiningPossible,
    #[strum(serialize = "Transform_Possible")]
    TransformPossible,
    /// City size limit. Zero means no limit.
    #[strum(serialize = "Size_Adj")]
    SizeAdj,
    #[strum(serialize = "Size_Unlimit")]
    SizeUnlimit,
    /// Percent adjustment of a unit's defense.
    #[strum(serialize = "Defend_Bonus")]
    DefendBonus,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Effect {
    pub kind: EffectKind,
    pub value: i32,
    pub reqs: ReqVec,
}

impl Effect {
    pub fn new(kind: EffectKind, value: i32, reqs: ReqVec) -> Self {
        Self { kind, value, reqs }
    }
}

/// Sum of every effect of `kind` whose requirements hold for the target.
pub fn get_target_bonus_effects(
    env: Env<'_>,
    target: &ReqContext<'_>,
    other: &ReqContext<'_>,
    kind: EffectKind,
) -> i32 {
    env.ruleset
        .effects
        .iter()
        .filter(|effect| effect.kind == kind)
        .filter(|effect| are_reqs_active(env, target, other, &effect.reqs, ReqProbType::Certain))
        .map(|effect| effect.value)
        .sum()
}

/// True when `pov` can tell which effects of `kind` apply to the target.
pub fn is_effect_val_known(
    env: Env<'_>,
    kind: EffectKind,
    pov: &Player,
    target: &ReqContext<'_>,
    other: &ReqContext<'_>,
) -> bool {
    env.ruleset
        .effects
        .iter()
        .filter(|effect| effect.kind == kind)
        .all(|effect| {
            mke_eval_reqs(env, pov, target, other, &effect.reqs, ReqProbType::Certain) != Tri::Maybe
        })
}
