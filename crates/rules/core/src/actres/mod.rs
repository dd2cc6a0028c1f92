//! Action results: what an action does to the game, and the hard-coded
//! rules that come with it.
//!
//! Several actions can share a result (an action and its escape variant,
//! for example). Everything result specific lives behind [`ResultRule`]:
//! unit type requirements, actor state requirements and the
//! target preconditions that can't be written as requirement vectors.
mod actor;
mod city;
mod tile;
mod unit;

use crate::action::ActionId;
use crate::config::RulesConfig;
use crate::ids::ExtraId;
use crate::requirement::{Env, ReqContext};
use crate::ruleset::{Ruleset, UnitType};
use crate::state::{City, Player, Unit};
use crate::tri::Tri;

pub(crate) use actor::unit_upgrade_price;
pub(crate) use tile::pillageable_extras;
pub(crate) use unit::can_unit_attack_tile;

/// Result of performing an action.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::AsRefStr,
    strum::EnumIter,
    strum::EnumCount,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionResult {
    EstablishEmbassy,
    InvestigateCity,
    PoisonCity,
    StealGold,
    SabotageCity,
    TargetedSabotageCity,
    StealTech,
    TargetedStealTech,
    InciteCity,
    TradeRoute,
    Marketplace,
    HelpWonder,
    BribeUnit,
    SabotageUnit,
    CaptureUnits,
    FoundCity,
    JoinCity,
    StealMaps,
    Bombard,
    SpyNuke,
    Nuke,
    NukeCity,
    NukeUnits,
    DestroyCity,
    ExpelUnit,
    DisbandUnitRecover,
    DisbandUnit,
    HomeCity,
    UpgradeUnit,
    Paradrop,
    ParadropConquer,
    Airlift,
    Attack,
    ConquerCity,
    HealUnit,
    TransformTerrain,
    Irrigate,
    Mine,
    Pillage,
    Fortify,
    ConvertUnit,
    SpyAttack,
    WipeUnits,
}

/// Whether a sub target (a building, a tech, an extra) must be chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum SubTargetCompletion {
    /// No sub target.
    Simple,
    /// The player must pick one.
    Mandatory,
    /// The player may pick one; otherwise the game does.
    Flexible,
}

/// Kind of fight an action can start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum BattleKind {
    None,
    /// Diplomat against defending diplomats.
    Diplomatic,
    /// Regular combat against the best defender.
    Standard,
}

/// Whether a result counts as an act of aggression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum Hostility {
    Hostile,
    Peaceful,
    /// Left for the ruleset to decide.
    Unsettled,
}

impl ActionResult {
    pub const fn sub_target_completion(self) -> SubTargetCompletion {
        match self {
            Self::TargetedSabotageCity | Self::TargetedStealTech => SubTargetCompletion::Mandatory,
            Self::Pillage | Self::Irrigate | Self::Mine => SubTargetCompletion::Flexible,
            _ => SubTargetCompletion::Simple,
        }
    }

    pub const fn battle_kind(self) -> BattleKind {
        match self {
            Self::EstablishEmbassy
            | Self::InvestigateCity
            | Self::PoisonCity
            | Self::StealGold
            | Self::SabotageCity
            | Self::TargetedSabotageCity
            | Self::StealTech
            | Self::TargetedStealTech
            | Self::InciteCity
            | Self::BribeUnit
            | Self::SabotageUnit
            | Self::StealMaps
            | Self::SpyNuke
            | Self::SpyAttack => BattleKind::Diplomatic,
            Self::Attack => BattleKind::Standard,
            _ => BattleKind::None,
        }
    }

    pub const fn hostility(self) -> Hostility {
        match self {
            Self::InvestigateCity
            | Self::PoisonCity
            | Self::StealGold
            | Self::SabotageCity
            | Self::TargetedSabotageCity
            | Self::StealTech
            | Self::TargetedStealTech
            | Self::InciteCity
            | Self::BribeUnit
            | Self::SabotageUnit
            | Self::CaptureUnits
            | Self::StealMaps
            | Self::Bombard
            | Self::SpyNuke
            | Self::Nuke
            | Self::NukeCity
            | Self::NukeUnits
            | Self::DestroyCity
            | Self::ExpelUnit
            | Self::Attack
            | Self::ConquerCity
            | Self::Pillage
            | Self::SpyAttack
            | Self::WipeUnits => Hostility::Hostile,
            Self::ParadropConquer => Hostility::Unsettled,
            _ => Hostility::Peaceful,
        }
    }

    /// Hostility after applying the ruleset's decision for unsettled
    /// results. `None` when the ruleset leaves it open.
    pub fn is_hostile(self, config: &RulesConfig) -> Option<bool> {
        match self.hostility() {
            Hostility::Hostile => Some(true),
            Hostility::Peaceful => Some(false),
            Hostility::Unsettled => config.paradrop_conquer_hostile,
        }
    }

    /// The hard-coded rules of this result.
    pub fn rule(self) -> &'static dyn ResultRule {
        match self {
            Self::EstablishEmbassy => &city::Embassy,
            Self::InvestigateCity
            | Self::PoisonCity
            | Self::SabotageCity
            | Self::TargetedSabotageCity
            | Self::StealTech
            | Self::InciteCity
            | Self::StealMaps
            | Self::SpyNuke
            | Self::DestroyCity
            | Self::DisbandUnitRecover => &NoHardRules,
            Self::TargetedStealTech => &city::TargetedStealTech,
            Self::StealGold => &city::StealGold,
            Self::TradeRoute | Self::Marketplace => &city::Trade,
            Self::HelpWonder => &city::HelpWonder,
            Self::JoinCity => &city::JoinCity,
            Self::HomeCity => &city::HomeCity,
            Self::Airlift => &city::Airlift,
            Self::ConquerCity => &city::ConquerCity,
            Self::BribeUnit | Self::CaptureUnits => &unit::TransferUnit,
            Self::SabotageUnit | Self::ExpelUnit => &NoHardRules,
            Self::HealUnit => &unit::HealUnit,
            Self::Bombard => &unit::Bombard,
            Self::Nuke | Self::NukeCity | Self::NukeUnits => &unit::Nuke,
            Self::Attack => &unit::Attack,
            Self::WipeUnits => &unit::WipeUnits,
            Self::SpyAttack => &unit::SpyAttack,
            Self::FoundCity => &tile::FoundCity,
            Self::Paradrop | Self::ParadropConquer => &tile::Paradrop,
            Self::TransformTerrain => &tile::TransformTerrain,
            Self::Irrigate => &tile::Irrigate,
            Self::Mine => &tile::Mine,
            Self::Pillage => &tile::Pillage,
            Self::DisbandUnit => &NoHardRules,
            Self::UpgradeUnit => &actor::UpgradeUnit,
            Self::Fortify => &actor::Fortify,
            Self::ConvertUnit => &actor::ConvertUnit,
        }
    }
}

impl ActionId {
    /// The result this action produces.
    pub const fn result(self) -> ActionResult {
        use ActionId as A;
        use ActionResult as R;
        match self {
            A::EstablishEmbassy | A::EstablishEmbassyStay => R::EstablishEmbassy,
            A::SpyInvestigateCity | A::InvestigateCitySpend => R::InvestigateCity,
            A::SpyPoison | A::SpyPoisonEsc => R::PoisonCity,
            A::SpyStealGold | A::SpyStealGoldEsc => R::StealGold,
            A::SpySabotageCity | A::SpySabotageCityEsc => R::SabotageCity,
            A::SpyTargetedSabotageCity | A::SpyTargetedSabotageCityEsc => R::TargetedSabotageCity,
            A::SpyStealTech | A::SpyStealTechEsc => R::StealTech,
            A::SpyTargetedStealTech | A::SpyTargetedStealTechEsc => R::TargetedStealTech,
            A::SpyInciteCity | A::SpyInciteCityEsc => R::InciteCity,
            A::TradeRoute => R::TradeRoute,
            A::Marketplace => R::Marketplace,
            A::HelpWonder => R::HelpWonder,
            A::SpyBribeUnit => R::BribeUnit,
            A::SpySabotageUnit | A::SpySabotageUnitEsc => R::SabotageUnit,
            A::CaptureUnits => R::CaptureUnits,
            A::FoundCity => R::FoundCity,
            A::JoinCity => R::JoinCity,
            A::StealMaps | A::StealMapsEsc => R::StealMaps,
            A::Bombard => R::Bombard,
            A::SpyNuclear | A::SpyNuclearEsc => R::SpyNuke,
            A::Nuke => R::Nuke,
            A::NukeCity => R::NukeCity,
            A::NukeUnits => R::NukeUnits,
            A::DestroyCity => R::DestroyCity,
            A::ExpelUnit => R::ExpelUnit,
            A::DisbandUnitRecover => R::DisbandUnitRecover,
            A::DisbandUnit => R::DisbandUnit,
            A::HomeCity => R::HomeCity,
            A::UpgradeUnit => R::UpgradeUnit,
            A::Paradrop => R::Paradrop,
            A::ParadropConquer => R::ParadropConquer,
            A::Airlift => R::Airlift,
            A::Attack | A::SuicideAttack => R::Attack,
            A::ConquerCity | A::ConquerCity2 => R::ConquerCity,
            A::HealUnit => R::HealUnit,
            A::TransformTerrain => R::TransformTerrain,
            A::Irrigate => R::Irrigate,
            A::Mine => R::Mine,
            A::Pillage => R::Pillage,
            A::Fortify => R::Fortify,
            A::ConvertUnit => R::ConvertUnit,
            A::SpyAttack => R::SpyAttack,
            A::WipeUnits => R::WipeUnits,
        }
    }
}

// ============================================================================
// Result rules
// ============================================================================

/// Everything a result rule may look at for one (actor, target) pair.
#[derive(Clone, Copy, Debug)]
pub struct ResultQuery<'a> {
    pub env: Env<'a>,
    pub config: &'a RulesConfig,
    pub action: ActionId,
    pub actor: &'a ReqContext<'a>,
    pub target: &'a ReqContext<'a>,
    /// Extra picked as sub target, if any.
    pub target_extra: Option<ExtraId>,
    /// The actor unit's home city, if it has one.
    pub homecity: Option<&'a City>,
    /// The evaluator sees everything. The server is omniscient; a player
    /// asking about odds isn't.
    pub omniscient: bool,
}

impl<'a> ResultQuery<'a> {
    pub fn actor_player(&self) -> Option<&'a Player> {
        self.actor.player
    }

    pub fn actor_unit(&self) -> Option<&'a Unit> {
        self.actor.unit
    }

    pub fn actor_utype(&self) -> Option<&'a UnitType> {
        self.actor
            .utype()
            .and_then(|utype| self.env.ruleset.unit_type(utype))
    }

    pub fn target_player(&self) -> Option<&'a Player> {
        self.target.player
    }

    pub fn target_city(&self) -> Option<&'a City> {
        self.target.city
    }

    pub fn target_unit(&self) -> Option<&'a Unit> {
        self.target.unit
    }

    /// Whether the evaluator may look at the target unit.
    pub fn can_see_target_unit(&self) -> bool {
        self.omniscient
            || match (self.actor.player, self.target.unit) {
                (Some(pov), Some(unit)) => crate::metaknowledge::can_player_see_unit(self.env, pov, unit),
                _ => false,
            }
    }

    /// Whether the evaluator currently sees the target tile.
    pub fn can_see_target_tile(&self) -> bool {
        self.omniscient
            || match (self.actor.player, self.target.tile) {
                (Some(pov), Some(tile)) => crate::metaknowledge::plr_sees_tile(self.env, pov, tile),
                _ => false,
            }
    }
}

/// Hard-coded rules of one action result.
///
/// All methods are pure predicates: they are also called speculatively to
/// compute the odds shown to a player.
pub trait ResultRule: Sync {
    /// Whether units of this type could ever perform the result.
    fn utype_ok(&self, _utype: &UnitType, _ruleset: &Ruleset) -> bool {
        true
    }

    /// Requirements on the actor unit's current state. Only `No` blocks.
    fn actor_ok(&self, _query: &ResultQuery<'_>) -> Tri {
        Tri::Yes
    }

    /// Target preconditions. Returns `No` only when the evaluator can know
    /// the action is impossible, `Maybe` when it lacks the knowledge, and
    /// `def` otherwise.
    fn possible(&self, _query: &ResultQuery<'_>, def: Tri) -> Tri {
        def
    }
}

/// Results without any hard-coded rule.
pub struct NoHardRules;

impl ResultRule for NoHardRules {}

/// Whether `action` has any hard-coded rule that unit type `utype` fails.
pub fn utype_hard_reqs_ok(action: ActionId, utype: &UnitType, ruleset: &Ruleset) -> bool {
    action.result().rule().utype_ok(utype, ruleset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_result_is_produced_by_some_action() {
        for result in ActionResult::iter() {
            assert!(
                ActionId::all().any(|action| action.result() == result),
                "{result} has no action"
            );
        }
    }

    #[test]
    fn escape_variants_share_their_result() {
        assert_eq!(ActionId::SpyPoisonEsc.result(), ActionId::SpyPoison.result());
        assert_eq!(ActionId::SuicideAttack.result(), ActionResult::Attack);
        assert_eq!(ActionId::ConquerCity2.result(), ActionResult::ConquerCity);
    }

    #[test]
    fn result_info_table() {
        assert_eq!(
            ActionResult::TargetedStealTech.sub_target_completion(),
            SubTargetCompletion::Mandatory
        );
        assert_eq!(ActionResult::Pillage.sub_target_completion(), SubTargetCompletion::Flexible);
        assert_eq!(ActionResult::FoundCity.sub_target_completion(), SubTargetCompletion::Simple);
        assert_eq!(ActionResult::BribeUnit.battle_kind(), BattleKind::Diplomatic);
        assert_eq!(ActionResult::Attack.battle_kind(), BattleKind::Standard);
        assert_eq!(ActionResult::TradeRoute.battle_kind(), BattleKind::None);
    }

    #[test]
    fn paradrop_conquer_hostility_comes_from_config() {
        let config = RulesConfig::new();
        assert_eq!(ActionResult::ParadropConquer.is_hostile(&config), None);
        assert_eq!(
            ActionResult::ParadropConquer.is_hostile(&config.clone().with_paradrop_conquer_hostile(true)),
            Some(true)
        );
        assert_eq!(ActionResult::Paradrop.is_hostile(&config), Some(false));
        assert_eq!(ActionResult::Attack.is_hostile(&config), Some(true));
        assert_eq!(ActionResult::EstablishEmbassy.is_hostile(&config), Some(false));
    }
}
