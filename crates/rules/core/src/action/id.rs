//! Action identities, kinds and action sets.

use core::fmt;

use strum::{EnumCount, IntoEnumIterator};

/// Every action the engine knows.
///
/// The discriminant is the wire number: it is sent in packets and stored in
/// save games, so variants are only ever appended.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::EnumIter,
    strum::EnumCount,
    strum::FromRepr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
#[repr(u8)]
pub enum ActionId {
    // ========================================================================
    // Diplomacy
    // ========================================================================
    #[strum(serialize = "Establish Embassy")]
    EstablishEmbassy = 0,
    #[strum(serialize = "Establish Embassy Stay")]
    EstablishEmbassyStay,
    #[strum(serialize = "Investigate City")]
    SpyInvestigateCity,
    #[strum(serialize = "Investigate City Spend Unit")]
    InvestigateCitySpend,
    #[strum(serialize = "Poison City")]
    SpyPoison,
    #[strum(serialize = "Poison City Escape")]
    SpyPoisonEsc,
    #[strum(serialize = "Steal Gold")]
    SpyStealGold,
    #[strum(serialize = "Steal Gold Escape")]
    SpyStealGoldEsc,
    #[strum(serialize = "Sabotage City")]
    SpySabotageCity,
    #[strum(serialize = "Sabotage City Escape")]
    SpySabotageCityEsc,
    #[strum(serialize = "Targeted Sabotage City")]
    SpyTargetedSabotageCity,
    #[strum(serialize = "Targeted Sabotage City Escape")]
    SpyTargetedSabotageCityEsc,
    #[strum(serialize = "Steal Tech")]
    SpyStealTech,
    #[strum(serialize = "Steal Tech Escape Expected")]
    SpyStealTechEsc,
    #[strum(serialize = "Targeted Steal Tech")]
    SpyTargetedStealTech,
    #[strum(serialize = "Targeted Steal Tech Escape Expected")]
    SpyTargetedStealTechEsc,
    #[strum(serialize = "Incite City")]
    SpyInciteCity,
    #[strum(serialize = "Incite City Escape")]
    SpyInciteCityEsc,

    // ========================================================================
    // Trade and production
    // ========================================================================
    #[strum(serialize = "Establish Trade Route")]
    TradeRoute,
    #[strum(serialize = "Enter Marketplace")]
    Marketplace,
    #[strum(serialize = "Help Wonder")]
    HelpWonder,

    // ========================================================================
    // Against units
    // ========================================================================
    #[strum(serialize = "Bribe Unit")]
    SpyBribeUnit,
    #[strum(serialize = "Sabotage Unit")]
    SpySabotageUnit,
    #[strum(serialize = "Sabotage Unit Escape")]
    SpySabotageUnitEsc,
    #[strum(serialize = "Capture Units")]
    CaptureUnits,

    // ========================================================================
    // Cities
    // ========================================================================
    #[strum(serialize = "Found City")]
    FoundCity,
    #[strum(serialize = "Join City")]
    JoinCity,
    #[strum(serialize = "Steal Maps")]
    StealMaps,
    #[strum(serialize = "Steal Maps Escape")]
    StealMapsEsc,

    // ========================================================================
    // Bombardment and nuclear
    // ========================================================================
    #[strum(serialize = "Bombard")]
    Bombard,
    #[strum(serialize = "Suitcase Nuke")]
    SpyNuclear,
    #[strum(serialize = "Suitcase Nuke Escape")]
    SpyNuclearEsc,
    #[strum(serialize = "Explode Nuclear")]
    Nuke,
    #[strum(serialize = "Nuke City")]
    NukeCity,
    #[strum(serialize = "Nuke Units")]
    NukeUnits,
    #[strum(serialize = "Destroy City")]
    DestroyCity,
    #[strum(serialize = "Expel Unit")]
    ExpelUnit,

    // ========================================================================
    // Unit management
    // ========================================================================
    #[strum(serialize = "Disband Unit Recover")]
    DisbandUnitRecover,
    #[strum(serialize = "Disband Unit")]
    DisbandUnit,
    #[strum(serialize = "Home City")]
    HomeCity,
    #[strum(serialize = "Upgrade Unit")]
    UpgradeUnit,
    #[strum(serialize = "Paradrop Unit")]
    Paradrop,
    #[strum(serialize = "Paradrop Unit Conquer")]
    ParadropConquer,
    #[strum(serialize = "Airlift Unit")]
    Airlift,

    // ========================================================================
    // Combat and conquest
    // ========================================================================
    #[strum(serialize = "Attack")]
    Attack,
    #[strum(serialize = "Suicide Attack")]
    SuicideAttack,
    #[strum(serialize = "Conquer City")]
    ConquerCity,
    #[strum(serialize = "Conquer City 2")]
    ConquerCity2,
    #[strum(serialize = "Heal Unit")]
    HealUnit,

    // ========================================================================
    // Terrain work and activities
    // ========================================================================
    #[strum(serialize = "Transform Terrain")]
    TransformTerrain,
    #[strum(serialize = "Build Irrigation")]
    Irrigate,
    #[strum(serialize = "Build Mine")]
    Mine,
    #[strum(serialize = "Pillage")]
    Pillage,
    #[strum(serialize = "Fortify")]
    Fortify,
    #[strum(serialize = "Convert Unit")]
    ConvertUnit,
    #[strum(serialize = "Spy Attack")]
    SpyAttack,
    #[strum(serialize = "Wipe Units")]
    WipeUnits,
}

const _: () = assert!(ActionId::COUNT <= 64, "ActionSet holds at most 64 actions");

impl ActionId {
    /// Stable rule name, as written in rulesets.
    pub fn rule_name(self) -> &'static str {
        self.into()
    }

    /// Wire number.
    pub const fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(number: u32) -> Option<Self> {
        u8::try_from(number).ok().and_then(Self::from_repr)
    }

    pub fn is_valid_number(number: u32) -> bool {
        Self::from_number(number).is_some()
    }

    /// Looks an action up by its rule name, ignoring case.
    pub fn from_rule_name(name: &str) -> Option<Self> {
        name.trim().parse().ok()
    }

    pub fn all() -> impl Iterator<Item = ActionId> {
        Self::iter()
    }
}

// ============================================================================
// Actor and target kinds
// ============================================================================

/// What performs an action.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum ActorKind {
    Unit,
}

/// What an action is done to.
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
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum TargetKind {
    City,
    /// A single unit.
    Unit,
    /// Every unit on a tile at once.
    #[strum(serialize = "Stack", serialize = "Units")]
    Units,
    Tile,
    /// The actor itself.
    #[strum(serialize = "Self")]
    SelfTarget,
}

// ============================================================================
// ActionSet
// ============================================================================

/// Fixed-capacity set of actions, indexed by wire number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ActionSet(u64);

impl ActionSet {
    pub const EMPTY: Self = Self(0);

    pub const fn new() -> Self {
        Self::EMPTY
    }

    pub const fn contains(&self, action: ActionId) -> bool {
        self.0 & (1 << action.number()) != 0
    }

    pub fn insert(&mut self, action: ActionId) -> bool {
        let was_set = self.contains(action);
        self.0 |= 1 << action.number();
        !was_set
    }

    pub fn remove(&mut self, action: ActionId) -> bool {
        let was_set = self.contains(action);
        self.0 &= !(1 << action.number());
        was_set
    }

    #[must_use]
    pub fn with(mut self, action: ActionId) -> Self {
        self.insert(action);
        self
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in wire-number order.
    pub fn iter(&self) -> impl Iterator<Item = ActionId> + '_ {
        ActionId::iter().filter(|action| self.contains(*action))
    }
}

impl FromIterator<ActionId> for ActionSet {
    fn from_iter<I: IntoIterator<Item = ActionId>>(iter: I) -> Self {
        let mut set = Self::new();
        for action in iter {
            set.insert(action);
        }
        set
    }
}

impl fmt::Display for ActionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for action in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            f.write_str(action.rule_name())?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_numbers_are_dense_and_stable() {
        for (index, action) in ActionId::iter().enumerate() {
            assert_eq!(usize::from(action.number()), index);
            assert_eq!(ActionId::from_number(u32::from(action.number())), Some(action));
        }
        assert_eq!(ActionId::EstablishEmbassy.number(), 0);
        assert_eq!(ActionId::FoundCity.number(), 25);
        assert_eq!(ActionId::WipeUnits.number(), 56);
        assert!(!ActionId::is_valid_number(ActionId::COUNT as u32));
    }

    #[test]
    fn rule_names_round_trip_case_insensitively() {
        for action in ActionId::iter() {
            assert_eq!(ActionId::from_rule_name(action.rule_name()), Some(action));
            assert_eq!(
                ActionId::from_rule_name(&action.rule_name().to_uppercase()),
                Some(action)
            );
        }
        assert_eq!(ActionId::Nuke.rule_name(), "Explode Nuclear");
        assert_eq!(ActionId::from_rule_name("Recycle Unit"), None);
    }

    #[test]
    fn target_kind_names() {
        assert_eq!(TargetKind::SelfTarget.to_string(), "Self");
        assert_eq!("units".parse::<TargetKind>().ok(), Some(TargetKind::Units));
    }

    #[test]
    fn action_set_membership() {
        let mut set = ActionSet::new().with(ActionId::Attack);
        assert!(set.insert(ActionId::CaptureUnits));
        assert!(!set.insert(ActionId::CaptureUnits));
        assert!(set.contains(ActionId::Attack));
        assert!(!set.contains(ActionId::Bombard));
        assert_eq!(set.len(), 2);
        assert_eq!(set.to_string(), "Capture Units, Attack");
        assert!(set.remove(ActionId::Attack));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![ActionId::CaptureUnits]);
    }
}
