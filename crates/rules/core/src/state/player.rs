use std::collections::{BTreeMap, BTreeSet};

use crate::ids::{GovernmentId, NationId, PlayerId, TechId};

use super::map::TileKnown;

/// Diplomatic state between two players.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum DiplState {
    War,
    #[strum(serialize = "Cease-fire")]
    CeaseFire,
    Armistice,
    Peace,
    Alliance,
    #[default]
    #[strum(serialize = "Never met")]
    NoContact,
    Team,
}

/// A player as seen by the rules: identity, holdings and knowledge.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub nation: NationId,
    pub government: GovernmentId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub team: u16,
    #[cfg_attr(feature = "serde", serde(default = "default_alive"))]
    pub is_alive: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub gold: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub techs: BTreeSet<TechId>,
    /// Relations towards other players. Missing entries mean no contact.
    #[cfg_attr(feature = "serde", serde(default))]
    pub diplstates: BTreeMap<PlayerId, DiplState>,
    /// Players this player has a real (not effect granted) embassy with.
    #[cfg_attr(feature = "serde", serde(default))]
    pub real_embassies: BTreeSet<PlayerId>,
    /// Players receiving shared vision from this player.
    #[cfg_attr(feature = "serde", serde(default))]
    pub gives_vision: BTreeSet<PlayerId>,
    /// Per-tile knowledge in map index order. Tiles past the end are unknown.
    #[cfg_attr(feature = "serde", serde(default))]
    pub known: Vec<TileKnown>,
}

#[cfg(feature = "serde")]
fn default_alive() -> bool {
    true
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, nation: NationId, government: GovernmentId) -> Self {
        Self {
            id,
            name: name.into(),
            nation,
            government,
            team: id.0,
            is_alive: true,
            gold: 0,
            techs: BTreeSet::new(),
            diplstates: BTreeMap::new(),
            real_embassies: BTreeSet::new(),
            gives_vision: BTreeSet::new(),
            known: Vec::new(),
        }
    }

    pub fn knows_tech(&self, tech: TechId) -> bool {
        self.techs.contains(&tech)
    }

    pub fn has_real_embassy_with(&self, other: PlayerId) -> bool {
        self.real_embassies.contains(&other)
    }

    /// Diplomatic state towards `other`. A player is on its own team.
    pub fn diplstate_with(&self, other: PlayerId) -> DiplState {
        if other == self.id {
            return DiplState::Team;
        }
        self.diplstates.get(&other).copied().unwrap_or_default()
    }

    /// Knowledge of the tile stored at `index`.
    pub fn tile_known(&self, index: usize) -> TileKnown {
        self.known.get(index).copied().unwrap_or_default()
    }

    /// Records knowledge of the tile stored at `index`, growing the vision
    /// vector as needed.
    pub fn set_tile_known(&mut self, index: usize, known: TileKnown) {
        if self.known.len() <= index {
            self.known.resize(index + 1, TileKnown::Unknown);
        }
        self.known[index] = known;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_relation_is_no_contact() {
        let player = Player::new(PlayerId(0), "a", NationId(0), GovernmentId(0));
        assert_eq!(player.diplstate_with(PlayerId(3)), DiplState::NoContact);
        assert_eq!(player.diplstate_with(PlayerId(0)), DiplState::Team);
    }

    #[test]
    fn vision_grows_on_demand() {
        let mut player = Player::new(PlayerId(0), "a", NationId(0), GovernmentId(0));
        assert_eq!(player.tile_known(10), TileKnown::Unknown);
        player.set_tile_known(10, TileKnown::KnownSeen);
        assert_eq!(player.tile_known(10), TileKnown::KnownSeen);
        assert_eq!(player.tile_known(9), TileKnown::Unknown);
    }

    #[test]
    fn diplstate_rule_names() {
        assert_eq!("cease-fire".parse::<DiplState>().ok(), Some(DiplState::CeaseFire));
        assert_eq!(DiplState::NoContact.to_string(), "Never met");
    }
}
