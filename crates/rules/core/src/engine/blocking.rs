//! Actions that make other actions illegal.
//!
//! An action is blocked when an action in its `blocked_by` set is legal
//! against the same target. Blockers may target something else than the
//! blocked action (Disband Unit, a self action, is blocked by Disband Unit
//! Recover, a city action), so the blocker's target is derived from the
//! blocked action's target.

use crate::action::{ActionId, ActionSet, TargetKind};
use crate::ids::TilePos;
use crate::state::{City, Unit};

use super::{ActionEngine, TargetRef};

impl<'a> ActionEngine<'a> {
    /// The legal action that blocks `action`, if any.
    ///
    /// Missing target parts are derived from the ones given and the
    /// action's target kind.
    pub fn action_is_blocked_by(
        &self,
        action: ActionId,
        actor: &'a Unit,
        target_tile: Option<TilePos>,
        target_city: Option<&'a City>,
        target_unit: Option<&'a Unit>,
    ) -> Option<ActionId> {
        let tile = target_tile.or_else(|| match action.target_kind() {
            TargetKind::City => target_city.map(|city| city.tile),
            TargetKind::Unit | TargetKind::Units => target_unit.map(|unit| unit.tile),
            TargetKind::Tile => None,
            TargetKind::SelfTarget => Some(actor.tile),
        });
        let city = target_city.or_else(|| tile.and_then(|tile| self.world.tile_city(tile)));
        if tile.is_none() && action.target_kind() != TargetKind::SelfTarget {
            tracing::error!("no target tile to check blockers of {}", action.rule_name());
        }
        self.blocker(action, actor, tile, city, target_unit, ActionSet::EMPTY)
    }

    /// The action that keeps a regular attack on `tile` from happening, or
    /// the attack itself when it is legal (which rules out conquering).
    pub fn action_blocks_attack(&self, actor: &'a Unit, tile: TilePos) -> Option<ActionId> {
        let city = self.world.tile_city(tile);
        if let Some(blocker) = self.blocker(ActionId::Attack, actor, Some(tile), city, None, ActionSet::EMPTY) {
            return Some(blocker);
        }
        self.is_action_enabled_unit_on_units(ActionId::Attack, actor, tile)
            .then_some(ActionId::Attack)
    }

    /// First legal blocker of `action`. Actions already on the evaluation
    /// stack in `visiting` are skipped so blocking cycles terminate.
    pub(super) fn blocker(
        &self,
        action: ActionId,
        actor: &'a Unit,
        tile: Option<TilePos>,
        city: Option<&'a City>,
        unit: Option<&'a Unit>,
        visiting: ActionSet,
    ) -> Option<ActionId> {
        let blocked_by = self.context.catalog.get(action).blocked_by;
        if blocked_by.is_empty() {
            return None;
        }
        let visiting = visiting.with(action);

        blocked_by.iter().filter(|blocker| !visiting.contains(*blocker)).find(|&blocker| {
            let target = match blocker.target_kind() {
                TargetKind::City => city.map(TargetRef::City),
                TargetKind::Unit => unit.map(TargetRef::Unit),
                TargetKind::Units => tile.map(TargetRef::Units),
                TargetKind::Tile => tile.map(|tile| TargetRef::Tile(tile, None)),
                TargetKind::SelfTarget => Some(TargetRef::SelfTarget),
            };
            // Without a target the blocker can't be legal.
            target.is_some_and(|target| self.enabled(blocker, actor, target, visiting))
        })
    }
}
