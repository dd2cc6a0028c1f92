//! Legality and probability of actions.
//!
//! The [`ActionEngine`] answers two kinds of questions about an (actor,
//! action, target) triple:
//!
//! - **Legality** (`is_action_enabled_*`): omniscient, used by the game to
//!   enforce the rules. The action is legal when its hard-coded result
//!   rules allow it, no blocking action is legal, and at least one enabler
//!   holds for the actor and the target.
//! - **Probability** (`action_prob_*`): evaluated from the actor owner's
//!   point of view. Anything the owner can't know turns into
//!   [`ActProb::Unknown`] rather than leaking the truth.
//!
//! The engine borrows a [`RulesetContext`] and a [`World`] snapshot and
//! never mutates either.

mod blocking;
mod combat;
mod prob;

pub use combat::{attack_power, defense_power, get_defender, unit_win_chance, win_chance};
pub use prob::{ap_dipl_battle_win, ap_diplomat_battle, tech_can_be_stolen};

use crate::action::{ActProb, ActionEnabler, ActionId, ActionSet, ActorKind, TargetKind};
use crate::actres::ResultQuery;
use crate::context::RulesetContext;
use crate::ids::{CityId, ExtraId, TilePos, UnitId};
use crate::metaknowledge::{can_player_see_unit, mke_eval_reqs};
use crate::requirement::{Env, ReqContext, ReqProbType, are_reqs_active};
use crate::state::{City, Player, Production, Unit, World};
use crate::tri::Tri;

// ============================================================================
// Targets
// ============================================================================

/// Target of an action, by identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionTarget {
    City(CityId),
    Unit(UnitId),
    /// Every unit on the tile.
    Units(TilePos),
    Tile {
        tile: TilePos,
        #[cfg_attr(feature = "serde", serde(default))]
        extra: Option<ExtraId>,
    },
    SelfTarget,
}

impl ActionTarget {
    pub const fn kind(&self) -> TargetKind {
        match self {
            Self::City(_) => TargetKind::City,
            Self::Unit(_) => TargetKind::Unit,
            Self::Units(_) => TargetKind::Units,
            Self::Tile { .. } => TargetKind::Tile,
            Self::SelfTarget => TargetKind::SelfTarget,
        }
    }

    /// Looks the target up in `world`.
    pub fn resolve<'a>(&self, world: &'a World) -> Option<TargetRef<'a>> {
        match *self {
            Self::City(id) => world.city(id).map(TargetRef::City),
            Self::Unit(id) => world.unit(id).map(TargetRef::Unit),
            Self::Units(tile) => world.map.contains(tile).then_some(TargetRef::Units(tile)),
            Self::Tile { tile, extra } => world
                .map
                .contains(tile)
                .then_some(TargetRef::Tile(tile, extra)),
            Self::SelfTarget => Some(TargetRef::SelfTarget),
        }
    }
}

/// Target of an action, borrowed from the snapshot.
#[derive(Clone, Copy, Debug)]
pub enum TargetRef<'a> {
    City(&'a City),
    Unit(&'a Unit),
    Units(TilePos),
    /// A tile, with the extra picked as sub target if any.
    Tile(TilePos, Option<ExtraId>),
    SelfTarget,
}

impl TargetRef<'_> {
    pub const fn kind(&self) -> TargetKind {
        match self {
            Self::City(_) => TargetKind::City,
            Self::Unit(_) => TargetKind::Unit,
            Self::Units(_) => TargetKind::Units,
            Self::Tile(..) => TargetKind::Tile,
            Self::SelfTarget => TargetKind::SelfTarget,
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Read-only evaluator of action legality and odds.
#[derive(Clone, Copy, Debug)]
pub struct ActionEngine<'a> {
    context: &'a RulesetContext,
    world: &'a World,
}

impl<'a> ActionEngine<'a> {
    pub fn new(context: &'a RulesetContext, world: &'a World) -> Self {
        Self { context, world }
    }

    pub fn env(&self) -> Env<'a> {
        Env::new(&self.context.ruleset, self.world)
    }

    pub fn context(&self) -> &'a RulesetContext {
        self.context
    }

    pub fn world(&self) -> &'a World {
        self.world
    }

    // ===== legality =====

    /// Whether `actor` may perform `action` against `target` right now.
    pub fn is_action_enabled(&self, action: ActionId, actor: &'a Unit, target: TargetRef<'a>) -> bool {
        self.enabled(action, actor, target, ActionSet::EMPTY)
    }

    /// Id based variant of [`Self::is_action_enabled`]. Unknown ids are an
    /// error and yield `false`.
    pub fn is_action_enabled_by_id(&self, action: ActionId, actor: UnitId, target: ActionTarget) -> bool {
        match self.resolve(actor, target) {
            Some((actor, target)) => self.is_action_enabled(action, actor, target),
            None => false,
        }
    }

    pub fn is_action_enabled_unit_on_city(&self, action: ActionId, actor: &'a Unit, city: &'a City) -> bool {
        self.is_action_enabled(action, actor, TargetRef::City(city))
    }

    pub fn is_action_enabled_unit_on_unit(&self, action: ActionId, actor: &'a Unit, target: &'a Unit) -> bool {
        self.is_action_enabled(action, actor, TargetRef::Unit(target))
    }

    /// Legal against every unit on `tile`. An empty tile never is.
    pub fn is_action_enabled_unit_on_units(&self, action: ActionId, actor: &'a Unit, tile: TilePos) -> bool {
        self.is_action_enabled(action, actor, TargetRef::Units(tile))
    }

    pub fn is_action_enabled_unit_on_tile(
        &self,
        action: ActionId,
        actor: &'a Unit,
        tile: TilePos,
        target_extra: Option<ExtraId>,
    ) -> bool {
        self.is_action_enabled(action, actor, TargetRef::Tile(tile, target_extra))
    }

    pub fn is_action_enabled_unit_on_self(&self, action: ActionId, actor: &'a Unit) -> bool {
        self.is_action_enabled(action, actor, TargetRef::SelfTarget)
    }

    // ===== probability =====

    /// Success chance of `action` as the actor's owner can tell.
    pub fn action_prob(&self, action: ActionId, actor: &'a Unit, target: TargetRef<'a>) -> ActProb {
        if !self.kinds_match(action, target.kind()) {
            return ActProb::IMPOSSIBLE;
        }
        if !self.context.unit_can_do_action(actor, action) {
            return ActProb::IMPOSSIBLE;
        }
        let actor_ctx = self.actor_context(action, actor);
        match target {
            TargetRef::Units(tile) => self.prob_vs_stack(action, actor, &actor_ctx, tile),
            _ => {
                let (target_ctx, extra) = self.target_context(action, target);
                self.prob(action, &actor_ctx, &target_ctx, extra)
            }
        }
    }

    pub fn action_prob_by_id(&self, action: ActionId, actor: UnitId, target: ActionTarget) -> ActProb {
        match self.resolve(actor, target) {
            Some((actor, target)) => self.action_prob(action, actor, target),
            None => ActProb::IMPOSSIBLE,
        }
    }

    pub fn action_prob_vs_city(&self, action: ActionId, actor: &'a Unit, city: &'a City) -> ActProb {
        self.action_prob(action, actor, TargetRef::City(city))
    }

    pub fn action_prob_vs_unit(&self, action: ActionId, actor: &'a Unit, target: &'a Unit) -> ActProb {
        self.action_prob(action, actor, TargetRef::Unit(target))
    }

    pub fn action_prob_vs_units(&self, action: ActionId, actor: &'a Unit, tile: TilePos) -> ActProb {
        self.action_prob(action, actor, TargetRef::Units(tile))
    }

    pub fn action_prob_vs_tile(
        &self,
        action: ActionId,
        actor: &'a Unit,
        tile: TilePos,
        target_extra: Option<ExtraId>,
    ) -> ActProb {
        self.action_prob(action, actor, TargetRef::Tile(tile, target_extra))
    }

    pub fn action_prob_self(&self, action: ActionId, actor: &'a Unit) -> ActProb {
        self.action_prob(action, actor, TargetRef::SelfTarget)
    }

    // ===== partial knowledge =====

    /// Whether some enabler holds as far as the actor's owner knows.
    /// Single-unit targets only; stacks yield `Maybe`.
    pub fn action_enabled_local(&self, action: ActionId, actor: &'a Unit, target: TargetRef<'a>) -> Tri {
        if let TargetRef::Units(_) = target {
            return Tri::Maybe;
        }
        let actor_ctx = self.actor_context(action, actor);
        let (target_ctx, _) = self.target_context(action, target);
        self.enabled_local(action, &actor_ctx, &target_ctx)
    }

    /// Whether `actor` might be able to perform `action` now, given a
    /// suitable target. Only the actor side is looked at.
    pub fn action_maybe_possible_actor_unit(&self, action: ActionId, actor: &'a Unit) -> bool {
        if !self.context.unit_can_do_action(actor, action) {
            return false;
        }
        let Some(pov) = self.world.player(actor.owner) else {
            tracing::error!("unit {:?} has no owner {:?}", actor.id, actor.owner);
            return false;
        };
        let actor_ctx = self.actor_context(action, actor);
        let empty = ReqContext::empty();
        let query = ResultQuery {
            env: self.env(),
            config: &self.context.config,
            action,
            actor: &actor_ctx,
            target: &empty,
            target_extra: None,
            homecity: self.homecity(actor),
            omniscient: false,
        };
        if action.result().rule().actor_ok(&query).is_no() {
            return false;
        }
        // No target player: diplomatic relations can only be possible.
        self.context.enablers.for_action(action).any(|enabler| {
            !mke_eval_reqs(
                self.env(),
                pov,
                &actor_ctx,
                &empty,
                &enabler.actor_reqs,
                ReqProbType::Possible,
            )
            .is_no()
        })
    }

    /// Whether some enabler's target requirements could hold for `city`
    /// with `actor_player` acting.
    pub fn is_action_possible_on_city(&self, action: ActionId, actor_player: &'a Player, city: &'a City) -> bool {
        if action.target_kind() != TargetKind::City {
            tracing::error!("{} is not done against cities", action.rule_name());
            return false;
        }
        let target = self.city_context(city).with_action(action);
        let other = ReqContext::for_player(actor_player).with_action(action);
        self.context.enablers.for_action(action).any(|enabler| {
            are_reqs_active(self.env(), &target, &other, &enabler.target_reqs, ReqProbType::Possible)
        })
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn resolve(&self, actor: UnitId, target: ActionTarget) -> Option<(&'a Unit, TargetRef<'a>)> {
        let Some(unit) = self.world.unit(actor) else {
            tracing::error!("actor unit {:?} is not in the snapshot", actor);
            return None;
        };
        let Some(target_ref) = target.resolve(self.world) else {
            tracing::error!("target {:?} is not in the snapshot", target);
            return None;
        };
        Some((unit, target_ref))
    }

    fn kinds_match(&self, action: ActionId, target: TargetKind) -> bool {
        let entry = self.context.catalog.get(action);
        if entry.actor_kind != ActorKind::Unit {
            tracing::error!("{} is performed by {} not Unit", action.rule_name(), entry.actor_kind);
            return false;
        }
        if entry.target_kind != target {
            tracing::error!("{} is against {} not {}", action.rule_name(), entry.target_kind, target);
            return false;
        }
        true
    }

    fn homecity(&self, actor: &Unit) -> Option<&'a City> {
        actor.homecity.and_then(|id| self.world.city(id))
    }

    fn actor_context(&self, action: ActionId, actor: &'a Unit) -> ReqContext<'a> {
        ReqContext::for_unit(self.world, actor).with_action(action)
    }

    /// City targets expose what the city is building as their local
    /// building or unit type.
    fn city_context(&self, city: &'a City) -> ReqContext<'a> {
        let mut context = ReqContext::for_city(self.world, city);
        match city.production {
            Production::Improvement(building) => context.building = Some(building),
            Production::Unit(utype) => context.unittype = Some(utype),
        }
        context
    }

    /// Target context of a single target. Stacks are split by the caller.
    fn target_context(&self, action: ActionId, target: TargetRef<'a>) -> (ReqContext<'a>, Option<ExtraId>) {
        let (context, extra) = match target {
            TargetRef::City(city) => (self.city_context(city), None),
            TargetRef::Unit(unit) => (ReqContext::for_unit(self.world, unit), None),
            TargetRef::Units(tile) => (ReqContext::for_tile(self.world, tile), None),
            TargetRef::Tile(tile, extra) => {
                (ReqContext::for_tile(self.world, tile).with_extra(extra), extra)
            }
            TargetRef::SelfTarget => (ReqContext::empty(), None),
        };
        (context.with_action(action), extra)
    }

    fn enabled(&self, action: ActionId, actor: &'a Unit, target: TargetRef<'a>, visiting: ActionSet) -> bool {
        if !self.kinds_match(action, target.kind()) {
            return false;
        }
        if !self.context.unit_can_do_action(actor, action) {
            return false;
        }
        let actor_ctx = self.actor_context(action, actor);
        match target {
            TargetRef::Units(tile) => {
                let mut units = self.world.units_at(tile).peekable();
                if units.peek().is_none() {
                    return false;
                }
                units.all(|unit| {
                    let target_ctx = ReqContext::for_unit(self.world, unit).with_action(action);
                    self.enabled_for(action, &actor_ctx, &target_ctx, None, visiting)
                })
            }
            _ => {
                let (target_ctx, extra) = self.target_context(action, target);
                self.enabled_for(action, &actor_ctx, &target_ctx, extra, visiting)
            }
        }
    }

    /// Omniscient check of one (actor, target) pair.
    fn enabled_for(
        &self,
        action: ActionId,
        actor: &ReqContext<'a>,
        target: &ReqContext<'a>,
        target_extra: Option<ExtraId>,
        visiting: ActionSet,
    ) -> bool {
        let possible = self.is_action_possible(action, actor, target, target_extra, true, visiting);
        if possible != Tri::Yes {
            return false;
        }
        self.context
            .enablers
            .for_action(action)
            .any(|enabler| self.is_enabler_active(enabler, actor, target))
    }

    fn is_enabler_active(&self, enabler: &ActionEnabler, actor: &ReqContext<'_>, target: &ReqContext<'_>) -> bool {
        let env = self.env();
        are_reqs_active(env, actor, target, &enabler.actor_reqs, ReqProbType::Certain)
            && are_reqs_active(env, target, actor, &enabler.target_reqs, ReqProbType::Certain)
    }

    /// Everything but the enablers: distance, target visibility, blocking
    /// actions and the hard-coded rules of the result.
    ///
    /// Returns `Maybe` only when not omniscient.
    fn is_action_possible(
        &self,
        action: ActionId,
        actor: &ReqContext<'a>,
        target: &ReqContext<'a>,
        target_extra: Option<ExtraId>,
        omniscient: bool,
        visiting: ActionSet,
    ) -> Tri {
        let target_kind = action.target_kind();
        let Some(actor_unit) = actor.unit else {
            tracing::error!("{} checked without an actor unit", action.rule_name());
            return Tri::No;
        };

        // The player knows where its own unit is.
        if target_kind != TargetKind::SelfTarget {
            let Some(target_tile) = target.tile else {
                tracing::error!("{} checked without a target tile", action.rule_name());
                return Tri::No;
            };
            let distance = actor_unit.tile.real_distance(target_tile);
            if !self.context.catalog.action_distance_accepted(action, distance) {
                return Tri::No;
            }
        }

        // Unit targeted actions assume the actor sees its target.
        if target_kind == TargetKind::Unit {
            let seen = match (actor.player, target.unit) {
                (Some(pov), Some(unit)) => can_player_see_unit(self.env(), pov, unit),
                _ => false,
            };
            if !seen {
                return Tri::No;
            }
        }

        let (block_tile, block_city) = match target_kind {
            TargetKind::SelfTarget => (actor_unit.tile, self.world.tile_city(actor_unit.tile)),
            _ => match target.tile {
                Some(tile) => (tile, target.city.or_else(|| self.world.tile_city(tile))),
                None => (actor_unit.tile, None),
            },
        };
        if self
            .blocker(action, actor_unit, Some(block_tile), block_city, target.unit, visiting)
            .is_some()
        {
            return Tri::No;
        }

        let query = ResultQuery {
            env: self.env(),
            config: &self.context.config,
            action,
            actor,
            target,
            target_extra,
            homecity: self.homecity(actor_unit),
            omniscient,
        };
        let rule = action.result().rule();
        let out = rule.actor_ok(&query);
        if out.is_no() {
            return Tri::No;
        }
        rule.possible(&query, out)
    }

    /// Three-valued enabler check from the actor owner's point of view.
    fn enabled_local(&self, action: ActionId, actor: &ReqContext<'a>, target: &ReqContext<'a>) -> Tri {
        let Some(pov) = actor.player else {
            return Tri::Maybe;
        };
        let env = self.env();
        let mut result = Tri::No;
        for enabler in self.context.enablers.for_action(action) {
            let current = mke_eval_reqs(env, pov, actor, target, &enabler.actor_reqs, ReqProbType::Certain)
                .and(mke_eval_reqs(env, pov, target, actor, &enabler.target_reqs, ReqProbType::Certain));
            match current {
                Tri::Yes => return Tri::Yes,
                Tri::Maybe => result = Tri::Maybe,
                Tri::No => {}
            }
        }
        result
    }
}
