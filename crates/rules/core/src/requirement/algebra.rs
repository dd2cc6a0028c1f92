//! Static reasoning over requirements, independent of any game state.
//!
//! Used by ruleset sanity checking and by the enabler repair logic.

use crate::ruleset::{FlagId, Ruleset};

use super::range::ReqRange;
use super::req::{ReqVec, Requirement};
use super::universal::{DiplRel, Universal, UniversalKind};

pub fn are_requirements_equal(a: &Requirement, b: &Requirement) -> bool {
    a.source == b.source && a.range == b.range && a.survives == b.survives && a.present == b.present
}

/// True when `a` and `b` can never both hold for the same context.
pub fn are_requirements_contradictions(a: &Requirement, b: &Requirement) -> bool {
    if a.source == b.source && a.range == b.range {
        return a.present != b.present;
    }
    if a.source.kind() != b.source.kind() || a.range != b.range {
        return false;
    }

    match (a.source, b.source) {
        (Universal::MinSize(x), Universal::MinSize(y))
        | (Universal::MinMoveFrags(x), Universal::MinMoveFrags(y))
        | (Universal::MinHitPoints(x), Universal::MinHitPoints(y)) => {
            minimums_contradict(a.present, x, b.present, y)
        }
        (Universal::MinVeteran(x), Universal::MinVeteran(y)) => {
            minimums_contradict(a.present, u32::from(x), b.present, u32::from(y))
        }
        (Universal::MaxUnitsOnTile(x), Universal::MaxUnitsOnTile(y)) => {
            a.range == ReqRange::Tile && maximums_contradict(a.present, x, b.present, y)
        }
        (Universal::DiplRel(x), Universal::DiplRel(y)) => {
            a.range == ReqRange::Local && diplrels_contradict(a.present, x, b.present, y)
        }
        _ => {
            a.present
                && b.present
                && a.source.kind().is_single_valued()
                && matches!(a.range, ReqRange::Local | ReqRange::Tile | ReqRange::Player)
        }
    }
}

/// `value >= x` (present) against `value < y` (absent).
fn minimums_contradict(a_present: bool, x: u32, b_present: bool, y: u32) -> bool {
    match (a_present, b_present) {
        (true, false) => y <= x,
        (false, true) => x <= y,
        _ => false,
    }
}

/// `count <= x` (present) against `count > y` (absent).
fn maximums_contradict(a_present: bool, x: u32, b_present: bool, y: u32) -> bool {
    match (a_present, b_present) {
        (true, false) => x <= y,
        (false, true) => y <= x,
        _ => false,
    }
}

fn is_exclusive_state(rel: DiplRel) -> bool {
    matches!(
        rel,
        DiplRel::War
            | DiplRel::CeaseFire
            | DiplRel::Armistice
            | DiplRel::Peace
            | DiplRel::Alliance
            | DiplRel::NeverMet
            | DiplRel::Team
    )
}

fn diplrels_contradict(a_present: bool, x: DiplRel, b_present: bool, y: DiplRel) -> bool {
    // A player has no relation to itself.
    let domestic_vs_relation = |foreign_present: bool, other_present: bool| !foreign_present && other_present;
    match (x, y) {
        (DiplRel::Foreign, other) if other != DiplRel::Foreign => domestic_vs_relation(a_present, b_present),
        (other, DiplRel::Foreign) if other != DiplRel::Foreign => domestic_vs_relation(b_present, a_present),
        _ => a_present && b_present && x != y && is_exclusive_state(x) && is_exclusive_state(y),
    }
}

/// True when `req` contradicts any entry of `reqs`.
pub fn does_req_contradict_reqs(req: &Requirement, reqs: &ReqVec) -> bool {
    reqs.iter()
        .any(|other| are_requirements_contradictions(req, other))
}

/// Indices of the first pair of mutually contradicting entries.
pub fn req_vec_first_contradiction(reqs: &ReqVec) -> Option<(usize, usize)> {
    let slice = reqs.as_slice();
    for (i, a) in slice.iter().enumerate() {
        for (j, b) in slice.iter().enumerate().skip(i + 1) {
            if are_requirements_contradictions(a, b) {
                return Some((i, j));
            }
        }
    }
    None
}

/// True when no context can ever hold `source` under `ruleset`.
pub fn universal_never_there(source: &Universal, ruleset: &Ruleset) -> bool {
    match source {
        Universal::Advance(id) => ruleset.tech(*id).is_none(),
        Universal::Government(id) => ruleset.government(*id).is_none(),
        Universal::Improvement(id) => ruleset.improvement(*id).is_none(),
        Universal::Nation(id) => ruleset.nation(*id).is_none(),
        Universal::UnitType(id) => ruleset.unit_type(*id).is_none(),
        Universal::UnitClass(id) => ruleset.unit_class(*id).is_none(),
        Universal::Terrain(id) => ruleset.terrain(*id).is_none(),
        Universal::Extra(id) => ruleset.extra(*id).is_none(),
        Universal::UnitFlag(FlagId::User(slot)) => ruleset.unit_flags.user_flag(*slot).is_none(),
        Universal::UnitClassFlag(FlagId::User(slot)) => {
            ruleset.uclass_flags.user_flag(*slot).is_none()
        }
        Universal::TerrainFlag(FlagId::User(slot)) => {
            ruleset.terrain_flags.user_flag(*slot).is_none()
        }
        Universal::ExtraFlag(FlagId::User(slot)) => ruleset.extra_flags.user_flag(*slot).is_none(),
        Universal::MinVeteran(level) => {
            let max_default = ruleset.veteran_levels.len();
            let max_any = ruleset
                .unit_types
                .iter()
                .map(|utype| utype.veteran.len())
                .max()
                .unwrap_or(0)
                .max(max_default);
            usize::from(*level) >= max_any
        }
        _ => false,
    }
}

/// True when the requirement's truth can't change during a game.
pub fn is_req_unchanging(req: &Requirement) -> bool {
    matches!(
        req.source.kind(),
        UniversalKind::None
            | UniversalKind::Action
            | UniversalKind::BuildingGenus
            | UniversalKind::Nation
            | UniversalKind::UnitType
            | UniversalKind::UnitFlag
            | UniversalKind::UnitClass
            | UniversalKind::UnitClassFlag
    ) || (req.survives && req.present)
}

/// True when some entry of `reqs` has `source` as its universal.
pub fn universal_is_mentioned_by_requirements(reqs: &ReqVec, source: &Universal) -> bool {
    reqs.iter().any(|req| req.source == *source)
}

/// Replaces every occurrence of `from` with `to`. Returns whether anything
/// changed.
pub fn universal_replace_in_req_vec(reqs: &mut ReqVec, from: &Universal, to: &Universal) -> bool {
    let mut changed = false;
    for req in reqs.iter_mut() {
        if req.source == *from {
            req.source = *to;
            changed = true;
        }
    }
    changed
}
