//! Rules of results that act on the actor unit itself.

use crate::ruleset::{Ruleset, UnitClassFlags, UnitType};
use crate::state::Activity;
use crate::tri::Tri;

use super::{ResultQuery, ResultRule};

pub struct UpgradeUnit;

impl ResultRule for UpgradeUnit {
    fn utype_ok(&self, utype: &UnitType, _ruleset: &Ruleset) -> bool {
        utype.obsoleted_by.is_some()
    }

    fn possible(&self, query: &ResultQuery<'_>, def: Tri) -> Tri {
        let ruleset = query.env.ruleset;
        let (Some(unit), Some(from), Some(actor)) =
            (query.actor_unit(), query.actor_utype(), query.actor_player())
        else {
            return Tri::No;
        };
        let Some(to) = from.obsoleted_by.and_then(|id| ruleset.unit_type(id)) else {
            return Tri::No;
        };
        if actor.gold < unit_upgrade_price(from, to) {
            return Tri::No;
        }
        if !query.env.can_exist_at_tile(to.id, unit.tile) {
            return Tri::No;
        }
        def
    }
}

/// Gold needed to upgrade a unit of type `from` to `to`. Half the shields
/// of the old unit count towards the new one.
pub(crate) fn unit_upgrade_price(from: &UnitType, to: &UnitType) -> i32 {
    let base = to.build_cost - from.build_cost / 2;
    if base <= 0 {
        return 0;
    }
    2 * base + base * base / 20
}

pub struct Fortify;

impl ResultRule for Fortify {
    fn possible(&self, query: &ResultQuery<'_>, def: Tri) -> Tri {
        let Some(unit) = query.actor_unit() else {
            return Tri::No;
        };
        if !query
            .env
            .ruleset
            .uclass_has_builtin_flag(unit.utype, UnitClassFlags::CAN_FORTIFY)
        {
            return Tri::No;
        }
        if matches!(unit.activity, Activity::Fortified | Activity::Fortifying) {
            return Tri::No;
        }
        def
    }
}

pub struct ConvertUnit;

impl ResultRule for ConvertUnit {
    fn possible(&self, query: &ResultQuery<'_>, def: Tri) -> Tri {
        let (Some(unit), Some(utype)) = (query.actor_unit(), query.actor_utype()) else {
            return Tri::No;
        };
        match utype.converted_to {
            Some(to) if query.env.can_exist_at_tile(to, unit.tile) => def,
            _ => Tri::No,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{UnitClassId, UnitTypeId};

    fn utype(id: u16, cost: i32) -> UnitType {
        let mut utype = UnitType::new(UnitTypeId(id), format!("Type{id}"), UnitClassId(0));
        utype.build_cost = cost;
        utype
    }

    #[test]
    fn upgrade_price_counts_half_the_old_shields() {
        assert_eq!(unit_upgrade_price(&utype(0, 10), &utype(1, 30)), 2 * 25 + 625 / 20);
        assert_eq!(unit_upgrade_price(&utype(0, 40), &utype(1, 20)), 0);
        assert_eq!(unit_upgrade_price(&utype(0, 0), &utype(1, 0)), 0);
    }
}
