//! Flag sets for ruleset entities.
//!
//! Every flaggable entity kind has a fixed set of engine-known flags,
//! modelled with `bitflags`, and a bounded number of user flag slots whose
//! names the ruleset chooses. A [`FlagId`] names one flag of either kind;
//! a [`FlagRegistry`] resolves flag names and hands out user slots.

use std::marker::PhantomData;

use arrayvec::ArrayVec;
use bitflags::bitflags;

use crate::config::RulesConfig;
use crate::error::{ErrorSeverity, RulesError};

bitflags! {
    /// Engine-known unit type flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct UnitTypeFlags: u32 {
        const TRADE_ROUTE = 1 << 0;
        const HELP_WONDER = 1 << 1;
        const IG_ZOC = 1 << 2;
        const NON_MIL = 1 << 3;
        const IG_TER = 1 << 4;
        const ONE_ATTACK = 1 << 5;
        const FIELD_UNIT = 1 << 6;
        const PROVOKING = 1 << 7;
        const NEVER_PROTECTS = 1 << 8;
        const DIPLOMAT = 1 << 9;
        const SPY = 1 << 10;
        const SUPER_SPY = 1 << 11;
        const NO_HOME = 1 << 12;
        const UNIQUE = 1 << 13;
        const EVACUATE_FIRST = 1 << 14;
        const SETTLERS = 1 << 15;
        const UNBRIBABLE = 1 << 16;
        const FLAGLESS = 1 << 17;
        const CAN_ESCAPE = 1 << 18;
        const BAD_CITY_DEFENDER = 1 << 19;
        const FANATIC = 1 << 20;
        const GAME_LOSS = 1 << 21;
        const COAST_STRICT = 1 << 22;
    }
}

bitflags! {
    /// Engine-known unit class flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct UnitClassFlags: u16 {
        const TERRAIN_SPEED = 1 << 0;
        const DAMAGE_SLOWS = 1 << 1;
        const CAN_OCCUPY_CITY = 1 << 2;
        const MISSILE = 1 << 3;
        const BUILD_ANYWHERE = 1 << 4;
        const UNREACHABLE = 1 << 5;
        const COLLECT_RANSOM = 1 << 6;
        const ZOC = 1 << 7;
        const CAN_FORTIFY = 1 << 8;
        const CAN_PILLAGE = 1 << 9;
        const DOESNT_OCCUPY_TILE = 1 << 10;
        const ATTACK_NON_NATIVE = 1 << 11;
        const KILL_CITIZEN = 1 << 12;
    }
}

bitflags! {
    /// Engine-known terrain flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct TerrainFlags: u16 {
        const NO_BARBS = 1 << 0;
        const NO_CITIES = 1 << 1;
        const STARTER = 1 << 2;
        const CAN_HAVE_RIVER = 1 << 3;
        const UNSAFE_COAST = 1 << 4;
        const FRESH_WATER = 1 << 5;
        const NOT_GENERATED = 1 << 6;
        const NO_ZOC = 1 << 7;
        const FROZEN = 1 << 8;
    }
}

bitflags! {
    /// Engine-known extra flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ExtraFlags: u16 {
        const NATIVE_TILE = 1 << 0;
        const REFUEL = 1 << 1;
        const TERR_CHANGE_REMOVES = 1 << 2;
        const AUTO_ON_CITY_CENTER = 1 << 3;
        const ALWAYS_ON_CITY_CENTER = 1 << 4;
        const CONNECT_LAND = 1 << 5;
        const GLOBAL_WARMING = 1 << 6;
        const NUCLEAR_WINTER = 1 << 7;
        const SHOW_FLAG = 1 << 8;
        const NATURAL_DEFENSE = 1 << 9;
        const NO_STACK_DEATH = 1 << 10;
    }
}

// ============================================================================
// Flag identities and sets
// ============================================================================

/// One flag: either engine-known or a ruleset-named user slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlagId<B> {
    Builtin(B),
    User(u8),
}

pub type UnitFlagId = FlagId<UnitTypeFlags>;
pub type UnitClassFlagId = FlagId<UnitClassFlags>;
pub type TerrainFlagId = FlagId<TerrainFlags>;
pub type ExtraFlagId = FlagId<ExtraFlags>;

/// Flags carried by one ruleset entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct FlagSet<B> {
    pub builtin: B,
    /// Bit `n` set means user slot `n` is set.
    pub user: u64,
}

impl<B> FlagSet<B>
where
    B: bitflags::Flags + Copy,
{
    pub fn from_builtin(builtin: B) -> Self {
        Self { builtin, user: 0 }
    }

    pub fn contains(&self, flag: FlagId<B>) -> bool {
        match flag {
            FlagId::Builtin(bits) => self.builtin.contains(bits),
            FlagId::User(slot) => slot < 64 && self.user & (1u64 << slot) != 0,
        }
    }

    pub fn insert(&mut self, flag: FlagId<B>) {
        match flag {
            FlagId::Builtin(bits) => self.builtin.insert(bits),
            FlagId::User(slot) if slot < 64 => self.user |= 1u64 << slot,
            FlagId::User(_) => {}
        }
    }

    #[must_use]
    pub fn with(mut self, flag: FlagId<B>) -> Self {
        self.insert(flag);
        self
    }
}

// ============================================================================
// Registries
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserFlag {
    pub name: String,
    pub helptxt: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FlagError {
    #[error("no free {kind} flag slot left for \"{name}\" (capacity {capacity})")]
    SlotsExhausted {
        kind: &'static str,
        name: String,
        capacity: usize,
    },

    #[error("{kind} flag \"{name}\" is already defined")]
    DuplicateName { kind: &'static str, name: String },
}

impl RulesError for FlagError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::SlotsExhausted { .. } => "FLAG_SLOTS_EXHAUSTED",
            Self::DuplicateName { .. } => "FLAG_DUPLICATE_NAME",
        }
    }
}

/// Name table for one flag kind: engine-known names plus up to `N` user
/// slots, allocated in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlagRegistry<B, const N: usize> {
    kind: &'static str,
    user: ArrayVec<UserFlag, N>,
    _builtin: PhantomData<B>,
}

pub type UnitFlagRegistry = FlagRegistry<UnitTypeFlags, { RulesConfig::MAX_USER_UNIT_FLAGS }>;
pub type UnitClassFlagRegistry =
    FlagRegistry<UnitClassFlags, { RulesConfig::MAX_USER_UCLASS_FLAGS }>;
pub type TerrainFlagRegistry = FlagRegistry<TerrainFlags, { RulesConfig::MAX_USER_TERRAIN_FLAGS }>;
pub type ExtraFlagRegistry = FlagRegistry<ExtraFlags, { RulesConfig::MAX_USER_EXTRA_FLAGS }>;

impl<B, const N: usize> FlagRegistry<B, N>
where
    B: bitflags::Flags + Copy + 'static,
{
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            user: ArrayVec::new(),
            _builtin: PhantomData,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn user_count(&self) -> usize {
        self.user.len()
    }

    pub fn free_slots(&self) -> usize {
        N - self.user.len()
    }

    /// Resolves a flag name. Engine-known names win over user names.
    /// Matching ignores ASCII case, spaces and underscores.
    pub fn resolve(&self, name: &str) -> Option<FlagId<B>> {
        let wanted = normalize(name);
        if let Some(flag) = B::FLAGS
            .iter()
            .find(|flag| normalize(flag.name()) == wanted)
        {
            return Some(FlagId::Builtin(*flag.value()));
        }
        self.user
            .iter()
            .position(|flag| normalize(&flag.name) == wanted)
            .map(|slot| FlagId::User(slot as u8))
    }

    /// Rule name of a flag.
    pub fn name(&self, flag: FlagId<B>) -> String {
        match flag {
            FlagId::Builtin(bits) => B::FLAGS
                .iter()
                .find(|known| known.value().bits() == bits.bits())
                .map(|known| camel_case(known.name()))
                .unwrap_or_else(|| format!("{}Flag", self.kind)),
            FlagId::User(slot) => self
                .user
                .get(slot as usize)
                .map(|flag| flag.name.clone())
                .unwrap_or_else(|| format!("User{}", slot)),
        }
    }

    pub fn user_flag(&self, slot: u8) -> Option<&UserFlag> {
        self.user.get(slot as usize)
    }

    /// Claims the next free user slot for `name`.
    pub fn add_user(&mut self, name: &str, helptxt: Option<String>) -> Result<FlagId<B>, FlagError> {
        if self.resolve(name).is_some() {
            return Err(FlagError::DuplicateName {
                kind: self.kind,
                name: name.to_string(),
            });
        }
        let slot = self.user.len();
        self.user
            .try_push(UserFlag {
                name: name.to_string(),
                helptxt,
            })
            .map_err(|_| FlagError::SlotsExhausted {
                kind: self.kind,
                name: name.to_string(),
                capacity: N,
            })?;
        Ok(FlagId::User(slot as u8))
    }

    pub fn user_flags(&self) -> impl Iterator<Item = &UserFlag> {
        self.user.iter()
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != ' ')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn camel_case(const_name: &str) -> String {
    const_name
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first
                    .to_ascii_uppercase()
                    .to_string()
                    + &chars.as_str().to_ascii_lowercase(),
                None => String::new(),
            }
        })
        .collect()
}
