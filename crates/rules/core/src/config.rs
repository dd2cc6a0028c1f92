/// Game and scenario settings consulted by the action engine.
///
/// These are the ruleset/server settings that hard-coded action results read
/// (city placement, join limits, tech theft). They are public knowledge, so
/// reading them never leaks information to a player.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RulesConfig {
    /// Minimum real distance between two cities. A value of 1 allows
    /// adjacent cities, 0 falls back to [`Self::DEFAULT_CITYMINDIST`].
    /// Loaders reject values above [`Self::MAX_CITYMINDIST`].
    pub citymindist: u32,

    /// Largest city size a unit may raise a city to by joining it.
    pub add_to_size_limit: u32,

    /// Scenario switch that forbids founding any new city.
    pub prevent_new_cities: bool,

    /// Whether stealing a tech the thief lacks prerequisites for is allowed.
    pub tech_steal_allow_holes: bool,

    /// Hostility of the Paradrop Conquer result.
    ///
    /// The ruleset has to decide this explicitly. `None` leaves the action's
    /// hostility unsettled and [`crate::action::Action::is_hostile`] reports
    /// `None` for it.
    pub paradrop_conquer_hostile: Option<bool>,

    /// Largest real distance for airlifts. Defaults to unlimited.
    pub airlift_max_distance: Option<u32>,

    /// Smallest map distance between two domestic cities that may trade.
    pub trademindist: u32,

    /// Trade routes a single city can hold.
    pub max_trade_routes: u32,
}

impl RulesConfig {
    // ===== compile-time capacities =====
    /// Number of user-definable unit type flag slots.
    pub const MAX_USER_UNIT_FLAGS: usize = 40;
    /// Number of user-definable unit class flag slots.
    pub const MAX_USER_UCLASS_FLAGS: usize = 8;
    /// Number of user-definable extra flag slots.
    pub const MAX_USER_EXTRA_FLAGS: usize = 8;
    /// Number of user-definable terrain flag slots.
    pub const MAX_USER_TERRAIN_FLAGS: usize = 8;
    /// Move fragments per whole move.
    pub const SINGLE_MOVE: u32 = 9;
    /// Scale of attack and defense strength.
    pub const POWER_FACTOR: u32 = 10;
    /// Squared radius of the work area around a city center.
    pub const CITY_RADIUS_SQ: u32 = 5;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_CITYMINDIST: u32 = 2;
    pub const MAX_CITYMINDIST: u32 = 11;
    pub const DEFAULT_ADD_TO_SIZE_LIMIT: u32 = 8;
    pub const DEFAULT_TRADEMINDIST: u32 = 9;
    pub const DEFAULT_MAX_TRADE_ROUTES: u32 = 2;

    pub fn new() -> Self {
        Self {
            citymindist: Self::DEFAULT_CITYMINDIST,
            add_to_size_limit: Self::DEFAULT_ADD_TO_SIZE_LIMIT,
            prevent_new_cities: false,
            tech_steal_allow_holes: true,
            paradrop_conquer_hostile: None,
            airlift_max_distance: None,
            trademindist: Self::DEFAULT_TRADEMINDIST,
            max_trade_routes: Self::DEFAULT_MAX_TRADE_ROUTES,
        }
    }

    /// City distance the engine works with.
    pub fn effective_citymindist(&self) -> u32 {
        match self.citymindist {
            0 => Self::DEFAULT_CITYMINDIST,
            dist => dist.min(Self::MAX_CITYMINDIST),
        }
    }

    #[must_use]
    pub fn with_citymindist(mut self, citymindist: u32) -> Self {
        self.citymindist = citymindist;
        self
    }

    #[must_use]
    pub fn with_add_to_size_limit(mut self, limit: u32) -> Self {
        self.add_to_size_limit = limit;
        self
    }

    #[must_use]
    pub fn with_prevent_new_cities(mut self, prevent: bool) -> Self {
        self.prevent_new_cities = prevent;
        self
    }

    #[must_use]
    pub fn with_paradrop_conquer_hostile(mut self, hostile: bool) -> Self {
        self.paradrop_conquer_hostile = Some(hostile);
        self
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self::new()
    }
}
