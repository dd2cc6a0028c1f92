//! Success probabilities reported to players.

use core::fmt;

/// Chance that an action succeeds, as far as the asking player can tell.
///
/// Regular values count half percent steps from `0` (impossible) to
/// [`ActProb::MAX_CHANCE`] (certain). The other variants are signals that
/// carry no probability at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActProb {
    /// Success chance in half percent steps.
    Chance(u8),
    /// The question makes no sense for this action.
    NotRelevant,
    /// The engine can't compute this probability yet.
    NotImplemented,
    /// The player lacks the knowledge needed to tell.
    Unknown,
}

impl ActProb {
    pub const MAX_CHANCE: u8 = 200;

    pub const IMPOSSIBLE: Self = Self::Chance(0);
    pub const CERTAIN: Self = Self::Chance(Self::MAX_CHANCE);

    // ===== wire encoding =====
    const WIRE_NOT_RELEVANT: u8 = 253;
    const WIRE_NOT_IMPLEMENTED: u8 = 254;
    const WIRE_UNKNOWN: u8 = 255;

    /// Regular chance, clamped to the valid range.
    pub const fn chance(value: u32) -> Self {
        if value > Self::MAX_CHANCE as u32 {
            Self::CERTAIN
        } else {
            Self::Chance(value as u8)
        }
    }

    /// True unless the action is known to be impossible or irrelevant.
    pub const fn possible(self) -> bool {
        !matches!(self, Self::Chance(0) | Self::NotRelevant)
    }

    /// True for the special values that carry no probability.
    pub const fn is_signal(self) -> bool {
        !matches!(self, Self::Chance(_))
    }

    pub const fn unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub const fn not_impl(self) -> bool {
        matches!(self, Self::NotImplemented)
    }

    pub const fn not_relevant(self) -> bool {
        matches!(self, Self::NotRelevant)
    }

    /// Success chance in percent, for regular values.
    pub fn percent(self) -> Option<f64> {
        match self {
            Self::Chance(value) => Some(f64::from(value) / 2.0),
            _ => None,
        }
    }

    /// Single byte form used in packets.
    pub const fn to_wire(self) -> u8 {
        match self {
            Self::Chance(value) => value,
            Self::NotRelevant => Self::WIRE_NOT_RELEVANT,
            Self::NotImplemented => Self::WIRE_NOT_IMPLEMENTED,
            Self::Unknown => Self::WIRE_UNKNOWN,
        }
    }

    /// Decodes the packet form. Bytes between the largest chance and the
    /// signal values are invalid.
    pub const fn from_wire(value: u8) -> Option<Self> {
        match value {
            0..=Self::MAX_CHANCE => Some(Self::Chance(value)),
            Self::WIRE_NOT_RELEVANT => Some(Self::NotRelevant),
            Self::WIRE_NOT_IMPLEMENTED => Some(Self::NotImplemented),
            Self::WIRE_UNKNOWN => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Chance that both independent events succeed.
    fn and_chance(a: u8, b: u8) -> u8 {
        ((u32::from(a) * u32::from(b)) / u32::from(Self::MAX_CHANCE)) as u8
    }

    /// Combines the per-unit probabilities of an action against a whole
    /// stack. One impossible unit makes the action impossible. Otherwise
    /// not implemented beats unknown, which beats regular values. Regular
    /// values multiply.
    pub fn for_stack<I>(units: I) -> Self
    where
        I: IntoIterator<Item = ActProb>,
    {
        let mut all = Self::CERTAIN;
        for unit in units {
            if !unit.possible() {
                return Self::IMPOSSIBLE;
            }
            all = match (all, unit) {
                (_, Self::NotImplemented) | (Self::NotImplemented, _) => Self::NotImplemented,
                (_, Self::Unknown) | (Self::Unknown, _) => Self::Unknown,
                (Self::Chance(a), Self::Chance(b)) => Self::Chance(Self::and_chance(a, b)),
                (other, _) => other,
            };
        }
        all
    }
}

impl fmt::Display for ActProb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chance(value) => write!(f, "{:.1}%", f64::from(*value) / 2.0),
            Self::NotRelevant => f.write_str("n/a"),
            Self::NotImplemented => f.write_str("not implemented"),
            Self::Unknown => f.write_str("?%"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(!ActProb::IMPOSSIBLE.possible());
        assert!(!ActProb::NotRelevant.possible());
        assert!(ActProb::Unknown.possible());
        assert!(ActProb::NotImplemented.possible());
        assert!(ActProb::Chance(1).possible());

        assert!(ActProb::Unknown.is_signal());
        assert!(!ActProb::CERTAIN.is_signal());
        assert_eq!(ActProb::chance(900), ActProb::CERTAIN);
    }

    #[test]
    fn wire_sentinels() {
        assert_eq!(ActProb::NotRelevant.to_wire(), 253);
        assert_eq!(ActProb::NotImplemented.to_wire(), 254);
        assert_eq!(ActProb::Unknown.to_wire(), 255);
        assert_eq!(ActProb::from_wire(255), Some(ActProb::Unknown));
        assert_eq!(ActProb::from_wire(100), Some(ActProb::Chance(100)));
        assert_eq!(ActProb::from_wire(201), None);
    }

    #[test]
    fn stack_impossible_dominates() {
        let stack = [ActProb::NotImplemented, ActProb::IMPOSSIBLE, ActProb::Unknown];
        assert_eq!(ActProb::for_stack(stack), ActProb::IMPOSSIBLE);
    }

    #[test]
    fn stack_signals_rank_above_chances() {
        let stack = [ActProb::Chance(100), ActProb::Unknown, ActProb::NotImplemented];
        assert_eq!(ActProb::for_stack(stack), ActProb::NotImplemented);
        let stack = [ActProb::Unknown, ActProb::Chance(100)];
        assert_eq!(ActProb::for_stack(stack), ActProb::Unknown);
    }

    #[test]
    fn stack_chances_multiply_over_every_unit() {
        let stack = [ActProb::Chance(100), ActProb::Chance(100), ActProb::CERTAIN];
        assert_eq!(ActProb::for_stack(stack), ActProb::Chance(50));
        assert_eq!(ActProb::for_stack([]), ActProb::CERTAIN);
    }

    #[test]
    fn display_uses_percent() {
        assert_eq!(ActProb::Chance(101).to_string(), "50.5%");
        assert_eq!(ActProb::Unknown.to_string(), "?%");
    }
}
