//! Three-valued logic for evaluation under incomplete knowledge.
//!
//! A [`Tri`] answers "does this hold?" with `Yes`, `No` or `Maybe`. `Maybe`
//! is a first-class result meaning the evaluator lacks the information to
//! decide. It must never be silently coerced to a boolean; callers choose a
//! resolution explicitly (see [`crate::requirement::ReqProbType`]).

use core::ops::{BitAnd, BitOr, Not};

/// Three-valued truth value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Tri {
    No,
    Maybe,
    Yes,
}

impl Tri {
    /// Converts a definite boolean.
    pub const fn from_bool(value: bool) -> Self {
        if value { Tri::Yes } else { Tri::No }
    }

    /// Kleene conjunction: `No` dominates, then `Maybe`.
    pub const fn and(self, other: Tri) -> Tri {
        match (self, other) {
            (Tri::No, _) | (_, Tri::No) => Tri::No,
            (Tri::Maybe, _) | (_, Tri::Maybe) => Tri::Maybe,
            (Tri::Yes, Tri::Yes) => Tri::Yes,
        }
    }

    /// Kleene disjunction: `Yes` dominates, then `Maybe`.
    pub const fn or(self, other: Tri) -> Tri {
        match (self, other) {
            (Tri::Yes, _) | (_, Tri::Yes) => Tri::Yes,
            (Tri::Maybe, _) | (_, Tri::Maybe) => Tri::Maybe,
            (Tri::No, Tri::No) => Tri::No,
        }
    }

    /// Negation. `Maybe` stays `Maybe`.
    pub const fn negate(self) -> Tri {
        match self {
            Tri::Yes => Tri::No,
            Tri::No => Tri::Yes,
            Tri::Maybe => Tri::Maybe,
        }
    }

    pub const fn is_yes(self) -> bool {
        matches!(self, Tri::Yes)
    }

    pub const fn is_no(self) -> bool {
        matches!(self, Tri::No)
    }

    pub const fn is_maybe(self) -> bool {
        matches!(self, Tri::Maybe)
    }
}

impl From<bool> for Tri {
    fn from(value: bool) -> Self {
        Tri::from_bool(value)
    }
}

impl BitAnd for Tri {
    type Output = Tri;

    fn bitand(self, rhs: Tri) -> Tri {
        self.and(rhs)
    }
}

impl BitOr for Tri {
    type Output = Tri;

    fn bitor(self, rhs: Tri) -> Tri {
        self.or(rhs)
    }
}

impl Not for Tri {
    type Output = Tri;

    fn not(self) -> Tri {
        self.negate()
    }
}

/// Conjunction of two tri-state values.
pub const fn tri_and(a: Tri, b: Tri) -> Tri {
    a.and(b)
}

/// Disjunction of two tri-state values.
pub const fn tri_or(a: Tri, b: Tri) -> Tri {
    a.or(b)
}

/// Folds an iterator with [`tri_and`]. The empty conjunction is `Yes`.
///
/// Stops at the first `No` but keeps scanning past `Maybe`, since a later
/// element can still make the whole conjunction definitely false.
pub fn tri_all<I>(values: I) -> Tri
where
    I: IntoIterator<Item = Tri>,
{
    let mut acc = Tri::Yes;
    for value in values {
        acc = acc.and(value);
        if acc.is_no() {
            return Tri::No;
        }
    }
    acc
}

/// Folds an iterator with [`tri_or`]. The empty disjunction is `No`.
pub fn tri_any<I>(values: I) -> Tri
where
    I: IntoIterator<Item = Tri>,
{
    let mut acc = Tri::No;
    for value in values {
        acc = acc.or(value);
        if acc.is_yes() {
            return Tri::Yes;
        }
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Tri; 3] = [Tri::No, Tri::Maybe, Tri::Yes];

    #[test]
    fn and_truth_table() {
        assert_eq!(tri_and(Tri::Yes, Tri::Yes), Tri::Yes);
        assert_eq!(tri_and(Tri::Yes, Tri::Maybe), Tri::Maybe);
        assert_eq!(tri_and(Tri::Maybe, Tri::No), Tri::No);
        assert_eq!(tri_and(Tri::No, Tri::Maybe), Tri::No);
        assert_eq!(tri_and(Tri::Maybe, Tri::Maybe), Tri::Maybe);
    }

    #[test]
    fn or_truth_table() {
        assert_eq!(tri_or(Tri::No, Tri::No), Tri::No);
        assert_eq!(tri_or(Tri::No, Tri::Maybe), Tri::Maybe);
        assert_eq!(tri_or(Tri::Maybe, Tri::Yes), Tri::Yes);
        assert_eq!(tri_or(Tri::Maybe, Tri::Maybe), Tri::Maybe);
    }

    #[test]
    fn combinators_are_commutative() {
        for a in ALL {
            for b in ALL {
                assert_eq!(tri_and(a, b), tri_and(b, a));
                assert_eq!(tri_or(a, b), tri_or(b, a));
            }
        }
    }

    #[test]
    fn de_morgan_holds() {
        for a in ALL {
            for b in ALL {
                assert_eq!(!(a & b), !a | !b);
            }
        }
    }

    #[test]
    fn maybe_propagates_without_no() {
        assert_eq!(tri_all([Tri::Yes, Tri::Maybe, Tri::Yes]), Tri::Maybe);
        assert_eq!(tri_all([Tri::Maybe, Tri::No]), Tri::No);
        assert_eq!(tri_all([]), Tri::Yes);
    }

    #[test]
    fn any_of_empty_is_no() {
        assert_eq!(tri_any([]), Tri::No);
        assert_eq!(tri_any([Tri::No, Tri::Maybe]), Tri::Maybe);
        assert_eq!(tri_any([Tri::Maybe, Tri::Yes]), Tri::Yes);
    }
}
