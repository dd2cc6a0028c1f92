use crate::ruleset::Ruleset;
use crate::tri::Tri;

use super::error::RequirementError;
use super::range::ReqRange;
use super::universal::{Universal, UniversalKind};

/// One atomic condition over a universal at a range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Requirement {
    pub source: Universal,
    pub range: ReqRange,
    /// A destroyed or past source still satisfies the requirement.
    pub survives: bool,
    /// `false` negates the condition.
    pub present: bool,
    /// Hidden from generated help texts.
    pub quiet: bool,
}

impl Requirement {
    pub const fn new(source: Universal, range: ReqRange, present: bool) -> Self {
        Self {
            source,
            range,
            survives: false,
            present,
            quiet: false,
        }
    }

    /// Requirement at the source kind's default range.
    pub fn at_default_range(source: Universal, present: bool) -> Self {
        Self::new(source, source.kind().default_range(), present)
    }

    #[must_use]
    pub const fn with_survives(mut self, survives: bool) -> Self {
        self.survives = survives;
        self
    }

    #[must_use]
    pub const fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// The same requirement with `present` flipped.
    #[must_use]
    pub const fn negated(self) -> Self {
        Self {
            present: !self.present,
            ..self
        }
    }

    pub fn kind(&self) -> UniversalKind {
        self.source.kind()
    }

    /// Builds a requirement from rule names. A missing range falls back to
    /// the kind's default range.
    pub fn from_names(
        kind: &str,
        range: Option<&str>,
        value: &str,
        present: bool,
        survives: bool,
        quiet: bool,
        ruleset: &Ruleset,
    ) -> Result<Self, RequirementError> {
        let source = Universal::from_names(kind, value, ruleset)?;
        let range = match range.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => name
                .parse::<ReqRange>()
                .map_err(|_| RequirementError::UnknownRange(name.to_string()))?,
            None => source.kind().default_range(),
        };
        let req = Self {
            source,
            range,
            survives,
            present,
            quiet,
        };
        req.validate()?;
        Ok(req)
    }

    /// Checks the range against what the kind supports.
    pub fn validate(&self) -> Result<(), RequirementError> {
        let kind = self.kind();
        if !kind.supports_range(self.range) {
            return Err(RequirementError::UnsupportedRange {
                kind,
                range: self.range,
            });
        }
        // Destroyed buildings are only remembered world-wide.
        let survives_ok = match kind {
            UniversalKind::Improvement => self.range == ReqRange::World,
            UniversalKind::Advance | UniversalKind::Nation => self.range.allows_survives(),
            _ => false,
        };
        if self.survives && !survives_ok {
            return Err(RequirementError::SurvivesNotAllowed {
                kind,
                range: self.range,
            });
        }
        Ok(())
    }

    pub fn describe(&self, ruleset: &Ruleset) -> String {
        format!(
            "{} at {}{}{}",
            self.source.describe(ruleset),
            self.range,
            if self.survives { ", surviving" } else { "" },
            if self.present { "" } else { ", not present" },
        )
    }
}

/// How the entries of a [`ReqVec`] combine.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum VectorMode {
    /// Every entry must hold.
    #[default]
    All,
    /// At least one entry must hold. Used by improvement obsolescence.
    Any,
}

/// How a strict boolean caller resolves `Maybe`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReqProbType {
    /// `Maybe` counts as unmet.
    Certain,
    /// `Maybe` counts as met.
    Possible,
}

impl ReqProbType {
    pub const fn resolve(self, value: Tri) -> bool {
        match value {
            Tri::Yes => true,
            Tri::No => false,
            Tri::Maybe => matches!(self, Self::Possible),
        }
    }
}

/// Ordered requirement list with an explicit combination mode.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct ReqVec {
    mode: VectorMode,
    reqs: Vec<Requirement>,
}

impl ReqVec {
    pub const fn new() -> Self {
        Self {
            mode: VectorMode::All,
            reqs: Vec::new(),
        }
    }

    /// An empty disjunctive vector.
    pub const fn any() -> Self {
        Self {
            mode: VectorMode::Any,
            reqs: Vec::new(),
        }
    }

    pub fn from_reqs(reqs: Vec<Requirement>) -> Self {
        Self {
            mode: VectorMode::All,
            reqs,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: VectorMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with(mut self, req: Requirement) -> Self {
        self.reqs.push(req);
        self
    }

    pub fn mode(&self) -> VectorMode {
        self.mode
    }

    pub fn push(&mut self, req: Requirement) {
        self.reqs.push(req);
    }

    pub fn remove(&mut self, index: usize) -> Option<Requirement> {
        (index < self.reqs.len()).then(|| self.reqs.remove(index))
    }

    pub fn retain(&mut self, keep: impl FnMut(&Requirement) -> bool) {
        self.reqs.retain(keep);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Requirement> {
        self.reqs.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Requirement> {
        self.reqs.iter_mut()
    }

    pub fn as_slice(&self) -> &[Requirement] {
        &self.reqs
    }

    pub fn len(&self) -> usize {
        self.reqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reqs.is_empty()
    }

    pub fn contains(&self, req: &Requirement) -> bool {
        self.reqs.contains(req)
    }

    pub fn get(&self, index: usize) -> Option<&Requirement> {
        self.reqs.get(index)
    }
}

impl FromIterator<Requirement> for ReqVec {
    fn from_iter<I: IntoIterator<Item = Requirement>>(iter: I) -> Self {
        Self::from_reqs(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ReqVec {
    type Item = &'a Requirement;
    type IntoIter = std::slice::Iter<'a, Requirement>;

    fn into_iter(self) -> Self::IntoIter {
        self.reqs.iter()
    }
}

impl Extend<Requirement> for ReqVec {
    fn extend<I: IntoIterator<Item = Requirement>>(&mut self, iter: I) {
        self.reqs.extend(iter);
    }
}
