//! Action enablers and their per-action store.

use crate::requirement::ReqVec;

use super::id::ActionId;

/// A pair of requirement vectors that, when both hold, allow an action.
///
/// Several enablers for the same action combine as a disjunction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ActionEnabler {
    pub action: ActionId,
    pub actor_reqs: ReqVec,
    pub target_reqs: ReqVec,
    /// Set by the upgrader when the enabler couldn't be repaired. A
    /// disabled enabler never enables anything but stays visible to tools.
    pub disabled: bool,
}

impl ActionEnabler {
    pub fn new(action: ActionId, actor_reqs: ReqVec, target_reqs: ReqVec) -> Self {
        Self {
            action,
            actor_reqs,
            target_reqs,
            disabled: false,
        }
    }

    /// Enabler without any requirement.
    pub fn unconditional(action: ActionId) -> Self {
        Self::new(action, ReqVec::new(), ReqVec::new())
    }

    pub fn is_active(&self) -> bool {
        !self.disabled
    }
}

/// All enablers of a ruleset, kept per action in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnablerStore {
    by_action: Vec<Vec<ActionEnabler>>,
}

impl EnablerStore {
    pub fn new() -> Self {
        Self {
            by_action: ActionId::all().map(|_| Vec::new()).collect(),
        }
    }

    fn slot(&self, action: ActionId) -> &[ActionEnabler] {
        self.by_action
            .get(usize::from(action.number()))
            .map_or(&[], Vec::as_slice)
    }

    fn slot_mut(&mut self, action: ActionId) -> &mut Vec<ActionEnabler> {
        let index = usize::from(action.number());
        if self.by_action.len() <= index {
            self.by_action.resize_with(index + 1, Vec::new);
        }
        &mut self.by_action[index]
    }

    pub fn add(&mut self, enabler: ActionEnabler) {
        self.slot_mut(enabler.action).push(enabler);
    }

    /// Enablers of `action` that may enable it.
    pub fn for_action(&self, action: ActionId) -> impl Iterator<Item = &ActionEnabler> + '_ {
        self.slot(action).iter().filter(|enabler| enabler.is_active())
    }

    /// Every enabler of `action`, disabled ones included.
    pub fn all_for_action(&self, action: ActionId) -> &[ActionEnabler] {
        self.slot(action)
    }

    pub(crate) fn all_for_action_mut(&mut self, action: ActionId) -> &mut Vec<ActionEnabler> {
        self.slot_mut(action)
    }

    /// Every enabler in action order, then insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ActionEnabler> + '_ {
        self.by_action.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.by_action.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of active enablers of `action`.
    pub fn enablers_for_action_count(&self, action: ActionId) -> usize {
        self.for_action(action).count()
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&ActionEnabler) -> bool) {
        for list in &mut self.by_action {
            list.retain(&mut keep);
        }
    }
}

impl Extend<ActionEnabler> for EnablerStore {
    fn extend<I: IntoIterator<Item = ActionEnabler>>(&mut self, iter: I) {
        for enabler in iter {
            self.add(enabler);
        }
    }
}

impl FromIterator<ActionEnabler> for EnablerStore {
    fn from_iter<I: IntoIterator<Item = ActionEnabler>>(iter: I) -> Self {
        let mut store = Self::new();
        store.extend(iter);
        store
    }
}
