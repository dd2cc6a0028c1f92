//! The action catalog: one [`Action`] per [`ActionId`], with its kinds,
//! distances, UI name and blocking set.

use crate::actres::ActionResult;
use crate::config::RulesConfig;
use crate::error::{ErrorSeverity, RulesError};

use super::id::{ActionId, ActionSet, ActorKind, TargetKind};
use super::prob::ActProb;

/// Largest distance value; means "no upper bound".
pub const DISTANCE_UNLIMITED: u32 = u32::MAX;

// ============================================================================
// Action
// ============================================================================

/// Static description of one action.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Action {
    pub id: ActionId,
    pub result: ActionResult,
    pub actor_kind: ActorKind,
    pub target_kind: TargetKind,
    hostile: Option<bool>,
    /// The player must pick a sub target before the action can start.
    pub requires_details: bool,
    /// Only offered in the action selection dialog when asked for.
    pub rare_pop_up: bool,
    pub min_distance: u32,
    pub max_distance: u32,
    /// Template with two `%s` slots: mnemonic and info part.
    pub ui_name: String,
    /// Don't tell the player why the action is illegal.
    pub quiet: bool,
    /// Actions that, when legal, make this one illegal.
    pub blocked_by: ActionSet,
}

impl Action {
    fn with_defaults(id: ActionId, config: &RulesConfig) -> Self {
        let result = id.result();
        let (min_distance, max_distance) = default_distance(id, config);
        Self {
            id,
            result,
            actor_kind: ActorKind::Unit,
            target_kind: id.target_kind(),
            hostile: result.is_hostile(config),
            requires_details: requires_details(id),
            rare_pop_up: rare_pop_up(id),
            min_distance,
            max_distance,
            ui_name: default_ui_name(id).to_owned(),
            quiet: false,
            blocked_by: ActionSet::EMPTY,
        }
    }

    pub fn rule_name(&self) -> &'static str {
        self.id.rule_name()
    }

    /// Whether the action is an act of aggression. `None` when the ruleset
    /// left that open.
    pub fn is_hostile(&self) -> Option<bool> {
        self.hostile
    }

    pub fn distance_accepted(&self, distance: u32) -> bool {
        self.min_distance <= distance
            && (self.max_distance == DISTANCE_UNLIMITED || distance <= self.max_distance)
    }
}

impl ActionId {
    pub const fn target_kind(self) -> TargetKind {
        use ActionId as A;
        match self {
            A::SpyBribeUnit
            | A::SpySabotageUnit
            | A::SpySabotageUnitEsc
            | A::ExpelUnit
            | A::HealUnit => TargetKind::Unit,
            A::CaptureUnits
            | A::Bombard
            | A::NukeUnits
            | A::Attack
            | A::SuicideAttack
            | A::SpyAttack
            | A::WipeUnits => TargetKind::Units,
            A::FoundCity
            | A::Nuke
            | A::Paradrop
            | A::ParadropConquer
            | A::TransformTerrain
            | A::Irrigate
            | A::Mine
            | A::Pillage => TargetKind::Tile,
            A::DisbandUnit | A::Fortify | A::ConvertUnit => TargetKind::SelfTarget,
            _ => TargetKind::City,
        }
    }
}

fn default_distance(id: ActionId, config: &RulesConfig) -> (u32, u32) {
    use ActionId as A;
    match id {
        A::CaptureUnits
        | A::Bombard
        | A::NukeCity
        | A::NukeUnits
        | A::Attack
        | A::SuicideAttack
        | A::ConquerCity
        | A::ConquerCity2
        | A::SpyAttack
        | A::WipeUnits => (1, 1),
        A::Paradrop | A::ParadropConquer => (1, DISTANCE_UNLIMITED),
        A::Airlift => (1, config.airlift_max_distance.unwrap_or(DISTANCE_UNLIMITED)),
        A::FoundCity
        | A::Nuke
        | A::HomeCity
        | A::UpgradeUnit
        | A::TransformTerrain
        | A::Irrigate
        | A::Mine
        | A::Pillage
        | A::DisbandUnit
        | A::Fortify
        | A::ConvertUnit => (0, 0),
        _ => (0, 1),
    }
}

fn requires_details(id: ActionId) -> bool {
    use ActionId as A;
    matches!(
        id,
        A::SpyTargetedSabotageCity
            | A::SpyTargetedSabotageCityEsc
            | A::SpyTargetedStealTech
            | A::SpyTargetedStealTechEsc
    )
}

fn rare_pop_up(id: ActionId) -> bool {
    use ActionId as A;
    matches!(
        id,
        A::FoundCity
            | A::JoinCity
            | A::Nuke
            | A::DisbandUnitRecover
            | A::DisbandUnit
            | A::HomeCity
            | A::UpgradeUnit
            | A::Paradrop
            | A::ParadropConquer
            | A::Airlift
            | A::Fortify
            | A::ConvertUnit
            | A::TransformTerrain
            | A::Irrigate
            | A::Mine
            | A::Pillage
            | A::HealUnit
    )
}

/// UI name used until the ruleset names the action.
pub fn default_ui_name(id: ActionId) -> &'static str {
    use ActionId as A;
    match id {
        A::EstablishEmbassy => "Establish %sEmbassy%s",
        A::EstablishEmbassyStay => "%sEstablish Embassy (and stay)%s",
        A::SpyInvestigateCity => "%sInvestigate City%s",
        A::InvestigateCitySpend => "%sInvestigate City (spends the unit)%s",
        A::SpyPoison => "%sPoison City%s",
        A::SpyPoisonEsc => "%sPoison City and Escape%s",
        A::SpyStealGold => "%sSteal Gold%s",
        A::SpyStealGoldEsc => "%sSteal Gold and Escape%s",
        A::SpySabotageCity => "%sSabotage City%s",
        A::SpySabotageCityEsc => "%sSabotage City and Escape%s",
        A::SpyTargetedSabotageCity => "Industria%sl Sabotage%s",
        A::SpyTargetedSabotageCityEsc => "Industria%sl Sabotage and Escape%s",
        A::SpyStealTech => "Steal %sTechnology%s",
        A::SpyStealTechEsc => "Steal %sTechnology and Escape%s",
        A::SpyTargetedStealTech => "In%sdustrial Espionage%s",
        A::SpyTargetedStealTechEsc => "In%sdustrial Espionage and Escape%s",
        A::SpyInciteCity => "Incite a Re%svolt%s",
        A::SpyInciteCityEsc => "Incite a Re%svolt and Escape%s",
        A::TradeRoute => "Establish Trade %sRoute%s",
        A::Marketplace => "Enter %sMarketplace%s",
        A::HelpWonder => "Help %sbuild Wonder%s",
        A::SpyBribeUnit => "%sBribe Enemy Unit%s",
        A::SpySabotageUnit => "%sSabotage Enemy Unit%s",
        A::SpySabotageUnitEsc => "%sSabotage Enemy Unit and Escape%s",
        A::CaptureUnits => "%sCapture Units%s",
        A::FoundCity => "%sFound City%s",
        A::JoinCity => "%sJoin City%s",
        A::StealMaps => "Steal %sMaps%s",
        A::StealMapsEsc => "Steal %sMaps and Escape%s",
        A::Bombard => "%sBombard%s",
        A::SpyNuclear => "Suitcase %sNuke%s",
        A::SpyNuclearEsc => "Suitcase %sNuke and Escape%s",
        A::Nuke => "Explode %sNuclear In Place%s",
        A::NukeCity => "%sNuke City%s",
        A::NukeUnits => "%sNuke Units%s",
        A::DestroyCity => "Destroy %sCity%s",
        A::ExpelUnit => "Ex%spel Unit%s",
        A::DisbandUnitRecover => "Disband Unit %sRecover%s",
        A::DisbandUnit => "%sDisband Unit%s",
        A::HomeCity => "Set %sHome City%s",
        A::UpgradeUnit => "%sUpgrade Unit%s",
        A::Paradrop => "Drop %sParatrooper%s",
        A::ParadropConquer => "Drop %sParatrooper and Conquer%s",
        A::Airlift => "%sAirlift to City%s",
        A::Attack => "%sAttack%s",
        A::SuicideAttack => "%sSuicide Attack%s",
        A::ConquerCity => "%sConquer City%s",
        A::ConquerCity2 => "%sConquer City 2%s",
        A::HealUnit => "Heal %sUnit%s",
        A::TransformTerrain => "%sTransform Terrain%s",
        A::Irrigate => "Build %sIrrigation%s",
        A::Mine => "Build %sMine%s",
        A::Pillage => "%sPillage%s",
        A::Fortify => "%sFortify%s",
        A::ConvertUnit => "%sConvert Unit%s",
        A::SpyAttack => "%sEliminate Spy%s",
        A::WipeUnits => "%sWipe Units%s",
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("unknown action \"{0}\"")]
    UnknownAction(String),

    #[error("invalid action number {0}")]
    InvalidNumber(u32),

    #[error("ui name \"{name}\" of {action} must hold at most two %s slots")]
    BadUiName { action: ActionId, name: String },

    #[error("{action} can't reach {max} when its minimum distance is {min}")]
    BadDistance { action: ActionId, min: u32, max: u32 },

    #[error("{0} can't block itself")]
    BlocksItself(ActionId),
}

impl RulesError for CatalogError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownAction(_) | Self::InvalidNumber(_) => ErrorSeverity::Recoverable,
            Self::BadUiName { .. } | Self::BadDistance { .. } | Self::BlocksItself(_) => {
                ErrorSeverity::Validation
            }
        }
    }

    fn error_code(&self) -> &'static str {
        use CatalogError::*;
        match self {
            UnknownAction(_) => "CATALOG_UNKNOWN_ACTION",
            InvalidNumber(_) => "CATALOG_INVALID_NUMBER",
            BadUiName { .. } => "CATALOG_BAD_UI_NAME",
            BadDistance { .. } => "CATALOG_BAD_DISTANCE",
            BlocksItself(_) => "CATALOG_BLOCKS_ITSELF",
        }
    }
}

// ============================================================================
// ActionCatalog
// ============================================================================

/// Every action of a loaded ruleset, indexed by wire number.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionCatalog {
    actions: Vec<Action>,
}

impl ActionCatalog {
    /// Builds every action from its result's defaults.
    pub fn new(config: &RulesConfig) -> Self {
        Self {
            actions: ActionId::all().map(|id| Action::with_defaults(id, config)).collect(),
        }
    }

    pub fn get(&self, id: ActionId) -> &Action {
        &self.actions[usize::from(id.number())]
    }

    fn get_mut(&mut self, id: ActionId) -> &mut Action {
        &mut self.actions[usize::from(id.number())]
    }

    pub fn action_by_number(&self, number: u32) -> Result<&Action, CatalogError> {
        ActionId::from_number(number)
            .map(|id| self.get(id))
            .ok_or(CatalogError::InvalidNumber(number))
    }

    pub fn action_by_rule_name(&self, name: &str) -> Result<&Action, CatalogError> {
        ActionId::from_rule_name(name)
            .map(|id| self.get(id))
            .ok_or_else(|| CatalogError::UnknownAction(name.to_owned()))
    }

    pub fn action_id_is_valid(number: u32) -> bool {
        ActionId::is_valid_number(number)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    /// Actions producing `result`.
    pub fn with_result(&self, result: ActionResult) -> impl Iterator<Item = &Action> + '_ {
        self.actions.iter().filter(move |action| action.result == result)
    }

    /// True once every action has a UI name.
    pub fn actions_are_ready(&self) -> bool {
        self.actions.iter().all(|action| !action.ui_name.is_empty())
    }

    /// Gives every unnamed action its default UI name.
    pub fn fill_default_ui_names(&mut self) {
        for action in &mut self.actions {
            if action.ui_name.is_empty() {
                action.ui_name = default_ui_name(action.id).to_owned();
            }
        }
    }

    /// Whether `blocker` being legal makes `blocked` illegal.
    pub fn action_would_be_blocked_by(&self, blocked: ActionId, blocker: ActionId) -> bool {
        self.get(blocked).blocked_by.contains(blocker)
    }

    pub fn action_distance_accepted(&self, id: ActionId, distance: u32) -> bool {
        self.get(id).distance_accepted(distance)
    }

    // ===== ruleset configuration =====

    pub fn set_ui_name(&mut self, id: ActionId, name: impl Into<String>) -> Result<(), CatalogError> {
        let name = name.into();
        if name.matches("%s").count() > 2 {
            return Err(CatalogError::BadUiName { action: id, name });
        }
        self.get_mut(id).ui_name = name;
        Ok(())
    }

    pub fn set_blocked_by(&mut self, id: ActionId, blocked_by: ActionSet) -> Result<(), CatalogError> {
        if blocked_by.contains(id) {
            return Err(CatalogError::BlocksItself(id));
        }
        self.get_mut(id).blocked_by = blocked_by;
        Ok(())
    }

    /// Adds `blocker` to the blocking set of `id`.
    pub fn add_blocked_by(&mut self, id: ActionId, blocker: ActionId) -> Result<(), CatalogError> {
        let blocked_by = self.get(id).blocked_by.with(blocker);
        self.set_blocked_by(id, blocked_by)
    }

    pub fn set_max_distance(&mut self, id: ActionId, max: u32) -> Result<(), CatalogError> {
        let action = self.get_mut(id);
        if max < action.min_distance {
            return Err(CatalogError::BadDistance {
                action: id,
                min: action.min_distance,
                max,
            });
        }
        action.max_distance = max;
        Ok(())
    }

    pub fn set_quiet(&mut self, id: ActionId, quiet: bool) {
        self.get_mut(id).quiet = quiet;
    }

    // ===== presentation =====

    /// UI text for an action button: the ruleset's template filled with
    /// `mnemonic` and the optional custom text and success chance.
    pub fn action_prepare_ui_name(
        &self,
        id: ActionId,
        mnemonic: &str,
        prob: ActProb,
        custom: Option<&str>,
    ) -> String {
        if !self.actions_are_ready() {
            // Nothing better than the rule name before the ruleset arrives.
            return format!("{mnemonic}{} (name may be wrong)", id.rule_name());
        }

        let probtxt = match prob {
            ActProb::Unknown => Some("?%".to_owned()),
            ActProb::NotImplemented | ActProb::NotRelevant => None,
            ActProb::Chance(_) => Some(prob.to_string()),
        };
        let info = match (custom, probtxt) {
            (Some(custom), Some(probtxt)) => format!(" ({custom}; {probtxt})"),
            (None, Some(probtxt)) => format!(" ({probtxt})"),
            (Some(custom), None) => format!(" ({custom})"),
            (None, None) => String::new(),
        };

        fill_template(&self.get(id).ui_name, [mnemonic, &info])
    }

    pub fn action_get_ui_name_mnemonic(&self, id: ActionId, mnemonic: &str) -> String {
        self.action_prepare_ui_name(id, mnemonic, ActProb::NotRelevant, None)
    }

    /// Tool tip for the button that starts an action.
    pub fn action_get_tool_tip(&self, _id: ActionId, prob: ActProb) -> String {
        match prob {
            ActProb::Unknown => "Starting to do this may currently be impossible.".to_owned(),
            ActProb::NotImplemented | ActProb::NotRelevant => String::new(),
            ActProb::Chance(_) => format!("The probability of success is {prob}."),
        }
    }
}

/// Replaces the `%s` slots of `template` in order. Missing arguments
/// leave the slot empty.
fn fill_template(template: &str, args: [&str; 2]) -> String {
    let mut out = String::with_capacity(template.len() + args.iter().map(|a| a.len()).sum::<usize>());
    let mut args = args.into_iter();
    let mut rest = template;
    while let Some(pos) = rest.find("%s") {
        out.push_str(&rest[..pos]);
        out.push_str(args.next().unwrap_or_default());
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}
