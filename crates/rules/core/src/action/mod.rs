//! Actions: identities, the catalog, enablers and success probabilities.
//!
//! An action is legal when one of its enablers holds and the hard-coded
//! rules of its result (see [`crate::actres`]) don't forbid it.
mod catalog;
mod enabler;
mod id;
mod oblig;
mod prob;

pub use catalog::{Action, ActionCatalog, CatalogError, DISTANCE_UNLIMITED, default_ui_name};
pub use enabler::{ActionEnabler, EnablerStore};
pub use id::{ActionId, ActionSet, ActorKind, TargetKind};
pub use oblig::{
    Contradiction, MAX_ALTERNATIVES, ObligatoryReq, ReqVecChange, ReqVecChangeOp, ReqVecProblem,
    ReqVecSide, action_enabler_suggest_repair, enabler_first_self_contradiction,
    enabler_obligatory_problem, obligatory_hard_reqs,
};
pub use prob::ActProb;
