//! Requirement language and its omniscient evaluator.
//!
//! A [`Requirement`] is a universal (kind plus value) checked at a
//! [`ReqRange`], optionally negated. A [`ReqVec`] combines requirements in
//! an explicit [`VectorMode`]. Evaluation is three-valued: see
//! [`crate::tri::Tri`].
mod algebra;
mod context;
mod error;
mod eval;
mod range;
mod req;
mod universal;

pub use algebra::{
    are_requirements_contradictions, are_requirements_equal, does_req_contradict_reqs,
    is_req_unchanging, req_vec_first_contradiction, universal_is_mentioned_by_requirements,
    universal_never_there, universal_replace_in_req_vec,
};
pub use context::{Env, ReqContext};
pub use error::RequirementError;
pub use eval::{are_reqs_active, is_ocean_tile, is_req_active, tri_req_active, tri_reqs_active};
pub(crate) use eval::range_tiles;
pub use range::ReqRange;
pub use req::{ReqProbType, ReqVec, Requirement, VectorMode};
pub use universal::{CityTile, DiplRel, UnitState, Universal, UniversalKind};
