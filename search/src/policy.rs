//! Planner policy: search bounds and budgets.
//!
//! The defaults (depth 10, plan length 30, two repeats of the same subgoal)
//! are policy choices, not properties of any domain. Domains with deeper
//! recipe chains should raise them explicitly.

use forge_kernel::carrier::state::RESOURCE_TIME;
use forge_kernel::proof::canon::{canonical_json_bytes, CanonError};
use forge_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};

use crate::error::PlanError;

/// Default maximum decomposition depth (call-stack length).
pub const DEFAULT_MAX_DEPTH: usize = 10;
/// Default maximum accumulated plan length.
pub const DEFAULT_MAX_PLAN_LEN: usize = 30;
/// Default number of times the same compound task may already be on the
/// call stack before a further expansion is pruned.
pub const DEFAULT_MAX_REPEATS: usize = 2;
/// Default hard cap on agenda expansions.
pub const DEFAULT_MAX_EXPANSIONS: u64 = 100_000;

/// Search bounds and budgets for one planning run.
///
/// Every `None` disables the corresponding prune check. At least one of
/// `max_depth` and `max_plan_len` must stay enabled (see [`Self::validate`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerPolicyV1 {
    /// Prune when the call stack above a task is longer than this.
    pub max_depth: Option<usize>,
    /// Prune when the accumulated plan is longer than this.
    pub max_plan_len: Option<usize>,
    /// Prune a compound task already on the call stack more than this many times.
    pub max_repeats: Option<usize>,
    /// Prune when this resource is negative for the acting agent.
    pub exhaustion_resource: Option<String>,
    /// Hard cap on expansions; exceeding it is a fatal error, not "no plan".
    pub max_expansions: u64,
}

impl PlannerPolicyV1 {
    /// Reject policies that cannot bound a cyclic domain.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::UnboundedSearch`] if both `max_depth` and
    /// `max_plan_len` are disabled.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.max_depth.is_none() && self.max_plan_len.is_none() {
            return Err(PlanError::UnboundedSearch);
        }
        Ok(())
    }

    /// JSON form, with disabled bounds as `null`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "exhaustion_resource": self.exhaustion_resource,
            "max_depth": self.max_depth,
            "max_expansions": self.max_expansions,
            "max_plan_len": self.max_plan_len,
            "max_repeats": self.max_repeats,
        })
    }

    /// Content hash of the canonical JSON form.
    ///
    /// # Errors
    ///
    /// Propagates [`CanonError`].
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        let bytes = canonical_json_bytes(&self.to_json())?;
        Ok(canonical_hash(HashDomain::PolicySnapshot, &bytes))
    }
}

impl Default for PlannerPolicyV1 {
    fn default() -> Self {
        Self {
            max_depth: Some(DEFAULT_MAX_DEPTH),
            max_plan_len: Some(DEFAULT_MAX_PLAN_LEN),
            max_repeats: Some(DEFAULT_MAX_REPEATS),
            exhaustion_resource: Some(RESOURCE_TIME.to_string()),
            max_expansions: DEFAULT_MAX_EXPANSIONS,
        }
    }
}
