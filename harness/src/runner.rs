//! Harness runner: plans one scenario of one world and verifies the result.
//!
//! The runner uses ONLY the planner and kernel APIs: `plan`, `replay_verify`,
//! `canonical_json_bytes`, `canonical_hash`. It never inspects a world's
//! methods or operators beyond handing its domain to the planner.
//!
//! # Pipeline
//!
//! ```text
//! world policy → scenario policy → overrides → resolve()
//!   → domain() → initial_state() (must be non-negative) → goals()
//!   → plan() → [replay_verify() + goal check, if found]
//!   → RunReportV1 (canonical JSON, digest)
//! ```

use forge_kernel::carrier::state::{StateV1, RESOURCE_TIME};
use forge_kernel::carrier::task::TaskV1;
use forge_kernel::proof::canon::{canonical_json_bytes, CanonError};
use forge_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};
use forge_kernel::proof::replay::{replay_verify, ReplayVerdict};
use forge_search::error::PlanError;
use forge_search::planner::{plan, PlanResultV1, PlanV1};
use forge_search::policy::PlannerPolicyV1;

use crate::compile::first_unmet_goal;
use crate::contract::{PlanningWorldV1, ScenarioV1, WorldError};
use crate::policy::PolicyConfig;

/// Error during a harness run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunError {
    /// World construction failed.
    #[error(transparent)]
    World(#[from] WorldError),
    /// The scenario starts with a negative amount, from `Initial`, the
    /// caller's overrides or a negative time budget.
    #[error("initial state has negative {resource}[{agent}] = {value}")]
    NegativeInitialState {
        resource: String,
        agent: String,
        value: i64,
    },
    /// The planner failed fatally.
    #[error(transparent)]
    Plan(#[from] PlanError),
    /// A found plan did not replay (planner bug or world bug).
    #[error("plan diverges on replay at step {step_index}: {detail}")]
    ReplayDivergence { step_index: usize, detail: String },
    /// Replay succeeded but reached a different state than the planner.
    #[error("replayed final state differs from the planner's final state")]
    ReplayMismatch,
    /// A found plan leaves a goal unmet.
    #[error("plan leaves goal {goal} unmet")]
    GoalNotSatisfied { goal: String },
    /// Canonical JSON serialization failed.
    #[error("canonicalization failed: {detail}")]
    Canon { detail: String },
}

impl From<CanonError> for RunError {
    fn from(e: CanonError) -> Self {
        Self::Canon {
            detail: e.to_string(),
        }
    }
}

/// Everything one run decided, in a form that hashes deterministically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReportV1 {
    pub world_id: String,
    pub scenario_id: String,
    pub agent: String,
    pub goals: Vec<TaskV1>,
    pub initial_state: StateV1,
    pub policy: PlannerPolicyV1,
    pub result: PlanResultV1,
}

impl RunReportV1 {
    #[must_use]
    pub fn plan(&self) -> Option<&PlanV1> {
        self.result.plan()
    }

    #[must_use]
    pub const fn is_found(&self) -> bool {
        self.result.is_found()
    }

    /// The agent's remaining time after the plan, if one was found.
    #[must_use]
    pub fn time_left(&self) -> Option<i64> {
        self.plan()
            .map(|p| p.final_state.get(RESOURCE_TIME, &self.agent))
    }

    /// JSON form, with plan, final state and plan digest `null` when no plan
    /// was found.
    ///
    /// # Errors
    ///
    /// Propagates [`CanonError`] from the embedded digests.
    pub fn to_json(&self) -> Result<serde_json::Value, CanonError> {
        let (steps, final_state, plan_hash) = match self.plan() {
            Some(found) => (
                serde_json::Value::Array(found.steps.iter().map(TaskV1::to_json).collect()),
                found.final_state.to_json(),
                serde_json::Value::String(plan_digest(&found.steps)?.to_string()),
            ),
            None => (
                serde_json::Value::Null,
                serde_json::Value::Null,
                serde_json::Value::Null,
            ),
        };
        Ok(serde_json::json!({
            "agent": self.agent,
            "final_state": final_state,
            "goals": self.goals.iter().map(TaskV1::to_json).collect::<Vec<_>>(),
            "initial_state_fingerprint": self.initial_state.fingerprint()?.to_string(),
            "outcome": if self.is_found() { "found" } else { "not_found" },
            "plan": steps,
            "plan_digest": plan_hash,
            "policy": self.policy.to_json(),
            "policy_digest": self.policy.digest()?.to_string(),
            "scenario_id": self.scenario_id,
            "stats": self.result.stats.to_json(),
            "world_id": self.world_id,
        }))
    }

    /// Canonical JSON bytes of [`Self::to_json`].
    ///
    /// # Errors
    ///
    /// Propagates [`CanonError`].
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, CanonError> {
        canonical_json_bytes(&self.to_json()?)
    }

    /// Content hash of the canonical bytes under [`HashDomain::RunReport`].
    ///
    /// # Errors
    ///
    /// Propagates [`CanonError`].
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        Ok(canonical_hash(HashDomain::RunReport, &self.canonical_bytes()?))
    }
}

/// Content hash of a plan's steps under [`HashDomain::Plan`].
///
/// # Errors
///
/// Propagates [`CanonError`].
pub fn plan_digest(steps: &[TaskV1]) -> Result<ContentHash, CanonError> {
    let value = serde_json::Value::Array(steps.iter().map(TaskV1::to_json).collect());
    Ok(canonical_hash(HashDomain::Plan, &canonical_json_bytes(&value)?))
}

/// The policy a run of `scenario` uses: world defaults, then the scenario's
/// own settings, then `overrides`.
#[must_use]
pub fn effective_policy<W: PlanningWorldV1 + ?Sized>(
    world: &W,
    scenario: &ScenarioV1,
    overrides: &PolicyConfig,
) -> PlannerPolicyV1 {
    world
        .default_policy()
        .overlaid(&scenario.policy)
        .overlaid(overrides)
        .resolve()
}

/// Plan `scenario` in `world` and verify any plan found.
///
/// A found plan is replayed from the initial state through the domain's
/// operator table; the replayed final state must equal the planner's and
/// must satisfy every goal. `NotFound` is a successful run.
///
/// # Errors
///
/// - [`RunError::World`] if the world cannot build its domain.
/// - [`RunError::NegativeInitialState`] if the scenario starts below zero.
/// - [`RunError::Plan`] if the planner fails fatally.
/// - [`RunError::ReplayDivergence`], [`RunError::ReplayMismatch`] or
///   [`RunError::GoalNotSatisfied`] if a found plan does not check out.
pub fn run_scenario<W: PlanningWorldV1 + ?Sized>(
    world: &W,
    scenario: &ScenarioV1,
    overrides: &PolicyConfig,
) -> Result<RunReportV1, RunError> {
    let policy = effective_policy(world, scenario, overrides);
    let domain = world.domain()?;
    let initial_state = world.initial_state(scenario);
    if let Some(neg) = initial_state.first_negative() {
        return Err(RunError::NegativeInitialState {
            resource: neg.resource,
            agent: neg.agent,
            value: neg.value,
        });
    }
    let goals = world.goals(scenario);

    tracing::info!(
        world = world.world_id(),
        scenario = %scenario.id,
        goals = goals.len(),
        "running scenario"
    );
    let result = plan(&domain, &policy, initial_state.clone(), goals.clone())?;

    if let Some(found) = result.plan() {
        match replay_verify(&initial_state, &found.steps, domain.operators()) {
            ReplayVerdict::Match { final_state } => {
                if final_state != found.final_state {
                    return Err(RunError::ReplayMismatch);
                }
            }
            ReplayVerdict::Divergence { step_index, detail } => {
                return Err(RunError::ReplayDivergence { step_index, detail });
            }
        }
        if let Some(goal) = first_unmet_goal(&found.final_state, &goals) {
            return Err(RunError::GoalNotSatisfied {
                goal: goal.to_string(),
            });
        }
    }

    Ok(RunReportV1 {
        world_id: world.world_id().to_string(),
        scenario_id: scenario.id.clone(),
        agent: world.agent().to_string(),
        goals,
        initial_state,
        policy,
        result,
    })
}

/// Run every scenario of `world` in order with the same overrides.
///
/// # Errors
///
/// Stops at the first [`RunError`].
pub fn run_all<W: PlanningWorldV1 + ?Sized>(
    world: &W,
    overrides: &PolicyConfig,
) -> Result<Vec<RunReportV1>, RunError> {
    world
        .scenarios()
        .iter()
        .map(|scenario| run_scenario(world, scenario, overrides))
        .collect()
}
