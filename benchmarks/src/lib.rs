//! Shared helpers for forge benchmark suites.

use forge_harness::contract::{PlanningWorldV1, ScenarioV1};
use forge_harness::policy::PolicyConfig;
use forge_harness::runner::effective_policy;
use forge_harness::worlds::world_by_id;
use forge_kernel::carrier::state::StateV1;
use forge_kernel::carrier::task::TaskV1;
use forge_search::domain::DomainV1;
use forge_search::planner::{plan, PlanResultV1};
use forge_search::policy::PlannerPolicyV1;

/// Prepared inputs for calling `plan()` directly, bypassing `run_scenario()`
/// domain construction and replay.
pub struct PlanSetup {
    pub domain: DomainV1,
    pub policy: PlannerPolicyV1,
    pub initial: StateV1,
    pub goals: Vec<TaskV1>,
}

/// Build the domain, policy, initial state and goals for one scenario.
///
/// # Panics
///
/// Panics if the world or scenario is unknown.
#[must_use]
pub fn prepare_plan_setup(world_id: &str, scenario_id: &str) -> PlanSetup {
    let world = world_by_id(world_id).expect("known world");
    let scenario: ScenarioV1 = world.scenario(scenario_id).expect("known scenario");
    PlanSetup {
        domain: world.domain().expect("world domain builds"),
        policy: effective_policy(world.as_ref(), &scenario, &PolicyConfig::default()),
        initial: world.initial_state(&scenario),
        goals: world.goals(&scenario),
    }
}

/// Run `plan()` once over a prepared setup.
///
/// # Panics
///
/// Panics if planning fails fatally.
#[must_use]
pub fn plan_only(setup: &PlanSetup) -> PlanResultV1 {
    plan(
        &setup.domain,
        &setup.policy,
        setup.initial.clone(),
        setup.goals.clone(),
    )
    .expect("planning succeeds")
}
