//! World contract: the minimal trait a planning world must implement.
//!
//! Worlds provide domain data only: a planning domain, named scenarios, and
//! initial states. Worlds may NOT run the planner, replay plans, hash
//! artifacts or decide the final policy; those are runner concerns.

use std::collections::BTreeMap;

use forge_kernel::carrier::state::StateV1;
use forge_kernel::carrier::task::TaskV1;
use forge_search::domain::DomainV1;
use forge_search::error::DomainError;

use crate::compile::{set_up_goals, CompileError};
use crate::config::DEFAULT_AGENT;
use crate::policy::PolicyConfig;
use crate::recipe::RecipeError;

/// One named planning problem within a world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioV1 {
    /// Unique within its world (e.g. `"2"` or `"wood_12"`).
    pub id: String,
    pub summary: String,
    /// Starting amounts, applied over the world's own initial state.
    pub initial: BTreeMap<String, i64>,
    /// Target amounts, one `have_enough` goal each.
    pub goal: BTreeMap<String, i64>,
    pub time_budget: i64,
    /// Scenario-level policy overrides.
    pub policy: PolicyConfig,
}

impl ScenarioV1 {
    /// A scenario with no policy overrides.
    #[must_use]
    pub fn new(
        id: &str,
        summary: &str,
        initial: &[(&str, i64)],
        goal: &[(&str, i64)],
        time_budget: i64,
    ) -> Self {
        let table = |pairs: &[(&str, i64)]| {
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), *v))
                .collect::<BTreeMap<_, _>>()
        };
        Self {
            id: id.to_string(),
            summary: summary.to_string(),
            initial: table(initial),
            goal: table(goal),
            time_budget,
            policy: PolicyConfig::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: PolicyConfig) -> Self {
        self.policy = policy;
        self
    }
}

/// Typed failure for world operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error("world {world} has no scenario {scenario:?}")]
    UnknownScenario { world: String, scenario: String },
    #[error("no world named {world:?}")]
    UnknownWorld { world: String },
    #[error("world description is unusable: {0}")]
    Description(#[from] RecipeError),
    #[error("world description failed to compile: {0}")]
    Compile(#[from] CompileError),
    #[error("world domain construction failed: {0}")]
    Domain(#[from] DomainError),
}

/// The contract a world must implement to be run by the harness runner.
pub trait PlanningWorldV1 {
    /// Unique world identifier (e.g. `"crafting"`).
    fn world_id(&self) -> &str;

    /// The acting agent's name.
    fn agent(&self) -> &str {
        DEFAULT_AGENT
    }

    /// Build the planning domain. Called once per run.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError`] if the domain cannot be built.
    fn domain(&self) -> Result<DomainV1, WorldError>;

    /// Every built-in scenario, in presentation order.
    fn scenarios(&self) -> Vec<ScenarioV1>;

    /// Initial state for `scenario`.
    fn initial_state(&self, scenario: &ScenarioV1) -> StateV1;

    /// Goal tasks for `scenario`: `have_enough` per goal entry.
    fn goals(&self, scenario: &ScenarioV1) -> Vec<TaskV1> {
        set_up_goals(&scenario.goal, self.agent())
    }

    /// World-level policy overrides, below the scenario's own.
    fn default_policy(&self) -> PolicyConfig {
        PolicyConfig::default()
    }

    /// Look up a scenario by id.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownScenario`] if no scenario has `id`.
    fn scenario(&self, id: &str) -> Result<ScenarioV1, WorldError> {
        self.scenarios()
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| WorldError::UnknownScenario {
                world: self.world_id().to_string(),
                scenario: id.to_string(),
            })
    }
}
