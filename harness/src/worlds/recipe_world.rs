//! A world backed by a declarative recipe description.
//!
//! The domain is compiled from the description on every [`domain`] call;
//! scenarios layer their `initial` amounts over the description's own
//! `Initial`.
//!
//! [`domain`]: PlanningWorldV1::domain

use forge_kernel::carrier::state::StateV1;
use forge_search::domain::DomainV1;

use crate::compile::{compile_domain, set_up_state};
use crate::config::{DEFAULT_AGENT, DEFAULT_TIME_BUDGET};
use crate::contract::{PlanningWorldV1, ScenarioV1, WorldError};
use crate::policy::PolicyConfig;
use crate::recipe::DomainDescriptionV1;

/// Id of the scenario built from a description's own `Initial` and `Goal`.
pub const DESCRIPTION_SCENARIO: &str = "description";

#[derive(Debug, Clone)]
pub struct RecipeWorldV1 {
    id: String,
    agent: String,
    description: DomainDescriptionV1,
    scenarios: Vec<ScenarioV1>,
    policy: PolicyConfig,
}

impl RecipeWorldV1 {
    /// A world whose only scenario is [`DESCRIPTION_SCENARIO`]: the
    /// description's `Goal` from its `Initial`, with [`DEFAULT_TIME_BUDGET`].
    #[must_use]
    pub fn new(id: &str, description: DomainDescriptionV1) -> Self {
        let scenario = ScenarioV1 {
            id: DESCRIPTION_SCENARIO.to_string(),
            summary: "the description's own goal".to_string(),
            initial: std::collections::BTreeMap::new(),
            goal: description.goal_counts(),
            time_budget: DEFAULT_TIME_BUDGET,
            policy: PolicyConfig::default(),
        };
        Self {
            id: id.to_string(),
            agent: DEFAULT_AGENT.to_string(),
            description,
            scenarios: vec![scenario],
            policy: PolicyConfig::default(),
        }
    }

    #[must_use]
    pub fn with_agent(mut self, agent: &str) -> Self {
        self.agent = agent.to_string();
        self
    }

    /// Replace the scenario list.
    #[must_use]
    pub fn with_scenarios(mut self, scenarios: Vec<ScenarioV1>) -> Self {
        self.scenarios = scenarios;
        self
    }

    /// World-level policy overrides.
    #[must_use]
    pub fn with_policy(mut self, policy: PolicyConfig) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn description(&self) -> &DomainDescriptionV1 {
        &self.description
    }
}

impl PlanningWorldV1 for RecipeWorldV1 {
    fn world_id(&self) -> &str {
        &self.id
    }

    fn agent(&self) -> &str {
        &self.agent
    }

    fn domain(&self) -> Result<DomainV1, WorldError> {
        Ok(compile_domain(&self.description)?.domain)
    }

    fn scenarios(&self) -> Vec<ScenarioV1> {
        self.scenarios.clone()
    }

    fn initial_state(&self, scenario: &ScenarioV1) -> StateV1 {
        set_up_state(
            &self.description,
            &scenario.initial,
            &self.agent,
            scenario.time_budget,
        )
    }

    fn default_policy(&self) -> PolicyConfig {
        self.policy.clone()
    }
}
