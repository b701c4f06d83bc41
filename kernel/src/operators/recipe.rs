//! `RecipeOperatorV1`: the declarative operator every compiled recipe becomes.
//!
//! Precondition order matches the declaration: time, then requirements, then
//! consumptions. All checks run against the borrowed input state; effects are
//! applied to a snapshot only after every check has passed, so a rejected
//! transition never leaves a partially updated state behind.

use std::collections::BTreeMap;

use crate::carrier::state::{StateV1, RESOURCE_TIME};
use crate::carrier::task::TaskArg;
use crate::operators::apply::{agent_arg, ApplyFailure, ApplyResult, Operator};

/// A recipe-shaped primitive transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeOperatorV1 {
    /// Operator name (diagnostics only; routing is by table key).
    pub name: String,
    /// Time cost, debited from [`RESOURCE_TIME`].
    pub time: i64,
    /// Resources that must be held but are not consumed.
    pub requires: BTreeMap<String, i64>,
    /// Resources that must be held and are debited.
    pub consumes: BTreeMap<String, i64>,
    /// Resources credited on success.
    pub produces: BTreeMap<String, i64>,
    /// Flags set to `true` on success (e.g. `made_wooden_axe`).
    pub sets_flags: Vec<String>,
}

impl RecipeOperatorV1 {
    #[must_use]
    pub fn new(name: impl Into<String>, time: i64) -> Self {
        Self {
            name: name.into(),
            time,
            requires: BTreeMap::new(),
            consumes: BTreeMap::new(),
            produces: BTreeMap::new(),
            sets_flags: Vec::new(),
        }
    }

    #[must_use]
    pub fn requiring(mut self, resource: &str, amount: i64) -> Self {
        self.requires.insert(resource.to_string(), amount);
        self
    }

    #[must_use]
    pub fn consuming(mut self, resource: &str, amount: i64) -> Self {
        self.consumes.insert(resource.to_string(), amount);
        self
    }

    #[must_use]
    pub fn producing(mut self, resource: &str, amount: i64) -> Self {
        self.produces.insert(resource.to_string(), amount);
        self
    }

    #[must_use]
    pub fn setting_flag(mut self, flag: &str) -> Self {
        self.sets_flags.push(flag.to_string());
        self
    }

    fn check(&self, state: &StateV1, agent: &str) -> Result<(), ApplyFailure> {
        let have_time = state.get(RESOURCE_TIME, agent);
        if have_time < self.time {
            return Err(ApplyFailure::PreconditionNotMet {
                detail: format!(
                    "{} needs {} time, {agent} has {have_time}",
                    self.name, self.time
                ),
            });
        }
        for (kind, table) in [("requires", &self.requires), ("consumes", &self.consumes)] {
            for (resource, &amount) in table {
                let have = state.get(resource, agent);
                if have < amount {
                    return Err(ApplyFailure::PreconditionNotMet {
                        detail: format!(
                            "{} {kind} {amount} {resource}, {agent} has {have}",
                            self.name
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Operator for RecipeOperatorV1 {
    fn apply(&self, state: &StateV1, args: &[TaskArg]) -> ApplyResult {
        let agent = agent_arg(&self.name, args)?;
        self.check(state, agent)?;

        let mut next = state.snapshot();
        let effect = |e: crate::carrier::state::StateError| ApplyFailure::PreconditionNotMet {
            detail: format!("{}: {e}", self.name),
        };
        next.adjust(RESOURCE_TIME, agent, -self.time).map_err(effect)?;
        for (resource, &amount) in &self.consumes {
            next.adjust(resource, agent, -amount).map_err(effect)?;
        }
        for (resource, &amount) in &self.produces {
            next.adjust(resource, agent, amount).map_err(effect)?;
        }
        for flag in &self.sets_flags {
            next.set_flag(flag, agent, true);
        }
        Ok(next)
    }
}
