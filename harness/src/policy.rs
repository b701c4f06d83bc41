//! Policy configuration: layered overrides resolved into a
//! [`PlannerPolicyV1`].
//!
//! A run's policy is built from up to four layers, later layers winning:
//! the planner defaults, the world's default policy, the scenario's policy,
//! and caller overrides (config file, then CLI flags). Each layer is a
//! [`PolicyConfig`] in which `None` means "inherit".

use serde::{Deserialize, Serialize};

use forge_search::policy::PlannerPolicyV1;

/// Policy overrides. `None` inherits; the `no_*` switches disable a check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[allow(clippy::struct_excessive_bools)]
pub struct PolicyConfig {
    pub max_depth: Option<usize>,
    pub max_plan_len: Option<usize>,
    pub max_repeats: Option<usize>,
    pub exhaustion_resource: Option<String>,
    pub max_expansions: Option<u64>,
    /// Disable the depth bound.
    pub no_depth_bound: bool,
    /// Disable the plan-length bound.
    pub no_plan_len_bound: bool,
    /// Disable the repeated-subgoal check.
    pub no_repeat_check: bool,
    /// Disable the resource-exhaustion check.
    pub no_exhaustion_check: bool,
}

impl PolicyConfig {
    /// `self` with every field `over` sets taking precedence.
    #[must_use]
    pub fn overlaid(&self, over: &Self) -> Self {
        Self {
            max_depth: over.max_depth.or(self.max_depth),
            max_plan_len: over.max_plan_len.or(self.max_plan_len),
            max_repeats: over.max_repeats.or(self.max_repeats),
            exhaustion_resource: over
                .exhaustion_resource
                .clone()
                .or_else(|| self.exhaustion_resource.clone()),
            max_expansions: over.max_expansions.or(self.max_expansions),
            no_depth_bound: over.no_depth_bound || self.no_depth_bound,
            no_plan_len_bound: over.no_plan_len_bound || self.no_plan_len_bound,
            no_repeat_check: over.no_repeat_check || self.no_repeat_check,
            no_exhaustion_check: over.no_exhaustion_check || self.no_exhaustion_check,
        }
    }

    /// Resolve against [`PlannerPolicyV1::default`].
    ///
    /// The result is not validated here; [`forge_search::planner::plan`]
    /// rejects a policy with both bounds disabled.
    #[must_use]
    pub fn resolve(&self) -> PlannerPolicyV1 {
        let base = PlannerPolicyV1::default();
        let pick = |disabled: bool, value: Option<usize>, default: Option<usize>| {
            if disabled {
                None
            } else {
                value.or(default)
            }
        };
        PlannerPolicyV1 {
            max_depth: pick(self.no_depth_bound, self.max_depth, base.max_depth),
            max_plan_len: pick(self.no_plan_len_bound, self.max_plan_len, base.max_plan_len),
            max_repeats: pick(self.no_repeat_check, self.max_repeats, base.max_repeats),
            exhaustion_resource: if self.no_exhaustion_check {
                None
            } else {
                self.exhaustion_resource
                    .clone()
                    .or(base.exhaustion_resource)
            },
            max_expansions: self.max_expansions.unwrap_or(base.max_expansions),
        }
    }
}
