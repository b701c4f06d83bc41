//! Pruning checks evaluated before every agenda expansion.
//!
//! A check sees a read-only [`PruneContext`] and answers one question:
//! should this branch be abandoned now? Checks compose by OR in registration
//! order; the first one that fires names the prune in traces and
//! statistics. Pruning is advisory. A planner with no checks is still sound.

use forge_kernel::carrier::state::StateV1;
use forge_kernel::carrier::task::TaskV1;

use crate::policy::PlannerPolicyV1;
use crate::stack::{Agenda, CallStack};

/// Everything a prune check may inspect. Nothing here is mutable.
#[derive(Debug, Clone, Copy)]
pub struct PruneContext<'a> {
    pub state: &'a StateV1,
    /// The task about to be expanded.
    pub task: &'a TaskV1,
    /// The agenda after `task`.
    pub remaining: &'a Agenda,
    /// Primitive steps committed so far on this branch.
    pub plan: &'a [TaskV1],
    /// Length of `call_stack`.
    pub depth: usize,
    pub call_stack: &'a CallStack,
    /// Whether `task` names a compound task.
    pub is_compound: bool,
}

/// A pure branch-abandonment predicate.
pub trait PruneCheck: Send + Sync {
    /// Name used in traces and [`crate::planner::SearchStatsV1::prunes`].
    fn name(&self) -> &str {
        "custom"
    }

    fn should_prune(&self, ctx: &PruneContext<'_>) -> bool;
}

impl<F> PruneCheck for F
where
    F: Fn(&PruneContext<'_>) -> bool + Send + Sync,
{
    fn should_prune(&self, ctx: &PruneContext<'_>) -> bool {
        self(ctx)
    }
}

/// A closure check with its own name.
pub struct NamedCheck<F> {
    name: String,
    f: F,
}

pub fn named_check<F>(name: impl Into<String>, f: F) -> NamedCheck<F>
where
    F: Fn(&PruneContext<'_>) -> bool + Send + Sync,
{
    NamedCheck {
        name: name.into(),
        f,
    }
}

impl<F> PruneCheck for NamedCheck<F>
where
    F: Fn(&PruneContext<'_>) -> bool + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn should_prune(&self, ctx: &PruneContext<'_>) -> bool {
        (self.f)(ctx)
    }
}

// ---------------------------------------------------------------------------
// Built-in checks
// ---------------------------------------------------------------------------

/// Prune when the call stack above the task is deeper than `max_depth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthBound {
    pub max_depth: usize,
}

impl PruneCheck for DepthBound {
    fn name(&self) -> &str {
        "depth_bound"
    }

    fn should_prune(&self, ctx: &PruneContext<'_>) -> bool {
        ctx.depth > self.max_depth
    }
}

/// Prune when the accumulated plan is longer than `max_len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanLengthBound {
    pub max_len: usize,
}

impl PruneCheck for PlanLengthBound {
    fn name(&self) -> &str {
        "plan_length_bound"
    }

    fn should_prune(&self, ctx: &PruneContext<'_>) -> bool {
        ctx.plan.len() > self.max_len
    }
}

/// Prune when `resource` is negative for the task's agent.
///
/// Tasks without an agent argument are pruned if any agent holds a negative
/// amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceExhaustion {
    pub resource: String,
}

impl PruneCheck for ResourceExhaustion {
    fn name(&self) -> &str {
        "resource_exhaustion"
    }

    fn should_prune(&self, ctx: &PruneContext<'_>) -> bool {
        match ctx.task.agent() {
            Some(agent) => ctx.state.get(&self.resource, agent) < 0,
            None => ctx
                .state
                .quantities()
                .any(|(r, _, v)| r == self.resource && v < 0),
        }
    }
}

/// Prune a compound task that is already on its own call stack more than
/// `max_repeats` times.
///
/// Occurrences are compared by name and arguments, so `have_enough wood 1`
/// under `have_enough wood 2` is not a repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatedSubgoal {
    pub max_repeats: usize,
}

impl PruneCheck for RepeatedSubgoal {
    fn name(&self) -> &str {
        "repeated_subgoal"
    }

    fn should_prune(&self, ctx: &PruneContext<'_>) -> bool {
        ctx.is_compound && ctx.call_stack.count(ctx.task) > self.max_repeats
    }
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// An ordered OR of prune checks.
#[derive(Default)]
pub struct PruneChecks {
    checks: Vec<Box<dyn PruneCheck>>,
}

impl std::fmt::Debug for PruneChecks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.checks.iter().map(|c| c.name()))
            .finish()
    }
}

impl PruneChecks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in checks enabled by `policy`, in the order depth, plan
    /// length, resource exhaustion, repeated subgoal.
    #[must_use]
    pub fn from_policy(policy: &PlannerPolicyV1) -> Self {
        let mut checks = Self::new();
        if let Some(max_depth) = policy.max_depth {
            checks.push(DepthBound { max_depth });
        }
        if let Some(max_len) = policy.max_plan_len {
            checks.push(PlanLengthBound { max_len });
        }
        if let Some(resource) = &policy.exhaustion_resource {
            checks.push(ResourceExhaustion {
                resource: resource.clone(),
            });
        }
        if let Some(max_repeats) = policy.max_repeats {
            checks.push(RepeatedSubgoal { max_repeats });
        }
        checks
    }

    pub fn push(&mut self, check: impl PruneCheck + 'static) {
        self.checks.push(Box::new(check));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Name of the first check that fires, if any.
    #[must_use]
    pub fn first_firing(&self, ctx: &PruneContext<'_>) -> Option<&str> {
        self.checks
            .iter()
            .find(|c| c.should_prune(ctx))
            .map(|c| c.name())
    }
}
