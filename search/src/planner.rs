//! Planner entry point and decomposition loop.
//!
//! Depth-first HTN backtracking over an explicit choice-point stack. A choice
//! point is pushed for every compound task expanded and remembers the state,
//! the agenda after the task, the committed plan length and the next method
//! to try. Failure of any branch resumes the innermost choice point with an
//! untried method; the plan is truncated back to that choice point's length,
//! so steps committed by an abandoned branch never reach the result.

use std::collections::BTreeMap;
use std::rc::Rc;

use forge_kernel::carrier::state::StateV1;
use forge_kernel::carrier::task::TaskV1;
use forge_kernel::operators::apply::ApplyFailure;

use crate::domain::{DomainV1, MethodSetId, TaskKind};
use crate::error::PlanError;
use crate::heuristic::{PruneChecks, PruneContext};
use crate::policy::PlannerPolicyV1;
use crate::stack::{Agenda, AgendaItem};

/// A plan: primitive steps in execution order plus the state they reach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanV1 {
    pub steps: Vec<TaskV1>,
    pub final_state: StateV1,
}

/// The two non-fatal outcomes of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanOutcome {
    Found(PlanV1),
    /// Every alternative was exhausted or pruned.
    NotFound,
}

/// Counters collected during one search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStatsV1 {
    /// Agenda items taken for expansion (including pruned ones).
    pub expansions: u64,
    /// Successful operator applications.
    pub operator_applications: u64,
    /// Operator applications rejected by a precondition or argument check.
    pub operator_failures: u64,
    /// Method calls.
    pub method_attempts: u64,
    /// Method calls that returned no decomposition.
    pub method_failures: u64,
    /// Failed branches that resumed an earlier choice point or ended the search.
    pub backtracks: u64,
    /// Prunes keyed by the name of the check that fired.
    pub prunes: BTreeMap<String, u64>,
    /// Deepest call stack seen at expansion time.
    pub max_depth: usize,
}

impl SearchStatsV1 {
    /// Total prunes across all checks.
    #[must_use]
    pub fn total_prunes(&self) -> u64 {
        self.prunes.values().sum()
    }

    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "backtracks": self.backtracks,
            "expansions": self.expansions,
            "max_depth": self.max_depth,
            "method_attempts": self.method_attempts,
            "method_failures": self.method_failures,
            "operator_applications": self.operator_applications,
            "operator_failures": self.operator_failures,
            "prunes": self.prunes,
        })
    }
}

/// Outcome plus statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanResultV1 {
    pub outcome: PlanOutcome,
    pub stats: SearchStatsV1,
}

impl PlanResultV1 {
    #[must_use]
    pub fn plan(&self) -> Option<&PlanV1> {
        match &self.outcome {
            PlanOutcome::Found(plan) => Some(plan),
            PlanOutcome::NotFound => None,
        }
    }

    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self.outcome, PlanOutcome::Found(_))
    }
}

/// A pending expansion: the agenda still to do, from `state`.
struct Node {
    state: Rc<StateV1>,
    agenda: Agenda,
}

/// A compound task with methods possibly still untried.
struct ChoicePoint {
    state: Rc<StateV1>,
    item: AgendaItem,
    rest: Agenda,
    plan_len: usize,
    set: MethodSetId,
    next_method: usize,
}

enum Step {
    Continue(Node),
    Fail,
    Done(Rc<StateV1>),
}

struct Search<'d> {
    domain: &'d DomainV1,
    policy_checks: PruneChecks,
    max_expansions: u64,
    steps: Vec<TaskV1>,
    choices: Vec<ChoicePoint>,
    stats: SearchStatsV1,
}

/// Find a plan for `goals` from `initial`.
///
/// Methods are tried in registration order and the first plan found is
/// returned; no attempt is made to find a cheaper one.
///
/// # Errors
///
/// - [`PlanError::UnboundedSearch`] if `policy` disables both bounds.
/// - [`PlanError::UnknownTask`] if a task name is registered nowhere.
/// - [`PlanError::ExpansionBudgetExceeded`] if `policy.max_expansions` runs out.
/// - [`PlanError::OperatorContractViolation`] if an operator returns a state
///   with a newly negative resource.
pub fn plan(
    domain: &DomainV1,
    policy: &PlannerPolicyV1,
    initial: StateV1,
    goals: Vec<TaskV1>,
) -> Result<PlanResultV1, PlanError> {
    policy.validate()?;
    tracing::debug!(goals = goals.len(), ?policy, "planning");

    let mut search = Search {
        domain,
        policy_checks: PruneChecks::from_policy(policy),
        max_expansions: policy.max_expansions,
        steps: Vec::new(),
        choices: Vec::new(),
        stats: SearchStatsV1::default(),
    };

    let mut node = Node {
        state: Rc::new(initial),
        agenda: Agenda::from_goals(goals),
    };
    let outcome = loop {
        match search.expand(node)? {
            Step::Continue(next) => node = next,
            Step::Done(state) => {
                break PlanOutcome::Found(PlanV1 {
                    steps: std::mem::take(&mut search.steps),
                    final_state: Rc::unwrap_or_clone(state),
                });
            }
            Step::Fail => {
                search.stats.backtracks += 1;
                match search.resume() {
                    Some(next) => node = next,
                    None => break PlanOutcome::NotFound,
                }
            }
        }
    };

    let stats = search.stats;
    match &outcome {
        PlanOutcome::Found(found) => tracing::info!(
            steps = found.steps.len(),
            expansions = stats.expansions,
            backtracks = stats.backtracks,
            "plan found"
        ),
        PlanOutcome::NotFound => tracing::info!(
            expansions = stats.expansions,
            backtracks = stats.backtracks,
            prunes = stats.total_prunes(),
            "no plan found"
        ),
    }
    Ok(PlanResultV1 { outcome, stats })
}

impl Search<'_> {
    fn expand(&mut self, node: Node) -> Result<Step, PlanError> {
        let Some((item, rest)) = node.agenda.pop() else {
            return Ok(Step::Done(node.state));
        };
        let item = item.settle(self.steps.len());

        self.stats.expansions += 1;
        if self.stats.expansions > self.max_expansions {
            return Err(PlanError::ExpansionBudgetExceeded {
                limit: self.max_expansions,
            });
        }

        let kind = self
            .domain
            .classify(&item.task.name)
            .ok_or_else(|| PlanError::UnknownTask {
                name: item.task.name.clone(),
            })?;
        let depth = item.stack.len();
        self.stats.max_depth = self.stats.max_depth.max(depth);
        tracing::trace!(task = %item.task, depth, plan_len = self.steps.len(), "expand");

        let ctx = PruneContext {
            state: &node.state,
            task: &item.task,
            remaining: &rest,
            plan: &self.steps,
            depth,
            call_stack: &item.stack,
            is_compound: matches!(kind, TaskKind::Compound(_)),
        };
        let fired = self
            .policy_checks
            .first_firing(&ctx)
            .or_else(|| self.domain.prune_checks().first_firing(&ctx));
        if let Some(check) = fired {
            tracing::debug!(task = %item.task, depth, check, "pruned");
            *self.stats.prunes.entry(check.to_string()).or_insert(0) += 1;
            return Ok(Step::Fail);
        }

        match kind {
            TaskKind::Primitive(id) => {
                match self
                    .domain
                    .operators()
                    .apply_id(id, &node.state, &item.task.args)
                {
                    Ok(next) => {
                        self.stats.operator_applications += 1;
                        self.steps.push(item.task);
                        Ok(Step::Continue(Node {
                            state: Rc::new(next),
                            agenda: rest,
                        }))
                    }
                    Err(ApplyFailure::EffectContractViolation { name, detail }) => {
                        Err(PlanError::OperatorContractViolation {
                            operator: name,
                            detail,
                        })
                    }
                    Err(failure) => {
                        self.stats.operator_failures += 1;
                        tracing::trace!(task = %item.task, %failure, "operator failed");
                        Ok(Step::Fail)
                    }
                }
            }
            TaskKind::Compound(set) => {
                self.choices.push(ChoicePoint {
                    state: node.state,
                    item,
                    rest,
                    plan_len: self.steps.len(),
                    set,
                    next_method: 0,
                });
                Ok(self.resume().map_or(Step::Fail, Step::Continue))
            }
        }
    }

    /// Try the next untried method of the innermost choice point, popping
    /// exhausted choice points on the way.
    fn resume(&mut self) -> Option<Node> {
        while let Some(cp) = self.choices.last_mut() {
            let methods = self.domain.methods(cp.set);
            while let Some(method) = methods.get(cp.next_method) {
                cp.next_method += 1;
                self.stats.method_attempts += 1;
                let Some(subtasks) = method.decompose(&cp.state, &cp.item.task.args) else {
                    self.stats.method_failures += 1;
                    continue;
                };
                tracing::trace!(
                    task = %cp.item.task,
                    method = method.name(),
                    subtasks = subtasks.len(),
                    "decomposed"
                );
                self.steps.truncate(cp.plan_len);
                let agenda = cp
                    .rest
                    .prepend(frame_subtasks(&cp.item, subtasks, cp.plan_len));
                return Some(Node {
                    state: Rc::clone(&cp.state),
                    agenda,
                });
            }
            tracing::debug!(
                task = %cp.item.task,
                depth = cp.item.stack.len(),
                "methods exhausted, backtracking"
            );
            self.choices.pop();
        }
        None
    }
}

/// Attach call stacks to a method's subtasks.
///
/// Each subtask runs one frame below `parent`. A trailing re-post of
/// `parent` itself is marked with `plan_len` instead: it keeps `parent`'s
/// stack as iteration of the same goal if the siblings before it commit any
/// step, and nests like any other subtask if they do not.
fn frame_subtasks(
    parent: &AgendaItem,
    subtasks: Vec<TaskV1>,
    plan_len: usize,
) -> Vec<AgendaItem> {
    let inner = parent.stack.push(parent.task.clone());
    let last = subtasks.len().checked_sub(1);
    subtasks
        .into_iter()
        .enumerate()
        .map(|(i, task)| {
            if Some(i) == last && task == parent.task {
                AgendaItem::repost(task, parent.stack.clone(), plan_len)
            } else {
                AgendaItem::new(task, inner.clone())
            }
        })
        .collect()
}
