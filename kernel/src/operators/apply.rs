//! `OperatorTableV1` and `apply()`: the single path from a primitive task to
//! a new state.
//!
//! Three-phase check, in order:
//! 1. Table lookup: is the task name registered as an operator?
//! 2. Execute the operator against `&StateV1` (it can only return a new value).
//! 3. Post-apply validation: the operator must not have driven any
//!    previously non-negative resource below zero.
//!
//! The planner and replay verification both go through [`OperatorTableV1::apply`],
//! so a plan the planner accepts is replayed by exactly the same code.

use std::collections::HashMap;
use std::fmt;

use crate::carrier::state::StateV1;
use crate::carrier::task::{TaskArg, TaskV1};

/// Typed failure for operator application. Fail-closed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyFailure {
    /// A precondition (time, requirement, consumption) is not met.
    #[error("precondition not met: {detail}")]
    PreconditionNotMet { detail: String },
    /// The task arguments do not match what the operator expects.
    #[error("argument mismatch: {detail}")]
    ArgumentMismatch { detail: String },
    /// No operator is registered under this name.
    #[error("unknown operator {name:?}")]
    UnknownOperator { name: String },
    /// The operator returned a state with a newly negative resource.
    #[error("operator {name:?} violated its effect contract: {detail}")]
    EffectContractViolation { name: String, detail: String },
}

impl ApplyFailure {
    /// Ordinary branch failures, as opposed to domain bugs.
    #[must_use]
    pub const fn is_branch_failure(&self) -> bool {
        matches!(
            self,
            Self::PreconditionNotMet { .. } | Self::ArgumentMismatch { .. }
        )
    }
}

/// Result type for a single operator application.
pub type ApplyResult = Result<StateV1, ApplyFailure>;

/// A primitive state transition.
///
/// # Contract
///
/// - Check every precondition before computing any effect.
/// - Return a *new* state; the input is borrowed immutably.
/// - Be deterministic: same `(state, args)` → same result.
pub trait Operator: Send + Sync {
    fn apply(&self, state: &StateV1, args: &[TaskArg]) -> ApplyResult;
}

impl<F> Operator for F
where
    F: Fn(&StateV1, &[TaskArg]) -> ApplyResult + Send + Sync,
{
    fn apply(&self, state: &StateV1, args: &[TaskArg]) -> ApplyResult {
        self(state, args)
    }
}

/// Dense index of an operator in its table, assigned at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperatorId(pub(crate) usize);

impl OperatorId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Error building an operator table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperatorTableError {
    #[error("operator {name:?} registered twice")]
    DuplicateOperator { name: String },
}

/// Name → operator lookup table. Built once, read-only during search.
#[derive(Default)]
pub struct OperatorTableV1 {
    names: Vec<String>,
    handlers: Vec<Box<dyn Operator>>,
    index: HashMap<String, OperatorId>,
}

impl fmt::Debug for OperatorTableV1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorTableV1")
            .field("names", &self.names)
            .finish_non_exhaustive()
    }
}

impl OperatorTableV1 {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `op` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`OperatorTableError::DuplicateOperator`] if `name` is taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        op: impl Operator + 'static,
    ) -> Result<OperatorId, OperatorTableError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(OperatorTableError::DuplicateOperator { name });
        }
        let id = OperatorId(self.handlers.len());
        self.index.insert(name.clone(), id);
        self.names.push(name);
        self.handlers.push(Box::new(op));
        Ok(id)
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<OperatorId> {
        self.index.get(name).copied()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Registered name of `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` came from a different table.
    #[must_use]
    pub fn name(&self, id: OperatorId) -> &str {
        &self.names[id.0]
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Apply a pre-resolved operator with post-apply validation.
    ///
    /// # Errors
    ///
    /// Returns the operator's own [`ApplyFailure`], or
    /// [`ApplyFailure::EffectContractViolation`] if the result has a newly
    /// negative resource.
    ///
    /// # Panics
    ///
    /// Panics if `id` came from a different table.
    pub fn apply_id(&self, id: OperatorId, state: &StateV1, args: &[TaskArg]) -> ApplyResult {
        let next = self.handlers[id.0].apply(state, args)?;
        validate_non_negative(state, &next).map_err(|detail| {
            ApplyFailure::EffectContractViolation {
                name: self.names[id.0].clone(),
                detail,
            }
        })?;
        Ok(next)
    }

    /// Apply the operator named by `task`.
    ///
    /// # Errors
    ///
    /// Returns [`ApplyFailure::UnknownOperator`] if the name is not
    /// registered, otherwise as [`OperatorTableV1::apply_id`].
    pub fn apply(&self, state: &StateV1, task: &TaskV1) -> ApplyResult {
        let id = self
            .lookup(&task.name)
            .ok_or_else(|| ApplyFailure::UnknownOperator {
                name: task.name.clone(),
            })?;
        self.apply_id(id, state, &task.args)
    }
}

/// Reject a transition that leaves a resource negative unless it already was.
fn validate_non_negative(before: &StateV1, after: &StateV1) -> Result<(), String> {
    for (resource, agent, value) in after.quantities() {
        if value < 0 && before.get(resource, agent) >= 0 {
            return Err(format!("{resource}[{agent}] went negative ({value})"));
        }
    }
    Ok(())
}

/// Extract the acting agent (first argument) or fail with `ArgumentMismatch`.
///
/// # Errors
///
/// Returns [`ApplyFailure::ArgumentMismatch`] if the first argument is
/// missing or not a symbol.
pub fn agent_arg<'a>(operator: &str, args: &'a [TaskArg]) -> Result<&'a str, ApplyFailure> {
    args.first()
        .and_then(TaskArg::as_sym)
        .ok_or_else(|| ApplyFailure::ArgumentMismatch {
            detail: format!("{operator} expects an agent as its first argument"),
        })
}
