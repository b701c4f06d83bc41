//! Typed planner errors.
//!
//! `PlanError` is reserved for conditions that are *not* "this branch does
//! not work": misconfigured domains, unbounded policies, blown budgets, and
//! operators that break their contract. Operator failure, method failure,
//! pruning and exhausted alternatives are ordinary values handled by
//! backtracking and never surface here; a search that simply finds nothing
//! returns [`crate::planner::PlanOutcome::NotFound`].

/// Fatal planning failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// A task name is registered neither as an operator nor as a method set.
    #[error("task {name:?} is registered neither as an operator nor as a method set")]
    UnknownTask { name: String },
    /// The policy disables both the depth and the plan-length bound.
    #[error("policy disables both max_depth and max_plan_len; search may not terminate")]
    UnboundedSearch,
    /// The expansion budget ran out before the search concluded.
    #[error("expansion budget of {limit} exhausted before the search concluded")]
    ExpansionBudgetExceeded { limit: u64 },
    /// An operator produced a state that breaks the non-negativity invariant.
    #[error("operator {operator:?} violated its contract: {detail}")]
    OperatorContractViolation { operator: String, detail: String },
}

/// Error building a planning domain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// An operator name was registered twice.
    #[error("operator {name:?} registered twice")]
    DuplicateOperator { name: String },
    /// A name is already registered as the other task kind.
    #[error("task {name:?} is already registered as {existing}")]
    KindConflict {
        name: String,
        existing: &'static str,
    },
}
