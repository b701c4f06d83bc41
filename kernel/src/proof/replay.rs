//! `replay_verify()`: re-execute a plan from its initial state.
//!
//! Replay goes through the same [`OperatorTableV1::apply`] path the planner
//! uses, step by step, and additionally checks the non-negativity invariant
//! after every step. A plan the planner accepted must replay to a `Match`;
//! anything else is a planner or domain bug.

use crate::carrier::state::StateV1;
use crate::carrier::task::TaskV1;
use crate::operators::apply::OperatorTableV1;

/// Outcome of a replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayVerdict {
    /// Every step applied; `final_state` is the state after the last step.
    Match { final_state: StateV1 },
    /// Step `step_index` could not be applied or left the state unsound.
    Divergence { step_index: usize, detail: String },
}

impl ReplayVerdict {
    #[must_use]
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Match { .. })
    }
}

/// Replay `steps` from `initial` against `operators`.
///
/// The initial state itself must be sound; an unsound initial state is
/// reported as a divergence at step 0 before anything is applied.
#[must_use]
pub fn replay_verify(
    initial: &StateV1,
    steps: &[TaskV1],
    operators: &OperatorTableV1,
) -> ReplayVerdict {
    if let Some(neg) = initial.first_negative() {
        return ReplayVerdict::Divergence {
            step_index: 0,
            detail: format!(
                "initial state has {}[{}] = {}",
                neg.resource, neg.agent, neg.value
            ),
        };
    }

    let mut state = initial.clone();
    for (step_index, task) in steps.iter().enumerate() {
        state = match operators.apply(&state, task) {
            Ok(next) => next,
            Err(failure) => {
                return ReplayVerdict::Divergence {
                    step_index,
                    detail: format!("{task}: {failure}"),
                };
            }
        };
        if let Some(neg) = state.first_negative() {
            return ReplayVerdict::Divergence {
                step_index,
                detail: format!(
                    "{task} left {}[{}] = {}",
                    neg.resource, neg.agent, neg.value
                ),
            };
        }
    }
    ReplayVerdict::Match { final_state: state }
}
