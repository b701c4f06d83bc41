//! Method contract trait.

use forge_kernel::carrier::state::StateV1;
use forge_kernel::carrier::task::{TaskArg, TaskV1};

/// One candidate decomposition of a compound task.
///
/// # Contract
///
/// - `decompose` is a pure function of `(state, args)`: the state is
///   borrowed immutably and nothing may be committed here.
/// - `Some(vec![])` means the task is already satisfied.
/// - `None` means this decomposition does not apply; the planner tries the
///   next method registered for the same task name.
/// - Deterministic: same `(state, args)` → same subtasks in the same order.
pub trait Method: Send + Sync {
    /// Diagnostic name (traces only; never used for routing).
    fn name(&self) -> &str {
        "method"
    }

    fn decompose(&self, state: &StateV1, args: &[TaskArg]) -> Option<Vec<TaskV1>>;
}

impl<F> Method for F
where
    F: Fn(&StateV1, &[TaskArg]) -> Option<Vec<TaskV1>> + Send + Sync,
{
    fn decompose(&self, state: &StateV1, args: &[TaskArg]) -> Option<Vec<TaskV1>> {
        self(state, args)
    }
}

/// A closure method with a diagnostic name.
pub struct NamedMethod<F> {
    name: String,
    f: F,
}

/// Wrap `f` so traces show `name` instead of the generic `"method"`.
pub fn named_method<F>(name: impl Into<String>, f: F) -> NamedMethod<F>
where
    F: Fn(&StateV1, &[TaskArg]) -> Option<Vec<TaskV1>> + Send + Sync,
{
    NamedMethod {
        name: name.into(),
        f,
    }
}

impl<F> Method for NamedMethod<F>
where
    F: Fn(&StateV1, &[TaskArg]) -> Option<Vec<TaskV1>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn decompose(&self, state: &StateV1, args: &[TaskArg]) -> Option<Vec<TaskV1>> {
        (self.f)(state, args)
    }
}
