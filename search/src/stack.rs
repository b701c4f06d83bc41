//! Persistent call stacks and agendas.
//!
//! Both are immutable singly linked lists with shared tails. Pushing onto a
//! call stack or prefixing an agenda allocates only the new cells; every
//! choice point can keep its own agenda and call stack without copying, and
//! a branch can never observe a sibling's extensions.

use std::rc::Rc;

use forge_kernel::carrier::task::TaskV1;

/// The compound tasks currently being expanded above a task, innermost first.
#[derive(Debug, Clone, Default)]
pub struct CallStack(Option<Rc<CallFrame>>);

#[derive(Debug)]
struct CallFrame {
    task: TaskV1,
    len: usize,
    parent: CallStack,
}

impl CallStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A new stack with `task` as the innermost frame.
    #[must_use]
    pub fn push(&self, task: TaskV1) -> Self {
        Self(Some(Rc::new(CallFrame {
            task,
            len: self.len() + 1,
            parent: self.clone(),
        })))
    }

    /// Number of frames (the decomposition depth of a task under this stack).
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.as_ref().map_or(0, |f| f.len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Frames from innermost to outermost.
    #[must_use]
    pub fn iter(&self) -> Frames<'_> {
        Frames {
            next: self.0.as_deref(),
        }
    }

    /// Occurrences of exactly `task` (name and arguments).
    #[must_use]
    pub fn count(&self, task: &TaskV1) -> usize {
        self.iter().filter(|t| *t == task).count()
    }

    /// Frames from outermost to innermost.
    #[must_use]
    pub fn to_vec(&self) -> Vec<TaskV1> {
        let mut frames: Vec<TaskV1> = self.iter().cloned().collect();
        frames.reverse();
        frames
    }
}

/// Iterator over [`CallStack`] frames.
pub struct Frames<'a> {
    next: Option<&'a CallFrame>,
}

impl<'a> Iterator for Frames<'a> {
    type Item = &'a TaskV1;

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.next?;
        self.next = frame.parent.0.as_deref();
        Some(&frame.task)
    }
}

/// A pending task together with the call stack it was produced under.
#[derive(Debug, Clone)]
pub struct AgendaItem {
    pub task: TaskV1,
    pub stack: CallStack,
    /// Set on a method's trailing re-post of its own parent task: the plan
    /// length when the re-post was made. See [`AgendaItem::settle`].
    pub reposted_at: Option<usize>,
}

impl AgendaItem {
    #[must_use]
    pub fn new(task: TaskV1, stack: CallStack) -> Self {
        Self {
            task,
            stack,
            reposted_at: None,
        }
    }

    /// A re-post of the parent task on the parent's own stack, made when the
    /// plan was `plan_len` steps long.
    #[must_use]
    pub fn repost(task: TaskV1, stack: CallStack, plan_len: usize) -> Self {
        Self {
            task,
            stack,
            reposted_at: Some(plan_len),
        }
    }

    /// The item as it is expanded once the plan is `plan_len` steps long.
    ///
    /// A re-post only stays on its parent's stack if steps were committed
    /// since it was posted. Otherwise it nests one frame deeper, so a loop
    /// that makes no progress still runs into the depth and repeat bounds.
    #[must_use]
    pub fn settle(self, plan_len: usize) -> Self {
        match self.reposted_at {
            Some(at) if plan_len <= at => {
                let stack = self.stack.push(self.task.clone());
                Self::new(self.task, stack)
            }
            _ => Self::new(self.task, self.stack),
        }
    }
}

/// The ordered list of tasks still to be accomplished.
#[derive(Debug, Clone, Default)]
pub struct Agenda(Option<Rc<AgendaCell>>);

#[derive(Debug)]
struct AgendaCell {
    item: AgendaItem,
    len: usize,
    rest: Agenda,
}

impl Agenda {
    /// Top-level goals, each with an empty call stack.
    #[must_use]
    pub fn from_goals(goals: Vec<TaskV1>) -> Self {
        Self::default().prepend(
            goals
                .into_iter()
                .map(|task| AgendaItem::new(task, CallStack::new())),
        )
    }

    /// `items ++ self`, preserving the order of `items`.
    #[must_use]
    pub fn prepend<I>(&self, items: I) -> Self
    where
        I: IntoIterator<Item = AgendaItem>,
        I::IntoIter: DoubleEndedIterator,
    {
        items.into_iter().rev().fold(self.clone(), |rest, item| {
            Self(Some(Rc::new(AgendaCell {
                item,
                len: rest.len() + 1,
                rest,
            })))
        })
    }

    /// The first item and the remainder.
    #[must_use]
    pub fn pop(&self) -> Option<(AgendaItem, Agenda)> {
        self.0
            .as_ref()
            .map(|cell| (cell.item.clone(), cell.rest.clone()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.as_ref().map_or(0, |c| c.len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Pending tasks in execution order.
    pub fn tasks(&self) -> impl Iterator<Item = &TaskV1> {
        let mut next = self.0.as_deref();
        std::iter::from_fn(move || {
            let cell = next?;
            next = cell.rest.0.as_deref();
            Some(&cell.item.task)
        })
    }
}
