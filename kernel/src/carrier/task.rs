//! `TaskV1`: a task name with an ordered, typed argument list.
//!
//! Tasks are not classified here. Whether a name is primitive or compound is
//! decided by the planner's lookup table at expansion time, so the same type
//! flows through goals, method outputs, and plans.
//!
//! By convention the first argument names the acting agent; `have_enough`
//! style goals add a resource name and a required quantity.

use std::fmt;

/// One task argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskArg {
    /// A symbol: agent id, resource name, etc.
    Sym(String),
    /// An integer: a required quantity, typically.
    Int(i64),
}

impl TaskArg {
    /// The symbol, if this argument is one.
    #[must_use]
    pub fn as_sym(&self) -> Option<&str> {
        match self {
            Self::Sym(s) => Some(s),
            Self::Int(_) => None,
        }
    }

    /// The integer, if this argument is one.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Sym(_) => None,
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Sym(s) => serde_json::Value::String(s.clone()),
            Self::Int(n) => serde_json::Value::from(*n),
        }
    }
}

impl From<&str> for TaskArg {
    fn from(s: &str) -> Self {
        Self::Sym(s.to_string())
    }
}

impl From<String> for TaskArg {
    fn from(s: String) -> Self {
        Self::Sym(s)
    }
}

impl From<i64> for TaskArg {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl fmt::Display for TaskArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sym(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
        }
    }
}

/// A task instance: `(name, args...)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskV1 {
    pub name: String,
    pub args: Vec<TaskArg>,
}

impl TaskV1 {
    #[must_use]
    pub fn new(name: impl Into<String>, args: Vec<TaskArg>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// The `have_enough(agent, resource, amount)` goal form.
    #[must_use]
    pub fn have_enough(agent: &str, resource: &str, amount: i64) -> Self {
        Self::new(
            "have_enough",
            vec![agent.into(), resource.into(), amount.into()],
        )
    }

    /// The acting agent: the first argument, when it is a symbol.
    #[must_use]
    pub fn agent(&self) -> Option<&str> {
        self.args.first().and_then(TaskArg::as_sym)
    }

    /// Symbol argument at `index`.
    #[must_use]
    pub fn sym(&self, index: usize) -> Option<&str> {
        self.args.get(index).and_then(TaskArg::as_sym)
    }

    /// Integer argument at `index`.
    #[must_use]
    pub fn int(&self, index: usize) -> Option<i64> {
        self.args.get(index).and_then(TaskArg::as_int)
    }

    /// JSON form: `[name, arg0, arg1, ...]`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let mut items = Vec::with_capacity(self.args.len() + 1);
        items.push(serde_json::Value::String(self.name.clone()));
        items.extend(self.args.iter().map(TaskArg::to_json));
        serde_json::Value::Array(items)
    }
}

impl fmt::Display for TaskV1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.name)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        f.write_str(")")
    }
}
