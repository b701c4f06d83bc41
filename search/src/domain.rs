//! `DomainV1`: the planner context object.
//!
//! Holds the operator table, the method table and the domain's own prune
//! checks. Every task name is classified exactly once, at registration, into
//! a [`TaskKind`]; the engine resolves names through that table and never
//! re-inspects the registries by name during search.

use std::collections::HashMap;
use std::fmt;

use forge_kernel::operators::apply::{Operator, OperatorId, OperatorTableError, OperatorTableV1};

use crate::contract::Method;
use crate::error::DomainError;
use crate::heuristic::{PruneCheck, PruneChecks};

/// Dense index of a compound task's method list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodSetId(usize);

impl MethodSetId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// How a task name is expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Primitive(OperatorId),
    Compound(MethodSetId),
}

impl TaskKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Primitive(_) => "an operator",
            Self::Compound(_) => "a method set",
        }
    }
}

struct MethodSet {
    name: String,
    methods: Vec<Box<dyn Method>>,
}

/// Operators, methods and prune checks for one planning domain.
///
/// Built once, then borrowed immutably by [`crate::planner::plan`]. Two
/// domains never share registrations.
#[derive(Default)]
pub struct DomainV1 {
    operators: OperatorTableV1,
    method_sets: Vec<MethodSet>,
    kinds: HashMap<String, TaskKind>,
    checks: PruneChecks,
}

impl fmt::Debug for DomainV1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainV1")
            .field("operators", &self.operators)
            .field(
                "method_sets",
                &self
                    .method_sets
                    .iter()
                    .map(|s| (&s.name, s.methods.len()))
                    .collect::<Vec<_>>(),
            )
            .field("checks", &self.checks)
            .finish()
    }
}

impl DomainV1 {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the operator for primitive task `name`.
    ///
    /// # Errors
    ///
    /// [`DomainError::DuplicateOperator`] if `name` already has an operator,
    /// [`DomainError::KindConflict`] if it already has methods.
    pub fn register_operator(
        &mut self,
        name: impl Into<String>,
        op: impl Operator + 'static,
    ) -> Result<OperatorId, DomainError> {
        let name = name.into();
        if let Some(TaskKind::Compound(_)) = self.kinds.get(&name) {
            return Err(DomainError::KindConflict {
                name,
                existing: "a method set",
            });
        }
        let id = self
            .operators
            .register(name.clone(), op)
            .map_err(|OperatorTableError::DuplicateOperator { name }| {
                DomainError::DuplicateOperator { name }
            })?;
        self.kinds.insert(name, TaskKind::Primitive(id));
        Ok(id)
    }

    /// Append one method to compound task `name`'s list.
    ///
    /// # Errors
    ///
    /// [`DomainError::KindConflict`] if `name` is registered as an operator.
    pub fn register_method(
        &mut self,
        name: impl Into<String>,
        method: impl Method + 'static,
    ) -> Result<MethodSetId, DomainError> {
        let id = self.method_set_for(name.into())?;
        self.method_sets[id.0].methods.push(Box::new(method));
        Ok(id)
    }

    /// Append several methods to compound task `name`'s list, in order.
    ///
    /// Registering an empty list still declares `name` as compound; such a
    /// task always fails.
    ///
    /// # Errors
    ///
    /// [`DomainError::KindConflict`] if `name` is registered as an operator.
    pub fn register_methods<I>(
        &mut self,
        name: impl Into<String>,
        methods: I,
    ) -> Result<MethodSetId, DomainError>
    where
        I: IntoIterator<Item = Box<dyn Method>>,
    {
        let id = self.method_set_for(name.into())?;
        self.method_sets[id.0].methods.extend(methods);
        Ok(id)
    }

    /// Install a domain-specific prune check. Checks run after the policy's
    /// built-in checks, in registration order.
    pub fn register_prune_check(&mut self, check: impl PruneCheck + 'static) {
        self.checks.push(check);
    }

    fn method_set_for(&mut self, name: String) -> Result<MethodSetId, DomainError> {
        match self.kinds.get(&name) {
            Some(TaskKind::Compound(id)) => Ok(*id),
            Some(kind @ TaskKind::Primitive(_)) => Err(DomainError::KindConflict {
                name,
                existing: kind.label(),
            }),
            None => {
                let id = MethodSetId(self.method_sets.len());
                self.method_sets.push(MethodSet {
                    name: name.clone(),
                    methods: Vec::new(),
                });
                self.kinds.insert(name, TaskKind::Compound(id));
                Ok(id)
            }
        }
    }

    /// Classify a task name, or `None` if it is registered nowhere.
    #[must_use]
    pub fn classify(&self, name: &str) -> Option<TaskKind> {
        self.kinds.get(name).copied()
    }

    #[must_use]
    pub fn operators(&self) -> &OperatorTableV1 {
        &self.operators
    }

    /// Methods of `id`, in priority order.
    ///
    /// # Panics
    ///
    /// Panics if `id` came from a different domain.
    #[must_use]
    pub fn methods(&self, id: MethodSetId) -> &[Box<dyn Method>] {
        &self.method_sets[id.0].methods
    }

    /// Compound task name of `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` came from a different domain.
    #[must_use]
    pub fn method_set_name(&self, id: MethodSetId) -> &str {
        &self.method_sets[id.0].name
    }

    /// Compound task names, in registration order.
    pub fn compound_names(&self) -> impl Iterator<Item = &str> {
        self.method_sets.iter().map(|s| s.name.as_str())
    }

    #[must_use]
    pub fn prune_checks(&self) -> &PruneChecks {
        &self.checks
    }
}
