//! Forge Search: depth-first HTN decomposition with backtracking.
//!
//! This crate provides the planning layer. It depends only on
//! `forge_kernel`; it does NOT depend on `forge_harness`.
//!
//! # Crate dependency graph
//!
//! ```text
//! forge_kernel  ←  forge_search  ←  forge_harness
//! (state, tasks,    (domain, prune    (recipes, compile,
//!  operators)        checks, planner)  runner, worlds)
//! ```
//!
//! # Key types
//!
//! - [`DomainV1`]: operator table, method table, and domain prune checks
//! - [`Method`]: one candidate decomposition of a compound task
//! - [`PruneCheck`]: pure branch-abandonment predicate over [`PruneContext`]
//! - [`PlannerPolicyV1`]: depth, plan-length, repeat and expansion bounds
//! - [`plan`]: the sole entry point, returning [`PlanResultV1`]

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod contract;
pub mod domain;
pub mod error;
pub mod heuristic;
pub mod planner;
pub mod policy;
pub mod stack;

pub use contract::{named_method, Method};
pub use domain::{DomainV1, MethodSetId, TaskKind};
pub use error::{DomainError, PlanError};
pub use heuristic::{PruneCheck, PruneChecks, PruneContext};
pub use planner::{plan, PlanOutcome, PlanResultV1, PlanV1, SearchStatsV1};
pub use policy::PlannerPolicyV1;
