//! Forge Kernel: the value types and state transitions of the planner.
//!
//! # API Surface
//!
//! - [`carrier::state::StateV1`] -- per-agent resource counters and flags
//! - [`carrier::task::TaskV1`] -- a task name with typed arguments
//! - [`operators::apply::OperatorTableV1::apply`] -- apply a primitive task, producing a new state
//! - [`proof::replay::replay_verify`] -- verify a plan by deterministic replay
//!
//! # Module Dependency Direction
//!
//! `carrier` ← `operators` ← `proof::replay`
//!
//! `proof::canon` and `proof::hash` are leaf utilities used by `carrier`
//! for fingerprints. Nothing in the kernel depends on `proof::replay`.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod carrier;
pub mod operators;
pub mod proof;
