//! Carrier module: the state and task values every other layer passes around.
//!
//! This is the foundational layer. It imports only `proof` helpers for
//! canonical bytes and fingerprints.

pub mod state;
pub mod task;
