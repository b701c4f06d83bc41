//! Forge Harness: recipe compilation, bundled worlds, and the run pipeline.
//!
//! The harness turns declarative recipe descriptions into planning domains
//! (`recipe` → `compile`), defines the world contract (`contract`), and runs
//! a world's scenarios through the planner with replay verification
//! (`runner`). It does NOT implement search; it delegates to `forge_search`.
//! Worlds provide domain data only; the harness owns orchestration.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod compile;
pub mod config;
pub mod contract;
pub mod policy;
pub mod recipe;
pub mod runner;
pub mod worlds;
