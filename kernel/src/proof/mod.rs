//! Proof module: canonical bytes, content hashing, and plan replay.
//!
//! `canon` and `hash` are leaves (carrier uses them for fingerprints).
//! `replay` depends on `carrier` and `operators`; nothing in the kernel
//! depends on `replay`.

pub mod canon;
pub mod hash;
pub mod replay;
