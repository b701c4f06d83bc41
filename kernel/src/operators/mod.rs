//! Operators module: the operator contract, the name → operator table, and
//! the recipe operator.
//!
//! Depends on `carrier`. Does not import from `proof::replay`.

pub mod apply;
pub mod recipe;
