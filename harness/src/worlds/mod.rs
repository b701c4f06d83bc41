//! World implementations for the harness runner.

pub mod crafting;
pub mod manual;
pub mod recipe_world;

use crate::contract::{PlanningWorldV1, WorldError};

/// Ids of the bundled worlds, in listing order.
pub const WORLD_IDS: [&str; 2] = [crafting::WORLD_ID, manual::WORLD_ID];

/// Look up a bundled world.
///
/// # Errors
///
/// [`WorldError::UnknownWorld`] for an unrecognized id,
/// [`WorldError::Description`] if the bundled recipe file is malformed.
pub fn world_by_id(id: &str) -> Result<Box<dyn PlanningWorldV1>, WorldError> {
    match id {
        crafting::WORLD_ID => Ok(Box::new(crafting::crafting_world()?)),
        manual::WORLD_ID => Ok(Box::new(manual::ManualWorld)),
        _ => Err(WorldError::UnknownWorld {
            world: id.to_string(),
        }),
    }
}

/// Every bundled world.
///
/// # Errors
///
/// As [`world_by_id`].
pub fn all_worlds() -> Result<Vec<Box<dyn PlanningWorldV1>>, WorldError> {
    WORLD_IDS.iter().map(|id| world_by_id(id)).collect()
}
