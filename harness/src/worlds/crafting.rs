//! Crafting world: the bundled Minecraft-style recipe set.
//!
//! Eleven items, eight tools, twenty-five recipes. Scenario ids `"1"` to `"6"`
//! are the classic checks:
//!
//! | id | initial | goal | time | max depth |
//! |----|---------|------|------|-----------|
//! | 1 | plank 1 | plank 1 | 0 | 10 |
//! | 2 | | plank 1 | 300 | 10 |
//! | 3 | plank 3, stick 2 | wooden_pickaxe 1 | 10 | 12 |
//! | 4 | | iron_pickaxe 1 | 100 | 10 |
//! | 5 | | cart 1, rail 10 | 175 | 10 |
//! | 6 | | cart 1, rail 20 | 250 | 10 |
//!
//! Each item level costs three frames (`have_enough`, `produce`,
//! `produce_<item>`), so the bench under the pickaxe sits twelve frames
//! deep. Raising the bound for the whole world does not work: from depth 12
//! on, the iron and stone axe routes for wood grow past the expansion budget
//! in scenarios 4 to 6.
//!
//! `"no_time"` asks for a plank with nothing in hand and no time at all.

use crate::contract::ScenarioV1;
use crate::policy::PolicyConfig;
use crate::recipe::{DomainDescriptionV1, RecipeError};
use crate::worlds::recipe_world::RecipeWorldV1;

pub const WORLD_ID: &str = "crafting";

/// Depth bound of scenario `"3"`, deep enough to craft a bench on the way.
pub const BENCH_DEPTH: usize = 12;

/// The recipe set, as shipped.
pub const CRAFTING_JSON: &str = include_str!("crafting.json");

/// Parse [`CRAFTING_JSON`].
///
/// # Errors
///
/// Returns [`RecipeError::Parse`] if the bundled file is malformed.
pub fn crafting_description() -> Result<DomainDescriptionV1, RecipeError> {
    DomainDescriptionV1::from_json_str(CRAFTING_JSON)
}

#[must_use]
pub fn crafting_scenarios() -> Vec<ScenarioV1> {
    vec![
        ScenarioV1::new("1", "already holding a plank", &[("plank", 1)], &[("plank", 1)], 0),
        ScenarioV1::new("2", "plank from nothing", &[], &[("plank", 1)], 300),
        ScenarioV1::new(
            "3",
            "wooden pickaxe from planks and sticks",
            &[("plank", 3), ("stick", 2)],
            &[("wooden_pickaxe", 1)],
            10,
        )
        .with_policy(PolicyConfig {
            max_depth: Some(BENCH_DEPTH),
            ..PolicyConfig::default()
        }),
        ScenarioV1::new("4", "iron pickaxe from nothing", &[], &[("iron_pickaxe", 1)], 100),
        ScenarioV1::new(
            "5",
            "cart and rails",
            &[],
            &[("cart", 1), ("rail", 10)],
            175,
        ),
        ScenarioV1::new(
            "6",
            "cart and more rails",
            &[],
            &[("cart", 1), ("rail", 20)],
            250,
        ),
        ScenarioV1::new("no_time", "plank with no time", &[], &[("plank", 1)], 0),
    ]
}

/// The crafting world with its scenarios.
///
/// # Errors
///
/// As [`crafting_description`].
pub fn crafting_world() -> Result<RecipeWorldV1, RecipeError> {
    Ok(RecipeWorldV1::new(WORLD_ID, crafting_description()?).with_scenarios(crafting_scenarios()))
}
