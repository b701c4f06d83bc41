//! Outcome locks for the bundled crafting and manual worlds, and for the
//! small fixture domains that pin one planning behavior each.

use forge_harness::contract::{PlanningWorldV1, ScenarioV1};
use forge_harness::policy::PolicyConfig;
use forge_harness::runner::run_scenario;
use forge_harness::worlds::crafting::{crafting_world, BENCH_DEPTH};
use forge_harness::worlds::manual::ManualWorld;
use forge_kernel::carrier::state::RESOURCE_TIME;
use lock_tests::{
    crafting_report, recipe_world, run_first, step_names, AGENT, BENCH_FREE_JSON,
    MUTUAL_CYCLE_JSON, SELF_REQUIRING_JSON,
};

// ---------------------------------------------------------------------------
// Crafting world
// ---------------------------------------------------------------------------

#[test]
fn held_goal_needs_no_steps_even_without_time() {
    let report = crafting_report("1");
    let found = report.plan().expect("goal already held");
    assert!(found.steps.is_empty());
    assert_eq!(found.final_state, report.initial_state);
}

#[test]
fn plank_from_nothing_punches_then_crafts() {
    let report = crafting_report("2");
    assert_eq!(step_names(&report), ["op_punch_for_wood", "op_craft_plank"]);
    assert_eq!(report.time_left(), Some(295));
    let final_state = &report.plan().unwrap().final_state;
    assert_eq!(final_state.get("plank", AGENT), 4);
    assert_eq!(final_state.get("wood", AGENT), 0);
}

#[test]
fn plank_with_no_time_is_not_found() {
    let report = crafting_report("no_time");
    assert!(!report.is_found());
    assert!(report.result.stats.expansions > 0);
}

#[test]
fn bench_pickaxe_from_planks_and_sticks() {
    let report = crafting_report("3");
    assert_eq!(report.policy.max_depth, Some(BENCH_DEPTH));
    assert_eq!(
        step_names(&report),
        [
            "op_punch_for_wood",
            "op_craft_plank",
            "op_craft_bench",
            "op_craft_wooden_pickaxe_at_bench",
        ]
    );
    assert_eq!(report.time_left(), Some(3));
    let final_state = &report.plan().unwrap().final_state;
    assert_eq!(final_state.get("wooden_pickaxe", AGENT), 1);
    assert_eq!(final_state.get("bench", AGENT), 1);
}

#[test]
fn bench_pickaxe_is_out_of_reach_at_the_default_depth() {
    let world = crafting_world().unwrap();
    let overrides = PolicyConfig {
        max_depth: Some(10),
        ..PolicyConfig::default()
    };
    let report = run_scenario(&world, &world.scenario("3").unwrap(), &overrides).unwrap();
    assert!(!report.is_found());
    assert!(report.result.stats.prunes.get("depth_bound").is_some_and(|&n| n > 0));
}

#[test]
fn iron_and_rail_goals_are_not_found_under_default_bounds() {
    for id in ["4", "5", "6"] {
        let report = crafting_report(id);
        assert!(!report.is_found(), "scenario {id} unexpectedly found a plan");
        assert!(report.result.stats.total_prunes() > 0, "scenario {id} never pruned");
    }
}

// ---------------------------------------------------------------------------
// Fixture domains
// ---------------------------------------------------------------------------

#[test]
fn sufficient_inventory_needs_a_single_craft() {
    let world = recipe_world(
        "bench_free",
        BENCH_FREE_JSON,
        ScenarioV1::new(
            "pickaxe",
            "",
            &[("plank", 3), ("stick", 2)],
            &[("wooden_pickaxe", 1)],
            10,
        ),
    );
    let report = run_first(&world, &PolicyConfig::default());
    assert_eq!(step_names(&report), ["op_craft_wooden_pickaxe"]);
    let final_state = &report.plan().unwrap().final_state;
    assert_eq!(final_state.get("plank", AGENT), 0);
    assert_eq!(final_state.get("stick", AGENT), 0);
    assert_eq!(final_state.get(RESOURCE_TIME, AGENT), 9);
    assert!(final_state.flag("made_wooden_pickaxe", AGENT));
}

#[test]
fn bench_free_pickaxe_from_nothing_gathers_first() {
    let world = recipe_world(
        "bench_free",
        BENCH_FREE_JSON,
        ScenarioV1::new("pickaxe", "", &[], &[("wooden_pickaxe", 1)], 30),
    );
    let report = run_first(&world, &PolicyConfig::default());
    let steps = step_names(&report);
    assert_eq!(steps.last(), Some(&"op_craft_wooden_pickaxe"));
    assert!(steps.contains(&"op_punch_for_wood"));
    assert!(steps.contains(&"op_craft_stick"));
}

#[test]
fn self_requiring_recipe_terminates_without_plan() {
    let world = recipe_world(
        "gem",
        SELF_REQUIRING_JSON,
        ScenarioV1::new("gem", "", &[], &[("gem", 1)], 100),
    );
    let report = run_first(&world, &PolicyConfig::default());
    assert!(!report.is_found());
    assert!(report.result.stats.total_prunes() > 0);
}

#[test]
fn self_requiring_recipe_succeeds_with_seed() {
    let world = recipe_world(
        "gem",
        SELF_REQUIRING_JSON,
        ScenarioV1::new("gem", "", &[("gem", 1)], &[("gem", 2)], 100),
    );
    let report = run_first(&world, &PolicyConfig::default());
    assert_eq!(step_names(&report), ["op_cut_gem"]);
}

#[test]
fn mutual_cycle_terminates_without_plan() {
    let world = recipe_world(
        "spices",
        MUTUAL_CYCLE_JSON,
        ScenarioV1::new("salt", "", &[], &[("salt", 1)], 100),
    );
    let report = run_first(&world, &PolicyConfig::default());
    assert!(!report.is_found());
}

// ---------------------------------------------------------------------------
// Manual world
// ---------------------------------------------------------------------------

#[test]
fn manual_world_gathers_twelve_wood_with_an_axe() {
    let world = ManualWorld;
    let report = run_scenario(
        &world,
        &world.scenario("wood_12").unwrap(),
        &PolicyConfig::default(),
    )
    .unwrap();
    let steps = step_names(&report);
    assert_eq!(steps.len(), 21);
    assert_eq!(
        steps[..10],
        [
            "op_punch_for_wood",
            "op_craft_plank",
            "op_craft_bench",
            "op_punch_for_wood",
            "op_craft_plank",
            "op_craft_stick",
            "op_punch_for_wood",
            "op_craft_plank",
            "op_craft_wooden_axe_at_bench",
            "op_wooden_axe_for_wood",
        ]
    );
    assert!(steps[10..].iter().all(|&s| s == "op_wooden_axe_for_wood"));
    assert_eq!(report.time_left(), Some(9));
    assert_eq!(report.plan().unwrap().final_state.get("wood", AGENT), 12);
}
