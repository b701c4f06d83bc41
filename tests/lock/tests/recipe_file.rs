//! Recipe files on disk: load, compile, plan, and reject bad input.

use std::io::Write;

use forge_harness::compile::compile_domain;
use forge_harness::config::RunConfig;
use forge_harness::contract::{PlanningWorldV1, ScenarioV1};
use forge_harness::policy::PolicyConfig;
use forge_harness::recipe::{DomainDescriptionV1, RecipeError};
use forge_harness::runner::{run_scenario, RunError};
use forge_harness::worlds::crafting::CRAFTING_JSON;
use forge_harness::worlds::recipe_world::{RecipeWorldV1, DESCRIPTION_SCENARIO};
use lock_tests::{step_names, BENCH_FREE_JSON};

fn write_temp(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(content.as_bytes()).expect("write temp file");
    file
}

#[test]
fn bundled_file_round_trips_through_disk() {
    let file = write_temp(CRAFTING_JSON);
    let from_disk = DomainDescriptionV1::from_path(file.path()).unwrap();
    let embedded = DomainDescriptionV1::from_json_str(CRAFTING_JSON).unwrap();
    assert_eq!(from_disk, embedded);
    assert_eq!(from_disk.digest().unwrap(), embedded.digest().unwrap());
}

#[test]
fn file_goal_drives_description_scenario() {
    let json = BENCH_FREE_JSON.replacen(
        "\"Recipes\"",
        "\"Initial\": {\"plank\": 3, \"stick\": 2}, \"Goal\": {\"wooden_pickaxe\": 1}, \"Recipes\"",
        1,
    );
    let file = write_temp(&json);
    let desc = DomainDescriptionV1::from_path(file.path()).unwrap();
    let world = RecipeWorldV1::new("from_file", desc);
    let scenario = world.scenario(DESCRIPTION_SCENARIO).unwrap();
    let report = run_scenario(&world, &scenario, &PolicyConfig::default()).unwrap();
    assert_eq!(step_names(&report), ["op_craft_wooden_pickaxe"]);
}

#[test]
fn negative_file_initial_is_an_input_error() {
    let json = BENCH_FREE_JSON.replacen(
        "\"Recipes\"",
        "\"Initial\": {\"plank\": -2}, \"Goal\": {\"wooden_pickaxe\": 1}, \"Recipes\"",
        1,
    );
    let desc = DomainDescriptionV1::from_json_str(&json).unwrap();
    let world = RecipeWorldV1::new("owing", desc);
    let scenario = world.scenario(DESCRIPTION_SCENARIO).unwrap();
    let err = run_scenario(&world, &scenario, &PolicyConfig::default()).unwrap_err();
    assert!(
        matches!(&err, RunError::NegativeInitialState { resource, value: -2, .. } if resource == "plank"),
        "{err:?}"
    );
    assert_eq!(err.to_string(), format!("initial state has negative plank[{}] = -2", world.agent()));
}

#[test]
fn config_file_overrides_flow_into_the_run() {
    let config = write_temp(r#"{"agent": "steve", "policy": {"max_depth": 3}}"#);
    let config = RunConfig::from_path(config.path()).unwrap();
    let desc = DomainDescriptionV1::from_json_str(BENCH_FREE_JSON).unwrap();
    let world = RecipeWorldV1::new("bench_free", desc).with_agent(config.agent());
    let scenario = ScenarioV1::new(
        "plank",
        "",
        &[],
        &[("plank", 1)],
        config.time_budget(),
    );
    let report = run_scenario(&world, &scenario, &config.policy).unwrap();
    assert_eq!(report.agent, "steve");
    assert_eq!(report.policy.max_depth, Some(3));
    // punch sits at depth 6, below the configured bound.
    assert!(!report.is_found());
}

#[test]
fn defective_recipes_are_skipped_not_fatal() {
    let file = write_temp(
        r#"{"Recipes": {
            "craft plank": {"Consumes": {"wood": 1}, "Produces": {"plank": 4}},
            "look around": {"Time": 1},
            "unmake wood": {"Time": -2, "Produces": {"wood": 1}}
        }}"#,
    );
    let desc = DomainDescriptionV1::from_path(file.path()).unwrap();
    let compiled = compile_domain(&desc).unwrap();
    let skipped: Vec<_> = compiled.skipped.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(skipped, ["look around", "unmake wood"]);
    assert_eq!(compiled.domain.operators().len(), 1);
}

#[test]
fn truncated_file_is_a_parse_error() {
    let file = write_temp(&CRAFTING_JSON[..CRAFTING_JSON.len() / 2]);
    let err = DomainDescriptionV1::from_path(file.path()).unwrap_err();
    assert!(matches!(err, RecipeError::Parse { .. }));
}
