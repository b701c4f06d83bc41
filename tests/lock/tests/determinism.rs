//! Determinism locks: identical inputs give byte-identical reports, in one
//! process and across processes with different environments.

use std::path::Path;
use std::process::Command;

use forge_harness::contract::PlanningWorldV1;
use forge_harness::policy::PolicyConfig;
use forge_harness::runner::{run_all, run_scenario};
use forge_harness::worlds::all_worlds;
use forge_harness::worlds::crafting::crafting_world;
use lock_tests::crafting_report;

// ---------------------------------------------------------------------------
// In-process
// ---------------------------------------------------------------------------

#[test]
fn repeated_runs_are_byte_identical() {
    for id in ["2", "3", "no_time"] {
        let first = crafting_report(id).canonical_bytes().unwrap();
        for _ in 1..10 {
            let other = crafting_report(id).canonical_bytes().unwrap();
            assert_eq!(first, other, "scenario {id} report bytes differ across runs");
        }
    }
}

#[test]
fn stats_are_reproducible() {
    let a = crafting_report("5");
    let b = crafting_report("5");
    assert_eq!(a.result.stats, b.result.stats);
    assert!(a.result.stats.method_attempts > 0);
}

#[test]
fn every_world_report_digests() {
    for world in all_worlds().unwrap() {
        for report in run_all(world.as_ref(), &PolicyConfig::default()).unwrap() {
            let digest = report.digest().unwrap();
            assert_eq!(digest.algorithm(), "sha256");
            assert_eq!(digest.hex_digest().len(), 64);
        }
    }
}

#[test]
fn policy_change_changes_report_digest() {
    let world = crafting_world().unwrap();
    let scenario = world.scenario("2").unwrap();
    let default = run_scenario(&world, &scenario, &PolicyConfig::default()).unwrap();
    let deeper = run_scenario(
        &world,
        &scenario,
        &PolicyConfig {
            max_plan_len: Some(31),
            ..PolicyConfig::default()
        },
    )
    .unwrap();
    assert_eq!(default.plan().unwrap().steps, deeper.plan().unwrap().steps);
    assert_ne!(default.digest().unwrap(), deeper.digest().unwrap());
}

// ---------------------------------------------------------------------------
// Cross-process
// ---------------------------------------------------------------------------

/// Resolve the path to the compiled `plan_fixture` binary.
///
/// NOTE: If CI expands to Windows, this needs `.exe` suffix handling.
fn binary_path() -> String {
    let mut path = std::env::current_exe()
        .expect("can resolve test binary path")
        .parent()
        .expect("binary dir exists")
        .parent()
        .expect("deps parent exists")
        .to_path_buf();
    path.push("plan_fixture");
    path.to_string_lossy().to_string()
}

fn workspace_root() -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("tests/ exists")
        .parent()
        .expect("workspace root exists")
        .to_string_lossy()
        .to_string()
}

fn run_variant(work_dir: &str, env_overrides: &[(&str, &str)]) -> String {
    let bin = binary_path();

    let mut command = Command::new(&bin);
    command
        .current_dir(work_dir)
        .env_remove("LC_ALL")
        .env_remove("LC_COLLATE")
        .env_remove("LANG")
        .env_remove("LANGUAGE")
        .env_remove("RUST_LOG");
    for &(key, val) in env_overrides {
        command.env(key, val);
    }

    let output = command.output().unwrap_or_else(|e| {
        panic!("failed to spawn {bin} (work_dir={work_dir}, overrides={env_overrides:?}): {e}")
    });
    assert!(
        output.status.success(),
        "plan_fixture exited with {}: stderr={}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout is valid UTF-8")
}

#[test]
fn crossproc_determinism_four_env_variants() {
    let root = workspace_root();
    let baseline = run_variant(&root, &[]);

    assert!(
        baseline.contains("crafting/2 outcome=found steps=2 report_digest=sha256:"),
        "baseline output missing crafting/2: {baseline}"
    );
    assert!(
        baseline.contains("manual/wood_12 outcome=found steps=21"),
        "baseline output missing manual/wood_12: {baseline}"
    );

    let variant_cwd = run_variant("/tmp", &[]);
    assert_eq!(baseline, variant_cwd, "output differs when cwd changes");

    let variant_locale = run_variant(&root, &[("LC_ALL", "C"), ("LANG", "C")]);
    assert_eq!(baseline, variant_locale, "output differs when LC_ALL=C LANG=C");

    let variant_noise = run_variant(
        &root,
        &[
            ("FORGE_NOISE", "should_not_matter"),
            ("TZ", "America/New_York"),
            ("HOME", "/nonexistent"),
            ("RUST_LOG", "trace"),
        ],
    );
    assert_eq!(baseline, variant_noise, "output differs with spurious env vars");
}
