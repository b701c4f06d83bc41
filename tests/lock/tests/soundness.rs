//! Soundness locks: every plan the planner returns replays from its initial
//! state, never drives a quantity negative, and never carries effects of an
//! abandoned branch.

use forge_harness::contract::{PlanningWorldV1, ScenarioV1};
use forge_harness::policy::PolicyConfig;
use forge_harness::runner::run_all;
use forge_harness::worlds::all_worlds;
use forge_harness::worlds::crafting::crafting_world;
use forge_kernel::carrier::state::{StateV1, RESOURCE_TIME};
use forge_kernel::carrier::task::{TaskArg, TaskV1};
use forge_kernel::operators::apply::{agent_arg, ApplyFailure, ApplyResult};
use forge_kernel::proof::replay::{replay_verify, ReplayVerdict};
use forge_search::domain::DomainV1;
use forge_search::planner::plan;
use forge_search::policy::PlannerPolicyV1;
use lock_tests::{crafting_report, recipe_world, run_first, AGENT, BENCH_FREE_JSON};

fn task(name: &str) -> TaskV1 {
    TaskV1::new(name, vec![AGENT.into()])
}

/// `op_spend` takes all coins; `op_fail` always fails; `op_audit` succeeds
/// only while all five coins are still there.
fn ledger_domain() -> DomainV1 {
    let mut d = DomainV1::new();
    d.register_operator("op_spend", |s: &StateV1, args: &[TaskArg]| -> ApplyResult {
        let agent = agent_arg("op_spend", args)?;
        let mut next = s.snapshot();
        next.set("coins", agent, 0);
        next.set("spent", agent, s.get("coins", agent));
        Ok(next)
    })
    .unwrap();
    d.register_operator("op_fail", |_: &StateV1, _: &[TaskArg]| -> ApplyResult {
        Err(ApplyFailure::PreconditionNotMet {
            detail: "never".into(),
        })
    })
    .unwrap();
    d.register_operator("op_audit", |s: &StateV1, args: &[TaskArg]| -> ApplyResult {
        let agent = agent_arg("op_audit", args)?;
        if s.get("coins", agent) != 5 || s.get("spent", agent) != 0 {
            return Err(ApplyFailure::PreconditionNotMet {
                detail: "ledger touched".into(),
            });
        }
        let mut next = s.snapshot();
        next.set("audited", agent, 1);
        Ok(next)
    })
    .unwrap();
    d.register_method("settle", |_: &StateV1, args: &[TaskArg]| {
        let agent = args.first()?.as_sym()?;
        Some(vec![
            TaskV1::new("op_spend", vec![agent.into()]),
            TaskV1::new("op_fail", vec![agent.into()]),
        ])
    })
    .unwrap();
    d.register_method("settle", |_: &StateV1, args: &[TaskArg]| {
        let agent = args.first()?.as_sym()?;
        Some(vec![TaskV1::new("op_audit", vec![agent.into()])])
    })
    .unwrap();
    d
}

fn ledger_state() -> StateV1 {
    let mut s = StateV1::new();
    s.set("coins", AGENT, 5);
    s.set("spent", AGENT, 0);
    s.set(RESOURCE_TIME, AGENT, 1);
    s
}

// ---------------------------------------------------------------------------
// Branch isolation
// ---------------------------------------------------------------------------

#[test]
fn abandoned_branch_leaves_no_trace() {
    let initial = ledger_state();
    let result = plan(
        &ledger_domain(),
        &PlannerPolicyV1::default(),
        initial.clone(),
        vec![task("settle")],
    )
    .unwrap();
    let found = result.plan().expect("second method succeeds");
    assert_eq!(found.steps, [task("op_audit")]);
    assert_eq!(found.final_state.get("coins", AGENT), 5);
    assert_eq!(found.final_state.get("audited", AGENT), 1);
    assert_eq!(result.stats.operator_applications, 2);
    assert_eq!(result.stats.operator_failures, 1);
    assert_eq!(initial, ledger_state(), "caller's state was mutated");
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

#[test]
fn every_found_bundled_plan_replays_and_stays_sound() {
    let mut found = 0;
    for world in all_worlds().unwrap() {
        let domain = world.domain().unwrap();
        for report in run_all(world.as_ref(), &PolicyConfig::default()).unwrap() {
            let Some(p) = report.plan() else { continue };
            found += 1;
            match replay_verify(&report.initial_state, &p.steps, domain.operators()) {
                ReplayVerdict::Match { final_state } => assert_eq!(final_state, p.final_state),
                ReplayVerdict::Divergence { step_index, detail } => {
                    panic!(
                        "{}/{} diverges at {step_index}: {detail}",
                        report.world_id, report.scenario_id
                    )
                }
            }
            assert!(p.final_state.is_sound());
            assert!(p.final_state.get(RESOURCE_TIME, AGENT) >= 0);
        }
    }
    assert!(found >= 3, "expected at least three found plans, got {found}");
}

#[test]
fn tampered_plan_diverges_on_replay() {
    let domain = crafting_world().unwrap().domain().unwrap();
    let report = crafting_report("2");
    let mut steps = report.plan().unwrap().steps.clone();
    steps.reverse();
    let verdict = replay_verify(&report.initial_state, &steps, domain.operators());
    assert!(matches!(verdict, ReplayVerdict::Divergence { step_index: 0, .. }));
}

#[test]
fn soundness_does_not_depend_on_pruning() {
    // Only the plan-length bound stays on; nothing else prunes.
    let overrides = PolicyConfig {
        max_plan_len: Some(12),
        no_depth_bound: true,
        no_repeat_check: true,
        no_exhaustion_check: true,
        ..PolicyConfig::default()
    };
    let world = recipe_world(
        "bench_free",
        BENCH_FREE_JSON,
        ScenarioV1::new("p", "", &[], &[("plank", 5)], 20),
    );
    let report = run_first(&world, &overrides);
    let p = report.plan().expect("planks are reachable");
    assert!(p.final_state.get("plank", AGENT) >= 5);
    assert!(p.final_state.is_sound());
}
