//! Binary that runs every bundled world scenario and prints deterministic
//! output lines for cross-process verification.
//!
//! Usage: `plan_fixture`
//! Output: one line per scenario, in world then scenario order:
//!   `<world>/<scenario> outcome=found|not_found steps=<n> report_digest=sha256:...`

use forge_harness::policy::PolicyConfig;
use forge_harness::runner::run_all;
use forge_harness::worlds::all_worlds;

fn main() {
    let worlds = all_worlds().expect("bundled worlds load");
    for world in &worlds {
        let reports = run_all(world.as_ref(), &PolicyConfig::default()).expect("run failed");
        for report in reports {
            let outcome = if report.is_found() { "found" } else { "not_found" };
            let steps = report.plan().map_or(0, |p| p.steps.len());
            let digest = report.digest().expect("report digest");
            println!(
                "{}/{} outcome={outcome} steps={steps} report_digest={digest}",
                report.world_id, report.scenario_id
            );
        }
    }
}
