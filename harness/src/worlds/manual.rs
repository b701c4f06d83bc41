//! Manual world: a hand-written wood-gathering domain.
//!
//! Operators and methods are written out by hand instead of compiled from
//! recipes. Planks, sticks and benches cost no time here, and only the
//! wooden axe is tracked as a tool. The single scenario gathers twelve wood
//! in 46 time units, which only works if the planner invests in an axe.

use forge_kernel::carrier::state::{StateV1, RESOURCE_TIME};
use forge_kernel::carrier::task::{TaskArg, TaskV1};
use forge_kernel::operators::apply::{agent_arg, ApplyFailure, ApplyResult};
use forge_search::contract::{named_method, Method};
use forge_search::domain::DomainV1;

use crate::compile::{have_enough_methods, made_flag, producer_task, TASK_HAVE_ENOUGH, TASK_PRODUCE};
use crate::contract::{PlanningWorldV1, ScenarioV1, WorldError};
use crate::policy::PolicyConfig;

pub const WORLD_ID: &str = "manual";

const AXE: &str = "wooden_axe";

/// Items the `produce` router knows about.
const ITEMS: [&str; 5] = ["wood", AXE, "plank", "stick", "bench"];

/// Check `time >= cost` and every `(item, n)` in `needs`, then charge `cost`.
fn spend(
    state: &StateV1,
    agent: &str,
    op: &str,
    cost: i64,
    needs: &[(&str, i64)],
) -> ApplyResult {
    let time = state.get(RESOURCE_TIME, agent);
    if time < cost {
        return Err(ApplyFailure::PreconditionNotMet {
            detail: format!("{op} needs {cost} time, {agent} has {time}"),
        });
    }
    if let Some((item, n)) = needs.iter().find(|(item, n)| state.get(item, agent) < *n) {
        return Err(ApplyFailure::PreconditionNotMet {
            detail: format!("{op} needs {n} {item}"),
        });
    }
    let mut next = state.snapshot();
    next.set(RESOURCE_TIME, agent, time - cost);
    Ok(next)
}

fn op_punch_for_wood(state: &StateV1, args: &[TaskArg]) -> ApplyResult {
    let agent = agent_arg("op_punch_for_wood", args)?;
    let mut next = spend(state, agent, "op_punch_for_wood", 4, &[])?;
    next.set("wood", agent, state.get("wood", agent) + 1);
    Ok(next)
}

fn op_wooden_axe_for_wood(state: &StateV1, args: &[TaskArg]) -> ApplyResult {
    let agent = agent_arg("op_wooden_axe_for_wood", args)?;
    let mut next = spend(state, agent, "op_wooden_axe_for_wood", 2, &[(AXE, 1)])?;
    next.set("wood", agent, state.get("wood", agent) + 1);
    Ok(next)
}

fn op_craft_wooden_axe_at_bench(state: &StateV1, args: &[TaskArg]) -> ApplyResult {
    let agent = agent_arg("op_craft_wooden_axe_at_bench", args)?;
    let mut next = spend(
        state,
        agent,
        "op_craft_wooden_axe_at_bench",
        1,
        &[("bench", 1), ("plank", 3), ("stick", 2)],
    )?;
    next.set(AXE, agent, state.get(AXE, agent) + 1);
    next.set("plank", agent, state.get("plank", agent) - 3);
    next.set("stick", agent, state.get("stick", agent) - 2);
    next.set_flag(&made_flag(AXE), agent, true);
    Ok(next)
}

fn op_craft_plank(state: &StateV1, args: &[TaskArg]) -> ApplyResult {
    let agent = agent_arg("op_craft_plank", args)?;
    let mut next = spend(state, agent, "op_craft_plank", 0, &[("wood", 1)])?;
    next.set("wood", agent, state.get("wood", agent) - 1);
    next.set("plank", agent, state.get("plank", agent) + 4);
    Ok(next)
}

fn op_craft_stick(state: &StateV1, args: &[TaskArg]) -> ApplyResult {
    let agent = agent_arg("op_craft_stick", args)?;
    let mut next = spend(state, agent, "op_craft_stick", 0, &[("plank", 2)])?;
    next.set("plank", agent, state.get("plank", agent) - 2);
    next.set("stick", agent, state.get("stick", agent) + 4);
    Ok(next)
}

fn op_craft_bench(state: &StateV1, args: &[TaskArg]) -> ApplyResult {
    let agent = agent_arg("op_craft_bench", args)?;
    let mut next = spend(state, agent, "op_craft_bench", 0, &[("plank", 4)])?;
    next.set("plank", agent, state.get("plank", agent) - 4);
    next.set("bench", agent, state.get("bench", agent) + 1);
    Ok(next)
}

/// `[have_enough(item, n)...] ++ [op]` for the task's agent.
fn steps(
    needs: &'static [(&'static str, i64)],
    op: &'static str,
) -> impl Fn(&StateV1, &[TaskArg]) -> Option<Vec<TaskV1>> + Send + Sync {
    move |_: &StateV1, args: &[TaskArg]| {
        let agent = args.first()?.as_sym()?;
        let mut subtasks: Vec<TaskV1> = needs
            .iter()
            .map(|(item, n)| TaskV1::have_enough(agent, item, *n))
            .collect();
        subtasks.push(TaskV1::new(op, vec![agent.into()]));
        Some(subtasks)
    }
}

fn produce(state: &StateV1, args: &[TaskArg]) -> Option<Vec<TaskV1>> {
    let [agent, item] = args else { return None };
    let (agent, item) = (agent.as_sym()?, item.as_sym()?);
    if !ITEMS.contains(&item) {
        return None;
    }
    if item == AXE && state.flag(&made_flag(AXE), agent) {
        return None;
    }
    Some(vec![TaskV1::new(producer_task(item), vec![agent.into()])])
}

/// Build the hand-written domain.
///
/// # Errors
///
/// Returns [`WorldError::Domain`] on a registration clash.
pub fn manual_domain() -> Result<DomainV1, WorldError> {
    let mut d = DomainV1::new();
    d.register_operator("op_punch_for_wood", op_punch_for_wood)?;
    d.register_operator("op_wooden_axe_for_wood", op_wooden_axe_for_wood)?;
    d.register_operator("op_craft_wooden_axe_at_bench", op_craft_wooden_axe_at_bench)?;
    d.register_operator("op_craft_plank", op_craft_plank)?;
    d.register_operator("op_craft_stick", op_craft_stick)?;
    d.register_operator("op_craft_bench", op_craft_bench)?;

    d.register_methods(TASK_HAVE_ENOUGH, have_enough_methods())?;
    d.register_method(TASK_PRODUCE, named_method("produce", produce))?;

    d.register_methods(
        "produce_wood",
        [
            Box::new(named_method(
                "wooden_axe_for_wood",
                steps(&[(AXE, 1)], "op_wooden_axe_for_wood"),
            )) as Box<dyn Method>,
            Box::new(named_method("punch_for_wood", steps(&[], "op_punch_for_wood"))),
        ],
    )?;
    d.register_method(
        "produce_wooden_axe",
        named_method(
            "craft_wooden_axe_at_bench",
            steps(
                &[("bench", 1), ("stick", 2), ("plank", 3)],
                "op_craft_wooden_axe_at_bench",
            ),
        ),
    )?;
    d.register_method(
        "produce_plank",
        named_method("produce_plank", steps(&[("wood", 1)], "op_craft_plank")),
    )?;
    d.register_method(
        "produce_stick",
        named_method("produce_stick", steps(&[("plank", 2)], "op_craft_stick")),
    )?;
    d.register_method(
        "produce_bench",
        named_method("produce_bench", steps(&[("plank", 4)], "op_craft_bench")),
    )?;
    Ok(d)
}

/// The manual world. Runs with `max_depth` 20: the axe route nests
/// `have_enough` deeper than the default bound allows.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualWorld;

impl PlanningWorldV1 for ManualWorld {
    fn world_id(&self) -> &str {
        WORLD_ID
    }

    fn domain(&self) -> Result<DomainV1, WorldError> {
        manual_domain()
    }

    fn scenarios(&self) -> Vec<ScenarioV1> {
        vec![ScenarioV1::new("wood_12", "twelve wood in 46 time", &[], &[("wood", 12)], 46)]
    }

    fn initial_state(&self, scenario: &ScenarioV1) -> StateV1 {
        let agent = self.agent();
        let mut state = StateV1::new();
        for item in ITEMS {
            state.set(item, agent, 0);
        }
        state.set_flag(&made_flag(AXE), agent, false);
        for (item, n) in &scenario.initial {
            state.set(item, agent, *n);
        }
        state.set(RESOURCE_TIME, agent, scenario.time_budget);
        state
    }

    fn default_policy(&self) -> PolicyConfig {
        PolicyConfig {
            max_depth: Some(20),
            ..PolicyConfig::default()
        }
    }
}
