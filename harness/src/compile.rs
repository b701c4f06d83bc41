//! Recipe compilation: [`DomainDescriptionV1`] → [`DomainV1`].
//!
//! Every recipe becomes one [`RecipeOperatorV1`] named `op_<recipe>` (spaces
//! replaced by underscores). Every recipe with an output also becomes one
//! method of `produce_<item>`, whose subtasks acquire each requirement and
//! each consumption through `have_enough` before running the operator.
//! Producer methods for one item are ordered by ascending `Time`, then by
//! recipe name.
//!
//! Two built-in compound tasks tie recipes together:
//!
//! - `have_enough(agent, item, n)`: `check_enough` succeeds with no subtasks
//!   when the agent already holds `n`; `produce_enough` produces one more
//!   batch and re-posts itself.
//! - `produce(agent, item)`: routes to `produce_<item>`. Fails for items no
//!   recipe produces, and for tools the agent has already made once.

use std::collections::{BTreeMap, BTreeSet};

use forge_kernel::carrier::state::{StateV1, RESOURCE_TIME};
use forge_kernel::carrier::task::{TaskArg, TaskV1};
use forge_kernel::operators::recipe::RecipeOperatorV1;
use forge_search::contract::{named_method, Method};
use forge_search::domain::DomainV1;
use forge_search::error::DomainError;

use crate::recipe::{DomainDescriptionV1, RecipeV1};

/// Built-in "hold at least n" task.
pub const TASK_HAVE_ENOUGH: &str = "have_enough";
/// Built-in "make one batch of an item" task.
pub const TASK_PRODUCE: &str = "produce";

/// `op_<recipe>` with spaces replaced by underscores.
#[must_use]
pub fn operator_name(recipe: &str) -> String {
    format!("op_{}", recipe.replace(' ', "_"))
}

/// `produce_<item>`.
#[must_use]
pub fn producer_task(item: &str) -> String {
    format!("produce_{item}")
}

/// `made_<tool>`: set once the agent has crafted `tool`.
#[must_use]
pub fn made_flag(tool: &str) -> String {
    format!("made_{tool}")
}

/// Error compiling a description.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// Two recipes map to the same operator name, or a name clashes with a
    /// built-in task.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// A compiled domain plus what compilation decided.
#[derive(Debug)]
pub struct CompiledDomainV1 {
    pub domain: DomainV1,
    /// Item → recipe names of its producer methods, in priority order.
    pub producers: BTreeMap<String, Vec<String>>,
    /// Recipes left out, with the reason.
    pub skipped: Vec<(String, String)>,
}

/// Compile a description into a planning domain.
///
/// Defective recipes (no output, negative amounts) are skipped with a
/// warning rather than failing the whole compilation.
///
/// # Errors
///
/// Returns [`CompileError::Domain`] if two recipes produce the same operator
/// name.
pub fn compile_domain(desc: &DomainDescriptionV1) -> Result<CompiledDomainV1, CompileError> {
    let mut domain = DomainV1::new();
    let mut skipped = Vec::new();
    let mut by_item: BTreeMap<String, Vec<(&str, &RecipeV1)>> = BTreeMap::new();

    for (name, recipe) in &desc.recipes {
        if let Some(reason) = recipe.defect() {
            tracing::warn!(recipe = %name, %reason, "skipping recipe");
            skipped.push((name.clone(), reason));
            continue;
        }
        let op_name = operator_name(name);
        domain.register_operator(op_name.clone(), recipe_operator(desc, &op_name, recipe))?;
        if let Some(item) = recipe.primary_output() {
            by_item
                .entry(item.to_string())
                .or_default()
                .push((name.as_str(), recipe));
        }
    }

    let mut producers = BTreeMap::new();
    for (item, mut recipes) in by_item {
        recipes.sort_by(|a, b| a.1.time.cmp(&b.1.time).then_with(|| a.0.cmp(b.0)));
        let methods: Vec<Box<dyn Method>> = recipes
            .iter()
            .map(|(name, recipe)| recipe_method(name, recipe))
            .collect();
        domain.register_methods(producer_task(&item), methods)?;
        producers.insert(
            item,
            recipes.iter().map(|(name, _)| (*name).to_string()).collect(),
        );
    }

    register_builtins(
        &mut domain,
        producers.keys().cloned().collect(),
        desc.tools.iter().cloned().collect(),
    )?;

    tracing::debug!(
        operators = domain.operators().len(),
        producible = producers.len(),
        skipped = skipped.len(),
        "compiled domain"
    );
    Ok(CompiledDomainV1 {
        domain,
        producers,
        skipped,
    })
}

fn recipe_operator(
    desc: &DomainDescriptionV1,
    op_name: &str,
    recipe: &RecipeV1,
) -> RecipeOperatorV1 {
    let mut op = RecipeOperatorV1::new(op_name, recipe.time);
    for (resource, amount) in recipe.requires.iter() {
        op = op.requiring(resource, amount.count());
    }
    for (resource, amount) in recipe.consumes.iter() {
        op = op.consuming(resource, amount.count());
    }
    for (resource, amount) in recipe.produces.iter() {
        op = op.producing(resource, amount.count());
        if desc.is_tool(resource) {
            op = op.setting_flag(&made_flag(resource));
        }
    }
    op
}

/// `[have_enough(r) for r in requires ++ consumes] ++ [op_<recipe>]`.
fn recipe_method(name: &str, recipe: &RecipeV1) -> Box<dyn Method> {
    let needs: Vec<(String, i64)> = recipe
        .requires
        .iter()
        .chain(recipe.consumes.iter())
        .map(|(resource, amount)| (resource.to_owned(), amount.count()))
        .collect();
    let op_name = operator_name(name);
    Box::new(named_method(
        name.replace(' ', "_"),
        move |_: &StateV1, args: &[TaskArg]| {
            let agent = args.first()?.as_sym()?;
            let mut subtasks: Vec<TaskV1> = needs
                .iter()
                .map(|(resource, n)| TaskV1::have_enough(agent, resource, *n))
                .collect();
            subtasks.push(TaskV1::new(op_name.clone(), vec![agent.into()]));
            Some(subtasks)
        },
    ))
}

/// Decode `(agent, item, n)` from `have_enough` arguments.
#[must_use]
pub fn have_enough_args(args: &[TaskArg]) -> Option<(&str, &str, i64)> {
    match args {
        [agent, item, n] => Some((agent.as_sym()?, item.as_sym()?, n.as_int()?)),
        _ => None,
    }
}

/// `check_enough` then `produce_enough`, the methods of `have_enough`.
#[must_use]
pub fn have_enough_methods() -> Vec<Box<dyn Method>> {
    vec![
        Box::new(named_method("check_enough", |state: &StateV1, args: &[TaskArg]| {
            let (agent, item, n) = have_enough_args(args)?;
            (state.get(item, agent) >= n).then(Vec::new)
        })) as Box<dyn Method>,
        Box::new(named_method("produce_enough", |_: &StateV1, args: &[TaskArg]| {
            let (agent, item, n) = have_enough_args(args)?;
            Some(vec![
                TaskV1::new(TASK_PRODUCE, vec![agent.into(), item.into()]),
                TaskV1::have_enough(agent, item, n),
            ])
        })),
    ]
}

fn register_builtins(
    domain: &mut DomainV1,
    producible: BTreeSet<String>,
    tools: BTreeSet<String>,
) -> Result<(), DomainError> {
    domain.register_methods(TASK_HAVE_ENOUGH, have_enough_methods())?;
    domain.register_method(
        TASK_PRODUCE,
        named_method("produce_item", move |state: &StateV1, args: &[TaskArg]| {
            let [agent, item] = args else { return None };
            let (agent, item) = (agent.as_sym()?, item.as_sym()?);
            if !producible.contains(item) {
                return None;
            }
            if tools.contains(item) && state.flag(&made_flag(item), agent) {
                return None;
            }
            Some(vec![TaskV1::new(producer_task(item), vec![agent.into()])])
        }),
    )?;
    Ok(())
}

/// Initial state for `agent`: every item and tool at zero, every `made_`
/// flag cleared, then the description's `Initial`, then `overrides`, then
/// `time_budget` as [`RESOURCE_TIME`].
#[must_use]
pub fn set_up_state(
    desc: &DomainDescriptionV1,
    overrides: &BTreeMap<String, i64>,
    agent: &str,
    time_budget: i64,
) -> StateV1 {
    let mut state = StateV1::new();
    for item in desc.items.iter().chain(&desc.tools) {
        state.set(item, agent, 0);
    }
    for tool in &desc.tools {
        state.set_flag(&made_flag(tool), agent, false);
    }
    for (item, n) in desc.initial_counts().iter().chain(overrides) {
        state.set(item, agent, *n);
    }
    state.set(RESOURCE_TIME, agent, time_budget);
    state
}

/// One `have_enough(agent, item, n)` goal per entry, in key order.
#[must_use]
pub fn set_up_goals(goal: &BTreeMap<String, i64>, agent: &str) -> Vec<TaskV1> {
    goal.iter()
        .map(|(item, n)| TaskV1::have_enough(agent, item, *n))
        .collect()
}

/// The first `have_enough` goal `state` does not satisfy.
#[must_use]
pub fn first_unmet_goal<'a>(state: &StateV1, goals: &'a [TaskV1]) -> Option<&'a TaskV1> {
    goals.iter().find(|goal| {
        goal.name == TASK_HAVE_ENOUGH
            && have_enough_args(&goal.args).is_some_and(|(agent, item, n)| state.get(item, agent) < n)
    })
}
