//! `forge`: run bundled planning worlds or plan over a recipe file.
//!
//! Exit status is 0 when every run found a plan, 1 when some run found
//! none, and 2 on any error.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use forge_harness::config::RunConfig;
use forge_harness::contract::{PlanningWorldV1, ScenarioV1};
use forge_harness::policy::PolicyConfig;
use forge_harness::recipe::DomainDescriptionV1;
use forge_harness::runner::{run_all, run_scenario, RunReportV1};
use forge_harness::worlds::recipe_world::RecipeWorldV1;
use forge_harness::worlds::{all_worlds, world_by_id};

#[derive(Parser)]
#[command(name = "forge", about = "HTN crafting planner")]
struct Cli {
    /// JSON run configuration (agent, time budget, policy)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print canonical JSON reports instead of plan listings
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    policy: PolicyArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Policy overrides; these win over the config file.
#[derive(Args)]
#[allow(clippy::struct_excessive_bools)]
struct PolicyArgs {
    /// Maximum decomposition depth
    #[arg(long, global = true)]
    max_depth: Option<usize>,
    /// Maximum plan length
    #[arg(long, global = true)]
    max_plan_len: Option<usize>,
    /// Maximum occurrences of one compound task on its own call stack
    #[arg(long, global = true)]
    max_repeats: Option<usize>,
    /// Hard cap on expansions before the search is abandoned
    #[arg(long, global = true)]
    max_expansions: Option<u64>,
    /// Disable the depth bound
    #[arg(long, global = true)]
    no_depth_bound: bool,
    /// Disable the plan-length bound
    #[arg(long, global = true)]
    no_plan_len_bound: bool,
    /// Disable the repeated-subgoal check
    #[arg(long, global = true)]
    no_repeat_check: bool,
    /// Disable the time-exhaustion check
    #[arg(long, global = true)]
    no_exhaustion_check: bool,
}

impl PolicyArgs {
    fn to_config(&self) -> PolicyConfig {
        PolicyConfig {
            max_depth: self.max_depth,
            max_plan_len: self.max_plan_len,
            max_repeats: self.max_repeats,
            exhaustion_resource: None,
            max_expansions: self.max_expansions,
            no_depth_bound: self.no_depth_bound,
            no_plan_len_bound: self.no_plan_len_bound,
            no_repeat_check: self.no_repeat_check,
            no_exhaustion_check: self.no_exhaustion_check,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List bundled worlds and their scenarios
    List,
    /// Run scenarios of a bundled world
    Run {
        /// World id (see `forge list`)
        world: String,
        /// Scenario id; every scenario when omitted
        scenario: Option<String>,
    },
    /// Plan over a recipe description file
    Plan {
        /// Recipe description (JSON)
        domain: PathBuf,
        /// Goal amount as item=n (repeatable); defaults to the file's Goal
        #[arg(long = "goal")]
        goals: Vec<String>,
        /// Starting amount as item=n (repeatable), over the file's Initial
        #[arg(long = "initial")]
        initial: Vec<String>,
        /// Time budget
        #[arg(long)]
        time: Option<i64>,
        /// Agent name
        #[arg(long)]
        agent: Option<String>,
    },
}

fn parse_amounts(pairs: &[String]) -> anyhow::Result<BTreeMap<String, i64>> {
    pairs
        .iter()
        .map(|pair| {
            let Some((item, n)) = pair.split_once('=') else {
                bail!("expected item=n, got {pair:?}");
            };
            let n: i64 = n
                .trim()
                .parse()
                .with_context(|| format!("bad amount in {pair:?}"))?;
            Ok((item.trim().to_string(), n))
        })
        .collect()
}

fn print_report(report: &RunReportV1, json: bool) -> anyhow::Result<()> {
    if json {
        let bytes = report.canonical_bytes().context("canonicalize report")?;
        println!("{}", String::from_utf8_lossy(&bytes));
        return Ok(());
    }
    println!("{}/{}:", report.world_id, report.scenario_id);
    match report.plan() {
        Some(found) => {
            for (i, step) in found.steps.iter().enumerate() {
                println!("  {:>3}. {step}", i + 1);
            }
            if let Some(time) = report.time_left() {
                println!("  {} steps, {time} time left", found.steps.len());
            }
        }
        None => println!("  no plan found"),
    }
    let stats = &report.result.stats;
    println!(
        "  expansions {}, backtracks {}, prunes {}",
        stats.expansions,
        stats.backtracks,
        stats.total_prunes()
    );
    Ok(())
}

fn list() -> anyhow::Result<()> {
    for world in all_worlds()? {
        println!("{}", world.world_id());
        for scenario in world.scenarios() {
            println!("  {:<10} {}", scenario.id, scenario.summary);
        }
    }
    Ok(())
}

fn run(cli: &Cli) -> anyhow::Result<Vec<RunReportV1>> {
    let config = match &cli.config {
        Some(path) => RunConfig::from_path(path)?,
        None => RunConfig::default(),
    };
    let overrides = config.policy.overlaid(&cli.policy.to_config());

    match &cli.command {
        Commands::List => {
            list()?;
            Ok(Vec::new())
        }
        Commands::Run { world, scenario } => {
            let world = world_by_id(world)?;
            let reports = match scenario {
                Some(id) => vec![run_scenario(world.as_ref(), &world.scenario(id)?, &overrides)?],
                None => run_all(world.as_ref(), &overrides)?,
            };
            Ok(reports)
        }
        Commands::Plan {
            domain,
            goals,
            initial,
            time,
            agent,
        } => {
            let desc = DomainDescriptionV1::from_path(domain)?;
            let goal = if goals.is_empty() {
                desc.goal_counts()
            } else {
                parse_amounts(goals)?
            };
            if goal.is_empty() {
                bail!("no goal: pass --goal item=n or give the file a Goal");
            }
            let scenario = ScenarioV1 {
                id: "cli".to_string(),
                summary: String::new(),
                initial: parse_amounts(initial)?,
                goal,
                time_budget: time.unwrap_or_else(|| config.time_budget()),
                policy: PolicyConfig::default(),
            };
            let world_id = domain
                .file_stem()
                .map_or_else(|| "file".to_string(), |s| s.to_string_lossy().into_owned());
            let world = RecipeWorldV1::new(&world_id, desc)
                .with_agent(agent.as_deref().unwrap_or_else(|| config.agent()));
            Ok(vec![run_scenario(&world, &scenario, &overrides)?])
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = run(&cli).and_then(|reports| {
        for report in &reports {
            print_report(report, cli.json)?;
        }
        Ok(reports.iter().all(RunReportV1::is_found))
    });
    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
