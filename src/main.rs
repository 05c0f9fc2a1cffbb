//! The demonstration CLI binary: loads a task fixture (see
//! [`sas_search_core::task::TaskFixture`]), resolves an algorithm
//! configuration from command-line flags (or, for the `iterated` tag, from
//! a JSON config file naming each phase), drives the resulting search
//! engine to completion, prints statistics, and persists a plan file.
//!
//! Task ingestion beyond the minimal fixture format, and general PDDL/SAS
//! parsing, are out of scope for this crate; this binary exists to give the
//! library something runnable to drive, not to be a production front end.

use clap::Parser;
use sas_search_core::config::{
    AlgorithmTag, EngineConfig, EvaluatorTag, IteratedPlanConfig, PreferredOperatorModeTag,
};
use sas_search_core::cost_type::CostType;
use sas_search_core::error::ExitCode;
use sas_search_core::search_engines::{ResourceLimits, SearchEngine, SearchStatus};
use sas_search_core::successor_generator::SuccessorGenerator;
use sas_search_core::task::TaskFixture;
use std::path::PathBuf;
use std::process::ExitCode as ProcessExitCode;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(version, about = "Search core demonstration planner", long_about = None)]
struct Args {
    /// Path to a JSON task fixture (see `TaskFixture`), not a PDDL/SAS file.
    #[arg(value_name = "TASK")]
    task: PathBuf,

    /// Where to write the discovered plan, one `(operator-name)` per line.
    #[arg(short, long, value_name = "PLAN_OUT", default_value = "plan.out")]
    plan_output: PathBuf,

    /// Path to a JSON `IteratedPlanConfig` describing a phase sequence.
    /// Mutually exclusive with the flat `--algorithm`/`--eval` flags below;
    /// required when `--algorithm iterated` is *not* what you want but a
    /// chain of phases is.
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = AlgorithmTag::Astar)]
    algorithm: AlgorithmTag,

    /// Evaluators combined (by sum) into the ordering key. Repeatable.
    #[arg(long = "eval", value_enum, default_value = "zero")]
    evals: Vec<EvaluatorTag>,

    /// Evaluators consulted for preferred operators. Repeatable.
    #[arg(long = "preferred-eval", value_enum)]
    preferred: Vec<EvaluatorTag>,

    #[arg(short = 'w', long, default_value_t = 1)]
    weight: i32,

    #[arg(long, default_value_t = 0)]
    boost: usize,

    #[arg(long)]
    reopen_closed: bool,

    #[arg(long)]
    restrict_to_preferred: bool,

    #[arg(long)]
    bound: Option<i32>,

    #[arg(long, value_name = "SECONDS")]
    max_time: Option<u64>,

    #[arg(long, value_enum, default_value_t = CostType::Normal)]
    cost_type: CostType,

    #[arg(long)]
    rng_seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = PreferredOperatorModeTag::ListFirst)]
    preferred_mode: PreferredOperatorModeTag,

    /// Tracing verbosity, e.g. `info`, `debug`, `sas_search_core=trace`.
    #[arg(long, default_value = "info")]
    log_filter: String,
}

impl Args {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            algorithm: self.algorithm,
            evals: self.evals.clone(),
            preferred: self.preferred.clone(),
            w: self.weight,
            boost: self.boost,
            reopen_closed: self.reopen_closed,
            restrict_to_preferred: self.restrict_to_preferred,
            bound: self.bound,
            max_time_seconds: self.max_time,
            cost_type: self.cost_type,
            rng_seed: self.rng_seed,
            preferred_mode: self.preferred_mode,
        }
    }
}

fn main() -> ProcessExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&args.log_filter))
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let exit_code = run(&args).unwrap_or_else(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    });
    ProcessExitCode::from(exit_code.0 as u8)
}

fn run(args: &Args) -> Result<ExitCode, sas_search_core::PlannerError> {
    let task = TaskFixture::load(&args.task)?;
    info!(
        variables = task.variables.len(),
        operators = task.operators.len(),
        axioms = task.axioms.len(),
        "loaded task"
    );
    let successor_generator = SuccessorGenerator::new(&task);
    let limits = ResourceLimits::new(args.max_time.map(Duration::from_secs), None);

    let (status, statistics) = if let Some(config_path) = &args.config {
        let text = std::fs::read_to_string(config_path).map_err(|err| {
            sas_search_core::PlannerError::InputError(format!(
                "could not read config {}: {err}",
                config_path.display()
            ))
        })?;
        let iterated_config: IteratedPlanConfig = serde_json::from_str(&text).map_err(|err| {
            sas_search_core::PlannerError::InputError(format!("malformed config: {err}"))
        })?;
        let mut engine = iterated_config.build(&task, &successor_generator)?;
        let (status, phases) = engine.run(&limits)?;
        for phase in &phases {
            info!(phase = %phase.name, status = ?phase.status, "phase terminated");
        }
        (status, engine.statistics().wall_time())
    } else {
        let config = args.engine_config();
        let mut engine = config.build(&task, &successor_generator)?.into_boxed();
        let status = engine.search(&limits);
        (status, engine.statistics().wall_time())
    };

    info!(wall_time_secs = statistics.as_secs_f64(), "run complete");

    match &status {
        SearchStatus::Solved(plan) => {
            plan.write_to(&task, &args.plan_output).map_err(|err| {
                sas_search_core::PlannerError::CriticalError(format!(
                    "could not write plan to {}: {err}",
                    args.plan_output.display()
                ))
            })?;
            println!("Solution found! [{} steps, cost {}]", plan.len(), plan.cost(&task));
        }
        SearchStatus::Unsolvable => println!("Task is provably unsolvable."),
        SearchStatus::UnsolvedIncomplete => {
            println!("Search space exhausted without finding a plan (heuristic was not a reliable dead-end detector).")
        }
        SearchStatus::Timeout => println!("Search timed out."),
        SearchStatus::MemoryLimitExceeded => println!("Search exceeded its memory limit."),
    }

    Ok(ExitCode::from(&status))
}
