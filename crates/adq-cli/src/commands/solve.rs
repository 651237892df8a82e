//! `adq solve`: one window through the solve orchestrator.

use std::path::PathBuf;

use adq_algo::{
    LegacyResults, OptimizationPass, SolveOrchestrator, SolveOutcome, SolveRequest, SolveSession,
};
use adq_cli::{AdqConfig, SolveArgs};
use adq_solver_common::MipStatus;
use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::info;

use super::load_problem;

/// Written by `--output`.
#[derive(Debug, Serialize)]
struct SolveReport<'a> {
    solved: bool,
    status: MipStatus,
    objective: f64,
    used_safe_mode: bool,
    solve_time_ms: u128,
    exported: &'a [PathBuf],
    primal: &'a [f64],
    reduced_costs: &'a [f64],
    duals: &'a [f64],
}

impl<'a> SolveReport<'a> {
    fn new(outcome: &'a SolveOutcome, results: &'a LegacyResults) -> Self {
        Self {
            solved: outcome.solved,
            status: outcome.status,
            objective: outcome.objective,
            used_safe_mode: outcome.used_safe_mode,
            solve_time_ms: outcome.solve_time_ms,
            exported: &outcome.exported,
            primal: &results.primal,
            reduced_costs: &results.reduced_costs,
            duals: &results.duals,
        }
    }
}

pub fn handle(args: &SolveArgs, config: &AdqConfig) -> Result<()> {
    let mut options = config.solve_options();
    if let Some(backend) = &args.backend {
        options.backend = backend.clone();
    }
    if let Some(dir) = &args.export_dir {
        options.export_dir = dir.clone();
    }
    if let Some(policy) = args.export_mps {
        options.export_mps = policy.into();
    }

    let problem = &args.problem;
    let legacy = load_problem(problem)?;
    info!(
        problem = %problem.display(),
        variables = legacy.variable_count(),
        constraints = legacy.constraint_count(),
        backend = %options.backend,
        "Solving"
    );

    let orchestrator = SolveOrchestrator::from_options(options)?;
    let mut session = SolveSession::new();
    let mut results = LegacyResults::for_problem(&legacy);
    let request = SolveRequest::new(OptimizationPass::from_number(args.optimization)?)
        .with_period(args.year, args.week)
        .with_day(args.day);
    let outcome = orchestrator.solve(&mut session, &legacy, &mut results, &request)?;

    for path in &outcome.exported {
        println!("Exported {}", path.display());
    }
    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&SolveReport::new(&outcome, &results))?;
        std::fs::write(path, json)
            .with_context(|| format!("writing results '{}'", path.display()))?;
        println!("Results written to {}", path.display());
    }

    if !outcome.solved {
        if let Some(report) = &outcome.infeasibility {
            print!("{report}");
        }
        bail!("No solution found (status: {})", outcome.status);
    }

    println!("Status: {}", outcome.status);
    println!("Objective: {:.6}", outcome.objective);
    if outcome.used_safe_mode {
        println!("Solved in safe mode");
    }
    Ok(())
}
