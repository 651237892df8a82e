//! Solve orchestration: warm attempt, safe attempt, diagnosis.
//!
//! ```text
//! WarmAttempt ──success──> Done
//!      │ no solution
//!      v
//! SafeAttempt ──success──> Done
//!      │ no solution
//!      v
//!   Diagnose ────────────> Failed
//! ```
//!
//! "No solution" (infeasible, unbounded, iteration limit) moves the machine
//! forward. An internal solver error is returned immediately as
//! [`SolveError::Internal`] and never retried.
//!
//! The warm attempt reuses the problem retained in the caller's
//! [`SolveSession`] when there is one: costs, bounds and right-hand sides are
//! updated in place and the previous primal values are offered as a warm
//! start. The safe attempt rebuilds from scratch with scaling disabled.

mod mps_export;
mod options;
mod period;
mod session;

use std::path::PathBuf;
use std::sync::Arc;

use adq_core::LinearProblemData;
use adq_solver_common::{
    backend_by_name, LinearProblem, MipProblem, MipSolution, MipStatus, SolveParams, SolverBackend,
};
use tracing::{debug, error, info, warn};
use web_time::Instant;

pub use mps_export::{MpsWriter, MpsWriterFactory};
pub use options::{MpsExportPolicy, PeriodGranularity, SolveOptions};
pub use period::{
    mps_file_name, period_generator, DailyPeriod, OptPeriodStringGenerator, WeeklyPeriod,
};
pub use session::{OptimizationStatistics, RetainedProblem, SolveSession};

use crate::builder::LinearProblemBuilder;
use crate::error::{FillResult, SolveError};
use crate::filler::FillContext;
use crate::infeasibility::{InfeasibilityAnalyzer, InfeasibilityReport};
use crate::legacy::{LegacyFiller, LegacyIndex, LegacyProblem, LegacyResults};

/// Hours in the weekly window a legacy problem describes.
const LEGACY_WINDOW: FillContext = FillContext {
    first_time_step: 0,
    last_time_step: 167,
    scenarios_selected: Vec::new(),
};

/// First or second optimisation of a two-stage weekly dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptimizationPass {
    First,
    Second,
}

impl OptimizationPass {
    pub fn from_number(number: u32) -> Result<Self, SolveError> {
        match number {
            1 => Ok(OptimizationPass::First),
            2 => Ok(OptimizationPass::Second),
            n => Err(SolveError::InvalidOptimizationNumber(n)),
        }
    }

    pub fn number(self) -> u32 {
        match self {
            OptimizationPass::First => 1,
            OptimizationPass::Second => 2,
        }
    }

    pub(crate) fn slot(self) -> usize {
        self.number() as usize - 1
    }
}

/// One call to [`SolveOrchestrator::solve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveRequest {
    pub optimization: OptimizationPass,
    pub year: u32,
    pub week: u32,
    pub day: u32,
    /// Ignore any retained problem and rebuild.
    pub reset: bool,
}

impl SolveRequest {
    pub fn new(optimization: OptimizationPass) -> Self {
        Self {
            optimization,
            year: 0,
            week: 0,
            day: 0,
            reset: false,
        }
    }

    pub fn with_period(mut self, year: u32, week: u32) -> Self {
        self.year = year;
        self.week = week;
        self
    }

    pub fn with_day(mut self, day: u32) -> Self {
        self.day = day;
        self
    }

    pub fn with_reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveState {
    WarmAttempt,
    SafeAttempt,
    Diagnose,
    Done,
    Failed,
}

/// Result of a solve that did not hit a fatal error.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    pub solved: bool,
    /// Final state, `Done` or `Failed`.
    pub state: SolveState,
    /// Status of the last attempt.
    pub status: MipStatus,
    /// `Σ cost · x` over the legacy costs; 0 when not solved.
    pub objective: f64,
    pub used_safe_mode: bool,
    /// True when the warm attempt updated a retained problem.
    pub reused_problem: bool,
    pub update_time_ms: u128,
    pub solve_time_ms: u128,
    pub exported: Vec<PathBuf>,
    pub infeasibility: Option<InfeasibilityReport>,
}

impl SolveOutcome {
    fn new() -> Self {
        Self {
            solved: false,
            state: SolveState::WarmAttempt,
            status: MipStatus::NotSolved,
            objective: 0.0,
            used_safe_mode: false,
            reused_problem: false,
            update_time_ms: 0,
            solve_time_ms: 0,
            exported: Vec::new(),
            infeasibility: None,
        }
    }
}

struct Attempt {
    solution: MipSolution,
    retained: RetainedProblem,
}

pub struct SolveOrchestrator {
    backend: Arc<dyn SolverBackend>,
    options: SolveOptions,
}

impl SolveOrchestrator {
    pub fn new(backend: Arc<dyn SolverBackend>, options: SolveOptions) -> Self {
        Self { backend, options }
    }

    /// Orchestrator using the backend named in `options`.
    pub fn from_options(options: SolveOptions) -> Result<Self, SolveError> {
        let backend = backend_by_name(&options.backend).map_err(SolveError::from_solver)?;
        Ok(Self::new(backend, options))
    }

    pub fn options(&self) -> &SolveOptions {
        &self.options
    }

    pub fn backend(&self) -> &dyn SolverBackend {
        self.backend.as_ref()
    }

    /// Solves `legacy` and copies solved values into `results`.
    ///
    /// Returns `Ok` with `solved == false` when no attempt found a solution;
    /// `Err` only for fatal conditions.
    pub fn solve(
        &self,
        session: &mut SolveSession,
        legacy: &LegacyProblem,
        results: &mut LegacyResults,
        request: &SolveRequest,
    ) -> Result<SolveOutcome, SolveError> {
        let pass = request.optimization;
        let period = period_generator(
            self.options.granularity,
            request.year,
            request.week,
            request.day,
        );
        let factory = MpsWriterFactory::new(
            self.options.export_mps,
            &self.options.export_dir,
            mps_file_name(period.as_ref(), pass.number()),
        );

        let mut outcome = SolveOutcome::new();
        let mut state = SolveState::WarmAttempt;
        loop {
            outcome.state = state;
            state = match state {
                SolveState::WarmAttempt => {
                    if request.reset {
                        session.reset_pass(pass);
                    }
                    let attempt =
                        self.attempt(session, legacy, pass, true, &factory, &mut outcome)?;
                    outcome.status = attempt.solution.status();
                    if attempt.solution.status().is_success() {
                        self.accept(session, legacy, results, pass, attempt, &mut outcome);
                        SolveState::Done
                    } else {
                        info!(status = %outcome.status, "Standard resolution failed");
                        info!("Retry in safe mode");
                        SolveState::SafeAttempt
                    }
                }
                SolveState::SafeAttempt => {
                    debug!("Resetting solver session");
                    session.reset_pass(pass);
                    outcome.used_safe_mode = true;
                    let attempt =
                        self.attempt(session, legacy, pass, false, &factory, &mut outcome)?;
                    outcome.status = attempt.solution.status();
                    if attempt.solution.status().is_success() {
                        info!("Safe resolution succeeded");
                        self.accept(session, legacy, results, pass, attempt, &mut outcome);
                        SolveState::Done
                    } else {
                        error!(status = %outcome.status, "Safe resolution failed");
                        SolveState::Diagnose
                    }
                }
                SolveState::Diagnose => {
                    self.diagnose(legacy, pass, &factory, &mut outcome)?;
                    SolveState::Failed
                }
                SolveState::Done | SolveState::Failed => break,
            };
        }
        outcome.solved = outcome.state == SolveState::Done;
        Ok(outcome)
    }

    fn build(
        &self,
        legacy: &LegacyProblem,
        pass: OptimizationPass,
        named: bool,
    ) -> FillResult<(MipProblem, LegacyIndex)> {
        let filler = LegacyFiller::new(legacy, named);
        let builder = LinearProblemBuilder::new(vec![&filler]);
        let mut problem = MipProblem::new(format!("adq-optim-{}", pass.number()));
        builder.build(&mut problem, &LinearProblemData::default(), &LEGACY_WINDOW)?;
        let index = filler.index(&problem)?;
        Ok((problem, index))
    }

    /// Takes the retained problem of `pass` and refreshes it from `legacy`,
    /// or returns `None` when its layout no longer matches.
    fn update_retained(
        session: &mut SolveSession,
        legacy: &LegacyProblem,
        pass: OptimizationPass,
    ) -> FillResult<Option<RetainedProblem>> {
        let Some(mut retained) = session.take_retained(pass) else {
            return Ok(None);
        };
        if retained.index.variables.len() != legacy.variable_count()
            || retained.index.constraints.len() != legacy.constraint_count()
        {
            debug!("Problem layout changed, rebuilding");
            return Ok(None);
        }
        legacy.validate()?;
        let problem = &mut retained.problem;
        for (i, &var) in retained.index.variables.iter().enumerate() {
            problem.set_objective_coefficient(var, legacy.costs[i])?;
            let (lower, upper) = legacy.bounds(i);
            problem.set_variable_bounds(var, lower, upper)?;
        }
        for (r, &ct) in retained.index.constraints.iter().enumerate() {
            let (lower, upper) = legacy.constraint_bounds(r);
            problem.set_constraint_bounds(ct, lower, upper)?;
        }
        Ok(Some(retained))
    }

    fn attempt(
        &self,
        session: &mut SolveSession,
        legacy: &LegacyProblem,
        pass: OptimizationPass,
        warm: bool,
        factory: &MpsWriterFactory,
        outcome: &mut SolveOutcome,
    ) -> Result<Attempt, SolveError> {
        let update_start = Instant::now();
        let reused = if warm {
            Self::update_retained(session, legacy, pass)?
        } else {
            None
        };

        let (problem, index, warm_start) = match reused {
            Some(retained) => {
                let elapsed = update_start.elapsed().as_millis();
                session.statistics_mut(pass).add_update_time(elapsed);
                outcome.update_time_ms += elapsed;
                outcome.reused_problem = true;
                (retained.problem, retained.index, Some(retained.last_values))
            }
            None => {
                let (problem, index) = self.build(legacy, pass, self.options.named_problems)?;
                (problem, index, None)
            }
        };

        if let Some(path) = factory.create().run_if_needed(&problem)? {
            outcome.exported.push(path);
        }

        let params = SolveParams {
            scaling: warm,
            verbose: self.options.verbose,
            max_iterations: self.options.max_iterations,
            warm_start,
        };
        let solve_start = Instant::now();
        let result = problem.solve(self.backend.as_ref(), &params);
        let elapsed = solve_start.elapsed().as_millis();
        session.statistics_mut(pass).add_solve_time(elapsed);
        outcome.solve_time_ms += elapsed;

        let solution = result.map_err(SolveError::from_solver)?;
        debug!(
            status = %solution.status(),
            scaling = warm,
            time_ms = elapsed,
            "Solver returned"
        );
        let last_values = solution.values().to_vec();
        Ok(Attempt {
            solution,
            retained: RetainedProblem {
                problem,
                index,
                last_values,
            },
        })
    }

    /// Copies a successful attempt into the caller's buffers and retains it.
    fn accept(
        &self,
        session: &mut SolveSession,
        legacy: &LegacyProblem,
        results: &mut LegacyResults,
        pass: OptimizationPass,
        attempt: Attempt,
        outcome: &mut SolveOutcome,
    ) {
        let Attempt { solution, retained } = attempt;
        let mut objective = 0.0;
        for (i, &var) in retained.index.variables.iter().enumerate() {
            let value = solution.optimal_value(var);
            objective += legacy.costs[i] * value;
            if let Some(&Some(slot)) = legacy.primal_destinations.get(i) {
                results.store_primal(slot, value);
            }
            if let Some(&Some(slot)) = legacy.reduced_cost_destinations.get(i) {
                results.store_reduced_cost(slot, solution.reduced_cost(var));
            }
        }
        for (r, &ct) in retained.index.constraints.iter().enumerate() {
            if let Some(&Some(slot)) = legacy.dual_destinations.get(r) {
                results.store_dual(slot, solution.dual(ct));
            }
        }
        outcome.objective = objective;
        session.set_optimal_cost(pass, objective);
        session.retain(pass, retained);
    }

    fn diagnose(
        &self,
        legacy: &LegacyProblem,
        pass: OptimizationPass,
        factory: &MpsWriterFactory,
        outcome: &mut SolveOutcome,
    ) -> Result<(), SolveError> {
        let (problem, _) = match self.build(legacy, pass, true) {
            Ok(built) => built,
            Err(e) => {
                warn!(error = %e, "Named rebuild failed, using positional names");
                self.build(legacy, pass, false)?
            }
        };

        match InfeasibilityAnalyzer::new(Arc::clone(&self.backend)).run(&problem) {
            Ok(report) => {
                report.log();
                outcome.infeasibility = Some(report);
            }
            Err(e) => warn!(error = %e, "Infeasibility analysis failed"),
        }

        if let Some(path) = factory.create_on_optimization_error().run_if_needed(&problem)? {
            outcome.exported.push(path);
        }
        Ok(())
    }
}
