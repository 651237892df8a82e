//! # adq-algo: problem building and solve orchestration
//!
//! This crate turns component models and legacy problem descriptions into
//! linear problems and drives their resolution.
//!
//! ## Building problems
//!
//! A [`LinearProblemFiller`] contributes variables, constraints and
//! objective terms to a [`LinearProblem`](adq_solver_common::LinearProblem)
//! sink. The [`LinearProblemBuilder`] runs an ordered list of fillers in
//! three phases:
//!
//! | Phase | Filler method |
//! |-------|---------------|
//! | 1 | [`LinearProblemFiller::add_variables`] |
//! | 2 | [`LinearProblemFiller::add_constraints`] |
//! | 3 | [`LinearProblemFiller::add_objective`] |
//!
//! Two fillers ship with the crate:
//!
//! - [`ComponentFiller`]: lowers a component's model, one element per time step;
//! - [`LegacyFiller`]: replays a fully materialised [`LegacyProblem`].
//!
//! ## Solving
//!
//! The [`SolveOrchestrator`] solves a legacy problem with a warm attempt,
//! falls back to a safe attempt, and on failure runs the
//! [`InfeasibilityAnalyzer`] and optionally exports the problem as MPS.
//!
//! ## Example
//!
//! ```
//! use adq_algo::{
//!     LegacyProblem, LegacyResults, OptimizationPass, Sense, SolveOptions,
//!     SolveOrchestrator, SolveRequest, SolveSession,
//! };
//!
//! // min x0 + 2 x1  s.t.  x0 + x1 >= 1,  0 <= x <= 10
//! let problem = LegacyProblem {
//!     costs: vec![1.0, 2.0],
//!     x_min: vec![0.0, 0.0],
//!     x_max: vec![10.0, 10.0],
//!     rhs: vec![1.0],
//!     sense: vec![Sense::GreaterOrEqual],
//!     row_start: vec![0],
//!     row_len: vec![2],
//!     col_indices: vec![0, 1],
//!     coefficients: vec![1.0, 1.0],
//!     ..Default::default()
//! };
//!
//! let orchestrator = SolveOrchestrator::from_options(SolveOptions::default()).unwrap();
//! let mut session = SolveSession::new();
//! let mut results = LegacyResults::for_problem(&problem);
//! let outcome = orchestrator
//!     .solve(
//!         &mut session,
//!         &problem,
//!         &mut results,
//!         &SolveRequest::new(OptimizationPass::First),
//!     )
//!     .unwrap();
//! assert!(outcome.solved);
//! assert!((outcome.objective - 1.0).abs() < 1e-4);
//! ```

pub mod builder;
pub mod component_filler;
pub mod error;
pub mod filler;
pub mod infeasibility;
pub mod legacy;
pub mod orchestrator;

pub use builder::LinearProblemBuilder;
pub use component_filler::ComponentFiller;
pub use error::{FillError, FillResult, SolveError};
pub use filler::{FillContext, LinearProblemFiller};
pub use infeasibility::{
    BoundSide, ConstraintViolation, InfeasibilityAnalyzer, InfeasibilityReport, InvertedBounds,
    VIOLATION_TOLERANCE,
};
pub use legacy::{BoundKind, LegacyFiller, LegacyIndex, LegacyProblem, LegacyResults, Sense};
pub use orchestrator::{
    mps_file_name, period_generator, DailyPeriod, MpsExportPolicy, MpsWriter, MpsWriterFactory,
    OptPeriodStringGenerator, OptimizationPass, OptimizationStatistics, PeriodGranularity,
    RetainedProblem, SolveOptions, SolveOrchestrator, SolveOutcome, SolveRequest, SolveSession,
    SolveState, WeeklyPeriod,
};
