//! Solver backend abstraction.

use std::sync::Arc;

use crate::clarabel::ClarabelBackend;
use crate::error::{SolverError, SolverResult};
use crate::problem::MipProblem;
use crate::solution::MipSolution;

/// Per-call solver settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveParams {
    /// Enable problem scaling (equilibration) before solving.
    pub scaling: bool,
    pub verbose: bool,
    pub max_iterations: Option<u32>,
    /// Primal values of a previous solve of the same problem layout.
    pub warm_start: Option<Vec<f64>>,
}

impl Default for SolveParams {
    fn default() -> Self {
        Self {
            scaling: true,
            verbose: false,
            max_iterations: None,
            warm_start: None,
        }
    }
}

/// A numerical solver able to solve a [`MipProblem`].
///
/// Returning `Ok` with a non-success status means "no solution found"; an
/// `Err` means the solver itself failed.
pub trait SolverBackend: Send + Sync {
    fn id(&self) -> &'static str;

    fn supports_integers(&self) -> bool;

    fn solve(&self, problem: &MipProblem, params: &SolveParams) -> SolverResult<MipSolution>;
}

/// Names accepted by [`backend_by_name`].
pub fn available_backends() -> Vec<&'static str> {
    let mut names = vec!["clarabel"];
    if cfg!(feature = "solver-highs") {
        names.push("highs");
    }
    names
}

/// Instantiates a backend from its configuration name.
pub fn backend_by_name(name: &str) -> SolverResult<Arc<dyn SolverBackend>> {
    match name.to_ascii_lowercase().as_str() {
        "clarabel" => Ok(Arc::new(ClarabelBackend::new())),
        #[cfg(feature = "solver-highs")]
        "highs" => Ok(Arc::new(crate::highs::HighsBackend::new())),
        _ => Err(SolverError::UnknownBackend(name.to_string())),
    }
}
