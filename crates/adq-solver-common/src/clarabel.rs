//! Clarabel interior-point backend for linear problems.
//!
//! A [`MipProblem`] with bounds `lb <= a'x <= ub` is rewritten in Clarabel's
//! conic form `Ax + s = b, s ∈ K`:
//!
//! - equality rows (`lb == ub`) go to the zero cone: `a'x + s = ub, s = 0`
//! - finite upper bounds become `a'x + s = ub, s >= 0`
//! - finite lower bounds become `-a'x + s = -lb, s >= 0`
//! - variable bounds are unit rows built the same way
//!
//! Equalities come first so a single `ZeroConeT` followed by a single
//! `NonnegativeConeT` covers every row.
//!
//! Clarabel solves continuous problems only. Called directly it relaxes
//! integer columns; [`MipProblem::solve`] refuses them instead.

use clarabel::{
    algebra::CscMatrix,
    solver::{DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus, SupportedConeT},
};
use tracing::{debug, warn};
use web_time::Instant;

use crate::backend::{SolveParams, SolverBackend};
use crate::error::{SolverError, SolverResult};
use crate::problem::{LinearProblem, MipProblem, ObjectiveSense};
use crate::solution::{MipSolution, MipStatus};

const BACKEND_ID: &str = "clarabel";
const DEFAULT_MAX_ITER: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Equal(usize),
    Upper(usize),
    Lower(usize),
    VariableBound,
}

struct ConicRow {
    coefficients: Vec<(usize, f64)>,
    rhs: f64,
    kind: RowKind,
}

/// Rows of the conic form, equalities first, plus the number of equalities.
fn conic_rows(problem: &MipProblem) -> (Vec<ConicRow>, usize) {
    let mut equalities = Vec::new();
    let mut inequalities = Vec::new();

    for (i, row) in problem.rows().iter().enumerate() {
        let coefficients: Vec<(usize, f64)> =
            row.coefficients.iter().map(|(&c, &v)| (c, v)).collect();
        if row.lower == row.upper && row.upper.is_finite() {
            equalities.push(ConicRow {
                coefficients,
                rhs: row.upper,
                kind: RowKind::Equal(i),
            });
            continue;
        }
        if row.lower.is_finite() {
            inequalities.push(ConicRow {
                coefficients: coefficients.iter().map(|&(c, v)| (c, -v)).collect(),
                rhs: -row.lower,
                kind: RowKind::Lower(i),
            });
        }
        if row.upper.is_finite() {
            inequalities.push(ConicRow {
                coefficients,
                rhs: row.upper,
                kind: RowKind::Upper(i),
            });
        }
    }

    for (j, column) in problem.columns().iter().enumerate() {
        if column.lower == column.upper && column.upper.is_finite() {
            equalities.push(ConicRow {
                coefficients: vec![(j, 1.0)],
                rhs: column.upper,
                kind: RowKind::VariableBound,
            });
            continue;
        }
        if column.upper.is_finite() {
            inequalities.push(ConicRow {
                coefficients: vec![(j, 1.0)],
                rhs: column.upper,
                kind: RowKind::VariableBound,
            });
        }
        if column.lower.is_finite() {
            inequalities.push(ConicRow {
                coefficients: vec![(j, -1.0)],
                rhs: -column.lower,
                kind: RowKind::VariableBound,
            });
        }
    }

    let n_eq = equalities.len();
    equalities.extend(inequalities);
    (equalities, n_eq)
}

/// Pure-Rust LP backend built on Clarabel.
#[derive(Debug, Clone, Default)]
pub struct ClarabelBackend;

impl ClarabelBackend {
    pub fn new() -> Self {
        Self
    }

    fn internal(message: String) -> SolverError {
        SolverError::Internal {
            backend: BACKEND_ID,
            message,
        }
    }

    /// A problem without columns: every row reads `lb <= 0 <= ub`.
    fn solve_without_columns(problem: &MipProblem) -> MipSolution {
        let feasible = problem
            .rows()
            .iter()
            .all(|r| r.lower <= 0.0 && 0.0 <= r.upper);
        if feasible {
            let m = problem.rows().len();
            MipSolution::new(problem, MipStatus::Optimal, 0.0, vec![], vec![], vec![0.0; m])
        } else {
            MipSolution::without_values(problem, MipStatus::Infeasible)
        }
    }

    /// No finite bound anywhere: every column is free.
    fn solve_without_rows(problem: &MipProblem) -> MipSolution {
        let costs: Vec<f64> = problem.columns().iter().map(|c| c.objective).collect();
        if costs.iter().any(|&c| c != 0.0) {
            return MipSolution::without_values(problem, MipStatus::Unbounded);
        }
        let n = costs.len();
        let m = problem.rows().len();
        MipSolution::new(problem, MipStatus::Optimal, 0.0, vec![0.0; n], costs, vec![0.0; m])
    }
}

impl SolverBackend for ClarabelBackend {
    fn id(&self) -> &'static str {
        BACKEND_ID
    }

    fn supports_integers(&self) -> bool {
        false
    }

    fn solve(&self, problem: &MipProblem, params: &SolveParams) -> SolverResult<MipSolution> {
        let start = Instant::now();
        let n = problem.columns().len();
        let m = problem.rows().len();

        let integer_columns = problem.columns().iter().filter(|c| c.integer).count();
        if integer_columns > 0 {
            warn!(
                count = integer_columns,
                "Clarabel does not support integer variables, solving the continuous relaxation"
            );
        }
        if params.warm_start.is_some() {
            debug!("Clarabel is an interior-point solver, ignoring warm start values");
        }

        if n == 0 {
            return Ok(Self::solve_without_columns(problem));
        }
        let (rows, n_eq) = conic_rows(problem);
        if rows.is_empty() {
            return Ok(Self::solve_without_rows(problem));
        }

        let sign = match problem.objective_sense() {
            ObjectiveSense::Minimize => 1.0,
            ObjectiveSense::Maximize => -1.0,
        };
        let q: Vec<f64> = problem
            .columns()
            .iter()
            .map(|c| sign * c.objective)
            .collect();

        // Rows are visited in order, so each column's entries are already
        // sorted by row index as CSC requires.
        let mut by_column: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        for (r, row) in rows.iter().enumerate() {
            for &(c, v) in &row.coefficients {
                by_column[c].push((r, v));
            }
        }
        let mut col_ptr = Vec::with_capacity(n + 1);
        let mut row_idx = Vec::new();
        let mut values = Vec::new();
        for column in &by_column {
            col_ptr.push(row_idx.len());
            for &(r, v) in column {
                row_idx.push(r);
                values.push(v);
            }
        }
        col_ptr.push(row_idx.len());

        let a_mat = CscMatrix::new(rows.len(), n, col_ptr, row_idx, values);
        let p_mat = CscMatrix::new(n, n, vec![0; n + 1], Vec::new(), Vec::new());
        let b: Vec<f64> = rows.iter().map(|r| r.rhs).collect();

        let mut cones: Vec<SupportedConeT<f64>> = Vec::new();
        if n_eq > 0 {
            cones.push(SupportedConeT::ZeroConeT(n_eq));
        }
        if rows.len() > n_eq {
            cones.push(SupportedConeT::NonnegativeConeT(rows.len() - n_eq));
        }

        let settings = DefaultSettingsBuilder::default()
            .verbose(params.verbose)
            .equilibrate_enable(params.scaling)
            .max_iter(params.max_iterations.unwrap_or(DEFAULT_MAX_ITER))
            .build()
            .map_err(|e| Self::internal(format!("settings error: {:?}", e)))?;

        let mut solver = DefaultSolver::new(&p_mat, &q, &a_mat, &b, &cones, settings)
            .map_err(|e| Self::internal(format!("initialization failed: {:?}", e)))?;

        solver.solve();

        let sol = &solver.solution;
        let status = match sol.status {
            SolverStatus::Solved => MipStatus::Optimal,
            SolverStatus::AlmostSolved => MipStatus::Feasible,
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                MipStatus::Infeasible
            }
            SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
                MipStatus::Unbounded
            }
            SolverStatus::MaxIterations
            | SolverStatus::MaxTime
            | SolverStatus::NumericalError
            | SolverStatus::InsufficientProgress => MipStatus::NotSolved,
            other => return Err(Self::internal(format!("unexpected status {:?}", other))),
        };
        debug!(status = %status, iterations = sol.iterations, "Clarabel finished");

        if !status.is_success() {
            let mut solution =
                MipSolution::without_values(problem, status).with_iterations(sol.iterations);
            solution.solve_time_ms = start.elapsed().as_millis();
            return Ok(solution);
        }

        // Dual of a row is the sensitivity of the objective to its bound.
        let mut duals = vec![0.0; m];
        for (r, row) in rows.iter().enumerate() {
            match row.kind {
                RowKind::Equal(i) | RowKind::Upper(i) => duals[i] -= sol.z[r],
                RowKind::Lower(i) => duals[i] += sol.z[r],
                RowKind::VariableBound => {}
            }
        }
        for dual in &mut duals {
            *dual *= sign;
        }

        let mut reduced_costs: Vec<f64> = problem.columns().iter().map(|c| c.objective).collect();
        for (i, row) in problem.rows().iter().enumerate() {
            for (&j, &a) in &row.coefficients {
                reduced_costs[j] -= duals[i] * a;
            }
        }

        let x = sol.x.clone();
        let objective = problem
            .columns()
            .iter()
            .zip(&x)
            .map(|(c, v)| c.objective * v)
            .sum();

        let mut solution = MipSolution::new(problem, status, objective, x, reduced_costs, duals)
            .with_iterations(sol.iterations);
        solution.solve_time_ms = start.elapsed().as_millis();
        Ok(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-6;

    fn solve(pb: &MipProblem) -> MipSolution {
        ClarabelBackend::new()
            .solve(pb, &SolveParams::default())
            .unwrap()
    }

    #[test]
    fn test_feasible_single_variable() {
        let mut pb = MipProblem::new("feasible");
        let x = pb.add_num_variable(0.0, 10.0, "x").unwrap();
        let c = pb.add_constraint(1.0, 1.0, "c").unwrap();
        pb.set_coefficient(c, x, 1.0).unwrap();
        pb.set_objective_coefficient(x, 1.0).unwrap();
        pb.set_minimization();

        let solution = solve(&pb);
        assert_eq!(solution.status(), MipStatus::Optimal);
        assert!((solution.optimal_value(x) - 1.0).abs() < TOL);
        assert!((solution.objective_value() - 1.0).abs() < TOL);
        assert!((solution.dual(c) - 1.0).abs() < TOL);
    }

    #[test]
    fn test_infeasible_single_variable() {
        let mut pb = MipProblem::new("infeasible");
        let x = pb.add_num_variable(0.0, 1.0, "x").unwrap();
        let c = pb.add_constraint(2.0, 2.0, "c").unwrap();
        pb.set_coefficient(c, x, 1.0).unwrap();
        pb.set_objective_coefficient(x, 1.0).unwrap();

        let solution = solve(&pb);
        assert_eq!(solution.status(), MipStatus::Infeasible);
        assert_eq!(solution.objective_value(), 0.0);
        assert_eq!(solution.optimal_value(x), 0.0);
    }

    #[test]
    fn test_maximize_with_inequality() {
        // max x + y  s.t.  x + 2y <= 4, x <= 2, y >= 0
        let mut pb = MipProblem::new("max");
        let x = pb.add_num_variable(0.0, 2.0, "x").unwrap();
        let y = pb.add_num_variable(0.0, f64::INFINITY, "y").unwrap();
        let c = pb.add_constraint(f64::NEG_INFINITY, 4.0, "c").unwrap();
        pb.set_coefficient(c, x, 1.0).unwrap();
        pb.set_coefficient(c, y, 2.0).unwrap();
        pb.set_objective_coefficient(x, 1.0).unwrap();
        pb.set_objective_coefficient(y, 1.0).unwrap();
        pb.set_maximization();

        let solution = solve(&pb);
        assert_eq!(solution.status(), MipStatus::Optimal);
        assert!((solution.optimal_value(x) - 2.0).abs() < TOL);
        assert!((solution.optimal_value(y) - 1.0).abs() < TOL);
        assert!((solution.objective_value() - 3.0).abs() < TOL);
        // Relaxing the row by one unit buys half a unit of y.
        assert!((solution.dual(c) - 0.5).abs() < TOL);
        assert!(solution.reduced_cost(y).abs() < TOL);
    }

    #[test]
    fn test_unbounded() {
        let mut pb = MipProblem::new("unbounded");
        let x = pb.add_num_variable(0.0, f64::INFINITY, "x").unwrap();
        pb.set_objective_coefficient(x, -1.0).unwrap();

        let solution = solve(&pb);
        assert_eq!(solution.status(), MipStatus::Unbounded);
    }

    #[test]
    fn test_degenerate_shapes() {
        let empty = MipProblem::new("empty");
        assert_eq!(solve(&empty).status(), MipStatus::Optimal);

        let mut no_columns = MipProblem::new("no_columns");
        no_columns.add_constraint(1.0, 2.0, "c").unwrap();
        assert_eq!(solve(&no_columns).status(), MipStatus::Infeasible);

        let mut free = MipProblem::new("free");
        free.add_num_variable(f64::NEG_INFINITY, f64::INFINITY, "x")
            .unwrap();
        assert_eq!(solve(&free).status(), MipStatus::Optimal);
    }

    #[test]
    fn test_integer_columns_are_relaxed() {
        let mut pb = MipProblem::new("relaxed");
        let x = pb.add_int_variable(0.0, 10.0, "x").unwrap();
        let c = pb.add_constraint(1.5, f64::INFINITY, "c").unwrap();
        pb.set_coefficient(c, x, 1.0).unwrap();
        pb.set_objective_coefficient(x, 1.0).unwrap();

        let solution = solve(&pb);
        assert_eq!(solution.status(), MipStatus::Optimal);
        assert!((solution.optimal_value(x) - 1.5).abs() < TOL);
    }
}
