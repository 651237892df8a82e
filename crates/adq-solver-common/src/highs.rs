//! HiGHS backend through `good_lp`, enabled with the `solver-highs` feature.
//!
//! Unlike Clarabel this backend honours integer columns. `good_lp` does not
//! expose duals for HiGHS, so duals and reduced costs read as zero.

use good_lp::solvers::highs::highs;
use good_lp::{
    constraint, variable, variables, Expression, ResolutionError, Solution, SolverModel, Variable,
};
use tracing::debug;
use web_time::Instant;

use crate::backend::{SolveParams, SolverBackend};
use crate::error::{SolverError, SolverResult};
use crate::problem::{LinearProblem, MipProblem, ObjectiveSense};
use crate::solution::{MipSolution, MipStatus};

const BACKEND_ID: &str = "highs";

#[derive(Debug, Clone, Default)]
pub struct HighsBackend;

impl HighsBackend {
    pub fn new() -> Self {
        Self
    }
}

impl SolverBackend for HighsBackend {
    fn id(&self) -> &'static str {
        BACKEND_ID
    }

    fn supports_integers(&self) -> bool {
        true
    }

    fn solve(&self, problem: &MipProblem, params: &SolveParams) -> SolverResult<MipSolution> {
        let start = Instant::now();
        if params.warm_start.is_some() {
            debug!("warm start is not forwarded to HiGHS through good_lp");
        }

        let mut vars = variables!();
        let mut columns: Vec<Variable> = Vec::with_capacity(problem.columns().len());
        let mut objective = Expression::from(0.0);
        for column in problem.columns() {
            let mut definition = variable().name(column.name.clone());
            if column.lower.is_finite() {
                definition = definition.min(column.lower);
            }
            if column.upper.is_finite() {
                definition = definition.max(column.upper);
            }
            if column.integer {
                definition = definition.integer();
            }
            let var = vars.add(definition);
            objective += column.objective * var;
            columns.push(var);
        }

        let mut model = match problem.objective_sense() {
            ObjectiveSense::Minimize => vars.minimise(objective).using(highs),
            ObjectiveSense::Maximize => vars.maximise(objective).using(highs),
        };

        for row in problem.rows() {
            let mut lhs = Expression::from(0.0);
            for (&j, &a) in &row.coefficients {
                lhs += a * columns[j];
            }
            if row.lower == row.upper && row.upper.is_finite() {
                model = model.with(constraint!(lhs == row.upper));
                continue;
            }
            if row.lower.is_finite() {
                model = model.with(constraint!(lhs.clone() >= row.lower));
            }
            if row.upper.is_finite() {
                model = model.with(constraint!(lhs <= row.upper));
            }
        }

        let status_only = |status| {
            let mut solution = MipSolution::without_values(problem, status);
            solution.solve_time_ms = start.elapsed().as_millis();
            solution
        };

        match model.solve() {
            Ok(solved) => {
                let values: Vec<f64> = columns.iter().map(|&v| solved.value(v)).collect();
                let objective_value = problem
                    .columns()
                    .iter()
                    .zip(&values)
                    .map(|(c, v)| c.objective * v)
                    .sum();
                let n = values.len();
                let m = problem.rows().len();
                let mut solution = MipSolution::new(
                    problem,
                    MipStatus::Optimal,
                    objective_value,
                    values,
                    vec![0.0; n],
                    vec![0.0; m],
                );
                solution.solve_time_ms = start.elapsed().as_millis();
                Ok(solution)
            }
            Err(ResolutionError::Infeasible) => Ok(status_only(MipStatus::Infeasible)),
            Err(ResolutionError::Unbounded) => Ok(status_only(MipStatus::Unbounded)),
            Err(e) => Err(SolverError::Internal {
                backend: BACKEND_ID,
                message: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_rounding_up() {
        let mut pb = MipProblem::new("integer");
        let x = pb.add_int_variable(0.0, 10.0, "x").unwrap();
        let c = pb.add_constraint(1.5, f64::INFINITY, "c").unwrap();
        pb.set_coefficient(c, x, 1.0).unwrap();
        pb.set_objective_coefficient(x, 1.0).unwrap();

        let solution = HighsBackend::new()
            .solve(&pb, &SolveParams::default())
            .unwrap();
        assert_eq!(solution.status(), MipStatus::Optimal);
        assert!((solution.optimal_value(x) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_infeasible() {
        let mut pb = MipProblem::new("infeasible");
        let x = pb.add_num_variable(0.0, 1.0, "x").unwrap();
        let c = pb.add_constraint(2.0, 2.0, "c").unwrap();
        pb.set_coefficient(c, x, 1.0).unwrap();

        let solution = HighsBackend::new()
            .solve(&pb, &SolveParams::default())
            .unwrap();
        assert_eq!(solution.status(), MipStatus::Infeasible);
    }
}
