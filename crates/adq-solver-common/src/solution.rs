//! Solution of a [`MipProblem`](crate::MipProblem).

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::problem::{ConstraintId, MipProblem, VarId};

/// Status of the solver solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MipStatus {
    /// Optimal solution found.
    Optimal,
    /// A feasible, possibly sub-optimal, solution was found.
    Feasible,
    /// Problem is infeasible.
    Infeasible,
    /// Problem is unbounded.
    Unbounded,
    /// Solver stopped without a conclusion (iteration limit, numerical trouble).
    NotSolved,
}

impl MipStatus {
    /// Check if this status carries a usable solution.
    pub fn is_success(&self) -> bool {
        matches!(self, MipStatus::Optimal | MipStatus::Feasible)
    }
}

impl fmt::Display for MipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MipStatus::Optimal => write!(f, "optimal"),
            MipStatus::Feasible => write!(f, "feasible"),
            MipStatus::Infeasible => write!(f, "infeasible"),
            MipStatus::Unbounded => write!(f, "unbounded"),
            MipStatus::NotSolved => write!(f, "not_solved"),
        }
    }
}

/// Primal/dual values returned by a backend.
///
/// Accessors never fail: an unknown handle or name reads as `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MipSolution {
    problem: u64,
    status: MipStatus,
    objective_value: f64,
    values: Vec<f64>,
    reduced_costs: Vec<f64>,
    duals: Vec<f64>,
    names: HashMap<String, usize>,
    /// Number of iterations performed.
    pub iterations: u32,
    /// Solve time in milliseconds.
    pub solve_time_ms: u128,
}

impl MipSolution {
    /// Solution with values. Vectors are indexed like the problem's columns/rows.
    pub fn new(
        problem: &MipProblem,
        status: MipStatus,
        objective_value: f64,
        values: Vec<f64>,
        reduced_costs: Vec<f64>,
        duals: Vec<f64>,
    ) -> Self {
        Self {
            problem: problem.id(),
            status,
            objective_value,
            values,
            reduced_costs,
            duals,
            names: problem
                .columns()
                .iter()
                .enumerate()
                .map(|(i, c)| (c.name.clone(), i))
                .collect(),
            iterations: 0,
            solve_time_ms: 0,
        }
    }

    /// Solution without values: objective and every value read as zero.
    pub fn without_values(problem: &MipProblem, status: MipStatus) -> Self {
        let n = problem.columns().len();
        let m = problem.rows().len();
        Self::new(problem, status, 0.0, vec![0.0; n], vec![0.0; n], vec![0.0; m])
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn status(&self) -> MipStatus {
        self.status
    }

    pub fn objective_value(&self) -> f64 {
        self.objective_value
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn reduced_costs(&self) -> &[f64] {
        &self.reduced_costs
    }

    pub fn duals(&self) -> &[f64] {
        &self.duals
    }

    fn column(&self, var: Option<VarId>) -> Option<usize> {
        var.filter(|v| v.problem() == self.problem)
            .map(|v| v.index())
    }

    fn row(&self, constraint: Option<ConstraintId>) -> Option<usize> {
        constraint
            .filter(|c| c.problem() == self.problem)
            .map(|c| c.index())
    }

    /// Primal value of `var`; 0 for `None` or a foreign handle.
    pub fn optimal_value(&self, var: impl Into<Option<VarId>>) -> f64 {
        self.column(var.into())
            .and_then(|i| self.values.get(i).copied())
            .unwrap_or(0.0)
    }

    /// Primal value of the variable called `name`; 0 (with a warning) if unknown.
    pub fn optimal_value_by_name(&self, name: &str) -> f64 {
        match self.names.get(name) {
            Some(&i) => self.values.get(i).copied().unwrap_or(0.0),
            None => {
                warn!(variable = name, "Variable not found in solution, reading 0");
                0.0
            }
        }
    }

    pub fn reduced_cost(&self, var: impl Into<Option<VarId>>) -> f64 {
        self.column(var.into())
            .and_then(|i| self.reduced_costs.get(i).copied())
            .unwrap_or(0.0)
    }

    pub fn dual(&self, constraint: impl Into<Option<ConstraintId>>) -> f64 {
        self.row(constraint.into())
            .and_then(|i| self.duals.get(i).copied())
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::LinearProblem;

    #[test]
    fn test_status_success() {
        assert!(MipStatus::Optimal.is_success());
        assert!(MipStatus::Feasible.is_success());
        assert!(!MipStatus::Infeasible.is_success());
        assert!(!MipStatus::NotSolved.is_success());
        assert_eq!(MipStatus::Unbounded.to_string(), "unbounded");
    }

    #[test]
    fn test_accessors_default_to_zero() {
        let mut pb = MipProblem::new("test");
        let x = pb.add_num_variable(0.0, 10.0, "x").unwrap();
        let c = pb.add_constraint(1.0, 1.0, "c").unwrap();
        let solution = MipSolution::new(
            &pb,
            MipStatus::Optimal,
            4.0,
            vec![2.0],
            vec![0.5],
            vec![1.5],
        );

        assert_eq!(solution.optimal_value(x), 2.0);
        assert_eq!(solution.optimal_value_by_name("x"), 2.0);
        assert_eq!(solution.reduced_cost(x), 0.5);
        assert_eq!(solution.dual(c), 1.5);

        assert_eq!(solution.optimal_value(None::<VarId>), 0.0);
        assert_eq!(solution.optimal_value_by_name("nope"), 0.0);

        let mut other = MipProblem::new("other");
        let foreign = other.add_num_variable(0.0, 1.0, "x").unwrap();
        assert_eq!(solution.optimal_value(foreign), 0.0);
    }

    #[test]
    fn test_without_values() {
        let mut pb = MipProblem::new("test");
        let x = pb.add_num_variable(0.0, 1.0, "x").unwrap();
        let solution = MipSolution::without_values(&pb, MipStatus::Infeasible);
        assert_eq!(solution.objective_value(), 0.0);
        assert_eq!(solution.optimal_value(x), 0.0);
        assert_eq!(solution.values(), &[0.0]);
    }
}
