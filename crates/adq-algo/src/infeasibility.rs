//! Infeasibility analysis of a problem that found no solution.
//!
//! Two checks, in order:
//!
//! 1. variable bounds: a column with `lower > upper` is infeasible on its own
//!    and is reported without solving anything;
//! 2. slack relaxation: every finite side of every row gets a non-negative
//!    slack, and the sum of slacks is minimised. Rows whose slacks stay
//!    positive are the ones that cannot be satisfied together.

use std::fmt;
use std::sync::Arc;

use adq_solver_common::{
    LinearProblem, MipProblem, MipStatus, SolveParams, SolverBackend, SolverResult, VarId,
};
use tracing::{error, warn};

/// Slacks at or below this value count as satisfied.
pub const VIOLATION_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundSide {
    Lower,
    Upper,
}

impl fmt::Display for BoundSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundSide::Lower => write!(f, "lower"),
            BoundSide::Upper => write!(f, "upper"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvertedBounds {
    pub variable: String,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintViolation {
    pub constraint: String,
    pub side: BoundSide,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InfeasibilityReport {
    pub inverted_bounds: Vec<InvertedBounds>,
    /// Sorted by decreasing amount.
    pub violations: Vec<ConstraintViolation>,
    /// Status of the slack relaxation, when it was run.
    pub relaxation_status: Option<MipStatus>,
}

impl InfeasibilityReport {
    pub fn is_empty(&self) -> bool {
        self.inverted_bounds.is_empty() && self.violations.is_empty()
    }

    pub fn log(&self) {
        if self.is_empty() {
            warn!("Infeasibility analysis found no culprit");
            return;
        }
        for bounds in &self.inverted_bounds {
            error!(
                variable = %bounds.variable,
                lower = bounds.lower,
                upper = bounds.upper,
                "Variable has inverted bounds"
            );
        }
        for violation in &self.violations {
            error!(
                constraint = %violation.constraint,
                side = %violation.side,
                amount = violation.amount,
                "Constraint cannot be satisfied"
            );
        }
    }
}

impl fmt::Display for InfeasibilityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Infeasibility analysis:")?;
        if self.is_empty() {
            writeln!(f, "  no culprit found")?;
        }
        for b in &self.inverted_bounds {
            writeln!(
                f,
                "  variable '{}': lower bound {} above upper bound {}",
                b.variable, b.lower, b.upper
            )?;
        }
        for v in &self.violations {
            writeln!(
                f,
                "  constraint '{}': {} bound violated by {}",
                v.constraint, v.side, v.amount
            )?;
        }
        Ok(())
    }
}

pub struct InfeasibilityAnalyzer {
    backend: Arc<dyn SolverBackend>,
}

struct Slack {
    row: usize,
    side: BoundSide,
    var: VarId,
}

impl InfeasibilityAnalyzer {
    pub fn new(backend: Arc<dyn SolverBackend>) -> Self {
        Self { backend }
    }

    pub fn run(&self, problem: &MipProblem) -> SolverResult<InfeasibilityReport> {
        let inverted_bounds: Vec<InvertedBounds> = problem
            .columns()
            .iter()
            .filter(|c| c.lower > c.upper)
            .map(|c| InvertedBounds {
                variable: c.name.clone(),
                lower: c.lower,
                upper: c.upper,
            })
            .collect();
        if !inverted_bounds.is_empty() {
            return Ok(InfeasibilityReport {
                inverted_bounds,
                ..Default::default()
            });
        }

        let (elastic, slacks) = match Self::elastic_copy(problem) {
            Ok(copy) => copy,
            Err(e) => {
                // Positional names cannot clash; reaching this is a sink bug.
                warn!(error = %e, "Could not build the slack relaxation");
                return Ok(InfeasibilityReport::default());
            }
        };
        let solution = self.backend.solve(&elastic, &SolveParams::default())?;
        let status = solution.status();
        if !status.is_success() {
            warn!(%status, "Slack relaxation was not solved");
            return Ok(InfeasibilityReport {
                relaxation_status: Some(status),
                ..Default::default()
            });
        }

        let mut violations: Vec<ConstraintViolation> = slacks
            .iter()
            .filter_map(|s| {
                let amount = solution.optimal_value(s.var);
                (amount > VIOLATION_TOLERANCE).then(|| ConstraintViolation {
                    constraint: problem.rows()[s.row].name.clone(),
                    side: s.side,
                    amount,
                })
            })
            .collect();
        violations.sort_by(|a, b| b.amount.total_cmp(&a.amount));

        Ok(InfeasibilityReport {
            inverted_bounds: Vec::new(),
            violations,
            relaxation_status: Some(status),
        })
    }

    /// Copy of `problem` where each finite row side carries a slack, with
    /// the sum of slacks as objective. Elements get positional names.
    fn elastic_copy(
        problem: &MipProblem,
    ) -> adq_solver_common::ProblemResult<(MipProblem, Vec<Slack>)> {
        let mut elastic = MipProblem::new(format!("{}-elastic", problem.name()));
        let mut columns = Vec::with_capacity(problem.columns().len());
        for (j, column) in problem.columns().iter().enumerate() {
            columns.push(elastic.add_num_variable(column.lower, column.upper, &format!("x{j}"))?);
        }

        let mut slacks = Vec::new();
        for (i, row) in problem.rows().iter().enumerate() {
            let ct = elastic.add_constraint(row.lower, row.upper, &format!("c{i}"))?;
            for (&j, &a) in &row.coefficients {
                elastic.set_coefficient(ct, columns[j], a)?;
            }
            if row.lower.is_finite() {
                let var = elastic.add_num_variable(0.0, f64::INFINITY, &format!("s_low_{i}"))?;
                elastic.set_coefficient(ct, var, 1.0)?;
                elastic.set_objective_coefficient(var, 1.0)?;
                slacks.push(Slack {
                    row: i,
                    side: BoundSide::Lower,
                    var,
                });
            }
            if row.upper.is_finite() {
                let var = elastic.add_num_variable(0.0, f64::INFINITY, &format!("s_up_{i}"))?;
                elastic.set_coefficient(ct, var, -1.0)?;
                elastic.set_objective_coefficient(var, 1.0)?;
                slacks.push(Slack {
                    row: i,
                    side: BoundSide::Upper,
                    var,
                });
            }
        }
        elastic.set_minimization();
        Ok((elastic, slacks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adq_solver_common::ClarabelBackend;

    fn analyzer() -> InfeasibilityAnalyzer {
        InfeasibilityAnalyzer::new(Arc::new(ClarabelBackend::new()))
    }

    #[test]
    fn test_inverted_bounds_reported_first() {
        let mut pb = MipProblem::new("bounds");
        pb.add_num_variable(2.0, 1.0, "broken").unwrap();
        let report = analyzer().run(&pb).unwrap();
        assert_eq!(report.inverted_bounds.len(), 1);
        assert_eq!(report.inverted_bounds[0].variable, "broken");
        assert!(report.relaxation_status.is_none());
        assert!(report.to_string().contains("'broken'"));
    }

    #[test]
    fn test_violated_constraint_is_named() {
        // x in [0, 1] but demand needs x = 2.
        let mut pb = MipProblem::new("demand");
        let x = pb.add_num_variable(0.0, 1.0, "x").unwrap();
        let demand = pb.add_constraint(2.0, 2.0, "demand").unwrap();
        let loose = pb.add_constraint(f64::NEG_INFINITY, 10.0, "loose").unwrap();
        pb.set_coefficient(demand, x, 1.0).unwrap();
        pb.set_coefficient(loose, x, 1.0).unwrap();

        let report = analyzer().run(&pb).unwrap();
        assert_eq!(report.relaxation_status, Some(MipStatus::Optimal));
        assert_eq!(report.violations.len(), 1);
        let violation = &report.violations[0];
        assert_eq!(violation.constraint, "demand");
        assert_eq!(violation.side, BoundSide::Lower);
        assert!((violation.amount - 1.0).abs() < 1e-5);
        assert!(report.to_string().contains("'demand'"));
    }

    #[test]
    fn test_feasible_problem_has_empty_report() {
        let mut pb = MipProblem::new("ok");
        let x = pb.add_num_variable(0.0, 5.0, "x").unwrap();
        let c = pb.add_constraint(1.0, 1.0, "c").unwrap();
        pb.set_coefficient(c, x, 1.0).unwrap();
        let report = analyzer().run(&pb).unwrap();
        assert!(report.is_empty());
        assert!(report.to_string().contains("no culprit"));
    }
}
