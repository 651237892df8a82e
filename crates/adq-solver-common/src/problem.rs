//! Linear problem sink.
//!
//! [`LinearProblem`] is the abstract target fillers write into; [`MipProblem`]
//! is the in-memory implementation handed to solver backends.
//!
//! Handles ([`VarId`], [`ConstraintId`]) remember which problem issued them.
//! Using a handle on another problem fails with
//! [`LinearProblemError::InvalidHandle`] instead of silently touching an
//! unrelated element.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::backend::{SolveParams, SolverBackend};
use crate::error::{LinearProblemError, ProblemResult, SolverError, SolverResult};
use crate::solution::MipSolution;

static NEXT_PROBLEM_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to a variable of a linear problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId {
    problem: u64,
    index: usize,
}

impl VarId {
    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn problem(&self) -> u64 {
        self.problem
    }
}

/// Handle to a constraint of a linear problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintId {
    problem: u64,
    index: usize,
}

impl ConstraintId {
    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn problem(&self) -> u64 {
        self.problem
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveSense {
    #[default]
    Minimize,
    Maximize,
}

/// Abstract numeric optimisation target.
///
/// Names of variables and constraints live in one namespace: adding any
/// element whose name is already taken fails with
/// [`LinearProblemError::ElementAlreadyExists`].
pub trait LinearProblem {
    fn add_variable(&mut self, lb: f64, ub: f64, integer: bool, name: &str)
        -> ProblemResult<VarId>;

    fn add_num_variable(&mut self, lb: f64, ub: f64, name: &str) -> ProblemResult<VarId> {
        self.add_variable(lb, ub, false, name)
    }

    fn add_int_variable(&mut self, lb: f64, ub: f64, name: &str) -> ProblemResult<VarId> {
        self.add_variable(lb, ub, true, name)
    }

    /// Adds `count` variables named `<name>_0` .. `<name>_<count-1>`.
    fn add_variables(
        &mut self,
        count: usize,
        lb: f64,
        ub: f64,
        integer: bool,
        name: &str,
    ) -> ProblemResult<Vec<VarId>> {
        (0..count)
            .map(|i| self.add_variable(lb, ub, integer, &format!("{name}_{i}")))
            .collect()
    }

    fn variable(&self, name: &str) -> Option<VarId>;

    fn variable_count(&self) -> usize;

    fn variable_name(&self, var: VarId) -> ProblemResult<&str>;

    fn variable_bounds(&self, var: VarId) -> ProblemResult<(f64, f64)>;

    fn set_variable_bounds(&mut self, var: VarId, lb: f64, ub: f64) -> ProblemResult<()>;

    fn is_integer(&self, var: VarId) -> ProblemResult<bool>;

    fn add_constraint(&mut self, lb: f64, ub: f64, name: &str) -> ProblemResult<ConstraintId>;

    /// Adds `count` constraints named `<name>_0` .. `<name>_<count-1>`.
    fn add_constraints(
        &mut self,
        count: usize,
        lb: f64,
        ub: f64,
        name: &str,
    ) -> ProblemResult<Vec<ConstraintId>> {
        (0..count)
            .map(|i| self.add_constraint(lb, ub, &format!("{name}_{i}")))
            .collect()
    }

    fn constraint(&self, name: &str) -> Option<ConstraintId>;

    fn constraint_count(&self) -> usize;

    fn constraint_name(&self, constraint: ConstraintId) -> ProblemResult<&str>;

    fn constraint_bounds(&self, constraint: ConstraintId) -> ProblemResult<(f64, f64)>;

    fn set_constraint_bounds(
        &mut self,
        constraint: ConstraintId,
        lb: f64,
        ub: f64,
    ) -> ProblemResult<()>;

    fn set_coefficient(
        &mut self,
        constraint: ConstraintId,
        var: VarId,
        coefficient: f64,
    ) -> ProblemResult<()>;

    fn coefficient(&self, constraint: ConstraintId, var: VarId) -> ProblemResult<f64>;

    fn set_objective_coefficient(&mut self, var: VarId, coefficient: f64) -> ProblemResult<()>;

    /// Objective coefficient of `var`; 0 for a handle this problem does not know.
    fn objective_coefficient(&self, var: VarId) -> f64;

    fn set_objective_sense(&mut self, sense: ObjectiveSense);

    fn objective_sense(&self) -> ObjectiveSense;

    fn set_minimization(&mut self) {
        self.set_objective_sense(ObjectiveSense::Minimize);
    }

    fn set_maximization(&mut self) {
        self.set_objective_sense(ObjectiveSense::Maximize);
    }

    fn is_minimization(&self) -> bool {
        self.objective_sense() == ObjectiveSense::Minimize
    }

    fn infinity(&self) -> f64 {
        f64::INFINITY
    }
}

/// One column of a [`MipProblem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
    pub integer: bool,
    pub objective: f64,
}

/// One row of a [`MipProblem`]; coefficients keyed by column index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
    pub coefficients: BTreeMap<usize, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    Variable(usize),
    Constraint(usize),
}

/// In-memory linear / mixed-integer problem.
#[derive(Debug, Clone)]
pub struct MipProblem {
    id: u64,
    name: String,
    columns: Vec<Column>,
    rows: Vec<Row>,
    names: HashMap<String, Element>,
    sense: ObjectiveSense,
}

impl MipProblem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NEXT_PROBLEM_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
            names: HashMap::new(),
            sense: ObjectiveSense::Minimize,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn has_integer_variables(&self) -> bool {
        self.columns.iter().any(|c| c.integer)
    }

    /// Handle of the `index`-th variable, if it exists.
    pub fn variable_at(&self, index: usize) -> Option<VarId> {
        (index < self.columns.len()).then_some(VarId {
            problem: self.id,
            index,
        })
    }

    /// Handle of the `index`-th constraint, if it exists.
    pub fn constraint_at(&self, index: usize) -> Option<ConstraintId> {
        (index < self.rows.len()).then_some(ConstraintId {
            problem: self.id,
            index,
        })
    }

    /// Solves with `backend`, refusing integer columns it cannot honour.
    pub fn solve(
        &self,
        backend: &dyn SolverBackend,
        params: &SolveParams,
    ) -> SolverResult<MipSolution> {
        if !backend.supports_integers() && self.has_integer_variables() {
            return Err(SolverError::IntegersUnsupported {
                backend: backend.id(),
                count: self.columns.iter().filter(|c| c.integer).count(),
            });
        }
        backend.solve(self, params)
    }

    /// Writes the problem as free-format MPS.
    pub fn write_mps(&self, path: &Path) -> std::io::Result<()> {
        crate::mps::write_mps_file(self, path)
    }

    fn register_name(&mut self, name: &str, element: Element) -> ProblemResult<()> {
        if self.names.contains_key(name) {
            return Err(LinearProblemError::ElementAlreadyExists(name.to_string()));
        }
        self.names.insert(name.to_string(), element);
        Ok(())
    }

    fn column_index(&self, var: VarId) -> ProblemResult<usize> {
        if var.problem != self.id || var.index >= self.columns.len() {
            return Err(LinearProblemError::InvalidHandle { kind: "variable" });
        }
        Ok(var.index)
    }

    fn row_index(&self, constraint: ConstraintId) -> ProblemResult<usize> {
        if constraint.problem != self.id || constraint.index >= self.rows.len() {
            return Err(LinearProblemError::InvalidHandle { kind: "constraint" });
        }
        Ok(constraint.index)
    }
}

impl Default for MipProblem {
    fn default() -> Self {
        Self::new("problem")
    }
}

impl LinearProblem for MipProblem {
    fn add_variable(
        &mut self,
        lb: f64,
        ub: f64,
        integer: bool,
        name: &str,
    ) -> ProblemResult<VarId> {
        let index = self.columns.len();
        self.register_name(name, Element::Variable(index))?;
        self.columns.push(Column {
            name: name.to_string(),
            lower: lb,
            upper: ub,
            integer,
            objective: 0.0,
        });
        Ok(VarId {
            problem: self.id,
            index,
        })
    }

    fn variable(&self, name: &str) -> Option<VarId> {
        match self.names.get(name) {
            Some(Element::Variable(index)) => Some(VarId {
                problem: self.id,
                index: *index,
            }),
            _ => None,
        }
    }

    fn variable_count(&self) -> usize {
        self.columns.len()
    }

    fn variable_name(&self, var: VarId) -> ProblemResult<&str> {
        let index = self.column_index(var)?;
        Ok(&self.columns[index].name)
    }

    fn variable_bounds(&self, var: VarId) -> ProblemResult<(f64, f64)> {
        let column = &self.columns[self.column_index(var)?];
        Ok((column.lower, column.upper))
    }

    fn set_variable_bounds(&mut self, var: VarId, lb: f64, ub: f64) -> ProblemResult<()> {
        let index = self.column_index(var)?;
        let column = &mut self.columns[index];
        column.lower = lb;
        column.upper = ub;
        Ok(())
    }

    fn is_integer(&self, var: VarId) -> ProblemResult<bool> {
        Ok(self.columns[self.column_index(var)?].integer)
    }

    fn add_constraint(&mut self, lb: f64, ub: f64, name: &str) -> ProblemResult<ConstraintId> {
        let index = self.rows.len();
        self.register_name(name, Element::Constraint(index))?;
        self.rows.push(Row {
            name: name.to_string(),
            lower: lb,
            upper: ub,
            coefficients: BTreeMap::new(),
        });
        Ok(ConstraintId {
            problem: self.id,
            index,
        })
    }

    fn constraint(&self, name: &str) -> Option<ConstraintId> {
        match self.names.get(name) {
            Some(Element::Constraint(index)) => Some(ConstraintId {
                problem: self.id,
                index: *index,
            }),
            _ => None,
        }
    }

    fn constraint_count(&self) -> usize {
        self.rows.len()
    }

    fn constraint_name(&self, constraint: ConstraintId) -> ProblemResult<&str> {
        let index = self.row_index(constraint)?;
        Ok(&self.rows[index].name)
    }

    fn constraint_bounds(&self, constraint: ConstraintId) -> ProblemResult<(f64, f64)> {
        let row = &self.rows[self.row_index(constraint)?];
        Ok((row.lower, row.upper))
    }

    fn set_constraint_bounds(
        &mut self,
        constraint: ConstraintId,
        lb: f64,
        ub: f64,
    ) -> ProblemResult<()> {
        let index = self.row_index(constraint)?;
        let row = &mut self.rows[index];
        row.lower = lb;
        row.upper = ub;
        Ok(())
    }

    fn set_coefficient(
        &mut self,
        constraint: ConstraintId,
        var: VarId,
        coefficient: f64,
    ) -> ProblemResult<()> {
        let row = self.row_index(constraint)?;
        let column = self.column_index(var)?;
        self.rows[row].coefficients.insert(column, coefficient);
        Ok(())
    }

    fn coefficient(&self, constraint: ConstraintId, var: VarId) -> ProblemResult<f64> {
        let row = self.row_index(constraint)?;
        let column = self.column_index(var)?;
        Ok(self.rows[row]
            .coefficients
            .get(&column)
            .copied()
            .unwrap_or(0.0))
    }

    fn set_objective_coefficient(&mut self, var: VarId, coefficient: f64) -> ProblemResult<()> {
        let index = self.column_index(var)?;
        self.columns[index].objective = coefficient;
        Ok(())
    }

    fn objective_coefficient(&self, var: VarId) -> f64 {
        self.column_index(var)
            .map(|index| self.columns[index].objective)
            .unwrap_or(0.0)
    }

    fn set_objective_sense(&mut self, sense: ObjectiveSense) {
        self.sense = sense;
    }

    fn objective_sense(&self) -> ObjectiveSense {
        self.sense
    }
}
