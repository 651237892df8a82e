//! Flat-array problem description and its result buffers.

use std::collections::HashSet;

use adq_core::{AdqError, AdqResult};
use serde::{Deserialize, Serialize};

use crate::error::{FillError, FillResult};

/// Which of a variable's bounds apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundKind {
    /// `x = x_min`
    Fixed,
    /// `x_min <= x <= x_max`
    #[default]
    Bounded,
    /// `x >= x_min`
    LowerOnly,
    /// `x <= x_max`
    UpperOnly,
    Free,
}

/// Row sense, serialized as the single characters `=`, `<`, `>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sense {
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "<")]
    LessOrEqual,
    #[serde(rename = ">")]
    GreaterOrEqual,
}

impl Sense {
    /// Bounds of a row with right-hand side `rhs`.
    pub fn bounds(self, rhs: f64) -> (f64, f64) {
        match self {
            Sense::Equal => (rhs, rhs),
            Sense::LessOrEqual => (f64::NEG_INFINITY, rhs),
            Sense::GreaterOrEqual => (rhs, f64::INFINITY),
        }
    }
}

/// A linear problem given as parallel arrays, the matrix in row-compressed form.
///
/// Row `r` holds the entries `row_start[r] .. row_start[r] + row_len[r]` of
/// `col_indices` / `coefficients`. Optional arrays (`bound_kinds`,
/// `integer`, names, destinations) may be left empty.
///
/// Destinations are slots of a caller-owned [`LegacyResults`] where solved
/// values are copied back; `None` means "not wanted".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyProblem {
    pub costs: Vec<f64>,
    pub x_min: Vec<f64>,
    pub x_max: Vec<f64>,
    pub bound_kinds: Vec<BoundKind>,
    pub integer: Vec<bool>,

    pub rhs: Vec<f64>,
    pub sense: Vec<Sense>,
    pub row_start: Vec<usize>,
    pub row_len: Vec<usize>,
    pub col_indices: Vec<usize>,
    pub coefficients: Vec<f64>,

    pub variable_names: Vec<String>,
    pub constraint_names: Vec<String>,

    pub primal_destinations: Vec<Option<usize>>,
    pub reduced_cost_destinations: Vec<Option<usize>>,
    pub dual_destinations: Vec<Option<usize>>,
}

fn check_len(name: &str, len: usize, expected: usize, optional: bool) -> FillResult<()> {
    if len == expected || (optional && len == 0) {
        Ok(())
    } else {
        Err(FillError::MalformedLegacyProblem(format!(
            "'{name}' has {len} entries, expected {expected}"
        )))
    }
}

/// Given names and positional fallbacks share one namespace in the sink.
fn unique_names(names: impl Iterator<Item = String>) -> FillResult<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.clone()) {
            return Err(FillError::MalformedLegacyProblem(format!(
                "name '{name}' is used twice"
            )));
        }
    }
    Ok(())
}

impl LegacyProblem {
    /// Parses a problem from its JSON form and validates it.
    pub fn from_json(json: &str) -> AdqResult<Self> {
        let problem: LegacyProblem =
            serde_json::from_str(json).map_err(|e| AdqError::Parse(e.to_string()))?;
        problem.validate()?;
        Ok(problem)
    }

    pub fn variable_count(&self) -> usize {
        self.costs.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.rhs.len()
    }

    pub fn is_mip(&self) -> bool {
        self.integer.iter().any(|&i| i)
    }

    /// Checks that the arrays agree with each other.
    pub fn validate(&self) -> FillResult<()> {
        let n = self.variable_count();
        let m = self.constraint_count();
        check_len("x_min", self.x_min.len(), n, false)?;
        check_len("x_max", self.x_max.len(), n, false)?;
        check_len("bound_kinds", self.bound_kinds.len(), n, true)?;
        check_len("integer", self.integer.len(), n, true)?;
        check_len("variable_names", self.variable_names.len(), n, true)?;
        check_len("primal_destinations", self.primal_destinations.len(), n, true)?;
        check_len(
            "reduced_cost_destinations",
            self.reduced_cost_destinations.len(),
            n,
            true,
        )?;

        check_len("sense", self.sense.len(), m, false)?;
        check_len("row_start", self.row_start.len(), m, false)?;
        check_len("row_len", self.row_len.len(), m, false)?;
        check_len("constraint_names", self.constraint_names.len(), m, true)?;
        check_len("dual_destinations", self.dual_destinations.len(), m, true)?;
        check_len(
            "coefficients",
            self.coefficients.len(),
            self.col_indices.len(),
            false,
        )?;

        for r in 0..m {
            let start = self.row_start[r];
            let end = start
                .checked_add(self.row_len[r])
                .filter(|&end| end <= self.col_indices.len())
                .ok_or_else(|| {
                    FillError::MalformedLegacyProblem(format!(
                        "row {r} spans {start} + {}, beyond the {} matrix entries",
                        self.row_len[r],
                        self.col_indices.len()
                    ))
                })?;
            if let Some(&j) = self.col_indices[start..end].iter().find(|&&j| j >= n) {
                return Err(FillError::MalformedLegacyProblem(format!(
                    "row {r} references column {j}, only {n} variables"
                )));
            }
        }

        if !self.variable_names.is_empty() || !self.constraint_names.is_empty() {
            unique_names(
                (0..n)
                    .map(|i| self.variable_name(i, true))
                    .chain((0..m).map(|r| self.constraint_name(r, true))),
            )?;
        }
        Ok(())
    }

    pub fn bound_kind(&self, i: usize) -> BoundKind {
        self.bound_kinds.get(i).copied().unwrap_or_default()
    }

    /// Effective bounds of variable `i` after applying its [`BoundKind`].
    pub fn bounds(&self, i: usize) -> (f64, f64) {
        let (lower, upper) = (self.x_min[i], self.x_max[i]);
        match self.bound_kind(i) {
            BoundKind::Fixed => (lower, lower),
            BoundKind::Bounded => (lower, upper),
            BoundKind::LowerOnly => (lower, f64::INFINITY),
            BoundKind::UpperOnly => (f64::NEG_INFINITY, upper),
            BoundKind::Free => (f64::NEG_INFINITY, f64::INFINITY),
        }
    }

    pub fn is_integer(&self, i: usize) -> bool {
        self.integer.get(i).copied().unwrap_or(false)
    }

    pub fn constraint_bounds(&self, r: usize) -> (f64, f64) {
        self.sense[r].bounds(self.rhs[r])
    }

    /// `(column, coefficient)` entries of row `r`. The problem must have
    /// passed [`LegacyProblem::validate`].
    pub fn row(&self, r: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let start = self.row_start[r];
        let range = start..start.saturating_add(self.row_len[r]);
        self.col_indices[range.clone()]
            .iter()
            .copied()
            .zip(self.coefficients[range].iter().copied())
    }

    /// Sink name of variable `i`: its given name, or `x{i}`.
    pub fn variable_name(&self, i: usize, use_names: bool) -> String {
        match self.variable_names.get(i) {
            Some(name) if use_names && !name.is_empty() => name.clone(),
            _ => format!("x{i}"),
        }
    }

    /// Sink name of constraint `r`: its given name, or `c{r}`.
    pub fn constraint_name(&self, r: usize, use_names: bool) -> String {
        match self.constraint_names.get(r) {
            Some(name) if use_names && !name.is_empty() => name.clone(),
            _ => format!("c{r}"),
        }
    }
}

/// Caller-owned buffers receiving solved values through the destinations
/// of a [`LegacyProblem`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyResults {
    pub primal: Vec<f64>,
    pub reduced_costs: Vec<f64>,
    pub duals: Vec<f64>,
}

fn slots(destinations: &[Option<usize>]) -> usize {
    destinations
        .iter()
        .flatten()
        .max()
        .map_or(0, |&max| max + 1)
}

fn store(buffer: &mut Vec<f64>, slot: usize, value: f64) {
    if slot >= buffer.len() {
        buffer.resize(slot + 1, 0.0);
    }
    buffer[slot] = value;
}

impl LegacyResults {
    /// Zeroed buffers large enough for every destination of `problem`.
    pub fn for_problem(problem: &LegacyProblem) -> Self {
        Self {
            primal: vec![0.0; slots(&problem.primal_destinations)],
            reduced_costs: vec![0.0; slots(&problem.reduced_cost_destinations)],
            duals: vec![0.0; slots(&problem.dual_destinations)],
        }
    }

    pub(crate) fn store_primal(&mut self, slot: usize, value: f64) {
        store(&mut self.primal, slot, value);
    }

    pub(crate) fn store_reduced_cost(&mut self, slot: usize, value: f64) {
        store(&mut self.reduced_costs, slot, value);
    }

    pub(crate) fn store_dual(&mut self, slot: usize, value: f64) {
        store(&mut self.duals, slot, value);
    }
}
