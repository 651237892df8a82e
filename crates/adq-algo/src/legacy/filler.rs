//! Filler replaying a [`LegacyProblem`] into a linear problem sink.

use adq_core::LinearProblemData;
use adq_solver_common::{ConstraintId, LinearProblem, VarId};

use super::problem::LegacyProblem;
use crate::error::{FillError, FillResult};
use crate::filler::{FillContext, LinearProblemFiller};

/// Copies array slots into sink elements one to one.
///
/// The fill context is ignored: the arrays already describe the whole window.
pub struct LegacyFiller<'a> {
    problem: &'a LegacyProblem,
    use_names: bool,
}

/// Sink handles of every slot of a [`LegacyProblem`], in slot order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyIndex {
    pub variables: Vec<VarId>,
    pub constraints: Vec<ConstraintId>,
}

impl<'a> LegacyFiller<'a> {
    pub fn new(problem: &'a LegacyProblem, use_names: bool) -> Self {
        Self { problem, use_names }
    }

    fn variable_handle(&self, sink: &dyn LinearProblem, i: usize) -> FillResult<VarId> {
        let name = self.problem.variable_name(i, self.use_names);
        sink.variable(&name).ok_or_else(|| {
            FillError::MalformedLegacyProblem(format!("variable '{name}' missing from the sink"))
        })
    }

    fn constraint_handle(&self, sink: &dyn LinearProblem, r: usize) -> FillResult<ConstraintId> {
        let name = self.problem.constraint_name(r, self.use_names);
        sink.constraint(&name).ok_or_else(|| {
            FillError::MalformedLegacyProblem(format!("constraint '{name}' missing from the sink"))
        })
    }

    /// Handles of every slot, looked up in a sink this filler has filled.
    pub fn index(&self, sink: &dyn LinearProblem) -> FillResult<LegacyIndex> {
        let variables = (0..self.problem.variable_count())
            .map(|i| self.variable_handle(sink, i))
            .collect::<FillResult<Vec<_>>>()?;
        let constraints = (0..self.problem.constraint_count())
            .map(|r| self.constraint_handle(sink, r))
            .collect::<FillResult<Vec<_>>>()?;
        Ok(LegacyIndex {
            variables,
            constraints,
        })
    }
}

impl LinearProblemFiller for LegacyFiller<'_> {
    fn add_variables(
        &self,
        sink: &mut dyn LinearProblem,
        _data: &LinearProblemData,
        _ctx: &FillContext,
    ) -> FillResult<()> {
        self.problem.validate()?;
        for i in 0..self.problem.variable_count() {
            let (lower, upper) = self.problem.bounds(i);
            sink.add_variable(
                lower,
                upper,
                self.problem.is_integer(i),
                &self.problem.variable_name(i, self.use_names),
            )?;
        }
        Ok(())
    }

    fn add_constraints(
        &self,
        sink: &mut dyn LinearProblem,
        _data: &LinearProblemData,
        _ctx: &FillContext,
    ) -> FillResult<()> {
        let variables = (0..self.problem.variable_count())
            .map(|i| self.variable_handle(sink, i))
            .collect::<FillResult<Vec<_>>>()?;
        for r in 0..self.problem.constraint_count() {
            let (lower, upper) = self.problem.constraint_bounds(r);
            let id =
                sink.add_constraint(lower, upper, &self.problem.constraint_name(r, self.use_names))?;
            for (j, coefficient) in self.problem.row(r) {
                sink.set_coefficient(id, variables[j], coefficient)?;
            }
        }
        Ok(())
    }

    fn add_objective(
        &self,
        sink: &mut dyn LinearProblem,
        _data: &LinearProblemData,
        _ctx: &FillContext,
    ) -> FillResult<()> {
        for (i, &cost) in self.problem.costs.iter().enumerate() {
            let var = self.variable_handle(sink, i)?;
            sink.set_objective_coefficient(var, cost)?;
        }
        Ok(())
    }
}
