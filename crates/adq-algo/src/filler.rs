//! Filler contract.

use adq_core::LinearProblemData;
use adq_solver_common::LinearProblem;

use crate::error::FillResult;

/// Time-step window and scenario subset a filler operates on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FillContext {
    pub first_time_step: usize,
    pub last_time_step: usize,
    pub scenarios_selected: Vec<usize>,
}

impl FillContext {
    /// Window `[first, last]`, both inclusive, with no scenario selected.
    pub fn new(first_time_step: usize, last_time_step: usize) -> Self {
        Self {
            first_time_step,
            last_time_step,
            scenarios_selected: Vec::new(),
        }
    }

    pub fn with_scenarios(mut self, scenarios: impl IntoIterator<Item = usize>) -> Self {
        self.scenarios_selected = scenarios.into_iter().collect();
        self
    }

    /// `last - first + 1`, or 0 for an inverted window.
    pub fn number_of_timesteps(&self) -> usize {
        if self.first_time_step > self.last_time_step {
            0
        } else {
            self.last_time_step - self.first_time_step + 1
        }
    }

    /// Scenario used when evaluating expressions.
    pub fn first_scenario(&self) -> usize {
        self.scenarios_selected.first().copied().unwrap_or(0)
    }
}

/// A unit that adds variables, constraints and objective terms to a sink.
///
/// The three operations are called in separate phases by
/// [`LinearProblemBuilder`](crate::LinearProblemBuilder): every filler's
/// variables exist before any filler adds constraints.
pub trait LinearProblemFiller {
    fn add_variables(
        &self,
        problem: &mut dyn LinearProblem,
        data: &LinearProblemData,
        ctx: &FillContext,
    ) -> FillResult<()>;

    fn add_constraints(
        &self,
        problem: &mut dyn LinearProblem,
        data: &LinearProblemData,
        ctx: &FillContext,
    ) -> FillResult<()>;

    fn add_objective(
        &self,
        problem: &mut dyn LinearProblem,
        data: &LinearProblemData,
        ctx: &FillContext,
    ) -> FillResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_of_timesteps() {
        assert_eq!(FillContext::new(0, 167).number_of_timesteps(), 168);
        assert_eq!(FillContext::new(5, 5).number_of_timesteps(), 1);
        assert_eq!(FillContext::new(3, 2).number_of_timesteps(), 0);
    }

    #[test]
    fn test_first_scenario() {
        assert_eq!(FillContext::new(0, 1).first_scenario(), 0);
        assert_eq!(
            FillContext::new(0, 1).with_scenarios([4, 2]).first_scenario(),
            4
        );
    }
}
