//! Caller-owned state carried between solves.

use adq_solver_common::MipProblem;

use super::OptimizationPass;
use crate::legacy::LegacyIndex;

/// Timing totals for one optimisation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptimizationStatistics {
    pub total_update_time_ms: u128,
    pub update_count: u32,
    pub total_solve_time_ms: u128,
    pub solve_count: u32,
}

impl OptimizationStatistics {
    pub fn add_update_time(&mut self, ms: u128) {
        self.total_update_time_ms += ms;
        self.update_count += 1;
    }

    pub fn add_solve_time(&mut self, ms: u128) {
        self.total_solve_time_ms += ms;
        self.solve_count += 1;
    }

    pub fn average_solve_time_ms(&self) -> f64 {
        if self.solve_count == 0 {
            0.0
        } else {
            self.total_solve_time_ms as f64 / self.solve_count as f64
        }
    }
}

/// A problem kept after a successful solve, updated in place next time.
#[derive(Debug, Clone)]
pub struct RetainedProblem {
    pub problem: MipProblem,
    pub index: LegacyIndex,
    /// Primal values of the last solve, used as warm start.
    pub last_values: Vec<f64>,
}

/// Everything the orchestrator remembers across calls.
///
/// Owned by the caller and passed to every solve, one session per
/// independent sequence of windows.
#[derive(Debug, Default)]
pub struct SolveSession {
    retained: [Option<RetainedProblem>; 2],
    statistics: [OptimizationStatistics; 2],
    optimal_costs: [Option<f64>; 2],
}

impl SolveSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every retained problem. Statistics are kept.
    pub fn reset(&mut self) {
        self.retained = [None, None];
    }

    pub fn reset_pass(&mut self, pass: OptimizationPass) {
        self.retained[pass.slot()] = None;
    }

    pub fn has_retained(&self, pass: OptimizationPass) -> bool {
        self.retained[pass.slot()].is_some()
    }

    pub fn retained(&self, pass: OptimizationPass) -> Option<&RetainedProblem> {
        self.retained[pass.slot()].as_ref()
    }

    pub(crate) fn take_retained(&mut self, pass: OptimizationPass) -> Option<RetainedProblem> {
        self.retained[pass.slot()].take()
    }

    pub(crate) fn retain(&mut self, pass: OptimizationPass, retained: RetainedProblem) {
        self.retained[pass.slot()] = Some(retained);
    }

    pub fn statistics(&self, pass: OptimizationPass) -> &OptimizationStatistics {
        &self.statistics[pass.slot()]
    }

    pub(crate) fn statistics_mut(&mut self, pass: OptimizationPass) -> &mut OptimizationStatistics {
        &mut self.statistics[pass.slot()]
    }

    /// Objective of the last successful solve of `pass`.
    pub fn optimal_cost(&self, pass: OptimizationPass) -> Option<f64> {
        self.optimal_costs[pass.slot()]
    }

    pub(crate) fn set_optimal_cost(&mut self, pass: OptimizationPass, cost: f64) {
        self.optimal_costs[pass.slot()] = Some(cost);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics() {
        let mut stats = OptimizationStatistics::default();
        assert_eq!(stats.average_solve_time_ms(), 0.0);
        stats.add_solve_time(10);
        stats.add_solve_time(20);
        stats.add_update_time(3);
        assert_eq!(stats.solve_count, 2);
        assert_eq!(stats.average_solve_time_ms(), 15.0);
        assert_eq!(stats.total_update_time_ms, 3);
    }

    #[test]
    fn test_reset_drops_retained_problems() {
        let mut session = SolveSession::new();
        session.retain(
            OptimizationPass::First,
            RetainedProblem {
                problem: MipProblem::new("p"),
                index: LegacyIndex::default(),
                last_values: vec![],
            },
        );
        session.statistics_mut(OptimizationPass::First).add_solve_time(5);
        assert!(session.has_retained(OptimizationPass::First));
        assert!(!session.has_retained(OptimizationPass::Second));

        session.reset();
        assert!(!session.has_retained(OptimizationPass::First));
        assert_eq!(session.statistics(OptimizationPass::First).solve_count, 1);
    }
}
