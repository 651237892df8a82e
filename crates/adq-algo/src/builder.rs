//! Linear problem builder.
//!
//! Runs an ordered list of fillers against one sink in three phases:
//! variables, then constraints, then objective. The first error aborts the
//! build. The builder holds nothing but the list, so one builder can fill
//! any number of independent sinks.

use adq_core::LinearProblemData;
use adq_solver_common::LinearProblem;
use tracing::debug;

use crate::error::FillResult;
use crate::filler::{FillContext, LinearProblemFiller};

pub struct LinearProblemBuilder<'a> {
    fillers: Vec<&'a dyn LinearProblemFiller>,
}

impl<'a> LinearProblemBuilder<'a> {
    pub fn new(fillers: Vec<&'a dyn LinearProblemFiller>) -> Self {
        Self { fillers }
    }

    pub fn len(&self) -> usize {
        self.fillers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fillers.is_empty()
    }

    pub fn build(
        &self,
        problem: &mut dyn LinearProblem,
        data: &LinearProblemData,
        ctx: &FillContext,
    ) -> FillResult<()> {
        debug!(
            fillers = self.fillers.len(),
            first = ctx.first_time_step,
            last = ctx.last_time_step,
            "Building linear problem"
        );
        for filler in &self.fillers {
            filler.add_variables(problem, data, ctx)?;
        }
        for filler in &self.fillers {
            filler.add_constraints(problem, data, ctx)?;
        }
        for filler in &self.fillers {
            filler.add_objective(problem, data, ctx)?;
        }
        debug!(
            variables = problem.variable_count(),
            constraints = problem.constraint_count(),
            "Linear problem built"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adq_solver_common::MipProblem;
    use std::sync::Mutex;

    /// Records the order in which phases are invoked.
    struct Recorder<'a> {
        name: &'static str,
        log: &'a Mutex<Vec<String>>,
    }

    impl LinearProblemFiller for Recorder<'_> {
        fn add_variables(
            &self,
            problem: &mut dyn LinearProblem,
            _data: &LinearProblemData,
            _ctx: &FillContext,
        ) -> FillResult<()> {
            problem.add_num_variable(0.0, 1.0, self.name)?;
            self.log.lock().unwrap().push(format!("{}:variables", self.name));
            Ok(())
        }

        fn add_constraints(
            &self,
            _problem: &mut dyn LinearProblem,
            _data: &LinearProblemData,
            _ctx: &FillContext,
        ) -> FillResult<()> {
            self.log.lock().unwrap().push(format!("{}:constraints", self.name));
            Ok(())
        }

        fn add_objective(
            &self,
            _problem: &mut dyn LinearProblem,
            _data: &LinearProblemData,
            _ctx: &FillContext,
        ) -> FillResult<()> {
            self.log.lock().unwrap().push(format!("{}:objective", self.name));
            Ok(())
        }
    }

    #[test]
    fn test_phases_run_in_order() {
        let log = Mutex::new(Vec::new());
        let a = Recorder { name: "a", log: &log };
        let b = Recorder { name: "b", log: &log };
        let builder = LinearProblemBuilder::new(vec![&a, &b]);

        let mut pb = MipProblem::new("test");
        builder
            .build(&mut pb, &LinearProblemData::default(), &FillContext::new(0, 0))
            .unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "a:variables",
                "b:variables",
                "a:constraints",
                "b:constraints",
                "a:objective",
                "b:objective",
            ]
        );
    }

    #[test]
    fn test_first_error_aborts() {
        let log = Mutex::new(Vec::new());
        let a = Recorder { name: "a", log: &log };
        let again = Recorder { name: "a", log: &log };
        let builder = LinearProblemBuilder::new(vec![&a, &again]);

        let mut pb = MipProblem::new("test");
        let err = builder
            .build(&mut pb, &LinearProblemData::default(), &FillContext::new(0, 0))
            .unwrap_err();
        assert!(err.to_string().contains("'a'"));
        assert_eq!(*log.lock().unwrap(), vec!["a:variables"]);
    }
}
