//! Lowers one [`Component`] into linear problem elements.
//!
//! Naming follows `"<component>.<field>"` for elements constant in time and
//! `"<component>.<field>_<k>"` for time-dependent ones, `k` being the offset
//! from the first time step of the fill context.

use std::f64::consts::{FRAC_1_PI, SQRT_2};

use adq_core::expr::{
    linearity, read_linear_constraint, read_linear_expression, read_linear_objective,
    time_index, EvalError, LinearStatus, Node, NodeId, ParameterResolver, TimeStepScenario,
};
use adq_core::{
    Component, ComponentParameters, LinearProblemData, Model, ParameterValue, ValueType, Variable,
};
use adq_solver_common::{LinearProblem, VarId};
use tracing::trace;

use crate::error::{FillError, FillResult};
use crate::filler::{FillContext, LinearProblemFiller};

pub struct ComponentFiller<'a> {
    component: &'a Component,
}

impl<'a> ComponentFiller<'a> {
    /// Checks the component's model for non-linear or malformed expressions.
    ///
    /// The objective is evaluated once with [`SampledParameters`] so that a
    /// constant offset is reported here rather than at build time, whether it
    /// comes from literals, constant bindings or data series.
    pub fn new(component: &'a Component) -> FillResult<Self> {
        let filler = Self { component };
        filler.validate()?;
        Ok(filler)
    }

    pub fn component(&self) -> &Component {
        self.component
    }

    fn model(&self) -> &Model {
        self.component.model()
    }

    fn validate(&self) -> FillResult<()> {
        let model = self.model();
        let registry = model.registry();

        for variable in model.variables() {
            for bound in [variable.lower_bound, variable.upper_bound] {
                if linearity(registry, bound) != LinearStatus::Constant {
                    return Err(self.definition_error(format!(
                        "bounds of variable '{}' must not depend on decision variables",
                        variable.id
                    )));
                }
                if time_index(registry, bound).varies_in_time() && !variable.time_dependent {
                    return Err(self.definition_error(format!(
                        "variable '{}' is constant in time but its bounds are not",
                        variable.id
                    )));
                }
            }
        }

        for constraint in model.constraints() {
            if !matches!(registry[constraint.expression], Node::Comparison { .. }) {
                return Err(self.evaluation_error(EvalError::NotAComparison));
            }
            if linearity(registry, constraint.expression) == LinearStatus::NonLinear {
                return Err(self.non_linear(&constraint.id));
            }
        }

        if let Some(objective) = model.objective() {
            if linearity(registry, objective) == LinearStatus::NonLinear {
                return Err(self.non_linear("objective"));
            }
            read_linear_objective(
                registry,
                objective,
                &SampledParameters::new(self.component),
                TimeStepScenario::default(),
                model.id(),
                self.component.id(),
            )
            .map_err(|e| self.evaluation_error(e))?;
        }
        Ok(())
    }

    fn definition_error(&self, message: String) -> FillError {
        FillError::Definition {
            component: self.component.id().to_string(),
            message,
        }
    }

    fn evaluation_error(&self, source: EvalError) -> FillError {
        FillError::Evaluation {
            model: self.model().id().to_string(),
            component: self.component.id().to_string(),
            source,
        }
    }

    fn non_linear(&self, field: &str) -> FillError {
        FillError::NonLinear {
            model: self.model().id().to_string(),
            component: self.component.id().to_string(),
            field: field.to_string(),
        }
    }

    fn element_name(&self, field: &str, step: Option<usize>) -> String {
        match step {
            Some(k) => format!("{}.{}_{}", self.component.id(), field, k),
            None => format!("{}.{}", self.component.id(), field),
        }
    }

    /// Offsets at which an element is created: one per time step when it
    /// varies in time, a single static one otherwise. Empty for an empty window.
    fn steps(time_dependent: bool, ctx: &FillContext) -> Vec<Option<usize>> {
        let n = ctx.number_of_timesteps();
        if time_dependent {
            (0..n).map(Some).collect()
        } else if n > 0 {
            vec![None]
        } else {
            Vec::new()
        }
    }

    fn evaluation_point(ctx: &FillContext, step: Option<usize>) -> TimeStepScenario {
        TimeStepScenario::new(
            ctx.first_time_step + step.unwrap_or(0),
            ctx.first_scenario(),
        )
    }

    fn bounds(
        &self,
        variable: &Variable,
        resolver: &dyn ParameterResolver,
        at: TimeStepScenario,
    ) -> FillResult<(f64, f64)> {
        let registry = self.model().registry();
        let read = |node: NodeId| {
            read_linear_expression(registry, node, resolver, at)
                .map(|form| form.offset)
                .map_err(|e| self.evaluation_error(e))
        };
        let mut lower = read(variable.lower_bound)?;
        let mut upper = read(variable.upper_bound)?;
        if variable.value_type == ValueType::Bool {
            lower = lower.max(0.0);
            upper = upper.min(1.0);
        }
        Ok((lower, upper))
    }

    /// Maps an evaluated coefficient key to a sink variable.
    ///
    /// Local variables resolve through the model's declaration; references to
    /// other components (`"other.field"`) try the time-step element first,
    /// then the static one.
    fn resolve_variable(
        &self,
        problem: &dyn LinearProblem,
        key: &str,
        step: Option<usize>,
    ) -> FillResult<VarId> {
        let name = match self.model().variable(key) {
            Some(local) if local.time_dependent => {
                self.element_name(key, Some(step.unwrap_or(0)))
            }
            Some(_) => self.element_name(key, None),
            None => {
                if let Some(var) = step.and_then(|k| problem.variable(&format!("{key}_{k}"))) {
                    return Ok(var);
                }
                key.to_string()
            }
        };
        problem
            .variable(&name)
            .ok_or_else(|| FillError::UnknownVariable {
                component: self.component.id().to_string(),
                variable: name,
            })
    }
}

/// Parameter values for checks made before any data is available.
///
/// Constant bindings resolve to their value. Series-valued and cross-component
/// parameters resolve to distinct irrational samples, so a term that does not
/// multiply a decision variable cannot evaluate to zero by coincidence.
struct SampledParameters<'a> {
    component: &'a Component,
}

impl<'a> SampledParameters<'a> {
    fn new(component: &'a Component) -> Self {
        Self { component }
    }

    fn sample(rank: usize) -> f64 {
        SQRT_2 + rank as f64 * FRAC_1_PI
    }
}

impl ParameterResolver for SampledParameters<'_> {
    fn resolve(&self, parameter: &str, _at: TimeStepScenario) -> Result<f64, EvalError> {
        let values = self.component.parameter_values();
        match values.get(parameter) {
            Some(ParameterValue::Constant(v)) => Ok(*v),
            Some(ParameterValue::Series(_)) => {
                let rank = values.keys().take_while(|k| k.as_str() != parameter).count();
                Ok(Self::sample(rank))
            }
            None => Err(EvalError::ParameterNotInComponent {
                parameter: parameter.to_string(),
                component: self.component.id().to_string(),
            }),
        }
    }

    fn resolve_component_parameter(
        &self,
        component: &str,
        field: &str,
        _at: TimeStepScenario,
    ) -> Result<f64, EvalError> {
        let rank = self.component.parameter_values().len()
            + component
                .bytes()
                .chain(field.bytes())
                .map(usize::from)
                .sum::<usize>();
        Ok(Self::sample(rank))
    }
}

impl LinearProblemFiller for ComponentFiller<'_> {
    fn add_variables(
        &self,
        problem: &mut dyn LinearProblem,
        data: &LinearProblemData,
        ctx: &FillContext,
    ) -> FillResult<()> {
        let resolver = ComponentParameters::new(self.component, data);
        for variable in self.model().variables() {
            let integer = variable.value_type.is_integer();
            for step in Self::steps(variable.time_dependent, ctx) {
                let at = Self::evaluation_point(ctx, step);
                let (lower, upper) = self.bounds(variable, &resolver, at)?;
                let name = self.element_name(&variable.id, step);
                trace!(variable = %name, lower, upper, integer, "adding variable");
                problem.add_variable(lower, upper, integer, &name)?;
            }
        }
        Ok(())
    }

    fn add_constraints(
        &self,
        problem: &mut dyn LinearProblem,
        data: &LinearProblemData,
        ctx: &FillContext,
    ) -> FillResult<()> {
        let registry = self.model().registry();
        let resolver = ComponentParameters::new(self.component, data);
        for constraint in self.model().constraints() {
            let time_dependent = time_index(registry, constraint.expression).varies_in_time();
            for step in Self::steps(time_dependent, ctx) {
                let at = Self::evaluation_point(ctx, step);
                let form = read_linear_constraint(registry, constraint.expression, &resolver, at)
                    .map_err(|e| self.evaluation_error(e))?;
                let name = self.element_name(&constraint.id, step);
                let id = problem.add_constraint(form.lower_bound, form.upper_bound, &name)?;
                for (key, coefficient) in &form.coefficients {
                    let var = self.resolve_variable(problem, key, step)?;
                    problem.set_coefficient(id, var, *coefficient)?;
                }
            }
        }
        Ok(())
    }

    fn add_objective(
        &self,
        problem: &mut dyn LinearProblem,
        data: &LinearProblemData,
        ctx: &FillContext,
    ) -> FillResult<()> {
        let model = self.model();
        let Some(objective) = model.objective() else {
            return Ok(());
        };
        let registry = model.registry();
        let resolver = ComponentParameters::new(self.component, data);
        let time_dependent = time_index(registry, objective).varies_in_time();
        for step in Self::steps(time_dependent, ctx) {
            let at = Self::evaluation_point(ctx, step);
            let form = read_linear_objective(
                registry,
                objective,
                &resolver,
                at,
                model.id(),
                self.component.id(),
            )
            .map_err(|e| self.evaluation_error(e))?;
            // Static variables collect one term per time step.
            for (key, coefficient) in &form.coefficients {
                let var = self.resolve_variable(problem, key, step)?;
                let current = problem.objective_coefficient(var);
                problem.set_objective_coefficient(var, current + coefficient)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adq_core::expr::{NodeRegistry, TimeIndex};
    use adq_core::{Constraint, Parameter};
    use adq_solver_common::MipProblem;
    use std::sync::Arc;

    fn generator_model() -> Arc<Model> {
        // p in [0, pmax], cost * p
        let mut reg = NodeRegistry::new();
        let zero = reg.literal(0.0);
        let pmax = reg.parameter("pmax", TimeIndex::ConstantInTimeAndScenario);
        let p = reg.variable("p", TimeIndex::VaryingInTimeAndScenario);
        let cost = reg.parameter("cost", TimeIndex::ConstantInTimeAndScenario);
        let objective = reg.multiply(cost, p);
        let p_again = reg.variable("p", TimeIndex::VaryingInTimeAndScenario);
        let limit = reg.parameter("pmax", TimeIndex::ConstantInTimeAndScenario);
        let cap = reg.less_or_equal(p_again, limit);
        Arc::new(
            Model::builder()
                .with_id("generator")
                .with_registry(reg)
                .with_parameters(vec![
                    Parameter::new("pmax", false, false),
                    Parameter::new("cost", false, false),
                ])
                .with_variables(vec![
                    Variable::new("p", zero, pmax).with_time_dependence(true, true)
                ])
                .with_constraints(vec![Constraint::new("cap", cap)])
                .with_objective(objective)
                .build()
                .unwrap(),
        )
    }

    fn generator(model: Arc<Model>) -> Component {
        Component::builder()
            .with_id("gen1")
            .with_model(model)
            .with_parameter_values([("pmax", 100.0), ("cost", 3.0)])
            .with_scenario_group("g")
            .build()
            .unwrap()
    }

    fn fill(filler: &ComponentFiller, ctx: &FillContext) -> MipProblem {
        let mut pb = MipProblem::new("test");
        let data = LinearProblemData::default();
        filler.add_variables(&mut pb, &data, ctx).unwrap();
        filler.add_constraints(&mut pb, &data, ctx).unwrap();
        filler.add_objective(&mut pb, &data, ctx).unwrap();
        pb
    }

    #[test]
    fn test_time_dependent_elements() {
        let component = generator(generator_model());
        let filler = ComponentFiller::new(&component).unwrap();
        let pb = fill(&filler, &FillContext::new(24, 26));

        assert_eq!(pb.variable_count(), 3);
        assert_eq!(pb.constraint_count(), 3);
        for k in 0..3 {
            let p = pb.variable(&format!("gen1.p_{k}")).unwrap();
            let cap = pb.constraint(&format!("gen1.cap_{k}")).unwrap();
            assert_eq!(pb.variable_bounds(p).unwrap(), (0.0, 100.0));
            assert_eq!(pb.constraint_bounds(cap).unwrap(), (f64::NEG_INFINITY, 100.0));
            assert_eq!(pb.coefficient(cap, p).unwrap(), 1.0);
            assert_eq!(pb.objective_coefficient(p), 3.0);
        }
    }

    #[test]
    fn test_empty_window_adds_nothing() {
        let component = generator(generator_model());
        let filler = ComponentFiller::new(&component).unwrap();
        let pb = fill(&filler, &FillContext::new(5, 4));
        assert_eq!(pb.variable_count(), 0);
        assert_eq!(pb.constraint_count(), 0);
    }

    #[test]
    fn test_static_variable_accumulates_objective() {
        // capacity is static, cost(t) * capacity is summed over the window.
        let mut reg = NodeRegistry::new();
        let zero = reg.literal(0.0);
        let ten = reg.literal(10.0);
        let capacity = reg.variable("capacity", TimeIndex::ConstantInTimeAndScenario);
        let two = reg.literal(2.0);
        let objective = reg.multiply(two, capacity);
        let model = Arc::new(
            Model::builder()
                .with_id("investment")
                .with_registry(reg)
                .with_variables(vec![Variable::new("capacity", zero, ten)
                    .with_value_type(ValueType::Integer)])
                .with_objective(objective)
                .build()
                .unwrap(),
        );
        let component = Component::builder()
            .with_id("site")
            .with_model(model)
            .with_parameter_values(Vec::<(String, f64)>::new())
            .build()
            .unwrap();

        let filler = ComponentFiller::new(&component).unwrap();
        let pb = fill(&filler, &FillContext::new(0, 3));
        let capacity = pb.variable("site.capacity").unwrap();
        assert_eq!(pb.variable_count(), 1);
        assert!(pb.is_integer(capacity).unwrap());
        // Objective does not vary in time: a single term.
        assert_eq!(pb.objective_coefficient(capacity), 2.0);
    }

    #[test]
    fn test_bool_bounds_are_clamped() {
        let mut reg = NodeRegistry::new();
        let lower = reg.literal(-5.0);
        let upper = reg.literal(5.0);
        let model = Arc::new(
            Model::builder()
                .with_id("switch")
                .with_registry(reg)
                .with_variables(vec![
                    Variable::new("on", lower, upper).with_value_type(ValueType::Bool)
                ])
                .build()
                .unwrap(),
        );
        let component = Component::builder()
            .with_id("s")
            .with_model(model)
            .with_parameter_values(Vec::<(String, f64)>::new())
            .build()
            .unwrap();
        let pb = fill(
            &ComponentFiller::new(&component).unwrap(),
            &FillContext::new(0, 0),
        );
        let on = pb.variable("s.on").unwrap();
        assert_eq!(pb.variable_bounds(on).unwrap(), (0.0, 1.0));
        assert!(pb.is_integer(on).unwrap());
    }

    #[test]
    fn test_non_linear_constraint_is_rejected() {
        let mut reg = NodeRegistry::new();
        let zero = reg.literal(0.0);
        let one = reg.literal(1.0);
        let x = reg.variable("x", TimeIndex::ConstantInTimeAndScenario);
        let y = reg.variable("y", TimeIndex::ConstantInTimeAndScenario);
        let xy = reg.multiply(x, y);
        let ct = reg.less_or_equal(xy, one);
        let model = Arc::new(
            Model::builder()
                .with_id("quadratic")
                .with_registry(reg)
                .with_variables(vec![Variable::new("x", zero, one), Variable::new("y", zero, one)])
                .with_constraints(vec![Constraint::new("product", ct)])
                .build()
                .unwrap(),
        );
        let component = Component::builder()
            .with_id("q")
            .with_model(model)
            .with_parameter_values(Vec::<(String, f64)>::new())
            .build()
            .unwrap();

        let err = ComponentFiller::new(&component).err().unwrap();
        assert_eq!(
            err,
            FillError::NonLinear {
                model: "quadratic".into(),
                component: "q".into(),
                field: "product".into(),
            }
        );
    }

    #[test]
    fn test_unknown_foreign_variable() {
        let mut reg = NodeRegistry::new();
        let zero = reg.literal(0.0);
        let one = reg.literal(1.0);
        let x = reg.variable("x", TimeIndex::ConstantInTimeAndScenario);
        let other = reg.component_variable("missing", "flow");
        let sum = reg.sum(x, other);
        let ct = reg.equal(sum, one);
        let model = Arc::new(
            Model::builder()
                .with_id("link")
                .with_registry(reg)
                .with_variables(vec![Variable::new("x", zero, one)])
                .with_constraints(vec![Constraint::new("balance", ct)])
                .build()
                .unwrap(),
        );
        let component = Component::builder()
            .with_id("l")
            .with_model(model)
            .with_parameter_values(Vec::<(String, f64)>::new())
            .build()
            .unwrap();
        let filler = ComponentFiller::new(&component).unwrap();

        let mut pb = MipProblem::new("test");
        let data = LinearProblemData::default();
        let ctx = FillContext::new(0, 0);
        filler.add_variables(&mut pb, &data, &ctx).unwrap();
        let err = filler.add_constraints(&mut pb, &data, &ctx).unwrap_err();
        assert!(matches!(err, FillError::UnknownVariable { ref variable, .. } if variable == "missing.flow"));
    }
}
