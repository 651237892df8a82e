//! Components: a model bound to concrete parameter values.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data_series::LinearProblemData;
use crate::expr::{EvalError, ParameterResolver, TimeStepScenario};
use crate::model::Model;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComponentError {
    #[error("Component has no id")]
    MissingId,

    #[error("Component '{0}' has no model")]
    MissingModel(String),

    #[error("Component '{component}' does not give a value to parameter '{parameter}' of model '{model}'")]
    MissingParameter {
        component: String,
        model: String,
        parameter: String,
    },

    #[error("Component '{component}' gives a value to '{parameter}', which is not a parameter of model '{model}'")]
    UnexpectedParameter {
        component: String,
        model: String,
        parameter: String,
    },

    #[error("Parameter '{parameter}' not found in component '{component}'")]
    ParameterNotFound {
        component: String,
        parameter: String,
    },
}

/// Value bound to a model parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterValue {
    Constant(f64),
    /// Id of a series in the data-series repository, read through the
    /// component's scenario group.
    Series(String),
}

impl ParameterValue {
    pub fn series(id: impl Into<String>) -> Self {
        ParameterValue::Series(id.into())
    }

    pub fn as_constant(&self) -> Option<f64> {
        match self {
            ParameterValue::Constant(v) => Some(*v),
            ParameterValue::Series(_) => None,
        }
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Constant(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    id: String,
    model: Arc<Model>,
    parameter_values: BTreeMap<String, ParameterValue>,
    scenario_group: String,
}

impl Component {
    pub fn builder() -> ComponentBuilder {
        ComponentBuilder::default()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn scenario_group(&self) -> &str {
        &self.scenario_group
    }

    pub fn parameter_values(&self) -> &BTreeMap<String, ParameterValue> {
        &self.parameter_values
    }

    pub fn parameter_value(&self, parameter: &str) -> Result<&ParameterValue, ComponentError> {
        self.parameter_values
            .get(parameter)
            .ok_or_else(|| ComponentError::ParameterNotFound {
                component: self.id.clone(),
                parameter: parameter.to_string(),
            })
    }

    /// True when no parameter reads a data series.
    pub fn has_constant_parameters(&self) -> bool {
        self.parameter_values
            .values()
            .all(|v| matches!(v, ParameterValue::Constant(_)))
    }
}

#[derive(Debug, Default)]
pub struct ComponentBuilder {
    id: Option<String>,
    model: Option<Arc<Model>>,
    parameter_values: BTreeMap<String, ParameterValue>,
    scenario_group: String,
}

impl ComponentBuilder {
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_model(mut self, model: Arc<Model>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_parameter_values<K, V>(mut self, values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<ParameterValue>,
    {
        self.parameter_values = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    pub fn with_scenario_group(mut self, group: impl Into<String>) -> Self {
        self.scenario_group = group.into();
        self
    }

    /// Fails unless the bound parameters are exactly the model's parameters.
    pub fn build(self) -> Result<Component, ComponentError> {
        let id = self.id.ok_or(ComponentError::MissingId)?;
        let model = self
            .model
            .ok_or_else(|| ComponentError::MissingModel(id.clone()))?;

        for parameter in model.parameters() {
            if !self.parameter_values.contains_key(&parameter.id) {
                return Err(ComponentError::MissingParameter {
                    component: id,
                    model: model.id().to_string(),
                    parameter: parameter.id.clone(),
                });
            }
        }
        if let Some(extra) = self
            .parameter_values
            .keys()
            .find(|key| model.parameter(key).is_none())
        {
            return Err(ComponentError::UnexpectedParameter {
                component: id,
                model: model.id().to_string(),
                parameter: extra.clone(),
            });
        }

        Ok(Component {
            id,
            model,
            parameter_values: self.parameter_values,
            scenario_group: self.scenario_group,
        })
    }
}

/// Resolves the parameters of one component, reading series through
/// `data` with the component's scenario group.
pub struct ComponentParameters<'a> {
    component: &'a Component,
    data: &'a LinearProblemData,
}

impl<'a> ComponentParameters<'a> {
    pub fn new(component: &'a Component, data: &'a LinearProblemData) -> Self {
        Self { component, data }
    }
}

impl ParameterResolver for ComponentParameters<'_> {
    fn resolve(&self, parameter: &str, at: TimeStepScenario) -> Result<f64, EvalError> {
        let value = self.component.parameter_value(parameter).map_err(|_| {
            EvalError::ParameterNotInComponent {
                parameter: parameter.to_string(),
                component: self.component.id().to_string(),
            }
        })?;
        match value {
            ParameterValue::Constant(v) => Ok(*v),
            ParameterValue::Series(series) => Ok(self.data.get_data(
                series,
                self.component.scenario_group(),
                at.scenario,
                at.time_step,
            )?),
        }
    }
}
