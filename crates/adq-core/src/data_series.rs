//! Scenario-indexed time series and scenario-group resolution.
//!
//! A [`TimeSeriesSet`] is a rectangular table: one column per rank, one row
//! per hour. A scenario group maps scenario numbers to ranks, so reading a
//! value for `(series, group, scenario, hour)` is a two-step lookup:
//!
//! ```text
//! rank  = groups[group][scenario]
//! value = series[series_id].columns[rank][hour]
//! ```
//!
//! Repositories are filled once before a run, then shared read-only
//! (`&LinearProblemData`) with the fillers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Lookup and population failures of the data-series layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataSeriesError {
    #[error("Time series set '{name}' expects columns of size {expected}, got {actual}")]
    WrongSize {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Time series set '{0}' is empty")]
    EmptySeries(String),

    #[error("Data series repository is empty")]
    RepositoryEmpty,

    #[error("Data series '{0}' does not exist")]
    SeriesNotFound(String),

    #[error("Data series '{0}' already exists")]
    SeriesAlreadyExists(String),

    #[error("Scenario group '{0}' already exists in group repo.")]
    GroupAlreadyExists(String),

    #[error("Scenario group '{0}' does not exist in group repo.")]
    GroupNotFound(String),

    #[error("In scenario group '{group}', scenario '{scenario}' does not exist.")]
    ScenarioNotInGroup { group: String, scenario: usize },

    #[error("Time series set '{name}': rank {rank} is out of range (width {width})")]
    RankOutOfRange {
        name: String,
        rank: usize,
        width: usize,
    },

    #[error("Time series set '{name}': hour {hour} is out of range (height {height})")]
    HourOutOfRange {
        name: String,
        hour: usize,
        height: usize,
    },
}

pub type DataSeriesResult<T> = Result<T, DataSeriesError>;

/// A named table of scalar series sharing one height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesSet {
    name: String,
    height: usize,
    columns: Vec<Vec<f64>>,
}

impl TimeSeriesSet {
    pub fn new(name: impl Into<String>, height: usize) -> Self {
        Self {
            name: name.into(),
            height,
            columns: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of ranks (columns).
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Appends one column; its length must equal the set height.
    pub fn add(&mut self, column: Vec<f64>) -> DataSeriesResult<()> {
        if column.len() != self.height {
            return Err(DataSeriesError::WrongSize {
                name: self.name.clone(),
                expected: self.height,
                actual: column.len(),
            });
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn with_column(mut self, column: Vec<f64>) -> DataSeriesResult<Self> {
        self.add(column)?;
        Ok(self)
    }

    pub fn get_data(&self, rank: usize, hour: usize) -> DataSeriesResult<f64> {
        if self.columns.is_empty() {
            return Err(DataSeriesError::EmptySeries(self.name.clone()));
        }
        let column = self
            .columns
            .get(rank)
            .ok_or_else(|| DataSeriesError::RankOutOfRange {
                name: self.name.clone(),
                rank,
                width: self.columns.len(),
            })?;
        column
            .get(hour)
            .copied()
            .ok_or_else(|| DataSeriesError::HourOutOfRange {
                name: self.name.clone(),
                hour,
                height: self.height,
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSeriesRepository {
    series: HashMap<String, TimeSeriesSet>,
}

impl DataSeriesRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Registers a series under its own name.
    pub fn add_data_series(&mut self, series: TimeSeriesSet) -> DataSeriesResult<()> {
        if self.series.contains_key(series.name()) {
            return Err(DataSeriesError::SeriesAlreadyExists(series.name().to_string()));
        }
        debug!(
            series = series.name(),
            height = series.height(),
            width = series.width(),
            "Registered data series"
        );
        self.series.insert(series.name().to_string(), series);
        Ok(())
    }

    pub fn get_data_series(&self, id: &str) -> DataSeriesResult<&TimeSeriesSet> {
        if self.series.is_empty() {
            return Err(DataSeriesError::RepositoryEmpty);
        }
        self.series
            .get(id)
            .ok_or_else(|| DataSeriesError::SeriesNotFound(id.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioGroupRepository {
    groups: HashMap<String, HashMap<usize, usize>>,
}

impl ScenarioGroupRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Registers a group from `(scenario, rank)` pairs.
    pub fn add_scenario_group(
        &mut self,
        group: impl Into<String>,
        pairs: impl IntoIterator<Item = (usize, usize)>,
    ) -> DataSeriesResult<()> {
        let group = group.into();
        if self.groups.contains_key(&group) {
            return Err(DataSeriesError::GroupAlreadyExists(group));
        }
        let ranks: HashMap<usize, usize> = pairs.into_iter().collect();
        debug!(group = %group, scenarios = ranks.len(), "Registered scenario group");
        self.groups.insert(group, ranks);
        Ok(())
    }

    pub fn get_rank(&self, group: &str, scenario: usize) -> DataSeriesResult<usize> {
        let ranks = self
            .groups
            .get(group)
            .ok_or_else(|| DataSeriesError::GroupNotFound(group.to_string()))?;
        ranks
            .get(&scenario)
            .copied()
            .ok_or_else(|| DataSeriesError::ScenarioNotInGroup {
                group: group.to_string(),
                scenario,
            })
    }
}

/// Everything a filler may read while building a problem.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearProblemData {
    series: DataSeriesRepository,
    groups: ScenarioGroupRepository,
}

impl LinearProblemData {
    pub fn new(series: DataSeriesRepository, groups: ScenarioGroupRepository) -> Self {
        Self { series, groups }
    }

    pub fn series(&self) -> &DataSeriesRepository {
        &self.series
    }

    pub fn groups(&self) -> &ScenarioGroupRepository {
        &self.groups
    }

    pub fn get_data(
        &self,
        series_id: &str,
        group: &str,
        scenario: usize,
        hour: usize,
    ) -> DataSeriesResult<f64> {
        let series = self.series.get_data_series(series_id)?;
        let rank = self.groups.get_rank(group, scenario)?;
        series.get_data(rank, hour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_series() -> TimeSeriesSet {
        TimeSeriesSet::new("load", 3)
            .with_column(vec![1.0, 2.0, 3.0])
            .unwrap()
            .with_column(vec![10.0, 20.0, 30.0])
            .unwrap()
    }

    #[test]
    fn test_get_data_bounds() {
        let series = load_series();
        assert_eq!(series.get_data(1, 2).unwrap(), 30.0);
        assert_eq!(series.get_data(0, 0).unwrap(), 1.0);
        assert!(matches!(
            series.get_data(0, 3),
            Err(DataSeriesError::HourOutOfRange { hour: 3, .. })
        ));
        assert!(matches!(
            series.get_data(2, 0),
            Err(DataSeriesError::RankOutOfRange { rank: 2, .. })
        ));
    }

    #[test]
    fn test_wrong_size_and_empty() {
        let mut series = TimeSeriesSet::new("wind", 2);
        assert_eq!(
            series.get_data(0, 0),
            Err(DataSeriesError::EmptySeries("wind".into()))
        );
        assert!(matches!(
            series.add(vec![1.0]),
            Err(DataSeriesError::WrongSize {
                expected: 2,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_repository_errors() {
        let mut repo = DataSeriesRepository::new();
        assert_eq!(
            repo.get_data_series("load"),
            Err(DataSeriesError::RepositoryEmpty)
        );
        repo.add_data_series(load_series()).unwrap();
        assert_eq!(
            repo.add_data_series(load_series()),
            Err(DataSeriesError::SeriesAlreadyExists("load".into()))
        );
        assert_eq!(
            repo.get_data_series("solar"),
            Err(DataSeriesError::SeriesNotFound("solar".into()))
        );
    }

    #[test]
    fn test_scenario_groups() {
        let mut groups = ScenarioGroupRepository::new();
        groups.add_scenario_group("g", [(0, 1), (1, 0)]).unwrap();
        assert_eq!(groups.get_rank("g", 0).unwrap(), 1);

        let err = groups.add_scenario_group("g", Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "Scenario group 'g' already exists in group repo.");

        let err = groups.get_rank("h", 0).unwrap_err();
        assert_eq!(err.to_string(), "Scenario group 'h' does not exist in group repo.");

        let err = groups.get_rank("g", 5).unwrap_err();
        assert_eq!(
            err.to_string(),
            "In scenario group 'g', scenario '5' does not exist."
        );
    }

    #[test]
    fn test_two_step_lookup() {
        let mut series = DataSeriesRepository::new();
        series.add_data_series(load_series()).unwrap();
        let mut groups = ScenarioGroupRepository::new();
        groups.add_scenario_group("g", [(0, 1), (1, 0)]).unwrap();
        let data = LinearProblemData::new(series, groups);

        assert_eq!(data.get_data("load", "g", 0, 1).unwrap(), 20.0);
        assert_eq!(data.get_data("load", "g", 1, 1).unwrap(), 2.0);
        assert!(matches!(
            data.get_data("load", "g", 2, 1),
            Err(DataSeriesError::ScenarioNotInGroup { scenario: 2, .. })
        ));
        assert!(matches!(
            data.get_data("load", "missing", 0, 1),
            Err(DataSeriesError::GroupNotFound(_))
        ));
        assert!(matches!(
            data.get_data("load", "g", 0, 7),
            Err(DataSeriesError::HourOutOfRange { .. })
        ));
    }
}
