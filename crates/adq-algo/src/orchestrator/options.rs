//! Solve options.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// When the problem is exported as MPS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MpsExportPolicy {
    #[default]
    Never,
    /// Only after both attempts failed.
    OnError,
    /// Before every solve, and again on failure.
    Always,
}

/// Length of the optimisation period named in export files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodGranularity {
    #[default]
    Weekly,
    Daily,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveOptions {
    /// Backend name, see `adq_solver_common::available_backends`.
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Forward solver logs.
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub max_iterations: Option<u32>,
    #[serde(default)]
    pub export_mps: MpsExportPolicy,
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
    /// Use the problem's own element names instead of positional ones.
    #[serde(default)]
    pub named_problems: bool,
    #[serde(default)]
    pub granularity: PeriodGranularity,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            verbose: false,
            max_iterations: None,
            export_mps: MpsExportPolicy::default(),
            export_dir: default_export_dir(),
            named_problems: false,
            granularity: PeriodGranularity::default(),
        }
    }
}

fn default_backend() -> String {
    "clarabel".to_string()
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("mps")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let options: SolveOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, SolveOptions::default());
        assert_eq!(options.backend, "clarabel");
        assert_eq!(options.export_mps, MpsExportPolicy::Never);
    }

    #[test]
    fn test_policy_names() {
        let options: SolveOptions =
            serde_json::from_str(r#"{"export_mps": "on_error", "granularity": "daily"}"#).unwrap();
        assert_eq!(options.export_mps, MpsExportPolicy::OnError);
        assert_eq!(options.granularity, PeriodGranularity::Daily);
    }
}
