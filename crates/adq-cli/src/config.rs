//! `adq.toml` configuration.
//!
//! ```toml
//! [solver]
//! backend = "clarabel"
//! max_iterations = 500
//!
//! [export]
//! policy = "on_error"
//! directory = "mps"
//!
//! [logging]
//! level = "info"
//! ```

use std::path::{Path, PathBuf};

use adq_algo::{MpsExportPolicy, PeriodGranularity, SolveOptions};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "adq.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AdqConfig {
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolverConfig {
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Forward solver output to stdout
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub max_iterations: Option<u32>,
    /// Give sink elements the names found in the problem file
    #[serde(default)]
    pub named_problems: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            verbose: false,
            max_iterations: None,
            named_problems: false,
        }
    }
}

fn default_backend() -> String {
    "clarabel".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportConfig {
    #[serde(default)]
    pub policy: MpsExportPolicy,
    #[serde(default = "default_export_dir")]
    pub directory: PathBuf,
    #[serde(default)]
    pub granularity: PeriodGranularity,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            policy: MpsExportPolicy::default(),
            directory: default_export_dir(),
            granularity: PeriodGranularity::default(),
        }
    }
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("mps")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AdqConfig {
    pub fn solve_options(&self) -> SolveOptions {
        SolveOptions {
            backend: self.solver.backend.clone(),
            verbose: self.solver.verbose,
            max_iterations: self.solver.max_iterations,
            export_mps: self.export.policy,
            export_dir: self.export.directory.clone(),
            named_problems: self.solver.named_problems,
            granularity: self.export.granularity,
        }
    }
}

/// Loads `path`, or `adq.toml` from the working directory.
///
/// An explicit path must exist; a missing default file yields the defaults.
pub fn load_config(path: Option<&Path>) -> Result<AdqConfig> {
    let path = match path {
        Some(path) if !path.exists() => bail!("Config file '{}' does not exist", path.display()),
        Some(path) => path,
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                debug!("No {DEFAULT_CONFIG_FILE} found, using defaults");
                return Ok(AdqConfig::default());
            }
            default
        }
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading config '{}'", path.display()))?;
    let config: AdqConfig = toml::from_str(&contents)
        .with_context(|| format!("parsing config '{}'", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: AdqConfig = toml::from_str("").unwrap();
        assert_eq!(config, AdqConfig::default());
        assert_eq!(config.solve_options(), SolveOptions::default());
    }

    #[test]
    fn test_sections_are_read() {
        let config: AdqConfig = toml::from_str(
            r#"
            [solver]
            backend = "highs"
            max_iterations = 50
            named_problems = true

            [export]
            policy = "on_error"
            directory = "out/mps"
            granularity = "daily"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        let options = config.solve_options();
        assert_eq!(options.backend, "highs");
        assert_eq!(options.max_iterations, Some(50));
        assert!(options.named_problems);
        assert_eq!(options.export_mps, MpsExportPolicy::OnError);
        assert_eq!(options.export_dir, PathBuf::from("out/mps"));
        assert_eq!(options.granularity, PeriodGranularity::Daily);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("adq.toml");
        std::fs::write(&path, "[export]\npolicy = \"always\"\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.export.policy, MpsExportPolicy::Always);
        assert_eq!(config.solver.backend, "clarabel");
    }
}
