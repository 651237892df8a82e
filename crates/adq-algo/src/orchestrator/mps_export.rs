//! Conditional MPS export.

use std::fs;
use std::path::{Path, PathBuf};

use adq_solver_common::MipProblem;
use tracing::info;

use super::options::MpsExportPolicy;
use crate::error::SolveError;

/// Chooses the writer for the "before solve" and "on error" export points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MpsWriterFactory {
    policy: MpsExportPolicy,
    directory: PathBuf,
    file_name: String,
}

impl MpsWriterFactory {
    pub fn new(policy: MpsExportPolicy, directory: impl Into<PathBuf>, file_name: String) -> Self {
        Self {
            policy,
            directory: directory.into(),
            file_name,
        }
    }

    /// Writer run before every solve: exports only when the policy is `Always`.
    pub fn create(&self) -> MpsWriter {
        match self.policy {
            MpsExportPolicy::Always => self.full(),
            _ => MpsWriter::Null,
        }
    }

    /// Writer run after both attempts failed.
    pub fn create_on_optimization_error(&self) -> MpsWriter {
        match self.policy {
            MpsExportPolicy::Never => MpsWriter::Null,
            MpsExportPolicy::OnError | MpsExportPolicy::Always => self.full(),
        }
    }

    fn full(&self) -> MpsWriter {
        MpsWriter::Full {
            path: self.directory.join(&self.file_name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MpsWriter {
    Null,
    Full { path: PathBuf },
}

impl MpsWriter {
    /// Writes `problem` if this writer exports; returns the written path.
    pub fn run_if_needed(&self, problem: &MipProblem) -> Result<Option<PathBuf>, SolveError> {
        let MpsWriter::Full { path } = self else {
            return Ok(None);
        };
        let export_err = |source| SolveError::Export {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(export_err)?;
        }
        problem.write_mps(path).map_err(export_err)?;
        info!(path = %path.display(), "Problem exported");
        Ok(Some(path.clone()))
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            MpsWriter::Null => None,
            MpsWriter::Full { path } => Some(path),
        }
    }
}
