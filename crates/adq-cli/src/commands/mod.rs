pub mod export;
pub mod inspect;
pub mod solve;

use std::path::Path;

use adq_algo::LegacyProblem;
use anyhow::{bail, Context, Result};

/// Reads and validates a legacy problem JSON file.
pub fn load_problem(path: &Path) -> Result<LegacyProblem> {
    if !path.exists() {
        bail!("Problem file '{}' does not exist", path.display());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading problem '{}'", path.display()))?;
    let problem = LegacyProblem::from_json(&contents)
        .with_context(|| format!("loading problem '{}'", path.display()))?;
    Ok(problem)
}
