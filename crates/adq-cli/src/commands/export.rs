use std::path::Path;

use adq_algo::{FillContext, LegacyFiller, LinearProblemBuilder};
use adq_core::LinearProblemData;
use adq_solver_common::MipProblem;
use anyhow::{Context, Result};

use super::load_problem;

pub fn handle(problem: &Path, output: &Path, named: bool) -> Result<()> {
    let legacy = load_problem(problem)?;
    let filler = LegacyFiller::new(&legacy, named);
    let name = problem
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("adq");
    let mut mip = MipProblem::new(name);
    LinearProblemBuilder::new(vec![&filler]).build(
        &mut mip,
        &LinearProblemData::default(),
        &FillContext::new(0, 167),
    )?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    mip.write_mps(output)
        .with_context(|| format!("writing MPS '{}'", output.display()))?;
    println!("Wrote {}", output.display());
    Ok(())
}
