use std::path::Path;

use anyhow::Result;

use super::load_problem;

pub fn handle(problem: &Path) -> Result<()> {
    let legacy = load_problem(problem)?;
    let integers = (0..legacy.variable_count())
        .filter(|&i| legacy.is_integer(i))
        .count();

    println!("Problem {}:", problem.display());
    println!("  Variables   : {}", legacy.variable_count());
    println!("  Integers    : {integers}");
    println!("  Constraints : {}", legacy.constraint_count());
    println!("  Non-zeros   : {}", legacy.coefficients.len());
    println!("  Type        : {}", if legacy.is_mip() { "MIP" } else { "LP" });
    Ok(())
}
