//! Free-format MPS export.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::problem::{LinearProblem, MipProblem, ObjectiveSense, Row};

const OBJECTIVE_ROW: &str = "COST";

fn row_type(row: &Row) -> &'static str {
    match (row.lower.is_finite(), row.upper.is_finite()) {
        (true, true) if row.lower == row.upper => "E",
        (_, true) => "L",
        (true, false) => "G",
        (false, false) => "N",
    }
}

fn row_rhs(row: &Row) -> Option<f64> {
    match row_type(row) {
        "E" | "L" => Some(row.upper),
        "G" => Some(row.lower),
        _ => None,
    }
}

/// Range of an `L` row that also carries a finite lower bound.
fn row_range(row: &Row) -> Option<f64> {
    (row_type(row) == "L" && row.lower.is_finite()).then(|| row.upper - row.lower)
}

/// Writes `problem` in free MPS format.
pub fn write_mps<W: Write>(problem: &MipProblem, mut out: W) -> io::Result<()> {
    writeln!(out, "NAME {}", problem.name())?;
    if problem.objective_sense() == ObjectiveSense::Maximize {
        writeln!(out, "OBJSENSE")?;
        writeln!(out, "    MAX")?;
    }

    writeln!(out, "ROWS")?;
    writeln!(out, " N {}", OBJECTIVE_ROW)?;
    for row in problem.rows() {
        writeln!(out, " {} {}", row_type(row), row.name)?;
    }

    // Column-major view of the coefficients.
    let mut entries: Vec<Vec<(&str, f64)>> = vec![Vec::new(); problem.columns().len()];
    for row in problem.rows() {
        for (&j, &a) in &row.coefficients {
            entries[j].push((row.name.as_str(), a));
        }
    }

    writeln!(out, "COLUMNS")?;
    let mut in_integer_block = false;
    let mut marker = 0;
    for (column, column_entries) in problem.columns().iter().zip(&entries) {
        if column.integer != in_integer_block {
            let kind = if column.integer { "INTORG" } else { "INTEND" };
            writeln!(out, "    MARKER{} 'MARKER' '{}'", marker, kind)?;
            marker += 1;
            in_integer_block = column.integer;
        }
        if column.objective != 0.0 {
            writeln!(out, "    {} {} {}", column.name, OBJECTIVE_ROW, column.objective)?;
        }
        for (row_name, a) in column_entries {
            writeln!(out, "    {} {} {}", column.name, row_name, a)?;
        }
        if column.objective == 0.0 && column_entries.is_empty() {
            // Columns must appear at least once to be declared.
            writeln!(out, "    {} {} 0", column.name, OBJECTIVE_ROW)?;
        }
    }
    if in_integer_block {
        writeln!(out, "    MARKER{} 'MARKER' 'INTEND'", marker)?;
    }

    writeln!(out, "RHS")?;
    for row in problem.rows() {
        if let Some(rhs) = row_rhs(row) {
            if rhs != 0.0 {
                writeln!(out, "    RHS {} {}", row.name, rhs)?;
            }
        }
    }

    let ranges: Vec<(&str, f64)> = problem
        .rows()
        .iter()
        .filter_map(|r| row_range(r).map(|range| (r.name.as_str(), range)))
        .collect();
    if !ranges.is_empty() {
        writeln!(out, "RANGES")?;
        for (name, range) in ranges {
            writeln!(out, "    RNG {} {}", name, range)?;
        }
    }

    writeln!(out, "BOUNDS")?;
    for column in problem.columns() {
        let name = &column.name;
        let (lower, upper) = (column.lower, column.upper);
        if lower == upper && lower.is_finite() {
            writeln!(out, " FX BND {} {}", name, lower)?;
            continue;
        }
        match (lower.is_finite(), upper.is_finite()) {
            (false, false) => writeln!(out, " FR BND {}", name)?,
            (false, true) => {
                writeln!(out, " MI BND {}", name)?;
                writeln!(out, " UP BND {} {}", name, upper)?;
            }
            (true, finite_upper) => {
                // A lone negative UP reads back as a free lower bound.
                if lower != 0.0 || column.integer || (finite_upper && upper < 0.0) {
                    writeln!(out, " LO BND {} {}", name, lower)?;
                }
                if finite_upper {
                    writeln!(out, " UP BND {} {}", name, upper)?;
                } else if column.integer {
                    writeln!(out, " PL BND {}", name)?;
                }
            }
        }
    }

    writeln!(out, "ENDATA")?;
    out.flush()
}

/// Writes `problem` to `path`, replacing any existing file.
pub fn write_mps_file(problem: &MipProblem, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_mps(problem, BufWriter::new(file))
}
