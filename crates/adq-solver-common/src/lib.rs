//! Linear problem sink and solver backends for adq.
//!
//! Fillers write variables, constraints and objective terms into a
//! [`LinearProblem`]. The in-memory implementation, [`MipProblem`], is then
//! handed to a [`SolverBackend`] which returns a [`MipSolution`].
//!
//! # Backends
//!
//! | Backend | Problem Type | Feature |
//! |---------|--------------|---------|
//! | Clarabel | LP (integer problems refused) | always available |
//! | HiGHS | LP/MIP | `solver-highs` |
//!
//! Backends are looked up by name with [`backend_by_name`], which is how the
//! configuration layer selects one.
//!
//! # Example
//!
//! ```
//! use adq_solver_common::{backend_by_name, LinearProblem, MipProblem, MipStatus, SolveParams};
//!
//! let mut pb = MipProblem::new("example");
//! let x = pb.add_num_variable(0.0, 10.0, "x")?;
//! let c = pb.add_constraint(1.0, 1.0, "c")?;
//! pb.set_coefficient(c, x, 1.0)?;
//! pb.set_objective_coefficient(x, 1.0)?;
//!
//! let backend = backend_by_name("clarabel")?;
//! let solution = pb.solve(backend.as_ref(), &SolveParams::default())?;
//! assert_eq!(solution.status(), MipStatus::Optimal);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backend;
pub mod clarabel;
pub mod error;
#[cfg(feature = "solver-highs")]
pub mod highs;
pub mod mps;
pub mod problem;
pub mod solution;

pub use backend::{available_backends, backend_by_name, SolveParams, SolverBackend};
pub use clarabel::ClarabelBackend;
pub use error::{LinearProblemError, ProblemResult, SolverError, SolverResult};
#[cfg(feature = "solver-highs")]
pub use highs::HighsBackend;
pub use mps::{write_mps, write_mps_file};
pub use problem::{Column, ConstraintId, LinearProblem, MipProblem, ObjectiveSense, Row, VarId};
pub use solution::{MipSolution, MipStatus};
