//! Bridge for array-oriented problem descriptions.
//!
//! A [`LegacyProblem`] is a complete linear problem already laid out as flat
//! arrays. [`LegacyFiller`] lets it take part in the same
//! [`LinearProblemBuilder`](crate::LinearProblemBuilder) pipeline as
//! component fillers, and [`LegacyResults`] receives the solved values.

mod filler;
mod problem;

pub use filler::{LegacyFiller, LegacyIndex};
pub use problem::{BoundKind, LegacyProblem, LegacyResults, Sense};
