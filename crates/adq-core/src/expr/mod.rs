//! Expression trees and their analysis visitors.
//!
//! Expressions are stored in a [`NodeRegistry`] arena and referenced by
//! [`NodeId`]. Every analysis is a visitor that matches exhaustively on
//! [`Node`]:
//!
//! | visitor                 | result                |
//! |-------------------------|-----------------------|
//! | [`PrintVisitor`]        | `String`              |
//! | [`TimeIndexVisitor`]    | [`TimeIndex`]         |
//! | [`LinearityVisitor`]    | [`LinearStatus`]      |
//! | [`EvalVisitor`]         | [`LinearExpression`]  |
//! | [`CompareVisitor`]      | `bool`                |
//! | [`SubstitutionVisitor`] | [`NodeId`] (copy)     |

mod compare;
mod copy;
mod eval;
mod linear;
mod linearity;
mod node;
mod print;
mod time_index;

pub use compare::{structurally_equal, CompareVisitor};
pub use copy::{clone_into, FieldRef, SubstitutionVisitor};
pub use eval::{
    read_linear_constraint, read_linear_expression, read_linear_objective, ConstantParameters,
    EvalVisitor, ParameterResolver, TimeStepScenario,
};
pub use linear::{EvalError, LinearConstraint, LinearExpression, OBJECTIVE_OFFSET_TOLERANCE};
pub use linearity::{linearity, LinearStatus, LinearityVisitor};
pub use node::{ComparisonOp, Node, NodeId, NodeRegistry};
pub use print::{ExprDisplay, PrintVisitor};
pub use time_index::{time_index, TimeIndex, TimeIndexVisitor};
