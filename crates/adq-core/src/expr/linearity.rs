//! Linearity classification of expressions.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use super::{Node, NodeId, NodeRegistry};

/// Linearity of an expression in its decision variables.
///
/// Ordered `Constant < Linear < NonLinear`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinearStatus {
    Constant,
    Linear,
    NonLinear,
}

impl LinearStatus {
    pub const ALL: [LinearStatus; 3] = [
        LinearStatus::Constant,
        LinearStatus::Linear,
        LinearStatus::NonLinear,
    ];

    pub fn is_linear(self) -> bool {
        self != LinearStatus::NonLinear
    }
}

impl fmt::Display for LinearStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinearStatus::Constant => write!(f, "constant"),
            LinearStatus::Linear => write!(f, "linear"),
            LinearStatus::NonLinear => write!(f, "non-linear"),
        }
    }
}

impl Add for LinearStatus {
    type Output = LinearStatus;

    fn add(self, rhs: LinearStatus) -> LinearStatus {
        self.max(rhs)
    }
}

impl Sub for LinearStatus {
    type Output = LinearStatus;

    fn sub(self, rhs: LinearStatus) -> LinearStatus {
        self + rhs
    }
}

impl Neg for LinearStatus {
    type Output = LinearStatus;

    fn neg(self) -> LinearStatus {
        self
    }
}

impl Mul for LinearStatus {
    type Output = LinearStatus;

    fn mul(self, rhs: LinearStatus) -> LinearStatus {
        match (self, rhs) {
            (LinearStatus::Constant, other) | (other, LinearStatus::Constant) => other,
            _ => LinearStatus::NonLinear,
        }
    }
}

impl Div for LinearStatus {
    type Output = LinearStatus;

    fn div(self, rhs: LinearStatus) -> LinearStatus {
        match rhs {
            LinearStatus::Constant => self,
            _ => LinearStatus::NonLinear,
        }
    }
}

/// Classifies a subtree as constant, linear or non-linear.
pub struct LinearityVisitor<'a> {
    registry: &'a NodeRegistry,
}

impl<'a> LinearityVisitor<'a> {
    pub fn new(registry: &'a NodeRegistry) -> Self {
        Self { registry }
    }

    pub fn visit(&self, id: NodeId) -> LinearStatus {
        match &self.registry[id] {
            Node::Literal(_)
            | Node::Parameter { .. }
            | Node::PortField { .. }
            | Node::PortFieldSum { .. }
            | Node::ComponentParameter { .. } => LinearStatus::Constant,
            Node::Variable { .. } | Node::ComponentVariable { .. } => LinearStatus::Linear,
            Node::Negation(child) => -self.visit(*child),
            Node::Sum(l, r) => self.visit(*l) + self.visit(*r),
            Node::Subtraction(l, r) => self.visit(*l) - self.visit(*r),
            Node::Multiplication(l, r) => self.visit(*l) * self.visit(*r),
            Node::Division(l, r) => self.visit(*l) / self.visit(*r),
            Node::Comparison { left, right, .. } => self.visit(*left) + self.visit(*right),
        }
    }
}

pub fn linearity(registry: &NodeRegistry, id: NodeId) -> LinearStatus {
    LinearityVisitor::new(registry).visit(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::TimeIndex;
    use LinearStatus::*;

    #[test]
    fn test_addition_commutes_and_subtraction_matches() {
        for x in LinearStatus::ALL {
            for y in LinearStatus::ALL {
                assert_eq!(x + y, y + x);
                assert_eq!(x - y, x + y);
            }
        }
        assert_eq!(Linear + NonLinear, NonLinear);
        assert_eq!(Constant + Linear, Linear);
    }

    #[test]
    fn test_multiplication_table() {
        assert_eq!(Linear * Linear, NonLinear);
        assert_eq!(Constant * Linear, Linear);
        assert_eq!(Linear * Constant, Linear);
        assert_eq!(Constant * Constant, Constant);
        assert_eq!(Constant * NonLinear, NonLinear);
        assert_eq!(NonLinear * Linear, NonLinear);
    }

    #[test]
    fn test_division_requires_constant_divisor() {
        assert_eq!(Linear / Constant, Linear);
        assert_eq!(Constant / Constant, Constant);
        assert_eq!(Linear / Linear, NonLinear);
        assert_eq!(Constant / Linear, NonLinear);
        assert_eq!(NonLinear / Constant, NonLinear);
    }

    #[test]
    fn test_negation_preserves_status() {
        for x in LinearStatus::ALL {
            assert_eq!(-x, x);
        }
    }

    #[test]
    fn test_visitor_on_linear_combination() {
        let mut registry = NodeRegistry::new();
        let ten = registry.literal(10.0);
        let x = registry.variable("x", TimeIndex::VaryingInTimeOnly);
        let twenty = registry.literal(20.0);
        let y = registry.component_variable("id", "y");
        let left = registry.multiply(ten, x);
        let right = registry.multiply(twenty, y);
        let sum = registry.sum(left, right);

        assert_eq!(linearity(&registry, sum), Linear);

        let product = registry.multiply(x, y);
        assert_eq!(linearity(&registry, product), NonLinear);

        let p = registry.parameter("p", TimeIndex::ConstantInTimeAndScenario);
        let port = registry.port_field("port", "flow");
        let constant = registry.sum(p, port);
        assert_eq!(linearity(&registry, constant), Constant);
    }
}
