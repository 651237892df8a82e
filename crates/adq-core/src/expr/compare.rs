//! Structural equality of expression trees.

use super::{Node, NodeId, NodeRegistry};

/// Compares two trees node by node. The trees may live in different registries.
pub struct CompareVisitor<'a> {
    left: &'a NodeRegistry,
    right: &'a NodeRegistry,
}

impl<'a> CompareVisitor<'a> {
    pub fn new(left: &'a NodeRegistry, right: &'a NodeRegistry) -> Self {
        Self { left, right }
    }

    pub fn visit(&self, left: NodeId, right: NodeId) -> bool {
        match (&self.left[left], &self.right[right]) {
            (Node::Literal(a), Node::Literal(b)) => a == b,
            (
                Node::Parameter {
                    id: a,
                    time_index: ta,
                },
                Node::Parameter {
                    id: b,
                    time_index: tb,
                },
            )
            | (
                Node::Variable {
                    id: a,
                    time_index: ta,
                },
                Node::Variable {
                    id: b,
                    time_index: tb,
                },
            ) => a == b && ta == tb,
            (Node::Negation(a), Node::Negation(b)) => self.visit(*a, *b),
            (Node::Sum(la, ra), Node::Sum(lb, rb))
            | (Node::Subtraction(la, ra), Node::Subtraction(lb, rb))
            | (Node::Multiplication(la, ra), Node::Multiplication(lb, rb))
            | (Node::Division(la, ra), Node::Division(lb, rb)) => {
                self.visit(*la, *lb) && self.visit(*ra, *rb)
            }
            (
                Node::Comparison {
                    op: oa,
                    left: la,
                    right: ra,
                },
                Node::Comparison {
                    op: ob,
                    left: lb,
                    right: rb,
                },
            ) => oa == ob && self.visit(*la, *lb) && self.visit(*ra, *rb),
            (
                Node::PortField {
                    port: pa,
                    field: fa,
                },
                Node::PortField {
                    port: pb,
                    field: fb,
                },
            )
            | (
                Node::PortFieldSum {
                    port: pa,
                    field: fa,
                },
                Node::PortFieldSum {
                    port: pb,
                    field: fb,
                },
            )
            | (
                Node::ComponentVariable {
                    component: pa,
                    field: fa,
                },
                Node::ComponentVariable {
                    component: pb,
                    field: fb,
                },
            )
            | (
                Node::ComponentParameter {
                    component: pa,
                    field: fa,
                },
                Node::ComponentParameter {
                    component: pb,
                    field: fb,
                },
            ) => pa == pb && fa == fb,
            _ => false,
        }
    }
}

pub fn structurally_equal(
    left: &NodeRegistry,
    left_root: NodeId,
    right: &NodeRegistry,
    right_root: NodeId,
) -> bool {
    CompareVisitor::new(left, right).visit(left_root, right_root)
}
