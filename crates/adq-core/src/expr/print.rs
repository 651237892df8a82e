//! Human-readable rendering of expression trees.

use std::fmt;

use super::{Node, NodeId, NodeRegistry};

pub struct PrintVisitor<'a> {
    registry: &'a NodeRegistry,
}

impl<'a> PrintVisitor<'a> {
    pub fn new(registry: &'a NodeRegistry) -> Self {
        Self { registry }
    }

    pub fn visit(&self, id: NodeId) -> String {
        match &self.registry[id] {
            Node::Literal(value) => format!("{value:.6}"),
            Node::Parameter { id, .. } | Node::Variable { id, .. } => id.clone(),
            Node::Negation(child) => format!("-({})", self.visit(*child)),
            Node::Sum(l, r) => format!("({}+{})", self.visit(*l), self.visit(*r)),
            Node::Subtraction(l, r) => format!("({}-{})", self.visit(*l), self.visit(*r)),
            Node::Multiplication(l, r) => format!("({}*{})", self.visit(*l), self.visit(*r)),
            Node::Division(l, r) => format!("({}/{})", self.visit(*l), self.visit(*r)),
            Node::Comparison { op, left, right } => {
                format!("{}{}{}", self.visit(*left), op.symbol(), self.visit(*right))
            }
            Node::PortField { port, field } => format!("{port}.{field}"),
            Node::PortFieldSum { port, field } => format!("sum({port}.{field})"),
            Node::ComponentVariable { component, field }
            | Node::ComponentParameter { component, field } => format!("{component}.{field}"),
        }
    }
}

/// `Display` adapter for a tree, see [`NodeRegistry::display`].
pub struct ExprDisplay<'a> {
    registry: &'a NodeRegistry,
    root: NodeId,
}

impl fmt::Display for ExprDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&PrintVisitor::new(self.registry).visit(self.root))
    }
}

impl NodeRegistry {
    pub fn display(&self, root: NodeId) -> ExprDisplay<'_> {
        ExprDisplay {
            registry: self,
            root,
        }
    }
}
