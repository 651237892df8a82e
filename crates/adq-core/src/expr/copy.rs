//! Deep copies of expression trees across registries.

use std::collections::HashMap;

use super::{Node, NodeId, NodeRegistry};

/// Identifies a `component.field` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub component: String,
    pub field: String,
}

impl FieldRef {
    pub fn new(component: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            field: field.into(),
        }
    }
}

/// Copies a tree from `source` into `target`, replacing the component
/// variables listed in `substitutions` by subtrees already present in
/// `target`. With no substitutions this is a plain deep copy.
pub struct SubstitutionVisitor<'a> {
    source: &'a NodeRegistry,
    target: &'a mut NodeRegistry,
    substitutions: &'a HashMap<FieldRef, NodeId>,
}

impl<'a> SubstitutionVisitor<'a> {
    pub fn new(
        source: &'a NodeRegistry,
        target: &'a mut NodeRegistry,
        substitutions: &'a HashMap<FieldRef, NodeId>,
    ) -> Self {
        Self {
            source,
            target,
            substitutions,
        }
    }

    pub fn visit(&mut self, id: NodeId) -> NodeId {
        let source = self.source;
        let node = match &source[id] {
            Node::ComponentVariable { component, field } => {
                let key = FieldRef::new(component.as_str(), field.as_str());
                if let Some(&replacement) = self.substitutions.get(&key) {
                    return replacement;
                }
                Node::ComponentVariable {
                    component: component.clone(),
                    field: field.clone(),
                }
            }
            Node::Negation(child) => Node::Negation(self.visit(*child)),
            Node::Sum(l, r) => {
                let (l, r) = (*l, *r);
                Node::Sum(self.visit(l), self.visit(r))
            }
            Node::Subtraction(l, r) => {
                let (l, r) = (*l, *r);
                Node::Subtraction(self.visit(l), self.visit(r))
            }
            Node::Multiplication(l, r) => {
                let (l, r) = (*l, *r);
                Node::Multiplication(self.visit(l), self.visit(r))
            }
            Node::Division(l, r) => {
                let (l, r) = (*l, *r);
                Node::Division(self.visit(l), self.visit(r))
            }
            Node::Comparison { op, left, right } => {
                let (op, left, right) = (*op, *left, *right);
                Node::Comparison {
                    op,
                    left: self.visit(left),
                    right: self.visit(right),
                }
            }
            leaf @ (Node::Literal(_)
            | Node::Parameter { .. }
            | Node::Variable { .. }
            | Node::PortField { .. }
            | Node::PortFieldSum { .. }
            | Node::ComponentParameter { .. }) => leaf.clone(),
        };
        self.target.push(node)
    }
}

/// Deep-copies the tree rooted at `root` into `target`.
pub fn clone_into(source: &NodeRegistry, root: NodeId, target: &mut NodeRegistry) -> NodeId {
    let none = HashMap::new();
    SubstitutionVisitor::new(source, target, &none).visit(root)
}
