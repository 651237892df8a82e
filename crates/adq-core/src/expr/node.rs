//! Expression nodes and the arena that owns them.

use std::ops::Index;

use serde::{Deserialize, Serialize};

use super::TimeIndex;

/// Index of a node inside its [`NodeRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Comparison operator of a constraint expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOp {
    Equal,
    LessOrEqual,
    GreaterOrEqual,
}

impl ComparisonOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOp::Equal => "==",
            ComparisonOp::LessOrEqual => "<=",
            ComparisonOp::GreaterOrEqual => ">=",
        }
    }
}

/// One node of an expression tree.
///
/// Children are [`NodeId`]s into the registry that created the node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Literal(f64),
    Parameter { id: String, time_index: TimeIndex },
    Variable { id: String, time_index: TimeIndex },
    Negation(NodeId),
    Sum(NodeId, NodeId),
    Subtraction(NodeId, NodeId),
    Multiplication(NodeId, NodeId),
    Division(NodeId, NodeId),
    Comparison {
        op: ComparisonOp,
        left: NodeId,
        right: NodeId,
    },
    PortField { port: String, field: String },
    PortFieldSum { port: String, field: String },
    ComponentVariable { component: String, field: String },
    ComponentParameter { component: String, field: String },
}

impl Node {
    /// Direct children, left to right.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Node::Negation(child) => vec![*child],
            Node::Sum(l, r)
            | Node::Subtraction(l, r)
            | Node::Multiplication(l, r)
            | Node::Division(l, r)
            | Node::Comparison {
                left: l, right: r, ..
            } => vec![*l, *r],
            Node::Literal(_)
            | Node::Parameter { .. }
            | Node::Variable { .. }
            | Node::PortField { .. }
            | Node::PortFieldSum { .. }
            | Node::ComponentVariable { .. }
            | Node::ComponentParameter { .. } => Vec::new(),
        }
    }
}

/// Arena owning every node of the expressions of one model or problem.
///
/// Nodes are append-only: once created a node never changes, so a tree
/// rooted at any [`NodeId`] is immutable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeRegistry {
    nodes: Vec<Node>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node for `id`, or `None` if `id` was not issued by this registry.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// First node with a child that was not created before it, which is how
    /// ids from another registry (or a hand-edited serialized one) show up.
    /// Visitors index children directly, so such a registry must be rejected.
    pub fn dangling_node(&self) -> Option<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .find(|(i, node)| node.children().iter().any(|child| child.0 >= *i))
            .map(|(i, _)| NodeId(i))
    }

    /// Children must already belong to this registry.
    pub(crate) fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn literal(&mut self, value: f64) -> NodeId {
        self.push(Node::Literal(value))
    }

    pub fn parameter(&mut self, id: impl Into<String>, time_index: TimeIndex) -> NodeId {
        self.push(Node::Parameter {
            id: id.into(),
            time_index,
        })
    }

    pub fn variable(&mut self, id: impl Into<String>, time_index: TimeIndex) -> NodeId {
        self.push(Node::Variable {
            id: id.into(),
            time_index,
        })
    }

    pub fn negate(&mut self, child: NodeId) -> NodeId {
        self.push(Node::Negation(child))
    }

    pub fn sum(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.push(Node::Sum(left, right))
    }

    pub fn subtract(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.push(Node::Subtraction(left, right))
    }

    pub fn multiply(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.push(Node::Multiplication(left, right))
    }

    pub fn divide(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.push(Node::Division(left, right))
    }

    pub fn compare(&mut self, op: ComparisonOp, left: NodeId, right: NodeId) -> NodeId {
        self.push(Node::Comparison { op, left, right })
    }

    pub fn equal(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.compare(ComparisonOp::Equal, left, right)
    }

    pub fn less_or_equal(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.compare(ComparisonOp::LessOrEqual, left, right)
    }

    pub fn greater_or_equal(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.compare(ComparisonOp::GreaterOrEqual, left, right)
    }

    pub fn port_field(&mut self, port: impl Into<String>, field: impl Into<String>) -> NodeId {
        self.push(Node::PortField {
            port: port.into(),
            field: field.into(),
        })
    }

    pub fn port_field_sum(&mut self, port: impl Into<String>, field: impl Into<String>) -> NodeId {
        self.push(Node::PortFieldSum {
            port: port.into(),
            field: field.into(),
        })
    }

    pub fn component_variable(
        &mut self,
        component: impl Into<String>,
        field: impl Into<String>,
    ) -> NodeId {
        self.push(Node::ComponentVariable {
            component: component.into(),
            field: field.into(),
        })
    }

    pub fn component_parameter(
        &mut self,
        component: impl Into<String>,
        field: impl Into<String>,
    ) -> NodeId {
        self.push(Node::ComponentParameter {
            component: component.into(),
            field: field.into(),
        })
    }

    /// Left-folds `terms` into nested sums. The empty sum is the literal `0`.
    pub fn sum_of(&mut self, terms: &[NodeId]) -> NodeId {
        match terms.split_first() {
            None => self.literal(0.0),
            Some((first, rest)) => rest
                .iter()
                .fold(*first, |acc, &term| self.sum(acc, term)),
        }
    }
}

impl Index<NodeId> for NodeRegistry {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_issues_sequential_ids() {
        let mut registry = NodeRegistry::new();
        let a = registry.literal(1.0);
        let b = registry.variable("x", TimeIndex::VaryingInTimeOnly);
        let sum = registry.sum(a, b);

        assert_eq!(registry.len(), 3);
        assert_eq!(sum.index(), 2);
        assert_eq!(registry[sum], Node::Sum(a, b));
        assert!(registry.contains(b));
    }

    #[test]
    fn test_foreign_id_is_not_found() {
        let mut other = NodeRegistry::new();
        other.literal(1.0);
        let foreign = other.literal(2.0);

        let registry = NodeRegistry::new();
        assert!(registry.get(foreign).is_none());
        assert!(!registry.contains(foreign));
    }

    #[test]
    fn test_dangling_children_are_detected() {
        let mut other = NodeRegistry::new();
        other.literal(1.0);
        other.literal(2.0);
        let foreign = other.literal(3.0);

        let mut registry = NodeRegistry::new();
        let x = registry.variable("x", TimeIndex::ConstantInTimeAndScenario);
        registry.negate(x);
        assert_eq!(registry.dangling_node(), None);

        let bad = registry.sum(x, foreign);
        assert_eq!(registry.dangling_node(), Some(bad));
        assert_eq!(registry[bad].children(), vec![x, foreign]);

        let json = r#"{"nodes":[{"literal":1.0},{"negation":1}]}"#;
        let cyclic: NodeRegistry = serde_json::from_str(json).unwrap();
        assert_eq!(cyclic.dangling_node().map(NodeId::index), Some(1));
    }

    #[test]
    fn test_sum_of() {
        let mut registry = NodeRegistry::new();
        let empty = registry.sum_of(&[]);
        assert_eq!(registry[empty], Node::Literal(0.0));

        let x = registry.variable("x", TimeIndex::ConstantInTimeAndScenario);
        let single = registry.sum_of(&[x]);
        assert_eq!(single, x);

        let y = registry.variable("y", TimeIndex::ConstantInTimeAndScenario);
        let z = registry.variable("z", TimeIndex::ConstantInTimeAndScenario);
        let total = registry.sum_of(&[x, y, z]);
        match &registry[total] {
            Node::Sum(left, right) => {
                assert_eq!(*right, z);
                assert_eq!(registry[*left], Node::Sum(x, y));
            }
            other => panic!("expected a sum, got {other:?}"),
        }
    }

    #[test]
    fn test_registry_serde_roundtrip() {
        let mut registry = NodeRegistry::new();
        let p = registry.parameter("cost", TimeIndex::VaryingInScenarioOnly);
        let x = registry.variable("x", TimeIndex::VaryingInTimeOnly);
        registry.multiply(p, x);

        let json = serde_json::to_string(&registry).unwrap();
        let back: NodeRegistry = serde_json::from_str(&json).unwrap();
        assert_eq!(registry, back);
    }
}
