//! Time/scenario dependency of expressions.

use std::collections::HashMap;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

use super::{Node, NodeId, NodeRegistry};

/// Whether a value may differ across time steps and/or scenarios.
///
/// Two independent flags (time, scenario) packed in two bits; [`BitOr`]
/// joins them, which makes the set a join-semilattice with
/// `ConstantInTimeAndScenario` as bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeIndex {
    #[default]
    ConstantInTimeAndScenario,
    VaryingInTimeOnly,
    VaryingInScenarioOnly,
    VaryingInTimeAndScenario,
}

const TIME_BIT: u8 = 0b01;
const SCENARIO_BIT: u8 = 0b10;

impl TimeIndex {
    pub const ALL: [TimeIndex; 4] = [
        TimeIndex::ConstantInTimeAndScenario,
        TimeIndex::VaryingInTimeOnly,
        TimeIndex::VaryingInScenarioOnly,
        TimeIndex::VaryingInTimeAndScenario,
    ];

    pub const fn from_flags(time: bool, scenario: bool) -> Self {
        match (time, scenario) {
            (false, false) => TimeIndex::ConstantInTimeAndScenario,
            (true, false) => TimeIndex::VaryingInTimeOnly,
            (false, true) => TimeIndex::VaryingInScenarioOnly,
            (true, true) => TimeIndex::VaryingInTimeAndScenario,
        }
    }

    const fn bits(self) -> u8 {
        match self {
            TimeIndex::ConstantInTimeAndScenario => 0,
            TimeIndex::VaryingInTimeOnly => TIME_BIT,
            TimeIndex::VaryingInScenarioOnly => SCENARIO_BIT,
            TimeIndex::VaryingInTimeAndScenario => TIME_BIT | SCENARIO_BIT,
        }
    }

    const fn from_bits(bits: u8) -> Self {
        Self::from_flags(bits & TIME_BIT != 0, bits & SCENARIO_BIT != 0)
    }

    pub const fn varies_in_time(self) -> bool {
        self.bits() & TIME_BIT != 0
    }

    pub const fn varies_in_scenario(self) -> bool {
        self.bits() & SCENARIO_BIT != 0
    }
}

impl BitOr for TimeIndex {
    type Output = TimeIndex;

    fn bitor(self, rhs: TimeIndex) -> TimeIndex {
        TimeIndex::from_bits(self.bits() | rhs.bits())
    }
}

impl BitOrAssign for TimeIndex {
    fn bitor_assign(&mut self, rhs: TimeIndex) {
        *self = *self | rhs;
    }
}

/// Infers the [`TimeIndex`] of a subtree.
///
/// Port and component references are not resolvable from the tree alone; their
/// index comes from `context`, keyed by node. A reference missing from the
/// context is assumed to vary in both dimensions.
pub struct TimeIndexVisitor<'a> {
    registry: &'a NodeRegistry,
    context: HashMap<NodeId, TimeIndex>,
}

impl<'a> TimeIndexVisitor<'a> {
    pub fn new(registry: &'a NodeRegistry) -> Self {
        Self {
            registry,
            context: HashMap::new(),
        }
    }

    pub fn with_context(registry: &'a NodeRegistry, context: HashMap<NodeId, TimeIndex>) -> Self {
        Self { registry, context }
    }

    pub fn visit(&self, id: NodeId) -> TimeIndex {
        match &self.registry[id] {
            Node::Literal(_) => TimeIndex::ConstantInTimeAndScenario,
            Node::Parameter { time_index, .. } | Node::Variable { time_index, .. } => *time_index,
            Node::Negation(child) => self.visit(*child),
            Node::Sum(l, r)
            | Node::Subtraction(l, r)
            | Node::Multiplication(l, r)
            | Node::Division(l, r)
            | Node::Comparison {
                left: l, right: r, ..
            } => self.visit(*l) | self.visit(*r),
            Node::PortField { .. }
            | Node::PortFieldSum { .. }
            | Node::ComponentVariable { .. }
            | Node::ComponentParameter { .. } => self
                .context
                .get(&id)
                .copied()
                .unwrap_or(TimeIndex::VaryingInTimeAndScenario),
        }
    }
}

/// Shorthand for `TimeIndexVisitor::new(registry).visit(id)`.
pub fn time_index(registry: &NodeRegistry, id: NodeId) -> TimeIndex {
    TimeIndexVisitor::new(registry).visit(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_is_commutative_associative_idempotent() {
        for a in TimeIndex::ALL {
            assert_eq!(a | a, a);
            for b in TimeIndex::ALL {
                assert_eq!(a | b, b | a);
                for c in TimeIndex::ALL {
                    assert_eq!((a | b) | c, a | (b | c));
                }
            }
        }
    }

    #[test]
    fn test_constant_is_identity_and_both_absorbs() {
        for x in TimeIndex::ALL {
            assert_eq!(TimeIndex::ConstantInTimeAndScenario | x, x);
            assert_eq!(
                TimeIndex::VaryingInTimeAndScenario | x,
                TimeIndex::VaryingInTimeAndScenario
            );
        }
        assert_eq!(
            TimeIndex::VaryingInTimeOnly | TimeIndex::VaryingInScenarioOnly,
            TimeIndex::VaryingInTimeAndScenario
        );
    }

    #[test]
    fn test_flags() {
        assert!(TimeIndex::VaryingInTimeOnly.varies_in_time());
        assert!(!TimeIndex::VaryingInTimeOnly.varies_in_scenario());
        assert_eq!(TimeIndex::from_flags(false, true), TimeIndex::VaryingInScenarioOnly);
    }

    #[test]
    fn test_visitor_joins_children() {
        let mut registry = NodeRegistry::new();
        let p = registry.parameter("p", TimeIndex::VaryingInScenarioOnly);
        let x = registry.variable("x", TimeIndex::VaryingInTimeOnly);
        let lit = registry.literal(3.0);
        let product = registry.multiply(p, x);
        let neg = registry.negate(lit);

        assert_eq!(time_index(&registry, lit), TimeIndex::ConstantInTimeAndScenario);
        assert_eq!(time_index(&registry, neg), TimeIndex::ConstantInTimeAndScenario);
        assert_eq!(time_index(&registry, product), TimeIndex::VaryingInTimeAndScenario);

        let le = registry.less_or_equal(x, lit);
        assert_eq!(time_index(&registry, le), TimeIndex::VaryingInTimeOnly);
    }

    #[test]
    fn test_visitor_uses_context_for_references() {
        let mut registry = NodeRegistry::new();
        let port = registry.port_field("balance", "flow");
        let other = registry.component_variable("gen", "p");

        let mut context = HashMap::new();
        context.insert(port, TimeIndex::VaryingInTimeOnly);
        let visitor = TimeIndexVisitor::with_context(&registry, context);

        assert_eq!(visitor.visit(port), TimeIndex::VaryingInTimeOnly);
        assert_eq!(visitor.visit(other), TimeIndex::VaryingInTimeAndScenario);
    }
}
