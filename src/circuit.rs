//! The arithmetic circuit: an append-only arena of value nodes.
//!
//! Every node only refers to nodes that were appended before it, so the arena is a DAG in
//! topological order and can be evaluated front to back. The only leaves are inputs and public
//! literals; all other nodes are binary arithmetic operations.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::{Literal, Ty};

/// The index of a node in a [`Circuit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The operation computed by a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    /// The value of the program input with the given index.
    Input(usize),
    /// A public constant.
    Literal(Literal),
    /// `lhs + rhs`.
    Add(NodeId, NodeId),
    /// `lhs - rhs`.
    Sub(NodeId, NodeId),
    /// `lhs * rhs`.
    Mul(NodeId, NodeId),
    /// `lhs / rhs`, secure division with domain-defined rounding.
    Div(NodeId, NodeId),
}

impl Op {
    /// The operands of a binary operation, `None` for leaves.
    pub fn operands(&self) -> Option<(NodeId, NodeId)> {
        match *self {
            Op::Input(_) | Op::Literal(_) => None,
            Op::Add(x, y) | Op::Sub(x, y) | Op::Mul(x, y) | Op::Div(x, y) => Some((x, y)),
        }
    }

    /// A short name of the operation, used in reports and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Op::Input(_) => "input",
            Op::Literal(_) => "literal",
            Op::Add(_, _) => "add",
            Op::Sub(_, _) => "sub",
            Op::Mul(_, _) => "mul",
            Op::Div(_, _) => "div",
        }
    }
}

/// A typed node of the circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// The operation of the node.
    pub op: Op,
    /// The numeric domain of the node's value.
    pub ty: Ty,
}

/// Errors caused by an ill-formed circuit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CircuitError {
    /// The node uses an operand that is not strictly before it, which could form a cycle.
    #[error("node {node} uses operand {operand}, which is not defined before it")]
    OperandNotBefore {
        /// The offending node.
        node: NodeId,
        /// The operand it refers to.
        operand: NodeId,
    },
    /// The node reads an input that is not declared.
    #[error("node {node} reads undeclared input {input}")]
    InvalidInput {
        /// The offending node.
        node: NodeId,
        /// The index of the missing input.
        input: usize,
    },
    /// The type stored for the node does not follow from its operation.
    #[error("node {node} is typed as {found}, but its {op} operation yields {expected}")]
    InvalidType {
        /// The offending node.
        node: NodeId,
        /// The operation of the node.
        op: &'static str,
        /// The type that follows from the operands.
        expected: String,
        /// The type stored in the node.
        found: Ty,
    },
    /// A reference to a node that is not part of the circuit.
    #[error("node {0} does not exist")]
    MissingNode(NodeId),
}

/// An append-only arena of typed nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circuit {
    nodes: Vec<Node>,
}

impl Circuit {
    /// The nodes of the circuit, in topological order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the circuit has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up a node.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub(crate) fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Checks that all operands precede their nodes, that all inputs are among the declared
    /// `input_types` and that every node carries the type its operation yields.
    pub fn validate(&self, input_types: &[Ty]) -> Result<(), CircuitError> {
        for (i, node) in self.nodes.iter().enumerate() {
            let id = NodeId(i);
            let expected = match node.op {
                Op::Input(input) => match input_types.get(input) {
                    Some(ty) => Some(*ty),
                    None => return Err(CircuitError::InvalidInput { node: id, input }),
                },
                Op::Literal(literal) => Some(literal.ty()),
                Op::Add(x, y) | Op::Sub(x, y) | Op::Mul(x, y) | Op::Div(x, y) => {
                    for operand in [x, y] {
                        if operand.0 >= i {
                            return Err(CircuitError::OperandNotBefore { node: id, operand });
                        }
                    }
                    self.nodes[x.0].ty.combine(self.nodes[y.0].ty)
                }
            };
            if expected != Some(node.ty) {
                return Err(CircuitError::InvalidType {
                    node: id,
                    op: node.op.name(),
                    expected: expected.map_or_else(|| "a type error".to_string(), |t| t.to_string()),
                    found: node.ty,
                });
            }
        }
        Ok(())
    }

    /// Returns a one-line summary of the node counts per operation.
    pub fn report_ops(&self) -> String {
        let mut counts = [0usize; 6];
        for node in &self.nodes {
            let slot = match node.op {
                Op::Input(_) => 0,
                Op::Literal(_) => 1,
                Op::Add(_, _) => 2,
                Op::Sub(_, _) => 3,
                Op::Mul(_, _) => 4,
                Op::Div(_, _) => 5,
            };
            counts[slot] += 1;
        }
        let [inputs, literals, adds, subs, muls, divs] = counts;
        format!(
            "{} nodes: {inputs} input, {literals} literal, {adds} add, {subs} sub, {muls} mul, {divs} div",
            self.nodes.len()
        )
    }

    /// Counts the nodes for which `f` returns `true`.
    pub fn count(&self, f: impl Fn(&Op) -> bool) -> usize {
        self.nodes.iter().filter(|node| f(&node.op)).count()
    }
}
