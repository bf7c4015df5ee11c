use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::circuit::gate::GateKind;
use crate::error::StructureError;
use crate::ids::{IdSource, Sequential};
use crate::types::NodeId;

/// Index of a node in a [`Circuit`] arena.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(transparent)]
pub struct CircuitRef(usize);

impl CircuitRef {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for CircuitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// A circuit node: either a gate over earlier nodes or a leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CircuitNode {
    Gate { kind: GateKind, children: Vec<CircuitRef> },
    /// `None` is an unassigned leaf.
    Leaf { value: Option<bool> },
}

impl CircuitNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self, CircuitNode::Leaf { .. })
    }

    pub fn children(&self) -> &[CircuitRef] {
        match self {
            CircuitNode::Gate { children, .. } => children,
            CircuitNode::Leaf { .. } => &[],
        }
    }
}

/// A monotone boolean circuit.
///
/// Nodes live in an arena and every gate only refers to nodes created before
/// it, so a circuit is acyclic by construction. Nodes may be shared between
/// several gates. Each node also carries a caller-visible identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Circuit {
    nodes: Vec<CircuitNode>,
    labels: Vec<NodeId>,
    root: CircuitRef,
}

impl Circuit {
    pub fn root(&self) -> CircuitRef {
        self.root
    }

    pub fn node(&self, r: CircuitRef) -> &CircuitNode {
        &self.nodes[r.0]
    }

    pub fn label(&self, r: CircuitRef) -> &NodeId {
        &self.labels[r.0]
    }

    /// Looks a node up by its identifier.
    pub fn find(&self, id: &NodeId) -> Option<CircuitRef> {
        self.labels.iter().position(|l| l == id).map(CircuitRef)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in creation (topological) order.
    pub fn iter(&self) -> impl Iterator<Item = (CircuitRef, &CircuitNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (CircuitRef(i), n))
    }

    pub fn num_gates(&self) -> usize {
        self.nodes.iter().filter(|n| !n.is_leaf()).count()
    }

    /// Longest root-to-leaf path, counted in gates.
    pub fn depth(&self) -> usize {
        let mut depths = vec![0usize; self.nodes.len()];
        for (i, node) in self.nodes.iter().enumerate() {
            if let CircuitNode::Gate { children, .. } = node {
                depths[i] = 1 + children.iter().map(|c| depths[c.0]).max().unwrap_or(0);
            }
        }
        depths[self.root.0]
    }

    fn write_node(&self, f: &mut fmt::Formatter<'_>, r: CircuitRef) -> fmt::Result {
        match self.node(r) {
            CircuitNode::Leaf { value: Some(true) } => write!(f, "1"),
            CircuitNode::Leaf { value: Some(false) } => write!(f, "0"),
            CircuitNode::Leaf { value: None } => write!(f, "?"),
            CircuitNode::Gate { kind, children } => {
                write!(f, "{}(", kind)?;
                for (i, &c) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    self.write_node(f, c)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Prints the circuit as a prefix expression, e.g. `AND(1, OR(0, 0))`,
/// which [`Circuit::parse`] reads back.
impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_node(f, self.root)
    }
}

/// Incremental construction of a [`Circuit`].
///
/// ```
/// use decide_rs::circuit::{CircuitBuilder, GateKind};
///
/// let mut b = CircuitBuilder::new();
/// let x = b.leaf(true);
/// let y = b.leaf(false);
/// let g = b.gate(GateKind::Or, [x, y]).unwrap();
/// let circuit = b.finish(g).unwrap();
/// assert_eq!(circuit.to_string(), "OR(1, 0)");
/// ```
#[derive(Debug)]
pub struct CircuitBuilder<I = Sequential> {
    nodes: Vec<CircuitNode>,
    labels: IndexMap<NodeId, CircuitRef>,
    ids: I,
}

impl CircuitBuilder<Sequential> {
    /// A builder naming nodes `n0`, `n1`, ...
    pub fn new() -> Self {
        Self::with_ids(Sequential::default())
    }
}

impl Default for CircuitBuilder<Sequential> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: IdSource> CircuitBuilder<I> {
    pub fn with_ids(ids: I) -> Self {
        Self {
            nodes: Vec::new(),
            labels: IndexMap::new(),
            ids,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds a node under an explicit identifier.
    pub fn add(&mut self, id: NodeId, node: CircuitNode) -> Result<CircuitRef, StructureError> {
        if self.labels.contains_key(&id) {
            return Err(StructureError::DuplicateNode(id));
        }
        if let CircuitNode::Gate { children, .. } = &node {
            if children.is_empty() {
                return Err(StructureError::EmptyGate(id.to_string()));
            }
            if let Some(child) = children.iter().find(|c| c.0 >= self.nodes.len()) {
                return Err(StructureError::DanglingChild {
                    node: id,
                    child: NodeId::new(child.to_string()),
                });
            }
        }
        let r = CircuitRef(self.nodes.len());
        self.nodes.push(node);
        self.labels.insert(id, r);
        Ok(r)
    }

    fn add_fresh(&mut self, node: CircuitNode) -> Result<CircuitRef, StructureError> {
        let id = self.fresh_id();
        self.add(id, node)
    }

    fn fresh_id(&mut self) -> NodeId {
        loop {
            let id = self.ids.next_id();
            if !self.labels.contains_key(&id) {
                return id;
            }
        }
    }

    /// Adds a leaf with a fixed value.
    pub fn leaf(&mut self, value: bool) -> CircuitRef {
        let id = self.fresh_id();
        let r = CircuitRef(self.nodes.len());
        self.nodes.push(CircuitNode::Leaf { value: Some(value) });
        self.labels.insert(id, r);
        r
    }

    /// Adds an unassigned leaf.
    pub fn unknown(&mut self) -> CircuitRef {
        let id = self.fresh_id();
        let r = CircuitRef(self.nodes.len());
        self.nodes.push(CircuitNode::Leaf { value: None });
        self.labels.insert(id, r);
        r
    }

    /// Adds a gate over already existing nodes.
    pub fn gate(
        &mut self,
        kind: GateKind,
        children: impl IntoIterator<Item = CircuitRef>,
    ) -> Result<CircuitRef, StructureError> {
        let children = children.into_iter().collect();
        self.add_fresh(CircuitNode::Gate { kind, children })
    }

    pub fn and(&mut self, children: impl IntoIterator<Item = CircuitRef>) -> Result<CircuitRef, StructureError> {
        self.gate(GateKind::And, children)
    }

    pub fn or(&mut self, children: impl IntoIterator<Item = CircuitRef>) -> Result<CircuitRef, StructureError> {
        self.gate(GateKind::Or, children)
    }

    /// Finishes the circuit with the given root.
    pub fn finish(self, root: CircuitRef) -> Result<Circuit, StructureError> {
        if root.0 >= self.nodes.len() {
            return Err(StructureError::MissingRoot);
        }
        let mut labels = vec![NodeId::new(""); self.nodes.len()];
        for (id, r) in self.labels {
            labels[r.0] = id;
        }
        Ok(Circuit {
            nodes: self.nodes,
            labels,
            root,
        })
    }
}
