use indexmap::IndexMap;

use crate::error::StructureError;
use crate::types::{NodeId, Player};

/// A game position: the player to move and the positions reachable in one move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    owner: Player,
    successors: Vec<NodeId>,
}

impl Position {
    pub fn new<I, T>(owner: Player, successors: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<NodeId>,
    {
        Self {
            owner,
            successors: successors.into_iter().map(Into::into).collect(),
        }
    }

    /// A position without moves.
    pub fn terminal(owner: Player) -> Self {
        Self {
            owner,
            successors: Vec::new(),
        }
    }

    pub fn owner(&self) -> Player {
        self.owner
    }

    /// Successors in declared order.
    pub fn successors(&self) -> &[NodeId] {
        &self.successors
    }

    pub fn is_terminal(&self) -> bool {
        self.successors.is_empty()
    }
}

/// A position graph with a distinguished start position.
///
/// Positions are kept in declaration order, which fixes the order in which
/// the solver visits them and therefore the shape of its trace.
///
/// # Invariants
///
/// - The graph has at least one position.
/// - Identifiers are unique.
/// - The start position and every successor resolve to positions.
///
/// Cycles are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionGraph {
    positions: IndexMap<NodeId, Position>,
    start: NodeId,
}

impl PositionGraph {
    /// Creates a new position graph, checking all invariants.
    pub fn new<I>(positions: I, start: impl Into<NodeId>) -> Result<Self, StructureError>
    where
        I: IntoIterator<Item = (NodeId, Position)>,
    {
        let mut map = IndexMap::new();
        for (id, position) in positions {
            if map.contains_key(&id) {
                return Err(StructureError::DuplicateNode(id));
            }
            map.insert(id, position);
        }

        if map.is_empty() {
            return Err(StructureError::EmptyGraph);
        }

        for (id, position) in &map {
            if let Some(successor) = position.successors.iter().find(|s| !map.contains_key(*s)) {
                return Err(StructureError::DanglingSuccessor {
                    node: id.clone(),
                    successor: successor.clone(),
                });
            }
        }

        let start = start.into();
        if !map.contains_key(&start) {
            return Err(StructureError::MissingStart(start));
        }

        Ok(Self { positions: map, start })
    }

    /// Returns the same graph with another start position.
    pub fn with_start(mut self, start: impl Into<NodeId>) -> Result<Self, StructureError> {
        let start = start.into();
        if !self.positions.contains_key(&start) {
            return Err(StructureError::MissingStart(start));
        }
        self.start = start;
        Ok(self)
    }

    pub fn start(&self) -> &NodeId {
        &self.start
    }

    /// The start position itself.
    pub fn start_position(&self) -> &Position {
        &self.positions[&self.start]
    }

    pub fn get(&self, id: &NodeId) -> Option<&Position> {
        self.positions.get(id)
    }

    /// Returns the stored key and position for an identifier.
    pub(crate) fn entry(&self, id: &NodeId) -> Option<(&NodeId, &Position)> {
        self.positions.get_key_value(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.positions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Identifiers in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = &NodeId> {
        self.positions.keys()
    }

    /// Positions in declaration order.
    pub fn positions(&self) -> impl Iterator<Item = (&NodeId, &Position)> {
        self.positions.iter()
    }

    /// All moves as `(from, to)` pairs.
    pub fn edges(&self) -> impl Iterator<Item = (&NodeId, &NodeId)> {
        self.positions
            .iter()
            .flat_map(|(id, p)| p.successors.iter().map(move |s| (id, s)))
    }

    pub fn num_edges(&self) -> usize {
        self.edges().count()
    }
}
