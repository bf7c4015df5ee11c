//! Error types for instance construction and parsing.
//!
//! Engines themselves never fail: every problem with an instance is caught
//! when the instance is built, and inconclusive outcomes (an unanalyzable
//! game, an incomplete circuit) are ordinary values.

use thiserror::Error;

use crate::types::{NodeId, Symbol};

/// A malformed instance, rejected before any analysis runs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StructureError {
    /// Position graph without positions.
    #[error("position graph is empty")]
    EmptyGraph,

    /// Start position is not part of the graph.
    #[error("start position '{0}' is not in the graph")]
    MissingStart(NodeId),

    /// Two nodes share an identifier.
    #[error("duplicate node '{0}'")]
    DuplicateNode(NodeId),

    /// Successor does not resolve to a position.
    #[error("position '{node}' has dangling successor '{successor}'")]
    DanglingSuccessor { node: NodeId, successor: NodeId },

    /// Position carries no owning player.
    #[error("position '{0}' has no player")]
    MissingPlayer(NodeId),

    /// Position carries a player other than 1 or 2.
    #[error("position '{node}' has invalid player {value}")]
    InvalidPlayer { node: NodeId, value: u8 },

    /// Player label that is neither 1 nor 2.
    #[error("unknown player '{0}'")]
    UnknownPlayer(String),

    /// Gate operator other than AND/OR.
    #[error("unknown gate kind '{0}'")]
    UnknownGateKind(String),

    /// Gate without children.
    #[error("gate '{0}' has no children")]
    EmptyGate(String),

    /// Leaf node with neither a value nor an explicit "unknown" marker.
    #[error("node '{0}' is neither a gate nor a leaf")]
    UntypedNode(NodeId),

    /// Circuit without a root.
    #[error("circuit has no root")]
    MissingRoot,

    /// Child reference that does not resolve.
    #[error("node '{node}' has dangling child '{child}'")]
    DanglingChild { node: NodeId, child: NodeId },

    /// Leaf with outgoing edges.
    #[error("leaf '{0}' cannot have children")]
    LeafWithChildren(NodeId),

    /// Circuit reachable from the root contains a cycle.
    #[error("circuit contains a cycle through '{0}'")]
    CircuitCycle(NodeId),

    /// Grammar without non-terminals.
    #[error("grammar has no non-terminals")]
    EmptyGrammar,

    /// Start symbol is not a declared non-terminal.
    #[error("start symbol '{0}' is not a non-terminal")]
    MissingStartSymbol(Symbol),

    /// Symbol declared both as terminal and non-terminal.
    #[error("symbol '{0}' is both a terminal and a non-terminal")]
    OverlappingSymbol(Symbol),

    /// Production whose left-hand side is not a non-terminal.
    #[error("production left-hand side '{0}' is not a non-terminal")]
    UndeclaredLhs(Symbol),
}

/// Errors produced by the textual front-ends (circuit expressions, grammars).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { pos: usize, ch: char },

    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("unexpected token '{found}' at position {pos}")]
    UnexpectedToken { pos: usize, found: String },

    #[error("trailing input at position {pos}")]
    TrailingInput { pos: usize },

    #[error("line {line}: missing '->'")]
    MissingArrow { line: usize },

    #[error("line {line}: missing left-hand side")]
    MissingLhs { line: usize },

    #[error("line {line}: unexpected '{found}' after the left-hand side")]
    ExtraLhsToken { line: usize, found: String },

    #[error("line {line}: invalid directive '%{name}'")]
    InvalidDirective { line: usize, name: String },

    #[error(transparent)]
    Structure(#[from] StructureError),
}
