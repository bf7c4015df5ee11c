//! Interchange documents for all three kinds of instances.
//!
//! Documents are flat lists (nodes with successor lists, nodes plus an edge
//! list, symbol lists plus productions) that serialize with `serde`. Importing
//! a document validates it fully, so engines only ever see well-formed
//! instances; exporting and re-importing yields an equal instance.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::circuit::{Circuit, CircuitBuilder, CircuitNode, CircuitRef, GateKind};
use crate::error::StructureError;
use crate::game::{Position, PositionGraph};
use crate::grammar::{Grammar, Production};
use crate::types::{NodeId, Player, Symbol};

/// Serializes a document as pretty-printed JSON.
pub fn to_json<T: Serialize>(doc: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(doc)
}

pub fn from_json<T: DeserializeOwned>(text: &str) -> serde_json::Result<T> {
    serde_json::from_str(text)
}

// ─── Games ───

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameNodeDoc {
    pub id: NodeId,
    /// Owning player, 1 or 2.
    #[serde(default)]
    pub player: Option<u8>,
    #[serde(default)]
    pub successors: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDoc {
    pub start: NodeId,
    pub nodes: Vec<GameNodeDoc>,
}

impl TryFrom<GameDoc> for PositionGraph {
    type Error = StructureError;

    fn try_from(doc: GameDoc) -> Result<Self, Self::Error> {
        let mut positions = Vec::with_capacity(doc.nodes.len());
        for node in doc.nodes {
            let value = node.player.ok_or_else(|| StructureError::MissingPlayer(node.id.clone()))?;
            let owner = Player::try_from(value).map_err(|_| StructureError::InvalidPlayer {
                node: node.id.clone(),
                value,
            })?;
            positions.push((node.id, Position::new(owner, node.successors)));
        }
        PositionGraph::new(positions, doc.start)
    }
}

impl From<&PositionGraph> for GameDoc {
    fn from(graph: &PositionGraph) -> Self {
        let nodes = graph
            .positions()
            .map(|(id, position)| GameNodeDoc {
                id: id.clone(),
                player: Some(position.owner().number()),
                successors: position.successors().to_vec(),
            })
            .collect();
        GameDoc {
            start: graph.start().clone(),
            nodes,
        }
    }
}

// ─── Circuits ───

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitNodeDoc {
    pub id: NodeId,
    /// Gate operator (`AND` / `OR`); absent for leaves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Leaf value: `"0"`, `"1"` or `"?"`; absent for gates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// A circuit as a node list and an edge list `(parent, child)`.
///
/// The order of a gate's outgoing edges is the order of its inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitDoc {
    pub root: NodeId,
    pub nodes: Vec<CircuitNodeDoc>,
    #[serde(default)]
    pub edges: Vec<(NodeId, NodeId)>,
}

#[derive(Clone, Copy)]
enum Shape {
    Gate(GateKind),
    Leaf(Option<bool>),
}

fn shape(node: &CircuitNodeDoc) -> Result<Shape, StructureError> {
    if let Some(kind) = &node.kind {
        return Ok(Shape::Gate(kind.parse()?));
    }
    match node.value.as_deref() {
        Some("1") => Ok(Shape::Leaf(Some(true))),
        Some("0") => Ok(Shape::Leaf(Some(false))),
        Some("?") => Ok(Shape::Leaf(None)),
        _ => Err(StructureError::UntypedNode(node.id.clone())),
    }
}

impl TryFrom<CircuitDoc> for Circuit {
    type Error = StructureError;

    fn try_from(doc: CircuitDoc) -> Result<Self, Self::Error> {
        let mut index: HashMap<&NodeId, usize> = HashMap::new();
        let mut shapes = Vec::with_capacity(doc.nodes.len());
        for (i, node) in doc.nodes.iter().enumerate() {
            if index.insert(&node.id, i).is_some() {
                return Err(StructureError::DuplicateNode(node.id.clone()));
            }
            shapes.push(shape(node)?);
        }

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); doc.nodes.len()];
        for (from, to) in &doc.edges {
            let (Some(&parent), Some(&child)) = (index.get(from), index.get(to)) else {
                return Err(StructureError::DanglingChild {
                    node: from.clone(),
                    child: to.clone(),
                });
            };
            if matches!(shapes[parent], Shape::Leaf(_)) {
                return Err(StructureError::LeafWithChildren(from.clone()));
            }
            children[parent].push(child);
        }

        let root = *index.get(&doc.root).ok_or(StructureError::MissingRoot)?;

        // Children must enter the arena before their parents: add nodes in
        // depth-first post-order, rejecting back edges.
        #[derive(Clone, Copy, PartialEq)]
        enum State {
            New,
            Open,
            Done,
        }
        let mut state = vec![State::New; doc.nodes.len()];
        let mut refs: Vec<Option<CircuitRef>> = vec![None; doc.nodes.len()];
        let mut builder = CircuitBuilder::new();

        for start in 0..doc.nodes.len() {
            if state[start] != State::New {
                continue;
            }
            let mut stack = vec![(start, 0usize)];
            state[start] = State::Open;
            while let Some((i, next)) = stack.pop() {
                if let Some(&c) = children[i].get(next) {
                    stack.push((i, next + 1));
                    match state[c] {
                        State::New => {
                            state[c] = State::Open;
                            stack.push((c, 0));
                        }
                        State::Open => return Err(StructureError::CircuitCycle(doc.nodes[c].id.clone())),
                        State::Done => {}
                    }
                    continue;
                }

                let id = doc.nodes[i].id.clone();
                let node = match shapes[i] {
                    Shape::Leaf(value) => CircuitNode::Leaf { value },
                    Shape::Gate(kind) => CircuitNode::Gate {
                        kind,
                        children: children[i].iter().filter_map(|&c| refs[c]).collect(),
                    },
                };
                refs[i] = Some(builder.add(id, node)?);
                state[i] = State::Done;
            }
        }

        let root = refs[root].ok_or(StructureError::MissingRoot)?;
        builder.finish(root)
    }
}

impl From<&Circuit> for CircuitDoc {
    fn from(circuit: &Circuit) -> Self {
        let mut nodes = Vec::with_capacity(circuit.len());
        let mut edges = Vec::new();
        for (r, node) in circuit.iter() {
            let id = circuit.label(r).clone();
            let (kind, value) = match node {
                CircuitNode::Gate { kind, children } => {
                    for &c in children {
                        edges.push((id.clone(), circuit.label(c).clone()));
                    }
                    (Some(kind.to_string()), None)
                }
                CircuitNode::Leaf { value } => {
                    let value = match value {
                        Some(true) => "1",
                        Some(false) => "0",
                        None => "?",
                    };
                    (None, Some(value.to_owned()))
                }
            };
            nodes.push(CircuitNodeDoc { id, kind, value });
        }
        CircuitDoc {
            root: circuit.label(circuit.root()).clone(),
            nodes,
            edges,
        }
    }
}

// ─── Grammars ───

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionDoc {
    pub lhs: Symbol,
    /// Empty for an ε-production.
    #[serde(default)]
    pub rhs: Vec<Symbol>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarDoc {
    pub nonterminals: Vec<Symbol>,
    pub terminals: Vec<Symbol>,
    pub productions: Vec<ProductionDoc>,
    /// Defaults to the first non-terminal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Symbol>,
}

impl TryFrom<GrammarDoc> for Grammar {
    type Error = StructureError;

    fn try_from(doc: GrammarDoc) -> Result<Self, Self::Error> {
        let productions = doc.productions.into_iter().map(|p| Production::new(p.lhs, p.rhs));
        match doc.start {
            Some(start) => Grammar::with_start(doc.nonterminals, doc.terminals, productions, start),
            None => Grammar::new(doc.nonterminals, doc.terminals, productions),
        }
    }
}

impl From<&Grammar> for GrammarDoc {
    fn from(grammar: &Grammar) -> Self {
        GrammarDoc {
            nonterminals: grammar.nonterminals().iter().cloned().collect(),
            terminals: grammar.terminals().iter().cloned().collect(),
            productions: grammar
                .productions()
                .map(|p| ProductionDoc {
                    lhs: p.lhs().clone(),
                    rhs: p.rhs().to_vec(),
                })
                .collect(),
            start: Some(grammar.start().clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::circuit::{evaluate, Value};
    use crate::game::solve;
    use crate::grammar::analyze;

    #[test]
    fn test_game_from_json() {
        let text = r#"{
            "start": "A",
            "nodes": [
                { "id": "A", "player": 1, "successors": ["B", "C"] },
                { "id": "B", "player": 2, "successors": ["D"] },
                { "id": "C", "player": 2 },
                { "id": "D", "player": 1 }
            ]
        }"#;
        let doc: GameDoc = from_json(text).unwrap();
        let graph = PositionGraph::try_from(doc).unwrap();
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.num_edges(), 3);
        assert!(graph.get(&"C".into()).unwrap().is_terminal());
    }

    #[test]
    fn test_game_player_errors() {
        let doc = GameDoc {
            start: "A".into(),
            nodes: vec![GameNodeDoc {
                id: "A".into(),
                player: None,
                successors: vec![],
            }],
        };
        assert_eq!(
            PositionGraph::try_from(doc.clone()),
            Err(StructureError::MissingPlayer("A".into()))
        );

        let mut bad = doc;
        bad.nodes[0].player = Some(3);
        assert_eq!(
            PositionGraph::try_from(bad),
            Err(StructureError::InvalidPlayer {
                node: "A".into(),
                value: 3
            })
        );
    }

    #[test]
    fn test_game_round_trip() {
        let text = r#"{"start":"A","nodes":[
            {"id":"A","player":1,"successors":["B","C"]},
            {"id":"B","player":2,"successors":["A"]},
            {"id":"C","player":2,"successors":[]}]}"#;
        let graph = PositionGraph::try_from(from_json::<GameDoc>(text).unwrap()).unwrap();
        let json = to_json(&GameDoc::from(&graph)).unwrap();
        let again = PositionGraph::try_from(from_json::<GameDoc>(&json).unwrap()).unwrap();
        assert_eq!(graph, again);
        assert_eq!(solve(&graph, Player::One).winning, solve(&again, Player::One).winning);
    }

    #[test]
    fn test_circuit_from_json_any_order() {
        // Parents listed before their children.
        let text = r#"{
            "root": "g",
            "nodes": [
                { "id": "g", "kind": "AND" },
                { "id": "h", "kind": "or" },
                { "id": "x", "value": "1" },
                { "id": "y", "value": "0" },
                { "id": "z", "value": "0" }
            ],
            "edges": [["g", "x"], ["g", "h"], ["h", "y"], ["h", "z"]]
        }"#;
        let circuit = Circuit::try_from(from_json::<CircuitDoc>(text).unwrap()).unwrap();
        assert_eq!(circuit.to_string(), "AND(1, OR(0, 0))");
        assert_eq!(circuit.label(circuit.root()).as_str(), "g");
        assert_eq!(evaluate(&circuit).output, Value::Known(false));
    }

    #[test]
    fn test_circuit_errors() {
        let leaf = |id: &str, value: &str| CircuitNodeDoc {
            id: id.into(),
            kind: None,
            value: Some(value.to_owned()),
        };
        let gate = |id: &str, kind: &str| CircuitNodeDoc {
            id: id.into(),
            kind: Some(kind.to_owned()),
            value: None,
        };
        let doc = |nodes: Vec<CircuitNodeDoc>, edges: Vec<(&str, &str)>| CircuitDoc {
            root: "g".into(),
            nodes,
            edges: edges.into_iter().map(|(a, b)| (a.into(), b.into())).collect(),
        };

        assert_eq!(
            Circuit::try_from(doc(vec![gate("g", "XOR"), leaf("x", "1")], vec![("g", "x")])),
            Err(StructureError::UnknownGateKind("XOR".to_owned()))
        );
        assert_eq!(
            Circuit::try_from(doc(vec![gate("g", "AND"), leaf("x", "1")], vec![("g", "y")])),
            Err(StructureError::DanglingChild {
                node: "g".into(),
                child: "y".into()
            })
        );
        assert_eq!(
            Circuit::try_from(doc(vec![leaf("g", "1"), leaf("x", "1")], vec![("g", "x")])),
            Err(StructureError::LeafWithChildren("g".into()))
        );
        assert_eq!(
            Circuit::try_from(doc(vec![gate("g", "AND"), leaf("x", "maybe")], vec![("g", "x")])),
            Err(StructureError::UntypedNode("x".into()))
        );
        assert_eq!(
            Circuit::try_from(doc(vec![gate("g", "AND")], vec![])),
            Err(StructureError::EmptyGate("g".to_owned()))
        );
        assert_eq!(
            Circuit::try_from(doc(
                vec![gate("g", "AND"), gate("h", "OR")],
                vec![("g", "h"), ("h", "g")]
            )),
            Err(StructureError::CircuitCycle("g".into()))
        );
        assert_eq!(
            Circuit::try_from(CircuitDoc {
                root: "r".into(),
                nodes: vec![leaf("x", "1")],
                edges: vec![],
            }),
            Err(StructureError::MissingRoot)
        );
    }

    #[test]
    fn test_circuit_round_trip() {
        let circuit = Circuit::parse("OR(AND(1, ?), AND(0, 1), 1)").unwrap();
        let json = to_json(&CircuitDoc::from(&circuit)).unwrap();
        println!("{}", json);
        let again = Circuit::try_from(from_json::<CircuitDoc>(&json).unwrap()).unwrap();
        assert_eq!(circuit, again);
        assert_eq!(evaluate(&circuit), evaluate(&again));
    }

    #[test]
    fn test_grammar_round_trip() {
        let grammar = Grammar::parse("S -> A a | ε\nA -> A").unwrap();
        let json = to_json(&GrammarDoc::from(&grammar)).unwrap();
        let again = Grammar::try_from(from_json::<GrammarDoc>(&json).unwrap()).unwrap();
        assert_eq!(grammar, again);
        assert_eq!(analyze(&grammar), analyze(&again));
    }

    #[test]
    fn test_grammar_default_start() {
        let text = r#"{
            "nonterminals": ["S", "A"],
            "terminals": ["a"],
            "productions": [{ "lhs": "S", "rhs": ["A", "a"] }, { "lhs": "S" }]
        }"#;
        let grammar = Grammar::try_from(from_json::<GrammarDoc>(text).unwrap()).unwrap();
        assert_eq!(grammar.start().as_str(), "S");
        assert!(grammar.productions_of(&"S".into())[1].is_epsilon());
    }
}
