//! Forced-win solver for position games.
//!
//! Positions are classified from the point of view of the declared starting
//! player (the *protagonist*):
//!
//! - at a protagonist position the protagonist needs **one** winning move (OR),
//! - at an opponent position **every** move must stay winning (AND),
//! - a player who cannot move loses (normal play), so a protagonist position
//!   without moves is losing and an opponent position without moves is winning.
//!
//! The search is a depth-first traversal over an explicit stack with three
//! marks per position (unvisited, open, closed). Re-entering an open position
//! means the play has looped; the open position is then taken as *losing* for
//! the protagonist. This pessimistic guard keeps the search finite on cyclic
//! graphs and is recorded in the trace as its own step.

use std::collections::HashMap;
use std::fmt;

use indexmap::{IndexMap, IndexSet};
use log::debug;
use serde::Serialize;

use crate::game::graph::{Position, PositionGraph};
use crate::trace::{show_set, Trace};
use crate::types::{NodeId, Player};

/// Outcome of a game analysis.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum GameVerdict {
    /// The protagonist can force a win from the start position.
    Wins,
    /// The protagonist cannot force a win from the start position.
    Loses,
    /// The declared starting player does not own the start position, so turn
    /// order and the instance disagree. This is not a loss.
    Unanalyzable { declared: Player, start_owner: Player },
}

impl GameVerdict {
    pub fn is_win(self) -> bool {
        matches!(self, GameVerdict::Wins)
    }

    pub fn is_conclusive(self) -> bool {
        !matches!(self, GameVerdict::Unanalyzable { .. })
    }
}

/// A set of chosen moves for one side, keyed by the position they are played from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Strategy {
    /// The side playing these moves.
    pub side: Player,
    /// `position -> chosen successor`, in declaration order of the positions.
    pub moves: IndexMap<NodeId, NodeId>,
}

impl Strategy {
    pub fn choice(&self, position: &NodeId) -> Option<&NodeId> {
        self.moves.get(position)
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Working set after a step: the positions resolved as winning so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    /// Winning positions, in the order they were resolved.
    pub winning: IndexSet<NodeId>,
    /// Number of positions resolved so far (winning or not).
    pub resolved: usize,
}

impl fmt::Display for GameSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "winning = ")?;
        show_set(f, &self.winning)?;
        write!(f, " ({} resolved)", self.resolved)
    }
}

pub type GameTrace = Trace<NodeId, GameSnapshot>;

/// Everything the solver found out about a position graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameAnalysis {
    /// The declared starting player.
    pub protagonist: Player,
    pub start: NodeId,
    pub verdict: GameVerdict,
    /// Per-position classification (winning for the protagonist), in
    /// declaration order. Empty when the instance is unanalyzable.
    pub winning: IndexMap<NodeId, bool>,
    /// Optimal moves of the side that can force the win.
    pub witness: Option<Strategy>,
    pub trace: GameTrace,
}

impl GameAnalysis {
    /// Classification of a single position.
    pub fn is_winning(&self, id: &NodeId) -> Option<bool> {
        self.winning.get(id).copied()
    }

    /// One concrete play from the start position following the witness.
    ///
    /// Where the witness has no entry (the losing side's positions), the first
    /// declared move is taken. The line stops at a position without moves or
    /// right after the first repeated position.
    pub fn principal_line(&self, graph: &PositionGraph) -> Vec<NodeId> {
        let Some(witness) = &self.witness else {
            return Vec::new();
        };

        let mut line = vec![self.start.clone()];
        let mut seen = IndexSet::from([self.start.clone()]);
        let mut current = self.start.clone();

        loop {
            let Some(position) = graph.get(&current) else {
                break;
            };
            let next = match witness.choice(&current) {
                Some(next) => next.clone(),
                None => match position.successors().first() {
                    Some(next) => next.clone(),
                    None => break,
                },
            };
            line.push(next.clone());
            if !seen.insert(next.clone()) {
                break;
            }
            current = next;
        }

        line
    }
}

enum Mark {
    Open,
    Closed(bool),
}

struct Frame<'g> {
    id: &'g NodeId,
    position: &'g Position,
    next: usize,
    value: bool,
    existential: bool,
}

impl<'g> Frame<'g> {
    fn new(id: &'g NodeId, position: &'g Position, protagonist: Player) -> Self {
        let existential = position.owner() == protagonist;
        Self {
            id,
            position,
            next: 0,
            // OR over no moves is false, AND over no moves is true.
            value: !existential,
            existential,
        }
    }

    fn absorb(&mut self, value: bool) {
        if self.existential {
            self.value |= value;
        } else {
            self.value &= value;
        }
    }

    /// No further successor can change the value.
    fn is_settled(&self) -> bool {
        self.value == self.existential || self.next >= self.position.successors().len()
    }
}

enum Action<'g> {
    Close,
    Absorb(bool),
    Descend(&'g NodeId, &'g Position),
    Skip,
}

struct Search<'g> {
    graph: &'g PositionGraph,
    protagonist: Player,
    marks: HashMap<&'g NodeId, Mark>,
    winning: IndexSet<NodeId>,
    resolved: usize,
    trace: GameTrace,
}

impl<'g> Search<'g> {
    fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            winning: self.winning.clone(),
            resolved: self.resolved,
        }
    }

    fn record(&mut self, description: String, focus: &NodeId) {
        let snapshot = self.snapshot();
        self.trace.record(description, focus.clone(), snapshot);
    }

    fn open(&mut self, stack: &mut Vec<Frame<'g>>, id: &'g NodeId, position: &'g Position) {
        debug!("open({})", id);
        self.marks.insert(id, Mark::Open);
        let kind = if position.owner() == self.protagonist {
            "needs one winning move"
        } else {
            "needs every move winning"
        };
        let description = format!(
            "enter {} ({} to move, {} move(s), {})",
            id,
            position.owner(),
            position.successors().len(),
            kind
        );
        self.record(description, id);
        stack.push(Frame::new(id, position, self.protagonist));
    }

    fn close(&mut self, frame: &Frame<'g>) {
        debug!("close({}) -> {}", frame.id, frame.value);
        self.marks.insert(frame.id, Mark::Closed(frame.value));
        self.resolved += 1;
        if frame.value {
            self.winning.insert(frame.id.clone());
        }
        let description = if frame.position.is_terminal() {
            format!(
                "{} has no moves: {} cannot move, so {} is {}",
                frame.id,
                frame.position.owner(),
                frame.id,
                if frame.value { "winning" } else { "losing" }
            )
        } else {
            format!("{} resolved as {}", frame.id, if frame.value { "winning" } else { "losing" })
        };
        self.record(description, frame.id);
    }

    /// Runs the search from `root` until its frame is closed.
    fn run(&mut self, root: &'g NodeId) {
        if self.marks.contains_key(root) {
            return;
        }
        let graph: &'g PositionGraph = self.graph;
        let Some((root, position)) = graph.entry(root) else {
            return;
        };

        let mut stack: Vec<Frame<'g>> = Vec::new();
        self.open(&mut stack, root, position);

        let mut incoming: Option<bool> = None;
        loop {
            let action = {
                let Some(frame) = stack.last_mut() else {
                    break;
                };
                if let Some(value) = incoming.take() {
                    frame.absorb(value);
                }
                if frame.is_settled() {
                    Action::Close
                } else {
                    let current: &'g Position = frame.position;
                    let successor = &current.successors()[frame.next];
                    frame.next += 1;
                    match graph.entry(successor) {
                        None => Action::Skip,
                        Some((id, position)) => match self.marks.get(id) {
                            Some(Mark::Open) => {
                                let from = frame.id;
                                debug!("cycle: {} -> {}", from, id);
                                let description =
                                    format!("{} -> {}: {} is still open (cycle), assumed losing", from, id, id);
                                self.record(description, from);
                                Action::Absorb(false)
                            }
                            Some(Mark::Closed(value)) => {
                                let value = *value;
                                let from = frame.id;
                                let description = format!(
                                    "{} -> {}: already resolved as {}",
                                    from,
                                    id,
                                    if value { "winning" } else { "losing" }
                                );
                                self.record(description, from);
                                Action::Absorb(value)
                            }
                            None => Action::Descend(id, position),
                        },
                    }
                }
            };

            match action {
                Action::Close => {
                    if let Some(frame) = stack.pop() {
                        self.close(&frame);
                        incoming = Some(frame.value);
                    }
                }
                Action::Absorb(value) => incoming = Some(value),
                Action::Descend(id, position) => self.open(&mut stack, id, position),
                Action::Skip => {}
            }
        }
    }
}

/// Decides whether `starting` can force a win from the graph's start position.
///
/// The returned analysis carries the verdict, the classification of every
/// position, a witness strategy for the winning side and the full trace. The
/// graph itself is never modified; running the solver twice on the same graph
/// yields identical results.
pub fn solve(graph: &PositionGraph, starting: Player) -> GameAnalysis {
    debug!("solve(start = {}, starting = {})", graph.start(), starting);

    let start = graph.start().clone();
    let start_owner = graph.start_position().owner();

    if start_owner != starting {
        let mut trace = GameTrace::new();
        trace.record(
            format!(
                "{} belongs to {} but {} was declared to move first: unanalyzable",
                start, start_owner, starting
            ),
            start.clone(),
            GameSnapshot {
                winning: IndexSet::new(),
                resolved: 0,
            },
        );
        return GameAnalysis {
            protagonist: starting,
            start,
            verdict: GameVerdict::Unanalyzable {
                declared: starting,
                start_owner,
            },
            winning: IndexMap::new(),
            witness: None,
            trace,
        };
    }

    let mut search = Search {
        graph,
        protagonist: starting,
        marks: HashMap::new(),
        winning: IndexSet::new(),
        resolved: 0,
        trace: GameTrace::new(),
    };

    // The start position first, then whatever it did not reach.
    search.run(graph.start());
    for id in graph.ids() {
        search.run(id);
    }

    let winning: IndexMap<NodeId, bool> = graph
        .ids()
        .map(|id| {
            let value = matches!(search.marks.get(id), Some(Mark::Closed(true)));
            (id.clone(), value)
        })
        .collect();

    let verdict = if winning.get(&start).copied().unwrap_or(false) {
        GameVerdict::Wins
    } else {
        GameVerdict::Loses
    };

    let witness = extract_witness(graph, starting, verdict, &winning);
    for (from, to) in &witness.moves {
        search.record(format!("{} plays {} -> {}", witness.side, from, to), from);
    }

    let description = match verdict {
        GameVerdict::Wins => format!("{} forces a win from {}", starting, start),
        _ => format!("{} cannot force a win from {}", starting, start),
    };
    search.record(description, &start);

    GameAnalysis {
        protagonist: starting,
        start,
        verdict,
        winning,
        witness: Some(witness),
        trace: search.trace,
    }
}

/// Picks, for every position of the winning side that keeps its advantage,
/// the first declared successor that keeps it too.
fn extract_witness(
    graph: &PositionGraph,
    protagonist: Player,
    verdict: GameVerdict,
    winning: &IndexMap<NodeId, bool>,
) -> Strategy {
    // The protagonist wants winning positions, the opponent losing ones.
    let (side, keep) = match verdict {
        GameVerdict::Wins => (protagonist, true),
        _ => (protagonist.opponent(), false),
    };

    let mut moves = IndexMap::new();
    for (id, position) in graph.positions() {
        if position.owner() != side || winning.get(id) != Some(&keep) {
            continue;
        }
        if let Some(next) = position.successors().iter().find(|s| winning.get(*s) == Some(&keep)) {
            moves.insert(id.clone(), next.clone());
        }
    }

    Strategy { side, moves }
}
