//! Two-player position games under normal play.
//!
//! A [`PositionGraph`] assigns every position to the player who moves there.
//! [`solve`] decides whether the declared starting player can force a win,
//! classifies every position, extracts a witness strategy and records a
//! replayable trace.
//!
//! # Examples
//!
//! ```
//! use decide_rs::game::{solve, GameVerdict, Position, PositionGraph};
//! use decide_rs::types::{NodeId, Player};
//!
//! let graph = PositionGraph::new(
//!     [
//!         (NodeId::new("A"), Position::new(Player::One, ["B"])),
//!         (NodeId::new("B"), Position::terminal(Player::Two)),
//!     ],
//!     "A",
//! )
//! .unwrap();
//!
//! let analysis = solve(&graph, Player::One);
//! assert_eq!(analysis.verdict, GameVerdict::Wins);
//! let witness = analysis.witness.unwrap();
//! assert_eq!(witness.choice(&NodeId::new("A")), Some(&NodeId::new("B")));
//! ```

pub mod generate;
pub mod graph;
pub mod solver;

pub use generate::{random_game, GameGenConfig};
pub use graph::{Position, PositionGraph};
pub use solver::{solve, GameAnalysis, GameSnapshot, GameTrace, GameVerdict, Strategy};
