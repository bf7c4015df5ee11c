//! # decide-rs: Decision procedures with replayable traces
//!
//! **`decide-rs`** answers three classical yes/no questions about small
//! graph-shaped structures, and for each answer produces a **witness** that
//! justifies it and a **trace** that can be stepped through one state at a time.
//!
//! ## The three engines
//!
//! - **[`game`]**: two players move a token along a [position graph][crate::game::PositionGraph];
//!   whoever cannot move loses. [`solve`][crate::game::solve] decides whether the
//!   declared starting player can force a win, classifies every position and
//!   returns the winning side's strategy.
//! - **[`circuit`]**: the monotone circuit value problem.
//!   [`evaluate`][crate::circuit::evaluate] computes the output of an AND/OR
//!   circuit, or reports it as incomplete when a leaf has no value.
//! - **[`grammar`]**: emptiness of a context-free language.
//!   [`analyze`][crate::grammar::analyze] finds the productive non-terminals and
//!   a derivation tree for the start symbol.
//!
//! ## Design
//!
//! - **Read-only instances**: engines take their input by shared reference and
//!   keep all derived state (winning flags, values, productive sets) in their
//!   own side tables. Running an engine twice gives identical results.
//! - **Validated construction**: malformed instances are rejected with a
//!   [`StructureError`][crate::error::StructureError] when they are built, so
//!   the engines themselves never fail.
//! - **Owned snapshots**: every [`Step`][crate::trace::Step] carries a copy of
//!   the working set, so any step of a [`Trace`][crate::trace::Trace] can be
//!   shown on its own.
//!
//! ## Basic Usage
//!
//! ```rust
//! use decide_rs::circuit::{evaluate, Circuit, Value};
//! use decide_rs::grammar::{analyze, Grammar};
//!
//! // Circuits can be written in prefix or infix form.
//! let circuit: Circuit = "1 & (0 | 0)".parse().unwrap();
//! let analysis = evaluate(&circuit);
//! assert_eq!(analysis.output, Value::Known(false));
//!
//! // One production per alternative, `ε` for the empty string.
//! let grammar: Grammar = "S -> a S b | ε".parse().unwrap();
//! let analysis = analyze(&grammar);
//! assert!(!analysis.is_empty);
//!
//! for step in &analysis.trace {
//!     println!("{}", step);
//! }
//! ```
//!
//! Instances can also be loaded from JSON documents, see [`io`].

pub mod circuit;
pub mod error;
pub mod game;
pub mod grammar;
pub mod ids;
pub mod io;
pub mod trace;
pub mod types;
