//! Monotone circuit value problem (MCVP).
//!
//! A [`Circuit`] is an arena of AND/OR gates and 0/1 leaves. [`evaluate`]
//! computes the value of the root together with a post-order trace of every
//! gate evaluation.
//!
//! # Examples
//!
//! ```
//! use decide_rs::circuit::{evaluate, Circuit, Value};
//!
//! let circuit = Circuit::parse("AND(1, OR(0, 0))").unwrap();
//! let analysis = evaluate(&circuit);
//! assert_eq!(analysis.output, Value::Known(false));
//!
//! // The OR gate is evaluated before the AND gate above it.
//! assert!(analysis.trace.get(0).unwrap().description().contains("OR"));
//! assert!(analysis.trace.get(1).unwrap().description().contains("AND"));
//! ```

pub mod eval;
pub mod gate;
pub mod generate;
pub mod node;
pub mod parse;

pub use eval::{evaluate, CircuitAnalysis, CircuitTrace, EvalSnapshot, GateEval, Value};
pub use gate::GateKind;
pub use generate::{random_circuit, CircuitGenConfig};
pub use node::{Circuit, CircuitBuilder, CircuitNode, CircuitRef};
