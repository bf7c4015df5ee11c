//! Emptiness of context-free languages.
//!
//! # Examples
//!
//! ```
//! use decide_rs::grammar::{analyze, Grammar};
//!
//! let grammar = Grammar::parse("S -> A a | ε\nA -> A").unwrap();
//! let analysis = analyze(&grammar);
//!
//! assert!(!analysis.is_empty);
//! assert!(analysis.is_productive(&"S".into()));
//! assert!(!analysis.is_productive(&"A".into()));
//! assert_eq!(analysis.derivation.unwrap().to_string(), "[S ε]");
//! ```

pub mod cfg;
pub mod derivation;
pub mod parse;
pub mod productive;

pub use cfg::{Grammar, Production, EPSILON};
pub use derivation::Derivation;
pub use productive::{analyze, closure_step, GrammarAnalysis, GrammarFocus, GrammarTrace, ProductiveSnapshot};
