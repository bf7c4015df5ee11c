//! Replayable analysis traces.
//!
//! Every engine records its work as a [`Trace`]: an append-only list of
//! [`Step`]s. A step owns a full copy of the working set at the moment it was
//! recorded, so any step can be rendered on its own and stepping backwards
//! shows exactly what the engine knew at that point.
//!
//! Navigation (first/previous/next/last) is left to the caller, which simply
//! indexes into the trace.
//!
//! # Examples
//!
//! ```
//! use decide_rs::circuit::{Circuit, evaluate};
//!
//! let circuit = Circuit::parse("AND(1, OR(0, 0))").unwrap();
//! let analysis = evaluate(&circuit);
//! let trace = &analysis.trace;
//!
//! assert_eq!(trace.len(), 2);
//! let first = trace.first().unwrap();
//! let last = trace.last().unwrap();
//! assert_eq!(first.index(), 0);
//! assert_eq!(last.index(), trace.len() - 1);
//! ```

use std::fmt;

use serde::Serialize;

/// One discrete step of an analysis.
///
/// `F` is what the step looks at (a position, a gate, a production) and `S`
/// is the snapshot of the working set after the step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step<F, S> {
    index: usize,
    description: String,
    focus: F,
    snapshot: S,
}

impl<F, S> Step<F, S> {
    /// Position of this step in its trace.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The node or rule examined by this step.
    pub fn focus(&self) -> &F {
        &self.focus
    }

    /// The working set as it was right after this step.
    pub fn snapshot(&self) -> &S {
        &self.snapshot
    }
}

impl<F: fmt::Display, S: fmt::Display> fmt::Display for Step<F, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} [{}] {} | {}", self.index, self.focus, self.description, self.snapshot)
    }
}

/// An ordered, append-only list of analysis steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Trace<F, S> {
    steps: Vec<Step<F, S>>,
}

impl<F, S> Trace<F, S> {
    pub(crate) fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Appends a step. The snapshot is taken by value, so the caller hands over
    /// a copy of its working set, never a view into it.
    pub(crate) fn record(&mut self, description: impl Into<String>, focus: F, snapshot: S) {
        let index = self.steps.len();
        self.steps.push(Step {
            index,
            description: description.into(),
            focus,
            snapshot,
        });
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Step<F, S>> {
        self.steps.get(index)
    }

    pub fn first(&self) -> Option<&Step<F, S>> {
        self.steps.first()
    }

    pub fn last(&self) -> Option<&Step<F, S>> {
        self.steps.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step<F, S>> {
        self.steps.iter()
    }

    pub fn steps(&self) -> &[Step<F, S>] {
        &self.steps
    }
}

impl<'a, F, S> IntoIterator for &'a Trace<F, S> {
    type Item = &'a Step<F, S>;
    type IntoIter = std::slice::Iter<'a, Step<F, S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

impl<F: fmt::Display, S: fmt::Display> fmt::Display for Trace<F, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            writeln!(f, "{}", step)?;
        }
        Ok(())
    }
}

/// Formats a sequence of items as `{a, b, c}` (or `∅`).
pub(crate) fn show_set<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: impl IntoIterator<Item = T>) -> fmt::Result {
    let mut first = true;
    for item in items {
        write!(f, "{}{}", if first { "{" } else { ", " }, item)?;
        first = false;
    }
    if first {
        write!(f, "∅")
    } else {
        write!(f, "}}")
    }
}
