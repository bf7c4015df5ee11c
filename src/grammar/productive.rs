//! Productivity (emptiness) analysis of context-free grammars.
//!
//! A non-terminal is *productive* if one of its productions consists only of
//! terminals and productive non-terminals. The productive set is the least
//! fixpoint of that rule, computed with a work-list in two phases:
//!
//! 1. **scan**: every production is examined once; terminal-only right-hand
//!    sides (including ε) make their left-hand side productive,
//! 2. **propagate**: productive symbols are dequeued one at a time and only
//!    the productions that mention the dequeued symbol are re-examined.
//!
//! The production that first proved a symbol productive is kept as its
//! *witness*; expanding witnesses from the start symbol yields a finite
//! derivation tree.

use std::collections::VecDeque;
use std::fmt;

use indexmap::{IndexMap, IndexSet};
use log::debug;
use serde::Serialize;

use crate::grammar::cfg::{Grammar, Production};
use crate::grammar::derivation::Derivation;
use crate::trace::{show_set, Trace};
use crate::types::Symbol;

/// What a trace step examined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GrammarFocus {
    Production(Production),
    Symbol(Symbol),
}

impl fmt::Display for GrammarFocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarFocus::Production(p) => write!(f, "{}", p),
            GrammarFocus::Symbol(s) => write!(f, "{}", s),
        }
    }
}

/// Working set after a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductiveSnapshot {
    /// Productive non-terminals, in discovery order.
    pub productive: IndexSet<Symbol>,
    /// Symbols still waiting to be propagated, front first.
    pub queue: Vec<Symbol>,
}

impl fmt::Display for ProductiveSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "productive = ")?;
        show_set(f, &self.productive)?;
        write!(f, ", queue = [")?;
        for (i, s) in self.queue.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", s)?;
        }
        write!(f, "]")
    }
}

pub type GrammarTrace = Trace<GrammarFocus, ProductiveSnapshot>;

/// Everything the analyzer found out about a grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrammarAnalysis {
    pub start: Symbol,
    /// True iff the start symbol derives no terminal string.
    pub is_empty: bool,
    /// Productive non-terminals, in discovery order.
    pub productive: IndexSet<Symbol>,
    /// Remaining non-terminals, in declaration order.
    pub unproductive: IndexSet<Symbol>,
    /// The production that first proved each productive symbol.
    pub witnesses: IndexMap<Symbol, Production>,
    /// Derivation tree of the start symbol, if the language is non-empty.
    pub derivation: Option<Derivation>,
    pub trace: GrammarTrace,
}

impl GrammarAnalysis {
    pub fn is_productive(&self, s: &Symbol) -> bool {
        self.productive.contains(s)
    }

    /// The grammar restricted to its productive non-terminals.
    ///
    /// Returns `None` when the language is empty, since the start symbol
    /// would be dropped.
    pub fn reduced(&self, grammar: &Grammar) -> Option<Grammar> {
        if self.is_empty {
            return None;
        }
        grammar.restrict_to(&self.productive).ok()
    }
}

/// Symbols of `rhs` that are neither terminals nor in `productive`, deduplicated.
fn missing<'a>(grammar: &Grammar, productive: &IndexSet<Symbol>, rhs: &'a [Symbol]) -> IndexSet<&'a Symbol> {
    rhs.iter()
        .filter(|s| !grammar.is_terminal(s) && !productive.contains(*s))
        .collect()
}

fn list(symbols: &IndexSet<&Symbol>) -> String {
    symbols.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
}

struct Closure<'g> {
    grammar: &'g Grammar,
    productive: IndexSet<Symbol>,
    witnesses: IndexMap<Symbol, Production>,
    queue: VecDeque<Symbol>,
    trace: GrammarTrace,
}

impl<'g> Closure<'g> {
    fn snapshot(&self) -> ProductiveSnapshot {
        ProductiveSnapshot {
            productive: self.productive.clone(),
            queue: self.queue.iter().cloned().collect(),
        }
    }

    fn record(&mut self, description: String, focus: GrammarFocus) {
        let snapshot = self.snapshot();
        self.trace.record(description, focus, snapshot);
    }

    fn mark(&mut self, production: &Production) {
        let lhs = production.lhs().clone();
        debug!("productive: {} via {}", lhs, production);
        self.productive.insert(lhs.clone());
        self.witnesses.insert(lhs.clone(), production.clone());
        self.queue.push_back(lhs);
    }

    fn scan(&mut self) {
        let grammar = self.grammar;
        for p in grammar.productions() {
            let focus = GrammarFocus::Production(p.clone());
            if self.productive.contains(p.lhs()) {
                self.record(format!("scan {}: {} is already productive", p, p.lhs()), focus);
                continue;
            }
            let blocking = missing(grammar, &IndexSet::new(), p.rhs());
            if blocking.is_empty() {
                self.mark(p);
                let what = if p.is_epsilon() { "derives ε" } else { "is terminal-only" };
                self.record(format!("scan {}: {}, {} is productive", p, what, p.lhs()), focus);
            } else {
                let description = format!("scan {}: blocked on {}", p, list(&blocking));
                self.record(description, focus);
            }
        }
    }

    fn propagate(&mut self, uses: &IndexMap<&'g Symbol, Vec<&'g Production>>) {
        while let Some(symbol) = self.queue.pop_front() {
            debug!("dequeue {}", symbol);
            let affected: &[&Production] = uses.get(&symbol).map(Vec::as_slice).unwrap_or(&[]);
            let description = format!("dequeue {}: recheck {} production(s) using it", symbol, affected.len());
            self.record(description, GrammarFocus::Symbol(symbol.clone()));

            for &p in affected {
                let focus = GrammarFocus::Production(p.clone());
                if self.productive.contains(p.lhs()) {
                    self.record(format!("{}: {} was already productive", p, p.lhs()), focus);
                    continue;
                }
                let blocking = missing(self.grammar, &self.productive, p.rhs());
                if blocking.is_empty() {
                    self.mark(p);
                    self.record(format!("{}: {} is now productive", p, p.lhs()), focus);
                } else {
                    let description = format!("{}: still blocked on {}", p, list(&blocking));
                    self.record(description, focus);
                }
            }
        }
    }
}

/// For every symbol, the productions whose right-hand side mentions it.
fn occurrences(grammar: &Grammar) -> IndexMap<&Symbol, Vec<&Production>> {
    let mut uses: IndexMap<&Symbol, Vec<&Production>> = IndexMap::new();
    for p in grammar.productions() {
        let distinct: IndexSet<&Symbol> = p.rhs().iter().collect();
        for s in distinct {
            if !grammar.is_terminal(s) {
                uses.entry(s).or_default().push(p);
            }
        }
    }
    uses
}

/// Decides whether the language of `grammar` is empty.
///
/// The grammar is not modified; the analysis owns all of its working state,
/// so repeated runs return identical results.
pub fn analyze(grammar: &Grammar) -> GrammarAnalysis {
    debug!(
        "analyze(start = {}, nonterminals = {}, productions = {})",
        grammar.start(),
        grammar.nonterminals().len(),
        grammar.num_productions()
    );

    let mut closure = Closure {
        grammar,
        productive: IndexSet::new(),
        witnesses: IndexMap::new(),
        queue: VecDeque::new(),
        trace: GrammarTrace::new(),
    };

    closure.scan();
    let uses = occurrences(grammar);
    closure.propagate(&uses);

    let start = grammar.start().clone();
    let is_empty = !closure.productive.contains(&start);
    let description = if is_empty {
        format!("{} is not productive: the language is empty", start)
    } else {
        format!("{} is productive: the language is non-empty", start)
    };
    closure.record(description, GrammarFocus::Symbol(start.clone()));

    let unproductive: IndexSet<Symbol> = grammar
        .nonterminals()
        .iter()
        .filter(|s| !closure.productive.contains(*s))
        .cloned()
        .collect();

    let derivation = if is_empty {
        None
    } else {
        Derivation::build(grammar, &closure.witnesses, &start)
    };

    GrammarAnalysis {
        start,
        is_empty,
        productive: closure.productive,
        unproductive,
        witnesses: closure.witnesses,
        derivation,
        trace: closure.trace,
    }
}

/// One application of the productivity rule: `known` together with every
/// left-hand side that has a production built only from terminals and `known`.
///
/// The productive set computed by [`analyze`] is a fixpoint of this function.
pub fn closure_step(grammar: &Grammar, known: &IndexSet<Symbol>) -> IndexSet<Symbol> {
    let mut next = known.clone();
    for p in grammar.productions() {
        if missing(grammar, known, p.rhs()).is_empty() {
            next.insert(p.lhs().clone());
        }
    }
    next
}
