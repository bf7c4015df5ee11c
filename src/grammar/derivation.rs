use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::grammar::cfg::{Grammar, Production, EPSILON};
use crate::types::Symbol;

/// A derivation tree witnessing that a symbol derives a terminal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Derivation {
    Terminal(Symbol),
    /// The empty string, the only child of an ε-production.
    Epsilon,
    Node {
        symbol: Symbol,
        production: Production,
        children: Vec<Derivation>,
    },
}

impl Derivation {
    /// Expands `symbol` through the witness productions.
    ///
    /// Returns `None` if `symbol` is neither a terminal nor has a witness, or if
    /// the witnesses refer back to a symbol that is still being expanded.
    pub fn build(grammar: &Grammar, witnesses: &IndexMap<Symbol, Production>, symbol: &Symbol) -> Option<Derivation> {
        let mut path = Vec::new();
        expand(grammar, witnesses, symbol, &mut path)
    }

    /// The derived terminal string, left to right.
    pub fn yield_string(&self) -> Vec<&Symbol> {
        let mut out = Vec::new();
        self.collect_terminals(&mut out);
        out
    }

    fn collect_terminals<'a>(&'a self, out: &mut Vec<&'a Symbol>) {
        match self {
            Derivation::Terminal(s) => out.push(s),
            Derivation::Epsilon => {}
            Derivation::Node { children, .. } => {
                for child in children {
                    child.collect_terminals(out);
                }
            }
        }
    }

    /// Height of the tree; leaves have depth 0.
    pub fn depth(&self) -> usize {
        match self {
            Derivation::Terminal(_) | Derivation::Epsilon => 0,
            Derivation::Node { children, .. } => 1 + children.iter().map(Derivation::depth).max().unwrap_or(0),
        }
    }

    /// Non-terminals expanded in the tree, in pre-order.
    pub fn nonterminals(&self) -> Vec<&Symbol> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if let Derivation::Node { symbol, children, .. } = node {
                out.push(symbol);
                stack.extend(children.iter().rev());
            }
        }
        out
    }
}

fn expand(
    grammar: &Grammar,
    witnesses: &IndexMap<Symbol, Production>,
    symbol: &Symbol,
    path: &mut Vec<Symbol>,
) -> Option<Derivation> {
    let Some(production) = witnesses.get(symbol) else {
        return grammar.is_terminal(symbol).then(|| Derivation::Terminal(symbol.clone()));
    };
    if path.contains(symbol) {
        return None;
    }

    path.push(symbol.clone());
    let children = if production.is_epsilon() {
        Some(vec![Derivation::Epsilon])
    } else {
        production
            .rhs()
            .iter()
            .map(|s| expand(grammar, witnesses, s, path))
            .collect::<Option<Vec<_>>>()
    };
    path.pop();

    Some(Derivation::Node {
        symbol: symbol.clone(),
        production: production.clone(),
        children: children?,
    })
}

impl fmt::Display for Derivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Derivation::Terminal(s) => write!(f, "{}", s),
            Derivation::Epsilon => write!(f, "{}", EPSILON),
            Derivation::Node { symbol, children, .. } => {
                write!(f, "[{}", symbol)?;
                for child in children {
                    write!(f, " {}", child)?;
                }
                write!(f, "]")
            }
        }
    }
}
