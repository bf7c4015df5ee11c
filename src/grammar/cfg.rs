use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::error::StructureError;
use crate::types::Symbol;

/// Marker printed for an empty right-hand side.
pub const EPSILON: &str = "ε";

/// A production `lhs → rhs`; an empty `rhs` derives the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Production {
    lhs: Symbol,
    rhs: Vec<Symbol>,
}

impl Production {
    pub fn new<I, T>(lhs: impl Into<Symbol>, rhs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Symbol>,
    {
        Self {
            lhs: lhs.into(),
            rhs: rhs.into_iter().map(Into::into).collect(),
        }
    }

    /// The production `lhs → ε`.
    pub fn epsilon(lhs: impl Into<Symbol>) -> Self {
        Self {
            lhs: lhs.into(),
            rhs: Vec::new(),
        }
    }

    pub fn lhs(&self) -> &Symbol {
        &self.lhs
    }

    pub fn rhs(&self) -> &[Symbol] {
        &self.rhs
    }

    pub fn is_epsilon(&self) -> bool {
        self.rhs.is_empty()
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} →", self.lhs)?;
        if self.rhs.is_empty() {
            return write!(f, " {}", EPSILON);
        }
        for s in &self.rhs {
            write!(f, " {}", s)?;
        }
        Ok(())
    }
}

/// A context-free grammar.
///
/// # Invariants
///
/// - There is at least one non-terminal, and the start symbol is one of them.
/// - Terminals and non-terminals are disjoint.
/// - Every production's left-hand side is a non-terminal.
///
/// Right-hand sides may mention symbols that are neither terminals nor
/// non-terminals; such symbols never derive anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    nonterminals: IndexSet<Symbol>,
    terminals: IndexSet<Symbol>,
    productions: IndexMap<Symbol, Vec<Production>>,
    start: Symbol,
}

impl Grammar {
    /// Creates a grammar whose start symbol is the first declared non-terminal.
    pub fn new<N, T, P>(nonterminals: N, terminals: T, productions: P) -> Result<Self, StructureError>
    where
        N: IntoIterator<Item = Symbol>,
        T: IntoIterator<Item = Symbol>,
        P: IntoIterator<Item = Production>,
    {
        let nonterminals: IndexSet<Symbol> = nonterminals.into_iter().collect();
        let start = nonterminals.first().cloned().ok_or(StructureError::EmptyGrammar)?;
        Self::with_start(nonterminals, terminals, productions, start)
    }

    /// Creates a grammar with an explicit start symbol.
    pub fn with_start<N, T, P>(
        nonterminals: N,
        terminals: T,
        productions: P,
        start: impl Into<Symbol>,
    ) -> Result<Self, StructureError>
    where
        N: IntoIterator<Item = Symbol>,
        T: IntoIterator<Item = Symbol>,
        P: IntoIterator<Item = Production>,
    {
        let nonterminals: IndexSet<Symbol> = nonterminals.into_iter().collect();
        let terminals: IndexSet<Symbol> = terminals.into_iter().collect();

        if nonterminals.is_empty() {
            return Err(StructureError::EmptyGrammar);
        }
        if let Some(s) = terminals.iter().find(|t| nonterminals.contains(*t)) {
            return Err(StructureError::OverlappingSymbol(s.clone()));
        }

        let start = start.into();
        if !nonterminals.contains(&start) {
            return Err(StructureError::MissingStartSymbol(start));
        }

        let mut map: IndexMap<Symbol, Vec<Production>> =
            nonterminals.iter().map(|n| (n.clone(), Vec::new())).collect();
        for production in productions {
            match map.get_mut(&production.lhs) {
                Some(list) => list.push(production),
                None => return Err(StructureError::UndeclaredLhs(production.lhs)),
            }
        }

        Ok(Self {
            nonterminals,
            terminals,
            productions: map,
            start,
        })
    }

    pub fn start(&self) -> &Symbol {
        &self.start
    }

    pub fn nonterminals(&self) -> &IndexSet<Symbol> {
        &self.nonterminals
    }

    pub fn terminals(&self) -> &IndexSet<Symbol> {
        &self.terminals
    }

    pub fn is_terminal(&self, s: &Symbol) -> bool {
        self.terminals.contains(s)
    }

    pub fn is_nonterminal(&self, s: &Symbol) -> bool {
        self.nonterminals.contains(s)
    }

    /// Productions of one non-terminal, in declaration order.
    pub fn productions_of(&self, s: &Symbol) -> &[Production] {
        self.productions.get(s).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All productions, grouped by non-terminal in declaration order.
    pub fn productions(&self) -> impl Iterator<Item = &Production> {
        self.productions.values().flatten()
    }

    pub fn num_productions(&self) -> usize {
        self.productions.values().map(Vec::len).sum()
    }

    /// A grammar restricted to the given non-terminals.
    ///
    /// Productions mentioning a dropped non-terminal (or an undeclared symbol)
    /// are removed. Fails if the start symbol is dropped.
    pub fn restrict_to(&self, keep: &IndexSet<Symbol>) -> Result<Grammar, StructureError> {
        let nonterminals: Vec<Symbol> = self.nonterminals.iter().filter(|n| keep.contains(*n)).cloned().collect();
        let productions: Vec<Production> = self
            .productions()
            .filter(|p| keep.contains(&p.lhs))
            .filter(|p| p.rhs.iter().all(|s| self.is_terminal(s) || keep.contains(s)))
            .cloned()
            .collect();
        Grammar::with_start(nonterminals, self.terminals.iter().cloned(), productions, self.start.clone())
    }
}

/// Whether the textual front-end classifies an undeclared right-hand symbol
/// as a non-terminal.
pub(crate) fn looks_like_nonterminal(s: &Symbol) -> bool {
    s.as_str().starts_with(char::is_uppercase)
}

impl Grammar {
    /// Whether the bare rule listing is parsed back into this same grammar.
    fn rules_are_self_describing(&self) -> bool {
        let first_lhs = self.productions.iter().find(|(_, ps)| !ps.is_empty()).map(|(n, _)| n);
        if first_lhs != Some(&self.start) {
            return false;
        }
        let mentioned: IndexSet<&Symbol> = self.productions().flat_map(|p| p.rhs.iter()).collect();
        if mentioned.iter().any(|s| !self.is_terminal(s) && !self.is_nonterminal(s)) {
            return false;
        }
        let bare_nonterminals = self
            .productions
            .iter()
            .filter(|(_, ps)| ps.is_empty())
            .all(|(n, _)| looks_like_nonterminal(n) && mentioned.contains(n));
        let terminals = self
            .terminals
            .iter()
            .all(|t| !looks_like_nonterminal(t) && mentioned.contains(t));
        bare_nonterminals && terminals
    }
}

/// Writes the grammar in the form read by [`Grammar::parse`].
///
/// Symbol declarations are written as `%nonterminals` / `%terminals` header
/// lines whenever the rules alone would be classified differently.
impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.rules_are_self_describing() {
            write!(f, "%nonterminals")?;
            for n in &self.nonterminals {
                write!(f, " {}", n)?;
            }
            writeln!(f)?;
            write!(f, "%terminals")?;
            for t in &self.terminals {
                write!(f, " {}", t)?;
            }
            writeln!(f)?;
            if self.nonterminals.first() != Some(&self.start) {
                writeln!(f, "%start {}", self.start)?;
            }
        }
        for (lhs, productions) in &self.productions {
            if productions.is_empty() {
                continue;
            }
            write!(f, "{} ->", lhs)?;
            for (i, p) in productions.iter().enumerate() {
                if i > 0 {
                    write!(f, " |")?;
                }
                if p.rhs.is_empty() {
                    write!(f, " {}", EPSILON)?;
                }
                for s in &p.rhs {
                    write!(f, " {}", s)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    fn syms(names: &[&str]) -> Vec<Symbol> {
        names.iter().map(|s| Symbol::from(*s)).collect()
    }

    #[test]
    fn test_new_grammar() {
        let g = Grammar::new(
            syms(&["S", "A"]),
            syms(&["a"]),
            [
                Production::new("S", ["A", "a"]),
                Production::epsilon("S"),
                Production::new("A", ["A"]),
            ],
        )
        .unwrap();
        assert_eq!(g.start(), &Symbol::from("S"));
        assert_eq!(g.num_productions(), 3);
        assert_eq!(g.productions_of(&"S".into()).len(), 2);
        assert!(g.productions_of(&"S".into())[1].is_epsilon());
        assert!(g.is_terminal(&"a".into()));
        assert!(g.is_nonterminal(&"A".into()));
        assert!(g.productions_of(&"zzz".into()).is_empty());
    }

    #[test]
    fn test_production_display() {
        assert_eq!(Production::new("S", ["A", "a"]).to_string(), "S → A a");
        assert_eq!(Production::epsilon("S").to_string(), "S → ε");
    }

    #[test]
    fn test_invalid_grammars() {
        assert_eq!(
            Grammar::new(vec![], syms(&["a"]), vec![]),
            Err(StructureError::EmptyGrammar)
        );
        assert_eq!(
            Grammar::new(syms(&["S", "a"]), syms(&["a"]), vec![]),
            Err(StructureError::OverlappingSymbol("a".into()))
        );
        assert_eq!(
            Grammar::new(syms(&["S"]), syms(&["a"]), vec![Production::new("T", ["a"])]),
            Err(StructureError::UndeclaredLhs("T".into()))
        );
        assert_eq!(
            Grammar::with_start(syms(&["S"]), syms(&["a"]), vec![], "X"),
            Err(StructureError::MissingStartSymbol("X".into()))
        );
    }

    #[test]
    fn test_restrict_to() {
        let g = Grammar::new(
            syms(&["S", "A", "B"]),
            syms(&["a", "b"]),
            [
                Production::new("S", ["A", "B"]),
                Production::new("S", ["a"]),
                Production::new("A", ["a"]),
                Production::new("B", ["B", "b"]),
            ],
        )
        .unwrap();
        let keep: IndexSet<Symbol> = syms(&["S", "A"]).into_iter().collect();
        let trimmed = g.restrict_to(&keep).unwrap();
        assert_eq!(trimmed.nonterminals().len(), 2);
        assert_eq!(trimmed.num_productions(), 2);
        assert_eq!(trimmed.to_string(), "%nonterminals S A\n%terminals a b\nS -> a\nA -> a\n");

        let without_start: IndexSet<Symbol> = syms(&["A"]).into_iter().collect();
        assert!(g.restrict_to(&without_start).is_err());
    }
}
