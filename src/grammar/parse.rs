//! Textual grammar front-end.
//!
//! One rule per line, alternatives separated by `|`:
//!
//! ```text
//! # comment
//! S -> A a | ε
//! A → A
//! ```
//!
//! Left-hand sides are the non-terminals, in order of first appearance; the
//! first one is the start symbol. `ε`, `eps`, `epsilon` or an empty
//! alternative denote the empty string. A right-hand symbol that never
//! appears on the left is a terminal, unless it starts with an upper-case
//! letter, in which case it is a non-terminal without productions.
//!
//! Lines starting with `%` are directives:
//!
//! ```text
//! %nonterminals S A
//! %terminals ID a
//! %start S
//! ```
//!
//! Once `%nonterminals` or `%terminals` appears, nothing is inferred: the
//! declared symbols plus the left-hand sides are the whole vocabulary, and a
//! right-hand symbol declared in neither list stays undeclared. `%start`
//! overrides the start symbol.

use std::str::FromStr;

use indexmap::IndexSet;

use crate::error::{ParseError, StructureError};
use crate::grammar::cfg::{looks_like_nonterminal, Grammar, Production};
use crate::types::Symbol;

fn is_epsilon(token: &str) -> bool {
    matches!(token, "ε" | "eps" | "epsilon")
}

fn split_arrow(line: &str) -> Option<(&str, &str)> {
    let ascii = line.find("->").map(|i| (i, 2));
    let unicode = line.find('→').map(|i| (i, '→'.len_utf8()));
    let (i, len) = match (ascii, unicode) {
        (Some(a), Some(u)) => {
            if a.0 < u.0 {
                a
            } else {
                u
            }
        }
        (Some(a), None) => a,
        (None, Some(u)) => u,
        (None, None) => return None,
    };
    Some((&line[..i], &line[i + len..]))
}

#[derive(Default)]
struct Declarations {
    nonterminals: IndexSet<Symbol>,
    terminals: IndexSet<Symbol>,
    start: Option<Symbol>,
    explicit: bool,
}

impl Declarations {
    fn read(&mut self, line_no: usize, directive: &str) -> Result<(), ParseError> {
        let mut tokens = directive.split_whitespace();
        let name = tokens.next().unwrap_or_default();
        match name {
            "nonterminals" => {
                self.explicit = true;
                self.nonterminals.extend(tokens.map(Symbol::from));
            }
            "terminals" => {
                self.explicit = true;
                self.terminals.extend(tokens.map(Symbol::from));
            }
            "start" => match (tokens.next(), tokens.next()) {
                (Some(start), None) => self.start = Some(Symbol::from(start)),
                _ => {
                    return Err(ParseError::InvalidDirective {
                        line: line_no,
                        name: name.to_owned(),
                    })
                }
            },
            _ => {
                return Err(ParseError::InvalidDirective {
                    line: line_no,
                    name: name.to_owned(),
                })
            }
        }
        Ok(())
    }
}

impl Grammar {
    /// Parses a grammar from its textual form.
    pub fn parse(input: &str) -> Result<Grammar, ParseError> {
        let mut declarations = Declarations::default();
        let mut lhs_order: IndexSet<Symbol> = IndexSet::new();
        let mut mentioned: IndexSet<Symbol> = IndexSet::new();
        let mut productions = Vec::new();

        for (k, raw) in input.lines().enumerate() {
            let line_no = k + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(directive) = line.strip_prefix('%') {
                declarations.read(line_no, directive)?;
                continue;
            }

            let (lhs, rhs) = split_arrow(line).ok_or(ParseError::MissingArrow { line: line_no })?;
            let mut lhs_tokens = lhs.split_whitespace();
            let lhs = lhs_tokens.next().ok_or(ParseError::MissingLhs { line: line_no })?;
            if let Some(extra) = lhs_tokens.next() {
                return Err(ParseError::ExtraLhsToken {
                    line: line_no,
                    found: extra.to_owned(),
                });
            }
            let lhs = Symbol::from(lhs);
            lhs_order.insert(lhs.clone());

            for alternative in rhs.split('|') {
                let symbols: Vec<Symbol> = alternative
                    .split_whitespace()
                    .filter(|t| !is_epsilon(t))
                    .map(Symbol::from)
                    .collect();
                mentioned.extend(symbols.iter().cloned());
                productions.push(Production::new(lhs.clone(), symbols));
            }
        }

        let Declarations {
            mut nonterminals,
            mut terminals,
            start,
            explicit,
        } = declarations;
        nonterminals.extend(lhs_order);
        if !explicit {
            for s in mentioned {
                if nonterminals.contains(&s) {
                    continue;
                }
                if looks_like_nonterminal(&s) {
                    nonterminals.insert(s);
                } else {
                    terminals.insert(s);
                }
            }
        }

        let start = match start {
            Some(start) => start,
            None => nonterminals.first().cloned().ok_or(StructureError::EmptyGrammar)?,
        };
        Ok(Grammar::with_start(nonterminals, terminals, productions, start)?)
    }
}

impl FromStr for Grammar {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Grammar::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::grammar::analyze;

    #[test]
    fn test_parse_grammar() {
        let g = Grammar::parse("S -> A a | ε\nA → A\n").unwrap();
        assert_eq!(g.start().as_str(), "S");
        let nts: Vec<_> = g.nonterminals().iter().map(Symbol::as_str).collect();
        assert_eq!(nts, vec!["S", "A"]);
        let ts: Vec<_> = g.terminals().iter().map(Symbol::as_str).collect();
        assert_eq!(ts, vec!["a"]);
        assert_eq!(g.num_productions(), 3);
        assert!(g.productions_of(&"S".into())[1].is_epsilon());
    }

    #[test]
    fn test_parse_empty_alternative() {
        let g = Grammar::parse("S -> a S b |").unwrap();
        assert_eq!(g.num_productions(), 2);
        assert!(g.productions_of(&"S".into())[1].is_epsilon());
    }

    #[test]
    fn test_parse_comments_and_blank_lines() {
        let g = Grammar::parse("# balanced\n\nS -> ( S ) S | eps\n").unwrap();
        assert_eq!(g.terminals().len(), 2);
    }

    #[test]
    fn test_uppercase_undeclared_is_nonterminal() {
        let g = Grammar::parse("S -> B a").unwrap();
        assert!(g.is_nonterminal(&"B".into()));
        assert!(g.productions_of(&"B".into()).is_empty());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Grammar::parse("S a b"), Err(ParseError::MissingArrow { line: 1 }));
        assert_eq!(Grammar::parse("S -> a\n -> b"), Err(ParseError::MissingLhs { line: 2 }));
        assert_eq!(
            Grammar::parse("S -> a\nS T -> a"),
            Err(ParseError::ExtraLhsToken {
                line: 2,
                found: "T".to_owned()
            })
        );
        assert_eq!(
            Grammar::parse("%tokens a\nS -> a"),
            Err(ParseError::InvalidDirective {
                line: 1,
                name: "tokens".to_owned()
            })
        );
        assert_eq!(
            Grammar::parse("%start\nS -> a"),
            Err(ParseError::InvalidDirective {
                line: 1,
                name: "start".to_owned()
            })
        );
        assert_eq!(
            Grammar::parse("# nothing"),
            Err(ParseError::Structure(StructureError::EmptyGrammar))
        );
    }

    #[test]
    fn test_display_round_trip() {
        let text = "S -> A B | a\nA -> ε\nB -> b B | b\n";
        let g = Grammar::parse(text).unwrap();
        assert_eq!(g.to_string(), text);
        let again = Grammar::parse(&g.to_string()).unwrap();
        assert_eq!(g, again);
    }

    #[test]
    fn test_declared_symbols_are_not_inferred() {
        let g = Grammar::parse("%nonterminals S b\n%terminals ID\nS -> ID | b | zz").unwrap();
        assert!(g.is_terminal(&"ID".into()));
        assert!(g.is_nonterminal(&"b".into()));
        assert!(!g.is_terminal(&"zz".into()) && !g.is_nonterminal(&"zz".into()));
        assert_eq!(g.start().as_str(), "S");

        let g = Grammar::parse("%start T\nS -> a\nT -> S").unwrap();
        assert_eq!(g.start().as_str(), "T");
    }

    #[test]
    fn test_display_keeps_declarations() {
        let sym = |s: &str| Symbol::from(s);
        let grammars = [
            // Upper-case terminal.
            Grammar::new([sym("S")], [sym("ID")], [Production::new("S", ["ID"])]).unwrap(),
            // Lower-case non-terminal without productions, unused terminal.
            Grammar::new(
                [sym("S"), sym("b")],
                [sym("a"), sym("c")],
                [Production::new("S", ["a"]), Production::new("S", ["b"])],
            )
            .unwrap(),
            // Undeclared right-hand symbol, start without productions.
            Grammar::with_start(
                [sym("S"), sym("T")],
                [sym("a")],
                [Production::new("S", ["a", "zz"])],
                "T",
            )
            .unwrap(),
        ];
        for g in grammars {
            let text = g.to_string();
            assert!(text.starts_with("%nonterminals"), "{}", text);
            let again = Grammar::parse(&text).unwrap();
            assert_eq!(g, again, "{}", text);
            assert_eq!(g.start(), again.start());
            assert_eq!(analyze(&g), analyze(&again));
        }

        let g = Grammar::new([sym("S")], [sym("ID")], [Production::new("S", ["ID"])]).unwrap();
        assert_eq!(g.to_string(), "%nonterminals S\n%terminals ID\nS -> ID\n");
        assert!(!analyze(&Grammar::parse(&g.to_string()).unwrap()).is_empty);
    }
}
