//! Expression front-end for circuits.
//!
//! Two notations are accepted and may be mixed:
//!
//! ```text
//! prefix:  AND(1, OR(0, 0))
//! infix:   1 & (0 | 0)        (also ∧ ∨ * + and the words and/or)
//! ```
//!
//! Leaves are `0`, `1` or `?` (unassigned). AND binds tighter than OR, and
//! chains of the same operator become a single n-ary gate. A prefix gate with
//! a single argument is kept as a pass-through gate.

use std::str::FromStr;

use crate::circuit::gate::GateKind;
use crate::circuit::node::{Circuit, CircuitBuilder, CircuitRef};
use crate::error::ParseError;
use crate::ids::{IdSource, Sequential};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    Zero,
    One,
    Unknown,
    LParen,
    RParen,
    Comma,
    And,
    Or,
    Word(String),
}

fn tokenize(input: &str) -> Result<Vec<(usize, Tok)>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        let tok = match ch {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '0' => Tok::Zero,
            '1' => Tok::One,
            '?' => Tok::Unknown,
            '(' => Tok::LParen,
            ')' => Tok::RParen,
            ',' => Tok::Comma,
            '&' | '∧' | '*' => Tok::And,
            '|' | '∨' | '+' => Tok::Or,
            c if c.is_alphabetic() || c == '_' => {
                let mut word = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        word.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push((pos, Tok::Word(word)));
                continue;
            }
            ch => return Err(ParseError::UnexpectedChar { pos, ch }),
        };
        chars.next();
        tokens.push((pos, tok));
    }

    Ok(tokens)
}

struct Parser<I> {
    tokens: Vec<(usize, Tok)>,
    pos: usize,
    builder: CircuitBuilder<I>,
}

impl<I: IdSource> Parser<I> {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn next(&mut self) -> Result<(usize, Tok), ParseError> {
        let tok = self.tokens.get(self.pos).cloned().ok_or(ParseError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(tok)
    }

    fn expect(&mut self, expected: Tok) -> Result<(), ParseError> {
        let (pos, tok) = self.next()?;
        if tok == expected {
            Ok(())
        } else {
            Err(unexpected(pos, &tok))
        }
    }

    fn infix_op(&self) -> Option<GateKind> {
        match self.peek()? {
            Tok::And => Some(GateKind::And),
            Tok::Or => Some(GateKind::Or),
            Tok::Word(w) if w.eq_ignore_ascii_case("and") => Some(GateKind::And),
            Tok::Word(w) if w.eq_ignore_ascii_case("or") => Some(GateKind::Or),
            _ => None,
        }
    }

    /// Parses `operand (op operand)*` for one operator level.
    fn chain(
        &mut self,
        kind: GateKind,
        operand: fn(&mut Self) -> Result<CircuitRef, ParseError>,
    ) -> Result<CircuitRef, ParseError> {
        let first = operand(self)?;
        let mut operands = vec![first];
        while self.infix_op() == Some(kind) {
            self.pos += 1;
            operands.push(operand(self)?);
        }
        if operands.len() == 1 {
            Ok(first)
        } else {
            Ok(self.builder.gate(kind, operands)?)
        }
    }

    fn expr(&mut self) -> Result<CircuitRef, ParseError> {
        self.chain(GateKind::Or, Self::term)
    }

    fn term(&mut self) -> Result<CircuitRef, ParseError> {
        self.chain(GateKind::And, Self::factor)
    }

    fn factor(&mut self) -> Result<CircuitRef, ParseError> {
        let (pos, tok) = self.next()?;
        match tok {
            Tok::Zero => Ok(self.builder.leaf(false)),
            Tok::One => Ok(self.builder.leaf(true)),
            Tok::Unknown => Ok(self.builder.unknown()),
            Tok::LParen => {
                let inner = self.expr()?;
                self.expect(Tok::RParen)?;
                Ok(inner)
            }
            Tok::Word(word) if matches!(self.peek(), Some(Tok::LParen)) => {
                let kind: GateKind = word.parse()?;
                self.pos += 1;
                let mut children = vec![self.expr()?];
                loop {
                    let (pos, tok) = self.next()?;
                    match tok {
                        Tok::Comma => children.push(self.expr()?),
                        Tok::RParen => break,
                        other => return Err(unexpected(pos, &other)),
                    }
                }
                Ok(self.builder.gate(kind, children)?)
            }
            other => Err(unexpected(pos, &other)),
        }
    }
}

fn unexpected(pos: usize, tok: &Tok) -> ParseError {
    let found = match tok {
        Tok::Zero => "0".to_owned(),
        Tok::One => "1".to_owned(),
        Tok::Unknown => "?".to_owned(),
        Tok::LParen => "(".to_owned(),
        Tok::RParen => ")".to_owned(),
        Tok::Comma => ",".to_owned(),
        Tok::And => "&".to_owned(),
        Tok::Or => "|".to_owned(),
        Tok::Word(w) => w.clone(),
    };
    ParseError::UnexpectedToken { pos, found }
}

impl Circuit {
    /// Parses an expression, naming nodes `n0`, `n1`, ... in creation order.
    pub fn parse(input: &str) -> Result<Circuit, ParseError> {
        Self::parse_with_ids(input, Sequential::default())
    }

    /// Parses an expression, drawing node identifiers from `ids`.
    pub fn parse_with_ids<I: IdSource>(input: &str, ids: I) -> Result<Circuit, ParseError> {
        let mut parser = Parser {
            tokens: tokenize(input)?,
            pos: 0,
            builder: CircuitBuilder::with_ids(ids),
        };
        let root = parser.expr()?;
        if let Some((pos, _)) = parser.tokens.get(parser.pos) {
            return Err(ParseError::TrailingInput { pos: *pos });
        }
        Ok(parser.builder.finish(root)?)
    }
}

impl FromStr for Circuit {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Circuit::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::circuit::CircuitNode;
    use crate::error::StructureError;

    #[test]
    fn test_parse_prefix() {
        let circuit = Circuit::parse("AND(1, OR(0, 0))").unwrap();
        assert_eq!(circuit.to_string(), "AND(1, OR(0, 0))");
        assert_eq!(circuit.num_gates(), 2);
    }

    #[test]
    fn test_parse_infix_precedence() {
        let circuit = Circuit::parse("1 | 0 & ?").unwrap();
        assert_eq!(circuit.to_string(), "OR(1, AND(0, ?))");
        let circuit = Circuit::parse("(1 | 0) & ?").unwrap();
        assert_eq!(circuit.to_string(), "AND(OR(1, 0), ?)");
    }

    #[test]
    fn test_parse_chain_is_flattened() {
        let circuit = Circuit::parse("1 ∧ 0 ∧ 1 ∧ 1").unwrap();
        assert_eq!(circuit.to_string(), "AND(1, 0, 1, 1)");
        let circuit = Circuit::parse("0 or 1 or 0").unwrap();
        assert_eq!(circuit.to_string(), "OR(0, 1, 0)");
        let circuit = Circuit::parse("1 and (0 or 1)").unwrap();
        assert_eq!(circuit.to_string(), "AND(1, OR(0, 1))");
    }

    #[test]
    fn test_parse_mixed() {
        let circuit = Circuit::parse("OR(1 & 0, 0) | and(1)").unwrap();
        assert_eq!(circuit.to_string(), "OR(OR(AND(1, 0), 0), AND(1))");
    }

    #[test]
    fn test_single_argument_gate_is_kept() {
        let circuit = Circuit::parse("OR(1)").unwrap();
        match circuit.node(circuit.root()) {
            CircuitNode::Gate { kind, children } => {
                assert_eq!(*kind, GateKind::Or);
                assert_eq!(children.len(), 1);
            }
            other => panic!("expected a gate, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_gate_kind() {
        let result = Circuit::parse("XOR(1, 0)");
        assert_eq!(
            result,
            Err(ParseError::Structure(StructureError::UnknownGateKind("XOR".to_owned())))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Circuit::parse(""), Err(ParseError::UnexpectedEnd));
        assert_eq!(Circuit::parse("AND(1, 0"), Err(ParseError::UnexpectedEnd));
        assert_eq!(Circuit::parse("1 0"), Err(ParseError::TrailingInput { pos: 2 }));
        assert_eq!(Circuit::parse("2"), Err(ParseError::UnexpectedChar { pos: 0, ch: '2' }));
        assert!(matches!(Circuit::parse("1 & )"), Err(ParseError::UnexpectedToken { .. })));
    }

    #[test]
    fn test_display_round_trip() {
        for text in ["AND(1, OR(0, 0))", "OR(?, AND(1, 1, 0), OR(1))", "0"] {
            let circuit: Circuit = text.parse().unwrap();
            let again: Circuit = circuit.to_string().parse().unwrap();
            assert_eq!(circuit, again);
        }
    }
}
