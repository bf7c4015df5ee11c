use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StructureError;

/// Operator of a monotone gate.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum GateKind {
    And,
    Or,
}

impl GateKind {
    /// Value of the gate over the given inputs.
    ///
    /// Over no inputs AND yields `true` and OR yields `false`.
    pub fn apply(self, inputs: impl IntoIterator<Item = bool>) -> bool {
        let mut it = inputs.into_iter();
        match self {
            GateKind::And => it.all(|b| b),
            GateKind::Or => it.any(|b| b),
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateKind::And => write!(f, "AND"),
            GateKind::Or => write!(f, "OR"),
        }
    }
}

impl FromStr for GateKind {
    type Err = StructureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "AND" | "And" | "and" | "&" | "∧" => Ok(GateKind::And),
            "OR" | "Or" | "or" | "|" | "∨" => Ok(GateKind::Or),
            other => Err(StructureError::UnknownGateKind(other.to_owned())),
        }
    }
}

impl TryFrom<String> for GateKind {
    type Error = StructureError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GateKind> for String {
    fn from(kind: GateKind) -> Self {
        kind.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_and() {
        assert!(GateKind::And.apply([true, true]));
        assert!(!GateKind::And.apply([true, false]));
        assert!(GateKind::And.apply([]));
    }

    #[test]
    fn test_gate_or() {
        assert!(GateKind::Or.apply([false, true]));
        assert!(!GateKind::Or.apply([false, false]));
        assert!(!GateKind::Or.apply([]));
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("AND".parse(), Ok(GateKind::And));
        assert_eq!("∨".parse(), Ok(GateKind::Or));
        assert_eq!(
            "XOR".parse::<GateKind>(),
            Err(StructureError::UnknownGateKind("XOR".to_owned()))
        );
    }

    #[test]
    fn test_kind_serde() {
        assert_eq!(serde_json::to_string(&GateKind::Or).unwrap(), "\"OR\"");
        let kind: GateKind = serde_json::from_str("\"and\"").unwrap();
        assert_eq!(kind, GateKind::And);
        assert!(serde_json::from_str::<GateKind>("\"NAND\"").is_err());
    }
}
