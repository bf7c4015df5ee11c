//! Post-order evaluation of monotone circuits.
//!
//! Children are always evaluated before their parent, and each gate produces
//! exactly one trace step holding its inputs and result. Unassigned leaves
//! make every gate above them [`Value::Incomplete`]; evaluation never
//! short-circuits, so the trace covers every gate reachable from the root.

use std::fmt;

use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

use crate::circuit::gate::GateKind;
use crate::circuit::node::{Circuit, CircuitNode, CircuitRef};
use crate::trace::Trace;
use crate::types::NodeId;

/// Result of evaluating a node.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Value {
    Known(bool),
    /// Some leaf below this node has no value.
    Incomplete,
}

impl Value {
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Value::Known(b) => Some(b),
            Value::Incomplete => None,
        }
    }

    pub fn is_incomplete(self) -> bool {
        self == Value::Incomplete
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Known(b)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Known(true) => write!(f, "1"),
            Value::Known(false) => write!(f, "0"),
            Value::Incomplete => write!(f, "?"),
        }
    }
}

/// One gate evaluation: the resolved inputs and the derived result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateEval {
    pub node: CircuitRef,
    pub kind: GateKind,
    pub inputs: Vec<(CircuitRef, Value)>,
    pub result: Value,
}

/// Values known after a step, keyed by node identifier in evaluation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvalSnapshot {
    pub values: IndexMap<NodeId, Value>,
}

impl fmt::Display for EvalSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::trace::show_set(f, self.values.iter().map(|(id, v)| format!("{}={}", id, v)))
    }
}

pub type CircuitTrace = Trace<NodeId, EvalSnapshot>;

/// Output of [`evaluate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CircuitAnalysis {
    /// Value of the root.
    pub output: Value,
    /// Gate evaluations in post-order; `gates[i]` belongs to trace step `i`.
    pub gates: Vec<GateEval>,
    pub trace: CircuitTrace,
    values: Vec<Option<Value>>,
}

impl CircuitAnalysis {
    /// Value of a node, if it is reachable from the root.
    pub fn value_of(&self, r: CircuitRef) -> Option<Value> {
        self.values.get(r.index()).copied().flatten()
    }
}

fn combine(kind: GateKind, inputs: &[Value]) -> Value {
    let mut known = Vec::with_capacity(inputs.len());
    for value in inputs {
        match value {
            Value::Known(b) => known.push(*b),
            Value::Incomplete => return Value::Incomplete,
        }
    }
    if let [single] = known[..] {
        return Value::Known(single);
    }
    Value::Known(kind.apply(known))
}

fn describe(circuit: &Circuit, eval: &GateEval) -> String {
    let id = circuit.label(eval.node);
    if let [(child, value)] = eval.inputs[..] {
        return format!("{} passes {} = {} through", id, circuit.label(child), value);
    }
    let args: Vec<String> = eval.inputs.iter().map(|(_, v)| v.to_string()).collect();
    let mut description = format!("{} = {}({}) = {}", id, eval.kind, args.join(", "), eval.result);
    if eval.result.is_incomplete() {
        description.push_str(" (an input is unresolved)");
    }
    description
}

/// Evaluates the circuit from its root.
pub fn evaluate(circuit: &Circuit) -> CircuitAnalysis {
    debug!("evaluate(root = {}, nodes = {})", circuit.label(circuit.root()), circuit.len());

    let mut values: Vec<Option<Value>> = vec![None; circuit.len()];
    let mut known: IndexMap<NodeId, Value> = IndexMap::new();
    let mut gates = Vec::new();
    let mut trace = CircuitTrace::new();

    let mut stack = vec![(circuit.root(), false)];
    while let Some((r, expanded)) = stack.pop() {
        if values[r.index()].is_some() {
            continue;
        }
        match circuit.node(r) {
            CircuitNode::Leaf { value } => {
                let value = value.map_or(Value::Incomplete, Value::Known);
                values[r.index()] = Some(value);
                known.insert(circuit.label(r).clone(), value);
            }
            CircuitNode::Gate { kind, children } if !expanded => {
                debug!("expand {} ({}, {} children)", circuit.label(r), kind, children.len());
                stack.push((r, true));
                for &c in children.iter().rev() {
                    if values[c.index()].is_none() {
                        stack.push((c, false));
                    }
                }
            }
            CircuitNode::Gate { kind, children } => {
                let inputs: Vec<(CircuitRef, Value)> = children
                    .iter()
                    .map(|&c| (c, values[c.index()].unwrap_or(Value::Incomplete)))
                    .collect();
                let input_values: Vec<Value> = inputs.iter().map(|(_, v)| *v).collect();
                let result = combine(*kind, &input_values);
                debug!("{} = {}", circuit.label(r), result);

                values[r.index()] = Some(result);
                known.insert(circuit.label(r).clone(), result);

                let eval = GateEval {
                    node: r,
                    kind: *kind,
                    inputs,
                    result,
                };
                let description = describe(circuit, &eval);
                trace.record(
                    description,
                    circuit.label(r).clone(),
                    EvalSnapshot { values: known.clone() },
                );
                gates.push(eval);
            }
        }
    }

    let output = values[circuit.root().index()].unwrap_or(Value::Incomplete);

    CircuitAnalysis {
        output,
        gates,
        trace,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::circuit::CircuitBuilder;

    #[test]
    fn test_and_of_or() {
        let circuit = Circuit::parse("AND(1, OR(0, 0))").unwrap();
        let analysis = evaluate(&circuit);
        println!("{}", analysis.trace);
        assert_eq!(analysis.output, Value::Known(false));
        assert_eq!(analysis.gates.len(), 2);
        assert_eq!(analysis.gates[0].kind, GateKind::Or);
        assert_eq!(analysis.gates[0].result, Value::Known(false));
        assert_eq!(analysis.gates[1].kind, GateKind::And);
        assert_eq!(analysis.gates[1].result, Value::Known(false));
    }

    #[test]
    fn test_pass_through() {
        for value in [false, true] {
            let mut b = CircuitBuilder::new();
            let x = b.leaf(value);
            let g = b.and([x]).unwrap();
            let circuit = b.finish(g).unwrap();
            let analysis = evaluate(&circuit);
            assert_eq!(analysis.output, Value::Known(value));
            assert_eq!(analysis.value_of(g), analysis.value_of(x));
            assert!(analysis.trace.first().unwrap().description().contains("passes"));
        }
    }

    #[test]
    fn test_incomplete_propagates() {
        let circuit = Circuit::parse("OR(1, AND(?, 1))").unwrap();
        let analysis = evaluate(&circuit);
        // OR would be 1 either way, but no short-circuit on missing data.
        assert_eq!(analysis.output, Value::Incomplete);
        assert_eq!(analysis.gates.len(), 2);
        assert_eq!(analysis.gates[0].result, Value::Incomplete);
    }

    #[test]
    fn test_shared_node_evaluated_once() {
        let mut b = CircuitBuilder::new();
        let x = b.leaf(true);
        let y = b.leaf(false);
        let shared = b.or([x, y]).unwrap();
        let left = b.and([shared, x]).unwrap();
        let root = b.or([left, shared]).unwrap();
        let circuit = b.finish(root).unwrap();
        let analysis = evaluate(&circuit);
        assert_eq!(analysis.output, Value::Known(true));
        assert_eq!(analysis.gates.len(), 3);
    }

    #[test]
    fn test_post_order() {
        let circuit = Circuit::parse("OR(AND(1, 1), AND(0, OR(1, 0)))").unwrap();
        let analysis = evaluate(&circuit);
        let position = |r: CircuitRef| analysis.gates.iter().position(|g| g.node == r).unwrap();
        for eval in &analysis.gates {
            for (child, _) in &eval.inputs {
                if !circuit.node(*child).is_leaf() {
                    assert!(position(*child) < position(eval.node));
                }
            }
        }
        assert_eq!(analysis.output, Value::Known(true));
    }

    #[test]
    fn test_snapshots_are_independent() {
        let circuit = Circuit::parse("AND(1, OR(0, 1))").unwrap();
        let analysis = evaluate(&circuit);
        let first = analysis.trace.get(0).unwrap().snapshot();
        let last = analysis.trace.last().unwrap().snapshot();
        assert!(first.values.len() < last.values.len());
    }

    #[test]
    fn test_leaf_root() {
        let circuit = Circuit::parse("1").unwrap();
        let analysis = evaluate(&circuit);
        assert_eq!(analysis.output, Value::Known(true));
        assert!(analysis.trace.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let circuit = Circuit::parse("AND(OR(1, ?), OR(0, 1), 1)").unwrap();
        assert_eq!(evaluate(&circuit), evaluate(&circuit));
    }
}
