use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::circuit::gate::GateKind;
use crate::circuit::node::{Circuit, CircuitBuilder, CircuitRef};
use crate::error::StructureError;
use crate::ids::IdSource;

/// Parameters of the random circuit generator.
#[derive(Debug, Clone)]
pub struct CircuitGenConfig {
    /// Maximum number of gate levels above the leaves.
    pub depth: usize,
    /// Maximum number of children of a gate (at least one).
    pub max_fanin: usize,
    /// Probability of stopping early with a leaf below the root, clamped to `[0, 1]`.
    pub leaf_probability: f64,
    /// Probability that a leaf is left unassigned, clamped to `[0, 1]`.
    pub unknown_probability: f64,
    pub seed: u64,
}

impl Default for CircuitGenConfig {
    fn default() -> Self {
        Self {
            depth: 4,
            max_fanin: 3,
            leaf_probability: 0.3,
            unknown_probability: 0.0,
            seed: 42,
        }
    }
}

fn chance(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

struct Generator<'a, I> {
    config: &'a CircuitGenConfig,
    rng: ChaCha8Rng,
    builder: CircuitBuilder<I>,
}

impl<I: IdSource> Generator<'_, I> {
    fn leaf(&mut self) -> CircuitRef {
        if self.rng.random_bool(chance(self.config.unknown_probability)) {
            self.builder.unknown()
        } else {
            let value = self.rng.random_bool(0.5);
            self.builder.leaf(value)
        }
    }

    fn node(&mut self, depth: usize, is_root: bool) -> Result<CircuitRef, StructureError> {
        if depth == 0 || (!is_root && self.rng.random_bool(chance(self.config.leaf_probability))) {
            return Ok(self.leaf());
        }
        let kind = if self.rng.random_bool(0.5) {
            GateKind::And
        } else {
            GateKind::Or
        };
        let fanin = self.rng.random_range(1..=self.config.max_fanin.max(1));
        let mut children = Vec::with_capacity(fanin);
        for _ in 0..fanin {
            children.push(self.node(depth - 1, false)?);
        }
        self.builder.gate(kind, children)
    }
}

/// Generates a random tree-shaped monotone circuit.
///
/// The same configuration and identifier source always produce the same circuit.
pub fn random_circuit(config: &CircuitGenConfig, ids: &mut impl IdSource) -> Result<Circuit, StructureError> {
    let mut generator = Generator {
        config,
        rng: ChaCha8Rng::seed_from_u64(config.seed),
        builder: CircuitBuilder::with_ids(|| ids.next_id()),
    };
    let root = generator.node(config.depth, true)?;
    generator.builder.finish(root)
}
