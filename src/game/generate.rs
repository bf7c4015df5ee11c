use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::error::StructureError;
use crate::game::graph::{Position, PositionGraph};
use crate::ids::IdSource;
use crate::types::Player;

/// Parameters of the random position-graph generator.
#[derive(Debug, Clone)]
pub struct GameGenConfig {
    /// Number of positions (at least one is always generated).
    pub positions: usize,
    /// Upper bound on the number of moves from a position.
    pub max_out_degree: usize,
    /// Probability of keeping each candidate move, clamped to `[0, 1]`.
    pub edge_probability: f64,
    /// Only allow moves to later positions, which rules out cycles.
    pub acyclic: bool,
    pub seed: u64,
}

impl Default for GameGenConfig {
    fn default() -> Self {
        Self {
            positions: 8,
            max_out_degree: 3,
            edge_probability: 0.5,
            acyclic: true,
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

/// Generates a random position graph.
///
/// The first generated position is the start and belongs to player 1. The
/// same configuration and identifier source always produce the same graph.
pub fn random_game(config: &GameGenConfig, ids: &mut impl IdSource) -> Result<PositionGraph, StructureError> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let n = config.positions.max(1);
    let names: Vec<_> = (0..n).map(|_| ids.next_id()).collect();

    let mut positions = Vec::with_capacity(n);
    for i in 0..n {
        let owner = if i == 0 || rng.random_bool(0.5) {
            Player::One
        } else {
            Player::Two
        };

        let mut candidates: Vec<usize> = if config.acyclic {
            (i + 1..n).collect()
        } else {
            (0..n).filter(|&j| j != i).collect()
        };
        candidates.shuffle(&mut rng);

        let mut successors: Vec<usize> = candidates
            .into_iter()
            .filter(|_| rng.random_bool(chance(config.edge_probability)))
            .take(config.max_out_degree)
            .collect();
        successors.sort_unstable();

        let position = Position::new(owner, successors.into_iter().map(|j| names[j].clone()));
        positions.push((names[i].clone(), position));
    }

    PositionGraph::new(positions, names[0].clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::game::solve;
    use crate::ids::Sequential;

    #[test]
    fn test_random_game_is_reproducible() {
        let config = GameGenConfig::default();
        let g1 = random_game(&config, &mut Sequential::new("p")).unwrap();
        let g2 = random_game(&config, &mut Sequential::new("p")).unwrap();
        assert_eq!(g1, g2);
        assert_eq!(g1.len(), config.positions);
        assert_eq!(g1.start().as_str(), "p0");
        assert_eq!(g1.start_position().owner(), Player::One);
    }

    #[test]
    fn test_random_game_respects_bounds() {
        let config = GameGenConfig {
            positions: 20,
            max_out_degree: 2,
            edge_probability: 0.9,
            acyclic: true,
            seed: 7,
        };
        let graph = random_game(&config, &mut Sequential::default()).unwrap();
        let index: Vec<_> = graph.ids().cloned().collect();
        for (k, (_, position)) in graph.positions().enumerate() {
            assert!(position.successors().len() <= 2);
            for s in position.successors() {
                let j = index.iter().position(|x| x == s).unwrap();
                assert!(j > k, "acyclic graphs only move forward");
            }
        }
    }

    #[test]
    fn test_random_cyclic_games_are_solvable() {
        for seed in 0..20 {
            let config = GameGenConfig {
                positions: 12,
                acyclic: false,
                seed,
                ..Default::default()
            };
            let graph = random_game(&config, &mut Sequential::default()).unwrap();
            let analysis = solve(&graph, Player::One);
            assert!(analysis.verdict.is_conclusive());
            assert_eq!(analysis.winning.len(), graph.len());
        }
    }

    #[test]
    fn test_zero_positions_still_yields_a_graph() {
        let config = GameGenConfig {
            positions: 0,
            ..Default::default()
        };
        let graph = random_game(&config, &mut Sequential::default()).unwrap();
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_out_of_range_edge_probability_is_clamped() {
        let config = GameGenConfig {
            positions: 6,
            edge_probability: 3.0,
            max_out_degree: 10,
            ..Default::default()
        };
        let graph = random_game(&config, &mut Sequential::default()).unwrap();
        assert_eq!(graph.start_position().successors().len(), 5);

        let config = GameGenConfig {
            edge_probability: -1.0,
            ..Default::default()
        };
        let graph = random_game(&config, &mut Sequential::default()).unwrap();
        assert!(graph.positions().all(|(_, p)| p.is_terminal()));
    }
}
