//! Network genomes
//!
//! A genome is a fixed layer layout plus one flat weight vector. For every
//! layer transition `n -> m` it stores `m * n` weights (row-major, one row per
//! output neuron) followed by `m` biases.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{BrainError, BrainResult};

/// Mutation rates for network weights
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    /// Probability per weight
    pub weight_mutation_rate: f32,
    /// Max perturbation magnitude
    pub weight_mutation_power: f32,
    /// Share of mutations that replace the weight instead of perturbing it
    pub weight_replace_rate: f32,
    /// Weights are clamped to `[-weight_limit, weight_limit]`
    pub weight_limit: f32,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            weight_mutation_rate: 0.8,
            weight_mutation_power: 0.5,
            weight_replace_rate: 0.1,
            weight_limit: 4.0,
        }
    }
}

/// Weights of a fully connected feed-forward network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkGenome {
    layers: Vec<usize>,
    weights: Vec<f32>,
    /// Number of generations this lineage has been bred for
    pub generation: usize,
}

impl NetworkGenome {
    /// Number of weights (biases included) a layout needs
    pub fn weight_count(layers: &[usize]) -> usize {
        layers.windows(2).map(|pair| pair[1] * (pair[0] + 1)).sum()
    }

    /// Create a genome with weights drawn uniformly from [-1, 1)
    pub fn random(layers: &[usize], rng: &mut impl Rng) -> BrainResult<Self> {
        let count = Self::weight_count(layers);
        let weights = (0..count).map(|_| rng.random_range(-1.0..1.0)).collect();
        Self::from_weights(layers.to_vec(), weights)
    }

    /// Assemble a genome from explicit weights
    pub fn from_weights(layers: Vec<usize>, weights: Vec<f32>) -> BrainResult<Self> {
        let genome = Self {
            layers,
            weights,
            generation: 0,
        };
        genome.check()?;
        Ok(genome)
    }

    /// Verify that the weights fit the layout (deserialized genomes may not)
    pub fn check(&self) -> BrainResult<()> {
        if self.layers.len() < 2 || self.layers.contains(&0) {
            return Err(BrainError::Layout(self.layers.clone()));
        }
        let expected = Self::weight_count(&self.layers);
        if self.weights.len() != expected {
            return Err(BrainError::GenomeShape {
                layers: self.layers.clone(),
                expected,
                actual: self.weights.len(),
            });
        }
        Ok(())
    }

    pub fn layers(&self) -> &[usize] {
        &self.layers
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Mutate weights in place; returns how many changed
    pub fn mutate(&mut self, config: &MutationConfig, rng: &mut impl Rng) -> usize {
        let limit = config.weight_limit;
        let power = config.weight_mutation_power;
        let mut mutated = 0;

        for weight in &mut self.weights {
            if rng.random::<f32>() >= config.weight_mutation_rate {
                continue;
            }
            if rng.random::<f32>() < config.weight_replace_rate {
                *weight = rng.random_range(-1.0..1.0);
            } else if power > 0.0 {
                *weight = (*weight + rng.random_range(-power..power)).clamp(-limit, limit);
            }
            mutated += 1;
        }
        mutated
    }

    /// Uniform crossover biased toward the fitter parent
    ///
    /// Parents must share a layout; the child takes the first parent's layout.
    pub fn crossover(
        parent1: &NetworkGenome,
        parent2: &NetworkGenome,
        parent1_fitness: f32,
        parent2_fitness: f32,
        rng: &mut impl Rng,
    ) -> NetworkGenome {
        debug_assert_eq!(parent1.layers, parent2.layers);

        let bias = if parent1_fitness > parent2_fitness {
            0.7
        } else if parent2_fitness > parent1_fitness {
            0.3
        } else {
            0.5
        };

        let weights = parent1
            .weights
            .iter()
            .enumerate()
            .map(|(i, &w1)| {
                let w2 = parent2.weights.get(i).copied().unwrap_or(w1);
                if rng.random::<f32>() < bias { w1 } else { w2 }
            })
            .collect();

        NetworkGenome {
            layers: parent1.layers.clone(),
            weights,
            generation: parent1.generation.max(parent2.generation) + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_weight_count() {
        assert_eq!(NetworkGenome::weight_count(&[3, 1]), 4);
        assert_eq!(NetworkGenome::weight_count(&[3, 4, 1]), 16 + 5);
    }

    #[test]
    fn test_random_in_range() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let genome = NetworkGenome::random(&[3, 4, 1], &mut rng).unwrap();
        assert_eq!(genome.weights().len(), 21);
        assert!(genome.weights().iter().all(|w| (-1.0..1.0).contains(w)));
        assert_eq!(genome.generation, 0);
    }

    #[test]
    fn test_bad_layouts_rejected() {
        assert!(matches!(
            NetworkGenome::from_weights(vec![3], vec![]),
            Err(BrainError::Layout(_))
        ));
        assert!(matches!(
            NetworkGenome::from_weights(vec![3, 0, 1], vec![]),
            Err(BrainError::Layout(_))
        ));
        assert!(matches!(
            NetworkGenome::from_weights(vec![3, 1], vec![0.0; 3]),
            Err(BrainError::GenomeShape {
                expected: 4,
                actual: 3,
                ..
            })
        ));
    }

    #[test]
    fn test_mutate_respects_limit() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);
        let mut genome = NetworkGenome::from_weights(vec![3, 1], vec![3.9, -3.9, 0.0, 1.0]).unwrap();
        let config = MutationConfig {
            weight_mutation_rate: 1.0,
            weight_mutation_power: 2.0,
            weight_replace_rate: 0.0,
            weight_limit: 4.0,
        };

        for _ in 0..50 {
            assert_eq!(genome.mutate(&config, &mut rng), 4);
            assert!(genome.weights().iter().all(|w| w.abs() <= 4.0));
        }
    }

    #[test]
    fn test_zero_rate_is_identity() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let mut genome = NetworkGenome::random(&[3, 2, 1], &mut rng).unwrap();
        let before = genome.clone();
        let config = MutationConfig {
            weight_mutation_rate: 0.0,
            ..MutationConfig::default()
        };
        assert_eq!(genome.mutate(&config, &mut rng), 0);
        assert_eq!(genome, before);
    }

    #[test]
    fn test_crossover_takes_genes_from_parents() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(4);
        let p1 = NetworkGenome::from_weights(vec![3, 1], vec![1.0; 4]).unwrap();
        let p2 = NetworkGenome::from_weights(vec![3, 1], vec![-1.0; 4]).unwrap();

        let mut from_p1 = 0;
        for _ in 0..200 {
            let child = NetworkGenome::crossover(&p1, &p2, 10.0, 1.0, &mut rng);
            assert_eq!(child.layers(), &[3, 1]);
            assert_eq!(child.generation, 1);
            assert!(child.weights().iter().all(|&w| w == 1.0 || w == -1.0));
            from_p1 += child.weights().iter().filter(|&&w| w == 1.0).count();
        }

        // 70% bias toward the fitter parent over 800 genes
        assert!(from_p1 > 480, "only {} genes from the fitter parent", from_p1);
    }
}
