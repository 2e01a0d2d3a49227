//! Generational genetic algorithm over network genomes
//!
//! Each generation: evaluate every genome (the caller runs the simulation and
//! fills the fitness slots), then breed the next population. The best
//! `elitism` genomes are copied unchanged; the rest are children of two
//! tournament winners, crossed over with probability `crossover_rate` and
//! always mutated.

use std::cmp::Ordering;

use flapper_core::INPUT_COUNT;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::error::{BrainError, BrainResult};
use crate::genome::{MutationConfig, NetworkGenome};
use crate::neural::FeedForwardNetwork;

/// Evolution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    /// Genomes carried over unchanged each generation
    pub elitism: usize,
    pub tournament_size: usize,
    /// Probability that a child has two parents instead of one
    pub crossover_rate: f32,
    /// Hidden layer sizes; empty connects inputs straight to the output
    pub hidden_layers: Vec<usize>,
    /// Stop once the best fitness of a generation reaches this value
    pub fitness_threshold: Option<f32>,
    pub mutation: MutationConfig,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            elitism: 2,
            tournament_size: 3,
            crossover_rate: 0.75,
            hidden_layers: Vec::new(),
            fitness_threshold: Some(100.0),
            mutation: MutationConfig::default(),
        }
    }
}

impl EvolutionConfig {
    pub fn validate(&self) -> BrainResult<()> {
        if self.population_size == 0 {
            return Err(BrainError::InvalidConfig(
                "population_size must be at least 1".to_string(),
            ));
        }
        if self.elitism > self.population_size {
            return Err(BrainError::InvalidConfig(format!(
                "elitism {} exceeds population size {}",
                self.elitism, self.population_size
            )));
        }
        if self.tournament_size == 0 {
            return Err(BrainError::InvalidConfig(
                "tournament_size must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(BrainError::InvalidConfig(format!(
                "crossover_rate {} is not a probability",
                self.crossover_rate
            )));
        }
        if self.hidden_layers.contains(&0) {
            return Err(BrainError::InvalidConfig(
                "hidden layers must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Full layer layout: observation inputs, hidden layers, one jump output
    pub fn layout(&self) -> Vec<usize> {
        let mut layers = Vec::with_capacity(self.hidden_layers.len() + 2);
        layers.push(INPUT_COUNT);
        layers.extend(&self.hidden_layers);
        layers.push(1);
        layers
    }
}

/// Fitness summary of one evaluated generation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub best_fitness: f32,
    pub mean_fitness: f32,
    pub worst_fitness: f32,
}

/// The evolving population and its fitness slots
pub struct Population {
    config: EvolutionConfig,
    genomes: Vec<NetworkGenome>,
    fitness: Vec<f32>,
    generation: usize,
    rng: Xoshiro256PlusPlus,
}

impl Population {
    /// Random initial population
    ///
    /// A seeded population draws from the seed's stream after a long jump,
    /// so it never overlaps an obstacle RNG built from the same seed.
    pub fn new(config: EvolutionConfig, seed: Option<u64>) -> BrainResult<Self> {
        config.validate()?;
        let mut rng = match seed {
            Some(seed) => {
                let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
                rng.long_jump();
                rng
            }
            None => Xoshiro256PlusPlus::from_os_rng(),
        };
        let layout = config.layout();
        let genomes = (0..config.population_size)
            .map(|_| NetworkGenome::random(&layout, &mut rng))
            .collect::<BrainResult<Vec<_>>>()?;

        log::info!(
            "Created population of {} genomes with layout {:?}",
            genomes.len(),
            layout
        );

        Ok(Self {
            fitness: vec![0.0; genomes.len()],
            config,
            genomes,
            generation: 0,
            rng,
        })
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn genomes(&self) -> &[NetworkGenome] {
        &self.genomes
    }

    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    /// Build one network per genome, in population order
    pub fn networks(&self) -> BrainResult<Vec<FeedForwardNetwork>> {
        self.genomes
            .iter()
            .map(FeedForwardNetwork::from_genome)
            .collect()
    }

    /// Fitness slots, one per genome, for the evaluator to fill
    pub fn fitness_mut(&mut self) -> &mut [f32] {
        &mut self.fitness
    }

    pub fn fitness(&self) -> &[f32] {
        &self.fitness
    }

    /// Summary of the current fitness values
    pub fn stats(&self) -> GenerationStats {
        let best = self.fitness.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let worst = self.fitness.iter().copied().fold(f32::INFINITY, f32::min);
        let mean = self.fitness.iter().sum::<f32>() / self.fitness.len().max(1) as f32;
        GenerationStats {
            generation: self.generation,
            best_fitness: best,
            mean_fitness: mean,
            worst_fitness: worst,
        }
    }

    /// Fittest genome of the current generation
    pub fn best(&self) -> Option<(&NetworkGenome, f32)> {
        self.ranking()
            .first()
            .map(|&i| (&self.genomes[i], self.fitness[i]))
    }

    /// Whether the best fitness meets the configured threshold
    pub fn threshold_reached(&self) -> bool {
        self.config
            .fitness_threshold
            .is_some_and(|threshold| self.stats().best_fitness >= threshold)
    }

    /// Genome indices sorted by fitness, best first (stable on ties)
    fn ranking(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.genomes.len()).collect();
        order.sort_by(|&a, &b| {
            self.fitness[b]
                .partial_cmp(&self.fitness[a])
                .unwrap_or(Ordering::Equal)
        });
        order
    }

    fn tournament(&mut self) -> usize {
        let mut winner = self.rng.random_range(0..self.genomes.len());
        for _ in 1..self.config.tournament_size {
            let challenger = self.rng.random_range(0..self.genomes.len());
            if self.fitness[challenger] > self.fitness[winner] {
                winner = challenger;
            }
        }
        winner
    }

    /// Breed the next generation from the current fitness values
    ///
    /// Fitness slots are reset to zero afterwards.
    pub fn evolve(&mut self) -> GenerationStats {
        let stats = self.stats();
        let ranking = self.ranking();

        let mut next: Vec<NetworkGenome> = ranking
            .iter()
            .take(self.config.elitism)
            .map(|&i| self.genomes[i].clone())
            .collect();

        while next.len() < self.config.population_size {
            let p1 = self.tournament();
            let mut child = if self.rng.random::<f32>() < self.config.crossover_rate {
                let p2 = self.tournament();
                NetworkGenome::crossover(
                    &self.genomes[p1],
                    &self.genomes[p2],
                    self.fitness[p1],
                    self.fitness[p2],
                    &mut self.rng,
                )
            } else {
                let mut clone = self.genomes[p1].clone();
                clone.generation += 1;
                clone
            };
            child.mutate(&self.config.mutation, &mut self.rng);
            next.push(child);
        }

        log::debug!(
            "Generation {} bred: best {:.2}, mean {:.2}",
            stats.generation,
            stats.best_fitness,
            stats.mean_fitness
        );

        self.genomes = next;
        self.fitness = vec![0.0; self.genomes.len()];
        self.generation += 1;
        stats
    }
}
