//! The generational driving loop.
//!
//! [`Engine`] owns a [`Population`] and the objective closure and runs
//! the full pipeline for a fixed number of generations: evaluation,
//! constraint adaptation, fitness-descending sort, selection,
//! crossover, mutation, forced-value reassertion, turnover. It tracks
//! the best chromosome ever scored and hands back a [`RunResult`] with
//! the decoded winner and the per-generation fitness trace.
//!
//! The objective maps a decoded parameter vector to a score vector:
//! element 0 is the value to maximize, any further elements are
//! constraint scores where `>= 0` means violated.

use crate::chromosome::Chromosome;
use crate::config::GaConfig;
use crate::error::GaError;
use crate::parameter::ParameterSet;
use crate::population::Population;
use crate::random::create_rng;
use rand::Rng;

/// Outcome of a completed [`Engine::run`].
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Decoded parameter values of the best chromosome ever scored.
    pub best_values: Vec<f64>,

    /// Fitness of that chromosome.
    pub best_fitness: f64,

    /// Number of generation steps executed.
    pub generations: usize,

    /// Best fitness seen so far, recorded once for the initial
    /// population and once after every step (`generations + 1`
    /// entries).
    pub fitness_history: Vec<f64>,
}

/// Drives a [`Population`] through the evolutionary loop.
///
/// # Example
///
/// ```
/// use evobits::{Engine, GaConfig, Parameter, ParameterSet};
///
/// // maximize -(x - 3)^2, i.e. steer x towards 3
/// let params = ParameterSet::new(vec![
///     Parameter::new(0.0, 10.0, 16).unwrap(),
/// ]).unwrap();
/// let config = GaConfig::default()
///     .with_population_size(30)
///     .with_generations(40)
///     .with_seed(7);
///
/// let mut engine = Engine::new(params, config, |values| {
///     let x = values[0];
///     vec![-(x - 3.0) * (x - 3.0)]
/// }).unwrap();
///
/// let result = engine.run();
/// assert!((result.best_values[0] - 3.0).abs() < 1.0);
/// ```
pub struct Engine<F>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    objective: F,
    population: Population,
    best: Option<Chromosome>,
    history: Vec<f64>,
}

impl<F> Engine<F>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    /// Builds an engine over `params` with the given configuration and
    /// objective.
    ///
    /// # Errors
    ///
    /// Returns [`GaError::InvalidConfig`] when the configuration fails
    /// validation, including a forced-value mask that does not cover
    /// every gene.
    pub fn new(params: ParameterSet, config: GaConfig, objective: F) -> Result<Self, GaError> {
        Ok(Engine {
            objective,
            population: Population::new(params, config)?,
            best: None,
            history: Vec::new(),
        })
    }

    /// Runs the configured number of generations from a fresh
    /// population and returns the outcome. Calling it again restarts
    /// the search; with a fixed seed the runs are identical.
    pub fn run(&mut self) -> RunResult {
        let mut rng = match self.population.config.seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };

        let generations = self.population.config.generations;
        self.best = None;
        self.history = Vec::with_capacity(generations + 1);
        self.population.initialize(&mut rng);
        self.score_generation();

        for _ in 0..generations {
            self.step(&mut rng);
        }

        let (best_values, best_fitness) = match &self.best {
            Some(chr) => (chr.values(), chr.fitness()),
            None => (Vec::new(), f64::NEG_INFINITY),
        };
        RunResult {
            best_values,
            best_fitness,
            generations,
            fitness_history: self.history.clone(),
        }
    }

    /// Advances one generation: selection over the scored population,
    /// breeding until the next generation is full, mutation,
    /// forced-value reassertion, turnover, then scoring of the new
    /// generation.
    ///
    /// The population must have been initialized and scored, which
    /// [`Engine::run`] does before stepping.
    pub fn step<R: Rng>(&mut self, rng: &mut R) {
        let config = &self.population.config;
        let selection = config.selection;
        let crossover = config.crossover;
        let mutation = config.mutation;
        let rate = config.mutation_rate;
        let info = config.mutation_info;
        let target = config.population_size;

        selection.apply(&mut self.population, rng);

        while self.population.offspring_count() < target {
            let mut c1 = self.population.offspring();
            let mut c2 = self.population.offspring();
            crossover.apply(&self.population, &mut c1, &mut c2, rng);
            mutation.apply(&mut c1, rate, &info, rng);
            mutation.apply(&mut c2, rate, &info, rng);
            self.population.push_offspring(c1);
            if self.population.offspring_count() < target {
                self.population.push_offspring(c2);
            }
        }

        self.population.reassert_forced();
        self.population.turnover();
        self.score_generation();
    }

    // scores the current generation and extends the best-so-far trace
    fn score_generation(&mut self) {
        self.population.evaluate_with(&self.objective);
        self.population.adapt_to_constraints();
        self.population.sort_by_fitness();

        let leader = self.population.best();
        let improved = match &self.best {
            Some(best) => leader.fitness() > best.fitness(),
            None => true,
        };
        if improved {
            self.best = Some(leader.clone());
        }
        if let Some(best) = &self.best {
            self.history.push(best.fitness());
        }
    }

    /// The population in its current state.
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Best chromosome scored so far, if the engine has run.
    pub fn best(&self) -> Option<&Chromosome> {
        self.best.as_ref()
    }
}

// ==== Tests ====
