//! Selection strategies for filling the mating pool.
//!
//! Every strategy reads the current generation of a
//! [`Population`] and pushes chromosome indices into its mating pool,
//! drawing with replacement until the pool holds
//! [`Population::mating_pool_size`] entries.
//!
//! # Strategies
//!
//! | Strategy | Characteristics |
//! |----------|-----------------|
//! | [`Selection::Roulette`] | Fitness-proportional; fast, strong bias toward outliers |
//! | [`Selection::StochasticUniversal`] | One spin, evenly spaced pointers; lower variance than roulette |
//! | [`Selection::Rank`] | Linear rank weights `P..1`; ignores fitness magnitudes |
//! | [`Selection::RankWithPressure`] | Linear ranking with tunable pressure (Baker, 1985) |
//! | [`Selection::Tournament`] | `k` uniform draws, best wins; pressure grows with `k` |
//! | [`Selection::TransformedRanking`] | Exponential rank transform sharpening over generations |
//!
//! The fitness-proportional strategies first shift all fitness values
//! non-negative via [`Population::adjust_fitness`]. The rank-based
//! strategies weight chromosomes by their *position* in the population,
//! so they expect the generation sorted best first, and they cache their
//! weight tables in the population for the remainder of the run.
//!
//! Cumulative-sum walks can run past the last chromosome when floating
//! point rounding accumulates; every strategy clamps to the last valid
//! index instead of failing.
//!
//! # References
//!
//! - Baker (1985), "Adaptive Selection Methods for Genetic Algorithms"
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection
//!   Schemes Used in Genetic Algorithms"
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes Used
//!   in Evolutionary Algorithms"

use crate::chromosome::Chromosome;
use crate::population::Population;
use rand::Rng;

// Starting coefficient of the exponential rank transform and its
// per-generation increment.
const TRANSFORM_COEFF_START: f64 = 0.2;
const TRANSFORM_COEFF_STEP: f64 = 0.1;

/// Per-run working state owned by the population: cached rank tables
/// and the hardening coefficient of the ranking transform. Reset
/// whenever the population (re)initializes.
#[derive(Debug, Clone)]
pub(crate) struct SelectionState {
    pub(crate) rank_weights: Vec<i64>,
    pub(crate) pressure_weights: Vec<f64>,
    pub(crate) transform_coeff: f64,
}

impl SelectionState {
    pub(crate) fn new() -> Self {
        Self {
            rank_weights: Vec::new(),
            pressure_weights: Vec::new(),
            transform_coeff: TRANSFORM_COEFF_START,
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Strategy for choosing which chromosomes enter the mating pool.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Fitness-proportional roulette wheel.
    ///
    /// Each chromosome's share of the wheel is its (adjusted) fitness.
    /// When the whole generation has zero adjusted fitness the wheel is
    /// degenerate and the first chromosome is selected every time.
    Roulette,

    /// Stochastic universal sampling.
    ///
    /// A single random offset places evenly spaced pointers across the
    /// wheel, so the number of times a chromosome is picked can differ
    /// from its expectation by at most one.
    StochasticUniversal,

    /// Classic linear rank-based selection.
    ///
    /// Position `i` of the sorted generation gets weight `P - i`; a
    /// roulette over those weights picks the parents.
    Rank,

    /// Linear ranking with explicit selective pressure.
    ///
    /// Position weights follow Baker's formula
    /// `2 - SP + 2(SP - 1)(P - i)/P`. Pressure runs from 1.0 (uniform)
    /// to 2.0 (strongest bias toward the front).
    RankWithPressure {
        /// Selective pressure `SP`, within `[1.0, 2.0]`.
        pressure: f64,
    },

    /// Tournament selection with the given tournament size.
    ///
    /// Draws `k` chromosomes uniformly and keeps the fittest. Size 1
    /// degenerates to uniform random selection.
    Tournament(usize),

    /// Transform ranking selection.
    ///
    /// Overwrites the generation's fitness with exponentially
    /// transformed ranks whose contrast grows each invocation, then
    /// spins a roulette over the transformed values. Note this mutates
    /// the population's fitness in place.
    TransformedRanking,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Roulette
    }
}

impl Selection {
    /// Fills the mating pool of `pop`, replacing its previous contents.
    ///
    /// # Panics
    ///
    /// Panics on an uninitialized population.
    pub fn apply<R: Rng>(&self, pop: &mut Population, rng: &mut R) {
        assert!(
            !pop.current.is_empty(),
            "cannot select from an empty population"
        );
        pop.clear_pool();
        match self {
            Selection::Roulette => roulette(pop, rng),
            Selection::StochasticUniversal => stochastic_universal(pop, rng),
            Selection::Rank => rank(pop, rng),
            Selection::RankWithPressure { pressure } => {
                rank_with_pressure(pop, *pressure, rng)
            }
            Selection::Tournament(size) => tournament(pop, *size, rng),
            Selection::TransformedRanking => transformed_ranking(pop, rng),
        }
    }
}

// ==== Strategy implementations ====

// One roulette draw: the first index whose cumulative fitness exceeds a
// random threshold in [0, total). Clamps to the last index when
// accumulated rounding lets the walk run off the end.
fn spin_wheel<R: Rng>(chromosomes: &[Chromosome], total: f64, rng: &mut R) -> usize {
    let mut remaining = rng.random_range(0.0..total);
    for (i, chr) in chromosomes.iter().enumerate() {
        remaining -= chr.fitness();
        if remaining < 0.0 {
            return i;
        }
    }
    chromosomes.len() - 1
}

fn roulette<R: Rng>(pop: &mut Population, rng: &mut R) {
    pop.adjust_fitness();
    let fitsum = pop.sum_fitness();
    for _ in 0..pop.mating_pool_size() {
        let index = if fitsum > 0.0 {
            spin_wheel(&pop.current, fitsum, rng)
        } else {
            0
        };
        pop.select(index);
    }
}

fn stochastic_universal<R: Rng>(pop: &mut Population, rng: &mut R) {
    pop.adjust_fitness();
    let fitsum = pop.sum_fitness();
    let pool_size = pop.mating_pool_size();
    if fitsum <= 0.0 {
        // degenerate wheel, same policy as roulette
        for _ in 0..pool_size {
            pop.select(0);
        }
        return;
    }

    let dist = fitsum / pool_size as f64;
    let mut ptr = rng.random_range(0.0..dist);
    for _ in 0..pool_size {
        let mut cumulative = 0.0;
        let mut j = 0;
        while j < pop.current.len() && cumulative <= ptr {
            cumulative += pop.current[j].fitness();
            j += 1;
        }
        pop.select(j.saturating_sub(1));
        ptr += dist;
    }
}

fn rank<R: Rng>(pop: &mut Population, rng: &mut R) {
    let size = pop.current.len();
    if pop.state.rank_weights.len() != size {
        // position weights from highest to lowest: P, P-1, ..., 1
        pop.state.rank_weights = (1..=size as i64).rev().collect();
    }
    let ranksum = size as i64 * (size as i64 + 1) / 2;

    for _ in 0..pop.mating_pool_size() {
        let mut remaining = rng.random_range(1..ranksum);
        let mut j = 0;
        while j < size && remaining > 0 {
            remaining -= pop.state.rank_weights[j];
            j += 1;
        }
        pop.select(j.saturating_sub(1));
    }
}

fn rank_with_pressure<R: Rng>(pop: &mut Population, pressure: f64, rng: &mut R) {
    let size = pop.current.len();
    if pop.state.pressure_weights.len() != size {
        let p = size as f64;
        pop.state.pressure_weights = (0..size)
            .map(|i| 2.0 - pressure + 2.0 * (pressure - 1.0) * (p - i as f64) / p)
            .collect();
    }
    let ranksum: f64 = pop.state.pressure_weights.iter().sum();

    for _ in 0..pop.mating_pool_size() {
        let mut remaining = rng.random_range(0.0..ranksum);
        let mut j = 0;
        while j < size && remaining >= 0.0 {
            remaining -= pop.state.pressure_weights[j];
            j += 1;
        }
        pop.select(j.saturating_sub(1));
    }
}

fn tournament<R: Rng>(pop: &mut Population, size: usize, rng: &mut R) {
    let popsize = pop.current.len();
    let rounds = size.max(1);
    for _ in 0..pop.mating_pool_size() {
        let mut best = rng.random_range(0..popsize);
        for _ in 1..rounds {
            let challenger = rng.random_range(0..popsize);
            if pop.current[challenger].fitness() > pop.current[best].fitness() {
                best = challenger;
            }
        }
        pop.select(best);
    }
}

fn transformed_ranking<R: Rng>(pop: &mut Population, rng: &mut R) {
    let size = pop.current.len();
    let coeff = pop.state.transform_coeff;

    // fresh uniform draws, ranked highest to lowest
    let mut draws: Vec<f64> = (0..size).map(|_| rng.random_range(0.0..1.0)).collect();
    draws.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    // overwrite the generation's fitness positionally with transformed
    // ranks; the front of the (sorted) generation gets the largest draw
    let p = size as f64;
    let denom = 1.0 - (-coeff).exp();
    for (chr, &z) in pop.current.iter_mut().zip(&draws) {
        chr.set_fitness(((p - p * (-coeff * z).exp()) / denom).ceil());
    }

    // harden the transform for the next generation
    pop.state.transform_coeff = coeff + TRANSFORM_COEFF_STEP;

    let fitsum = pop.sum_fitness();
    for _ in 0..pop.mating_pool_size() {
        let index = if fitsum > 0.0 {
            spin_wheel(&pop.current, fitsum, rng)
        } else {
            0
        };
        pop.select(index);
    }
}

// ==== Tests ====
