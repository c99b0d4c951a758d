//! Engine configuration.
//!
//! [`GaConfig`] holds all parameters that control the evolutionary loop,
//! and [`MutationInfo`] the step-size settings shared by the
//! self-adaptive mutation operators.

use crate::crossover::Crossover;
use crate::mutation::Mutation;
use crate::selection::Selection;

/// Step-size settings for the self-adaptive mutation operators.
///
/// The evolution-strategy mutations carry one step size (sigma) per gene
/// inside each chromosome. This struct provides the values used to seed
/// and bound those step sizes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MutationInfo {
    /// Step size given to a gene the first time a fixed-seed operator
    /// touches it.
    pub sigma: f64,

    /// Floor below which evolved step sizes may not decay.
    pub sigma_lowest: f64,

    /// Fraction of a parameter's span used as the seed step size by the
    /// boundary-seeded operators.
    pub ratio_boundary: f64,
}

impl Default for MutationInfo {
    fn default() -> Self {
        Self {
            sigma: 1.0,
            sigma_lowest: 0.01,
            ratio_boundary: 0.10,
        }
    }
}

/// Configuration for the genetic algorithm engine.
///
/// Controls population and mating pool sizes, the generation count, and
/// the selection, crossover and mutation operators.
///
/// # Defaults
///
/// ```
/// use evobits::config::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.generations, 500);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use evobits::config::GaConfig;
/// use evobits::crossover::Crossover;
/// use evobits::selection::Selection;
///
/// let config = GaConfig::default()
///     .with_population_size(200)
///     .with_selection(Selection::Tournament(5))
///     .with_crossover(Crossover::TwoPoint)
///     .with_mutation_rate(0.05);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaConfig {
    /// Number of chromosomes in the population.
    ///
    /// Larger populations increase diversity but slow down each
    /// generation. Typical range: 50 to 500.
    pub population_size: usize,

    /// Number of chromosomes selected into the mating pool each
    /// generation.
    ///
    /// `None` uses the population size. Selection draws with
    /// replacement, so the pool may also be larger than the population.
    pub mating_pool_size: Option<usize>,

    /// Number of generations to evolve.
    pub generations: usize,

    /// Strategy for filling the mating pool.
    pub selection: Selection,

    /// Operator that recombines two parents into two offspring.
    pub crossover: Crossover,

    /// Operator applied to every offspring after crossover.
    pub mutation: Mutation,

    /// Application probability of the mutation operator, within
    /// `[0.0, 1.0]`.
    ///
    /// Applied per gene, or per bit for [`Mutation::BitFlip`].
    pub mutation_rate: f64,

    /// Step-size settings for the self-adaptive mutation operators.
    pub mutation_info: MutationInfo,

    /// Blending ratio used by the arithmetic crossovers, within
    /// `[0.0, 1.0]`.
    ///
    /// `None` draws a fresh uniform ratio for every crossover call.
    pub recombination_ratio: Option<f64>,

    /// Values to pin specific genes to, by gene index.
    ///
    /// After crossover and mutation, every `Some` entry is re-encoded
    /// into the corresponding gene of each offspring, overriding
    /// whatever evolution produced. An empty vector disables pinning;
    /// otherwise the vector must cover every gene.
    pub forced_values: Vec<Option<f64>>,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            mating_pool_size: None,
            generations: 500,
            selection: Selection::default(),
            crossover: Crossover::default(),
            mutation: Mutation::default(),
            mutation_rate: 0.05,
            mutation_info: MutationInfo::default(),
            recombination_ratio: None,
            forced_values: Vec::new(),
            seed: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the mating pool size.
    pub fn with_mating_pool_size(mut self, n: usize) -> Self {
        self.mating_pool_size = Some(n);
        self
    }

    /// Sets the number of generations.
    pub fn with_generations(mut self, n: usize) -> Self {
        self.generations = n;
        self
    }

    /// Sets the selection strategy.
    pub fn with_selection(mut self, sel: Selection) -> Self {
        self.selection = sel;
        self
    }

    /// Sets the crossover operator.
    pub fn with_crossover(mut self, cross: Crossover) -> Self {
        self.crossover = cross;
        self
    }

    /// Sets the mutation operator.
    pub fn with_mutation(mut self, mutation: Mutation) -> Self {
        self.mutation = mutation;
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the step-size settings for self-adaptive mutation.
    pub fn with_mutation_info(mut self, info: MutationInfo) -> Self {
        self.mutation_info = info;
        self
    }

    /// Fixes the blending ratio of the arithmetic crossovers.
    pub fn with_recombination_ratio(mut self, ratio: f64) -> Self {
        self.recombination_ratio = Some(ratio.clamp(0.0, 1.0));
        self
    }

    /// Sets the whole forced-value mask at once.
    pub fn with_forced_values(mut self, forced: Vec<Option<f64>>) -> Self {
        self.forced_values = forced;
        self
    }

    /// Pins one gene to a value, growing the mask as needed.
    ///
    /// Callers pinning the last genes of a chromosome should still size
    /// the mask to the full gene count, either by pinning through this
    /// method for the highest index or via
    /// [`GaConfig::with_forced_values`].
    pub fn with_forced_value(mut self, gene: usize, value: f64) -> Self {
        if self.forced_values.len() <= gene {
            self.forced_values.resize(gene + 1, None);
        }
        self.forced_values[gene] = Some(value);
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Convenience builder for setting tournament size.
    ///
    /// Equivalent to `.with_selection(Selection::Tournament(k))`.
    pub fn with_tournament_size(self, k: usize) -> Self {
        self.with_selection(Selection::Tournament(k))
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.population_size < 2 {
            return Err("population_size must be at least 2".into());
        }
        if self.mating_pool_size == Some(0) {
            return Err("mating_pool_size must be positive or None".into());
        }
        if self.generations == 0 {
            return Err("generations must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err("mutation_rate must be within [0, 1]".into());
        }
        if let Some(ratio) = self.recombination_ratio {
            if !(0.0..=1.0).contains(&ratio) {
                return Err("recombination_ratio must be within [0, 1] or None".into());
            }
        }
        if let Selection::Tournament(size) = self.selection {
            if size == 0 {
                return Err("tournament size must be at least 1".into());
            }
        }
        if let Selection::RankWithPressure { pressure } = self.selection {
            if !(1.0..=2.0).contains(&pressure) {
                return Err("selection pressure must be within [1, 2]".into());
            }
        }
        let info = &self.mutation_info;
        if info.sigma.is_nan() || info.sigma <= 0.0 {
            return Err("mutation sigma must be positive".into());
        }
        if info.sigma_lowest.is_nan() || info.sigma_lowest <= 0.0 {
            return Err("sigma_lowest must be positive".into());
        }
        if info.ratio_boundary.is_nan() || info.ratio_boundary <= 0.0 {
            return Err("ratio_boundary must be positive".into());
        }
        Ok(())
    }
}

// ==== Tests ====
