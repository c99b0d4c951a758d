//! Population state and generation bookkeeping.
//!
//! A [`Population`] owns the current generation, the mating pool built
//! by selection, and the offspring buffer the next generation is
//! assembled in. It also carries the per-run selection state (cached
//! rank tables, the ranking transform coefficient) and the counter of
//! forced-gene encoding mismatches.
//!
//! The members of one generation step, in the order the engine drives
//! them:
//!
//! 1. [`Population::evaluate_with`] scores every chromosome
//! 2. [`Population::adapt_to_constraints`] penalizes violators
//! 3. [`Population::sort_by_fitness`] orders best first
//! 4. selection fills the pool (see [`crate::selection`])
//! 5. crossover and mutation fill the offspring buffer
//! 6. [`Population::reassert_forced`] re-pins forced genes
//! 7. [`Population::turnover`] promotes the offspring

use crate::chromosome::Chromosome;
use crate::config::GaConfig;
use crate::error::GaError;
use crate::parameter::ParameterSet;
use crate::selection::SelectionState;
use rand::Rng;
use std::sync::Arc;

/// The set of chromosomes being evolved, plus per-run working state.
#[derive(Debug, Clone)]
pub struct Population {
    pub(crate) params: Arc<ParameterSet>,
    pub(crate) config: GaConfig,
    pub(crate) current: Vec<Chromosome>,
    pub(crate) next: Vec<Chromosome>,
    pub(crate) pool: Vec<usize>,
    pub(crate) generation: usize,
    pub(crate) state: SelectionState,
    pub(crate) mismatches: u64,
}

impl Population {
    /// Creates an empty population for the given layout and settings.
    ///
    /// Call [`Population::initialize`] before evolving.
    ///
    /// # Errors
    ///
    /// Returns [`GaError::InvalidConfig`] when the configuration fails
    /// [`GaConfig::validate`] or when a non-empty forced-value mask does
    /// not cover every gene.
    pub fn new(params: ParameterSet, config: GaConfig) -> Result<Self, GaError> {
        config.validate().map_err(GaError::InvalidConfig)?;
        if !config.forced_values.is_empty() && config.forced_values.len() != params.len() {
            return Err(GaError::InvalidConfig(format!(
                "forced-value mask covers {} genes but the parameter set has {}",
                config.forced_values.len(),
                params.len()
            )));
        }
        Ok(Self {
            params: params.into_shared(),
            config,
            current: Vec::new(),
            next: Vec::new(),
            pool: Vec::new(),
            generation: 0,
            state: SelectionState::new(),
            mismatches: 0,
        })
    }

    /// Fills the population with random chromosomes and resets all
    /// per-run state. The first chromosome takes the initial values
    /// configured on the parameters, where present.
    pub fn initialize<R: Rng>(&mut self, rng: &mut R) {
        let size = self.config.population_size;
        self.current.clear();
        self.current.reserve(size);
        for _ in 0..size {
            self.current
                .push(Chromosome::random(Arc::clone(&self.params), 1, rng));
        }
        for i in 0..self.params.len() {
            if let Some(value) = self.params.get(i).initial() {
                self.current[0].set_value(i, value);
            }
        }
        self.next.clear();
        self.pool.clear();
        self.generation = 1;
        self.state.reset();
        self.mismatches = 0;
    }

    // ==== Accessors ====

    /// Number of chromosomes currently alive.
    pub fn len(&self) -> usize {
        self.current.len()
    }

    /// Whether the population has been initialized yet.
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Current generation index, 1-based. Zero before initialization.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Chromosome at position `i` of the current generation.
    pub fn chromosome(&self, i: usize) -> &Chromosome {
        &self.current[i]
    }

    /// All chromosomes of the current generation.
    pub fn chromosomes(&self) -> &[Chromosome] {
        &self.current
    }

    /// The shared parameter layout.
    pub fn parameter_set(&self) -> &ParameterSet {
        &self.params
    }

    /// The run configuration.
    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Number of chromosomes selection puts into the mating pool.
    pub fn mating_pool_size(&self) -> usize {
        self.config
            .mating_pool_size
            .unwrap_or(self.config.population_size)
    }

    /// Chromosome with the highest fitness.
    ///
    /// # Panics
    ///
    /// Panics on an uninitialized population.
    pub fn best(&self) -> &Chromosome {
        assert!(!self.current.is_empty(), "population is not initialized");
        self.current
            .iter()
            .max_by(|a, b| {
                a.fitness()
                    .partial_cmp(&b.fitness())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap()
    }

    // ==== Fitness bookkeeping ====

    /// Scores every chromosome of the current generation.
    pub fn evaluate_with<F>(&mut self, objective: &F)
    where
        F: Fn(&[f64]) -> Vec<f64>,
    {
        for chr in &mut self.current {
            chr.evaluate(objective);
        }
    }

    /// Shifts all fitness values up by the magnitude of the most
    /// negative one, so every fitness becomes non-negative. A no-op when
    /// none are negative. Relative order is preserved either way.
    pub fn adjust_fitness(&mut self) {
        let worst = self
            .current
            .iter()
            .map(|c| c.fitness())
            .fold(f64::INFINITY, f64::min);
        if worst < 0.0 {
            let shift = worst.abs();
            for chr in &mut self.current {
                let fitness = chr.fitness() + shift;
                chr.set_fitness(fitness);
            }
        }
    }

    /// Sum of all current fitness values.
    pub fn sum_fitness(&self) -> f64 {
        self.current.iter().map(|c| c.fitness()).sum()
    }

    /// Smallest raw objective total in the current generation.
    pub fn worst_total(&self) -> f64 {
        self.current
            .iter()
            .map(|c| c.total())
            .fold(f64::INFINITY, f64::min)
    }

    /// Sorts the current generation best fitness first.
    pub fn sort_by_fitness(&mut self) {
        self.current.sort_by(|a, b| {
            b.fitness()
                .partial_cmp(&a.fitness())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    /// Dynamic adaptation to constraints.
    ///
    /// Every chromosome with at least one violated constraint (score
    /// `>= 0`) has its fitness rewritten to the worst raw total of the
    /// generation minus the sum of its constraint scores. Violators
    /// therefore rank below every satisfying chromosome, and heavier
    /// violations rank lower than lighter ones.
    pub fn adapt_to_constraints(&mut self) {
        let worst = self.worst_total();
        for chr in &mut self.current {
            if chr.constraints().iter().any(|&c| c >= 0.0) {
                let penalty: f64 = chr.constraints().iter().sum();
                chr.set_fitness(worst - penalty);
            }
        }
    }

    // ==== Mating pool ====

    /// Adds the chromosome at `index` to the mating pool.
    ///
    /// # Panics
    ///
    /// Panics when `index` is outside the current generation.
    pub fn select(&mut self, index: usize) {
        assert!(
            index < self.current.len(),
            "selection index {index} out of range"
        );
        self.pool.push(index);
    }

    /// Indices currently in the mating pool.
    pub fn pool(&self) -> &[usize] {
        &self.pool
    }

    /// Chromosome behind pool entry `k`.
    pub fn pooled(&self, k: usize) -> &Chromosome {
        &self.current[self.pool[k]]
    }

    /// Empties the mating pool.
    pub fn clear_pool(&mut self) {
        self.pool.clear();
    }

    /// Blending ratio for the arithmetic crossovers: the configured
    /// value when fixed, otherwise a fresh uniform draw.
    pub fn recombination_ratio<R: Rng>(&self, rng: &mut R) -> f64 {
        match self.config.recombination_ratio {
            Some(ratio) => ratio,
            None => rng.random_range(0.0..1.0),
        }
    }

    // ==== Offspring ====

    /// Creates a blank offspring buffer tagged with the next generation
    /// index.
    pub fn offspring(&self) -> Chromosome {
        Chromosome::blank(Arc::clone(&self.params), self.generation + 1)
    }

    /// Appends a finished offspring to the next-generation buffer.
    pub fn push_offspring(&mut self, chr: Chromosome) {
        self.next.push(chr);
    }

    /// Number of offspring accumulated so far.
    pub fn offspring_count(&self) -> usize {
        self.next.len()
    }

    /// Re-encodes every forced gene on every buffered offspring.
    ///
    /// Each re-encoded gene is read back and compared to the forced
    /// value. A forced value that does not sit on the gene's
    /// quantization grid cannot survive the round trip; such mismatches
    /// are logged and counted, never fatal.
    pub fn reassert_forced(&mut self) {
        if self.config.forced_values.is_empty() {
            return;
        }
        for chr in &mut self.next {
            for (gene, forced) in self.config.forced_values.iter().enumerate() {
                if let Some(value) = *forced {
                    chr.set_value(gene, value);
                    let decoded = chr.value(gene);
                    // exact comparison: a representable forced value
                    // must survive re-encoding unchanged
                    if decoded != value {
                        self.mismatches += 1;
                        log::warn!(
                            "forced gene {gene} did not survive re-encoding: \
                             wanted {value}, got {decoded}"
                        );
                    }
                }
            }
        }
    }

    /// Number of forced-gene mismatches observed so far in this run.
    pub fn mismatch_count(&self) -> u64 {
        self.mismatches
    }

    /// Promotes the offspring buffer to the current generation, clears
    /// the mating pool and advances the generation counter.
    pub fn turnover(&mut self) {
        debug_assert_eq!(
            self.next.len(),
            self.current.len(),
            "offspring buffer must be full before turnover"
        );
        self.current = std::mem::take(&mut self.next);
        self.pool.clear();
        self.generation += 1;
    }
}

// ==== Tests ====

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::Parameter;
    use crate::random::create_rng;

    fn two_gene_params() -> ParameterSet {
        ParameterSet::new(vec![
            Parameter::new(0.0, 10.0, 8).unwrap(),
            Parameter::new(0.0, 10.0, 8).unwrap(),
        ])
        .unwrap()
    }

    fn small_population() -> Population {
        let config = GaConfig::default().with_population_size(4);
        let mut pop = Population::new(two_gene_params(), config).unwrap();
        let mut rng = create_rng(1);
        pop.initialize(&mut rng);
        pop
    }

    fn set_fitness(pop: &mut Population, values: &[f64]) {
        for (chr, &f) in pop.current.iter_mut().zip(values) {
            chr.set_fitness(f);
        }
    }

    // ---- Construction ----

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = GaConfig::default().with_population_size(1);
        assert!(matches!(
            Population::new(two_gene_params(), config),
            Err(GaError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_new_rejects_short_forced_mask() {
        let config = GaConfig::default().with_forced_values(vec![Some(1.0)]);
        assert!(matches!(
            Population::new(two_gene_params(), config),
            Err(GaError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_initialize_fills_generation_one() {
        let pop = small_population();
        assert_eq!(pop.len(), 4);
        assert_eq!(pop.generation(), 1);
        assert!(pop.pool().is_empty());
        assert_eq!(pop.offspring_count(), 0);
    }

    #[test]
    fn test_first_chromosome_takes_initial_values() {
        let params = ParameterSet::new(vec![
            Parameter::new(0.0, 10.0, 8).unwrap().with_initial(2.0),
            Parameter::new(0.0, 10.0, 8).unwrap(),
        ])
        .unwrap();
        let config = GaConfig::default().with_population_size(10);
        let mut pop = Population::new(params, config).unwrap();
        let mut rng = create_rng(9);
        pop.initialize(&mut rng);
        // 2.0 sits exactly on the 8-bit grid of [0, 10]
        assert_eq!(pop.chromosome(0).value(0), 2.0);
    }

    // ---- Fitness bookkeeping ----

    #[test]
    fn test_adjust_fitness_shifts_by_the_most_negative() {
        let mut pop = small_population();
        set_fitness(&mut pop, &[1.0, -2.0, 3.0, 0.0]);
        pop.adjust_fitness();
        let adjusted: Vec<f64> = pop.current.iter().map(|c| c.fitness()).collect();
        assert_eq!(adjusted, vec![3.0, 0.0, 5.0, 2.0]);
        assert_eq!(pop.sum_fitness(), 10.0);
    }

    #[test]
    fn test_adjust_fitness_is_identity_without_negatives() {
        let mut pop = small_population();
        set_fitness(&mut pop, &[1.0, 0.0, 3.0, 2.0]);
        pop.adjust_fitness();
        let adjusted: Vec<f64> = pop.current.iter().map(|c| c.fitness()).collect();
        assert_eq!(adjusted, vec![1.0, 0.0, 3.0, 2.0]);
    }

    #[test]
    fn test_adjust_fitness_preserves_order() {
        let mut pop = small_population();
        set_fitness(&mut pop, &[-5.0, -1.0, -3.0, 0.0]);
        pop.adjust_fitness();
        let adjusted: Vec<f64> = pop.current.iter().map(|c| c.fitness()).collect();
        assert_eq!(adjusted, vec![0.0, 4.0, 2.0, 5.0]);
    }

    #[test]
    fn test_sort_by_fitness_orders_best_first() {
        let mut pop = small_population();
        set_fitness(&mut pop, &[1.0, 4.0, 2.0, 3.0]);
        pop.sort_by_fitness();
        let sorted: Vec<f64> = pop.current.iter().map(|c| c.fitness()).collect();
        assert_eq!(sorted, vec![4.0, 3.0, 2.0, 1.0]);
        assert_eq!(pop.best().fitness(), 4.0);
    }

    #[test]
    fn test_worst_total_is_the_minimum_raw_score() {
        let mut pop = small_population();
        pop.current[0].evaluate(|_| vec![5.0]);
        pop.current[1].evaluate(|_| vec![-3.0]);
        pop.current[2].evaluate(|_| vec![1.0]);
        pop.current[3].evaluate(|_| vec![0.0]);
        assert_eq!(pop.worst_total(), -3.0);
    }

    // ---- Constraint adaptation ----

    #[test]
    fn test_adapt_to_constraints_ranks_violators_below_satisfiers() {
        let mut pop = small_population();
        // scores: [total, constraints...]; a constraint >= 0 is violated
        pop.current[0].evaluate(|_| vec![4.0, -1.0]); // satisfies
        pop.current[1].evaluate(|_| vec![9.0, 2.0, 3.0]); // violates, sum 5
        pop.current[2].evaluate(|_| vec![7.0, 2.0]); // violates, sum 2
        pop.current[3].evaluate(|_| vec![-1.0, -0.5]); // satisfies
        pop.adapt_to_constraints();

        let worst = -1.0;
        assert_eq!(pop.current[0].fitness(), 4.0);
        assert_eq!(pop.current[1].fitness(), worst - 5.0);
        assert_eq!(pop.current[2].fitness(), worst - 2.0);
        assert_eq!(pop.current[3].fitness(), -1.0);

        // heavier violation ranks lower, both rank below satisfiers
        assert!(pop.current[1].fitness() < pop.current[2].fitness());
        assert!(pop.current[2].fitness() < pop.current[3].fitness());
    }

    #[test]
    fn test_adapt_to_constraints_ignores_unconstrained_runs() {
        let mut pop = small_population();
        for chr in &mut pop.current {
            chr.evaluate(|_| vec![1.5]);
        }
        pop.adapt_to_constraints();
        for chr in &pop.current {
            assert_eq!(chr.fitness(), 1.5);
        }
    }

    // ---- Mating pool ----

    #[test]
    fn test_select_accumulates_pool_indices() {
        let mut pop = small_population();
        pop.select(2);
        pop.select(0);
        pop.select(2);
        assert_eq!(pop.pool(), &[2, 0, 2]);
        assert_eq!(
            pop.pooled(0).values(),
            pop.chromosome(2).values()
        );
        pop.clear_pool();
        assert!(pop.pool().is_empty());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_select_rejects_out_of_range_indices() {
        let mut pop = small_population();
        pop.select(4);
    }

    #[test]
    fn test_recombination_ratio_respects_the_config() {
        let mut rng = create_rng(2);
        let config = GaConfig::default()
            .with_population_size(4)
            .with_recombination_ratio(0.25);
        let mut pop = Population::new(two_gene_params(), config).unwrap();
        pop.initialize(&mut rng);
        for _ in 0..10 {
            assert_eq!(pop.recombination_ratio(&mut rng), 0.25);
        }

        let pop = small_population();
        for _ in 0..100 {
            let r = pop.recombination_ratio(&mut rng);
            assert!((0.0..1.0).contains(&r));
        }
    }

    // ---- Offspring and turnover ----

    #[test]
    fn test_turnover_promotes_offspring_and_advances() {
        let mut pop = small_population();
        for _ in 0..4 {
            let mut chr = pop.offspring();
            chr.set_value(0, 2.0);
            assert_eq!(chr.generation(), 2);
            pop.push_offspring(chr);
        }
        pop.select(1);
        pop.turnover();

        assert_eq!(pop.generation(), 2);
        assert!(pop.pool().is_empty());
        assert_eq!(pop.offspring_count(), 0);
        for chr in pop.chromosomes() {
            assert_eq!(chr.value(0), 2.0);
        }
    }

    // ---- Forced genes ----

    #[test]
    fn test_reassert_forced_pins_representable_values() {
        let config = GaConfig::default()
            .with_population_size(4)
            .with_forced_values(vec![Some(4.0), None]);
        let mut pop = Population::new(two_gene_params(), config).unwrap();
        let mut rng = create_rng(17);
        pop.initialize(&mut rng);
        for _ in 0..4 {
            let mut chr = pop.offspring();
            chr.randomize_gene(0, &mut rng);
            chr.randomize_gene(1, &mut rng);
            pop.push_offspring(chr);
        }
        pop.reassert_forced();

        // 4.0 encodes exactly: 4.0 / 10.0 * 255 = 102
        for chr in &pop.next {
            assert_eq!(chr.value(0), 4.0);
        }
        assert_eq!(pop.mismatch_count(), 0);
    }

    #[test]
    fn test_reassert_forced_counts_unrepresentable_values() {
        let config = GaConfig::default()
            .with_population_size(4)
            .with_forced_values(vec![Some(7.0), None]);
        let mut pop = Population::new(two_gene_params(), config).unwrap();
        let mut rng = create_rng(23);
        pop.initialize(&mut rng);
        for _ in 0..4 {
            let chr = pop.offspring();
            pop.push_offspring(chr);
        }
        pop.reassert_forced();

        // 7.0 falls between grid points of the 8-bit [0, 10] encoding,
        // so every offspring reports one mismatch
        assert_eq!(pop.mismatch_count(), 4);
        let step = 10.0 / 255.0;
        for chr in &pop.next {
            assert!((chr.value(0) - 7.0).abs() <= step);
        }
    }
}
