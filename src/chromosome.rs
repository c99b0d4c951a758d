//! Chromosomes: concatenated bit strings with decode and evolution state.
//!
//! A chromosome owns one bit string laid out by its shared
//! [`ParameterSet`], most significant bit first within each gene. On top
//! of the raw bits it carries the state evolution needs per individual:
//! fitness and raw objective total, constraint scores, per-gene mutation
//! step sizes (sigma) for the self-adaptive operators, and the index of
//! the generation it belongs to.
//!
//! Bit-level operators (point crossover, bit-flip mutation) edit the
//! string directly; value-level operators (arithmetic crossover, the
//! evolution-strategy mutations) go through [`Chromosome::value`] and
//! [`Chromosome::set_value`], which decode and re-encode on the
//! quantization grid.

use crate::parameter::{Parameter, ParameterSet};
use rand::Rng;
use std::sync::Arc;

// Sigmas below this threshold count as never written. Freshly built
// chromosomes store 0.0, and self-adaptive mutation seeds a real step
// size on first contact with a gene.
const SIGMA_UNSET_EPS: f64 = 1.0e-11;

/// One candidate solution: a bit string plus its evolution state.
#[derive(Debug, Clone)]
pub struct Chromosome {
    params: Arc<ParameterSet>,
    bits: Vec<bool>,
    sigma: Vec<f64>,
    sigma_updates: Vec<u32>,
    fitness: f64,
    total: f64,
    constraints: Vec<f64>,
    generation: usize,
}

impl Chromosome {
    /// Creates a chromosome with uniformly random genes.
    pub fn random<R: Rng>(params: Arc<ParameterSet>, generation: usize, rng: &mut R) -> Self {
        let mut chr = Self::blank(params, generation);
        for i in 0..chr.gene_count() {
            let code = chr.params.get(i).encode_random(rng);
            chr.write_gene(i, code);
        }
        chr
    }

    /// Creates an all-zero chromosome, used as an offspring buffer that
    /// crossover then fills in.
    pub fn blank(params: Arc<ParameterSet>, generation: usize) -> Self {
        let genes = params.len();
        let bits = params.total_bits();
        Self {
            params,
            bits: vec![false; bits],
            sigma: vec![0.0; genes],
            sigma_updates: vec![0; genes],
            fitness: 0.0,
            total: 0.0,
            constraints: Vec::new(),
            generation,
        }
    }

    // ==== Layout ====

    /// Number of genes.
    pub fn gene_count(&self) -> usize {
        self.params.len()
    }

    /// Length of the bit string.
    pub fn bit_len(&self) -> usize {
        self.bits.len()
    }

    /// Parameter describing gene `i`.
    pub fn parameter(&self, i: usize) -> &Parameter {
        self.params.get(i)
    }

    /// The shared parameter set.
    pub fn parameter_set(&self) -> &ParameterSet {
        &self.params
    }

    // ==== Gene values ====

    /// Decoded value of gene `i`.
    pub fn value(&self, i: usize) -> f64 {
        self.params.get(i).decode(self.gene_code(i))
    }

    /// All decoded values in gene order.
    pub fn values(&self) -> Vec<f64> {
        (0..self.gene_count()).map(|i| self.value(i)).collect()
    }

    /// Re-encodes gene `i` from a value.
    ///
    /// The value is quantized to the nearest grid point, so reading it
    /// back may differ by up to half a quantization step.
    pub fn set_value(&mut self, i: usize, value: f64) {
        let code = self.params.get(i).encode(value);
        self.write_gene(i, code);
    }

    /// Replaces gene `i` with a uniformly random code.
    pub fn randomize_gene<R: Rng>(&mut self, i: usize, rng: &mut R) {
        let code = self.params.get(i).encode_random(rng);
        self.write_gene(i, code);
    }

    fn gene_code(&self, i: usize) -> u64 {
        self.params.bit_range(i).fold(0u64, |code, pos| {
            (code << 1) | u64::from(self.bits[pos])
        })
    }

    fn write_gene(&mut self, i: usize, code: u64) {
        let range = self.params.bit_range(i);
        let width = range.len();
        for (k, pos) in range.enumerate() {
            self.bits[pos] = (code >> (width - 1 - k)) & 1 == 1;
        }
    }

    // ==== Raw bits ====

    /// Bit at string position `pos`.
    pub fn bit(&self, pos: usize) -> bool {
        self.bits[pos]
    }

    /// Overwrites the bit at string position `pos`.
    pub fn set_bit(&mut self, pos: usize, bit: bool) {
        self.bits[pos] = bit;
    }

    /// Inverts the bit at string position `pos`.
    pub fn flip_bit(&mut self, pos: usize) {
        self.bits[pos] = !self.bits[pos];
    }

    /// Copies a bit range from another chromosome of the same layout.
    /// An empty range is a no-op.
    pub fn copy_bits(&mut self, src: &Chromosome, range: std::ops::Range<usize>) {
        self.bits[range.clone()].copy_from_slice(&src.bits[range]);
    }

    // ==== Mutation step sizes ====

    /// Current step size of gene `i`.
    pub fn sigma(&self, i: usize) -> f64 {
        self.sigma[i]
    }

    /// Whether gene `i` ever received a real step size.
    pub fn sigma_is_set(&self, i: usize) -> bool {
        self.sigma[i] >= SIGMA_UNSET_EPS
    }

    /// Stores a step size for gene `i` and bumps its update count.
    pub fn update_sigma(&mut self, i: usize, sigma: f64) {
        self.sigma[i] = sigma;
        self.sigma_updates[i] += 1;
    }

    /// Number of times gene `i`'s step size has been written.
    pub fn sigma_updates(&self, i: usize) -> u32 {
        self.sigma_updates[i]
    }

    // ==== Scores ====

    /// Runs the objective on the decoded values and stores the scores.
    ///
    /// The first score becomes both the fitness and the raw total; the
    /// remaining scores are kept as constraint values (a constraint is
    /// violated when its score is `>= 0`).
    ///
    /// # Panics
    ///
    /// Panics if the objective returns no scores.
    pub fn evaluate<F>(&mut self, objective: F)
    where
        F: Fn(&[f64]) -> Vec<f64>,
    {
        let scores = objective(&self.values());
        assert!(
            !scores.is_empty(),
            "objective must return at least one score"
        );
        self.total = scores[0];
        self.fitness = scores[0];
        self.constraints.clear();
        self.constraints.extend_from_slice(&scores[1..]);
    }

    /// Current fitness. Starts as the raw total and may be rewritten by
    /// constraint adaptation and by selection.
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Overwrites the fitness.
    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    /// Raw objective total from the last evaluation.
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Constraint scores from the last evaluation.
    pub fn constraints(&self) -> &[f64] {
        &self.constraints
    }

    /// Index of the generation this chromosome belongs to (1-based).
    pub fn generation(&self) -> usize {
        self.generation
    }
}

// ==== Tests ====

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::Parameter;
    use crate::random::create_rng;

    fn shared_params() -> Arc<ParameterSet> {
        ParameterSet::new(vec![
            Parameter::new(0.0, 10.0, 8).unwrap(),
            Parameter::new(-5.0, 5.0, 4).unwrap(),
        ])
        .unwrap()
        .into_shared()
    }

    // ---- Construction ----

    #[test]
    fn test_blank_chromosome_decodes_to_lower_bounds() {
        let chr = Chromosome::blank(shared_params(), 1);
        assert_eq!(chr.gene_count(), 2);
        assert_eq!(chr.bit_len(), 12);
        assert_eq!(chr.value(0), 0.0);
        assert_eq!(chr.value(1), -5.0);
        assert_eq!(chr.generation(), 1);
    }

    #[test]
    fn test_random_chromosome_stays_in_bounds() {
        let mut rng = create_rng(11);
        for _ in 0..100 {
            let chr = Chromosome::random(shared_params(), 1, &mut rng);
            assert!((0.0..=10.0).contains(&chr.value(0)));
            assert!((-5.0..=5.0).contains(&chr.value(1)));
        }
    }

    // ---- Gene access ----

    #[test]
    fn test_set_value_round_trips_on_grid_points() {
        let mut chr = Chromosome::blank(shared_params(), 1);
        // 2.0 encodes exactly on the 8-bit grid of [0, 10].
        chr.set_value(0, 2.0);
        assert_eq!(chr.value(0), 2.0);
        // -5.0 and 5.0 are the 4-bit grid endpoints.
        chr.set_value(1, 5.0);
        assert_eq!(chr.value(1), 5.0);
        chr.set_value(1, -5.0);
        assert_eq!(chr.value(1), -5.0);
    }

    #[test]
    fn test_genes_are_packed_most_significant_bit_first() {
        let mut chr = Chromosome::blank(shared_params(), 1);
        chr.set_value(0, 10.0); // code 255: all eight bits set
        for pos in 0..8 {
            assert!(chr.bit(pos));
        }
        for pos in 8..12 {
            assert!(!chr.bit(pos));
        }
        chr.set_value(1, 5.0); // code 15 in the second gene
        for pos in 8..12 {
            assert!(chr.bit(pos));
        }
    }

    #[test]
    fn test_neighbouring_genes_do_not_overlap() {
        let mut chr = Chromosome::blank(shared_params(), 1);
        chr.set_value(0, 10.0);
        assert_eq!(chr.value(1), -5.0);
        chr.set_value(1, 5.0);
        assert_eq!(chr.value(0), 10.0);
    }

    #[test]
    fn test_flip_bit_changes_the_decoded_value() {
        let mut chr = Chromosome::blank(shared_params(), 1);
        chr.flip_bit(0); // most significant bit of gene 0
        let high = chr.value(0);
        assert!(high > 5.0);
        chr.flip_bit(0);
        assert_eq!(chr.value(0), 0.0);
    }

    #[test]
    fn test_copy_bits_transfers_a_range() {
        let params = shared_params();
        let mut src = Chromosome::blank(Arc::clone(&params), 1);
        src.set_value(0, 10.0);
        src.set_value(1, 5.0);

        let mut dst = Chromosome::blank(params, 1);
        dst.copy_bits(&src, 0..8);
        assert_eq!(dst.value(0), 10.0);
        assert_eq!(dst.value(1), -5.0);

        dst.copy_bits(&src, 8..8); // empty range
        assert_eq!(dst.value(1), -5.0);

        dst.copy_bits(&src, 8..12);
        assert_eq!(dst.value(1), 5.0);
    }

    #[test]
    fn test_randomize_gene_touches_only_that_gene() {
        let mut rng = create_rng(5);
        let mut chr = Chromosome::blank(shared_params(), 1);
        chr.set_value(0, 2.0);
        for _ in 0..50 {
            chr.randomize_gene(1, &mut rng);
            assert_eq!(chr.value(0), 2.0);
            assert!((-5.0..=5.0).contains(&chr.value(1)));
        }
    }

    // ---- Step sizes ----

    #[test]
    fn test_sigma_starts_unset_and_counts_writes() {
        let mut chr = Chromosome::blank(shared_params(), 1);
        assert!(!chr.sigma_is_set(0));
        assert_eq!(chr.sigma_updates(0), 0);

        chr.update_sigma(0, 0.5);
        assert!(chr.sigma_is_set(0));
        assert_eq!(chr.sigma(0), 0.5);
        assert_eq!(chr.sigma_updates(0), 1);

        chr.update_sigma(0, 0.25);
        assert_eq!(chr.sigma_updates(0), 2);
        assert!(!chr.sigma_is_set(1));
    }

    #[test]
    fn test_averaging_unset_sigmas_keeps_them_unset() {
        let mut chr = Chromosome::blank(shared_params(), 1);
        chr.update_sigma(0, 0.0);
        assert!(!chr.sigma_is_set(0));
    }

    // ---- Evaluation ----

    #[test]
    fn test_evaluate_splits_total_and_constraints() {
        let mut chr = Chromosome::blank(shared_params(), 1);
        chr.set_value(0, 2.0);
        chr.evaluate(|values| vec![values[0] * 3.0, values[0] - 10.0]);
        assert_eq!(chr.total(), 6.0);
        assert_eq!(chr.fitness(), 6.0);
        assert_eq!(chr.constraints(), &[-8.0]);
    }

    #[test]
    fn test_evaluate_without_constraints_leaves_none() {
        let mut chr = Chromosome::blank(shared_params(), 1);
        chr.evaluate(|values| vec![values[0] + values[1]]);
        assert!(chr.constraints().is_empty());
    }

    #[test]
    #[should_panic(expected = "at least one score")]
    fn test_evaluate_rejects_empty_score_vectors() {
        let mut chr = Chromosome::blank(shared_params(), 1);
        chr.evaluate(|_| Vec::new());
    }
}
