//! Crossover operators: recombining two parents into two offspring.
//!
//! Each operator draws two parents uniformly (with replacement) from
//! the mating pool of a [`Population`] and writes two offspring. The
//! arithmetic family works on decoded gene values and blends them with
//! a ratio `r`; the bit-string family splices raw bit ranges.
//!
//! # Operators
//!
//! | Operator | Family | Scheme |
//! |----------|--------|--------|
//! | [`Crossover::SimpleArithmetic`] | value | genes before a random position copied, the rest blended |
//! | [`Crossover::SingleArithmetic`] | value | one random gene blended, the rest copied |
//! | [`Crossover::WholeArithmetic`] | value | every gene blended |
//! | [`Crossover::OnePoint`] | bits | single cut, tails exchanged |
//! | [`Crossover::TwoPoint`] | bits | two cuts, middle band exchanged |
//! | [`Crossover::Uniform`] | bits | each bit drawn from either parent with probability 1/2 |
//!
//! Whatever the operator, both offspring inherit per-gene step sizes
//! equal to the exact average of their parents', so the self-adaptive
//! mutation state survives recombination.
//!
//! # References
//!
//! - Eiben & Smith (2003), "Introduction to Evolutionary Computing",
//!   ch. 3 (arithmetic recombination variants)

use crate::chromosome::Chromosome;
use crate::population::Population;
use rand::Rng;

/// Operator that recombines two mating-pool parents into two offspring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Crossover {
    /// Genes before a random position are copied from each offspring's
    /// own parent; genes from the position onward are blended.
    SimpleArithmetic,

    /// All genes are copied from each offspring's own parent except one
    /// random gene, which is blended.
    SingleArithmetic,

    /// Every gene is blended: offspring one gets
    /// `r * other + (1 - r) * own`, offspring two the mirror image.
    WholeArithmetic,

    /// Single random cut; bits up to and including the cut come from
    /// each offspring's own parent, the tails are exchanged.
    OnePoint,

    /// Two random cuts; the band between them is exchanged, the outer
    /// bands stay with each offspring's own parent.
    TwoPoint,

    /// Each bit position independently keeps or swaps the parents' bits
    /// with probability 1/2.
    Uniform,
}

impl Default for Crossover {
    fn default() -> Self {
        Crossover::OnePoint
    }
}

impl Crossover {
    /// Draws two parents from the mating pool and fills the two
    /// offspring buffers.
    ///
    /// # Panics
    ///
    /// Panics when the mating pool is empty.
    pub fn apply<R: Rng>(
        &self,
        pop: &Population,
        c1: &mut Chromosome,
        c2: &mut Chromosome,
        rng: &mut R,
    ) {
        assert!(
            !pop.pool().is_empty(),
            "cannot cross over with an empty mating pool"
        );
        let p1 = pop.pooled(rng.random_range(0..pop.pool().len()));
        let p2 = pop.pooled(rng.random_range(0..pop.pool().len()));

        match self {
            Crossover::SimpleArithmetic => simple_arithmetic(pop, p1, p2, c1, c2, rng),
            Crossover::SingleArithmetic => single_arithmetic(pop, p1, p2, c1, c2, rng),
            Crossover::WholeArithmetic => whole_arithmetic(pop, p1, p2, c1, c2, rng),
            Crossover::OnePoint => one_point(p1, p2, c1, c2, rng),
            Crossover::TwoPoint => two_point(p1, p2, c1, c2, rng),
            Crossover::Uniform => uniform(p1, p2, c1, c2, rng),
        }

        // both offspring inherit the averaged parent step sizes
        for i in 0..c1.gene_count() {
            let sigma = 0.5 * (p1.sigma(i) + p2.sigma(i));
            c1.update_sigma(i, sigma);
            c2.update_sigma(i, sigma);
        }
    }
}

// ==== Value-level operators ====

fn simple_arithmetic<R: Rng>(
    pop: &Population,
    p1: &Chromosome,
    p2: &Chromosome,
    c1: &mut Chromosome,
    c2: &mut Chromosome,
    rng: &mut R,
) {
    let genes = c1.gene_count();
    let pos = rng.random_range(0..genes);
    let r = pop.recombination_ratio(rng);
    for i in 0..pos {
        c1.set_value(i, p1.value(i));
        c2.set_value(i, p2.value(i));
    }
    for i in pos..genes {
        c1.set_value(i, r * p2.value(i) + (1.0 - r) * p1.value(i));
        c2.set_value(i, r * p1.value(i) + (1.0 - r) * p2.value(i));
    }
}

fn single_arithmetic<R: Rng>(
    pop: &Population,
    p1: &Chromosome,
    p2: &Chromosome,
    c1: &mut Chromosome,
    c2: &mut Chromosome,
    rng: &mut R,
) {
    let genes = c1.gene_count();
    let pos = rng.random_range(0..genes);
    let r = pop.recombination_ratio(rng);
    for i in 0..genes {
        c1.set_value(i, p1.value(i));
        c2.set_value(i, p2.value(i));
    }
    c1.set_value(pos, r * p2.value(pos) + (1.0 - r) * p1.value(pos));
    c2.set_value(pos, r * p1.value(pos) + (1.0 - r) * p2.value(pos));
}

fn whole_arithmetic<R: Rng>(
    pop: &Population,
    p1: &Chromosome,
    p2: &Chromosome,
    c1: &mut Chromosome,
    c2: &mut Chromosome,
    rng: &mut R,
) {
    let r = pop.recombination_ratio(rng);
    for i in 0..c1.gene_count() {
        c1.set_value(i, r * p2.value(i) + (1.0 - r) * p1.value(i));
        c2.set_value(i, r * p1.value(i) + (1.0 - r) * p2.value(i));
    }
}

// ==== Bit-level operators ====

fn one_point<R: Rng>(
    p1: &Chromosome,
    p2: &Chromosome,
    c1: &mut Chromosome,
    c2: &mut Chromosome,
    rng: &mut R,
) {
    let len = c1.bit_len();
    let cut = rng.random_range(0..len);
    c1.copy_bits(p1, 0..cut + 1);
    c2.copy_bits(p2, 0..cut + 1);
    c1.copy_bits(p2, cut + 1..len);
    c2.copy_bits(p1, cut + 1..len);
}

fn two_point<R: Rng>(
    p1: &Chromosome,
    p2: &Chromosome,
    c1: &mut Chromosome,
    c2: &mut Chromosome,
    rng: &mut R,
) {
    let len = c1.bit_len();
    let a = rng.random_range(0..len);
    let b = rng.random_range(0..len);
    let (lo, hi) = (a.min(b), a.max(b));

    c1.copy_bits(p1, 0..lo + 1);
    c2.copy_bits(p2, 0..lo + 1);
    c1.copy_bits(p2, lo + 1..hi + 1);
    c2.copy_bits(p1, lo + 1..hi + 1);
    c1.copy_bits(p1, hi + 1..len);
    c2.copy_bits(p2, hi + 1..len);
}

fn uniform<R: Rng>(
    p1: &Chromosome,
    p2: &Chromosome,
    c1: &mut Chromosome,
    c2: &mut Chromosome,
    rng: &mut R,
) {
    for j in 0..c1.bit_len() {
        if rng.random_bool(0.5) {
            c1.set_bit(j, p1.bit(j));
            c2.set_bit(j, p2.bit(j));
        } else {
            c1.set_bit(j, p2.bit(j));
            c2.set_bit(j, p1.bit(j));
        }
    }
}

// ==== Tests ====
