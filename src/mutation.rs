//! Mutation operators, from plain bit flips to self-adaptive gaussian
//! steps in the evolution-strategy tradition.
//!
//! Every operator walks the offspring gene by gene (bit by bit for
//! [`Mutation::BitFlip`]) and fires independently with the configured
//! mutation rate. A rate of zero disables the operator outright.
//!
//! The gaussian variants perturb the decoded value with a normal step
//! whose width is the gene's sigma. The uncorrelated one-step and
//! n-step schemes store sigma on the chromosome and evolve it
//! multiplicatively with the lognormal rule, so step sizes themselves
//! are subject to selection; the fixed flavours seed sigma from
//! [`MutationInfo::sigma`], the boundary flavours from a fraction of
//! the parameter span.
//!
//! # Operators
//!
//! | Operator | Acts on | Sigma |
//! |----------|---------|-------|
//! | [`Mutation::Boundary`] | gene | none, jumps to a bound |
//! | [`Mutation::BitFlip`] | bit | none |
//! | [`Mutation::Uniform`] | gene | none, fresh uniform draw |
//! | [`Mutation::OneStepFixed`] | gene | stored, lognormal, seeded from `sigma` |
//! | [`Mutation::OneStepBoundary`] | gene | stored, lognormal, seeded from the span |
//! | [`Mutation::NStepFixed`] | gene | stored, two-factor lognormal, seeded from `sigma` |
//! | [`Mutation::NStepBoundary`] | gene | stored, two-factor lognormal, seeded from the span |
//! | [`Mutation::SigmaPerGeneration`] | gene | recomputed from the chromosome's generation |
//! | [`Mutation::SigmaPerMutation`] | gene | seeded once, then constant |
//!
//! # References
//!
//! - Schwefel (1995), "Evolution and Optimum Seeking" (uncorrelated
//!   step-size adaptation)
//! - Bäck & Schwefel (1993), "An overview of evolutionary algorithms
//!   for parameter optimization"
//! - Eiben & Smith (2003), "Introduction to Evolutionary Computing",
//!   ch. 4

use crate::chromosome::Chromosome;
use crate::config::MutationInfo;
use rand::Rng;
use rand_distr::StandardNormal;

/// Operator that perturbs an offspring chromosome in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mutation {
    /// Replaces a gene by its lower or upper bound, either with equal
    /// probability.
    Boundary,

    /// Flips individual bits of the encoding.
    BitFlip,

    /// Redraws a gene uniformly over its bounds.
    Uniform,

    /// Uncorrelated one-step gaussian mutation; sigma seeded from
    /// [`MutationInfo::sigma`].
    OneStepFixed,

    /// Uncorrelated one-step gaussian mutation; sigma seeded from
    /// [`MutationInfo::ratio_boundary`] times the parameter span.
    OneStepBoundary,

    /// Uncorrelated n-step gaussian mutation; sigma seeded from
    /// [`MutationInfo::sigma`].
    NStepFixed,

    /// Uncorrelated n-step gaussian mutation; sigma seeded from
    /// [`MutationInfo::ratio_boundary`] times the parameter span.
    NStepBoundary,

    /// Gaussian mutation whose sigma is rebuilt every time from the
    /// chromosome's generation, without touching the stored state.
    SigmaPerGeneration,

    /// Gaussian mutation whose sigma is seeded on first touch and then
    /// kept constant.
    SigmaPerMutation,
}

impl Default for Mutation {
    fn default() -> Self {
        Mutation::BitFlip
    }
}

impl Mutation {
    /// Mutates `chr` in place with per-gene (or per-bit) rate `rate`.
    pub fn apply<R: Rng>(
        &self,
        chr: &mut Chromosome,
        rate: f64,
        info: &MutationInfo,
        rng: &mut R,
    ) {
        if rate == 0.0 {
            return;
        }
        match self {
            Mutation::Boundary => boundary(chr, rate, rng),
            Mutation::BitFlip => bit_flip(chr, rate, rng),
            Mutation::Uniform => uniform(chr, rate, rng),
            Mutation::OneStepFixed => one_step(chr, rate, info, false, rng),
            Mutation::OneStepBoundary => one_step(chr, rate, info, true, rng),
            Mutation::NStepFixed => n_step(chr, rate, info, false, rng),
            Mutation::NStepBoundary => n_step(chr, rate, info, true, rng),
            Mutation::SigmaPerGeneration => sigma_per_generation(chr, rate, info, rng),
            Mutation::SigmaPerMutation => sigma_per_mutation(chr, rate, info, rng),
        }
    }
}

// ==== Plain operators ====

fn boundary<R: Rng>(chr: &mut Chromosome, rate: f64, rng: &mut R) {
    for i in 0..chr.gene_count() {
        if rng.random_range(0.0..1.0) <= rate {
            let bound = if rng.random_bool(0.5) {
                chr.parameter(i).lower()
            } else {
                chr.parameter(i).upper()
            };
            chr.set_value(i, bound);
        }
    }
}

fn bit_flip<R: Rng>(chr: &mut Chromosome, rate: f64, rng: &mut R) {
    for j in 0..chr.bit_len() {
        if rng.random_range(0.0..1.0) <= rate {
            chr.flip_bit(j);
        }
    }
}

fn uniform<R: Rng>(chr: &mut Chromosome, rate: f64, rng: &mut R) {
    for i in 0..chr.gene_count() {
        if rng.random_range(0.0..1.0) <= rate {
            chr.randomize_gene(i, rng);
        }
    }
}

// ==== Self-adaptive operators ====

// seed for a gene whose sigma was never set: either the configured
// fixed sigma or a fraction of the parameter span, floored in both
// cases
fn seed_sigma(chr: &Chromosome, i: usize, info: &MutationInfo, from_span: bool) -> f64 {
    let base = if from_span {
        chr.parameter(i).span() * info.ratio_boundary
    } else {
        info.sigma
    };
    base.max(info.sigma_lowest)
}

fn one_step<R: Rng>(
    chr: &mut Chromosome,
    rate: f64,
    info: &MutationInfo,
    from_span: bool,
    rng: &mut R,
) {
    let n = chr.gene_count() as f64;
    let tau = 1.0 / n.sqrt();

    for i in 0..chr.gene_count() {
        if rng.random_range(0.0..1.0) > rate {
            continue;
        }
        let value = chr.value(i);
        let mut sigma = chr.sigma(i);
        if !chr.sigma_is_set(i) {
            sigma = seed_sigma(chr, i, info, from_span);
            chr.update_sigma(i, sigma);
        }

        // lognormal step-size update, applied even right after seeding
        let z: f64 = rng.sample(StandardNormal);
        sigma = (sigma * (tau * z).exp()).max(info.sigma_lowest);
        chr.update_sigma(i, sigma);

        let step: f64 = rng.sample(StandardNormal);
        chr.set_value(i, value + sigma * step);
    }
}

fn n_step<R: Rng>(
    chr: &mut Chromosome,
    rate: f64,
    info: &MutationInfo,
    from_span: bool,
    rng: &mut R,
) {
    let n = chr.gene_count() as f64;
    let tau1 = 1.0 / (2.0 * n).sqrt();
    let tau2 = 1.0 / (2.0 * n.sqrt()).sqrt();

    for i in 0..chr.gene_count() {
        if rng.random_range(0.0..1.0) > rate {
            continue;
        }
        let value = chr.value(i);
        let mut sigma = chr.sigma(i);
        if !chr.sigma_is_set(i) {
            // the seed is used as is; adaptation starts on the next
            // touch
            sigma = seed_sigma(chr, i, info, from_span);
            chr.update_sigma(i, sigma);
        } else {
            let z1: f64 = rng.sample(StandardNormal);
            let z2: f64 = rng.sample(StandardNormal);
            sigma = (sigma * (tau1 * z1).exp() * (tau2 * z2).exp()).max(info.sigma_lowest);
            chr.update_sigma(i, sigma);
        }

        let step: f64 = rng.sample(StandardNormal);
        chr.set_value(i, value + sigma * step);
    }
}

fn sigma_per_generation<R: Rng>(
    chr: &mut Chromosome,
    rate: f64,
    info: &MutationInfo,
    rng: &mut R,
) {
    let rounds = chr.generation() / 2;

    for i in 0..chr.gene_count() {
        if rng.random_range(0.0..1.0) > rate {
            continue;
        }
        let value = chr.value(i);

        // sigma is rebuilt from scratch and drifts once per two
        // generations lived; the stored per-gene state stays untouched
        let mut sigma = seed_sigma(chr, i, info, true);
        for _ in 0..rounds {
            let z: f64 = rng.sample(StandardNormal);
            sigma *= z.exp();
        }
        let sigma = sigma.max(info.sigma_lowest);

        let step: f64 = rng.sample(StandardNormal);
        chr.set_value(i, value + sigma * step);
    }
}

fn sigma_per_mutation<R: Rng>(
    chr: &mut Chromosome,
    rate: f64,
    info: &MutationInfo,
    rng: &mut R,
) {
    for i in 0..chr.gene_count() {
        if rng.random_range(0.0..1.0) > rate {
            continue;
        }
        let value = chr.value(i);
        if !chr.sigma_is_set(i) {
            let sigma = seed_sigma(chr, i, info, true);
            chr.update_sigma(i, sigma);
        }
        let sigma = chr.sigma(i);

        let step: f64 = rng.sample(StandardNormal);
        chr.set_value(i, value + sigma * step);
    }
}

// ==== Tests ====
