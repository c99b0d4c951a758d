//! Bounded parameters and their fixed-point bit encoding.
//!
//! Every decision variable is a [`Parameter`]: a closed interval
//! `[lower, upper]` discretized on a uniform grid of `2^width` points.
//! A gene stores the grid index as an unsigned integer of `width` bits;
//! [`Parameter::decode`] maps the index back into the interval.
//!
//! The encoding is lossy by construction. The round trip
//! `decode(encode(v))` lands on the nearest grid point, so the error is
//! bounded by one [`Parameter::quantization_step`] (and by half a step
//! when rounding to nearest, as done here).
//!
//! A [`ParameterSet`] is the ordered collection of parameters shared by
//! every chromosome of a run. It fixes the gene order, the bit offset of
//! each gene inside the concatenated bit string, and the total string
//! length.

use crate::error::GaError;
use rand::Rng;
use std::ops::Range;
use std::sync::Arc;

/// Largest usable encoding width in bits.
///
/// Codes are manipulated as `u64` grid indices, and `2^width - 1` must
/// remain representable, so widths run from 1 to 63.
pub const MAX_WIDTH: u32 = 63;

/// A bounded decision variable with a fixed-point binary encoding.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Parameter {
    lower: f64,
    upper: f64,
    width: u32,
    initial: Option<f64>,
}

impl Parameter {
    /// Creates a parameter over `[lower, upper]` encoded on `width` bits.
    ///
    /// # Errors
    ///
    /// Returns [`GaError::InvalidBounds`] unless `lower < upper` (NaN
    /// bounds fail this check as well), and [`GaError::InvalidWidth`]
    /// unless `1 <= width <= 63`.
    ///
    /// # Example
    ///
    /// ```
    /// use evobits::parameter::Parameter;
    ///
    /// let x = Parameter::new(0.0, 10.0, 8).unwrap();
    /// assert_eq!(x.width(), 8);
    /// assert!(Parameter::new(10.0, 0.0, 8).is_err());
    /// ```
    pub fn new(lower: f64, upper: f64, width: u32) -> Result<Self, GaError> {
        if !(lower < upper) {
            return Err(GaError::InvalidBounds { lower, upper });
        }
        if width == 0 || width > MAX_WIDTH {
            return Err(GaError::InvalidWidth { width });
        }
        Ok(Self {
            lower,
            upper,
            width,
            initial: None,
        })
    }

    /// Attaches an initial value used to seed the first generation.
    ///
    /// The value is clamped into the bounds when encoded. Only the first
    /// chromosome of the initial population receives initial values; the
    /// rest of the population stays random.
    pub fn with_initial(mut self, value: f64) -> Self {
        self.initial = Some(value);
        self
    }

    /// Lower bound of the interval.
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Upper bound of the interval.
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Bounds as a `(lower, upper)` pair.
    pub fn bounds(&self) -> (f64, f64) {
        (self.lower, self.upper)
    }

    /// Width of the interval, `upper - lower`.
    pub fn span(&self) -> f64 {
        self.upper - self.lower
    }

    /// Encoding width in bits.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Initial value attached with [`Parameter::with_initial`], if any.
    pub fn initial(&self) -> Option<f64> {
        self.initial
    }

    /// Largest grid index, `2^width - 1`.
    pub fn max_code(&self) -> u64 {
        (1u64 << self.width) - 1
    }

    /// Distance between adjacent grid points.
    ///
    /// This is the worst-case round-trip error of the encoding; rounding
    /// to the nearest grid point halves it in practice.
    pub fn quantization_step(&self) -> f64 {
        self.span() / self.max_code() as f64
    }

    /// Quantizes a value to the nearest grid index.
    ///
    /// Values outside the bounds are clamped to the nearest bound before
    /// quantization, so the returned code is always valid.
    ///
    /// # Example
    ///
    /// ```
    /// use evobits::parameter::Parameter;
    ///
    /// let x = Parameter::new(0.0, 10.0, 8).unwrap();
    /// assert_eq!(x.encode(0.0), 0);
    /// assert_eq!(x.encode(10.0), 255);
    /// // 5.0 sits between grid points 127 and 128.
    /// let code = x.encode(5.0);
    /// assert!((x.decode(code) - 5.0).abs() <= x.quantization_step());
    /// ```
    pub fn encode(&self, value: f64) -> u64 {
        let ratio = ((value - self.lower) / self.span()).clamp(0.0, 1.0);
        (ratio * self.max_code() as f64).round() as u64
    }

    /// Maps a grid index back into the interval.
    ///
    /// `decode(0)` is the lower bound and `decode(max_code())` the upper
    /// bound; intermediate codes are evenly spaced between them.
    pub fn decode(&self, code: u64) -> f64 {
        self.lower + code as f64 / self.max_code() as f64 * self.span()
    }

    /// Draws a uniformly random grid index.
    pub fn encode_random<R: Rng>(&self, rng: &mut R) -> u64 {
        rng.random_range(0..=self.max_code())
    }
}

// ==== Parameter set ====

/// Ordered, immutable collection of the parameters of a run.
///
/// The set fixes the layout of every chromosome: gene `i` occupies the
/// bit range [`ParameterSet::bit_range`]`(i)` of the concatenated bit
/// string, whose total length is [`ParameterSet::total_bits`]. Wrapped
/// in an [`Arc`] by the population so chromosomes can decode themselves
/// without borrowing anything else.
#[derive(Debug, Clone)]
pub struct ParameterSet {
    params: Vec<Parameter>,
    offsets: Vec<usize>,
    total_bits: usize,
}

impl ParameterSet {
    /// Builds a set from a list of parameters.
    ///
    /// # Errors
    ///
    /// Returns [`GaError::EmptyParameterSet`] when `params` is empty.
    pub fn new(params: Vec<Parameter>) -> Result<Self, GaError> {
        if params.is_empty() {
            return Err(GaError::EmptyParameterSet);
        }
        let mut offsets = Vec::with_capacity(params.len());
        let mut total_bits = 0;
        for param in &params {
            offsets.push(total_bits);
            total_bits += param.width() as usize;
        }
        Ok(Self {
            params,
            offsets,
            total_bits,
        })
    }

    /// Builds a set of same-width parameters from
    /// `(lower, upper, initial)` tuples.
    ///
    /// # Errors
    ///
    /// Propagates the first [`GaError`] raised by an invalid tuple, or
    /// [`GaError::EmptyParameterSet`] for an empty list.
    ///
    /// # Example
    ///
    /// ```
    /// use evobits::parameter::ParameterSet;
    ///
    /// let params = ParameterSet::from_tuples(
    ///     &[(0.0, 10.0, None), (-5.0, 5.0, Some(1.0))],
    ///     16,
    /// )
    /// .unwrap();
    /// assert_eq!(params.len(), 2);
    /// assert_eq!(params.total_bits(), 32);
    /// ```
    pub fn from_tuples(specs: &[(f64, f64, Option<f64>)], width: u32) -> Result<Self, GaError> {
        let params = specs
            .iter()
            .map(|&(lower, upper, initial)| {
                let param = Parameter::new(lower, upper, width)?;
                Ok(match initial {
                    Some(value) => param.with_initial(value),
                    None => param,
                })
            })
            .collect::<Result<Vec<_>, GaError>>()?;
        Self::new(params)
    }

    /// Number of parameters (genes per chromosome).
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether the set is empty. Construction forbids this, so it only
    /// returns `false`; provided for slice-like completeness.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Total length of the concatenated bit string.
    pub fn total_bits(&self) -> usize {
        self.total_bits
    }

    /// Parameter of gene `i`.
    ///
    /// # Panics
    ///
    /// Panics when `i` is out of range.
    pub fn get(&self, i: usize) -> &Parameter {
        &self.params[i]
    }

    /// Bit offset of gene `i` inside the concatenated string.
    pub fn offset(&self, i: usize) -> usize {
        self.offsets[i]
    }

    /// Bit range `[offset, offset + width)` of gene `i`.
    pub fn bit_range(&self, i: usize) -> Range<usize> {
        let start = self.offsets[i];
        start..start + self.params[i].width() as usize
    }

    /// Iterates over the parameters in gene order.
    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.params.iter()
    }

    /// Wraps the set for sharing across chromosomes.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

// ==== Tests ====
