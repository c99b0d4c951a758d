//! Bit-encoded genetic algorithm engine with self-adaptive
//! evolution-strategy mutation.
//!
//! Decision variables are real intervals quantized onto fixed-width
//! binary grids; a chromosome concatenates the per-gene encodings into
//! one bit string. Crossover can therefore splice raw bits or blend
//! decoded values, and the gaussian mutation operators carry per-gene
//! step sizes that evolve along with the solutions they perturb.
//! Objectives are maximized and may return additional constraint
//! scores, which the population folds into fitness by dynamic penalty
//! adaptation.
//!
//! # Key Types
//!
//! - [`Parameter`] / [`ParameterSet`]: bounds, bit widths and the
//!   encode/decode grid
//! - [`Chromosome`]: one candidate solution with its adaptive state
//! - [`GaConfig`]: algorithm knobs with builder methods and validation
//! - [`Selection`], [`Crossover`], [`Mutation`]: enum-dispatched
//!   operators
//! - [`Engine`]: the generational loop, returning a [`RunResult`]
//!
//! # Quick start
//!
//! ```
//! use evobits::{Engine, GaConfig, Parameter, ParameterSet};
//!
//! // maximize f(x, y) = -(x^2 + y^2) over [-5, 5]^2
//! let params = ParameterSet::new(vec![
//!     Parameter::new(-5.0, 5.0, 16).unwrap(),
//!     Parameter::new(-5.0, 5.0, 16).unwrap(),
//! ]).unwrap();
//!
//! let config = GaConfig::default()
//!     .with_population_size(40)
//!     .with_generations(50)
//!     .with_seed(42);
//!
//! let mut engine = Engine::new(params, config, |values| {
//!     vec![-values.iter().map(|x| x * x).sum::<f64>()]
//! }).unwrap();
//!
//! let result = engine.run();
//! assert!(result.best_fitness > -8.0);
//! ```
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and
//!   Machine Learning*
//! - Eiben & Smith (2003), *Introduction to Evolutionary Computing*

pub mod chromosome;
pub mod config;
pub mod crossover;
pub mod engine;
pub mod error;
pub mod mutation;
pub mod parameter;
pub mod population;
pub mod random;
pub mod selection;

pub use chromosome::Chromosome;
pub use config::{GaConfig, MutationInfo};
pub use crossover::Crossover;
pub use engine::{Engine, RunResult};
pub use error::GaError;
pub use mutation::Mutation;
pub use parameter::{Parameter, ParameterSet, MAX_WIDTH};
pub use population::Population;
pub use random::create_rng;
pub use selection::Selection;
