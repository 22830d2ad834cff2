//! Stochastic search engine for Bayesian Rule Lists.
//!
//! Learns an ordered sequence of precomputed boolean predicates
//! ("rules"), terminated by a default rule, that models a binary
//! classification distribution over a tabulated dataset. Training runs
//! MCMC (Metropolis-Hastings) or simulated-annealing search over the
//! space of ordered rule lists, scoring each by a log-posterior that
//! trades likelihood against a structural prior on list length and rule
//! cardinality.
//!
//! Rule mining, bitvector-backed dataset loading, CLI flags, and
//! held-out prediction are out of scope here; see `src/bin/brl.rs` for a
//! thin demo driver around [`train`].

pub mod accept;
pub mod bitvec;
pub mod chain;
pub mod config;
pub mod dataset_io;
pub mod error;
pub mod posterior;
pub mod prior;
pub mod proposal;
pub mod rule;
pub mod ruleset;
pub mod sa;
pub mod step;
pub mod train;

pub use bitvec::BitVec;
pub use config::{Config, Params};
pub use error::{BrlError, Result};
pub use rule::{Dataset, Rule, DEFAULT_RULE_ID, MAX_CARDINALITY};
pub use ruleset::{CapturedRule, RuleSet};
pub use train::{train, Initialization, Method, PredictionModel};
