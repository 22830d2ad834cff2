//! Precomputed log-PMFs for list length and rule cardinality.
//!
//! Lazily built on first use and rebuilt whenever the `(nrules, lambda, eta,
//! max_cardinality)` key it was built from changes — unlike the null-check
//! inversion in the source this crate's design notes call out, the gate here
//! is "rebuild if stale or absent", never "only build when already present".

use statrs::distribution::{Discrete, DiscreteCDF, Poisson};

#[derive(Debug, Clone, PartialEq)]
struct PriorKey {
    nrules: usize,
    lambda: f64,
    eta: f64,
    max_cardinality: u8,
}

/// Process-run-scoped cache of Poisson log-PMFs, owned by the chain driver
/// (or training loop) rather than kept as process-wide global state.
#[derive(Debug, Default)]
pub struct PriorCache {
    key: Option<PriorKey>,
    pub log_lambda_pmf: Vec<f64>,
    pub log_eta_pmf: Vec<f64>,
    pub eta_norm: f64,
}

impl PriorCache {
    pub fn new() -> Self {
        PriorCache::default()
    }

    /// Rebuilds the cache if `(nrules, lambda, eta, max_cardinality)` differs
    /// from what it was last built with.
    pub fn ensure(&mut self, nrules: usize, lambda: f64, eta: f64, max_cardinality: u8) {
        let key = PriorKey {
            nrules,
            lambda,
            eta,
            max_cardinality,
        };
        if self.key.as_ref() == Some(&key) {
            return;
        }
        let lambda_dist = Poisson::new(lambda).expect("lambda > 0 checked by Params::validate");
        self.log_lambda_pmf = (0..nrules)
            .map(|k| lambda_dist.ln_pmf(k as u64))
            .collect();

        let eta_dist = Poisson::new(eta).expect("eta > 0 checked by Params::validate");
        self.log_eta_pmf = (0..=max_cardinality as u64)
            .map(|c| eta_dist.ln_pmf(c))
            .collect();

        let cdf_at_max = eta_dist.cdf(max_cardinality as u64);
        let pmf_at_zero = eta_dist.pmf(0);
        self.eta_norm = cdf_at_max - pmf_at_zero;

        self.key = Some(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rebuilds_when_key_changes() {
        let mut cache = PriorCache::new();
        cache.ensure(20, 3.0, 2.0, 10);
        let first = cache.log_lambda_pmf.clone();
        cache.ensure(25, 3.0, 2.0, 10);
        assert_ne!(first.len(), cache.log_lambda_pmf.len());
    }

    #[test]
    fn reuses_when_key_unchanged() {
        let mut cache = PriorCache::new();
        cache.ensure(20, 3.0, 2.0, 10);
        let norm1 = cache.eta_norm;
        cache.ensure(20, 3.0, 2.0, 10);
        assert_relative_eq!(norm1, cache.eta_norm);
    }

    #[test]
    fn eta_norm_is_finite_and_positive_for_reasonable_eta() {
        let mut cache = PriorCache::new();
        cache.ensure(20, 3.0, 2.0, 10);
        assert!(cache.eta_norm.is_finite());
        assert!(cache.eta_norm > 0.0);
    }
}
