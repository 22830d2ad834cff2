//! Log-posterior evaluation: structural prior + Beta-Bernoulli likelihood,
//! plus the prefix upper bound used to prune proposals.

use statrs::function::gamma::ln_gamma;

use crate::bitvec::BitVec;
use crate::config::Params;
use crate::error::{BrlError, Result};
use crate::prior::PriorCache;
use crate::rule::Dataset;
use crate::ruleset::RuleSet;

/// `length4bound` selects how many leading positions of the ruleset
/// contribute to the prefix bound; `Disabled` skips the bound entirely
/// (the bound is then treated as non-binding — `+inf` — for any gate
/// check against it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundScope {
    Disabled,
    UpTo(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub log_posterior: f64,
    pub prefix_bound: f64,
}

/// Evaluates rule lists against a dataset and parameters; owns the
/// process-run-scoped `PriorCache` rather than relying on global state.
#[derive(Debug, Default)]
pub struct PosteriorEvaluator {
    prior: PriorCache,
}

impl PosteriorEvaluator {
    pub fn new() -> Self {
        PosteriorEvaluator::default()
    }

    pub fn evaluate(
        &mut self,
        rs: &RuleSet,
        dataset: &Dataset,
        params: &Params,
        bound_scope: BoundScope,
    ) -> Result<Evaluation> {
        self.prior
            .ensure(dataset.nrules, params.lambda, params.eta, params.max_cardinality);

        let m = rs.n_rules();
        let log_prior = self.log_prior(rs, dataset, m - 1)?;
        let log_likelihood = self.log_likelihood(rs, dataset, params);
        let log_posterior = log_prior + log_likelihood;

        let prefix_bound = match bound_scope {
            BoundScope::Disabled => f64::INFINITY,
            BoundScope::UpTo(length4bound) => {
                // The length term is evaluated at max(m-1, floor(lambda)) so
                // the bound stays a valid upper envelope as further rules
                // are added to the prefix.
                let length_index = (m - 1).max(params.lambda.floor() as usize);
                let prefix_prior = self.prefix_log_prior(rs, dataset, length4bound, length_index)?;
                let prefix_lik = self.prefix_log_likelihood(rs, dataset, length4bound);
                prefix_prior + prefix_lik
            }
        };

        Ok(Evaluation {
            log_posterior,
            prefix_bound,
        })
    }

    /// Full structural log-prior over list length and cardinalities, with
    /// the length term evaluated at `length_index` (either `m - 1` for the
    /// real posterior, or the envelope index for the bound).
    fn log_prior(&self, rs: &RuleSet, dataset: &Dataset, length_index: usize) -> Result<f64> {
        let max_card = dataset.rules.iter().map(|r| r.cardinality).max().unwrap_or(0) as usize;
        let mut card_count = vec![0u32; max_card + 1];
        for r in &dataset.rules {
            card_count[r.cardinality as usize] += 1;
        }
        let mut norm_constant = self.prior.eta_norm;

        let mut log_prior = self.prior.log_lambda_pmf[length_index];
        let m = rs.n_rules();
        for entry in &rs.entries()[..m - 1] {
            let rule = dataset
                .rule_by_id(entry.rule_id)
                .ok_or_else(|| BrlError::InvalidParams(format!("unknown rule id {}", entry.rule_id)))?;
            let c = rule.cardinality as usize;
            if norm_constant <= 0.0 {
                return Err(BrlError::DegeneratePrior);
            }
            log_prior += self.prior.log_eta_pmf[c] - norm_constant.ln() - (card_count[c] as f64).ln();
            card_count[c] -= 1;
            if card_count[c] == 0 {
                norm_constant -= self.prior.log_eta_pmf[c].exp();
            }
        }
        Ok(log_prior)
    }

    /// Prefix-only version of `log_prior`, accumulating only over positions
    /// `i <= length4bound` but using `length_index` for the length term.
    fn prefix_log_prior(
        &self,
        rs: &RuleSet,
        dataset: &Dataset,
        length4bound: usize,
        length_index: usize,
    ) -> Result<f64> {
        let max_card = dataset.rules.iter().map(|r| r.cardinality).max().unwrap_or(0) as usize;
        let mut card_count = vec![0u32; max_card + 1];
        for r in &dataset.rules {
            card_count[r.cardinality as usize] += 1;
        }
        let mut norm_constant = self.prior.eta_norm;

        let length_index = length_index.min(self.prior.log_lambda_pmf.len() - 1);
        let mut log_prior = self.prior.log_lambda_pmf[length_index];
        let m = rs.n_rules();
        // exclude the default rule (index m - 1) from the accumulation
        let upper = length4bound.min(m.saturating_sub(2));
        for entry in &rs.entries()[..=upper] {
            let rule = dataset
                .rule_by_id(entry.rule_id)
                .ok_or_else(|| BrlError::InvalidParams(format!("unknown rule id {}", entry.rule_id)))?;
            let c = rule.cardinality as usize;
            if norm_constant <= 0.0 {
                return Err(BrlError::DegeneratePrior);
            }
            log_prior += self.prior.log_eta_pmf[c] - norm_constant.ln() - (card_count[c] as f64).ln();
            card_count[c] -= 1;
            if card_count[c] == 0 {
                norm_constant -= self.prior.log_eta_pmf[c].exp();
            }
        }
        Ok(log_prior)
    }

    fn log_likelihood(&self, rs: &RuleSet, dataset: &Dataset, params: &Params) -> f64 {
        let (a0, a1) = params.alpha;
        rs.entries()
            .iter()
            .map(|entry| {
                let n0 = class0_captured(&entry.captures, dataset) as f64;
                let n1 = entry.ncaptured as f64 - n0;
                ln_gamma(n0 + a0) + ln_gamma(n1 + a1) - ln_gamma(n0 + n1 + a0 + a1)
            })
            .sum()
    }

    /// Flat Beta(1,1) likelihood over the shared prefix plus the leftover
    /// residual term at `length4bound`.
    fn prefix_log_likelihood(&self, rs: &RuleSet, dataset: &Dataset, length4bound: usize) -> f64 {
        let m = rs.n_rules();
        let upper = length4bound.min(m.saturating_sub(1));
        let mut log_lik = 0.0;
        let mut cum_n0 = 0.0;
        let mut cum_n1 = 0.0;
        for entry in &rs.entries()[..=upper] {
            let n0 = class0_captured(&entry.captures, dataset) as f64;
            let n1 = entry.ncaptured as f64 - n0;
            log_lik += ln_gamma(n0 + 1.0) + ln_gamma(n1 + 1.0) - ln_gamma(n0 + n1 + 2.0);
            cum_n0 += n0;
            cum_n1 += n1;
        }
        let left0 = dataset.labels[0].support as f64 - cum_n0;
        let left1 = dataset.labels[1].support as f64 - cum_n1;
        log_lik += ln_gamma(left0 + 1.0) + ln_gamma(left1 + 1.0) - ln_gamma(left0 + 2.0) - ln_gamma(left1 + 2.0)
            + 2.0 * ln_gamma(1.0);
        log_lik
    }
}

fn class0_captured(captures: &BitVec, dataset: &Dataset) -> u32 {
    captures.and(&dataset.labels[0].truthtable).popcount()
}
