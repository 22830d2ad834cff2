//! Multi-chain driver: runs `nchain` independent chains, keeps the best
//! rule list, and derives per-rule predictive probabilities.

use log::info;
use rand::Rng;

use crate::chain::{run_chain, ChainStats};
use crate::config::Params;
use crate::error::Result;
use crate::rule::Dataset;
use crate::ruleset::RuleSet;
use crate::sa::run_sa_chain;

/// Which sampler `train` should run each chain with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Mcmc,
    Sa,
}

/// How the first chain's seed is drawn. Only `Random` is implemented; the
/// variant exists so the external interface matches spec section 6's
/// `train(data, initialization, method, params)` signature without baking
/// in a single hard-coded seeding strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Initialization {
    Random,
}

#[derive(Debug, Clone)]
pub struct PredictionModel {
    pub rule_set: RuleSet,
    pub theta: Vec<f64>,
}

/// Runs `params.nchain` independent chains (first with `v_star = -inf`,
/// later ones steered by the best log-posterior found so far), keeps the
/// single best `RuleSet`, and computes the posterior-mean `theta` for every
/// position of the winner.
pub fn train(
    dataset: &Dataset,
    _initialization: Initialization,
    method: Method,
    params: &Params,
    rng: &mut impl Rng,
) -> Result<PredictionModel> {
    params.validate(dataset.nrules)?;

    let mut evaluator = crate::posterior::PosteriorEvaluator::new();
    let mut best: Option<RuleSet> = None;
    let mut best_lp = f64::NEG_INFINITY;
    let mut v_star = f64::NEG_INFINITY;

    for chain_idx in 0..params.nchain {
        let (chain_best, chain_lp, stats) = match method {
            Method::Mcmc => {
                let result = run_chain(dataset, params, &mut evaluator, v_star, rng)?;
                (result.best, result.best_log_posterior, result.stats)
            }
            Method::Sa => {
                let result = run_sa_chain(dataset, params, &mut evaluator, rng)?;
                (result.best, result.best_log_posterior, result.stats)
            }
        };

        log_chain_diagnostics(chain_idx, chain_lp, &stats);

        if chain_lp > best_lp {
            best_lp = chain_lp;
            best = Some(chain_best);
        }
        v_star = best_lp;
    }

    let winner = best.expect("nchain >= 1 guaranteed by Params::validate");
    let theta = compute_theta(&winner, dataset, params);

    Ok(PredictionModel {
        rule_set: winner,
        theta,
    })
}

fn log_chain_diagnostics(chain_idx: u32, log_posterior: f64, stats: &ChainStats) {
    info!(
        "chain {chain_idx}: log_posterior={log_posterior:.4} add={} delete={} swap={} bound_rejects={}",
        stats.n_add, stats.n_delete, stats.n_swap, stats.n_bound_rejects
    );
}

/// Beta posterior mean `theta[j] = (n1 + alpha1) / (n0 + n1 + alpha0 + alpha1)`
/// for every position of the winning list.
fn compute_theta(rule_set: &RuleSet, dataset: &Dataset, params: &Params) -> Vec<f64> {
    let (a0, a1) = params.alpha;
    rule_set
        .entries()
        .iter()
        .map(|entry| {
            let n0 = entry.captures.and(&dataset.labels[0].truthtable).popcount() as f64;
            let n1 = entry.ncaptured as f64 - n0;
            (n1 + a1) / (n0 + n1 + a0 + a1)
        })
        .collect()
}
