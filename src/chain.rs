//! Runs one MCMC chain: warm-start seeding against `v_star`, Metropolis
//! proposals for `iters` steps, and best-so-far tracking/restoration.

use rand::Rng;

use crate::config::Params;
use crate::error::Result;
use crate::posterior::{BoundScope, PosteriorEvaluator};
use crate::rule::Dataset;
use crate::ruleset::RuleSet;
use crate::step::{propose_and_accept, Sampler, StepCounts};

/// Diagnostic counters for a single chain, reset at chain start.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainStats {
    pub n_add: u64,
    pub n_delete: u64,
    pub n_swap: u64,
    pub n_bound_rejects: u64,
}

impl From<StepCounts> for ChainStats {
    fn from(c: StepCounts) -> Self {
        ChainStats {
            n_add: c.n_add,
            n_delete: c.n_delete,
            n_swap: c.n_swap,
            n_bound_rejects: c.n_bound_rejects,
        }
    }
}

pub struct ChainResult {
    pub best: RuleSet,
    pub best_log_posterior: f64,
    pub stats: ChainStats,
}

/// Resamples `create_random(init_size)` until its prefix bound clears
/// `v_star`; for the first chain `v_star` is `-inf` so exactly one draw is
/// made. A freshly drawn candidate has no prior state to diff against, so
/// the envelope covers the candidate's entire non-default prefix (mirroring
/// how `step.rs::change_index` turns a move's earliest touched position
/// into a `BoundScope::UpTo`), rather than being disabled outright.
fn seed_ruleset(
    init_size: usize,
    dataset: &Dataset,
    params: &Params,
    evaluator: &mut PosteriorEvaluator,
    v_star: f64,
    rng: &mut impl Rng,
) -> Result<(RuleSet, f64)> {
    loop {
        let candidate = RuleSet::create_random(init_size, dataset.nsamples, dataset.nrules, dataset, rng)?;
        let length4bound = candidate.n_rules().saturating_sub(2);
        let eval = evaluator.evaluate(&candidate, dataset, params, BoundScope::UpTo(length4bound))?;
        if eval.prefix_bound >= v_star {
            return Ok((candidate, eval.log_posterior));
        }
    }
}

/// Runs one Metropolis-Hastings chain.
pub fn run_chain(
    dataset: &Dataset,
    params: &Params,
    evaluator: &mut PosteriorEvaluator,
    v_star: f64,
    rng: &mut impl Rng,
) -> Result<ChainResult> {
    let (seed, seed_lp) = seed_ruleset(
        params.init_size,
        dataset,
        params,
        evaluator,
        v_star,
        rng,
    )?;

    let mut current = seed;
    let mut current_lp = seed_lp;
    let (mut best_ids, _) = current.backup();
    let mut best_lp = current_lp;
    let mut counts = StepCounts::default();

    for _ in 0..params.iters {
        let outcome = propose_and_accept(
            &current,
            current_lp,
            dataset,
            params,
            evaluator,
            Sampler::Metropolis,
            best_lp,
            &mut counts,
            rng,
        )?;
        current = outcome.ruleset;
        current_lp = outcome.log_posterior;

        if current_lp > best_lp {
            best_lp = current_lp;
            let (ids, _) = current.backup();
            best_ids = ids;
        }
    }

    drop(current);
    let best = RuleSet::restore(&best_ids, dataset.nsamples, dataset.nrules, dataset)?;

    Ok(ChainResult {
        best,
        best_log_posterior: best_lp,
        stats: counts.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitvec::BitVec;
    use crate::rule::{Rule, MAX_CARDINALITY};
    use rand::SeedableRng;

    fn toy_dataset() -> Dataset {
        let r1 = Rule::new(1, 1, BitVec::from_indices(8, [0, 1, 2]));
        let r2 = Rule::new(2, 1, BitVec::from_indices(8, [2, 3, 4]));
        let r3 = Rule::new(3, 2, BitVec::from_indices(8, [5, 6]));
        let r4 = Rule::new(4, 1, BitVec::from_indices(8, [0, 7]));
        let label0 = Rule::new(100, 1, BitVec::from_indices(8, [0, 2, 4, 6]));
        let label1 = Rule::new(101, 1, BitVec::from_indices(8, [1, 3, 5, 7]));
        Dataset::new(vec![r1, r2, r3, r4], [label0, label1], 8, 5)
    }

    fn toy_params(iters: u64) -> Params {
        Params {
            lambda: 2.0,
            eta: 1.0,
            alpha: (1.0, 1.0),
            threshold: 0.5,
            iters,
            init_size: 1,
            nchain: 1,
            seed: 1,
            max_cardinality: MAX_CARDINALITY,
            sa_iters_per_step: 200,
            cooling_steps: 28,
        }
    }

    #[test]
    fn chain_runs_and_restores_best() {
        let ds = toy_dataset();
        let params = toy_params(200);
        let mut evaluator = PosteriorEvaluator::new();
        let mut rng = rand::rngs::StdRng::seed_from_u64(123);
        let result = run_chain(&ds, &params, &mut evaluator, f64::NEG_INFINITY, &mut rng).unwrap();
        assert!(result.best.n_rules() >= 2);
        assert!(result.best_log_posterior.is_finite());
    }

    #[test]
    fn same_seed_gives_bit_identical_results() {
        let ds = toy_dataset();
        let params = toy_params(200);

        let mut evaluator1 = PosteriorEvaluator::new();
        let mut rng1 = rand::rngs::StdRng::seed_from_u64(77);
        let r1 = run_chain(&ds, &params, &mut evaluator1, f64::NEG_INFINITY, &mut rng1).unwrap();

        let mut evaluator2 = PosteriorEvaluator::new();
        let mut rng2 = rand::rngs::StdRng::seed_from_u64(77);
        let r2 = run_chain(&ds, &params, &mut evaluator2, f64::NEG_INFINITY, &mut rng2).unwrap();

        assert_eq!(r1.best.rule_ids(), r2.best.rule_ids());
        assert_eq!(r1.best_log_posterior, r2.best_log_posterior);
    }
}
