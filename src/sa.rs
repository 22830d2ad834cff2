//! Simulated-annealing chain: a single random seed, no warm-start gate, and
//! a precomputed exponential cooling schedule.

use rand::Rng;

use crate::chain::ChainStats;
use crate::config::Params;
use crate::error::Result;
use crate::posterior::{BoundScope, PosteriorEvaluator};
use crate::rule::Dataset;
use crate::ruleset::RuleSet;
use crate::step::{propose_and_accept, Sampler, StepCounts};

pub struct SaResult {
    pub best: RuleSet,
    pub best_log_posterior: f64,
    pub stats: ChainStats,
    pub final_temperature: f64,
}

/// Builds the piecewise-constant cooling schedule: `tau[0] = 1`,
/// `tau[i] = tau[i-1] + exp(0.25*(i+1))`, with every integer time in
/// `[floor(tau[i-1]), floor(tau[i]))` assigned temperature `1/(i+1)`.
/// `cooling_steps` (default 28) is a configurable plateau count rather than
/// the source's hard-coded loop bound.
pub fn cooling_schedule(cooling_steps: usize) -> Vec<f64> {
    let mut tau = vec![1.0f64];
    for i in 1..cooling_steps {
        let prev = tau[i - 1];
        tau.push(prev + (0.25 * (i as f64 + 1.0)).exp());
    }

    let mut temperatures = Vec::new();
    for i in 0..cooling_steps {
        let start = if i == 0 { 0usize } else { tau[i - 1].floor() as usize };
        let end = tau[i].floor() as usize;
        let temperature = 1.0 / (i as f64 + 1.0);
        for _ in start..end.max(start + 1) {
            temperatures.push(temperature);
        }
    }
    temperatures
}

/// Runs one simulated-annealing chain across the full cooling schedule.
pub fn run_sa_chain(
    dataset: &Dataset,
    params: &Params,
    evaluator: &mut PosteriorEvaluator,
    rng: &mut impl Rng,
) -> Result<SaResult> {
    let seed = RuleSet::create_random(
        params.init_size,
        dataset.nsamples,
        dataset.nrules,
        dataset,
        rng,
    )?;
    let seed_eval = evaluator.evaluate(&seed, dataset, params, BoundScope::Disabled)?;

    let mut current = seed;
    let mut current_lp = seed_eval.log_posterior;
    let (mut best_ids, _) = current.backup();
    let mut best_lp = current_lp;
    let mut counts = StepCounts::default();

    let schedule = cooling_schedule(params.cooling_steps);
    let mut final_temperature = 1.0;
    for temperature in &schedule {
        final_temperature = *temperature;
        for _ in 0..params.sa_iters_per_step {
            let outcome = propose_and_accept(
                &current,
                current_lp,
                dataset,
                params,
                evaluator,
                Sampler::Sa {
                    temperature: *temperature,
                },
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
    }

    drop(current);
    let best = RuleSet::restore(&best_ids, dataset.nsamples, dataset.nrules, dataset)?;

    Ok(SaResult {
        best,
        best_log_posterior: best_lp,
        stats: counts.into(),
        final_temperature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitvec::BitVec;
    use crate::rule::{Rule, MAX_CARDINALITY};
    use rand::SeedableRng;

    #[test]
    fn cooling_schedule_is_non_increasing() {
        let schedule = cooling_schedule(28);
        for w in schedule.windows(2) {
            assert!(w[1] <= w[0]);
        }
    }

    #[test]
    fn cooling_schedule_reaches_expected_final_temperature() {
        let schedule = cooling_schedule(28);
        let last = *schedule.last().unwrap();
        assert!((last - 1.0 / 28.0).abs() < 1e-9);
    }

    fn toy_dataset() -> Dataset {
        let r1 = Rule::new(1, 1, BitVec::from_indices(8, [0, 1, 2]));
        let r2 = Rule::new(2, 1, BitVec::from_indices(8, [2, 3, 4]));
        let r3 = Rule::new(3, 2, BitVec::from_indices(8, [5, 6]));
        let r4 = Rule::new(4, 1, BitVec::from_indices(8, [0, 7]));
        let label0 = Rule::new(100, 1, BitVec::from_indices(8, [0, 2, 4, 6]));
        let label1 = Rule::new(101, 1, BitVec::from_indices(8, [1, 3, 5, 7]));
        Dataset::new(vec![r1, r2, r3, r4], [label0, label1], 8, 5)
    }

    fn toy_params() -> Params {
        Params {
            lambda: 2.0,
            eta: 1.0,
            alpha: (1.0, 1.0),
            threshold: 0.5,
            iters: 0,
            init_size: 1,
            nchain: 1,
            seed: 1,
            max_cardinality: MAX_CARDINALITY,
            sa_iters_per_step: 3,
            cooling_steps: 4,
        }
    }

    #[test]
    fn sa_chain_runs_expected_proposal_count() {
        let ds = toy_dataset();
        let params = toy_params();
        let mut evaluator = PosteriorEvaluator::new();
        let mut rng = rand::rngs::StdRng::seed_from_u64(5);
        let result = run_sa_chain(&ds, &params, &mut evaluator, &mut rng).unwrap();
        let schedule = cooling_schedule(params.cooling_steps);
        let expected = schedule.len() as u64 * params.sa_iters_per_step as u64;
        let total = result.stats.n_add + result.stats.n_delete + result.stats.n_swap;
        assert_eq!(total, expected);
    }
}
