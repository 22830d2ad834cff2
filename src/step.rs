//! The unified proposal procedure: one routine drives both the MCMC and SA
//! samplers, differing only in which `AcceptRule` variant it builds.

use rand::Rng;

use crate::accept::AcceptRule;
use crate::config::Params;
use crate::error::Result;
use crate::posterior::{BoundScope, PosteriorEvaluator};
use crate::proposal::{propose_move, Move};
use crate::rule::Dataset;
use crate::ruleset::RuleSet;

/// Which sampler is driving this step; selects how the acceptance rule is
/// built from the proposal kernel's jump ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sampler {
    Metropolis,
    Sa { temperature: f64 },
}

/// Per-step bookkeeping the chain driver accumulates for diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepCounts {
    pub n_add: u64,
    pub n_delete: u64,
    pub n_swap: u64,
    pub n_bound_rejects: u64,
}

impl StepCounts {
    fn record_move(&mut self, mv: Move) {
        match mv {
            Move::Add { .. } => self.n_add += 1,
            Move::Delete { .. } => self.n_delete += 1,
            Move::Swap { .. } => self.n_swap += 1,
        }
    }
}

pub struct StepOutcome {
    pub ruleset: RuleSet,
    pub log_posterior: f64,
    pub accepted: bool,
}

/// The position at which the proposed ruleset's structure first diverges
/// from the current one; `None` means there is no shared, already-scored
/// prefix to bound against (the bound is then disabled for this step).
fn change_index(mv: Move) -> Option<usize> {
    let position = match mv {
        Move::Swap { i, j } => i.min(j),
        Move::Add { position, .. } => position,
        Move::Delete { position } => position,
    };
    position.checked_sub(1)
}

/// Draws one proposal from `current`, scores it, and returns either the
/// accepted proposal or a copy of the original, per spec section 4.6.
#[allow(clippy::too_many_arguments)]
pub fn propose_and_accept(
    current: &RuleSet,
    current_lp: f64,
    dataset: &Dataset,
    params: &Params,
    evaluator: &mut PosteriorEvaluator,
    sampler: Sampler,
    max_lp: f64,
    counts: &mut StepCounts,
    rng: &mut impl Rng,
) -> Result<StepOutcome> {
    let mut proposal = current.copy();
    let proposed = propose_move(current, dataset, rng);
    counts.record_move(proposed.mv);

    match proposed.mv {
        Move::Swap { i, j } => proposal.swap_any(i, j, dataset)?,
        Move::Add { rule_id, position } => proposal.add(rule_id, position, dataset)?,
        Move::Delete { position } => proposal.delete(position, dataset),
    }

    let bound_scope = match change_index(proposed.mv) {
        Some(length4bound) => BoundScope::UpTo(length4bound),
        None => BoundScope::Disabled,
    };
    let eval = evaluator.evaluate(&proposal, dataset, params, bound_scope)?;

    let accept_rule = match sampler {
        Sampler::Metropolis => AcceptRule::Metropolis {
            jump_ratio: proposed.jump_ratio,
        },
        Sampler::Sa { temperature } => AcceptRule::Sa { temperature },
    };

    if !(eval.prefix_bound > max_lp) {
        counts.n_bound_rejects += 1;
        return Ok(StepOutcome {
            ruleset: current.copy(),
            log_posterior: current_lp,
            accepted: false,
        });
    }

    if accept_rule.accept(eval.log_posterior, current_lp, eval.prefix_bound, max_lp, rng) {
        Ok(StepOutcome {
            ruleset: proposal,
            log_posterior: eval.log_posterior,
            accepted: true,
        })
    } else {
        Ok(StepOutcome {
            ruleset: current.copy(),
            log_posterior: current_lp,
            accepted: false,
        })
    }
}
