//! Acceptance strategies for the unified proposal procedure.

use rand::Rng;

/// The two acceptance strategies behind a single match, per the design
/// notes' preference for a tagged variant over dynamic dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AcceptRule {
    Metropolis { jump_ratio: f64 },
    Sa { temperature: f64 },
}

impl AcceptRule {
    /// Enforces the hard pruning gate (`prefix_bound > max_lp`) before
    /// consulting either acceptance test; gate failures are rejections, not
    /// errors (spec section 7).
    pub fn accept(
        &self,
        new_lp: f64,
        old_lp: f64,
        prefix_bound: f64,
        max_lp: f64,
        rng: &mut impl Rng,
    ) -> bool {
        if !(prefix_bound > max_lp) {
            return false;
        }
        match *self {
            AcceptRule::Metropolis { jump_ratio } => {
                let u: f64 = rng.gen();
                u.ln() < (new_lp - old_lp) + jump_ratio.ln()
            }
            AcceptRule::Sa { temperature } => {
                if new_lp > old_lp {
                    true
                } else {
                    let u: f64 = rng.gen();
                    u.ln() < (new_lp - old_lp) / temperature
                }
            }
        }
    }
}
