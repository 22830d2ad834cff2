//! Move selection: picks a move kind and indices from the current rule
//! list, along with the Hastings jump-ratio correction for that move.

use rand::Rng;

use crate::rule::Dataset;
use crate::ruleset::RuleSet;

/// A proposed structural edit to a `RuleSet`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Move {
    Swap { i: usize, j: usize },
    Add { rule_id: u32, position: usize },
    Delete { position: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proposed {
    pub mv: Move,
    pub jump_ratio: f64,
}

/// Draws a move kind and its indices from the current ruleset, following
/// the regime table keyed on `m` (current length, default included) versus
/// `nrules` (size of the candidate rule pool).
pub fn propose_move(rs: &RuleSet, dataset: &Dataset, rng: &mut impl Rng) -> Proposed {
    let m = rs.n_rules();
    let nrules = dataset.nrules;

    enum Kind {
        Swap,
        Add,
        Delete,
    }

    let (p_swap, p_add, p_delete, base_s, base_a, base_d) = if m == 1 {
        (0.0, 1.0, 0.0, f64::NAN, 0.5, f64::NAN)
    } else if m == 2 {
        (0.0, 0.5, 0.5, f64::NAN, 2.0 / 3.0, 2.0)
    } else if m == nrules - 1 {
        (0.5, 0.0, 0.5, 1.0, f64::NAN, 2.0 / 3.0)
    } else if m == nrules - 2 {
        (1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0, 1.0, 1.5, 1.0)
    } else {
        (1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0, 1.0, 1.0, 1.0)
    };

    let draw: f64 = rng.gen();
    let kind = if draw < p_swap {
        Kind::Swap
    } else if draw < p_swap + p_add {
        Kind::Add
    } else {
        debug_assert!(p_delete > 0.0, "delete branch reached with zero probability");
        Kind::Delete
    };

    match kind {
        Kind::Swap => {
            // last non-default index is m - 2
            let last = m - 2;
            let i = rng.gen_range(0..=last);
            let mut j = rng.gen_range(0..=last);
            while j == i {
                j = rng.gen_range(0..=last);
            }
            Proposed {
                mv: Move::Swap { i, j },
                jump_ratio: base_s,
            }
        }
        Kind::Add => {
            let used: Vec<u32> = rs.rule_ids();
            let candidates: Vec<u32> = dataset
                .rules
                .iter()
                .map(|r| r.id)
                .filter(|id| !used.contains(id))
                .collect();
            let rule_id = candidates[rng.gen_range(0..candidates.len())];
            let position = rng.gen_range(0..=(m - 1));
            Proposed {
                mv: Move::Add { rule_id, position },
                jump_ratio: base_a * (nrules as f64 - 1.0 - m as f64),
            }
        }
        Kind::Delete => {
            let position = rng.gen_range(0..=(m - 2));
            Proposed {
                mv: Move::Delete { position },
                jump_ratio: base_d * (nrules - m) as f64,
            }
        }
    }
}
