//! Input data model: rules, labels, and the dataset they're drawn from.

use crate::bitvec::BitVec;

/// Maximum representable rule cardinality. Kept as a runtime constant rather
/// than a hard-coded buffer size (see the cooling-schedule note in
/// `sa.rs` for the same concern elsewhere in this crate).
pub const MAX_CARDINALITY: u8 = 10;

/// The default rule's id by convention. It never appears in `rules[]`; it
/// is synthesized whenever a `RuleSet`'s final position is built.
pub const DEFAULT_RULE_ID: u32 = 0;

/// A precomputed boolean predicate over samples, mined externally.
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: u32,
    pub cardinality: u8,
    pub truthtable: BitVec,
    pub support: u32,
}

impl Rule {
    pub fn new(id: u32, cardinality: u8, truthtable: BitVec) -> Self {
        let support = truthtable.popcount();
        Rule {
            id,
            cardinality,
            truthtable,
            support,
        }
    }
}

/// Rules, labels, and sizing the search operates over. Externally supplied;
/// this crate never mines rules or loads files on its own behalf.
///
/// `nrules` is supplied by the caller rather than derived from
/// `rules.len()`: per the data model, a `RuleSet`'s capacity
/// (`max_rules = nrules`) counts the default rule's slot too, so callers
/// pass `rules.len() + 1` by convention (one slot per candidate rule, plus
/// the slot the default rule always occupies).
#[derive(Debug, Clone)]
pub struct Dataset {
    pub rules: Vec<Rule>,
    pub labels: [Rule; 2],
    pub nsamples: usize,
    pub nrules: usize,
}

impl Dataset {
    pub fn new(rules: Vec<Rule>, labels: [Rule; 2], nsamples: usize, nrules: usize) -> Self {
        Dataset {
            rules,
            labels,
            nsamples,
            nrules,
        }
    }

    pub fn rule_by_id(&self, id: u32) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }
}
