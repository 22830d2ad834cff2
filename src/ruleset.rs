//! Ordered rule lists with precomputed per-position capture bitvectors.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::bitvec::BitVec;
use crate::error::{BrlError, Result};
use crate::rule::{Dataset, DEFAULT_RULE_ID};

/// One position in a `RuleSet`: a rule id plus the samples it captures at
/// that position (fired by this rule, not captured by any earlier one).
#[derive(Debug, Clone)]
pub struct CapturedRule {
    pub rule_id: u32,
    pub captures: BitVec,
    pub ncaptured: u32,
}

/// An ordered, default-terminated rule list.
#[derive(Debug, Clone)]
pub struct RuleSet {
    entries: Vec<CapturedRule>,
    nsamples: usize,
    max_rules: usize,
}

impl RuleSet {
    pub fn entries(&self) -> &[CapturedRule] {
        &self.entries
    }

    pub fn n_rules(&self) -> usize {
        self.entries.len()
    }

    pub fn nsamples(&self) -> usize {
        self.nsamples
    }

    pub fn max_rules(&self) -> usize {
        self.max_rules
    }

    /// Rule ids currently in the list, default included, in list order.
    pub fn rule_ids(&self) -> Vec<u32> {
        self.entries.iter().map(|e| e.rule_id).collect()
    }

    /// Builds a `RuleSet` from an explicit ordered list of non-default rule
    /// ids (the default rule is appended automatically) and derives every
    /// position's captures from scratch. Used by both `create_random` and
    /// `restore`.
    fn from_ids(ids: &[u32], nsamples: usize, max_rules: usize, dataset: &Dataset) -> Result<Self> {
        let mut entries = Vec::with_capacity(ids.len() + 1);
        for &id in ids {
            entries.push(CapturedRule {
                rule_id: id,
                captures: BitVec::new(nsamples),
                ncaptured: 0,
            });
        }
        entries.push(CapturedRule {
            rule_id: DEFAULT_RULE_ID,
            captures: BitVec::new(nsamples),
            ncaptured: 0,
        });
        let mut rs = RuleSet {
            entries,
            nsamples,
            max_rules,
        };
        rs.rederive_from(0, dataset)?;
        Ok(rs)
    }

    /// Picks `init_size` distinct non-default rule ids, places them in
    /// random order, and appends the default rule.
    pub fn create_random(
        init_size: usize,
        nsamples: usize,
        max_rules: usize,
        dataset: &Dataset,
        rng: &mut impl Rng,
    ) -> Result<Self> {
        if init_size > dataset.rules.len() {
            return Err(BrlError::InvalidParams(
                "init_size exceeds number of available rules".into(),
            ));
        }
        let mut ids: Vec<u32> = dataset.rules.iter().map(|r| r.id).collect();
        ids.shuffle(rng);
        ids.truncate(init_size);
        RuleSet::from_ids(&ids, nsamples, max_rules, dataset)
    }

    /// Deep copy, bitvectors included.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Inserts `rule_id` at `position` (never at the default's slot) and
    /// re-derives captures for positions at and after it.
    pub fn add(&mut self, rule_id: u32, position: usize, dataset: &Dataset) -> Result<()> {
        if position >= self.entries.len() {
            return Err(BrlError::InvalidParams(
                "add position must land before the default rule".into(),
            ));
        }
        if self.entries.len() >= self.max_rules {
            return Err(BrlError::Allocation);
        }
        self.entries.insert(
            position,
            CapturedRule {
                rule_id,
                captures: BitVec::new(self.nsamples),
                ncaptured: 0,
            },
        );
        self.rederive_from(position, dataset)
    }

    /// Removes the non-default entry at `position` and re-derives captures
    /// for positions at and after it. Infallible.
    pub fn delete(&mut self, position: usize, dataset: &Dataset) {
        debug_assert!(position + 1 < self.entries.len(), "cannot delete the default rule");
        self.entries.remove(position);
        self.rederive_from(position, dataset)
            .expect("delete never grows the list, so it cannot fail allocation");
    }

    /// Exchanges two non-default positions and re-derives captures from
    /// `min(i, j)` onward.
    pub fn swap_any(&mut self, i: usize, j: usize, dataset: &Dataset) -> Result<()> {
        let last = self.entries.len() - 1;
        if i == j || i >= last || j >= last {
            return Err(BrlError::InvalidParams(
                "swap indices must be distinct and exclude the default rule".into(),
            ));
        }
        self.entries.swap(i, j);
        self.rederive_from(i.min(j), dataset)
    }

    /// Returns the ordered rule id list (default included) for cheap
    /// backup/restore.
    pub fn backup(&self) -> (Vec<u32>, usize) {
        (self.rule_ids(), self.entries.len())
    }

    /// Rebuilds a `RuleSet` from a backed-up id list.
    pub fn restore(ids: &[u32], nsamples: usize, max_rules: usize, dataset: &Dataset) -> Result<Self> {
        let non_default = &ids[..ids.len() - 1];
        RuleSet::from_ids(non_default, nsamples, max_rules, dataset)
    }

    /// Re-derives `captures`/`ncaptured` for every position at and after
    /// `start`; positions before it are left untouched.
    fn rederive_from(&mut self, start: usize, dataset: &Dataset) -> Result<()> {
        let mut union = BitVec::new(self.nsamples);
        for entry in &self.entries[..start] {
            union.union_with(&entry.captures);
        }
        let last = self.entries.len() - 1;
        for i in start..self.entries.len() {
            let captures = if i == last {
                BitVec::all_ones(self.nsamples).and_not(&union)
            } else {
                let rule_id = self.entries[i].rule_id;
                let rule = dataset
                    .rule_by_id(rule_id)
                    .ok_or_else(|| BrlError::InvalidParams(format!("unknown rule id {rule_id}")))?;
                rule.truthtable.and_not(&union)
            };
            let ncaptured = captures.popcount();
            union.union_with(&captures);
            self.entries[i] = CapturedRule {
                rule_id: self.entries[i].rule_id,
                captures,
                ncaptured,
            };
        }
        Ok(())
    }

    /// Checks the invariants from the data model: disjoint captures
    /// covering every sample exactly once, and a default-terminated list.
    #[cfg(test)]
    fn check_invariants(&self) {
        let mut union = BitVec::new(self.nsamples);
        for e in &self.entries {
            assert!(union.and(&e.captures).popcount() == 0, "captures overlap");
            assert_eq!(e.ncaptured, e.captures.popcount());
            union.union_with(&e.captures);
        }
        assert!(union.is_all_ones(), "captures do not cover all samples");
        assert_eq!(self.entries.last().unwrap().rule_id, DEFAULT_RULE_ID);
        assert!(self.entries.len() >= 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Rule;
    use rand::SeedableRng;

    fn toy_dataset() -> Dataset {
        // 8 samples, 4 candidate rules with varied truthtables.
        let r1 = Rule::new(1, 1, BitVec::from_indices(8, [0, 1, 2]));
        let r2 = Rule::new(2, 1, BitVec::from_indices(8, [2, 3, 4]));
        let r3 = Rule::new(3, 2, BitVec::from_indices(8, [5, 6]));
        let r4 = Rule::new(4, 1, BitVec::from_indices(8, [0, 7]));
        let label0 = Rule::new(100, 1, BitVec::from_indices(8, [0, 2, 4, 6]));
        let label1 = Rule::new(101, 1, BitVec::from_indices(8, [1, 3, 5, 7]));
        Dataset::new(vec![r1, r2, r3, r4], [label0, label1], 8, 5)
    }

    #[test]
    fn create_random_satisfies_invariants() {
        let ds = toy_dataset();
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let rs = RuleSet::create_random(2, ds.nsamples, 5, &ds, &mut rng).unwrap();
        rs.check_invariants();
        assert_eq!(rs.n_rules(), 3);
    }

    #[test]
    fn add_preserves_prefix() {
        let ds = toy_dataset();
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let mut rs = RuleSet::create_random(2, ds.nsamples, 5, &ds, &mut rng).unwrap();
        let before: Vec<BitVec> = rs.entries().iter().map(|e| e.captures.clone()).collect();
        // insert at the end of the non-default prefix
        let used: Vec<u32> = rs.rule_ids();
        let new_id = ds
            .rules
            .iter()
            .map(|r| r.id)
            .find(|id| !used.contains(id))
            .unwrap();
        let insert_pos = rs.n_rules() - 1;
        rs.add(new_id, insert_pos, &ds).unwrap();
        rs.check_invariants();
        for i in 0..insert_pos {
            assert_eq!(rs.entries()[i].captures, before[i]);
        }
    }

    #[test]
    fn delete_then_invariants_hold() {
        let ds = toy_dataset();
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let mut rs = RuleSet::create_random(3, ds.nsamples, 5, &ds, &mut rng).unwrap();
        rs.delete(0, &ds);
        rs.check_invariants();
        assert_eq!(rs.n_rules(), 3);
    }

    #[test]
    fn swap_equal_truthtables_same_captures_union() {
        let ds = toy_dataset();
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);
        let mut rs = RuleSet::create_random(3, ds.nsamples, 5, &ds, &mut rng).unwrap();
        rs.swap_any(0, 1, &ds).unwrap();
        rs.check_invariants();
    }

    #[test]
    fn backup_restore_roundtrip() {
        let ds = toy_dataset();
        let mut rng = rand::rngs::StdRng::seed_from_u64(5);
        let rs = RuleSet::create_random(2, ds.nsamples, 5, &ds, &mut rng).unwrap();
        let (ids, len) = rs.backup();
        assert_eq!(len, ids.len());
        let restored = RuleSet::restore(&ids, ds.nsamples, 5, &ds).unwrap();
        assert_eq!(restored.rule_ids(), rs.rule_ids());
        for (a, b) in restored.entries().iter().zip(rs.entries().iter()) {
            assert_eq!(a.captures, b.captures);
        }
    }
}
