//! Minimal JSON dataset format for the demo CLI. Not a rule-mining tool:
//! it only converts an already-mined rule pool (fire-sets given as sample
//! index lists) into the `Dataset` the search engine consumes.

use serde::Deserialize;
use std::path::Path;

use crate::bitvec::BitVec;
use crate::error::{BrlError, Result};
use crate::rule::{Dataset, Rule};

#[derive(Debug, Deserialize)]
struct RuleSpec {
    id: u32,
    cardinality: u8,
    fires_on: Vec<usize>,
}

#[derive(Debug, Deserialize)]
struct DatasetSpec {
    nsamples: usize,
    nrules: usize,
    rules: Vec<RuleSpec>,
    label0: Vec<usize>,
    label1: Vec<usize>,
}

/// Id reserved for the class-0 label rule in loaded datasets.
const LABEL0_ID: u32 = u32::MAX;
/// Id reserved for the class-1 label rule in loaded datasets.
const LABEL1_ID: u32 = u32::MAX - 1;

pub fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset> {
    let text = std::fs::read_to_string(path.as_ref())
        .map_err(|e| BrlError::InvalidParams(format!("could not read dataset file: {e}")))?;
    let spec: DatasetSpec = serde_json::from_str(&text)
        .map_err(|e| BrlError::InvalidParams(format!("could not parse dataset file: {e}")))?;

    let rules = spec
        .rules
        .into_iter()
        .map(|r| Rule::new(r.id, r.cardinality, BitVec::from_indices(spec.nsamples, r.fires_on)))
        .collect();
    let label0 = Rule::new(LABEL0_ID, 1, BitVec::from_indices(spec.nsamples, spec.label0));
    let label1 = Rule::new(LABEL1_ID, 1, BitVec::from_indices(spec.nsamples, spec.label1));

    Ok(Dataset::new(rules, [label0, label1], spec.nsamples, spec.nrules))
}
