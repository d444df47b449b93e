//! Level-wise, top-down lattice search.
//!
//! The search starts at the largest optimistic candidates and walks down the
//! lattice one cardinality at a time. A level is validated in parallel; the
//! accepted candidates are then recorded one by one in a [`MaximalIndex`],
//! and the rejected ones are shrunk into their immediate subsets for the next
//! level. Subsets already covered by an accepted set are dropped, since
//! support is monotone and they could never be maximal.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use roaring::RoaringBitmap;
use tracing::{debug, trace};

use crate::candidate::{CheckedColumnCombination, ColumnCombination};
use crate::preprocess::{ColumnIndex, SignatureHasher};
use crate::prune::CandidatesByCardinality;
use crate::validate::Validator;

// ------------- Acceptance -------------
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Acceptance {
    /// Every row must coincide; rejects at the first differing column.
    Exact,
    /// Support must reach the given minimum.
    Threshold(f64),
}

#[derive(Debug)]
pub enum Verdict {
    Accepted(CheckedColumnCombination),
    Rejected(ColumnCombination),
}

impl Acceptance {
    pub fn from_min_support(min_support: f64) -> Self {
        if min_support >= 1.0 {
            Acceptance::Exact
        } else {
            Acceptance::Threshold(min_support)
        }
    }
    pub fn verdict(&self, validator: &Validator, combination: &ColumnCombination) -> Verdict {
        match *self {
            Acceptance::Exact => {
                if validator.is_exact(combination) {
                    Verdict::Accepted(CheckedColumnCombination::new(combination.clone(), 1.0))
                } else {
                    Verdict::Rejected(combination.clone())
                }
            }
            Acceptance::Threshold(min_support) => {
                let checked = validator.check_column_combination(combination);
                if checked.support() >= min_support {
                    Verdict::Accepted(checked)
                } else {
                    trace!(candidate = %checked, "rejected");
                    Verdict::Rejected(combination.clone())
                }
            }
        }
    }
}

// ------------- Maximal index -------------
/// Accepted combinations, indexed for superset queries: for every column
/// the ids of the accepted sets containing it.
#[derive(Debug, Default)]
pub struct MaximalIndex {
    postings: HashMap<ColumnIndex, RoaringBitmap, SignatureHasher>,
    kept: Vec<ColumnCombination>,
}
impl MaximalIndex {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn insert(&mut self, combination: ColumnCombination) {
        let id = self.kept.len() as u32;
        for &column in combination.columns() {
            self.postings.entry(column).or_default().insert(id);
        }
        self.kept.push(combination);
    }
    /// Some kept combination containing every column of the given one.
    pub fn find_superset(&self, combination: &ColumnCombination) -> Option<&ColumnCombination> {
        let mut columns = combination.columns().iter();
        let first = columns.next()?;
        let mut common = self.postings.get(first)?.clone();
        for column in columns {
            common &= self.postings.get(column)?;
            if common.is_empty() {
                return None;
            }
        }
        common.min().map(|id| &self.kept[id as usize])
    }
    pub fn covers(&self, combination: &ColumnCombination) -> bool {
        self.find_superset(combination).is_some()
    }
    pub fn len(&self) -> usize {
        self.kept.len()
    }
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
}

// ------------- Search -------------
#[derive(Debug, Default)]
pub struct SearchOutcome {
    pub results: Vec<CheckedColumnCombination>,
    pub validated: usize,
}

pub struct LatticeSearch<'v, 'p> {
    validator: &'v Validator<'p>,
    acceptance: Acceptance,
}

impl<'v, 'p> LatticeSearch<'v, 'p> {
    pub fn new(validator: &'v Validator<'p>, acceptance: Acceptance) -> Self {
        Self {
            validator,
            acceptance,
        }
    }
    /// Runs the search and returns the maximal accepted combinations.
    pub fn run(&self, optimistic: &CandidatesByCardinality) -> SearchOutcome {
        let mut outcome = SearchOutcome::default();
        let Some(&max_cardinality) = optimistic.keys().next_back() else {
            return outcome;
        };
        let mut index = MaximalIndex::new();
        let mut carried: Vec<ColumnCombination> = Vec::new();
        // single representatives are searched too, they may stand for several columns
        for level in (1..=max_cardinality).rev() {
            // seed
            let mut seen: HashSet<ColumnCombination, SignatureHasher> =
                carried.iter().cloned().collect();
            let mut current = std::mem::take(&mut carried);
            for candidate in optimistic.get(&level).into_iter().flatten() {
                if !index.covers(candidate) && seen.insert(candidate.clone()) {
                    current.push(candidate.clone());
                }
            }
            if current.is_empty() {
                continue;
            }
            trace!(level, candidates = current.len(), "validating level");
            outcome.validated += current.len();

            // validate
            let verdicts: Vec<Verdict> = current
                .par_iter()
                .map(|candidate| self.acceptance.verdict(self.validator, candidate))
                .collect();

            // accept
            let mut rejected = Vec::new();
            for verdict in verdicts {
                match verdict {
                    Verdict::Accepted(checked) => {
                        debug!(candidate = %checked, "found valid candidate");
                        index.insert(checked.combination().clone());
                        outcome.results.push(checked);
                    }
                    Verdict::Rejected(combination) => rejected.push(combination),
                }
            }

            // shrink
            let mut seen: HashSet<ColumnCombination, SignatureHasher> = HashSet::default();
            carried = rejected
                .iter()
                .flat_map(ColumnCombination::immediate_subsets)
                .filter(|subset| seen.insert(subset.clone()))
                .filter(|subset| !index.covers(subset))
                .collect();
        }
        outcome
    }
}
