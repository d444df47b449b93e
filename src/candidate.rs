// used to print out readable forms of a candidate
use std::fmt;

use roaring::RoaringBitmap;
use serde::Serialize;

use crate::preprocess::ColumnIndex;

// ------------- ColumnCombination -------------
/// A non-empty set of column indices, kept sorted and duplicate free so that
/// equal sets hash and compare equal.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct ColumnCombination {
    columns: Vec<ColumnIndex>,
}
impl ColumnCombination {
    pub fn new(mut columns: Vec<ColumnIndex>) -> Option<Self> {
        if columns.is_empty() {
            return None;
        }
        columns.sort_unstable();
        columns.dedup();
        Some(Self { columns })
    }
    pub fn from_bitmap(bitmap: &RoaringBitmap) -> Option<Self> {
        Self::new(bitmap.iter().map(|c| c as ColumnIndex).collect())
    }
    pub fn columns(&self) -> &[ColumnIndex] {
        &self.columns
    }
    pub fn len(&self) -> usize {
        self.columns.len()
    }
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
    pub fn contains(&self, column: ColumnIndex) -> bool {
        self.columns.binary_search(&column).is_ok()
    }
    pub fn is_subset_of(&self, other: &ColumnCombination) -> bool {
        self.len() <= other.len() && self.columns.iter().all(|&c| other.contains(c))
    }
    /// All combinations with exactly one column removed. A single column has
    /// no non-empty immediate subsets.
    pub fn immediate_subsets(&self) -> Vec<ColumnCombination> {
        if self.columns.len() < 2 {
            return Vec::new();
        }
        (0..self.columns.len())
            .map(|skip| {
                let mut columns = self.columns.clone();
                columns.remove(skip);
                Self { columns }
            })
            .collect()
    }
    /// Replaces every representative column by the original columns it
    /// stands for.
    pub fn inflate(&self, duplicates: &[Vec<ColumnIndex>]) -> ColumnCombination {
        let mut columns: Vec<ColumnIndex> = self
            .columns
            .iter()
            .flat_map(|&c| duplicates[c].iter().copied())
            .collect();
        columns.sort_unstable();
        columns.dedup();
        Self { columns }
    }
    /// Readable form using column names where they are known.
    pub fn render(&self, names: Option<&[String]>) -> String {
        let labels: Vec<String> = self
            .columns
            .iter()
            .map(|&c| match names.and_then(|n| n.get(c)) {
                Some(name) => name.clone(),
                None => c.to_string(),
            })
            .collect();
        format!("[{}]", labels.join(", "))
    }
}
impl fmt::Display for ColumnCombination {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.render(None))
    }
}

// ------------- CheckedColumnCombination -------------
/// A combination together with its measured support.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct CheckedColumnCombination {
    combination: ColumnCombination,
    support: f64,
}
impl CheckedColumnCombination {
    pub fn new(combination: ColumnCombination, support: f64) -> Self {
        Self {
            combination,
            support,
        }
    }
    pub fn combination(&self) -> &ColumnCombination {
        &self.combination
    }
    pub fn columns(&self) -> &[ColumnIndex] {
        self.combination.columns()
    }
    pub fn support(&self) -> f64 {
        self.support
    }
    pub fn len(&self) -> usize {
        self.combination.len()
    }
    pub fn is_empty(&self) -> bool {
        self.combination.is_empty()
    }
    pub fn inflate(&self, duplicates: &[Vec<ColumnIndex>]) -> CheckedColumnCombination {
        Self::new(self.combination.inflate(duplicates), self.support)
    }
    pub fn render(&self, names: Option<&[String]>) -> String {
        format!("{}: support = {:.4}", self.combination.render(names), self.support)
    }
}
impl fmt::Display for CheckedColumnCombination {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.render(None))
    }
}
