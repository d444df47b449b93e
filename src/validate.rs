//! Support computation over null bitmaps.
//!
//! A row violates a candidate when some, but not all, candidate columns are
//! null in it. Over bitmaps this is the union minus the intersection of the
//! candidate columns, so the support of a candidate is
//! `(raw rows - weight(union \ intersection)) / raw rows`, where the weight of
//! a distinct row is its multiplicity. Adding a column can only grow the union
//! and shrink the intersection, which makes support monotone non-increasing in
//! the lattice.

use std::collections::HashMap;

use rayon::prelude::*;
use roaring::RoaringBitmap;
use tracing::info;

use crate::candidate::{CheckedColumnCombination, ColumnCombination};
use crate::preprocess::{Preprocessed, SignatureHasher};

// ------------- Graph -------------
/// Pairwise compatibility between representative columns. An edge means the
/// pair alone reaches the minimum support; it is a necessary condition for
/// any larger candidate containing the pair, nothing more.
#[derive(Debug, Clone, Default)]
pub struct CompatibilityGraph {
    adjacency: Vec<RoaringBitmap>,
    edges: HashMap<(usize, usize), f64, SignatureHasher>,
}
impl CompatibilityGraph {
    pub fn new(nodes: usize) -> Self {
        Self {
            adjacency: vec![RoaringBitmap::new(); nodes],
            edges: HashMap::default(),
        }
    }
    pub fn add_edge(&mut self, a: usize, b: usize, support: f64) {
        if a == b {
            return;
        }
        let key = (a.min(b), a.max(b));
        self.adjacency[a].insert(b as u32);
        self.adjacency[b].insert(a as u32);
        self.edges.insert(key, support);
    }
    pub fn nodes(&self) -> usize {
        self.adjacency.len()
    }
    pub fn neighbors(&self, node: usize) -> &RoaringBitmap {
        &self.adjacency[node]
    }
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
    pub fn support(&self, a: usize, b: usize) -> Option<f64> {
        self.edges.get(&(a.min(b), a.max(b))).copied()
    }
    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.edges.contains_key(&(a.min(b), a.max(b)))
    }
}

// ------------- Validator -------------
pub struct Validator<'p> {
    columns: &'p [RoaringBitmap],
    row_counts: &'p [u64],
    raw_rows: u64,
    graph: CompatibilityGraph,
}

impl<'p> Validator<'p> {
    pub fn new(preprocessed: &'p Preprocessed, min_support: f64) -> Self {
        Self::from_parts(
            preprocessed.columns(),
            preprocessed.row_counts(),
            preprocessed.raw_rows(),
            min_support,
        )
    }
    /// Builds the validator together with its compatibility graph. Pairs are
    /// checked in parallel, edges are inserted afterwards.
    pub fn from_parts(
        columns: &'p [RoaringBitmap],
        row_counts: &'p [u64],
        raw_rows: u64,
        min_support: f64,
    ) -> Self {
        let mut validator = Self {
            columns,
            row_counts,
            raw_rows,
            graph: CompatibilityGraph::new(columns.len()),
        };
        let edges: Vec<(usize, usize, f64)> = (0..columns.len())
            .into_par_iter()
            .flat_map_iter(|a| {
                let validator = &validator;
                (a + 1..columns.len()).filter_map(move |b| {
                    let support = validator.pair_support(a, b);
                    (support >= min_support).then_some((a, b, support))
                })
            })
            .collect();
        for (a, b, support) in edges {
            validator.graph.add_edge(a, b, support);
        }
        info!(
            nodes = validator.graph.nodes(),
            edges = validator.graph.edge_count(),
            "built compatibility graph"
        );
        validator
    }
    pub fn graph(&self) -> &CompatibilityGraph {
        &self.graph
    }
    pub fn raw_rows(&self) -> u64 {
        self.raw_rows
    }
    /// Number of raw rows represented by a set of distinct rows.
    pub fn weight(&self, rows: &RoaringBitmap) -> u64 {
        rows.iter().map(|row| self.row_counts[row as usize]).sum()
    }
    fn support_from_violations(&self, violations: u64) -> f64 {
        if self.raw_rows == 0 {
            return 1.0;
        }
        (self.raw_rows - violations) as f64 / self.raw_rows as f64
    }
    pub fn pair_support(&self, a: usize, b: usize) -> f64 {
        let violating = &self.columns[a] ^ &self.columns[b];
        self.support_from_violations(self.weight(&violating))
    }
    /// Exact, multiplicity weighted support of a combination of
    /// representative columns.
    pub fn check_column_combination(
        &self,
        combination: &ColumnCombination,
    ) -> CheckedColumnCombination {
        let mut columns = combination.columns().iter().map(|&c| &self.columns[c]);
        let support = match columns.next() {
            None => 1.0,
            Some(first) => {
                let mut union = first.clone();
                let mut intersection = first.clone();
                for column in columns {
                    union |= column;
                    intersection &= column;
                }
                union -= &intersection;
                self.support_from_violations(self.weight(&union))
            }
        };
        CheckedColumnCombination::new(combination.clone(), support)
    }
    /// Whether a combination holds on every row. Stops at the first column
    /// whose null bitmap differs from the first one.
    pub fn is_exact(&self, combination: &ColumnCombination) -> bool {
        let mut columns = combination.columns().iter().map(|&c| &self.columns[c]);
        match columns.next() {
            None => true,
            Some(first) => columns.all(|column| column == first),
        }
    }
}
