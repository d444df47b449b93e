//! Optimistic upper bounds for the lattice search.
//!
//! Every column set satisfying the minimum support is pairwise compatible,
//! so it lies inside a clique, and therefore inside a connected component, of
//! the [`CompatibilityGraph`]. Both give candidates the search can start from
//! and shrink. Cliques are tighter but cost more to enumerate; components are
//! near linear but leave more levels to explore.

use std::collections::BTreeMap;

use roaring::RoaringBitmap;
use tracing::{debug, info};

use crate::candidate::ColumnCombination;
use crate::config::PruningMode;
use crate::validate::CompatibilityGraph;

/// Optimistic candidates grouped by cardinality.
pub type CandidatesByCardinality = BTreeMap<usize, Vec<ColumnCombination>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruningStrategy {
    Clique,
    Component,
}

impl From<PruningMode> for PruningStrategy {
    fn from(mode: PruningMode) -> Self {
        match mode {
            PruningMode::Clique => PruningStrategy::Clique,
            PruningMode::Component => PruningStrategy::Component,
        }
    }
}

impl PruningStrategy {
    pub fn estimate(&self, graph: &CompatibilityGraph) -> CandidatesByCardinality {
        let found = match self {
            PruningStrategy::Clique => maximal_cliques(graph),
            PruningStrategy::Component => connected_components(graph),
        };
        let mut candidates = CandidatesByCardinality::new();
        for combination in found {
            candidates
                .entry(combination.len())
                .or_default()
                .push(combination);
        }
        for level in candidates.values_mut() {
            level.sort_unstable();
        }
        info!(
            strategy = ?self,
            candidates = candidates.values().map(Vec::len).sum::<usize>(),
            max_cardinality = candidates.keys().next_back().copied().unwrap_or(0),
            "estimated upper bounds"
        );
        candidates
    }
}

// ------------- Components -------------
pub fn connected_components(graph: &CompatibilityGraph) -> Vec<ColumnCombination> {
    let mut visited = RoaringBitmap::new();
    let mut components = Vec::new();
    for start in 0..graph.nodes() as u32 {
        if visited.contains(start) {
            continue;
        }
        let mut component = RoaringBitmap::new();
        let mut stack = vec![start];
        visited.insert(start);
        while let Some(node) = stack.pop() {
            component.insert(node);
            for neighbor in graph.neighbors(node as usize) {
                if visited.insert(neighbor) {
                    stack.push(neighbor);
                }
            }
        }
        if let Some(combination) = ColumnCombination::from_bitmap(&component) {
            components.push(combination);
        }
    }
    debug!(components = components.len(), "connected components");
    components
}

// ------------- Cliques -------------
/// Enumerates all maximal cliques with the pivoting Bron–Kerbosch algorithm.
/// Isolated nodes are maximal cliques of their own.
pub fn maximal_cliques(graph: &CompatibilityGraph) -> Vec<ColumnCombination> {
    let mut cliques = Vec::new();
    let mut clique = Vec::new();
    let all: RoaringBitmap = (0..graph.nodes() as u32).collect();
    bron_kerbosch(graph, &mut clique, all, RoaringBitmap::new(), &mut cliques);
    debug!(cliques = cliques.len(), "maximal cliques");
    cliques
}

fn bron_kerbosch(
    graph: &CompatibilityGraph,
    clique: &mut Vec<usize>,
    mut candidates: RoaringBitmap,
    mut excluded: RoaringBitmap,
    cliques: &mut Vec<ColumnCombination>,
) {
    if candidates.is_empty() {
        if excluded.is_empty() {
            if let Some(combination) = ColumnCombination::new(clique.clone()) {
                cliques.push(combination);
            }
        }
        return;
    }
    // the pivot covers as many candidates as possible, its neighbors need not be branched on
    let pivot = candidates
        .iter()
        .chain(excluded.iter())
        .max_by_key(|&u| candidates.intersection_len(graph.neighbors(u as usize)))
        .unwrap_or_default();
    let branches = &candidates - graph.neighbors(pivot as usize);
    for node in &branches {
        let neighbors = graph.neighbors(node as usize);
        clique.push(node as usize);
        bron_kerbosch(
            graph,
            clique,
            &candidates & neighbors,
            &excluded & neighbors,
            cliques,
        );
        clique.pop();
        candidates.remove(node);
        excluded.insert(node);
    }
}
