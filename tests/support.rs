mod common;

use common::{configuration, mask_rows};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cody::candidate::ColumnCombination;
use cody::config::PruningMode;
use cody::preprocess::Preprocessor;
use cody::validate::Validator;

fn random_masks(seed: u64, rows: usize, columns: usize) -> Vec<Vec<bool>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..rows)
        .map(|_| (0..columns).map(|_| rng.gen_bool(0.3)).collect())
        .collect()
}

fn all_combinations(columns: usize) -> Vec<ColumnCombination> {
    (1u32..1 << columns)
        .filter_map(|bits| {
            ColumnCombination::new((0..columns).filter(|c| bits & (1 << c) != 0).collect())
        })
        .collect()
}

#[test]
fn support_is_monotone() {
    let config = configuration(0.5, PruningMode::Clique);
    for seed in 0..5 {
        let pre = Preprocessor::new(&config)
            .run(mask_rows(&random_masks(seed, 40, 6)))
            .expect("preprocess ok");
        let validator = Validator::new(&pre, 0.5);
        for combination in all_combinations(pre.columns().len()) {
            let support = validator.check_column_combination(&combination).support();
            assert!((0.0..=1.0).contains(&support));
            for subset in combination.immediate_subsets() {
                let subset_support = validator.check_column_combination(&subset).support();
                assert!(
                    subset_support >= support,
                    "{subset} has {subset_support} below {combination} with {support}"
                );
            }
        }
    }
}

#[test]
fn support_is_weighted_by_multiplicity() {
    let config = configuration(0.5, PruningMode::Clique);
    // the violating pattern occurs once, the coinciding ones seven times
    let mut masks = vec![vec![true, false]];
    masks.extend((0..4).map(|_| vec![true, true]));
    masks.extend((0..3).map(|_| vec![false, false]));
    let pre = Preprocessor::new(&config).run(mask_rows(&masks)).expect("preprocess ok");
    assert_eq!(pre.distinct_rows(), 3);
    let validator = Validator::new(&pre, 0.5);
    let pair = ColumnCombination::new(vec![0, 1]).unwrap();
    assert_eq!(validator.check_column_combination(&pair).support(), 7.0 / 8.0);
    assert_eq!(validator.pair_support(0, 1), 7.0 / 8.0);
}

#[test]
fn exactness_agrees_with_full_support() {
    let mut config = configuration(1.0, PruningMode::Clique);
    config.deduplicate = false;
    let mut masks = random_masks(11, 30, 4);
    for row in &mut masks {
        row.push(row[0]);
    }
    let pre = Preprocessor::new(&config).run(mask_rows(&masks)).expect("preprocess ok");
    let validator = Validator::new(&pre, 1.0);
    for combination in all_combinations(pre.columns().len()) {
        let support = validator.check_column_combination(&combination).support();
        assert_eq!(validator.is_exact(&combination), support == 1.0, "{combination}");
    }
    assert!(validator.is_exact(&ColumnCombination::new(vec![0, 4]).unwrap()));
}

#[test]
fn graph_edges_follow_pairwise_support() {
    let config = configuration(0.7, PruningMode::Clique);
    let pre = Preprocessor::new(&config)
        .run(mask_rows(&random_masks(3, 50, 6)))
        .expect("preprocess ok");
    let validator = Validator::new(&pre, 0.7);
    let graph = validator.graph();
    assert_eq!(graph.nodes(), pre.columns().len());
    for a in 0..graph.nodes() {
        for b in 0..graph.nodes() {
            if a == b {
                continue;
            }
            let support = validator.pair_support(a, b);
            assert_eq!(graph.has_edge(a, b), support >= 0.7);
            assert_eq!(graph.neighbors(a).contains(b as u32), support >= 0.7);
            if graph.has_edge(a, b) {
                assert_eq!(graph.support(a, b), Some(support));
            }
        }
    }
}
