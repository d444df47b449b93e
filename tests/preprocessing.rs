mod common;

use common::{configuration, mask_rows, rows};

use cody::CodyError;
use cody::config::{ColumnSelection, PruningMode};
use cody::preprocess::Preprocessor;

#[test]
fn row_counts_add_up_to_raw_rows() {
    let config = configuration(1.0, PruningMode::Clique);
    let data = rows(&[
        &["1", "", "a"],
        &["2", "", "b"],
        &["", "", ""],
        &["3", "x", "c"],
        &["4", "", "d"],
        &["", "", ""],
    ]);
    let pre = Preprocessor::new(&config).run(data).expect("preprocess ok");
    assert_eq!(pre.raw_rows(), 6);
    assert_eq!(pre.distinct_rows(), 3, "{{1}}, {{0,1,2}} and {{}}");
    assert_eq!(pre.row_counts().iter().sum::<u64>(), pre.raw_rows());
    assert_eq!(pre.row_counts(), &[3, 2, 1], "insertion order is kept");
    assert_eq!(pre.null_cells(), 9);
    for bitmap in pre.columns() {
        assert!(bitmap.len() <= pre.distinct_rows() as u64);
    }
}

#[test]
fn identical_columns_share_a_representative() {
    let config = configuration(1.0, PruningMode::Clique);
    let data = mask_rows(&[
        vec![true, false, true, false],
        vec![false, false, false, true],
        vec![true, true, true, false],
    ]);
    let pre = Preprocessor::new(&config).run(data).expect("preprocess ok");
    assert_eq!(pre.original_columns(), 4);
    assert_eq!(pre.columns().len(), 3);
    assert_eq!(pre.duplicates(), &[vec![0, 2], vec![1], vec![3]]);
    assert_eq!(pre.representative_of(2), Some(0));
    assert_eq!(pre.representative_of(3), Some(2));
    assert_eq!(pre.representative_of(4), None);
    // representatives differ pairwise
    for (i, a) in pre.columns().iter().enumerate() {
        for b in &pre.columns()[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn disabled_deduplication_keeps_everything() {
    let mut config = configuration(1.0, PruningMode::Clique);
    config.deduplicate = false;
    let data = mask_rows(&[
        vec![true, true],
        vec![true, true],
        vec![false, false],
    ]);
    let pre = Preprocessor::new(&config).run(data).expect("preprocess ok");
    assert_eq!(pre.raw_rows(), 3);
    assert_eq!(pre.distinct_rows(), 3);
    assert_eq!(pre.row_counts(), &[1, 1, 1]);
    assert_eq!(pre.columns().len(), 2);
    assert_eq!(pre.duplicates(), &[vec![0], vec![1]]);
}

#[test]
fn header_names_are_not_data() {
    let mut config = configuration(1.0, PruningMode::Clique);
    config.has_header = true;
    config.null_value = "?".into();
    let data = rows(&[&["id", "name", "note"], &["1", "?", "?"], &["2", "bob", "?"]]);
    let pre = Preprocessor::new(&config).run(data).expect("preprocess ok");
    assert_eq!(pre.raw_rows(), 2);
    assert_eq!(
        pre.column_names(),
        Some(&["id".to_string(), "name".into(), "note".into()][..])
    );
    assert_eq!(pre.null_cells(), 3);
}

#[test]
fn row_limit_and_prefix_selection() {
    let mut config = configuration(1.0, PruningMode::Clique);
    config.has_header = true;
    config.row_limit = Some(2);
    config.columns = ColumnSelection::Prefix { count: 2 };
    let data = rows(&[
        &["a", "b", "c"],
        &["", "1", ""],
        &["", "", ""],
        &["", "", ""],
    ]);
    let pre = Preprocessor::new(&config).run(data).expect("preprocess ok");
    assert_eq!(pre.raw_rows(), 2);
    assert_eq!(pre.original_columns(), 2);
    assert_eq!(pre.column_names(), Some(&["a".to_string(), "b".into()][..]));
    assert_eq!(pre.null_cells(), 3);
}

#[test]
fn random_selection_is_reproducible() {
    let mut config = configuration(1.0, PruningMode::Clique);
    config.has_header = true;
    config.columns = ColumnSelection::Random { count: 3, max: 5, seed: Some(7) };
    let header: &[&str] = &["c0", "c1", "c2", "c3", "c4", "c5"];
    let first = Preprocessor::new(&config)
        .run(rows(&[header, &["", "", "", "", "", ""]]))
        .expect("preprocess ok");
    let second = Preprocessor::new(&config)
        .run(rows(&[header, &["", "", "", "", "", ""]]))
        .expect("preprocess ok");
    let names = first.column_names().expect("names").to_vec();
    assert_eq!(names.len(), 3);
    assert_eq!(Some(&names[..]), second.column_names());
    assert!(names.windows(2).all(|w| w[0] < w[1]), "file order kept");
    assert!(!names.contains(&"c5".to_string()), "sampled below the bound");
}

#[test]
fn selection_beyond_source_width_is_a_config_error() {
    let mut config = configuration(1.0, PruningMode::Clique);
    config.columns = ColumnSelection::Prefix { count: 4 };
    let result = Preprocessor::new(&config).run(rows(&[&["", ""]]));
    assert!(matches!(result, Err(CodyError::Config(_))));
}

#[test]
fn malformed_arity_is_an_error() {
    let mut config = configuration(1.0, PruningMode::Clique);
    config.has_header = true;
    let data = rows(&[&["a", "b", "c"], &["1", "2", "3"], &["1", "2"]]);
    match Preprocessor::new(&config).run(data) {
        Err(CodyError::RowArity { row, expected, found }) => {
            assert_eq!((row, expected, found), (3, 3, 2));
        }
        other => panic!("expected an arity error, got {other:?}"),
    }
}

#[test]
fn empty_sources() {
    let config = configuration(1.0, PruningMode::Clique);
    let pre = Preprocessor::new(&config).run(rows(&[])).expect("preprocess ok");
    assert_eq!(pre.raw_rows(), 0);
    assert_eq!(pre.distinct_rows(), 0);
    assert!(pre.columns().is_empty());

    let mut config = configuration(1.0, PruningMode::Clique);
    config.has_header = true;
    let pre = Preprocessor::new(&config).run(rows(&[&["a", "b"]])).expect("preprocess ok");
    assert_eq!(pre.raw_rows(), 0);
    assert_eq!(pre.original_columns(), 2);
}
