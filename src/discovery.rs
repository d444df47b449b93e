//! One complete discovery run.
//!
//! [`Discovery`] wires preprocessing, graph construction, optimistic pruning
//! and the lattice search together, re-expands duplicate columns and returns
//! the maximal dependencies with per-phase statistics. Every run starts from
//! scratch; nothing is shared between runs.

use std::time::Instant;

use serde::Serialize;
use tracing::{info, info_span};

use crate::candidate::CheckedColumnCombination;
use crate::config::Configuration;
use crate::error::Result;
use crate::preprocess::{ColumnIndex, Preprocessed, Preprocessor};
use crate::prune::PruningStrategy;
use crate::search::{Acceptance, LatticeSearch};
use crate::source::{CsvSource, Row};
use crate::validate::Validator;

// ------------- ResultSet -------------
/// Maximal dependencies over original column indices, largest first and
/// ascending by columns within one cardinality.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ResultSet {
    results: Vec<CheckedColumnCombination>,
}
impl ResultSet {
    pub fn new(mut results: Vec<CheckedColumnCombination>) -> Self {
        results.sort_by(|a, b| {
            b.len()
                .cmp(&a.len())
                .then_with(|| a.combination().cmp(b.combination()))
        });
        Self { results }
    }
    pub fn len(&self) -> usize {
        self.results.len()
    }
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
    pub fn iter(&self) -> std::slice::Iter<'_, CheckedColumnCombination> {
        self.results.iter()
    }
    pub fn as_slice(&self) -> &[CheckedColumnCombination] {
        &self.results
    }
    /// The result with exactly these columns, if any.
    pub fn find(&self, columns: &[ColumnIndex]) -> Option<&CheckedColumnCombination> {
        self.results.iter().find(|c| c.columns() == columns)
    }
    pub fn render(&self, names: Option<&[String]>) -> Vec<String> {
        self.results.iter().map(|c| c.render(names)).collect()
    }
}
impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a CheckedColumnCombination;
    type IntoIter = std::slice::Iter<'a, CheckedColumnCombination>;
    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

// ------------- Statistics -------------
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStatistics {
    pub source: Option<String>,
    pub min_support: f64,
    pub null_value: String,
    pub raw_rows: u64,
    pub distinct_rows: usize,
    pub null_cells: u64,
    pub columns: usize,
    pub distinct_columns: usize,
    pub graph_edges: usize,
    pub optimistic_candidates: usize,
    pub validated_candidates: usize,
    pub results: usize,
    pub preprocessing_ms: f64,
    pub graph_ms: f64,
    pub pruning_ms: f64,
    pub search_ms: f64,
    pub post_processing_ms: f64,
    pub total_ms: f64,
}

#[derive(Debug, Clone)]
pub struct Report {
    pub results: ResultSet,
    pub statistics: RunStatistics,
    pub column_names: Option<Vec<String>>,
}
impl Report {
    pub fn render(&self) -> Vec<String> {
        self.results.render(self.column_names.as_deref())
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}

// ------------- Discovery -------------
pub struct Discovery {
    configuration: Configuration,
}

impl Discovery {
    pub fn new(configuration: Configuration) -> Result<Self> {
        configuration.validate()?;
        Ok(Self { configuration })
    }
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }
    /// Reads the configured file and runs the discovery over it.
    pub fn run(&self) -> Result<Report> {
        let source = CsvSource::open(&self.configuration)?;
        self.run_rows(source)
    }
    /// Runs the discovery over any row source.
    pub fn run_rows<I>(&self, rows: I) -> Result<Report>
    where
        I: IntoIterator<Item = Result<Row>>,
    {
        let configuration = &self.configuration;
        let _span = info_span!("discovery", min_support = configuration.min_support).entered();
        let started = Instant::now();
        info!(?configuration, "start discovery");

        let mut statistics = RunStatistics {
            source: configuration.path.as_ref().map(|p| p.display().to_string()),
            min_support: configuration.min_support,
            null_value: configuration.null_value.clone(),
            ..RunStatistics::default()
        };

        let phase = Instant::now();
        let preprocessed = Preprocessor::new(configuration).run(rows)?;
        statistics.preprocessing_ms = elapsed_ms(phase);
        statistics.raw_rows = preprocessed.raw_rows();
        statistics.distinct_rows = preprocessed.distinct_rows();
        statistics.null_cells = preprocessed.null_cells();
        statistics.columns = preprocessed.original_columns();
        statistics.distinct_columns = preprocessed.columns().len();
        info!(ms = statistics.preprocessing_ms, "preprocessing complete");

        let results = if preprocessed.raw_rows() == 0 || preprocessed.columns().is_empty() {
            info!("nothing to discover");
            ResultSet::default()
        } else {
            match configuration.threads {
                Some(threads) => {
                    let pool = rayon::ThreadPoolBuilder::new()
                        .num_threads(threads)
                        .build()?;
                    pool.install(|| self.discover(&preprocessed, &mut statistics))
                }
                None => self.discover(&preprocessed, &mut statistics),
            }
        };

        statistics.results = results.len();
        statistics.total_ms = elapsed_ms(started);
        info!(
            ms = statistics.total_ms,
            results = results.len(),
            "discovery complete"
        );
        Ok(Report {
            results,
            statistics,
            column_names: preprocessed.column_names().map(<[String]>::to_vec),
        })
    }

    fn discover(&self, preprocessed: &Preprocessed, statistics: &mut RunStatistics) -> ResultSet {
        let configuration = &self.configuration;

        let phase = Instant::now();
        let validator = Validator::new(preprocessed, configuration.min_support);
        statistics.graph_edges = validator.graph().edge_count();
        statistics.graph_ms = elapsed_ms(phase);
        info!(ms = statistics.graph_ms, "pairwise validation complete");

        let phase = Instant::now();
        let optimistic = PruningStrategy::from(configuration.pruning).estimate(validator.graph());
        statistics.optimistic_candidates = optimistic.values().map(Vec::len).sum();
        statistics.pruning_ms = elapsed_ms(phase);
        info!(ms = statistics.pruning_ms, "estimating upper bounds complete");
        if optimistic.is_empty() {
            return ResultSet::default();
        }

        let phase = Instant::now();
        let acceptance = Acceptance::from_min_support(configuration.min_support);
        let outcome = LatticeSearch::new(&validator, acceptance).run(&optimistic);
        statistics.validated_candidates = outcome.validated;
        statistics.search_ms = elapsed_ms(phase);
        info!(
            ms = statistics.search_ms,
            validated = outcome.validated,
            "candidate validation complete"
        );

        // one representative may stand for several columns, so single
        // representatives are searched too but only multi-column results are kept
        let phase = Instant::now();
        let results = ResultSet::new(
            outcome
                .results
                .iter()
                .map(|checked| checked.inflate(preprocessed.duplicates()))
                .filter(|checked| checked.len() >= 2)
                .collect(),
        );
        statistics.post_processing_ms = elapsed_ms(phase);
        info!(ms = statistics.post_processing_ms, "candidate post-processing complete");
        results
    }
}
