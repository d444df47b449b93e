//! Cody – discovery of null-coincidence dependencies in tabular data.
//!
//! A *Cody* is a set of columns whose missing values coincide: in (almost)
//! every row, either all of its columns are null or none of them is. The
//! *support* of a column set is the fraction of rows for which this holds.
//! Exact Codys have support 1.0; approximate Codys reach a configured minimum
//! support below 1.0. This crate finds the maximal ones.
//!
//! ## Pipeline
//! * [`preprocess`] – reads rows, reduces each to the set of its null columns,
//!   collapses equal rows and equal columns, and stores one
//!   [`roaring::RoaringBitmap`] of null rows per column.
//! * [`validate`] – measures support of any column set from the bitmaps and
//!   builds the pairwise [`validate::CompatibilityGraph`].
//! * [`prune`] – turns the graph into optimistic upper bounds, either maximal
//!   cliques or connected components.
//! * [`search`] – walks the lattice down from those bounds, validating each
//!   level in parallel and keeping only maximal accepted sets.
//! * [`discovery`] – runs the pipeline end to end and re-expands duplicate
//!   columns.
//!
//! Rows come from [`source::CsvSource`] or from any iterator of
//! `Result<Vec<String>>`. The run is described by a [`config::Configuration`].
//!
//! ## Quick Start
//! ```
//! use cody::config::Configuration;
//! use cody::discovery::Discovery;
//! let configuration = Configuration { min_support: 0.9, ..Configuration::default() };
//! let rows = vec![
//!     vec!["a", "b", "c"],
//!     vec!["", "", "1"],
//!     vec!["", "", ""],
//!     vec!["1", "1", "1"],
//! ];
//! let rows = rows
//!     .into_iter()
//!     .map(|r| Ok(r.into_iter().map(String::from).collect()));
//! let report = Discovery::new(configuration).unwrap().run_rows(rows).unwrap();
//! assert_eq!(report.render(), vec!["[a, b]: support = 1.0000"]);
//! ```

pub mod candidate;
pub mod config;
pub mod discovery;
pub mod error;
pub mod preprocess;
pub mod prune;
pub mod search;
pub mod source;
pub mod validate;

pub use error::{CodyError, Result};
