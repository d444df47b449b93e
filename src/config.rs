//! Run configuration.
//!
//! A [`Configuration`] describes one discovery run: where the rows come from,
//! how cells are recognized as null, which columns take part and how the
//! lattice is searched. It is deserialized with `serde` through the `config`
//! crate, so it can come from a TOML/JSON/YAML file, from `CODY_*` environment
//! variables or from both (environment wins). Every configuration is validated
//! before the first row is read.

use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index::sample;
use serde::{Deserialize, Serialize};

use crate::error::{CodyError, Result};

pub const ENV_PREFIX: &str = "CODY";

// ------------- Pruning -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PruningMode {
    #[default]
    Clique,
    Component,
}

// ------------- Column selection -------------
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ColumnSelection {
    #[default]
    All,
    /// The first `count` columns.
    Prefix { count: usize },
    /// `count` distinct columns drawn uniformly from the first `max`.
    Random {
        count: usize,
        max: usize,
        #[serde(default)]
        seed: Option<u64>,
    },
}

impl ColumnSelection {
    fn validate(&self) -> Result<()> {
        match self {
            ColumnSelection::All => Ok(()),
            ColumnSelection::Prefix { count: 0 } => {
                Err(CodyError::Config("prefix column selection of zero columns".into()))
            }
            ColumnSelection::Prefix { .. } => Ok(()),
            ColumnSelection::Random { count: 0, .. } => {
                Err(CodyError::Config("random column selection of zero columns".into()))
            }
            ColumnSelection::Random { count, max, .. } if count > max => Err(CodyError::Config(
                format!("cannot sample {count} columns out of {max}"),
            )),
            ColumnSelection::Random { .. } => Ok(()),
        }
    }
    /// Resolves the selection against the width of the first record. `None`
    /// means every column is kept in file order.
    pub fn resolve(&self, width: usize) -> Result<Option<Vec<usize>>> {
        match *self {
            ColumnSelection::All => Ok(None),
            ColumnSelection::Prefix { count } => {
                if count > width {
                    return Err(CodyError::Config(format!(
                        "prefix of {count} columns exceeds the {width} columns of the source"
                    )));
                }
                Ok(Some((0..count).collect()))
            }
            ColumnSelection::Random { count, max, seed } => {
                if max > width {
                    return Err(CodyError::Config(format!(
                        "random sample bound of {max} columns exceeds the {width} columns of the source"
                    )));
                }
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                let mut indices = sample(&mut rng, max, count).into_vec();
                indices.sort_unstable();
                Ok(Some(indices))
            }
        }
    }
}

// ------------- Configuration -------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub path: Option<PathBuf>,
    pub delimiter: char,
    pub quote: char,
    pub skip_lines: usize,
    pub null_value: String,
    pub has_header: bool,
    pub row_limit: Option<usize>,
    pub columns: ColumnSelection,
    pub min_support: f64,
    pub deduplicate: bool,
    pub pruning: PruningMode,
    pub threads: Option<usize>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            path: None,
            delimiter: ',',
            quote: '"',
            skip_lines: 0,
            null_value: String::new(),
            has_header: true,
            row_limit: None,
            columns: ColumnSelection::All,
            min_support: 1.0,
            deduplicate: true,
            pruning: PruningMode::Clique,
            threads: None,
        }
    }
}

impl Configuration {
    /// Loads a configuration from an optional file, overridden by `CODY_*`
    /// environment variables. Nested keys use a double underscore, as in
    /// `CODY_COLUMNS__MODE=prefix`.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(config::File::from(file));
        }
        let configuration: Configuration = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        configuration.validate()?;
        Ok(configuration)
    }
    /// Parses a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let configuration: Configuration = config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        configuration.validate()?;
        Ok(configuration)
    }
    pub fn validate(&self) -> Result<()> {
        if !(self.min_support > 0.0 && self.min_support <= 1.0) {
            return Err(CodyError::Config(format!(
                "minimum support must lie in (0, 1], got {}",
                self.min_support
            )));
        }
        ascii_byte("delimiter", self.delimiter)?;
        ascii_byte("quote", self.quote)?;
        if self.delimiter == self.quote {
            return Err(CodyError::Config(format!(
                "delimiter and quote are both '{}'",
                self.delimiter
            )));
        }
        if self.threads == Some(0) {
            return Err(CodyError::Config("thread count must be positive".into()));
        }
        self.columns.validate()
    }
    pub fn is_exact(&self) -> bool {
        self.min_support >= 1.0
    }
    pub fn delimiter_byte(&self) -> Result<u8> {
        ascii_byte("delimiter", self.delimiter)
    }
    pub fn quote_byte(&self) -> Result<u8> {
        ascii_byte("quote", self.quote)
    }
}

fn ascii_byte(what: &str, c: char) -> Result<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(CodyError::Config(format!("{what} '{c}' is not an ASCII character")))
    }
}
