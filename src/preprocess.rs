//! Turns a stream of rows into deduplicated null bitmaps.
//!
//! Only the null pattern of a row matters for null-coincidence, so every row
//! is reduced to its *signature*: the ascending list of columns that are null
//! in it. Rows sharing a signature collapse into one distinct row carrying a
//! multiplicity, and every column becomes a [`RoaringBitmap`] over distinct
//! row ids. Columns whose bitmaps are identical are then merged into one
//! representative, remembering the originals for output expansion.
//!
//! The deduplication follows a "keeper" pattern: a keeper owns what it has
//! been given and tells the caller whether an equal item was previously kept.

use core::hash::{BuildHasherDefault, Hasher};
use std::collections::HashMap;

use roaring::RoaringBitmap;
use seahash::SeaHasher;
use tracing::{debug, info, trace};

use crate::config::Configuration;
use crate::error::{CodyError, Result};
use crate::source::Row;

pub type ColumnIndex = usize;
pub type RowId = u32;

pub type SignatureHasher = BuildHasherDefault<SeaHasher>;

// ------------- Rows -------------
#[derive(Debug)]
pub struct RowKeeper {
    kept: HashMap<Vec<ColumnIndex>, RowId, SignatureHasher>,
    counts: Vec<u64>,
    deduplicate: bool,
}
impl RowKeeper {
    pub fn new(deduplicate: bool) -> Self {
        Self {
            kept: HashMap::default(),
            counts: Vec::new(),
            deduplicate,
        }
    }
    /// Keeps a row signature, returning its distinct row id and whether the
    /// signature was previously kept. Without deduplication every row is
    /// treated as carrying a unique signature.
    pub fn keep(&mut self, signature: Vec<ColumnIndex>) -> Result<(RowId, bool)> {
        if self.deduplicate {
            if let Some(&id) = self.kept.get(&signature) {
                self.counts[id as usize] += 1;
                return Ok((id, true));
            }
        }
        let id = RowId::try_from(self.counts.len()).map_err(|_| {
            CodyError::Capacity(format!("more than {} distinct rows", RowId::MAX))
        })?;
        self.counts.push(1);
        if self.deduplicate {
            self.kept.insert(signature, id);
        }
        Ok((id, false))
    }
    pub fn len(&self) -> usize {
        self.counts.len()
    }
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
    pub fn into_counts(self) -> Vec<u64> {
        self.counts
    }
}

// ------------- Columns -------------
#[derive(Debug, Default)]
pub struct ColumnKeeper {
    // fingerprint -> slots of representatives with that fingerprint
    buckets: HashMap<u64, Vec<usize>, SignatureHasher>,
    representatives: Vec<RoaringBitmap>,
    duplicates: Vec<Vec<ColumnIndex>>,
}
impl ColumnKeeper {
    pub fn new() -> Self {
        Self::default()
    }
    /// Keeps the null bitmap of a column. Returns the slot of its
    /// representative and whether an identical bitmap was previously kept.
    pub fn keep(&mut self, column: ColumnIndex, bitmap: RoaringBitmap) -> (usize, bool) {
        let slots = self.buckets.entry(fingerprint(&bitmap)).or_default();
        if let Some(&slot) = slots.iter().find(|&&s| self.representatives[s] == bitmap) {
            self.duplicates[slot].push(column);
            return (slot, true);
        }
        let slot = self.representatives.len();
        slots.push(slot);
        self.representatives.push(bitmap);
        self.duplicates.push(vec![column]);
        (slot, false)
    }
    /// Keeps a column as its own representative, even if an identical
    /// bitmap exists.
    pub fn keep_distinct(&mut self, column: ColumnIndex, bitmap: RoaringBitmap) -> usize {
        let slot = self.representatives.len();
        self.representatives.push(bitmap);
        self.duplicates.push(vec![column]);
        slot
    }
    pub fn len(&self) -> usize {
        self.representatives.len()
    }
    pub fn is_empty(&self) -> bool {
        self.representatives.is_empty()
    }
    pub fn into_parts(self) -> (Vec<RoaringBitmap>, Vec<Vec<ColumnIndex>>) {
        (self.representatives, self.duplicates)
    }
}

fn fingerprint(bitmap: &RoaringBitmap) -> u64 {
    let mut hasher = SeaHasher::new();
    hasher.write_u64(bitmap.len());
    for row in bitmap {
        hasher.write_u32(row);
    }
    hasher.finish()
}

// ------------- Preprocessed -------------
/// The immutable outcome of preprocessing.
#[derive(Debug, Clone)]
pub struct Preprocessed {
    raw_rows: u64,
    row_counts: Vec<u64>,
    columns: Vec<RoaringBitmap>,
    duplicates: Vec<Vec<ColumnIndex>>,
    column_names: Option<Vec<String>>,
    original_columns: usize,
    null_cells: u64,
}
impl Preprocessed {
    /// Number of data rows read, duplicates included.
    pub fn raw_rows(&self) -> u64 {
        self.raw_rows
    }
    pub fn distinct_rows(&self) -> usize {
        self.row_counts.len()
    }
    /// Multiplicity of every distinct row, indexed by row id.
    pub fn row_counts(&self) -> &[u64] {
        &self.row_counts
    }
    /// Null bitmaps of the representative columns.
    pub fn columns(&self) -> &[RoaringBitmap] {
        &self.columns
    }
    /// For every representative, the original columns it stands for. The
    /// representative itself comes first.
    pub fn duplicates(&self) -> &[Vec<ColumnIndex>] {
        &self.duplicates
    }
    pub fn column_names(&self) -> Option<&[String]> {
        self.column_names.as_deref()
    }
    pub fn original_columns(&self) -> usize {
        self.original_columns
    }
    pub fn null_cells(&self) -> u64 {
        self.null_cells
    }
    /// The representative slot of an original column.
    pub fn representative_of(&self, column: ColumnIndex) -> Option<usize> {
        self.duplicates.iter().position(|group| group.contains(&column))
    }
}

// ------------- Preprocessor -------------
pub struct Preprocessor<'c> {
    configuration: &'c Configuration,
}
impl<'c> Preprocessor<'c> {
    pub fn new(configuration: &'c Configuration) -> Self {
        Self { configuration }
    }
    /// Reads every row of the source, deduplicating rows and columns.
    pub fn run<I>(&self, rows: I) -> Result<Preprocessed>
    where
        I: IntoIterator<Item = Result<Row>>,
    {
        let configuration = self.configuration;
        let mut rows = rows.into_iter();
        let first = match rows.next() {
            Some(first) => first?,
            None => return Ok(Self::empty()),
        };
        let width = first.len();
        let selection = configuration.columns.resolve(width)?;
        let selected = selection.as_ref().map_or(width, Vec::len);
        let project = |row: Row| -> Row {
            match &selection {
                None => row,
                Some(indices) => indices.iter().map(|&i| row[i].clone()).collect(),
            }
        };

        let mut column_names = None;
        let mut pending = Some(first);
        if configuration.has_header {
            column_names = pending.take().map(project);
        }

        let mut row_keeper = RowKeeper::new(configuration.deduplicate);
        let mut bitmaps = vec![RoaringBitmap::new(); selected];
        let mut raw_rows: u64 = 0;
        let mut null_cells: u64 = 0;
        // the record number counts the header too, so errors point at file records
        let mut record = usize::from(column_names.is_some());
        let limit = configuration.row_limit.map_or(u64::MAX, |limit| limit as u64);
        let mut next = pending.map(Ok).or_else(|| rows.next());
        while let Some(row) = next {
            if raw_rows >= limit {
                break;
            }
            let row = row?;
            record += 1;
            if row.len() != width {
                return Err(CodyError::RowArity {
                    row: record,
                    expected: width,
                    found: row.len(),
                });
            }
            let signature: Vec<ColumnIndex> = match &selection {
                None => null_positions(row.iter(), &configuration.null_value),
                Some(indices) => {
                    null_positions(indices.iter().map(|&i| &row[i]), &configuration.null_value)
                }
            };
            null_cells += signature.len() as u64;
            let (id, previously_kept) = row_keeper.keep(signature.clone())?;
            if !previously_kept {
                for &column in &signature {
                    bitmaps[column].insert(id);
                }
            }
            raw_rows += 1;
            next = if raw_rows < limit { rows.next() } else { None };
        }

        let distinct_rows = row_keeper.len();
        let mut column_keeper = ColumnKeeper::new();
        for (column, bitmap) in bitmaps.into_iter().enumerate() {
            trace!(column, nulls = bitmap.len(), distinct_rows, "column null values");
            if configuration.deduplicate {
                column_keeper.keep(column, bitmap);
            } else {
                column_keeper.keep_distinct(column, bitmap);
            }
        }
        let (columns, duplicates) = column_keeper.into_parts();
        info!(
            raw_rows,
            distinct_rows,
            columns = selected,
            distinct_columns = columns.len(),
            "deduplicated rows and columns"
        );
        debug!(?duplicates, "duplicate columns");

        Ok(Preprocessed {
            raw_rows,
            row_counts: row_keeper.into_counts(),
            columns,
            duplicates,
            column_names,
            original_columns: selected,
            null_cells,
        })
    }

    fn empty() -> Preprocessed {
        Preprocessed {
            raw_rows: 0,
            row_counts: Vec::new(),
            columns: Vec::new(),
            duplicates: Vec::new(),
            column_names: None,
            original_columns: 0,
            null_cells: 0,
        }
    }
}

fn null_positions<'a, I>(cells: I, null_value: &str) -> Vec<ColumnIndex>
where
    I: Iterator<Item = &'a String>,
{
    cells
        .enumerate()
        .filter(|(_, cell)| cell.as_str() == null_value)
        .map(|(position, _)| position)
        .collect()
}
