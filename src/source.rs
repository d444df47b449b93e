use std::fs::File;
use std::io::{BufRead, BufReader, Read};

use tracing::debug;

use crate::config::Configuration;
use crate::error::{CodyError, Result};

/// A record of a row source, one string per cell.
pub type Row = Vec<String>;

/// Streams the records of a delimited file.
///
/// Header detection, row limits and column selection are left to the
/// [`crate::preprocess::Preprocessor`], so every record of the file is yielded,
/// including the header. Record lengths are not checked here either.
pub struct CsvSource {
    records: csv::StringRecordsIntoIter<Box<dyn Read>>,
}

impl CsvSource {
    pub fn open(configuration: &Configuration) -> Result<Self> {
        let path = configuration
            .path
            .as_ref()
            .ok_or_else(|| CodyError::Config("no source path configured".into()))?;
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut skipped = String::new();
        for _ in 0..configuration.skip_lines {
            skipped.clear();
            if reader.read_line(&mut skipped)? == 0 {
                break;
            }
        }
        debug!(path=%path.display(), skip_lines=configuration.skip_lines, "opened source");
        Self::from_reader(Box::new(reader), configuration)
    }
    pub fn from_reader(reader: Box<dyn Read>, configuration: &Configuration) -> Result<Self> {
        let records = csv::ReaderBuilder::new()
            .delimiter(configuration.delimiter_byte()?)
            .quote(configuration.quote_byte()?)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader)
            .into_records();
        Ok(Self { records })
    }
}

impl Iterator for CsvSource {
    type Item = Result<Row>;
    fn next(&mut self) -> Option<Self::Item> {
        self.records.next().map(|record| {
            record
                .map(|r| r.iter().map(str::to_owned).collect())
                .map_err(CodyError::from)
        })
    }
}
