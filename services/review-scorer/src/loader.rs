//! Streaming CSV loader turning uploaded rows into [`ReviewRecord`]s.

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use shared::dto::ReviewRecord;
use std::io::Read;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Position of each column we care about; anything else in the file is ignored.
#[derive(Debug, Clone, Copy, Default)]
struct Columns {
    review: Option<usize>,
    food_rating: Option<usize>,
    delivery_rating: Option<usize>,
    acceptance_score: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Self {
        let find = |name: &str| headers.iter().position(|h| h == name);
        Self {
            review: find("review"),
            food_rating: find("food_rating"),
            delivery_rating: find("delivery_rating"),
            acceptance_score: find("acceptance_score"),
        }
    }

    /// A column absent from the header, or from a short row, is `None`;
    /// an empty field stays `Some("")`.
    fn record(&self, row: &StringRecord, id: u64) -> ReviewRecord {
        let field = |idx: Option<usize>| idx.and_then(|i| row.get(i)).map(str::to_string);
        ReviewRecord {
            id,
            review: field(self.review),
            food_rating: field(self.food_rating),
            delivery_rating: field(self.delivery_rating),
            acceptance_score: field(self.acceptance_score),
        }
    }
}

/// Lazy iterator over the rows of one CSV source.
///
/// Ids start at 1 and follow file order, independent of any id column.
pub struct ReviewRows<R: Read> {
    rows: StringRecordsIntoIter<R>,
    columns: Columns,
    last_id: u64,
}

impl<R: Read> Iterator for ReviewRows<R> {
    type Item = Result<ReviewRecord, LoadError>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        Some(row.map_err(LoadError::from).map(|row| {
            self.last_id += 1;
            self.columns.record(&row, self.last_id)
        }))
    }
}

/// Read the header row and return an iterator over the data rows.
pub fn review_rows<R: Read>(reader: R) -> Result<ReviewRows<R>, LoadError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let columns = Columns::locate(rdr.headers()?);
    Ok(ReviewRows {
        rows: rdr.into_records(),
        columns,
        last_id: 0,
    })
}

/// Read every row, stopping at the first decode error.
pub fn load_reviews<R: Read>(reader: R) -> Result<Vec<ReviewRecord>, LoadError> {
    review_rows(reader)?.collect()
}

/// Load a stored upload and delete it afterwards.
///
/// The temporary file is removed on the error path as well, when `upload` is dropped.
pub fn load_upload(upload: NamedTempFile) -> Result<Vec<ReviewRecord>, LoadError> {
    let records = load_reviews(upload.reopen()?)?;
    debug!(path = %upload.path().display(), "removing uploaded csv");
    upload.close()?;
    info!(rows = records.len(), "csv loaded");
    Ok(records)
}
