/// Query Results Module
///
/// Holds the outcome of the most recently run statement: a cursor over the
/// fetched rows, the affected-row count, and the driver error when the
/// statement failed under the silent error mode.

use super::options::FetchMode;
use super::value::{Row, Value};
use crate::core::DriverError;
use std::collections::VecDeque;
use std::sync::Arc;

/// Result handle for a single statement execution
#[derive(Debug)]
pub struct ResultSet {
    /// Column names in result order (empty for statements without rows)
    columns: Arc<[String]>,
    /// Rows not yet fetched
    rows: VecDeque<Vec<Value>>,
    /// Rows returned, or rows affected for statements without columns
    row_count: u64,
    last_insert_id: Option<u64>,
    fetch_mode: FetchMode,
    error: Option<DriverError>,
}

impl ResultSet {
    /// Creates a result from rows a driver has already read
    pub(crate) fn new(
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
        row_count: u64,
        last_insert_id: Option<u64>,
    ) -> Self {
        ResultSet {
            columns: columns.into(),
            rows: rows.into(),
            row_count,
            last_insert_id,
            fetch_mode: FetchMode::default(),
            error: None,
        }
    }

    /// Creates the handle returned for a failed statement in silent mode
    pub(crate) fn failed(error: DriverError, fetch_mode: FetchMode) -> Self {
        ResultSet {
            columns: Arc::from(Vec::<String>::new()),
            rows: VecDeque::new(),
            row_count: 0,
            last_insert_id: None,
            fetch_mode,
            error: Some(error),
        }
    }

    pub(crate) fn with_fetch_mode(mut self, fetch_mode: FetchMode) -> Self {
        self.fetch_mode = fetch_mode;
        self
    }

    /// Fetches the next row, or `None` once the cursor is exhausted
    pub fn fetch(&mut self) -> Option<Row> {
        let values = self.rows.pop_front()?;
        Some(Row::new(Arc::clone(&self.columns), values, self.fetch_mode))
    }

    /// Fetches every remaining row
    pub fn fetch_all(&mut self) -> Vec<Row> {
        let columns = &self.columns;
        let fetch_mode = self.fetch_mode;
        self.rows
            .drain(..)
            .map(|values| Row::new(Arc::clone(columns), values, fetch_mode))
            .collect()
    }

    /// Rows returned by a query, or rows affected by a statement without columns
    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row id generated by this statement; `None` unless it inserted a row
    pub fn last_insert_id(&self) -> Option<u64> {
        self.last_insert_id
    }

    pub fn fetch_mode(&self) -> FetchMode {
        self.fetch_mode
    }

    /// Whether the statement failed (silent error mode only)
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn error(&self) -> Option<&DriverError> {
        self.error.as_ref()
    }

    /// Takes ownership of the failure, leaving the handle without one
    pub fn take_error(&mut self) -> Option<DriverError> {
        self.error.take()
    }
}

impl Iterator for ResultSet {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.fetch()
    }
}
