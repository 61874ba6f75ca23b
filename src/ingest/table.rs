/// Raw record-oriented table as read from a CSV blob.
///
/// Headers are normalized (trimmed, lower-cased) so `Road_Sector`,
/// ` road_sector` and `ROAD_SECTOR` all resolve to the same column. Cells
/// are kept as strings; typing happens in `ingest::records`.

use csv::ReaderBuilder;
use std::collections::HashMap;

use crate::error::DataError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses CSV bytes with a header row.
    ///
    /// Short rows are padded with empty cells and blank lines are skipped;
    /// anything the CSV reader itself rejects (bad UTF-8, unbalanced quotes)
    /// is an error so the loader can fall back to another copy.
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self, DataError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(normalize_header)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            let mut row: Vec<String> = record.iter().map(|c| c.trim().to_string()).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(Self::from_parts(headers, rows))
    }

    fn from_parts(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut index = HashMap::new();
        for (i, header) in headers.iter().enumerate() {
            // first occurrence wins for duplicated headers
            index.entry(header.clone()).or_insert(i);
        }
        Self { headers, index, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(&normalize_header(name))
    }

    /// Position of `name` among the headers, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(&normalize_header(name)).copied()
    }

    /// First of `names` that exists in the table.
    pub fn first_column_of(&self, names: &[&str]) -> Option<usize> {
        names.iter().find_map(|n| self.column_index(n))
    }

    pub fn rows(&self) -> impl Iterator<Item = TableRow<'_>> {
        self.rows.iter().map(move |cells| TableRow { table: self, cells })
    }
}

/// Borrowed view of one row.
#[derive(Debug, Clone, Copy)]
pub struct TableRow<'a> {
    table: &'a Table,
    cells: &'a [String],
}

impl<'a> TableRow<'a> {
    /// Cell at a known column index; `None` for empty cells.
    pub fn at(&self, index: usize) -> Option<&'a str> {
        self.cells
            .get(index)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Cell by column name; `None` when the column or the value is missing.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.table.column_index(column).and_then(|i| self.at(i))
    }
}

fn normalize_header(name: &str) -> String {
    name.trim().to_lowercase()
}
