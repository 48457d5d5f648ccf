use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use crate::error::{LedgerError, Result};

/// A statement as already-tabulated text: one header row plus data rows.
/// Rows may be shorter or longer than the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RawTable {
    pub(crate) headers: Vec<String>,
    pub(crate) rows: Vec<Vec<String>>,
}

impl RawTable {
    pub(crate) fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            headers: headers.iter().map(|h| h.trim().to_string()).collect(),
            rows,
        }
    }

    pub(crate) fn from_csv_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// First record is the header row.
    pub(crate) fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_reader(reader);

        let mut records = rdr.records();
        let headers: Vec<String> = match records.next() {
            Some(record) => record?.iter().map(|s| s.to_string()).collect(),
            None => return Err(LedgerError::Format("CSV file is empty".into())),
        };

        let mut rows = Vec::new();
        for record in records {
            rows.push(record?.iter().map(|s| s.to_string()).collect());
        }
        Ok(Self::new(headers, rows))
    }

    /// Merge the tables extracted from each page of a PDF statement.
    ///
    /// Each page's first row is its header. Header text loses surrounding
    /// whitespace and embedded line breaks, and columns are aligned by header
    /// name across pages, so a page that lacks a column leaves it blank.
    /// Cells under a blank header are dropped. A name repeated within a page
    /// takes the next column of that name, so repeats never overwrite each
    /// other.
    pub(crate) fn from_pages(pages: Vec<Vec<Vec<String>>>) -> Result<Self> {
        let mut headers: Vec<String> = Vec::new();
        let mut rows: Vec<Vec<String>> = Vec::new();

        for page in pages {
            let mut page_rows = page.into_iter();
            let Some(page_headers) = page_rows.next() else {
                continue;
            };
            let mut claimed = HashSet::new();
            let mut positions: Vec<Option<usize>> = Vec::with_capacity(page_headers.len());
            for h in &page_headers {
                let cleaned = clean_pdf_header(h);
                if cleaned.is_empty() {
                    positions.push(None);
                    continue;
                }
                let pos = match (0..headers.len())
                    .find(|i| headers[*i] == cleaned && !claimed.contains(i))
                {
                    Some(i) => i,
                    None => {
                        headers.push(cleaned);
                        headers.len() - 1
                    }
                };
                claimed.insert(pos);
                positions.push(Some(pos));
            }

            for cells in page_rows {
                let mut row = vec![String::new(); headers.len()];
                for (cell, pos) in cells.into_iter().zip(&positions) {
                    if let Some(pos) = *pos {
                        row[pos] = cell;
                    }
                }
                rows.push(row);
            }
        }

        if headers.is_empty() {
            return Err(LedgerError::Format("No tables found in PDF".into()));
        }
        Ok(Self::new(headers, rows))
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn clean_pdf_header(header: &str) -> String {
    header.replace(['\n', '\r'], "").trim().to_string()
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
