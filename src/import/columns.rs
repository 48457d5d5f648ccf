use std::collections::HashMap;

/// The roles a statement column can play. Which ones a statement carries
/// depends on the export and its version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Column {
    CompletionTime,
    Date,
    Time,
    Description,
    PaidIn,
    Withdrawn,
    Amount,
    ReceiptId,
    Balance,
    Status,
}

impl Column {
    pub(crate) const ALL: [Column; 10] = [
        Column::CompletionTime,
        Column::Date,
        Column::Time,
        Column::Description,
        Column::PaidIn,
        Column::Withdrawn,
        Column::Amount,
        Column::ReceiptId,
        Column::Balance,
        Column::Status,
    ];

    /// Accepted header spellings, compared after [`header_key`].
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::CompletionTime => &["Completion Time", "Completion Date"],
            Self::Date => &["Date", "Transaction Date"],
            Self::Time => &["Time"],
            Self::Description => &["Details", "Description", "Transaction Details"],
            Self::PaidIn => &["Paid in", "Money In"],
            Self::Withdrawn => &["Withdrawn", "Withdrawal", "Money Out"],
            Self::Amount => &["Amount"],
            Self::ReceiptId => &["Receipt No", "Transaction ID", "Receipt"],
            Self::Balance => &["Balance"],
            Self::Status => &["Transaction Status", "Status"],
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        self.aliases()[0]
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where each recognised column sits in a statement's header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ColumnMap {
    indices: HashMap<Column, usize>,
}

impl ColumnMap {
    /// Match headers against every column's aliases. Aliases are tried in
    /// order, and a repeated header resolves to its leftmost occurrence.
    pub(crate) fn detect(headers: &[String]) -> Self {
        let keys: Vec<String> = headers.iter().map(|h| header_key(h)).collect();
        let mut indices = HashMap::new();
        for column in Column::ALL {
            if let Some(i) = column
                .aliases()
                .iter()
                .find_map(|alias| col_index(&keys, &header_key(alias)))
            {
                indices.insert(column, i);
            }
        }
        Self { indices }
    }

    pub(crate) fn get(&self, column: Column) -> Option<usize> {
        self.indices.get(&column).copied()
    }

    pub(crate) fn has(&self, column: Column) -> bool {
        self.indices.contains_key(&column)
    }
}

/// Lowercased header with everything but ASCII letters and digits removed, so
/// "Paid in", "PAID IN" and a PDF's "Paid\nin" compare equal.
pub(crate) fn header_key(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn col_index(keys: &[String], key: &str) -> Option<usize> {
    keys.iter().position(|k| k == key)
}

#[cfg(test)]
#[path = "columns_tests.rs"]
mod tests;
