use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    /// The statement has no column the normalizer can use as a description.
    #[error("Unrecognized statement format: {0}")]
    Format(String),

    #[error("Storage unavailable ({what}): {source}")]
    StoreUnavailable {
        what: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("No stored transaction with receipt {0}")]
    NotFound(String),

    #[error("No row {0} in the review batch")]
    NoSuchRow(usize),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    pub(crate) fn store(
        what: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::StoreUnavailable {
            what: what.into(),
            source: Box::new(source),
        }
    }
}

impl From<rusqlite::Error> for LedgerError {
    fn from(e: rusqlite::Error) -> Self {
        Self::store("transaction database", e)
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
