pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS transactions (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    receipt_no   TEXT NOT NULL,
    date         TEXT,
    time         TEXT,
    description  TEXT NOT NULL,
    amount       TEXT NOT NULL,
    category     TEXT NOT NULL DEFAULT 'Uncategorized',
    created_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_transactions_dedup ON transactions(receipt_no, date, amount);
CREATE INDEX IF NOT EXISTS idx_transactions_description ON transactions(description);

"#;

pub(crate) const CURRENT_VERSION: i32 = 1;
