#![allow(clippy::unwrap_used)]

use super::*;

fn h(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

// ── header_key ────────────────────────────────────────────────

#[test]
fn test_header_key_strips_case_and_punctuation() {
    assert_eq!(header_key("Paid in"), "paidin");
    assert_eq!(header_key("PAID IN"), "paidin");
    assert_eq!(header_key("Paid\nin"), "paidin");
    assert_eq!(header_key(" Receipt No. "), "receiptno");
}

// ── ColumnMap::detect ─────────────────────────────────────────

#[test]
fn test_detect_full_statement() {
    let headers = h(&[
        "Receipt No.",
        "Completion Time",
        "Details",
        "Transaction Status",
        "Paid in",
        "Withdrawn",
        "Balance",
    ]);
    let map = ColumnMap::detect(&headers);
    assert_eq!(map.get(Column::ReceiptId), Some(0));
    assert_eq!(map.get(Column::CompletionTime), Some(1));
    assert_eq!(map.get(Column::Description), Some(2));
    assert_eq!(map.get(Column::Status), Some(3));
    assert_eq!(map.get(Column::PaidIn), Some(4));
    assert_eq!(map.get(Column::Withdrawn), Some(5));
    assert_eq!(map.get(Column::Balance), Some(6));
    assert!(!map.has(Column::Amount));
    assert!(!map.has(Column::Date));
}

#[test]
fn test_detect_description_variants() {
    for name in ["Details", "Description", "Transaction Details", "DETAILS"] {
        let map = ColumnMap::detect(&h(&["Date", name, "Amount"]));
        assert_eq!(map.get(Column::Description), Some(1), "header {name}");
    }
}

#[test]
fn test_detect_transaction_id_as_receipt() {
    let map = ColumnMap::detect(&h(&["Transaction ID", "Details", "Amount"]));
    assert_eq!(map.get(Column::ReceiptId), Some(0));
}

#[test]
fn test_detect_pdf_headers_with_line_breaks() {
    let map = ColumnMap::detect(&h(&["Completion\nTime", "Details", "Paid\nin", "With\ndrawn"]));
    assert!(map.has(Column::CompletionTime));
    assert!(map.has(Column::PaidIn));
    assert!(map.has(Column::Withdrawn));
}

#[test]
fn test_detect_prefers_first_alias() {
    let map = ColumnMap::detect(&h(&["Description", "Details"]));
    assert_eq!(map.get(Column::Description), Some(1));
}

#[test]
fn test_detect_repeated_header_uses_leftmost() {
    let map = ColumnMap::detect(&h(&["Details", "Amount", "Details"]));
    assert_eq!(map.get(Column::Description), Some(0));
}

#[test]
fn test_detect_unknown_headers() {
    let map = ColumnMap::detect(&h(&["Foo", "Bar", "Baz"]));
    assert_eq!(map, ColumnMap::default());
}

#[test]
fn test_detect_empty_headers() {
    let map = ColumnMap::detect(&[]);
    for column in Column::ALL {
        assert!(!map.has(column));
    }
}

#[test]
fn test_column_display() {
    assert_eq!(Column::PaidIn.to_string(), "Paid in");
    assert_eq!(Column::ReceiptId.to_string(), "Receipt No");
}
