#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;

fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
    RawTable::new(
        headers.iter().map(|s| s.to_string()).collect(),
        rows.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect(),
    )
}

fn mpesa_headers() -> Vec<&'static str> {
    vec![
        "Receipt No.",
        "Completion Time",
        "Details",
        "Transaction Status",
        "Paid in",
        "Withdrawn",
        "Balance",
    ]
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

// ── Full statements ───────────────────────────────────────────

#[test]
fn test_normalize_mpesa_statement() {
    let t = table(
        &mpesa_headers(),
        &[
            &["SBK1", "05/01/2024 14:23:10", " KFC Westlands ", "Completed", "", "850.00", "1,150.00"],
            &["SBK2", "06/01/2024 09:00:45", "Salary", "Completed", "50,000.00", "", "51,150.00"],
        ],
    );
    let out = Normalizer::normalize(&t).unwrap();
    assert_eq!(out.rows.len(), 2);
    assert!(out.warnings.is_empty());

    let kfc = &out.rows[0];
    assert_eq!(kfc.source_row, 0);
    assert_eq!(kfc.receipt_id.as_deref(), Some("SBK1"));
    assert_eq!(kfc.date, Some(ymd(2024, 1, 5)));
    assert_eq!(kfc.time, Some(hm(14, 23)));
    assert_eq!(kfc.description, "KFC Westlands");
    assert_eq!(kfc.amount, dec!(-850.00));
    assert_eq!(kfc.category, None);

    let salary = &out.rows[1];
    assert_eq!(salary.amount, dec!(50000.00));
    assert_eq!(salary.time, Some(hm(9, 0)));
}

#[test]
fn test_sign_convention() {
    let t = table(
        &["Details", "Paid in", "Withdrawn"],
        &[&["Deposit", "1000", "0"], &["Airtime", "0", "250"]],
    );
    let out = Normalizer::normalize(&t).unwrap();
    assert_eq!(out.rows[0].amount, dec!(1000));
    assert_eq!(out.rows[1].amount, dec!(-250));
}

#[test]
fn test_negative_withdrawn_still_outflow() {
    let t = table(&["Details", "Paid in", "Withdrawn"], &[&["Till", "", "-120.50"]]);
    let out = Normalizer::normalize(&t).unwrap();
    assert_eq!(out.rows[0].amount, dec!(-120.50));
}

#[test]
fn test_both_zero_gives_zero_amount() {
    let t = table(&["Details", "Paid in", "Withdrawn"], &[&["Reversal", "", ""]]);
    let out = Normalizer::normalize(&t).unwrap();
    assert_eq!(out.rows[0].amount, Decimal::ZERO);
    assert!(out.warnings.is_empty());
}

#[test]
fn test_both_amounts_set_prefers_withdrawn_and_warns() {
    let t = table(&["Details", "Paid in", "Withdrawn"], &[&["Odd", "100", "40"]]);
    let out = Normalizer::normalize(&t).unwrap();
    assert_eq!(out.rows[0].amount, dec!(-40));
    assert_eq!(out.warnings.len(), 1);
    assert_eq!(out.warnings[0].column, Column::Withdrawn);
}

#[test]
fn test_paid_in_kept_over_negative_withdrawn() {
    let t = table(&["Details", "Paid in", "Withdrawn"], &[&["Refund", "500", "-250"]]);
    let out = Normalizer::normalize(&t).unwrap();
    assert_eq!(out.rows[0].amount, dec!(500));
    assert!(out.warnings.is_empty());
}

#[test]
fn test_only_paid_in_column() {
    let t = table(&["Details", "Paid in"], &[&["Refund", "75"]]);
    let out = Normalizer::normalize(&t).unwrap();
    assert_eq!(out.rows[0].amount, dec!(75));
}

#[test]
fn test_signed_amount_column() {
    let t = table(&["Date", "Description", "Amount"], &[&["05/01/2024", "KFC", "-1,200.00"]]);
    let out = Normalizer::normalize(&t).unwrap();
    assert_eq!(out.rows[0].amount, dec!(-1200.00));
    assert_eq!(out.rows[0].date, Some(ymd(2024, 1, 5)));
}

#[test]
fn test_paid_in_withdrawn_supersedes_amount() {
    let t = table(
        &["Details", "Amount", "Paid in", "Withdrawn"],
        &[&["KFC", "999", "", "850"]],
    );
    let out = Normalizer::normalize(&t).unwrap();
    assert_eq!(out.rows[0].amount, dec!(-850));
}

#[test]
fn test_bad_amount_becomes_zero_with_warning() {
    let t = table(&["Details", "Paid in", "Withdrawn"], &[&["Glitch", "abc", ""]]);
    let out = Normalizer::normalize(&t).unwrap();
    assert_eq!(out.rows.len(), 1);
    assert_eq!(out.rows[0].amount, Decimal::ZERO);
    assert_eq!(out.warnings[0].column, Column::PaidIn);
    assert_eq!(out.warnings[0].value, "abc");
}

// ── Overdraft and blank rows ──────────────────────────────────

#[test]
fn test_overdraft_rows_dropped() {
    let t = table(
        &mpesa_headers(),
        &[
            &["A1", "05/01/2024 10:00:00", "OverDraft of Credit Party", "Completed", "500", "", "0"],
            &["A2", "05/01/2024 10:00:01", "Pay Bill OverDraft of Credit Party Fuliza", "Completed", "", "500", "0"],
            &["A3", "05/01/2024 10:05:00", "Naivas", "Completed", "", "500", "0"],
        ],
    );
    let out = Normalizer::normalize(&t).unwrap();
    assert_eq!(out.overdraft_dropped, 2);
    assert_eq!(out.rows.len(), 1);
    assert_eq!(out.rows[0].description, "Naivas");
    assert_eq!(out.rows[0].source_row, 2);
}

#[test]
fn test_overdraft_marker_is_case_sensitive() {
    let t = table(&["Details", "Amount"], &[&["overdraft of credit party", "-1"]]);
    let out = Normalizer::normalize(&t).unwrap();
    assert_eq!(out.rows.len(), 1);
    assert_eq!(out.overdraft_dropped, 0);
}

#[test]
fn test_blank_rows_skipped() {
    let t = table(&["Details", "Amount"], &[&["", " "], &["KFC", "-10"], &[]]);
    let out = Normalizer::normalize(&t).unwrap();
    assert_eq!(out.blank_skipped, 2);
    assert_eq!(out.rows.len(), 1);
    assert_eq!(out.rows[0].source_row, 1);
}

// ── Dates and times ───────────────────────────────────────────

#[test]
fn test_bad_timestamp_keeps_row() {
    let t = table(
        &["Completion Time", "Details", "Paid in"],
        &[&["yesterday-ish", "Salary", "100"], &["05/01/2024 25:99", "Bonus", "5"]],
    );
    let out = Normalizer::normalize(&t).unwrap();
    assert_eq!(out.rows.len(), 2);
    assert_eq!(out.rows[0].date, None);
    assert_eq!(out.rows[0].time, None);
    assert_eq!(out.rows[1].date, Some(ymd(2024, 1, 5)));
    assert_eq!(out.rows[1].time, None);
    assert_eq!(out.warnings.len(), 2);
    assert!(out.warnings.iter().all(|w| w.column == Column::CompletionTime));
}

#[test]
fn test_separate_date_and_time_columns() {
    let t = table(
        &["Date", "Time", "Details", "Amount"],
        &[&["13/02/2024", "07:45 PM", "Uber", "-430"]],
    );
    let out = Normalizer::normalize(&t).unwrap();
    assert_eq!(out.rows[0].date, Some(ymd(2024, 2, 13)));
    assert_eq!(out.rows[0].time, Some(hm(19, 45)));
}

#[test]
fn test_completion_time_supersedes_date_column() {
    let t = table(
        &["Date", "Completion Time", "Details", "Amount"],
        &[&["01/01/2000", "13/02/2024 08:10:00", "Uber", "-430"]],
    );
    let out = Normalizer::normalize(&t).unwrap();
    assert_eq!(out.rows[0].date, Some(ymd(2024, 2, 13)));
}

#[test]
fn test_no_date_columns_leaves_date_empty() {
    let t = table(&["Details", "Amount"], &[&["KFC", "-10"]]);
    let out = Normalizer::normalize(&t).unwrap();
    assert_eq!(out.rows[0].date, None);
    assert_eq!(out.rows[0].time, None);
    assert!(out.warnings.is_empty());
}

#[test]
fn test_parse_date_day_first_when_ambiguous() {
    assert_eq!(parse_date_day_first("03/04/2024"), Some(ymd(2024, 4, 3)));
    assert_eq!(parse_date_day_first("03-04-2024"), Some(ymd(2024, 4, 3)));
    assert_eq!(parse_date_day_first("03.04.2024"), Some(ymd(2024, 4, 3)));
}

#[test]
fn test_parse_date_month_first_when_unambiguous() {
    assert_eq!(parse_date_day_first("04/25/2024"), Some(ymd(2024, 4, 25)));
}

#[test]
fn test_parse_date_iso_and_short_year() {
    assert_eq!(parse_date_day_first("2024-04-03"), Some(ymd(2024, 4, 3)));
    assert_eq!(parse_date_day_first("3/4/24"), Some(ymd(2024, 4, 3)));
    assert_eq!(parse_date_day_first("3/4/99"), Some(ymd(1999, 4, 3)));
}

#[test]
fn test_parse_date_named_month() {
    assert_eq!(parse_date_day_first("5 Jan 2024"), Some(ymd(2024, 1, 5)));
    assert_eq!(parse_date_day_first("05-Jan-2024"), Some(ymd(2024, 1, 5)));
}

#[test]
fn test_parse_date_invalid() {
    assert_eq!(parse_date_day_first("32/13/2024"), None);
    assert_eq!(parse_date_day_first("not a date"), None);
    assert_eq!(parse_date_day_first(""), None);
}

#[test]
fn test_parse_time_formats() {
    assert_eq!(parse_time("14:23:10"), Some(hm(14, 23)));
    assert_eq!(parse_time("14:23"), Some(hm(14, 23)));
    assert_eq!(parse_time("2:05 PM"), Some(hm(14, 5)));
    assert_eq!(parse_time("noon"), None);
}

#[test]
fn test_parse_amount() {
    assert_eq!(parse_amount("1,234.56"), Some(dec!(1234.56)));
    assert_eq!(parse_amount(" -42 "), Some(dec!(-42)));
    assert_eq!(parse_amount(""), Some(Decimal::ZERO));
    assert_eq!(parse_amount("Ksh 5"), None);
}

// ── Receipts ──────────────────────────────────────────────────

#[test]
fn test_blank_receipt_falls_back_to_synthesized() {
    let t = table(
        &["Receipt No.", "Completion Time", "Details", "Withdrawn"],
        &[&["", "05/01/2024 10:00:00", "KFC", "10"]],
    );
    let out = Normalizer::normalize(&t).unwrap();
    assert_eq!(out.rows[0].receipt_id, None);
    assert_eq!(out.rows[0].receipt_no(), "TXN_0_05/01/2024");
}

#[test]
fn test_transaction_id_column_used_as_receipt() {
    let t = table(&["Transaction ID", "Details", "Amount"], &[&["TX99", "KFC", "-10"]]);
    let out = Normalizer::normalize(&t).unwrap();
    assert_eq!(out.rows[0].receipt_no(), "TX99");
}

// ── Structure ─────────────────────────────────────────────────

#[test]
fn test_missing_description_is_format_error() {
    let t = table(&["Completion Time", "Paid in", "Withdrawn"], &[&["05/01/2024", "1", ""]]);
    let err = Normalizer::normalize(&t).unwrap_err();
    assert!(matches!(err, LedgerError::Format(_)));
}

#[test]
fn test_short_rows_tolerated() {
    let t = table(&["Details", "Paid in", "Withdrawn"], &[&["KFC"]]);
    let out = Normalizer::normalize(&t).unwrap();
    assert_eq!(out.rows[0].amount, Decimal::ZERO);
}

#[test]
fn test_empty_table() {
    let t = table(&["Details", "Amount"], &[]);
    let out = Normalizer::normalize(&t).unwrap();
    assert!(out.rows.is_empty());
}

// ── Transform plan ────────────────────────────────────────────

fn plan_for(headers: &[&str]) -> Vec<Transform> {
    let headers: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    Transform::plan(&ColumnMap::detect(&headers))
}

#[test]
fn test_plan_full_statement() {
    assert_eq!(
        plan_for(&mpesa_headers()),
        vec![
            Transform::SplitCompletionTime,
            Transform::MergePaidInWithdrawn,
            Transform::ExplicitReceipt,
        ]
    );
}

#[test]
fn test_plan_minimal_statement() {
    assert_eq!(
        plan_for(&["Date", "Details", "Amount"]),
        vec![Transform::SeparateDateTime, Transform::SignedAmount]
    );
}

#[test]
fn test_plan_skips_steps_without_columns() {
    assert!(plan_for(&["Details"]).is_empty());
}

#[test]
fn test_merge_amounts() {
    assert_eq!(merge_amounts(dec!(1000), Decimal::ZERO), dec!(1000));
    assert_eq!(merge_amounts(Decimal::ZERO, dec!(250)), dec!(-250));
    assert_eq!(merge_amounts(dec!(-5), Decimal::ZERO), Decimal::ZERO);
    assert_eq!(merge_amounts(dec!(500), dec!(-250)), dec!(500));
    assert_eq!(merge_amounts(dec!(500), dec!(40)), dec!(-40));
    assert_eq!(merge_amounts(Decimal::ZERO, dec!(-250)), dec!(-250));
}
