use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::path::Path;

use super::Session;
use crate::categorize::Categorizer;
use crate::import::{Normalized, Normalizer, RawTable};
use crate::ledger::{recategorize_stored, ReviewBatch};
use crate::models::{StatementRow, UNCATEGORIZED};

pub(crate) fn as_cli(args: &[String], session: &mut Session) -> Result<()> {
    match args[1].as_str() {
        "import" | "i" => cli_import(&args[2..], session),
        "preview" | "p" => cli_preview(&args[2..], session),
        "list" | "ls" => cli_list(&args[2..], session),
        "categories" | "c" => cli_categories(session),
        "add-category" => cli_add_category(&args[2..], session),
        "add-keyword" => cli_add_keyword(&args[2..], session),
        "set-category" => cli_set_category(&args[2..], session),
        "summary" | "s" => cli_summary(session),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("pesatrack {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

pub(crate) fn print_usage() {
    println!("PesaTrack - local M-Pesa statement ledger");
    println!();
    println!("Usage: pesatrack [-v] <command>");
    println!();
    println!("Commands:");
    println!("  import <file>                 Categorize and save a statement, skipping duplicates");
    println!("    --assign <row>=<category>   Override a row's category before saving (repeatable)");
    println!("  preview <file>                Show numbered, categorized rows without saving");
    println!("  list [search]                 List stored transactions");
    println!("  categories                    List categories and their keywords");
    println!("  add-category <name>           Create a category");
    println!("  add-keyword <cat> <keyword>   Add a matching keyword to a category");
    println!("  set-category <receipt> <cat>  Recategorize a stored transaction");
    println!("  summary                       Print spending by category");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
    println!();
    println!("Statements are CSV exports, or .json page tables extracted from a PDF.");
    println!();
    println!("Options:");
    println!("  -v, --verbose                 Debug logging (RUST_LOG takes precedence)");
}

// ── Statements ────────────────────────────────────────────────

fn load_statement(file_path: &str, session: &Session) -> Result<Normalized> {
    let path = Path::new(file_path);
    if !path.exists() {
        anyhow::bail!("File not found: {file_path}");
    }
    let table = read_table(path).with_context(|| format!("Failed to read {file_path}"))?;
    if table.is_empty() {
        println!("Statement has no transaction rows");
    }
    let mut normalized = Normalizer::normalize(&table)?;

    let categorizer = Categorizer::new(session.rules.rules(), session.config.match_policy);
    categorizer.categorize_batch(&mut normalized.rows);
    Ok(normalized)
}

/// CSV exports are read directly. A `.json` file holds page tables already
/// extracted from a PDF statement: an array of pages, each an array of rows.
fn read_table(path: &Path) -> Result<RawTable> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if !is_json {
        return Ok(RawTable::from_csv_path(path)?);
    }
    let content = std::fs::read_to_string(path)?;
    let pages: Vec<Vec<Vec<String>>> =
        serde_json::from_str(&content).context("Expected an array of page tables")?;
    Ok(RawTable::from_pages(pages)?)
}

/// Parse `--assign <row>=<category>` pairs. Rows are numbered from 1 as
/// `preview` prints them.
fn parse_assignments(args: &[String]) -> Result<Vec<(usize, String)>> {
    let mut out = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg != "--assign" {
            continue;
        }
        let value = iter
            .next()
            .ok_or_else(|| anyhow::anyhow!("--assign needs <row>=<category>"))?;
        let (row, category) = value
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Expected <row>=<category>, got '{value}'"))?;
        let row: usize = row
            .trim()
            .parse()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| anyhow::anyhow!("Invalid row number '{row}'"))?;
        out.push((row - 1, category.trim().to_string()));
    }
    Ok(out)
}

fn cli_import(args: &[String], session: &mut Session) -> Result<()> {
    let Some(file_path) = args.first().filter(|a| !a.starts_with('-')) else {
        anyhow::bail!("Usage: pesatrack import <file> [--assign <row>=<category>]...");
    };
    let assignments = parse_assignments(&args[1..])?;

    let normalized = load_statement(file_path, session)?;
    if !normalized.warnings.is_empty() {
        println!(
            "{} values could not be parsed (run preview for details)",
            normalized.warnings.len()
        );
    }

    let mut batch = ReviewBatch::new(normalized.rows);
    if batch.is_empty() {
        println!("Nothing to import");
        return Ok(());
    }
    let categorized = batch
        .rows()
        .iter()
        .filter(|r| r.category.as_deref() != Some(UNCATEGORIZED))
        .count();
    println!("Parsed {} transactions", batch.len());
    println!("Auto-categorized {categorized}/{}", batch.len());

    for (index, category) in &assignments {
        let outcome = batch.assign(*index, category, &mut session.rules, &mut session.db)?;
        if outcome.changed {
            println!(
                "Row {} -> {category} ({} similar updated{})",
                index + 1,
                outcome.propagated,
                failed_suffix(outcome.failed)
            );
        }
    }

    let report = batch.commit(&mut session.db, &session.rules)?;
    println!(
        "Imported {} new transactions ({} duplicates skipped)",
        report.inserted, report.duplicates
    );
    Ok(())
}

fn cli_preview(args: &[String], session: &mut Session) -> Result<()> {
    let Some(file_path) = args.first() else {
        anyhow::bail!("Usage: pesatrack preview <file>");
    };
    let normalized = load_statement(file_path, session)?;

    print_rows(&normalized.rows);

    if normalized.overdraft_dropped > 0 || normalized.blank_skipped > 0 {
        println!();
        println!(
            "{} overdraft entries dropped, {} blank rows skipped",
            normalized.overdraft_dropped, normalized.blank_skipped
        );
    }
    if !normalized.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for w in &normalized.warnings {
            println!("  {w}");
        }
    }
    Ok(())
}

fn print_rows(rows: &[StatementRow]) {
    if rows.is_empty() {
        println!("No transactions");
        return;
    }
    println!(
        "{:<4} {:<10} {:<5} {:<20} {:<32} {:>12}  Category",
        "#", "Date", "Time", "Receipt", "Description", "Amount"
    );
    println!("{}", "─".repeat(100));
    for (i, row) in rows.iter().enumerate() {
        println!(
            "{:<4} {:<10} {:<5} {:<20} {:<32} {:>12.2}  {}",
            i + 1,
            row.date
                .map(|d| d.format(crate::models::DATE_DISPLAY_FORMAT).to_string())
                .unwrap_or_default(),
            row.time
                .map(|t| t.format(crate::models::TIME_DISPLAY_FORMAT).to_string())
                .unwrap_or_default(),
            truncate(&row.receipt_no(), 20),
            truncate(&row.description, 32),
            row.amount,
            row.category.as_deref().unwrap_or(UNCATEGORIZED),
        );
    }
}

// ── Ledger ────────────────────────────────────────────────────

fn cli_list(args: &[String], session: &mut Session) -> Result<()> {
    let search = args.first().map(String::as_str);
    let txns = session.db.get_transactions(search)?;
    if txns.is_empty() {
        println!("No transactions");
        return Ok(());
    }

    println!(
        "{:<10} {:<5} {:<20} {:<32} {:>12}  Category",
        "Date", "Time", "Receipt", "Description", "Amount"
    );
    println!("{}", "─".repeat(95));
    for t in &txns {
        println!(
            "{:<10} {:<5} {:<20} {:<32} {:>12.2}  {}",
            t.display_date(),
            t.display_time(),
            truncate(&t.receipt_no, 20),
            truncate(&t.description, 32),
            t.amount,
            t.category,
        );
    }
    let inflow: Decimal = txns.iter().filter(|t| t.is_income()).map(|t| t.amount).sum();
    let outflow: Decimal = txns.iter().filter(|t| t.is_expense()).map(|t| t.abs_amount()).sum();
    println!();
    println!(
        "{} transactions, {inflow:.2} in, {outflow:.2} out",
        txns.len()
    );
    Ok(())
}

fn cli_set_category(args: &[String], session: &mut Session) -> Result<()> {
    let [receipt_no, category, ..] = args else {
        anyhow::bail!("Usage: pesatrack set-category <receipt_no> <category>");
    };
    let outcome =
        recategorize_stored(&mut session.rules, &mut session.db, receipt_no, category)?;
    if !outcome.changed {
        println!("{receipt_no} is already in {category}");
        return Ok(());
    }
    println!(
        "{receipt_no} -> {}; {} similar transactions updated{}",
        category.trim(),
        outcome.propagated,
        failed_suffix(outcome.failed)
    );
    if outcome.keyword_added {
        println!("Future uploads with this description will be categorized automatically");
    }
    Ok(())
}

fn cli_summary(session: &mut Session) -> Result<()> {
    let spending = session.db.get_spending_by_category()?;
    let txn_count = session.db.get_transaction_count()?;
    let total: Decimal = spending.iter().map(|(_, amt)| *amt).sum();

    println!("PesaTrack - spending by category");
    println!("{}", "─".repeat(40));
    for (name, amount) in &spending {
        println!("  {name:<24} {amount:>12.2}");
    }
    println!("{}", "─".repeat(40));
    println!("  {:<24} {total:>12.2}", "Total");
    println!("  {:<24} {txn_count:>12}", "Transactions");
    Ok(())
}

// ── Categories ────────────────────────────────────────────────

fn cli_categories(session: &mut Session) -> Result<()> {
    let rules = session.rules.rules();
    for name in rules.names() {
        match rules.keywords(name) {
            Some(keywords) if !keywords.is_empty() => println!("{name}: {}", keywords.join(", ")),
            _ => println!("{name}"),
        }
    }
    Ok(())
}

fn cli_add_category(args: &[String], session: &mut Session) -> Result<()> {
    let name = args.join(" ");
    if name.trim().is_empty() {
        anyhow::bail!("Usage: pesatrack add-category <name>");
    }
    if session.rules.create_category(&name)? {
        println!(
            "Added category {} ({})",
            name.trim(),
            session.rules.path().display()
        );
    } else {
        println!("Category {} already exists", name.trim());
    }
    Ok(())
}

fn cli_add_keyword(args: &[String], session: &mut Session) -> Result<()> {
    let [category, keyword @ ..] = args else {
        anyhow::bail!("Usage: pesatrack add-keyword <category> <keyword>");
    };
    let keyword = keyword.join(" ");
    if keyword.trim().is_empty() {
        anyhow::bail!("Usage: pesatrack add-keyword <category> <keyword>");
    }
    if session.rules.add_keyword(category, &keyword)? {
        println!("{}: added {}", category.trim(), keyword.trim());
    } else {
        println!("{} already has {}", category.trim(), keyword.trim());
    }
    Ok(())
}

// ── Formatting ────────────────────────────────────────────────

fn failed_suffix(failed: usize) -> String {
    if failed == 0 {
        String::new()
    } else {
        format!(", {failed} failed")
    }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
