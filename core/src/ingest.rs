//! CSV ingestion and feature engineering.
//!
//! Raw dataset rows arrive as day-first dated CSV. Ingestion parses
//! them, engineers the monetary fields (total, discount, net), and
//! hands the result to the snapshot store. Discount percentages are
//! drawn from a seeded PCG stream, one draw per accepted row, so the
//! same input and seed always yield the same snapshot.
//!
//! Rows that violate the engine's input contract (missing customer or
//! date, non-positive quantity, negative price) are rejected here and
//! counted — the engines never revalidate.

use crate::{
    config::IngestConfig,
    error::{AnalyticsError, AnalyticsResult},
    rng::IngestRng,
    snapshot::Transaction,
};
use chrono::NaiveDate;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Columns ingestion requires, after header normalization
/// (lowercased, spaces replaced with underscores).
const REQUIRED_COLUMNS: [&str; 8] = [
    "invoice_no",
    "customer_id",
    "category",
    "quantity",
    "price",
    "payment_method",
    "invoice_date",
    "shopping_mall",
];

#[derive(Debug)]
pub struct IngestOutcome {
    pub transactions: Vec<Transaction>,
    pub rows_rejected: usize,
}

struct ColumnIndex {
    invoice_no: usize,
    customer_id: usize,
    category: usize,
    quantity: usize,
    price: usize,
    payment_method: usize,
    invoice_date: usize,
    shopping_mall: usize,
}

fn split_csv_line(line: &str) -> Vec<&str> {
    line.trim_end_matches(['\r', '\n']).split(',').collect()
}

fn normalize_header(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace(' ', "_")
}

fn resolve_columns(header: &str) -> AnalyticsResult<ColumnIndex> {
    let names: Vec<String> = split_csv_line(header)
        .iter()
        .map(|n| normalize_header(n))
        .collect();

    let find = |wanted: &str| -> AnalyticsResult<usize> {
        names
            .iter()
            .position(|n| n == wanted)
            .ok_or_else(|| AnalyticsError::Csv {
                line: 1,
                reason: format!("missing column '{wanted}'"),
            })
    };

    // Validate all required columns up front so the error names the
    // first missing one rather than failing row by row.
    for wanted in REQUIRED_COLUMNS {
        find(wanted)?;
    }

    Ok(ColumnIndex {
        invoice_no: find("invoice_no")?,
        customer_id: find("customer_id")?,
        category: find("category")?,
        quantity: find("quantity")?,
        price: find("price")?,
        payment_method: find("payment_method")?,
        invoice_date: find("invoice_date")?,
        shopping_mall: find("shopping_mall")?,
    })
}

/// Parse a raw CSV export and engineer the monetary fields.
///
/// Accepted rows carry `total_sales = quantity × price`, a discount
/// drawn uniformly from the configured range, and
/// `net_sales = total_sales − discount_amount`. Invalid rows are
/// skipped and counted, never fatal.
pub fn ingest_csv(path: &Path, config: &IngestConfig) -> AnalyticsResult<IngestOutcome> {
    let file = File::open(path)
        .map_err(|e| anyhow::anyhow!("open input {}: {e}", path.display()))?;
    let mut lines = BufReader::new(file).lines();

    let header = match lines.next() {
        Some(line) => line.map_err(|e| anyhow::anyhow!("read input header: {e}"))?,
        None => {
            return Err(AnalyticsError::Csv {
                line: 1,
                reason: "input file is empty".into(),
            })
        }
    };
    let columns = resolve_columns(&header)?;

    let mut rng = IngestRng::new(config.discount_seed);
    let mut transactions = Vec::new();
    let mut rows_rejected = 0usize;

    for (idx, line_res) in lines.enumerate() {
        let line_no = idx + 2; // 1-based, after the header
        let line = line_res.map_err(|e| anyhow::anyhow!("read input line {line_no}: {e}"))?;
        if line.trim().is_empty() {
            continue;
        }

        match parse_row(&line, &columns) {
            Some(raw) => {
                let total_sales = raw.quantity as f64 * raw.price;
                let pct = rng.uniform(config.discount_pct_min, config.discount_pct_max);
                let discount_amount = total_sales * pct;
                transactions.push(Transaction {
                    invoice_no: raw.invoice_no,
                    customer_id: raw.customer_id,
                    shopping_mall: raw.shopping_mall,
                    category: raw.category,
                    payment_method: raw.payment_method,
                    invoice_date: raw.invoice_date,
                    quantity: raw.quantity,
                    price: raw.price,
                    total_sales,
                    discount_amount,
                    net_sales: total_sales - discount_amount,
                });
            }
            None => {
                rows_rejected += 1;
                log::debug!("ingest: rejected line {line_no}");
            }
        }
    }

    log::info!(
        "ingest: {} rows accepted, {} rejected from {}",
        transactions.len(),
        rows_rejected,
        path.display()
    );

    Ok(IngestOutcome {
        transactions,
        rows_rejected,
    })
}

struct RawRow {
    invoice_no: String,
    customer_id: String,
    shopping_mall: String,
    category: String,
    payment_method: String,
    invoice_date: NaiveDate,
    quantity: u32,
    price: f64,
}

fn parse_row(line: &str, columns: &ColumnIndex) -> Option<RawRow> {
    let fields = split_csv_line(line);
    let get = |i: usize| fields.get(i).map(|f| f.trim()).unwrap_or("");

    let invoice_no = get(columns.invoice_no);
    let customer_id = get(columns.customer_id);
    if invoice_no.is_empty() || customer_id.is_empty() {
        return None;
    }

    let invoice_date =
        NaiveDate::parse_from_str(get(columns.invoice_date), "%d/%m/%Y").ok()?;

    let quantity: u32 = get(columns.quantity).parse().ok()?;
    if quantity == 0 {
        return None;
    }

    let price: f64 = get(columns.price).parse().ok()?;
    if price < 0.0 {
        return None;
    }

    Some(RawRow {
        invoice_no: invoice_no.to_string(),
        customer_id: customer_id.to_string(),
        shopping_mall: get(columns.shopping_mall).to_string(),
        category: get(columns.category).to_string(),
        payment_method: get(columns.payment_method).to_string(),
        invoice_date,
        quantity,
        price,
    })
}
