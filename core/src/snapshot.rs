//! The immutable transaction snapshot every engine computes over.
//!
//! A snapshot is built once (by ingestion or loaded from the store)
//! and never mutated afterwards. Engines receive it by reference and
//! allocate fresh output per call, so concurrent callers need no
//! locking and repeated calls are idempotent.

use crate::types::{CustomerId, InvoiceNo};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// One processed invoice line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub invoice_no: InvoiceNo,
    pub customer_id: CustomerId,
    pub shopping_mall: String,
    pub category: String,
    pub payment_method: String,
    pub invoice_date: NaiveDate,
    pub quantity: u32,
    pub price: f64,
    pub total_sales: f64,
    pub discount_amount: f64,
    pub net_sales: f64,
}

/// Read-only view over the processed transaction table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionSnapshot {
    rows: Vec<Transaction>,
}

impl TransactionSnapshot {
    pub fn new(rows: Vec<Transaction>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Transaction] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The latest invoice date observed in the snapshot.
    pub fn latest_invoice_date(&self) -> Option<NaiveDate> {
        self.rows.iter().map(|t| t.invoice_date).max()
    }

    /// The snapshot's "today": one day after the latest invoice date.
    /// All recency arithmetic is anchored here.
    pub fn snapshot_date(&self) -> Option<NaiveDate> {
        self.latest_invoice_date()
            .and_then(|d| d.checked_add_days(Days::new(1)))
    }
}
