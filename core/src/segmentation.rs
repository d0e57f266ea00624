//! RFM segmentation engine — recency/frequency/monetary scoring and
//! behavioral segment naming.
//!
//! Scoring semantics, in full:
//!   - recency is measured from the snapshot's "today" (latest
//!     invoice date + 1 day) and scored INVERTED: the most recent
//!     quartile scores 4, the least recent scores 1.
//!   - frequency is rank-transformed before quartile cutting: ranks
//!     are assigned ascending by value, ties broken by ascending
//!     customer id, so tied raw counts can land in different
//!     quartiles and the four bins stay equal-sized.
//!   - monetary is quartile-cut on the raw values with NO tie-break;
//!     tied spend clusters in one bin. The asymmetry against
//!     frequency is deliberate: purchase counts are low-cardinality
//!     and need forced balancing, spend is not.
//!
//! Customers are processed in ascending customer id order, which
//! fixes both the output order and the frequency tie-break.

use crate::{
    error::{AnalyticsError, AnalyticsResult},
    snapshot::TransactionSnapshot,
    stats,
    types::CustomerId,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

// ── Segment naming policy ────────────────────────────────────────────────────

/// Default segment for every score combination not named below.
pub const AT_RISK: &str = "At Risk";

/// Fixed code-to-name table. This is business policy, kept as data so
/// it can be audited and extended without touching the scoring
/// algorithm. Codes not listed fall through to [`AT_RISK`].
pub const SEGMENT_NAMES: [(&str, &str); 13] = [
    ("444", "Champions"),
    ("434", "Champions"),
    ("443", "Champions"),
    ("344", "Loyal Customers"),
    ("433", "Loyal Customers"),
    ("442", "Loyal Customers"),
    ("422", "Potential Loyalists"),
    ("322", "Potential Loyalists"),
    ("332", "Potential Loyalists"),
    ("432", "Potential Loyalists"),
    ("111", "Lost Customers"),
    ("112", "Lost Customers"),
    ("121", "Lost Customers"),
];

/// Segments included in the category cross-tabulation. Lost Customers
/// are excluded by policy — campaigns do not report on them.
pub const REPORTED_SEGMENTS: [&str; 4] = [
    "Champions",
    "Loyal Customers",
    "Potential Loyalists",
    AT_RISK,
];

/// Resolve a 3-digit segment code to its behavioral name.
pub fn segment_name(code: &str) -> &'static str {
    SEGMENT_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
        .unwrap_or(AT_RISK)
}

// ── Output tables ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RfmRecord {
    pub customer_id: CustomerId,
    /// Days since the customer's last purchase, from the snapshot's
    /// "today". Always ≥ 1.
    pub recency: i64,
    /// Count of distinct invoices.
    pub frequency: u64,
    /// Total net sales.
    pub monetary: f64,
    pub r_score: u8,
    pub f_score: u8,
    pub m_score: u8,
    /// The three score digits concatenated, e.g. "434".
    pub segment: String,
    pub segment_name: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SegmentCategorySales {
    pub segment_name: String,
    pub category: String,
    pub net_sales: f64,
}

// ── Scoring ──────────────────────────────────────────────────────────────────

struct CustomerMetrics {
    customer_id: CustomerId,
    last_purchase: NaiveDate,
    frequency: u64,
    monetary: f64,
}

fn collect_metrics(snapshot: &TransactionSnapshot) -> Vec<CustomerMetrics> {
    let mut per_customer: BTreeMap<&str, (NaiveDate, HashSet<&str>, f64)> = BTreeMap::new();
    for row in snapshot.rows() {
        let entry = per_customer
            .entry(row.customer_id.as_str())
            .or_insert_with(|| (row.invoice_date, HashSet::new(), 0.0));
        entry.0 = entry.0.max(row.invoice_date);
        entry.1.insert(row.invoice_no.as_str());
        entry.2 += row.net_sales;
    }
    per_customer
        .into_iter()
        .map(|(id, (last_purchase, invoices, monetary))| CustomerMetrics {
            customer_id: id.to_string(),
            last_purchase,
            frequency: invoices.len() as u64,
            monetary,
        })
        .collect()
}

/// Rank positions 1..=n ascending by value, ties resolved by input
/// order (ascending customer id). The ranks are always distinct, so
/// quartile cutting over them yields four equal-sized bins.
fn first_seen_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    let mut ranks = vec![0.0; values.len()];
    for (pos, &i) in order.iter().enumerate() {
        ranks[i] = (pos + 1) as f64;
    }
    ranks
}

/// Compute the full RFM table for the snapshot.
///
/// Recomputed from scratch on every call; the engine holds no state
/// between invocations.
pub fn calculate_rfm(snapshot: &TransactionSnapshot) -> AnalyticsResult<Vec<RfmRecord>> {
    if snapshot.is_empty() {
        return Err(AnalyticsError::EmptySnapshot);
    }
    let today = snapshot.snapshot_date().ok_or(AnalyticsError::EmptySnapshot)?;

    let metrics = collect_metrics(snapshot);

    let recency: Vec<f64> = metrics
        .iter()
        .map(|m| (today - m.last_purchase).num_days() as f64)
        .collect();
    let frequency: Vec<f64> = metrics.iter().map(|m| m.frequency as f64).collect();
    let monetary: Vec<f64> = metrics.iter().map(|m| m.monetary).collect();

    let r_edges = stats::quartile_edges(&recency, "recency")?;
    let f_ranks = first_seen_ranks(&frequency);
    let f_edges = stats::quartile_edges(&f_ranks, "frequency")?;
    let m_edges = stats::quartile_edges(&monetary, "monetary")?;

    let records = metrics
        .into_iter()
        .enumerate()
        .map(|(i, m)| {
            // Recency scoring is inverted: lowest quartile → 4.
            let r_score = 5 - stats::quartile_bin(recency[i], &r_edges);
            let f_score = stats::quartile_bin(f_ranks[i], &f_edges);
            let m_score = stats::quartile_bin(monetary[i], &m_edges);
            let segment = format!("{r_score}{f_score}{m_score}");
            let name = segment_name(&segment);
            RfmRecord {
                customer_id: m.customer_id,
                recency: recency[i] as i64,
                frequency: m.frequency,
                monetary: m.monetary,
                r_score,
                f_score,
                m_score,
                segment,
                segment_name: name,
            }
        })
        .collect();
    Ok(records)
}

/// Net sales per (segment name, category) pair over the reported
/// segments, ascending by segment name then category.
pub fn category_by_segment(
    snapshot: &TransactionSnapshot,
    rfm: &[RfmRecord],
) -> AnalyticsResult<Vec<SegmentCategorySales>> {
    if snapshot.is_empty() {
        return Err(AnalyticsError::EmptySnapshot);
    }

    let segment_of: HashMap<&str, &'static str> = rfm
        .iter()
        .map(|r| (r.customer_id.as_str(), r.segment_name))
        .collect();

    let mut buckets: BTreeMap<(&str, &str), f64> = BTreeMap::new();
    for row in snapshot.rows() {
        let Some(&name) = segment_of.get(row.customer_id.as_str()) else {
            continue;
        };
        if !REPORTED_SEGMENTS.contains(&name) {
            continue;
        }
        *buckets.entry((name, row.category.as_str())).or_insert(0.0) += row.net_sales;
    }

    Ok(buckets
        .into_iter()
        .map(|((name, category), net_sales)| SegmentCategorySales {
            segment_name: name.to_string(),
            category: category.to_string(),
            net_sales,
        })
        .collect())
}
