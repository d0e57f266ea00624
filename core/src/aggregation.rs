//! Aggregation engine — grouped sums, means, and ratios over the
//! transaction snapshot.
//!
//! RULE: every function here is pure. It takes the snapshot by
//! reference, allocates a fresh derived table, and never mutates its
//! input. An empty snapshot is a typed `EmptySnapshot` condition,
//! distinguishable from a legitimate zero-valued result.
//!
//! Ordering is deterministic everywhere: descending sorts are stable,
//! so groups tied on the sort key keep their first-encounter order
//! from the snapshot.

use crate::{
    error::{AnalyticsError, AnalyticsResult},
    snapshot::{Transaction, TransactionSnapshot},
    stats,
    types::CustomerId,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

// ── Output tables ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StorePerformance {
    pub shopping_mall: String,
    pub total_net_sales: f64,
    pub avg_net_sales: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TopCustomer {
    pub customer_id: CustomerId,
    pub net_sales: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValueSegmentation {
    pub median_spend: f64,
    pub low_value: usize,
    pub high_value: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryDiscountImpact {
    pub category: String,
    pub total_sales: f64,
    pub total_discount: f64,
    pub net_sales: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthlySales {
    pub year: i32,
    pub month: u32,
    pub net_sales: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PaymentMethodShare {
    pub payment_method: String,
    pub share: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CustomerTypeSales {
    pub customer_type: String,
    pub net_sales: f64,
}

// ── Shared helpers ───────────────────────────────────────────────────────────

fn non_empty(snapshot: &TransactionSnapshot) -> AnalyticsResult<&[Transaction]> {
    if snapshot.is_empty() {
        return Err(AnalyticsError::EmptySnapshot);
    }
    Ok(snapshot.rows())
}

/// Per-customer total net sales, ascending by customer id.
/// The ascending order doubles as the stable tie-break order used by
/// the segmentation engine's frequency ranking.
pub(crate) fn customer_net_sales(rows: &[Transaction]) -> Vec<(CustomerId, f64)> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for row in rows {
        *totals.entry(row.customer_id.as_str()).or_insert(0.0) += row.net_sales;
    }
    totals
        .into_iter()
        .map(|(id, total)| (id.to_string(), total))
        .collect()
}

/// Group rows by a string key, accumulating (sum, count) per group in
/// first-encounter order.
fn grouped<F, V>(rows: &[Transaction], key: F, value: V) -> Vec<(String, f64, usize)>
where
    F: Fn(&Transaction) -> &str,
    V: Fn(&Transaction) -> f64,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<(String, f64, usize)> = Vec::new();
    for row in rows {
        let k = key(row);
        match index.get(k) {
            Some(&i) => {
                out[i].1 += value(row);
                out[i].2 += 1;
            }
            None => {
                index.insert(k, out.len());
                out.push((k.to_string(), value(row), 1));
            }
        }
    }
    out
}

// ── Aggregations ─────────────────────────────────────────────────────────────

/// Total and average net sales per store, descending by total.
pub fn store_performance(
    snapshot: &TransactionSnapshot,
) -> AnalyticsResult<Vec<StorePerformance>> {
    let rows = non_empty(snapshot)?;

    let mut out: Vec<StorePerformance> = grouped(rows, |t| &t.shopping_mall, |t| t.net_sales)
        .into_iter()
        .map(|(mall, sum, count)| StorePerformance {
            shopping_mall: mall,
            total_net_sales: sum,
            avg_net_sales: sum / count as f64,
        })
        .collect();
    out.sort_by(|a, b| b.total_net_sales.total_cmp(&a.total_net_sales));
    Ok(out)
}

/// The top `top_n_percent` of customers by total net sales,
/// descending. The count is truncated (`floor`), so small populations
/// can legitimately produce an empty result.
pub fn top_customers(
    snapshot: &TransactionSnapshot,
    top_n_percent: f64,
) -> AnalyticsResult<Vec<TopCustomer>> {
    let rows = non_empty(snapshot)?;

    let mut customers: Vec<TopCustomer> = customer_net_sales(rows)
        .into_iter()
        .map(|(customer_id, net_sales)| TopCustomer {
            customer_id,
            net_sales,
        })
        .collect();
    customers.sort_by(|a, b| b.net_sales.total_cmp(&a.net_sales));

    let keep = (customers.len() as f64 * top_n_percent) as usize;
    customers.truncate(keep);
    Ok(customers)
}

/// Median split of per-customer total spend. The median itself falls
/// on the low side.
pub fn value_segmentation(
    snapshot: &TransactionSnapshot,
) -> AnalyticsResult<ValueSegmentation> {
    let rows = non_empty(snapshot)?;

    let totals = customer_net_sales(rows);
    let spend: Vec<f64> = totals.iter().map(|(_, v)| *v).collect();
    let median_spend = stats::median(&spend);

    let low_value = spend.iter().filter(|&&v| v <= median_spend).count();
    Ok(ValueSegmentation {
        median_spend,
        low_value,
        high_value: spend.len() - low_value,
    })
}

/// Gross sales, discounts given, and net sales per category,
/// descending by net sales.
pub fn discount_impact(
    snapshot: &TransactionSnapshot,
) -> AnalyticsResult<Vec<CategoryDiscountImpact>> {
    let rows = non_empty(snapshot)?;

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<CategoryDiscountImpact> = Vec::new();
    for row in rows {
        let i = match index.get(row.category.as_str()) {
            Some(&i) => i,
            None => {
                index.insert(&row.category, out.len());
                out.push(CategoryDiscountImpact {
                    category: row.category.clone(),
                    total_sales: 0.0,
                    total_discount: 0.0,
                    net_sales: 0.0,
                });
                out.len() - 1
            }
        };
        out[i].total_sales += row.total_sales;
        out[i].total_discount += row.discount_amount;
        out[i].net_sales += row.net_sales;
    }
    out.sort_by(|a, b| b.net_sales.total_cmp(&a.net_sales));
    Ok(out)
}

/// Net sales per calendar month, as a continuous series from the
/// first to the last observed month. Months with no transactions
/// carry 0.0 rather than being dropped.
pub fn seasonality(snapshot: &TransactionSnapshot) -> AnalyticsResult<Vec<MonthlySales>> {
    let rows = non_empty(snapshot)?;

    let mut buckets: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for row in rows {
        use chrono::Datelike;
        let key = (row.invoice_date.year(), row.invoice_date.month());
        *buckets.entry(key).or_insert(0.0) += row.net_sales;
    }

    // BTreeMap keys are already chronological; fill the gaps.
    let (&first, _) = buckets.iter().next().expect("non-empty checked above");
    let (&last, _) = buckets.iter().next_back().expect("non-empty checked above");

    let mut out = Vec::new();
    let (mut year, mut month) = first;
    loop {
        out.push(MonthlySales {
            year,
            month,
            net_sales: buckets.get(&(year, month)).copied().unwrap_or(0.0),
        });
        if (year, month) == last {
            break;
        }
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }
    Ok(out)
}

/// Share of transactions per payment method, normalized to sum to
/// 1.0 across all observed methods. Descending by share.
pub fn payment_method_mix(
    snapshot: &TransactionSnapshot,
) -> AnalyticsResult<Vec<PaymentMethodShare>> {
    let rows = non_empty(snapshot)?;

    let total = rows.len() as f64;
    let mut out: Vec<PaymentMethodShare> = grouped(rows, |t| &t.payment_method, |_| 1.0)
        .into_iter()
        .map(|(method, count, _)| PaymentMethodShare {
            payment_method: method,
            share: count / total,
        })
        .collect();
    out.sort_by(|a, b| b.share.total_cmp(&a.share));
    Ok(out)
}

/// Net sales contributed by repeat customers (more than one distinct
/// invoice) versus one-time customers. Ascending by label.
pub fn repeat_vs_onetime(
    snapshot: &TransactionSnapshot,
) -> AnalyticsResult<Vec<CustomerTypeSales>> {
    let rows = non_empty(snapshot)?;

    let mut invoices: HashMap<&str, HashSet<&str>> = HashMap::new();
    for row in rows {
        invoices
            .entry(row.customer_id.as_str())
            .or_default()
            .insert(row.invoice_no.as_str());
    }

    let mut by_type: BTreeMap<&str, f64> = BTreeMap::new();
    for row in rows {
        let label = if invoices[row.customer_id.as_str()].len() > 1 {
            "Repeat Customer"
        } else {
            "One-Time Customer"
        };
        *by_type.entry(label).or_insert(0.0) += row.net_sales;
    }

    Ok(by_type
        .into_iter()
        .map(|(customer_type, net_sales)| CustomerTypeSales {
            customer_type: customer_type.to_string(),
            net_sales,
        })
        .collect())
}
