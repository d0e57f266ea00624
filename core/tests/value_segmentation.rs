//! Value segmentation tests — median split of per-customer spend.

use chrono::NaiveDate;
use retail_core::aggregation;
use retail_core::snapshot::{Transaction, TransactionSnapshot};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn txn(invoice: &str, customer: &str, net: f64) -> Transaction {
    Transaction {
        invoice_no: invoice.into(),
        customer_id: customer.into(),
        shopping_mall: "Kanyon".into(),
        category: "Clothing".into(),
        payment_method: "Cash".into(),
        invoice_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        quantity: 1,
        price: net,
        total_sales: net,
        discount_amount: 0.0,
        net_sales: net,
    }
}

fn snapshot_with_totals(totals: &[f64]) -> TransactionSnapshot {
    let rows = totals
        .iter()
        .enumerate()
        .map(|(i, &net)| txn(&format!("I{i}"), &format!("c{i}"), net))
        .collect();
    TransactionSnapshot::new(rows)
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Totals {100, 200, 300} → median 200; the median customer falls on
/// the low side, so Low-Value: 2, High-Value: 1.
#[test]
fn median_customer_falls_on_low_side() {
    let snapshot = snapshot_with_totals(&[100.0, 200.0, 300.0]);
    let seg = aggregation::value_segmentation(&snapshot).unwrap();

    assert!((seg.median_spend - 200.0).abs() < 1e-9);
    assert_eq!(seg.low_value, 2);
    assert_eq!(seg.high_value, 1);
}

/// An even population interpolates the median between the middle two
/// spends.
#[test]
fn even_population_interpolates_median() {
    let snapshot = snapshot_with_totals(&[100.0, 200.0, 300.0, 400.0]);
    let seg = aggregation::value_segmentation(&snapshot).unwrap();

    assert!((seg.median_spend - 250.0).abs() < 1e-9);
    assert_eq!(seg.low_value, 2);
    assert_eq!(seg.high_value, 2);
}

/// Labels always partition the population.
#[test]
fn counts_sum_to_customer_total() {
    let snapshot = snapshot_with_totals(&[50.0, 75.0, 100.0, 125.0, 150.0]);
    let seg = aggregation::value_segmentation(&snapshot).unwrap();

    assert_eq!(seg.low_value + seg.high_value, 5);
    // The minimum spender can never clear the median, so Low-Value is
    // always populated.
    assert!(seg.low_value >= 1);
}

/// A flat spend distribution puts everyone at the median, and the
/// boundary is inclusive on the low side.
#[test]
fn flat_distribution_is_all_low_value() {
    let snapshot = snapshot_with_totals(&[100.0, 100.0, 100.0]);
    let seg = aggregation::value_segmentation(&snapshot).unwrap();

    assert_eq!(seg.low_value, 3);
    assert_eq!(seg.high_value, 0);
}

/// Per-customer totals accumulate across invoices before the split.
#[test]
fn totals_accumulate_across_invoices() {
    let snapshot = TransactionSnapshot::new(vec![
        txn("I1", "c1", 100.0),
        txn("I2", "c1", 150.0), // c1 totals 250
        txn("I3", "c2", 200.0),
        txn("I4", "c3", 300.0),
    ]);
    let seg = aggregation::value_segmentation(&snapshot).unwrap();

    // Totals {250, 200, 300} → median 250, inclusive on the low side.
    assert!((seg.median_spend - 250.0).abs() < 1e-9);
    assert_eq!(seg.low_value, 2);
    assert_eq!(seg.high_value, 1);
}
