//! Campaign simulation tests — projection arithmetic, the guarded
//! ROI division, and the documented zero result.

use chrono::NaiveDate;
use retail_core::error::AnalyticsError;
use retail_core::segmentation::RfmRecord;
use retail_core::simulation::{self, CampaignProjection};
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

fn rfm_row(customer: &str, name: &'static str) -> RfmRecord {
    RfmRecord {
        customer_id: customer.into(),
        recency: 5,
        frequency: 2,
        monetary: 500.0,
        r_score: 4,
        f_score: 4,
        m_score: 4,
        segment: "444".into(),
        segment_name: name,
    }
}

/// Two Champions averaging 500 in historical spend, plus a bystander
/// outside the segment.
fn champions_fixture() -> (TransactionSnapshot, Vec<RfmRecord>) {
    let snapshot = TransactionSnapshot::new(vec![
        txn("I1", "c1", 400.0),
        txn("I2", "c1", 100.0), // c1 totals 500
        txn("I3", "c2", 500.0),
        txn("I4", "other", 50.0),
    ]);
    let rfm = vec![
        rfm_row("c1", "Champions"),
        rfm_row("c2", "Champions"),
        rfm_row("other", "At Risk"),
    ];
    (snapshot, rfm)
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Two customers averaging 500 at a 10% discount: revenue
/// 500 × 2 × 1.10 = 1100, cost 110, ROI (1100 − 110 − 110)/110 ≈ 800%.
#[test]
fn projects_revenue_cost_and_roi() {
    let (snapshot, rfm) = champions_fixture();

    let result =
        simulation::run_campaign_simulation(&snapshot, &rfm, "Champions", 0.1).unwrap();

    assert_eq!(result.customer_count, 2);
    assert!(
        (result.projected_revenue - 1100.0).abs() < 1e-6,
        "revenue {}",
        result.projected_revenue
    );
    assert!((result.campaign_cost - 110.0).abs() < 1e-6);
    assert!(
        (result.projected_roi - 800.0).abs() < 1e-6,
        "roi {}",
        result.projected_roi
    );
}

/// Only the target segment's customers contribute to the average:
/// the bystander's spend never leaks in.
#[test]
fn bystanders_are_excluded_from_the_average() {
    let (snapshot, rfm) = champions_fixture();

    let champs = simulation::run_campaign_simulation(&snapshot, &rfm, "Champions", 0.1).unwrap();
    let risk = simulation::run_campaign_simulation(&snapshot, &rfm, "At Risk", 0.1).unwrap();

    assert_eq!(champs.customer_count, 2);
    assert_eq!(risk.customer_count, 1);
    assert!((risk.projected_revenue - 55.0).abs() < 1e-6); // 50 × 1 × 1.10
}

/// A target segment with no customers yields the documented
/// zero-valued projection, not an error.
#[test]
fn unknown_segment_yields_zero_result() {
    let (snapshot, rfm) = champions_fixture();

    let result =
        simulation::run_campaign_simulation(&snapshot, &rfm, "Lost Customers", 0.1).unwrap();
    assert_eq!(result, CampaignProjection::zero());

    // A name outside the label set behaves the same way.
    let result =
        simulation::run_campaign_simulation(&snapshot, &rfm, "No Such Segment", 0.1).unwrap();
    assert_eq!(result.customer_count, 0);
    assert_eq!(result.projected_revenue, 0.0);
}

/// A zero discount produces zero cost and a guarded zero ROI — never
/// a NaN from the division.
#[test]
fn zero_discount_guards_the_roi_division() {
    let (snapshot, rfm) = champions_fixture();

    let result =
        simulation::run_campaign_simulation(&snapshot, &rfm, "Champions", 0.0).unwrap();

    assert!((result.campaign_cost - 0.0).abs() < 1e-12);
    assert_eq!(result.projected_roi, 0.0);
    assert!(result.projected_roi.is_finite());
}

/// An empty snapshot is the typed condition, distinct from the
/// zero-valued projection for an empty segment.
#[test]
fn empty_snapshot_is_an_error() {
    let rfm = vec![rfm_row("c1", "Champions")];
    assert!(matches!(
        simulation::run_campaign_simulation(
            &TransactionSnapshot::default(),
            &rfm,
            "Champions",
            0.1
        ),
        Err(AnalyticsError::EmptySnapshot)
    ));
}

/// Same inputs, byte-identical projection.
#[test]
fn simulation_is_idempotent() {
    let (snapshot, rfm) = champions_fixture();

    let first = simulation::run_campaign_simulation(&snapshot, &rfm, "Champions", 0.1).unwrap();
    let second = simulation::run_campaign_simulation(&snapshot, &rfm, "Champions", 0.1).unwrap();
    assert_eq!(first, second);
}
