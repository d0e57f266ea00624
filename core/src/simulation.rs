//! Campaign simulation engine — revenue/cost/ROI projection for a
//! discount campaign aimed at one behavioral segment.

use crate::{
    aggregation::customer_net_sales,
    error::{AnalyticsError, AnalyticsResult},
    segmentation::RfmRecord,
    snapshot::TransactionSnapshot,
};
use serde::Serialize;
use std::collections::HashSet;

/// Assumed sales uplift from running a campaign. Policy constant, not
/// a fitted parameter.
pub const UPLIFT_FACTOR: f64 = 1.10;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CampaignProjection {
    pub projected_revenue: f64,
    pub campaign_cost: f64,
    /// ROI as a percentage.
    pub projected_roi: f64,
    pub customer_count: usize,
}

impl CampaignProjection {
    /// The documented result for a target segment with no customers.
    pub fn zero() -> Self {
        Self {
            projected_revenue: 0.0,
            campaign_cost: 0.0,
            projected_roi: 0.0,
            customer_count: 0,
        }
    }
}

/// Project campaign outcomes for `target_segment` at `discount`
/// (a fraction of projected revenue spent on the campaign).
///
/// An unknown or empty target segment yields the zero-valued
/// projection, not an error.
pub fn run_campaign_simulation(
    snapshot: &TransactionSnapshot,
    rfm: &[RfmRecord],
    target_segment: &str,
    discount: f64,
) -> AnalyticsResult<CampaignProjection> {
    if snapshot.is_empty() {
        return Err(AnalyticsError::EmptySnapshot);
    }

    let targets: HashSet<&str> = rfm
        .iter()
        .filter(|r| r.segment_name == target_segment)
        .map(|r| r.customer_id.as_str())
        .collect();
    if targets.is_empty() {
        return Ok(CampaignProjection::zero());
    }

    let totals = customer_net_sales(snapshot.rows());
    let mut segment_total = 0.0;
    let mut customer_count = 0usize;
    for (customer_id, total) in &totals {
        if targets.contains(customer_id.as_str()) {
            segment_total += total;
            customer_count += 1;
        }
    }
    if customer_count == 0 {
        return Ok(CampaignProjection::zero());
    }

    let avg_spend = segment_total / customer_count as f64;
    let projected_revenue = avg_spend * customer_count as f64 * UPLIFT_FACTOR;
    let campaign_cost = projected_revenue * discount;
    let net_profit = projected_revenue - campaign_cost;

    // Inherited policy: the ROI numerator subtracts the campaign cost
    // a second time, on top of the subtraction already inside
    // net_profit. Do not fold this into net_profit.
    let projected_roi = if campaign_cost > 0.0 {
        (net_profit - campaign_cost) / campaign_cost * 100.0
    } else {
        0.0
    };

    Ok(CampaignProjection {
        projected_revenue,
        campaign_cost,
        projected_roi,
        customer_count,
    })
}
