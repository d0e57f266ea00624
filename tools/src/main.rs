//! insights-runner: headless analytics runner for Retail Insights.
//!
//! Usage:
//!   insights-runner --input data/customer_shopping_data.csv
//!   insights-runner --input data.csv --db processed.db --json report.json
//!   insights-runner --input data.csv --target-segment "Loyal Customers" --discount 0.2

use anyhow::{bail, Result};
use retail_core::{
    aggregation::{
        self, CategoryDiscountImpact, CustomerTypeSales, MonthlySales, PaymentMethodShare,
        StorePerformance, TopCustomer, ValueSegmentation,
    },
    config::AnalyticsConfig,
    ingest,
    segmentation::{self, RfmRecord, SegmentCategorySales},
    simulation::{self, CampaignProjection},
    snapshot::TransactionSnapshot,
    store::SnapshotStore,
};
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Serialize)]
struct InsightsReport {
    store_performance: Vec<StorePerformance>,
    top_customers: Vec<TopCustomer>,
    value_segmentation: ValueSegmentation,
    discount_impact: Vec<CategoryDiscountImpact>,
    seasonality: Vec<MonthlySales>,
    payment_method_mix: Vec<PaymentMethodShare>,
    repeat_vs_onetime: Vec<CustomerTypeSales>,
    rfm: Vec<RfmRecord>,
    category_by_segment: Vec<SegmentCategorySales>,
    campaign: CampaignProjection,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let input = match str_arg(&args, "--input") {
        Some(p) => p.to_string(),
        None => bail!(
            "Usage: insights-runner --input <csv> [--db <path>] [--config <json>] \
             [--seed <u64>] [--target-segment <name>] [--discount <f>] [--json <path>]"
        ),
    };
    let db = str_arg(&args, "--db").unwrap_or(":memory:").to_string();
    let config_path = str_arg(&args, "--config").map(str::to_string);
    let json_out = str_arg(&args, "--json").map(str::to_string);

    let mut config = match &config_path {
        Some(p) => AnalyticsConfig::load(Path::new(p))?,
        None => AnalyticsConfig::default(),
    };
    config.ingest.discount_seed = parse_arg(&args, "--seed", config.ingest.discount_seed);

    let target_segment = str_arg(&args, "--target-segment")
        .unwrap_or(&config.simulation.default_target_segment)
        .to_string();
    let discount = parse_arg(&args, "--discount", config.simulation.default_discount);

    println!("Retail Insights — insights-runner");
    println!("  input:   {input}");
    println!("  db:      {db}");
    println!("  seed:    {}", config.ingest.discount_seed);
    println!("  target:  {target_segment}");
    println!("  discount: {discount}");
    println!();

    let mut store = if db == ":memory:" {
        SnapshotStore::in_memory()?
    } else {
        SnapshotStore::open(&db)?
    };
    store.migrate()?;

    let outcome = ingest::ingest_csv(Path::new(&input), &config.ingest)?;
    if outcome.transactions.is_empty() {
        bail!(
            "no usable rows in {input} ({} rejected)",
            outcome.rows_rejected
        );
    }
    store.insert_transactions(&outcome.transactions)?;
    let snapshot = store.load_snapshot()?;

    let report = build_report(&snapshot, &config, &target_segment, discount)?;
    print_summary(&snapshot, &report);

    if let Some(path) = json_out {
        fs::write(&path, serde_json::to_string_pretty(&report)?)?;
        log::info!("report written to {path}");
    }

    Ok(())
}

fn build_report(
    snapshot: &TransactionSnapshot,
    config: &AnalyticsConfig,
    target_segment: &str,
    discount: f64,
) -> Result<InsightsReport> {
    let rfm = segmentation::calculate_rfm(snapshot)?;
    let category_by_segment = segmentation::category_by_segment(snapshot, &rfm)?;
    let campaign = simulation::run_campaign_simulation(snapshot, &rfm, target_segment, discount)?;

    Ok(InsightsReport {
        store_performance: aggregation::store_performance(snapshot)?,
        top_customers: aggregation::top_customers(snapshot, config.top_n_percent)?,
        value_segmentation: aggregation::value_segmentation(snapshot)?,
        discount_impact: aggregation::discount_impact(snapshot)?,
        seasonality: aggregation::seasonality(snapshot)?,
        payment_method_mix: aggregation::payment_method_mix(snapshot)?,
        repeat_vs_onetime: aggregation::repeat_vs_onetime(snapshot)?,
        rfm,
        category_by_segment,
        campaign,
    })
}

fn print_summary(snapshot: &TransactionSnapshot, report: &InsightsReport) {
    let total_customers = report.rfm.len();
    let total_net: f64 = report.rfm.iter().map(|r| r.monetary).sum();

    println!("=== OVERVIEW ===");
    println!("  transactions:   {}", snapshot.len());
    println!("  customers:      {total_customers}");
    println!("  net sales:      ${total_net:.2}");
    if total_customers > 0 {
        println!(
            "  avg / customer: ${:.2}",
            total_net / total_customers as f64
        );
    }

    println!();
    println!("=== STORE PERFORMANCE ===");
    for row in &report.store_performance {
        println!(
            "  {:<24} total ${:>12.2}  avg ${:>8.2}",
            row.shopping_mall, row.total_net_sales, row.avg_net_sales
        );
    }

    println!();
    println!("=== DISCOUNT IMPACT BY CATEGORY ===");
    for row in &report.discount_impact {
        println!(
            "  {:<20} gross ${:>12.2}  discount ${:>10.2}  net ${:>12.2}",
            row.category, row.total_sales, row.total_discount, row.net_sales
        );
    }

    println!();
    println!("=== PAYMENT METHOD MIX ===");
    for row in &report.payment_method_mix {
        println!("  {:<16} {:>5.1}%", row.payment_method, row.share * 100.0);
    }

    println!();
    println!("=== VALUE SEGMENTATION ===");
    println!(
        "  median spend ${:.2} | Low-Value: {} | High-Value: {}",
        report.value_segmentation.median_spend,
        report.value_segmentation.low_value,
        report.value_segmentation.high_value
    );

    println!();
    println!("=== RFM SEGMENTS ===");
    for name in segmentation::REPORTED_SEGMENTS
        .iter()
        .chain(["Lost Customers"].iter())
    {
        let count = report.rfm.iter().filter(|r| r.segment_name == *name).count();
        println!("  {name:<20} {count}");
    }

    println!();
    println!("=== CAMPAIGN PROJECTION ===");
    println!(
        "  customers: {} | revenue ${:.2} | cost ${:.2} | ROI {:.1}%",
        report.campaign.customer_count,
        report.campaign.projected_revenue,
        report.campaign.campaign_cost,
        report.campaign.projected_roi
    );
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
