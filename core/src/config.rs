//! Analytics configuration — ingest settings and boundary defaults.
//!
//! Loaded once by the boundary from a JSON file; compiled defaults
//! apply when no file is given. Engines never read configuration
//! implicitly — every parameter they need arrives as an explicit
//! argument.

use crate::error::AnalyticsResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Seed for the deterministic discount generator.
    pub discount_seed: u64,
    /// Uniform discount range, as fractions of total_sales.
    pub discount_pct_min: f64,
    pub discount_pct_max: f64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            discount_seed: 42,
            discount_pct_min: 0.02,
            discount_pct_max: 0.15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub default_target_segment: String,
    pub default_discount: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            default_target_segment: "Champions".into(),
            default_discount: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub ingest: IngestConfig,
    pub simulation: SimulationConfig,
    /// Share of customers reported by the top-customer aggregation.
    pub top_n_percent: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            ingest: IngestConfig::default(),
            simulation: SimulationConfig::default(),
            top_n_percent: 0.10,
        }
    }
}

impl AnalyticsConfig {
    /// Load configuration from a JSON file. Absent keys fall back to
    /// their defaults; a missing or unreadable file is an error the
    /// boundary decides how to surface.
    pub fn load(path: &Path) -> AnalyticsResult<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("read config {}: {e}", path.display()))?;
        Ok(serde_json::from_str(&raw)?)
    }
}
