//! Retail Insights core — customer analytics over an immutable
//! transaction snapshot.
//!
//! RULE: engines are pure. Every call takes the snapshot (and any
//! derived table it needs) as an explicit argument and allocates
//! fresh output; nothing in this crate holds process-wide state.
//! The boundary binary in tools/ owns the snapshot lifecycle:
//! ingest once, load once, immutable thereafter.

pub mod aggregation;
pub mod config;
pub mod error;
pub mod ingest;
pub mod rng;
pub mod segmentation;
pub mod simulation;
pub mod snapshot;
pub mod stats;
pub mod store;
pub mod types;
