//! Shared primitive types used across the analytics engine.

/// A stable customer identity from the source dataset.
pub type CustomerId = String;

/// A purchase event identifier. Several rows may share one invoice
/// (one row per category line); the engines treat the invoice as the
/// unit of "a purchase".
pub type InvoiceNo = String;
