//! Quantile helpers with explicit, documented semantics.
//!
//! RULE: every quantile in the engine goes through this module.
//! Boundaries use linear interpolation between order statistics and
//! bins are right-closed: a value equal to a boundary falls in the
//! lower bin. No statistical library's undocumented tie handling is
//! relied on anywhere.

use crate::error::{AnalyticsError, AnalyticsResult};

/// Linear-interpolated percentile of a sorted, non-empty slice.
/// `q` must be in [0, 1].
pub fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let pos = (sorted.len() - 1) as f64 * q;
    let lo = pos.floor() as usize;
    let frac = pos - lo as f64;
    if lo + 1 < sorted.len() {
        sorted[lo] + frac * (sorted[lo + 1] - sorted[lo])
    } else {
        sorted[lo]
    }
}

/// Median of an unsorted, non-empty set of values.
/// Even-sized inputs interpolate between the two middle values.
pub fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentile_sorted(&sorted, 0.5)
}

/// The three interior quartile boundaries of `values`.
///
/// Fails with `InsufficientQuartileData` when the five bin edges
/// (min, q1, q2, q3, max) are not strictly increasing — a population
/// that cannot support four score levels must never be scored with
/// fewer levels silently.
pub fn quartile_edges(values: &[f64], metric: &'static str) -> AnalyticsResult<[f64; 3]> {
    if values.is_empty() {
        return Err(AnalyticsError::InsufficientQuartileData { metric });
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let q1 = percentile_sorted(&sorted, 0.25);
    let q2 = percentile_sorted(&sorted, 0.50);
    let q3 = percentile_sorted(&sorted, 0.75);

    let edges = [sorted[0], q1, q2, q3, sorted[sorted.len() - 1]];
    if edges.windows(2).any(|w| w[0] >= w[1]) {
        return Err(AnalyticsError::InsufficientQuartileData { metric });
    }
    Ok([q1, q2, q3])
}

/// Right-closed bin index (1–4) of `value` against interior edges.
pub fn quartile_bin(value: f64, edges: &[f64; 3]) -> u8 {
    if value <= edges[0] {
        1
    } else if value <= edges[1] {
        2
    } else if value <= edges[2] {
        3
    } else {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates_between_order_statistics() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!((percentile_sorted(&sorted, 0.5) - 2.5).abs() < 1e-12);
        assert!((percentile_sorted(&sorted, 0.25) - 1.75).abs() < 1e-12);
        assert!((percentile_sorted(&sorted, 1.0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn median_of_even_count_is_midpoint() {
        assert!((median(&[100.0, 300.0, 200.0, 400.0]) - 250.0).abs() < 1e-12);
    }

    #[test]
    fn quartile_edges_reject_collapsed_bins() {
        // Heavy low-end ties collapse min and q1 into the same edge.
        let tied = [10.0, 10.0, 10.0, 10.0, 20.0, 30.0, 40.0, 50.0];
        assert!(matches!(
            quartile_edges(&tied, "monetary"),
            Err(AnalyticsError::InsufficientQuartileData { metric: "monetary" })
        ));
    }

    #[test]
    fn quartile_bins_are_right_closed() {
        let edges = quartile_edges(
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
            "recency",
        )
        .unwrap();
        // edges = [2.75, 4.5, 6.25]
        assert_eq!(quartile_bin(2.75, &edges), 1);
        assert_eq!(quartile_bin(2.76, &edges), 2);
        assert_eq!(quartile_bin(4.5, &edges), 2);
        assert_eq!(quartile_bin(8.0, &edges), 4);
    }
}
