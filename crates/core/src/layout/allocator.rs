use log::{debug, warn};
use serde::Serialize;

use crate::config::TimelineConfig;
use crate::model::{Segment, SegmentId};

/// Rounding error below which the width sum is left alone (px).
const SUM_EPSILON: f64 = 1e-9;

/// Split `container_width` between segments in proportion to their weights.
///
/// Returns one width per weight, in order. Gaps of `gap` px sit between
/// neighbouring segments, so in the normal case
/// `sum(widths) + (n - 1) * gap == container_width`. No width is ever below
/// `min_width`: segments whose share falls short are pinned to the minimum
/// and the rest of the budget is re-split among the others until no new
/// segment needs pinning.
///
/// Two inputs cannot satisfy both constraints and degrade instead of
/// failing:
///
/// * a container no wider than its gaps yields proportional widths over
///   `n * min_width`, so something is still drawable;
/// * when the minimums alone exceed the available width every segment gets
///   exactly `min_width` and the row overflows the container. Hosts can read
///   the excess from [`SegmentLayout::overflow`].
///
/// A weight of zero is treated as one.
pub fn allocate_widths(weights: &[u32], container_width: f64, min_width: f64, gap: f64) -> Vec<f64> {
    let n = weights.len();
    if n == 0 {
        return Vec::new();
    }
    let min_width = min_width.max(0.0);
    let weights: Vec<f64> = weights.iter().map(|&w| f64::from(w.max(1))).collect();
    let available = container_width - (n - 1) as f64 * gap;

    if available.is_nan() || available <= 0.0 {
        warn!(
            "timeline container of {container_width}px leaves no room for {n} segments; compressing"
        );
        let budget = available.max(n as f64 * min_width);
        return proportional(&weights, budget)
            .into_iter()
            .map(|w| w.max(min_width))
            .collect();
    }

    let mut widths = proportional(&weights, available);
    let mut pinned = vec![false; n];
    loop {
        let mut newly_pinned = false;
        for (i, width) in widths.iter().enumerate() {
            if !pinned[i] && *width < min_width {
                pinned[i] = true;
                newly_pinned = true;
            }
        }
        if !newly_pinned {
            break;
        }

        let pinned_count = pinned.iter().filter(|&&p| p).count();
        let remaining = available - pinned_count as f64 * min_width;
        if remaining < 0.0 {
            warn!(
                "{n} segments need {}px at minimum width but only {available}px is available; overflowing",
                n as f64 * min_width
            );
            return vec![min_width; n];
        }

        let free_weight: f64 = weights
            .iter()
            .zip(&pinned)
            .filter(|&(_, &p)| !p)
            .map(|(w, _)| w)
            .sum();
        if free_weight <= 0.0 {
            widths.iter_mut().for_each(|w| *w = min_width);
            break;
        }
        for (i, width) in widths.iter_mut().enumerate() {
            *width = if pinned[i] {
                min_width
            } else {
                weights[i] / free_weight * remaining
            };
        }
        debug!("pinned {pinned_count}/{n} segments to {min_width}px");
    }

    let sum: f64 = widths.iter().sum();
    let leftover = available - sum;
    if leftover.abs() > SUM_EPSILON && sum > 0.0 {
        for width in &mut widths {
            *width += leftover * (*width / sum);
        }
    }

    for width in &mut widths {
        if *width < min_width {
            *width = min_width;
        }
    }
    widths
}

fn proportional(weights: &[f64], budget: f64) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    weights.iter().map(|w| w / total * budget).collect()
}

/// Horizontal placement of one segment on the track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSlot {
    pub segment_id: SegmentId,
    /// Left edge, measured from the start of the track (px).
    pub x: f64,
    pub width: f64,
}

impl SegmentSlot {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// Allocated widths turned into positions. Recompute on container resize
/// or content reload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SegmentLayout {
    pub slots: Vec<SegmentSlot>,
    pub container_width: f64,
    pub gap: f64,
}

impl SegmentLayout {
    pub fn compute(segments: &[Segment], container_width: f64, config: &TimelineConfig) -> Self {
        let weights: Vec<u32> = segments.iter().map(|s| s.weight).collect();
        let widths = allocate_widths(
            &weights,
            container_width,
            config.min_segment_width,
            config.segment_gap,
        );

        let mut x = 0.0;
        let slots = segments
            .iter()
            .zip(widths)
            .map(|(segment, width)| {
                let slot = SegmentSlot {
                    segment_id: segment.id.clone(),
                    x,
                    width,
                };
                x += width + config.segment_gap;
                slot
            })
            .collect();

        Self {
            slots,
            container_width,
            gap: config.segment_gap,
        }
    }

    pub fn widths(&self) -> Vec<f64> {
        self.slots.iter().map(|s| s.width).collect()
    }

    /// Right edge of the last segment.
    pub fn total_width(&self) -> f64 {
        self.slots.last().map_or(0.0, SegmentSlot::right)
    }

    /// How far the track extends past the container (px). Non-zero only in
    /// the degenerate minimum-width case.
    pub fn overflow(&self) -> f64 {
        (self.total_width() - self.container_width).max(0.0)
    }

    pub fn slot(&self, segment_id: &str) -> Option<&SegmentSlot> {
        self.slots.iter().find(|s| s.segment_id == segment_id)
    }

    /// Hit-test a track position. Gaps between segments hit nothing.
    pub fn segment_at(&self, x: f64) -> Option<&SegmentId> {
        self.slots
            .iter()
            .find(|s| x >= s.x && x < s.right())
            .map(|s| &s.segment_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_protocol::Phase;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}"
        );
    }

    fn row_width(widths: &[f64], gap: f64) -> f64 {
        widths.iter().sum::<f64>() + (widths.len().saturating_sub(1)) as f64 * gap
    }

    #[test]
    fn basic_allocation_is_proportional() {
        let widths = allocate_widths(&[1, 1, 2], 400.0, 10.0, 4.0);
        assert_eq!(widths.len(), 3);
        assert_close(widths[0], 98.0, 1e-6);
        assert_close(widths[1], 98.0, 1e-6);
        assert_close(widths[2], 196.0, 1e-6);
        assert_close(row_width(&widths, 4.0), 400.0, 0.01);
    }

    #[test]
    fn too_many_minimums_overflow_at_min_width() {
        let widths = allocate_widths(&[1, 1, 1, 1, 1], 40.0, 10.0, 2.0);
        assert_eq!(widths, vec![10.0; 5]);
        assert!(row_width(&widths, 2.0) > 40.0);
    }

    #[test]
    fn small_segments_are_pinned_and_rest_redistributed() {
        // 1/103 of 480px is ~4.7px, below the 20px minimum.
        let weights = [1, 50, 50, 2];
        let widths = allocate_widths(&weights, 500.0, 20.0, 4.0);
        assert!(widths.iter().all(|&w| w >= 20.0 - 1e-9));
        assert_close(widths[0], 20.0, 1e-6);
        assert_close(widths[3], 20.0, 1e-6);
        assert_close(widths[1], widths[2], 1e-6);
        assert_close(row_width(&widths, 4.0), 500.0, 0.01);
    }

    #[test]
    fn redistribution_repeats_until_stable() {
        // Weight 4 starts at ~21px, then drops to ~19.5px once the weight-1
        // segment is pinned, so it has to be pinned in a second round.
        let widths = allocate_widths(&[1, 4, 33], 200.0, 20.0, 0.0);
        assert_close(widths[0], 20.0, 1e-6);
        assert_close(widths[1], 20.0, 1e-6);
        assert_close(widths[2], 160.0, 1e-6);
    }

    #[test]
    fn narrow_container_degrades_to_minimums() {
        let widths = allocate_widths(&[1, 1, 2], 0.0, 10.0, 4.0);
        assert_eq!(widths.len(), 3);
        assert!(widths.iter().all(|w| w.is_finite() && *w >= 10.0));
        assert_close(widths[2], 15.0, 1e-9);

        let negative = allocate_widths(&[3], -50.0, 12.0, 4.0);
        assert_eq!(negative, vec![12.0]);
    }

    #[test]
    fn single_segment_takes_everything() {
        let widths = allocate_widths(&[7], 321.5, 10.0, 4.0);
        assert_eq!(widths.len(), 1);
        assert_close(widths[0], 321.5, 1e-9);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(allocate_widths(&[], 300.0, 10.0, 4.0).is_empty());
    }

    #[test]
    fn same_input_same_output() {
        let weights = [5, 1, 9, 2, 2, 1, 13];
        let a = allocate_widths(&weights, 777.0, 18.0, 3.0);
        let b = allocate_widths(&weights, 777.0, 18.0, 3.0);
        assert_eq!(a, b);
    }

    #[test]
    fn invariants_hold_across_widths() {
        let weights = [3, 1, 1, 8, 2, 1, 1, 1, 5, 4];
        for container in [180.0, 260.0, 333.3, 640.0, 1024.0, 1920.0] {
            let widths = allocate_widths(&weights, container, 16.0, 4.0);
            let minimums = weights.len() as f64 * 16.0 + 9.0 * 4.0;
            assert!(widths.iter().all(|&w| w >= 16.0 - 1e-9), "container {container}");
            if container >= minimums {
                assert_close(row_width(&widths, 4.0), container, 0.01);
            }
        }
    }

    #[test]
    fn ratios_follow_weights_when_unconstrained() {
        let weights = [2, 3, 5, 7];
        let widths = allocate_widths(&weights, 2000.0, 10.0, 6.0);
        for i in 0..weights.len() {
            for j in 0..weights.len() {
                let expected = f64::from(weights[i]) / f64::from(weights[j]);
                let actual = widths[i] / widths[j];
                assert!((actual / expected - 1.0).abs() < 0.01);
            }
        }
    }

    fn segment(id: &str, weight: u32) -> Segment {
        Segment {
            id: id.into(),
            label: id.into(),
            phase: Phase::Design,
            weight,
            gallery_index: 0,
        }
    }

    #[test]
    fn layout_positions_include_gaps_and_hit_test() {
        let config = TimelineConfig {
            min_segment_width: 10.0,
            segment_gap: 4.0,
            ..TimelineConfig::default()
        };
        let segments = [segment("a", 1), segment("b", 1), segment("c", 2)];
        let layout = SegmentLayout::compute(&segments, 400.0, &config);
        assert_close(layout.slots[1].x, 102.0, 1e-6);
        assert_close(layout.slots[2].x, 204.0, 1e-6);
        assert_close(layout.total_width(), 400.0, 1e-6);
        assert_eq!(layout.overflow(), 0.0);
        assert_eq!(layout.segment_at(50.0).map(|s| s.as_str()), Some("a"));
        assert_eq!(layout.segment_at(100.0), None);
        assert_eq!(layout.segment_at(399.0).map(|s| s.as_str()), Some("c"));
        assert_eq!(layout.slot("b").map(|s| s.width), Some(layout.widths()[1]));
    }

    #[test]
    fn degenerate_layout_reports_overflow() {
        let config = TimelineConfig {
            min_segment_width: 10.0,
            segment_gap: 2.0,
            ..TimelineConfig::default()
        };
        let segments: Vec<Segment> = (0..5).map(|i| segment(&format!("s{i}"), 1)).collect();
        let layout = SegmentLayout::compute(&segments, 40.0, &config);
        assert_close(layout.overflow(), 18.0, 1e-9);
    }
}
