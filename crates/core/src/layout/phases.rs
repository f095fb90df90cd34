use atlas_protocol::Phase;
use log::warn;
use serde::Serialize;

use crate::model::Segment;

/// A contiguous run of same-phase segments and where its label goes.
///
/// Positions are measured from the left edge of the track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseGroup {
    pub phase: Phase,
    pub start: f64,
    pub end: f64,
    pub center: f64,
    pub segment_count: usize,
}

impl PhaseGroup {
    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Walk the segments left to right and open a group at every phase change.
///
/// Runs are only merged while adjacent: callers that want one group per
/// phase must order segments by phase first
/// ([`Timeline::grouped_by_phase`](crate::model::Timeline::grouped_by_phase)).
/// A group spans from its first segment's left edge to its last segment's
/// right edge, including the gaps inside the run but not the gaps around it.
pub fn group_phases(segments: &[Segment], widths: &[f64], gap: f64) -> Vec<PhaseGroup> {
    if widths.len() < segments.len() {
        warn!(
            "phase grouping got {} widths for {} segments; grouping the covered prefix",
            widths.len(),
            segments.len()
        );
    }

    let mut groups: Vec<PhaseGroup> = Vec::new();
    let mut cursor = 0.0;
    for (segment, &width) in segments.iter().zip(widths) {
        let start = cursor;
        let end = cursor + width;
        match groups.last_mut() {
            Some(group) if group.phase == segment.phase => {
                group.end = end;
                group.segment_count += 1;
            }
            _ => groups.push(PhaseGroup {
                phase: segment.phase,
                start,
                end,
                center: 0.0,
                segment_count: 1,
            }),
        }
        cursor = end + gap;
    }

    for group in &mut groups {
        group.center = group.start + (group.end - group.start) / 2.0;
    }
    groups
}
