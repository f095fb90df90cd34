use atlas_protocol::Phase;
use serde::{Deserialize, Serialize};

use super::SegmentId;

/// A method as described by the content source, before any gallery items
/// have been counted against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub id: SegmentId,
    pub label: String,
    pub phase: Phase,
}

/// One unit of the timeline.
///
/// Built by [`Timeline`](super::Timeline) from the gallery; never empty
/// (`weight >= 1`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub label: String,
    pub phase: Phase,
    /// Number of gallery items that reference this segment.
    pub weight: u32,
    /// Index of the first gallery item belonging to this segment.
    pub gallery_index: usize,
}
