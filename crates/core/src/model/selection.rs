use serde::{Deserialize, Serialize};

use super::{ItemId, SegmentId};

/// Highlight / focus / expansion state shared between timeline and gallery.
///
/// While `expanded_item` is set, `active_segment` is the segment owning it.
/// Otherwise `active_segment` follows the segment of `focused_item`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionState {
    pub active_segment: Option<SegmentId>,
    pub focused_item: Option<ItemId>,
    pub expanded_item: Option<ItemId>,
}

impl SelectionState {
    pub fn is_expanded(&self, item: &ItemId) -> bool {
        self.expanded_item.as_ref() == Some(item)
    }

    pub fn is_active(&self, segment: &SegmentId) -> bool {
        self.active_segment.as_ref() == Some(segment)
    }
}
