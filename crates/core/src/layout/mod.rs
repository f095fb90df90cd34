//! Timeline geometry: how wide each segment is and where phase labels go.

pub mod allocator;
pub mod phases;

pub use allocator::{SegmentLayout, SegmentSlot, allocate_widths};
pub use phases::{PhaseGroup, group_phases};
