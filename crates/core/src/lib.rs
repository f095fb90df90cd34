//! Core of the workflow atlas timeline: the proportional segment layout,
//! phase label placement, and the selection coordinator that keeps the
//! timeline and the gallery strip in sync.
//!
//! Nothing here touches a UI toolkit. Hosts feed measured geometry and
//! input events in, and get render commands, scroll commands and selection
//! state back.

pub mod config;
pub mod content;
pub mod interaction;
pub mod layout;
pub mod model;
pub mod svg;
pub mod views;

pub use config::TimelineConfig;
pub use content::{Atlas, load_atlas};
pub use interaction::{GeometryRegistry, Reaction, SelectionCoordinator};
pub use layout::{PhaseGroup, SegmentLayout, allocate_widths, group_phases};
pub use model::{GalleryItem, Method, Segment, SelectionState, Timeline};
