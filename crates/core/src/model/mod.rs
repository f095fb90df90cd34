pub mod gallery;
pub mod segment;
pub mod selection;
pub mod timeline;

use atlas_protocol::Ident;

pub use gallery::{Card, Detail, GalleryItem};
pub use segment::{Method, Segment};
pub use selection::SelectionState;
pub use timeline::{Timeline, TimelineError};

/// Identifier of a timeline segment (one method of the atlas).
pub type SegmentId = Ident;
/// Identifier of a gallery card.
pub type ItemId = Ident;
