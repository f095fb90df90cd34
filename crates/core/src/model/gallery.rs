use serde::{Deserialize, Serialize};

use super::{ItemId, SegmentId};

/// One card of the horizontally scrollable gallery.
///
/// The card and detail payloads are carried for hosts; layout and selection
/// only look at `id` and `segment_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub id: ItemId,
    pub segment_id: SegmentId,
    pub card: Card,
    #[serde(default)]
    pub detail: Option<Detail>,
}

/// Card-face content.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Card {
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    /// Asset reference, resolved to a URL by the host.
    #[serde(default)]
    pub image: Option<String>,
}

/// Content of the panel shown next to the card while it is expanded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Detail {
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default)]
    pub body: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}
