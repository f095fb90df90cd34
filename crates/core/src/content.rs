use log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::config::{ConfigError, TimelineConfig};
use crate::model::{GalleryItem, Method, Timeline, TimelineError};

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("invalid atlas JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("timeline: {0}")]
    Timeline(#[from] TimelineError),
    #[error("config: {0}")]
    Config(#[from] ConfigError),
}

/// On-disk shape of an atlas export.
#[derive(Debug, Deserialize)]
struct AtlasDocument {
    #[serde(default)]
    config: Option<TimelineConfig>,
    /// Stable-sort segments into phase order before building the timeline.
    #[serde(default)]
    group_by_phase: bool,
    methods: Vec<Method>,
    items: Vec<GalleryItem>,
}

/// A loaded atlas: the timeline plus the configuration it asked for.
#[derive(Debug, Clone)]
pub struct Atlas {
    pub config: TimelineConfig,
    pub timeline: Timeline,
}

/// Parse an atlas JSON export and build its timeline.
///
/// ```json
/// {
///   "group_by_phase": true,
///   "config": { "segment_gap": 6 },
///   "methods": [{ "id": "interviews", "label": "Interviews", "phase": "research" }],
///   "items": [{ "id": "case-1", "segment_id": "interviews", "card": { "title": "…" } }]
/// }
/// ```
pub fn load_atlas(data: &[u8]) -> Result<Atlas, ContentError> {
    let doc: AtlasDocument = serde_json::from_slice(data)?;
    let config = doc.config.unwrap_or_default();
    config.validate()?;

    let mut timeline = Timeline::from_items(doc.methods, doc.items)?;
    if doc.group_by_phase {
        timeline = timeline.grouped_by_phase();
    }
    debug!(
        "loaded atlas: {} segments, {} gallery items",
        timeline.segments().len(),
        timeline.items().len()
    );
    Ok(Atlas { config, timeline })
}
