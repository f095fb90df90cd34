//! Browser bridge. The page owns one [`AtlasHandle`] per gallery, reports
//! measured card geometry and scroll / frame / click events to it, and
//! applies the returned JSON (`Reaction`, layout, render commands).

use atlas_core::interaction::ItemGeometry;
use atlas_core::layout::{SegmentLayout, group_phases};
use atlas_core::views::timeline::render_timeline;
use atlas_core::{GeometryRegistry, SelectionCoordinator, TimelineConfig, load_atlas};
use atlas_protocol::Viewport;
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Proportional segment widths for a bare weight list.
#[wasm_bindgen]
pub fn allocate_widths(weights: &[u32], container_width: f64, min_width: f64, gap: f64) -> Vec<f64> {
    atlas_core::allocate_widths(weights, container_width, min_width, gap)
}

#[derive(Serialize)]
struct TrackLayout<'a> {
    layout: &'a SegmentLayout,
    groups: Vec<atlas_core::PhaseGroup>,
    overflow: f64,
}

/// One atlas gallery plus its timeline, owned by the page.
#[wasm_bindgen]
pub struct AtlasHandle {
    coordinator: SelectionCoordinator,
    layout: SegmentLayout,
}

#[wasm_bindgen]
impl AtlasHandle {
    /// Load an atlas export. Card geometry starts out as the uniform strip
    /// described by the config until the page reports measurements.
    #[wasm_bindgen(constructor)]
    pub fn new(atlas_json: &[u8], viewport_width: f64) -> Result<AtlasHandle, JsError> {
        let atlas = load_atlas(atlas_json).map_err(|e| JsError::new(&e.to_string()))?;
        let geometry = GeometryRegistry::for_timeline(&atlas.timeline, &atlas.config, viewport_width);
        let coordinator = SelectionCoordinator::new(atlas.timeline, geometry, atlas.config);
        Ok(Self {
            coordinator,
            layout: SegmentLayout::default(),
        })
    }

    /// Replace the content, keeping whatever selection still applies.
    pub fn reload(&mut self, atlas_json: &[u8]) -> Result<String, JsError> {
        let atlas = load_atlas(atlas_json).map_err(|e| JsError::new(&e.to_string()))?;
        let viewport_width = self.coordinator.geometry().viewport_width();
        let geometry = GeometryRegistry::for_timeline(&atlas.timeline, &atlas.config, viewport_width);
        self.coordinator.set_config(atlas.config);
        let reaction = self.coordinator.set_timeline(atlas.timeline, geometry);
        to_json(&reaction)
    }

    /// Switch to measured geometry: forget the uniform strip.
    pub fn clear_geometry(&mut self) {
        self.coordinator.geometry_mut().clear();
    }

    /// Report a card's measured position inside the scroll container.
    pub fn set_item_geometry(&mut self, item_id: &str, left: f64, width: f64, expanded_width: f64) {
        self.coordinator.geometry_mut().set(
            item_id.into(),
            ItemGeometry {
                left,
                width,
                expanded_width,
            },
        );
    }

    /// The gallery container was resized.
    pub fn resize_gallery(&mut self, viewport_width: f64) {
        self.coordinator.resize(viewport_width);
    }

    /// Recompute segment widths and phase label positions for a timeline
    /// track of `container_width`. Returns `{ layout, groups, overflow }`.
    pub fn layout_track(&mut self, container_width: f64) -> Result<String, JsError> {
        let config: &TimelineConfig = self.coordinator.config();
        let segments = self.coordinator.timeline().segments();
        self.layout = SegmentLayout::compute(segments, container_width, config);
        let groups = group_phases(segments, &self.layout.widths(), self.layout.gap);
        to_json(&TrackLayout {
            layout: &self.layout,
            groups,
            overflow: self.layout.overflow(),
        })
    }

    /// Render commands for the timeline track, as JSON.
    pub fn render_track(&self, width: f64, height: f64, dpr: f64) -> Result<String, JsError> {
        let timeline = self.coordinator.timeline();
        let groups = group_phases(timeline.segments(), &self.layout.widths(), self.layout.gap);
        let viewport = Viewport {
            x: 0.0,
            y: 0.0,
            width,
            height,
            dpr,
        };
        let commands = render_timeline(
            timeline,
            &self.layout,
            &groups,
            self.coordinator.state(),
            &viewport,
        );
        to_json(&commands)
    }

    /// Segment under a track x position, if any.
    pub fn segment_at(&self, x: f64) -> Option<String> {
        self.layout.segment_at(x).map(ToString::to_string)
    }

    pub fn on_scroll(&mut self, scroll_left: f64, now: f64) -> Result<String, JsError> {
        to_json(&self.coordinator.on_scroll(scroll_left, now))
    }

    pub fn on_frame(&mut self, scroll_left: f64, now: f64) -> Result<String, JsError> {
        to_json(&self.coordinator.on_frame(scroll_left, now))
    }

    pub fn click_segment(&mut self, segment_id: &str, now: f64) -> Result<String, JsError> {
        to_json(&self.coordinator.click_segment(segment_id, now))
    }

    pub fn click_item(&mut self, item_id: &str, now: f64) -> Result<String, JsError> {
        to_json(&self.coordinator.click_item(item_id, now))
    }

    pub fn collapse(&mut self) -> Result<String, JsError> {
        to_json(&self.coordinator.collapse())
    }

    /// Whether a `requestAnimationFrame` loop started for `generation`
    /// should keep polling.
    pub fn is_current_scroll(&self, generation: u64) -> bool {
        self.coordinator.is_current_scroll(generation)
    }

    pub fn selection(&self) -> Result<String, JsError> {
        to_json(self.coordinator.state())
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATLAS: &[u8] = br#"{
        "methods": [
            { "id": "m1", "label": "Interviews", "phase": "research" },
            { "id": "m2", "label": "Sketching", "phase": "ideation" }
        ],
        "items": [
            { "id": "a", "segment_id": "m1", "card": { "title": "A" } },
            { "id": "b", "segment_id": "m2", "card": { "title": "B" } }
        ]
    }"#;

    fn handle() -> AtlasHandle {
        let Ok(handle) = AtlasHandle::new(ATLAS, 400.0) else {
            panic!("atlas should load");
        };
        handle
    }

    /// Handle switched over to page-measured card positions.
    fn measured_handle() -> AtlasHandle {
        let mut h = handle();
        h.clear_geometry();
        h.set_item_geometry("a", 0.0, 200.0, 500.0);
        h.set_item_geometry("b", 600.0, 200.0, 500.0);
        h
    }

    fn parse(json: Result<String, JsError>) -> serde_json::Value {
        let Ok(json) = json else {
            panic!("bridge call failed");
        };
        match serde_json::from_str(&json) {
            Ok(value) => value,
            Err(e) => panic!("bridge returned invalid JSON {json}: {e}"),
        }
    }

    #[test]
    fn measured_geometry_drives_segment_clicks() {
        let mut h = measured_handle();
        let reaction = parse(h.click_segment("m2", 0.0));
        assert_eq!(reaction["scroll"]["target"], 600.0);
        assert_eq!(reaction["scroll"]["item_id"], "b");
        let Some(generation) = reaction["scroll"]["generation"].as_u64() else {
            panic!("scroll without generation: {reaction}");
        };
        assert!(h.is_current_scroll(generation));
    }

    #[test]
    fn measured_geometry_is_centred_on_expand() {
        let mut h = measured_handle();
        let reaction = parse(h.click_item("b", 0.0));
        // 600 + 500 / 2 - 400 / 2
        assert_eq!(reaction["scroll"]["target"], 650.0);
        assert_eq!(reaction["scroll"]["align"], "center");
        let selection = parse(h.selection());
        assert_eq!(selection["expanded_item"], "b");
    }

    #[test]
    fn track_layout_json_has_groups() {
        let mut h = handle();
        let value = parse(h.layout_track(400.0));
        assert_eq!(value["groups"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["overflow"], 0.0);
        assert_eq!(h.segment_at(1.0).as_deref(), Some("m1"));
    }

    #[test]
    fn reload_applies_the_embedded_config() {
        let mut h = handle();
        let reloaded = br#"{
            "config": { "segment_gap": 10, "collapse_threshold": 120 },
            "methods": [
                { "id": "m1", "label": "Interviews", "phase": "research" },
                { "id": "m2", "label": "Sketching", "phase": "ideation" }
            ],
            "items": [
                { "id": "a", "segment_id": "m1", "card": { "title": "A" } },
                { "id": "b", "segment_id": "m2", "card": { "title": "B" } }
            ]
        }"#;
        parse(h.reload(reloaded));
        assert_eq!(h.coordinator.config().segment_gap, 10.0);
        assert_eq!(h.coordinator.config().collapse_threshold, 120.0);

        let value = parse(h.layout_track(410.0));
        assert_eq!(value["layout"]["gap"], 10.0);
        let Some(slots) = value["layout"]["slots"].as_array() else {
            panic!("layout without slots: {value}");
        };
        assert_eq!(slots[1]["x"], 210.0);
    }
}
