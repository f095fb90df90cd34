use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::TimelineConfig;
use crate::model::{ItemId, Timeline};

/// Measured placement of one gallery card inside the scroll container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemGeometry {
    /// Left edge relative to the scrollable content (px).
    pub left: f64,
    /// Collapsed card width (px).
    pub width: f64,
    /// Card plus detail panel width while expanded (px).
    pub expanded_width: f64,
}

impl ItemGeometry {
    pub fn effective_width(&self, expanded: bool) -> f64 {
        if expanded {
            self.expanded_width
        } else {
            self.width
        }
    }
}

/// Id → geometry map for the gallery strip, written by the host and read by
/// the coordinator.
///
/// Hosts that measure real elements call [`set`](Self::set) after layout.
/// Registries built with [`uniform`](Self::uniform) lay the cards out
/// themselves and shift following cards whenever the expanded card changes.
#[derive(Debug, Clone, Default)]
pub struct GeometryRegistry {
    order: Vec<ItemId>,
    items: HashMap<ItemId, ItemGeometry>,
    viewport_width: f64,
    expanded: Option<ItemId>,
    /// Gap used to re-flow a self-managed strip; `None` for measured strips.
    flow_gap: Option<f64>,
}

impl GeometryRegistry {
    pub fn new(viewport_width: f64) -> Self {
        Self {
            viewport_width,
            ..Self::default()
        }
    }

    /// A strip of equally sized cards separated by `gap`.
    pub fn uniform<'a>(
        ids: impl IntoIterator<Item = &'a ItemId>,
        card_width: f64,
        detail_width: f64,
        gap: f64,
        viewport_width: f64,
    ) -> Self {
        let mut registry = Self::new(viewport_width);
        for id in ids {
            registry.set(
                id.clone(),
                ItemGeometry {
                    left: 0.0,
                    width: card_width,
                    expanded_width: card_width + detail_width,
                },
            );
        }
        registry.flow_gap = Some(gap);
        registry.reflow();
        registry
    }

    /// Uniform strip for every card of `timeline`, sized from `config`.
    pub fn for_timeline(timeline: &Timeline, config: &TimelineConfig, viewport_width: f64) -> Self {
        Self::uniform(
            timeline.items().iter().map(|item| &item.id),
            config.card_width,
            config.detail_width,
            config.card_gap,
            viewport_width,
        )
    }

    /// Insert or replace a card's geometry. New cards are appended to the
    /// strip order.
    pub fn set(&mut self, id: ItemId, geometry: ItemGeometry) {
        if self.items.insert(id.clone(), geometry).is_none() {
            self.order.push(id);
        }
    }

    pub fn remove(&mut self, id: &str) {
        if self.items.remove(id).is_some() {
            self.order.retain(|known| known != id);
        }
        if self.expanded.as_ref().is_some_and(|e| e == id) {
            self.expanded = None;
        }
    }

    /// Forget every card. The registry then holds measured geometry only:
    /// expanding a card no longer re-flows the strip.
    pub fn clear(&mut self) {
        self.order.clear();
        self.items.clear();
        self.expanded = None;
        self.flow_gap = None;
    }

    pub fn get(&self, id: &str) -> Option<&ItemGeometry> {
        self.items.get(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Cards in strip order.
    pub fn ids(&self) -> &[ItemId] {
        &self.order
    }

    pub fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    pub fn set_viewport_width(&mut self, width: f64) {
        self.viewport_width = width.max(0.0);
    }

    pub fn expanded(&self) -> Option<&ItemId> {
        self.expanded.as_ref()
    }

    /// Record which card is expanded; self-managed strips re-flow.
    pub fn set_expanded(&mut self, id: Option<&ItemId>) {
        self.expanded = id.cloned();
        self.reflow();
    }

    fn reflow(&mut self) {
        let Some(gap) = self.flow_gap else {
            return;
        };
        let mut left = 0.0;
        for id in &self.order {
            if let Some(geometry) = self.items.get_mut(id) {
                geometry.left = left;
                let expanded = self.expanded.as_ref() == Some(id);
                left += geometry.effective_width(expanded) + gap;
            }
        }
    }

    fn effective_width_of(&self, id: &ItemId, geometry: &ItemGeometry) -> f64 {
        geometry.effective_width(self.expanded.as_ref() == Some(id))
    }

    /// Right edge of the furthest card.
    pub fn content_width(&self) -> f64 {
        self.order
            .iter()
            .filter_map(|id| self.items.get(id).map(|g| g.left + self.effective_width_of(id, g)))
            .fold(0.0, f64::max)
    }

    pub fn max_scroll(&self) -> f64 {
        (self.content_width() - self.viewport_width).max(0.0)
    }

    pub fn clamp_scroll(&self, offset: f64) -> f64 {
        offset.clamp(0.0, self.max_scroll())
    }

    /// The card whose left edge is closest to the viewport's left edge.
    /// Ties go to the earlier card.
    pub fn nearest_item(&self, scroll_left: f64) -> Option<&ItemId> {
        let mut best: Option<(&ItemId, f64)> = None;
        for id in &self.order {
            let Some(geometry) = self.items.get(id) else {
                continue;
            };
            let distance = (geometry.left - scroll_left).abs();
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((id, distance));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Hit-test a position in content coordinates.
    pub fn item_at(&self, x: f64) -> Option<&ItemId> {
        self.order.iter().find(|id| {
            self.items.get(*id).is_some_and(|g| {
                let width = self.effective_width_of(id, g);
                x >= g.left && x < g.left + width
            })
        })
    }

    /// Scroll offset that puts the card's left edge at the viewport's left
    /// edge.
    pub fn start_offset(&self, id: &str) -> Option<f64> {
        self.items.get(id).map(|g| g.left)
    }

    /// Scroll offset that centres the card, using its expanded footprint
    /// when `expanded` is set.
    pub fn center_offset(&self, id: &str, expanded: bool) -> Option<f64> {
        self.items
            .get(id)
            .map(|g| g.left + g.effective_width(expanded) / 2.0 - self.viewport_width / 2.0)
    }
}
