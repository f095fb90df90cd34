use atlas_protocol::{ScrollAlign, ScrollBehavior, ScrollCommand};
use log::{debug, warn};
use serde::Serialize;

use super::geometry::GeometryRegistry;
use super::settle::{SettleDetector, SettleStatus};
use crate::config::TimelineConfig;
use crate::model::{ItemId, SegmentId, SelectionState, Timeline};

/// What the host has to do after an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reaction {
    /// Scroll the gallery container here, if set.
    pub scroll: Option<ScrollCommand>,
    /// Highlight, focus or expansion changed; re-render.
    pub selection_changed: bool,
    /// A programmatic scroll finished (or timed out) on this frame.
    pub settled: bool,
}

/// State machine behind the timeline ⇄ gallery synchronisation.
///
/// Two modes: idle, where the timeline highlight follows whichever card is
/// nearest the left edge of the gallery viewport, and expanded, where the
/// highlight is locked to the expanded card's segment. Every event handler
/// runs to completion and leaves the [`SelectionState`] invariants intact.
#[derive(Debug, Clone)]
pub struct SelectionCoordinator {
    timeline: Timeline,
    geometry: GeometryRegistry,
    settle: SettleDetector,
    config: TimelineConfig,
    state: SelectionState,
    scroll_left: f64,
    /// Scroll position the expanded card was last brought to; manual
    /// displacement is measured from here.
    expand_anchor: Option<f64>,
    /// Candidate focus waiting out the debounce window, with the time it
    /// was first seen.
    pending_focus: Option<(ItemId, f64)>,
    /// Keep a timeline-click highlight until the user scrolls by hand.
    pin_active: bool,
}

impl SelectionCoordinator {
    pub fn new(timeline: Timeline, geometry: GeometryRegistry, config: TimelineConfig) -> Self {
        let mut coordinator = Self {
            settle: SettleDetector::from_config(&config),
            timeline,
            geometry,
            config,
            state: SelectionState::default(),
            scroll_left: 0.0,
            expand_anchor: None,
            pending_focus: None,
            pin_active: false,
        };
        coordinator.focus_now();
        coordinator
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn geometry(&self) -> &GeometryRegistry {
        &self.geometry
    }

    /// Hosts that measure real elements update geometry through this.
    pub fn geometry_mut(&mut self) -> &mut GeometryRegistry {
        &mut self.geometry
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn scroll_left(&self) -> f64 {
        self.scroll_left
    }

    /// Whether a scroll issued by the coordinator is still settling.
    pub fn is_programmatic_scroll(&self) -> bool {
        self.settle.is_guarding()
    }

    /// Whether `generation` belongs to the scroll currently in flight.
    pub fn is_current_scroll(&self, generation: u64) -> bool {
        self.settle.is_current(generation)
    }

    /// The gallery container scrolled to `scroll_left`.
    ///
    /// While a programmatic scroll is settling this only tracks focus. Any
    /// other scroll is a user gesture: it releases a pinned highlight and,
    /// when it moves more than `collapse_threshold` away from an expanded
    /// card, collapses it.
    pub fn on_scroll(&mut self, scroll_left: f64, now: f64) -> Reaction {
        let before = self.state.clone();
        self.scroll_left = scroll_left;
        self.settle.expire(now);

        if self.settle.is_guarding() {
            if self.state.expanded_item.is_some() {
                self.expand_anchor = Some(scroll_left);
            }
            self.track_focus(now, false);
        } else {
            self.pin_active = false;
            if self.state.expanded_item.is_some() {
                match self.expand_anchor {
                    Some(anchor) if (scroll_left - anchor).abs() > self.config.collapse_threshold => {
                        debug!(
                            "manual scroll of {}px collapses expanded card",
                            (scroll_left - anchor).abs()
                        );
                        self.collapse_expansion();
                    }
                    Some(_) => {}
                    None => self.expand_anchor = Some(scroll_left),
                }
            }
            self.track_focus(now, true);
        }

        self.reaction(&before, None, false)
    }

    /// One animation frame elapsed. Drives settle detection and debounced
    /// focus.
    pub fn on_frame(&mut self, scroll_left: f64, now: f64) -> Reaction {
        let before = self.state.clone();
        self.scroll_left = scroll_left;

        let settled = match self.settle.on_frame(scroll_left, now) {
            SettleStatus::Settled | SettleStatus::TimedOut => {
                if self.state.expanded_item.is_some() {
                    self.expand_anchor = Some(scroll_left);
                }
                true
            }
            SettleStatus::Idle | SettleStatus::Pending => false,
        };
        let follow = !self.settle.is_guarding();
        self.track_focus(now, follow);

        self.reaction(&before, None, settled)
    }

    /// A timeline segment was clicked: collapse, scroll its first card to
    /// the viewport's left edge, highlight the segment.
    pub fn click_segment(&mut self, segment_id: &str, now: f64) -> Reaction {
        let Some((segment_id, item_id)) = self
            .timeline
            .first_item_of(segment_id)
            .map(|item| (item.segment_id.clone(), item.id.clone()))
        else {
            warn!("timeline click on unknown segment `{segment_id}`");
            return Reaction::default();
        };

        let before = self.state.clone();
        self.collapse_expansion();
        self.state.active_segment = Some(segment_id);
        self.pin_active = true;
        self.pending_focus = None;

        let scroll = match self.geometry.start_offset(&item_id) {
            Some(target) => Some(self.issue_scroll(item_id, target, ScrollAlign::Start, now)),
            None => {
                warn!("no geometry for gallery item `{item_id}`; not scrolling");
                None
            }
        };
        self.reaction(&before, scroll, false)
    }

    /// A gallery card was clicked: expand it (collapsing any other) and
    /// centre its expanded footprint, or just re-centre it if it is already
    /// expanded.
    pub fn click_item(&mut self, item_id: &str, now: f64) -> Reaction {
        let Some((item_id, owner)) = self
            .timeline
            .item(item_id)
            .map(|item| (item.id.clone(), item.segment_id.clone()))
        else {
            warn!("click on unknown gallery item `{item_id}`");
            return Reaction::default();
        };

        let before = self.state.clone();
        if !self.state.is_expanded(&item_id) {
            if let Some(previous) = &self.state.expanded_item {
                debug!("collapsing `{previous}` in favour of `{item_id}`");
            }
            self.geometry.set_expanded(Some(&item_id));
            self.state.expanded_item = Some(item_id.clone());
            self.state.active_segment = Some(owner);
            self.pin_active = false;
            self.expand_anchor = Some(self.scroll_left);
        }

        let scroll = match self.geometry.center_offset(&item_id, true) {
            Some(target) => Some(self.issue_scroll(item_id, target, ScrollAlign::Center, now)),
            None => {
                warn!("no geometry for gallery item `{item_id}`; not centring");
                None
            }
        };
        self.reaction(&before, scroll, false)
    }

    /// Collapse the expanded card, if any. The highlight goes back to the
    /// focused card's segment.
    pub fn collapse(&mut self) -> Reaction {
        let before = self.state.clone();
        self.pin_active = false;
        self.collapse_expansion();
        self.sync_active();
        self.reaction(&before, None, false)
    }

    /// The gallery viewport changed width.
    pub fn resize(&mut self, viewport_width: f64) {
        self.geometry.set_viewport_width(viewport_width);
    }

    /// Replace the tuning, e.g. after a reload brought a new embedded
    /// config. A scroll in flight is abandoned.
    pub fn set_config(&mut self, config: TimelineConfig) {
        self.settle.reconfigure(&config);
        self.pending_focus = None;
        self.config = config;
    }

    /// Swap in freshly loaded content. Selection referring to cards or
    /// segments that no longer exist is dropped and any scroll in flight is
    /// abandoned.
    pub fn set_timeline(&mut self, timeline: Timeline, geometry: GeometryRegistry) -> Reaction {
        let before = self.state.clone();
        self.timeline = timeline;
        self.geometry = geometry;
        self.settle.cancel();
        self.pending_focus = None;
        self.expand_anchor = None;

        if let Some(expanded) = self.state.expanded_item.take() {
            if self.timeline.item(&expanded).is_some() {
                self.geometry.set_expanded(Some(&expanded));
                self.state.expanded_item = Some(expanded);
                self.expand_anchor = Some(self.scroll_left);
            } else {
                debug!("expanded card `{expanded}` vanished on reload");
            }
        }
        if self
            .state
            .active_segment
            .as_ref()
            .is_some_and(|id| self.timeline.segment(id).is_none())
        {
            self.state.active_segment = None;
            self.pin_active = false;
        }
        self.state.focused_item = None;
        self.focus_now();
        self.reaction(&before, None, false)
    }

    fn issue_scroll(
        &mut self,
        item_id: ItemId,
        target: f64,
        align: ScrollAlign,
        now: f64,
    ) -> ScrollCommand {
        let generation = self.settle.begin(target, now);
        debug!("scrolling to `{item_id}` ({align:?}) at {target}px, generation {generation}");
        ScrollCommand {
            item_id,
            target,
            align,
            behavior: ScrollBehavior::Smooth,
            generation,
        }
    }

    fn collapse_expansion(&mut self) {
        if let Some(item) = self.state.expanded_item.take() {
            debug!("collapsed `{item}`");
            self.expand_anchor = None;
            self.geometry.set_expanded(None);
            self.sync_active();
        }
    }

    /// Focus the nearest card immediately, bypassing the debounce.
    fn focus_now(&mut self) {
        self.state.focused_item = self.geometry.nearest_item(self.scroll_left).cloned();
        self.sync_active();
    }

    fn track_focus(&mut self, now: f64, follow: bool) {
        let nearest = self.geometry.nearest_item(self.scroll_left).cloned();
        match nearest {
            Some(id) if self.state.focused_item.as_ref() != Some(&id) => {
                let debounce = self.config.focus_debounce_ms;
                let waited = self
                    .pending_focus
                    .as_ref()
                    .filter(|(pending, _)| *pending == id)
                    .map(|(_, since)| now - since);
                let ready = match waited {
                    _ if debounce <= 0.0 => true,
                    Some(waited) => waited >= debounce,
                    None => {
                        self.pending_focus = Some((id.clone(), now));
                        false
                    }
                };
                if ready {
                    self.state.focused_item = Some(id);
                    self.pending_focus = None;
                }
            }
            _ => self.pending_focus = None,
        }
        if follow {
            self.sync_active();
        }
    }

    fn sync_active(&mut self) {
        if self.pin_active {
            return;
        }
        let owner_of = |item: &ItemId| -> Option<SegmentId> {
            self.timeline.owning_segment(item).map(|s| s.id.clone())
        };
        self.state.active_segment = match &self.state.expanded_item {
            Some(expanded) => owner_of(expanded),
            None => self.state.focused_item.as_ref().and_then(owner_of),
        };
    }

    fn reaction(
        &self,
        before: &SelectionState,
        scroll: Option<ScrollCommand>,
        settled: bool,
    ) -> Reaction {
        Reaction {
            scroll,
            selection_changed: *before != self.state,
            settled,
        }
    }
}
