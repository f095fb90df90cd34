use std::collections::{HashMap, HashSet};

use log::debug;
use thiserror::Error;

use super::{GalleryItem, ItemId, Method, Segment, SegmentId};

#[derive(Debug, Error, PartialEq)]
pub enum TimelineError {
    #[error("duplicate method id `{0}`")]
    DuplicateSegment(SegmentId),
    #[error("duplicate gallery item id `{0}`")]
    DuplicateItem(ItemId),
    #[error("gallery item `{item}` references unknown method `{segment}`")]
    UnknownSegment { item: ItemId, segment: SegmentId },
}

/// The ordered segment sequence together with the gallery it was derived
/// from.
///
/// Items belonging to one segment are contiguous and segments appear in the
/// same order as their items, so `segment.gallery_index` always points at the
/// first card of that segment and the next `weight` cards belong to it.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    segments: Vec<Segment>,
    items: Vec<GalleryItem>,
    segment_index: HashMap<SegmentId, usize>,
    item_index: HashMap<ItemId, usize>,
}

impl Timeline {
    /// Build the timeline from method descriptors and the gallery.
    ///
    /// Segments are ordered by the first appearance of one of their items;
    /// items of the same method are pulled together behind that first one.
    /// Methods that no item references are dropped, so every segment has
    /// `weight >= 1`.
    pub fn from_items(
        methods: Vec<Method>,
        items: Vec<GalleryItem>,
    ) -> Result<Self, TimelineError> {
        let mut methods_by_id: HashMap<SegmentId, Method> = HashMap::with_capacity(methods.len());
        for method in methods {
            if methods_by_id.contains_key(&method.id) {
                return Err(TimelineError::DuplicateSegment(method.id));
            }
            methods_by_id.insert(method.id.clone(), method);
        }

        let mut order: Vec<SegmentId> = Vec::new();
        let mut buckets: HashMap<SegmentId, Vec<GalleryItem>> = HashMap::new();
        let mut seen_items: HashSet<ItemId> = HashSet::with_capacity(items.len());
        for item in items {
            if !seen_items.insert(item.id.clone()) {
                return Err(TimelineError::DuplicateItem(item.id));
            }
            if !methods_by_id.contains_key(&item.segment_id) {
                return Err(TimelineError::UnknownSegment {
                    item: item.id,
                    segment: item.segment_id,
                });
            }
            buckets
                .entry(item.segment_id.clone())
                .or_insert_with(|| {
                    order.push(item.segment_id.clone());
                    Vec::new()
                })
                .push(item);
        }

        let unused = methods_by_id.len() - order.len();
        if unused > 0 {
            debug!("dropping {unused} method(s) without gallery items");
        }

        let mut timeline = Self::default();
        for segment_id in order {
            let (Some(method), Some(bucket)) =
                (methods_by_id.remove(&segment_id), buckets.remove(&segment_id))
            else {
                continue;
            };
            timeline.push_segment(method, bucket);
        }
        Ok(timeline)
    }

    /// Stable-sort segments (and their cards) into phase order so every
    /// phase forms one contiguous run.
    pub fn grouped_by_phase(self) -> Self {
        let Self { segments, items, .. } = self;
        let mut items = items.into_iter();
        let mut runs: Vec<(Segment, Vec<GalleryItem>)> = segments
            .into_iter()
            .map(|segment| {
                let bucket = items.by_ref().take(segment.weight as usize).collect();
                (segment, bucket)
            })
            .collect();
        runs.sort_by_key(|(segment, _)| segment.phase);

        let mut timeline = Self::default();
        for (segment, bucket) in runs {
            let method = Method {
                id: segment.id,
                label: segment.label,
                phase: segment.phase,
            };
            timeline.push_segment(method, bucket);
        }
        timeline
    }

    fn push_segment(&mut self, method: Method, bucket: Vec<GalleryItem>) {
        let gallery_index = self.items.len();
        self.segment_index
            .insert(method.id.clone(), self.segments.len());
        self.segments.push(Segment {
            id: method.id,
            label: method.label,
            phase: method.phase,
            weight: bucket.len() as u32,
            gallery_index,
        });
        for item in bucket {
            self.item_index.insert(item.id.clone(), self.items.len());
            self.items.push(item);
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn weights(&self) -> Vec<u32> {
        self.segments.iter().map(|s| s.weight).collect()
    }

    pub fn segment(&self, id: &str) -> Option<&Segment> {
        self.segment_index.get(id).map(|&i| &self.segments[i])
    }

    pub fn segment_position(&self, id: &str) -> Option<usize> {
        self.segment_index.get(id).copied()
    }

    pub fn item(&self, id: &str) -> Option<&GalleryItem> {
        self.item_index.get(id).map(|&i| &self.items[i])
    }

    pub fn item_position(&self, id: &str) -> Option<usize> {
        self.item_index.get(id).copied()
    }

    /// The segment a gallery item belongs to.
    pub fn owning_segment(&self, item_id: &str) -> Option<&Segment> {
        self.item(item_id)
            .and_then(|item| self.segment(&item.segment_id))
    }

    /// First gallery card of a segment, the scroll target for timeline clicks.
    pub fn first_item_of(&self, segment_id: &str) -> Option<&GalleryItem> {
        self.segment(segment_id)
            .and_then(|segment| self.items.get(segment.gallery_index))
    }

    pub fn items_of(&self, segment_id: &str) -> &[GalleryItem] {
        match self.segment(segment_id) {
            Some(segment) => {
                let end = segment.gallery_index + segment.weight as usize;
                &self.items[segment.gallery_index..end]
            }
            None => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Card;
    use atlas_protocol::Phase;

    fn method(id: &str, phase: Phase) -> Method {
        Method {
            id: id.into(),
            label: id.to_uppercase(),
            phase,
        }
    }

    fn item(id: &str, segment: &str) -> GalleryItem {
        GalleryItem {
            id: id.into(),
            segment_id: segment.into(),
            card: Card {
                title: id.into(),
                ..Card::default()
            },
            detail: None,
        }
    }

    #[test]
    fn weights_count_items_and_gallery_index_points_at_first_card() {
        let timeline = Timeline::from_items(
            vec![method("m1", Phase::Research), method("m2", Phase::Design)],
            vec![item("a", "m1"), item("b", "m1"), item("c", "m2")],
        );
        let Ok(timeline) = timeline else {
            panic!("valid input rejected");
        };
        assert_eq!(timeline.weights(), vec![2, 1]);
        assert_eq!(timeline.segments()[1].gallery_index, 2);
        assert_eq!(timeline.first_item_of("m2").map(|i| i.id.as_str()), Some("c"));
        assert_eq!(timeline.owning_segment("b").map(|s| s.id.as_str()), Some("m1"));
        assert_eq!(timeline.items_of("m1").len(), 2);
    }

    #[test]
    fn scattered_items_are_pulled_together() {
        let Ok(timeline) = Timeline::from_items(
            vec![method("m1", Phase::Research), method("m2", Phase::Design)],
            vec![item("a", "m1"), item("c", "m2"), item("b", "m1")],
        ) else {
            panic!("valid input rejected");
        };
        let ids: Vec<&str> = timeline.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(timeline.item_position("c"), Some(2));
    }

    #[test]
    fn methods_without_items_are_dropped() {
        let Ok(timeline) = Timeline::from_items(
            vec![method("m1", Phase::Research), method("empty", Phase::Test)],
            vec![item("a", "m1")],
        ) else {
            panic!("valid input rejected");
        };
        assert_eq!(timeline.segments().len(), 1);
        assert!(timeline.segment("empty").is_none());
        assert!(timeline.items_of("empty").is_empty());
    }

    #[test]
    fn rejects_bad_references() {
        let unknown = Timeline::from_items(vec![method("m1", Phase::Build)], vec![item("a", "nope")]);
        assert_eq!(
            unknown.err(),
            Some(TimelineError::UnknownSegment {
                item: "a".into(),
                segment: "nope".into()
            })
        );

        let dup_item = Timeline::from_items(
            vec![method("m1", Phase::Build)],
            vec![item("a", "m1"), item("a", "m1")],
        );
        assert_eq!(dup_item.err(), Some(TimelineError::DuplicateItem("a".into())));

        let dup_method = Timeline::from_items(
            vec![method("m1", Phase::Build), method("m1", Phase::Test)],
            vec![],
        );
        assert_eq!(dup_method.err(), Some(TimelineError::DuplicateSegment("m1".into())));
    }

    #[test]
    fn grouping_by_phase_keeps_cards_with_their_segment() {
        let Ok(timeline) = Timeline::from_items(
            vec![
                method("test-1", Phase::Test),
                method("res-1", Phase::Research),
                method("test-2", Phase::Test),
                method("res-2", Phase::Research),
            ],
            vec![
                item("t1a", "test-1"),
                item("r1a", "res-1"),
                item("r1b", "res-1"),
                item("t2a", "test-2"),
                item("r2a", "res-2"),
            ],
        ) else {
            panic!("valid input rejected");
        };
        let grouped = timeline.grouped_by_phase();
        let segs: Vec<&str> = grouped.segments().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(segs, vec!["res-1", "res-2", "test-1", "test-2"]);
        let cards: Vec<&str> = grouped.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(cards, vec!["r1a", "r1b", "r2a", "t1a", "t2a"]);
        assert_eq!(grouped.segment("test-1").map(|s| s.gallery_index), Some(3));
        assert_eq!(grouped.owning_segment("t2a").map(|s| s.id.as_str()), Some("test-2"));
    }
}
