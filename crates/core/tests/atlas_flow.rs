//! Integration test: load a portfolio atlas export, lay out its timeline at
//! several container widths, and drive the selection coordinator through a
//! realistic click / scroll session.

use atlas_core::interaction::GeometryRegistry;
use atlas_core::layout::{SegmentLayout, group_phases};
use atlas_core::svg::render_svg;
use atlas_core::views::timeline::render_timeline;
use atlas_core::{SelectionCoordinator, load_atlas};
use atlas_protocol::{Phase, Viewport};

const FIXTURE: &[u8] = include_bytes!("fixtures/atlas.json");

#[test]
fn fixture_builds_phase_ordered_timeline() {
    let atlas = load_atlas(FIXTURE).expect("fixture should load");
    let timeline = &atlas.timeline;

    // The retired method has no cards and is dropped.
    assert_eq!(timeline.segments().len(), 9);
    assert!(timeline.segment("retired-method").is_none());

    // Journey map (research) moves next to the other research methods.
    let phases: Vec<Phase> = timeline.segments().iter().map(|s| s.phase).collect();
    let mut sorted = phases.clone();
    sorted.sort();
    assert_eq!(phases, sorted);
    assert_eq!(timeline.segments()[2].id, "journey-map");

    // Every segment points at its first card and weights add up.
    let total: u32 = timeline.weights().iter().sum();
    assert_eq!(total as usize, timeline.items().len());
    for segment in timeline.segments() {
        let first = &timeline.items()[segment.gallery_index];
        assert_eq!(first.segment_id, segment.id);
    }
    assert_eq!(atlas.config.settle_frames, 3);
}

#[test]
fn layout_and_labels_hold_across_resizes() {
    let atlas = load_atlas(FIXTURE).expect("fixture should load");
    let segments = atlas.timeline.segments();
    let gap = atlas.config.segment_gap;

    for width in [320.0, 768.0, 1024.0, 1440.0] {
        let layout = SegmentLayout::compute(segments, width, &atlas.config);
        let widths = layout.widths();
        assert!(widths.iter().all(|&w| w >= atlas.config.min_segment_width - 1e-9));
        let row = widths.iter().sum::<f64>() + (widths.len() - 1) as f64 * gap;
        assert!((row - width).abs() < 0.01, "width {width}: row {row}");

        let groups = group_phases(segments, &widths, gap);
        // research, ideation, design, prototype, test
        assert_eq!(groups.len(), 5);
        assert!(groups.windows(2).all(|g| g[0].end < g[1].start));
        for group in &groups {
            assert!(group.center > group.start && group.center < group.end);
        }
    }

    // Too narrow for nine 24px minimums: degenerate overflow.
    let cramped = SegmentLayout::compute(segments, 200.0, &atlas.config);
    assert!(cramped.overflow() > 0.0);
    assert!(cramped.widths().iter().all(|&w| w == 24.0));
}

#[test]
fn click_scroll_session() {
    let atlas = load_atlas(FIXTURE).expect("fixture should load");
    let config = atlas.config.clone();
    let geometry = GeometryRegistry::for_timeline(&atlas.timeline, &config, 900.0);
    let mut coordinator = SelectionCoordinator::new(atlas.timeline, geometry, config);
    let stride = 280.0 + 16.0;

    assert_eq!(
        coordinator.state().active_segment.as_deref(),
        Some("stakeholder-interviews")
    );

    // Timeline click on wireframes scrolls to its first card.
    let reaction = coordinator.click_segment("wireframes", 0.0);
    let scroll = reaction.scroll.expect("segment click should scroll");
    let first_wireframe = coordinator
        .timeline()
        .first_item_of("wireframes")
        .map(|i| i.id.clone())
        .expect("wireframes has cards");
    assert_eq!(scroll.item_id, first_wireframe);
    let index = coordinator
        .timeline()
        .item_position(&first_wireframe)
        .expect("card is in the gallery");
    assert_eq!(scroll.target, index as f64 * stride);

    // Animate there; the highlight stays on wireframes throughout.
    let mut now = 0.0;
    let steps = 12;
    for step in 1..=steps {
        now += 16.0;
        let position = scroll.target * f64::from(step) / f64::from(steps);
        coordinator.on_scroll(position, now);
        coordinator.on_frame(position, now);
        assert_eq!(
            coordinator.state().active_segment.as_deref(),
            Some("wireframes")
        );
    }
    while coordinator.is_programmatic_scroll() {
        now += 16.0;
        coordinator.on_frame(scroll.target, now);
    }
    assert_eq!(
        coordinator.state().focused_item.as_ref(),
        Some(&first_wireframe)
    );

    // Expand the design-system card.
    let reaction = coordinator.click_item("atlas-design-system", now);
    assert!(reaction.selection_changed);
    assert_eq!(
        coordinator.state().active_segment.as_deref(),
        Some("design-system")
    );
    let centre = reaction.scroll.expect("expansion should centre").target;
    while coordinator.is_programmatic_scroll() {
        now += 16.0;
        coordinator.on_scroll(centre, now);
        coordinator.on_frame(centre, now);
    }
    assert_eq!(
        coordinator.state().expanded_item.as_deref(),
        Some("atlas-design-system")
    );

    // A 60px hand scroll collapses it and focus takes over again.
    now += 16.0;
    coordinator.on_scroll(centre + 60.0, now);
    assert!(coordinator.state().expanded_item.is_none());
    let focused = coordinator
        .state()
        .focused_item
        .clone()
        .expect("something is focused");
    let owner = coordinator
        .timeline()
        .owning_segment(&focused)
        .map(|s| s.id.clone());
    assert_eq!(coordinator.state().active_segment, owner);

    // Render the resulting highlight and export it.
    let timeline = coordinator.timeline();
    let layout = SegmentLayout::compute(timeline.segments(), 900.0, coordinator.config());
    let groups = group_phases(timeline.segments(), &layout.widths(), layout.gap);
    let commands = render_timeline(
        timeline,
        &layout,
        &groups,
        coordinator.state(),
        &Viewport::new(900.0, 56.0),
    );
    let svg = render_svg(&commands, 900.0, 56.0, false);
    assert!(svg.contains("Research"));
    assert!(svg.contains("data-segment=\"design-system\""));
}
