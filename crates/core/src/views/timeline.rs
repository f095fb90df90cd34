use atlas_protocol::{Point, Rect, RenderCommand, TextAlign, ThemeToken, Viewport};

use crate::layout::{PhaseGroup, SegmentLayout};
use crate::model::{SelectionState, Timeline};

const LABEL_Y: f64 = 13.0;
const LABEL_FONT_SIZE: f64 = 11.0;
const SEGMENT_TOP: f64 = 20.0;
const ACTIVE_BAR_HEIGHT: f64 = 3.0;
const MIN_SEGMENT_HEIGHT: f64 = 4.0;

/// Render the segmented timeline: phase labels on top, one proportional
/// block per segment below, and an underline on the active segment.
///
/// `layout` and `groups` must have been computed from `timeline` for the
/// current container width.
pub fn render_timeline(
    timeline: &Timeline,
    layout: &SegmentLayout,
    groups: &[PhaseGroup],
    selection: &SelectionState,
    viewport: &Viewport,
) -> Vec<RenderCommand> {
    if timeline.is_empty() || viewport.width <= 0.0 {
        return Vec::new();
    }

    let segment_height =
        (viewport.height - SEGMENT_TOP - ACTIVE_BAR_HEIGHT).max(MIN_SEGMENT_HEIGHT);
    let mut commands = Vec::with_capacity(timeline.segments().len() * 2 + groups.len() * 2 + 8);

    commands.push(RenderCommand::BeginGroup {
        id: "timeline".into(),
        label: Some("Workflow timeline".into()),
    });
    commands.push(RenderCommand::SetClip {
        rect: Rect::new(0.0, 0.0, viewport.width, viewport.height),
    });
    commands.push(RenderCommand::DrawRect {
        rect: Rect::new(0.0, 0.0, viewport.width, viewport.height),
        color: ThemeToken::TrackBackground,
        border_color: None,
        label: None,
        segment_id: None,
    });

    commands.push(RenderCommand::BeginGroup {
        id: "phase-labels".into(),
        label: None,
    });
    for (i, group) in groups.iter().enumerate() {
        if i > 0 {
            let x = group.start - layout.gap / 2.0;
            commands.push(RenderCommand::DrawLine {
                from: Point::new(x, 0.0),
                to: Point::new(x, viewport.height),
                color: ThemeToken::PhaseSeparator,
                width: 1.0,
            });
        }
        commands.push(RenderCommand::DrawText {
            position: Point::new(group.center, LABEL_Y),
            text: group.phase.label().to_string(),
            color: ThemeToken::PhaseLabel,
            font_size: LABEL_FONT_SIZE,
            align: TextAlign::Center,
        });
    }
    commands.push(RenderCommand::EndGroup);

    for (segment, slot) in timeline.segments().iter().zip(&layout.slots) {
        let active = selection.is_active(&segment.id);
        let rect = Rect::new(slot.x, SEGMENT_TOP, slot.width, segment_height);
        commands.push(RenderCommand::DrawRect {
            rect,
            color: segment.phase.theme_token(),
            border_color: active.then_some(ThemeToken::SelectionHighlight),
            label: Some(segment.label.clone()),
            segment_id: Some(segment.id.clone()),
        });
        if active {
            let y = rect.y + rect.h + ACTIVE_BAR_HEIGHT / 2.0;
            commands.push(RenderCommand::DrawLine {
                from: Point::new(rect.x, y),
                to: Point::new(rect.right(), y),
                color: ThemeToken::SelectionHighlight,
                width: ACTIVE_BAR_HEIGHT,
            });
        }
    }

    commands.push(RenderCommand::ClearClip);
    commands.push(RenderCommand::EndGroup);
    commands
}
