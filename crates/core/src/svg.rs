//! Static SVG export of a render command list.
//!
//! Groups become `<g>` elements and clip regions become `clipPath`s, so the
//! exported track keeps the structure hosts see.

use std::fmt::{self, Write};

use atlas_protocol::{Rect, RenderCommand, TextAlign, ThemeToken};

/// Approximate advance of one label character at the default font size.
const CHAR_WIDTH: f64 = 7.0;
/// Rects narrower than this get a tooltip but no inline label.
const MIN_LABEL_WIDTH: f64 = 30.0;

pub fn render_svg(commands: &[RenderCommand], width: f64, height: f64, dark: bool) -> String {
    let mut svg = String::with_capacity(commands.len() * 160);
    // Writing into a String cannot fail.
    let _ = write_svg(&mut svg, commands, width, height, dark);
    svg
}

fn write_svg(
    out: &mut impl Write,
    commands: &[RenderCommand],
    width: f64,
    height: f64,
    dark: bool,
) -> fmt::Result {
    write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" font-family="system-ui, sans-serif" font-size="11">"#
    )?;
    write!(
        out,
        r#"<rect width="{width}" height="{height}" fill="{}"/>"#,
        resolve_color(ThemeToken::Background, dark)
    )?;

    // Open `<g>` elements, closed by EndGroup / ClearClip or at the end.
    let mut open = 0usize;
    let mut clips = 0usize;
    for cmd in commands {
        match cmd {
            RenderCommand::DrawRect {
                rect,
                color,
                border_color,
                label,
                segment_id,
            } => {
                write!(
                    out,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" rx="2" fill="{}""#,
                    rect.x,
                    rect.y,
                    rect.w,
                    rect.h,
                    resolve_color(*color, dark)
                )?;
                if let Some(border) = border_color {
                    write!(
                        out,
                        r#" stroke="{}" stroke-width="2""#,
                        resolve_color(*border, dark)
                    )?;
                }
                if let Some(id) = segment_id {
                    write!(out, r#" data-segment="{}""#, escape_xml(id))?;
                }
                match label {
                    Some(label) => write!(out, "><title>{}</title></rect>", escape_xml(label))?,
                    None => out.write_str("/>")?,
                }
                if let Some(label) = label {
                    write_inline_label(out, rect, label, dark)?;
                }
            }
            RenderCommand::DrawLine {
                from,
                to,
                color,
                width: line_width,
            } => write!(
                out,
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{line_width}"/>"#,
                from.x,
                from.y,
                to.x,
                to.y,
                resolve_color(*color, dark)
            )?,
            RenderCommand::DrawText {
                position,
                text,
                color,
                font_size,
                align,
            } => {
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                    TextAlign::Right => "end",
                };
                write!(
                    out,
                    r#"<text x="{}" y="{}" fill="{}" font-size="{font_size}" text-anchor="{anchor}">{}</text>"#,
                    position.x,
                    position.y,
                    resolve_color(*color, dark),
                    escape_xml(text)
                )?;
            }
            RenderCommand::SetClip { rect } => {
                clips += 1;
                write!(
                    out,
                    r#"<clipPath id="clip-{clips}"><rect x="{}" y="{}" width="{}" height="{}"/></clipPath><g clip-path="url(#clip-{clips})">"#,
                    rect.x, rect.y, rect.w, rect.h
                )?;
                open += 1;
            }
            RenderCommand::BeginGroup { id, label } => {
                write!(out, r#"<g id="{}""#, escape_xml(id))?;
                if let Some(label) = label {
                    write!(out, r#" aria-label="{}""#, escape_xml(label))?;
                }
                out.write_char('>')?;
                open += 1;
            }
            RenderCommand::ClearClip | RenderCommand::EndGroup => {
                if open > 0 {
                    out.write_str("</g>")?;
                    open -= 1;
                }
            }
        }
    }
    for _ in 0..open {
        out.write_str("</g>")?;
    }
    out.write_str("</svg>")
}

/// Segment label drawn inside its rect, shortened with an ellipsis to fit.
fn write_inline_label(out: &mut impl Write, rect: &Rect, label: &str, dark: bool) -> fmt::Result {
    if rect.w <= MIN_LABEL_WIDTH {
        return Ok(());
    }
    let fits = (rect.w / CHAR_WIDTH) as usize;
    let text = if label.chars().count() > fits && fits > 2 {
        let mut short: String = label.chars().take(fits - 1).collect();
        short.push('…');
        short
    } else {
        label.to_string()
    };
    write!(
        out,
        r#"<text x="{}" y="{}" fill="{}" pointer-events="none">{}</text>"#,
        rect.x + 4.0,
        rect.y + rect.h / 2.0 + 4.0,
        resolve_color(ThemeToken::SegmentText, dark),
        escape_xml(&text)
    )
}

fn resolve_color(token: ThemeToken, dark: bool) -> &'static str {
    if dark {
        match token {
            ThemeToken::PhaseResearch => "#5c9ded",
            ThemeToken::PhaseIdeation => "#b388ff",
            ThemeToken::PhaseDesign => "#f06292",
            ThemeToken::PhasePrototype => "#ffa726",
            ThemeToken::PhaseBuild => "#66bb6a",
            ThemeToken::PhaseTest => "#26c6da",
            ThemeToken::PhaseLaunch => "#ffd54f",
            ThemeToken::TrackBackground | ThemeToken::CardBackground => "#202024",
            ThemeToken::Background => "#161618",
            ThemeToken::TrackBorder
            | ThemeToken::Border
            | ThemeToken::CardBorder
            | ThemeToken::PhaseSeparator => "#3a3a40",
            ThemeToken::TextPrimary | ThemeToken::SegmentText => "#f2f2f2",
            ThemeToken::PhaseLabel | ThemeToken::TextMuted => "#9e9e9e",
            ThemeToken::SelectionHighlight => "#ffffff",
            ThemeToken::FocusHighlight => "#8ab4f8",
            ThemeToken::CardExpanded => "#2c2c34",
        }
    } else {
        match token {
            ThemeToken::PhaseResearch => "#1e6fd9",
            ThemeToken::PhaseIdeation => "#7c4dff",
            ThemeToken::PhaseDesign => "#d81b60",
            ThemeToken::PhasePrototype => "#ef6c00",
            ThemeToken::PhaseBuild => "#2e7d32",
            ThemeToken::PhaseTest => "#00838f",
            ThemeToken::PhaseLaunch => "#c79100",
            ThemeToken::TrackBackground | ThemeToken::CardBackground => "#f4f4f6",
            ThemeToken::Background => "#ffffff",
            ThemeToken::TrackBorder
            | ThemeToken::Border
            | ThemeToken::CardBorder
            | ThemeToken::PhaseSeparator => "#d0d0d6",
            ThemeToken::TextPrimary => "#1a1a1e",
            ThemeToken::SegmentText => "#ffffff",
            ThemeToken::PhaseLabel | ThemeToken::TextMuted => "#666670",
            ThemeToken::SelectionHighlight => "#1a1a1e",
            ThemeToken::FocusHighlight => "#1e6fd9",
            ThemeToken::CardExpanded => "#e8e8ee",
        }
    }
}

fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_protocol::Point;

    #[test]
    fn active_segment_carries_stroke_and_id() {
        let commands = vec![RenderCommand::DrawRect {
            rect: Rect::new(10.0, 20.0, 100.0, 18.0),
            color: ThemeToken::PhaseDesign,
            border_color: Some(ThemeToken::SelectionHighlight),
            label: Some("Wireframes".into()),
            segment_id: Some("wireframes".into()),
        }];
        let svg = render_svg(&commands, 800.0, 60.0, true);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("<title>Wireframes</title>"));
        assert!(svg.contains("#f06292"));
        assert!(svg.contains(r#"data-segment="wireframes""#));
        assert!(svg.contains(r##"stroke="#ffffff""##));
    }

    #[test]
    fn narrow_rect_gets_tooltip_only() {
        let commands = vec![RenderCommand::DrawRect {
            rect: Rect::new(0.0, 0.0, 24.0, 18.0),
            color: ThemeToken::PhaseTest,
            border_color: None,
            label: Some("Usability testing".into()),
            segment_id: None,
        }];
        let svg = render_svg(&commands, 100.0, 20.0, false);
        assert!(svg.contains("<title>Usability testing</title>"));
        assert!(!svg.contains(">Usability testing</text>"));
    }

    #[test]
    fn long_label_is_shortened() {
        let commands = vec![RenderCommand::DrawRect {
            rect: Rect::new(0.0, 0.0, 56.0, 18.0),
            color: ThemeToken::PhaseBuild,
            border_color: None,
            label: Some("Design system".into()),
            segment_id: None,
        }];
        let svg = render_svg(&commands, 100.0, 20.0, false);
        assert!(svg.contains(">Design …</text>"), "{svg}");
    }

    #[test]
    fn centered_text_uses_middle_anchor() {
        let commands = vec![RenderCommand::DrawText {
            position: Point::new(150.0, 13.0),
            text: "Research".into(),
            color: ThemeToken::PhaseLabel,
            font_size: 11.0,
            align: TextAlign::Center,
        }];
        let svg = render_svg(&commands, 300.0, 40.0, false);
        assert!(svg.contains(r#"text-anchor="middle""#));
        assert!(svg.contains(">Research</text>"));
    }

    #[test]
    fn groups_and_clips_nest_and_close() {
        let commands = vec![
            RenderCommand::BeginGroup {
                id: "timeline".into(),
                label: Some("Workflow timeline".into()),
            },
            RenderCommand::SetClip {
                rect: Rect::new(0.0, 0.0, 300.0, 40.0),
            },
            RenderCommand::ClearClip,
            // Left open on purpose.
            RenderCommand::BeginGroup {
                id: "labels".into(),
                label: None,
            },
        ];
        let svg = render_svg(&commands, 300.0, 40.0, false);
        assert!(svg.contains(r#"<g id="timeline" aria-label="Workflow timeline">"#));
        assert!(svg.contains(r#"<clipPath id="clip-1">"#));
        assert_eq!(svg.matches("<g ").count(), svg.matches("</g>").count());
    }

    #[test]
    fn escapes_markup_in_labels() {
        let commands = vec![RenderCommand::DrawText {
            position: Point::new(0.0, 10.0),
            text: "Q&A <live> \"beta\"".into(),
            color: ThemeToken::TextPrimary,
            font_size: 11.0,
            align: TextAlign::Left,
        }];
        let svg = render_svg(&commands, 400.0, 100.0, false);
        assert!(svg.contains("Q&amp;A &lt;live&gt; &quot;beta&quot;"));
    }
}
