use serde::{Deserialize, Serialize};

use crate::ident::Ident;
use crate::theme::ThemeToken;
use crate::types::{Point, Rect};

/// A single, stateless render instruction. Hosts replay a command list in
/// order; nothing carries over between commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Draw a filled rectangle, optionally with a text label and the id of
    /// the segment it represents (for hit-testing / selection).
    DrawRect {
        rect: Rect,
        color: ThemeToken,
        border_color: Option<ThemeToken>,
        label: Option<String>,
        segment_id: Option<Ident>,
    },

    /// Draw a text string at a position.
    DrawText {
        position: Point,
        text: String,
        color: ThemeToken,
        font_size: f64,
        align: TextAlign,
    },

    /// Draw a line segment.
    DrawLine {
        from: Point,
        to: Point,
        color: ThemeToken,
        width: f64,
    },

    /// Restrict subsequent drawing to a rectangular region.
    SetClip { rect: Rect },

    /// Remove the active clip region.
    ClearClip,

    /// Begin a logical group (track, phase labels). Renderers may use this
    /// for layer separation or accessibility.
    BeginGroup { id: String, label: Option<String> },

    /// End the current group.
    EndGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// How the host container should animate to a scroll target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// Which edge of the item the scroll target was computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollAlign {
    Start,
    Center,
}

/// Instruction to the scrollable container hosting the gallery.
///
/// `target` is the raw horizontal offset; hosts clamp it to their own
/// scrollable range the way a browser's `scrollTo` does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollCommand {
    pub item_id: Ident,
    pub target: f64,
    pub align: ScrollAlign,
    pub behavior: ScrollBehavior,
    /// Settle-detection generation armed for this scroll.
    pub generation: u64,
}
