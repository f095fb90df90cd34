use serde::{Deserialize, Serialize};

/// Semantic color tokens resolved by the renderer's active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    PhaseResearch,
    PhaseIdeation,
    PhaseDesign,
    PhasePrototype,
    PhaseBuild,
    PhaseTest,
    PhaseLaunch,

    TrackBackground,
    TrackBorder,
    PhaseLabel,
    PhaseSeparator,
    SegmentText,

    TextPrimary,
    TextMuted,

    SelectionHighlight,
    FocusHighlight,

    Background,
    Border,

    // Gallery
    CardBackground,
    CardExpanded,
    CardBorder,
}
