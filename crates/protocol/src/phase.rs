use serde::{Deserialize, Serialize};

use crate::theme::ThemeToken;

/// Workflow stage a timeline segment belongs to.
///
/// Declaration order is the canonical left-to-right order used when
/// segments are grouped by phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Research,
    Ideation,
    Design,
    Prototype,
    Build,
    Test,
    Launch,
}

impl Phase {
    pub const ALL: [Phase; 7] = [
        Phase::Research,
        Phase::Ideation,
        Phase::Design,
        Phase::Prototype,
        Phase::Build,
        Phase::Test,
        Phase::Launch,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Research => "Research",
            Self::Ideation => "Ideation",
            Self::Design => "Design",
            Self::Prototype => "Prototype",
            Self::Build => "Build",
            Self::Test => "Test",
            Self::Launch => "Launch",
        }
    }

    /// Colour token used for segments of this phase.
    pub fn theme_token(self) -> ThemeToken {
        match self {
            Self::Research => ThemeToken::PhaseResearch,
            Self::Ideation => ThemeToken::PhaseIdeation,
            Self::Design => ThemeToken::PhaseDesign,
            Self::Prototype => ThemeToken::PhasePrototype,
            Self::Build => ThemeToken::PhaseBuild,
            Self::Test => ThemeToken::PhaseTest,
            Self::Launch => ThemeToken::PhaseLaunch,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_declaration_order() {
        let mut sorted = Phase::ALL;
        sorted.sort();
        assert_eq!(sorted, Phase::ALL);
    }

    #[test]
    fn deserializes_snake_case() {
        let phase: Phase = match serde_json::from_str("\"prototype\"") {
            Ok(phase) => phase,
            Err(e) => panic!("snake_case phase rejected: {e}"),
        };
        assert_eq!(phase, Phase::Prototype);
    }
}
