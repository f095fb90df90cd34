use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("`{field}` {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Tunables for timeline layout and gallery interaction.
///
/// Every field has a default, so a partial JSON object (or none at all) is
/// a valid configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimelineConfig {
    /// Smallest width a timeline segment may be drawn at (px).
    pub min_segment_width: f64,
    /// Horizontal gap between adjacent segments (px).
    pub segment_gap: f64,
    /// Manual scroll distance that collapses an expanded card (px).
    pub collapse_threshold: f64,
    /// Consecutive unchanged frames after which a programmatic scroll counts
    /// as settled.
    pub settle_frames: u32,
    /// Hard upper bound on settle detection (ms).
    pub settle_timeout_ms: f64,
    /// How long a new nearest card must stay nearest before it takes focus
    /// (ms). Zero switches focus immediately.
    pub focus_debounce_ms: f64,
    /// Collapsed card width used for uniform gallery strips (px).
    pub card_width: f64,
    /// Width of the detail panel added to an expanded card (px).
    pub detail_width: f64,
    /// Gap between gallery cards (px).
    pub card_gap: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            min_segment_width: 24.0,
            segment_gap: 4.0,
            collapse_threshold: 50.0,
            settle_frames: 4,
            settle_timeout_ms: 900.0,
            focus_debounce_ms: 0.0,
            card_width: 280.0,
            detail_width: 360.0,
            card_gap: 16.0,
        }
    }
}

impl TimelineConfig {
    pub fn from_json(data: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_slice(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("min_segment_width", self.min_segment_width)?;
        non_negative("segment_gap", self.segment_gap)?;
        non_negative("collapse_threshold", self.collapse_threshold)?;
        non_negative("focus_debounce_ms", self.focus_debounce_ms)?;
        non_negative("detail_width", self.detail_width)?;
        non_negative("card_gap", self.card_gap)?;
        positive("settle_timeout_ms", self.settle_timeout_ms)?;
        positive("card_width", self.card_width)?;
        if self.settle_frames == 0 {
            return Err(ConfigError::Invalid {
                field: "settle_frames",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a finite number >= 0, got {value}"),
        })
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a finite number > 0, got {value}"),
        })
    }
}
