//! Editor configuration.
//!
//! Every field has a documented default so a host can ship an empty `{}`
//! and override only what it needs.

use crate::snapping::Snapping;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── Config ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum distance between an edge and a snap line. Default: **5.0**.
    pub snapping_distance: f64,

    /// Maximum distance between an edge and a line for anchor inference
    /// after a gesture. Default: **1.0**.
    pub anchor_tolerance: f64,

    /// Gap between neighbouring items used for offset snap lines. Default: **6.0**.
    pub item_spacing: f64,

    /// Inset of the container's inner snap lines when the container has no
    /// padded content rect of its own. Default: **8.0**.
    pub container_padding: f64,

    /// Snapping behaviour for pointer gestures. Holding Ctrl always
    /// disables snapping. Default: **UseSnappingAndAnchoring**.
    pub snap_mode: Snapping,

    /// Manhattan distance the pointer must travel before a press on a
    /// selected item becomes a move. Default: **20.0**.
    pub move_start_distance: f64,

    /// Time the pointer must be held before a press becomes a move. Default: **50 ms**.
    pub move_start_delay_ms: u64,

    /// Minimum interval between two model updates of a running move. Default: **30 ms**.
    pub move_throttle_ms: u64,

    /// Arrow key step. Default: **1.0**.
    pub key_step: f64,

    /// Arrow key step with Shift held. Default: **10.0**.
    pub key_step_large: f64,

    /// Side length of resize handles in view pixels. Default: **7.0**.
    pub handle_size: f64,

    /// Distance of rotation handles from the item's corners in view pixels.
    /// Default: **12.0**.
    pub rotation_handle_offset: f64,

    /// Size of items dropped or clicked into existence without a drawn
    /// rectangle. Default: **100 × 100**.
    pub default_item_size: (f64, f64),

    /// Discrete zoom factors offered by zoom in/out.
    pub zoom_levels: Vec<f64>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snapping_distance: 5.0,
            anchor_tolerance: 1.0,
            item_spacing: 6.0,
            container_padding: 8.0,
            snap_mode: Snapping::UseSnappingAndAnchoring,
            move_start_distance: 20.0,
            move_start_delay_ms: 50,
            move_throttle_ms: 30,
            key_step: 1.0,
            key_step_large: 10.0,
            handle_size: 7.0,
            rotation_handle_offset: 12.0,
            default_item_size: (100.0, 100.0),
            zoom_levels: vec![
                0.01, 0.02, 0.05, 0.0625, 0.1, 0.125, 0.2, 0.25, 0.33, 0.5, 0.66, 0.75, 0.9, 1.0,
                1.1, 1.25, 1.33, 1.5, 1.66, 1.75, 2.0, 3.0, 4.0, 6.0, 8.0, 10.0, 16.0, 32.0, 64.0,
            ],
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid editor config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },
    #[error("zoom levels must contain at least one positive factor")]
    NoZoomLevels,
}

impl EditorConfig {
    /// Load from JSON; missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("snapping_distance", self.snapping_distance),
            ("anchor_tolerance", self.anchor_tolerance),
            ("item_spacing", self.item_spacing),
            ("container_padding", self.container_padding),
            ("move_start_distance", self.move_start_distance),
            ("handle_size", self.handle_size),
            ("rotation_handle_offset", self.rotation_handle_offset),
        ];
        for (field, value) in non_negative {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::OutOfRange {
                    field,
                    expected: "a non-negative number",
                    value,
                });
            }
        }
        for (field, value) in [("key_step", self.key_step), ("key_step_large", self.key_step_large)] {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::OutOfRange {
                    field,
                    expected: "positive",
                    value,
                });
            }
        }
        if !self.zoom_levels.iter().any(|z| *z > 0.0) {
            return Err(ConfigError::NoZoomLevels);
        }
        Ok(())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_default() {
        let config = EditorConfig::from_json("{}").unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn partial_json_overrides_fields() {
        let config =
            EditorConfig::from_json(r#"{ "item_spacing": 10.0, "snap_mode": "UseSnapping" }"#)
                .unwrap();
        assert_eq!(config.item_spacing, 10.0);
        assert_eq!(config.snap_mode, Snapping::UseSnapping);
        assert_eq!(config.snapping_distance, 5.0);
    }

    #[test]
    fn rejects_negative_distances() {
        let err = EditorConfig::from_json(r#"{ "snapping_distance": -1.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "snapping_distance",
                ..
            }
        ));
    }

    #[test]
    fn rejects_empty_zoom_table() {
        let err = EditorConfig::from_json(r#"{ "zoom_levels": [] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::NoZoomLevels));
    }

    #[test]
    fn json_round_trip_keeps_values() {
        let config = EditorConfig {
            move_throttle_ms: 16,
            ..EditorConfig::default()
        };
        let text = config.to_json().unwrap();
        assert_eq!(EditorConfig::from_json(&text).unwrap(), config);
    }
}
