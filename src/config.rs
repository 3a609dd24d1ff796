//! # Configuration
//!
//! Spacing for the layout engine and tuning for the interactive canvas.
//! Every field has a default, so hosts can ship a partial JSON document.
//!
//! ```json
//! { "layout": { "h_gap": 80 }, "canvas": { "snap_to_grid": false } }
//! ```

use serde::{Deserialize, Serialize};

use crate::model::Size;
use crate::{Error, Result};

// ============================================================================
// Layout
// ============================================================================

/// Spacing and card geometry used by layout and connector routing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Horizontal gap between neighbouring units (couples or singles).
    pub h_gap: f64,
    /// Vertical gap between generations.
    pub v_gap: f64,
    pub card_width: f64,
    pub card_height: f64,
    /// Connector length between the facing edges of two spouse cards.
    pub spouse_gap: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            h_gap: 60.0,
            v_gap: 100.0,
            card_width: 150.0,
            card_height: 180.0,
            spouse_gap: 40.0,
        }
    }
}

impl LayoutConfig {
    pub fn card_size(&self) -> Size {
        Size::new(self.card_width, self.card_height)
    }

    /// Distance between the centers of two adjacent generations.
    pub fn row_pitch(&self) -> f64 {
        self.card_height + self.v_gap
    }

    /// Distance between the centers of two spouses.
    pub fn spouse_pitch(&self) -> f64 {
        self.card_width + self.spouse_gap
    }
}

// ============================================================================
// Canvas
// ============================================================================

/// Interaction tuning for [`crate::canvas::FamilyTreeCanvas`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Pointer travel (screen px) before a pending drag becomes a drag.
    pub drag_threshold_px: f64,
    /// How long a click is swallowed after a drag-like interaction.
    pub click_suppress_ms: f64,
    pub grid_pitch: f64,
    pub snap_to_grid: bool,
    pub show_grid: bool,
    /// Arrow-key nudge distance in canvas units when snapping is off.
    pub nudge_step: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub fit_min_zoom: f64,
    pub fit_max_zoom: f64,
    pub fit_padding: f64,
    /// Multiplicative zoom per wheel notch / zoom button press.
    pub zoom_step: f64,
    pub marker_radius: f64,
    /// Gap between a sibling bar and the top of the highest child.
    pub bar_offset: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            drag_threshold_px: 3.0,
            click_suppress_ms: 200.0,
            grid_pitch: 20.0,
            snap_to_grid: true,
            show_grid: true,
            nudge_step: 10.0,
            min_zoom: 0.3,
            max_zoom: 3.0,
            fit_min_zoom: 0.3,
            fit_max_zoom: 2.0,
            fit_padding: 40.0,
            zoom_step: 1.1,
            marker_radius: 6.0,
            bar_offset: 24.0,
        }
    }
}

// ============================================================================
// Top-level
// ============================================================================

/// Everything the tree engine can be tuned with.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub layout: LayoutConfig,
    pub canvas: CanvasConfig,
}

impl TreeConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: TreeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let l = &self.layout;
        let positive = [
            ("layout.card_width", l.card_width),
            ("layout.card_height", l.card_height),
            ("canvas.min_zoom", self.canvas.min_zoom),
            ("canvas.fit_min_zoom", self.canvas.fit_min_zoom),
            ("canvas.zoom_step", self.canvas.zoom_step),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidConfig(format!("{name} must be positive, got {value}")));
            }
        }
        let non_negative = [
            ("layout.h_gap", l.h_gap),
            ("layout.v_gap", l.v_gap),
            ("layout.spouse_gap", l.spouse_gap),
            ("canvas.drag_threshold_px", self.canvas.drag_threshold_px),
            ("canvas.click_suppress_ms", self.canvas.click_suppress_ms),
            ("canvas.grid_pitch", self.canvas.grid_pitch),
            ("canvas.nudge_step", self.canvas.nudge_step),
            ("canvas.fit_padding", self.canvas.fit_padding),
            ("canvas.bar_offset", self.canvas.bar_offset),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::InvalidConfig(format!("{name} must be >= 0, got {value}")));
            }
        }
        if self.canvas.min_zoom > self.canvas.max_zoom {
            return Err(Error::InvalidConfig("canvas.min_zoom exceeds canvas.max_zoom".into()));
        }
        if self.canvas.fit_min_zoom > self.canvas.fit_max_zoom {
            return Err(Error::InvalidConfig(
                "canvas.fit_min_zoom exceeds canvas.fit_max_zoom".into(),
            ));
        }
        if self.canvas.zoom_step <= 1.0 {
            return Err(Error::InvalidConfig("canvas.zoom_step must be greater than 1".into()));
        }
        Ok(())
    }
}
