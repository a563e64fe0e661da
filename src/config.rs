use crate::error::{OverlayError, OverlayResult};
use crate::geometry::HexColor;
use clap::Args;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSpec {
    pub family: String,
    pub size: u16,
    pub bold: bool,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "Consolas".to_string(),
            size: 10,
            bold: true,
        }
    }
}

/// Global visual defaults. Cells without an override inherit from here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub background: HexColor,
    pub key_idle: HexColor,
    pub key_pressed: HexColor,
    pub mouse_idle: HexColor,
    pub mouse_pressed: HexColor,
    pub key_text: HexColor,
    pub key_outline: HexColor,
    pub font: FontSpec,
    pub corner_radius: f32,

    // Pixel metrics of one grid unit
    pub unit_px: f32,
    pub height_px: f32,
    pub gap_px: f32,

    pub overlay_opacity: f32,
    pub grid_visible: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: HexColor::known("#111111"),
            key_idle: HexColor::known("#2a2a3a"),
            key_pressed: HexColor::known("#7b68ee"),
            mouse_idle: HexColor::known("#1e3a5f"),
            mouse_pressed: HexColor::known("#1e90ff"),
            key_text: HexColor::known("#ffffff"),
            key_outline: HexColor::known("#444466"),
            font: FontSpec::default(),
            corner_radius: 6.0,
            unit_px: 44.0,
            height_px: 44.0,
            gap_px: 4.0,
            overlay_opacity: 0.93,
            grid_visible: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self { x: 100, y: 100 }
    }
}

/// Which layout to restore on startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutRef {
    Preset(String),
    Saved(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
    pub last_layout: Option<LayoutRef>,
    pub window: WindowGeometry,
    pub editor: EditorParams,
}

#[derive(Args, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorParams {
    /// Round moved cells to the grid
    #[arg(long = "snap", default_value_t = true, action = clap::ArgAction::Set)]
    pub snap_to_grid: bool,

    /// Grid subdivisions per unit when snapping (4 = quarter units)
    #[arg(long, default_value_t = 1)]
    pub snap_divisions: u32,

    /// Reject moves that leave a cell entirely outside this width
    #[arg(long)]
    pub canvas_width: Option<f32>,

    #[arg(long)]
    pub canvas_height: Option<f32>,
}

impl EditorParams {
    /// A canvas dimension, when set, must be a positive finite size.
    pub fn validate(&self) -> OverlayResult<()> {
        for (axis, value) in [("width", self.canvas_width), ("height", self.canvas_height)] {
            if let Some(v) = value {
                if !(v.is_finite() && v > 0.0) {
                    return Err(OverlayError::OutOfBounds(format!(
                        "canvas {} must be positive, got {}",
                        axis, v
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for EditorParams {
    fn default() -> Self {
        Self {
            snap_to_grid: true,
            snap_divisions: 1,
            canvas_width: None,
            canvas_height: None,
        }
    }
}
