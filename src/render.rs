//! Boundary to the drawing layer. The toolkit side implements
//! [`RenderAdapter`]; everything it needs is resolved here first.

use crate::config::Theme;
use crate::geometry::{Cell, HexColor, Layout};
use serde::Serialize;

/// Margin around the cell area, in pixels.
pub const PAD_PX: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// One cell, ready to paint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellView {
    pub id: String,
    pub label: String,
    pub pressed: bool,
    pub fill: HexColor,
    pub text: HexColor,
    pub outline: HexColor,
    pub rect: PixelRect,
}

pub trait RenderAdapter {
    /// Called once per frame with every visible cell, in z-order.
    fn render(&mut self, cells: &[CellView], theme: &Theme);
}

/// A pressed cell always takes the theme's pressed color so the highlight
/// reads the same everywhere; the fill override only applies at rest.
pub fn fill_color(cell: &Cell, pressed: bool, theme: &Theme) -> HexColor {
    match (pressed, cell.is_mouse()) {
        (true, true) => theme.mouse_pressed.clone(),
        (true, false) => theme.key_pressed.clone(),
        (false, mouse) => cell.color.clone().unwrap_or_else(|| {
            if mouse {
                theme.mouse_idle.clone()
            } else {
                theme.key_idle.clone()
            }
        }),
    }
}

pub fn pixel_rect(cell: &Cell, theme: &Theme) -> PixelRect {
    let (unit, height, gap) = (theme.unit_px, theme.height_px, theme.gap_px);
    PixelRect {
        x: PAD_PX + cell.position.x * (unit + gap),
        y: PAD_PX + cell.position.y * (height + gap),
        w: cell.size.w * unit + (cell.size.w - 1.0) * gap,
        h: cell.size.h * height + (cell.size.h - 1.0) * gap,
    }
}

pub fn cell_view(cell: &Cell, pressed: bool, theme: &Theme) -> CellView {
    CellView {
        id: cell.id.clone(),
        label: cell.label.clone(),
        pressed,
        fill: fill_color(cell, pressed, theme),
        text: cell
            .text_color
            .clone()
            .unwrap_or_else(|| theme.key_text.clone()),
        outline: theme.key_outline.clone(),
        rect: pixel_rect(cell, theme),
    }
}

/// `is_pressed` is asked once per cell.
pub fn compose_frame<F>(layout: &Layout, theme: &Theme, is_pressed: F) -> Vec<CellView>
where
    F: Fn(&Cell) -> bool,
{
    layout
        .cells()
        .iter()
        .map(|cell| cell_view(cell, is_pressed(cell), theme))
        .collect()
}

/// Overlay window size in pixels, padding included.
pub fn canvas_size(layout: &Layout, theme: &Theme) -> (u32, u32) {
    let (w, h) = layout
        .cells()
        .iter()
        .map(|c| pixel_rect(c, theme))
        .fold((0.0f32, 0.0f32), |(w, h), r| {
            (w.max(r.x + r.w - PAD_PX), h.max(r.y + r.h - PAD_PX))
        });
    (
        (w.max(0.0) + PAD_PX * 2.0).ceil() as u32,
        (h.max(0.0) + PAD_PX * 2.0).ceil() as u32,
    )
}

/// Keeps the last frame instead of drawing it. Used by the CLI and tests.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub frames: usize,
    pub last: Vec<CellView>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pressed_ids(&self) -> Vec<&str> {
        self.last
            .iter()
            .filter(|v| v.pressed)
            .map(|v| v.id.as_str())
            .collect()
    }

    pub fn view(&self, id: &str) -> Option<&CellView> {
        self.last.iter().find(|v| v.id == id)
    }
}

impl RenderAdapter for RecordingRenderer {
    fn render(&mut self, cells: &[CellView], _theme: &Theme) {
        self.frames += 1;
        self.last = cells.to_vec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Size};

    #[test]
    fn test_pixel_rect_spans_gaps() {
        let theme = Theme::default();
        let mut cell = Cell::new("space", "Space");
        cell.position = Point::new(3.75, 5.0);
        cell.size = Size::new(6.25, 1.0);

        let r = pixel_rect(&cell, &theme);
        assert_eq!(r.x, 10.0 + 3.75 * 48.0);
        assert_eq!(r.y, 10.0 + 5.0 * 48.0);
        assert_eq!(r.w, 6.25 * 44.0 + 5.25 * 4.0);
        assert_eq!(r.h, 44.0);
    }

    #[test]
    fn test_pressed_ignores_fill_override() {
        let theme = Theme::default();
        let mut cell = Cell::new("w", "W");
        cell.color = Some(HexColor::known("#123456"));
        assert_eq!(fill_color(&cell, false, &theme).as_str(), "#123456");
        assert_eq!(fill_color(&cell, true, &theme), theme.key_pressed);
    }
}
