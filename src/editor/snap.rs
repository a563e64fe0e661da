use crate::config::EditorParams;
use crate::geometry::{Point, Rect};

/// Rounds `value` to the nearest multiple of `step`.
pub fn snap_value(value: f32, step: f32) -> f32 {
    if !(step.is_finite() && step > 0.0) {
        return value;
    }
    // `+ 0.0` folds -0.0 into 0.0
    (value / step).round() * step + 0.0
}

pub fn snap_point(p: Point, step: f32) -> Point {
    Point::new(snap_value(p.x, step), snap_value(p.y, step))
}

/// Optional placement bound anchored at the origin. An unset dimension is
/// unbounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
}

impl Canvas {
    pub fn from_params(params: &EditorParams) -> Option<Self> {
        if params.canvas_width.is_none() && params.canvas_height.is_none() {
            return None;
        }
        Some(Self {
            width: params.canvas_width.unwrap_or(f32::INFINITY),
            height: params.canvas_height.unwrap_or(f32::INFINITY),
        })
    }

    fn rect(&self) -> Rect {
        Rect {
            x: 0.0,
            y: 0.0,
            w: self.width,
            h: self.height,
        }
    }

    /// A cell is admitted while any part of it overlaps the canvas.
    pub fn admits(&self, cell: &Rect) -> bool {
        self.rect().intersects(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_to_whole_units() {
        let p = snap_point(Point::new(2.3, 4.7), 1.0);
        assert_eq!(p, Point::new(2.0, 5.0));
    }

    #[test]
    fn test_snap_to_quarter_units() {
        assert_eq!(snap_value(1.3, 0.25), 1.25);
        assert_eq!(snap_value(1.4, 0.25), 1.5);
    }

    #[test]
    fn test_snap_never_yields_negative_zero() {
        let v = snap_value(-0.2, 1.0);
        assert!(v.is_sign_positive());
    }

    #[test]
    fn test_canvas_admits_partial_overlap() {
        let canvas = Canvas {
            width: 10.0,
            height: 5.0,
        };
        let partly_out = Rect { x: 9.5, y: 0.0, w: 1.0, h: 1.0 };
        let fully_out = Rect { x: 10.0, y: 0.0, w: 1.0, h: 1.0 };
        assert!(canvas.admits(&partly_out));
        assert!(!canvas.admits(&fully_out));
    }
}
