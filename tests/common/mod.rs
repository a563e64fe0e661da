#![allow(dead_code)]

use keyoverlay::geometry::{Cell, HexColor, Layout, Point, Size};
use keyoverlay::keycodes::KeyId;

pub fn key(id: &str) -> KeyId {
    KeyId::new(id).unwrap()
}

/// Builder for Cell to keep tests short
pub struct CellBuilder {
    cell: Cell,
}

impl CellBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            cell: Cell::new(id, id.to_uppercase()),
        }
    }

    pub fn bound(mut self, key_id: &str) -> Self {
        self.cell.bound_key = Some(key(key_id));
        self
    }

    pub fn label(mut self, label: &str) -> Self {
        self.cell.label = label.to_string();
        self
    }

    pub fn pos(mut self, x: f32, y: f32) -> Self {
        self.cell.position = Point::new(x, y);
        self
    }

    pub fn size(mut self, w: f32, h: f32) -> Self {
        self.cell.size = Size::new(w, h);
        self
    }

    pub fn color(mut self, hex: &str) -> Self {
        self.cell.color = Some(HexColor::new(hex).unwrap());
        self
    }

    pub fn text_color(mut self, hex: &str) -> Self {
        self.cell.text_color = Some(HexColor::new(hex).unwrap());
        self
    }

    pub fn build(self) -> Cell {
        self.cell
    }
}

pub fn create_layout(name: &str, cells: Vec<Cell>) -> Layout {
    Layout::from_cells(name, cells).unwrap()
}

/// W, A, S, D in their usual spots plus an unbound label and a mouse button.
pub fn mock_wasd() -> Layout {
    create_layout(
        "mock",
        vec![
            CellBuilder::new("w").bound("KEY_W").pos(1.0, 0.0).build(),
            CellBuilder::new("a").bound("KEY_A").pos(0.0, 1.0).build(),
            CellBuilder::new("s").bound("KEY_S").pos(1.0, 1.0).build(),
            CellBuilder::new("d").bound("KEY_D").pos(2.0, 1.0).build(),
            CellBuilder::new("title").label("WASD").pos(0.0, 3.0).size(3.0, 1.0).build(),
            CellBuilder::new("lmb")
                .bound("BTN_LEFT")
                .pos(4.0, 0.0)
                .size(1.5, 1.5)
                .build(),
        ],
    )
}
