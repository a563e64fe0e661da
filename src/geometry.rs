use crate::error::{OverlayError, OverlayResult};
use crate::keycodes::{KeyId, KeyboardLocale, ModifierPolicy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

/// Smallest width or height a cell may have, in grid units.
pub const MIN_CELL_SIZE: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub w: f32,
    pub h: f32,
}

impl Default for Size {
    fn default() -> Self {
        Self { w: 1.0, h: 1.0 }
    }
}

impl Size {
    pub fn new(w: f32, h: f32) -> Self {
        Self { w, h }
    }

    pub fn check(&self) -> OverlayResult<()> {
        // NaN fails both comparisons, so it lands here too.
        if !(self.w >= MIN_CELL_SIZE && self.h >= MIN_CELL_SIZE)
            || !self.w.is_finite()
            || !self.h.is_finite()
        {
            return Err(OverlayError::OutOfBounds(format!(
                "size {}x{} is below the minimum of {}",
                self.w, self.h, MIN_CELL_SIZE
            )));
        }
        Ok(())
    }
}

/// Axis-aligned rectangle in grid units. Containment is half-open so two
/// abutting cells never both claim their shared edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect {
            x,
            y,
            w: self.right().max(other.right()) - x,
            h: self.bottom().max(other.bottom()) - y,
        }
    }
}

/// A `#rgb`, `#rrggbb` or `#rrggbbaa` color string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    pub fn new(raw: &str) -> OverlayResult<Self> {
        let hex = raw
            .strip_prefix('#')
            .ok_or_else(|| OverlayError::Invalid(format!("color '{}' must start with '#'", raw)))?;
        let valid_len = matches!(hex.len(), 3 | 6 | 8);
        if !valid_len || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(OverlayError::Invalid(format!("malformed color '{}'", raw)));
        }
        Ok(Self(raw.to_string()))
    }

    pub(crate) fn known(raw: &str) -> Self {
        Self(raw.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for HexColor {
    type Err = OverlayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for HexColor {
    type Error = OverlayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<HexColor> for String {
    fn from(c: HexColor) -> Self {
        c.0
    }
}

/// Per-cell attributes that fall back to the theme when unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, Display)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum OverrideField {
    Color,
    TextColor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub id: String,
    pub bound_key: Option<KeyId>,
    pub label: String,
    pub position: Point,
    pub size: Size,
    pub color: Option<HexColor>,
    pub text_color: Option<HexColor>,
}

impl Cell {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            bound_key: None,
            label: label.into(),
            position: Point::default(),
            size: Size::default(),
            color: None,
            text_color: None,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect {
            x: self.position.x,
            y: self.position.y,
            w: self.size.w,
            h: self.size.h,
        }
    }

    pub fn is_mouse(&self) -> bool {
        self.bound_key.as_ref().is_some_and(KeyId::is_mouse)
    }

    pub fn override_value(&self, field: OverrideField) -> Option<&HexColor> {
        match field {
            OverrideField::Color => self.color.as_ref(),
            OverrideField::TextColor => self.text_color.as_ref(),
        }
    }

    fn check(&self) -> OverlayResult<()> {
        if self.id.trim().is_empty() {
            return Err(OverlayError::Invalid("cell id must not be empty".to_string()));
        }
        if !self.position.is_finite() {
            return Err(OverlayError::OutOfBounds(format!(
                "cell '{}' has a non-finite position",
                self.id
            )));
        }
        self.size.check()
    }
}

/// A named, ordered arrangement of cells. Order is z-order: later cells
/// draw on top and win hit-tests.
///
/// Invariants: cell ids are unique, and each Key Id is bound by at most one
/// cell. Every mutator either applies fully or returns an error with the
/// layout untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub name: String,
    pub locale: KeyboardLocale,
    pub modifiers: ModifierPolicy,
    grid_unit: f32,
    cells: Vec<Cell>,
    bindings: HashMap<KeyId, usize>,
}

impl Layout {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locale: KeyboardLocale::default(),
            modifiers: ModifierPolicy::default(),
            grid_unit: 1.0,
            cells: Vec::new(),
            bindings: HashMap::new(),
        }
    }

    pub fn with_locale(mut self, locale: KeyboardLocale) -> Self {
        self.locale = locale;
        self
    }

    pub fn from_cells(name: impl Into<String>, cells: Vec<Cell>) -> OverlayResult<Self> {
        let mut layout = Self::new(name);
        for cell in cells {
            layout.insert_cell(cell)?;
        }
        Ok(layout)
    }

    pub fn grid_unit(&self) -> f32 {
        self.grid_unit
    }

    pub fn set_grid_unit(&mut self, unit: f32) -> OverlayResult<()> {
        if !(unit.is_finite() && unit > 0.0) {
            return Err(OverlayError::OutOfBounds(format!(
                "grid unit {} must be positive",
                unit
            )));
        }
        self.grid_unit = unit;
        Ok(())
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Cell> {
        self.cells.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn cell_for_key(&self, key: &KeyId) -> Option<&Cell> {
        self.bindings.get(key).map(|&i| &self.cells[i])
    }

    fn index_of(&self, id: &str) -> OverlayResult<usize> {
        self.cells
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| OverlayError::NotFound(format!("cell '{}'", id)))
    }

    fn check_binding(&self, key: &KeyId, owner: &str) -> OverlayResult<()> {
        match self.cell_for_key(key) {
            Some(other) if other.id != owner => Err(OverlayError::Conflict {
                key: key.clone(),
                cell: other.id.clone(),
            }),
            _ => Ok(()),
        }
    }

    fn rebuild_bindings(&mut self) {
        self.bindings = self
            .cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.bound_key.clone().map(|k| (k, i)))
            .collect();
    }

    /// Appends a cell on top of the z-order.
    pub fn insert_cell(&mut self, cell: Cell) -> OverlayResult<()> {
        cell.check()?;
        if self.contains(&cell.id) {
            return Err(OverlayError::DuplicateId(cell.id));
        }
        if let Some(key) = &cell.bound_key {
            self.check_binding(key, &cell.id)?;
            self.bindings.insert(key.clone(), self.cells.len());
        }
        self.cells.push(cell);
        Ok(())
    }

    pub fn remove_cell(&mut self, id: &str) -> OverlayResult<Cell> {
        let idx = self.index_of(id)?;
        let cell = self.cells.remove(idx);
        self.rebuild_bindings();
        Ok(cell)
    }

    /// Returns the previous binding. Binding `None` frees the old key.
    pub fn set_binding(&mut self, id: &str, key: Option<KeyId>) -> OverlayResult<Option<KeyId>> {
        let idx = self.index_of(id)?;
        if let Some(k) = &key {
            self.check_binding(k, id)?;
        }
        let previous = std::mem::replace(&mut self.cells[idx].bound_key, key.clone());
        if let Some(old) = &previous {
            self.bindings.remove(old);
        }
        if let Some(new) = key {
            self.bindings.insert(new, idx);
        }
        Ok(previous)
    }

    pub fn set_position(&mut self, id: &str, position: Point) -> OverlayResult<()> {
        let idx = self.index_of(id)?;
        if !position.is_finite() {
            return Err(OverlayError::OutOfBounds(format!(
                "position ({}, {}) is not finite",
                position.x, position.y
            )));
        }
        self.cells[idx].position = position;
        Ok(())
    }

    pub fn set_size(&mut self, id: &str, size: Size) -> OverlayResult<()> {
        let idx = self.index_of(id)?;
        size.check()?;
        self.cells[idx].size = size;
        Ok(())
    }

    pub fn set_override(
        &mut self,
        id: &str,
        field: OverrideField,
        value: Option<HexColor>,
    ) -> OverlayResult<()> {
        let idx = self.index_of(id)?;
        let cell = &mut self.cells[idx];
        match field {
            OverrideField::Color => cell.color = value,
            OverrideField::TextColor => cell.text_color = value,
        }
        Ok(())
    }

    pub fn set_label(&mut self, id: &str, label: impl Into<String>) -> OverlayResult<()> {
        let idx = self.index_of(id)?;
        self.cells[idx].label = label.into();
        Ok(())
    }

    pub fn rename_cell(&mut self, id: &str, new_id: &str) -> OverlayResult<()> {
        let idx = self.index_of(id)?;
        if new_id.trim().is_empty() {
            return Err(OverlayError::Invalid("cell id must not be empty".to_string()));
        }
        if id != new_id && self.contains(new_id) {
            return Err(OverlayError::DuplicateId(new_id.to_string()));
        }
        self.cells[idx].id = new_id.to_string();
        Ok(())
    }

    /// Topmost cell under `point`, or `None` for empty canvas.
    pub fn hit_test(&self, point: Point) -> Option<&Cell> {
        self.cells.iter().rev().find(|c| c.rect().contains(point))
    }

    /// Smallest rectangle enclosing every cell.
    pub fn bounds(&self) -> Option<Rect> {
        let mut rects = self.cells.iter().map(Cell::rect);
        let first = rects.next()?;
        Some(rects.fold(first, |acc, r| acc.union(&r)))
    }

    /// Re-checks every invariant from scratch.
    pub fn validate(&self) -> OverlayResult<()> {
        Self::from_cells(self.name.clone(), self.cells.clone()).map(|_| ())
    }
}
