//! Direct-manipulation editing of a [`Layout`].
//!
//! The editor owns the layout for as long as editing mode lasts; the input
//! engine cannot observe it until [`LayoutEditor::into_layout`] hands it back.
//! Overlap between cells is allowed. Only the id and binding uniqueness
//! invariants and the minimum size are enforced.

pub mod snap;

use self::snap::{snap_point, Canvas};
use crate::config::EditorParams;
use crate::error::{OverlayError, OverlayResult};
use crate::geometry::{Cell, HexColor, Layout, OverrideField, Point, Rect, Size};
use crate::keycodes::KeyId;
use fastrand::Rng;
use tracing::{debug, info};
use typed_builder::TypedBuilder;

/// Initial attributes for [`LayoutEditor::add_cell`].
#[derive(TypedBuilder, Debug, Clone, PartialEq)]
pub struct CellSpec {
    #[builder(setter(into))]
    pub id: String,
    #[builder(default, setter(into))]
    pub label: String,
    #[builder(default)]
    pub position: Point,
    #[builder(default)]
    pub size: Size,
    #[builder(default, setter(strip_option))]
    pub bound_key: Option<KeyId>,
    #[builder(default, setter(strip_option))]
    pub color: Option<HexColor>,
    #[builder(default, setter(strip_option))]
    pub text_color: Option<HexColor>,
}

impl From<CellSpec> for Cell {
    fn from(spec: CellSpec) -> Self {
        Cell {
            id: spec.id,
            bound_key: spec.bound_key,
            label: spec.label,
            position: spec.position,
            size: spec.size,
            color: spec.color,
            text_color: spec.text_color,
        }
    }
}

pub struct LayoutEditor {
    layout: Layout,
    params: EditorParams,
    selection: Option<String>,
    dirty: bool,
    rng: Rng,
}

impl LayoutEditor {
    pub fn new(layout: Layout, params: EditorParams) -> Self {
        debug!("Editor opened on '{}' ({} cells)", layout.name, layout.len());
        Self {
            layout,
            params,
            selection: None,
            dirty: false,
            rng: Rng::new(),
        }
    }

    /// Deterministic id generation for [`Self::add_default_cell`].
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Rng::with_seed(seed);
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Ends the editing session. Selection state is discarded.
    pub fn into_layout(self) -> Layout {
        self.layout
    }

    /// Swaps in another layout, dropping the selection.
    pub fn replace_layout(&mut self, layout: Layout) -> Layout {
        self.clear_selection();
        self.dirty = false;
        std::mem::replace(&mut self.layout, layout)
    }

    pub fn params(&self) -> &EditorParams {
        &self.params
    }

    pub fn set_params(&mut self, params: EditorParams) -> OverlayResult<()> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    pub fn set_snap(&mut self, enabled: bool) {
        debug!("Snap-to-grid: {}", enabled);
        self.params.snap_to_grid = enabled;
    }

    pub fn snap_step(&self) -> f32 {
        self.layout.grid_unit() / self.params.snap_divisions.max(1) as f32
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    // --- Selection ---

    /// Hit-tests in z-order; the topmost cell wins. Empty canvas clears the
    /// selection and returns `None`.
    pub fn select(&mut self, point: Point) -> Option<&Cell> {
        self.selection = self.layout.hit_test(point).map(|c| c.id.clone());
        self.selected()
    }

    pub fn select_id(&mut self, id: &str) -> OverlayResult<&Cell> {
        let cell = self
            .layout
            .get(id)
            .ok_or_else(|| OverlayError::NotFound(format!("cell '{}'", id)))?;
        self.selection = Some(cell.id.clone());
        Ok(cell)
    }

    pub fn selected(&self) -> Option<&Cell> {
        self.selection.as_deref().and_then(|id| self.layout.get(id))
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    // --- Geometry ---

    fn check_canvas(&self, id: &str, rect: &Rect) -> OverlayResult<()> {
        match Canvas::from_params(&self.params) {
            Some(canvas) if !canvas.admits(rect) => Err(OverlayError::OutOfBounds(format!(
                "cell '{}' at ({}, {}) would sit entirely outside the {}x{} canvas",
                id, rect.x, rect.y, canvas.width, canvas.height
            ))),
            _ => Ok(()),
        }
    }

    /// Returns the position actually stored, after snapping.
    pub fn move_cell(&mut self, id: &str, position: Point) -> OverlayResult<Point> {
        let cell = self
            .layout
            .get(id)
            .ok_or_else(|| OverlayError::NotFound(format!("cell '{}'", id)))?;

        let target = if self.params.snap_to_grid {
            snap_point(position, self.snap_step())
        } else {
            position
        };

        let rect = Rect {
            x: target.x,
            y: target.y,
            w: cell.size.w,
            h: cell.size.h,
        };
        self.check_canvas(id, &rect)?;

        self.layout.set_position(id, target)?;
        self.dirty = true;
        debug!("Moved '{}' to ({}, {})", id, target.x, target.y);
        Ok(target)
    }

    pub fn resize(&mut self, id: &str, size: Size) -> OverlayResult<()> {
        let cell = self
            .layout
            .get(id)
            .ok_or_else(|| OverlayError::NotFound(format!("cell '{}'", id)))?;
        let rect = Rect {
            x: cell.position.x,
            y: cell.position.y,
            w: size.w,
            h: size.h,
        };
        self.check_canvas(id, &rect)?;

        self.layout.set_size(id, size)?;
        self.dirty = true;
        debug!("Resized '{}' to {}x{}", id, size.w, size.h);
        Ok(())
    }

    // --- Attributes ---

    /// `None` clears the override so the theme default applies again.
    pub fn set_override(
        &mut self,
        id: &str,
        field: OverrideField,
        value: Option<HexColor>,
    ) -> OverlayResult<()> {
        self.layout.set_override(id, field, value)?;
        self.dirty = true;
        Ok(())
    }

    pub fn set_label(&mut self, id: &str, label: impl Into<String>) -> OverlayResult<()> {
        self.layout.set_label(id, label)?;
        self.dirty = true;
        Ok(())
    }

    pub fn rename_cell(&mut self, id: &str, new_id: &str) -> OverlayResult<()> {
        self.layout.rename_cell(id, new_id)?;
        if self.selection.as_deref() == Some(id) {
            self.selection = Some(new_id.to_string());
        }
        self.dirty = true;
        Ok(())
    }

    /// Fails with `Conflict` when another cell already owns `key`.
    pub fn bind_key(&mut self, id: &str, key: Option<KeyId>) -> OverlayResult<Option<KeyId>> {
        let previous = self.layout.set_binding(id, key)?;
        self.dirty = true;
        Ok(previous)
    }

    // --- Structure ---

    pub fn add_cell(&mut self, spec: CellSpec) -> OverlayResult<&Cell> {
        let cell: Cell = spec.into();
        self.check_canvas(&cell.id, &cell.rect())?;
        let id = cell.id.clone();
        self.layout.insert_cell(cell)?;
        self.dirty = true;
        info!("Added cell: {}", id);
        self.select_id(&id)
    }

    /// Adds a blank 1x1 cell on the row below the current content and
    /// selects it.
    pub fn add_default_cell(&mut self) -> OverlayResult<&Cell> {
        let id = loop {
            let candidate = format!("key_{:06x}", self.rng.u32(..0x0100_0000));
            if !self.layout.contains(&candidate) {
                break candidate;
            }
        };
        let row = self
            .layout
            .bounds()
            .map(|b| b.bottom().ceil())
            .unwrap_or(0.0);

        let spec = CellSpec::builder()
            .id(id)
            .label("New")
            .position(Point::new(0.0, row))
            .build();
        self.add_cell(spec)
    }

    pub fn delete(&mut self, id: &str) -> OverlayResult<Cell> {
        let cell = self.layout.remove_cell(id)?;
        if self.selection.as_deref() == Some(id) {
            self.clear_selection();
        }
        self.dirty = true;
        info!("Deleted cell: {}", id);
        Ok(cell)
    }

    pub fn delete_selected(&mut self) -> OverlayResult<Option<Cell>> {
        match self.selection.clone() {
            Some(id) => self.delete(&id).map(Some),
            None => Ok(None),
        }
    }
}
