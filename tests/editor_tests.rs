mod common;

use common::{create_layout, key, mock_wasd, CellBuilder};
use keyoverlay::config::EditorParams;
use keyoverlay::editor::{CellSpec, LayoutEditor};
use keyoverlay::error::OverlayError;
use keyoverlay::geometry::{HexColor, Layout, OverrideField, Point, Size};
use regex::Regex;

fn editor_on(layout: Layout) -> LayoutEditor {
    LayoutEditor::new(layout, EditorParams::default()).with_seed(7)
}

#[test]
fn test_move_snaps_to_whole_units() {
    let mut editor = editor_on(mock_wasd());
    let stored = editor.move_cell("w", Point::new(2.3, 4.7)).unwrap();
    assert_eq!(stored, Point::new(2.0, 5.0));
    assert_eq!(editor.layout().get("w").unwrap().position, Point::new(2.0, 5.0));
    assert!(editor.is_dirty());
}

#[test]
fn test_move_free_placement_when_snap_off() {
    let mut editor = editor_on(mock_wasd());
    editor.set_snap(false);
    let stored = editor.move_cell("w", Point::new(2.3, 4.7)).unwrap();
    assert_eq!(stored, Point::new(2.3, 4.7));
}

#[test]
fn test_move_snaps_to_subdivisions() {
    let params = EditorParams {
        snap_divisions: 4,
        ..Default::default()
    };
    let mut editor = LayoutEditor::new(mock_wasd(), params);
    let stored = editor.move_cell("a", Point::new(1.3, 0.6)).unwrap();
    assert_eq!(stored, Point::new(1.25, 0.5));
}

#[test]
fn test_move_outside_canvas_is_rejected() {
    let params = EditorParams {
        canvas_width: Some(10.0),
        canvas_height: Some(5.0),
        ..Default::default()
    };
    let mut editor = LayoutEditor::new(mock_wasd(), params);

    let err = editor.move_cell("w", Point::new(12.0, 1.0)).unwrap_err();
    assert!(matches!(err, OverlayError::OutOfBounds(_)));
    assert_eq!(editor.layout().get("w").unwrap().position, Point::new(1.0, 0.0));
    assert!(!editor.is_dirty());

    // Hanging partly off the edge is fine.
    assert!(editor.move_cell("w", Point::new(9.5, 4.5)).is_ok());
}

#[test]
fn test_resize_cannot_shrink_a_cell_off_the_canvas() {
    let params = EditorParams {
        canvas_width: Some(10.0),
        canvas_height: Some(5.0),
        snap_to_grid: false,
        ..Default::default()
    };
    let mut editor = LayoutEditor::new(mock_wasd(), params);
    editor.resize("w", Size::new(2.0, 1.0)).unwrap();
    editor.move_cell("w", Point::new(-1.5, 0.0)).unwrap();

    let err = editor.resize("w", Size::new(1.0, 1.0)).unwrap_err();
    assert!(matches!(err, OverlayError::OutOfBounds(_)));
    assert_eq!(editor.layout().get("w").unwrap().size, Size::new(2.0, 1.0));

    editor.resize("w", Size::new(1.75, 1.0)).unwrap();
    assert!(matches!(
        editor.resize("nope", Size::new(1.0, 1.0)),
        Err(OverlayError::NotFound(_))
    ));
}

#[test]
fn test_canvas_must_have_positive_size() {
    for (w, h) in [(Some(0.0), None), (None, Some(-3.0)), (Some(f32::NAN), Some(4.0))] {
        let params = EditorParams {
            canvas_width: w,
            canvas_height: h,
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(OverlayError::OutOfBounds(_))));

        let mut editor = editor_on(mock_wasd());
        assert!(editor.set_params(params).is_err());
        assert_eq!(editor.params(), &EditorParams::default());
    }
    assert!(EditorParams::default().validate().is_ok());
}

#[test]
fn test_overlap_is_allowed() {
    let mut editor = editor_on(mock_wasd());
    editor.move_cell("a", Point::new(1.0, 1.0)).unwrap();
    assert_eq!(editor.layout().get("s").unwrap().position, Point::new(1.0, 1.0));
    assert_eq!(editor.layout().get("a").unwrap().position, Point::new(1.0, 1.0));
}

#[test]
fn test_select_topmost_wins() {
    let layout = create_layout(
        "stack",
        vec![
            CellBuilder::new("back").pos(0.0, 0.0).size(3.0, 3.0).build(),
            CellBuilder::new("front").bound("KEY_F").pos(1.0, 1.0).build(),
        ],
    );
    let mut editor = editor_on(layout);

    assert_eq!(editor.select(Point::new(1.5, 1.5)).unwrap().id, "front");
    assert_eq!(editor.select(Point::new(0.5, 0.5)).unwrap().id, "back");
    assert!(editor.select(Point::new(5.0, 5.0)).is_none());
    assert!(editor.selected().is_none());
}

#[test]
fn test_resize_below_minimum_fails() {
    let mut editor = editor_on(mock_wasd());
    let err = editor.resize("w", Size::new(0.1, 1.0)).unwrap_err();
    assert!(matches!(err, OverlayError::OutOfBounds(_)));
    assert_eq!(editor.layout().get("w").unwrap().size, Size::new(1.0, 1.0));

    editor.resize("w", Size::new(2.0, 0.25)).unwrap();
    assert_eq!(editor.layout().get("w").unwrap().size, Size::new(2.0, 0.25));
    // Neighbours stay put.
    assert_eq!(editor.layout().get("d").unwrap().position, Point::new(2.0, 1.0));
}

#[test]
fn test_override_set_and_clear() {
    let mut editor = editor_on(mock_wasd());
    let red = HexColor::new("#ff0000").unwrap();
    editor
        .set_override("w", OverrideField::Color, Some(red.clone()))
        .unwrap();
    assert_eq!(editor.layout().get("w").unwrap().color, Some(red));

    editor.set_override("w", OverrideField::Color, None).unwrap();
    assert_eq!(editor.layout().get("w").unwrap().color, None);
}

#[test]
fn test_bind_conflict_keeps_first_binding() {
    let layout = create_layout(
        "pair",
        vec![
            CellBuilder::new("cellA").build(),
            CellBuilder::new("cellB").build(),
        ],
    );
    let mut editor = editor_on(layout);

    editor.bind_key("cellA", Some(key("KEY_W"))).unwrap();
    let err = editor.bind_key("cellB", Some(key("KEY_W"))).unwrap_err();
    match err {
        OverlayError::Conflict { key: k, cell } => {
            assert_eq!(k, key("KEY_W"));
            assert_eq!(cell, "cellA");
        }
        other => panic!("expected Conflict, got {:?}", other),
    }

    let layout = editor.layout();
    assert_eq!(layout.get("cellA").unwrap().bound_key, Some(key("KEY_W")));
    assert_eq!(layout.get("cellB").unwrap().bound_key, None);
    assert_eq!(layout.cell_for_key(&key("KEY_W")).unwrap().id, "cellA");
}

#[test]
fn test_unbinding_frees_the_key() {
    let mut editor = editor_on(mock_wasd());
    let previous = editor.bind_key("w", None).unwrap();
    assert_eq!(previous, Some(key("KEY_W")));
    editor.bind_key("title", Some(key("KEY_W"))).unwrap();
    assert_eq!(
        editor.layout().cell_for_key(&key("KEY_W")).unwrap().id,
        "title"
    );
}

#[test]
fn test_add_duplicate_id_fails() {
    let mut editor = editor_on(Layout::new("empty"));
    editor.add_cell(CellSpec::builder().id("w").build()).unwrap();
    let err = editor
        .add_cell(CellSpec::builder().id("w").label("again").build())
        .unwrap_err();
    assert!(matches!(err, OverlayError::DuplicateId(ref id) if id == "w"));
    assert_eq!(
        editor.layout().cells().iter().filter(|c| c.id == "w").count(),
        1
    );
}

#[test]
fn test_add_cell_with_taken_binding_fails_whole() {
    let mut editor = editor_on(mock_wasd());
    let before = editor.layout().len();
    let spec = CellSpec::builder()
        .id("w2")
        .bound_key(key("KEY_W"))
        .build();
    assert!(matches!(
        editor.add_cell(spec),
        Err(OverlayError::Conflict { .. })
    ));
    assert_eq!(editor.layout().len(), before);
    assert!(!editor.layout().contains("w2"));
}

#[test]
fn test_add_default_cell() {
    let mut editor = editor_on(mock_wasd());
    let id_shape = Regex::new(r"^key_[0-9a-f]{6}$").unwrap();

    let cell = editor.add_default_cell().unwrap().clone();
    assert!(id_shape.is_match(&cell.id), "{}", cell.id);
    assert_eq!(cell.label, "New");
    assert_eq!(cell.bound_key, None);
    // Below the title row, which ends at y = 4.
    assert_eq!(cell.position, Point::new(0.0, 4.0));
    assert_eq!(editor.selected().unwrap().id, cell.id);

    let second = editor.add_default_cell().unwrap().id.clone();
    assert_ne!(second, cell.id);
}

#[test]
fn test_replacing_the_layout_drops_selection() {
    let mut editor = editor_on(mock_wasd());
    editor.select_id("s").unwrap();
    editor.move_cell("s", Point::new(3.0, 3.0)).unwrap();

    let old = editor.replace_layout(mock_wasd());
    assert_eq!(old.get("s").unwrap().position, Point::new(3.0, 3.0));
    assert!(editor.selected().is_none());
    assert!(!editor.is_dirty());

    editor.select_id("a").unwrap();
    editor.clear_selection();
    assert!(editor.select(Point::new(50.0, 50.0)).is_none());
    assert!(editor.selected().is_none());
}

#[test]
fn test_delete_selected() {
    let mut editor = editor_on(mock_wasd());
    editor.select(Point::new(1.5, 0.5));
    let removed = editor.delete_selected().unwrap().unwrap();
    assert_eq!(removed.id, "w");
    assert!(!editor.layout().contains("w"));
    assert!(editor.layout().cell_for_key(&key("KEY_W")).is_none());
    assert!(editor.delete_selected().unwrap().is_none());
}

#[test]
fn test_delete_unknown_is_not_found() {
    let mut editor = editor_on(mock_wasd());
    assert!(matches!(editor.delete("nope"), Err(OverlayError::NotFound(_))));
    assert!(matches!(
        editor.move_cell("nope", Point::new(0.0, 0.0)),
        Err(OverlayError::NotFound(_))
    ));
}

#[test]
fn test_rename_follows_selection() {
    let mut editor = editor_on(mock_wasd());
    editor.select_id("a").unwrap();
    editor.rename_cell("a", "left").unwrap();
    assert_eq!(editor.selected().unwrap().id, "left");
    assert_eq!(
        editor.layout().cell_for_key(&key("KEY_A")).unwrap().id,
        "left"
    );
    assert!(matches!(
        editor.rename_cell("left", "w"),
        Err(OverlayError::DuplicateId(_))
    ));
}

#[test]
fn test_mark_saved_clears_dirty() {
    let mut editor = editor_on(mock_wasd());
    editor.set_label("title", "Movement").unwrap();
    assert!(editor.is_dirty());
    editor.mark_saved();
    assert!(!editor.is_dirty());
    assert_eq!(editor.into_layout().get("title").unwrap().label, "Movement");
}
