use keyoverlay::geometry::{Cell, HexColor, Layout, Point, Size, MIN_CELL_SIZE};
use keyoverlay::input::InputStateEngine;
use keyoverlay::keycodes::{Action, KeyId};
use keyoverlay::store;
use proptest::prelude::*;
use std::collections::HashSet;

// --- STRATEGIES ---

const KEYS: &[&str] = &[
    "KEY_W", "KEY_A", "KEY_S", "KEY_D", "KEY_Q", "KEY_E", "KEY_SPACE", "BTN_LEFT",
];

fn arb_key() -> impl Strategy<Value = KeyId> {
    proptest::sample::select(KEYS).prop_map(|k| KeyId::new(k).unwrap())
}

fn arb_color() -> impl Strategy<Value = Option<HexColor>> {
    proptest::option::of("#[0-9a-f]{6}".prop_map(|s| HexColor::new(&s).unwrap()))
}

// Positions and sizes on the quarter grid, exact in binary and in JSON.
fn quarters(range: std::ops::Range<i32>) -> impl Strategy<Value = f32> {
    range.prop_map(|q| q as f32 / 4.0)
}

prop_compose! {
    fn arb_cell()(
        x in quarters(-80..80),
        y in quarters(-80..80),
        w in quarters(1..24),
        h in quarters(1..12),
        label in "[A-Za-z0-9 ]{0,8}",
        bound_key in proptest::option::of(arb_key()),
        color in arb_color(),
        text_color in arb_color(),
    ) -> Cell {
        Cell {
            id: String::new(),
            bound_key,
            label,
            position: Point::new(x, y),
            size: Size::new(w, h),
            color,
            text_color,
        }
    }
}

// Free placement: any finite position, any size at or above the minimum.
fn finite() -> impl Strategy<Value = f32> {
    prop::num::f32::NORMAL | prop::num::f32::SUBNORMAL | prop::num::f32::ZERO
}

prop_compose! {
    fn arb_free_cell()(
        cell in arb_cell(),
        x in finite(),
        y in finite(),
        w in MIN_CELL_SIZE..1.0e6f32,
        h in MIN_CELL_SIZE..1.0e6f32,
    ) -> Cell {
        Cell {
            position: Point::new(x, y),
            size: Size::new(w, h),
            ..cell
        }
    }
}

// Cells that would collide on a key are inserted unbound instead.
fn layout_of(cells: Vec<Cell>) -> Layout {
    let mut layout = Layout::new("prop");
    for (i, mut cell) in cells.into_iter().enumerate() {
        cell.id = format!("c{}", i);
        if cell.bound_key.as_ref().is_some_and(|k| layout.cell_for_key(k).is_some()) {
            cell.bound_key = None;
        }
        layout.insert_cell(cell).unwrap();
    }
    layout
}

fn arb_layout() -> impl Strategy<Value = Layout> {
    proptest::collection::vec(arb_cell(), 0..24).prop_map(layout_of)
}

fn arb_free_layout() -> impl Strategy<Value = Layout> {
    proptest::collection::vec(arb_free_cell(), 0..24).prop_map(layout_of)
}

#[derive(Debug, Clone)]
enum Op {
    Bind(usize, Option<KeyId>),
    Move(usize, f32, f32),
    Delete(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..24usize, proptest::option::of(arb_key())).prop_map(|(i, k)| Op::Bind(i, k)),
        (0..24usize, -10.0..10.0f32, -10.0..10.0f32).prop_map(|(i, x, y)| Op::Move(i, x, y)),
        (0..24usize).prop_map(Op::Delete),
    ]
}

proptest! {
    #[test]
    fn prop_saved_layout_loads_back_equal(layout in arb_layout()) {
        let text = store::layout_to_string(&layout).unwrap();
        let loaded = store::layout_from_str(&text).unwrap();
        prop_assert_eq!(loaded, layout);
    }

    #[test]
    fn prop_freely_placed_layout_loads_back_equal(layout in arb_free_layout()) {
        let text = store::layout_to_string(&layout).unwrap();
        let loaded = store::layout_from_str(&text).unwrap();
        prop_assert_eq!(loaded, layout);
    }

    #[test]
    fn prop_bindings_stay_unique(
        layout in arb_layout(),
        ops in proptest::collection::vec(arb_op(), 0..40),
    ) {
        let mut layout = layout;
        for op in ops {
            let ids: Vec<String> = layout.cells().iter().map(|c| c.id.clone()).collect();
            if ids.is_empty() {
                break;
            }
            // Failures are allowed; they must leave the layout valid.
            let _ = match op {
                Op::Bind(i, key) => layout.set_binding(&ids[i % ids.len()], key).map(|_| ()),
                Op::Move(i, x, y) => layout.set_position(&ids[i % ids.len()], Point::new(x, y)),
                Op::Delete(i) => layout.remove_cell(&ids[i % ids.len()]).map(|_| ()),
            };

            let bound: Vec<&KeyId> = layout.cells().iter().filter_map(|c| c.bound_key.as_ref()).collect();
            let unique: HashSet<&KeyId> = bound.iter().copied().collect();
            prop_assert_eq!(bound.len(), unique.len());
            for key in bound {
                let owner = layout.cell_for_key(key).unwrap();
                prop_assert_eq!(owner.bound_key.as_ref(), Some(key));
            }
            prop_assert!(layout.validate().is_ok());
        }
    }

    #[test]
    fn prop_engine_lights_exactly_the_held_bound_keys(
        layout in arb_layout(),
        events in proptest::collection::vec((arb_key(), any::<bool>()), 0..100),
    ) {
        let mut engine = InputStateEngine::new();
        let mut held: HashSet<KeyId> = HashSet::new();
        for (key, down) in events {
            engine.on_event(&layout, &key, Action::from_pressed(down));
            if down {
                held.insert(key);
            } else {
                held.remove(&key);
            }
        }

        let expected: Vec<&str> = layout
            .cells()
            .iter()
            .filter(|c| c.bound_key.as_ref().is_some_and(|k| held.contains(k)))
            .map(|c| c.id.as_str())
            .collect();
        prop_assert_eq!(engine.highlighted(&layout), expected);

        let released = engine.reset(&layout);
        prop_assert!(released.iter().all(|c| !c.pressed));
        prop_assert_eq!(engine.pressed_count(), 0);
    }
}
