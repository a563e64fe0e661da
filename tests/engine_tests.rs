mod common;

use common::{create_layout, key, mock_wasd, CellBuilder};
use keyoverlay::input::{CellStateChanged, InputStateEngine};
use keyoverlay::keycodes::{Action, KeyEvent};

fn changed(id: &str, pressed: bool) -> CellStateChanged {
    CellStateChanged {
        cell_id: id.to_string(),
        pressed,
    }
}

#[test]
fn test_press_and_release_bound_key() {
    let layout = mock_wasd();
    let mut engine = InputStateEngine::new();

    assert_eq!(
        engine.on_event(&layout, &key("KEY_W"), Action::Pressed),
        Some(changed("w", true))
    );
    assert!(engine.is_pressed(&key("KEY_W")));
    assert_eq!(
        engine.on_event(&layout, &key("KEY_W"), Action::Released),
        Some(changed("w", false))
    );
    assert_eq!(engine.pressed_count(), 0);
}

#[test]
fn test_key_repeat_emits_once() {
    let layout = mock_wasd();
    let mut engine = InputStateEngine::new();

    let emitted: Vec<_> = (0..30)
        .filter_map(|_| engine.on_event(&layout, &key("KEY_A"), Action::Pressed))
        .collect();
    assert_eq!(emitted, vec![changed("a", true)]);

    let stats = engine.stats();
    assert_eq!(stats.events, 30);
    assert_eq!(stats.repeats_suppressed, 29);
    assert_eq!(stats.emitted, 1);
}

#[test]
fn test_release_without_press_is_noop() {
    let layout = mock_wasd();
    let mut engine = InputStateEngine::new();

    assert_eq!(engine.on_event(&layout, &key("KEY_D"), Action::Released), None);
    engine.on_event(&layout, &key("KEY_D"), Action::Pressed);
    engine.on_event(&layout, &key("KEY_D"), Action::Released);
    assert_eq!(engine.on_event(&layout, &key("KEY_D"), Action::Released), None);
    assert_eq!(engine.pressed_count(), 0);
}

#[test]
fn test_unbound_key_is_tracked_but_silent() {
    let layout = mock_wasd();
    let mut engine = InputStateEngine::new();

    assert_eq!(engine.on_event(&layout, &key("KEY_Q"), Action::Pressed), None);
    assert!(engine.is_pressed(&key("KEY_Q")));
    assert_eq!(engine.stats().unbound, 1);
    assert_eq!(engine.on_event(&layout, &key("KEY_Q"), Action::Released), None);
}

#[test]
fn test_mouse_shares_key_space() {
    let layout = mock_wasd();
    let mut engine = InputStateEngine::new();
    assert_eq!(
        engine.on_event(&layout, &key("BTN_LEFT"), Action::Pressed),
        Some(changed("lmb", true))
    );
}

#[test]
fn test_reset_releases_every_lit_cell() {
    let layout = mock_wasd();
    let mut engine = InputStateEngine::new();
    for k in ["KEY_W", "KEY_S", "KEY_Q"] {
        engine.on_event(&layout, &key(k), Action::Pressed);
    }
    assert_eq!(engine.highlighted(&layout), vec!["w", "s"]);

    let released = engine.reset(&layout);
    assert_eq!(released, vec![changed("w", false), changed("s", false)]);
    assert_eq!(engine.pressed_count(), 0);
    assert!(engine.reset(&layout).is_empty());
}

#[test]
fn test_rebinding_while_held_does_not_stick() {
    // The highlight follows the key, so a cell unbound mid-press is simply
    // never lit again.
    let mut layout = mock_wasd();
    let mut engine = InputStateEngine::new();
    engine.on_event(&layout, &key("KEY_W"), Action::Pressed);

    layout.set_binding("w", None).unwrap();
    assert!(engine.highlighted(&layout).is_empty());
    assert_eq!(engine.on_event(&layout, &key("KEY_W"), Action::Released), None);
}

fn via(source: &str, bound: &str, action: Action) -> KeyEvent {
    KeyEvent {
        source: key(source),
        key: key(bound),
        action,
    }
}

#[test]
fn test_collapsed_modifier_stays_lit_while_any_side_is_held() {
    let layout = create_layout(
        "mods",
        vec![CellBuilder::new("shift").bound("KEY_LEFTSHIFT").build()],
    );
    let mut engine = InputStateEngine::new();
    let left = |action| via("KEY_LEFTSHIFT", "KEY_LEFTSHIFT", action);
    let right = |action| via("KEY_RIGHTSHIFT", "KEY_LEFTSHIFT", action);

    assert_eq!(
        engine.on_input(&layout, &left(Action::Pressed)),
        Some(changed("shift", true))
    );
    assert_eq!(engine.on_input(&layout, &right(Action::Pressed)), None);
    assert_eq!(engine.on_input(&layout, &right(Action::Released)), None);
    assert_eq!(engine.highlighted(&layout), vec!["shift"]);
    assert_eq!(engine.pressed_count(), 1);

    // A repeat of the side still down is still a repeat.
    assert_eq!(engine.on_input(&layout, &left(Action::Pressed)), None);
    assert_eq!(engine.stats().repeats_suppressed, 1);

    assert_eq!(
        engine.on_input(&layout, &left(Action::Released)),
        Some(changed("shift", false))
    );
    assert!(!engine.is_pressed(&key("KEY_LEFTSHIFT")));
    assert_eq!(engine.on_input(&layout, &right(Action::Released)), None);
}

#[test]
fn test_reset_clears_collapsed_sources() {
    let layout = create_layout(
        "mods",
        vec![CellBuilder::new("ctrl").bound("KEY_LEFTCTRL").build()],
    );
    let mut engine = InputStateEngine::new();
    engine.on_input(&layout, &via("KEY_LEFTCTRL", "KEY_LEFTCTRL", Action::Pressed));
    engine.on_input(&layout, &via("KEY_RIGHTCTRL", "KEY_LEFTCTRL", Action::Pressed));

    assert_eq!(engine.reset(&layout), vec![changed("ctrl", false)]);
    assert_eq!(
        engine.on_input(&layout, &via("KEY_RIGHTCTRL", "KEY_LEFTCTRL", Action::Pressed)),
        Some(changed("ctrl", true))
    );
}
