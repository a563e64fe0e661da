//! Built-in layouts. Every call to [`build`] constructs a fresh [`Layout`],
//! so editing one never touches the canonical definition.

use crate::error::{OverlayError, OverlayResult};
use crate::geometry::{Cell, HexColor, Layout, Point, Size};
use crate::keycodes::{KeyRegistry, KeyboardLocale, Normalizer};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use tracing::debug;

#[derive(Debug, Clone, Copy, EnumIter, EnumString, Display, PartialEq, Eq, Hash)]
#[strum(ascii_case_insensitive)]
pub enum KnownPreset {
    #[strum(to_string = "full", serialize = "Full Keyboard (QWERTY)", serialize = "qwerty")]
    FullKeyboard,
    #[strum(to_string = "no_fkeys", serialize = "No F-Keys (QWERTY)")]
    NoFKeys,
    #[strum(to_string = "left_half", serialize = "Left Half (QWERTY)")]
    LeftHalf,
    #[strum(to_string = "wasd", serialize = "Gaming / WASD")]
    Wasd,
    #[strum(to_string = "numpad", serialize = "Numpad")]
    Numpad,
    #[strum(to_string = "azerty", serialize = "Full Keyboard (AZERTY)")]
    FullKeyboardAzerty,
}

const MOUSE_FILL: &str = "#1e3a5f";
const MOUSE_TEXT: &str = "#aaddff";
const WASD_FILL: &str = "#7b68ee";

const LEFT_HALF_KEEP: &[&str] = &[
    "esc", "f1", "f2", "f3", "f4", "f5", "`", "1", "2", "3", "4", "5", "6", "tab", "q", "w", "e",
    "r", "t", "caps_lock", "a", "s", "d", "f", "g", "shift", "z", "x", "c", "v", "b", "ctrl_l",
    "cmd", "alt_l", "space", "mouse_left", "mouse_middle", "mouse_right",
];

const WASD_KEEP: &[&str] = &[
    "esc", "1", "2", "3", "4", "5", "tab", "q", "w", "e", "r", "caps_lock", "a", "s", "d", "f",
    "shift", "z", "x", "c", "v", "ctrl_l", "alt_l", "space", "mouse_left", "mouse_middle",
    "mouse_right",
];

impl KnownPreset {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::FullKeyboard => "Full Keyboard (QWERTY)",
            Self::NoFKeys => "No F-Keys (QWERTY)",
            Self::LeftHalf => "Left Half (QWERTY)",
            Self::Wasd => "Gaming / WASD",
            Self::Numpad => "Numpad",
            Self::FullKeyboardAzerty => "Full Keyboard (AZERTY)",
        }
    }

    pub fn locale(&self) -> KeyboardLocale {
        match self {
            Self::FullKeyboardAzerty => KeyboardLocale::Azerty,
            _ => KeyboardLocale::Qwerty,
        }
    }

    pub fn build(&self) -> OverlayResult<Layout> {
        let cells = match self {
            Self::FullKeyboard => full_rows(KeyboardLocale::Qwerty),
            Self::NoFKeys => full_rows(KeyboardLocale::Qwerty)
                .into_iter()
                .filter(|c| c.position.y != 0.0 || c.id == "esc")
                .collect(),
            Self::LeftHalf => keep(full_rows(KeyboardLocale::Qwerty), LEFT_HALF_KEEP),
            Self::Wasd => {
                let mut cells = keep(full_rows(KeyboardLocale::Qwerty), WASD_KEEP);
                for cell in cells.iter_mut() {
                    if matches!(cell.id.as_str(), "w" | "a" | "s" | "d") {
                        cell.color = Some(HexColor::known(WASD_FILL));
                    }
                }
                cells
            }
            Self::Numpad => numpad(),
            Self::FullKeyboardAzerty => full_rows(KeyboardLocale::Azerty),
        };

        let normalizer = Normalizer::new(KeyRegistry::new_with_defaults(), self.locale());
        let mut layout = Layout::new(self.display_name()).with_locale(self.locale());
        for mut cell in cells {
            let key = normalizer.resolve_name(&cell.id).ok_or_else(|| {
                OverlayError::Invalid(format!("preset cell '{}' names no known key", cell.id))
            })?;
            cell.bound_key = Some(key);
            layout.insert_cell(cell)?;
        }
        debug!("Built preset '{}' ({} cells)", self.display_name(), layout.len());
        Ok(layout)
    }
}

/// Looks a preset up by id or display name, case-insensitively.
pub fn build(name: &str) -> OverlayResult<Layout> {
    let preset: KnownPreset = name
        .trim()
        .parse()
        .map_err(|_| OverlayError::NotFound(format!("preset '{}'", name)))?;
    preset.build()
}

pub fn all_presets() -> impl Iterator<Item = KnownPreset> {
    KnownPreset::iter()
}

// --- Row construction ---

fn key(id: &str, label: &str, x: f32, y: f32, w: f32) -> Cell {
    let mut cell = Cell::new(id, label);
    cell.position = Point::new(x, y);
    cell.size = Size::new(w, 1.0);
    cell
}

/// Lays `keys` out left to right on row `y`, one unit each, from `x`.
fn row(cells: &mut Vec<Cell>, keys: &[(&str, &str)], mut x: f32, y: f32) -> f32 {
    for &(id, label) in keys {
        cells.push(key(id, label, x, y, 1.0));
        x += 1.0;
    }
    x
}

fn mouse_cells(cells: &mut Vec<Cell>) {
    for (i, (id, label)) in [("mouse_left", "LMB"), ("mouse_middle", "MMB"), ("mouse_right", "RMB")]
        .into_iter()
        .enumerate()
    {
        let mut cell = Cell::new(id, label);
        cell.position = Point::new(i as f32 * 1.6, 7.0);
        cell.size = Size::new(1.5, 1.5);
        cell.color = Some(HexColor::known(MOUSE_FILL));
        cell.text_color = Some(HexColor::known(MOUSE_TEXT));
        cells.push(cell);
    }
}

const FUNCTION_ROW: &[(&str, &str)] = &[
    ("esc", "Esc"),
    ("f1", "F1"),
    ("f2", "F2"),
    ("f3", "F3"),
    ("f4", "F4"),
    ("f5", "F5"),
    ("f6", "F6"),
    ("f7", "F7"),
    ("f8", "F8"),
    ("f9", "F9"),
    ("f10", "F10"),
    ("f11", "F11"),
    ("f12", "F12"),
    ("print_screen", "Prt"),
    ("insert", "Ins"),
    ("delete", "Del"),
];

struct LocaleRows {
    numbers: &'static [(&'static str, &'static str)],
    top: &'static [(&'static str, &'static str)],
    top_end: (&'static str, &'static str),
    home: &'static [(&'static str, &'static str)],
    bottom: &'static [(&'static str, &'static str)],
    right_alt: (&'static str, &'static str),
}

const QWERTY_ROWS: LocaleRows = LocaleRows {
    numbers: &[
        ("`", "`"),
        ("1", "1"),
        ("2", "2"),
        ("3", "3"),
        ("4", "4"),
        ("5", "5"),
        ("6", "6"),
        ("7", "7"),
        ("8", "8"),
        ("9", "9"),
        ("0", "0"),
        ("-", "-"),
        ("=", "="),
    ],
    top: &[
        ("q", "Q"),
        ("w", "W"),
        ("e", "E"),
        ("r", "R"),
        ("t", "T"),
        ("y", "Y"),
        ("u", "U"),
        ("i", "I"),
        ("o", "O"),
        ("p", "P"),
        ("[", "["),
        ("]", "]"),
    ],
    top_end: ("\\", "\\"),
    home: &[
        ("a", "A"),
        ("s", "S"),
        ("d", "D"),
        ("f", "F"),
        ("g", "G"),
        ("h", "H"),
        ("j", "J"),
        ("k", "K"),
        ("l", "L"),
        (";", ";"),
        ("'", "'"),
    ],
    bottom: &[
        ("z", "Z"),
        ("x", "X"),
        ("c", "C"),
        ("v", "V"),
        ("b", "B"),
        ("n", "N"),
        ("m", "M"),
        (",", ","),
        (".", "."),
        ("/", "/"),
    ],
    right_alt: ("alt_r", "Alt"),
};

// The key right of the top row produces '*' on AZERTY, so it is named by
// that character rather than by '\'.
const AZERTY_ROWS: LocaleRows = LocaleRows {
    numbers: &[
        ("sup2", "²"),
        ("ampersand", "&"),
        ("eacute", "é"),
        ("quotedbl", "\""),
        ("apostrophe", "'"),
        ("parenleft", "("),
        ("minus", "-"),
        ("egrave", "è"),
        ("underscore", "_"),
        ("ccedilla", "ç"),
        ("agrave", "à"),
        ("parenright", ")"),
        ("equal", "="),
    ],
    top: &[
        ("a", "A"),
        ("z", "Z"),
        ("e", "E"),
        ("r", "R"),
        ("t", "T"),
        ("y", "Y"),
        ("u", "U"),
        ("i", "I"),
        ("o", "O"),
        ("p", "P"),
        ("caret", "^"),
        ("dollar", "$"),
    ],
    top_end: ("asterisk", "*"),
    home: &[
        ("q", "Q"),
        ("s", "S"),
        ("d", "D"),
        ("f", "F"),
        ("g", "G"),
        ("h", "H"),
        ("j", "J"),
        ("k", "K"),
        ("l", "L"),
        ("m", "M"),
        ("ugrave", "ù"),
    ],
    bottom: &[
        ("w", "W"),
        ("x", "X"),
        ("c", "C"),
        ("v", "V"),
        ("b", "B"),
        ("n", "N"),
        (",", ","),
        (";", ";"),
        (":", ":"),
        ("!", "!"),
    ],
    right_alt: ("alt_gr", "AltGr"),
};

fn full_rows(locale: KeyboardLocale) -> Vec<Cell> {
    let rows = match locale {
        KeyboardLocale::Qwerty => &QWERTY_ROWS,
        KeyboardLocale::Azerty => &AZERTY_ROWS,
    };
    let mut cells = Vec::with_capacity(90);

    row(&mut cells, FUNCTION_ROW, 0.0, 0.0);

    let x = row(&mut cells, rows.numbers, 0.0, 1.0);
    cells.push(key("backspace", "Bksp", x, 1.0, 2.0));

    cells.push(key("tab", "Tab", 0.0, 2.0, 1.5));
    let x = row(&mut cells, rows.top, 1.5, 2.0);
    cells.push(key(rows.top_end.0, rows.top_end.1, x, 2.0, 1.5));

    cells.push(key("caps_lock", "Caps", 0.0, 3.0, 1.75));
    let x = row(&mut cells, rows.home, 1.75, 3.0);
    cells.push(key("enter", "Enter", x, 3.0, 2.25));

    cells.push(key("shift", "Shift", 0.0, 4.0, 2.25));
    let x = row(&mut cells, rows.bottom, 2.25, 4.0);
    cells.push(key("shift_r", "Shift", x, 4.0, 2.75));

    for (id, label, x, w) in [
        ("ctrl_l", "Ctrl", 0.0, 1.25),
        ("cmd", "Win", 1.25, 1.25),
        ("alt_l", "Alt", 2.5, 1.25),
        ("space", "Space", 3.75, 6.25),
        (rows.right_alt.0, rows.right_alt.1, 10.0, 1.25),
        ("cmd_r", "Win", 11.25, 1.25),
        ("ctrl_r", "Ctrl", 12.5, 1.25),
    ] {
        cells.push(key(id, label, x, 5.0, w));
    }

    mouse_cells(&mut cells);
    cells
}

fn keep(cells: Vec<Cell>, ids: &[&str]) -> Vec<Cell> {
    cells
        .into_iter()
        .filter(|c| ids.contains(&c.id.as_str()))
        .collect()
}

fn numpad() -> Vec<Cell> {
    let mut cells = Vec::with_capacity(17);
    row(
        &mut cells,
        &[
            ("num_lock", "Num"),
            ("kp_divide", "/"),
            ("kp_multiply", "*"),
            ("kp_subtract", "-"),
        ],
        0.0,
        0.0,
    );
    row(&mut cells, &[("kp7", "7"), ("kp8", "8"), ("kp9", "9")], 0.0, 1.0);
    row(&mut cells, &[("kp4", "4"), ("kp5", "5"), ("kp6", "6")], 0.0, 2.0);
    row(&mut cells, &[("kp1", "1"), ("kp2", "2"), ("kp3", "3")], 0.0, 3.0);
    cells.push(key("kp0", "0", 0.0, 4.0, 2.0));
    cells.push(key("kp_decimal", ".", 2.0, 4.0, 1.0));

    let mut enter = key("kp_enter", "Ent", 3.0, 1.0, 1.0);
    enter.size.h = 2.0;
    cells.push(enter);
    cells
}
