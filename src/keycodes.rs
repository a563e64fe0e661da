//! Canonical key identifiers and the normalizer that maps raw platform input
//! onto them.
//!
//! Key Ids follow the Linux input-event-code names (`KEY_W`, `KEY_LEFTSHIFT`,
//! `BTN_LEFT`). Mouse buttons live in the same id space as keyboard keys, so
//! a cell never needs to know which device class it is bound to.

use crate::error::{OverlayError, OverlayResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

/// Canonical, platform-independent identifier of one physical key or button.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyId(String);

impl KeyId {
    /// Accepts `[A-Za-z0-9_]+`, stored upper-cased.
    pub fn new(raw: &str) -> OverlayResult<Self> {
        let id = raw.trim().to_ascii_uppercase();
        if id.is_empty() {
            return Err(OverlayError::Invalid("empty key id".to_string()));
        }
        if !id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
            return Err(OverlayError::Invalid(format!("malformed key id '{}'", raw)));
        }
        Ok(Self(id))
    }

    pub(crate) fn known(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_mouse(&self) -> bool {
        self.0.starts_with("BTN_")
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for KeyId {
    type Err = OverlayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for KeyId {
    type Error = OverlayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<KeyId> for String {
    fn from(id: KeyId) -> Self {
        id.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Action {
    #[strum(to_string = "pressed", serialize = "down", serialize = "press")]
    Pressed,
    #[strum(to_string = "released", serialize = "up", serialize = "release")]
    Released,
}

impl Action {
    pub fn from_pressed(pressed: bool) -> Self {
        if pressed {
            Self::Pressed
        } else {
            Self::Released
        }
    }
}

/// Mouse buttons as reported by the pointer hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u8),
}

impl MouseButton {
    /// X11 button numbering: 1 left, 2 middle, 3 right, 8 back, 9 forward.
    pub fn from_index(index: u8) -> Self {
        match index {
            1 => Self::Left,
            2 => Self::Middle,
            3 => Self::Right,
            8 => Self::Back,
            9 => Self::Forward,
            n => Self::Other(n),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "middle" => Some(Self::Middle),
            "back" | "x1" | "side" => Some(Self::Back),
            "forward" | "x2" | "extra" => Some(Self::Forward),
            other => other
                .strip_prefix("button")
                .and_then(|n| n.parse().ok())
                .map(Self::from_index),
        }
    }

    fn key_id(self) -> Option<KeyId> {
        let id = match self {
            Self::Left => "BTN_LEFT",
            Self::Right => "BTN_RIGHT",
            Self::Middle => "BTN_MIDDLE",
            Self::Back => "BTN_SIDE",
            Self::Forward => "BTN_EXTRA",
            Self::Other(_) => return None,
        };
        Some(KeyId::known(id))
    }
}

/// One raw identifier as delivered by a platform listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInput {
    /// Character produced by the key under the active OS keyboard layout.
    Char(char),
    /// Named special key (`shift_r`, `f5`, `page_up`, ...).
    Named(String),
    /// Linux evdev scan code.
    Scan(u16),
    Mouse(MouseButton),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub input: RawInput,
    pub action: Action,
}

impl RawEvent {
    pub fn new(input: RawInput, action: Action) -> Self {
        Self { input, action }
    }

    pub fn press(input: RawInput) -> Self {
        Self::new(input, Action::Pressed)
    }

    pub fn release(input: RawInput) -> Self {
        Self::new(input, Action::Released)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, EnumString, Display, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum KeyboardLocale {
    #[default]
    Qwerty,
    Azerty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierMode {
    #[default]
    Distinct,
    Collapsed,
}

/// A normalized input. `source` is the physical key that fired and `key` the
/// id cells bind; they differ only for a collapsed modifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub source: KeyId,
    pub key: KeyId,
    pub action: Action,
}

/// Which modifier families treat their left and right keys as one id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModifierPolicy {
    pub shift: ModifierMode,
    pub ctrl: ModifierMode,
    pub alt: ModifierMode,
    pub meta: ModifierMode,
}

impl ModifierPolicy {
    pub fn collapsed() -> Self {
        Self {
            shift: ModifierMode::Collapsed,
            ctrl: ModifierMode::Collapsed,
            alt: ModifierMode::Collapsed,
            meta: ModifierMode::Collapsed,
        }
    }

    pub fn is_distinct(&self) -> bool {
        *self == Self::default()
    }

    fn apply(&self, id: KeyId) -> KeyId {
        let (mode, left) = match id.as_str() {
            "KEY_RIGHTSHIFT" => (self.shift, "KEY_LEFTSHIFT"),
            "KEY_RIGHTCTRL" => (self.ctrl, "KEY_LEFTCTRL"),
            "KEY_RIGHTALT" => (self.alt, "KEY_LEFTALT"),
            "KEY_RIGHTMETA" => (self.meta, "KEY_LEFTMETA"),
            _ => return id,
        };
        match mode {
            ModifierMode::Collapsed => KeyId::known(left),
            ModifierMode::Distinct => id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyDefinition {
    pub id: KeyId,
    pub label: String,
    #[serde(default)]
    pub scan: Option<u16>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

// (scan code, id, label, aliases)
const DEFAULT_KEYS: &[(u16, &str, &str, &[&str])] = &[
    (1, "KEY_ESC", "Esc", &["esc", "escape"]),
    (2, "KEY_1", "1", &[]),
    (3, "KEY_2", "2", &[]),
    (4, "KEY_3", "3", &[]),
    (5, "KEY_4", "4", &[]),
    (6, "KEY_5", "5", &[]),
    (7, "KEY_6", "6", &[]),
    (8, "KEY_7", "7", &[]),
    (9, "KEY_8", "8", &[]),
    (10, "KEY_9", "9", &[]),
    (11, "KEY_0", "0", &[]),
    (12, "KEY_MINUS", "-", &[]),
    (13, "KEY_EQUAL", "=", &[]),
    (14, "KEY_BACKSPACE", "Bksp", &["backspace", "bksp"]),
    (15, "KEY_TAB", "Tab", &["tab"]),
    (16, "KEY_Q", "Q", &[]),
    (17, "KEY_W", "W", &[]),
    (18, "KEY_E", "E", &[]),
    (19, "KEY_R", "R", &[]),
    (20, "KEY_T", "T", &[]),
    (21, "KEY_Y", "Y", &[]),
    (22, "KEY_U", "U", &[]),
    (23, "KEY_I", "I", &[]),
    (24, "KEY_O", "O", &[]),
    (25, "KEY_P", "P", &[]),
    (26, "KEY_LEFTBRACE", "[", &[]),
    (27, "KEY_RIGHTBRACE", "]", &[]),
    (28, "KEY_ENTER", "Enter", &["enter", "return"]),
    (29, "KEY_LEFTCTRL", "Ctrl", &["ctrl", "ctrl_l", "control"]),
    (30, "KEY_A", "A", &[]),
    (31, "KEY_S", "S", &[]),
    (32, "KEY_D", "D", &[]),
    (33, "KEY_F", "F", &[]),
    (34, "KEY_G", "G", &[]),
    (35, "KEY_H", "H", &[]),
    (36, "KEY_J", "J", &[]),
    (37, "KEY_K", "K", &[]),
    (38, "KEY_L", "L", &[]),
    (39, "KEY_SEMICOLON", ";", &[]),
    (40, "KEY_APOSTROPHE", "'", &[]),
    (41, "KEY_GRAVE", "`", &[]),
    (42, "KEY_LEFTSHIFT", "Shift", &["shift", "shift_l"]),
    (43, "KEY_BACKSLASH", "\\", &[]),
    (44, "KEY_Z", "Z", &[]),
    (45, "KEY_X", "X", &[]),
    (46, "KEY_C", "C", &[]),
    (47, "KEY_V", "V", &[]),
    (48, "KEY_B", "B", &[]),
    (49, "KEY_N", "N", &[]),
    (50, "KEY_M", "M", &[]),
    (51, "KEY_COMMA", ",", &[]),
    (52, "KEY_DOT", ".", &[]),
    (53, "KEY_SLASH", "/", &[]),
    (54, "KEY_RIGHTSHIFT", "Shift", &["shift_r"]),
    (55, "KEY_KPASTERISK", "*", &["kp_multiply"]),
    (56, "KEY_LEFTALT", "Alt", &["alt", "alt_l"]),
    (57, "KEY_SPACE", "Space", &["space"]),
    (58, "KEY_CAPSLOCK", "Caps", &["caps_lock", "capslock"]),
    (59, "KEY_F1", "F1", &["f1"]),
    (60, "KEY_F2", "F2", &["f2"]),
    (61, "KEY_F3", "F3", &["f3"]),
    (62, "KEY_F4", "F4", &["f4"]),
    (63, "KEY_F5", "F5", &["f5"]),
    (64, "KEY_F6", "F6", &["f6"]),
    (65, "KEY_F7", "F7", &["f7"]),
    (66, "KEY_F8", "F8", &["f8"]),
    (67, "KEY_F9", "F9", &["f9"]),
    (68, "KEY_F10", "F10", &["f10"]),
    (69, "KEY_NUMLOCK", "Num", &["num_lock", "numlock"]),
    (70, "KEY_SCROLLLOCK", "ScrLk", &["scroll_lock"]),
    (71, "KEY_KP7", "7", &["kp7"]),
    (72, "KEY_KP8", "8", &["kp8"]),
    (73, "KEY_KP9", "9", &["kp9"]),
    (74, "KEY_KPMINUS", "-", &["kp_subtract"]),
    (75, "KEY_KP4", "4", &["kp4"]),
    (76, "KEY_KP5", "5", &["kp5"]),
    (77, "KEY_KP6", "6", &["kp6"]),
    (78, "KEY_KPPLUS", "+", &["kp_add"]),
    (79, "KEY_KP1", "1", &["kp1"]),
    (80, "KEY_KP2", "2", &["kp2"]),
    (81, "KEY_KP3", "3", &["kp3"]),
    (82, "KEY_KP0", "0", &["kp0"]),
    (83, "KEY_KPDOT", ".", &["kp_decimal"]),
    (86, "KEY_102ND", "<", &["iso_backslash"]),
    (87, "KEY_F11", "F11", &["f11"]),
    (88, "KEY_F12", "F12", &["f12"]),
    (96, "KEY_KPENTER", "Ent", &["kp_enter"]),
    (97, "KEY_RIGHTCTRL", "Ctrl", &["ctrl_r"]),
    (98, "KEY_KPSLASH", "/", &["kp_divide"]),
    (99, "KEY_SYSRQ", "Prt", &["print_screen", "sysrq"]),
    (100, "KEY_RIGHTALT", "Alt", &["alt_r", "alt_gr", "altgr"]),
    (102, "KEY_HOME", "Home", &["home"]),
    (103, "KEY_UP", "Up", &["up"]),
    (104, "KEY_PAGEUP", "PgUp", &["page_up", "pageup"]),
    (105, "KEY_LEFT", "Left", &["left"]),
    (106, "KEY_RIGHT", "Right", &["right"]),
    (107, "KEY_END", "End", &["end"]),
    (108, "KEY_DOWN", "Down", &["down"]),
    (109, "KEY_PAGEDOWN", "PgDn", &["page_down", "pagedown"]),
    (110, "KEY_INSERT", "Ins", &["insert"]),
    (111, "KEY_DELETE", "Del", &["delete"]),
    (119, "KEY_PAUSE", "Pause", &["pause"]),
    (125, "KEY_LEFTMETA", "Win", &["cmd", "cmd_l", "super", "win"]),
    (126, "KEY_RIGHTMETA", "Win", &["cmd_r"]),
    (127, "KEY_COMPOSE", "Menu", &["menu"]),
    (272, "BTN_LEFT", "LMB", &["mouse_left"]),
    (273, "BTN_RIGHT", "RMB", &["mouse_right"]),
    (274, "BTN_MIDDLE", "MMB", &["mouse_middle"]),
    (275, "BTN_SIDE", "M4", &["mouse_x1", "mouse_back"]),
    (276, "BTN_EXTRA", "M5", &["mouse_x2", "mouse_forward"]),
];

/// Names used by AZERTY key-name hooks for the keys whose characters differ
/// from QWERTY.
const AZERTY_NAMES: &[(&str, &str)] = &[
    ("sup2", "KEY_GRAVE"),
    ("ampersand", "KEY_1"),
    ("eacute", "KEY_2"),
    ("quotedbl", "KEY_3"),
    ("apostrophe", "KEY_4"),
    ("parenleft", "KEY_5"),
    ("minus", "KEY_6"),
    ("egrave", "KEY_7"),
    ("underscore", "KEY_8"),
    ("ccedilla", "KEY_9"),
    ("agrave", "KEY_0"),
    ("parenright", "KEY_MINUS"),
    ("equal", "KEY_EQUAL"),
    ("caret", "KEY_LEFTBRACE"),
    ("dollar", "KEY_RIGHTBRACE"),
    ("asterisk", "KEY_BACKSLASH"),
    ("ugrave", "KEY_APOSTROPHE"),
    ("less", "KEY_102ND"),
];

/// Registry of known keys: id, display label, scan code and alias names.
#[derive(Debug, Clone, Default)]
pub struct KeyRegistry {
    definitions: Vec<KeyDefinition>,
    by_alias: HashMap<String, usize>,
    by_scan: HashMap<u16, usize>,
    by_id: HashMap<KeyId, usize>,
}

impl KeyRegistry {
    pub fn new_with_defaults() -> Self {
        let definitions = DEFAULT_KEYS
            .iter()
            .map(|&(scan, id, label, aliases)| KeyDefinition {
                id: KeyId::known(id),
                label: label.to_string(),
                scan: Some(scan),
                aliases: aliases.iter().map(|a| a.to_string()).collect(),
            })
            .collect();
        Self::from_definitions(definitions)
    }

    pub fn from_definitions(definitions: Vec<KeyDefinition>) -> Self {
        let mut reg = Self {
            definitions,
            ..Default::default()
        };
        reg.rebuild_maps();
        reg
    }

    /// Loads extra definitions from a JSON array and layers them over the
    /// defaults. A later definition wins on a shared alias or scan code.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> OverlayResult<Self> {
        let content = fs::read_to_string(&path)?;
        let extra: Vec<KeyDefinition> = serde_json::from_str(&content).map_err(|e| {
            OverlayError::Corrupt(format!(
                "keymap {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let mut reg = Self::new_with_defaults();
        reg.definitions.extend(extra);
        reg.rebuild_maps();
        Ok(reg)
    }

    fn rebuild_maps(&mut self) {
        self.by_alias.clear();
        self.by_scan.clear();
        self.by_id.clear();

        for (idx, def) in self.definitions.iter().enumerate() {
            self.by_id.insert(def.id.clone(), idx);
            self.by_alias.insert(def.id.as_str().to_ascii_lowercase(), idx);
            for alias in &def.aliases {
                self.by_alias.insert(alias.to_lowercase(), idx);
            }
            if let Some(scan) = def.scan {
                self.by_scan.insert(scan, idx);
            }
        }
    }

    pub fn definitions(&self) -> &[KeyDefinition] {
        &self.definitions
    }

    pub fn by_alias(&self, name: &str) -> Option<&KeyId> {
        self.by_alias
            .get(&name.to_lowercase())
            .map(|&i| &self.definitions[i].id)
    }

    pub fn by_scan(&self, code: u16) -> Option<&KeyId> {
        self.by_scan.get(&code).map(|&i| &self.definitions[i].id)
    }

    pub fn label(&self, id: &KeyId) -> Option<&str> {
        self.by_id
            .get(id)
            .map(|&i| self.definitions[i].label.as_str())
    }

    pub fn contains(&self, id: &KeyId) -> bool {
        self.by_id.contains_key(id)
    }
}

/// Physical key producing `c` on a US QWERTY board, shifted or not.
fn qwerty_char(c: char) -> Option<&'static str> {
    let id = match c.to_ascii_lowercase() {
        'a' => "KEY_A",
        'b' => "KEY_B",
        'c' => "KEY_C",
        'd' => "KEY_D",
        'e' => "KEY_E",
        'f' => "KEY_F",
        'g' => "KEY_G",
        'h' => "KEY_H",
        'i' => "KEY_I",
        'j' => "KEY_J",
        'k' => "KEY_K",
        'l' => "KEY_L",
        'm' => "KEY_M",
        'n' => "KEY_N",
        'o' => "KEY_O",
        'p' => "KEY_P",
        'q' => "KEY_Q",
        'r' => "KEY_R",
        's' => "KEY_S",
        't' => "KEY_T",
        'u' => "KEY_U",
        'v' => "KEY_V",
        'w' => "KEY_W",
        'x' => "KEY_X",
        'y' => "KEY_Y",
        'z' => "KEY_Z",
        '1' | '!' => "KEY_1",
        '2' | '@' => "KEY_2",
        '3' | '#' => "KEY_3",
        '4' | '$' => "KEY_4",
        '5' | '%' => "KEY_5",
        '6' | '^' => "KEY_6",
        '7' | '&' => "KEY_7",
        '8' | '*' => "KEY_8",
        '9' | '(' => "KEY_9",
        '0' | ')' => "KEY_0",
        '-' | '_' => "KEY_MINUS",
        '=' | '+' => "KEY_EQUAL",
        '[' | '{' => "KEY_LEFTBRACE",
        ']' | '}' => "KEY_RIGHTBRACE",
        '\\' | '|' => "KEY_BACKSLASH",
        ';' | ':' => "KEY_SEMICOLON",
        '\'' | '"' => "KEY_APOSTROPHE",
        '`' | '~' => "KEY_GRAVE",
        ',' | '<' => "KEY_COMMA",
        '.' | '>' => "KEY_DOT",
        '/' | '?' => "KEY_SLASH",
        ' ' => "KEY_SPACE",
        _ => return None,
    };
    Some(id)
}

/// Physical key producing `c` on a French AZERTY board, shifted or not.
fn azerty_char(c: char) -> Option<&'static str> {
    let lower = c.to_lowercase().next().unwrap_or(c);
    let id = match lower {
        'a' => "KEY_Q",
        'z' => "KEY_W",
        'q' => "KEY_A",
        'w' => "KEY_Z",
        'm' => "KEY_SEMICOLON",
        'b' | 'c' | 'd' | 'e' | 'f' | 'g' | 'h' | 'i' | 'j' | 'k' | 'l' | 'n' | 'o' | 'p'
        | 'r' | 's' | 't' | 'u' | 'v' | 'x' | 'y' => return qwerty_char(lower),
        '²' => "KEY_GRAVE",
        '&' | '1' => "KEY_1",
        'é' | '2' | '~' => "KEY_2",
        '"' | '3' | '#' => "KEY_3",
        '\'' | '4' | '{' => "KEY_4",
        '(' | '5' | '[' => "KEY_5",
        '-' | '6' | '|' => "KEY_6",
        'è' | '7' | '`' => "KEY_7",
        '_' | '8' | '\\' => "KEY_8",
        'ç' | '9' | '^' => "KEY_9",
        'à' | '0' | '@' => "KEY_0",
        ')' | '°' | ']' => "KEY_MINUS",
        '=' | '+' | '}' => "KEY_EQUAL",
        '¨' => "KEY_LEFTBRACE",
        '$' | '£' | '¤' => "KEY_RIGHTBRACE",
        '*' | 'µ' => "KEY_BACKSLASH",
        'ù' | '%' => "KEY_APOSTROPHE",
        '<' | '>' => "KEY_102ND",
        ',' | '?' => "KEY_M",
        ';' | '.' => "KEY_COMMA",
        ':' | '/' => "KEY_DOT",
        '!' | '§' => "KEY_SLASH",
        ' ' => "KEY_SPACE",
        _ => return None,
    };
    Some(id)
}

/// Translates raw listener input into canonical Key Ids for one layout's
/// locale and modifier policy.
#[derive(Debug, Clone)]
pub struct Normalizer {
    registry: KeyRegistry,
    locale: KeyboardLocale,
    modifiers: ModifierPolicy,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(KeyRegistry::new_with_defaults(), KeyboardLocale::Qwerty)
    }
}

impl Normalizer {
    pub fn new(registry: KeyRegistry, locale: KeyboardLocale) -> Self {
        Self {
            registry,
            locale,
            modifiers: ModifierPolicy::default(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: ModifierPolicy) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn locale(&self) -> KeyboardLocale {
        self.locale
    }

    pub fn modifiers(&self) -> ModifierPolicy {
        self.modifiers
    }

    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    /// `None` means "no mapping": exotic hardware keys are expected and
    /// silently dropped.
    pub fn normalize(&self, event: &RawEvent) -> Option<KeyEvent> {
        let source = self.resolve_source(&event.input)?;
        Some(KeyEvent {
            key: self.modifiers.apply(source.clone()),
            source,
            action: event.action,
        })
    }

    /// The id a layout binds, after the modifier policy.
    pub fn resolve(&self, input: &RawInput) -> Option<KeyId> {
        self.resolve_source(input).map(|id| self.modifiers.apply(id))
    }

    /// The physical key, before any modifier collapse.
    pub fn resolve_source(&self, input: &RawInput) -> Option<KeyId> {
        match input {
            RawInput::Char(c) => self.resolve_char(*c),
            RawInput::Named(name) => self.resolve_name(name),
            RawInput::Scan(code) => self.registry.by_scan(*code).cloned(),
            RawInput::Mouse(button) => button.key_id(),
        }
    }

    /// Resolves a key name, a single character, or a canonical id spelling.
    pub fn resolve_name(&self, name: &str) -> Option<KeyId> {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return self.resolve_char(c);
        }

        let lower = name.trim().to_lowercase();
        if self.locale == KeyboardLocale::Azerty {
            if let Some(&(_, id)) = AZERTY_NAMES.iter().find(|(n, _)| *n == lower) {
                return Some(KeyId::known(id));
            }
        }
        if let Some(button) = lower.strip_prefix("mouse:").and_then(MouseButton::from_name) {
            return button.key_id();
        }
        self.registry.by_alias(&lower).cloned()
    }

    fn resolve_char(&self, c: char) -> Option<KeyId> {
        let id = match self.locale {
            KeyboardLocale::Qwerty => qwerty_char(c),
            KeyboardLocale::Azerty => azerty_char(c),
        };
        id.map(KeyId::known)
    }

    pub fn label(&self, id: &KeyId) -> Option<&str> {
        self.registry.label(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_id_is_upper_cased() {
        let id = KeyId::new(" key_w ").unwrap();
        assert_eq!(id.as_str(), "KEY_W");
        assert!(KeyId::new("KEY W").is_err());
        assert!(KeyId::new("").is_err());
    }

    #[test]
    fn test_every_default_char_maps_to_a_registered_key() {
        let reg = KeyRegistry::new_with_defaults();
        for c in (32u8..=126).map(char::from) {
            if let Some(id) = qwerty_char(c) {
                assert!(reg.contains(&KeyId::known(id)), "{} -> {}", c, id);
            }
        }
    }

    #[test]
    fn test_modifier_collapse() {
        let policy = ModifierPolicy {
            shift: ModifierMode::Collapsed,
            ..Default::default()
        };
        assert_eq!(
            policy.apply(KeyId::known("KEY_RIGHTSHIFT")).as_str(),
            "KEY_LEFTSHIFT"
        );
        assert_eq!(
            policy.apply(KeyId::known("KEY_RIGHTCTRL")).as_str(),
            "KEY_RIGHTCTRL"
        );
    }
}
