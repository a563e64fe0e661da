//! Versioned JSON documents for layouts and settings, and the config
//! directory that holds them.
//!
//! Loading is all-or-nothing: a document is fully parsed and validated into
//! a fresh value before the caller sees it, so a bad file can never leave
//! live state half-updated.

use crate::config::{LayoutRef, Settings, Theme, WindowGeometry};
use crate::error::{OverlayError, OverlayResult};
use crate::geometry::{Cell, HexColor, Layout, Point, Size};
use crate::keycodes::{KeyId, KeyRegistry, KeyboardLocale, ModifierPolicy, Normalizer};
use crate::layouts;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const CURRENT_VERSION: u32 = 1;
pub const APP_DIR: &str = "KeyboardOverlay";
pub const FALLBACK_PRESET: &str = "full";

// --- Layout documents ---

fn one() -> f32 {
    1.0
}

#[derive(Debug, Serialize, Deserialize)]
struct CellRecord {
    id: String,
    #[serde(default)]
    label: String,
    x: f32,
    y: f32,
    #[serde(default = "one")]
    w: f32,
    #[serde(default = "one")]
    h: f32,
    #[serde(default)]
    bound_key: Option<KeyId>,
    #[serde(default)]
    color: Option<HexColor>,
    #[serde(default)]
    text_color: Option<HexColor>,
}

impl From<&Cell> for CellRecord {
    fn from(cell: &Cell) -> Self {
        Self {
            id: cell.id.clone(),
            label: cell.label.clone(),
            x: cell.position.x,
            y: cell.position.y,
            w: cell.size.w,
            h: cell.size.h,
            bound_key: cell.bound_key.clone(),
            color: cell.color.clone(),
            text_color: cell.text_color.clone(),
        }
    }
}

impl From<CellRecord> for Cell {
    fn from(rec: CellRecord) -> Self {
        Cell {
            id: rec.id,
            bound_key: rec.bound_key,
            label: rec.label,
            position: Point::new(rec.x, rec.y),
            size: Size::new(rec.w, rec.h),
            color: rec.color,
            text_color: rec.text_color,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LayoutDocument {
    #[serde(default)]
    version: u32,
    name: String,
    #[serde(default)]
    locale: KeyboardLocale,
    #[serde(default = "one")]
    grid_unit: f32,
    #[serde(default, skip_serializing_if = "ModifierPolicy::is_distinct")]
    modifiers: ModifierPolicy,
    cells: Vec<CellRecord>,
}

impl LayoutDocument {
    fn from_layout(layout: &Layout) -> Self {
        Self {
            version: CURRENT_VERSION,
            name: layout.name.clone(),
            locale: layout.locale,
            grid_unit: layout.grid_unit(),
            modifiers: layout.modifiers,
            cells: layout.cells().iter().map(CellRecord::from).collect(),
        }
    }

    fn into_layout(self) -> OverlayResult<Layout> {
        let mut layout = Layout::new(self.name).with_locale(self.locale);
        layout.modifiers = self.modifiers;
        layout.set_grid_unit(self.grid_unit)?;
        for rec in self.cells {
            layout.insert_cell(rec.into())?;
        }
        Ok(layout)
    }
}

/// Pre-versioning layout files: the cell id doubled as the listener's key
/// name, and `layout` named the keyboard locale.
#[derive(Debug, Deserialize)]
struct LegacyLayout {
    #[serde(default)]
    name: String,
    #[serde(default)]
    layout: Option<String>,
    keys: Vec<LegacyKey>,
}

#[derive(Debug, Deserialize)]
struct LegacyKey {
    id: String,
    #[serde(default)]
    label: String,
    x: f32,
    y: f32,
    #[serde(default = "one")]
    w: f32,
    #[serde(default = "one")]
    h: f32,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    text_color: Option<String>,
}

fn legacy_color(raw: Option<String>) -> OverlayResult<Option<HexColor>> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => HexColor::new(s).map(Some),
    }
}

fn migrate_layout(legacy: LegacyLayout) -> OverlayResult<Layout> {
    let locale = legacy
        .layout
        .as_deref()
        .and_then(|l| l.parse().ok())
        .unwrap_or_default();
    let normalizer = Normalizer::new(KeyRegistry::new_with_defaults(), locale);
    let mut layout = Layout::new(legacy.name).with_locale(locale);

    for key in legacy.keys {
        let mut cell = Cell::new(key.id, key.label);
        cell.position = Point::new(key.x, key.y);
        cell.size = Size::new(key.w, key.h);
        cell.color = legacy_color(key.color)?;
        cell.text_color = legacy_color(key.text_color)?;

        let bound = normalizer.resolve_name(&cell.id);
        match &bound {
            Some(k) if layout.cell_for_key(k).is_some() => {
                warn!("Legacy cell '{}' repeats binding {}; left unbound", cell.id, k);
            }
            Some(_) => cell.bound_key = bound,
            None => debug!("Legacy cell '{}' names no key; kept as decoration", cell.id),
        }
        layout.insert_cell(cell)?;
    }
    info!("Migrated legacy layout '{}' ({} cells)", layout.name, layout.len());
    Ok(layout)
}

fn corrupt(context: &str, e: impl std::fmt::Display) -> OverlayError {
    OverlayError::Corrupt(format!("{}: {}", context, e))
}

/// `None` means the document predates versioning.
fn document_version(value: &Value) -> OverlayResult<Option<u32>> {
    let obj = value
        .as_object()
        .ok_or_else(|| OverlayError::Corrupt("document is not a JSON object".to_string()))?;
    match obj.get("version") {
        None | Some(Value::Null) => Ok(None),
        Some(v) => {
            let n = v
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| corrupt("version", format!("'{}' is not a schema number", v)))?;
            if n > CURRENT_VERSION {
                return Err(OverlayError::UnsupportedVersion {
                    found: n,
                    supported: CURRENT_VERSION,
                });
            }
            Ok(Some(n))
        }
    }
}

pub fn layout_to_string(layout: &Layout) -> OverlayResult<String> {
    serde_json::to_string_pretty(&LayoutDocument::from_layout(layout))
        .map_err(|e| OverlayError::Invalid(format!("layout not serializable: {}", e)))
}

pub fn layout_from_str(text: &str) -> OverlayResult<Layout> {
    let value: Value = serde_json::from_str(text).map_err(|e| corrupt("layout", e))?;
    let version = document_version(&value)?;
    // Version 0, or no version at all, is legacy only in the legacy shape.
    let is_legacy = match version {
        None | Some(0) => value.get("keys").is_some() && value.get("cells").is_none(),
        Some(_) => false,
    };

    let result = if is_legacy {
        serde_json::from_value::<LegacyLayout>(value)
            .map_err(|e| corrupt("legacy layout", e))
            .and_then(migrate_layout)
    } else {
        serde_json::from_value::<LayoutDocument>(value)
            .map_err(|e| corrupt("layout", e))
            .and_then(LayoutDocument::into_layout)
    };

    // A document that breaks a layout invariant is a bad document.
    result.map_err(|e| match e {
        OverlayError::DuplicateId(_)
        | OverlayError::Conflict { .. }
        | OverlayError::OutOfBounds(_)
        | OverlayError::Invalid(_) => corrupt("layout", e),
        other => other,
    })
}

// --- Settings documents ---

#[derive(Serialize)]
struct SettingsDocument<'a> {
    version: u32,
    #[serde(flatten)]
    settings: &'a Settings,
}

/// The flat theme keys written before versioning.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LegacyTheme {
    bg: Option<HexColor>,
    key_idle: Option<HexColor>,
    key_pressed: Option<HexColor>,
    mouse_idle: Option<HexColor>,
    mouse_pressed: Option<HexColor>,
    key_text: Option<HexColor>,
    key_outline: Option<HexColor>,
    font_family: Option<String>,
    font_size: Option<u16>,
    font_bold: Option<bool>,
    key_radius: Option<f32>,
    key_unit_px: Option<f32>,
    key_gap_px: Option<f32>,
    key_height_px: Option<f32>,
    overlay_alpha: Option<f32>,
    grid_size: Option<f32>,
    grid_visible: Option<bool>,
    snap_to_grid: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LegacySettings {
    theme: LegacyTheme,
    last_config: Option<String>,
    overlay_x: Option<i32>,
    overlay_y: Option<i32>,
}

fn migrate_settings(legacy: LegacySettings) -> Settings {
    let mut settings = Settings::default();
    let lt = legacy.theme;
    let t: &mut Theme = &mut settings.theme;

    macro_rules! carry {
        ($($src:ident => $($dst:ident).+),* $(,)?) => {
            $(if let Some(v) = lt.$src { t.$($dst).+ = v; })*
        };
    }
    carry! {
        bg => background,
        key_idle => key_idle,
        key_pressed => key_pressed,
        mouse_idle => mouse_idle,
        mouse_pressed => mouse_pressed,
        key_text => key_text,
        key_outline => key_outline,
        font_family => font.family,
        font_size => font.size,
        font_bold => font.bold,
        key_radius => corner_radius,
        key_unit_px => unit_px,
        key_gap_px => gap_px,
        key_height_px => height_px,
        overlay_alpha => overlay_opacity,
        grid_visible => grid_visible,
    }

    if let Some(snap) = lt.snap_to_grid {
        settings.editor.snap_to_grid = snap;
    }
    // The old editor snapped to a pixel grid; express it as unit subdivisions.
    if let Some(px) = lt.grid_size.filter(|px| *px > 0.0) {
        settings.editor.snap_divisions = (settings.theme.unit_px / px).round().max(1.0) as u32;
    }

    settings.last_layout = legacy
        .last_config
        .filter(|n| !n.trim().is_empty())
        .map(LayoutRef::Saved);
    let defaults = WindowGeometry::default();
    settings.window = WindowGeometry {
        x: legacy.overlay_x.unwrap_or(defaults.x),
        y: legacy.overlay_y.unwrap_or(defaults.y),
    };
    info!("Migrated legacy settings");
    settings
}

pub fn settings_to_string(settings: &Settings) -> OverlayResult<String> {
    let doc = SettingsDocument {
        version: CURRENT_VERSION,
        settings,
    };
    serde_json::to_string_pretty(&doc)
        .map_err(|e| OverlayError::Invalid(format!("settings not serializable: {}", e)))
}

pub fn settings_from_str(text: &str) -> OverlayResult<Settings> {
    let value: Value = serde_json::from_str(text).map_err(|e| corrupt("settings", e))?;
    let version = document_version(&value)?;
    let is_legacy = match version {
        None | Some(0) => ["overlay_x", "overlay_y", "last_config"]
            .iter()
            .any(|k| value.get(k).is_some()),
        Some(_) => false,
    };

    let settings = if is_legacy {
        serde_json::from_value::<LegacySettings>(value)
            .map(migrate_settings)
            .map_err(|e| corrupt("legacy settings", e))?
    } else {
        serde_json::from_value::<Settings>(value).map_err(|e| corrupt("settings", e))?
    };
    settings.editor.validate().map_err(|e| corrupt("settings", e))?;
    Ok(settings)
}

// --- Files ---

/// Writes `{path}.tmp`, syncs, then renames over `path`.
pub fn atomic_write<P: AsRef<Path>>(path: P, contents: &str) -> OverlayResult<()> {
    let path = path.as_ref();
    let temp_path = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&temp_path, path)?;
    Ok(())
}

fn read_existing(path: &Path, what: &str) -> OverlayResult<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            OverlayError::NotFound(format!("{} {}", what, path.display()))
        }
        _ => OverlayError::Io(e),
    })
}

pub fn save_layout<P: AsRef<Path>>(layout: &Layout, path: P) -> OverlayResult<PathBuf> {
    let path = path.as_ref();
    atomic_write(path, &layout_to_string(layout)?)?;
    info!("Layout saved: {}", path.display());
    Ok(path.to_path_buf())
}

pub fn load_layout<P: AsRef<Path>>(path: P) -> OverlayResult<Layout> {
    let path = path.as_ref();
    let layout = layout_from_str(&read_existing(path, "layout")?)?;
    info!("Layout loaded: {} ({} cells)", path.display(), layout.len());
    Ok(layout)
}

pub fn save_settings<P: AsRef<Path>>(settings: &Settings, path: P) -> OverlayResult<PathBuf> {
    let path = path.as_ref();
    atomic_write(path, &settings_to_string(settings)?)?;
    info!("Settings saved: {}", path.display());
    Ok(path.to_path_buf())
}

pub fn load_settings<P: AsRef<Path>>(path: P) -> OverlayResult<Settings> {
    let path = path.as_ref();
    let settings = settings_from_str(&read_existing(path, "settings")?)?;
    info!("Settings loaded: {}", path.display());
    Ok(settings)
}

// --- Config directory ---

/// The per-user directory: `settings.json` plus one file per saved layout
/// under `configs/`.
#[derive(Debug, Clone)]
pub struct ConfigDir {
    root: PathBuf,
}

impl ConfigDir {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// `$XDG_CONFIG_HOME/KeyboardOverlay` when set, otherwise the platform
    /// config directory.
    pub fn default_root() -> Option<PathBuf> {
        env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(dirs::config_dir)
            .map(|base| base.join(APP_DIR))
    }

    pub fn resolve() -> OverlayResult<Self> {
        Self::default_root()
            .map(Self::new)
            .ok_or_else(|| OverlayError::NotFound("user config directory".to_string()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layouts_dir(&self) -> PathBuf {
        self.root.join("configs")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root.join("settings.json")
    }

    fn ensure_layouts_dir(&self) -> OverlayResult<PathBuf> {
        let dir = self.layouts_dir();
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    fn layout_path(&self, name: &str) -> OverlayResult<PathBuf> {
        let trimmed = name.trim();
        if trimmed.is_empty()
            || trimmed.starts_with('.')
            || trimmed.contains(['/', '\\', ':'])
        {
            return Err(OverlayError::Invalid(format!("bad layout name '{}'", name)));
        }
        Ok(self.layouts_dir().join(format!("{}.json", trimmed)))
    }

    fn existing_layout_path(&self, name: &str) -> OverlayResult<PathBuf> {
        let path = self.layout_path(name)?;
        if !path.is_file() {
            return Err(OverlayError::NotFound(format!("saved layout '{}'", name)));
        }
        Ok(path)
    }

    /// Saved layout names, sorted. A missing directory lists as empty.
    pub fn list_layouts(&self) -> OverlayResult<Vec<String>> {
        let dir = self.layouts_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut names: Vec<String> = fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        debug!("Found {} saved layouts", names.len());
        Ok(names)
    }

    pub fn load_layout(&self, name: &str) -> OverlayResult<Layout> {
        load_layout(self.existing_layout_path(name)?)
    }

    pub fn save_layout(&self, name: &str, layout: &Layout) -> OverlayResult<PathBuf> {
        self.ensure_layouts_dir()?;
        save_layout(layout, self.layout_path(name)?)
    }

    pub fn delete_layout(&self, name: &str) -> OverlayResult<()> {
        fs::remove_file(self.existing_layout_path(name)?)?;
        info!("Layout deleted: {}", name);
        Ok(())
    }

    /// Fails with `DuplicateId` rather than overwrite an existing layout.
    pub fn rename_layout(&self, old: &str, new: &str) -> OverlayResult<()> {
        let src = self.existing_layout_path(old)?;
        let dst = self.layout_path(new)?;
        if dst.exists() {
            return Err(OverlayError::DuplicateId(new.trim().to_string()));
        }
        fs::rename(&src, &dst)?;
        info!("Layout renamed: {} -> {}", old, new);
        Ok(())
    }

    pub fn duplicate_layout(&self, name: &str, new_name: &str) -> OverlayResult<()> {
        let src = self.existing_layout_path(name)?;
        let dst = self.layout_path(new_name)?;
        if dst.exists() {
            return Err(OverlayError::DuplicateId(new_name.trim().to_string()));
        }
        fs::copy(&src, &dst)?;
        info!("Layout duplicated: {} -> {}", name, new_name);
        Ok(())
    }

    pub fn export_layout<P: AsRef<Path>>(&self, name: &str, dest: P) -> OverlayResult<()> {
        fs::copy(self.existing_layout_path(name)?, dest.as_ref())?;
        info!("Layout exported: {} -> {}", name, dest.as_ref().display());
        Ok(())
    }

    /// Copies an external file in under its own stem, after checking that
    /// it loads. Returns the name it was stored under.
    pub fn import_layout<P: AsRef<Path>>(&self, src: P) -> OverlayResult<String> {
        let src = src.as_ref();
        load_layout(src)?;
        let name = src
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| OverlayError::Invalid(format!("bad import path {}", src.display())))?;

        self.ensure_layouts_dir()?;
        fs::copy(src, self.layout_path(&name)?)?;
        info!("Layout imported: {}", name);
        Ok(name)
    }

    /// A missing settings file yields defaults; a bad one is an error.
    pub fn load_settings(&self) -> OverlayResult<Settings> {
        let path = self.settings_path();
        if !path.exists() {
            debug!("No settings at {}; using defaults", path.display());
            return Ok(Settings::default());
        }
        load_settings(path)
    }

    pub fn save_settings(&self, settings: &Settings) -> OverlayResult<PathBuf> {
        fs::create_dir_all(&self.root)?;
        save_settings(settings, self.settings_path())
    }

    /// The layout named by `settings.last_layout`, or the full keyboard
    /// preset when that is unset or no longer loads.
    pub fn resolve_startup_layout(&self, settings: &Settings) -> OverlayResult<Layout> {
        let restored = match &settings.last_layout {
            Some(LayoutRef::Preset(name)) => layouts::build(name),
            Some(LayoutRef::Saved(name)) => self.load_layout(name),
            None => return layouts::build(FALLBACK_PRESET),
        };
        match restored {
            Ok(layout) => {
                info!("Restored last layout: {}", layout.name);
                Ok(layout)
            }
            Err(e) => {
                warn!("Could not restore last layout ({}); falling back to preset", e);
                layouts::build(FALLBACK_PRESET)
            }
        }
    }
}
