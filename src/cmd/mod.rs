pub mod edit;
pub mod export;
pub mod layouts;
pub mod presets;
pub mod replay;
pub mod show;
pub mod validate;

use keyoverlay::error::{OverlayError, OverlayResult};
use keyoverlay::geometry::Layout;
use keyoverlay::layouts as presets_lib;
use keyoverlay::store::{self, ConfigDir};
use std::path::{Path, PathBuf};

/// Shared by every command: where saved layouts and settings live.
pub struct Context {
    pub dir: ConfigDir,
}

impl Context {
    pub fn new(config_dir: Option<PathBuf>) -> OverlayResult<Self> {
        let dir = match config_dir {
            Some(root) => ConfigDir::new(root),
            None => ConfigDir::resolve()?,
        };
        Ok(Self { dir })
    }

    /// A layout argument is, in order: an existing file, a preset id or
    /// name, or the name of a saved layout.
    pub fn resolve_layout(&self, source: &str) -> OverlayResult<Layout> {
        let path = Path::new(source);
        if path.is_file() {
            return store::load_layout(path);
        }
        match presets_lib::build(source) {
            Err(OverlayError::NotFound(_)) => self.dir.load_layout(source).map_err(|e| match e {
                OverlayError::NotFound(_) | OverlayError::Invalid(_) => OverlayError::NotFound(
                    format!("'{}' is not a file, preset or saved layout", source),
                ),
                other => other,
            }),
            other => other,
        }
    }
}
