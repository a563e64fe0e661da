pub mod api;
pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod input;
pub mod keycodes;
pub mod layouts;
pub mod render;
pub mod store;

pub use api::{ListenerStatus, Mode, OverlaySession};
pub use error::{OverlayError, OverlayResult};
