use crate::keycodes::KeyId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Duplicate Id: '{0}' is already taken")]
    DuplicateId(String),

    #[error("Binding Conflict: {key} is already bound to cell '{cell}'")]
    Conflict { key: KeyId, cell: String },

    #[error("Corrupt Document: {0}")]
    Corrupt(String),

    #[error("Unsupported Schema Version: document is v{found}, this build reads up to v{supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Permission Denied: {0}")]
    PermissionDenied(String),

    #[error("Out Of Bounds: {0}")]
    OutOfBounds(String),

    #[error("Invalid Value: {0}")]
    Invalid(String),

    #[error("Wrong Mode: '{operation}' is not available while {mode}")]
    WrongMode {
        operation: &'static str,
        mode: &'static str,
    },

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}

pub type OverlayResult<T> = Result<T, OverlayError>;
