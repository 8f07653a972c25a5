use std::io;
use std::path::PathBuf;

/// Errors that can occur during vendoring operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parse error in {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Tree-sitter error: {0}")]
    TreeSitterError(String),

    #[error("Vendor directory not found: {0}")]
    VendorRootMissing(PathBuf),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Rename error: {0}")]
    RenameError(String),

    #[error("Installer error: {0}")]
    InstallerError(String),

    #[error("Hook error: {0}")]
    HookError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Directory walk error: {0}")]
    WalkError(#[from] walkdir::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for vendoring operations
pub type Result<T> = std::result::Result<T, Error>;
