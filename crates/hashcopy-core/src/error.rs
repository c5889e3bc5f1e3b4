//! Error types for hashcopy-core

use std::path::PathBuf;

/// Result type for hashcopy-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during a publishing pass
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configured pattern matched nothing
    #[error("No files found! from: {pattern}")]
    NoFilesMatched { pattern: String },

    /// The manifest location resolved to an empty path
    #[error("manifest option malformed! resolved path is empty")]
    EmptyManifestPath,

    /// A pattern is not valid glob syntax
    #[error("Invalid glob pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Neither an output directory nor an output file was provided
    #[error("No output directory: the build defines neither outdir nor outfile")]
    MissingOutputDirectory,

    /// Unrecognized sourcemap setting
    #[error("Invalid sourcemap mode: {value}")]
    InvalidSourcemapMode { value: String },

    /// Fingerprint alphabet cannot encode values
    #[error("Invalid fingerprint alphabet: {reason}")]
    InvalidAlphabet { reason: String },

    /// A matched file does not live under its pattern's context
    #[error("{path} is outside the pattern context {context}")]
    OutsideContext { path: PathBuf, context: PathBuf },

    /// The existing manifest is not a JSON object of strings
    #[error("Failed to parse manifest at {path}: {message}")]
    ManifestParse { path: PathBuf, message: String },

    /// Filesystem error from hashcopy-fs
    #[error(transparent)]
    Fs(#[from] hashcopy_fs::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for errors raised while validating configuration, before any
    /// asset is copied or the manifest is touched.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::NoFilesMatched { .. }
                | Self::EmptyManifestPath
                | Self::InvalidPattern { .. }
                | Self::MissingOutputDirectory
                | Self::InvalidSourcemapMode { .. }
                | Self::InvalidAlphabet { .. }
                | Self::OutsideContext { .. }
        )
    }
}
