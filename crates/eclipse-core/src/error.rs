use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON settings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed TOML settings: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Why a frame produced no mesh. Never fatal to the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TriangulationError {
    #[error("need at least 3 points, got {0}")]
    TooFewPoints(usize),
    #[error("{0} points are collinear or coincident")]
    Degenerate(usize),
}
