//! Error types for Marquee Core

use thiserror::Error;

/// Result type alias for controller operations
pub type Result<T> = std::result::Result<T, Error>;

/// Controller error types
#[derive(Error, Debug)]
pub enum Error {
    // Playback errors
    #[error("Autoplay blocked: {0}")]
    AutoplayBlocked(String),

    #[error("Embed fault: {0}")]
    EmbedFault(String),

    #[error("Player command failed: {0}")]
    PlayerCommand(String),

    #[error("Invalid playback state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Playback session closed")]
    SessionClosed,

    // Embed errors
    #[error("Invalid media reference: {0}")]
    InvalidMediaRef(String),

    // Catalog errors
    #[error("Failed to fetch catalog data: {0}")]
    CatalogFetch(String),

    #[cfg(feature = "catalog")]
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::AutoplayBlocked(_) | Error::PlayerCommand(_) => true,
            #[cfg(feature = "catalog")]
            Error::Network(_) => true,
            _ => false,
        }
    }

    /// Returns the error code for diagnostics
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::AutoplayBlocked(_) => "AUTOPLAY_BLOCKED",
            Error::EmbedFault(_) => "EMBED_FAULT",
            Error::PlayerCommand(_) => "PLAYER_COMMAND",
            Error::InvalidStateTransition { .. } => "INVALID_STATE",
            Error::SessionClosed => "SESSION_CLOSED",
            Error::InvalidMediaRef(_) => "INVALID_MEDIA_REF",
            Error::CatalogFetch(_) => "CATALOG_FETCH",
            #[cfg(feature = "catalog")]
            Error::Network(_) => "NETWORK",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::Url(_) => "URL",
            Error::Json(_) => "JSON",
            Error::Io(_) => "IO",
        }
    }
}
