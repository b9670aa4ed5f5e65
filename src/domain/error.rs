//! Error types for the selection component.
//!
//! This module defines the centralized error type [`LiveSelectError`] and a type
//! alias [`Result`] used throughout the crate. Policy rejections (a disabled
//! option, a full tag list, an already-selected value) are *not* errors: they
//! are silent no-ops handled by the controller. Errors only come out of
//! configuration loading and the transport seam.

use thiserror::Error;

/// The main error type for selection component operations.
///
/// # Examples
///
/// ```
/// use liveselect::LiveSelectError;
///
/// fn validate_mode(raw: &str) -> Result<(), LiveSelectError> {
///     Err(LiveSelectError::Config(format!("unknown mode: {raw}")))
/// }
///
/// assert!(validate_mode("multi").is_err());
/// ```
#[derive(Debug, Error)]
pub enum LiveSelectError {
    /// Configuration is invalid or missing.
    ///
    /// The string describes the specific configuration problem.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A TOML configuration document could not be parsed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A message crossing the link could not be serialized or deserialized.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A message was posted while the link between the surface and the
    /// controller was down.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// A specialized `Result` type for selection component operations.
pub type Result<T> = std::result::Result<T, LiveSelectError>;
