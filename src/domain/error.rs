//! Error types for the keygrid engine.
//!
//! This module defines the centralized error type [`KeygridError`] and a type alias
//! [`Result`] used throughout the crate. None of these errors is fatal: the event
//! handler is the recovery boundary and turns every engine-side failure into
//! "the key had no effect".

use crate::app::modes::Mode;
use thiserror::Error;

/// The main error type for keygrid operations.
///
/// # Examples
///
/// ```
/// use keygrid::KeygridError;
///
/// fn validate_speed(speed: f64) -> Result<(), KeygridError> {
///     if speed <= 0.0 {
///         return Err(KeygridError::Config("base_speed must be positive".to_string()));
///     }
///     Ok(())
/// }
///
/// assert!(validate_speed(0.0).is_err());
/// ```
#[derive(Debug, Error)]
pub enum KeygridError {
    /// A label or letter does not map to a valid grid cell.
    ///
    /// Recovered locally by taking no action.
    #[error("Invalid grid address: {0}")]
    InvalidAddress(String),

    /// An operation was invoked in a mode where it is not defined.
    ///
    /// This is a programming invariant violation, not a user-facing error.
    #[error("Operation `{operation}` is not defined in mode {mode:?}")]
    ModeViolation {
        /// Mode the machine was in when the operation was attempted.
        mode: Mode,
        /// Name of the rejected operation.
        operation: &'static str,
    },

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for keygrid operations.
pub type Result<T> = std::result::Result<T, KeygridError>;
