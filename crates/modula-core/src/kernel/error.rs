//! # Modula Core Kernel Errors
//!
//! Defines the crate-wide [`Error`] type and the [`Result`] alias.
//!
//! Every subsystem owns a typed error enum ([`ModuleSystemError`],
//! [`StorageSystemError`], [`EventSystemError`]); the kernel error wraps them
//! so callers can use `?` across subsystem boundaries and still match on the
//! specific failure.
use std::path::PathBuf;
use std::result::Result as StdResult;

use crate::event::error::EventSystemError;
use crate::module_system::error::ModuleSystemError;
use crate::storage::error::StorageSystemError;
use thiserror::Error as ThisError;

/// Error type shared by every Modula subsystem
#[derive(Debug, ThisError)]
pub enum Error {
    /// Specific, typed module system error
    #[error("Module system error: {0}")]
    ModuleSystem(#[from] ModuleSystemError),

    /// Specific, typed storage system error
    #[error("Storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),

    /// Event system error
    #[error("Event system error: {0}")]
    EventSystem(#[from] EventSystemError),

    /// A global configuration file could not be read or parsed.
    #[error("Configuration error for '{path}': {message}")]
    Config { path: PathBuf, message: String },

    /// Error occurring during a specific kernel lifecycle phase.
    #[error("Kernel lifecycle error during {phase}: {message}")]
    KernelLifecycleError {
        phase: KernelLifecyclePhase,
        message: String,
    },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Represents a specific phase in the kernel's lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum KernelLifecyclePhase {
    #[error("Bootstrap")]
    Bootstrap,
    #[error("Boot")]
    Boot,
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    /// Wrap an I/O failure together with the operation and path it happened on.
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        Error::StorageSystem(StorageSystemError::Io {
            source,
            operation: operation.into(),
            path,
        })
    }

    /// True when this error reports a module that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ModuleSystem(ModuleSystemError::NotFound { .. }))
    }
}
