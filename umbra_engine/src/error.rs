//! Error types for the Umbra renderer
//!
//! This module defines the error types used throughout the engine,
//! including device setup, resource creation and frame submission.

use std::fmt;

/// Result type for Umbra operations
pub type Result<T> = std::result::Result<T, Error>;

/// Umbra renderer errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error (a failing Vulkan call, misuse of a command list...)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (unknown attachment, malformed shader code, bad layout...)
    InvalidResource(String),

    /// Initialization failed (instance, device, swapchain, pipelines...)
    InitializationFailed(String),

    /// A fence wait expired before the GPU signaled it
    Timeout(String),

    /// Operation not allowed in the current renderer state
    InvalidState(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::Timeout(msg) => write!(f, "Timeout: {}", msg),
            Error::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
