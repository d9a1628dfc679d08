//! Error types for the viewer
//!
//! This module defines the error types used throughout the renderer,
//! covering initialization, device capability, and GPU backend failures.

use std::fmt;

/// Result type for viewer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Viewer errors
///
/// Transient presentation staleness (out-of-date or suboptimal surfaces) is
/// deliberately NOT an error: it is reported through `AcquireOutcome`,
/// `PresentOutcome` and `FrameStatus` so the caller rebuilds the swapchain
/// instead of unwinding.
#[derive(Debug, Clone)]
pub enum Error {
    /// Initialization failed (instance, device, swapchain, pipeline, ...)
    InitializationFailed(String),

    /// Unexpected status from a Vulkan call
    BackendError(String),

    /// No device memory type satisfies the requested bitmask + properties
    NoCompatibleMemoryType,

    /// Invalid resource usage caught at runtime (bad index, missing state)
    InvalidResource(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::NoCompatibleMemoryType => {
                write!(f, "No compatible memory type on this device")
            }
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
