//! # Scanner Error Types
//!
//! Session-fatal errors and the transient per-tick failures that never
//! leave the poll loop.

use thiserror::Error;

/// Errors that end (or prevent) a scanner session.
///
/// All of these are recoverable for the workflow as a whole: the operator
/// falls back to picking the product manually.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// The platform offers no barcode-detection capability at all.
    #[error("Scanner not supported on this device")]
    UnsupportedDevice,

    /// Camera access was denied by the operator or platform policy.
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),

    /// The camera exists but could not be opened or attached.
    #[error("camera device error: {0}")]
    Device(String),
}

/// A single frame grab failed.
///
/// Transient by definition: the poll loop logs it at debug level and tries
/// again on the next tick. It is never surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("frame grab failed: {0}")]
pub struct FrameError(pub String);

/// A single decode attempt failed.
///
/// Same transient semantics as [`FrameError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("decode failed: {0}")]
pub struct DetectError(pub String);
