//! # Device Trait Seams
//!
//! The camera hardware, the barcode detector, and the viewport overlay sit
//! behind traits so the session logic is testable without any hardware -
//! the same seam style the rest of the workspace uses for the backend.
//!
//! Production targets plug in a platform camera; headless deployments (and
//! this repository's terminal app) use [`NoCamera`], which reports the
//! platform as unsupported and lets the workflow degrade to manual product
//! selection.

use crate::error::{DetectError, FrameError, ScanError};

// =============================================================================
// Frame
// =============================================================================

/// One grabbed video frame, 8-bit grayscale.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

// =============================================================================
// Camera
// =============================================================================

/// A camera device that can be opened into a stream.
pub trait Camera: Send + Sync {
    /// Whether this platform offers a usable camera + detector pairing
    /// at all. `false` makes `start()` fail with
    /// [`ScanError::UnsupportedDevice`] before touching any hardware.
    fn is_supported(&self) -> bool;

    /// Requests camera access and opens the stream.
    ///
    /// May fail with [`ScanError::PermissionDenied`] or
    /// [`ScanError::Device`].
    fn open(&self) -> Result<Box<dyn CameraStream>, ScanError>;
}

/// An open media stream.
pub trait CameraStream: Send {
    /// Grabs the current frame. Failures are transient.
    fn grab_frame(&mut self) -> Result<Frame, FrameError>;

    /// Stops every track and releases the device.
    ///
    /// Must be idempotent; the session may call it from either the decode
    /// path or `stop()`.
    fn shutdown(&mut self);
}

/// Always-unsupported camera for headless targets.
///
/// Scanning then fails up front with the one error the workflow already
/// knows how to recover from, and the operator picks from the list instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCamera;

impl Camera for NoCamera {
    fn is_supported(&self) -> bool {
        false
    }

    fn open(&self) -> Result<Box<dyn CameraStream>, ScanError> {
        Err(ScanError::UnsupportedDevice)
    }
}

// =============================================================================
// Detector
// =============================================================================

/// Decodes an optical code out of a frame.
pub trait Detector: Send + Sync {
    /// `Ok(None)` when the frame contains no code; `Err` for a transient
    /// decode failure. Both make the loop try again on the next tick.
    fn detect(&self, frame: &Frame) -> Result<Option<String>, DetectError>;
}

// =============================================================================
// Viewport
// =============================================================================

/// The modal camera overlay.
///
/// Shown only while a session is Active; hidden by the shared teardown
/// path, so it can never outlive the stream.
pub trait Viewport: Send + Sync {
    fn show(&self);
    fn hide(&self);
}

/// Viewport that renders nothing (headless targets, tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopViewport;

impl Viewport for NoopViewport {
    fn show(&self) {}
    fn hide(&self) {}
}

// =============================================================================
// Decode Listener
// =============================================================================

/// Receives the raw decoded payload, at most once per session.
///
/// Invoked while the session holds its internal lock, which is what makes
/// "no callback after `stop()` returns" airtight - so implementations must
/// not call back into the session.
pub trait DecodeListener: Send {
    fn on_payload(self: Box<Self>, raw: &str);
}

impl<F: FnOnce(&str) + Send> DecodeListener for F {
    fn on_payload(self: Box<Self>, raw: &str) {
        self(raw)
    }
}
