//! # lager-scan: Scanner Session
//!
//! Exclusive ownership of the camera and the QR decode loop.
//!
//! The session knows nothing about products: it yields the raw decoded
//! payload exactly once and tears itself down. Resolving that payload into
//! a catalog selection is the terminal's job.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Scanner Session States                             │
//! │                                                                         │
//! │            start()                 first non-empty decode               │
//! │   Idle ──────────────► Starting ──► Active ────────────► Decoded        │
//! │    ▲                      │            │                    │           │
//! │    │   open/support error │     stop() │                    │           │
//! │    │                      ▼            ▼                    │           │
//! │    │                   Failed       Stopped                 │           │
//! │    │                      │            │                    │           │
//! │    └──────────────────────┴────────────┴────────────────────┘           │
//! │                 every terminal state returns to Idle                    │
//! │                 through the SAME teardown path (timer                   │
//! │                 cancelled + tracks stopped + viewport                   │
//! │                 hidden, always together)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod device;
pub mod error;
pub mod session;

pub use device::{Camera, CameraStream, DecodeListener, Detector, Frame, NoCamera, NoopViewport, Viewport};
pub use error::{DetectError, FrameError, ScanError};
pub use session::{ScannerSession, SessionState, POLL_INTERVAL};
