//! # Scanner Session
//!
//! Owns the camera stream and the decode poll loop.
//!
//! ## Poll Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Decode Poll Task                                 │
//! │                                                                         │
//! │  tokio::select! {                                                       │
//! │      interval.tick() (250 ms, ~4 Hz)                                    │
//! │          ├── grab frame     ── transient error? → log, next tick        │
//! │          ├── run detector   ── transient error? → log, next tick        │
//! │          ├── empty payload?                     → next tick             │
//! │          └── first non-empty payload:                                   │
//! │                 deliver to listener EXACTLY ONCE,                       │
//! │                 then the same teardown as stop()                        │
//! │                                                                         │
//! │      shutdown channel ──────────────────────────► exit loop             │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why deliver under the lock?
//! `stop()` must guarantee that no callback fires after it returns, even if
//! a decode is in flight on the poll task. Delivery takes the listener out
//! of the shared state under the same mutex `stop()` uses for teardown, so
//! the two can never interleave: whoever wins the lock either delivers or
//! removes the listener for good.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::device::{Camera, CameraStream, DecodeListener, Detector, Viewport};
use crate::error::ScanError;

/// Decode poll period (~4 Hz).
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

// =============================================================================
// Session State
// =============================================================================

/// Scanner session lifecycle state.
///
/// `Decoded`, `Stopped`, and `Failed` are terminal and collapse back to
/// `Idle` inside the same locked section that reaches them, so external
/// observers only ever see `Idle`, `Starting`, or `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Starting,
    Active,
    Decoded,
    Stopped,
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Starting => write!(f, "starting"),
            SessionState::Active => write!(f, "active"),
            SessionState::Decoded => write!(f, "decoded"),
            SessionState::Stopped => write!(f, "stopped"),
            SessionState::Failed => write!(f, "failed"),
        }
    }
}

// =============================================================================
// Scanner Session
// =============================================================================

struct Inner {
    state: SessionState,
    stream: Option<Box<dyn CameraStream>>,
    listener: Option<Box<dyn DecodeListener>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
}

/// The one owner of the camera resource.
///
/// ## Invariants
/// - Only one session may be `Active` at a time; `start()` while active is
///   a guarded no-op, not a queued request
/// - The poll timer and the media stream are released together, through
///   one teardown path
/// - The listener fires at most once, never after `stop()` has returned
pub struct ScannerSession {
    camera: Arc<dyn Camera>,
    detector: Arc<dyn Detector>,
    viewport: Arc<dyn Viewport>,
    poll_interval: Duration,
    inner: Arc<Mutex<Inner>>,
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    // A poisoned lock only means a panic elsewhere; the state itself is
    // still sound to tear down.
    inner.lock().unwrap_or_else(|e| e.into_inner())
}

/// Shared teardown: stream tracks stopped, listener discarded, viewport
/// hidden, state back to Idle. Safe to run from any state, any number of
/// times.
fn teardown(guard: &mut Inner, viewport: &dyn Viewport) {
    if let Some(mut stream) = guard.stream.take() {
        stream.shutdown();
    }
    guard.listener = None;
    guard.shutdown_tx = None;
    viewport.hide();
    guard.state = SessionState::Idle;
}

impl ScannerSession {
    pub fn new(
        camera: Arc<dyn Camera>,
        detector: Arc<dyn Detector>,
        viewport: Arc<dyn Viewport>,
    ) -> Self {
        ScannerSession {
            camera,
            detector,
            viewport,
            poll_interval: POLL_INTERVAL,
            inner: Arc::new(Mutex::new(Inner {
                state: SessionState::Idle,
                stream: None,
                listener: None,
                shutdown_tx: None,
            })),
        }
    }

    /// Overrides the poll period (tests run much faster than 4 Hz).
    pub fn with_poll_interval(mut self, period: Duration) -> Self {
        self.poll_interval = period;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        lock(&self.inner).state
    }

    /// Starts the camera and the decode loop.
    ///
    /// Must be called from within a tokio runtime (the decode loop is a
    /// spawned task). A second `start()` while a session is already active
    /// is a no-op and does NOT acquire a second stream.
    pub fn start(&self, listener: Box<dyn DecodeListener>) -> Result<(), ScanError> {
        let mut guard = lock(&self.inner);

        if matches!(guard.state, SessionState::Starting | SessionState::Active) {
            debug!(state = %guard.state, "scan session already running, ignoring start");
            return Ok(());
        }

        if !self.camera.is_supported() {
            return Err(ScanError::UnsupportedDevice);
        }

        guard.state = SessionState::Starting;

        let stream = match self.camera.open() {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "camera open failed");
                guard.state = SessionState::Failed;
                // Failed is terminal; return to Idle before the caller
                // sees the error.
                guard.state = SessionState::Idle;
                return Err(e);
            }
        };

        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        guard.stream = Some(stream);
        guard.listener = Some(listener);
        guard.shutdown_tx = Some(shutdown_tx);
        guard.state = SessionState::Active;
        self.viewport.show();
        drop(guard);

        info!("scan session active");

        tokio::spawn(run_poll(
            Arc::clone(&self.inner),
            Arc::clone(&self.detector),
            Arc::clone(&self.viewport),
            shutdown_rx,
            self.poll_interval,
        ));

        Ok(())
    }

    /// Stops the session.
    ///
    /// Idempotent and safe from any state, including never-started. Once
    /// this returns, the stream is released, the viewport is hidden, and
    /// no decode callback can fire.
    pub fn stop(&self) {
        let mut guard = lock(&self.inner);

        if guard.state == SessionState::Active {
            guard.state = SessionState::Stopped;
        }

        if let Some(tx) = guard.shutdown_tx.take() {
            // Poll task may already be gone; either way the loop exits.
            let _ = tx.try_send(());
        }

        teardown(&mut guard, self.viewport.as_ref());
        debug!("scan session stopped");
    }
}

/// The decode poll loop, spawned per session start.
async fn run_poll(
    inner: Arc<Mutex<Inner>>,
    detector: Arc<dyn Detector>,
    viewport: Arc<dyn Viewport>,
    mut shutdown_rx: mpsc::Receiver<()>,
    period: Duration,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                // All per-tick work is synchronous and happens under the
                // lock; nothing below awaits.
                let mut guard = lock(&inner);

                if guard.state != SessionState::Active {
                    break;
                }

                let Some(stream) = guard.stream.as_mut() else {
                    break;
                };

                let frame = match stream.grab_frame() {
                    Ok(frame) => frame,
                    Err(e) => {
                        // Transient: retried on the next tick, never surfaced.
                        debug!(error = %e, "frame grab failed, retrying");
                        continue;
                    }
                };

                let payload = match detector.detect(&frame) {
                    Ok(Some(raw)) => raw.trim().to_string(),
                    Ok(None) => continue,
                    Err(e) => {
                        debug!(error = %e, "decode failed, retrying");
                        continue;
                    }
                };

                if payload.is_empty() {
                    continue;
                }

                // First successful decode wins.
                guard.state = SessionState::Decoded;
                info!(payload = %payload, "code decoded");

                if let Some(listener) = guard.listener.take() {
                    listener.on_payload(&payload);
                }

                teardown(&mut guard, viewport.as_ref());
                break;
            }

            _ = shutdown_rx.recv() => {
                debug!("scan poll loop shut down");
                break;
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Frame, NoCamera, NoopViewport};
    use crate::error::{DetectError, FrameError};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Camera that counts opened streams and tracks their shutdown.
    struct FakeCamera {
        opens: Arc<AtomicUsize>,
        stream_shut: Arc<AtomicBool>,
    }

    struct FakeStream {
        shut: Arc<AtomicBool>,
    }

    impl Camera for FakeCamera {
        fn is_supported(&self) -> bool {
            true
        }

        fn open(&self) -> Result<Box<dyn CameraStream>, ScanError> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeStream {
                shut: Arc::clone(&self.stream_shut),
            }))
        }
    }

    impl CameraStream for FakeStream {
        fn grab_frame(&mut self) -> Result<Frame, FrameError> {
            Ok(Frame {
                width: 1,
                height: 1,
                pixels: vec![0],
            })
        }

        fn shutdown(&mut self) {
            self.shut.store(true, Ordering::SeqCst);
        }
    }

    /// Detector that plays back a scripted sequence of tick outcomes.
    struct ScriptedDetector {
        script: Mutex<Vec<Result<Option<String>, DetectError>>>,
    }

    impl ScriptedDetector {
        fn new(mut script: Vec<Result<Option<String>, DetectError>>) -> Self {
            script.reverse();
            ScriptedDetector {
                script: Mutex::new(script),
            }
        }
    }

    impl Detector for ScriptedDetector {
        fn detect(&self, _frame: &Frame) -> Result<Option<String>, DetectError> {
            self.script.lock().unwrap().pop().unwrap_or(Ok(None))
        }
    }

    /// Viewport that records visibility.
    #[derive(Default)]
    struct SpyViewport {
        visible: AtomicBool,
    }

    impl Viewport for SpyViewport {
        fn show(&self) {
            self.visible.store(true, Ordering::SeqCst);
        }

        fn hide(&self) {
            self.visible.store(false, Ordering::SeqCst);
        }
    }

    fn session_with(
        detector: ScriptedDetector,
        viewport: Arc<SpyViewport>,
    ) -> (ScannerSession, Arc<AtomicUsize>, Arc<AtomicBool>) {
        let opens = Arc::new(AtomicUsize::new(0));
        let stream_shut = Arc::new(AtomicBool::new(false));
        let camera = Arc::new(FakeCamera {
            opens: Arc::clone(&opens),
            stream_shut: Arc::clone(&stream_shut),
        });
        let session = ScannerSession::new(camera, Arc::new(detector), viewport)
            .with_poll_interval(Duration::from_millis(1));
        (session, opens, stream_shut)
    }

    async fn wait_for_idle(session: &ScannerSession) {
        for _ in 0..100 {
            if session.state() == SessionState::Idle {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("session never returned to idle, state={}", session.state());
    }

    #[tokio::test]
    async fn unsupported_platform_fails_before_hardware() {
        let session = ScannerSession::new(
            Arc::new(NoCamera),
            Arc::new(ScriptedDetector::new(vec![])),
            Arc::new(NoopViewport),
        );

        let err = session.start(Box::new(|_: &str| {})).unwrap_err();
        assert_eq!(err, ScanError::UnsupportedDevice);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_does_not_open_a_second_stream() {
        let viewport = Arc::new(SpyViewport::default());
        // Never decodes, so the first session stays active.
        let (session, opens, _) = session_with(ScriptedDetector::new(vec![]), viewport);

        session.start(Box::new(|_: &str| {})).unwrap();
        session.start(Box::new(|_: &str| {})).unwrap();

        assert_eq!(opens.load(Ordering::SeqCst), 1);
        session.stop();
    }

    #[tokio::test]
    async fn stop_on_idle_session_is_safe() {
        let viewport = Arc::new(SpyViewport::default());
        let (session, _, _) = session_with(ScriptedDetector::new(vec![]), Arc::clone(&viewport));

        session.stop();
        session.stop();

        assert_eq!(session.state(), SessionState::Idle);
        assert!(!viewport.visible.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn first_decode_delivers_once_and_tears_down() {
        let viewport = Arc::new(SpyViewport::default());
        // Tick 1: transient error. Tick 2: nothing. Tick 3: blank payload.
        // Tick 4: the real code.
        let detector = ScriptedDetector::new(vec![
            Err(DetectError("blurry".into())),
            Ok(None),
            Ok(Some("   ".into())),
            Ok(Some("PRD-00042-X".into())),
        ]);
        let (session, _, stream_shut) = session_with(detector, Arc::clone(&viewport));

        let deliveries = Arc::new(AtomicUsize::new(0));
        let payload_slot = Arc::new(Mutex::new(String::new()));
        let (d, p) = (Arc::clone(&deliveries), Arc::clone(&payload_slot));

        session
            .start(Box::new(move |raw: &str| {
                d.fetch_add(1, Ordering::SeqCst);
                *p.lock().unwrap() = raw.to_string();
            }))
            .unwrap();
        assert!(viewport.visible.load(Ordering::SeqCst));

        wait_for_idle(&session).await;

        assert_eq!(deliveries.load(Ordering::SeqCst), 1);
        assert_eq!(&*payload_slot.lock().unwrap(), "PRD-00042-X");
        // Timer, stream, and viewport went down together.
        assert!(stream_shut.load(Ordering::SeqCst));
        assert!(!viewport.visible.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_any_later_delivery() {
        let viewport = Arc::new(SpyViewport::default());
        let detector = ScriptedDetector::new(vec![]);
        let (session, _, stream_shut) = session_with(detector, Arc::clone(&viewport));

        let deliveries = Arc::new(AtomicUsize::new(0));
        let d = Arc::clone(&deliveries);
        session
            .start(Box::new(move |_: &str| {
                d.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();

        session.stop();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(stream_shut.load(Ordering::SeqCst));
        assert!(!viewport.visible.load(Ordering::SeqCst));

        // Give the poll task every chance to misbehave.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(deliveries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn session_is_restartable_after_decode() {
        let viewport = Arc::new(SpyViewport::default());
        let detector = ScriptedDetector::new(vec![Ok(Some("77".into())), Ok(Some("88".into()))]);
        let (session, opens, _) = session_with(detector, viewport);

        session.start(Box::new(|_: &str| {})).unwrap();
        wait_for_idle(&session).await;

        session.start(Box::new(|_: &str| {})).unwrap();
        wait_for_idle(&session).await;

        assert_eq!(opens.load(Ordering::SeqCst), 2);
    }
}
