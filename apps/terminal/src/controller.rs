//! # Transaction Controller
//!
//! The workflow root: owns the mode state machine, the current selections,
//! the status message area, and the catalog cache.
//!
//! ## Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Transaction Controller                              │
//! │                                                                         │
//! │  Mode state machine          Submission algorithm                       │
//! │  ──────────────────          ────────────────────                       │
//! │                              1. validate (mode, worker, product, qty)   │
//! │   Unset ──set_mode──► Take      │ fail → message, NO network call       │
//! │     ▲                 Load   2. preview + synchronous yes/no            │
//! │     │                  │        │ decline → "Cancelled", no change      │
//! │     └──────back────────┘     3. exactly one POST /take | /load          │
//! │                              4. ok  → "Saved" + stock-only refresh      │
//! │   (mode changes clear the       err → "Error: <status> <body>",        │
//! │    message, never the           form kept for retry                     │
//! │    selections)                                                          │
//! │                                                                         │
//! │  Scan resolution strategies                                             │
//! │  ──────────────────────────                                             │
//! │  resolve_scanned:  backend lookup; 404 = "Unknown code", recoverable    │
//! │  select_by_payload: digit-run normalize + linear scan, no network       │
//! │  (both select through the same path, so the selection-changed signal    │
//! │   always fires)                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every operation leaves the controller in a stable, re-attemptable state;
//! failures become one-line status messages, never panics.

use tracing::{debug, info, warn};

use lager_client::{Backend, Catalog};
use lager_core::{normalize_payload, validate_movement, Mode, MovementAction};

// =============================================================================
// UI Seams
// =============================================================================

/// Synchronous yes/no confirmation shown before any network effect.
pub trait ConfirmPrompt {
    fn confirm(&self, preview: &str) -> bool;
}

/// Notified whenever the product selection changes programmatically, so
/// dependent UI (enabled buttons, previews) never drifts out of sync with
/// the resolved product.
pub trait SelectionListener {
    fn selection_changed(&self, product_id: Option<i64>);
}

/// Listener that ignores the signal (headless shell, tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl SelectionListener for NoopListener {
    fn selection_changed(&self, _product_id: Option<i64>) {}
}

// =============================================================================
// Controller
// =============================================================================

/// Workflow state for one operator terminal.
///
/// ## Invariants
/// - `worker_id`/`product_id`, when set, reference entities that were
///   active in the catalog at selection time
/// - Mode transitions clear the status message but never the selections
/// - A confirmed movement is submitted exactly once: submission takes
///   `&mut self`, so a second submit cannot start while one is in flight
pub struct Controller {
    catalog: Catalog,
    mode: Mode,
    worker_id: Option<i64>,
    product_id: Option<i64>,
    quantity: i64,
    message: String,
    listener: Box<dyn SelectionListener>,
}

impl Controller {
    pub fn new() -> Self {
        Controller::with_listener(Box::new(NoopListener))
    }

    pub fn with_listener(listener: Box<dyn SelectionListener>) -> Self {
        Controller {
            catalog: Catalog::new(),
            mode: Mode::Unset,
            worker_id: None,
            product_id: None,
            quantity: 0,
            message: String::new(),
            listener,
        }
    }

    // -------------------------------------------------------------------------
    // Read access
    // -------------------------------------------------------------------------

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn worker_id(&self) -> Option<i64> {
        self.worker_id
    }

    pub fn product_id(&self) -> Option<i64> {
        self.product_id
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    fn set_msg(&mut self, msg: impl Into<String>) {
        self.message = msg.into();
    }

    /// Surfaces a message from an outer layer (e.g. a scanner failure) in
    /// the same persistent status area every other outcome uses.
    pub fn report(&mut self, msg: impl Into<String>) {
        self.set_msg(msg);
    }

    // -------------------------------------------------------------------------
    // Mode state machine
    // -------------------------------------------------------------------------

    /// Enters take or load mode. Clears the message, keeps the selections.
    pub fn set_mode(&mut self, action: MovementAction) {
        self.mode = match action {
            MovementAction::Take => Mode::Take,
            MovementAction::Load => Mode::Load,
        };
        self.message.clear();
        debug!(mode = %self.mode, "mode selected");
    }

    /// Back to the mode-selection view. Discards the mode but not the
    /// underlying selections.
    pub fn back_to_mode_select(&mut self) {
        self.mode = Mode::Unset;
        self.message.clear();
        debug!("back to mode select");
    }

    // -------------------------------------------------------------------------
    // Selections
    // -------------------------------------------------------------------------

    /// Selects a worker by id; only currently-active workers are accepted.
    pub fn select_worker(&mut self, id: i64) {
        if self.catalog.worker_is_active(id) {
            self.worker_id = Some(id);
            self.message.clear();
        } else {
            self.set_msg(format!("Unknown worker id {id}"));
        }
    }

    /// Selects a product by id; only currently-active products are
    /// accepted. Fires the selection-changed signal.
    ///
    /// Both resolution strategies funnel through here, which is what keeps
    /// the visible selector and the resolved identity in lockstep.
    pub fn select_product(&mut self, id: i64) {
        if self.catalog.product_is_active(id) {
            self.product_id = Some(id);
            self.message.clear();
            self.listener.selection_changed(self.product_id);
        } else {
            self.set_msg(format!("Unknown product id {id}"));
        }
    }

    /// Stores the entered quantity as-is; validation happens at submit.
    pub fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity;
    }

    // -------------------------------------------------------------------------
    // Catalog refresh
    // -------------------------------------------------------------------------

    /// Full catalog refresh. On failure the message carries the single
    /// error and the cache keeps its previous, consistent contents.
    pub async fn refresh_all<B: Backend>(&mut self, backend: &B) {
        self.message.clear();
        if let Err(e) = self.catalog.refresh(backend).await {
            warn!(error = %e, "catalog refresh failed");
            self.set_msg(e.to_string());
        }
    }

    // -------------------------------------------------------------------------
    // Scan resolution
    // -------------------------------------------------------------------------

    /// Backend-resolve strategy: looks the raw payload up server-side.
    ///
    /// An unknown code is a recoverable outcome (the operator picks
    /// manually); only a transport failure reads as an error.
    pub async fn resolve_scanned<B: Backend>(&mut self, backend: &B, raw: &str) {
        match backend.resolve(raw).await {
            Ok(Some(resolved)) => {
                if self.catalog.product_is_active(resolved.id) {
                    info!(product_id = resolved.id, "scan resolved");
                    self.select_product(resolved.id);
                    self.set_msg(resolved.preview());
                } else {
                    // Resolved server-side but not selectable here; the
                    // selector must not drift from what the operator sees.
                    self.set_msg(format!("Scanned {}, but not in product list", resolved.id));
                }
            }
            Ok(None) => {
                self.set_msg(format!("Unknown code: {raw}"));
            }
            Err(e) => {
                warn!(error = %e, "resolve request failed");
                self.set_msg(format!("Error: {e}"));
            }
        }
    }

    /// Local-match strategy: digit-run normalization plus a linear scan of
    /// the loaded product options. No network call.
    pub fn select_by_payload(&mut self, raw: &str) {
        let Some(id_str) = normalize_payload(raw) else {
            // No digits means no payload; nothing to report.
            debug!(raw, "payload without digits ignored");
            return;
        };

        match self.catalog.product_by_exact_id(&id_str).map(|p| p.id) {
            Some(id) => {
                self.select_product(id);
                self.set_msg(format!("Selected product id {id_str}"));
            }
            None => {
                self.set_msg(format!("Scanned {id_str}, but not in product list"));
            }
        }
    }

    // -------------------------------------------------------------------------
    // Submission
    // -------------------------------------------------------------------------

    /// Validates, confirms, and submits the current mode's movement.
    ///
    /// See the module diagram for the full algorithm. Failure never clears
    /// the form: the operator retries unchanged.
    pub async fn submit_current_mode<B: Backend>(
        &mut self,
        backend: &B,
        prompt: &dyn ConfirmPrompt,
    ) {
        self.message.clear();

        let movement = match validate_movement(
            self.mode,
            self.worker_id,
            self.product_id,
            self.quantity,
        ) {
            Ok(movement) => movement,
            Err(e) => {
                self.set_msg(e.to_string());
                return;
            }
        };

        let worker_name = self
            .catalog
            .worker_name(movement.worker_id)
            .unwrap_or("?")
            .to_string();
        let product_name = self
            .catalog
            .product_name(movement.product_id)
            .unwrap_or("?")
            .to_string();

        let preview = movement.preview(&worker_name, &product_name);
        if !prompt.confirm(&preview) {
            self.set_msg("Cancelled");
            return;
        }

        info!(?movement, "submitting movement");
        match backend.submit(&movement).await {
            Ok(ack) => {
                if let Some(new_quantity) = ack.new_quantity {
                    debug!(new_quantity, "movement acknowledged");
                }
                self.set_msg("Saved");
                // Only the stock view changed server-side.
                if let Err(e) = self.catalog.refresh_stock(backend).await {
                    warn!(error = %e, "stock refresh after save failed");
                }
            }
            Err(e) => {
                warn!(error = %e, "movement submission failed");
                self.set_msg(format!("Error: {e}"));
            }
        }
    }
}

impl Default for Controller {
    fn default() -> Self {
        Controller::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use lager_client::{ClientError, ClientResult, MovementAck, ResolvedProduct};
    use lager_core::{Movement, Product, StockRow, Worker};

    /// Backend fake that records every call it receives.
    #[derive(Default)]
    struct RecordingBackend {
        calls: Mutex<Vec<String>>,
        resolve_to: Option<ResolvedProduct>,
        reject_submit: Option<(u16, String)>,
    }

    impl RecordingBackend {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }
    }

    impl Backend for RecordingBackend {
        async fn workers(&self) -> ClientResult<Vec<Worker>> {
            self.record("workers");
            Ok(serde_json::from_str(
                r#"[
                    {"id": 3, "name": "Anna"},
                    {"id": 4, "name": "Bela", "active": 0}
                ]"#,
            )
            .unwrap())
        }

        async fn products(&self) -> ClientResult<Vec<Product>> {
            self.record("products");
            Ok(serde_json::from_str(
                r#"[
                    {"id": 7, "materialkurztext": "Patchkabel 3m"},
                    {"id": 42, "product_name": "Bit-Set"}
                ]"#,
            )
            .unwrap())
        }

        async fn stock(&self) -> ClientResult<Vec<StockRow>> {
            self.record("stock");
            Ok(serde_json::from_str(
                r#"[{"product_id": 7, "materialkurztext": "Patchkabel 3m", "quantity": 10}]"#,
            )
            .unwrap())
        }

        async fn resolve(&self, code: &str) -> ClientResult<Option<ResolvedProduct>> {
            self.record(format!("resolve {code}"));
            Ok(self.resolve_to.clone())
        }

        async fn submit(&self, movement: &Movement) -> ClientResult<MovementAck> {
            self.record(format!(
                "submit {} worker_id={} product_id={} quantity={}",
                movement.action, movement.worker_id, movement.product_id, movement.quantity
            ));
            if let Some((status, body)) = &self.reject_submit {
                return Err(ClientError::Status {
                    status: *status,
                    body: body.clone(),
                });
            }
            Ok(MovementAck {
                new_quantity: Some(5),
            })
        }
    }

    struct Answer(bool);

    impl ConfirmPrompt for Answer {
        fn confirm(&self, _preview: &str) -> bool {
            self.0
        }
    }

    struct CountingListener(Arc<AtomicUsize>);

    impl SelectionListener for CountingListener {
        fn selection_changed(&self, _product_id: Option<i64>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn loaded_controller(backend: &RecordingBackend) -> Controller {
        let mut c = Controller::new();
        c.refresh_all(backend).await;
        c
    }

    #[tokio::test]
    async fn submit_without_mode_makes_no_network_call() {
        let backend = RecordingBackend::default();
        let mut c = loaded_controller(&backend).await;
        let fetches = backend.calls().len();

        c.submit_current_mode(&backend, &Answer(true)).await;

        assert_eq!(c.message(), "Select LOAD or TAKE first");
        assert_eq!(backend.calls().len(), fetches);
    }

    #[tokio::test]
    async fn invalid_quantity_makes_no_network_call() {
        let backend = RecordingBackend::default();
        let mut c = loaded_controller(&backend).await;
        c.set_mode(MovementAction::Take);
        c.select_worker(3);
        c.select_product(7);
        let fetches = backend.calls().len();

        for qty in [0, -5] {
            c.set_quantity(qty);
            c.submit_current_mode(&backend, &Answer(true)).await;
            assert_eq!(c.message(), "Missing worker, product, or quantity");
        }
        assert_eq!(backend.calls().len(), fetches);
    }

    #[tokio::test]
    async fn declined_confirmation_changes_nothing() {
        let backend = RecordingBackend::default();
        let mut c = loaded_controller(&backend).await;
        c.set_mode(MovementAction::Take);
        c.select_worker(3);
        c.select_product(7);
        c.set_quantity(5);
        let fetches = backend.calls().len();

        c.submit_current_mode(&backend, &Answer(false)).await;

        assert_eq!(c.message(), "Cancelled");
        assert_eq!(backend.calls().len(), fetches);
        assert_eq!(c.mode(), Mode::Take);
        assert_eq!(c.worker_id(), Some(3));
        assert_eq!(c.product_id(), Some(7));
    }

    #[tokio::test]
    async fn confirmed_take_posts_once_and_refreshes_stock() {
        let backend = RecordingBackend::default();
        let mut c = loaded_controller(&backend).await;
        c.set_mode(MovementAction::Take);
        c.select_worker(3);
        c.select_product(7);
        c.set_quantity(5);
        let fetches = backend.calls().len();

        c.submit_current_mode(&backend, &Answer(true)).await;

        assert_eq!(c.message(), "Saved");
        let new_calls = backend.calls()[fetches..].to_vec();
        assert_eq!(
            new_calls,
            ["submit take worker_id=3 product_id=7 quantity=5", "stock"]
        );
    }

    #[tokio::test]
    async fn rejected_submit_keeps_form_and_skips_refresh() {
        let backend = RecordingBackend {
            reject_submit: Some((400, "Not enough stock".into())),
            ..RecordingBackend::default()
        };
        let mut c = loaded_controller(&backend).await;
        c.set_mode(MovementAction::Take);
        c.select_worker(3);
        c.select_product(7);
        c.set_quantity(500);

        c.submit_current_mode(&backend, &Answer(true)).await;

        assert_eq!(c.message(), "Error: 400 Not enough stock");
        assert!(backend.calls().last().unwrap().starts_with("submit"));
        assert_eq!(c.mode(), Mode::Take);
        assert_eq!(c.quantity(), 500);
    }

    #[tokio::test]
    async fn unknown_code_leaves_selector_unchanged() {
        let backend = RecordingBackend::default();
        let mut c = loaded_controller(&backend).await;
        c.select_product(7);

        c.resolve_scanned(&backend, "ABC").await;

        assert_eq!(c.message(), "Unknown code: ABC");
        assert_eq!(c.product_id(), Some(7));
    }

    #[tokio::test]
    async fn resolved_code_selects_and_signals() {
        let backend = RecordingBackend {
            resolve_to: Some(ResolvedProduct {
                id: 42,
                product_name: "Bit-Set".into(),
                internal_id: "WZ-007".into(),
            }),
            ..RecordingBackend::default()
        };
        let changes = Arc::new(AtomicUsize::new(0));
        let mut c = Controller::with_listener(Box::new(CountingListener(Arc::clone(&changes))));
        c.refresh_all(&backend).await;

        c.resolve_scanned(&backend, "QR-42").await;

        assert_eq!(c.product_id(), Some(42));
        assert_eq!(c.message(), "Bit-Set (WZ-007)");
        assert_eq!(changes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn local_match_normalizes_then_compares_strings() {
        let backend = RecordingBackend::default();
        let mut c = loaded_controller(&backend).await;
        let fetches = backend.calls().len();

        // "42" is in the list; the zero-padded form is not.
        c.select_by_payload("QR-42-X");
        assert_eq!(c.product_id(), Some(42));
        assert_eq!(c.message(), "Selected product id 42");

        c.select_by_payload("PRD-00042-X");
        assert_eq!(c.message(), "Scanned 00042, but not in product list");
        // Previous selection survives a failed match.
        assert_eq!(c.product_id(), Some(42));

        // Local matching never touches the backend.
        assert_eq!(backend.calls().len(), fetches);
    }

    #[tokio::test]
    async fn mode_switch_clears_message_but_not_selections() {
        let backend = RecordingBackend::default();
        let mut c = loaded_controller(&backend).await;
        c.select_worker(3);
        c.select_product(7);
        c.set_quantity(2);
        c.set_mode(MovementAction::Take);
        c.submit_current_mode(&backend, &Answer(false)).await;
        assert_eq!(c.message(), "Cancelled");

        c.set_mode(MovementAction::Load);
        assert_eq!(c.message(), "");
        assert_eq!(c.worker_id(), Some(3));

        c.back_to_mode_select();
        assert_eq!(c.mode(), Mode::Unset);
        assert_eq!(c.worker_id(), Some(3));
        assert_eq!(c.product_id(), Some(7));
        assert_eq!(c.quantity(), 2);
    }

    #[tokio::test]
    async fn inactive_entities_are_not_selectable() {
        let backend = RecordingBackend::default();
        let mut c = loaded_controller(&backend).await;

        c.select_worker(4);
        assert_eq!(c.worker_id(), None);
        assert_eq!(c.message(), "Unknown worker id 4");

        c.select_product(99);
        assert_eq!(c.product_id(), None);
        assert_eq!(c.message(), "Unknown product id 99");
    }
}
