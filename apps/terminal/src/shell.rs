//! # Operator Shell
//!
//! Line-oriented front end over the [`Controller`]. Every command maps to
//! one controller operation; after each command the status area and any
//! requested view are re-rendered.
//!
//! ## Commands
//! ```text
//! mode take | mode load    enter a movement mode
//! back                     back to mode selection
//! worker <id>              select a worker
//! product <id>             select a product
//! qty <n>                  set the quantity
//! scan                     camera scan (falls back to manual on this target)
//! scan <payload>           hand-entered payload, matched locally
//! resolve <code>           backend lookup of a raw code
//! submit                   validate + confirm + submit the current mode
//! refresh                  re-fetch workers, products, and stock
//! stock | workers | products   render a view
//! quit
//! ```

use std::io::{self, Write};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use lager_client::Backend;
use lager_core::MovementAction;
use lager_scan::{Detector, DetectError, Frame, NoCamera, NoopViewport, ScannerSession};

use crate::controller::{ConfirmPrompt, Controller};

// =============================================================================
// Stdin Confirmation
// =============================================================================

/// Synchronous yes/no prompt on the terminal.
pub struct StdinPrompt;

impl ConfirmPrompt for StdinPrompt {
    fn confirm(&self, preview: &str) -> bool {
        println!("{preview} [y/N]");
        let _ = io::stdout().flush();

        let mut answer = String::new();
        if io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

/// Detector stub for targets without optical decoding.
///
/// Never reached in practice: the paired [`NoCamera`] fails `start()`
/// before the poll loop exists.
struct NoDetector;

impl Detector for NoDetector {
    fn detect(&self, _frame: &Frame) -> Result<Option<String>, DetectError> {
        Ok(None)
    }
}

// =============================================================================
// Rendering
// =============================================================================

fn render_status(controller: &Controller) {
    let worker = controller
        .worker_id()
        .and_then(|id| controller.catalog().worker_name(id))
        .unwrap_or("-");
    let product = controller
        .product_id()
        .and_then(|id| controller.catalog().product_name(id))
        .unwrap_or("-");

    println!(
        "[mode: {} | worker: {} | product: {} | qty: {}]",
        controller.mode(),
        worker,
        product,
        controller.quantity()
    );
    if !controller.message().is_empty() {
        println!("  {}", controller.message());
    }
}

fn render_stock(controller: &Controller) {
    println!("{:<40} {:>8}", "Product", "Quantity");
    for row in controller.catalog().visible_stock() {
        println!("{:<40} {:>8}", row.display_name, row.quantity);
    }
}

fn render_workers(controller: &Controller) {
    for w in controller.catalog().active_workers() {
        println!("{:>6}  {}", w.id, w.name);
    }
}

fn render_products(controller: &Controller) {
    for p in controller.catalog().active_products() {
        println!("{:>6}  {}  [{}]", p.id, p.display_name, p.kind);
    }
}

// =============================================================================
// Command Loop
// =============================================================================

/// Runs the shell until EOF or `quit`.
pub async fn run<B: Backend>(mut controller: Controller, backend: &B) -> io::Result<()> {
    let session = ScannerSession::new(
        Arc::new(NoCamera),
        Arc::new(NoDetector),
        Arc::new(NoopViewport),
    );

    println!("Lager terminal ready. Type 'help' for commands.");
    render_status(&controller);

    // Read line by line without holding the stdin lock: the confirmation
    // prompt reads stdin too, and the lock is not reentrant.
    loop {
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let mut parts = line.split_whitespace();
        let Some(cmd) = parts.next() else {
            continue;
        };
        let arg = parts.next();

        match (cmd, arg) {
            ("mode", Some("take")) => controller.set_mode(MovementAction::Take),
            ("mode", Some("load")) => controller.set_mode(MovementAction::Load),
            ("back", _) => controller.back_to_mode_select(),

            ("worker", Some(id)) => match id.parse() {
                Ok(id) => controller.select_worker(id),
                Err(_) => println!("usage: worker <id>"),
            },
            ("product", Some(id)) => match id.parse() {
                Ok(id) => controller.select_product(id),
                Err(_) => println!("usage: product <id>"),
            },
            // Non-numeric entry parses to 0 and is caught at submit,
            // the same way the original form treated it.
            ("qty", Some(q)) => controller.set_quantity(q.parse().unwrap_or(0)),

            ("scan", Some(payload)) => controller.select_by_payload(payload),
            ("scan", None) => {
                camera_scan(&session, &mut controller, backend).await;
            }
            ("resolve", Some(code)) => controller.resolve_scanned(backend, code).await,

            ("submit", _) => controller.submit_current_mode(backend, &StdinPrompt).await,
            ("refresh", _) => controller.refresh_all(backend).await,

            ("stock", _) => render_stock(&controller),
            ("workers", _) => render_workers(&controller),
            ("products", _) => render_products(&controller),

            ("help", _) => print_help(),
            ("quit", _) | ("exit", _) => break,
            (other, _) => println!("unknown command: {other} (try 'help')"),
        }

        render_status(&controller);
    }

    session.stop();
    Ok(())
}

/// One camera scan: start the session, wait for the single payload, then
/// resolve it against the backend.
///
/// On this target the camera is [`NoCamera`], so this degrades immediately
/// to the manual path with the standard unsupported-device message.
async fn camera_scan<B: Backend>(
    session: &ScannerSession,
    controller: &mut Controller,
    backend: &B,
) {
    let (tx, mut rx) = mpsc::unbounded_channel();

    match session.start(Box::new(move |raw: &str| {
        let _ = tx.send(raw.to_string());
    })) {
        Ok(()) => match rx.recv().await {
            Some(raw) => controller.resolve_scanned(backend, &raw).await,
            None => debug!("scan session ended without a payload"),
        },
        Err(e) => {
            controller.report(e.to_string());
            println!("  (use 'scan <payload>' or 'product <id>' instead)");
        }
    }
}

fn print_help() {
    println!(
        "\
mode take | mode load    enter a movement mode
back                     back to mode selection
worker <id>              select a worker
product <id>             select a product
qty <n>                  set the quantity
scan [payload]           camera scan, or match a hand-entered payload
resolve <code>           backend lookup of a raw code
submit                   validate + confirm + submit
refresh                  re-fetch workers, products, and stock
stock | workers | products
quit"
    );
}
