//! # Lager Terminal Entry Point
//!
//! Interactive terminal for recording warehouse inventory movements
//! ("take" / "load") against one site-scoped backend.
//!
//! ## Startup Sequence
//! 1. Initialize tracing (RUST_LOG env filter, default INFO)
//! 2. Load client configuration from the environment
//! 3. Build the site-scoped ApiClient
//! 4. Initial catalog refresh (workers + products + stock)
//! 5. Enter the operator command loop

mod controller;
mod shell;

use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use lager_client::{ApiClient, ClientConfig};

use crate::controller::Controller;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            eprintln!("configuration error: {e}");
            eprintln!("set LAGER_SITE=konstanz (or sindelfingen) and retry");
            return ExitCode::FAILURE;
        }
    };

    let site = config.site.clone();
    let backend = match ApiClient::new(&config) {
        Ok(backend) => backend,
        Err(e) => {
            error!(error = %e, "cannot build API client");
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(%site, "starting Lager terminal");
    println!("Lager: {site}");

    let mut controller = Controller::new();
    controller.refresh_all(&backend).await;

    if let Err(e) = shell::run(controller, &backend).await {
        error!(error = %e, "terminal I/O failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
