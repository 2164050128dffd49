//! # Validation Module
//!
//! Movement validation for the Lager terminal.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Terminal input parsing                                        │
//! │  ├── Non-numeric quantity entry parses to 0                             │
//! │  └── Unselected worker/product stays None                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - fail fast, before any network call              │
//! │  ├── No mode selected?      → "Select LOAD or TAKE first"               │
//! │  ├── Missing/zero fields?   → "Missing worker, product, or quantity"    │
//! │  └── OK                     → a Movement with quantity > 0              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend                                                       │
//! │  ├── Unknown worker/product → 400                                       │
//! │  └── Not enough stock       → 400 (authoritative; never re-checked      │
//! │                               client-side)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{Mode, Movement};

/// Validates the (mode, worker, product, quantity) tuple and builds the
/// [`Movement`] to submit.
///
/// This is the only sanctioned way to construct a `Movement`; a returned
/// movement always satisfies `quantity > 0` and carries concrete ids.
///
/// A validation failure means NO network call is made for this attempt.
pub fn validate_movement(
    mode: Mode,
    worker_id: Option<i64>,
    product_id: Option<i64>,
    quantity: i64,
) -> Result<Movement, ValidationError> {
    let action = mode.action().ok_or(ValidationError::NoModeSelected)?;

    let worker_id = worker_id.filter(|&id| id != 0);
    let product_id = product_id.filter(|&id| id != 0);

    match (worker_id, product_id) {
        (Some(worker_id), Some(product_id)) if quantity > 0 => Ok(Movement {
            action,
            worker_id,
            product_id,
            quantity,
        }),
        _ => Err(ValidationError::IncompleteMovement),
    }
}
