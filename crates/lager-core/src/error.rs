//! # Error Types
//!
//! Typed validation errors for lager-core.
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Error display text IS the user-facing status message - the terminal
//!    shows it in the status area without rewording
//! 3. Errors are enum variants, never String

use thiserror::Error;

/// Input validation errors.
///
/// These occur before any network call is issued. The `Display` text matches
/// what the operator sees in the status line, so callers surface it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No movement mode has been chosen yet.
    #[error("Select LOAD or TAKE first")]
    NoModeSelected,

    /// Worker, product, or quantity is missing / zero / non-positive.
    ///
    /// One message covers all three on purpose: the operator fixes the form
    /// as a whole, and the original workflow never distinguished which field
    /// was at fault.
    #[error("Missing worker, product, or quantity")]
    IncompleteMovement,
}
