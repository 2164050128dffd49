//! # lager-core: Pure Domain Logic for the Lager Terminal
//!
//! This crate is the **heart** of the warehouse movement workflow. It contains
//! the domain types and business rules as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Lager Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  apps/terminal (orchestration)                  │   │
//! │  │    mode selection ──► scan ──► validate ──► confirm ──► submit  │   │
//! │  └──────────┬──────────────────────────────────────┬───────────────┘   │
//! │             │                                      │                   │
//! │  ┌──────────▼──────────┐              ┌────────────▼────────────┐      │
//! │  │   lager-client      │              │       lager-scan        │      │
//! │  │   REST + Catalog    │              │   camera + decode loop  │      │
//! │  └──────────┬──────────┘              └────────────┬────────────┘      │
//! │             │                                      │                   │
//! │  ┌──────────▼──────────────────────────────────────▼───────────────┐   │
//! │  │                 ★ lager-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌─────────────┐               │   │
//! │  │   │   types   │  │ validation │  │  scan_code  │               │   │
//! │  │   │  Worker   │  │   rules    │  │  normalize  │               │   │
//! │  │   │  Product  │  │   checks   │  │   payload   │               │   │
//! │  │   │  StockRow │  └────────────┘  └─────────────┘               │   │
//! │  │   │  Movement │                                                │   │
//! │  │   └───────────┘                                                │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO CAMERA • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Worker, Product, StockRow, Movement, Mode)
//! - [`error`] - Typed validation errors
//! - [`validation`] - Movement validation (fail fast, before any network call)
//! - [`scan_code`] - Scanned payload normalization
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Network, camera, file system access is FORBIDDEN here
//! 3. **Lenient Wire Shapes**: The backend encodes flags loosely (booleans as
//!    integers, names spread over kind-specific fields); all of that leniency
//!    lives in the deserializers, never in callers
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

pub mod error;
pub mod scan_code;
pub mod types;
pub mod validation;

pub use error::ValidationError;
pub use scan_code::normalize_payload;
pub use validation::validate_movement;
pub use types::{Mode, Movement, MovementAction, Product, ProductKind, StockRow, Worker};
