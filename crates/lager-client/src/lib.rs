//! # lager-client: Backend REST Client + Catalog Cache
//!
//! Everything the terminal knows about the warehouse backend lives here:
//! the [`Backend`] trait seam, the reqwest implementation of it, and the
//! [`Catalog`] cache of the last-fetched worker/product/stock lists.
//!
//! ## Modules
//!
//! - [`api`] - `Backend` trait, `ApiClient` (reqwest), response shapes
//! - [`catalog`] - last-fetched lists with atomic refresh and active-only views
//! - [`config`] - site-scoped client configuration from the environment
//! - [`error`] - transport error type
//!
//! ## The Backend Seam
//!
//! The controller and the catalog are generic over [`Backend`] rather than
//! wired to `ApiClient` directly. The production implementation speaks HTTP;
//! tests substitute an in-memory fake and can assert that validation
//! failures and declined confirmations never reach the network.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;

pub use api::{ApiClient, Backend, MovementAck, ResolvedProduct};
pub use catalog::Catalog;
pub use config::{ClientConfig, WireFormat};
pub use error::{ClientError, ClientResult};
