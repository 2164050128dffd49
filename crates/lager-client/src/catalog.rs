//! # Catalog Cache
//!
//! Holds the last-fetched worker, product, and stock lists.
//!
//! ## Refresh Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Catalog::refresh                                 │
//! │                                                                         │
//! │  GET /workers ──ok──► GET /products ──ok──► GET /stock ──ok──┐          │
//! │       │                    │                    │            │          │
//! │      err                  err                  err           ▼          │
//! │       │                    │                    │     replace all three │
//! │       └────────────────────┴────────────────────┘     lists together    │
//! │                            │                                            │
//! │                            ▼                                            │
//! │              whole refresh aborts; cache keeps its                      │
//! │              previous contents (stale-but-consistent                    │
//! │              beats blank-but-broken)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cache is a pure data holder: it has no awareness of modes, scans, or
//! submissions. Partial replacement is not exposed to callers - the only
//! exception is [`Catalog::refresh_stock`], which the controller runs after
//! a successful movement because only the stock view changed server-side.

use lager_core::{Product, StockRow, Worker};

use crate::api::Backend;
use crate::error::ClientResult;

/// Last-fetched backend lists, replaced wholesale on refresh.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    workers: Vec<Worker>,
    products: Vec<Product>,
    stock: Vec<StockRow>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog::default()
    }

    /// Fetches workers, products, and stock, then replaces all three lists
    /// together. A failure on any fetch leaves the cache untouched.
    pub async fn refresh<B: Backend>(&mut self, backend: &B) -> ClientResult<()> {
        // All three fetches complete before anything is replaced.
        let workers = backend.workers().await?;
        let products = backend.products().await?;
        let stock = backend.stock().await?;

        self.workers = workers;
        self.products = products;
        self.stock = stock;
        Ok(())
    }

    /// Replaces only the stock list (after a successful movement).
    pub async fn refresh_stock<B: Backend>(&mut self, backend: &B) -> ClientResult<()> {
        self.stock = backend.stock().await?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Views
    // -------------------------------------------------------------------------

    /// Active workers, fetch order preserved. This is exactly what the
    /// worker selector shows.
    pub fn active_workers(&self) -> impl Iterator<Item = &Worker> {
        self.workers.iter().filter(|w| w.active)
    }

    /// Active products, fetch order preserved. This is exactly what the
    /// product selector shows.
    pub fn active_products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.active)
    }

    /// Stock rows whose `active` flag is truthy - the rendered stock table.
    pub fn visible_stock(&self) -> impl Iterator<Item = &StockRow> {
        self.stock.iter().filter(|r| r.active)
    }

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    /// Display text of a worker by id.
    pub fn worker_name(&self, id: i64) -> Option<&str> {
        self.workers
            .iter()
            .find(|w| w.id == id)
            .map(|w| w.name.as_str())
    }

    /// Display text of a product by id.
    pub fn product_name(&self, id: i64) -> Option<&str> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.display_name.as_str())
    }

    /// Whether a worker id is currently selectable.
    pub fn worker_is_active(&self, id: i64) -> bool {
        self.active_workers().any(|w| w.id == id)
    }

    /// Whether a product id is currently selectable.
    pub fn product_is_active(&self, id: i64) -> bool {
        self.active_products().any(|p| p.id == id)
    }

    /// Local-match primitive: linear scan of the loaded product options for
    /// an exact string match on the id.
    ///
    /// The comparison is string equality on purpose - a normalized payload
    /// of `"00042"` does NOT select product 42, mirroring how the selector
    /// option values behave.
    pub fn product_by_exact_id(&self, id_str: &str) -> Option<&Product> {
        self.active_products()
            .find(|p| p.id.to_string() == id_str)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
