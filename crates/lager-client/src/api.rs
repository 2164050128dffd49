//! # Backend API
//!
//! The [`Backend`] trait seam and its production implementation.
//!
//! ## REST Surface Consumed
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │          Backend REST surface (base: {api_url}/api/{site})              │
//! │                                                                         │
//! │  GET  /workers              → array of Worker                           │
//! │  GET  /products             → array of Product                          │
//! │  GET  /stock                → array of StockRow                         │
//! │  GET  /resolve?code=<raw>   → Product identity, or non-2xx = unknown    │
//! │  POST /take | /load         → {"ok": true, "new_quantity": n} (lenient) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Semantics
//! - Any non-2xx status is a hard [`ClientError::Status`] whose display is
//!   `"<status> <body>"` - EXCEPT on `/resolve`, where non-2xx means
//!   "unknown code" and comes back as `Ok(None)`.
//! - A 2xx mutation response whose body is not valid JSON is an empty
//!   success ack. List responses are strict.
//! - Nothing is retried automatically.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use lager_core::{Movement, Product, StockRow, Worker};

use crate::config::{ClientConfig, WireFormat};
use crate::error::{ClientError, ClientResult};

// =============================================================================
// Response Shapes
// =============================================================================

/// Product identity returned by the resolve endpoint.
///
/// Carries the secondary human-readable identifier (`internal_id`) so the
/// terminal can show `"<product_name> (<internal_id>)"` as the scan preview.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResolvedProduct {
    pub id: i64,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub internal_id: String,
}

impl ResolvedProduct {
    /// Preview text for the scan result line.
    pub fn preview(&self) -> String {
        format!("{} ({})", self.product_name, self.internal_id)
    }
}

/// Acknowledgement for a submitted movement.
///
/// The backend answers `{"ok": true, "new_quantity": n}`, but any 2xx body
/// - including an unparseable one - counts as success. Fields are therefore
/// all optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MovementAck {
    #[serde(default)]
    pub new_quantity: Option<i64>,
}

impl MovementAck {
    /// Lenient parse: a body that is not structured data is an empty ack.
    pub(crate) fn from_body(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }
}

// =============================================================================
// Backend Trait
// =============================================================================

/// The backend operations the workflow depends on.
///
/// The terminal's controller and the [`crate::Catalog`] are generic over
/// this trait. Production uses [`ApiClient`]; tests use in-memory fakes
/// that record calls, which is how "no network call happens on validation
/// failure" is actually asserted.
#[allow(async_fn_in_trait)]
pub trait Backend {
    /// Lists workers.
    async fn workers(&self) -> ClientResult<Vec<Worker>>;

    /// Lists products.
    async fn products(&self) -> ClientResult<Vec<Product>>;

    /// Lists current stock rows.
    async fn stock(&self) -> ClientResult<Vec<StockRow>>;

    /// Resolves a raw scanned code into a product identity.
    ///
    /// `Ok(None)` means the code is unknown - a recoverable outcome, not an
    /// error. The operator can still pick the product manually.
    async fn resolve(&self, code: &str) -> ClientResult<Option<ResolvedProduct>>;

    /// Submits one movement to its action-specific endpoint.
    async fn submit(&self, movement: &Movement) -> ClientResult<MovementAck>;
}

// =============================================================================
// Submission Body
// =============================================================================

/// Builds the POST body for a movement in the configured wire format.
fn submit_body(wire: WireFormat, movement: &Movement) -> serde_json::Value {
    match wire {
        WireFormat::Standard => json!({
            "worker_id": movement.worker_id,
            "product_id": movement.product_id,
            "quantity": movement.quantity,
        }),
        // The legacy parser wants the worker id as a string in a field
        // named `worker` (it also accepts a worker name there).
        WireFormat::Legacy => json!({
            "worker": movement.worker_id.to_string(),
            "product_id": movement.product_id,
            "quantity": movement.quantity,
        }),
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Site-scoped HTTP client for the warehouse backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    wire: WireFormat,
}

impl ApiClient {
    /// Builds a client for one warehouse site.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        // Trailing slash matters: Url::join replaces the last segment
        // of a slash-less base.
        let base = Url::parse(&format!(
            "{}/api/{}/",
            config.api_url.trim_end_matches('/'),
            config.site
        ))?;

        Ok(ApiClient {
            http: reqwest::Client::new(),
            base,
            wire: config.wire,
        })
    }

    /// GET a JSON list endpoint, strict parse.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = self.base.join(path)?;
        debug!(%url, "GET");

        let res = self.http.get(url).send().await?;
        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

impl Backend for ApiClient {
    async fn workers(&self) -> ClientResult<Vec<Worker>> {
        self.get_json("workers").await
    }

    async fn products(&self) -> ClientResult<Vec<Product>> {
        self.get_json("products").await
    }

    async fn stock(&self) -> ClientResult<Vec<StockRow>> {
        self.get_json("stock").await
    }

    async fn resolve(&self, code: &str) -> ClientResult<Option<ResolvedProduct>> {
        let mut url = self.base.join("resolve")?;
        url.query_pairs_mut().append_pair("code", code);
        debug!(%url, "GET");

        let res = self.http.get(url).send().await?;
        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            // Unknown code is a dead end for the scan, not for the workflow.
            debug!(code, status = status.as_u16(), "code did not resolve");
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&body)?))
    }

    async fn submit(&self, movement: &Movement) -> ClientResult<MovementAck> {
        let url = self.base.join(movement.action.as_str())?;
        let body = submit_body(self.wire, movement);
        debug!(%url, ?movement, "POST");

        let res = self.http.post(url).json(&body).send().await?;
        let status = res.status();
        let text = res.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), %text, "movement rejected");
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(MovementAck::from_body(&text))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
