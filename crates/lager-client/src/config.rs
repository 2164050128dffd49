//! # Client Configuration
//!
//! Site-scoped configuration for the backend client.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables                                               │
//! │     LAGER_API_URL=http://127.0.0.1:8000                                 │
//! │     LAGER_SITE=konstanz | sindelfingen                                  │
//! │     LAGER_WIRE=standard | legacy                                        │
//! │                                                                         │
//! │  2. Default Values                                                      │
//! │     api_url = http://127.0.0.1:8000                                     │
//! │     site    = konstanz                                                  │
//! │     wire    = standard                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The site key selects the warehouse instance; every endpoint is scoped
//! under `/api/{site}`. A blank site is a startup error, not a fallback.

use std::env;
use std::fmt;
use std::str::FromStr;

use tracing::info;

use crate::error::{ClientError, ClientResult};

/// Default backend location (local development server).
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Default warehouse site.
pub const DEFAULT_SITE: &str = "konstanz";

// =============================================================================
// Wire Format
// =============================================================================

/// Shape of the movement submission body.
///
/// Two frontend generations shipped against the same backend:
///
/// - `Standard`: `{"worker_id": 3, "product_id": 7, "quantity": 5}`
/// - `Legacy`:   `{"worker": "3", "product_id": 7, "quantity": 5}`
///   (worker id rendered as a string; the backend's parser accepts a
///   numeric string and falls back to a name lookup)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireFormat {
    #[default]
    Standard,
    Legacy,
}

impl FromStr for WireFormat {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "standard" => Ok(WireFormat::Standard),
            "legacy" => Ok(WireFormat::Legacy),
            other => Err(ClientError::InvalidWireFormat(other.to_string())),
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireFormat::Standard => write!(f, "standard"),
            WireFormat::Legacy => write!(f, "legacy"),
        }
    }
}

// =============================================================================
// Client Config
// =============================================================================

/// Everything the [`crate::ApiClient`] needs to reach one warehouse site.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend origin, without the `/api/{site}` suffix.
    pub api_url: String,

    /// Warehouse site key (lowercased, trimmed).
    pub site: String,

    /// Submission body shape.
    pub wire: WireFormat,
}

impl ClientConfig {
    /// Loads configuration from the environment, applying defaults.
    ///
    /// Fails when `LAGER_SITE` is set but blank (there is no sensible
    /// warehouse to fall back to in that case) or when `LAGER_WIRE` names
    /// an unknown format.
    pub fn from_env() -> ClientResult<Self> {
        let api_url = env::var("LAGER_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let site = match env::var("LAGER_SITE") {
            Ok(v) => {
                let v = v.trim().to_lowercase();
                if v.is_empty() {
                    return Err(ClientError::MissingSite);
                }
                v
            }
            Err(_) => DEFAULT_SITE.to_string(),
        };

        let wire = match env::var("LAGER_WIRE") {
            Ok(v) => v.parse()?,
            Err(_) => WireFormat::default(),
        };

        info!(%api_url, %site, %wire, "client configuration loaded");

        Ok(ClientConfig {
            api_url,
            site,
            wire,
        })
    }

    /// Builds a config directly (used by tests and embedding callers).
    pub fn new(api_url: impl Into<String>, site: impl Into<String>) -> ClientResult<Self> {
        let site = site.into().trim().to_lowercase();
        if site.is_empty() {
            return Err(ClientError::MissingSite);
        }
        Ok(ClientConfig {
            api_url: api_url.into(),
            site,
            wire: WireFormat::default(),
        })
    }
}
