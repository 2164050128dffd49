//! # Domain Types
//!
//! Core domain types for the warehouse movement workflow.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Worker      │   │     Product     │   │    StockRow     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │   │  id (i64)       │   │  product_id     │       │
//! │  │  name           │   │  kind           │   │  display_name   │       │
//! │  │  active         │   │  display_name   │   │  quantity       │       │
//! │  └─────────────────┘   │  active         │   │  active         │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ MovementAction  │   │    Movement     │   │      Mode       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Take           │   │  action         │   │  Unset          │       │
//! │  │  Load           │   │  worker_id      │   │  Take           │       │
//! │  └─────────────────┘   │  product_id     │   │  Load           │       │
//! │                        │  quantity (>0)  │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lenient Wire Shapes
//! The backend is loose in two ways, and ALL of that looseness is absorbed
//! here, once, at deserialization time:
//!
//! 1. `active` flags may arrive as a boolean, an integer (0 = inactive), or
//!    be absent entirely (absent = active). Callers only ever see a `bool`.
//! 2. A product's human-readable name is spread over kind-specific fields
//!    (`materialkurztext` for netcom, `product_name` for werkzeug, plus a
//!    plain `name` on older rows). The fallback chain runs exactly once and
//!    the result lands in `display_name`; no render site re-derives it.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Wire Leniency Helpers
// =============================================================================

fn default_active() -> bool {
    true
}

/// Deserializes an `active` flag that may be encoded as a boolean, an
/// integer, or JSON null.
///
/// Any falsy encoding (`false`, `0`) means inactive. Null means active,
/// matching the absent-field default.
fn flag_from_wire<'de, D>(de: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum WireFlag {
        Bool(bool),
        Int(i64),
        Null(()),
    }

    Ok(match WireFlag::deserialize(de)? {
        WireFlag::Bool(b) => b,
        WireFlag::Int(i) => i != 0,
        WireFlag::Null(()) => true,
    })
}

/// Picks the first candidate that is non-empty after trimming.
fn first_non_empty(candidates: [Option<&str>; 3]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Worker
// =============================================================================

/// A warehouse worker movements are attributed to.
///
/// Workers are created, renamed, and deactivated exclusively by the admin
/// panel; this crate treats them as read-only. The legacy `/workers`
/// endpoint pre-filters to active workers and omits the flag, hence the
/// absent-means-active default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub id: i64,
    pub name: String,
    #[serde(default = "default_active", deserialize_with = "flag_from_wire")]
    pub active: bool,
}

// =============================================================================
// Product
// =============================================================================

/// Product category, determining which wire fields identify the product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    /// Network components, identified by `materialkurztext`.
    Netcom,
    /// Tools, identified by `product_name`.
    Werkzeug,
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductKind::Netcom => write!(f, "netcom"),
            ProductKind::Werkzeug => write!(f, "werkzeug"),
        }
    }
}

/// A product that stock movements can be recorded against.
///
/// ## Resolved Once
/// `display_name` and `kind` are resolved from the raw wire record at
/// deserialization time. The raw record (with its kind-specific name
/// fields) is private to this module; callers never run the fallback chain
/// themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: i64,
    pub kind: ProductKind,
    pub display_name: String,
    pub active: bool,
}

/// The product record as the backend actually sends it.
#[derive(Deserialize)]
struct RawProduct {
    id: i64,
    #[serde(default)]
    kind: Option<ProductKind>,
    #[serde(default)]
    materialkurztext: Option<String>,
    #[serde(default)]
    product_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default = "default_active", deserialize_with = "flag_from_wire")]
    active: bool,
}

impl<'de> Deserialize<'de> for Product {
    fn deserialize<D>(de: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawProduct::deserialize(de)?;

        // Legacy rows carry no explicit kind; a record identified by
        // materialkurztext is a netcom part, everything else is a tool.
        let kind = raw.kind.unwrap_or_else(|| {
            if raw
                .materialkurztext
                .as_deref()
                .is_some_and(|s| !s.trim().is_empty())
            {
                ProductKind::Netcom
            } else {
                ProductKind::Werkzeug
            }
        });

        let display_name = first_non_empty([
            raw.materialkurztext.as_deref(),
            raw.product_name.as_deref(),
            raw.name.as_deref(),
        ])
        .unwrap_or_else(|| raw.id.to_string());

        Ok(Product {
            id: raw.id,
            kind,
            display_name,
            active: raw.active,
        })
    }
}

// =============================================================================
// Stock
// =============================================================================

/// Current on-hand quantity for one product.
///
/// The stock view is rebuilt wholesale on every refresh; rows are never
/// patched incrementally. Rows with a falsy `active` flag are excluded from
/// display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockRow {
    pub product_id: i64,
    pub display_name: String,
    pub quantity: i64,
    pub active: bool,
}

#[derive(Deserialize)]
struct RawStockRow {
    product_id: i64,
    #[serde(default)]
    materialkurztext: Option<String>,
    #[serde(default)]
    product_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    quantity: i64,
    #[serde(default = "default_active", deserialize_with = "flag_from_wire")]
    active: bool,
}

impl<'de> Deserialize<'de> for StockRow {
    fn deserialize<D>(de: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawStockRow::deserialize(de)?;

        let display_name = first_non_empty([
            raw.materialkurztext.as_deref(),
            raw.product_name.as_deref(),
            raw.name.as_deref(),
        ])
        .unwrap_or_default();

        Ok(StockRow {
            product_id: raw.product_id,
            display_name,
            quantity: raw.quantity,
            active: raw.active,
        })
    }
}

// =============================================================================
// Movement
// =============================================================================

/// The direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementAction {
    /// Decreases recorded stock, attributed to a worker.
    Take,
    /// Increases recorded stock, attributed to a worker.
    Load,
}

impl MovementAction {
    /// Endpoint path segment (`POST /take`, `POST /load`).
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementAction::Take => "take",
            MovementAction::Load => "load",
        }
    }

    /// Uppercase label for confirmation previews.
    pub fn label(&self) -> &'static str {
        match self {
            MovementAction::Take => "TAKE",
            MovementAction::Load => "LOAD",
        }
    }
}

impl fmt::Display for MovementAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inventory movement, ready for submission.
///
/// ## Invariants
/// - `quantity > 0` (enforced by [`crate::validation::validate_movement`],
///   the only constructor callers should use)
/// - Constructed fresh per submission, never cached
/// - Submitted at most once per user confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Movement {
    pub action: MovementAction,
    pub worker_id: i64,
    pub product_id: i64,
    pub quantity: i64,
}

impl Movement {
    /// Builds the confirmation preview shown before any network effect.
    ///
    /// Warehouse quantity adjustments are not easily undoable, so the
    /// operator always gets this double-check with the resolved display
    /// texts, not raw ids.
    pub fn preview(&self, worker_name: &str, product_name: &str) -> String {
        format!(
            "{} {}\nWorker: {}\nProduct: {}\n\nConfirm?",
            self.action.label(),
            self.quantity,
            worker_name,
            product_name
        )
    }
}

// =============================================================================
// Mode
// =============================================================================

/// The terminal's movement mode.
///
/// `Unset` shows the mode-selection view; `Take`/`Load` show the
/// mode-specific form. Switching modes never clears already-chosen
/// worker/product/quantity, only the status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Unset,
    Take,
    Load,
}

impl Mode {
    /// The action this mode submits, if one is selected.
    pub fn action(&self) -> Option<MovementAction> {
        match self {
            Mode::Unset => None,
            Mode::Take => Some(MovementAction::Take),
            Mode::Load => Some(MovementAction::Load),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Unset => write!(f, "unset"),
            Mode::Take => write!(f, "take"),
            Mode::Load => write!(f, "load"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_without_active_field_defaults_to_active() {
        let w: Worker = serde_json::from_str(r#"{"id": 3, "name": "Anna"}"#).unwrap();
        assert_eq!(w.id, 3);
        assert!(w.active);
    }

    #[test]
    fn active_flag_accepts_integers_and_booleans() {
        let w: Worker = serde_json::from_str(r#"{"id": 1, "name": "A", "active": 0}"#).unwrap();
        assert!(!w.active);

        let w: Worker = serde_json::from_str(r#"{"id": 1, "name": "A", "active": 1}"#).unwrap();
        assert!(w.active);

        let w: Worker = serde_json::from_str(r#"{"id": 1, "name": "A", "active": false}"#).unwrap();
        assert!(!w.active);

        let w: Worker = serde_json::from_str(r#"{"id": 1, "name": "A", "active": null}"#).unwrap();
        assert!(w.active);
    }

    #[test]
    fn product_display_name_falls_back_in_order() {
        let p: Product = serde_json::from_str(
            r#"{"id": 7, "materialkurztext": "Patchkabel 3m", "product_name": "ignored"}"#,
        )
        .unwrap();
        assert_eq!(p.display_name, "Patchkabel 3m");
        assert_eq!(p.kind, ProductKind::Netcom);

        let p: Product =
            serde_json::from_str(r#"{"id": 8, "product_name": "Hammer", "name": "old"}"#).unwrap();
        assert_eq!(p.display_name, "Hammer");
        assert_eq!(p.kind, ProductKind::Werkzeug);

        let p: Product = serde_json::from_str(r#"{"id": 9, "name": "Altbestand"}"#).unwrap();
        assert_eq!(p.display_name, "Altbestand");
    }

    #[test]
    fn product_display_name_falls_back_to_id() {
        let p: Product = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert_eq!(p.display_name, "42");
    }

    #[test]
    fn product_explicit_kind_wins_over_inference() {
        let p: Product = serde_json::from_str(
            r#"{"id": 7, "kind": "werkzeug", "materialkurztext": "Kabel"}"#,
        )
        .unwrap();
        assert_eq!(p.kind, ProductKind::Werkzeug);
    }

    #[test]
    fn product_blank_materialkurztext_infers_werkzeug() {
        let p: Product =
            serde_json::from_str(r#"{"id": 7, "materialkurztext": "  ", "product_name": "Saw"}"#)
                .unwrap();
        assert_eq!(p.kind, ProductKind::Werkzeug);
        assert_eq!(p.display_name, "Saw");
    }

    #[test]
    fn stock_row_numeric_zero_active_is_inactive() {
        let r: StockRow = serde_json::from_str(
            r#"{"product_id": 5, "product_name": "Bit-Set", "quantity": 12, "active": 0}"#,
        )
        .unwrap();
        assert!(!r.active);
        assert_eq!(r.quantity, 12);
    }

    #[test]
    fn stock_row_missing_active_is_visible() {
        let r: StockRow =
            serde_json::from_str(r#"{"product_id": 5, "name": "Bit-Set", "quantity": 0}"#).unwrap();
        assert!(r.active);
        assert_eq!(r.display_name, "Bit-Set");
    }

    #[test]
    fn movement_preview_names_everything() {
        let m = Movement {
            action: MovementAction::Take,
            worker_id: 3,
            product_id: 7,
            quantity: 5,
        };
        let preview = m.preview("Anna", "Patchkabel 3m");
        assert_eq!(preview, "TAKE 5\nWorker: Anna\nProduct: Patchkabel 3m\n\nConfirm?");
    }

    #[test]
    fn mode_maps_to_action() {
        assert_eq!(Mode::Unset.action(), None);
        assert_eq!(Mode::Take.action(), Some(MovementAction::Take));
        assert_eq!(Mode::Load.action(), Some(MovementAction::Load));
    }
}
