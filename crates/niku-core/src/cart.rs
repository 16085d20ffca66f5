//! # Cart Loader
//!
//! Turns the serialized `cart` cookie into priced line items.
//!
//! ## Flow
//! ```text
//! cookie "cart" ──► parse_cart_entries ──► Vec<CartEntry>
//!                                               │
//!                   catalog document ──────────►│
//!                                               ▼
//!                                         resolve_cart
//!                                               │
//!                     ┌─────────────────────────┴──────────┐
//!                     ▼                                    ▼
//!               Vec<LineItem>                     missing product ids
//!           (to the totals calculator)      (dropped, reported for logs)
//! ```
//!
//! A cart that references a product no longer in the catalog must not break
//! checkout, so unmatched entries are dropped rather than raised.

use serde::Serialize;

use crate::error::CartParseError;
use crate::types::{CartEntry, Catalog, CatalogProduct, LineItem, ProductId};

/// Result of resolving a cart against the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResolution {
    /// Entries that matched a catalog product, in cart order.
    pub items: Vec<LineItem>,
    /// Product ids that had no catalog record, in cart order.
    pub missing_product_ids: Vec<ProductId>,
}

/// Parses the raw `cart` cookie value.
///
/// ## Rules
/// - Missing or blank value: empty cart (nothing has been added yet)
/// - Not JSON, not an array, or an element that is not an entry:
///   `CartParseError`
///
/// ## Example
/// ```rust
/// use niku_core::cart::parse_cart_entries;
///
/// let entries = parse_cart_entries(Some(r#"[{"id":1,"size":"M","quantity":2}]"#)).unwrap();
/// assert_eq!(entries.len(), 1);
/// assert!(parse_cart_entries(None).unwrap().is_empty());
/// assert!(parse_cart_entries(Some(r#"{"id":1}"#)).is_err());
/// ```
pub fn parse_cart_entries(raw: Option<&str>) -> Result<Vec<CartEntry>, CartParseError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(Vec::new()),
        Some(raw) => raw,
    };

    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(CartParseError::InvalidJson)?;

    let serde_json::Value::Array(elements) = value else {
        return Err(CartParseError::NotASequence);
    };

    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| {
            serde_json::from_value(element).map_err(|e| CartParseError::InvalidEntry {
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Resolves cart entries against the catalog, keeping track of misses.
pub fn resolve_cart(entries: &[CartEntry], catalog: &[CatalogProduct]) -> CartResolution {
    let catalog = Catalog::new(catalog);
    let mut resolution = CartResolution::default();

    for entry in entries {
        match catalog.get(entry.product_id) {
            Some(product) => resolution.items.push(LineItem::new(
                product.clone(),
                entry.size.clone(),
                entry.quantity.max(1),
            )),
            None => resolution.missing_product_ids.push(entry.product_id),
        }
    }

    resolution
}

/// Resolves cart entries into line items, silently dropping entries whose
/// product is not in the catalog.
///
/// ## Example
/// ```rust
/// use niku_core::cart::load_cart_items;
/// use niku_core::money::Money;
/// use niku_core::types::{CartEntry, CatalogProduct};
///
/// let catalog = vec![CatalogProduct {
///     id: 1,
///     name: "Tee".into(),
///     price: Money::from_cents(2500),
///     image: None,
/// }];
/// let cart = vec![CartEntry::new(1, "M", 2), CartEntry::new(99, "L", 1)];
///
/// let items = load_cart_items(&cart, &catalog);
/// assert_eq!(items.len(), 1);
/// assert_eq!(items[0].line_total.cents(), 5000);
/// ```
pub fn load_cart_items(entries: &[CartEntry], catalog: &[CatalogProduct]) -> Vec<LineItem> {
    resolve_cart(entries, catalog).items
}

/// Number shown on the header cart badge: the sum of all quantities.
///
/// Returns `None` for an empty cart, which hides the badge.
pub fn cart_badge_count(entries: &[CartEntry]) -> Option<u32> {
    if entries.is_empty() {
        return None;
    }
    Some(
        entries
            .iter()
            .fold(0u32, |sum, entry| sum.saturating_add(entry.quantity)),
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn catalog() -> Vec<CatalogProduct> {
        vec![
            CatalogProduct {
                id: 1,
                name: "Tee".to_string(),
                price: Money::from_cents(2500),
                image: None,
            },
            CatalogProduct {
                id: 2,
                name: "Cap".to_string(),
                price: Money::from_cents(1999),
                image: Some("img/cap.jpg".to_string()),
            },
        ]
    }

    #[test]
    fn test_parse_blank_cart_is_empty() {
        assert!(parse_cart_entries(None).unwrap().is_empty());
        assert!(parse_cart_entries(Some("")).unwrap().is_empty());
        assert!(parse_cart_entries(Some("   ")).unwrap().is_empty());
        assert!(parse_cart_entries(Some("[]")).unwrap().is_empty());
    }

    #[test]
    fn test_parse_malformed_cart() {
        assert!(matches!(
            parse_cart_entries(Some("not json")),
            Err(CartParseError::InvalidJson(_))
        ));
        assert!(matches!(
            parse_cart_entries(Some(r#"{"id": 1}"#)),
            Err(CartParseError::NotASequence)
        ));
        assert!(matches!(
            parse_cart_entries(Some(r#"[{"id": 1}, {"size": "M"}]"#)),
            Err(CartParseError::InvalidEntry { index: 1, .. })
        ));
    }

    #[test]
    fn test_load_cart_items_scenario() {
        let entries = parse_cart_entries(Some(r#"[{"id":1,"size":"M","quantity":2}]"#)).unwrap();
        let items = load_cart_items(&entries, &catalog());

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product.name, "Tee");
        assert_eq!(items[0].size, "M");
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].line_total, Money::from_cents(5000));
    }

    #[test]
    fn test_catalog_miss_is_dropped_and_reported() {
        let entries = vec![
            CartEntry::new(7, "S", 1),
            CartEntry::new(2, "L", 3),
            CartEntry::new(8, "M", 1),
        ];
        let resolution = resolve_cart(&entries, &catalog());

        assert_eq!(resolution.items.len(), 1);
        assert_eq!(resolution.items[0].line_total.cents(), 5997);
        assert_eq!(resolution.missing_product_ids, vec![7, 8]);
    }

    #[test]
    fn test_oversized_cart_never_panics() {
        assert!(matches!(
            parse_cart_entries(Some(r#"[{"id":1,"quantity":4294967295}]"#)),
            Err(CartParseError::InvalidEntry { index: 0, .. })
        ));

        let products: Vec<CatalogProduct> =
            serde_json::from_str(r#"[{"id": 1, "name": "Gold Tee", "price": 30000000}]"#).unwrap();
        let entries = vec![
            CartEntry::new(1, "M", u32::MAX),
            CartEntry::new(1, "L", u32::MAX),
        ];
        let items = load_cart_items(&entries, &products);
        assert_eq!(items[0].quantity, crate::MAX_LINE_QUANTITY);
        assert_eq!(items[0].line_total.cents(), 3_000_000_000 * 9_999);

        let huge = LineItem::new(products[0].clone(), "XL", u32::MAX);
        let totals = crate::totals::compute_totals(&[huge.clone(), huge]);
        assert_eq!(totals.subtotal().cents(), i64::MAX);
        assert!(!totals.grand_total().is_negative());
    }

    #[test]
    fn test_zero_priced_product_is_kept() {
        let products = vec![CatalogProduct {
            id: 5,
            name: "Sticker".to_string(),
            price: Money::zero(),
            image: None,
        }];
        let items = load_cart_items(&[CartEntry::new(5, "", 4)], &products);
        assert_eq!(items.len(), 1);
        assert!(items[0].line_total.is_zero());
    }

    #[test]
    fn test_cart_badge_count() {
        assert_eq!(cart_badge_count(&[]), None);
        let entries = vec![CartEntry::new(1, "M", 2), CartEntry::new(2, "L", 3)];
        assert_eq!(cart_badge_count(&entries), Some(5));
    }
}
