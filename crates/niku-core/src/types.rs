//! # Domain Types
//!
//! Core domain types shared by the checkout pipeline.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ CatalogProduct  │   │   CartEntry     │   │    LineItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  product_id     │   │  product        │       │
//! │  │  name           │   │  size           │──►│  size, quantity │       │
//! │  │  price          │   │  quantity       │   │  line_total     │       │
//! │  │  image          │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐                                                    │
//! │  │      Rate       │   bps (u32), 600 = 6%                              │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `CatalogProduct` and `CartEntry` are supplied from outside (the catalog
//! document and the `cart` cookie). `LineItem` is derived and never stored.

use std::collections::HashMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::money::{major_units, Money};
use crate::MAX_LINE_QUANTITY;

/// Catalog product identifier, as used in `products.json` and the cart.
pub type ProductId = i64;

// =============================================================================
// Rate
// =============================================================================

/// A rate in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000, so 600 bps = 6% (the storefront's sales
/// tax) and 1000 bps = 10% (the `NIKU10` promo). Integer rates keep the
/// totals pipeline free of floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

// =============================================================================
// Catalog Product
// =============================================================================

/// A product record from the catalog document (`products.json`).
///
/// Prices are stored there as decimal ringgit; a missing or `null` price
/// reads as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CatalogProduct {
    pub id: ProductId,

    pub name: String,

    #[serde(default, with = "major_units")]
    #[ts(type = "number")]
    pub price: Money,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub image: Option<String>,
}

impl CatalogProduct {
    /// Image shown when a product has none.
    pub const PLACEHOLDER_IMAGE: &'static str = "img/placeholder.jpg";

    /// Returns the product image or the placeholder.
    pub fn image_or_placeholder(&self) -> &str {
        self.image.as_deref().unwrap_or(Self::PLACEHOLDER_IMAGE)
    }
}

/// Lookup-by-id view over the catalog document.
///
/// When the document repeats an id, the first record wins, matching a
/// front-to-back search of the product list.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    by_id: HashMap<ProductId, CatalogProduct>,
}

impl Catalog {
    /// Builds the index from the catalog records.
    pub fn new(products: &[CatalogProduct]) -> Self {
        let mut by_id = HashMap::with_capacity(products.len());
        for product in products {
            by_id.entry(product.id).or_insert_with(|| product.clone());
        }
        Catalog { by_id }
    }

    /// Looks up a product by id.
    pub fn get(&self, id: ProductId) -> Option<&CatalogProduct> {
        self.by_id.get(&id)
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Checks if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

// =============================================================================
// Cart Entry
// =============================================================================

/// One entry of the `cart` cookie, written by the shop pages.
///
/// The browser scripts store the product id under `id`; `productId` is
/// accepted too. An absent, `null` or `0` quantity means one unit; a quantity
/// above [`MAX_LINE_QUANTITY`] is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    #[serde(rename = "id", alias = "productId")]
    pub product_id: ProductId,

    #[serde(default)]
    pub size: String,

    #[serde(default = "default_quantity", deserialize_with = "quantity_or_one")]
    pub quantity: u32,
}

impl CartEntry {
    /// Creates a cart entry, clamping the quantity to `1..=MAX_LINE_QUANTITY`.
    pub fn new(product_id: ProductId, size: impl Into<String>, quantity: u32) -> Self {
        CartEntry {
            product_id,
            size: size.into(),
            quantity: quantity.clamp(1, MAX_LINE_QUANTITY),
        }
    }
}

fn default_quantity() -> u32 {
    1
}

fn quantity_or_one<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<u32>::deserialize(deserializer)? {
        Some(quantity) if quantity > MAX_LINE_QUANTITY => Err(D::Error::custom(format!(
            "quantity {} exceeds the maximum of {}",
            quantity, MAX_LINE_QUANTITY
        ))),
        quantity => Ok(quantity.filter(|q| *q > 0).unwrap_or(1)),
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// A cart entry resolved against the catalog.
///
/// Derived on every cart load; `line_total` is always
/// `product.price × quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    pub product: CatalogProduct,
    pub size: String,
    pub quantity: u32,
    pub line_total: Money,
}

impl LineItem {
    /// Resolves one cart entry against its catalog product.
    pub fn new(product: CatalogProduct, size: impl Into<String>, quantity: u32) -> Self {
        let line_total = product.price.multiply_quantity(quantity);
        LineItem {
            product,
            size: size.into(),
            quantity,
            line_total,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: ProductId, cents: i64) -> CatalogProduct {
        CatalogProduct {
            id,
            name: format!("Product {}", id),
            price: Money::from_cents(cents),
            image: None,
        }
    }

    #[test]
    fn test_rate_from_bps() {
        let rate = Rate::from_bps(600);
        assert_eq!(rate.bps(), 600);
        assert!((rate.percentage() - 6.0).abs() < 0.001);
        assert!(Rate::default().is_zero());
    }

    #[test]
    fn test_catalog_product_from_document() {
        let json = r#"[
            {"id": 1, "name": "Tee", "price": 25.00, "image": "img/tee.jpg"},
            {"id": 2, "name": "Sample"}
        ]"#;
        let products: Vec<CatalogProduct> = serde_json::from_str(json).unwrap();

        assert_eq!(products[0].price.cents(), 2500);
        assert_eq!(products[0].image_or_placeholder(), "img/tee.jpg");
        assert!(products[1].price.is_zero());
        assert_eq!(products[1].image_or_placeholder(), "img/placeholder.jpg");
    }

    #[test]
    fn test_catalog_lookup_first_record_wins() {
        let catalog = Catalog::new(&[product(1, 100), product(1, 999), product(2, 200)]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(1).map(|p| p.price.cents()), Some(100));
        assert!(catalog.get(3).is_none());
    }

    #[test]
    fn test_cart_entry_quantity_defaults() {
        let entries: Vec<CartEntry> = serde_json::from_str(
            r#"[
                {"id": 1, "size": "M", "quantity": 2},
                {"id": 2, "size": "L"},
                {"id": 3, "size": "S", "quantity": 0},
                {"productId": 4, "quantity": null}
            ]"#,
        )
        .unwrap();

        let quantities: Vec<u32> = entries.iter().map(|e| e.quantity).collect();
        assert_eq!(quantities, vec![2, 1, 1, 1]);
        assert_eq!(entries[3].product_id, 4);
        assert_eq!(entries[3].size, "");
    }

    #[test]
    fn test_cart_entry_rejects_negative_quantity() {
        let result = serde_json::from_str::<CartEntry>(r#"{"id": 1, "quantity": -2}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_cart_entry_rejects_oversized_quantity() {
        let at_cap = serde_json::from_str::<CartEntry>(r#"{"id": 1, "quantity": 9999}"#).unwrap();
        assert_eq!(at_cap.quantity, MAX_LINE_QUANTITY);

        let result = serde_json::from_str::<CartEntry>(r#"{"id": 1, "quantity": 10000}"#);
        assert!(result.is_err());
        let result = serde_json::from_str::<CartEntry>(r#"{"id": 1, "quantity": 4294967295}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_line_item_total() {
        let item = LineItem::new(product(1, 2500), "M", 2);
        assert_eq!(item.line_total.cents(), 5000);
        assert_eq!(CartEntry::new(1, "M", 0).quantity, 1);
        assert_eq!(CartEntry::new(1, "M", u32::MAX).quantity, MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_line_item_total_saturates() {
        let item = LineItem::new(product(1, 3_000_000_000), "M", u32::MAX);
        assert_eq!(item.line_total.cents(), i64::MAX);
    }
}
