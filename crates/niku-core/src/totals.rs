//! # Totals Calculator
//!
//! Derives the order summary shown beside the checkout form.
//!
//! ## Business Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  subtotal    = Σ line_total                                             │
//! │  shipping    = RM10.00 flat if subtotal > 0, else RM0.00                │
//! │  tax         = 6% of subtotal (before any discount)                     │
//! │  grand total = subtotal - discount + shipping + tax                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Totals are rebuilt from scratch on every cart load. A promo can adjust
//! them afterwards (see [`crate::promo`]); nothing else mutates them.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::promo::PromoKind;
use crate::types::{LineItem, Rate};
use crate::{FLAT_SHIPPING_CENTS, TAX_RATE_BPS};

// =============================================================================
// Pricing Policy
// =============================================================================

/// Shipping fee and tax rate used to build totals.
///
/// The default is the storefront's fixed policy: RM10.00 flat shipping and
/// 6% tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPolicy {
    /// Charged once per order when the subtotal is positive.
    pub flat_shipping: Money,
    /// Applied to the pre-discount subtotal.
    pub tax_rate: Rate,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        PricingPolicy {
            flat_shipping: Money::from_cents(FLAT_SHIPPING_CENTS),
            tax_rate: Rate::from_bps(TAX_RATE_BPS),
        }
    }
}

// =============================================================================
// Order Totals
// =============================================================================

/// The promo discount currently reflected in a set of totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AppliedDiscount {
    /// Upper-cased promo code, e.g. `NIKU10`.
    pub code: String,
    pub kind: PromoKind,
    /// Amount taken off the subtotal. Zero for free shipping.
    pub amount: Money,
}

/// Order summary: subtotal, shipping, tax, optional discount, grand total.
///
/// ## Invariant
/// `grand_total == subtotal - discount_amount + shipping + tax`.
/// Fields are private so the only ways to obtain a value are
/// [`compute_totals`] and [`crate::promo::apply_promo`], both of which
/// recompute the grand total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderTotals {
    subtotal: Money,
    shipping: Money,
    tax: Money,
    discount: Option<AppliedDiscount>,
    grand_total: Money,
}

impl OrderTotals {
    pub(crate) fn from_parts(
        subtotal: Money,
        shipping: Money,
        tax: Money,
        discount: Option<AppliedDiscount>,
    ) -> Self {
        let discount_amount = discount.as_ref().map(|d| d.amount).unwrap_or_default();
        OrderTotals {
            subtotal,
            shipping,
            tax,
            grand_total: subtotal - discount_amount + shipping + tax,
            discount,
        }
    }

    /// Totals of an empty cart.
    pub fn empty() -> Self {
        OrderTotals::from_parts(Money::zero(), Money::zero(), Money::zero(), None)
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    #[inline]
    pub fn shipping(&self) -> Money {
        self.shipping
    }

    #[inline]
    pub fn tax(&self) -> Money {
        self.tax
    }

    #[inline]
    pub fn discount(&self) -> Option<&AppliedDiscount> {
        self.discount.as_ref()
    }

    /// Discount taken off the subtotal, zero when no promo is applied.
    pub fn discount_amount(&self) -> Money {
        self.discount.as_ref().map(|d| d.amount).unwrap_or_default()
    }

    #[inline]
    pub fn grand_total(&self) -> Money {
        self.grand_total
    }
}

impl Default for OrderTotals {
    fn default() -> Self {
        OrderTotals::empty()
    }
}

// =============================================================================
// Calculation
// =============================================================================

/// Computes totals with the storefront's fixed pricing policy.
///
/// ## Example
/// ```rust
/// use niku_core::money::Money;
/// use niku_core::totals::compute_totals;
/// use niku_core::types::{CatalogProduct, LineItem};
///
/// let tee = CatalogProduct { id: 1, name: "Tee".into(), price: Money::from_cents(2500), image: None };
/// let totals = compute_totals(&[LineItem::new(tee, "M", 2)]);
///
/// assert_eq!(totals.subtotal().cents(), 5000);
/// assert_eq!(totals.shipping().cents(), 1000);
/// assert_eq!(totals.tax().cents(), 300);
/// assert_eq!(totals.grand_total().cents(), 6300);
/// ```
pub fn compute_totals(items: &[LineItem]) -> OrderTotals {
    compute_totals_with(items, &PricingPolicy::default())
}

/// Computes totals with an explicit pricing policy.
pub fn compute_totals_with(items: &[LineItem], policy: &PricingPolicy) -> OrderTotals {
    let subtotal: Money = items.iter().map(|item| item.line_total).sum();

    let shipping = if subtotal.is_positive() {
        policy.flat_shipping
    } else {
        Money::zero()
    };

    let tax = subtotal.apply_rate(policy.tax_rate);

    OrderTotals::from_parts(subtotal, shipping, tax, None)
}

// =============================================================================
// Unit Tests
// =============================================================================
