//! # Promo Engine
//!
//! Applies at most one promo code per checkout session.
//!
//! ## Promo Lock
//! ```text
//! ┌──────────────┐   apply_promo(valid code)   ┌───────────────────────┐
//! │  Unapplied   │ ──────────────────────────► │  Applied { code, .. } │
//! └──────────────┘                             └───────────────────────┘
//!        │  ▲                                              │
//!        │  │ EmptyCode / InvalidPromoCode                 │ any further code
//!        └──┘ (state unchanged, can retry)                 ▼
//!                                                  PromoAlreadyApplied
//! ```
//!
//! There is no transition back to `Unapplied`: a fresh session starts a
//! fresh state. Discounts never stack.

use serde::Serialize;
use ts_rs::TS;

use crate::error::PromoError;
use crate::money::Money;
use crate::totals::{AppliedDiscount, OrderTotals};
use crate::types::Rate;

// =============================================================================
// Promo Table
// =============================================================================

/// What a promo code does to the totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PromoKind {
    /// Takes a percentage off the subtotal.
    Percent(Rate),
    /// Waives the flat shipping fee.
    FreeShipping,
}

/// A recognized promo code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Promo {
    pub code: &'static str,
    pub kind: PromoKind,
}

/// Codes accepted at checkout. Matching is case-insensitive.
pub const PROMO_CODES: &[Promo] = &[
    Promo {
        code: "NIKU10",
        kind: PromoKind::Percent(Rate::from_bps(1000)),
    },
    Promo {
        code: "FREESHIP",
        kind: PromoKind::FreeShipping,
    },
    Promo {
        code: "WELCOME15",
        kind: PromoKind::Percent(Rate::from_bps(1500)),
    },
];

/// Finds a promo by code, ignoring case and surrounding whitespace.
pub fn lookup_promo(code: &str) -> Result<Promo, PromoError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(PromoError::EmptyCode);
    }

    PROMO_CODES
        .iter()
        .find(|promo| promo.code.eq_ignore_ascii_case(code))
        .copied()
        .ok_or_else(|| PromoError::InvalidPromoCode(code.to_string()))
}

impl Promo {
    /// Returns the totals with this promo as the only discount.
    ///
    /// Callers must pass undiscounted totals; [`apply_promo`] checks that.
    pub(crate) fn apply_to(&self, totals: &OrderTotals) -> OrderTotals {
        let (shipping, amount) = match self.kind {
            PromoKind::FreeShipping => (Money::zero(), Money::zero()),
            PromoKind::Percent(rate) => (totals.shipping(), totals.subtotal().apply_rate(rate)),
        };

        OrderTotals::from_parts(
            totals.subtotal(),
            shipping,
            totals.tax(),
            Some(AppliedDiscount {
                code: self.code.to_string(),
                kind: self.kind,
                amount,
            }),
        )
    }
}

// =============================================================================
// Promo State
// =============================================================================

/// Promo status of one checkout session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[serde(tag = "status", rename_all = "snake_case")]
#[ts(export)]
pub enum PromoState {
    #[default]
    Unapplied,
    Applied { code: String, kind: PromoKind },
}

impl PromoState {
    /// Checks if a promo has been applied.
    pub fn is_applied(&self) -> bool {
        matches!(self, PromoState::Applied { .. })
    }

    /// The applied code, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            PromoState::Applied { code, .. } => Some(code),
            PromoState::Unapplied => None,
        }
    }

    /// The applied promo kind, if any.
    pub fn kind(&self) -> Option<PromoKind> {
        match self {
            PromoState::Applied { kind, .. } => Some(*kind),
            PromoState::Unapplied => None,
        }
    }
}

// =============================================================================
// Apply
// =============================================================================

/// Applies a promo code to previously computed totals.
///
/// ## Rules
/// - Already applied in this session, or `totals` already carry a
///   discount → `PromoAlreadyApplied`
/// - Blank → `EmptyCode`, unknown → `InvalidPromoCode`
/// - `FreeShipping`: shipping becomes zero
/// - `Percent(rate)`: discount = subtotal × rate
///
/// On success the state moves to `Applied`. On error neither `totals` nor
/// `state` is touched.
///
/// ## Example
/// ```rust
/// use niku_core::money::Money;
/// use niku_core::promo::{apply_promo, PromoState};
/// use niku_core::totals::compute_totals;
/// use niku_core::types::{CatalogProduct, LineItem};
///
/// let tee = CatalogProduct { id: 1, name: "Tee".into(), price: Money::from_cents(2500), image: None };
/// let totals = compute_totals(&[LineItem::new(tee, "M", 2)]);
/// let mut state = PromoState::default();
///
/// let discounted = apply_promo("niku10", &totals, &mut state).unwrap();
/// assert_eq!(discounted.discount_amount().cents(), 500);
/// assert_eq!(discounted.grand_total().cents(), 5800);
/// assert!(apply_promo("FREESHIP", &discounted, &mut state).is_err());
/// ```
pub fn apply_promo(
    code: &str,
    totals: &OrderTotals,
    state: &mut PromoState,
) -> Result<OrderTotals, PromoError> {
    if let PromoState::Applied { code: applied, .. } = state {
        return Err(PromoError::PromoAlreadyApplied {
            applied: applied.clone(),
        });
    }
    if let Some(discount) = totals.discount() {
        return Err(PromoError::PromoAlreadyApplied {
            applied: discount.code.clone(),
        });
    }

    let promo = lookup_promo(code)?;
    let adjusted = promo.apply_to(totals);

    *state = PromoState::Applied {
        code: promo.code.to_string(),
        kind: promo.kind,
    };

    Ok(adjusted)
}

// =============================================================================
// Unit Tests
// =============================================================================
