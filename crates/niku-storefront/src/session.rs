//! # Checkout Session
//!
//! One checkout page visit: the resolved cart, its totals, the promo lock
//! and the wizard step.
//!
//! ## Thread Safety
//! The state sits behind a `Mutex` so that the check-then-set of a promo
//! application is a single critical section. Two rapid clicks on "Apply"
//! cannot both succeed.
//!
//! ## Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Checkout Session Operations                          │
//! │                                                                         │
//! │  Page Action             Session Method          State Change           │
//! │  ───────────             ──────────────          ────────────           │
//! │                                                                         │
//! │  Page load ─────────────► load(catalog) ───────► items, totals rebuilt  │
//! │                                                  promo reset            │
//! │                                                                         │
//! │  Click Apply ───────────► apply_promo(code) ───► Unapplied → Applied    │
//! │                                                                         │
//! │  Click Next ────────────► advance(form) ───────► checkoutData saved     │
//! │                                                  step = step.next()     │
//! │                                                                         │
//! │  Click Back ────────────► back() ──────────────► step = step.previous() │
//! │                                                                         │
//! │  Place Order ───────────► place_order() ───────► cart cookie removed    │
//! │                                                                         │
//! │  NOTE: the catalog is fetched before the lock is taken; the lock is     │
//! │        never held across an await.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use niku_core::checkout::shipping_prefill;
use niku_core::{
    apply_promo, cart_badge_count, compute_totals_with, parse_cart_entries, resolve_cart,
    validate_step, CartResolution, CheckoutData, CheckoutStep, CoreError, FormData, LineItem,
    Money, OrderTotals, PricingPolicy, ProductId, PromoState, ReviewSummary, UserProfile,
};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::CatalogSource;
use crate::config::StorefrontConfig;
use crate::error::{StorefrontError, StorefrontResult};
use crate::storage::{keys, read_json, read_json_or_default, write_json, KeyValueStore};

/// Shown after a successful order.
pub const ORDER_PLACED_MESSAGE: &str = "Order placed successfully! Thank you for your purchase.";

// =============================================================================
// State
// =============================================================================

/// Mutable part of a checkout session.
#[derive(Debug, Clone, Default)]
struct CheckoutState {
    items: Vec<LineItem>,
    totals: OrderTotals,
    promo: PromoState,
    step: CheckoutStep,
    missing_product_ids: Vec<ProductId>,
}

/// Everything the checkout page renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSnapshot {
    pub session_id: Uuid,
    pub step: CheckoutStep,
    pub items: Vec<LineItem>,
    pub totals: OrderTotals,
    pub promo: PromoState,
    /// Cart entries dropped because the catalog no longer has them.
    pub missing_product_ids: Vec<ProductId>,
}

/// Result of placing an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub session_id: Uuid,
    pub total: Money,
    pub message: String,
}

// =============================================================================
// Session
// =============================================================================

/// A checkout session over the shopper's cookies and local storage.
pub struct CheckoutSession {
    id: Uuid,
    cookies: Arc<dyn KeyValueStore>,
    local: Arc<dyn KeyValueStore>,
    policy: PricingPolicy,
    state: Mutex<CheckoutState>,
}

impl CheckoutSession {
    /// Creates a session with an empty cart view. Call [`load`](Self::load)
    /// to read the cart.
    pub fn new(
        cookies: Arc<dyn KeyValueStore>,
        local: Arc<dyn KeyValueStore>,
        policy: PricingPolicy,
    ) -> Self {
        CheckoutSession {
            id: Uuid::new_v4(),
            cookies,
            local,
            policy,
            state: Mutex::new(CheckoutState::default()),
        }
    }

    /// Creates a session priced with the configured policy.
    pub fn from_config(
        cookies: Arc<dyn KeyValueStore>,
        local: Arc<dyn KeyValueStore>,
        config: &StorefrontConfig,
    ) -> Self {
        Self::new(cookies, local, config.pricing_policy())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Executes a function with the locked state.
    ///
    /// A poisoned lock is recovered; every write below leaves the state
    /// consistent before anything can panic.
    fn with_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut CheckoutState) -> R,
    {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    fn snapshot_of(&self, state: &CheckoutState) -> CheckoutSnapshot {
        CheckoutSnapshot {
            session_id: self.id,
            step: state.step,
            items: state.items.clone(),
            totals: state.totals.clone(),
            promo: state.promo.clone(),
            missing_product_ids: state.missing_product_ids.clone(),
        }
    }

    /// Current view of the session.
    pub fn snapshot(&self) -> CheckoutSnapshot {
        self.with_state(|state| self.snapshot_of(state))
    }

    // =========================================================================
    // Cart & Totals
    // =========================================================================

    /// Reads the cart cookie, resolves it against the catalog and rebuilds
    /// the totals. The promo lock and the wizard start over.
    ///
    /// An empty cart does not touch the catalog. A malformed cart or a
    /// failed catalog fetch leaves the session as it was.
    pub async fn load<C>(&self, catalog: &C) -> StorefrontResult<CheckoutSnapshot>
    where
        C: CatalogSource,
    {
        let raw = self.cookies.get(keys::CART);
        let entries = parse_cart_entries(raw.as_deref()).map_err(|e| {
            warn!(session = %self.id, error = %e, "Error parsing cart data");
            StorefrontError::Core(CoreError::CartParse(e))
        })?;

        let resolution = if entries.is_empty() {
            debug!(session = %self.id, "Cart is empty");
            CartResolution::default()
        } else {
            let products = catalog.fetch().await.map_err(|e| {
                warn!(session = %self.id, error = %e, "Error loading products");
                e
            })?;
            resolve_cart(&entries, &products)
        };

        for id in &resolution.missing_product_ids {
            warn!(session = %self.id, product_id = id, "Cart product not in catalog, skipping");
        }

        let totals = compute_totals_with(&resolution.items, &self.policy);
        debug!(
            session = %self.id,
            items = resolution.items.len(),
            subtotal = %totals.subtotal(),
            grand_total = %totals.grand_total(),
            "Cart loaded"
        );

        Ok(self.with_state(|state| {
            *state = CheckoutState {
                items: resolution.items,
                totals,
                promo: PromoState::Unapplied,
                step: CheckoutStep::Shipping,
                missing_product_ids: resolution.missing_product_ids,
            };
            self.snapshot_of(state)
        }))
    }

    /// Applies a promo code to the current totals.
    ///
    /// The lock check and the transition happen under one lock, so only
    /// the first successful code of a session ever takes effect.
    pub fn apply_promo(&self, code: &str) -> StorefrontResult<OrderTotals> {
        self.with_state(|state| {
            match apply_promo(code, &state.totals, &mut state.promo) {
                Ok(totals) => {
                    info!(
                        session = %self.id,
                        code = state.promo.code().unwrap_or_default(),
                        discount = %totals.discount_amount(),
                        grand_total = %totals.grand_total(),
                        "Promo applied"
                    );
                    state.totals = totals.clone();
                    Ok(totals)
                }
                Err(e) => {
                    debug!(session = %self.id, code, error = %e, "Promo rejected");
                    Err(e.into())
                }
            }
        })
    }

    /// Header badge count for the current cart cookie.
    pub fn cart_badge(&self) -> StorefrontResult<Option<u32>> {
        let raw = self.cookies.get(keys::CART);
        let entries = parse_cart_entries(raw.as_deref()).map_err(CoreError::from)?;
        Ok(cart_badge_count(&entries))
    }

    // =========================================================================
    // Wizard
    // =========================================================================

    /// Current wizard step.
    pub fn step(&self) -> CheckoutStep {
        self.with_state(|state| state.step)
    }

    /// Shipping form contents when the page opens: saved checkout data if
    /// any, otherwise the account profile.
    pub fn shipping_form(&self) -> StorefrontResult<FormData> {
        let data: CheckoutData = read_json_or_default(self.local.as_ref(), keys::CHECKOUT_DATA)?;
        if let Some(saved) = data.shipping {
            return Ok(saved);
        }

        let profile: Option<UserProfile> = read_json(self.local.as_ref(), keys::USER_DATA)?;
        Ok(profile.map(|p| shipping_prefill(&p)).unwrap_or_default())
    }

    /// Validates the current step's form, saves it and moves to the next
    /// step. Review is the last step; advancing there keeps the step.
    pub fn advance(&self, form: FormData) -> StorefrontResult<CheckoutStep> {
        self.with_state(|state| {
            let step = state.step;
            if let Err(errors) = validate_step(step, &form) {
                debug!(session = %self.id, %step, invalid = errors.len(), "Form rejected");
                return Err(StorefrontError::InvalidForm { step, errors });
            }

            let mut data: CheckoutData =
                read_json_or_default(self.local.as_ref(), keys::CHECKOUT_DATA)?;
            data.record(step, form);
            write_json(self.local.as_ref(), keys::CHECKOUT_DATA, &data)?;

            if let Some(next) = step.next() {
                state.step = next;
            }
            debug!(session = %self.id, from = %step, to = %state.step, "Checkout step advanced");
            Ok(state.step)
        })
    }

    /// Returns to the previous step without validating.
    pub fn back(&self) -> CheckoutStep {
        self.with_state(|state| {
            state.step = state.step.previous();
            state.step
        })
    }

    /// Summary for the review step.
    pub fn review(&self) -> StorefrontResult<ReviewSummary> {
        let data: CheckoutData = read_json_or_default(self.local.as_ref(), keys::CHECKOUT_DATA)?;
        Ok(ReviewSummary::build(&data))
    }

    /// Validates every step and clears the cart.
    ///
    /// No payment is taken and nothing is persisted server-side.
    pub fn place_order(&self) -> StorefrontResult<OrderConfirmation> {
        self.with_state(|state| {
            if state.items.is_empty() {
                return Err(StorefrontError::EmptyCart);
            }

            let data: CheckoutData =
                read_json_or_default(self.local.as_ref(), keys::CHECKOUT_DATA)?;
            let empty = FormData::new();
            for step in CheckoutStep::ALL {
                if let Err(errors) = validate_step(step, data.step(step).unwrap_or(&empty)) {
                    warn!(session = %self.id, %step, "Order blocked by invalid form");
                    return Err(StorefrontError::InvalidForm { step, errors });
                }
            }

            self.cookies.remove(keys::CART);

            let total = state.totals.grand_total();
            info!(
                session = %self.id,
                items = state.items.len(),
                total = %total,
                promo = state.promo.code().unwrap_or("none"),
                "Order placed"
            );

            *state = CheckoutState::default();
            Ok(OrderConfirmation {
                session_id: self.id,
                total,
                message: ORDER_PLACED_MESSAGE.to_string(),
            })
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
