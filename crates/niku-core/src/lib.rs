//! # niku-core: Pure Checkout Logic for the Niku Storefront
//!
//! This crate holds the checkout and account rules of the storefront as
//! pure functions over plain data. It performs no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Niku Storefront Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Browser pages                                │   │
//! │  │    Shop ──► Cart badge ──► Checkout wizard ──► Account page     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ cookies / local storage / JSON        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    niku-storefront                              │   │
//! │  │    CheckoutSession, AccountService, config, catalog fetch      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ niku-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────┐       │   │
//! │  │   │   cart   │  │  totals  │  │  promo   │  │   card   │       │   │
//! │  │   │  loader  │─►│   calc   │─►│  engine  │  │   Luhn   │       │   │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └──────────┘       │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐                     │   │
//! │  │   │ checkout │  │ account  │  │validation│                     │   │
//! │  │   └──────────┘  └──────────┘  └──────────┘                     │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO ASYNC • INTEGER MONEY                            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Catalog products, cart entries, line items, rates
//! - [`money`] - Money in sen (integer cents)
//! - [`cart`] - Cart loader and badge count
//! - [`totals`] - Subtotal, shipping, tax, grand total
//! - [`promo`] - Promo codes and the one-promo-per-session lock
//! - [`card`] - Card number checksum
//! - [`checkout`] - Wizard steps, form rules, review summary
//! - [`account`] - Profile, address book, wishlist, order history
//! - [`validation`] - Shared input rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use niku_core::{apply_promo, compute_totals, load_cart_items, parse_cart_entries};
//! use niku_core::{CatalogProduct, Money, PromoState};
//!
//! let catalog = vec![CatalogProduct {
//!     id: 1,
//!     name: "Tee".into(),
//!     price: Money::from_cents(2500),
//!     image: None,
//! }];
//! let entries = parse_cart_entries(Some(r#"[{"id":1,"size":"M","quantity":2}]"#)).unwrap();
//! let totals = compute_totals(&load_cart_items(&entries, &catalog));
//! assert_eq!(totals.grand_total().to_string(), "RM63.00");
//!
//! let mut promo = PromoState::default();
//! let totals = apply_promo("FREESHIP", &totals, &mut promo).unwrap();
//! assert_eq!(totals.grand_total().to_string(), "RM53.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod account;
pub mod card;
pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod promo;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use account::{Address, AddressBook, Order, OrderItem, ProfileUpdate, UserProfile, Wishlist};
pub use card::{card_last_four, is_valid_card_number};
pub use cart::{cart_badge_count, load_cart_items, parse_cart_entries, resolve_cart, CartResolution};
pub use checkout::{
    validate_step, CheckoutData, CheckoutStep, FieldError, FormData, PaymentMethod, ReviewSummary,
};
pub use error::{CartParseError, CoreError, CoreResult, PromoError, ValidationError};
pub use money::Money;
pub use promo::{apply_promo, lookup_promo, PromoKind, PromoState};
pub use totals::{compute_totals, compute_totals_with, OrderTotals, PricingPolicy};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Currency symbol prefixed to displayed amounts.
pub const CURRENCY_SYMBOL: &str = "RM";

/// Flat shipping fee per order, in sen (RM10.00).
pub const FLAT_SHIPPING_CENTS: i64 = 1000;

/// Sales tax in basis points (6%).
pub const TAX_RATE_BPS: u32 = 600;

/// Largest quantity a single cart entry may carry.
pub const MAX_LINE_QUANTITY: u32 = 9_999;

/// Minimum length of a new account password.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Largest accepted profile picture (2 MiB).
pub const MAX_AVATAR_BYTES: u64 = 2 * 1024 * 1024;
