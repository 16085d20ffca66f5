//! # Error Types
//!
//! Domain-specific error types for niku-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  niku-core errors (this file)                                          │
//! │  ├── CoreError        - General domain errors                          │
//! │  ├── CartParseError   - Malformed `cart` cookie                        │
//! │  ├── PromoError       - Promo code rejected                            │
//! │  └── ValidationError  - Form / account input failures                  │
//! │                                                                         │
//! │  niku-storefront errors (separate crate)                               │
//! │  └── StorefrontError  - What the page shows (code + message)           │
//! │                                                                         │
//! │  Flow: PromoError → CoreError → StorefrontError → alert / notification │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A product missing from the catalog is not an error: the cart loader drops
//! it and reports the id. An invalid card number is a `false` from the card
//! validator, surfaced as a field error by the checkout form rules.

use thiserror::Error;

use crate::types::ProductId;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every variant is recoverable: the caller shows a message and keeps its
/// prior state.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The `cart` cookie could not be read as a list of cart entries.
    #[error(transparent)]
    CartParse(#[from] CartParseError),

    /// A promo code submission was rejected.
    #[error(transparent)]
    Promo(#[from] PromoError),

    /// An address book index does not exist.
    #[error("Address not found at position {index}")]
    AddressNotFound { index: usize },

    /// A wishlist product id is not in the wishlist.
    #[error("Product {0} is not in the wishlist")]
    NotInWishlist(ProductId),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Cart Parse Error
// =============================================================================

/// The serialized cart is not a sequence of cart entries.
#[derive(Debug, Error)]
pub enum CartParseError {
    /// The raw value is not JSON at all.
    #[error("Cart data is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The JSON value is not an array.
    #[error("Cart data is not an array")]
    NotASequence,

    /// One element of the array is not a cart entry.
    #[error("Cart entry {index} is invalid: {reason}")]
    InvalidEntry { index: usize, reason: String },
}

// =============================================================================
// Promo Error
// =============================================================================

/// Promo code rejections. State and totals are unchanged on every variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromoError {
    /// Nothing was entered.
    #[error("Promo code is empty")]
    EmptyCode,

    /// The code is not in the promo table.
    #[error("Invalid promo code: {0}")]
    InvalidPromoCode(String),

    /// A promo was already applied in this checkout session.
    #[error("Promo code {applied} has already been applied")]
    PromoAlreadyApplied { applied: String },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for form fields, account details and uploads before any state is
/// touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too large (bytes).
    #[error("{field} must be smaller than {max_bytes} bytes")]
    TooLarge { field: String, max_bytes: u64 },

    /// Invalid format (email, card number, image type).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Two fields that must agree do not.
    #[error("{field} does not match")]
    Mismatch { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
