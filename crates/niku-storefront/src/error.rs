//! # Storefront Error Type
//!
//! Unified error type for storefront operations, plus the code and message
//! the page shows for each failure.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront                         │
//! │                                                                         │
//! │  session.apply_promo("BOGUS")                                           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  niku-core: PromoError::InvalidPromoCode                         │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  CoreError::Promo ──► StorefrontError::Core ──► ErrorResponse ──►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "PROMO_ERROR",                                               │
//! │    "message": "Invalid promo code. Please try again." }                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use niku_core::{CheckoutStep, CoreError, FieldError, PromoError, ValidationError};
use serde::Serialize;
use thiserror::Error;

/// Result type alias for storefront operations.
pub type StorefrontResult<T> = Result<T, StorefrontError>;

/// Everything that can go wrong above the core rules.
#[derive(Debug, Error)]
pub enum StorefrontError {
    // =========================================================================
    // Domain Errors
    // =========================================================================
    /// A core rule rejected the operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A checkout form failed validation.
    #[error("The {step} form has {} invalid field(s)", .errors.len())]
    InvalidForm {
        step: CheckoutStep,
        errors: Vec<FieldError>,
    },

    /// The shopper tried to check out with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Account operation without a `userEmail` cookie.
    #[error("No shopper is logged in")]
    NotLoggedIn,

    // =========================================================================
    // Catalog Errors
    // =========================================================================
    /// The catalog document could not be read.
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// The catalog document is not a list of products.
    #[error("Catalog is malformed: {0}")]
    CatalogMalformed(String),

    // =========================================================================
    // Storage Errors
    // =========================================================================
    /// A stored document could not be decoded or encoded.
    #[error("Stored value for '{key}' is invalid: {reason}")]
    InvalidStoredValue { key: String, reason: String },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid storefront configuration.
    #[error("Invalid storefront configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<std::io::Error> for StorefrontError {
    fn from(err: std::io::Error) -> Self {
        StorefrontError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for StorefrontError {
    fn from(err: toml::de::Error) -> Self {
        StorefrontError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for StorefrontError {
    fn from(err: toml::ser::Error) -> Self {
        StorefrontError::ConfigSaveFailed(err.to_string())
    }
}

impl From<ValidationError> for StorefrontError {
    fn from(err: ValidationError) -> Self {
        StorefrontError::Core(CoreError::Validation(err))
    }
}

impl From<PromoError> for StorefrontError {
    fn from(err: PromoError) -> Self {
        StorefrontError::Core(CoreError::Promo(err))
    }
}

// =============================================================================
// Error Codes
// =============================================================================

/// Machine-readable error codes for the page scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Address or wishlist entry does not exist
    NotFound,

    /// Form or account input failed validation
    ValidationError,

    /// Cart could not be read or is empty
    CartError,

    /// Promo code rejected
    PromoError,

    /// Catalog could not be loaded
    CatalogError,

    /// Stored document is corrupt
    StorageError,

    /// Configuration could not be loaded or saved
    ConfigError,

    /// Not logged in
    Unauthenticated,
}

/// What the page receives when an operation fails.
///
/// ```json
/// { "code": "PROMO_ERROR", "message": "Invalid promo code. Please try again." }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
    /// Per-field errors when a checkout form is rejected.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

impl StorefrontError {
    /// Returns the error code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            StorefrontError::Core(core) => match core {
                CoreError::CartParse(_) => ErrorCode::CartError,
                CoreError::Promo(_) => ErrorCode::PromoError,
                CoreError::AddressNotFound { .. } | CoreError::NotInWishlist(_) => {
                    ErrorCode::NotFound
                }
                CoreError::Validation(_) => ErrorCode::ValidationError,
            },
            StorefrontError::InvalidForm { .. } => ErrorCode::ValidationError,
            StorefrontError::EmptyCart => ErrorCode::CartError,
            StorefrontError::NotLoggedIn => ErrorCode::Unauthenticated,
            StorefrontError::CatalogUnavailable(_) | StorefrontError::CatalogMalformed(_) => {
                ErrorCode::CatalogError
            }
            StorefrontError::InvalidStoredValue { .. } => ErrorCode::StorageError,
            StorefrontError::InvalidConfig(_)
            | StorefrontError::ConfigLoadFailed(_)
            | StorefrontError::ConfigSaveFailed(_) => ErrorCode::ConfigError,
        }
    }

    /// The text shown to the shopper.
    pub fn user_message(&self) -> String {
        match self {
            StorefrontError::Core(CoreError::Promo(PromoError::PromoAlreadyApplied {
                ..
            })) => "A promo code has already been applied.".to_string(),
            StorefrontError::Core(CoreError::Promo(_)) => {
                "Invalid promo code. Please try again.".to_string()
            }
            StorefrontError::Core(CoreError::CartParse(_)) => {
                "Error loading cart items".to_string()
            }
            StorefrontError::Core(CoreError::Validation(ValidationError::Mismatch { .. })) => {
                "New passwords do not match.".to_string()
            }
            StorefrontError::Core(CoreError::Validation(ValidationError::TooShort {
                min, ..
            })) => format!("New password must be at least {} characters.", min),
            StorefrontError::Core(CoreError::Validation(ValidationError::TooLarge { .. })) => {
                "Image must be less than 2MB.".to_string()
            }
            StorefrontError::Core(CoreError::Validation(ValidationError::InvalidFormat {
                field,
                ..
            })) if field == "avatar" => "Please select a valid image file.".to_string(),
            StorefrontError::Core(core) => core.to_string(),
            StorefrontError::InvalidForm { .. } => {
                "Please fill in all required fields correctly.".to_string()
            }
            StorefrontError::EmptyCart => "Your cart is empty".to_string(),
            StorefrontError::NotLoggedIn => "Please log in to continue.".to_string(),
            StorefrontError::CatalogUnavailable(_) | StorefrontError::CatalogMalformed(_) => {
                "Error loading products.".to_string()
            }
            other => {
                tracing::error!(error = %other, "Internal storefront error");
                "Something went wrong. Please try again.".to_string()
            }
        }
    }

    /// Builds the payload handed to the page.
    pub fn to_response(&self) -> ErrorResponse {
        let fields = match self {
            StorefrontError::InvalidForm { errors, .. } => errors.clone(),
            _ => Vec::new(),
        };
        ErrorResponse {
            code: self.code(),
            message: self.user_message(),
            fields,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        self.code() == ErrorCode::ConfigError
    }
}
