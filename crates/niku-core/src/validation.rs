//! # Validation Module
//!
//! Input rules shared by the checkout form and the account page.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Page (HTML `required`, input types)                          │
//! │  ├── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required / email / card checksum                                  │
//! │  ├── Password rules and strength meter                                 │
//! │  └── Avatar upload limits                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::{MAX_AVATAR_BYTES, MIN_PASSWORD_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Requires a value that is not blank after trimming.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Checks an email address against the storefront pattern
/// `^[^\s@]+@[^\s@]+\.[^\s@]+$`.
///
/// ## Rules
/// - Exactly one `@`, with a non-empty local part
/// - No whitespace anywhere
/// - The domain contains a `.` with characters on both sides
///
/// ## Example
/// ```rust
/// use niku_core::validation::is_valid_email;
///
/// assert!(is_valid_email("siti@example.com.my"));
/// assert!(!is_valid_email("siti@localhost"));
/// assert!(!is_valid_email("siti @example.com"));
/// ```
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    // Some dot must have at least one character before and after it
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Validates a required email field.
pub fn validate_email(field: &str, email: &str) -> ValidationResult<()> {
    validate_required(field, email)?;

    if !is_valid_email(email.trim()) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a valid email address".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Passwords
// =============================================================================

/// Strength bucket shown under the new-password field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

/// Scores a password from 0 to 100.
///
/// ## Scoring
/// +20 each: length ≥ 8, length ≥ 12, an uppercase letter, a digit,
/// a character that is not an ASCII letter or digit.
pub fn password_score(password: &str) -> u8 {
    let length = password.chars().count();
    let checks = [
        length >= 8,
        length >= 12,
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ];
    checks.iter().filter(|passed| **passed).count() as u8 * 20
}

/// Buckets a password: below 40 weak, below 80 medium, otherwise strong.
///
/// ## Example
/// ```rust
/// use niku_core::validation::{password_strength, PasswordStrength};
///
/// assert_eq!(password_strength("abc"), PasswordStrength::Weak);
/// assert_eq!(password_strength("Abcdefgh1"), PasswordStrength::Medium);
/// assert_eq!(password_strength("Abcdefgh1234!"), PasswordStrength::Strong);
/// ```
pub fn password_strength(password: &str) -> PasswordStrength {
    match password_score(password) {
        0..=39 => PasswordStrength::Weak,
        40..=79 => PasswordStrength::Medium,
        _ => PasswordStrength::Strong,
    }
}

/// Validates a password change request.
///
/// ## Rules
/// - New password and confirmation must match
/// - New password must have at least 8 characters
///
/// The current password is not checked here; there is no credential store.
pub fn validate_password_change(new_password: &str, confirm_password: &str) -> ValidationResult<()> {
    if new_password != confirm_password {
        return Err(ValidationError::Mismatch {
            field: "new password".to_string(),
        });
    }

    if new_password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "new password".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }

    Ok(())
}

// =============================================================================
// Uploads
// =============================================================================

/// Validates a profile picture upload.
///
/// ## Rules
/// - MIME type must be `image/*`
/// - At most 2 MiB
pub fn validate_avatar(mime_type: &str, size_bytes: u64) -> ValidationResult<()> {
    if !mime_type.trim().to_ascii_lowercase().starts_with("image/") {
        return Err(ValidationError::InvalidFormat {
            field: "avatar".to_string(),
            reason: "must be an image file".to_string(),
        });
    }

    if size_bytes > MAX_AVATAR_BYTES {
        return Err(ValidationError::TooLarge {
            field: "avatar".to_string(),
            max_bytes: MAX_AVATAR_BYTES,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
