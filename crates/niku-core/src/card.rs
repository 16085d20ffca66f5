//! # Card Validator
//!
//! Structural check of a payment card number (length + Luhn checksum).
//! This says nothing about whether the card exists or can be charged.

/// Shortest accepted card number, in digits.
pub const MIN_CARD_DIGITS: usize = 13;
/// Longest accepted card number, in digits.
pub const MAX_CARD_DIGITS: usize = 19;

/// Removes the whitespace and hyphens shoppers type between digit groups.
fn strip_separators(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// Checks a card number with the Luhn (mod 10) algorithm.
///
/// ## Rules
/// - Whitespace and hyphens are ignored
/// - 13 to 19 digits, nothing else
/// - From the rightmost digit, every second digit is doubled (minus 9 when
///   the result exceeds 9); the digit sum must be divisible by 10
///
/// ## Example
/// ```rust
/// use niku_core::card::is_valid_card_number;
///
/// assert!(is_valid_card_number("4532015112830366"));
/// assert!(is_valid_card_number("4532 0151 1283 0366"));
/// assert!(!is_valid_card_number("4532015112830367"));
/// assert!(!is_valid_card_number("123"));
/// ```
pub fn is_valid_card_number(raw: &str) -> bool {
    let digits = strip_separators(raw);

    if !(MIN_CARD_DIGITS..=MAX_CARD_DIGITS).contains(&digits.len())
        || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return false;
    }

    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                digit
            }
        })
        .sum();

    sum % 10 == 0
}

/// Last four digits of a card number, for "Credit Card ending in 0366".
///
/// Separators are ignored; shorter inputs return what is there.
pub fn card_last_four(raw: &str) -> String {
    let digits = strip_separators(raw);
    let start = digits.len().saturating_sub(4);
    digits.get(start..).unwrap_or_default().to_string()
}
