//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    19.99 * 3 = 59.97000000000001                                        │
//! │    subtotal * 0.06 carries that error into tax and grand total          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer sen (1/100 ringgit)                              │
//! │    1999 * 3 = 5997 sen, exactly                                         │
//! │    Rates round once, half-up, at the step that produces a fraction      │
//! │                                                                         │
//! │  Arithmetic saturates at the i64 bounds: a hostile cart cookie can      │
//! │  produce an absurd total, never a panic or a wrapped negative.          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use niku_core::money::Money;
//!
//! let price = Money::from_cents(2500); // RM25.00
//! let line = price.multiply_quantity(2);
//! assert_eq!(line.cents(), 5000);
//! assert_eq!(line.to_string(), "RM50.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::types::Rate;
use crate::CURRENCY_SYMBOL;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (sen for MYR).
///
/// ## Where Money is Used
/// ```text
/// CatalogProduct.price ──► LineItem.line_total ──► OrderTotals.subtotal
///                                                        │
///                          tax (6%) ◄────────────────────┤
///                          shipping (flat) ◄─────────────┤
///                          discount (promo) ◄────────────┘
///                                   │
///                                   ▼
///                          OrderTotals.grand_total ──► "RM63.00" in the UI
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(#[ts(type = "number")] i64);

impl Money {
    /// Creates a Money value from cents (sen).
    ///
    /// ## Example
    /// ```rust
    /// use niku_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // RM10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (ringgit and sen).
    ///
    /// For negative amounts only the major unit should be negative:
    /// `from_major_minor(-5, 50)` is -RM5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        let major = major.saturating_mul(100);
        if major < 0 {
            Money(major.saturating_sub(minor))
        } else {
            Money(major.saturating_add(minor))
        }
    }

    /// Converts a decimal amount in major units, as stored in `products.json`
    /// and the order history, to cents.
    ///
    /// This is the one place a float enters the system. It is rounded to the
    /// nearest cent immediately and never used in arithmetic. Returns `None`
    /// for NaN, infinities and amounts outside the `i64` cent range.
    ///
    /// ## Example
    /// ```rust
    /// use niku_core::money::Money;
    ///
    /// assert_eq!(Money::checked_from_major_f64(25.99).map(|m| m.cents()), Some(2599));
    /// assert_eq!(Money::checked_from_major_f64(0.1 + 0.2).map(|m| m.cents()), Some(30));
    /// assert_eq!(Money::checked_from_major_f64(1e300), None);
    /// ```
    pub fn checked_from_major_f64(amount: f64) -> Option<Self> {
        let cents = (amount * 100.0).round();
        // i64::MAX as f64 is 2^63, one past the largest representable value
        if cents.is_finite() && cents.abs() < i64::MAX as f64 {
            Some(Money(cents as i64))
        } else {
            None
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (ringgit) portion.
    #[inline]
    pub const fn ringgit(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Applies a rate to this amount, rounding half-up to the cent.
    ///
    /// Used for both the 6% tax and the percentage promo discounts.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`. The +5000 is the
    /// half-cent that makes the division round instead of truncate.
    ///
    /// ## Example
    /// ```rust
    /// use niku_core::money::Money;
    /// use niku_core::types::Rate;
    ///
    /// let subtotal = Money::from_cents(5000); // RM50.00
    /// assert_eq!(subtotal.apply_rate(Rate::from_bps(600)).cents(), 300);
    ///
    /// // RM19.99 × 6% = 119.94 sen → 120 sen
    /// assert_eq!(Money::from_cents(1999).apply_rate(Rate::from_bps(600)).cents(), 120);
    /// ```
    pub fn apply_rate(&self, rate: Rate) -> Money {
        // i128 so large carts cannot overflow the intermediate product
        let cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(cents.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }

    /// Multiplies money by a quantity, saturating at the `i64` bounds.
    ///
    /// ## Example
    /// ```rust
    /// use niku_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(qty as i64))
    }

    /// Formats the amount with two decimals and no currency marker,
    /// e.g. `"63.00"`.
    pub fn amount_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.ringgit().abs(), self.cents_part())
    }

    /// Formats the amount with a custom currency marker.
    pub fn format_with(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!(
            "{}{}{}.{:02}",
            sign,
            symbol,
            self.ringgit().abs(),
            self.cents_part()
        )
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money the way the storefront prints it: `RM63.00`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with(CURRENCY_SYMBOL))
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Major-Unit Serde Adapter
// =============================================================================

/// Serde adapter for documents that store prices as decimal ringgit
/// (`"price": 25.99`) rather than cents.
///
/// Accepts integers, floats, numeric strings, and `null`/absent (zero when
/// combined with `#[serde(default)]`). Negative amounts and amounts that do
/// not fit in `i64` cents are rejected. Serializes back to a decimal number.
///
/// ```rust
/// use niku_core::money::Money;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Row {
///     #[serde(default, with = "niku_core::money::major_units")]
///     price: Money,
/// }
///
/// let row: Row = serde_json::from_str(r#"{"price": 19.9}"#).unwrap();
/// assert_eq!(row.price.cents(), 1990);
/// let row: Row = serde_json::from_str(r#"{}"#).unwrap();
/// assert!(row.price.is_zero());
/// ```
pub mod major_units {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Money;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Whole(i64),
        Decimal(f64),
        Text(String),
    }

    pub fn serialize<S>(value: &Money, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(value.cents() as f64 / 100.0)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Money, D::Error>
    where
        D: Deserializer<'de>,
    {
        let amount = match Option::<RawAmount>::deserialize(deserializer)? {
            None => return Ok(Money::zero()),
            Some(RawAmount::Whole(major)) => major.checked_mul(100).map(Money::from_cents),
            Some(RawAmount::Decimal(amount)) => Money::checked_from_major_f64(amount),
            Some(RawAmount::Text(text)) => {
                let amount = text
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| D::Error::custom(format!("invalid amount '{}'", text)))?;
                Money::checked_from_major_f64(amount)
            }
        };

        match amount {
            Some(money) if money.is_negative() => {
                Err(D::Error::custom(format!("negative amount {}", money)))
            }
            Some(money) => Ok(money),
            None => Err(D::Error::custom("amount out of range")),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.ringgit(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_from_major_f64_rounds_to_nearest_cent() {
        let cents = |amount: f64| Money::checked_from_major_f64(amount).map(|m| m.cents());
        assert_eq!(cents(25.0), Some(2500));
        assert_eq!(cents(19.99), Some(1999));
        assert_eq!(cents(1.005), Some(100));
        assert_eq!(cents(0.0), Some(0));
    }

    #[test]
    fn test_from_major_f64_rejects_out_of_range() {
        assert_eq!(Money::checked_from_major_f64(f64::NAN), None);
        assert_eq!(Money::checked_from_major_f64(f64::INFINITY), None);
        assert_eq!(Money::checked_from_major_f64(1e17), None);
        assert_eq!(Money::checked_from_major_f64(-1e17), None);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let huge = Money::from_cents(3_000_000_000);
        assert_eq!(huge.multiply_quantity(u32::MAX).cents(), i64::MAX);
        assert_eq!((Money::from_cents(i64::MAX) + Money::from_cents(1)).cents(), i64::MAX);
        assert_eq!((Money::from_cents(i64::MIN) - Money::from_cents(1)).cents(), i64::MIN);

        let total: Money = [Money::from_cents(i64::MAX), Money::from_cents(500)].iter().sum();
        assert_eq!(total.cents(), i64::MAX);
        assert_eq!(Money::from_major_minor(i64::MAX, 99).cents(), i64::MAX);
        assert_eq!(
            Money::from_cents(i64::MAX).apply_rate(Rate::from_bps(20_000)).cents(),
            i64::MAX
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(6300).to_string(), "RM63.00");
        assert_eq!(Money::from_cents(5).to_string(), "RM0.05");
        assert_eq!(Money::from_cents(-550).to_string(), "-RM5.50");
        assert_eq!(Money::from_cents(6300).amount_string(), "63.00");
        assert_eq!(Money::from_cents(1234).format_with("$"), "$12.34");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);

        let mut c = a;
        c += b;
        c -= Money::from_cents(200);
        assert_eq!(c.cents(), 1300);
    }

    #[test]
    fn test_sum() {
        let amounts = [Money::from_cents(100), Money::from_cents(250)];
        let by_ref: Money = amounts.iter().sum();
        let by_value: Money = amounts.into_iter().sum();
        assert_eq!(by_ref.cents(), 350);
        assert_eq!(by_value, by_ref);
    }

    #[test]
    fn test_apply_rate_rounds_half_up() {
        // 6% of RM50.00 is exact
        assert_eq!(Money::from_cents(5000).apply_rate(Rate::from_bps(600)).cents(), 300);
        // 6% of 25 sen = 1.5 sen → 2 sen
        assert_eq!(Money::from_cents(25).apply_rate(Rate::from_bps(600)).cents(), 2);
        // 6% of 24 sen = 1.44 sen → 1 sen
        assert_eq!(Money::from_cents(24).apply_rate(Rate::from_bps(600)).cents(), 1);
        assert!(Money::zero().apply_rate(Rate::from_bps(600)).is_zero());
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        assert!(Money::from_cents(100).is_positive());
        assert!(Money::from_cents(-100).is_negative());
    }

    #[test]
    fn test_typescript_type_is_number() {
        // serde writes a JSON number, so the binding must not be bigint
        assert_eq!(Money::inline(), "number");
    }

    #[test]
    fn test_major_units_adapter() {
        #[derive(Debug, Deserialize, Serialize)]
        struct Row {
            #[serde(default, with = "major_units")]
            price: Money,
        }

        let row: Row = serde_json::from_str(r#"{"price": 12}"#).unwrap();
        assert_eq!(row.price.cents(), 1200);
        let row: Row = serde_json::from_str(r#"{"price": "7.50"}"#).unwrap();
        assert_eq!(row.price.cents(), 750);
        let row: Row = serde_json::from_str(r#"{"price": null}"#).unwrap();
        assert!(row.price.is_zero());
        assert!(serde_json::from_str::<Row>(r#"{"price": "abc"}"#).is_err());
        let row: Row = serde_json::from_str(r#"{"price": -0.0}"#).unwrap();
        assert!(row.price.is_zero());

        let json = serde_json::to_string(&Row { price: Money::from_cents(2599) }).unwrap();
        assert_eq!(json, r#"{"price":25.99}"#);
    }

    #[test]
    fn test_major_units_rejects_negative_and_huge() {
        #[derive(Debug, Deserialize)]
        struct Row {
            #[serde(with = "major_units")]
            #[allow(dead_code)]
            price: Money,
        }

        assert!(serde_json::from_str::<Row>(r#"{"price": -5}"#).is_err());
        assert!(serde_json::from_str::<Row>(r#"{"price": -0.5}"#).is_err());
        assert!(serde_json::from_str::<Row>(r#"{"price": "-12.00"}"#).is_err());
        assert!(serde_json::from_str::<Row>(r#"{"price": 9223372036854775807}"#).is_err());
        assert!(serde_json::from_str::<Row>(r#"{"price": 1e300}"#).is_err());
    }
}
