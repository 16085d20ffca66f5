//! # Checkout Wizard
//!
//! Step order, per-step form rules and the review summary of the
//! three-step checkout page.
//!
//! ## Steps
//! ```text
//! ┌────────────┐  next   ┌────────────┐  next   ┌────────────┐
//! │  Shipping  │ ──────► │  Payment   │ ──────► │   Review   │ ──► place order
//! │    (1)     │ ◄────── │    (2)     │ ◄────── │    (3)     │
//! └────────────┘  back   └────────────┘  back   └────────────┘
//! ```
//!
//! Moving forward requires the current step's form to validate. Saved form
//! data keeps only non-empty values, keyed by step.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::account::UserProfile;
use crate::card::{card_last_four, is_valid_card_number};
use crate::error::ValidationError;
use crate::validation::is_valid_email;

// =============================================================================
// Steps
// =============================================================================

/// One page of the checkout wizard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum CheckoutStep {
    #[default]
    Shipping,
    Payment,
    Review,
}

impl CheckoutStep {
    /// All steps in wizard order.
    pub const ALL: [CheckoutStep; 3] = [
        CheckoutStep::Shipping,
        CheckoutStep::Payment,
        CheckoutStep::Review,
    ];

    /// Form id prefix on the page (`shipping-form`, ...) and the key used
    /// in saved checkout data.
    pub const fn form_id(&self) -> &'static str {
        match self {
            CheckoutStep::Shipping => "shipping",
            CheckoutStep::Payment => "payment",
            CheckoutStep::Review => "review",
        }
    }

    /// 1-based position in the progress indicator.
    pub const fn position(&self) -> u8 {
        match self {
            CheckoutStep::Shipping => 1,
            CheckoutStep::Payment => 2,
            CheckoutStep::Review => 3,
        }
    }

    /// The step after this one. Review is last.
    pub const fn next(&self) -> Option<CheckoutStep> {
        match self {
            CheckoutStep::Shipping => Some(CheckoutStep::Payment),
            CheckoutStep::Payment => Some(CheckoutStep::Review),
            CheckoutStep::Review => None,
        }
    }

    /// The step the back button returns to. Shipping stays on shipping.
    pub const fn previous(&self) -> CheckoutStep {
        match self {
            CheckoutStep::Shipping | CheckoutStep::Payment => CheckoutStep::Shipping,
            CheckoutStep::Review => CheckoutStep::Payment,
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.form_id())
    }
}

impl FromStr for CheckoutStep {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim().trim_end_matches("-form");
        CheckoutStep::ALL
            .into_iter()
            .find(|step| step.form_id().eq_ignore_ascii_case(id))
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "step".to_string(),
                reason: format!("unknown checkout step '{}'", s),
            })
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// Payment option radio buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum PaymentMethod {
    CreditCard,
    #[serde(rename = "paypal")]
    PayPal,
    BankTransfer,
}

impl PaymentMethod {
    /// Form value of the radio button.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "credit-card",
            PaymentMethod::PayPal => "paypal",
            PaymentMethod::BankTransfer => "bank-transfer",
        }
    }

    /// Whether the card detail fields are shown (and required).
    pub const fn needs_card_details(&self) -> bool {
        matches!(self, PaymentMethod::CreditCard)
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "credit-card" => Ok(PaymentMethod::CreditCard),
            "paypal" => Ok(PaymentMethod::PayPal),
            "bank-transfer" => Ok(PaymentMethod::BankTransfer),
            other => Err(ValidationError::InvalidFormat {
                field: PAYMENT_METHOD_FIELD.to_string(),
                reason: format!("unknown payment method '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Form Data
// =============================================================================

/// Name of the payment method radio group.
pub const PAYMENT_METHOD_FIELD: &str = "payment-method";
/// Name of the card number input.
pub const CARD_NUMBER_FIELD: &str = "card-number";

/// How a field is checked beyond being required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Tel,
    CardNumber,
}

/// A required input on a checkout form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, kind }
}

/// Required inputs of the shipping form.
pub const SHIPPING_FIELDS: &[FieldSpec] = &[
    field("first-name", FieldKind::Text),
    field("last-name", FieldKind::Text),
    field("email", FieldKind::Email),
    field("phone", FieldKind::Tel),
    field("address", FieldKind::Text),
    field("city", FieldKind::Text),
    field("state", FieldKind::Text),
    field("postal-code", FieldKind::Text),
];

/// Required inputs of the credit card block on the payment form.
pub const CARD_FIELDS: &[FieldSpec] = &[
    field("card-name", FieldKind::Text),
    field(CARD_NUMBER_FIELD, FieldKind::CardNumber),
    field("expiry", FieldKind::Text),
    field("cvv", FieldKind::Text),
];

/// Submitted values of one checkout form, by input name.
///
/// Only non-empty values are kept, so a blank input and a missing input
/// read the same.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct FormData(BTreeMap<String, String>);

impl FormData {
    /// Creates an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value; empty values remove the field.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if value.is_empty() {
            self.0.remove(&name);
        } else {
            self.0.insert(name, value);
        }
    }

    /// Returns a value, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Returns a value or the empty string.
    pub fn value(&self, name: &str) -> &str {
        self.get(name).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for FormData
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = FormData::new();
        for (name, value) in iter {
            form.set(name, value);
        }
        form
    }
}

/// Form data saved as the shopper moves through the wizard
/// (the `checkoutData` document).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub shipping: Option<FormData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub payment: Option<FormData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub review: Option<FormData>,
}

impl CheckoutData {
    /// Replaces the saved data of one step.
    pub fn record(&mut self, step: CheckoutStep, form: FormData) {
        *self.slot_mut(step) = Some(form);
    }

    /// Saved data of one step.
    pub fn step(&self, step: CheckoutStep) -> Option<&FormData> {
        match step {
            CheckoutStep::Shipping => self.shipping.as_ref(),
            CheckoutStep::Payment => self.payment.as_ref(),
            CheckoutStep::Review => self.review.as_ref(),
        }
    }

    fn slot_mut(&mut self, step: CheckoutStep) -> &mut Option<FormData> {
        match step {
            CheckoutStep::Shipping => &mut self.shipping,
            CheckoutStep::Payment => &mut self.payment,
            CheckoutStep::Review => &mut self.review,
        }
    }
}

// =============================================================================
// Form Validation
// =============================================================================

/// A field that failed validation, for highlighting on the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

fn check_fields(specs: &[FieldSpec], form: &FormData, errors: &mut Vec<FieldError>) {
    for spec in specs {
        let value = form.value(spec.name).trim();
        if value.is_empty() {
            errors.push(FieldError::new(spec.name, "This field is required"));
            continue;
        }
        match spec.kind {
            FieldKind::Email if !is_valid_email(value) => {
                errors.push(FieldError::new(spec.name, "Enter a valid email address"));
            }
            FieldKind::CardNumber if !is_valid_card_number(value) => {
                errors.push(FieldError::new(spec.name, "Enter a valid card number"));
            }
            _ => {}
        }
    }
}

/// Validates one step's form before moving on.
///
/// ## Rules
/// - Shipping: every shipping field required, `email` must look like an
///   email address
/// - Payment: a known payment method; card fields are required only for
///   credit card, and the card number must pass the Luhn check
/// - Review: nothing to fill in
///
/// All failing fields are reported, not just the first.
pub fn validate_step(step: CheckoutStep, form: &FormData) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    match step {
        CheckoutStep::Shipping => check_fields(SHIPPING_FIELDS, form, &mut errors),
        CheckoutStep::Payment => match form.get(PAYMENT_METHOD_FIELD) {
            None => errors.push(FieldError::new(
                PAYMENT_METHOD_FIELD,
                "Choose a payment method",
            )),
            Some(raw) => match raw.parse::<PaymentMethod>() {
                Ok(method) if method.needs_card_details() => {
                    check_fields(CARD_FIELDS, form, &mut errors);
                }
                Ok(_) => {}
                Err(e) => errors.push(FieldError::new(PAYMENT_METHOD_FIELD, e.to_string())),
            },
        },
        CheckoutStep::Review => {}
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Seeds the shipping form from the saved account profile.
pub fn shipping_prefill(profile: &UserProfile) -> FormData {
    [
        ("first-name", profile.first_name.as_str()),
        ("last-name", profile.last_name.as_str()),
        ("email", profile.email.as_str()),
        ("phone", profile.phone.as_str()),
    ]
    .into_iter()
    .collect()
}

// =============================================================================
// Review Summary
// =============================================================================

/// What the review step shows before the order is placed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReviewSummary {
    /// Name, street, and "City, State Postcode" lines.
    pub shipping_address: Vec<String>,
    /// e.g. "Credit Card ending in 0366".
    pub payment_method: Option<String>,
}

impl ReviewSummary {
    /// Builds the summary from saved checkout data.
    ///
    /// ## Example
    /// ```rust
    /// use niku_core::checkout::{CheckoutData, CheckoutStep, FormData, ReviewSummary};
    ///
    /// let mut data = CheckoutData::default();
    /// data.record(
    ///     CheckoutStep::Payment,
    ///     [("payment-method", "credit-card"), ("card-number", "4532 0151 1283 0366")]
    ///         .into_iter()
    ///         .collect::<FormData>(),
    /// );
    /// let summary = ReviewSummary::build(&data);
    /// assert_eq!(summary.payment_method.as_deref(), Some("Credit Card ending in 0366"));
    /// ```
    pub fn build(data: &CheckoutData) -> Self {
        let shipping_address = data
            .shipping
            .as_ref()
            .map(|s| {
                vec![
                    format!("{} {}", s.value("first-name"), s.value("last-name"))
                        .trim()
                        .to_string(),
                    s.value("address").to_string(),
                    format!(
                        "{}, {} {}",
                        s.value("city"),
                        s.value("state"),
                        s.value("postal-code")
                    )
                    .trim()
                    .to_string(),
                ]
            })
            .unwrap_or_default();

        let payment_method = data.payment.as_ref().and_then(|p| {
            let method = p.get(PAYMENT_METHOD_FIELD)?.parse::<PaymentMethod>().ok()?;
            Some(match method {
                PaymentMethod::CreditCard => format!(
                    "Credit Card ending in {}",
                    card_last_four(p.value(CARD_NUMBER_FIELD))
                ),
                PaymentMethod::PayPal => "PayPal".to_string(),
                PaymentMethod::BankTransfer => "Bank Transfer".to_string(),
            })
        });

        ReviewSummary {
            shipping_address,
            payment_method,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn shipping_form() -> FormData {
        [
            ("first-name", "Siti"),
            ("last-name", "Aminah"),
            ("email", "siti@example.com"),
            ("phone", "0123456789"),
            ("address", "12 Jalan Bukit"),
            ("city", "Kuala Lumpur"),
            ("state", "WP"),
            ("postal-code", "50450"),
        ]
        .into_iter()
        .collect()
    }

    fn card_form(number: &str) -> FormData {
        [
            ("payment-method", "credit-card"),
            ("card-name", "Siti Aminah"),
            ("card-number", number),
            ("expiry", "12/28"),
            ("cvv", "123"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_step_navigation() {
        assert_eq!(CheckoutStep::Shipping.next(), Some(CheckoutStep::Payment));
        assert_eq!(CheckoutStep::Payment.next(), Some(CheckoutStep::Review));
        assert_eq!(CheckoutStep::Review.next(), None);

        assert_eq!(CheckoutStep::Review.previous(), CheckoutStep::Payment);
        assert_eq!(CheckoutStep::Payment.previous(), CheckoutStep::Shipping);
        assert_eq!(CheckoutStep::Shipping.previous(), CheckoutStep::Shipping);

        assert_eq!(CheckoutStep::Review.position(), 3);
        assert_eq!(CheckoutStep::default(), CheckoutStep::Shipping);
    }

    #[test]
    fn test_step_parsing() {
        assert_eq!("payment".parse::<CheckoutStep>().unwrap(), CheckoutStep::Payment);
        assert_eq!("review-form".parse::<CheckoutStep>().unwrap(), CheckoutStep::Review);
        assert!("confirm".parse::<CheckoutStep>().is_err());
    }

    #[test]
    fn test_form_data_drops_empty_values() {
        let mut form: FormData = [("city", "Ipoh"), ("state", "")].into_iter().collect();
        assert_eq!(form.get("city"), Some("Ipoh"));
        assert_eq!(form.get("state"), None);

        form.set("city", "");
        assert!(form.is_empty());
    }

    #[test]
    fn test_shipping_validation() {
        assert!(validate_step(CheckoutStep::Shipping, &shipping_form()).is_ok());

        let mut form = shipping_form();
        form.set("email", "siti@example");
        form.set("city", "   ");
        let errors = validate_step(CheckoutStep::Shipping, &form).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "city"]);
    }

    #[test]
    fn test_payment_validation_checks_card() {
        assert!(validate_step(CheckoutStep::Payment, &card_form("4532015112830366")).is_ok());

        let errors =
            validate_step(CheckoutStep::Payment, &card_form("4532015112830367")).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "card-number");
    }

    #[test]
    fn test_payment_without_card_needs_no_card_fields() {
        let form: FormData = [("payment-method", "paypal")].into_iter().collect();
        assert!(validate_step(CheckoutStep::Payment, &form).is_ok());

        let errors = validate_step(CheckoutStep::Payment, &FormData::new()).unwrap_err();
        assert_eq!(errors[0].field, "payment-method");

        let form: FormData = [("payment-method", "cheque")].into_iter().collect();
        assert!(validate_step(CheckoutStep::Payment, &form).is_err());
    }

    #[test]
    fn test_review_step_has_nothing_to_validate() {
        assert!(validate_step(CheckoutStep::Review, &FormData::new()).is_ok());
    }

    #[test]
    fn test_checkout_data_serialization() {
        let mut data = CheckoutData::default();
        data.record(CheckoutStep::Shipping, [("city", "Ipoh")].into_iter().collect());

        let json = serde_json::to_string(&data).unwrap();
        assert_eq!(json, r#"{"shipping":{"city":"Ipoh"}}"#);

        let back: CheckoutData = serde_json::from_str(&json).unwrap();
        assert_eq!(back.step(CheckoutStep::Shipping).unwrap().get("city"), Some("Ipoh"));
        assert!(back.step(CheckoutStep::Payment).is_none());
    }

    #[test]
    fn test_review_summary() {
        let mut data = CheckoutData::default();
        data.record(CheckoutStep::Shipping, shipping_form());
        data.record(
            CheckoutStep::Payment,
            [("payment-method", "bank-transfer")].into_iter().collect(),
        );

        let summary = ReviewSummary::build(&data);
        assert_eq!(
            summary.shipping_address,
            vec![
                "Siti Aminah".to_string(),
                "12 Jalan Bukit".to_string(),
                "Kuala Lumpur, WP 50450".to_string(),
            ]
        );
        assert_eq!(summary.payment_method.as_deref(), Some("Bank Transfer"));
        assert_eq!(ReviewSummary::build(&CheckoutData::default()), ReviewSummary::default());
    }

    #[test]
    fn test_shipping_prefill() {
        let profile = UserProfile {
            first_name: "Siti".to_string(),
            last_name: "Aminah".to_string(),
            email: "siti@example.com".to_string(),
            phone: String::new(),
            avatar: None,
        };
        let form = shipping_prefill(&profile);
        assert_eq!(form.get("first-name"), Some("Siti"));
        assert_eq!(form.get("email"), Some("siti@example.com"));
        assert_eq!(form.get("phone"), None);
    }

    #[test]
    fn test_payment_method_serde() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::PayPal).unwrap(),
            r#""paypal""#
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CreditCard).unwrap(),
            r#""credit-card""#
        );
        assert_eq!(PaymentMethod::BankTransfer.as_str(), "bank-transfer");
    }
}
