//! # Account
//!
//! Shapes and rules behind the account page: profile, address book,
//! wishlist and order history.
//!
//! ## Stored Documents
//! ```text
//! ┌──────────────────┬──────────────────────────────────────────────────────┐
//! │ key              │ shape                                                │
//! ├──────────────────┼──────────────────────────────────────────────────────┤
//! │ userData         │ UserProfile   { firstName, lastName, email, ... }    │
//! │ userAddresses    │ AddressBook   [ Address { title, ..., default } ]    │
//! │ userWishlist     │ Wishlist      [ product id ]                         │
//! │ userOrders       │ [ Order { id, date, status, items, total } ]         │
//! └──────────────────┴──────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is plain data plus invariants. Reading and writing the
//! documents is the storefront crate's job.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{major_units, Money};
use crate::types::{Catalog, CatalogProduct, ProductId};
use crate::validation::{validate_email, validate_required, ValidationResult};

// =============================================================================
// Profile
// =============================================================================

/// Saved profile of the signed-in shopper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserProfile {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// Profile picture as a data URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub avatar: Option<String>,
}

/// Fields submitted by the profile form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl ProfileUpdate {
    /// Names are required and the email must be well formed.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("first name", &self.first_name)?;
        validate_required("last name", &self.last_name)?;
        validate_email("email", &self.email)
    }
}

impl UserProfile {
    /// Placeholder profile for a shopper who logged in without saved details.
    pub fn for_login(email: impl Into<String>) -> Self {
        UserProfile {
            first_name: "User".to_string(),
            last_name: "Name".to_string(),
            email: email.into(),
            ..Default::default()
        }
    }

    /// Fills in the placeholder profile when the saved one has no email.
    ///
    /// Returns `true` if the profile changed and should be saved.
    pub fn adopt_login(&mut self, email: &str) -> bool {
        if email.is_empty() || !self.email.is_empty() {
            return false;
        }
        let avatar = self.avatar.take();
        *self = UserProfile {
            phone: std::mem::take(&mut self.phone),
            avatar,
            ..UserProfile::for_login(email)
        };
        true
    }

    /// "First Last", only when both names are known.
    pub fn display_name(&self) -> Option<String> {
        if self.first_name.is_empty() || self.last_name.is_empty() {
            return None;
        }
        Some(format!("{} {}", self.first_name, self.last_name))
    }

    /// Applies a profile form submission. The avatar is kept.
    pub fn with_updates(&self, update: ProfileUpdate) -> UserProfile {
        UserProfile {
            first_name: update.first_name,
            last_name: update.last_name,
            email: update.email,
            phone: update.phone,
            avatar: self.avatar.clone(),
        }
    }
}

// =============================================================================
// Address Book
// =============================================================================

/// A saved delivery address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Address {
    /// Label such as "Home" or "Office".
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub default: bool,
}

/// Ordered list of saved addresses.
///
/// ## Invariants
/// - At most one address is the default
/// - The first address ever added becomes the default
/// - Deleting the default promotes the first remaining address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct AddressBook(Vec<Address>);

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn addresses(&self) -> &[Address] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The default address, if any.
    pub fn default_address(&self) -> Option<&Address> {
        self.0.iter().find(|a| a.default)
    }

    /// Adds an address, or replaces the one at `edit_index`.
    ///
    /// Returns the position of the saved address.
    pub fn save(&mut self, mut address: Address, edit_index: Option<usize>) -> CoreResult<usize> {
        if let Some(index) = edit_index {
            if index >= self.0.len() {
                return Err(CoreError::AddressNotFound { index });
            }
        }

        if address.default {
            self.0.iter_mut().for_each(|a| a.default = false);
        }

        match edit_index {
            Some(index) => {
                self.0[index] = address;
                Ok(index)
            }
            None => {
                if self.0.is_empty() {
                    address.default = true;
                }
                self.0.push(address);
                Ok(self.0.len() - 1)
            }
        }
    }

    /// Removes the address at `index` and returns it.
    pub fn delete(&mut self, index: usize) -> CoreResult<Address> {
        if index >= self.0.len() {
            return Err(CoreError::AddressNotFound { index });
        }

        let removed = self.0.remove(index);
        if removed.default {
            if let Some(first) = self.0.first_mut() {
                first.default = true;
            }
        }
        Ok(removed)
    }
}

// =============================================================================
// Wishlist
// =============================================================================

/// Product ids the shopper saved for later, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct Wishlist(Vec<ProductId>);

impl Wishlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[ProductId] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.0.contains(&id)
    }

    /// Adds a product once; returns `false` if it was already there.
    pub fn add(&mut self, id: ProductId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.0.push(id);
        true
    }

    /// Removes every occurrence of a product.
    pub fn remove(&mut self, id: ProductId) -> CoreResult<()> {
        if !self.contains(id) {
            return Err(CoreError::NotInWishlist(id));
        }
        self.0.retain(|saved| *saved != id);
        Ok(())
    }

    /// Products to show, in wishlist order. Ids missing from the catalog
    /// are skipped.
    pub fn resolve(&self, catalog: &Catalog) -> Vec<CatalogProduct> {
        self.0
            .iter()
            .filter_map(|id| catalog.get(*id).cloned())
            .collect()
    }
}

// =============================================================================
// Orders
// =============================================================================

/// One product line of a past order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItem {
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub size: String,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default, with = "major_units")]
    #[ts(type = "number")]
    pub price: Money,
}

fn one() -> u32 {
    1
}

/// A past order from the order history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    /// ISO date or timestamp, as stored.
    pub date: String,
    pub status: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default, with = "major_units")]
    #[ts(type = "number")]
    pub total: Money,
}

impl Order {
    /// Order date as "16 Oct 2026".
    ///
    /// Accepts an RFC 3339 timestamp or a plain `YYYY-MM-DD` date; anything
    /// else is shown as stored.
    pub fn formatted_date(&self) -> String {
        const FORMAT: &str = "%-d %b %Y";

        let raw = self.date.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return ts.date_naive().format(FORMAT).to_string();
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return date.format(FORMAT).to_string();
        }
        self.date.clone()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn address(title: &str, default: bool) -> Address {
        Address {
            title: title.to_string(),
            first_name: "Siti".to_string(),
            last_name: "Aminah".to_string(),
            street: "12 Jalan Bukit".to_string(),
            city: "Ipoh".to_string(),
            state: "Perak".to_string(),
            postcode: "30000".to_string(),
            phone: "0123456789".to_string(),
            default,
        }
    }

    fn defaults(book: &AddressBook) -> Vec<bool> {
        book.addresses().iter().map(|a| a.default).collect()
    }

    #[test]
    fn test_profile_for_login() {
        let profile = UserProfile::for_login("siti@example.com");
        assert_eq!(profile.display_name().as_deref(), Some("User Name"));
        assert_eq!(profile.email, "siti@example.com");

        let mut saved = UserProfile {
            avatar: Some("data:image/png;base64,AA".to_string()),
            ..Default::default()
        };
        assert!(saved.adopt_login("siti@example.com"));
        assert_eq!(saved.first_name, "User");
        assert!(saved.avatar.is_some());
        assert!(!saved.adopt_login("other@example.com"));
        assert_eq!(saved.email, "siti@example.com");
    }

    #[test]
    fn test_display_name_needs_both_names() {
        let profile = UserProfile {
            first_name: "Siti".to_string(),
            ..Default::default()
        };
        assert_eq!(profile.display_name(), None);
    }

    #[test]
    fn test_profile_update_keeps_avatar() {
        let profile = UserProfile {
            avatar: Some("data:image/png;base64,AA".to_string()),
            ..UserProfile::for_login("old@example.com")
        };
        let update = ProfileUpdate {
            first_name: "Siti".to_string(),
            last_name: "Aminah".to_string(),
            email: "siti@example.com".to_string(),
            phone: String::new(),
        };
        assert!(update.validate().is_ok());

        let updated = profile.with_updates(update);
        assert_eq!(updated.email, "siti@example.com");
        assert_eq!(updated.avatar, profile.avatar);
    }

    #[test]
    fn test_profile_update_validation() {
        let update = ProfileUpdate {
            first_name: "Siti".to_string(),
            last_name: " ".to_string(),
            email: "siti@example.com".to_string(),
            phone: String::new(),
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_profile_json_keys() {
        let profile: UserProfile = serde_json::from_str(
            r#"{"firstName":"Siti","lastName":"Aminah","email":"siti@example.com"}"#,
        )
        .unwrap();
        assert_eq!(profile.first_name, "Siti");
        assert!(profile.phone.is_empty());

        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("avatar").is_none());
        assert_eq!(json["lastName"], "Aminah");
    }

    #[test]
    fn test_first_address_becomes_default() {
        let mut book = AddressBook::new();
        book.save(address("Home", false), None).unwrap();
        book.save(address("Office", false), None).unwrap();
        assert_eq!(defaults(&book), vec![true, false]);
        assert_eq!(book.default_address().unwrap().title, "Home");
    }

    #[test]
    fn test_new_default_clears_others() {
        let mut book = AddressBook::new();
        book.save(address("Home", false), None).unwrap();
        book.save(address("Office", true), None).unwrap();
        assert_eq!(defaults(&book), vec![false, true]);

        book.save(address("Home", true), Some(0)).unwrap();
        assert_eq!(defaults(&book), vec![true, false]);
    }

    #[test]
    fn test_edit_bad_index_leaves_book_unchanged() {
        let mut book = AddressBook::new();
        book.save(address("Home", false), None).unwrap();
        let before = book.clone();

        let err = book.save(address("Office", true), Some(5)).unwrap_err();
        assert!(matches!(err, CoreError::AddressNotFound { index: 5 }));
        assert_eq!(book, before);
    }

    #[test]
    fn test_delete_default_promotes_first() {
        let mut book = AddressBook::new();
        book.save(address("Home", false), None).unwrap();
        book.save(address("Office", false), None).unwrap();
        book.save(address("Parents", false), None).unwrap();

        let removed = book.delete(0).unwrap();
        assert_eq!(removed.title, "Home");
        assert_eq!(defaults(&book), vec![true, false]);
        assert_eq!(book.default_address().unwrap().title, "Office");

        book.delete(1).unwrap();
        book.delete(0).unwrap();
        assert!(book.is_empty());
        assert!(book.delete(0).is_err());
    }

    #[test]
    fn test_wishlist() {
        let catalog = Catalog::new(&[
            CatalogProduct {
                id: 1,
                name: "Tee".to_string(),
                price: Money::from_cents(2500),
                image: None,
            },
            CatalogProduct {
                id: 3,
                name: "Cap".to_string(),
                price: Money::from_cents(1500),
                image: None,
            },
        ]);

        let mut wishlist: Wishlist = serde_json::from_str("[3, 2, 1]").unwrap();
        let names: Vec<String> = wishlist.resolve(&catalog).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Cap", "Tee"]);

        assert!(!wishlist.add(3));
        wishlist.remove(3).unwrap();
        assert!(!wishlist.contains(3));
        assert!(matches!(wishlist.remove(3), Err(CoreError::NotInWishlist(3))));
        assert_eq!(serde_json::to_string(&wishlist).unwrap(), "[2,1]");
    }

    #[test]
    fn test_order_from_history() {
        let order: Order = serde_json::from_str(
            r#"{
                "id": "NK1001",
                "date": "2026-10-16T09:30:00Z",
                "status": "delivered",
                "items": [{"name": "Tee", "image": "img/tee.jpg", "size": "M", "quantity": 2, "price": 25.00}],
                "total": 63.00
            }"#,
        )
        .unwrap();

        assert_eq!(order.formatted_date(), "16 Oct 2026");
        assert_eq!(order.items[0].price.cents(), 2500);
        assert_eq!(order.total.to_string(), "RM63.00");
    }

    #[test]
    fn test_order_date_formats() {
        let mut order = Order {
            id: "NK1".to_string(),
            date: "2026-03-05".to_string(),
            status: "processing".to_string(),
            items: Vec::new(),
            total: Money::zero(),
        };
        assert_eq!(order.formatted_date(), "5 Mar 2026");

        order.date = "last Tuesday".to_string();
        assert_eq!(order.formatted_date(), "last Tuesday");
    }
}
