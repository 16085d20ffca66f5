//! # Account Service
//!
//! The account page's operations over the stored account documents. Every
//! operation requires the `userEmail` cookie.

use std::sync::Arc;

use niku_core::validation::{validate_avatar, validate_password_change};
use niku_core::{
    Address, AddressBook, Catalog, CatalogProduct, Order, ProductId, ProfileUpdate, UserProfile,
    Wishlist,
};
use tracing::{debug, info};

use crate::catalog::CatalogSource;
use crate::error::{StorefrontError, StorefrontResult};
use crate::storage::{keys, read_json_or_default, write_json, KeyValueStore};

/// Profile, address book, wishlist and order history of the logged-in
/// shopper.
pub struct AccountService {
    cookies: Arc<dyn KeyValueStore>,
    local: Arc<dyn KeyValueStore>,
}

impl AccountService {
    pub fn new(cookies: Arc<dyn KeyValueStore>, local: Arc<dyn KeyValueStore>) -> Self {
        AccountService { cookies, local }
    }

    /// Email from the `userEmail` cookie, if a shopper is logged in.
    pub fn current_email(&self) -> Option<String> {
        self.cookies
            .get(keys::USER_EMAIL)
            .filter(|email| !email.trim().is_empty())
    }

    pub fn is_logged_in(&self) -> bool {
        self.current_email().is_some()
    }

    fn require_login(&self) -> StorefrontResult<String> {
        self.current_email().ok_or(StorefrontError::NotLoggedIn)
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Loads the profile, creating the placeholder profile for a shopper
    /// who logged in without saved details.
    pub fn profile(&self) -> StorefrontResult<UserProfile> {
        let email = self.require_login()?;
        let mut profile: UserProfile = read_json_or_default(self.local.as_ref(), keys::USER_DATA)?;

        if profile.adopt_login(&email) {
            debug!(email = %email, "Created placeholder profile for login");
            write_json(self.local.as_ref(), keys::USER_DATA, &profile)?;
        }

        Ok(profile)
    }

    /// Saves the profile form. The avatar is kept.
    pub fn update_profile(&self, update: ProfileUpdate) -> StorefrontResult<UserProfile> {
        update.validate()?;
        let updated = self.profile()?.with_updates(update);
        write_json(self.local.as_ref(), keys::USER_DATA, &updated)?;

        info!(email = %updated.email, "Profile updated");
        Ok(updated)
    }

    /// Stores a new profile picture (as a data URL).
    pub fn set_avatar(
        &self,
        mime_type: &str,
        size_bytes: u64,
        data_url: String,
    ) -> StorefrontResult<UserProfile> {
        validate_avatar(mime_type, size_bytes)?;

        let mut profile = self.profile()?;
        profile.avatar = Some(data_url);
        write_json(self.local.as_ref(), keys::USER_DATA, &profile)?;

        debug!(mime_type, size_bytes, "Profile picture updated");
        Ok(profile)
    }

    /// Checks a password change request.
    ///
    /// There is no credential store; a valid request is only logged.
    pub fn change_password(&self, new_password: &str, confirm_password: &str) -> StorefrontResult<()> {
        let email = self.require_login()?;
        validate_password_change(new_password, confirm_password)?;
        info!(email = %email, "Password change accepted");
        Ok(())
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    pub fn addresses(&self) -> StorefrontResult<AddressBook> {
        self.require_login()?;
        read_json_or_default(self.local.as_ref(), keys::USER_ADDRESSES)
    }

    /// Adds an address, or replaces the one at `edit_index`.
    pub fn save_address(
        &self,
        address: Address,
        edit_index: Option<usize>,
    ) -> StorefrontResult<AddressBook> {
        let mut book = self.addresses()?;
        let index = book.save(address, edit_index)?;
        write_json(self.local.as_ref(), keys::USER_ADDRESSES, &book)?;

        debug!(index, edited = edit_index.is_some(), "Address saved");
        Ok(book)
    }

    pub fn delete_address(&self, index: usize) -> StorefrontResult<AddressBook> {
        let mut book = self.addresses()?;
        book.delete(index)?;
        write_json(self.local.as_ref(), keys::USER_ADDRESSES, &book)?;

        debug!(index, remaining = book.len(), "Address deleted");
        Ok(book)
    }

    // =========================================================================
    // Wishlist & Orders
    // =========================================================================

    pub fn wishlist(&self) -> StorefrontResult<Wishlist> {
        self.require_login()?;
        read_json_or_default(self.local.as_ref(), keys::USER_WISHLIST)
    }

    /// Wishlist products that are still in the catalog.
    pub async fn wishlist_products<C>(&self, catalog: &C) -> StorefrontResult<Vec<CatalogProduct>>
    where
        C: CatalogSource,
    {
        let wishlist = self.wishlist()?;
        if wishlist.is_empty() {
            return Ok(Vec::new());
        }

        let products = catalog.fetch().await?;
        Ok(wishlist.resolve(&Catalog::new(&products)))
    }

    pub fn remove_from_wishlist(&self, id: ProductId) -> StorefrontResult<Wishlist> {
        let mut wishlist = self.wishlist()?;
        wishlist.remove(id)?;
        write_json(self.local.as_ref(), keys::USER_WISHLIST, &wishlist)?;

        debug!(product_id = id, "Removed from wishlist");
        Ok(wishlist)
    }

    /// Order history, as stored.
    pub fn orders(&self) -> StorefrontResult<Vec<Order>> {
        self.require_login()?;
        read_json_or_default(self.local.as_ref(), keys::USER_ORDERS)
    }
}
