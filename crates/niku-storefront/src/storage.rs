//! # Storage
//!
//! The storefront keeps its state in two browser places: cookies (the cart
//! and the login email) and local storage (account documents, saved
//! checkout forms). Both are string key/value stores behind one trait.
//!
//! ## Keys
//! ```text
//! ┌──────────────────┬───────────────┬──────────────────────────────────────┐
//! │ key              │ where         │ written by                           │
//! ├──────────────────┼───────────────┼──────────────────────────────────────┤
//! │ cart             │ cookie        │ shop pages; cleared on place order   │
//! │ userEmail        │ cookie        │ login page                           │
//! │ checkoutData     │ local storage │ checkout wizard                      │
//! │ userData         │ local storage │ account page                         │
//! │ userAddresses    │ local storage │ account page                         │
//! │ userWishlist     │ local storage │ shop pages, account page             │
//! │ userOrders       │ local storage │ order history                        │
//! └──────────────────┴───────────────┴──────────────────────────────────────┘
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{StorefrontError, StorefrontResult};

/// Storage key names.
pub mod keys {
    pub const CART: &str = "cart";
    pub const USER_EMAIL: &str = "userEmail";
    pub const CHECKOUT_DATA: &str = "checkoutData";
    pub const USER_DATA: &str = "userData";
    pub const USER_ADDRESSES: &str = "userAddresses";
    pub const USER_WISHLIST: &str = "userWishlist";
    pub const USER_ORDERS: &str = "userOrders";
}

// =============================================================================
// Key/Value Store
// =============================================================================

/// A string key/value store (a cookie jar or local storage).
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: String);

    /// Deletes `key`. Deleting a missing key is a no-op.
    fn remove(&self, key: &str);
}

/// In-memory store, the stand-in for local storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        MemoryStore {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
    }
}

// =============================================================================
// Cookie Jar
// =============================================================================

/// Cookies parsed from a `Cookie` header (`document.cookie`).
///
/// Values are percent-decoded on read and percent-encoded again by
/// [`CookieJar::to_header`].
#[derive(Debug, Default)]
pub struct CookieJar {
    cookies: RwLock<BTreeMap<String, String>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `name=value; other=value`.
    ///
    /// Pairs without `=` are skipped. A value that does not decode is kept
    /// as sent.
    ///
    /// ## Example
    /// ```rust
    /// use niku_storefront::storage::{CookieJar, KeyValueStore};
    ///
    /// let jar = CookieJar::from_header("theme=dark; cart=%5B%7B%22id%22%3A1%7D%5D");
    /// assert_eq!(jar.get("cart").as_deref(), Some(r#"[{"id":1}]"#));
    /// ```
    pub fn from_header(header: &str) -> Self {
        let cookies = header
            .split(';')
            .filter_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                let value = urlencoding::decode(value)
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or_else(|_| value.to_string());
                Some((name.to_string(), value))
            })
            .collect();

        CookieJar {
            cookies: RwLock::new(cookies),
        }
    }

    /// Serializes the jar back to a `Cookie` header value.
    pub fn to_header(&self) -> String {
        let cookies = self.cookies.read().unwrap_or_else(PoisonError::into_inner);
        cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl KeyValueStore for CookieJar {
    fn get(&self, key: &str) -> Option<String> {
        let cookies = self.cookies.read().unwrap_or_else(PoisonError::into_inner);
        cookies.get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        let mut cookies = self.cookies.write().unwrap_or_else(PoisonError::into_inner);
        cookies.insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        let mut cookies = self.cookies.write().unwrap_or_else(PoisonError::into_inner);
        cookies.remove(key);
    }
}

// =============================================================================
// JSON Documents
// =============================================================================

/// Reads a JSON document. Missing or blank values read as `None`.
pub fn read_json<T>(store: &dyn KeyValueStore, key: &str) -> StorefrontResult<Option<T>>
where
    T: DeserializeOwned,
{
    let Some(raw) = store.get(key) else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| StorefrontError::InvalidStoredValue {
            key: key.to_string(),
            reason: e.to_string(),
        })
}

/// Reads a JSON document, falling back to the type's default when absent.
pub fn read_json_or_default<T>(store: &dyn KeyValueStore, key: &str) -> StorefrontResult<T>
where
    T: DeserializeOwned + Default,
{
    Ok(read_json(store, key)?.unwrap_or_default())
}

/// Writes a JSON document.
pub fn write_json<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> StorefrontResult<()>
where
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|e| StorefrontError::InvalidStoredValue {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    store.set(key, raw);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.get("cart"), None);

        store.set("cart", "[]".to_string());
        assert_eq!(store.get("cart").as_deref(), Some("[]"));

        store.remove("cart");
        store.remove("cart");
        assert_eq!(store.get("cart"), None);
    }

    #[test]
    fn test_cookie_header_parsing() {
        let jar = CookieJar::from_header(
            " userEmail=siti%40example.com;cart=%5B%5D; broken; =nameless; bad=%E0%A4%A",
        );

        assert_eq!(jar.get("userEmail").as_deref(), Some("siti@example.com"));
        assert_eq!(jar.get("cart").as_deref(), Some("[]"));
        assert_eq!(jar.get("broken"), None);
        assert_eq!(jar.get("bad").as_deref(), Some("%E0%A4%A"));
    }

    #[test]
    fn test_cookie_header_roundtrip() {
        let jar = CookieJar::new();
        jar.set("cart", r#"[{"id":1,"size":"M"}]"#.to_string());
        jar.set("userEmail", "siti@example.com".to_string());

        let header = jar.to_header();
        assert!(header.starts_with("cart=%5B%7B%22id%22"));
        assert!(header.contains("; userEmail=siti%40example.com"));

        let parsed = CookieJar::from_header(&header);
        assert_eq!(parsed.get("cart"), jar.get("cart"));
    }

    #[test]
    fn test_json_documents() {
        let store = MemoryStore::with_entries([("userWishlist", "[1, 2]"), ("blank", "  ")]);

        let wishlist: Option<Vec<i64>> = read_json(&store, keys::USER_WISHLIST).unwrap();
        assert_eq!(wishlist, Some(vec![1, 2]));

        let blank: Option<Vec<i64>> = read_json(&store, "blank").unwrap();
        assert_eq!(blank, None);

        let missing: Vec<i64> = read_json_or_default(&store, keys::USER_ORDERS).unwrap();
        assert!(missing.is_empty());

        write_json(&store, keys::USER_WISHLIST, &vec![3]).unwrap();
        assert_eq!(store.get(keys::USER_WISHLIST).as_deref(), Some("[3]"));
    }

    #[test]
    fn test_corrupt_document() {
        let store = MemoryStore::with_entries([("userData", "{not json")]);
        let err = read_json::<serde_json::Value>(&store, keys::USER_DATA).unwrap_err();
        assert!(matches!(err, StorefrontError::InvalidStoredValue { ref key, .. } if key == "userData"));
    }
}
