//! # niku-storefront: Storage, Catalog and Sessions for the Niku Storefront
//!
//! Connects the pure rules in `niku-core` to the shopper's cookies, local
//! storage and the product catalog.
//!
//! ## Module Structure
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        niku-storefront                                  │
//! │                                                                         │
//! │  ┌──────────────────┐     ┌──────────────────┐                          │
//! │  │ session          │     │ account          │  services                │
//! │  │ CheckoutSession  │     │ AccountService   │                          │
//! │  └────────┬─────────┘     └────────┬─────────┘                          │
//! │           │                        │                                    │
//! │  ┌────────▼────────┐  ┌────────────▼─────┐  ┌──────────────────┐        │
//! │  │ storage         │  │ catalog          │  │ config           │        │
//! │  │ cookies / local │  │ products.json    │  │ storefront.toml  │        │
//! │  └─────────────────┘  └──────────────────┘  └──────────────────┘        │
//! │                                                                         │
//! │  error: StorefrontError → { code, message } for the page               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use niku_storefront::catalog::JsonFileCatalog;
//! use niku_storefront::config::StorefrontConfig;
//! use niku_storefront::session::CheckoutSession;
//! use niku_storefront::storage::{CookieJar, MemoryStore};
//!
//! # async fn run() -> niku_storefront::error::StorefrontResult<()> {
//! let config = StorefrontConfig::load_or_default(None);
//! niku_storefront::init_tracing(&config.logging.filter);
//!
//! let cookies = Arc::new(CookieJar::from_header("cart=%5B%7B%22id%22%3A1%7D%5D"));
//! let session = CheckoutSession::from_config(cookies, Arc::new(MemoryStore::new()), &config);
//!
//! let snapshot = session.load(&JsonFileCatalog::from_config(&config)).await?;
//! println!("Grand total: {}", snapshot.totals.grand_total());
//! session.apply_promo("NIKU10")?;
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod catalog;
pub mod config;
pub mod error;
pub mod session;
pub mod storage;

pub use account::AccountService;
pub use catalog::{CatalogSource, JsonFileCatalog, StaticCatalog};
pub use config::StorefrontConfig;
pub use error::{ErrorCode, ErrorResponse, StorefrontError, StorefrontResult};
pub use session::{CheckoutSession, CheckoutSnapshot, OrderConfirmation};
pub use storage::{CookieJar, KeyValueStore, MemoryStore};

use tracing_subscriber::EnvFilter;

/// Log filter used when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "info,niku=debug";

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` takes precedence over `default_filter`. Calling this more
/// than once (or after another subscriber is installed) is a no-op.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
