//! # Catalog Sources
//!
//! Where the product list comes from. The pages fetch `products.json`; the
//! session only needs "give me the products", so the source is a trait.

use std::future::Future;
use std::path::{Path, PathBuf};

use niku_core::CatalogProduct;
use tracing::debug;

use crate::config::StorefrontConfig;
use crate::error::{StorefrontError, StorefrontResult};

/// Supplies the product catalog.
pub trait CatalogSource: Send + Sync {
    /// Fetches every catalog record.
    fn fetch(&self) -> impl Future<Output = StorefrontResult<Vec<CatalogProduct>>> + Send;
}

// =============================================================================
// JSON File
// =============================================================================

/// Reads the catalog from a JSON array document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileCatalog { path: path.into() }
    }

    /// Uses the `[catalog] path` setting.
    pub fn from_config(config: &StorefrontConfig) -> Self {
        JsonFileCatalog::new(config.catalog.path.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for JsonFileCatalog {
    async fn fetch(&self) -> StorefrontResult<Vec<CatalogProduct>> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            StorefrontError::CatalogUnavailable(format!("{}: {}", self.path.display(), e))
        })?;

        let products: Vec<CatalogProduct> = serde_json::from_str(&contents)
            .map_err(|e| StorefrontError::CatalogMalformed(e.to_string()))?;

        debug!(path = ?self.path, count = products.len(), "Catalog loaded");
        Ok(products)
    }
}

// =============================================================================
// Static
// =============================================================================

/// A fixed product list.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    products: Vec<CatalogProduct>,
}

impl StaticCatalog {
    pub fn new(products: Vec<CatalogProduct>) -> Self {
        StaticCatalog { products }
    }
}

impl CatalogSource for StaticCatalog {
    async fn fetch(&self) -> StorefrontResult<Vec<CatalogProduct>> {
        Ok(self.products.clone())
    }
}
