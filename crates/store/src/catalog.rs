//! Read-only service catalog.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use domain::Service;
use tokio::sync::RwLock;

use crate::error::Result;

/// Read side of the service catalog.
///
/// The admin surface that maintains catalog entries is a separate
/// system; order placement and the storefront only ever read. Listings
/// exclude disabled services, while `get` returns the raw record so the
/// caller can reject disabled services explicitly.
#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    /// Returns the category names that have at least one enabled service.
    async fn list_categories(&self) -> Result<Vec<String>>;

    /// Returns the enabled services in a category.
    async fn services_in_category(&self, category: &str) -> Result<Vec<Service>>;

    /// Returns all enabled services.
    async fn list_services(&self) -> Result<Vec<Service>>;

    /// Looks up a service by its provider-side id, enabled or not.
    async fn get(&self, provider_service_id: u32) -> Result<Option<Service>>;
}

/// In-memory service catalog.
#[derive(Debug, Clone, Default)]
pub struct InMemoryServiceCatalog {
    services: Arc<RwLock<HashMap<u32, Service>>>,
}

impl InMemoryServiceCatalog {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a catalog entry.
    pub async fn upsert(&self, service: Service) {
        self.services
            .write()
            .await
            .insert(service.provider_service_id, service);
    }
}

#[async_trait]
impl ServiceCatalog for InMemoryServiceCatalog {
    async fn list_categories(&self) -> Result<Vec<String>> {
        let services = self.services.read().await;
        let mut categories: Vec<String> = services
            .values()
            .filter(|s| s.enabled)
            .map(|s| s.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    async fn services_in_category(&self, category: &str) -> Result<Vec<Service>> {
        let services = self.services.read().await;
        let mut matching: Vec<Service> = services
            .values()
            .filter(|s| s.enabled && s.category == category)
            .cloned()
            .collect();
        matching.sort_by_key(|s| s.provider_service_id);
        Ok(matching)
    }

    async fn list_services(&self) -> Result<Vec<Service>> {
        let services = self.services.read().await;
        let mut enabled: Vec<Service> = services.values().filter(|s| s.enabled).cloned().collect();
        enabled.sort_by_key(|s| s.provider_service_id);
        Ok(enabled)
    }

    async fn get(&self, provider_service_id: u32) -> Result<Option<Service>> {
        Ok(self.services.read().await.get(&provider_service_id).cloned())
    }
}
