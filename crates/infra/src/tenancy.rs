//! Multi-tenant client registry
//!
//! Maps organization codes to independently configured clients. Lookups
//! and registration are safe from concurrent tasks.

use std::sync::Arc;

use dashmap::DashMap;
use prophy_common::error::{SdkError, SdkResult};
use prophy_domain::ProphyConfig;
use tracing::info;

use crate::client::ProphyClient;

#[derive(Debug, Default)]
pub struct TenantRegistry {
    clients: DashMap<String, Arc<ProphyClient>>,
}

impl TenantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and register a client for `config.organization_code`
    ///
    /// Replaces any client already registered for that organization.
    ///
    /// # Errors
    /// `InvalidArgument` when the configuration does not validate.
    pub fn register(&self, config: ProphyConfig) -> SdkResult<Arc<ProphyClient>> {
        let client = Arc::new(ProphyClient::new(config)?);
        self.insert(Arc::clone(&client));
        Ok(client)
    }

    /// Register an already-built client
    pub fn insert(&self, client: Arc<ProphyClient>) {
        let organization = client.organization_code().to_string();
        let replaced = self.clients.insert(organization.clone(), client).is_some();
        info!(%organization, replaced, "tenant registered");
    }

    /// # Errors
    /// `InvalidOperation` when the organization is not registered.
    pub fn get(&self, organization_code: &str) -> SdkResult<Arc<ProphyClient>> {
        self.clients
            .get(organization_code)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| {
                SdkError::invalid_operation(format!("no client registered for organization '{organization_code}'"))
            })
    }

    pub fn contains(&self, organization_code: &str) -> bool {
        self.clients.contains_key(organization_code)
    }

    /// Unregister a tenant, returning its client
    pub fn remove(&self, organization_code: &str) -> Option<Arc<ProphyClient>> {
        let removed = self.clients.remove(organization_code).map(|(_, client)| client);
        if removed.is_some() {
            info!(organization = organization_code, "tenant removed");
        }
        removed
    }

    /// Registered organization codes, sorted
    pub fn organizations(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.clients.iter().map(|entry| entry.key().clone()).collect();
        codes.sort();
        codes
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
