//! Connector contract
//!
//! Connectors expose their data as resources of a handful of types, each
//! served by a [`ResourceSyncer`]. Resource types that accept writes also
//! implement [`ResourceProvisioner`].

pub mod collect;
pub mod nodes;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::{ConnectorConfig, CredentialsMap};
use nodes::{
    AccountInfo, ConnectorData, ConnectorMetadata, Entitlement, Grant, MutationOutcome, Page,
    Resource, ResourceId, ResourceType,
};

/// The trait all connectors are expected to implement.
#[async_trait]
pub trait Connector {
    /// Instantiate a Connector from configuration.
    fn new(config: &ConnectorConfig, credentials: &CredentialsMap) -> Result<Box<Self>>;
    /// Check if the Connector is properly set up and return the connection
    /// status (true for connected, false for not).
    async fn check(&self) -> bool;
    /// Static description of the connector and its account-creation schema.
    fn metadata(&self) -> ConnectorMetadata;
    /// Walk every resource type and return the full picture.
    async fn get_data(&self) -> ConnectorData;
    /// Give `principal` the given entitlement.
    async fn grant(&self, principal: &Resource, entitlement: &Entitlement)
        -> Result<MutationOutcome>;
    /// Take away an existing grant.
    async fn revoke(&self, grant: &Grant) -> Result<MutationOutcome>;
    /// Create a new account in the platform.
    async fn create_account(&self, account: &AccountInfo) -> Result<Resource>;
}

/// Lists resources, entitlements and grants for one resource type.
#[async_trait]
pub trait ResourceSyncer: Send + Sync {
    /// The type served by this syncer.
    fn resource_type(&self) -> &'static ResourceType;

    /// One page of resources. `parent` is set when listing children of
    /// another resource.
    async fn list(&self, parent: Option<&ResourceId>, token: Option<&str>)
        -> Result<Page<Resource>>;

    /// The entitlements offered by `resource`.
    async fn entitlements(&self, resource: &Resource) -> Result<Vec<Entitlement>>;

    /// The grants currently held on `resource`.
    async fn grants(&self, resource: &Resource) -> Result<Vec<Grant>>;
}

/// Membership writes for resource types that support them.
#[async_trait]
pub trait ResourceProvisioner: Send + Sync {
    /// Grant `entitlement` to `principal`.
    async fn grant(&self, principal: &Resource, entitlement: &Entitlement)
        -> Result<MutationOutcome>;

    /// Remove `grant`.
    async fn revoke(&self, grant: &Grant) -> Result<MutationOutcome>;
}

/// Account provisioning.
#[async_trait]
pub trait AccountManager: Send + Sync {
    /// Create an account described by `account` and return the new user.
    async fn create_account(&self, account: &AccountInfo) -> Result<Resource>;
}
