//! Azure DevOps Connector
//!
//! Syncs users, projects, repositories, teams, groups and security
//! namespaces, resolves security-namespace ACLs into grants, and manages
//! team and group membership.

mod api;
mod consts;
mod creds;
mod nodes;
mod permissions;
mod resource_types;
mod rest;
mod syncers;
mod write;

pub use api::{DevOpsApi, IdentityQuery};
pub use rest::{ApiError, AzureDevOpsRestClient, AzureDevOpsRestConfig};

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use sync_core::config::{ConnectorConfig, CredentialsMap};
use sync_core::connectors::collect::collect;
use sync_core::connectors::nodes::{
    AccountField, AccountInfo, ConnectorData, ConnectorMetadata, Entitlement, Grant,
    MutationOutcome, Resource,
};
use sync_core::connectors::{AccountManager, ResourceProvisioner, ResourceSyncer};
use sync_core::{log_runtime, Connector};

use creds::AzureDevOpsCredentials;
use resource_types::{GROUP, TEAM};
use syncers::{
    GroupSyncer, ProjectSyncer, RepositorySyncer, SecurityNamespaceSyncer, TeamSyncer, UserSyncer,
};

/// Main connector implementation.
pub struct AzureDevOpsConnector {
    client: Arc<dyn DevOpsApi>,
    sync_grant_sources: bool,
}

/// Read an optional boolean flag. Missing means false.
fn flag(credentials: &CredentialsMap, config: &ConnectorConfig, key: &str) -> Result<bool> {
    match credentials.get(key).or_else(|| config.config.get(key)) {
        None => Ok(false),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| anyhow!("{key} must be \"true\" or \"false\", got {v:?}")),
    }
}

impl AzureDevOpsConnector {
    /// Build a connector over any implementation of the platform API.
    pub fn with_api(client: Arc<dyn DevOpsApi>, sync_grant_sources: bool) -> Self {
        Self {
            client,
            sync_grant_sources,
        }
    }

    fn syncers(&self) -> Vec<Box<dyn ResourceSyncer>> {
        let api = &self.client;
        vec![
            Box::new(UserSyncer::new(api.clone())),
            Box::new(ProjectSyncer::new(api.clone(), self.sync_grant_sources)),
            Box::new(TeamSyncer::new(api.clone())),
            Box::new(GroupSyncer::new(api.clone())),
            Box::new(RepositorySyncer::new(api.clone(), self.sync_grant_sources)),
            Box::new(SecurityNamespaceSyncer::new(
                api.clone(),
                self.sync_grant_sources,
            )),
        ]
    }

    /// The syncer that owns memberships of `resource_type`.
    fn provisioner(&self, resource_type: &str) -> Result<Box<dyn ResourceProvisioner>> {
        let api = self.client.clone();
        Ok(match resource_type {
            t if t == TEAM.id => Box::new(TeamSyncer::new(api)),
            t if t == GROUP.id => Box::new(GroupSyncer::new(api)),
            other => bail!("{other} resources don't support grants"),
        })
    }
}

#[async_trait]
impl Connector for AzureDevOpsConnector {
    /// Validates the configs and bootstraps an Azure DevOps client.
    ///
    /// Validates that the required fields are present to authenticate to
    /// Azure DevOps and reads the optional `sync_grant_sources` and
    /// `retry_transient` flags.
    fn new(config: &ConnectorConfig, credentials: &CredentialsMap) -> Result<Box<Self>> {
        let mut creds = AzureDevOpsCredentials::default();
        let mut required_fields = HashSet::from([
            "personal_access_token".to_owned(),
            "organization_url".to_owned(),
        ]);

        for (k, v) in credentials.iter() {
            match k.as_ref() {
                "personal_access_token" => creds.personal_access_token = v.to_string(),
                "organization_url" => creds.organization_url = v.to_string(),
                _ => (),
            }
            required_fields.remove(k);
        }

        if !required_fields.is_empty() {
            let mut missing: Vec<_> = required_fields.into_iter().collect();
            missing.sort();
            return Err(anyhow![
                "Azure DevOps config missing required fields: {:#?}",
                missing
            ]);
        }

        let sync_grant_sources = flag(credentials, config, "sync_grant_sources")?;
        let rest_config = AzureDevOpsRestConfig {
            retry: flag(credentials, config, "retry_transient")?,
        };
        let client = rest::AzureDevOpsRestClient::from_credentials(creds, rest_config)?;

        Ok(Box::new(Self::with_api(Arc::new(client), sync_grant_sources)))
    }

    async fn check(&self) -> bool {
        match self.client.list_projects(None).await {
            Ok(_) => true,
            Err(e) => {
                sync_core::logging::error!("Azure DevOps check failed: {e}");
                false
            }
        }
    }

    fn metadata(&self) -> ConnectorMetadata {
        ConnectorMetadata {
            display_name: "Azure Dev Ops Connector",
            description: "Connector to sync users, security namespaces, projects, teams and groups",
            account_creation_schema: vec![
                AccountField {
                    name: "principal_name",
                    display_name: "Principal Name",
                    description: "The Entra ID principal name of the user (e.g., their email).",
                    placeholder: "user@example.com",
                    required: true,
                },
                AccountField {
                    name: "license_type",
                    display_name: "License Type",
                    description: "The type of license to assign to the user. Must be one of: express, stakeholder, Visual Studio Subscriber.",
                    placeholder: "express",
                    required: true,
                },
            ],
        }
    }

    async fn get_data(&self) -> ConnectorData {
        let syncers = self.syncers();
        log_runtime!("collecting Azure DevOps data", collect(&syncers).await)
    }

    async fn grant(
        &self,
        principal: &Resource,
        entitlement: &Entitlement,
    ) -> Result<MutationOutcome> {
        self.provisioner(&entitlement.resource.resource_type)?
            .grant(principal, entitlement)
            .await
    }

    async fn revoke(&self, grant: &Grant) -> Result<MutationOutcome> {
        self.provisioner(&grant.entitlement.resource.resource_type)?
            .revoke(grant)
            .await
    }

    async fn create_account(&self, account: &AccountInfo) -> Result<Resource> {
        UserSyncer::new(self.client.clone())
            .create_account(account)
            .await
    }
}
