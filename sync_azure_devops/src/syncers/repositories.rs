use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sync_core::connectors::nodes::{Entitlement, Grant, Page, Resource, ResourceId, ResourceType};
use sync_core::connectors::ResourceSyncer;

use crate::api::DevOpsApi;
use crate::nodes::SecurityNamespace;
use crate::permissions::{
    list_security_namespaces, read_write_entitlements, GrantAssembler, WellKnownNamespace,
};
use crate::resource_types::{PROJECT, REPOSITORY};

const LEVEL: &str = "repository";

/// Git repositories, listed per project.
pub(crate) struct RepositorySyncer {
    api: Arc<dyn DevOpsApi>,
    sync_grant_sources: bool,
}

impl RepositorySyncer {
    pub(crate) fn new(api: Arc<dyn DevOpsApi>, sync_grant_sources: bool) -> Self {
        Self {
            api,
            sync_grant_sources,
        }
    }

    async fn namespaces(&self) -> Result<Vec<SecurityNamespace>> {
        let ids = WellKnownNamespace::ids(&[WellKnownNamespace::GitRepositories]);
        list_security_namespaces(self.api.as_ref(), &ids)
            .await
            .context("fetching the git repositories namespace")
    }
}

#[async_trait]
impl ResourceSyncer for RepositorySyncer {
    fn resource_type(&self) -> &'static ResourceType {
        &REPOSITORY
    }

    async fn list(
        &self,
        parent: Option<&ResourceId>,
        _token: Option<&str>,
    ) -> Result<Page<Resource>> {
        let Some(project) = parent.filter(|p| p.resource_type == PROJECT.id) else {
            return Ok(Page::default());
        };
        let repositories = self
            .api
            .list_repositories(&project.resource)
            .await
            .with_context(|| format!("listing repositories of {project}"))?;
        Ok(Page::last(
            repositories
                .into_iter()
                .map(|repo| {
                    let mut resource = Resource::from(repo);
                    if resource.parent_resource_id.is_none() {
                        resource.parent_resource_id = Some(project.clone());
                    }
                    resource
                })
                .collect(),
        ))
    }

    async fn entitlements(&self, resource: &Resource) -> Result<Vec<Entitlement>> {
        let namespaces = self.namespaces().await?;
        Ok(read_write_entitlements(resource, &namespaces, LEVEL))
    }

    async fn grants(&self, resource: &Resource) -> Result<Vec<Grant>> {
        let namespaces = self.namespaces().await?;
        let mut assembler = GrantAssembler::load(self.api.as_ref(), self.sync_grant_sources)
            .await
            .context("loading users and teams")?;
        assembler
            .read_write_grants(resource, &namespaces, LEVEL)
            .await
            .with_context(|| format!("building grants for repository {}", resource.display_name))
    }
}
