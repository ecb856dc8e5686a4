use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sync_core::connectors::nodes::{
    Entitlement, Grant, MutationOutcome, Page, Resource, ResourceId, ResourceType,
};
use sync_core::connectors::{ResourceProvisioner, ResourceSyncer};
use sync_core::logging::debug;

use super::{ensure_member_slug, MEMBER};
use crate::api::{DevOpsApi, IdentityQuery};
use crate::nodes::Identity;
use crate::resource_types::{GROUP, USER};
use crate::rest::ApiError;
use crate::write::{add_member, remove_member};

/// Security groups. The groups backing teams are left to [`super::TeamSyncer`].
pub(crate) struct GroupSyncer {
    api: Arc<dyn DevOpsApi>,
}

impl GroupSyncer {
    pub(crate) fn new(api: Arc<dyn DevOpsApi>) -> Self {
        Self { api }
    }

    /// Identities for `ids`. An unknown id yields nothing rather than an
    /// error.
    async fn identities(&self, ids: Vec<String>) -> Result<Vec<Identity>, ApiError> {
        match self.api.read_identities(IdentityQuery::ByIds(ids)).await {
            Err(ApiError::NotFound { url }) => {
                debug!("no identities at {url}");
                Ok(vec![])
            }
            other => other,
        }
    }
}

fn member_entitlement(resource: &Resource) -> Entitlement {
    Entitlement::new(&resource.id, MEMBER)
        .with_display_name(format!("{} Group {MEMBER}", resource.display_name))
        .with_description(format!(
            "Access to {} group in Azure DevOps",
            resource.display_name
        ))
        .grantable_to(&[&USER, &GROUP])
}

#[async_trait]
impl ResourceSyncer for GroupSyncer {
    fn resource_type(&self) -> &'static ResourceType {
        &GROUP
    }

    async fn list(
        &self,
        _parent: Option<&ResourceId>,
        token: Option<&str>,
    ) -> Result<Page<Resource>> {
        let page = self
            .api
            .list_groups(token.map(str::to_owned))
            .await
            .context("listing groups")?;
        let team_ids: HashSet<String> = self
            .api
            .list_teams()
            .await
            .context("listing teams")?
            .into_iter()
            .map(|t| t.id)
            .collect();

        let groups = page
            .items
            .into_iter()
            .filter(|g| {
                g.origin_id
                    .as_deref()
                    .is_some_and(|origin| !origin.is_empty() && !team_ids.contains(origin))
            })
            .map(Resource::from)
            .collect();
        Ok(Page::with_token(groups, page.next_token))
    }

    async fn entitlements(&self, resource: &Resource) -> Result<Vec<Entitlement>> {
        Ok(vec![member_entitlement(resource)])
    }

    async fn grants(&self, resource: &Resource) -> Result<Vec<Grant>> {
        let context = || format!("reading members of group {}", resource.display_name);
        let member_ids: Vec<String> = self
            .identities(vec![resource.id.resource.clone()])
            .await
            .with_context(context)?
            .into_iter()
            .flat_map(|identity| identity.member_ids)
            .collect();
        if member_ids.is_empty() {
            return Ok(vec![]);
        }

        let entitlement = member_entitlement(resource);
        let mut grants = vec![];
        for member in self.identities(member_ids).await.with_context(context)? {
            let principal = match member.schema_class_name() {
                Some("User") => match &member.subject_descriptor {
                    Some(descriptor) => ResourceId::new(USER.id, descriptor),
                    None => continue,
                },
                Some("Group") => ResourceId::new(GROUP.id, &member.id),
                _ => continue,
            };
            grants.push(Grant::new(&entitlement, principal));
        }
        Ok(grants)
    }
}

#[async_trait]
impl ResourceProvisioner for GroupSyncer {
    async fn grant(
        &self,
        principal: &Resource,
        entitlement: &Entitlement,
    ) -> Result<MutationOutcome> {
        ensure_member_slug(&entitlement.slug, GROUP.id)?;
        add_member(
            self.api.as_ref(),
            &entitlement.resource.resource,
            &principal.id.resource,
        )
        .await
        .with_context(|| format!("adding {} to group {}", principal.id, entitlement.resource))
    }

    async fn revoke(&self, grant: &Grant) -> Result<MutationOutcome> {
        ensure_member_slug(&grant.entitlement.slug, GROUP.id)?;
        remove_member(
            self.api.as_ref(),
            &grant.entitlement.resource.resource,
            &grant.principal.resource,
        )
        .await
        .with_context(|| {
            format!(
                "removing {} from group {}",
                grant.principal, grant.entitlement.resource
            )
        })
    }
}
