use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sync_core::connectors::nodes::{
    Entitlement, Grant, MutationOutcome, Page, Resource, ResourceId, ResourceType,
};
use sync_core::connectors::{ResourceProvisioner, ResourceSyncer};

use super::{ensure_member_slug, MEMBER};
use crate::api::DevOpsApi;
use crate::nodes::TeamMember;
use crate::resource_types::{GROUP, TEAM, USER};
use crate::write::{add_member, remove_member};

const ADMIN: &str = "admin";

/// Project teams. Members are users or groups; admins are read-only.
pub(crate) struct TeamSyncer {
    api: Arc<dyn DevOpsApi>,
}

impl TeamSyncer {
    pub(crate) fn new(api: Arc<dyn DevOpsApi>) -> Self {
        Self { api }
    }
}

fn team_entitlement(resource: &Resource, slug: &str) -> Entitlement {
    Entitlement::new(&resource.id, slug)
        .with_display_name(format!("{} Team {slug}", resource.display_name))
        .with_description(format!(
            "{} membership type {slug}",
            resource.display_name
        ))
        .grantable_to(&[&USER])
}

/// Container identities are groups keyed by id, everything else a user keyed
/// by descriptor.
fn member_principal(member: &TeamMember) -> ResourceId {
    let identity = &member.identity;
    if identity.is_container.unwrap_or(false) {
        ResourceId::new(GROUP.id, &identity.id)
    } else {
        ResourceId::new(USER.id, &identity.descriptor)
    }
}

#[async_trait]
impl ResourceSyncer for TeamSyncer {
    fn resource_type(&self) -> &'static ResourceType {
        &TEAM
    }

    async fn list(
        &self,
        _parent: Option<&ResourceId>,
        _token: Option<&str>,
    ) -> Result<Page<Resource>> {
        let teams = self.api.list_teams().await.context("listing teams")?;
        Ok(Page::last(teams.into_iter().map(Resource::from).collect()))
    }

    async fn entitlements(&self, resource: &Resource) -> Result<Vec<Entitlement>> {
        Ok(vec![
            team_entitlement(resource, MEMBER),
            team_entitlement(resource, ADMIN),
        ])
    }

    /// One grant per team member: `admin` for team admins, `member` for
    /// everyone else.
    async fn grants(&self, resource: &Resource) -> Result<Vec<Grant>> {
        let Some(project) = &resource.parent_resource_id else {
            return Ok(vec![]);
        };
        let members = self
            .api
            .list_team_members(&project.resource, &resource.id.resource)
            .await
            .with_context(|| format!("listing members of team {}", resource.display_name))?;

        let member = team_entitlement(resource, MEMBER);
        let admin = team_entitlement(resource, ADMIN);
        let mut grants = vec![];
        for m in &members {
            let principal = member_principal(m);
            if m.is_team_admin.unwrap_or(false) {
                grants.push(Grant::new(&admin, principal).immutable());
            } else {
                grants.push(Grant::new(&member, principal));
            }
        }
        Ok(grants)
    }
}

#[async_trait]
impl ResourceProvisioner for TeamSyncer {
    async fn grant(
        &self,
        principal: &Resource,
        entitlement: &Entitlement,
    ) -> Result<MutationOutcome> {
        ensure_member_slug(&entitlement.slug, TEAM.id)?;
        add_member(
            self.api.as_ref(),
            &entitlement.resource.resource,
            &principal.id.resource,
        )
        .await
        .with_context(|| format!("adding {} to team {}", principal.id, entitlement.resource))
    }

    async fn revoke(&self, grant: &Grant) -> Result<MutationOutcome> {
        ensure_member_slug(&grant.entitlement.slug, TEAM.id)?;
        remove_member(
            self.api.as_ref(),
            &grant.entitlement.resource.resource,
            &grant.principal.resource,
        )
        .await
        .with_context(|| {
            format!(
                "removing {} from team {}",
                grant.principal, grant.entitlement.resource
            )
        })
    }
}
