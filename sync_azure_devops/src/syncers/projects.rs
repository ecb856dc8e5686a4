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
use crate::resource_types::PROJECT;

const LEVEL: &str = "project";

/// Projects, with read/write entitlements for every well-known namespace.
pub(crate) struct ProjectSyncer {
    api: Arc<dyn DevOpsApi>,
    sync_grant_sources: bool,
}

impl ProjectSyncer {
    pub(crate) fn new(api: Arc<dyn DevOpsApi>, sync_grant_sources: bool) -> Self {
        Self {
            api,
            sync_grant_sources,
        }
    }

    async fn namespaces(&self) -> Result<Vec<SecurityNamespace>> {
        let ids = WellKnownNamespace::ids(&WellKnownNamespace::ALL);
        list_security_namespaces(self.api.as_ref(), &ids)
            .await
            .context("fetching security namespaces")
    }
}

#[async_trait]
impl ResourceSyncer for ProjectSyncer {
    fn resource_type(&self) -> &'static ResourceType {
        &PROJECT
    }

    async fn list(
        &self,
        _parent: Option<&ResourceId>,
        token: Option<&str>,
    ) -> Result<Page<Resource>> {
        let page = self
            .api
            .list_projects(token.map(str::to_owned))
            .await
            .context("listing projects")?;
        Ok(Page::with_token(
            page.items.into_iter().map(Resource::from).collect(),
            page.next_token,
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
            .with_context(|| format!("building grants for project {}", resource.display_name))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use mockall::predicate::eq;
    use uuid::Uuid;

    use super::*;
    use crate::api::MockDevOpsApi;
    use crate::nodes::{
        AccessControlEntry, AccessControlList, GraphUser, TeamProjectReference, UserEntitlement,
    };

    fn namespace(id: Uuid) -> SecurityNamespace {
        SecurityNamespace {
            namespace_id: id,
            name: WellKnownNamespace::from_id(&id)
                .map(|ns| format!("{ns:?}"))
                .unwrap_or_default(),
            read_permission: Some(1),
            write_permission: Some(2),
            system_bit_mask: Some(3),
            ..Default::default()
        }
    }

    fn api_with_namespaces() -> MockDevOpsApi {
        let mut api = MockDevOpsApi::new();
        api.expect_query_security_namespaces()
            .times(WellKnownNamespace::ALL.len())
            .returning(|id| Ok(id.map(namespace).into_iter().collect()));
        api
    }

    fn fabrikam() -> Resource {
        Resource::from(TeamProjectReference {
            id: "p1".to_owned(),
            name: "Fabrikam".to_owned(),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn every_well_known_namespace_gets_a_read_write_pair() -> Result<()> {
        let syncer = ProjectSyncer::new(Arc::new(api_with_namespaces()), false);
        let ents = syncer.entitlements(&fabrikam()).await?;
        assert_eq!(ents.len(), 2 * WellKnownNamespace::ALL.len());
        assert!(ents.iter().any(|e| e.slug == "Fabrikam_Build_write"));
        assert!(ents.iter().any(|e| e.slug == "Fabrikam_GitRepositories_read"));
        Ok(())
    }

    #[tokio::test]
    async fn grants_read_the_acl_of_each_namespace() -> Result<()> {
        let mut api = api_with_namespaces();
        api.expect_list_user_entitlements().returning(|_| {
            Ok(Page::last(vec![UserEntitlement {
                user: Some(GraphUser {
                    principal_name: Some("jane@example.com".to_owned()),
                    descriptor: Some("aad.jane".to_owned()),
                    ..Default::default()
                }),
                ..Default::default()
            }]))
        });
        api.expect_list_teams().returning(|| Ok(vec![]));
        api.expect_query_access_control_lists()
            .with(
                eq(WellKnownNamespace::Build.id()),
                eq(Some("p1".to_owned())),
            )
            .times(1)
            .returning(|_, _| {
                let ace = AccessControlEntry {
                    descriptor: r"org\jane@example.com".to_owned(),
                    allow: Some(1),
                    ..Default::default()
                };
                Ok(vec![AccessControlList {
                    aces_dictionary: BTreeMap::from([(ace.descriptor.clone(), ace)]),
                    ..Default::default()
                }])
            });
        api.expect_query_access_control_lists()
            .returning(|_, _| Ok(vec![]));

        let syncer = ProjectSyncer::new(Arc::new(api), false);
        let grants = syncer.grants(&fabrikam()).await?;

        let slugs: Vec<_> = grants.iter().map(|g| g.entitlement.slug.as_str()).collect();
        assert_eq!(slugs, vec!["Fabrikam_Build_read", "Fabrikam_Build_write"]);
        Ok(())
    }
}
