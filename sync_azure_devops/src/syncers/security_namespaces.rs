use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sync_core::connectors::nodes::{Entitlement, Grant, Page, Resource, ResourceId, ResourceType};
use sync_core::connectors::ResourceSyncer;
use uuid::Uuid;

use super::project_names;
use crate::api::DevOpsApi;
use crate::permissions::{action_entitlements, list_actions, GrantAssembler};
use crate::resource_types::SECURITY_NAMESPACE;

/// Security namespaces, with allow/deny entitlements per action.
pub(crate) struct SecurityNamespaceSyncer {
    api: Arc<dyn DevOpsApi>,
    sync_grant_sources: bool,
}

impl SecurityNamespaceSyncer {
    pub(crate) fn new(api: Arc<dyn DevOpsApi>, sync_grant_sources: bool) -> Self {
        Self {
            api,
            sync_grant_sources,
        }
    }
}

fn namespace_id(resource: &Resource) -> Result<Uuid> {
    Uuid::parse_str(&resource.id.resource)
        .with_context(|| format!("parsing namespace id {}", resource.id.resource))
}

#[async_trait]
impl ResourceSyncer for SecurityNamespaceSyncer {
    fn resource_type(&self) -> &'static ResourceType {
        &SECURITY_NAMESPACE
    }

    async fn list(
        &self,
        _parent: Option<&ResourceId>,
        _token: Option<&str>,
    ) -> Result<Page<Resource>> {
        let mut seen = HashSet::new();
        let namespaces = self
            .api
            .query_security_namespaces(None)
            .await
            .context("listing security namespaces")?
            .into_iter()
            .filter(|ns| seen.insert(ns.namespace_id))
            .map(Resource::from)
            .collect();
        Ok(Page::last(namespaces))
    }

    async fn entitlements(&self, resource: &Resource) -> Result<Vec<Entitlement>> {
        let id = namespace_id(resource)?;
        let actions = list_actions(self.api.as_ref(), id)
            .await
            .with_context(|| format!("fetching actions of {}", resource.display_name))?;
        let projects = project_names(self.api.as_ref())
            .await
            .context("listing projects")?;
        Ok(action_entitlements(resource, &actions, &projects))
    }

    async fn grants(&self, resource: &Resource) -> Result<Vec<Grant>> {
        let id = namespace_id(resource)?;
        let actions = list_actions(self.api.as_ref(), id)
            .await
            .with_context(|| format!("fetching actions of {}", resource.display_name))?;
        let acls = self
            .api
            .query_access_control_lists(id, None)
            .await
            .with_context(|| format!("fetching ACLs of {}", resource.display_name))?;
        let mut assembler = GrantAssembler::load(self.api.as_ref(), self.sync_grant_sources)
            .await
            .context("loading users and teams")?;
        assembler
            .action_grants(resource, &actions, &acls)
            .await
            .with_context(|| format!("building grants for {}", resource.display_name))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use mockall::predicate::eq;

    use super::*;
    use crate::api::MockDevOpsApi;
    use crate::nodes::{
        AccessControlEntry, AccessControlList, ActionDefinition, GraphUser, SecurityNamespace,
        TeamProjectReference, UserEntitlement,
    };
    use crate::permissions::WellKnownNamespace;

    fn build_namespace() -> SecurityNamespace {
        SecurityNamespace {
            namespace_id: WellKnownNamespace::Build.id(),
            name: "Build".to_owned(),
            actions: vec![ActionDefinition {
                bit: Some(4),
                name: Some("QueueBuilds".to_owned()),
                display_name: Some("Queue builds".to_owned()),
                namespace_id: None,
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn namespaces_are_listed_once() -> Result<()> {
        let mut api = MockDevOpsApi::new();
        api.expect_query_security_namespaces()
            .with(eq(None::<Uuid>))
            .returning(|_| Ok(vec![build_namespace(), build_namespace()]));
        let page = SecurityNamespaceSyncer::new(Arc::new(api), false)
            .list(None, None)
            .await?;
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].display_name, "Build");
        Ok(())
    }

    #[tokio::test]
    async fn entitlements_cover_each_project() -> Result<()> {
        let mut api = MockDevOpsApi::new();
        api.expect_query_security_namespaces()
            .with(eq(Some(WellKnownNamespace::Build.id())))
            .returning(|_| Ok(vec![build_namespace()]));
        api.expect_list_projects().times(1).returning(|_| {
            Ok(Page::last(vec![
                TeamProjectReference {
                    id: "p1".to_owned(),
                    name: "Fabrikam".to_owned(),
                    ..Default::default()
                },
                TeamProjectReference {
                    id: "p2".to_owned(),
                    name: "Contoso".to_owned(),
                    ..Default::default()
                },
            ]))
        });

        let resource = Resource::from(build_namespace());
        let ents = SecurityNamespaceSyncer::new(Arc::new(api), false)
            .entitlements(&resource)
            .await?;
        // org + two projects, allow + deny
        assert_eq!(ents.len(), 6);
        assert!(ents.iter().any(|e| e.slug == "[Contoso]_deny_QueueBuilds"));
        Ok(())
    }

    #[tokio::test]
    async fn grants_come_from_every_acl() -> Result<()> {
        let mut api = MockDevOpsApi::new();
        api.expect_query_security_namespaces()
            .returning(|_| Ok(vec![build_namespace()]));
        api.expect_query_access_control_lists()
            .with(eq(WellKnownNamespace::Build.id()), eq(None::<String>))
            .times(1)
            .returning(|_, _| {
                let acl = |token: &str, allow: i64| {
                    let ace = AccessControlEntry {
                        descriptor: r"org\jane@example.com".to_owned(),
                        allow: Some(allow),
                        ..Default::default()
                    };
                    AccessControlList {
                        token: Some(token.to_owned()),
                        aces_dictionary: BTreeMap::from([(ace.descriptor.clone(), ace)]),
                        ..Default::default()
                    }
                };
                Ok(vec![acl("p1", 4), acl("p2", 4), acl("p3", 1)])
            });
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

        let resource = Resource::from(build_namespace());
        let grants = SecurityNamespaceSyncer::new(Arc::new(api), false)
            .grants(&resource)
            .await?;
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].entitlement.slug, "allow_QueueBuilds");
        assert_eq!(
            grants[0].annotations.v1_identifier.as_deref(),
            Some("allow:33344d9c-fc72-4d6f-aba5-fa317101a7e9:aad.jane:QueueBuilds")
        );
        Ok(())
    }
}
