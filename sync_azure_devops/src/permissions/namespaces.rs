use sync_core::logging::warn;
use uuid::{uuid, Uuid};

use crate::api::DevOpsApi;
use crate::nodes::{ActionDefinition, SecurityNamespace};
use crate::rest::ApiError;

/// Namespaces whose ACLs are keyed by project or repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum WellKnownNamespace {
    Project,
    Tagging,
    VersionControlItems,
    AnalyticsViews,
    Build,
    GitRepositories,
    MetaTask,
    ReleaseManagement,
}

impl WellKnownNamespace {
    pub(crate) const ALL: [WellKnownNamespace; 8] = [
        WellKnownNamespace::Project,
        WellKnownNamespace::Tagging,
        WellKnownNamespace::VersionControlItems,
        WellKnownNamespace::AnalyticsViews,
        WellKnownNamespace::Build,
        WellKnownNamespace::GitRepositories,
        WellKnownNamespace::MetaTask,
        WellKnownNamespace::ReleaseManagement,
    ];

    pub(crate) const fn id(self) -> Uuid {
        match self {
            WellKnownNamespace::Project => uuid!("52d39943-cb85-4d7f-8fa8-c6baac873819"),
            WellKnownNamespace::Tagging => uuid!("bb50f182-8e5e-40b8-bc21-e8752a1e7ae2"),
            WellKnownNamespace::VersionControlItems => {
                uuid!("a39371cf-0841-4c16-bbd3-276e341bc052")
            }
            WellKnownNamespace::AnalyticsViews => uuid!("d34d3680-dfe5-4cc6-a949-7d9c68f73cba"),
            WellKnownNamespace::Build => uuid!("33344d9c-fc72-4d6f-aba5-fa317101a7e9"),
            WellKnownNamespace::GitRepositories => uuid!("2e9eb7ed-3c0a-47d4-87c1-0ffdd275fd87"),
            WellKnownNamespace::MetaTask => uuid!("f6a4de49-dbe2-4704-86dc-f8ec1a294436"),
            WellKnownNamespace::ReleaseManagement => {
                uuid!("c788c23e-1b46-4162-8f5e-d7585343b5de")
            }
        }
    }

    pub(crate) fn from_id(id: &Uuid) -> Option<Self> {
        Self::ALL.into_iter().find(|ns| ns.id() == *id)
    }

    /// String ids of the given namespaces.
    pub(crate) fn ids(namespaces: &[WellKnownNamespace]) -> Vec<String> {
        namespaces.iter().map(|ns| ns.id().to_string()).collect()
    }
}

/// Fetch descriptions for `namespace_ids`, or for every namespace when the
/// list is empty. Ids that aren't UUIDs are logged and skipped.
pub(crate) async fn list_security_namespaces(
    api: &dyn DevOpsApi,
    namespace_ids: &[String],
) -> Result<Vec<SecurityNamespace>, ApiError> {
    if namespace_ids.is_empty() {
        return api.query_security_namespaces(None).await;
    }

    let mut namespaces = vec![];
    for raw in namespace_ids {
        let id = match Uuid::parse_str(raw) {
            Ok(id) => id,
            Err(e) => {
                warn!("skipping malformed security namespace id {raw:?}: {e}");
                continue;
            }
        };
        namespaces.extend(api.query_security_namespaces(Some(id)).await?);
    }
    Ok(namespaces)
}

/// The actions of one namespace, empty if the namespace is unknown.
pub(crate) async fn list_actions(
    api: &dyn DevOpsApi,
    namespace_id: Uuid,
) -> Result<Vec<ActionDefinition>, ApiError> {
    Ok(api
        .query_security_namespaces(Some(namespace_id))
        .await?
        .into_iter()
        .next()
        .map(|ns| ns.actions)
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::api::MockDevOpsApi;

    fn namespace(id: Uuid, name: &str) -> SecurityNamespace {
        SecurityNamespace {
            namespace_id: id,
            name: name.to_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn well_known_ids_round_trip() {
        for ns in WellKnownNamespace::ALL {
            assert_eq!(WellKnownNamespace::from_id(&ns.id()), Some(ns));
        }
        assert_eq!(WellKnownNamespace::from_id(&Uuid::nil()), None);
    }

    #[tokio::test]
    async fn malformed_ids_are_skipped() {
        let build = WellKnownNamespace::Build.id();
        let mut api = MockDevOpsApi::new();
        api.expect_query_security_namespaces()
            .with(eq(Some(build)))
            .times(1)
            .returning(move |_| Ok(vec![namespace(build, "Build")]));

        let ids = vec!["not-a-uuid".to_owned(), build.to_string()];
        let namespaces = list_security_namespaces(&api, &ids).await.unwrap();
        assert_eq!(namespaces.len(), 1);
        assert_eq!(namespaces[0].name, "Build");
    }

    #[tokio::test]
    async fn empty_list_fetches_everything() {
        let mut api = MockDevOpsApi::new();
        api.expect_query_security_namespaces()
            .with(eq(None::<Uuid>))
            .times(1)
            .returning(|_| {
                Ok(vec![
                    namespace(WellKnownNamespace::Project.id(), "Project"),
                    namespace(WellKnownNamespace::Tagging.id(), "Tagging"),
                ])
            });

        let namespaces = list_security_namespaces(&api, &[]).await.unwrap();
        assert_eq!(namespaces.len(), 2);
    }

    #[tokio::test]
    async fn transport_errors_propagate() {
        let mut api = MockDevOpsApi::new();
        api.expect_query_security_namespaces().returning(|_| {
            Err(ApiError::Status {
                status: 401,
                url: "x".to_owned(),
                body: "".to_owned(),
            })
        });

        let ids = WellKnownNamespace::ids(&WellKnownNamespace::ALL);
        let err = list_security_namespaces(&api, &ids).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 401, .. }));
    }

    #[tokio::test]
    async fn actions_of_unknown_namespace_are_empty() {
        let mut api = MockDevOpsApi::new();
        api.expect_query_security_namespaces()
            .returning(|_| Ok(vec![]));
        assert!(list_actions(&api, Uuid::nil()).await.unwrap().is_empty());
    }
}
