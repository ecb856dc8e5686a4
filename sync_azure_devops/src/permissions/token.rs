use sync_core::connectors::nodes::Resource;
use uuid::Uuid;

use super::WellKnownNamespace;

/// The parts of a resource that select its ACL.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AclScope<'a> {
    pub(crate) id: &'a str,
    pub(crate) display_name: &'a str,
    pub(crate) parent_project_id: Option<&'a str>,
}

impl<'a> From<&'a Resource> for AclScope<'a> {
    fn from(resource: &'a Resource) -> Self {
        Self {
            id: &resource.id.resource,
            display_name: &resource.display_name,
            parent_project_id: resource
                .parent_resource_id
                .as_ref()
                .map(|p| p.resource.as_str()),
        }
    }
}

/// The security token of `scope` in `namespace_id`. Unknown namespaces have
/// no token and yield an empty string.
pub(crate) fn token_for(namespace_id: &Uuid, scope: &AclScope<'_>) -> String {
    let Some(namespace) = WellKnownNamespace::from_id(namespace_id) else {
        return String::new();
    };
    match namespace {
        WellKnownNamespace::Project => {
            format!("$PROJECT:vstfs:///Classification/TeamProject/{}", scope.id)
        }
        WellKnownNamespace::Tagging => format!("/{}", scope.id),
        WellKnownNamespace::VersionControlItems => format!("$/{}", scope.display_name),
        WellKnownNamespace::AnalyticsViews => format!("$/Shared/{}", scope.id),
        WellKnownNamespace::GitRepositories => match scope.parent_project_id {
            Some(project) => format!("repoV2/{project}/{}", scope.id),
            None => format!("repoV2/{}", scope.id),
        },
        WellKnownNamespace::Build
        | WellKnownNamespace::MetaTask
        | WellKnownNamespace::ReleaseManagement => scope.id.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope<'a>(id: &'a str, parent: Option<&'a str>) -> AclScope<'a> {
        AclScope {
            id,
            display_name: "Fabrikam",
            parent_project_id: parent,
        }
    }

    #[test]
    fn git_token_includes_parent_project() {
        let git = WellKnownNamespace::GitRepositories.id();
        assert_eq!(token_for(&git, &scope("R", Some("P"))), "repoV2/P/R");
        assert_eq!(token_for(&git, &scope("P", None)), "repoV2/P");
    }

    #[test]
    fn build_token_is_the_id() {
        let build = WellKnownNamespace::Build.id();
        assert_eq!(token_for(&build, &scope("R", Some("P"))), "R");
    }

    #[test]
    fn project_scoped_templates() {
        let s = scope("p1", None);
        assert_eq!(
            token_for(&WellKnownNamespace::Project.id(), &s),
            "$PROJECT:vstfs:///Classification/TeamProject/p1"
        );
        assert_eq!(token_for(&WellKnownNamespace::Tagging.id(), &s), "/p1");
        assert_eq!(
            token_for(&WellKnownNamespace::VersionControlItems.id(), &s),
            "$/Fabrikam"
        );
        assert_eq!(
            token_for(&WellKnownNamespace::AnalyticsViews.id(), &s),
            "$/Shared/p1"
        );
        assert_eq!(token_for(&WellKnownNamespace::MetaTask.id(), &s), "p1");
        assert_eq!(
            token_for(&WellKnownNamespace::ReleaseManagement.id(), &s),
            "p1"
        );
    }

    #[test]
    fn unknown_namespace_has_no_token() {
        assert_eq!(token_for(&Uuid::nil(), &scope("p1", None)), "");
    }

    #[test]
    fn scope_from_repository_resource() {
        let repo = Resource::new("repository", "R", "api")
            .with_parent(Some(sync_core::connectors::nodes::ResourceId::new("project", "P")));
        let scope = AclScope::from(&repo);
        assert_eq!(scope.parent_project_id, Some("P"));
        assert_eq!(scope.display_name, "api");
    }
}
