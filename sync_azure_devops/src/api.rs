//! The slice of the Azure DevOps API the connector depends on.

use async_trait::async_trait;
use mockall::automock;
use sync_core::connectors::nodes::Page;
use uuid::Uuid;

use crate::nodes::{
    AccessControlList, GitRepository, GraphGroup, GraphMembership, Identity, SecurityNamespace,
    TeamMember, TeamProjectReference, UserEntitlement, UserEntitlementsPostResponse, WebApiTeam,
};
use crate::rest::ApiError;

/// How to select identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityQuery {
    /// By identity id (GUID)
    ByIds(Vec<String>),
    /// By identity descriptor
    ByDescriptors(Vec<String>),
}

/// Platform calls. Every method is a single request; paging is left to the
/// caller.
#[automock]
#[async_trait]
pub trait DevOpsApi: Send + Sync {
    /// One page of users with their licenses.
    async fn list_user_entitlements(
        &self,
        token: Option<String>,
    ) -> Result<Page<UserEntitlement>, ApiError>;

    /// Add a user to the organization.
    async fn add_user_entitlement(
        &self,
        entitlement: UserEntitlement,
    ) -> Result<UserEntitlementsPostResponse, ApiError>;

    /// One page of projects. The token is a numeric offset.
    async fn list_projects(
        &self,
        token: Option<String>,
    ) -> Result<Page<TeamProjectReference>, ApiError>;

    /// Every team in the organization.
    async fn list_teams(&self) -> Result<Vec<WebApiTeam>, ApiError>;

    /// Members of one team.
    async fn list_team_members(
        &self,
        project_id: &str,
        team_id: &str,
    ) -> Result<Vec<TeamMember>, ApiError>;

    /// One page of groups. Includes the groups backing teams.
    async fn list_groups(&self, token: Option<String>) -> Result<Page<GraphGroup>, ApiError>;

    /// Identities with expanded membership.
    async fn read_identities(&self, query: IdentityQuery) -> Result<Vec<Identity>, ApiError>;

    /// Namespace descriptions; all of them when `namespace_id` is `None`.
    async fn query_security_namespaces(
        &self,
        namespace_id: Option<Uuid>,
    ) -> Result<Vec<SecurityNamespace>, ApiError>;

    /// ACLs of a namespace, with extended info. `token` narrows to one
    /// security token; `None` returns every ACL in the namespace.
    async fn query_access_control_lists(
        &self,
        namespace_id: Uuid,
        token: Option<String>,
    ) -> Result<Vec<AccessControlList>, ApiError>;

    /// Repositories of a project.
    async fn list_repositories(&self, project: &str) -> Result<Vec<GitRepository>, ApiError>;

    /// Graph descriptor for a storage key (identity id).
    async fn get_descriptor(&self, storage_key: Uuid) -> Result<String, ApiError>;

    /// The membership of `subject` in `container`. Absent memberships come
    /// back as [`ApiError::NotFound`].
    async fn get_membership(
        &self,
        subject: &str,
        container: &str,
    ) -> Result<GraphMembership, ApiError>;

    /// Make `subject` a member of `container`.
    async fn add_membership(
        &self,
        subject: &str,
        container: &str,
    ) -> Result<GraphMembership, ApiError>;

    /// Remove `subject` from `container`.
    async fn remove_membership(&self, subject: &str, container: &str) -> Result<(), ApiError>;
}
