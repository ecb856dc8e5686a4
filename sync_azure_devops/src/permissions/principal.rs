//! Resolution of ACE descriptors into principals.

use std::collections::{HashMap, HashSet};

use sync_core::connectors::nodes::ResourceId;
use sync_core::logging::debug;

use crate::api::{DevOpsApi, IdentityQuery};
use crate::resource_types::{GROUP, TEAM, USER};
use crate::rest::ApiError;

/// A resolved grant holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Principal {
    /// Keyed by user descriptor
    User { id: String },
    /// Keyed by identity id, with the `[Project]` scope if any
    Group { id: String, scope: Option<String> },
    /// Keyed by team id, with the `[Project]` scope if any
    Team { id: String, scope: Option<String> },
}

impl Principal {
    pub(crate) fn id(&self) -> &str {
        match self {
            Principal::User { id } | Principal::Group { id, .. } | Principal::Team { id, .. } => id,
        }
    }

    pub(crate) fn resource_id(&self) -> ResourceId {
        let resource_type = match self {
            Principal::User { .. } => USER.id,
            Principal::Group { .. } => GROUP.id,
            Principal::Team { .. } => TEAM.id,
        };
        ResourceId::new(resource_type, self.id())
    }

    pub(crate) fn scope(&self) -> Option<&str> {
        match self {
            Principal::User { .. } => None,
            Principal::Group { scope, .. } | Principal::Team { scope, .. } => scope.as_deref(),
        }
    }

    /// Groups and teams can be expanded through their own memberships.
    pub(crate) fn is_container(&self) -> bool {
        !matches!(self, Principal::User { .. })
    }

    /// Membership entitlements of this principal, for grant expansion.
    pub(crate) fn source_entitlement_ids(&self) -> Vec<String> {
        let id = self.id();
        vec![
            format!("{}:{id}:member", TEAM.id),
            format!("{}:{id}:member", GROUP.id),
            format!("{}:{id}:admin", GROUP.id),
        ]
    }
}

/// Lookup tables for one grants pass: user principal name to descriptor,
/// and the ids of every team. Both are fully loaded before use.
#[derive(Debug, Default, Clone)]
pub(crate) struct PrincipalDirectory {
    users: HashMap<String, String>,
    team_ids: HashSet<String>,
}

impl PrincipalDirectory {
    #[cfg(test)]
    pub(crate) fn new(users: HashMap<String, String>, team_ids: HashSet<String>) -> Self {
        Self { users, team_ids }
    }

    /// Read every user page and the full team list.
    pub(crate) async fn load(api: &dyn DevOpsApi) -> Result<Self, ApiError> {
        let mut users = HashMap::new();
        let mut token: Option<String> = None;
        loop {
            let page = api.list_user_entitlements(token.clone()).await?;
            for user in &page.items {
                if let (Some(name), Some(descriptor)) = (user.principal_name(), user.descriptor())
                {
                    users.insert(name.to_owned(), descriptor.to_owned());
                }
            }
            match page.next_token {
                Some(next) if token.as_ref() != Some(&next) => token = Some(next),
                _ => break,
            }
        }

        let team_ids = api
            .list_teams()
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();

        Ok(Self { users, team_ids })
    }

    pub(crate) fn is_team(&self, id: &str) -> bool {
        self.team_ids.contains(id)
    }

    /// Resolve an ACE descriptor.
    ///
    /// `Domain\principal` descriptors are users and are looked up in the user
    /// table. Anything else goes through the identity API and becomes a team
    /// when the identity id is a team id, a group otherwise. `Ok(None)` means
    /// no principal matched, which includes an empty descriptor.
    pub(crate) async fn resolve(
        &self,
        api: &dyn DevOpsApi,
        descriptor: &str,
    ) -> Result<Option<Principal>, ApiError> {
        if descriptor.is_empty() {
            return Ok(None);
        }
        let parts: Vec<&str> = descriptor.split('\\').collect();
        if let [_, principal_name] = parts[..] {
            return Ok(self
                .users
                .get(principal_name)
                .map(|id| Principal::User { id: id.to_owned() }));
        }

        let identities = match api
            .read_identities(IdentityQuery::ByDescriptors(vec![descriptor.to_owned()]))
            .await
        {
            Ok(identities) => identities,
            Err(ApiError::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        let Some(identity) = identities.into_iter().next().filter(|i| !i.id.is_empty()) else {
            debug!("no identity for descriptor {descriptor}");
            return Ok(None);
        };

        let scope = identity.scope().map(str::to_owned);
        Ok(Some(if self.is_team(&identity.id) {
            Principal::Team {
                id: identity.id,
                scope,
            }
        } else {
            Principal::Group {
                id: identity.id,
                scope,
            }
        }))
    }
}
