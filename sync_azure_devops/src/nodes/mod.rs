//! Wire types for the Azure DevOps REST API and their conversion into
//! connector resources.

pub(crate) mod group;
pub(crate) mod identity;
pub(crate) mod membership;
pub(crate) mod project;
pub(crate) mod repository;
pub(crate) mod security;
pub(crate) mod team;
pub(crate) mod user;

pub use group::GraphGroup;
pub use identity::Identity;
pub use membership::GraphMembership;
pub use project::TeamProjectReference;
pub use repository::GitRepository;
pub use security::{
    AccessControlEntry, AccessControlList, AceExtendedInformation, ActionDefinition,
    SecurityNamespace,
};
pub use team::{TeamMember, WebApiTeam};
pub use user::{
    AccessLevel, GraphUser, OperationResult, UserEntitlement, UserEntitlementsPostResponse,
};

#[cfg(test)]
pub use team::IdentityRef;
#[cfg(test)]
pub use user::KeyValuePair;

use serde::Deserialize;

/// The `{ "count": n, "value": [...] }` envelope most list endpoints use.
#[derive(Deserialize, Debug)]
pub(crate) struct ValueList<T> {
    #[serde(default = "Vec::new")]
    pub(crate) value: Vec<T>,
}

/// A single `{ "value": ... }` envelope.
#[derive(Deserialize, Debug)]
pub(crate) struct ValueOf<T> {
    pub(crate) value: T,
}
