//! Nodes to be received from connectors
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Behaviour a resource type carries in the identity model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceTrait {
    /// Accounts that can receive grants.
    User,
    /// Containers of other principals.
    Group,
}

/// A kind of resource a connector can list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceType {
    /// Stable id, e.g. `user` or `project`.
    pub id: &'static str,
    /// Human-readable name
    pub display_name: &'static str,
    /// Traits of resources of this type
    pub traits: &'static [ResourceTrait],
}

/// Reference to a single resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId {
    /// Id of the resource's type
    pub resource_type: String,
    /// Id of the resource within its type
    pub resource: String,
}

impl ResourceId {
    /// Basic constructor
    pub fn new(resource_type: &str, resource: &str) -> Self {
        Self {
            resource_type: resource_type.to_owned(),
            resource: resource.to_owned(),
        }
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.resource_type, self.resource)
    }
}

/// Account status for user resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Active account
    #[default]
    Enabled,
    /// Suspended account
    Disabled,
    /// Removed account
    Deleted,
}

/// Whether an account belongs to a human or a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// A person
    #[default]
    Human,
    /// An application or service principal
    Service,
}

/// User-specific fields of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserTrait {
    /// Primary email address
    pub email: Option<String>,
    /// Login name
    pub login: Option<String>,
    /// Account status
    pub status: UserStatus,
    /// Human or service account
    pub account_type: AccountType,
    /// Last time the user was seen, as reported by the platform
    pub last_login: Option<String>,
}

/// A resource reported by a connector.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resource {
    /// Resource id
    pub id: ResourceId,
    /// Human-readable name
    pub display_name: String,
    /// The containing resource, if any
    pub parent_resource_id: Option<ResourceId>,
    /// Free-form description
    pub description: Option<String>,
    /// Extra key/value details
    pub profile: BTreeMap<String, String>,
    /// Resource types listed underneath this resource
    pub child_resource_types: Vec<String>,
    /// Set on user resources
    pub user_trait: Option<UserTrait>,
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::new("", "")
    }
}

impl Resource {
    /// Basic constructor
    pub fn new(resource_type: &str, id: &str, display_name: &str) -> Self {
        Self {
            id: ResourceId::new(resource_type, id),
            display_name: display_name.to_owned(),
            ..Default::default()
        }
    }

    /// Set the parent resource.
    pub fn with_parent(mut self, parent: Option<ResourceId>) -> Self {
        self.parent_resource_id = parent;
        self
    }

    /// Add a profile entry.
    pub fn with_profile(mut self, key: &str, value: impl Into<String>) -> Self {
        self.profile.insert(key.to_owned(), value.into());
        self
    }

    /// Look up a profile entry.
    pub fn profile_value(&self, key: &str) -> Option<&str> {
        self.profile.get(key).map(String::as_str)
    }
}

/// A permission that can be held on a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    /// `<resource type>:<resource id>:<slug>`
    pub id: String,
    /// The resource offering this entitlement
    pub resource: ResourceId,
    /// Short name, unique per resource
    pub slug: String,
    /// Human-readable name
    pub display_name: String,
    /// Longer description
    pub description: String,
    /// Resource types that may hold this entitlement
    pub grantable_to: Vec<String>,
}

impl Entitlement {
    /// Build an entitlement on `resource` with the given slug.
    pub fn new(resource: &ResourceId, slug: &str) -> Self {
        Self {
            id: entitlement_id(resource, slug),
            resource: resource.to_owned(),
            slug: slug.to_owned(),
            display_name: slug.to_owned(),
            description: String::new(),
            grantable_to: vec![],
        }
    }

    /// Set the display name.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set which resource types can hold this entitlement.
    pub fn grantable_to(mut self, types: &[&ResourceType]) -> Self {
        self.grantable_to = types.iter().map(|t| t.id.to_owned()).collect();
        self
    }
}

/// The id an entitlement with `slug` on `resource` would have.
pub fn entitlement_id(resource: &ResourceId, slug: &str) -> String {
    format!("{}:{}:{}", resource.resource_type, resource.resource, slug)
}

/// Candidate entitlements whose holders should inherit a grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantExpandable {
    /// Entitlement ids to expand through
    pub entitlement_ids: Vec<String>,
    /// Only expand one level
    pub shallow: bool,
}

/// Extra information carried with a grant.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GrantAnnotations {
    /// Set when the grant should be expanded through memberships
    pub expandable: Option<GrantExpandable>,
    /// The grant can't be changed through this connector
    pub immutable: bool,
    /// Legacy identifier kept for consumers keyed on it
    pub v1_identifier: Option<String>,
}

/// An edge between a principal and an entitlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// `<entitlement id>:<principal type>:<principal id>`
    pub id: String,
    /// The entitlement held
    pub entitlement: Entitlement,
    /// Who holds it
    pub principal: ResourceId,
    /// Additional details
    pub annotations: GrantAnnotations,
}

impl Grant {
    /// Basic constructor
    pub fn new(entitlement: &Entitlement, principal: ResourceId) -> Self {
        Self {
            id: format!("{}:{}", entitlement.id, principal),
            entitlement: entitlement.to_owned(),
            principal,
            annotations: Default::default(),
        }
    }

    /// Attach an expandable annotation.
    pub fn with_expandable(mut self, entitlement_ids: Vec<String>, shallow: bool) -> Self {
        self.annotations.expandable = Some(GrantExpandable {
            entitlement_ids,
            shallow,
        });
        self
    }

    /// Mark the grant as immutable.
    pub fn immutable(mut self) -> Self {
        self.annotations.immutable = true;
        self
    }

    /// Attach a v1 identifier.
    pub fn with_v1_identifier(mut self, id: String) -> Self {
        self.annotations.v1_identifier = Some(id);
        self
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items in this page
    pub items: Vec<T>,
    /// Token for the next page, `None` when this was the last one
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    /// A final page.
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: None,
        }
    }

    /// A page followed by another one. Empty tokens count as the end.
    pub fn with_token(items: Vec<T>, next_token: Option<String>) -> Self {
        Self {
            items,
            next_token: next_token.filter(|t| !t.is_empty()),
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::last(vec![])
    }
}

/// Result of a grant or revoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationOutcome {
    /// The change was made
    Applied,
    /// The grant was already present; nothing changed
    AlreadyExists,
    /// The grant was already absent; nothing changed
    AlreadyRevoked,
}

/// Input to account creation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Account fields keyed by name
    pub profile: HashMap<String, serde_json::Value>,
}

impl AccountInfo {
    /// A string field of the profile, if present.
    pub fn profile_str(&self, key: &str) -> Option<&str> {
        self.profile.get(key).and_then(|v| v.as_str())
    }
}

/// A field of the account-creation form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountField {
    /// Field name
    pub name: &'static str,
    /// Human-readable name
    pub display_name: &'static str,
    /// Help text
    pub description: &'static str,
    /// Example value
    pub placeholder: &'static str,
    /// Whether the field must be provided
    pub required: bool,
}

/// Static connector description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectorMetadata {
    /// Human-readable name
    pub display_name: &'static str,
    /// Short description
    pub description: &'static str,
    /// Fields accepted by account creation
    pub account_creation_schema: Vec<AccountField>,
}

/// Container for all node data for a given connector
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectorData {
    /// Every resource listed
    pub resources: Vec<Resource>,
    /// Every entitlement offered
    pub entitlements: Vec<Entitlement>,
    /// Every grant held
    pub grants: Vec<Grant>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: ResourceType = ResourceType {
        id: "user",
        display_name: "User",
        traits: &[ResourceTrait::User],
    };

    #[test]
    fn entitlement_and_grant_ids_compose() {
        let group = ResourceId::new("group", "g1");
        let ent = Entitlement::new(&group, "member").grantable_to(&[&USER]);
        assert_eq!(ent.id, "group:g1:member");
        assert_eq!(ent.grantable_to, vec!["user".to_owned()]);

        let grant = Grant::new(&ent, ResourceId::new("user", "u1"));
        assert_eq!(grant.id, "group:g1:member:user:u1");
        assert!(!grant.annotations.immutable);
    }

    #[test]
    fn empty_token_ends_pagination() {
        let page = Page::with_token(vec![1], Some(String::new()));
        assert_eq!(page.next_token, None);
        let page = Page::with_token(vec![1], Some("2".to_owned()));
        assert_eq!(page.next_token.as_deref(), Some("2"));
    }
}
