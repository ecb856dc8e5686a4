//! The resource types this connector reports.

use sync_core::connectors::nodes::{ResourceTrait, ResourceType};

pub(crate) const USER: ResourceType = ResourceType {
    id: "user",
    display_name: "User",
    traits: &[ResourceTrait::User],
};

pub(crate) const PROJECT: ResourceType = ResourceType {
    id: "project",
    display_name: "Project",
    traits: &[],
};

pub(crate) const TEAM: ResourceType = ResourceType {
    id: "team",
    display_name: "Team",
    traits: &[ResourceTrait::Group],
};

pub(crate) const GROUP: ResourceType = ResourceType {
    id: "group",
    display_name: "Group",
    traits: &[ResourceTrait::Group],
};

pub(crate) const REPOSITORY: ResourceType = ResourceType {
    id: "repository",
    display_name: "Repository",
    traits: &[],
};

pub(crate) const SECURITY_NAMESPACE: ResourceType = ResourceType {
    id: "security_namespace",
    display_name: "Security Namespace",
    traits: &[],
};

/// Types that can hold permission grants.
pub(crate) const PRINCIPAL_TYPES: [&ResourceType; 3] = [&USER, &GROUP, &TEAM];
