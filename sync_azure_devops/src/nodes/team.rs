use serde::{Deserialize, Serialize};
use sync_core::connectors::nodes::{Resource, ResourceId};

use crate::resource_types::{PROJECT, TEAM};

/// A team inside a project.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WebApiTeam {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub project_id: Option<String>,
    pub project_name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

/// Identity summary embedded in team membership listings.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub descriptor: String,
    pub display_name: Option<String>,
    pub unique_name: Option<String>,
    pub is_container: Option<bool>,
}

/// One member of a team.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub identity: IdentityRef,
    pub is_team_admin: Option<bool>,
}

impl From<WebApiTeam> for Resource {
    fn from(val: WebApiTeam) -> Self {
        let parent = val
            .project_id
            .as_ref()
            .map(|p| ResourceId::new(PROJECT.id, p));
        let mut resource = Resource::new(TEAM.id, &val.id, &val.name)
            .with_parent(parent)
            .with_profile("team_id", val.id.as_str())
            .with_profile("display_name", val.name.as_str());
        for (key, value) in [
            ("project_name", val.project_name),
            ("description", val.description.clone()),
            ("url", val.url),
        ] {
            if let Some(v) = value {
                resource = resource.with_profile(key, v);
            }
        }
        resource.description = val.description;
        resource
    }
}
