use serde::{Deserialize, Serialize};
use sync_core::connectors::nodes::{Resource, ResourceId};

use crate::resource_types::{PROJECT, REPOSITORY};

/// The project a repository lives in.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRef {
    pub id: String,
    pub name: Option<String>,
}

/// A git repository.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GitRepository {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub project: Option<ProjectRef>,
    pub default_branch: Option<String>,
    pub web_url: Option<String>,
}

impl From<GitRepository> for Resource {
    fn from(val: GitRepository) -> Self {
        let parent = val
            .project
            .as_ref()
            .map(|p| ResourceId::new(PROJECT.id, &p.id));
        let mut resource = Resource::new(REPOSITORY.id, &val.id, &val.name).with_parent(parent);
        if let Some(branch) = val.default_branch {
            resource = resource.with_profile("default_branch", branch);
        }
        if let Some(url) = val.web_url {
            resource = resource.with_profile("url", url);
        }
        resource
    }
}
