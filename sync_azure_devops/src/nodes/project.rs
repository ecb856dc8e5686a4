use serde::{Deserialize, Serialize};
use sync_core::connectors::nodes::Resource;

use crate::resource_types::{PROJECT, REPOSITORY};

/// Summary of a project.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TeamProjectReference {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub state: Option<String>,
    pub visibility: Option<String>,
    pub url: Option<String>,
}

impl From<TeamProjectReference> for Resource {
    fn from(val: TeamProjectReference) -> Self {
        let mut resource = Resource::new(PROJECT.id, &val.id, &val.name);
        resource.description = val.description;
        if let Some(state) = val.state {
            resource = resource.with_profile("state", state);
        }
        if let Some(visibility) = val.visibility {
            resource = resource.with_profile("visibility", visibility);
        }
        resource.child_resource_types = vec![REPOSITORY.id.to_owned()];
        resource
    }
}
