use serde::{Deserialize, Serialize};
use sync_core::connectors::nodes::{Resource, ResourceId};

use crate::resource_types::{GROUP, PROJECT};

/// A graph group. Teams are also returned by the group listing.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GraphGroup {
    pub descriptor: Option<String>,
    #[serde(default)]
    pub display_name: String,
    pub description: Option<String>,
    pub origin_id: Option<String>,
    pub domain: Option<String>,
    pub principal_name: Option<String>,
    pub url: Option<String>,
}

impl GraphGroup {
    /// The project this group is scoped to, from a
    /// `vstfs:///Classification/TeamProject/<id>` domain.
    pub(crate) fn project_id(&self) -> Option<&str> {
        let domain = self.domain.as_deref()?;
        if !domain.contains("TeamProject") {
            return None;
        }
        domain.rsplit('/').next().filter(|p| !p.is_empty())
    }
}

impl From<GraphGroup> for Resource {
    fn from(val: GraphGroup) -> Self {
        let id = val.origin_id.clone().unwrap_or_default();
        let parent = val.project_id().map(|p| ResourceId::new(PROJECT.id, p));
        let mut resource = Resource::new(GROUP.id, &id, &val.display_name)
            .with_parent(parent)
            .with_profile("group_id", id.as_str())
            .with_profile("display_name", val.display_name.as_str());
        for (key, value) in [
            ("description", val.description.clone()),
            ("url", val.url),
            ("descriptor", val.descriptor),
        ] {
            if let Some(v) = value {
                resource = resource.with_profile(key, v);
            }
        }
        resource.description = val.description;
        resource
    }
}
