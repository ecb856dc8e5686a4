use serde::{Deserialize, Serialize};

/// A membership edge between a subject and a container.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GraphMembership {
    #[serde(default)]
    pub container_descriptor: String,
    #[serde(default)]
    pub member_descriptor: String,
}
