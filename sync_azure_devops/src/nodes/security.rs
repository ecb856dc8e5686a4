use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sync_core::connectors::nodes::Resource;
use uuid::Uuid;

use crate::resource_types::SECURITY_NAMESPACE;

/// One permission bit inside a namespace.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActionDefinition {
    pub bit: Option<i64>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub namespace_id: Option<Uuid>,
}

/// A category of securable objects with its own bit vocabulary.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecurityNamespace {
    pub namespace_id: Uuid,
    #[serde(default)]
    pub name: String,
    pub display_name: Option<String>,
    pub read_permission: Option<i64>,
    pub write_permission: Option<i64>,
    pub system_bit_mask: Option<i64>,
    #[serde(default)]
    pub actions: Vec<ActionDefinition>,
}

/// Inheritance-resolved bits, present when extended info is requested.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AceExtendedInformation {
    pub effective_allow: Option<i64>,
    pub effective_deny: Option<i64>,
    pub inherited_allow: Option<i64>,
    pub inherited_deny: Option<i64>,
}

/// One principal's allow/deny bits on one token.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessControlEntry {
    #[serde(default)]
    pub descriptor: String,
    pub allow: Option<i64>,
    pub deny: Option<i64>,
    pub extended_info: Option<AceExtendedInformation>,
}

/// All entries for one security token.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessControlList {
    pub token: Option<String>,
    pub inherit_permissions: Option<bool>,
    #[serde(default)]
    pub aces_dictionary: BTreeMap<String, AccessControlEntry>,
}

impl From<SecurityNamespace> for Resource {
    fn from(val: SecurityNamespace) -> Self {
        let mut resource = Resource::new(
            SECURITY_NAMESPACE.id,
            &val.namespace_id.to_string(),
            &val.name,
        );
        if let Some(display_name) = val.display_name {
            resource = resource.with_profile("display_name", display_name);
        }
        resource
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acl_with_missing_fields_parses() -> anyhow::Result<()> {
        let acl: AccessControlList = serde_json::from_value(serde_json::json!({
            "token": "repoV2/p",
            "acesDictionary": {
                "Microsoft.TeamFoundation.Identity;S-1-9-1": {
                    "descriptor": "Microsoft.TeamFoundation.Identity;S-1-9-1",
                    "allow": 2
                }
            }
        }))?;
        let ace = acl.aces_dictionary.values().next().unwrap();
        assert_eq!(ace.allow, Some(2));
        assert_eq!(ace.deny, None);
        assert!(ace.extended_info.is_none());
        Ok(())
    }
}
