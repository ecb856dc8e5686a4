use serde::{Deserialize, Serialize};

/// An identity as returned by the identities endpoint.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(default)]
    pub id: String,
    pub descriptor: Option<String>,
    pub subject_descriptor: Option<String>,
    pub provider_display_name: Option<String>,
    pub is_container: Option<bool>,
    #[serde(default)]
    pub member_ids: Vec<String>,
    pub properties: Option<serde_json::Value>,
}

impl Identity {
    /// `User` or `Group`, from the identity's properties.
    pub(crate) fn schema_class_name(&self) -> Option<&str> {
        self.properties
            .as_ref()?
            .get("SchemaClassName")?
            .get("$value")?
            .as_str()
    }

    /// The `[Project]` prefix of a `[Project]\Name` provider display name.
    pub(crate) fn scope(&self) -> Option<&str> {
        let mut parts = self.provider_display_name.as_deref()?.split('\\');
        let (scope, _name) = (parts.next()?, parts.next()?);
        match parts.next() {
            None if !scope.is_empty() => Some(scope),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_class_name_is_read_from_properties() -> anyhow::Result<()> {
        let identity: Identity = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "properties": {"SchemaClassName": {"$type": "System.String", "$value": "Group"}}
        }))?;
        assert_eq!(identity.schema_class_name(), Some("Group"));
        assert_eq!(Identity::default().schema_class_name(), None);
        Ok(())
    }

    #[test]
    fn scope_requires_two_parts() {
        let scoped = Identity {
            provider_display_name: Some(r"[Fabrikam]\Contributors".to_owned()),
            ..Default::default()
        };
        assert_eq!(scoped.scope(), Some("[Fabrikam]"));

        let unscoped = Identity {
            provider_display_name: Some("Contributors".to_owned()),
            ..Default::default()
        };
        assert_eq!(unscoped.scope(), None);
    }
}
