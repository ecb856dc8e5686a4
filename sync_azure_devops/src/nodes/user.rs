use serde::{Deserialize, Serialize};
use sync_core::connectors::nodes::{AccountType, Resource, UserStatus, UserTrait};

use crate::resource_types::USER;

/// A license assignment.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessLevel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_license_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub licensing_source: Option<String>,
    /// none, active, disabled, deleted, pending, expired or pendingDisabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// A graph user.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GraphUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_kind: Option<String>,
}

/// A user together with their license.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserEntitlement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_level: Option<AccessLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_accessed_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<GraphUser>,
}

/// The user-entitlement search endpoint returns either a single token or a
/// list with at most one entry.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub(crate) enum ContinuationToken {
    One(String),
    Many(Vec<String>),
}

impl ContinuationToken {
    pub(crate) fn into_token(self) -> Option<String> {
        match self {
            ContinuationToken::One(t) => Some(t),
            ContinuationToken::Many(v) => v.into_iter().next(),
        }
        .filter(|t| !t.is_empty())
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PagedUserEntitlements {
    #[serde(default)]
    pub(crate) members: Vec<UserEntitlement>,
    pub(crate) continuation_token: Option<ContinuationToken>,
}

/// Error code / message pair.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct KeyValuePair {
    pub key: Option<serde_json::Value>,
    pub value: Option<serde_json::Value>,
}

/// Outcome reported for an add-user operation.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    #[serde(default)]
    pub errors: Vec<KeyValuePair>,
    pub is_success: Option<bool>,
}

/// Response to adding a user entitlement.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserEntitlementsPostResponse {
    pub is_success: Option<bool>,
    pub user_entitlement: Option<UserEntitlement>,
    pub operation_result: Option<OperationResult>,
}

impl UserEntitlement {
    /// The user's descriptor, used as the resource id.
    pub(crate) fn descriptor(&self) -> Option<&str> {
        self.user.as_ref()?.descriptor.as_deref()
    }

    /// The user's principal name.
    pub(crate) fn principal_name(&self) -> Option<&str> {
        self.user.as_ref()?.principal_name.as_deref()
    }

    fn status(&self) -> UserStatus {
        match self
            .access_level
            .as_ref()
            .and_then(|a| a.status.as_deref())
        {
            Some("disabled") => UserStatus::Disabled,
            Some("deleted") => UserStatus::Deleted,
            _ => UserStatus::Enabled,
        }
    }
}

impl From<UserEntitlement> for Resource {
    fn from(val: UserEntitlement) -> Self {
        let status = val.status();
        let user = val.user.unwrap_or_default();
        let descriptor = user.descriptor.unwrap_or_default();
        let display_name = user.display_name.unwrap_or_default();
        let email = user.mail_address.unwrap_or_default();
        let account_type = match user.meta_type.as_deref() {
            Some("application") => AccountType::Service,
            _ => AccountType::Human,
        };

        let mut resource = Resource::new(USER.id, &descriptor, &display_name)
            .with_profile("user_descriptor", descriptor.as_str())
            .with_profile("username", display_name.as_str())
            .with_profile("email", email.as_str());
        resource.user_trait = Some(UserTrait {
            email: Some(email).filter(|e| !e.is_empty()),
            login: Some(display_name).filter(|d| !d.is_empty()),
            status,
            account_type,
            last_login: val.last_accessed_date,
        });
        resource
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_entitlement_becomes_user_resource() -> anyhow::Result<()> {
        let ue: UserEntitlement = serde_json::from_value(serde_json::json!({
            "accessLevel": {"status": "disabled", "accountLicenseType": "express"},
            "lastAccessedDate": "2024-01-02T00:00:00Z",
            "user": {
                "descriptor": "aad.abc",
                "displayName": "Jane Doe",
                "mailAddress": "jane@example.com",
                "principalName": "jane@example.com",
                "metaType": "application"
            }
        }))?;

        let resource = Resource::from(ue);
        assert_eq!(resource.id.resource, "aad.abc");
        assert_eq!(resource.id.resource_type, "user");
        assert_eq!(resource.profile_value("email"), Some("jane@example.com"));
        let user = resource.user_trait.unwrap();
        assert_eq!(user.status, UserStatus::Disabled);
        assert_eq!(user.account_type, AccountType::Service);
        assert_eq!(user.last_login.as_deref(), Some("2024-01-02T00:00:00Z"));
        Ok(())
    }

    #[test]
    fn continuation_token_accepts_both_shapes() -> anyhow::Result<()> {
        let one: PagedUserEntitlements =
            serde_json::from_str(r#"{"members": [], "continuationToken": "abc"}"#)?;
        assert_eq!(
            one.continuation_token.and_then(|t| t.into_token()),
            Some("abc".to_owned())
        );
        let many: PagedUserEntitlements =
            serde_json::from_str(r#"{"members": [], "continuationToken": ["def"]}"#)?;
        assert_eq!(
            many.continuation_token.and_then(|t| t.into_token()),
            Some("def".to_owned())
        );
        let none: PagedUserEntitlements =
            serde_json::from_str(r#"{"members": [], "continuationToken": []}"#)?;
        assert_eq!(none.continuation_token.and_then(|t| t.into_token()), None);
        Ok(())
    }
}
