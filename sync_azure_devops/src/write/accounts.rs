//! Adding users to the organization.

use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use sync_core::connectors::nodes::{AccountInfo, Resource};
use sync_core::logging::info;

use crate::api::DevOpsApi;
use crate::nodes::{AccessLevel, GraphUser, OperationResult, UserEntitlement};

/// License types a new account can be given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LicenseType {
    Express,
    Stakeholder,
    VisualStudioSubscriber,
}

impl FromStr for LicenseType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "express" => Ok(LicenseType::Express),
            "stakeholder" => Ok(LicenseType::Stakeholder),
            "Visual Studio Subscriber" => Ok(LicenseType::VisualStudioSubscriber),
            other => Err(anyhow!(
                "invalid license_type '{other}'; must be one of: express, stakeholder, Visual Studio Subscriber"
            )),
        }
    }
}

impl LicenseType {
    /// The platform's `(accountLicenseType, licensingSource)` pair.
    pub(crate) fn access_level(self) -> AccessLevel {
        let (license, source) = match self {
            LicenseType::Express => ("express", "account"),
            LicenseType::Stakeholder => ("stakeholder", "account"),
            LicenseType::VisualStudioSubscriber => ("advanced", "msdn"),
        };
        AccessLevel {
            account_license_type: Some(license.to_owned()),
            licensing_source: Some(source.to_owned()),
            status: None,
        }
    }
}

fn required<'a>(account: &'a AccountInfo, key: &str) -> Result<&'a str> {
    account
        .profile_str(key)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| anyhow!("missing '{key}' in account profile"))
}

fn operation_error(result: &OperationResult) -> String {
    let messages: Vec<String> = result
        .errors
        .iter()
        .filter_map(|e| e.value.as_ref())
        .map(|v| match v.as_str() {
            Some(s) => s.to_owned(),
            None => v.to_string(),
        })
        .collect();
    if messages.is_empty() {
        "unknown reason".to_owned()
    } else {
        messages.join("; ")
    }
}

/// Add the user named by `principal_name` with the requested license.
pub(crate) async fn create_account(api: &dyn DevOpsApi, account: &AccountInfo) -> Result<Resource> {
    let principal_name = required(account, "principal_name")?;
    let license: LicenseType = required(account, "license_type")?.parse()?;

    let request = UserEntitlement {
        access_level: Some(license.access_level()),
        user: Some(GraphUser {
            principal_name: Some(principal_name.to_owned()),
            subject_kind: Some("user".to_owned()),
            ..Default::default()
        }),
        ..Default::default()
    };

    let response = api
        .add_user_entitlement(request)
        .await
        .context("failed to add user entitlement")?;

    if let Some(result) = &response.operation_result {
        if result.is_success == Some(false) {
            bail!(
                "failed to add user entitlement: {}",
                operation_error(result)
            );
        }
    }
    let entitlement = response
        .user_entitlement
        .ok_or_else(|| anyhow!("failed to add user entitlement: no user in response"))?;

    info!("added {principal_name} to the organization");
    Ok(entitlement.into())
}
