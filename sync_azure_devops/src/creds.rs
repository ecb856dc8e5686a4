use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use url::Url;

/// Credentials for authenticating to Azure DevOps.
///
/// The user pastes a personal access token and the organization URL
/// into their credentials file.
#[derive(Deserialize, Default)]
pub(crate) struct AzureDevOpsCredentials {
    pub(crate) personal_access_token: String,
    pub(crate) organization_url: String,
}

impl std::fmt::Debug for AzureDevOpsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureDevOpsCredentials")
            .field("personal_access_token", &"<redacted>")
            .field("organization_url", &self.organization_url)
            .finish()
    }
}

impl AzureDevOpsCredentials {
    /// Perform simple field validation to catch bad input.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.personal_access_token.is_empty() || self.organization_url.is_empty() {
            return Err(anyhow!(
                "Credentials are missing. Please make sure your credentials file is correct. Credentials received: {:#?}",
                self
            ));
        }
        self.organization_url()?;
        Ok(())
    }

    /// The organization URL, without a trailing slash.
    pub(crate) fn organization_url(&self) -> Result<Url> {
        let trimmed = self.organization_url.trim_end_matches('/');
        Url::parse(trimmed).context("parsing organization_url")
    }
}
