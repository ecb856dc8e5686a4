//! One syncer per resource type.

mod groups;
mod projects;
mod repositories;
mod security_namespaces;
mod teams;
mod users;

pub(crate) use groups::GroupSyncer;
pub(crate) use projects::ProjectSyncer;
pub(crate) use repositories::RepositorySyncer;
pub(crate) use security_namespaces::SecurityNamespaceSyncer;
pub(crate) use teams::TeamSyncer;
pub(crate) use users::UserSyncer;

use anyhow::{bail, Result};

use crate::api::DevOpsApi;
use crate::rest::ApiError;

/// The only entitlement that can be granted or revoked.
pub(crate) const MEMBER: &str = "member";

/// Reject writes to anything but the `member` entitlement.
pub(crate) fn ensure_member_slug(slug: &str, resource_type: &str) -> Result<()> {
    if slug != MEMBER {
        bail!("only the {MEMBER} entitlement can be changed on a {resource_type}, got {slug}");
    }
    Ok(())
}

/// Names of every project in the organization.
pub(crate) async fn project_names(api: &dyn DevOpsApi) -> Result<Vec<String>, ApiError> {
    let mut names = vec![];
    let mut token: Option<String> = None;
    loop {
        let page = api.list_projects(token.clone()).await?;
        names.extend(page.items.into_iter().map(|p| p.name));
        match page.next_token {
            Some(next) if token.as_ref() != Some(&next) => token = Some(next),
            _ => break,
        }
    }
    Ok(names)
}
