//! Idempotent group and team membership changes.
//!
//! The membership endpoints don't distinguish "already a member" or "not a
//! member" from other failures, so every change looks up the membership first.

use sync_core::connectors::nodes::MutationOutcome;
use sync_core::logging::debug;
use uuid::Uuid;

use crate::api::DevOpsApi;
use crate::rest::ApiError;

/// The graph descriptor for `id`. Identity ids (UUIDs) are translated
/// through the descriptor endpoint; anything else is already a descriptor.
async fn resolve_descriptor(api: &dyn DevOpsApi, id: &str) -> Result<String, ApiError> {
    match Uuid::parse_str(id) {
        Ok(storage_key) => api.get_descriptor(storage_key).await,
        Err(_) => Ok(id.to_owned()),
    }
}

/// Make `principal` a member of `container`. An existing membership is left
/// alone and reported as [`MutationOutcome::AlreadyExists`].
pub(crate) async fn add_member(
    api: &dyn DevOpsApi,
    container: &str,
    principal: &str,
) -> Result<MutationOutcome, ApiError> {
    let container = resolve_descriptor(api, container).await?;
    let subject = resolve_descriptor(api, principal).await?;

    match api.get_membership(&subject, &container).await {
        Ok(_) => {
            debug!("{subject} is already a member of {container}");
            Ok(MutationOutcome::AlreadyExists)
        }
        Err(e) if e.is_not_found() => {
            api.add_membership(&subject, &container).await?;
            Ok(MutationOutcome::Applied)
        }
        Err(e) => Err(e),
    }
}

/// Remove `principal` from `container`. A missing membership is reported as
/// [`MutationOutcome::AlreadyRevoked`].
pub(crate) async fn remove_member(
    api: &dyn DevOpsApi,
    container: &str,
    principal: &str,
) -> Result<MutationOutcome, ApiError> {
    let container = resolve_descriptor(api, container).await?;
    let subject = resolve_descriptor(api, principal).await?;

    match api.get_membership(&subject, &container).await {
        Ok(_) => {
            api.remove_membership(&subject, &container).await?;
            Ok(MutationOutcome::Applied)
        }
        Err(e) if e.is_not_found() => {
            debug!("{subject} is not a member of {container}");
            Ok(MutationOutcome::AlreadyRevoked)
        }
        Err(e) => Err(e),
    }
}
