//! Sequential walk over a connector's resource syncers.

use anyhow::{Context, Result};

use super::nodes::{ConnectorData, Resource, ResourceId};
use super::ResourceSyncer;
use crate::logging::{debug, error};

/// List every resource of every syncer, then their entitlements and grants.
///
/// Top-level types are listed first. Each resource's child types are then
/// listed with the resource as parent. A syncer that fails is logged and
/// skipped; whatever it produced before failing is dropped, the other types
/// are unaffected.
pub async fn collect(syncers: &[Box<dyn ResourceSyncer>]) -> ConnectorData {
    let mut data = ConnectorData::default();

    for syncer in syncers {
        let type_id = syncer.resource_type().id;
        match list_all(syncer.as_ref(), None).await {
            Ok(mut resources) => data.resources.append(&mut resources),
            Err(e) => error!("unable to list {type_id} resources: {e:#}"),
        }
    }

    let mut children = vec![];
    for resource in &data.resources {
        for child_type in &resource.child_resource_types {
            let Some(syncer) = syncers.iter().find(|s| s.resource_type().id == child_type) else {
                debug!("no syncer for child type {child_type}");
                continue;
            };
            match list_all(syncer.as_ref(), Some(&resource.id)).await {
                Ok(mut resources) => children.append(&mut resources),
                Err(e) => error!("unable to list {child_type} under {}: {e:#}", resource.id),
            }
        }
    }
    data.resources.append(&mut children);

    for resource in &data.resources {
        let Some(syncer) = syncers
            .iter()
            .find(|s| s.resource_type().id == resource.id.resource_type)
        else {
            continue;
        };
        match syncer.entitlements(resource).await {
            Ok(mut ents) => data.entitlements.append(&mut ents),
            Err(e) => error!("unable to fetch entitlements for {}: {e:#}", resource.id),
        }
        match syncer.grants(resource).await {
            Ok(mut grants) => data.grants.append(&mut grants),
            Err(e) => error!("unable to fetch grants for {}: {e:#}", resource.id),
        }
    }

    data
}

/// Follow continuation tokens until the syncer reports the last page.
pub async fn list_all(
    syncer: &dyn ResourceSyncer,
    parent: Option<&ResourceId>,
) -> Result<Vec<Resource>> {
    let mut resources = vec![];
    let mut token: Option<String> = None;
    loop {
        let page = syncer
            .list(parent, token.as_deref())
            .await
            .with_context(|| format!("listing {}", syncer.resource_type().id))?;
        resources.extend(page.items);
        match page.next_token {
            Some(next) if Some(&next) != token.as_ref() => token = Some(next),
            _ => break,
        }
    }
    Ok(resources)
}
