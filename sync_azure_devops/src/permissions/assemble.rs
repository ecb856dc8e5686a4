//! Builds entitlements and grants from namespaces, actions and ACLs.

use std::collections::{HashMap, HashSet};

use sync_core::connectors::nodes::{Entitlement, Grant, Resource};
use sync_core::logging::warn;

use super::evaluate::{evaluate_action, evaluate_read_write};
use super::token::{token_for, AclScope};
use super::{Principal, PrincipalDirectory};
use crate::api::DevOpsApi;
use crate::nodes::{AccessControlEntry, AccessControlList, ActionDefinition, SecurityNamespace};
use crate::resource_types::PRINCIPAL_TYPES;
use crate::rest::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Read,
    Write,
}

impl Access {
    fn as_str(self) -> &'static str {
        match self {
            Access::Read => "read",
            Access::Write => "write",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Access::Read => "Read",
            Access::Write => "Write",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Permission {
    Allow,
    Deny,
}

impl Permission {
    fn as_str(self) -> &'static str {
        match self {
            Permission::Allow => "allow",
            Permission::Deny => "deny",
        }
    }
}

/// Name and label of an action. Actions with neither are ignored.
struct ActionLabel<'a> {
    name: &'a str,
    display_name: &'a str,
}

impl<'a> ActionLabel<'a> {
    fn of(action: &'a ActionDefinition) -> Option<Self> {
        let name = action.name.as_deref();
        let display_name = action.display_name.as_deref().or(name)?;
        Some(Self {
            name: name.unwrap_or_default(),
            display_name,
        })
    }
}

/// First occurrence of each namespace id.
fn unique_namespaces(namespaces: &[SecurityNamespace]) -> Vec<&SecurityNamespace> {
    let mut seen = HashSet::new();
    namespaces
        .iter()
        .filter(|ns| seen.insert(ns.namespace_id))
        .collect()
}

fn read_write_entitlement(
    resource: &Resource,
    namespace: &SecurityNamespace,
    access: Access,
    level: &str,
) -> Entitlement {
    let slug = [
        resource.display_name.as_str(),
        namespace.name.as_str(),
        access.as_str(),
    ]
    .join("_");
    Entitlement::new(&resource.id, &slug)
        .with_display_name(slug.clone())
        .with_description(format!(
            "{} permission in {} security namespace at {} {level} level",
            access.title(),
            namespace.name,
            resource.display_name
        ))
        .grantable_to(&PRINCIPAL_TYPES)
}

/// `<resource>_<namespace>_read` and `_write` for every namespace.
/// `level` names the resource kind in descriptions.
pub(crate) fn read_write_entitlements(
    resource: &Resource,
    namespaces: &[SecurityNamespace],
    level: &str,
) -> Vec<Entitlement> {
    unique_namespaces(namespaces)
        .into_iter()
        .flat_map(|ns| {
            [
                read_write_entitlement(resource, ns, Access::Read, level),
                read_write_entitlement(resource, ns, Access::Write, level),
            ]
        })
        .collect()
}

fn action_entitlement(
    resource: &Resource,
    permission: Permission,
    label: &ActionLabel<'_>,
    scope: Option<&str>,
) -> Entitlement {
    let base = [permission.as_str(), label.name].join("_");
    let (slug, display_name, level) = match scope {
        Some(scope) => (
            [scope, base.as_str()].join("_"),
            format!("{scope}({})", label.display_name),
            format!("project ({scope})"),
        ),
        None => (
            base,
            label.display_name.to_owned(),
            "organization".to_owned(),
        ),
    };
    Entitlement::new(&resource.id, &slug)
        .with_display_name(display_name)
        .with_description(format!(
            "action \"{}\" for security namespace \"{}\" at {level} level",
            label.display_name, resource.display_name
        ))
        .grantable_to(&PRINCIPAL_TYPES)
}

/// Allow/deny pairs for every named action: one at organization level and
/// one per project, prefixed with `[<project>]`.
pub(crate) fn action_entitlements(
    resource: &Resource,
    actions: &[ActionDefinition],
    project_names: &[String],
) -> Vec<Entitlement> {
    let scopes: Vec<String> = project_names.iter().map(|p| format!("[{p}]")).collect();
    let mut seen = HashSet::new();
    let mut entitlements = vec![];

    for label in actions.iter().filter_map(ActionLabel::of) {
        let levels = std::iter::once(None).chain(scopes.iter().map(|s| Some(s.as_str())));
        for scope in levels {
            for permission in [Permission::Allow, Permission::Deny] {
                let ent = action_entitlement(resource, permission, &label, scope);
                if seen.insert(ent.id.clone()) {
                    entitlements.push(ent);
                }
            }
        }
    }
    entitlements
}

/// Grant construction for one grants pass. Holds the principal tables and
/// remembers resolved descriptors.
pub(crate) struct GrantAssembler<'a> {
    api: &'a dyn DevOpsApi,
    directory: PrincipalDirectory,
    sync_grant_sources: bool,
    resolved: HashMap<String, Option<Principal>>,
}

impl<'a> GrantAssembler<'a> {
    pub(crate) fn new(
        api: &'a dyn DevOpsApi,
        directory: PrincipalDirectory,
        sync_grant_sources: bool,
    ) -> Self {
        Self {
            api,
            directory,
            sync_grant_sources,
            resolved: HashMap::new(),
        }
    }

    /// Load the principal tables and build an assembler.
    pub(crate) async fn load(
        api: &'a dyn DevOpsApi,
        sync_grant_sources: bool,
    ) -> Result<GrantAssembler<'a>, ApiError> {
        let directory = PrincipalDirectory::load(api).await?;
        Ok(Self::new(api, directory, sync_grant_sources))
    }

    async fn principal(&mut self, descriptor: &str) -> Result<Option<Principal>, ApiError> {
        if let Some(known) = self.resolved.get(descriptor) {
            return Ok(known.clone());
        }
        let principal = self.directory.resolve(self.api, descriptor).await?;
        if principal.is_none() {
            warn!("skipping entries for unresolved principal {descriptor}");
        }
        self.resolved
            .insert(descriptor.to_owned(), principal.clone());
        Ok(principal)
    }

    fn grant(&self, entitlement: &Entitlement, principal: &Principal) -> Grant {
        let grant = Grant::new(entitlement, principal.resource_id());
        if self.sync_grant_sources && principal.is_container() {
            grant.with_expandable(principal.source_entitlement_ids(), true)
        } else {
            grant
        }
    }

    /// Mask-compare grants for a project or repository over the ACL each
    /// namespace keys to `resource`.
    pub(crate) async fn read_write_grants(
        &mut self,
        resource: &Resource,
        namespaces: &[SecurityNamespace],
        level: &str,
    ) -> Result<Vec<Grant>, ApiError> {
        let scope = AclScope::from(resource);
        let mut seen = HashSet::new();
        let mut grants = vec![];

        for namespace in unique_namespaces(namespaces) {
            let token = token_for(&namespace.namespace_id, &scope);
            if token.is_empty() {
                warn!(
                    "no security token for namespace {} ({})",
                    namespace.name, namespace.namespace_id
                );
                continue;
            }
            let acls = self
                .api
                .query_access_control_lists(namespace.namespace_id, Some(token))
                .await?;
            let read = read_write_entitlement(resource, namespace, Access::Read, level);
            let write = read_write_entitlement(resource, namespace, Access::Write, level);

            for (descriptor, ace) in entries(&acls) {
                let Some(principal) = self.principal(descriptor).await? else {
                    continue;
                };
                let decision = evaluate_read_write(ace, namespace);
                for (granted, entitlement) in [(decision.read, &read), (decision.write, &write)] {
                    if !granted {
                        continue;
                    }
                    let grant = self.grant(entitlement, &principal);
                    if seen.insert(grant.id.clone()) {
                        grants.push(grant);
                    }
                }
            }
        }
        Ok(grants)
    }

    /// Bit-direct grants for a namespace. Group and team principals scoped to
    /// a project receive the project-prefixed entitlement.
    pub(crate) async fn action_grants(
        &mut self,
        resource: &Resource,
        actions: &[ActionDefinition],
        acls: &[AccessControlList],
    ) -> Result<Vec<Grant>, ApiError> {
        let mut seen = HashSet::new();
        let mut grants = vec![];

        for action in actions {
            let (Some(bit), Some(_)) = (action.bit, action.name.as_ref()) else {
                continue;
            };
            let Some(label) = ActionLabel::of(action) else {
                continue;
            };

            for (descriptor, ace) in entries(acls) {
                let Some(principal) = self.principal(descriptor).await? else {
                    continue;
                };
                let decision = evaluate_action(ace, bit);
                for (granted, permission) in [
                    (decision.allowed, Permission::Allow),
                    (decision.denied, Permission::Deny),
                ] {
                    if !granted {
                        continue;
                    }
                    let scope = principal.scope();
                    let entitlement = action_entitlement(resource, permission, &label, scope);
                    let mut v1 = [
                        permission.as_str(),
                        resource.id.resource.as_str(),
                        principal.id(),
                        label.name,
                    ]
                    .join(":");
                    if let Some(scope) = scope {
                        v1 = format!("{scope}:{v1}");
                    }
                    let grant = self
                        .grant(&entitlement, &principal)
                        .with_v1_identifier(v1);
                    if seen.insert(grant.id.clone()) {
                        grants.push(grant);
                    }
                }
            }
        }
        Ok(grants)
    }
}

/// Every entry of `acls` with its descriptor. Entries that omit the
/// descriptor fall back to their dictionary key.
fn entries(acls: &[AccessControlList]) -> impl Iterator<Item = (&str, &AccessControlEntry)> {
    acls.iter()
        .flat_map(|acl| acl.aces_dictionary.iter())
        .map(|(key, ace)| {
            let descriptor = if ace.descriptor.is_empty() {
                key.as_str()
            } else {
                ace.descriptor.as_str()
            };
            (descriptor, ace)
        })
}
