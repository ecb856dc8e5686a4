//! Permission resolution: maps security-namespace ACLs onto entitlements
//! and grants.

pub(crate) mod assemble;
pub(crate) mod evaluate;
pub(crate) mod namespaces;
pub(crate) mod principal;
pub(crate) mod token;

pub(crate) use assemble::{action_entitlements, read_write_entitlements, GrantAssembler};
pub(crate) use namespaces::{list_actions, list_security_namespaces, WellKnownNamespace};
pub(crate) use principal::{Principal, PrincipalDirectory};
