//! Functionality for the Azure DevOps write path

pub(crate) mod accounts;
pub(crate) mod membership;

pub(crate) use accounts::create_account;
pub(crate) use membership::{add_member, remove_member};
