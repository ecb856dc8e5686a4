//! Bit evaluation for access control entries.
//!
//! Two modes are used. Generic namespace actions test a single bit of the
//! raw allow/deny masks. Project and repository read/write checks compare
//! the masked effective allow against the namespace's system bit mask, which
//! is not the same as testing the bit: `0 & bit != mask` holds whenever the
//! mask is non-zero.

use crate::nodes::{AccessControlEntry, SecurityNamespace};

/// Outcome for one action in bit-direct mode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ActionDecision {
    pub(crate) allowed: bool,
    pub(crate) denied: bool,
}

/// Outcome for a namespace in mask-compare mode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ReadWriteDecision {
    pub(crate) read: bool,
    pub(crate) write: bool,
}

/// `allow & bit != 0` and `deny & bit != 0`. Missing masks count as zero.
pub(crate) fn evaluate_action(ace: &AccessControlEntry, bit: i64) -> ActionDecision {
    ActionDecision {
        allowed: ace.allow.unwrap_or(0) & bit != 0,
        denied: ace.deny.unwrap_or(0) & bit != 0,
    }
}

/// The inheritance-resolved allow mask when present, else the raw one.
pub(crate) fn effective_allow(ace: &AccessControlEntry) -> i64 {
    ace.extended_info
        .as_ref()
        .and_then(|info| info.effective_allow)
        .or(ace.allow)
        .unwrap_or(0)
}

/// `effective_allow & bit != system_bit_mask` for the read and write bits.
/// A namespace without a read or write bit grants neither.
pub(crate) fn evaluate_read_write(
    ace: &AccessControlEntry,
    namespace: &SecurityNamespace,
) -> ReadWriteDecision {
    let allow = effective_allow(ace);
    let mask = namespace.system_bit_mask.unwrap_or(0);
    let check = |bit: Option<i64>| bit.map_or(false, |bit| allow & bit != mask);
    ReadWriteDecision {
        read: check(namespace.read_permission),
        write: check(namespace.write_permission),
    }
}
