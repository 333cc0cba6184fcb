//! Persisted node fields.
//!
//! The network produces and consumes [`NodeRecord`]s; encoding them is
//! left to an external codec.

use crate::id::StorageId;

/// Security key value meaning "no key established".
pub const UNSET_SECURITY_KEY: i64 = -1;

/// The fields of a node that survive a save/load cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeRecord {
    /// Owning player id (`-1` when unowned).
    pub player_id: i32,
    /// Last security key seen, or [`UNSET_SECURITY_KEY`].
    pub security_key: i64,
    /// Storage record of the grid the node belonged to.
    pub storage: StorageId,
}

impl NodeRecord {
    /// Whether the record carries an established security key.
    pub fn is_secured(&self) -> bool {
        self.security_key != UNSET_SECURITY_KEY
    }
}
