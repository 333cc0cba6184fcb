//! Link authorization.

use gridlink_core::UNSET_SECURITY_KEY;

/// Decides whether a newly discovered link may form.
///
/// A rejected link is not created; the initiating node's owner gets a
/// deferred `security_break` callback instead.
pub trait SecurityPolicy: Send + Sync {
    /// Whether the node holding `local_key` may link to one holding
    /// `remote_key`.
    fn allows(&self, local_key: i64, remote_key: i64) -> bool;
}

/// Refuses to join a secured remote unless the local key matches.
///
/// A remote without a key accepts anyone; a remote with a key only
/// accepts the same key.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyMatchPolicy;

impl SecurityPolicy for KeyMatchPolicy {
    fn allows(&self, local_key: i64, remote_key: i64) -> bool {
        remote_key == UNSET_SECURITY_KEY || local_key == remote_key
    }
}

/// Allows every link.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenPolicy;

impl SecurityPolicy for OpenPolicy {
    fn allows(&self, _local_key: i64, _remote_key: i64) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_match_rules() {
        let p = KeyMatchPolicy;
        assert!(p.allows(UNSET_SECURITY_KEY, UNSET_SECURITY_KEY));
        assert!(p.allows(42, UNSET_SECURITY_KEY));
        assert!(p.allows(42, 42));
        assert!(!p.allows(UNSET_SECURITY_KEY, 42));
        assert!(!p.allows(7, 42));
    }

    #[test]
    fn open_policy_allows_all() {
        assert!(OpenPolicy.allows(UNSET_SECURITY_KEY, 42));
    }
}
