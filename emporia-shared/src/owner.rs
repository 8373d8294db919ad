use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies who a cart belongs to.
///
/// Authenticated customers are keyed by account id; anonymous visitors by the
/// opaque session token the identity layer hands us. This core never
/// authenticates — it trusts the key it is given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OwnerKey {
    Account(Uuid),
    Session(String),
}

impl OwnerKey {
    pub fn account(id: Uuid) -> Self {
        Self::Account(id)
    }

    pub fn session(token: impl Into<String>) -> Self {
        Self::Session(token.into())
    }

    pub fn is_account(&self) -> bool {
        matches!(self, Self::Account(_))
    }

    /// Stable string form used as a storage key (redis hash name, owner column).
    pub fn storage_key(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for OwnerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Account(id) => write!(f, "account:{}", id),
            Self::Session(token) => write!(f, "session:{}", token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_is_prefixed() {
        let id = Uuid::new_v4();
        assert_eq!(OwnerKey::account(id).storage_key(), format!("account:{}", id));
        assert_eq!(OwnerKey::session("abc123").storage_key(), "session:abc123");
    }

    #[test]
    fn test_keys_are_distinct_across_kinds() {
        let a = OwnerKey::session("x");
        let b = OwnerKey::session("y");
        assert_ne!(a, b);
        assert!(!a.is_account());
    }
}
