use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Correlation key for one saga execution.
///
/// Supplied by the caller and passed to every forward, confirm and
/// compensating call so each collaborator can locate its own staged state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Prefix used by [`TransactionId::generate`].
    pub const GENERATED_PREFIX: &'static str = "ENR-";

    /// Creates a transaction ID from a caller-supplied token.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh, random transaction ID (`ENR-<uuid>`).
    pub fn generate() -> Self {
        Self(format!(
            "{}{}",
            Self::GENERATED_PREFIX,
            Uuid::new_v4().simple()
        ))
    }

    /// Returns the transaction ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TransactionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TransactionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for TransactionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
