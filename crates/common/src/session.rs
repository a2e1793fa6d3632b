//! Anonymous session identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque key identifying an anonymous browser session.
///
/// Only equality matters to the rest of the system: submissions are unique
/// per `(SessionKey, poll)` and listings are scoped by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    /// Wrap a raw key. Empty keys are rejected.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.len() > 64 {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    /// The key as sent in the cookie.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the raw key.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_blank_and_oversized_keys() {
        assert!(SessionKey::new("").is_none());
        assert!(SessionKey::new("   ").is_none());
        assert!(SessionKey::new("x".repeat(65)).is_none());
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        let key = SessionKey::new(" abc ");
        assert_eq!(key.map(SessionKey::into_inner).as_deref(), Some("abc"));
    }
}
