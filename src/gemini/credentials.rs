use std::sync::{Arc, Mutex, MutexGuard};

use tracing::info;

/// Resolves the API key for generation calls.
///
/// A key selected in the app for this session takes precedence over the
/// environment variables. Clones share the same session slot.
#[derive(Clone, Default)]
pub struct CredentialStore {
    session_key: Arc<Mutex<Option<String>>>,
    env_vars: Vec<String>,
}

impl CredentialStore {
    /// `env_vars` are checked in order after the session key
    pub fn new(env_vars: Vec<String>) -> Self {
        Self {
            session_key: Arc::default(),
            env_vars,
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<String>> {
        // A poisoned slot still holds a usable value
        self.session_key
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn resolve(&self) -> Option<String> {
        if let Some(key) = self.slot().clone() {
            return Some(key);
        }

        self.env_vars
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
    }

    pub fn has_credential(&self) -> bool {
        self.resolve().is_some()
    }

    /// Store a key chosen in the app; blank input clears the selection
    pub fn select(&self, key: &str) {
        let key = key.trim();
        *self.slot() = (!key.is_empty()).then(|| key.to_string());
        info!(selected = !key.is_empty(), "api key selection updated");
    }

    /// Forget the session key so the user is asked again
    pub fn clear_selection(&self) {
        *self.slot() = None;
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("session_key", &self.slot().as_ref().map(|_| "<redacted>"))
            .field("env_vars", &self.env_vars)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_has_no_credential() {
        let store = CredentialStore::new(Vec::new());
        assert!(!store.has_credential());
    }

    #[test]
    fn test_session_key_is_shared_between_clones() {
        let store = CredentialStore::new(Vec::new());
        let clone = store.clone();

        store.select("  abc123 ");
        assert_eq!(clone.resolve().as_deref(), Some("abc123"));

        clone.clear_selection();
        assert!(!store.has_credential());
    }

    #[test]
    fn test_blank_selection_clears() {
        let store = CredentialStore::new(Vec::new());
        store.select("abc");
        store.select("   ");
        assert!(store.resolve().is_none());
    }

    #[test]
    fn test_debug_redacts_key() {
        let store = CredentialStore::new(Vec::new());
        store.select("secret-key");
        assert!(!format!("{store:?}").contains("secret-key"));
    }
}
