//! Installed web-app detection.
//!
//! Tracks which origins have an installed web app and of which kind.
//! The registry is an explicit dependency handed to whoever needs the
//! lookup; there is no process-wide instance.

use std::collections::HashMap;
use std::sync::Mutex;

/// How a web app is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebAppKind {
    /// Packaged web app with its own task.
    WebApk,
    /// Trusted web activity hosted by another package.
    TrustedWebActivity,
}

/// Registered web apps, keyed by origin.
///
/// Origins are normalized to lowercase on registration and lookup, so
/// callers need not care about case.
pub struct WebAppRegistry {
    entries: Mutex<HashMap<String, Vec<WebAppKind>>>,
}

impl WebAppRegistry {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn register(&self, origin: &str, kind: WebAppKind) {
        let origin = origin.to_lowercase();
        tracing::debug!(%origin, ?kind, "web app registered");
        let mut entries = self.entries.lock().expect("web app registry poisoned");
        entries.entry(origin).or_default().push(kind);
    }

    /// Remove every registration of `kind` for `origin`. No-op when
    /// nothing matches.
    pub fn unregister(&self, origin: &str, kind: WebAppKind) {
        let origin = origin.to_lowercase();
        let mut entries = self.entries.lock().expect("web app registry poisoned");
        if let Some(kinds) = entries.get_mut(&origin) {
            kinds.retain(|existing| *existing != kind);
            if kinds.is_empty() {
                entries.remove(&origin);
            }
        }
    }

    /// Whether at least one WebAPK is registered for `origin`.
    pub fn is_pwa_installed(&self, origin: &str) -> bool {
        self.has_kind(origin, WebAppKind::WebApk)
    }

    /// Whether at least one trusted web activity is registered for
    /// `origin`.
    pub fn is_twa_installed(&self, origin: &str) -> bool {
        self.has_kind(origin, WebAppKind::TrustedWebActivity)
    }

    fn has_kind(&self, origin: &str, kind: WebAppKind) -> bool {
        let origin = origin.to_lowercase();
        let entries = self.entries.lock().expect("web app registry poisoned");
        entries
            .get(&origin)
            .is_some_and(|kinds| kinds.contains(&kind))
    }
}

impl Default for WebAppRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_installed_kinds_separately() {
        let registry = WebAppRegistry::new();
        registry.register("https://app.example", WebAppKind::WebApk);

        assert!(registry.is_pwa_installed("https://app.example"));
        assert!(!registry.is_twa_installed("https://app.example"));
        assert!(!registry.is_pwa_installed("https://other.example"));
    }

    #[test]
    fn origins_are_case_insensitive() {
        let registry = WebAppRegistry::new();
        registry.register("https://App.Example", WebAppKind::TrustedWebActivity);

        assert!(registry.is_twa_installed("https://app.example"));
        assert!(registry.is_twa_installed("HTTPS://APP.EXAMPLE"));
    }

    #[test]
    fn unregister_removes_only_the_given_kind() {
        let registry = WebAppRegistry::new();
        registry.register("https://app.example", WebAppKind::WebApk);
        registry.register("https://app.example", WebAppKind::TrustedWebActivity);

        registry.unregister("https://app.example", WebAppKind::WebApk);
        assert!(!registry.is_pwa_installed("https://app.example"));
        assert!(registry.is_twa_installed("https://app.example"));

        // Unregistering an absent origin is a no-op.
        registry.unregister("https://missing.example", WebAppKind::WebApk);
    }
}
