//! Persisted Settings
//!
//! Backend endpoint + key and the AI key are user-supplied on the settings
//! screen and kept in a key-value store (`localStorage` in the browser).
//! Missing backend settings put the app in the "not configured" state.

use std::collections::HashMap;

use reqwest::Url;

use crate::domain::{DomainError, DomainResult};

pub const KEY_BACKEND_URL: &str = "orbit.backend_url";
pub const KEY_BACKEND_KEY: &str = "orbit.backend_key";
pub const KEY_AI_API_KEY: &str = "orbit.ai_api_key";

/// Minimal string key-value persistence
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> DomainResult<()>;
    fn remove(&mut self, key: &str) -> DomainResult<()>;
}

/// HashMap-backed store for native hosts and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> DomainResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> DomainResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// `window.localStorage`
#[cfg(target_arch = "wasm32")]
pub struct BrowserStorage {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl BrowserStorage {
    pub fn open() -> DomainResult<Self> {
        let storage = web_sys::window()
            .and_then(|win| win.local_storage().ok().flatten())
            .ok_or_else(|| DomainError::Internal("localStorage is unavailable".into()))?;
        Ok(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> DomainResult<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| DomainError::Internal(format!("localStorage write failed: {:?}", e)))
    }

    fn remove(&mut self, key: &str) -> DomainResult<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| DomainError::Internal(format!("localStorage remove failed: {:?}", e)))
    }
}

/// Validated connection settings for the hosted backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Project URL without trailing slash
    pub url: String,
    /// Public (anon) API key
    pub anon_key: String,
}

impl BackendConfig {
    pub fn new(url: &str, anon_key: &str) -> DomainResult<Self> {
        let url = url.trim().trim_end_matches('/');
        let anon_key = anon_key.trim();
        if url.is_empty() || anon_key.is_empty() {
            return Err(DomainError::NotConfigured);
        }

        let parsed = Url::parse(url).map_err(|e| DomainError::InvalidInput(format!("Backend URL: {}", e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DomainError::InvalidInput(format!("Backend URL must be http(s), got {}", parsed.scheme())));
        }

        Ok(Self { url: url.to_string(), anon_key: anon_key.to_string() })
    }
}

/// User settings as edited on the settings screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub backend_url: Option<String>,
    pub backend_key: Option<String>,
    pub ai_api_key: Option<String>,
}

impl Settings {
    pub fn load(store: &impl KeyValueStore) -> Self {
        let read = |key: &str| store.get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            backend_url: read(KEY_BACKEND_URL),
            backend_key: read(KEY_BACKEND_KEY),
            ai_api_key: read(KEY_AI_API_KEY),
        }
    }

    /// Write every field; empty/absent values are removed from the store
    pub fn save(&self, store: &mut impl KeyValueStore) -> DomainResult<()> {
        for (key, value) in [
            (KEY_BACKEND_URL, &self.backend_url),
            (KEY_BACKEND_KEY, &self.backend_key),
            (KEY_AI_API_KEY, &self.ai_api_key),
        ] {
            match value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                Some(v) => store.set(key, v)?,
                None => store.remove(key)?,
            }
        }
        Ok(())
    }

    /// Backend settings, if complete and valid
    pub fn backend(&self) -> Option<BackendConfig> {
        let (url, key) = (self.backend_url.as_deref()?, self.backend_key.as_deref()?);
        match BackendConfig::new(url, key) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("[CONFIG] Ignoring backend settings: {}", e);
                None
            }
        }
    }

    pub fn ai_key(&self) -> Option<&str> {
        self.ai_api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_is_not_configured() {
        let settings = Settings::load(&MemoryStorage::new());
        assert_eq!(settings, Settings::default());
        assert!(settings.backend().is_none());
        assert!(settings.ai_key().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let mut store = MemoryStorage::new();
        let settings = Settings {
            backend_url: Some("https://abc.example.co/".into()),
            backend_key: Some(" anon-key ".into()),
            ai_api_key: None,
        };
        settings.save(&mut store).unwrap();

        let loaded = Settings::load(&store);
        let backend = loaded.backend().unwrap();
        assert_eq!(backend.url, "https://abc.example.co");
        assert_eq!(backend.anon_key, "anon-key");
        assert_eq!(store.get(KEY_AI_API_KEY), None);
    }

    #[test]
    fn test_clearing_a_field_removes_the_key() {
        let mut store = MemoryStorage::new();
        store.set(KEY_AI_API_KEY, "old").unwrap();

        Settings::default().save(&mut store).unwrap();
        assert_eq!(store.get(KEY_AI_API_KEY), None);
    }

    #[test]
    fn test_invalid_backend_url_is_rejected() {
        assert!(matches!(BackendConfig::new("not a url", "k"), Err(DomainError::InvalidInput(_))));
        assert!(matches!(BackendConfig::new("ftp://host", "k"), Err(DomainError::InvalidInput(_))));
        assert_eq!(BackendConfig::new("https://host", ""), Err(DomainError::NotConfigured));
    }
}
