use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

/// Flat key/value credential file (`credentials.toml`), kept separate from
/// the main config so it can carry stricter file permissions.
pub struct CredentialStore {
    path: PathBuf,
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let creds_data: CredentialsData = toml::from_str(&content)?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let creds_data = CredentialsData {
            data: self.credentials.clone(),
        };
        let content = toml::to_string_pretty(&creds_data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.credentials.get(key)
    }

    pub fn set(&mut self, key: String, value: String) {
        self.credentials.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) {
        self.credentials.remove(key);
    }

    // Convenience methods for specific credentials
    pub fn get_discogs_cookie(&self) -> Option<&String> {
        self.get("discogs_cookie")
    }

    pub fn set_discogs_cookie(&mut self, cookie: String) {
        self.set("discogs_cookie".to_string(), cookie);
    }

    pub fn get_discogs_token(&self) -> Option<&String> {
        self.get("discogs_token")
    }

    pub fn set_discogs_token(&mut self, token: String) {
        self.set("discogs_token".to_string(), token);
    }

    pub fn get_musicbrainz_username(&self) -> Option<&String> {
        self.get("musicbrainz_username")
    }

    pub fn set_musicbrainz_username(&mut self, username: String) {
        self.set("musicbrainz_username".to_string(), username);
    }

    pub fn get_musicbrainz_password(&self) -> Option<&String> {
        self.get("musicbrainz_password")
    }

    pub fn set_musicbrainz_password(&mut self, password: String) {
        self.set("musicbrainz_password".to_string(), password);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_credential_store_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();

        let mut store = CredentialStore::new(path.clone());
        store.set_discogs_token("test_token".to_string());
        store.set_musicbrainz_username("someone".to_string());
        store.save().unwrap();

        let mut loaded_store = CredentialStore::new(path);
        loaded_store.load().unwrap();
        assert_eq!(loaded_store.get_discogs_token(), Some(&"test_token".to_string()));
        assert_eq!(loaded_store.get_musicbrainz_username(), Some(&"someone".to_string()));
    }

    #[test]
    fn test_credential_store_missing_file() {
        let mut store = CredentialStore::new(PathBuf::from("/nonexistent/credentials.toml"));
        store.load().unwrap();
        assert_eq!(store.get_discogs_cookie(), None);
    }

    #[test]
    fn test_credential_store_remove() {
        let mut store = CredentialStore::new(PathBuf::from("/tmp/test"));
        store.set("key1".to_string(), "value1".to_string());
        store.set("key2".to_string(), "value2".to_string());

        assert_eq!(store.get("key1"), Some(&"value1".to_string()));
        store.remove("key1");
        assert_eq!(store.get("key1"), None);
        assert_eq!(store.get("key2"), Some(&"value2".to_string()));
    }
}
