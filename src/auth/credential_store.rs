//! Secret storage behind a get/set/delete interface
//!
//! Two backends: [`MemoryCredentialStore`] for tests and embedding, and
//! [`FileCredentialStore`], a JSON map on disk replaced atomically and kept
//! owner-only on unix.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tempfile::NamedTempFile;

use super::errors::CredentialError;

/// A keyed secret store
pub trait CredentialStore: Send + Sync {
    fn save(&self, key: &str, value: &str) -> Result<(), CredentialError>;
    fn read(&self, key: &str) -> Result<Option<String>, CredentialError>;
    /// Removing an absent key is not an error
    fn delete(&self, key: &str) -> Result<(), CredentialError>;
}

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn save(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<String>, CredentialError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn delete(&self, key: &str) -> Result<(), CredentialError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Credentials kept in a small JSON document
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileCredentialStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, CredentialError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, entries: &BTreeMap<String, String>) -> Result<(), CredentialError> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)?;

        let mut temp_file = NamedTempFile::new_in(parent)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            temp_file
                .as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }
        temp_file.write_all(&serde_json::to_vec_pretty(entries)?)?;
        temp_file.as_file().sync_all()?;
        temp_file.persist(&self.path)?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn save(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        let _guard = self.lock.lock();
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.store(&entries)
    }

    fn read(&self, key: &str) -> Result<Option<String>, CredentialError> {
        let _guard = self.lock.lock();
        Ok(self.load()?.remove(key))
    }

    fn delete(&self, key: &str) -> Result<(), CredentialError> {
        let _guard = self.lock.lock();
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.store(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.read("k").expect("read"), None);
        store.save("k", "v").expect("save");
        assert_eq!(store.read("k").expect("read").as_deref(), Some("v"));
        store.delete("k").expect("delete");
        store.delete("k").expect("delete again");
        assert_eq!(store.read("k").expect("read"), None);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("credentials.json");

        FileCredentialStore::new(&path).save("access_token", "abc").expect("save");
        FileCredentialStore::new(&path).save("refresh_token", "def").expect("save");

        let store = FileCredentialStore::new(&path);
        assert_eq!(store.read("access_token").expect("read").as_deref(), Some("abc"));
        assert_eq!(store.read("refresh_token").expect("read").as_deref(), Some("def"));

        store.delete("access_token").expect("delete");
        assert_eq!(store.read("access_token").expect("read"), None);
        assert_eq!(std::fs::read_dir(dir.path()).expect("read_dir").count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("credentials.json");
        FileCredentialStore::new(&path).save("k", "v").expect("save");
        let mode = std::fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, b"{not json").expect("write");
        assert!(matches!(
            FileCredentialStore::new(&path).read("k"),
            Err(CredentialError::Format(_))
        ));
    }
}
