//! Local store of confirmed statement → ledger account mappings.
//!
//! A pretty-printed JSON array under the user's ledgerlink home. The set is
//! small (one entry per statement account), so every upsert rewrites the file.

use ledgerlink_core::{AccountMapping, AccountType, StatementAccount};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("mapping store {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct MappingStore {
    path: PathBuf,
    mappings: Vec<AccountMapping>,
}

impl MappingStore {
    /// A store with no mappings that will persist to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mappings: Vec::new(),
        }
    }

    /// Load mappings from `path`. A missing file is an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let raw = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::empty(path)),
            Err(source) => {
                return Err(StoreError::Io {
                    op: "read",
                    path,
                    source,
                });
            }
        };

        let mappings = match serde_json::from_str(&raw) {
            Ok(m) => m,
            Err(source) => return Err(StoreError::Corrupt { path, source }),
        };
        Ok(Self { path, mappings })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mappings(&self) -> &[AccountMapping] {
        &self.mappings
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn find(&self, number: &str, account_type: AccountType) -> Option<&AccountMapping> {
        self.mappings.iter().find(|m| m.has_key(number, account_type))
    }

    pub fn find_for(&self, statement: &StatementAccount) -> Option<&AccountMapping> {
        self.find(&statement.number, statement.account_type)
    }

    /// Replace the mapping with the same key (in place) or append, then
    /// persist the whole set.
    pub fn upsert(&mut self, mapping: AccountMapping) -> Result<(), StoreError> {
        let existing = self.mappings.iter_mut().find(|m| {
            m.has_key(&mapping.statement_account_number, mapping.statement_account_type)
        });
        match existing {
            Some(slot) => *slot = mapping,
            None => self.mappings.push(mapping),
        }
        self.save()
    }

    /// Write to a sibling temp file, fsync, then rename over the target.
    pub fn save(&self) -> Result<(), StoreError> {
        let io_err = |op: &'static str, path: &Path| {
            let path = path.to_path_buf();
            move |source| StoreError::Io { op, path, source }
        };

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_err("create", dir))?;
        }

        let json = serde_json::to_string_pretty(&self.mappings)
            .map_err(|e| io_err("serialize", &self.path)(io::Error::other(e)))?;

        let tmp = self.tmp_path();
        let mut f = fs::File::create(&tmp).map_err(io_err("write", &tmp))?;
        f.write_all(json.as_bytes()).map_err(io_err("write", &tmp))?;
        f.sync_all().map_err(io_err("sync", &tmp))?;
        drop(f);

        fs::rename(&tmp, &self.path).map_err(io_err("rename", &self.path))?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "account-mappings.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerlink_core::AccountId;

    fn mapping(number: &str, t: AccountType, id: &str) -> AccountMapping {
        AccountMapping {
            statement_account_number: number.to_string(),
            statement_account_type: t,
            remote_account_id: AccountId::new(id),
            remote_account_name: format!("Account {id}"),
        }
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = MappingStore::load(dir.path().join("account-mappings.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("account-mappings.json");

        let mut store = MappingStore::load(&path).unwrap();
        let m = mapping("05172-5163878", AccountType::Savings, "12");
        store.upsert(m.clone()).unwrap();
        store.upsert(mapping("4519", AccountType::CreditCard, "13")).unwrap();

        let reloaded = MappingStore::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.find("05172-5163878", AccountType::Savings), Some(&m));
        assert!(reloaded.find("05172-5163878", AccountType::Chequing).is_none());
        assert!(!dir.path().join("nested").join("account-mappings.json.tmp").exists());
    }

    #[test]
    fn test_upsert_same_key_overwrites_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("account-mappings.json");
        let mut store = MappingStore::load(&path).unwrap();

        store.upsert(mapping("A", AccountType::Chequing, "1")).unwrap();
        store.upsert(mapping("B", AccountType::Chequing, "2")).unwrap();
        store.upsert(mapping("A", AccountType::Chequing, "3")).unwrap();

        let reloaded = MappingStore::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.mappings()[0].remote_account_id.as_str(), "3");
        assert_eq!(reloaded.mappings()[1].remote_account_id.as_str(), "2");
    }

    #[test]
    fn test_corrupt_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("account-mappings.json");
        fs::write(&path, "{ not json").unwrap();
        let err = MappingStore::load(&path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }), "got {err}");
    }

    #[test]
    fn test_reads_existing_file_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("account-mappings.json");
        fs::write(
            &path,
            r#"[
  {
    "statement_account_number": "4519",
    "statement_account_type": "visa",
    "remote_account_id": "7",
    "remote_account_name": "RBC ION Visa"
  }
]"#,
        )
        .unwrap();
        let store = MappingStore::load(&path).unwrap();
        let m = store.find("4519", AccountType::CreditCard).unwrap();
        assert_eq!(m.remote_account_name, "RBC ION Visa");
    }

    #[test]
    fn test_save_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let mut store = MappingStore::empty(blocker.join("account-mappings.json"));
        let err = store.upsert(mapping("A", AccountType::Chequing, "1")).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        // In-memory state still reflects the upsert
        assert_eq!(store.len(), 1);
    }
}
