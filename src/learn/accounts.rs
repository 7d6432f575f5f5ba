//! JSON-backed user accounts and lesson progress.
//!
//! The whole store is one JSON object keyed by username. It is read in full on
//! [`AccountStore::load`] and written in full on every [`AccountStore::save`].

use crate::error::AccountError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default account file name, relative to the working directory
pub const DEFAULT_ACCOUNTS_FILE: &str = "users.json";

/// Counters recorded when the account is created
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(default)]
    pub completed_lessons: u32,
    #[serde(default)]
    pub quiz_accuracy: u32,
}

/// Lesson id -> completed
pub type Progress = BTreeMap<String, bool>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub password: String,
    #[serde(default)]
    pub progress: Progress,
    #[serde(default)]
    pub statistics: Statistics,
}

impl Account {
    pub fn new(password: &str) -> Self {
        Self {
            password: password.to_string(),
            progress: Progress::new(),
            statistics: Statistics::default(),
        }
    }

    pub fn has_completed(&self, lesson_id: &str) -> bool {
        self.progress.get(lesson_id).copied().unwrap_or(false)
    }
}

/// Outcome of a login attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Ok,
    UnknownUser,
    WrongPassword,
}

/// Where a load came from, so callers can report it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    File,
    Missing,
    Discarded(String),
}

#[derive(Debug)]
pub struct AccountStore {
    path: PathBuf,
    accounts: BTreeMap<String, Account>,
}

impl AccountStore {
    /// Empty store bound to `path`; nothing is read until [`Self::load`]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            accounts: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the in-memory accounts with the file contents.
    /// A missing, unreadable or malformed file leaves the store empty.
    pub fn load(&mut self) -> LoadSource {
        self.accounts.clear();
        if !self.path.exists() {
            return LoadSource::Missing;
        }

        let parsed = std::fs::read_to_string(&self.path)
            .map_err(|e| e.to_string())
            .and_then(|content| {
                serde_json::from_str::<BTreeMap<String, Account>>(&content)
                    .map_err(|e| e.to_string())
            });

        match parsed {
            Ok(accounts) => {
                self.accounts = accounts;
                LoadSource::File
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "discarding unreadable account data"
                );
                LoadSource::Discarded(e)
            }
        }
    }

    /// Overwrite the account file with the current contents
    pub fn save(&self) -> Result<(), AccountError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.accounts)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn contains(&self, username: &str) -> bool {
        self.accounts.contains_key(username)
    }

    pub fn get(&self, username: &str) -> Option<&Account> {
        self.accounts.get(username)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Create an account with empty progress and persist the store
    pub fn add_user(&mut self, username: &str, password: &str) -> Result<(), AccountError> {
        if self.accounts.contains_key(username) {
            return Err(AccountError::AlreadyExists(username.to_string()));
        }
        self.accounts
            .insert(username.to_string(), Account::new(password));
        if let Err(e) = self.save() {
            self.accounts.remove(username);
            return Err(e);
        }
        Ok(())
    }

    pub fn authenticate(&self, username: &str, password: &str) -> AuthOutcome {
        match self.accounts.get(username) {
            None => AuthOutcome::UnknownUser,
            Some(account) if account.password == password => AuthOutcome::Ok,
            Some(_) => AuthOutcome::WrongPassword,
        }
    }

    pub fn reset_password(&mut self, username: &str, password: &str) -> Result<(), AccountError> {
        let account = self
            .accounts
            .get_mut(username)
            .ok_or_else(|| AccountError::UnknownUser(username.to_string()))?;
        let previous = std::mem::replace(&mut account.password, password.to_string());
        if let Err(e) = self.save() {
            if let Some(account) = self.accounts.get_mut(username) {
                account.password = previous;
            }
            return Err(e);
        }
        Ok(())
    }

    pub fn progress(&self, username: &str) -> Option<&Progress> {
        self.accounts.get(username).map(|a| &a.progress)
    }

    /// Record a completed lesson and persist the store
    pub fn mark_complete(&mut self, username: &str, lesson_id: &str) -> Result<(), AccountError> {
        let account = self
            .accounts
            .get_mut(username)
            .ok_or_else(|| AccountError::UnknownUser(username.to_string()))?;
        account.progress.insert(lesson_id.to_string(), true);
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> AccountStore {
        AccountStore::new(dir.path().join("users.json"))
    }

    fn reopen(dir: &TempDir) -> AccountStore {
        let mut store = store_in(dir);
        store.load();
        store
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        assert_eq!(store.load(), LoadSource::Missing);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_malformed_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("users.json"), "{ not json").unwrap();
        let mut store = store_in(&dir);
        assert!(matches!(store.load(), LoadSource::Discarded(_)));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_load_replaces_memory() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.add_user("alice", "pw").unwrap();
        fs::write(dir.path().join("users.json"), "[]").unwrap();
        store.load();
        assert!(!store.contains("alice"));
    }

    #[test]
    fn test_add_user_persists_schema() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.add_user("alice", "secret").unwrap();

        let raw = fs::read_to_string(dir.path().join("users.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["alice"]["password"], "secret");
        assert!(value["alice"]["progress"].as_object().unwrap().is_empty());
        assert_eq!(value["alice"]["statistics"]["completed_lessons"], 0);
        assert_eq!(value["alice"]["statistics"]["quiz_accuracy"], 0);
    }

    #[test]
    fn test_duplicate_user_rejected() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.add_user("alice", "pw").unwrap();
        assert!(matches!(
            store.add_user("alice", "other"),
            Err(AccountError::AlreadyExists(_))
        ));
        assert_eq!(store.authenticate("alice", "pw"), AuthOutcome::Ok);
    }

    #[test]
    fn test_failed_save_keeps_memory_unchanged() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let mut store = AccountStore::new(blocker.join("users.json"));

        assert!(matches!(
            store.add_user("alice", "pw"),
            Err(AccountError::Save(_))
        ));
        assert!(!store.contains("alice"));
        assert_eq!(store.authenticate("alice", "pw"), AuthOutcome::UnknownUser);
    }

    #[test]
    fn test_failed_reset_keeps_old_password() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested");
        let mut store = AccountStore::new(nested.join("users.json"));
        store.add_user("alice", "old").unwrap();

        fs::remove_dir_all(&nested).unwrap();
        fs::write(&nested, "not a directory").unwrap();
        assert!(store.reset_password("alice", "new").is_err());
        assert_eq!(store.authenticate("alice", "old"), AuthOutcome::Ok);
    }

    #[test]
    fn test_authenticate() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.add_user("alice", "pw").unwrap();
        assert_eq!(store.authenticate("alice", "pw"), AuthOutcome::Ok);
        assert_eq!(
            store.authenticate("alice", "nope"),
            AuthOutcome::WrongPassword
        );
        assert_eq!(store.authenticate("bob", "pw"), AuthOutcome::UnknownUser);
    }

    #[test]
    fn test_reset_password() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.add_user("alice", "old").unwrap();
        store.reset_password("alice", "new").unwrap();

        let reloaded = reopen(&dir);
        assert_eq!(reloaded.authenticate("alice", "new"), AuthOutcome::Ok);
        assert!(matches!(
            store.reset_password("bob", "x"),
            Err(AccountError::UnknownUser(_))
        ));
    }

    #[test]
    fn test_progress_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.add_user("alice", "pw").unwrap();
        store.add_user("bob", "pw").unwrap();
        store.mark_complete("alice", "1").unwrap();
        store.mark_complete("alice", "7").unwrap();
        store.save().unwrap();

        let reloaded = reopen(&dir);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.progress("alice"), store.progress("alice"));
        assert_eq!(reloaded.progress("bob"), store.progress("bob"));
        assert!(reloaded.get("alice").unwrap().has_completed("7"));
        assert!(!reloaded.get("bob").unwrap().has_completed("1"));
    }

    #[test]
    fn test_loads_records_without_optional_fields() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("users.json"),
            r#"{"carol": {"password": "pw", "progress": {"3": true}}}"#,
        )
        .unwrap();
        let store = reopen(&dir);
        let carol = store.get("carol").unwrap();
        assert!(carol.has_completed("3"));
        assert_eq!(carol.statistics, Statistics::default());
    }

    #[test]
    fn test_save_creates_parent_dir() {
        let dir = TempDir::new().unwrap();
        let mut store = AccountStore::new(dir.path().join("nested").join("users.json"));
        store.add_user("alice", "pw").unwrap();
        assert!(dir.path().join("nested").join("users.json").exists());
    }
}
