//! Persisted flags read by the gate.

use emulaunch_config::AppDataStore;
use std::collections::BTreeMap;

/// Set once the scoped-storage warning has been acknowledged and committed.
pub const STORAGE_WARNING_SHOWN: &str = "storage_warning_shown";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to commit settings: {0}")]
    Commit(String),
}

/// Durable boolean key/value storage with an explicit commit.
///
/// `put_bool` only stages a value. Nothing is durable until `commit`
/// returns `Ok`.
pub trait SettingsStore {
    fn get_bool(&self, key: &str, default: bool) -> bool;

    fn put_bool(&mut self, key: &str, value: bool);

    fn commit(&mut self) -> Result<(), SettingsError>;
}

impl SettingsStore for AppDataStore {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        AppDataStore::get_bool(self, key, default)
    }

    fn put_bool(&mut self, key: &str, value: bool) {
        AppDataStore::put_bool(self, key, value)
    }

    fn commit(&mut self) -> Result<(), SettingsError> {
        self.save().map_err(|e| SettingsError::Commit(e.to_string()))
    }
}

/// Non-durable store for hosts without a settings backend.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    staged: BTreeMap<String, bool>,
    committed: BTreeMap<String, bool>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value as of the last successful commit.
    pub fn committed_bool(&self, key: &str) -> Option<bool> {
        self.committed.get(key).copied()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.staged.get(key).copied().unwrap_or(default)
    }

    fn put_bool(&mut self, key: &str, value: bool) {
        self.staged.insert(key.to_string(), value);
    }

    fn commit(&mut self) -> Result<(), SettingsError> {
        self.committed = self.staged.clone();
        Ok(())
    }
}
