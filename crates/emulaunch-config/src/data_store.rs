//! Durable boolean flags that survive across cold starts.
//!
//! Writes are staged in memory by `put_bool` and only reach disk on `save`,
//! which goes through a temp file and a rename so readers never observe a
//! half-written store. Entries that are not booleans are carried through
//! untouched so other writers of the same file keep their keys.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataStoreError {
    #[error("Failed to read settings at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse settings at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write settings at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct AppDataStore {
    path: PathBuf,
    values: BTreeMap<String, bool>,
    foreign: toml::Table,
    dirty: bool,
}

impl AppDataStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DataStoreError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Ok(Self {
                path,
                values: BTreeMap::new(),
                foreign: toml::Table::new(),
                dirty: false,
            });
        }

        let content = std::fs::read_to_string(&path).map_err(|source| DataStoreError::Read {
            path: path.clone(),
            source,
        })?;
        let table: toml::Table =
            toml::from_str(&content).map_err(|source| DataStoreError::Parse {
                path: path.clone(),
                source,
            })?;

        let mut values = BTreeMap::new();
        let mut foreign = toml::Table::new();
        for (key, value) in table {
            match value {
                toml::Value::Boolean(flag) => {
                    values.insert(key, flag);
                }
                other => {
                    log::warn!(
                        "Ignoring non-boolean setting '{}' in {}",
                        key,
                        path.display()
                    );
                    foreign.insert(key, other);
                }
            }
        }

        Ok(Self {
            path,
            values,
            foreign,
            dirty: false,
        })
    }

    /// Read a flag, including values staged but not yet saved.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.values.get(key).copied().unwrap_or(default)
    }

    pub fn put_bool(&mut self, key: &str, value: bool) {
        if self.values.insert(key.to_string(), value) != Some(value) {
            self.dirty = true;
        }
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    pub fn save(&mut self) -> Result<(), DataStoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| DataStoreError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut table = self.foreign.clone();
        for (key, flag) in &self.values {
            table.insert(key.clone(), toml::Value::Boolean(*flag));
        }
        let content = toml::to_string_pretty(&table)?;

        let tmp_path = self.path.with_extension("toml.tmp");
        let write_err = |source| DataStoreError::Write {
            path: tmp_path.clone(),
            source,
        };
        let mut file = std::fs::File::create(&tmp_path).map_err(write_err)?;
        file.write_all(content.as_bytes()).map_err(write_err)?;
        // The rename must not become visible before the data is on disk.
        file.sync_all().map_err(write_err)?;
        drop(file);

        std::fs::rename(&tmp_path, &self.path).map_err(|source| DataStoreError::Write {
            path: self.path.clone(),
            source,
        })?;

        self.dirty = false;
        Ok(())
    }
}
