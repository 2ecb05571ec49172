//! Persistence interface for the small amount of state that outlives a
//! session: the saved template list and the personal best.
//!
//! Business logic only sees the [`Persist`] trait. [`JsonFile`] backs it
//! with one JSON document per key in a data directory; [`MemorySlot`] keeps
//! the serialized text in memory for tests and ephemeral sessions.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::templates::SavedTemplate;

/// Storage key of the saved template list.
pub const TEMPLATES_KEY: &str = "aceprep_multi_saved_tests";

/// Storage key of the personal best score.
pub const PERSONAL_BEST_KEY: &str = "aceprep_pb";

/// Load/save access to one persisted value.
pub trait Persist<T>: Send + Sync {
    /// Read the stored value. `Ok(None)` means nothing has been stored yet;
    /// an error means something is stored but cannot be read.
    fn load(&self) -> Result<Option<T>>;

    /// Replace the stored value.
    fn save(&self, value: &T) -> Result<()>;
}

/// A value stored as a JSON file.
pub struct JsonFile<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFile<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T> Persist<T> for JsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    fn load(&self) -> Result<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let value = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;
        Ok(Some(value))
    }

    fn save(&self, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value).context("failed to serialize value")?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // Readers only ever see a complete document.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

/// A value held in memory as serialized JSON text.
pub struct MemorySlot<T> {
    raw: Mutex<Option<String>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> MemorySlot<T> {
    pub fn new() -> Self {
        Self {
            raw: Mutex::new(None),
            _marker: PhantomData,
        }
    }

    /// Start from arbitrary stored text, which need not be valid JSON.
    pub fn with_raw(raw: &str) -> Self {
        Self {
            raw: Mutex::new(Some(raw.to_string())),
            _marker: PhantomData,
        }
    }

    /// The stored text, if any.
    pub fn raw(&self) -> Option<String> {
        self.raw.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl<T> Default for MemorySlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Persist<T> for MemorySlot<T>
where
    T: Serialize + DeserializeOwned,
{
    fn load(&self) -> Result<Option<T>> {
        let raw = self.raw();
        raw.map(|text| serde_json::from_str(&text).context("failed to parse stored value"))
            .transpose()
    }

    fn save(&self, value: &T) -> Result<()> {
        let json = serde_json::to_string(value).context("failed to serialize value")?;
        *self.raw.lock().unwrap_or_else(|e| e.into_inner()) = Some(json);
        Ok(())
    }
}

/// Data directory holding one JSON file per storage key.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    dir: PathBuf,
}

impl LocalStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn templates(&self) -> JsonFile<Vec<SavedTemplate>> {
        JsonFile::new(self.dir.join(format!("{TEMPLATES_KEY}.json")))
    }

    pub fn personal_best(&self) -> JsonFile<i32> {
        JsonFile::new(self.dir.join(format!("{PERSONAL_BEST_KEY}.json")))
    }
}
