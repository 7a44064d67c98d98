//! Completion Store
//!
//! Persists the set of completed flows between sessions. The engine reads the
//! set once at startup and writes it whenever a flow is newly completed.
//!
//! # Stores
//!
//! | Store           | Medium                         |
//! |-----------------|--------------------------------|
//! | JsonFileStore   | `{"completedFlows": [...]}`    |
//! | MemoryStore     | process memory (shareable)     |
//!
//! Failures surface as `GuidepostError::Storage`; the engine decides how to
//! degrade, never the store.

use crate::error::{GuidepostError, Result};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Host capability for loading and saving completion state
pub trait CompletionStore {
    fn load(&self) -> Result<BTreeSet<String>>;
    fn save(&mut self, completed: &BTreeSet<String>) -> Result<()>;
    /// Short description for logs
    fn describe(&self) -> String;
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompletionFile {
    #[serde(default)]
    completed_flows: BTreeSet<String>,
}

/// JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CompletionStore for JsonFileStore {
    fn load(&self) -> Result<BTreeSet<String>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => {
                return Err(GuidepostError::storage(format!(
                    "cannot read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };
        let file: CompletionFile = serde_json::from_str(&content).map_err(|e| {
            GuidepostError::storage(format!("cannot parse {}: {}", self.path.display(), e))
        })?;
        Ok(file.completed_flows)
    }

    fn save(&mut self, completed: &BTreeSet<String>) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let file = CompletionFile {
            completed_flows: completed.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        fs::write(&self.path, json).map_err(|e| {
            GuidepostError::storage(format!("cannot write {}: {}", self.path.display(), e))
        })
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// In-memory store; clones share the same set
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<BTreeSet<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_completed<I, S>(completed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner: Rc::new(RefCell::new(completed.into_iter().map(Into::into).collect())),
        }
    }

    /// Snapshot of the stored set
    pub fn snapshot(&self) -> BTreeSet<String> {
        self.inner.borrow().clone()
    }
}

impl CompletionStore for MemoryStore {
    fn load(&self) -> Result<BTreeSet<String>> {
        Ok(self.snapshot())
    }

    fn save(&mut self, completed: &BTreeSet<String>) -> Result<()> {
        *self.inner.borrow_mut() = completed.clone();
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
