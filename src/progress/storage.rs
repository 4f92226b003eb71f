use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use fs2::FileExt;
use log::{debug, warn};

use crate::config::{BackendKind, StoreConfig};
use crate::progress::errors::ProgressError;
use crate::progress::types::PlayerState;

/// Well-known key the whole player document is stored under.
pub const DEFAULT_STORAGE_KEY: &str = "wonderkids_gamification";

const SLED_TREE: &str = "progress";

/// A minimal key-value store holding whole serialized documents.
pub trait StateBackend {
    fn read(&self, key: &str) -> Result<Option<String>, ProgressError>;
    fn write(&self, key: &str, document: &str) -> Result<(), ProgressError>;
    fn remove(&self, key: &str) -> Result<(), ProgressError>;
    /// Short human-readable location for logs and status output.
    fn describe(&self) -> String;
}

impl<B: StateBackend + ?Sized> StateBackend for Rc<B> {
    fn read(&self, key: &str) -> Result<Option<String>, ProgressError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, document: &str) -> Result<(), ProgressError> {
        (**self).write(key, document)
    }

    fn remove(&self, key: &str) -> Result<(), ProgressError> {
        (**self).remove(key)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// One pretty-printed JSON file per key under `dir`.
///
/// Reads take a shared lock and writes an exclusive one so a second process
/// (e.g. the CLI run while a game shell is open) never sees a half-written file.
pub struct JsonFileBackend {
    dir: PathBuf,
}

impl JsonFileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

impl StateBackend for JsonFileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, ProgressError> {
        let path = self.path_for(key);
        let mut f = match fs::OpenOptions::new().read(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        f.lock_shared()?;
        let mut s = String::new();
        let read = f.read_to_string(&mut s);
        let _ = f.unlock();
        read?;
        let cleaned = s.trim_start_matches('\0').trim();
        if cleaned.is_empty() {
            return Ok(None);
        }
        Ok(Some(cleaned.to_string()))
    }

    fn write(&self, key: &str, document: &str) -> Result<(), ProgressError> {
        ensure_dir(&self.dir)?;
        let path = self.path_for(key);
        let mut f = fs::OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)?;
        f.lock_exclusive()?;
        // Truncate only once the lock is held
        let result = (|| -> std::io::Result<()> {
            f.seek(SeekFrom::Start(0))?;
            f.set_len(0)?;
            f.write_all(document.as_bytes())?;
            f.flush()?;
            f.sync_all()
        })();
        let _ = f.unlock();
        result?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ProgressError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn describe(&self) -> String {
        format!("json:{}", self.dir.display())
    }
}

/// Sled-backed store: one key in a dedicated tree, flushed on every write.
pub struct SledBackend {
    _db: sled::Db,
    tree: sled::Tree,
    path: PathBuf,
}

impl SledBackend {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ProgressError> {
        let path_ref = path.as_ref();
        fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let tree = db.open_tree(SLED_TREE)?;
        Ok(Self {
            _db: db,
            tree,
            path: path_ref.to_path_buf(),
        })
    }
}

impl StateBackend for SledBackend {
    fn read(&self, key: &str) -> Result<Option<String>, ProgressError> {
        let Some(bytes) = self.tree.get(key.as_bytes())? else {
            return Ok(None);
        };
        Ok(Some(std::str::from_utf8(&bytes)?.to_string()))
    }

    fn write(&self, key: &str, document: &str) -> Result<(), ProgressError> {
        self.tree.insert(key.as_bytes(), document.as_bytes())?;
        self.tree.flush()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ProgressError> {
        self.tree.remove(key.as_bytes())?;
        self.tree.flush()?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("sled:{}", self.path.display())
    }
}

/// In-process map. Nothing survives the process; writes can be made to fail
/// to exercise the unsaved-progress path.
#[derive(Default)]
pub struct MemoryBackend {
    docs: RefCell<HashMap<String, String>>,
    fail_writes: Cell<bool>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following write and remove fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Put a raw document in place, as if an earlier run had written it.
    pub fn insert_raw(&self, key: &str, document: &str) {
        self.docs
            .borrow_mut()
            .insert(key.to_string(), document.to_string());
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.docs.borrow().get(key).cloned()
    }
}

impl StateBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, ProgressError> {
        Ok(self.docs.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, document: &str) -> Result<(), ProgressError> {
        if self.fail_writes.get() {
            return Err(ProgressError::Unavailable("memory store write refused".into()));
        }
        self.docs
            .borrow_mut()
            .insert(key.to_string(), document.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ProgressError> {
        if self.fail_writes.get() {
            return Err(ProgressError::Unavailable("memory store remove refused".into()));
        }
        self.docs.borrow_mut().remove(key);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Loads and saves the single player document under one key.
pub struct StateStore {
    backend: Box<dyn StateBackend>,
    key: String,
}

impl StateStore {
    pub fn new(backend: Box<dyn StateBackend>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// Build the backend named in the `[store]` config section.
    pub fn from_config(config: &StoreConfig) -> Result<Self, ProgressError> {
        let key = config.storage_key.trim();
        if key.is_empty() {
            return Err(ProgressError::Config("storage_key must not be empty".into()));
        }
        let backend: Box<dyn StateBackend> = match config.backend {
            BackendKind::Json => Box::new(JsonFileBackend::new(&config.data_dir)),
            BackendKind::Sled => Box::new(SledBackend::open(Path::new(&config.data_dir).join("sled"))?),
            BackendKind::Memory => Box::new(MemoryBackend::new()),
        };
        Ok(Self::new(backend, key))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Where an undecodable document is copied before it is replaced.
    pub fn quarantine_key(&self) -> String {
        format!("{}.corrupt", self.key)
    }

    pub fn describe(&self) -> String {
        format!("{} [{}]", self.backend.describe(), self.key)
    }

    /// Fetch the stored document. Missing, unreadable or undecodable state all
    /// come back as `None`. An undecodable document is first copied to
    /// [`StateStore::quarantine_key`] so the fresh state written over it does
    /// not destroy it.
    pub fn load(&self) -> Option<PlayerState> {
        let raw = match self.backend.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no saved progress under {}", self.describe());
                return None;
            }
            Err(e) => {
                warn!("unable to read saved progress from {}: {}", self.describe(), e);
                return None;
            }
        };
        match serde_json::from_str::<PlayerState>(&raw) {
            Ok(state) => Some(state),
            Err(e) => {
                let quarantine = self.quarantine_key();
                warn!(
                    "discarding unreadable progress document in {} (copy kept under {}): {}",
                    self.describe(),
                    quarantine,
                    e
                );
                if let Err(e) = self.backend.write(&quarantine, &raw) {
                    warn!("could not keep a copy of the unreadable document: {}", e);
                }
                None
            }
        }
    }

    /// Serialize and write the whole document.
    pub fn save(&self, state: &PlayerState) -> Result<(), ProgressError> {
        let document = serde_json::to_string_pretty(state)?;
        self.backend.write(&self.key, &document)
    }

    /// Drop the stored document entirely.
    pub fn clear(&self) -> Result<(), ProgressError> {
        self.backend.remove(&self.key)
    }
}
