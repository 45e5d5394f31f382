// Persisted slots: named locations holding one serialized value

use eyre::{Context, Result, eyre};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// A durable key-value location holding a single serialized value
pub trait Slot: Send {
    /// Name of the slot (e.g., "tasks")
    fn name(&self) -> &str;

    /// Read the stored value, `None` if nothing has been written yet
    fn read(&self) -> Result<Option<String>>;

    /// Replace the stored value
    fn write(&self, value: &str) -> Result<()>;
}

/// Slot backed by `<dir>/<name>.json`
///
/// Writes go to a temporary file that is renamed over the slot while an
/// exclusive lock on `<dir>/.<name>.lock` is held.
#[derive(Debug, Clone)]
pub struct FileSlot {
    dir: PathBuf,
    name: String,
}

impl FileSlot {
    pub fn new<P: AsRef<Path>>(dir: P, name: &str) -> Result<Self> {
        Self::validate_name(name)?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
            name: name.to_string(),
        })
    }

    /// Path of the slot file
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.name))
    }

    fn lock_path(&self) -> PathBuf {
        self.dir.join(format!(".{}.lock", self.name))
    }

    fn tmp_path(&self) -> PathBuf {
        self.dir.join(format!(".{}.json.tmp", self.name))
    }

    fn write_tmp(tmp_path: &Path, value: &str) -> Result<()> {
        let mut file = File::create(tmp_path).context("Failed to create temporary slot file")?;
        file.write_all(value.as_bytes()).context("Failed to write temporary slot file")?;
        file.sync_all().context("Failed to sync temporary slot file")?; // Flushed before the rename
        Ok(())
    }

    fn validate_name(name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(eyre!("Slot name cannot be empty"));
        }
        if name.len() > 64 {
            return Err(eyre!("Slot name too long: {} (max 64 chars)", name));
        }
        if !name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
            return Err(eyre!("Invalid slot name: {} (must be alphanumeric with _/-)", name));
        }
        Ok(())
    }
}

impl Slot for FileSlot {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> Result<Option<String>> {
        let path = self.path();
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read slot file {}", path.display())),
        }
    }

    fn write(&self, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).context("Failed to create store directory")?;

        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())
            .context("Failed to open slot lock file")?;
        lock.lock_exclusive().context("Failed to acquire slot lock")?;

        let tmp_path = self.tmp_path();
        let path = self.path();
        let result = Self::write_tmp(&tmp_path, value).and_then(|()| {
            fs::rename(&tmp_path, &path).with_context(|| format!("Failed to replace slot file {}", path.display()))
        });

        if let Err(e) = result {
            match fs::remove_file(&tmp_path) {
                Ok(()) => {}
                Err(rm) if rm.kind() == ErrorKind::NotFound => {}
                Err(rm) => warn!(slot = %self.name, error = ?rm, "Failed to remove temporary slot file"),
            }
            return Err(e);
        }

        debug!(slot = %self.name, bytes = value.len(), "Wrote slot");

        // Lock is released when `lock` is dropped
        Ok(())
    }
}

/// In-memory slot; clones share the same value
#[derive(Debug, Clone)]
pub struct MemorySlot {
    name: String,
    value: Arc<Mutex<Option<String>>>,
}

impl MemorySlot {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a slot that already holds `value`
    pub fn with_value(name: &str, value: &str) -> Self {
        let slot = Self::new(name);
        if let Ok(mut guard) = slot.value.lock() {
            *guard = Some(value.to_string());
        }
        slot
    }
}

impl Slot for MemorySlot {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> Result<Option<String>> {
        let guard = self.value.lock().map_err(|_| eyre!("Memory slot lock poisoned"))?;
        Ok(guard.clone())
    }

    fn write(&self, value: &str) -> Result<()> {
        let mut guard = self.value.lock().map_err(|_| eyre!("Memory slot lock poisoned"))?;
        *guard = Some(value.to_string());
        Ok(())
    }
}
