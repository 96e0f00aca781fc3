//! Registry storage — where the registry's newline-delimited JSON lives.
//!
//! The registry only ever reads the whole file or replaces the whole file,
//! so the storage port is two calls wide.  [`FileStorage`] backs a real
//! repository; [`MemoryStorage`] backs tests and previews.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Default registry location, relative to the repository root.
pub const DEFAULT_REGISTRY_PATH: &str = ".github/registry.jsonl";

/// Backing store for the registry file contents.
pub trait RegistryStorage: Send + Sync {
    /// Read the full contents.  `Ok(None)` means nothing has been written yet.
    fn read(&self) -> std::io::Result<Option<String>>;

    /// Replace the full contents.
    fn write(&self, contents: &str) -> std::io::Result<()>;

    /// Human-readable location, used in logs and error messages.
    fn location(&self) -> PathBuf;
}

// ---------------------------------------------------------------------------
// File storage
// ---------------------------------------------------------------------------

/// Registry stored as a single file on disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at [`DEFAULT_REGISTRY_PATH`] under `root`.
    pub fn at_root(root: &Path) -> Self {
        Self::new(root.join(DEFAULT_REGISTRY_PATH))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RegistryStorage for FileStorage {
    fn read(&self) -> std::io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "registry file does not exist");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Write to a sibling temp file, then rename it over the target so a
    /// reader never observes a half-written registry.
    fn write(&self, contents: &str) -> std::io::Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "registry".to_owned());
        let tmp_path = dir.join(format!(".{file_name}.{}.tmp", uuid::Uuid::now_v7().simple()));

        let result = (|| {
            let mut file = std::fs::File::create(&tmp_path)?;
            file.write_all(contents.as_bytes())?;
            file.sync_all()?;
            drop(file);
            std::fs::rename(&tmp_path, &self.path)
        })();

        if result.is_err() {
            let _ = std::fs::remove_file(&tmp_path);
        }
        result
    }

    fn location(&self) -> PathBuf {
        self.path.clone()
    }
}

// ---------------------------------------------------------------------------
// Memory storage
// ---------------------------------------------------------------------------

/// Registry held in memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    contents: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with raw file contents.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
        }
    }

    /// Snapshot of the current contents.
    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RegistryStorage for MemoryStorage {
    fn read(&self) -> std::io::Result<Option<String>> {
        Ok(self.contents())
    }

    fn write(&self, contents: &str) -> std::io::Result<()> {
        let mut guard = self.contents.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(contents.to_owned());
        Ok(())
    }

    fn location(&self) -> PathBuf {
        PathBuf::from("<memory>")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
