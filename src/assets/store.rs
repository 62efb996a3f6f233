use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::errors::{Result, ViewerError};

/// Key-value store of raw asset bytes, keyed by asset name.
pub trait PersistenceStore {
    fn put(&self, name: &str, bytes: &[u8]) -> Result<()>;
    fn get(&self, name: &str) -> Result<Option<Arc<[u8]>>>;
    fn keys(&self) -> Result<Vec<String>>;
    fn remove(&self, name: &str) -> Result<()>;
}

/// Shared stores, so the host can keep a handle to the store it gave the viewer.
impl<S: PersistenceStore + ?Sized> PersistenceStore for Arc<S> {
    fn put(&self, name: &str, bytes: &[u8]) -> Result<()> {
        (**self).put(name, bytes)
    }

    fn get(&self, name: &str) -> Result<Option<Arc<[u8]>>> {
        (**self).get(name)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }

    fn remove(&self, name: &str) -> Result<()> {
        (**self).remove(name)
    }
}

/// Process-local store.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<FxHashMap<String, Arc<[u8]>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl PersistenceStore for MemoryStore {
    fn put(&self, name: &str, bytes: &[u8]) -> Result<()> {
        self.inner.write().insert(name.to_owned(), Arc::from(bytes));
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Option<Arc<[u8]>>> {
        Ok(self.inner.read().get(name).cloned())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.inner.read().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn remove(&self, name: &str) -> Result<()> {
        self.inner.write().remove(name);
        Ok(())
    }
}

/// One file per asset under a root directory.
///
/// Names are escaped so any string maps to a single flat file name.
pub struct DirectoryStore {
    root: PathBuf,
}

const EXTENSION: &str = "asset";

impl DirectoryStore {
    /// Opens (and creates if needed) the store directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.{EXTENSION}", escape_name(name)))
    }
}

impl PersistenceStore for DirectoryStore {
    fn put(&self, name: &str, bytes: &[u8]) -> Result<()> {
        std::fs::write(self.path_for(name), bytes)
            .map_err(|err| ViewerError::Persistence(format!("write '{name}': {err}")))
    }

    fn get(&self, name: &str) -> Result<Option<Arc<[u8]>>> {
        match std::fs::read(self.path_for(name)) {
            Ok(data) => Ok(Some(Arc::from(data))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(ViewerError::Persistence(format!("read '{name}': {err}"))),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_stem().and_then(|s| s.to_str()).and_then(unescape_name) {
                keys.push(name);
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn remove(&self, name: &str) -> Result<()> {
        match std::fs::remove_file(self.path_for(name)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(ViewerError::Persistence(format!("remove '{name}': {err}"))),
        }
    }
}

/// Percent-escapes every byte outside `[A-Za-z0-9_-]`.
fn escape_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            out.push(byte as char);
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}

/// Inverse of [`escape_name`]; `None` for anything it could not have produced.
fn unescape_name(escaped: &str) -> Option<String> {
    let bytes = escaped.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            if !hex.iter().all(u8::is_ascii_hexdigit) {
                return None;
            }
            let hex = std::str::from_utf8(hex).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escaping_round_trips_awkward_names() {
        for name in ["blade", "my model.glb", "a/b\\c", "ünïcode", "100%"] {
            let escaped = escape_name(name);
            assert!(!escaped.contains('/') && !escaped.contains('.'));
            assert_eq!(unescape_name(&escaped).as_deref(), Some(name));
        }
    }

    #[test]
    fn malformed_escapes_are_rejected() {
        for bad in ["%+1", "%-1", "%G0", "a%4", "%"] {
            assert_eq!(unescape_name(bad), None, "{bad}");
        }
        assert_eq!(unescape_name("%2B1").as_deref(), Some("+1"));
    }

    #[test]
    fn foreign_files_are_not_listed() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = DirectoryStore::open(dir.path())?;
        store.put("blade", b"{}")?;
        std::fs::write(dir.path().join("%+1.asset"), b"{}")?;
        std::fs::write(dir.path().join("notes.txt"), b"")?;

        assert_eq!(store.keys()?, vec!["blade".to_owned()]);
        Ok(())
    }
}
