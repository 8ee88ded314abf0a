use bytes::Bytes;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Cursor, Read, Seek};
use std::path::PathBuf;
use std::sync::Arc;

/// An open file handle produced by a [`FileStore`].
pub trait StoreFile: Read + Seek + Send + std::fmt::Debug {
    /// Byte size of the file.
    fn size(&self) -> io::Result<u64>;
}

/// An abstract hierarchical file store, opened by logical request path.
///
/// Paths are rooted, `/`-separated request paths (e.g. `/css/site.css.gz`).
/// Any open failure is treated by callers as "no such file" — stores never
/// abort a request.
pub trait FileStore: Send + Sync {
    /// Opens the file at the given logical path.
    fn open(&self, path: &str) -> io::Result<Box<dyn StoreFile>>;
}

impl StoreFile for fs::File {
    fn size(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }
}

impl StoreFile for Cursor<Bytes> {
    fn size(&self) -> io::Result<u64> {
        Ok(self.get_ref().len() as u64)
    }
}

/// A [`FileStore`] rooted at a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Creates a store serving files below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FileStore for DirStore {
    fn open(&self, path: &str) -> io::Result<Box<dyn StoreFile>> {
        let rel = path.trim_start_matches('/');
        // Request paths are lexically cleaned before probing, but a store can
        // be used directly: refuse anything that would escape the root.
        if rel.split('/').any(|c| c == "..") {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "path escapes store root",
            ));
        }
        let file = fs::File::open(self.root.join(rel))?;
        if file.metadata()?.is_dir() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "is a directory"));
        }
        Ok(Box::new(file))
    }
}

/// An in-memory [`FileStore`] mapping logical paths to byte contents.
///
/// Useful for embedded assets and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: HashMap<String, Bytes>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file under the given logical path.
    pub fn insert(mut self, path: impl Into<String>, contents: impl Into<Bytes>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }
}

impl FileStore for MemoryStore {
    fn open(&self, path: &str) -> io::Result<Box<dyn StoreFile>> {
        match self.files.get(path) {
            Some(contents) => Ok(Box::new(Cursor::new(contents.clone()))),
            None => Err(io::Error::from(io::ErrorKind::NotFound)),
        }
    }
}

/// An ordered overlay of file stores behind a single open operation.
///
/// `open` tries each store in turn and returns the first success, so earlier
/// stores shadow later ones for colliding paths. If every store fails, the
/// last store's error is returned.
#[derive(Clone, Default)]
pub struct StoreChain {
    stores: Vec<Arc<dyn FileStore>>,
}

impl StoreChain {
    /// Creates an empty chain. Opening through an empty chain always fails
    /// with [`io::ErrorKind::NotFound`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a store at the lowest precedence position.
    pub fn push(&mut self, store: impl FileStore + 'static) {
        self.stores.push(Arc::new(store));
    }
}

impl FileStore for StoreChain {
    fn open(&self, path: &str) -> io::Result<Box<dyn StoreFile>> {
        let mut last_err = None;
        for store in &self.stores {
            match store.open(path) {
                Ok(file) => return Ok(file),
                Err(err) => last_err = Some(err),
            }
        }
        Err(last_err.unwrap_or_else(|| io::Error::from(io::ErrorKind::NotFound)))
    }
}

impl std::fmt::Debug for StoreChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreChain")
            .field("stores", &self.stores.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn read_all(mut file: Box<dyn StoreFile>) -> Vec<u8> {
        let mut out = Vec::new();
        file.read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_memory_store_hit_and_miss() {
        let store = MemoryStore::new().insert("/a.txt", &b"hello"[..]);

        assert_eq!(read_all(store.open("/a.txt").unwrap()), b"hello");
        assert_eq!(
            store.open("/missing").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn test_store_file_size() {
        let store = MemoryStore::new().insert("/a.txt", &b"hello"[..]);
        assert_eq!(store.open("/a.txt").unwrap().size().unwrap(), 5);
    }

    #[test]
    fn test_empty_chain_is_not_found() {
        let chain = StoreChain::new();
        assert_eq!(
            chain.open("/anything").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn test_chain_first_success_wins() {
        let mut chain = StoreChain::new();
        chain.push(MemoryStore::new().insert("/a.txt", &b"first"[..]));
        chain.push(
            MemoryStore::new()
                .insert("/a.txt", &b"second"[..])
                .insert("/b.txt", &b"only"[..]),
        );

        assert_eq!(read_all(chain.open("/a.txt").unwrap()), b"first");
        assert_eq!(read_all(chain.open("/b.txt").unwrap()), b"only");
        assert!(chain.open("/c.txt").is_err());
    }

    #[test]
    fn test_dir_store_opens_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = fs::File::create(dir.path().join("file.txt")).unwrap();
        f.write_all(b"on disk").unwrap();

        let store = DirStore::new(dir.path());
        assert_eq!(read_all(store.open("/file.txt").unwrap()), b"on disk");
        assert!(store.open("/nope.txt").is_err());
    }

    #[test]
    fn test_dir_store_rejects_parent_components() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirStore::new(dir.path().join("sub"));
        assert_eq!(
            store.open("/../secret").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn test_dir_store_directory_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let store = DirStore::new(dir.path());
        assert!(store.open("/sub").is_err());
    }
}
