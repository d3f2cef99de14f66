//! In-memory file system implementation

use crate::error::{VfsError, VfsResult};
use crate::VirtualFileSystem;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

/// An in-memory file system implementation.
///
/// All files are stored in memory using a `BTreeMap`, making it suitable
/// for tests and for workspaces materialized from an execution request.
///
/// # Example
/// ```
/// use fluxo_vfs::{MemoryFileSystem, VirtualFileSystem};
/// use std::path::Path;
///
/// let fs = MemoryFileSystem::new();
/// fs.write_file(Path::new("/main.fxo"), b"console.log(1)").unwrap();
/// assert!(fs.is_file(Path::new("/main.fxo")));
/// ```
#[derive(Debug, Clone)]
pub struct MemoryFileSystem {
    files: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryFileSystem {
    /// Create a new empty memory file system.
    pub fn new() -> Self {
        Self {
            files: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Create a new memory file system pre-populated with files.
    ///
    /// # Arguments
    /// * `files` - Iterator of (path, content) tuples
    pub fn with_files<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<u8>)>,
        S: AsRef<str>,
    {
        let fs = Self::new();
        {
            let mut map = fs.files.write().unwrap();
            for (path, content) in files {
                map.insert(normalize_path_str(path.as_ref()), content);
            }
        }
        fs
    }

    /// Create a new memory file system from (path, text) pairs.
    pub fn with_sources<I, S, T>(sources: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self::with_files(
            sources
                .into_iter()
                .map(|(p, t)| (p.as_ref().to_string(), t.as_ref().as_bytes().to_vec())),
        )
    }

    /// Normalize a path for internal storage.
    fn normalize_path(&self, path: &Path) -> String {
        normalize_path_str(&path.to_string_lossy())
    }
}

/// Forward slashes only, for cross-platform key stability.
fn normalize_path_str(path: &str) -> String {
    path.replace('\\', "/")
}

impl Default for MemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualFileSystem for MemoryFileSystem {
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>> {
        let normalized = self.normalize_path(path);
        let files = self.files.read().map_err(|_| VfsError::Custom {
            message: String::from("Lock poisoned"),
        })?;

        files
            .get(&normalized)
            .cloned()
            .ok_or_else(|| VfsError::NotFound { path: normalized })
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()> {
        let normalized = self.normalize_path(path);
        let mut files = self.files.write().map_err(|_| VfsError::Custom {
            message: String::from("Lock poisoned"),
        })?;
        files.insert(normalized, content.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let normalized = self.normalize_path(path);
        match self.files.read() {
            Ok(files) => files.contains_key(&normalized),
            Err(_) => false,
        }
    }

    fn is_file(&self, path: &Path) -> bool {
        // In the memory FS every stored entry is a file
        self.exists(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        // A directory exists when some file lives under it
        let mut prefix = self.normalize_path(path);
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        match self.files.read() {
            Ok(files) => files.keys().any(|k| k.starts_with(&prefix)),
            Err(_) => false,
        }
    }

    fn list_files(&self, root: &Path) -> VfsResult<Vec<String>> {
        let mut prefix = self.normalize_path(root);
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        let files = self.files.read().map_err(|_| VfsError::Custom {
            message: String::from("Lock poisoned"),
        })?;
        // BTreeMap iteration keeps the listing sorted and stable
        Ok(files
            .keys()
            .filter(|k| prefix == "/" || k.starts_with(&prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_fs_is_empty() {
        let fs = MemoryFileSystem::new();
        assert!(!fs.exists(Path::new("/anything.fxo")));
    }

    #[test]
    fn test_write_and_read() {
        let fs = MemoryFileSystem::new();
        let path = Path::new("/test.fxo");

        fs.write_file(path, b"console.log(1)").unwrap();
        assert_eq!(fs.read_file(path).unwrap(), b"console.log(1)");
    }

    #[test]
    fn test_read_nonexistent() {
        let fs = MemoryFileSystem::new();
        let result = fs.read_file(Path::new("/nonexistent.fxo"));

        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), VfsError::NotFound { .. }));
    }

    #[test]
    fn test_overwrite_file() {
        let fs = MemoryFileSystem::new();
        let path = Path::new("/overwrite.fxo");

        fs.write_file(path, b"first").unwrap();
        fs.write_file(path, b"second").unwrap();
        assert_eq!(fs.read_file(path).unwrap(), b"second");
    }

    #[test]
    fn test_with_sources() {
        let fs = MemoryFileSystem::with_sources([("/a.fxo", "aa"), ("/b.fxm", "bb")]);
        assert_eq!(fs.read_to_string(Path::new("/a.fxo")).unwrap(), "aa");
        assert_eq!(fs.read_to_string(Path::new("/b.fxm")).unwrap(), "bb");
    }

    #[test]
    fn test_read_to_string_rejects_invalid_utf8() {
        let fs = MemoryFileSystem::with_files([("/bad.fxo", vec![0xff, 0xfe])]);
        let result = fs.read_to_string(Path::new("/bad.fxo"));
        assert!(matches!(result.unwrap_err(), VfsError::NotUtf8 { .. }));
    }

    #[test]
    fn test_is_dir_by_prefix() {
        let fs = MemoryFileSystem::with_sources([("/lib/math.fxm", "x")]);
        assert!(fs.is_dir(Path::new("/lib")));
        assert!(!fs.is_dir(Path::new("/other")));
        assert!(!fs.is_dir(Path::new("/lib/math.fxm")));
    }

    #[test]
    fn test_list_files_sorted_and_scoped() {
        let fs = MemoryFileSystem::with_sources([
            ("/src/b.fxo", "b"),
            ("/src/a.fxm", "a"),
            ("/elsewhere/c.fxo", "c"),
        ]);

        let listed = fs.list_files(Path::new("/src")).unwrap();
        assert_eq!(listed, vec!["/src/a.fxm".to_string(), "/src/b.fxo".to_string()]);

        let all = fs.list_files(Path::new("/")).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_clone_shares_data() {
        let fs1 = MemoryFileSystem::new();
        let path = Path::new("/shared.fxo");

        fs1.write_file(path, b"shared").unwrap();

        let fs2 = fs1.clone();
        assert!(fs2.exists(path));

        fs2.write_file(path, b"modified").unwrap();
        assert_eq!(fs1.read_file(path).unwrap(), b"modified");
    }
}
