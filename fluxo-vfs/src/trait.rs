//! VirtualFileSystem trait definition

use crate::error::{VfsError, VfsResult};
use std::path::Path;

/// Virtual File System trait
///
/// Provides a unified interface for file operations, decoupling the engine
/// from specific file system implementations. The execution engine performs
/// all source I/O through this trait and never touches `std::fs` directly.
///
/// # Implementations
/// - `MemoryFileSystem`: In-memory file system
/// - `NativeFileSystem`: Native OS file system
pub trait VirtualFileSystem: Send + Sync {
    /// Read file contents
    ///
    /// # Arguments
    /// * `path` - File path
    ///
    /// # Returns
    /// File contents as bytes, or VfsError
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>>;

    /// Write file contents
    ///
    /// Creates the file if it doesn't exist, truncates it if it does.
    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()>;

    /// Check if path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a file
    fn is_file(&self, path: &Path) -> bool;

    /// Check if path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// List every file at or below `root`, as normalized `/`-separated
    /// paths in stable (sorted) order
    ///
    /// Used by the workspace runner to enumerate the script and module
    /// files of an execution request.
    fn list_files(&self, root: &Path) -> VfsResult<Vec<String>>;

    /// Read file contents as UTF-8 text
    ///
    /// Default implementation on top of [`Self::read_file`].
    fn read_to_string(&self, path: &Path) -> VfsResult<String> {
        let bytes = self.read_file(path)?;
        String::from_utf8(bytes).map_err(|_| VfsError::NotUtf8 {
            path: path.to_string_lossy().to_string(),
        })
    }
}
