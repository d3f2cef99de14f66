//! Native file system implementation

use crate::error::{VfsError, VfsResult};
use crate::VirtualFileSystem;
use std::path::Path;

/// A native OS file system implementation.
///
/// Wraps `std::fs` operations behind the `VirtualFileSystem` interface for
/// local project execution.
#[derive(Debug, Clone, Default)]
pub struct NativeFileSystem;

impl NativeFileSystem {
    /// Create a new native file system.
    pub fn new() -> Self {
        Self
    }
}

fn collect_files(dir: &Path, out: &mut Vec<String>) -> VfsResult<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path.to_string_lossy().replace('\\', "/"));
        }
    }
    Ok(())
}

impl VirtualFileSystem for NativeFileSystem {
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VfsError::NotFound {
                    path: path.to_string_lossy().to_string(),
                }
            } else {
                e.into()
            }
        })
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()> {
        std::fs::write(path, content).map_err(|e| e.into())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_files(&self, root: &Path) -> VfsResult<Vec<String>> {
        if !root.is_dir() {
            return Err(VfsError::NotFound {
                path: root.to_string_lossy().to_string(),
            });
        }
        let mut out = Vec::new();
        collect_files(root, &mut out)?;
        out.sort();
        Ok(out)
    }
}
