//! Fluxo Virtual File System
//!
//! A virtual file system abstraction with multiple backend implementations.
//! The execution engine reads workspace sources exclusively through this
//! seam, so tests run against [`MemoryFileSystem`] while the CLI runs
//! against [`NativeFileSystem`].
//!
//! # Usage
//! ```
//! use fluxo_vfs::{MemoryFileSystem, VirtualFileSystem};
//! use std::path::Path;
//!
//! let fs = MemoryFileSystem::new();
//! fs.write_file(Path::new("/main.fxo"), b"console.log(1)").unwrap();
//! let content = fs.read_to_string(Path::new("/main.fxo")).unwrap();
//! assert_eq!(content, "console.log(1)");
//! ```

mod error;
mod memory;
mod native;
mod r#trait;

pub use error::{VfsError, VfsResult};
pub use memory::MemoryFileSystem;
pub use native::NativeFileSystem;
pub use r#trait::VirtualFileSystem;

/// Create a new memory-based file system.
pub fn memory_fs() -> MemoryFileSystem {
    MemoryFileSystem::new()
}

/// Create a new native file system.
pub fn native_fs() -> NativeFileSystem {
    NativeFileSystem::new()
}
