mod directory;
mod file;
pub(crate) mod os;
mod ownership;

pub use directory::DirectoryEntity;
pub use file::FileEntity;
pub use ownership::Owner;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use filetime::{set_file_atime, set_file_mtime, FileTime};
use log::debug;
use thiserror::Error;

pub const DEFAULT_DIRECTORY_MODE: u32 = 0o777;
pub const DEFAULT_FILE_MODE: u32 = 0o644;

#[derive(Debug, Error)]
pub enum EntityError {
    #[error("File \"{0}\" is not readable")]
    NotReadable(PathBuf),

    #[error("File \"{0}\" is not writable")]
    NotWritable(PathBuf),

    #[error("Directory \"{0}\" does not exist")]
    DirectoryNotExists(PathBuf),

    #[error("Directory \"{0}\" is not writable")]
    DirectoryNotWritable(PathBuf),

    #[error("Metadata capability unavailable: {0}")]
    MetadataCapabilityUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EntityError>;

/// Read-only view shared by files and directories.
pub trait Entity {
    fn path(&self) -> &Path;

    fn name(&self) -> Option<String>;

    fn base_path(&self) -> PathBuf;

    fn exists(&self) -> bool;

    fn is_readable(&self) -> bool {
        self.exists() && os::is_readable(self.path())
    }

    fn is_writable(&self) -> bool {
        self.exists() && os::is_writable(self.path())
    }

    fn modification_time(&self) -> Option<SystemTime> {
        std::fs::metadata(self.path()).ok()?.modified().ok()
    }

    fn access_time(&self) -> Option<SystemTime> {
        std::fs::metadata(self.path()).ok()?.accessed().ok()
    }
}

/// Operations that change an entity on disk. Methods taking `&mut self`
/// update the stored path when the OS call succeeds; other handles to the
/// same location are not updated and go stale.
pub trait Mutator: Entity {
    fn set_name(&mut self, name: &str) -> bool;

    fn set_base_path(&mut self, directory: &DirectoryEntity) -> Result<bool> {
        self.move_to(directory)
    }

    /// Sets the modification time and leaves the access time alone.
    fn set_modification_time(&self, time: SystemTime) -> bool {
        if !self.exists() {
            return false;
        }
        match set_file_mtime(self.path(), FileTime::from(time)) {
            Ok(()) => true,
            Err(e) => {
                debug!("Failed to set mtime of {}: {}", self.path().display(), e);
                false
            }
        }
    }

    /// Sets the access time and leaves the modification time alone.
    fn set_access_time(&self, time: SystemTime) -> bool {
        if !self.exists() {
            return false;
        }
        match set_file_atime(self.path(), FileTime::from(time)) {
            Ok(()) => true,
            Err(e) => {
                debug!("Failed to set atime of {}: {}", self.path().display(), e);
                false
            }
        }
    }

    fn move_to(&mut self, directory: &DirectoryEntity) -> Result<bool>;

    fn delete(&self) -> bool;

    fn copy(&self, directory: &DirectoryEntity, name: Option<&str>) -> Result<bool>;

    fn rename(&mut self, name: &str) -> bool;

    fn flush(&self) -> Result<bool>;

    fn create(&self, mode: u32) -> bool;
}

/// Content operations only a regular file supports.
pub trait FileMutator: Mutator {
    fn set_extension(&mut self, extension: &str) -> bool;

    fn append(&self, data: &[u8]) -> Result<bool>;

    fn prepend(&self, data: &[u8]) -> Result<bool>;

    fn set_base_name(&mut self, name: &str) -> bool {
        self.rename(name)
    }
}

pub(crate) fn ensure_writable_target(directory: &DirectoryEntity) -> Result<()> {
    if !directory.is_writable() {
        return Err(EntityError::DirectoryNotWritable(directory.path().to_path_buf()));
    }
    Ok(())
}
