use std::fs::{self, DirBuilder};
use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::{ensure_writable_target, Entity, EntityError, FileEntity, Mutator, Owner, Result};
use crate::collection::{EntityCollection, Entry};
use crate::path_entity::PathEntity;
use crate::tree::{tree_size, TreeWalker, WalkOptions, WalkReport};

/// Handle to a directory. Like [`FileEntity`] it may point at a directory
/// that does not exist yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DirectoryEntity {
    entity: PathEntity,
}

impl DirectoryEntity {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            entity: PathEntity::new(path),
        }
    }

    pub fn base_path_string(&self) -> String {
        self.entity.base_path_string()
    }

    /// Total size of every file below this directory.
    pub fn size(&self) -> u64 {
        tree_size(self.path())
    }

    /// Immediate children in the order the OS lists them. Subdirectories come
    /// back as directories, everything else as files. Each call reads the
    /// filesystem again.
    pub fn content(&self) -> Result<EntityCollection> {
        if !self.exists() {
            return Err(EntityError::DirectoryNotExists(self.path().to_path_buf()));
        }

        let mut collection = EntityCollection::new();
        for entry in fs::read_dir(self.path())? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry in {}: {}", self.path().display(), e);
                    continue;
                }
            };

            let path = entry.path();
            if path.is_dir() {
                collection.append(Entry::Directory(DirectoryEntity::new(path)));
            } else {
                collection.append(Entry::File(FileEntity::new(path)));
            }
        }

        Ok(collection)
    }

    /// Recursive copy with an explicit failure policy. Without `name` the
    /// content lands directly in `directory`; with it, in `directory/name`.
    pub fn copy_with(
        &self,
        directory: &DirectoryEntity,
        name: Option<&str>,
        options: &WalkOptions,
    ) -> Result<WalkReport> {
        if !self.exists() {
            return Err(EntityError::DirectoryNotExists(self.path().to_path_buf()));
        }
        if directory.exists() {
            ensure_writable_target(directory)?;
        }

        let destination = match name {
            Some(name) => directory.path().join(name),
            None => directory.path().to_path_buf(),
        };
        Ok(TreeWalker::new(options.clone()).copy(self.path(), &destination))
    }

    /// Removes the content and keeps the directory itself.
    pub fn flush_with(&self, options: &WalkOptions) -> WalkReport {
        TreeWalker::new(options.clone()).purge(self.path())
    }

    fn relocate(&mut self, target: PathBuf) -> bool {
        match fs::rename(self.path(), &target) {
            Ok(()) => {
                debug!("Renamed {} -> {}", self.path().display(), target.display());
                self.entity.set(target);
                true
            }
            Err(e) => {
                warn!(
                    "Failed to rename {} -> {}: {}",
                    self.path().display(),
                    target.display(),
                    e
                );
                false
            }
        }
    }
}

impl Entity for DirectoryEntity {
    fn path(&self) -> &Path {
        self.entity.path()
    }

    /// Last path segment; directories have no extension.
    fn name(&self) -> Option<String> {
        self.entity.base_name()
    }

    fn base_path(&self) -> PathBuf {
        self.entity.base_path()
    }

    fn exists(&self) -> bool {
        self.path().is_dir()
    }
}

impl Owner for DirectoryEntity {}

impl Mutator for DirectoryEntity {
    fn set_name(&mut self, name: &str) -> bool {
        self.rename(name)
    }

    /// Moves the whole subtree. Handles previously obtained from
    /// [`DirectoryEntity::content`] keep pointing at the old location.
    fn move_to(&mut self, directory: &DirectoryEntity) -> Result<bool> {
        ensure_writable_target(directory)?;

        let Some(name) = self.name() else {
            return Ok(false);
        };
        if !self.exists() {
            return Ok(false);
        }
        Ok(self.relocate(directory.path().join(name)))
    }

    /// Purges the content, then removes the directory. A directory that does
    /// not exist is already deleted.
    fn delete(&self) -> bool {
        if !self.exists() {
            return true;
        }

        let report = self.flush_with(&WalkOptions::default());
        if !report.is_complete() {
            debug!(
                "{} entries below {} could not be removed",
                report.failures.len(),
                self.path().display()
            );
        }

        match fs::remove_dir(self.path()) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to remove {}: {}", self.path().display(), e);
                false
            }
        }
    }

    fn copy(&self, directory: &DirectoryEntity, name: Option<&str>) -> Result<bool> {
        if !self.exists() {
            return Ok(false);
        }
        let report = self.copy_with(directory, name, &WalkOptions::default())?;
        Ok(report.is_complete())
    }

    /// Renames within the parent. Never replaces an existing entry.
    fn rename(&mut self, name: &str) -> bool {
        if !self.exists() {
            return false;
        }
        let target = self.entity.sibling(name);
        if fs::symlink_metadata(&target).is_ok() {
            debug!("Refusing to rename {} onto existing {}", self.path().display(), target.display());
            return false;
        }
        self.relocate(target)
    }

    fn flush(&self) -> Result<bool> {
        Ok(self.flush_with(&WalkOptions::default()).is_complete())
    }

    /// Creates every missing segment of the path, parents first, each with
    /// `mode`. Segments that are already directories are skipped.
    fn create(&self, mode: u32) -> bool {
        let mut segments: Vec<&Path> = self
            .path()
            .ancestors()
            .filter(|segment| !segment.as_os_str().is_empty())
            .collect();
        segments.reverse();

        let mut builder = DirBuilder::new();
        builder.mode(mode);

        for segment in segments {
            if segment.is_dir() {
                continue;
            }
            if let Err(e) = builder.create(segment) {
                if !segment.is_dir() {
                    warn!("Failed to create {}: {}", segment.display(), e);
                    return false;
                }
            }
        }

        true
    }
}
