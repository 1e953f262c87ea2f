use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::os::{self, ExclusiveLock};
use super::{
    ensure_writable_target, DirectoryEntity, Entity, EntityError, FileMutator, Mutator, Owner,
    Result,
};
use crate::content_type::ContentTypes;
use crate::path_entity::PathEntity;

/// Handle to a regular file. The file does not have to exist; queries on a
/// missing file return `None`, `false` or `0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FileEntity {
    entity: PathEntity,
}

impl FileEntity {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            entity: PathEntity::new(path),
        }
    }

    /// Points this handle at another path.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.entity.set(path);
        self
    }

    pub fn base_name(&self) -> Option<String> {
        self.entity.base_name()
    }

    pub fn extension(&self) -> Option<String> {
        self.entity.extension()
    }

    pub fn base_path_string(&self) -> String {
        self.entity.base_path_string()
    }

    pub fn content_type(&self, types: &ContentTypes) -> String {
        match self.extension() {
            Some(extension) => types.resolve(&extension),
            None => types.default_type().to_string(),
        }
    }

    /// Size in bytes, `0` when the file is missing.
    pub fn size(&self) -> u64 {
        if !self.exists() {
            return 0;
        }
        fs::metadata(self.path()).map(|m| m.len()).unwrap_or(0)
    }

    /// Whole file content. `Ok(None)` means the file does not exist; an
    /// existing empty file yields `Ok(Some(vec![]))`.
    pub fn content(&self) -> Result<Option<Vec<u8>>> {
        if !self.exists() {
            return Ok(None);
        }
        if !self.is_readable() {
            return Err(EntityError::NotReadable(self.path().to_path_buf()));
        }
        match fs::read(self.path()) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) => {
                debug!("Failed to read {}: {}", self.path().display(), e);
                Err(EntityError::NotReadable(self.path().to_path_buf()))
            }
        }
    }

    /// Pixel dimensions for files whose header is a known image format.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        if !self.exists() {
            return None;
        }
        let reader = image::ImageReader::open(self.path())
            .ok()?
            .with_guessed_format()
            .ok()?;
        reader.format()?;
        reader.into_dimensions().ok()
    }

    pub fn width(&self) -> Option<u32> {
        self.dimensions().map(|(width, _)| width)
    }

    pub fn height(&self) -> Option<u32> {
        self.dimensions().map(|(_, height)| height)
    }

    fn ensure_writable(&self) -> Result<()> {
        if !self.is_writable() {
            return Err(EntityError::NotWritable(self.path().to_path_buf()));
        }
        Ok(())
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

impl Entity for FileEntity {
    fn path(&self) -> &Path {
        self.entity.path()
    }

    fn name(&self) -> Option<String> {
        self.entity.name()
    }

    fn base_path(&self) -> PathBuf {
        self.entity.base_path()
    }

    fn exists(&self) -> bool {
        self.path().is_file()
    }
}

impl Owner for FileEntity {}

impl Mutator for FileEntity {
    /// Renames the file and keeps its extension.
    fn set_name(&mut self, name: &str) -> bool {
        let base_name = match self.extension() {
            Some(extension) => format!("{}.{}", name, extension),
            None => name.to_string(),
        };
        self.rename(&base_name)
    }

    fn move_to(&mut self, directory: &DirectoryEntity) -> Result<bool> {
        ensure_writable_target(directory)?;

        let Some(base_name) = self.base_name() else {
            return Ok(false);
        };
        if !self.exists() {
            return Ok(false);
        }
        Ok(self.relocate(directory.path().join(base_name)))
    }

    fn delete(&self) -> bool {
        if !self.exists() {
            return false;
        }
        match fs::remove_file(self.path()) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to delete {}: {}", self.path().display(), e);
                false
            }
        }
    }

    /// Copies into `directory`, overwriting any file already there.
    fn copy(&self, directory: &DirectoryEntity, name: Option<&str>) -> Result<bool> {
        ensure_writable_target(directory)?;

        if !self.exists() {
            return Ok(false);
        }
        let Some(base_name) = name.map(str::to_string).or_else(|| self.base_name()) else {
            return Ok(false);
        };

        let target = directory.path().join(base_name);
        if os::same_file(self.path(), &target) {
            // fs::copy would truncate the source before reading it.
            debug!("{} already is {}", target.display(), self.path().display());
            return Ok(true);
        }
        match fs::copy(self.path(), &target) {
            Ok(_) => Ok(true),
            Err(e) => {
                warn!(
                    "Failed to copy {} -> {}: {}",
                    self.path().display(),
                    target.display(),
                    e
                );
                Ok(false)
            }
        }
    }

    fn rename(&mut self, name: &str) -> bool {
        if !self.exists() {
            return false;
        }
        let target = self.entity.sibling(name);
        self.relocate(target)
    }

    /// Truncates the file to zero length under an exclusive advisory lock.
    fn flush(&self) -> Result<bool> {
        if !self.exists() {
            return Ok(false);
        }
        self.ensure_writable()?;

        let file = match OpenOptions::new().write(true).open(self.path()) {
            Ok(file) => file,
            Err(e) => {
                warn!("Failed to open {} for flushing: {}", self.path().display(), e);
                return Ok(false);
            }
        };

        let truncated = ExclusiveLock::acquire(&file).and_then(|_lock| {
            file.set_len(0)?;
            file.sync_data()
        });
        match truncated {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!("Failed to flush {}: {}", self.path().display(), e);
                Ok(false)
            }
        }
    }

    /// Creates an empty file with `mode`. An existing file is left untouched.
    fn create(&self, mode: u32) -> bool {
        if self.exists() {
            return true;
        }
        match OpenOptions::new().write(true).create(true).open(self.path()) {
            Ok(_) => {
                if !self.chmod(mode) {
                    debug!("Could not apply mode {:o} to {}", mode, self.path().display());
                }
                true
            }
            Err(e) => {
                warn!("Failed to create {}: {}", self.path().display(), e);
                false
            }
        }
    }
}

impl FileMutator for FileEntity {
    fn set_extension(&mut self, extension: &str) -> bool {
        match self.entity.base_name_with_extension(extension) {
            Some(base_name) => self.rename(&base_name),
            None => false,
        }
    }

    fn append(&self, data: &[u8]) -> Result<bool> {
        if !self.exists() {
            return Ok(false);
        }
        self.ensure_writable()?;

        let written = OpenOptions::new()
            .append(true)
            .open(self.path())
            .and_then(|mut file| file.write_all(data));
        match written {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!("Failed to append to {}: {}", self.path().display(), e);
                Ok(false)
            }
        }
    }

    /// Places `data` in front of the existing content by shifting the file
    /// forward one `data.len()` window at a time.
    fn prepend(&self, data: &[u8]) -> Result<bool> {
        if !self.exists() {
            return Ok(false);
        }
        self.ensure_writable()?;

        if data.is_empty() {
            return Ok(true);
        }

        let shifted = OpenOptions::new()
            .read(true)
            .write(true)
            .open(self.path())
            .and_then(|mut file| shift_in_front(&mut file, data));
        match shifted {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!("Failed to prepend to {}: {}", self.path().display(), e);
                Ok(false)
            }
        }
    }
}

/// Each window is read before it is overwritten, so the bytes pushed forward
/// are always the ones that sat at that position before. The final window
/// may be shorter than `data`.
fn shift_in_front(file: &mut File, data: &[u8]) -> io::Result<()> {
    let window = data.len() as u64;
    let final_length = file.metadata()?.len() + window;

    let mut pending = data.to_vec();
    let mut position = 0u64;

    while position < final_length {
        file.seek(SeekFrom::Start(position))?;
        let mut displaced = Vec::with_capacity(data.len());
        Read::take(&mut *file, window).read_to_end(&mut displaced)?;

        file.seek(SeekFrom::Start(position))?;
        file.write_all(&pending)?;

        pending = displaced;
        position += window;
    }

    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn prepend_to(initial: &[u8], data: &[u8]) -> Vec<u8> {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("shift.bin");
        fs::write(&path, initial).unwrap();

        let mut file = OpenOptions::new().read(true).write(true).open(&path).unwrap();
        shift_in_front(&mut file, data).unwrap();
        drop(file);

        fs::read(&path).unwrap()
    }

    #[test]
    fn test_shift_window_divides_length() {
        assert_eq!(prepend_to(b"World!", b"Hello "), b"Hello World!");
        assert_eq!(prepend_to(b"abcdef", b"XY"), b"XYabcdef");
    }

    #[test]
    fn test_shift_window_does_not_divide_length() {
        assert_eq!(prepend_to(b"abcde", b"XY"), b"XYabcde");
        assert_eq!(prepend_to(b"0123456789", b"abc"), b"abc0123456789");
    }

    #[test]
    fn test_shift_data_longer_than_content() {
        assert_eq!(prepend_to(b"Hi", b"Hello there, "), b"Hello there, Hi");
        assert_eq!(prepend_to(b"", b"only"), b"only");
    }

    #[test]
    fn test_content_type_falls_back_to_default() {
        let types = ContentTypes::default();
        assert_eq!(FileEntity::new("/tmp/notes.TXT").content_type(&types), "text/plain");
        assert_eq!(
            FileEntity::new("/tmp/Makefile").content_type(&types),
            types.default_type()
        );
    }
}
