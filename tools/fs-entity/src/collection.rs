use std::path::{Path, PathBuf};
use std::slice;
use std::vec;

use crate::entity::{DirectoryEntity, Entity, FileEntity};

/// One listed child: a file or a directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Entry {
    File(FileEntity),
    Directory(DirectoryEntity),
}

impl Entry {
    pub fn is_file(&self) -> bool {
        matches!(self, Entry::File(_))
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Entry::Directory(_))
    }

    pub fn as_file(&self) -> Option<&FileEntity> {
        match self {
            Entry::File(file) => Some(file),
            Entry::Directory(_) => None,
        }
    }

    pub fn as_directory(&self) -> Option<&DirectoryEntity> {
        match self {
            Entry::Directory(directory) => Some(directory),
            Entry::File(_) => None,
        }
    }
}

impl Entity for Entry {
    fn path(&self) -> &Path {
        match self {
            Entry::File(file) => file.path(),
            Entry::Directory(directory) => directory.path(),
        }
    }

    fn name(&self) -> Option<String> {
        match self {
            Entry::File(file) => file.name(),
            Entry::Directory(directory) => directory.name(),
        }
    }

    fn base_path(&self) -> PathBuf {
        match self {
            Entry::File(file) => file.base_path(),
            Entry::Directory(directory) => directory.base_path(),
        }
    }

    fn exists(&self) -> bool {
        match self {
            Entry::File(file) => file.exists(),
            Entry::Directory(directory) => directory.exists(),
        }
    }
}

impl From<FileEntity> for Entry {
    fn from(file: FileEntity) -> Self {
        Entry::File(file)
    }
}

impl From<DirectoryEntity> for Entry {
    fn from(directory: DirectoryEntity) -> Self {
        Entry::Directory(directory)
    }
}

/// Ordered, append-only list of entries. Order is insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityCollection {
    items: Vec<Entry>,
}

impl EntityCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, item: impl Into<Entry>) {
        self.items.push(item.into());
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.items.get(index)
    }

    pub fn iter(&self) -> slice::Iter<'_, Entry> {
        self.items.iter()
    }

    /// Snapshot of the entries as a plain vector.
    pub fn to_vec(&self) -> Vec<Entry> {
        self.items.clone()
    }
}

impl IntoIterator for EntityCollection {
    type Item = Entry;
    type IntoIter = vec::IntoIter<Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a EntityCollection {
    type Item = &'a Entry;
    type IntoIter = slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_keeps_insertion_order() {
        let mut collection = EntityCollection::new();
        assert!(collection.is_empty());

        collection.append(FileEntity::new("/data/b.txt"));
        collection.append(DirectoryEntity::new("/data/a"));
        collection.append(FileEntity::new("/data/b.txt"));

        assert_eq!(collection.len(), 3);
        let paths: Vec<&Path> = collection.iter().map(|entry| entry.path()).collect();
        assert_eq!(
            paths,
            vec![Path::new("/data/b.txt"), Path::new("/data/a"), Path::new("/data/b.txt")]
        );
        assert!(collection.get(1).unwrap().is_directory());
        assert!(collection.get(3).is_none());
    }

    #[test]
    fn test_entry_accessors() {
        let file = Entry::from(FileEntity::new("/data/report.pdf"));
        assert!(file.is_file());
        assert_eq!(file.name().unwrap(), "report");
        assert!(file.as_directory().is_none());

        let directory = Entry::from(DirectoryEntity::new("/data/archive.d/"));
        assert_eq!(directory.name().unwrap(), "archive.d");
        assert_eq!(directory.base_path(), PathBuf::from("/data"));
        assert!(directory.as_file().is_none());
    }
}
