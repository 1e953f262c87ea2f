use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// A filesystem path with the derived name accessors shared by files and
/// directories. Nothing here touches the OS.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PathEntity {
    path: PathBuf,
}

impl PathEntity {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: trim_trailing_separators(path.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set(&mut self, path: impl Into<PathBuf>) {
        self.path = trim_trailing_separators(path.into());
    }

    /// Last path segment including its extension.
    pub fn base_name(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }

    /// Last path segment without its extension.
    pub fn name(&self) -> Option<String> {
        let base_name = self.base_name()?;
        match base_name.rfind('.') {
            Some(index) => Some(base_name[..index].to_string()),
            None => Some(base_name),
        }
    }

    /// Lower-cased text after the last dot of the base name. A leading dot
    /// counts, so `.bashrc` has the extension `bashrc`.
    pub fn extension(&self) -> Option<String> {
        let base_name = self.base_name()?;
        let index = base_name.rfind('.')?;
        let extension = &base_name[index + 1..];
        if extension.is_empty() {
            return None;
        }
        Some(extension.to_lowercase())
    }

    /// Parent directory. A bare relative name resolves to `.`.
    pub fn base_path(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            Some(_) => PathBuf::from("."),
            None => self.path.clone(),
        }
    }

    /// Parent directory rendered with a trailing separator.
    pub fn base_path_string(&self) -> String {
        let mut base = self.base_path().to_string_lossy().into_owned();
        if !base.ends_with(MAIN_SEPARATOR) {
            base.push(MAIN_SEPARATOR);
        }
        base
    }

    /// Sibling path with the last segment replaced.
    pub fn sibling(&self, base_name: &str) -> PathBuf {
        self.base_path().join(base_name)
    }

    /// Base name with its extension segment swapped for `extension`, which
    /// may carry a leading dot.
    pub fn base_name_with_extension(&self, extension: &str) -> Option<String> {
        let base_name = self.base_name()?;
        let extension = extension.trim_start_matches('.');
        let stem = match base_name.rfind('.') {
            Some(index) => &base_name[..index],
            None => base_name.as_str(),
        };
        Some(format!("{}.{}", stem, extension))
    }
}

impl AsRef<Path> for PathEntity {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

fn trim_trailing_separators(path: PathBuf) -> PathBuf {
    let raw = path.to_string_lossy();
    let trimmed = raw.trim_end_matches(MAIN_SEPARATOR);
    if trimmed.len() == raw.len() {
        return path;
    }
    if trimmed.is_empty() {
        // Keep the root itself.
        return PathBuf::from(MAIN_SEPARATOR.to_string());
    }
    PathBuf::from(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_accessors() {
        let entity = PathEntity::new("/var/data/Report.Final.TXT");
        assert_eq!(entity.base_name().unwrap(), "Report.Final.TXT");
        assert_eq!(entity.name().unwrap(), "Report.Final");
        assert_eq!(entity.extension().unwrap(), "txt");
        assert_eq!(entity.base_path(), PathBuf::from("/var/data"));
        assert_eq!(entity.base_path_string(), format!("/var/data{}", MAIN_SEPARATOR));
    }

    #[test]
    fn test_extension_edge_cases() {
        assert_eq!(PathEntity::new("/tmp/README").extension(), None);
        assert_eq!(PathEntity::new("/tmp/archive.").extension(), None);
        assert_eq!(PathEntity::new("/tmp/.bashrc").extension().unwrap(), "bashrc");
        assert_eq!(PathEntity::new("/tmp/.bashrc").name().unwrap(), "");
    }

    #[test]
    fn test_trailing_separator_is_trimmed() {
        let entity = PathEntity::new("/var/data/");
        assert_eq!(entity.path(), Path::new("/var/data"));
        assert_eq!(entity.base_name().unwrap(), "data");

        let root = PathEntity::new("/");
        assert_eq!(root.path(), Path::new("/"));
        assert_eq!(root.base_name(), None);
    }

    #[test]
    fn test_relative_base_path() {
        let entity = PathEntity::new("file.txt");
        assert_eq!(entity.base_path(), PathBuf::from("."));
        assert_eq!(entity.sibling("other.txt"), PathBuf::from("./other.txt"));
    }

    #[test]
    fn test_base_name_with_extension() {
        let entity = PathEntity::new("/tmp/file.txt");
        assert_eq!(entity.base_name_with_extension("tmp").unwrap(), "file.tmp");
        assert_eq!(entity.base_name_with_extension(".tmp").unwrap(), "file.tmp");
        assert_eq!(
            PathEntity::new("/tmp/file").base_name_with_extension("md").unwrap(),
            "file.md"
        );
    }
}
