//! Recursive walks over a directory subtree: copy, purge and size.
//!
//! Walks are sequential and depth-first. Nothing is rolled back when an entry
//! fails; the [`WalkReport`] says what happened and [`WalkMode`] decides
//! whether the walk stops at the first failure.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::entity::os::same_file;
use crate::entity::{DirectoryEntity, Mutator, DEFAULT_DIRECTORY_MODE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalkMode {
    /// Stop at the first entry that fails.
    Strict,
    /// Keep walking and collect every failure.
    #[default]
    BestEffort,
}

#[derive(Debug, Clone)]
pub struct WalkOptions {
    pub mode: WalkMode,
    /// Mode for directories the copy walk has to create.
    pub directory_mode: u32,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            mode: WalkMode::BestEffort,
            directory_mode: DEFAULT_DIRECTORY_MODE,
        }
    }
}

impl WalkOptions {
    pub fn strict() -> Self {
        Self {
            mode: WalkMode::Strict,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStep {
    ReadDirectory,
    CreateDirectory,
    CopyFile,
    CopyLink,
    RemoveFile,
    RemoveDirectory,
}

impl fmt::Display for WalkStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            WalkStep::ReadDirectory => "read directory",
            WalkStep::CreateDirectory => "create directory",
            WalkStep::CopyFile => "copy file",
            WalkStep::CopyLink => "copy link",
            WalkStep::RemoveFile => "remove file",
            WalkStep::RemoveDirectory => "remove directory",
        };
        f.write_str(step)
    }
}

#[derive(Debug)]
pub struct WalkFailure {
    pub path: PathBuf,
    pub step: WalkStep,
    pub error: io::Error,
}

impl fmt::Display for WalkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.step, self.path.display(), self.error)
    }
}

#[derive(Debug, Default)]
pub struct WalkReport {
    pub files_copied: usize,
    pub links_copied: usize,
    pub directories_created: usize,
    pub files_removed: usize,
    pub directories_removed: usize,
    pub failures: Vec<WalkFailure>,
    /// Set when a strict walk stopped early.
    pub aborted: bool,
}

impl WalkReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Returned through `?` to unwind a strict walk.
struct Aborted;

type Walk = std::result::Result<(), Aborted>;

pub struct TreeWalker {
    options: WalkOptions,
}

impl TreeWalker {
    pub fn new(options: WalkOptions) -> Self {
        Self { options }
    }

    /// Copies the content of `source` into `destination`, creating
    /// `destination` first when needed. Files already at the destination are
    /// overwritten, directories are merged, nothing is deleted. Symbolic links
    /// are recreated as links, never followed.
    pub fn copy(&self, source: &Path, destination: &Path) -> WalkReport {
        let mut report = WalkReport::default();
        info!("Copying {} -> {}", source.display(), destination.display());

        if is_inside(source, destination) {
            let error = io::Error::new(
                io::ErrorKind::InvalidInput,
                "destination lies inside the source tree",
            );
            let _ = self.fail(&mut report, destination, WalkStep::CreateDirectory, error);
            return report;
        }

        if self.copy_tree(source, destination, &mut report).is_err() {
            report.aborted = true;
        }

        info!(
            "Copied {} files, created {} directories, {} failures",
            report.files_copied,
            report.directories_created,
            report.failures.len()
        );
        report
    }

    /// Removes everything below `root`, hidden entries included, and keeps
    /// `root` itself. Symbolic links are unlinked, never followed.
    pub fn purge(&self, root: &Path) -> WalkReport {
        let mut report = WalkReport::default();
        info!("Purging {}", root.display());

        if self.purge_tree(root, &mut report).is_err() {
            report.aborted = true;
        }

        info!(
            "Removed {} files and {} directories, {} failures",
            report.files_removed,
            report.directories_removed,
            report.failures.len()
        );
        report
    }

    fn copy_tree(&self, source: &Path, destination: &Path, report: &mut WalkReport) -> Walk {
        if !destination.is_dir() {
            if DirectoryEntity::new(destination).create(self.options.directory_mode) {
                report.directories_created += 1;
                debug!("Created directory: {}", destination.display());
            } else {
                let error = io::Error::new(io::ErrorKind::Other, "could not create directory");
                return self.fail(report, destination, WalkStep::CreateDirectory, error);
            }
        }

        let entries = match fs::read_dir(source) {
            Ok(entries) => entries,
            Err(e) => return self.fail(report, source, WalkStep::ReadDirectory, e),
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    self.fail(report, source, WalkStep::ReadDirectory, e)?;
                    continue;
                }
            };

            let source_path = entry.path();
            let target_path = destination.join(entry.file_name());
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(e) => {
                    self.fail(report, &source_path, WalkStep::ReadDirectory, e)?;
                    continue;
                }
            };

            if file_type.is_dir() {
                self.copy_tree(&source_path, &target_path, report)?;
            } else if file_type.is_symlink() {
                match copy_link(&source_path, &target_path) {
                    Ok(()) => {
                        report.links_copied += 1;
                        debug!("Linked: {} -> {}", source_path.display(), target_path.display());
                    }
                    Err(e) => self.fail(report, &source_path, WalkStep::CopyLink, e)?,
                }
            } else if same_file(&source_path, &target_path) {
                // A hard link to the source; fs::copy would truncate it.
                debug!("Skipped: {} is {}", target_path.display(), source_path.display());
            } else {
                match fs::copy(&source_path, &target_path) {
                    Ok(_) => {
                        report.files_copied += 1;
                        debug!("Copied: {} -> {}", source_path.display(), target_path.display());
                    }
                    Err(e) => self.fail(report, &source_path, WalkStep::CopyFile, e)?,
                }
            }
        }

        Ok(())
    }

    fn purge_tree(&self, root: &Path, report: &mut WalkReport) -> Walk {
        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return self.fail(report, root, WalkStep::ReadDirectory, e),
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    self.fail(report, root, WalkStep::ReadDirectory, e)?;
                    continue;
                }
            };

            let path = entry.path();
            let is_directory = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

            if is_directory {
                self.purge_tree(&path, report)?;
                match fs::remove_dir(&path) {
                    Ok(()) => report.directories_removed += 1,
                    Err(e) => self.fail(report, &path, WalkStep::RemoveDirectory, e)?,
                }
            } else {
                match fs::remove_file(&path) {
                    Ok(()) => report.files_removed += 1,
                    Err(e) => self.fail(report, &path, WalkStep::RemoveFile, e)?,
                }
            }
        }

        Ok(())
    }

    fn fail(&self, report: &mut WalkReport, path: &Path, step: WalkStep, error: io::Error) -> Walk {
        let failure = WalkFailure {
            path: path.to_path_buf(),
            step,
            error,
        };
        warn!("Failed to {}", failure);
        report.failures.push(failure);

        match self.options.mode {
            WalkMode::Strict => Err(Aborted),
            WalkMode::BestEffort => Ok(()),
        }
    }
}

/// Sum of the sizes of every regular file below `root`. Directories count as
/// zero, a missing root yields zero, links are not followed.
pub fn tree_size(root: &Path) -> u64 {
    WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum()
}

/// Recreates the link at `source` as `target`, replacing a non-directory
/// entry already there.
fn copy_link(source: &Path, target: &Path) -> io::Result<()> {
    let link = fs::read_link(source)?;
    match fs::symlink_metadata(target) {
        Ok(metadata) if !metadata.is_dir() => fs::remove_file(target)?,
        _ => {}
    }
    std::os::unix::fs::symlink(link, target)
}

fn is_inside(source: &Path, destination: &Path) -> bool {
    let Ok(source) = source.canonicalize() else {
        return false;
    };
    // The destination may not exist yet; resolve its closest existing ancestor.
    let mut probe = destination.to_path_buf();
    let mut rest = Vec::new();
    loop {
        if let Ok(resolved) = probe.canonicalize() {
            let full: PathBuf = rest.iter().rev().fold(resolved, |acc, part| acc.join(part));
            return full.starts_with(&source);
        }
        match (probe.file_name().map(|n| n.to_os_string()), probe.parent()) {
            (Some(name), Some(parent)) => {
                rest.push(name);
                probe = parent.to_path_buf();
            }
            _ => return false,
        }
    }
}
