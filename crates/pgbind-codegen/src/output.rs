//! Directory sync: keep an output tree equal to a set of generated files.
//!
//! A session collects every file that should exist. When the session
//! closes, changed files are written, files no longer produced are deleted
//! and directories left empty are removed. Files whose content already
//! matches are not touched.

use crate::error::{Error, Result};
use crate::GeneratedFile;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Whether a session writes or only compares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncMode {
    /// Apply changes to disk.
    #[default]
    Write,
    /// Report what would change without touching disk.
    Check,
}

/// Changes made (or, in check mode, needed) by a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Files that did not exist.
    pub added: Vec<String>,
    /// Files whose content changed.
    pub updated: Vec<String>,
    /// Stale files deleted.
    pub removed: Vec<String>,
    /// Files already up to date.
    pub unchanged: usize,
}

impl SyncReport {
    /// Check if the session changed nothing.
    pub fn is_clean(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }

    /// Number of added, updated and removed files.
    pub fn changes(&self) -> usize {
        self.added.len() + self.updated.len() + self.removed.len()
    }
}

/// An output directory owned by the generator.
#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
    mode: SyncMode,
}

impl OutputDir {
    /// Output directory at `root`, in write mode.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            mode: SyncMode::Write,
        }
    }

    pub fn with_mode(mut self, mode: SyncMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run `f` with a fresh session and finalize it.
    ///
    /// Nothing is written or deleted unless `f` succeeds.
    pub fn session<F>(&self, f: F) -> Result<SyncReport>
    where
        F: FnOnce(&mut SyncSession) -> Result<()>,
    {
        let mut session = SyncSession {
            root: self.root.clone(),
            mode: self.mode,
            synced: BTreeMap::new(),
            pending: Vec::new(),
            report: SyncReport::default(),
        };
        f(&mut session)?;
        session.finish()
    }
}

/// Files synced so far in one session.
#[derive(Debug)]
pub struct SyncSession {
    root: PathBuf,
    mode: SyncMode,
    synced: BTreeMap<String, blake3::Hash>,
    pending: Vec<(PathBuf, String)>,
    report: SyncReport,
}

impl SyncSession {
    /// Declare that `relative` should exist with `content`.
    pub fn sync(&mut self, relative: &str, content: &str) -> Result<()> {
        let key = normalize(relative)?;
        let hash = blake3::hash(content.as_bytes());
        if let Some(previous) = self.synced.get(&key) {
            if *previous != hash {
                return Err(Error::Conflict { path: key });
            }
            return Ok(());
        }

        let path = self.root.join(&key);
        match fs::read(&path) {
            Ok(existing) if blake3::hash(&existing) == hash => self.report.unchanged += 1,
            Ok(_) => {
                self.report.updated.push(key.clone());
                self.pending.push((path, content.to_string()));
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.report.added.push(key.clone());
                self.pending.push((path, content.to_string()));
            }
            Err(e) => return Err(Error::io(path, e)),
        }
        self.synced.insert(key, hash);
        Ok(())
    }

    /// Sync a generated file.
    pub fn sync_file(&mut self, file: &GeneratedFile) -> Result<()> {
        self.sync(&file.path, &file.content)
    }

    fn finish(mut self) -> Result<SyncReport> {
        if self.mode == SyncMode::Write {
            for (path, content) in &self.pending {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
                }
                fs::write(path, content).map_err(|e| Error::io(path, e))?;
                debug!(path = %path.display(), "wrote file");
            }
        }

        if self.root.is_dir() {
            self.remove_stale()?;
            if self.mode == SyncMode::Write {
                remove_empty_dirs(&self.root)?;
            }
        }

        self.report.added.sort();
        self.report.updated.sort();
        self.report.removed.sort();
        info!(
            root = %self.root.display(),
            added = self.report.added.len(),
            updated = self.report.updated.len(),
            removed = self.report.removed.len(),
            unchanged = self.report.unchanged,
            check = self.mode == SyncMode::Check,
            "synced output directory"
        );
        Ok(self.report)
    }

    fn remove_stale(&mut self) -> Result<()> {
        for entry in WalkDir::new(&self.root).min_depth(1) {
            let entry = entry.map_err(|e| walk_error(&self.root, e))?;
            if entry.file_type().is_dir() {
                continue;
            }
            let key = relative_key(&self.root, entry.path());
            if self.synced.contains_key(&key) {
                continue;
            }
            if self.mode == SyncMode::Write {
                fs::remove_file(entry.path()).map_err(|e| Error::io(entry.path(), e))?;
                debug!(path = %entry.path().display(), "removed stale file");
            }
            self.report.removed.push(key);
        }
        Ok(())
    }
}

/// Sync `files` into `root` as one session.
pub fn write_tree(root: &Path, files: &[GeneratedFile], mode: SyncMode) -> Result<SyncReport> {
    OutputDir::new(root)
        .with_mode(mode)
        .session(|session| files.iter().try_for_each(|file| session.sync_file(file)))
}

/// Normalize a relative path to `/`-separated form, rejecting escapes.
fn normalize(relative: &str) -> Result<String> {
    let mut parts = Vec::new();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => match part.to_str() {
                Some(part) => parts.push(part),
                None => return Err(Error::InvalidPath(relative.to_string())),
            },
            Component::CurDir => {}
            _ => return Err(Error::InvalidPath(relative.to_string())),
        }
    }
    if parts.is_empty() {
        return Err(Error::InvalidPath(relative.to_string()));
    }
    Ok(parts.join("/"))
}

fn relative_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn walk_error(root: &Path, e: walkdir::Error) -> Error {
    let path = e.path().unwrap_or(root).to_path_buf();
    Error::io(path, e.into())
}

fn remove_empty_dirs(root: &Path) -> Result<()> {
    for entry in WalkDir::new(root).min_depth(1).contents_first(true) {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let mut children = fs::read_dir(entry.path()).map_err(|e| Error::io(entry.path(), e))?;
        if children.next().is_none() {
            fs::remove_dir(entry.path()).map_err(|e| Error::io(entry.path(), e))?;
        }
    }
    Ok(())
}
