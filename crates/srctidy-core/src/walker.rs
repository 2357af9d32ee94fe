//! Source tree enumeration.

use crate::config::WalkerConfig;
use crate::runner::RunError;
use crate::types::FileError;

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Item yielded by [`FileWalker::walk`].
pub type WalkItem = Result<PathBuf, FileError>;

/// Enumerates candidate files under a source root.
///
/// Files come out in lexicographic path order (children sorted by name,
/// depth first). Ignored directories are pruned before descent.
#[derive(Debug, Clone)]
pub struct FileWalker {
    root: PathBuf,
    filter: Arc<EntryFilter>,
    respect_gitignore: bool,
}

#[derive(Debug)]
struct EntryFilter {
    root: PathBuf,
    extensions: HashSet<String>,
    ignore_dirs: HashSet<String>,
    exclude: Vec<glob::Pattern>,
}

impl EntryFilter {
    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    fn is_excluded(&self, relative: &str) -> bool {
        self.exclude.iter().any(|p| p.matches(relative))
    }

    /// Whether to descend into a directory.
    fn keep_dir(&self, path: &Path) -> bool {
        let ignored_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| self.ignore_dirs.contains(n));
        if ignored_name {
            debug!("Pruning ignored directory: {}", path.display());
            return false;
        }

        // A directory is pruned when an exclude pattern covers anything beneath it.
        let relative = self.relative(path);
        if self.is_excluded(&relative) || self.is_excluded(&format!("{relative}/_")) {
            debug!("Pruning excluded directory: {}", path.display());
            return false;
        }
        true
    }

    fn keep_file(&self, path: &Path) -> bool {
        let has_extension = self.extensions.is_empty()
            || path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| self.extensions.contains(e));
        if !has_extension {
            return false;
        }
        if self.is_excluded(&self.relative(path)) {
            debug!("Excluding: {}", path.display());
            return false;
        }
        true
    }
}

impl FileWalker {
    /// Creates a walker over `root`.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Walk`] if the root does not exist, is not a
    /// directory or cannot be listed, and [`RunError::Pattern`] for an
    /// invalid exclude glob.
    pub fn new(root: impl Into<PathBuf>, config: &WalkerConfig) -> Result<Self, RunError> {
        let root = root.into();
        let walk_error = |source: io::Error| RunError::Walk {
            root: root.clone(),
            source,
        };

        let metadata = std::fs::metadata(&root).map_err(walk_error)?;
        if !metadata.is_dir() {
            return Err(walk_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a directory",
            )));
        }
        std::fs::read_dir(&root).map_err(walk_error)?;

        let exclude = config
            .exclude
            .iter()
            .map(|p| {
                glob::Pattern::new(p).map_err(|source| RunError::Pattern {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let filter = EntryFilter {
            root: root.clone(),
            extensions: config
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect(),
            ignore_dirs: config.ignore_dirs.iter().cloned().collect(),
            exclude,
        };

        Ok(Self {
            root,
            filter: Arc::new(filter),
            respect_gitignore: config.respect_gitignore,
        })
    }

    /// Returns the root directory being walked.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Starts a fresh walk. Each call restarts from the root.
    ///
    /// Unreadable entries are yielded as [`FileError::Read`] and the walk
    /// continues past them.
    #[must_use]
    pub fn walk(&self) -> Box<dyn Iterator<Item = WalkItem> + '_> {
        if self.respect_gitignore {
            Box::new(self.walk_with_gitignore())
        } else {
            Box::new(self.walk_plain())
        }
    }

    /// Collects a complete walk, splitting paths from per-entry errors.
    #[must_use]
    pub fn collect(&self) -> (Vec<PathBuf>, Vec<FileError>) {
        let mut files = Vec::new();
        let mut errors = Vec::new();
        for item in self.walk() {
            match item {
                Ok(path) => files.push(path),
                Err(e) => errors.push(e),
            }
        }
        (files, errors)
    }

    fn walk_plain(&self) -> impl Iterator<Item = WalkItem> + '_ {
        let filter = &self.filter;
        walkdir::WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| {
                e.depth() == 0 || !e.file_type().is_dir() || filter.keep_dir(e.path())
            })
            .filter_map(move |entry| match entry {
                Ok(e) if e.file_type().is_file() && filter.keep_file(e.path()) => {
                    Some(Ok(e.into_path()))
                }
                Ok(_) => None,
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), Path::to_path_buf);
                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::other("filesystem loop"));
                    Some(Err(FileError::Read { path, source }))
                }
            })
    }

    fn walk_with_gitignore(&self) -> impl Iterator<Item = WalkItem> + '_ {
        let prune = Arc::clone(&self.filter);
        let filter = &self.filter;
        ignore::WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(true)
            .require_git(false)
            .parents(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |e| {
                e.depth() == 0
                    || !e.file_type().is_some_and(|t| t.is_dir())
                    || prune.keep_dir(e.path())
            })
            .build()
            .filter_map(move |entry| match entry {
                Ok(e) => {
                    let is_file = e.file_type().is_some_and(|t| t.is_file());
                    (is_file && filter.keep_file(e.path())).then(|| Ok(e.into_path()))
                }
                Err(e) => Some(Err(ignore_error(&self.root, e))),
            })
    }
}

fn ignore_error(root: &Path, error: ignore::Error) -> FileError {
    match error {
        ignore::Error::WithPath { path, err } => match ignore_error(root, *err) {
            FileError::Read { source, .. } => FileError::Read { path, source },
            other => other,
        },
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            ignore_error(root, *err)
        }
        ignore::Error::Io(source) => FileError::Read {
            path: root.to_path_buf(),
            source,
        },
        other => FileError::Read {
            path: root.to_path_buf(),
            source: io::Error::other(other.to_string()),
        },
    }
}
