//! # Path Resolution
//!
//! Maps logical file paths onto a root directory for the local backend.
//!
//! Resolution is purely lexical: the leading separators of the logical path
//! are stripped, the rest is joined to the root, and `.`/`..` components are
//! folded without touching the disk. Symlinks are not followed.
//!
//! ```rust
//! use blobfs::PathResolver;
//! use std::path::Path;
//!
//! let resolver = PathResolver::new("/srv/data", true).unwrap();
//! assert_eq!(resolver.resolve("/a/./b/../c.txt").unwrap(), Path::new("/srv/data/a/c.txt"));
//! assert!(resolver.resolve("../escape.txt").unwrap_err().is_not_found());
//! ```

use std::path::{Component, MAIN_SEPARATOR, Path, PathBuf};

use crate::FsError;

/// Resolves logical paths against a fixed root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    root: PathBuf,
    contain: bool,
}

impl PathResolver {
    /// Anchor resolution at `root`, made absolute against the current directory.
    ///
    /// With `contain` set, paths that normalize to a location outside the
    /// root are rejected.
    ///
    /// # Errors
    ///
    /// - [`FsError::Io`] if the current directory cannot be determined
    pub fn new(root: impl AsRef<Path>, contain: bool) -> Result<Self, FsError> {
        let root = root.as_ref();
        let absolute = std::path::absolute(root)
            .map_err(|e| FsError::io("absolute", root.display().to_string(), e))?;
        Ok(Self {
            root: normalize(&absolute),
            contain,
        })
    }

    /// The normalized absolute root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether escaping paths are rejected.
    pub fn contains_paths(&self) -> bool {
        self.contain
    }

    /// Resolve a logical path to an absolute location under the root.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if containment is on and the path leaves the root
    pub fn resolve(&self, path: &str) -> Result<PathBuf, FsError> {
        let relative = path.trim_start_matches(['/', MAIN_SEPARATOR]);
        let resolved = normalize(&self.root.join(relative));
        if self.contain && !resolved.starts_with(&self.root) {
            log::debug!("rejected path outside root: {path}");
            return Err(FsError::NotFound { path: path.into() });
        }
        Ok(resolved)
    }

    /// Resolve a path that is interpreted relative to a directory handle
    /// rather than the root.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if containment is on and the path climbs above
    ///   the handle's directory
    pub fn resolve_relative(&self, path: &str) -> Result<PathBuf, FsError> {
        let relative = path.trim_start_matches(['/', MAIN_SEPARATOR]);
        if !self.contain {
            return Ok(PathBuf::from(relative));
        }
        let mut resolved = PathBuf::new();
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(name) => resolved.push(name),
                Component::CurDir => {}
                Component::ParentDir if resolved.pop() => {}
                _ => return Err(FsError::NotFound { path: path.into() }),
            }
        }
        Ok(resolved)
    }
}

/// Fold `.` and `..` components lexically.
///
/// `..` at the root stays at the root, as with POSIX path resolution.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(name) => normalized.push(name),
        }
    }
    normalized
}
