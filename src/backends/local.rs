//! Local disk backend.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::path_resolver::PathResolver;
use crate::{Backend, DirFd, FsError, Mode, RawFile};

/// Files under a root directory on the local disk.
///
/// Logical paths are relative to the root: leading separators are stripped
/// and `..` is folded lexically. With `safe_paths` on (the default) a path
/// that escapes the root is reported as not found.
///
/// `remove` and `rename` check the source and destination on disk
/// themselves instead of through [`Backend::exists`], so they also accept
/// directory handles on unix.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    paths: PathResolver,
}

impl LocalBackend {
    /// Serve files under `directory` with path containment on.
    ///
    /// # Errors
    ///
    /// - [`FsError::Io`] if `directory` cannot be made absolute
    pub fn new(directory: impl AsRef<Path>) -> Result<Self, FsError> {
        Self::with_safe_paths(directory, true)
    }

    /// Serve files under `directory`, choosing whether escaping paths are rejected.
    ///
    /// Disable containment only when paths are already trusted.
    ///
    /// # Errors
    ///
    /// - [`FsError::Io`] if `directory` cannot be made absolute
    pub fn with_safe_paths(directory: impl AsRef<Path>, safe_paths: bool) -> Result<Self, FsError> {
        Ok(Self {
            paths: PathResolver::new(directory, safe_paths)?,
        })
    }

    /// Absolute root directory.
    pub fn root(&self) -> &Path {
        self.paths.root()
    }

    /// Whether escaping paths are rejected.
    pub fn safe_paths(&self) -> bool {
        self.paths.contains_paths()
    }

    /// Absolute location of a logical path.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path escapes the root while `safe_paths` is on
    pub fn resolve(&self, path: &str) -> Result<PathBuf, FsError> {
        self.paths.resolve(path)
    }

    fn resolve_at(&self, path: &str, dir_fd: Option<DirFd>) -> Result<PathBuf, FsError> {
        match dir_fd {
            Some(_) => self.paths.resolve_relative(path),
            None => self.paths.resolve(path),
        }
    }

    /// Metadata for a path, or `None` if it is missing or outside the root.
    fn metadata(&self, path: &str) -> Result<Option<fs::Metadata>, FsError> {
        let resolved = match self.paths.resolve(path) {
            Ok(resolved) => resolved,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };
        match fs::metadata(&resolved) {
            Ok(meta) => Ok(Some(meta)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FsError::io("metadata", path, e)),
        }
    }
}

struct LocalFile {
    handle: Option<fs::File>,
    path: String,
}

impl LocalFile {
    fn handle(&mut self) -> Result<&mut fs::File, FsError> {
        self.handle.as_mut().ok_or_else(|| FsError::NotSupported {
            operation: "I/O operation on closed file".into(),
        })
    }
}

impl RawFile for LocalFile {
    fn read_raw(&mut self) -> Result<Vec<u8>, FsError> {
        let mut data = Vec::new();
        if let Err(e) = self.handle()?.read_to_end(&mut data) {
            return Err(FsError::io("read", self.path.as_str(), e));
        }
        Ok(data)
    }

    fn write_raw(&mut self, data: &[u8]) -> Result<usize, FsError> {
        if let Err(e) = self.handle()?.write_all(data) {
            return Err(FsError::io("write", self.path.as_str(), e));
        }
        Ok(data.len())
    }

    fn close(&mut self) -> Result<(), FsError> {
        drop(self.handle.take());
        Ok(())
    }
}

/// What a path names on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Missing,
    File,
    Other,
}

impl Entry {
    /// Inspect `path`, following a final symlink only when `follow` is set.
    fn of(dir: Option<DirFd<'_>>, path: &Path, follow: bool) -> io::Result<Self> {
        let is_file = match dir {
            None if follow => fs::metadata(path).map(|meta| meta.is_file()),
            None => fs::symlink_metadata(path).map(|meta| meta.is_file()),
            Some(dir) => at::is_file(dir, path, follow),
        };
        match is_file {
            Ok(true) => Ok(Entry::File),
            Ok(false) => Ok(Entry::Other),
            Err(e) => match e.kind() {
                io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => Ok(Entry::Missing),
                _ => Err(e),
            },
        }
    }
}

/// The source of a remove or rename must be an existing regular file.
fn check_source(
    operation: &'static str,
    path: &str,
    dir: Option<DirFd<'_>>,
    resolved: &Path,
) -> Result<(), FsError> {
    match Entry::of(dir, resolved, true).map_err(|e| FsError::io(operation, path, e))? {
        Entry::File => Ok(()),
        Entry::Missing => Err(FsError::NotFound { path: path.into() }),
        Entry::Other => Err(FsError::PermissionDenied {
            path: path.into(),
            operation,
        }),
    }
}

fn open_options(mode: &Mode) -> fs::OpenOptions {
    let mut options = fs::OpenOptions::new();
    if mode.is_write() {
        options.write(true).create(true).truncate(true).read(mode.is_update());
    } else {
        options.read(true).write(mode.is_update());
    }
    options
}

impl Backend for LocalBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    fn acquire<'a>(&'a self, path: &str, mode: &Mode) -> Result<Box<dyn RawFile + 'a>, FsError> {
        let resolved = self.paths.resolve(path)?;
        let handle = open_options(mode)
            .open(&resolved)
            .map_err(|e| FsError::io("open", path, e))?;
        Ok(Box::new(LocalFile {
            handle: Some(handle),
            path: path.to_owned(),
        }))
    }

    fn is_file(&self, path: &str) -> Result<bool, FsError> {
        Ok(self.metadata(path)?.is_some_and(|meta| meta.is_file()))
    }

    fn exists(&self, path: &str) -> Result<bool, FsError> {
        Ok(self.metadata(path)?.is_some())
    }

    fn remove_raw(&self, path: &str) -> Result<(), FsError> {
        let resolved = self.paths.resolve(path)?;
        fs::remove_file(resolved).map_err(|e| FsError::io("remove", path, e))
    }

    fn rename_raw(&self, src: &str, dst: &str) -> Result<(), FsError> {
        let from = self.paths.resolve(src)?;
        let to = self.paths.resolve(dst)?;
        fs::rename(from, to).map_err(|e| FsError::io("rename", src, e))
    }

    fn remove(&self, path: &str, dir_fd: Option<DirFd<'_>>) -> Result<(), FsError> {
        let resolved = self.resolve_at(path, dir_fd)?;
        check_source("remove", path, dir_fd, &resolved)?;
        match dir_fd {
            None => self.remove_raw(path),
            Some(dir) => at::unlink(dir, &resolved).map_err(|e| FsError::io("remove", path, e)),
        }
    }

    fn rename(
        &self,
        src: &str,
        dst: &str,
        src_dir_fd: Option<DirFd<'_>>,
        dst_dir_fd: Option<DirFd<'_>>,
    ) -> Result<(), FsError> {
        let from = self.resolve_at(src, src_dir_fd)?;
        let to = self.resolve_at(dst, dst_dir_fd)?;
        check_source("rename", src, src_dir_fd, &from)?;
        // Native rename replaces an existing destination; refuse instead.
        let target =
            Entry::of(dst_dir_fd, &to, false).map_err(|e| FsError::io("rename", dst, e))?;
        if target != Entry::Missing {
            return Err(FsError::AlreadyExists {
                path: dst.into(),
                operation: "rename",
            });
        }
        if src_dir_fd.is_none() && dst_dir_fd.is_none() {
            return self.rename_raw(src, dst);
        }
        at::rename(src_dir_fd, &from, dst_dir_fd, &to).map_err(|e| FsError::io("rename", src, e))
    }
}

/// Directory-handle relative operations.
#[cfg(unix)]
mod at {
    use std::io;
    use std::os::fd::{AsFd, BorrowedFd};
    use std::path::Path;

    use rustix::fs::{AtFlags, CWD, FileType};

    use crate::DirFd;

    fn fd<'a>(dir: &'a Option<DirFd<'_>>) -> BorrowedFd<'a> {
        dir.as_ref().map_or(CWD, |d| d.as_fd())
    }

    pub(super) fn is_file(dir: DirFd<'_>, path: &Path, follow: bool) -> io::Result<bool> {
        let flags = match follow {
            true => AtFlags::empty(),
            false => AtFlags::SYMLINK_NOFOLLOW,
        };
        let stat = rustix::fs::statat(dir, path, flags)?;
        Ok(FileType::from_raw_mode(stat.st_mode as _) == FileType::RegularFile)
    }

    pub(super) fn unlink(dir: DirFd<'_>, path: &Path) -> io::Result<()> {
        Ok(rustix::fs::unlinkat(dir, path, AtFlags::empty())?)
    }

    pub(super) fn rename(
        src_dir: Option<DirFd<'_>>,
        src: &Path,
        dst_dir: Option<DirFd<'_>>,
        dst: &Path,
    ) -> io::Result<()> {
        Ok(rustix::fs::renameat(fd(&src_dir), src, fd(&dst_dir), dst)?)
    }
}

#[cfg(not(unix))]
mod at {
    use std::io;
    use std::path::Path;

    use crate::DirFd;

    fn unsupported() -> io::Error {
        io::Error::new(
            io::ErrorKind::Unsupported,
            "directory handles are not supported on this platform",
        )
    }

    pub(super) fn is_file(_: DirFd<'_>, _: &Path, _: bool) -> io::Result<bool> {
        Err(unsupported())
    }

    pub(super) fn unlink(_: DirFd<'_>, _: &Path) -> io::Result<()> {
        Err(unsupported())
    }

    pub(super) fn rename(
        _: Option<DirFd<'_>>,
        _: &Path,
        _: Option<DirFd<'_>>,
        _: &Path,
    ) -> io::Result<()> {
        Err(unsupported())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> (tempfile::TempDir, LocalBackend) {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(dir.path()).unwrap();
        (dir, backend)
    }

    fn mode(m: &str) -> Mode {
        Mode::parse(m).unwrap()
    }

    #[test]
    fn write_then_read_raw() {
        let (dir, backend) = backend();
        let mut raw = backend.acquire("/a.bin", &mode("wb")).unwrap();
        assert_eq!(raw.write_raw(b"abc").unwrap(), 3);
        raw.close().unwrap();
        assert_eq!(fs::read(dir.path().join("a.bin")).unwrap(), b"abc");

        let mut raw = backend.acquire("a.bin", &mode("rb")).unwrap();
        assert_eq!(raw.read_raw().unwrap(), b"abc");
    }

    #[test]
    fn read_of_missing_file_fails_at_acquire() {
        let (_dir, backend) = backend();
        let err = backend.acquire("missing", &mode("r")).err().unwrap();
        assert!(err.is_not_found());
    }

    #[test]
    fn escape_is_not_found_at_acquire() {
        let (_dir, backend) = backend();
        let err = backend.acquire("../escape.txt", &mode("w")).err().unwrap();
        assert!(err.is_not_found());
    }

    #[test]
    fn exists_includes_directories() {
        let (dir, backend) = backend();
        fs::create_dir(dir.path().join("sub")).unwrap();
        assert!(backend.exists("sub").unwrap());
        assert!(!backend.is_file("sub").unwrap());
        assert!(!backend.exists("../outside").unwrap());
    }

    #[test]
    fn remove_directory_is_not_permitted() {
        let (dir, backend) = backend();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let err = backend.remove("sub", None).unwrap_err();
        assert!(matches!(err, FsError::PermissionDenied { operation: "remove", .. }), "{err:?}");
        assert!(dir.path().join("sub").is_dir());
    }

    #[test]
    fn rename_directory_is_not_permitted() {
        let (dir, backend) = backend();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let err = backend.rename("sub", "moved", None, None).unwrap_err();
        assert!(matches!(err, FsError::PermissionDenied { operation: "rename", .. }), "{err:?}");
        assert!(dir.path().join("sub").is_dir());
        assert!(!dir.path().join("moved").exists());
    }

    #[test]
    fn rename_checks_source_before_destination() {
        let (dir, backend) = backend();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b"), b"2").unwrap();
        let err = backend.rename("sub", "b", None, None).unwrap_err();
        assert!(matches!(err, FsError::PermissionDenied { .. }), "{err:?}");
        let err = backend.rename("missing", "sub", None, None).unwrap_err();
        assert!(err.is_not_found(), "{err:?}");
    }

    #[test]
    fn remove_below_a_file_is_not_found() {
        let (dir, backend) = backend();
        fs::write(dir.path().join("a"), b"1").unwrap();
        assert!(backend.remove("a/b", None).unwrap_err().is_not_found());
    }

    #[test]
    fn remove_missing_is_not_found() {
        let (_dir, backend) = backend();
        assert!(backend.remove("missing", None).unwrap_err().is_not_found());
    }

    #[test]
    fn rename_moves_file() {
        let (dir, backend) = backend();
        fs::write(dir.path().join("a"), b"1").unwrap();
        backend.rename("a", "b", None, None).unwrap();
        assert!(!backend.exists("a").unwrap());
        assert_eq!(fs::read(dir.path().join("b")).unwrap(), b"1");
    }

    #[test]
    fn rename_never_replaces_destination() {
        let (dir, backend) = backend();
        fs::write(dir.path().join("a"), b"1").unwrap();
        fs::write(dir.path().join("b"), b"2").unwrap();
        let err = backend.rename("a", "b", None, None).unwrap_err();
        assert!(matches!(err, FsError::AlreadyExists { .. }));
        assert_eq!(fs::read(dir.path().join("b")).unwrap(), b"2");
        let err = backend.rename("missing", "b", None, None).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn unsafe_paths_may_leave_root() {
        let outer = tempfile::tempdir().unwrap();
        let inner = outer.path().join("inner");
        fs::create_dir(&inner).unwrap();
        let backend = LocalBackend::with_safe_paths(&inner, false).unwrap();
        let mut raw = backend.acquire("../sibling.txt", &mode("w")).unwrap();
        raw.write_raw(b"x").unwrap();
        raw.close().unwrap();
        assert!(outer.path().join("sibling.txt").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn remove_relative_to_dir_fd() {
        let (dir, backend) = backend();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/a"), b"1").unwrap();
        let handle = fs::File::open(dir.path().join("sub")).unwrap();
        backend.remove("a", Some(DirFd::from(&handle))).unwrap();
        assert!(!dir.path().join("sub/a").exists());
    }

    #[cfg(unix)]
    #[test]
    fn dir_fd_guards_match_plain_paths() {
        let (dir, backend) = backend();
        fs::create_dir_all(dir.path().join("sub/inner")).unwrap();
        fs::write(dir.path().join("sub/a"), b"1").unwrap();
        fs::write(dir.path().join("sub/b"), b"2").unwrap();
        let handle = fs::File::open(dir.path().join("sub")).unwrap();
        let fd = Some(DirFd::from(&handle));

        let err = backend.remove("inner", fd).unwrap_err();
        assert!(matches!(err, FsError::PermissionDenied { .. }), "{err:?}");
        assert!(backend.remove("missing", fd).unwrap_err().is_not_found());
        let err = backend.rename("a", "b", fd, fd).unwrap_err();
        assert!(matches!(err, FsError::AlreadyExists { .. }), "{err:?}");
        assert_eq!(fs::read(dir.path().join("sub/b")).unwrap(), b"2");
    }

    #[cfg(unix)]
    #[test]
    fn rename_relative_to_dir_fd() {
        let (dir, backend) = backend();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/a"), b"1").unwrap();
        let handle = fs::File::open(dir.path().join("sub")).unwrap();
        let fd = DirFd::from(&handle);
        backend.rename("a", "b", Some(fd), Some(fd)).unwrap();
        assert!(dir.path().join("sub/b").is_file());
    }
}
