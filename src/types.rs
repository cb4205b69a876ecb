//! Core types shared by every backend: open modes, content and text encodings.

use std::fmt;
use std::str::FromStr;

use crate::FsError;

/// Characters accepted in a mode string.
pub const VALID_MODE_CHARS: [char; 5] = ['r', 'w', 'b', 't', '+'];

/// A validated file open mode.
///
/// Built from a mode string such as `"r"`, `"wb"` or `"rt"`. Exactly one of
/// read (`r`) or write (`w`) must be present, text (`t`) and binary (`b`)
/// are mutually exclusive, and text is implied when neither is given.
///
/// # Examples
///
/// ```rust
/// use blobfs::Mode;
///
/// let mode = Mode::parse("w").unwrap();
/// assert_eq!(mode.as_str(), "wt");
/// assert!(mode.is_text());
/// assert!(Mode::parse("rw").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mode {
    normalized: String,
    read: bool,
    write: bool,
    binary: bool,
    update: bool,
}

impl Mode {
    /// Validate and normalize a mode string.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidArgument`] if the string has an unknown character,
    ///   both or neither of read/write, or both text and binary
    pub fn parse(mode: &str) -> Result<Self, FsError> {
        if mode.chars().any(|c| !VALID_MODE_CHARS.contains(&c)) {
            return Err(FsError::invalid(format!("Invalid mode: '{mode}'")));
        }
        let mut normalized = mode.to_owned();
        if !mode.contains('t') && !mode.contains('b') {
            normalized.push('t');
        }
        let read = normalized.contains('r');
        let write = normalized.contains('w');
        if read && write {
            return Err(FsError::invalid("must have exactly one of read/write mode"));
        }
        let binary = normalized.contains('b');
        if binary && normalized.contains('t') {
            return Err(FsError::invalid("can't have text and binary mode at once"));
        }
        if !read && !write {
            return Err(FsError::invalid(format!(
                "Must have exactly one of read/write mode: '{mode}'"
            )));
        }
        Ok(Self {
            update: normalized.contains('+'),
            normalized,
            read,
            write,
            binary,
        })
    }

    /// The normalized mode string (always carries `t` or `b`).
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// Returns `true` if the mode allows reading.
    #[inline]
    pub fn is_read(&self) -> bool {
        self.read
    }

    /// Returns `true` if the mode allows writing.
    #[inline]
    pub fn is_write(&self) -> bool {
        self.write
    }

    /// Returns `true` for binary mode.
    #[inline]
    pub fn is_binary(&self) -> bool {
        self.binary
    }

    /// Returns `true` for text mode.
    #[inline]
    pub fn is_text(&self) -> bool {
        !self.binary
    }

    /// Returns `true` if `+` was given.
    #[inline]
    pub fn is_update(&self) -> bool {
        self.update
    }

    /// Generic read pre-check.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotSupported`] if the mode is not readable
    pub fn check_readable(&self) -> Result<(), FsError> {
        if !self.read {
            return Err(FsError::NotSupported {
                operation: "not readable".into(),
            });
        }
        Ok(())
    }

    /// Generic write pre-check.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotSupported`] if the mode is not writeable
    /// - [`FsError::TypeMismatch`] if bytes are written in text mode or text in binary mode
    pub fn check_writable(&self, content: &Content) -> Result<(), FsError> {
        if !self.write {
            return Err(FsError::NotSupported {
                operation: "not writeable".into(),
            });
        }
        match content {
            Content::Bytes(_) if !self.binary => Err(FsError::TypeMismatch {
                expected: "str",
                found: "bytes",
            }),
            Content::Text(_) if self.binary => Err(FsError::TypeMismatch {
                expected: "bytes",
                found: "str",
            }),
            _ => Ok(()),
        }
    }
}

impl FromStr for Mode {
    type Err = FsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::parse(s)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

/// Data read from or written to a file.
///
/// Binary-mode files exchange [`Content::Bytes`]; text-mode files exchange
/// [`Content::Text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Decoded text.
    Text(String),
}

impl Content {
    /// Name of the content type as used in type-mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Content::Bytes(_) => "bytes",
            Content::Text(_) => "str",
        }
    }

    /// Borrow the raw bytes of either variant.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Content::Bytes(b) => b,
            Content::Text(s) => s.as_bytes(),
        }
    }

    /// Borrow the text, if this is text content.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(s) => Some(s),
            Content::Bytes(_) => None,
        }
    }

    /// Convert into raw bytes (text is returned as its UTF-8 bytes).
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Content::Bytes(b) => b,
            Content::Text(s) => s.into_bytes(),
        }
    }

    /// Convert into text, if this is text content.
    pub fn into_text(self) -> Option<String> {
        match self {
            Content::Text(s) => Some(s),
            Content::Bytes(_) => None,
        }
    }

    /// Length of the underlying data in bytes.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Returns `true` if there is no data.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<u8>> for Content {
    fn from(value: Vec<u8>) -> Self {
        Content::Bytes(value)
    }
}

impl From<&[u8]> for Content {
    fn from(value: &[u8]) -> Self {
        Content::Bytes(value.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Content {
    fn from(value: &[u8; N]) -> Self {
        Content::Bytes(value.to_vec())
    }
}

impl From<String> for Content {
    fn from(value: String) -> Self {
        Content::Text(value)
    }
}

impl From<&str> for Content {
    fn from(value: &str) -> Self {
        Content::Text(value.to_owned())
    }
}

/// Text encoding used at the text/binary boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Encoding {
    /// UTF-8 (the default).
    #[default]
    Utf8,
    /// 7-bit ASCII; other characters fail to encode or decode.
    Ascii,
    /// ISO-8859-1, one byte per code point up to U+00FF.
    Latin1,
}

impl Encoding {
    /// Canonical name of the encoding.
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Ascii => "ascii",
            Encoding::Latin1 => "latin-1",
        }
    }

    /// Encode text into bytes.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidData`] if a character cannot be represented
    pub fn encode(&self, text: &str, path: &str) -> Result<Vec<u8>, FsError> {
        match self {
            Encoding::Utf8 => Ok(text.as_bytes().to_vec()),
            Encoding::Ascii => text
                .chars()
                .map(|c| {
                    if c.is_ascii() {
                        Ok(c as u8)
                    } else {
                        Err(unencodable(self, c, path))
                    }
                })
                .collect(),
            Encoding::Latin1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).map_err(|_| unencodable(self, c, path)))
                .collect(),
        }
    }

    /// Decode bytes into text.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidData`] if the bytes are not valid in this encoding
    pub fn decode(&self, data: Vec<u8>, path: &str) -> Result<String, FsError> {
        match self {
            Encoding::Utf8 => String::from_utf8(data).map_err(|e| FsError::InvalidData {
                path: path.to_owned(),
                details: format!("'utf-8' codec can't decode: {e}"),
            }),
            Encoding::Ascii => {
                if let Some(pos) = data.iter().position(|b| !b.is_ascii()) {
                    return Err(FsError::InvalidData {
                        path: path.to_owned(),
                        details: format!(
                            "'ascii' codec can't decode byte {:#04x} in position {pos}",
                            data[pos]
                        ),
                    });
                }
                Ok(data.into_iter().map(char::from).collect())
            }
            Encoding::Latin1 => Ok(data.into_iter().map(char::from).collect()),
        }
    }
}

fn unencodable(encoding: &Encoding, c: char, path: &str) -> FsError {
    FsError::InvalidData {
        path: path.to_owned(),
        details: format!("'{}' codec can't encode character {c:?}", encoding.name()),
    }
}

impl FromStr for Encoding {
    type Err = FsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Ok(Encoding::Utf8),
            "ascii" | "us-ascii" => Ok(Encoding::Ascii),
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" => Ok(Encoding::Latin1),
            _ => Err(FsError::invalid(format!("unknown encoding: {s}"))),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handle to an open directory that relative paths are resolved against.
///
/// Borrows the descriptor of an open directory, so the directory stays open
/// for as long as the handle is in use. Only the local backend on unix
/// honours it; other backends reject it with [`FsError::NotSupported`].
///
/// ```rust,no_run
/// # #[cfg(unix)] {
/// use blobfs::DirFd;
///
/// let dir = std::fs::File::open("/tmp").unwrap();
/// let handle = DirFd::from(&dir);
/// # let _ = handle;
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DirFd<'fd> {
    #[cfg(unix)]
    fd: std::os::fd::BorrowedFd<'fd>,
    #[cfg(not(unix))]
    _dir: std::marker::PhantomData<&'fd ()>,
}

#[cfg(unix)]
impl<'fd, T: std::os::fd::AsFd> From<&'fd T> for DirFd<'fd> {
    fn from(dir: &'fd T) -> Self {
        DirFd { fd: dir.as_fd() }
    }
}

#[cfg(unix)]
impl std::os::fd::AsFd for DirFd<'_> {
    fn as_fd(&self) -> std::os::fd::BorrowedFd<'_> {
        self.fd
    }
}
