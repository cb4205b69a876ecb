//! # Extension Traits
//!
//! One-shot helpers that open, transfer and close in a single call.
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`read_bytes`](FsExt::read_bytes) | read a whole file in binary mode |
//! | [`read_text`](FsExt::read_text) | read a whole file in text mode (UTF-8) |
//! | [`write_bytes`](FsExt::write_bytes) | replace a file with bytes |
//! | [`write_text`](FsExt::write_text) | replace a file with UTF-8 text |
//!
//! The filesystem's default compression and transform apply as usual.
//!
//! ## JSON Support (Feature-Gated)
//!
//! With the `serde` feature, `FsExtJson` adds `read_json` and `write_json`.

use crate::filesystem::OpenOptions;
use crate::{Backend, Content, File, Filesystem, FsError};

/// Whole-file convenience methods.
///
/// ```rust
/// use blobfs::{Filesystem, FsExt, MemoryBackend};
///
/// let fs = Filesystem::new(MemoryBackend::new());
/// fs.write_text("greeting.txt", "hello").unwrap();
/// assert_eq!(fs.read_bytes("greeting.txt").unwrap(), b"hello");
/// ```
pub trait FsExt {
    /// Open a file; the one required method.
    fn open_with(&self, path: &str, options: &OpenOptions) -> Result<File<'_>, FsError>;

    /// Read a whole file as bytes.
    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, FsError> {
        Ok(transfer_read(self.open_with(path, &OpenOptions::new().mode("rb"))?)?.into_bytes())
    }

    /// Read a whole file as UTF-8 text.
    fn read_text(&self, path: &str) -> Result<String, FsError> {
        match transfer_read(self.open_with(path, &OpenOptions::new().mode("rt"))?)? {
            Content::Text(text) => Ok(text),
            Content::Bytes(_) => Err(FsError::invalid("text mode returned bytes")),
        }
    }

    /// Replace a file with bytes. Returns the number of bytes stored.
    fn write_bytes(&self, path: &str, data: &[u8]) -> Result<usize, FsError> {
        transfer_write(self.open_with(path, &OpenOptions::new().mode("wb"))?, data.into())
    }

    /// Replace a file with UTF-8 text. Returns the number of bytes stored.
    fn write_text(&self, path: &str, text: &str) -> Result<usize, FsError> {
        transfer_write(self.open_with(path, &OpenOptions::new().mode("wt"))?, text.into())
    }
}

fn transfer_read(mut file: File<'_>) -> Result<Content, FsError> {
    let content = file.read()?;
    file.close()?;
    Ok(content)
}

fn transfer_write(mut file: File<'_>, content: Content) -> Result<usize, FsError> {
    let written = file.write(content)?;
    file.close()?;
    Ok(written)
}

impl<B: Backend> FsExt for Filesystem<B> {
    fn open_with(&self, path: &str, options: &OpenOptions) -> Result<File<'_>, FsError> {
        Filesystem::open_with(self, path, options)
    }
}

#[cfg(feature = "serde")]
mod json {
    use super::*;
    use serde::{Serialize, de::DeserializeOwned};

    /// JSON read/write for any [`FsExt`] implementor.
    pub trait FsExtJson: FsExt {
        /// Read a text file and deserialize it as JSON.
        fn read_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FsError> {
            let data = self.read_text(path)?;
            serde_json::from_str(&data).map_err(|e| FsError::Deserialization(e.to_string()))
        }

        /// Serialize a value as pretty JSON and write it as text.
        fn write_json<T: Serialize>(&self, path: &str, value: &T) -> Result<usize, FsError> {
            let json = serde_json::to_string_pretty(value)
                .map_err(|e| FsError::Serialization(e.to_string()))?;
            self.write_text(path, &json)
        }
    }

    impl<F: FsExt + ?Sized> FsExtJson for F {}
}

#[cfg(feature = "serde")]
pub use json::FsExtJson;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryBackend;
    use crate::transform::Transform;

    fn reversed() -> Transform {
        let flip = |d: &[u8]| -> std::io::Result<Vec<u8>> { Ok(d.iter().rev().copied().collect()) };
        Transform::new(flip, flip)
    }

    #[test]
    fn text_round_trip() {
        let fs = Filesystem::new(MemoryBackend::new());
        assert_eq!(fs.write_text("a", "héllo").unwrap(), 6);
        assert_eq!(fs.read_text("a").unwrap(), "héllo");
    }

    #[test]
    fn helpers_use_default_transform() {
        let fs = Filesystem::new(MemoryBackend::new()).with_transform(reversed());
        fs.write_bytes("a", b"abc").unwrap();
        assert_eq!(fs.backend().get("a").unwrap(), b"cba");
        assert_eq!(fs.read_bytes("a").unwrap(), b"abc");
    }

    #[test]
    fn read_missing_is_not_found() {
        let fs = Filesystem::new(MemoryBackend::new());
        assert!(fs.read_bytes("missing").unwrap_err().is_not_found());
    }

    #[test]
    fn invalid_utf8_fails_text_read() {
        let fs = Filesystem::new(MemoryBackend::from_tree([("a", vec![0xff, 0xfe])]));
        assert!(matches!(fs.read_text("a").unwrap_err(), FsError::InvalidData { .. }));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_round_trip() {
        use std::collections::BTreeMap;

        let fs = Filesystem::new(MemoryBackend::new());
        let value = BTreeMap::from([("level".to_owned(), 3)]);
        fs.write_json("settings.json", &value).unwrap();
        let back: BTreeMap<String, i32> = fs.read_json("settings.json").unwrap();
        assert_eq!(back, value);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn malformed_json_is_deserialization_error() {
        let fs = Filesystem::new(MemoryBackend::from_tree([("a", b"{".to_vec())]));
        let err = fs.read_json::<serde_json::Value>("a").unwrap_err();
        assert!(matches!(err, FsError::Deserialization(_)));
    }
}
