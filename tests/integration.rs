//! Integration tests running every backend through the shared pipeline.
//!
//! These tests verify that:
//! 1. Each backend honours the same read/write contract
//! 2. Compression and transforms compose in a fixed order
//! 3. Error kinds match conventional filesystem semantics
//! 4. Declarative construction produces working filesystems

use blobfs::*;
use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// =============================================================================
// In-test Object Store Client
// =============================================================================

/// Object store kept in a map, one namespace per bucket.
#[derive(Default)]
struct BucketClient {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
}

impl BucketClient {
    fn key(bucket: &str, key: &str) -> (String, String) {
        (bucket.to_owned(), key.to_owned())
    }
}

impl ObjectClient for BucketClient {
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectError> {
        let objects = self.objects.lock().unwrap();
        objects.get(&Self::key(bucket, key)).cloned().ok_or(ObjectError::NotFound)
    }

    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), ObjectError> {
        self.objects.lock().unwrap().insert(Self::key(bucket, key), body.to_vec());
        Ok(())
    }

    fn head_object(&self, bucket: &str, key: &str) -> Result<(), ObjectError> {
        let objects = self.objects.lock().unwrap();
        match objects.contains_key(&Self::key(bucket, key)) {
            true => Ok(()),
            false => Err(ObjectError::NotFound),
        }
    }

    fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ObjectError> {
        self.objects.lock().unwrap().remove(&Self::key(bucket, key));
        Ok(())
    }

    fn copy_object(&self, bucket: &str, src_key: &str, dst_key: &str) -> Result<(), ObjectError> {
        let mut objects = self.objects.lock().unwrap();
        let body = objects
            .get(&Self::key(bucket, src_key))
            .cloned()
            .ok_or(ObjectError::NotFound)?;
        objects.insert(Self::key(bucket, dst_key), body);
        Ok(())
    }
}

// =============================================================================
// Shared Contract
// =============================================================================

/// Every backend as a boxed trait object, plus the temp dir keeping the
/// local one alive.
fn all_backends() -> (tempfile::TempDir, Vec<Box<dyn Backend>>) {
    let dir = tempfile::tempdir().unwrap();
    let mut backends: Vec<Box<dyn Backend>> = vec![
        Box::new(LocalBackend::new(dir.path()).unwrap()),
        Box::new(MemoryBackend::new()),
        Box::new(ObjectBackend::new(BucketClient::default(), "bucket")),
    ];
    #[cfg(feature = "sqlite")]
    backends.push(Box::new(SqliteBackend::open(":memory:").unwrap()));
    (dir, backends)
}

fn verify_contract<B: Backend>(fs: &Filesystem<B>) {
    let name = fs.backend().name();

    assert_eq!(fs.open("a.txt", "w").unwrap().write("abc").unwrap(), 3, "{name}");
    assert!(fs.is_file("a.txt").unwrap(), "{name}");
    assert!(fs.exists("a.txt").unwrap(), "{name}");
    let text = fs.open("a.txt", "r").unwrap().read().unwrap();
    assert_eq!(text, Content::Text("abc".into()), "{name}");
    let bytes = fs.open("a.txt", "rb").unwrap().read().unwrap();
    assert_eq!(bytes, Content::Bytes(b"abc".to_vec()), "{name}");

    // Overwrite replaces the whole content.
    fs.open("a.txt", "wb").unwrap().write(b"z").unwrap();
    assert_eq!(fs.read_bytes("a.txt").unwrap(), b"z", "{name}");

    fs.open("b.txt", "w").unwrap().write("b").unwrap();
    let err = fs.rename("a.txt", "b.txt").unwrap_err();
    assert!(matches!(err, FsError::AlreadyExists { .. }), "{name}: {err:?}");
    assert!(fs.is_file("a.txt").unwrap(), "{name}");

    fs.rename("a.txt", "c.txt").unwrap();
    assert!(!fs.exists("a.txt").unwrap(), "{name}");
    assert_eq!(fs.read_bytes("c.txt").unwrap(), b"z", "{name}");

    fs.remove("c.txt").unwrap();
    assert!(!fs.exists("c.txt").unwrap(), "{name}");
    assert!(fs.remove("c.txt").unwrap_err().is_not_found(), "{name}");
    assert!(fs.rename("c.txt", "d.txt").unwrap_err().is_not_found(), "{name}");
}

#[test]
fn every_backend_meets_contract() {
    let (_dir, backends) = all_backends();
    for backend in backends {
        verify_contract(&Filesystem::new(backend));
    }
}

#[test]
fn every_backend_reports_missing_read() {
    let (_dir, backends) = all_backends();
    for backend in backends {
        let fs = Filesystem::new(backend);
        let err = fs
            .open("missing.txt", "r")
            .and_then(|mut f| f.read())
            .unwrap_err();
        assert!(err.is_not_found(), "{}: {err:?}", fs.backend().name());
    }
}

#[test]
fn every_backend_rejects_mismatched_content() {
    let (_dir, backends) = all_backends();
    for backend in backends {
        let fs = Filesystem::new(backend);
        let err = fs.open("x", "w").unwrap().write(b"bytes").unwrap_err();
        assert_eq!(err.to_string(), "write() argument must be str, not bytes");
        let err = fs.open("x", "wb").unwrap().write("text").unwrap_err();
        assert_eq!(err.to_string(), "write() argument must be bytes, not str");
    }
}

#[cfg(feature = "gzip")]
#[test]
fn every_backend_round_trips_compressed_data() {
    let (_dir, backends) = all_backends();
    let payload = "compress me ".repeat(64);
    for backend in backends {
        let fs = Filesystem::new(backend).with_compression("gzip");
        let stored = fs.write_text("c.txt", &payload).unwrap();
        assert!(stored < payload.len(), "{}", fs.backend().name());
        assert_eq!(fs.read_text("c.txt").unwrap(), payload);

        // Without decompression the stored frame is visible.
        let raw = fs
            .open_with("c.txt", &OpenOptions::new().mode("rb").compression("none"))
            .unwrap()
            .read()
            .unwrap();
        assert_eq!(raw.len(), stored);
        assert_eq!(&raw.as_bytes()[..2], &[0x1f, 0x8b]);
    }
}

// =============================================================================
// Modes
// =============================================================================

#[test]
fn invalid_modes_are_rejected() {
    let fs = Filesystem::new(MemoryBackend::new());
    for mode in ["", "rw", "x", "rbt", "+"] {
        let err = fs.open("a", mode).unwrap_err();
        assert!(matches!(err, FsError::InvalidArgument { .. }), "{mode}: {err:?}");
    }
}

#[test]
fn read_handle_cannot_write() {
    let fs = Filesystem::new(MemoryBackend::from_tree([("a", b"x".to_vec())]));
    let err = fs.open("a", "r").unwrap().write("y").unwrap_err();
    assert_eq!(err.to_string(), "unsupported operation: not writeable");
    assert_eq!(fs.read_bytes("a").unwrap(), b"x");
}

#[test]
fn mode_is_normalized() {
    let fs = Filesystem::new(MemoryBackend::new());
    let file = fs.open("a", "w").unwrap();
    assert_eq!(file.mode().as_str(), "wt");
}

// =============================================================================
// Local Disk
// =============================================================================

#[test]
fn local_escape_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let fs = Filesystem::new(LocalBackend::new(dir.path().join("root")).unwrap());
    let err = fs.open("../escape.txt", "w").unwrap_err();
    assert!(err.is_not_found());
    assert!(!dir.path().join("escape.txt").exists());
}

#[test]
fn local_leading_separator_stays_in_root() {
    let dir = tempfile::tempdir().unwrap();
    let fs = Filesystem::new(LocalBackend::new(dir.path()).unwrap());
    fs.write_text("/nested.txt", "x").unwrap();
    assert!(dir.path().join("nested.txt").is_file());
    assert_eq!(fs.open("/nested.txt", "r").unwrap().to_string(), "/nested.txt");
}

#[test]
fn local_directories_exist_but_are_not_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    let fs = Filesystem::new(LocalBackend::new(dir.path()).unwrap());
    assert!(fs.exists("sub").unwrap());
    assert!(!fs.is_file("sub").unwrap());

    let err = fs.remove("sub").unwrap_err();
    assert!(matches!(err, FsError::PermissionDenied { .. }), "{err:?}");
    let err = fs.rename("sub", "moved").unwrap_err();
    assert!(matches!(err, FsError::PermissionDenied { .. }), "{err:?}");
    assert!(dir.path().join("sub").is_dir());
    assert!(!fs.exists("moved").unwrap());
}

#[test]
fn local_escape_cannot_remove_or_rename() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("root")).unwrap();
    std::fs::write(dir.path().join("x"), b"outside").unwrap();
    let fs = Filesystem::new(LocalBackend::new(dir.path().join("root")).unwrap());

    assert!(fs.remove("../x").unwrap_err().is_not_found());
    assert!(fs.rename("../x", "y").unwrap_err().is_not_found());
    fs.write_text("y", "inside").unwrap();
    assert!(fs.rename("y", "../z").unwrap_err().is_not_found());

    assert_eq!(std::fs::read(dir.path().join("x")).unwrap(), b"outside");
    assert!(!dir.path().join("z").exists());
    assert!(fs.is_file("y").unwrap());
}

#[test]
fn local_encodings_apply_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let fs = Filesystem::new(LocalBackend::new(dir.path()).unwrap());
    let latin1 = OpenOptions::new().mode("w").encoding(Encoding::Latin1);
    assert_eq!(fs.open_with("l1.txt", &latin1).unwrap().write("é").unwrap(), 1);
    assert_eq!(std::fs::read(dir.path().join("l1.txt")).unwrap(), [0xe9]);

    let ascii = OpenOptions::new().mode("w").encoding(Encoding::Ascii);
    let err = fs.open_with("a.txt", &ascii).unwrap().write("é").unwrap_err();
    assert!(matches!(err, FsError::InvalidData { .. }));
}

// =============================================================================
// Transforms and Registry
// =============================================================================

fn xor(key: u8) -> Transform {
    let step = move |d: &[u8]| -> std::io::Result<Vec<u8>> { Ok(d.iter().map(|b| b ^ key).collect()) };
    Transform::new(step, step)
}

fn append(byte: u8) -> Transform {
    Transform::new(
        move |d| {
            let mut out = d.to_vec();
            out.push(byte);
            Ok(out)
        },
        |d| Ok(d[..d.len().saturating_sub(1)].to_vec()),
    )
}

#[test]
fn per_call_transform_overrides_default() {
    let fs = Filesystem::new(MemoryBackend::new()).with_transform(append(b'D'));
    let options = OpenOptions::new().mode("wb").transform(append(b'O'));
    fs.open_with("a", &options).unwrap().write(b"x").unwrap();
    assert_eq!(fs.backend().get("a").unwrap(), b"xO");
}

#[test]
fn custom_registry_entries_resolve_at_open() {
    let mut registry = CompressorRegistry::with_builtin();
    registry.register("MARK", append(b'!'));
    let fs = Filesystem::with_registry(MemoryBackend::new(), Arc::new(registry))
        .with_compression("mark");
    assert_eq!(fs.write_bytes("a", b"abc").unwrap(), 4);
    assert_eq!(fs.backend().get("a").unwrap(), b"abc!");
    assert_eq!(fs.read_bytes("a").unwrap(), b"abc");
}

#[test]
fn registry_lists_sorted_names_with_none() {
    let mut registry = CompressorRegistry::new();
    let names = registry.init();
    assert!(names.contains(&"none".to_owned()));
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
    for absent in ["blosc", "brotli", "snappy"] {
        assert!(!registry.contains(absent));
    }
    #[cfg(feature = "zstd")]
    assert!(registry.contains("zstd"));
}

#[cfg(all(feature = "bz2", feature = "gzip", feature = "lzma", feature = "lz4", feature = "zstd"))]
#[test]
fn every_builtin_codec_round_trips_through_filesystem() {
    let fs = Filesystem::new(MemoryBackend::new());
    let payload = b"the same bytes, again and again and again".repeat(8);
    for name in ["bz2", "gzip", "lzma", "lz4", "zstd"] {
        let write = OpenOptions::new().mode("wb").compression(name);
        fs.open_with(name, &write).unwrap().write(payload.as_slice()).unwrap();
        let read = OpenOptions::new().mode("rb").compression(name);
        let back = fs.open_with(name, &read).unwrap().read().unwrap();
        assert_eq!(back.as_bytes(), payload.as_slice(), "{name}");
    }
}

#[cfg(feature = "gzip")]
#[test]
fn wrong_codec_on_read_is_transform_error() {
    let fs = Filesystem::new(MemoryBackend::from_tree([("a", b"plain".to_vec())]));
    let err = fs
        .open_with("a", &OpenOptions::new().mode("rb").compression("gzip"))
        .unwrap()
        .read()
        .unwrap_err();
    assert!(matches!(err, FsError::Transform { .. }));
}

// =============================================================================
// Declarative Construction
// =============================================================================

#[cfg(feature = "gzip")]
#[test]
fn config_built_filesystem_compresses() {
    let dir = tempfile::tempdir().unwrap();
    let config = FilesystemConfig {
        backend: BackendConfig::Local {
            directory: dir.path().to_path_buf(),
            safe_paths: true,
        },
        compression: Some("gzip".into()),
    };
    let fs = config.build().unwrap();
    fs.write_text("a.txt", "hello").unwrap();
    let on_disk = std::fs::read(dir.path().join("a.txt")).unwrap();
    assert_eq!(&on_disk[..2], &[0x1f, 0x8b]);
    assert_eq!(fs.read_text("a.txt").unwrap(), "hello");
}

#[cfg(feature = "serde")]
#[test]
fn config_from_json_builds_memory_filesystem() {
    let config = FilesystemConfig::from_json(r#"{ "backend": { "type": "memory" } }"#).unwrap();
    let fs = config.build().unwrap();
    fs.write_json("v.json", &vec![1, 2, 3]).unwrap();
    let back: Vec<i32> = fs.read_json("v.json").unwrap();
    assert_eq!(back, [1, 2, 3]);
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn binary_round_trip_with_transform(data in proptest::collection::vec(any::<u8>(), 0..512), key: u8) {
        let fs = Filesystem::new(MemoryBackend::new()).with_transform(xor(key));
        let written = fs.write_bytes("p", &data).unwrap();
        prop_assert_eq!(written, data.len());
        prop_assert_eq!(fs.read_bytes("p").unwrap(), data);
    }

    #[test]
    fn text_round_trip(text in "\\PC{0,64}") {
        let fs = Filesystem::new(MemoryBackend::new());
        fs.write_text("t", &text).unwrap();
        prop_assert_eq!(fs.read_text("t").unwrap(), text);
    }

    #[test]
    fn chain_applies_in_order_and_removes_in_reverse(
        data in proptest::collection::vec(any::<u8>(), 0..64),
        a: u8,
        b: u8,
    ) {
        let chained = Transform::chain([&append(a), &xor(b)]);
        let stepwise = xor(b).apply(&append(a).apply(&data).unwrap()).unwrap();
        let applied = chained.apply(&data).unwrap();
        prop_assert_eq!(&applied, &stepwise);
        prop_assert_eq!(chained.remove(&applied).unwrap(), data);
    }
}

#[cfg(feature = "gzip")]
proptest! {
    #[test]
    fn compressed_round_trip(data in proptest::collection::vec(any::<u8>(), 0..1024)) {
        let fs = Filesystem::new(MemoryBackend::new())
            .with_compression("gzip")
            .with_transform(xor(0x5a));
        let written = fs.write_bytes("p", &data).unwrap();
        prop_assert_eq!(written, fs.backend().get("p").unwrap().len());
        prop_assert_eq!(fs.read_bytes("p").unwrap(), data);
    }
}
