use fixcommit_blob::{BlobError, BlobReader, BlobWriter, ReadMode, WriteOptions};
use fixcommit_core::ContentDigest;
use std::fs;
use tempfile::TempDir;

const FIRST: &[u8] = &[0xa1, 0x0f, 0x63, 0x55, 0x53, 0x44];
const SECOND: &[u8] = &[0xa1, 0x0f, 0x63, 0x45, 0x55, 0x52];

#[test]
fn test_write_fetch_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let store_path = temp_dir.path().join("test.fxb");

    let (a, b) = {
        let mut writer = BlobWriter::open(&store_path, WriteOptions::default()).unwrap();
        let a = writer.append(FIRST).unwrap();
        let b = writer.append(SECOND).unwrap();
        writer.finish().unwrap();
        (a, b)
    };

    assert_eq!(a.offset, 8);
    assert_eq!(b.offset, 8 + 36 + FIRST.len() as u64);
    assert_eq!(a.digest, ContentDigest::of(FIRST));

    let mut reader = BlobReader::open(&store_path, ReadMode::Strict).unwrap();
    assert_eq!(reader.fetch(&b.digest).unwrap(), SECOND);
    assert_eq!(reader.fetch(&a.digest).unwrap(), FIRST);
    assert_eq!(reader.get(&b).unwrap(), SECOND);
}

#[test]
fn test_sequential_read() {
    let temp_dir = TempDir::new().unwrap();
    let store_path = temp_dir.path().join("test.fxb");
    {
        let mut writer = BlobWriter::open(&store_path, WriteOptions::default()).unwrap();
        writer.append(FIRST).unwrap();
        writer.append(SECOND).unwrap();
    }

    let mut reader = BlobReader::open(&store_path, ReadMode::Strict).unwrap();
    let (r1, b1) = reader.next_blob().unwrap().unwrap();
    let (r2, b2) = reader.next_blob().unwrap().unwrap();
    assert!(reader.next_blob().unwrap().is_none());
    assert_eq!((b1.as_slice(), r1.len), (FIRST, FIRST.len() as u64));
    assert_eq!((b2.as_slice(), r2.len), (SECOND, SECOND.len() as u64));
}

#[test]
fn test_identical_bytes_are_stored_once() {
    let temp_dir = TempDir::new().unwrap();
    let store_path = temp_dir.path().join("test.fxb");

    let first = {
        let mut writer = BlobWriter::open(&store_path, WriteOptions::default()).unwrap();
        let r = writer.append(FIRST).unwrap();
        assert_eq!(writer.append(FIRST).unwrap(), r);
        r
    };
    let size_after_first = fs::metadata(&store_path).unwrap().len();

    // a fresh writer rebuilds the index from disk
    let mut writer = BlobWriter::open(&store_path, WriteOptions::default()).unwrap();
    assert!(writer.contains(&first.digest));
    assert_eq!(writer.append(FIRST).unwrap(), first);
    assert_eq!(writer.len(), 1);
    writer.finish().unwrap();

    assert_eq!(fs::metadata(&store_path).unwrap().len(), size_after_first);
}

#[test]
fn test_append_across_sessions() {
    let temp_dir = TempDir::new().unwrap();
    let store_path = temp_dir.path().join("test.fxb");
    {
        let mut writer = BlobWriter::open(&store_path, WriteOptions::default()).unwrap();
        writer.append(FIRST).unwrap();
    }
    let second = {
        let mut writer = BlobWriter::open(&store_path, WriteOptions::default()).unwrap();
        writer.append(SECOND).unwrap()
    };

    let mut reader = BlobReader::open(&store_path, ReadMode::Strict).unwrap();
    assert_eq!(reader.get(&second).unwrap(), SECOND);
    assert_eq!(reader.fetch(&ContentDigest::of(FIRST)).unwrap(), FIRST);
}

#[test]
fn test_truncate_option_discards_blobs() {
    let temp_dir = TempDir::new().unwrap();
    let store_path = temp_dir.path().join("test.fxb");
    {
        let mut writer = BlobWriter::open(&store_path, WriteOptions::default()).unwrap();
        writer.append(FIRST).unwrap();
    }
    let options = WriteOptions {
        append: false,
        ..WriteOptions::default()
    };
    let writer = BlobWriter::open(&store_path, options).unwrap();
    assert!(writer.is_empty());
    writer.finish().unwrap();
    assert_eq!(fs::metadata(&store_path).unwrap().len(), 8);
}

#[test]
fn test_missing_digest_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let store_path = temp_dir.path().join("test.fxb");
    BlobWriter::open(&store_path, WriteOptions::default())
        .unwrap()
        .finish()
        .unwrap();

    let mut reader = BlobReader::open(&store_path, ReadMode::Strict).unwrap();
    assert!(matches!(
        reader.fetch(&ContentDigest::of(FIRST)),
        Err(BlobError::NotFound(_))
    ));
}

#[test]
fn test_empty_blob_is_storable() {
    let temp_dir = TempDir::new().unwrap();
    let store_path = temp_dir.path().join("test.fxb");
    let r = {
        let mut writer = BlobWriter::open(&store_path, WriteOptions::default()).unwrap();
        writer.append(&[]).unwrap()
    };
    let mut reader = BlobReader::open(&store_path, ReadMode::Strict).unwrap();
    assert!(reader.get(&r).unwrap().is_empty());
}

#[test]
fn test_blob_ref_serializes() {
    let temp_dir = TempDir::new().unwrap();
    let store_path = temp_dir.path().join("test.fxb");
    let mut writer = BlobWriter::open(&store_path, WriteOptions::default()).unwrap();
    let r = writer.append(FIRST).unwrap();
    let json = serde_json::to_value(&r).unwrap();
    assert_eq!(json["offset"], 8);
    assert_eq!(json["len"], 6);
    assert_eq!(json["digest"]["alg"], "sha-256");
}
