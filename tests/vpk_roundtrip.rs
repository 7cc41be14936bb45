//! Round-trip and on-disk layout tests for the VPK format layer.

mod common;

use common::{archive_bytes, open_bytes};
use reefmerge::{ArchivePath, Error, VpkArchive, VpkVersion, VpkWriter};
use std::io::Cursor;

#[test]
fn test_v1_roundtrip_assorted_paths() {
    let entries: &[(&str, &[u8])] = &[
        ("maps/dota/start.vmap_c", b"start"),
        ("maps/dota/deep/nested/detail.vtex_c", b"detail"),
        ("maps/dota.vmap_c", b"main"),
        ("readme", b"no extension"),
        (".hidden", b"dotfile"),
        ("empty.bin", b""),
    ];
    let mut archive = open_bytes(archive_bytes(VpkVersion::V1, entries));

    assert_eq!(archive.len(), entries.len());
    for (path, content) in entries {
        assert_eq!(&archive.extract_to_vec(path).unwrap(), content);
    }
}

#[test]
fn test_v2_roundtrip_assorted_paths() {
    let entries: &[(&str, &[u8])] = &[
        ("maps/dota.vmap_c", b"main"),
        ("maps/thumb.png", b"\x89PNG\r\n"),
        ("scripts/items/item_blink.txt", b"blink"),
    ];
    let mut archive = open_bytes(archive_bytes(VpkVersion::V2, entries));

    assert_eq!(archive.version(), VpkVersion::V2);
    for (path, content) in entries {
        assert_eq!(&archive.extract_to_vec(path).unwrap(), content);
    }
}

#[test]
fn test_v1_on_disk_layout() {
    let bytes = archive_bytes(VpkVersion::V1, &[("a.txt", b"hi")]);

    assert_eq!(&bytes[0..4], &0x55aa1234u32.to_le_bytes());
    assert_eq!(&bytes[4..8], &1u32.to_le_bytes());
    let tree_size = u32::from_le_bytes(bytes[8..12].try_into().unwrap()) as usize;

    // Tree: "txt\0 \0a\0", an 18-byte record, then three terminators
    let tree = &bytes[12..12 + tree_size];
    assert!(tree.starts_with(b"txt\0 \0a\0"));
    assert!(tree.ends_with(b"\0\0\0"));
    let record = &tree[8..26];
    assert_eq!(&record[4..6], &0u16.to_le_bytes()); // no preload
    assert_eq!(&record[6..8], &0x7fffu16.to_le_bytes()); // embedded data
    assert_eq!(&record[8..12], &0u32.to_le_bytes()); // first data offset
    assert_eq!(&record[12..16], &2u32.to_le_bytes()); // content length
    assert_eq!(&record[16..18], &0xffffu16.to_le_bytes()); // terminator

    // Data section is the raw content
    assert_eq!(&bytes[12 + tree_size..], b"hi");
}

#[test]
fn test_v2_header_layout() {
    let bytes = archive_bytes(VpkVersion::V2, &[("a.txt", b"hi")]);

    assert_eq!(&bytes[0..4], &0x55aa1234u32.to_le_bytes());
    assert_eq!(&bytes[4..8], &2u32.to_le_bytes());
    let tree_size = u32::from_le_bytes(bytes[8..12].try_into().unwrap());
    let data_size = u32::from_le_bytes(bytes[12..16].try_into().unwrap());
    assert_eq!(data_size, 2);
    assert_eq!(&bytes[16..20], &0u32.to_le_bytes()); // archive MD5 section
    assert_eq!(&bytes[20..24], &48u32.to_le_bytes()); // other MD5 section
    assert_eq!(&bytes[24..28], &0u32.to_le_bytes()); // signature section

    // Total: header, tree, data, three 16-byte checksums
    assert_eq!(bytes.len() as u32, 28 + tree_size + data_size + 48);
}

#[test]
fn test_every_truncation_errors_cleanly() {
    let bytes = archive_bytes(
        VpkVersion::V2,
        &[("maps/dota.vmap_c", b"content"), ("scripts/ai.txt", b"more")],
    );
    for cut in 0..bytes.len() {
        let result = VpkArchive::open(Cursor::new(bytes[..cut].to_vec()));
        assert!(result.is_err(), "truncation at {cut} bytes must not open");
    }
}

#[test]
fn test_unexpected_checksum_section_size_rejected() {
    // An empty v2 archive claiming a 32-byte checksum section
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&0x55aa1234u32.to_le_bytes());
    bytes.extend_from_slice(&2u32.to_le_bytes());
    bytes.extend_from_slice(&1u32.to_le_bytes()); // tree size
    bytes.extend_from_slice(&0u32.to_le_bytes()); // data section
    bytes.extend_from_slice(&0u32.to_le_bytes()); // archive MD5 section
    bytes.extend_from_slice(&32u32.to_le_bytes()); // other MD5 section
    bytes.extend_from_slice(&0u32.to_le_bytes()); // signature section
    bytes.push(0); // empty tree
    bytes.extend_from_slice(&[0u8; 32]);

    let err = VpkArchive::open(Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, Error::InvalidFormat(_)));
}

#[test]
fn test_extract_to_path_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let mut archive = open_bytes(archive_bytes(
        VpkVersion::V2,
        &[("maps/dota/start.vmap_c", b"start")],
    ));

    let dest = dir.path().join("staging/maps/dota/start.vmap_c");
    let written = archive
        .extract_to_path("maps/dota/start.vmap_c", &dest)
        .unwrap();
    assert_eq!(written, 5);
    assert_eq!(std::fs::read(dest).unwrap(), b"start");
}

#[test]
fn test_grouping_across_shared_dirs_and_extensions() {
    // Entries sharing directories and extensions in every combination
    let entries: &[(&str, &[u8])] = &[
        ("a/x.txt", b"1"),
        ("a/y.txt", b"2"),
        ("a/x.bin", b"3"),
        ("b/x.txt", b"4"),
        ("b/sub/x.txt", b"5"),
        ("x.txt", b"6"),
        ("x.bin", b"7"),
        ("a/noext", b"8"),
        ("noext", b"9"),
    ];
    let mut archive = open_bytes(archive_bytes(VpkVersion::V2, entries));

    assert_eq!(archive.len(), entries.len());
    for (path, content) in entries {
        assert_eq!(&archive.extract_to_vec(path).unwrap(), content, "at {path}");
    }

    let mut paths: Vec<&str> = archive.paths().map(|p| p.as_str()).collect();
    paths.sort_unstable();
    let mut expected: Vec<&str> = entries.iter().map(|(p, _)| *p).collect();
    expected.sort_unstable();
    assert_eq!(paths, expected);
}

#[test]
fn test_write_path_then_open_path() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("pack.vpk");

    let mut writer = VpkWriter::new(VpkVersion::V2);
    writer.add_bytes(ArchivePath::new("maps/dota.vmap_c").unwrap(), b"geometry".to_vec());
    let summary = writer.write_path(&out).unwrap();

    assert_eq!(summary.entries_written, 1);
    assert_eq!(std::fs::metadata(&out).unwrap().len(), summary.bytes_written);

    let mut archive = VpkArchive::open_path(&out).unwrap();
    assert_eq!(archive.extract_to_vec("maps/dota.vmap_c").unwrap(), b"geometry");
}

#[test]
fn test_file_sources_stream_into_pack() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("big.bin");
    let content: Vec<u8> = (0..50_000u32).map(|i| (i % 256) as u8).collect();
    std::fs::write(&source, &content).unwrap();

    let mut writer = VpkWriter::new(VpkVersion::V2);
    writer
        .add_file(ArchivePath::new("models/big.bin").unwrap(), &source)
        .unwrap();
    writer.add_bytes(ArchivePath::new("tag.txt").unwrap(), b"tag".to_vec());

    let mut bytes = Vec::new();
    writer.write_to(&mut bytes).unwrap();
    let mut archive = open_bytes(bytes);
    assert_eq!(archive.extract_to_vec("models/big.bin").unwrap(), content);
    assert_eq!(archive.extract_to_vec("tag.txt").unwrap(), b"tag");
}
