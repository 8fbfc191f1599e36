use std::fs;
use std::io::{Cursor, Write};

use decrx::crx::errors::CrxError;
use decrx::crx::helpers::crx_to_zip;
use decrx::extract::{extract_zip_to_directory, unpack_crx_file};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

const MANIFEST: &str = r#"{"manifest_version": 3, "name": "fixture", "version": "1.0"}"#;
const BACKGROUND: &[u8] = b"console.log('ready');\n";

fn build_zip() -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    writer
        .start_file("manifest.json", options)
        .expect("Failed to start manifest entry");
    writer
        .write_all(MANIFEST.as_bytes())
        .expect("Failed to write manifest");

    writer
        .add_directory("scripts", options)
        .expect("Failed to add scripts directory");
    writer
        .start_file("scripts/background.js", options)
        .expect("Failed to start script entry");
    writer
        .write_all(BACKGROUND)
        .expect("Failed to write script");

    writer.finish().expect("Failed to finish zip").into_inner()
}

fn wrap_crx2(zip_data: &[u8], public_key: &[u8], signature: &[u8]) -> Vec<u8> {
    let mut buf = vec![0x43, 0x72, 0x32, 0x34, 2, 0, 0, 0];
    buf.extend_from_slice(&(public_key.len() as u32).to_le_bytes());
    buf.extend_from_slice(&(signature.len() as u32).to_le_bytes());
    buf.extend_from_slice(public_key);
    buf.extend_from_slice(signature);
    buf.extend_from_slice(zip_data);
    buf
}

fn wrap_crx3(zip_data: &[u8], signed_header: &[u8]) -> Vec<u8> {
    let mut buf = vec![0x43, 0x72, 0x32, 0x34, 3, 0, 0, 0];
    buf.extend_from_slice(&(signed_header.len() as u32).to_le_bytes());
    buf.extend_from_slice(signed_header);
    buf.extend_from_slice(zip_data);
    buf
}

fn assert_fixture_tree(dir: &std::path::Path) {
    let manifest =
        fs::read_to_string(dir.join("manifest.json")).expect("Failed to read manifest.json");
    assert_eq!(manifest, MANIFEST);

    let script = fs::read(dir.join("scripts/background.js")).expect("Failed to read script");
    assert_eq!(script, BACKGROUND);
}

#[test]
fn decoded_payload_is_a_readable_archive() {
    let zip_data = build_zip();
    let crx = wrap_crx3(&zip_data, &[0xAB; 32]);

    let decoded = crx_to_zip(&crx).expect("Failed to decode crx");
    assert_eq!(decoded, &zip_data[..]);

    let mut archive =
        ZipArchive::new(Cursor::new(decoded)).expect("Decoded payload should be a zip archive");
    let mut manifest = String::new();
    std::io::Read::read_to_string(
        &mut archive
            .by_name("manifest.json")
            .expect("Archive should contain manifest.json"),
        &mut manifest,
    )
    .expect("Failed to read manifest entry");
    assert_eq!(manifest, MANIFEST);
}

#[test]
fn crx3_file_unpacks_to_directory() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let crx_path = temp_dir.path().join("fixture.crx");
    fs::write(&crx_path, wrap_crx3(&build_zip(), &[0; 16])).expect("Failed to write crx");

    let dest = temp_dir.path().join("unpacked");
    let out = unpack_crx_file(&crx_path, Some(&dest)).expect("Failed to unpack crx");

    assert_eq!(out, dest);
    assert_fixture_tree(&dest);
}

#[test]
fn crx2_file_unpacks_to_directory() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let crx_path = temp_dir.path().join("fixture.crx");
    fs::write(&crx_path, wrap_crx2(&build_zip(), &[0x01; 24], &[0x02; 12]))
        .expect("Failed to write crx");

    let dest = temp_dir.path().join("unpacked");
    unpack_crx_file(&crx_path, Some(&dest)).expect("Failed to unpack crx");

    assert_fixture_tree(&dest);
}

#[test]
fn plain_zip_file_unpacks_via_passthrough() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let zip_path = temp_dir.path().join("fixture.zip");
    fs::write(&zip_path, build_zip()).expect("Failed to write zip");

    let dest = temp_dir.path().join("unpacked");
    unpack_crx_file(&zip_path, Some(&dest)).expect("Failed to unpack zip");

    assert_fixture_tree(&dest);
}

#[test]
fn default_destination_is_next_to_input() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let crx_path = temp_dir.path().join("fixture.crx");
    fs::write(&crx_path, wrap_crx3(&build_zip(), &[0; 8])).expect("Failed to write crx");

    let dest = unpack_crx_file(&crx_path, None).expect("Failed to unpack crx");

    assert_eq!(dest, temp_dir.path().join("fixture"));
    assert_fixture_tree(&dest);
}

#[cfg(unix)]
#[test]
fn unpacked_tree_gets_normalized_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let crx_path = temp_dir.path().join("fixture.crx");
    fs::write(&crx_path, wrap_crx3(&build_zip(), &[0; 8])).expect("Failed to write crx");

    let dest = temp_dir.path().join("unpacked");
    unpack_crx_file(&crx_path, Some(&dest)).expect("Failed to unpack crx");

    for path in [
        dest.join("manifest.json"),
        dest.join("scripts"),
        dest.join("scripts/background.js"),
    ] {
        let mode = fs::metadata(&path)
            .expect("Failed to stat unpacked entry")
            .permissions()
            .mode();
        assert_eq!(
            mode & 0o777,
            0o755,
            "unexpected mode on {}",
            path.display()
        );
    }
}

#[test]
fn corrupt_container_is_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let crx_path = temp_dir.path().join("bad.crx");
    fs::write(&crx_path, b"this is not a container").expect("Failed to write file");

    let err = unpack_crx_file(&crx_path, Some(&temp_dir.path().join("unpacked")))
        .expect_err("Garbage input should not unpack");

    assert_eq!(
        err.downcast_ref::<CrxError>(),
        Some(&CrxError::MalformedHeader)
    );
}

#[test]
fn truncated_container_is_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let crx_path = temp_dir.path().join("short.crx");

    // Declares a 4096-byte signed header but carries almost nothing.
    let mut data = vec![0x43, 0x72, 0x32, 0x34, 3, 0, 0, 0];
    data.extend_from_slice(&4096u32.to_le_bytes());
    data.extend_from_slice(&[0; 10]);
    fs::write(&crx_path, data).expect("Failed to write file");

    let err = unpack_crx_file(&crx_path, Some(&temp_dir.path().join("unpacked")))
        .expect_err("Truncated input should not unpack");

    assert!(matches!(
        err.downcast_ref::<CrxError>(),
        Some(CrxError::TruncatedContainer { .. })
    ));
}

#[test]
fn reextraction_overwrites_previous_contents() {
    let zip_data = build_zip();
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let dest = temp_dir.path().join("unpacked");

    extract_zip_to_directory(&zip_data, &dest).expect("Failed to extract first time");

    // Tamper with an extracted file, then extract again over it.
    fs::write(dest.join("manifest.json"), "tampered").expect("Failed to tamper with manifest");
    extract_zip_to_directory(&zip_data, &dest).expect("Failed to extract second time");

    assert_fixture_tree(&dest);
}
