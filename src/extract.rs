use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::Context;
use zip::ZipArchive;

use crate::crx::helpers::crx_to_zip;

/// Unpack an in-memory zip archive into `extract_to`. Entries whose
/// names escape the target directory are skipped.
pub fn extract_zip_to_directory(zip_data: &[u8], extract_to: &Path) -> anyhow::Result<()> {
    let cursor = Cursor::new(zip_data);
    let mut archive = ZipArchive::new(cursor).context("failed to read zip archive")?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let outpath = match file.enclosed_name() {
            Some(path) => extract_to.join(path),
            None => continue,
        };

        if file.name().ends_with('/') {
            fs::create_dir_all(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                if !parent.exists() {
                    fs::create_dir_all(parent)?;
                }
            }
            let mut outfile = fs::File::create(&outpath)
                .with_context(|| format!("failed to create {}", outpath.display()))?;
            std::io::copy(&mut file, &mut outfile)?;
        }
    }

    Ok(())
}

/// Apply `mode` to every file and directory below `dir`. The root
/// directory itself is left untouched.
#[cfg(unix)]
pub fn set_permissions_recursive(dir: &Path, mode: u32) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode))
            .with_context(|| format!("failed to chmod {}", path.display()))?;
        if path.is_dir() {
            set_permissions_recursive(&path, mode)?;
        }
    }

    Ok(())
}

#[cfg(not(unix))]
pub fn set_permissions_recursive(_dir: &Path, _mode: u32) -> anyhow::Result<()> {
    Ok(())
}

/// Unpack a `.crx` (or plain `.zip`) file into `destination`, which
/// defaults to a directory next to the input named after its file stem.
/// Returns the directory the extension was unpacked into.
pub fn unpack_crx_file(crx_path: &Path, destination: Option<&Path>) -> anyhow::Result<PathBuf> {
    let dest = match destination {
        Some(path) => path.to_path_buf(),
        None => crx_path.with_extension(""),
    };

    let data =
        fs::read(crx_path).with_context(|| format!("failed to read {}", crx_path.display()))?;
    let zip_data =
        crx_to_zip(&data).with_context(|| format!("failed to decode {}", crx_path.display()))?;

    fs::create_dir_all(&dest).with_context(|| format!("failed to create {}", dest.display()))?;
    extract_zip_to_directory(zip_data, &dest)?;
    set_permissions_recursive(&dest, 0o755)?;

    Ok(dest)
}
