use std::ops::Range;

use super::constants::{
    CRX_MAGIC, HEADER_SIZE_RANGE, MAGIC_RANGE, PUBLIC_KEY_LENGTH_RANGE, SIGNATURE_LENGTH_RANGE,
    V2_PAYLOAD_BASE, V3_PAYLOAD_BASE, VERSION_RANGE, ZIP_MAGIC,
};
use super::errors::CrxError;
use super::types::{CrxPackage, CrxVersion};

/// True if the buffer starts with the zip local-file-header magic.
pub fn is_zip(data: &[u8]) -> bool {
    data.len() >= MAGIC_RANGE.end && data[MAGIC_RANGE] == ZIP_MAGIC
}

/// True if the buffer starts with the Cr24 container magic.
pub fn is_crx(data: &[u8]) -> bool {
    data.len() >= MAGIC_RANGE.end && data[MAGIC_RANGE] == CRX_MAGIC
}

fn slice_range(data: &[u8], range: Range<usize>) -> Result<&[u8], CrxError> {
    if data.len() < range.end {
        return Err(CrxError::TruncatedContainer {
            needed: range.end,
            len: data.len(),
        });
    }
    Ok(&data[range])
}

fn read_u32_le(data: &[u8], range: Range<usize>) -> Result<u32, CrxError> {
    let slice = slice_range(data, range)?;

    let mut word = [0u8; 4];
    word.copy_from_slice(slice);

    Ok(u32::from_le_bytes(word))
}

/// Return the zip archive embedded in a crx container, or the buffer
/// itself if it already is a zip archive. Zero-copy: the result is
/// always a sub-slice of `data`.
pub fn crx_to_zip(data: &[u8]) -> Result<&[u8], CrxError> {
    if is_zip(data) {
        return Ok(data);
    }

    Ok(parse_crx(data)?.zip)
}

/// Parse a Cr24 container into borrowed views of its header blocks and
/// zip payload. Unlike [`crx_to_zip`] this does not pass plain zip
/// buffers through.
pub fn parse_crx(data: &[u8]) -> Result<CrxPackage<'_>, CrxError> {
    if !is_crx(data) {
        return Err(CrxError::MalformedHeader);
    }

    // The version is a full little-endian word; bytes 5..8 are reserved
    // and must be zero, so anything but 2 or 3 here is rejected.
    let version = match read_u32_le(data, VERSION_RANGE)? {
        2 => CrxVersion::V2,
        3 => CrxVersion::V3,
        other => return Err(CrxError::UnsupportedVersion(other)),
    };

    match version {
        CrxVersion::V2 => {
            let public_key_length = read_u32_le(data, PUBLIC_KEY_LENGTH_RANGE)? as usize;
            let signature_length = read_u32_le(data, SIGNATURE_LENGTH_RANGE)? as usize;

            let signature_start = V2_PAYLOAD_BASE + public_key_length;
            let zip_start = signature_start + signature_length;
            if zip_start > data.len() {
                return Err(CrxError::TruncatedContainer {
                    needed: zip_start,
                    len: data.len(),
                });
            }

            Ok(CrxPackage {
                version,
                public_key: Some(&data[V2_PAYLOAD_BASE..signature_start]),
                signature: Some(&data[signature_start..zip_start]),
                signed_header: None,
                zip: &data[zip_start..],
            })
        }
        CrxVersion::V3 => {
            let header_size = read_u32_le(data, HEADER_SIZE_RANGE)? as usize;

            let zip_start = V3_PAYLOAD_BASE + header_size;
            if zip_start > data.len() {
                return Err(CrxError::TruncatedContainer {
                    needed: zip_start,
                    len: data.len(),
                });
            }

            Ok(CrxPackage {
                version,
                public_key: None,
                signature: None,
                signed_header: Some(&data[V3_PAYLOAD_BASE..zip_start]),
                zip: &data[zip_start..],
            })
        }
    }
}
