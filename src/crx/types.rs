#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrxVersion {
    V2,
    V3,
}

impl CrxVersion {
    pub fn number(self) -> u32 {
        match self {
            CrxVersion::V2 => 2,
            CrxVersion::V3 => 3,
        }
    }
}

/// Borrowed view over a single crx container. Every field aliases the
/// input buffer, so the buffer must stay immutable while the view is in
/// use.
#[derive(Debug, Clone, Copy)]
pub struct CrxPackage<'a> {
    pub version: CrxVersion,
    /// v2 only.
    pub public_key: Option<&'a [u8]>,
    /// v2 only.
    pub signature: Option<&'a [u8]>,
    /// v3 only; a protobuf-encoded block that is opaque to this crate.
    pub signed_header: Option<&'a [u8]>,
    /// The embedded zip archive.
    pub zip: &'a [u8],
}
