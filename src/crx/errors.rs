use std::{error::Error, fmt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrxError {
    /// Neither a zip archive nor a Cr24-tagged container.
    MalformedHeader,
    /// Cr24 magic present but the version word is not 2 or 3.
    UnsupportedVersion(u32),
    /// The declared header lengths run past the end of the buffer.
    TruncatedContainer { needed: usize, len: usize },
}

impl Error for CrxError {}

impl fmt::Display for CrxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrxError::MalformedHeader => write!(f, "invalid header: does not start with Cr24"),
            CrxError::UnsupportedVersion(version) => {
                write!(f, "unexpected crx format version number: {}", version)
            }
            CrxError::TruncatedContainer { needed, len } => write!(
                f,
                "truncated container: header declares {} bytes but the file has {}",
                needed, len
            ),
        }
    }
}
