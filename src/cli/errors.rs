use clap::error::ErrorKind;
use std::{error::Error, fmt};

#[derive(Debug, Clone)]
pub enum DecrxCliError {
    UnsupportedFileType,
    NotFound(String),
}

impl Error for DecrxCliError {}

impl fmt::Display for DecrxCliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecrxCliError::UnsupportedFileType => {
                write!(f, "Unsupported file type. Only .crx and .zip files are supported")
            }
            DecrxCliError::NotFound(path) => write!(f, "{} not found", path),
        }
    }
}

impl From<DecrxCliError> for ErrorKind {
    fn from(error: DecrxCliError) -> Self {
        match error {
            DecrxCliError::UnsupportedFileType => ErrorKind::InvalidValue,
            DecrxCliError::NotFound(_) => ErrorKind::Io,
        }
    }
}
