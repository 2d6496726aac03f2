//! Error types for the halo codec.

use std::fmt;
use std::io;

/// Errors that can occur while encoding or decoding a halo snapshot.
#[derive(Debug)]
pub enum HaloError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// The buffer does not start with the expected `b"HALO"` magic bytes.
    InvalidMagic,
    /// The format version is not supported by this build.
    UnsupportedVersion {
        /// The version found in the buffer.
        found: u8,
    },
    /// The snapshot is truncated or internally inconsistent.
    Malformed {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// Bytes remain after a complete snapshot was decoded.
    TrailingBytes {
        /// How many bytes were left over.
        count: usize,
    },
}

impl fmt::Display for HaloError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidMagic => write!(f, "invalid magic bytes (expected b\"HALO\")"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported halo format version {found}")
            }
            Self::Malformed { detail } => write!(f, "malformed halo snapshot: {detail}"),
            Self::TrailingBytes { count } => {
                write!(f, "{count} trailing bytes after halo snapshot")
            }
        }
    }
}

impl std::error::Error for HaloError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for HaloError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
