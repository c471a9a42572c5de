/*!
The shared errors across the crate, plus the per-kind counters the
server exposes for observability.
*/

use std::error;
use std::fmt;
use std::io;
use std::result;
use std::sync::atomic::{AtomicU64, Ordering};

/// Represents all errors that can occur while decoding wire bytes or
/// driving a switch connection.
#[derive(Debug)]
pub enum OfpError {
    /// The buffer ended in the middle of a field.
    Truncated,
    /// The OpenFlow header carried a version other than 0x01.
    VersionMismatch(u8),
    /// A message type code outside the enumerated set.
    UnknownMessageType(u8),
    /// An ethertype the frame parser does not speak.
    UnknownEtherType(u16),
    /// Bytes left over after a complete variant decode.
    MalformedTrailer,
    /// An out-of-range discriminant for a reason code, command, etc.
    InvalidEnum { field: &'static str, value: u64 },
    /// The header length disagrees with the variant's intrinsic sizing.
    LengthInconsistent,
    /// A TCP-level failure; terminal for the connection.
    Io(io::Error),
}

impl fmt::Display for OfpError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            OfpError::Truncated => write!(f, "buffer ended mid-field"),
            OfpError::VersionMismatch(v) => {
                write!(f, "unsupported OpenFlow version 0x{:02x}", v)
            }
            OfpError::UnknownMessageType(t) => write!(f, "unknown message type {}", t),
            OfpError::UnknownEtherType(t) => write!(f, "unknown ethertype 0x{:04x}", t),
            OfpError::MalformedTrailer => write!(f, "trailing bytes after complete message"),
            OfpError::InvalidEnum { field, value } => {
                write!(f, "invalid value {} for {}", value, field)
            }
            OfpError::LengthInconsistent => {
                write!(f, "declared length disagrees with message body")
            }
            OfpError::Io(ref e) => write!(f, "i/o error: {}", e),
        }
    }
}

impl error::Error for OfpError {
    fn description(&self) -> &str {
        "OpenFlow protocol error"
    }
}

impl From<io::Error> for OfpError {
    fn from(e: io::Error) -> Self {
        OfpError::Io(e)
    }
}

/// The Result for operations that can fail with an OpenFlow error.
pub type Result<T> = result::Result<T, OfpError>;

/// One monotonic counter per error kind. The server records every
/// failure here before acting on it; nothing is swallowed silently.
#[derive(Debug, Default)]
pub struct ErrorCounters {
    truncated: AtomicU64,
    version_mismatch: AtomicU64,
    unknown_message_type: AtomicU64,
    unknown_ether_type: AtomicU64,
    malformed_trailer: AtomicU64,
    invalid_enum: AtomicU64,
    length_inconsistent: AtomicU64,
    io: AtomicU64,
}

impl ErrorCounters {
    pub fn new() -> ErrorCounters {
        ErrorCounters::default()
    }

    pub fn record(&self, err: &OfpError) {
        let counter = match *err {
            OfpError::Truncated => &self.truncated,
            OfpError::VersionMismatch(_) => &self.version_mismatch,
            OfpError::UnknownMessageType(_) => &self.unknown_message_type,
            OfpError::UnknownEtherType(_) => &self.unknown_ether_type,
            OfpError::MalformedTrailer => &self.malformed_trailer,
            OfpError::InvalidEnum { .. } => &self.invalid_enum,
            OfpError::LengthInconsistent => &self.length_inconsistent,
            OfpError::Io(_) => &self.io,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn truncated(&self) -> u64 {
        self.truncated.load(Ordering::Relaxed)
    }
    pub fn version_mismatch(&self) -> u64 {
        self.version_mismatch.load(Ordering::Relaxed)
    }
    pub fn unknown_message_type(&self) -> u64 {
        self.unknown_message_type.load(Ordering::Relaxed)
    }
    pub fn unknown_ether_type(&self) -> u64 {
        self.unknown_ether_type.load(Ordering::Relaxed)
    }
    pub fn malformed_trailer(&self) -> u64 {
        self.malformed_trailer.load(Ordering::Relaxed)
    }
    pub fn invalid_enum(&self) -> u64 {
        self.invalid_enum.load(Ordering::Relaxed)
    }
    pub fn length_inconsistent(&self) -> u64 {
        self.length_inconsistent.load(Ordering::Relaxed)
    }
    pub fn io(&self) -> u64 {
        self.io.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_record_by_kind() {
        let counters = ErrorCounters::new();
        counters.record(&OfpError::Truncated);
        counters.record(&OfpError::Truncated);
        counters.record(&OfpError::VersionMismatch(4));
        assert_eq!(counters.truncated(), 2);
        assert_eq!(counters.version_mismatch(), 1);
        assert_eq!(counters.io(), 0);
    }
}
