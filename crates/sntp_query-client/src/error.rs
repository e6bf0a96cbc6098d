// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Error types for the SNTP client.
//!
//! Every query returns `Result<_, NtpError>`. Callers working in `io::Result`
//! code can convert with `?`: transport failures come back as the same
//! `io::Error`, and everything else is wrapped so it can be recovered with
//! `io::Error::get_ref()` and `downcast_ref::<NtpError>()`.
//!
//! ```
//! use std::io;
//! use sntp_client::error::{NtpError, ProtocolError};
//!
//! let err: io::Error = NtpError::Protocol(ProtocolError::OriginTimestampMismatch).into();
//! assert_eq!(err.kind(), io::ErrorKind::InvalidData);
//! assert!(matches!(
//!     err.get_ref().and_then(|inner| inner.downcast_ref::<NtpError>()),
//!     Some(NtpError::Protocol(ProtocolError::OriginTimestampMismatch))
//! ));
//! ```

pub use sntp_proto::error::ParseError;

use std::fmt;
use std::io;

use crate::protocol::Mode;

/// Errors that can occur while querying a server or validating its reply.
#[derive(Debug)]
pub enum NtpError {
    /// The requested protocol version is not 2, 3, or 4. No request was sent.
    InvalidVersion(u8),
    /// The request packet could not be serialized.
    Encode(io::Error),
    /// The transport failed to deliver the request or return a reply. The
    /// error is exactly what the transport returned.
    Transport(io::Error),
    /// The reply is not a 48-byte NTP packet.
    MalformedPacket(ParseError),
    /// The local clock read earlier on receive than on send, so the sample cannot be used.
    ClockRanBackwards,
    /// The reply is not a legitimate answer to the request.
    Protocol(ProtocolError),
    /// The reply is well formed but the server is not a usable time source.
    Validation(ValidationError),
}

/// Reasons a decoded reply is rejected before its timestamps are used.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProtocolError {
    /// The reply mode is not Server.
    UnexpectedMode(Mode),
    /// The server transmit timestamp is zero.
    ZeroTransmitTimestamp,
    /// The origin timestamp does not echo the transmit timestamp of our request.
    OriginTimestampMismatch,
    /// The server receive timestamp is later than its transmit timestamp.
    ServerClockRanBackwards,
}

/// Reasons a [`Response`](crate::Response) is not a usable time source.
#[derive(Clone, Debug, PartialEq)]
pub enum ValidationError {
    /// The server reports leap indicator 3 (clock not synchronized).
    Unsynchronized,
    /// The stratum is outside the serving range 1-15.
    InvalidStratum {
        /// The stratum in the reply.
        stratum: u8,
        /// The ASCII kiss code when the stratum is 0.
        kiss_code: Option<String>,
    },
    /// Root delay / 2 + root dispersion exceeds the accepted maximum.
    ExcessiveRootDistance {
        /// The root distance of the reply, in seconds.
        root_distance: f64,
        /// The configured maximum, in seconds.
        max: f64,
    },
}

// ── Display implementations ─────────────────────────────────────────

impl fmt::Display for NtpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NtpError::InvalidVersion(v) => {
                write!(f, "invalid NTP version {v} requested (expected 2, 3, or 4)")
            }
            NtpError::Encode(e) => write!(f, "failed to encode NTP request: {e}"),
            NtpError::Transport(e) => write!(f, "{e}"),
            NtpError::MalformedPacket(e) => write!(f, "{e}"),
            NtpError::ClockRanBackwards => write!(f, "client clock ticked backwards"),
            NtpError::Protocol(e) => write!(f, "NTP protocol error: {e}"),
            NtpError::Validation(e) => write!(f, "NTP response rejected: {e}"),
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::UnexpectedMode(mode) => {
                write!(f, "unexpected response mode {mode:?} (expected Server)")
            }
            ProtocolError::ZeroTransmitTimestamp => {
                write!(f, "server transmit timestamp is zero")
            }
            ProtocolError::OriginTimestampMismatch => {
                write!(
                    f,
                    "origin timestamp mismatch: response does not match our request"
                )
            }
            ProtocolError::ServerClockRanBackwards => {
                write!(f, "server clock ticked backwards")
            }
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Unsynchronized => write!(f, "server clock is not synchronized"),
            ValidationError::InvalidStratum {
                stratum,
                kiss_code: Some(code),
            } => write!(f, "invalid stratum {stratum}, kiss code {code:?}"),
            ValidationError::InvalidStratum {
                stratum,
                kiss_code: None,
            } => write!(f, "invalid stratum {stratum}"),
            ValidationError::ExcessiveRootDistance { root_distance, max } => {
                write!(
                    f,
                    "root distance {root_distance:.6}s exceeds maximum {max:.6}s"
                )
            }
        }
    }
}

// ── Error trait implementations ─────────────────────────────────────

impl std::error::Error for NtpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NtpError::Encode(e) | NtpError::Transport(e) => Some(e),
            NtpError::MalformedPacket(e) => Some(e),
            NtpError::Protocol(e) => Some(e),
            NtpError::Validation(e) => Some(e),
            NtpError::InvalidVersion(_) | NtpError::ClockRanBackwards => None,
        }
    }
}

impl std::error::Error for ProtocolError {}
impl std::error::Error for ValidationError {}

// ── From conversions ────────────────────────────────────────────────

impl From<NtpError> for io::Error {
    fn from(err: NtpError) -> io::Error {
        let kind = match &err {
            NtpError::InvalidVersion(_) => io::ErrorKind::InvalidInput,
            NtpError::Encode(e) | NtpError::Transport(e) => e.kind(),
            NtpError::MalformedPacket(_) => io::ErrorKind::InvalidData,
            NtpError::ClockRanBackwards => io::ErrorKind::Other,
            NtpError::Protocol(_) => io::ErrorKind::InvalidData,
            NtpError::Validation(_) => io::ErrorKind::InvalidData,
        };
        // Hand the transport's own error back untouched.
        if let NtpError::Transport(e) = err {
            return e;
        }
        io::Error::new(kind, err)
    }
}

impl From<io::Error> for NtpError {
    fn from(err: io::Error) -> NtpError {
        NtpError::Transport(err)
    }
}

impl From<ParseError> for NtpError {
    fn from(err: ParseError) -> NtpError {
        NtpError::MalformedPacket(err)
    }
}

impl From<ProtocolError> for NtpError {
    fn from(err: ProtocolError) -> NtpError {
        NtpError::Protocol(err)
    }
}

impl From<ValidationError> for NtpError {
    fn from(err: ValidationError) -> NtpError {
        NtpError::Validation(err)
    }
}

// ── Tests ───────────────────────────────────────────────────────────
