// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Error types for NTP packet decoding.
//!
//! [`ParseError`] carries no heap data and converts into [`std::io::Error`] so it
//! can travel through `io::Result`-based call chains.

use std::fmt;

/// Errors that can occur while decoding an NTP packet.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// The input is not exactly the size of an NTP packet.
    LengthMismatch {
        /// Number of bytes a packet occupies.
        expected: usize,
        /// Number of bytes supplied.
        actual: usize,
    },
    /// The input ended before the named field could be read.
    Truncated {
        /// Name of the field being read.
        field: &'static str,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::LengthMismatch { expected, actual } => {
                write!(f, "malformed NTP packet: expected {expected} bytes, got {actual}")
            }
            ParseError::Truncated { field } => {
                write!(f, "malformed NTP packet: truncated while reading {field}")
            }
        }
    }
}

impl From<ParseError> for std::io::Error {
    fn from(err: ParseError) -> std::io::Error {
        let kind = match &err {
            ParseError::LengthMismatch { .. } => std::io::ErrorKind::InvalidData,
            ParseError::Truncated { .. } => std::io::ErrorKind::UnexpectedEof,
        };
        std::io::Error::new(kind, err)
    }
}

impl std::error::Error for ParseError {}
