// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! NTP wire format types and timestamp conversions.
//!
//! This crate provides the fixed 48-byte packet layout of the Network Time
//! Protocol (RFC 5905), the packed leap/version/mode header byte, and the
//! conversions between 64-bit NTP timestamps and [`std::time::SystemTime`].
//! It has no knowledge of sockets; see the `sntp_query-client` crate for the
//! request/response exchange built on top of it.

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Error types for NTP packet decoding.
pub mod error;

/// Conversions between NTP timestamps and calendar time.
pub mod ntp_time;

/// NTP protocol types and constants (RFC 5905).
pub mod protocol;
