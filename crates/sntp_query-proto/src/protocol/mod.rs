//! Types and constants that precisely match RFC 5905.
//!
//! Provides `ReadBytes` and `WriteBytes` implementations which extend the byteorder crate
//! `WriteBytesExt` and `ReadBytesExt` traits with the ability to read and write types from the NTP
//! protocol respectively. [`Packet::encode`] and [`Packet::decode`] wrap them for the common case
//! of a single fixed-size buffer.
//!
//! Documentation is largely derived from IETF RFC 5905.

/// NTP port number.
pub const PORT: u16 = 123;

/// Maximum dispersion (16 s).
pub const MAXDISP: f64 = 16.0;

/// Maximum stratum number.
pub const MAXSTRAT: u8 = 16;

mod header;
mod io;
mod traits;
mod types;

pub use self::header::*;
pub use self::traits::*;
pub use self::types::*;
