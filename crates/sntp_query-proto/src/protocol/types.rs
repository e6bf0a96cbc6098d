use std::fmt;
use std::net::Ipv4Addr;

use super::ConstPackedSizeBytes;

/// Number of fractional units in one second of a [`TimestampFormat`] (2^32).
pub const TIMESTAMP_FRACTION_SCALE: f64 = 4_294_967_296.0;

/// Number of fractional units in one second of a [`ShortFormat`] (2^16).
pub const SHORT_FRACTION_SCALE: f64 = 65_536.0;

/// **NTP Short Format** - Used in delay and dispersion header fields where the full resolution and
/// range of the other formats are not justified. It includes a 16-bit seconds field and a 16-bit
/// fraction field.
///
/// Root dispersion is unsigned. Root delay is carried in the same layout but is read as a
/// two's-complement value, see [`ShortFormat::to_signed_seconds`].
///
/// ### Layout
///
/// ```ignore
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |          Seconds              |           Fraction            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ShortFormat {
    /// Seconds component (16 bits).
    pub seconds: u16,
    /// Fractional seconds component (16 bits).
    pub fraction: u16,
}

/// **NTP Timestamp Format** - A 64-bit unsigned fixed-point number. The high 32 bits count
/// seconds since the prime epoch, 0 h 1 January 1900 UTC, spanning 136 years; the low 32 bits
/// are a fraction of a second resolving about 233 picoseconds.
///
/// Ordering compares seconds first and then fraction, which is the same as comparing the
/// 64-bit value.
///
/// ### Layout
///
/// ```ignore
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                            Seconds                            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                            Fraction                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TimestampFormat {
    /// Seconds since 1900-01-01 00:00:00 UTC.
    pub seconds: u32,
    /// Fractional seconds in units of 2^-32 s.
    pub fraction: u32,
}

/// A 2-bit integer warning of an impending leap second to be inserted or deleted in the last
/// minute of the current month.
///
/// Note that this field is packed in the actual header.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum LeapIndicator {
    /// No leap required.
    #[default]
    NoWarning = 0,
    /// Last minute of the day has 61 seconds.
    AddSecond = 1,
    /// Last minute of the day has 59 seconds.
    DelSecond = 2,
    /// Clock unsynchronized.
    NotInSync = 3,
}

/// A 3-bit integer representing the NTP version number.
///
/// Note that while this struct is 8-bits, this field is packed to 3 in the actual header, so a
/// decoded packet may carry any value in `0..=7`.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Version(pub u8);

/// A 3-bit integer representing the association mode.
///
/// Every 3-bit value has a variant, so decoding the mode never fails.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum Mode {
    /// Reserved mode (value 0).
    Reserved = 0,
    /// Symmetric active mode (value 1).
    SymmetricActive = 1,
    /// Symmetric passive mode (value 2).
    SymmetricPassive = 2,
    /// Client mode (value 3).
    #[default]
    Client = 3,
    /// Server mode (value 4).
    Server = 4,
    /// Broadcast mode (value 5).
    Broadcast = 5,
    /// NTP control message mode (value 6).
    Control = 6,
    /// Reserved for private use (value 7).
    Private = 7,
}

/// An 8-bit integer representing the stratum.
///
/// ```ignore
/// +--------+-----------------------------------------------------+
/// | Value  | Meaning                                             |
/// +--------+-----------------------------------------------------+
/// | 0      | unspecified or invalid                              |
/// | 1      | primary server (e.g., equipped with a GPS receiver) |
/// | 2-15   | secondary server (via NTP)                          |
/// | 16     | unsynchronized                                      |
/// | 17-255 | reserved                                            |
/// +--------+-----------------------------------------------------+
/// ```
#[derive(Copy, Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Stratum(pub u8);

/// A 32-bit code identifying the particular server or reference clock.
///
/// The interpretation depends on the value in the stratum field, see
/// [`ReferenceIdentifier::decode`]. The raw octets are kept as received.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct ReferenceIdentifier(pub [u8; 4]);

/// A [`ReferenceIdentifier`] interpreted in light of the packet stratum.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Reference {
    /// Stratum 0: a four-character ASCII "kiss code" such as `DENY` or `RATE`, used for status
    /// reporting and access control.
    KissCode(String),
    /// Stratum 1: a left-justified, zero-padded ASCII string naming the reference clock, such as
    /// `GPS` or `PPS`.
    Source(String),
    /// Stratum 2-15: the IPv4 address of the upstream server, or the first four octets of the MD5
    /// hash of its IPv6 address.
    Address(Ipv4Addr),
    /// Stratum 16 (unsynchronized) or 17-255 (reserved).
    Unknown([u8; 4]),
}

/// **Packet Header** - The NTP packet header consists of 12 words in network byte order. The
/// optional extension fields and message authentication code that may follow it on the wire are
/// neither produced nor consumed by this crate.
///
/// ```ignore
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |LI | VN  |Mode |    Stratum     |     Poll      |  Precision   |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         Root Delay                            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         Root Dispersion                       |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                          Reference ID                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// +                     Reference Timestamp (64)                  +
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// +                      Origin Timestamp (64)                    +
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// +                      Receive Timestamp (64)                   +
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// +                      Transmit Timestamp (64)                  +
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Packet {
    /// Leap indicator warning of impending leap second.
    pub leap_indicator: LeapIndicator,
    /// NTP protocol version number.
    pub version: Version,
    /// Association mode (client, server, broadcast, etc.).
    pub mode: Mode,
    /// Stratum level of the time source.
    pub stratum: Stratum,
    /// 8-bit signed integer representing the maximum interval between successive messages, in log2
    /// seconds.
    pub poll: i8,
    /// 8-bit signed integer representing the precision of the system clock, in log2 seconds. For
    /// instance, a value of -18 corresponds to a precision of about one microsecond.
    pub precision: i8,
    /// Total round-trip delay to the reference clock (signed 16.16).
    pub root_delay: ShortFormat,
    /// Total dispersion to the reference clock (unsigned 16.16).
    pub root_dispersion: ShortFormat,
    /// Reference identifier (clock source, kiss code, or server address).
    pub reference_id: ReferenceIdentifier,
    /// Time when the system clock was last set or corrected.
    pub reference_timestamp: TimestampFormat,
    /// Time at the client when the request departed for the server.
    pub origin_timestamp: TimestampFormat,
    /// Time at the server when the request arrived from the client.
    pub receive_timestamp: TimestampFormat,
    /// Time at the server when the response left for the client.
    pub transmit_timestamp: TimestampFormat,
}

// Inherent implementations.

impl ShortFormat {
    /// Build from the raw 32-bit wire value.
    pub fn from_bits(bits: u32) -> Self {
        ShortFormat {
            seconds: (bits >> 16) as u16,
            fraction: bits as u16,
        }
    }

    /// The raw 32-bit wire value.
    pub fn to_bits(self) -> u32 {
        ((self.seconds as u32) << 16) | self.fraction as u32
    }

    /// Interpret as an unsigned number of seconds.
    pub fn to_seconds(self) -> f64 {
        self.to_bits() as f64 / SHORT_FRACTION_SCALE
    }

    /// Interpret as a two's-complement number of seconds.
    pub fn to_signed_seconds(self) -> f64 {
        self.to_bits() as i32 as f64 / SHORT_FRACTION_SCALE
    }
}

impl TimestampFormat {
    /// The all-zero timestamp, which RFC 5905 reserves to mean "unknown" or "never set".
    pub const ZERO: Self = TimestampFormat {
        seconds: 0,
        fraction: 0,
    };

    /// Build from the raw 64-bit fixed-point value.
    pub fn from_bits(bits: u64) -> Self {
        TimestampFormat {
            seconds: (bits >> 32) as u32,
            fraction: bits as u32,
        }
    }

    /// The raw 64-bit fixed-point value.
    pub fn to_bits(self) -> u64 {
        ((self.seconds as u64) << 32) | self.fraction as u64
    }

    /// Whether both the seconds and fraction fields are zero.
    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }

    /// `self - earlier` in units of 2^-32 s.
    ///
    /// The subtraction wraps, so two timestamps less than half an era (68 years) apart yield the
    /// right signed difference even across the 2036 rollover.
    pub fn wrapping_diff(self, earlier: TimestampFormat) -> i64 {
        self.to_bits().wrapping_sub(earlier.to_bits()) as i64
    }

    /// `self - earlier` in seconds, see [`TimestampFormat::wrapping_diff`].
    pub fn seconds_since(self, earlier: TimestampFormat) -> f64 {
        self.wrapping_diff(earlier) as f64 / TIMESTAMP_FRACTION_SCALE
    }
}

impl LeapIndicator {
    /// Decode the low two bits of `bits`.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => LeapIndicator::NoWarning,
            1 => LeapIndicator::AddSecond,
            2 => LeapIndicator::DelSecond,
            _ => LeapIndicator::NotInSync,
        }
    }
}

impl Mode {
    /// Decode the low three bits of `bits`.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0 => Mode::Reserved,
            1 => Mode::SymmetricActive,
            2 => Mode::SymmetricPassive,
            3 => Mode::Client,
            4 => Mode::Server,
            5 => Mode::Broadcast,
            6 => Mode::Control,
            _ => Mode::Private,
        }
    }
}

impl Version {
    /// NTP version 2 (RFC 1119).
    pub const V2: Self = Version(2);
    /// NTP version 3 (RFC 1305).
    pub const V3: Self = Version(3);
    /// NTP version 4 (RFC 5905), the current standard.
    pub const V4: Self = Version(4);

    /// Returns the raw version number as a `u8`.
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Stratum {
    /// Unspecified or invalid; a packet with this stratum carries a kiss code.
    pub const UNSPECIFIED: Self = Stratum(0);
    /// The primary server (e.g. equipped with a GPS receiver).
    pub const PRIMARY: Self = Stratum(1);
    /// The minimum value specifying a secondary server (via NTP).
    pub const SECONDARY_MIN: Self = Stratum(2);
    /// The maximum value specifying a secondary server (via NTP).
    pub const SECONDARY_MAX: Self = Stratum(15);
    /// An unsynchronized stratum.
    pub const UNSYNCHRONIZED: Self = Stratum(16);
    /// The maximum valid stratum value.
    pub const MAX: Self = Stratum(super::MAXSTRAT);

    /// Whether or not the stratum represents a secondary server.
    pub fn is_secondary(&self) -> bool {
        Self::SECONDARY_MIN <= *self && *self <= Self::SECONDARY_MAX
    }

    /// Whether a server at this stratum may be used as a time source (1-15).
    pub fn is_serving(&self) -> bool {
        Self::PRIMARY <= *self && *self <= Self::SECONDARY_MAX
    }
}

impl ReferenceIdentifier {
    /// Returns the raw 4-byte representation of the reference identifier.
    pub fn as_bytes(&self) -> [u8; 4] {
        self.0
    }

    /// Render the identifier as left-justified ASCII.
    ///
    /// Trailing NUL padding is dropped and any byte that is not printable ASCII becomes `?`.
    pub fn to_ascii(&self) -> String {
        let len = self.0.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        self.0[..len]
            .iter()
            .map(|&b| {
                if b.is_ascii_graphic() || b == b' ' {
                    b as char
                } else {
                    '?'
                }
            })
            .collect()
    }

    /// Interpret the identifier according to the stratum of the packet that carried it.
    ///
    /// - Stratum 0: kiss code
    /// - Stratum 1: reference clock source
    /// - Stratum 2-15: upstream server address (or IPv6 hash)
    /// - Stratum 16+: unknown
    pub fn decode(&self, stratum: Stratum) -> Reference {
        if stratum == Stratum::UNSPECIFIED {
            Reference::KissCode(self.to_ascii())
        } else if stratum == Stratum::PRIMARY {
            Reference::Source(self.to_ascii())
        } else if stratum.is_secondary() {
            Reference::Address(Ipv4Addr::from(self.0))
        } else {
            Reference::Unknown(self.0)
        }
    }
}

// Size implementations.

impl ConstPackedSizeBytes for ShortFormat {
    const PACKED_SIZE_BYTES: usize = 4;
}

impl ConstPackedSizeBytes for TimestampFormat {
    const PACKED_SIZE_BYTES: usize = 8;
}

impl ConstPackedSizeBytes for Stratum {
    const PACKED_SIZE_BYTES: usize = 1;
}

impl ConstPackedSizeBytes for ReferenceIdentifier {
    const PACKED_SIZE_BYTES: usize = 4;
}

impl ConstPackedSizeBytes for super::HeaderByte {
    const PACKED_SIZE_BYTES: usize = 1;
}

impl ConstPackedSizeBytes for Packet {
    const PACKED_SIZE_BYTES: usize = super::HeaderByte::PACKED_SIZE_BYTES
        + Stratum::PACKED_SIZE_BYTES
        + 2
        + ShortFormat::PACKED_SIZE_BYTES * 2
        + ReferenceIdentifier::PACKED_SIZE_BYTES
        + TimestampFormat::PACKED_SIZE_BYTES * 4;
}

// Default implementations.

impl Default for Version {
    /// Defaults to NTPv4, the current standard (RFC 5905).
    fn default() -> Self {
        Version::V4
    }
}

impl Default for Packet {
    /// Defaults to an NTPv4 client request template.
    ///
    /// All timestamp and delay fields are zeroed. Set `transmit_timestamp`
    /// before sending.
    fn default() -> Self {
        Packet {
            leap_indicator: LeapIndicator::default(),
            version: Version::default(),
            mode: Mode::default(),
            stratum: Stratum::default(),
            poll: 0,
            precision: 0,
            root_delay: ShortFormat::default(),
            root_dispersion: ShortFormat::default(),
            reference_id: ReferenceIdentifier::default(),
            reference_timestamp: TimestampFormat::default(),
            origin_timestamp: TimestampFormat::default(),
            receive_timestamp: TimestampFormat::default(),
            transmit_timestamp: TimestampFormat::default(),
        }
    }
}

// Display implementations.

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::KissCode(code) => write!(f, "kiss code {code}"),
            Reference::Source(src) => write!(f, "{src}"),
            Reference::Address(addr) => write!(f, "{addr}"),
            Reference::Unknown(raw) => {
                write!(f, "{:02x}{:02x}{:02x}{:02x}", raw[0], raw[1], raw[2], raw[3])
            }
        }
    }
}
