//! One request, one reply: the SNTP exchange.
//!
//! This module builds the client request, hands it to a [`Transport`], checks
//! that the reply really answers that request, and turns the four timestamps
//! into a clock offset and a round-trip delay. It never touches the network
//! itself; the `udp` module provides a socket-backed transport.

use log::{debug, trace, warn};
use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::error::{NtpError, ProtocolError};
use crate::ntp_time::to_ntp_time;
use crate::protocol::{
    LeapIndicator, Mode, Packet, TIMESTAMP_FRACTION_SCALE, TimestampFormat, Version,
};
use crate::response::Response;
use std::io;
use std::time::{Instant, SystemTime};

/// The protocol version used when none is requested.
pub const DEFAULT_VERSION: u8 = 4;

/// Moves one encoded request to a server and returns the raw reply.
///
/// Any closure of the form `FnMut(&[u8]) -> io::Result<Vec<u8>>` is a transport, which makes
/// it easy to stub the network in tests:
///
/// ```
/// use std::io;
/// use sntp_client::{NtpError, query};
///
/// let mut offline = |_request: &[u8]| -> io::Result<Vec<u8>> {
///     Err(io::Error::new(io::ErrorKind::NotConnected, "offline"))
/// };
/// assert!(matches!(query(&mut offline), Err(NtpError::Transport(_))));
/// ```
pub trait Transport {
    /// Send `request` and return the bytes of the reply.
    fn round_trip(&mut self, request: &[u8]) -> io::Result<Vec<u8>>;
}

impl<F> Transport for F
where
    F: FnMut(&[u8]) -> io::Result<Vec<u8>>,
{
    fn round_trip(&mut self, request: &[u8]) -> io::Result<Vec<u8>> {
        self(request)
    }
}

/// Per-query settings.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct QueryOptions {
    /// Protocol version to put in the request. Zero selects [`DEFAULT_VERSION`].
    pub version: u8,
}

impl QueryOptions {
    /// Options with every field at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a specific protocol version (2, 3, or 4).
    pub fn with_version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    /// The version that will actually be sent.
    ///
    /// Zero maps to [`DEFAULT_VERSION`]; anything else outside `2..=4` is rejected.
    pub fn effective_version(&self) -> Result<Version, NtpError> {
        match self.version {
            0 => Ok(Version(DEFAULT_VERSION)),
            v @ 2..=4 => Ok(Version(v)),
            v => Err(NtpError::InvalidVersion(v)),
        }
    }
}

/// Source of local clock readings.
///
/// `now` is the wall clock used for T1 and for correction. `instant` is a monotonic reading;
/// the time between send and receive is measured with it so a wall-clock step mid-exchange
/// cannot skew the delay.
pub(crate) trait LocalClock {
    fn now(&self) -> SystemTime;
    fn instant(&self) -> Instant;
}

/// The operating system clock.
pub(crate) struct SystemClock;

impl LocalClock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }
}

/// 64 bits from the operating system's secure random source, or `None` if it is unavailable.
pub(crate) fn os_entropy() -> Option<u64> {
    match OsRng.try_next_u64() {
        Ok(bits) => Some(bits),
        Err(e) => {
            warn!("secure random source unavailable, using local clock as transmit timestamp: {e}");
            None
        }
    }
}

/// Query a server with the default options.
///
/// The returned [`Response`] has passed the protocol checks but has not been validated as a
/// time source; call [`Response::validate`] before trusting it.
pub fn query<T>(transport: &mut T) -> Result<Response, NtpError>
where
    T: Transport + ?Sized,
{
    query_with_options(transport, QueryOptions::default())
}

/// Query a server with explicit options.
///
/// An invalid version fails with [`NtpError::InvalidVersion`] before the transport is called.
pub fn query_with_options<T>(
    transport: &mut T,
    options: QueryOptions,
) -> Result<Response, NtpError>
where
    T: Transport + ?Sized,
{
    exchange(transport, options, &SystemClock, os_entropy)
}

/// Build the request for `version`.
///
/// The transmit timestamp is random when entropy is available so that an off-path attacker
/// cannot predict it; otherwise it is the local clock reading. Returns the request, the
/// wall-clock time of sending, and a monotonic reading taken at the same moment.
fn build_request<C, E>(version: Version, clock: &C, entropy: E) -> (Packet, SystemTime, Instant)
where
    C: LocalClock + ?Sized,
    E: FnOnce() -> Option<u64>,
{
    let random = entropy();
    let send_time = clock.now();
    let send_instant = clock.instant();
    let transmit_timestamp = match random {
        Some(bits) => TimestampFormat::from_bits(bits),
        None => to_ntp_time(send_time),
    };
    let packet = Packet {
        leap_indicator: LeapIndicator::NotInSync,
        version,
        mode: Mode::Client,
        transmit_timestamp,
        ..Packet::default()
    };
    (packet, send_time, send_instant)
}

/// Reject replies that do not answer `request`.
fn check_reply(reply: &Packet, request: &Packet) -> Result<(), ProtocolError> {
    if reply.mode != Mode::Server {
        return Err(ProtocolError::UnexpectedMode(reply.mode));
    }
    if reply.transmit_timestamp.is_zero() {
        return Err(ProtocolError::ZeroTransmitTimestamp);
    }
    if reply.origin_timestamp != request.transmit_timestamp {
        return Err(ProtocolError::OriginTimestampMismatch);
    }
    if reply.receive_timestamp > reply.transmit_timestamp {
        return Err(ProtocolError::ServerClockRanBackwards);
    }
    Ok(())
}

/// Run one exchange over `transport`, reading time from `clock` and the transmit nonce from
/// `entropy`.
pub(crate) fn exchange<T, C, E>(
    transport: &mut T,
    options: QueryOptions,
    clock: &C,
    entropy: E,
) -> Result<Response, NtpError>
where
    T: Transport + ?Sized,
    C: LocalClock + ?Sized,
    E: FnOnce() -> Option<u64>,
{
    let version = options.effective_version()?;
    let (request, send_time, send_instant) = build_request(version, clock, entropy);
    let send_buf = request.encode().map_err(NtpError::Encode)?;

    let recv_buf = transport.round_trip(&send_buf)?;
    // Record T4 immediately.
    let recv_instant = clock.instant();
    debug!("sent: {} bytes, recv: {} bytes", send_buf.len(), recv_buf.len());

    let mut reply = Packet::decode(&recv_buf)?;
    // T4 is T1 plus monotonic elapsed time, never a second wall-clock reading.
    let recv_time = recv_instant
        .checked_duration_since(send_instant)
        .and_then(|elapsed| send_time.checked_add(elapsed))
        .ok_or(NtpError::ClockRanBackwards)?;

    check_reply(&reply, &request)?;

    // The server echoed our nonce; from here on T1 is the real send time.
    reply.origin_timestamp = to_ntp_time(send_time);
    let t4 = to_ntp_time(recv_time);
    let (offset, delay) = compute_offset_delay(
        reply.origin_timestamp,
        reply.receive_timestamp,
        reply.transmit_timestamp,
        t4,
    );
    trace!("offset: {offset:.9}s, delay: {delay:.9}s");

    Ok(Response::from_reply(&reply, send_time, recv_time, offset, delay))
}

/// Compute clock offset and round-trip delay, in seconds, from the four timestamps.
///
/// Differences are taken with wrapping 64-bit arithmetic so the result stays correct across an
/// era boundary as long as the true differences fit in about 68 years.
pub(crate) fn compute_offset_delay(
    t1: TimestampFormat,
    t2: TimestampFormat,
    t3: TimestampFormat,
    t4: TimestampFormat,
) -> (f64, f64) {
    let rec_org = i128::from(t2.wrapping_diff(t1));
    let xmt_dst = i128::from(t3.wrapping_diff(t4));
    let dst_org = i128::from(t4.wrapping_diff(t1));
    let xmt_rec = i128::from(t3.wrapping_diff(t2));
    let offset = (rec_org + xmt_dst) as f64 / 2.0 / TIMESTAMP_FRACTION_SCALE;
    let delay = (dst_org - xmt_rec) as f64 / TIMESTAMP_FRACTION_SCALE;
    (offset, delay)
}
