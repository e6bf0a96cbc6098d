// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! One-call "what time is it" helpers.
//!
//! [`time`] and [`time_v`] run a query, validate the reply, and return the
//! local clock corrected by the measured offset. They never fail outright:
//! when anything goes wrong the reading carries the uncorrected local time
//! alongside the error, so callers that only want a best-effort timestamp can
//! ignore the error and callers that care can inspect it.
//!
//! ```
//! use std::io;
//! use sntp_client::sntp;
//!
//! let mut unreachable = |_: &[u8]| -> io::Result<Vec<u8>> {
//!     Err(io::Error::new(io::ErrorKind::TimedOut, "no reply"))
//! };
//! let reading = sntp::time(&mut unreachable);
//! assert!(reading.error.is_some());
//! println!("best effort: {:?}", reading.time);
//! ```

use log::debug;

use crate::error::NtpError;
use crate::query::{
    DEFAULT_VERSION, LocalClock, QueryOptions, SystemClock, Transport, exchange, os_entropy,
};
use std::time::SystemTime;

/// A time reading and the reason it could not be corrected, if any.
#[derive(Debug)]
pub struct TimeReading {
    /// The corrected time, or the local clock when `error` is set.
    pub time: SystemTime,
    /// Why the local clock could not be corrected.
    pub error: Option<NtpError>,
}

impl TimeReading {
    /// Whether the reading was corrected by a validated server reply.
    pub fn is_synchronized(&self) -> bool {
        self.error.is_none()
    }

    /// Convert to a `Result`, discarding the fallback time on error.
    pub fn into_result(self) -> Result<SystemTime, NtpError> {
        match self.error {
            None => Ok(self.time),
            Some(e) => Err(e),
        }
    }
}

/// The current time according to the server behind `transport`, using protocol version 4.
pub fn time<T>(transport: &mut T) -> TimeReading
where
    T: Transport + ?Sized,
{
    time_v(transport, DEFAULT_VERSION)
}

/// The current time according to the server behind `transport`, using `version`.
pub fn time_v<T>(transport: &mut T, version: u8) -> TimeReading
where
    T: Transport + ?Sized,
{
    read_time(transport, version, &SystemClock, os_entropy)
}

fn read_time<T, C, E>(transport: &mut T, version: u8, clock: &C, entropy: E) -> TimeReading
where
    T: Transport + ?Sized,
    C: LocalClock + ?Sized,
    E: FnOnce() -> Option<u64>,
{
    let options = QueryOptions::new().with_version(version);
    let result = exchange(transport, options, clock, entropy).and_then(|response| {
        response.validate()?;
        Ok(response)
    });
    match result {
        Ok(response) => TimeReading {
            time: response.corrected(clock.now()),
            error: None,
        },
        Err(e) => {
            debug!("time query failed: {e}");
            TimeReading {
                time: clock.now(),
                error: Some(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ProtocolError, ValidationError};
    use crate::protocol::{Mode, Stratum};
    use crate::query::tests::{ScriptedClock, answering_server};
    use std::io;
    use std::time::{Duration, UNIX_EPOCH};

    fn clock() -> ScriptedClock {
        let base = UNIX_EPOCH + Duration::from_secs(1_700_000_100);
        // Wall readings: send, then the moment the offset is applied.
        ScriptedClock::with_elapsed(
            vec![base, base + Duration::from_millis(5)],
            vec![Duration::ZERO, Duration::from_millis(2)],
        )
    }

    #[test]
    fn corrected_time_on_success() {
        let mut server = answering_server(|_| {});
        let reading = read_time(&mut server, 4, &clock(), || Some(11));
        assert!(reading.is_synchronized());
        // Local 5 ms plus an offset of 19.5 ms.
        let expected =
            UNIX_EPOCH + Duration::from_secs(1_700_000_100) + Duration::from_micros(24_500);
        let diff = match reading.time.duration_since(expected) {
            Ok(d) => d,
            Err(e) => e.duration(),
        };
        assert!(diff < Duration::from_micros(1), "{diff:?}");
    }

    #[test]
    fn transport_failure_returns_local_time() {
        let mut transport = |_: &[u8]| -> io::Result<Vec<u8>> {
            Err(io::Error::new(io::ErrorKind::TimedOut, "i/o timeout"))
        };
        let clock = ScriptedClock::new(vec![UNIX_EPOCH + Duration::from_secs(42)]);
        let reading = read_time(&mut transport, 4, &clock, || Some(1));
        assert_eq!(reading.time, UNIX_EPOCH + Duration::from_secs(42));
        assert!(matches!(reading.error, Some(NtpError::Transport(_))));
    }

    #[test]
    fn invalid_version_returns_local_time() {
        let mut server = answering_server(|_| {});
        let reading = read_time(&mut server, 1, &clock(), || Some(1));
        assert!(matches!(reading.error, Some(NtpError::InvalidVersion(1))));
        assert!(reading.into_result().is_err());
    }

    #[test]
    fn protocol_error_is_reported() {
        let mut server = answering_server(|p| p.mode = Mode::SymmetricPassive);
        let reading = read_time(&mut server, 3, &clock(), || Some(1));
        assert!(matches!(
            reading.error,
            Some(NtpError::Protocol(ProtocolError::UnexpectedMode(Mode::SymmetricPassive)))
        ));
    }

    #[test]
    fn validation_failure_is_reported() {
        let mut server = answering_server(|p| p.stratum = Stratum(0));
        let reading = read_time(&mut server, 4, &clock(), || Some(1));
        assert!(matches!(
            reading.error,
            Some(NtpError::Validation(ValidationError::InvalidStratum { stratum: 0, .. }))
        ));
    }
}
