//! The result of a successful exchange.

use crate::error::ValidationError;
use crate::protocol::{
    LeapIndicator, MAXDISP, Packet, Reference, ReferenceIdentifier, Stratum, Version,
};
use std::time::{Duration, SystemTime};

/// A server reply together with the timing derived from it.
///
/// All durations that can be negative (offset, delay, root delay) are `f64` seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    /// The server's transmit time (T3).
    pub time: SystemTime,
    /// Estimated offset of the server clock from the local clock, in seconds.
    ///
    /// Positive when the local clock is behind the server.
    pub clock_offset: f64,
    /// Round-trip network delay, in seconds.
    pub round_trip_delay: f64,
    /// Local time the request was sent (T1).
    pub send_time: SystemTime,
    /// Local time the reply arrived (T4).
    pub receive_time: SystemTime,
    /// Stratum of the server.
    pub stratum: Stratum,
    /// Raw reference identifier.
    pub reference_id: ReferenceIdentifier,
    /// Reference identifier interpreted for the reply's stratum.
    pub reference: Reference,
    /// Time the server clock was last set or corrected.
    pub reference_time: SystemTime,
    /// Round-trip delay to the server's reference clock, in seconds.
    pub root_delay: f64,
    /// Dispersion to the server's reference clock, in seconds.
    pub root_dispersion: f64,
    /// `root_delay / 2 + root_dispersion`, in seconds.
    pub root_distance: f64,
    /// Precision of the server clock.
    pub precision: Duration,
    /// Poll interval advertised by the server.
    pub poll: Duration,
    /// Leap second warning.
    pub leap: LeapIndicator,
    /// Protocol version of the reply.
    pub version: Version,
}

/// Limits applied by [`Response::validate_with`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValidationLimits {
    /// Largest acceptable root distance, in seconds.
    pub max_root_distance: f64,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        ValidationLimits {
            max_root_distance: MAXDISP,
        }
    }
}

impl ValidationLimits {
    /// Set the largest acceptable root distance, in seconds.
    pub fn with_max_root_distance(mut self, seconds: f64) -> Self {
        self.max_root_distance = seconds;
        self
    }
}

/// `2^exponent` seconds, saturating at [`Duration::MAX`].
fn log2_interval(exponent: i8) -> Duration {
    Duration::try_from_secs_f64(2f64.powi(i32::from(exponent))).unwrap_or(Duration::MAX)
}

impl Response {
    pub(crate) fn from_reply(
        reply: &Packet,
        send_time: SystemTime,
        receive_time: SystemTime,
        clock_offset: f64,
        round_trip_delay: f64,
    ) -> Self {
        let root_delay = reply.root_delay.to_signed_seconds();
        let root_dispersion = reply.root_dispersion.to_seconds();
        Response {
            time: reply.transmit_timestamp.to_system_time(),
            clock_offset,
            round_trip_delay,
            send_time,
            receive_time,
            stratum: reply.stratum,
            reference_id: reply.reference_id,
            reference: reply.reference_id.decode(reply.stratum),
            reference_time: reply.reference_timestamp.to_system_time(),
            root_delay,
            root_dispersion,
            root_distance: root_delay / 2.0 + root_dispersion,
            precision: log2_interval(reply.precision),
            poll: log2_interval(reply.poll),
            leap: reply.leap_indicator,
            version: reply.version,
        }
    }

    /// Whether the server answered with a kiss-o'-death (stratum 0).
    pub fn is_kiss_of_death(&self) -> bool {
        self.stratum == Stratum::UNSPECIFIED
    }

    /// The ASCII kiss code, e.g. `"RATE"` or `"DENY"`, when the stratum is 0.
    pub fn kiss_code(&self) -> Option<String> {
        match &self.reference {
            Reference::KissCode(code) => Some(code.clone()),
            _ => None,
        }
    }

    /// Check that the server is a usable time source under the default limits.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_with(&ValidationLimits::default())
    }

    /// Check that the server is a usable time source.
    ///
    /// The stratum is checked first so a kiss-o'-death surfaces its code even when the server
    /// also reports an unsynchronized clock.
    pub fn validate_with(&self, limits: &ValidationLimits) -> Result<(), ValidationError> {
        if !self.stratum.is_serving() {
            return Err(ValidationError::InvalidStratum {
                stratum: self.stratum.0,
                kiss_code: self.kiss_code(),
            });
        }
        if self.leap == LeapIndicator::NotInSync {
            return Err(ValidationError::Unsynchronized);
        }
        if self.root_distance > limits.max_root_distance {
            return Err(ValidationError::ExcessiveRootDistance {
                root_distance: self.root_distance,
                max: limits.max_root_distance,
            });
        }
        Ok(())
    }

    /// `now` corrected by [`Response::clock_offset`].
    ///
    /// Returns `now` unchanged if the corrected time cannot be represented.
    pub fn corrected(&self, now: SystemTime) -> SystemTime {
        let Ok(magnitude) = Duration::try_from_secs_f64(self.clock_offset.abs()) else {
            return now;
        };
        let corrected = if self.clock_offset >= 0.0 {
            now.checked_add(magnitude)
        } else {
            now.checked_sub(magnitude)
        };
        corrected.unwrap_or(now)
    }
}
