// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Conversions between [`TimestampFormat`] and [`SystemTime`].
//!
//! The seconds field is always read as an unsigned count from the prime epoch
//! (1900-01-01 00:00:00 UTC); no era pivot is applied, so timestamps after the
//! 2036 rollover map back into era 0.
//!
//! Encoding truncates toward the epoch and decoding rounds to the nearest
//! nanosecond. A [`SystemTime`] with nanosecond precision therefore survives a
//! round trip through [`TimestampFormat`] unchanged.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::protocol::TimestampFormat;

/// The number of seconds from 1st January 1900 UTC to the start of the Unix epoch.
pub const EPOCH_DELTA: u64 = 2_208_988_800;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// The prime epoch, 1900-01-01 00:00:00 UTC.
///
/// Returns `None` on platforms whose `SystemTime` cannot represent dates before 1970.
pub fn ntp_epoch() -> Option<SystemTime> {
    UNIX_EPOCH.checked_sub(Duration::from_secs(EPOCH_DELTA))
}

/// Convert a calendar time to an NTP timestamp.
///
/// The seconds field keeps the low 32 bits of the whole seconds since the prime epoch; the
/// fraction is the sub-second remainder scaled to 2^32 and truncated.
pub fn to_ntp_time(time: SystemTime) -> TimestampFormat {
    // Nanoseconds since the prime epoch, allowing for times before 1970.
    let nanos: i128 = match time.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_nanos() as i128,
        Err(before) => -(before.duration().as_nanos() as i128),
    } + (EPOCH_DELTA as i128) * (NANOS_PER_SEC as i128);

    let secs = nanos.div_euclid(NANOS_PER_SEC as i128);
    let subsec = nanos.rem_euclid(NANOS_PER_SEC as i128) as u64;
    TimestampFormat {
        seconds: secs as u32,
        fraction: ((subsec << 32) / NANOS_PER_SEC) as u32,
    }
}

impl TimestampFormat {
    /// The time elapsed since the prime epoch, with the fraction rounded to the nearest
    /// nanosecond.
    pub fn to_duration(self) -> Duration {
        let frac_nanos = self.fraction as u64 * NANOS_PER_SEC;
        let mut nanos = frac_nanos >> 32;
        if frac_nanos as u32 >= 0x8000_0000 {
            nanos += 1;
        }
        Duration::from_secs(self.seconds as u64) + Duration::from_nanos(nanos)
    }

    /// Convert to calendar time: the prime epoch plus [`TimestampFormat::to_duration`].
    ///
    /// Times before 1970 that the platform's `SystemTime` cannot represent saturate to
    /// [`UNIX_EPOCH`].
    pub fn to_system_time(self) -> SystemTime {
        let since_epoch = self.to_duration();
        let delta = Duration::from_secs(EPOCH_DELTA);
        if since_epoch >= delta {
            UNIX_EPOCH + (since_epoch - delta)
        } else {
            saturating_before_unix_epoch(delta - since_epoch)
        }
    }
}

/// `UNIX_EPOCH - before`, or [`UNIX_EPOCH`] when that is not representable.
fn saturating_before_unix_epoch(before: Duration) -> SystemTime {
    UNIX_EPOCH.checked_sub(before).unwrap_or(UNIX_EPOCH)
}

impl From<SystemTime> for TimestampFormat {
    fn from(time: SystemTime) -> Self {
        to_ntp_time(time)
    }
}

impl From<TimestampFormat> for SystemTime {
    fn from(ts: TimestampFormat) -> Self {
        ts.to_system_time()
    }
}
