// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Shared helpers for integration tests.

// Integration test helpers are `pub` so each `tests/*.rs` file can import them
// via `mod common`, but not every file uses every helper.
#![allow(dead_code, unreachable_pub)]

use std::io;
use std::time::{Duration, SystemTime};

use sntp_client::ntp_time::to_ntp_time;
use sntp_client::protocol::{
    LeapIndicator, Mode, Packet, ReferenceIdentifier, ShortFormat, Stratum,
};

/// Shift `now` by `offset` seconds in either direction.
pub fn shifted(now: SystemTime, offset: f64) -> SystemTime {
    let magnitude = Duration::from_secs_f64(offset.abs());
    if offset >= 0.0 {
        now + magnitude
    } else {
        now - magnitude
    }
}

/// A well-behaved stratum 1 reply to `request` from a server whose clock is `offset` seconds
/// ahead of ours.
pub fn server_reply(request: &[u8], offset: f64) -> Packet {
    let req = Packet::decode(request).expect("client sent a malformed request");
    let server_now = shifted(SystemTime::now(), offset);
    Packet {
        leap_indicator: LeapIndicator::NoWarning,
        version: req.version,
        mode: Mode::Server,
        stratum: Stratum::PRIMARY,
        poll: 6,
        precision: -23,
        root_delay: ShortFormat::from_bits(0),
        root_dispersion: ShortFormat::from_bits(0x0000_0010),
        reference_id: ReferenceIdentifier(*b"GPS\0"),
        reference_timestamp: to_ntp_time(server_now - Duration::from_secs(16)),
        origin_timestamp: req.transmit_timestamp,
        receive_timestamp: to_ntp_time(server_now),
        transmit_timestamp: to_ntp_time(server_now),
    }
}

/// A transport answering every request with `server_reply` after letting `edit` adjust it.
pub fn stub_server(
    offset: f64,
    mut edit: impl FnMut(&mut Packet),
) -> impl FnMut(&[u8]) -> io::Result<Vec<u8>> {
    move |request: &[u8]| {
        let mut reply = server_reply(request, offset);
        edit(&mut reply);
        Ok(reply.encode()?.to_vec())
    }
}
