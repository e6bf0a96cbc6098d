// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

/*!
Simple NTP (SNTP) query client.

A query sends one client-mode request through a [`Transport`], checks that
the reply answers it, and reports the server's time together with the clock
offset and round-trip delay. The transport is any
`FnMut(&[u8]) -> io::Result<Vec<u8>>`, so the network can be stubbed out
entirely; the `udp` feature (on by default) adds [`udp::UdpTransport`].

# Example
Shows how to fetch the current time according to the requested ntp server.

```rust,no_run
extern crate chrono;
extern crate sntp_client;

use chrono::{DateTime, Local};
use sntp_client::udp::UdpTransport;

fn main() {
    let mut transport = UdpTransport::new("time.nist.gov");
    let response = sntp_client::query(&mut transport).unwrap();
    response.validate().unwrap();
    let server_time: DateTime<Local> = response.time.into();
    println!("{}", server_time);
    println!("Offset: {:.6} seconds", response.clock_offset);
}
```

# Feature Flags

| Feature | Default | Description |
|---------|---------|-------------|
| `udp` | yes | Blocking UDP transport built on `std::net::UdpSocket`. |
*/

#![deny(unsafe_code)]
#![warn(missing_docs)]

// Re-export protocol types from sntp_proto for convenience.
pub use sntp_proto::{ntp_time, protocol};

/// Error types for queries, protocol checks, and validation.
pub mod error;

/// The request/reply exchange and the [`Transport`] seam.
pub mod query;

/// Query results and their validation.
pub mod response;

/// Best-effort corrected time in a single call.
pub mod sntp;

/// Blocking UDP transport.
#[cfg(feature = "udp")]
pub mod udp;

pub use error::{NtpError, ParseError, ProtocolError, ValidationError};
pub use query::{DEFAULT_VERSION, QueryOptions, Transport, query, query_with_options};
pub use response::{Response, ValidationLimits};
pub use sntp::{TimeReading, time, time_v};
