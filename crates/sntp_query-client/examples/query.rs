// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Query an NTP server once and print what it says.
//!
//! ```text
//! cargo run -p sntp_query-client --example query -- time.cloudflare.com 3
//! ```
//!
//! Set `RUST_LOG=debug` to see the exchange.

use chrono::{DateTime, Local};
use sntp_client::udp::UdpTransport;
use sntp_client::{QueryOptions, sntp};
use std::error::Error;
use std::time::{Duration, SystemTime};

fn local_time(time: SystemTime) -> DateTime<Local> {
    time.into()
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "time.nist.gov".to_string());
    let version = match args.next() {
        Some(v) => v.parse()?,
        None => sntp_client::DEFAULT_VERSION,
    };

    let mut transport = UdpTransport::new(host.as_str()).timeout(Duration::from_secs(3));
    let response =
        sntp_client::query_with_options(&mut transport, QueryOptions::new().with_version(version))?;

    println!("Server {host} (NTPv{}):", response.version.value());
    println!("  stratum:    {}", response.stratum.0);
    println!("  reference:  {}", response.reference);
    println!("  leap:       {:?}", response.leap);
    println!("  poll:       {:?}", response.poll);
    println!("  precision:  {:?}", response.precision);
    println!("\nTimestamps in local time:");
    println!("  reference:  {}", local_time(response.reference_time));
    println!("  sent:       {}", local_time(response.send_time));
    println!("  server:     {}", local_time(response.time));
    println!("  received:   {}", local_time(response.receive_time));
    println!("\nTiming:");
    println!("  offset:         {:.6} seconds", response.clock_offset);
    println!("  delay:          {:.6} seconds", response.round_trip_delay);
    println!("  root distance:  {:.6} seconds", response.root_distance);

    match response.validate() {
        Ok(()) => println!("\nServer is a usable time source."),
        Err(e) => println!("\nServer rejected: {e}"),
    }

    let reading = sntp::time_v(&mut transport, version);
    match &reading.error {
        None => println!("Corrected time: {}", local_time(reading.time)),
        Some(e) => println!("Local time (uncorrected, {e}): {}", local_time(reading.time)),
    }
    Ok(())
}
