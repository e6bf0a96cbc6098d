mod common;

use common::stub_server;
use proptest::prelude::*;
use sntp_client::protocol::{Mode, Packet, TimestampFormat};
use sntp_client::{NtpError, ProtocolError, QueryOptions, query, query_with_options};
use std::io;

proptest! {
    /// The measured offset tracks the server's true offset.
    #[test]
    fn offset_tracks_server_clock(offset in -1.0e6f64..1.0e6) {
        let mut server = stub_server(offset, |_| {});
        let response = query(&mut server).unwrap();
        prop_assert!(
            (response.clock_offset - offset).abs() < 0.05,
            "measured {} for true offset {}",
            response.clock_offset,
            offset,
        );
    }

    /// Only versions 2 through 4 (or the zero default) are ever sent.
    #[test]
    fn version_gate(version in any::<u8>()) {
        let mut sent = None;
        let mut inner = stub_server(0.0, |_| {});
        let mut transport = |req: &[u8]| {
            sent = Some((req[0] >> 3) & 0x07);
            inner(req)
        };
        let result = query_with_options(&mut transport, QueryOptions::new().with_version(version));
        match version {
            0 => {
                prop_assert_eq!(sent, Some(4));
            }
            2..=4 => {
                prop_assert_eq!(sent, Some(version));
            }
            _ => {
                prop_assert!(matches!(result, Err(NtpError::InvalidVersion(v)) if v == version));
                prop_assert_eq!(sent, None);
            }
        }
    }

    /// Every mode other than Server is refused.
    #[test]
    fn non_server_modes_rejected(bits in 0u8..8) {
        let mode = Mode::from_bits(bits);
        let mut server = stub_server(0.0, move |p| p.mode = mode);
        let result = query(&mut server);
        if mode == Mode::Server {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(matches!(
                result,
                Err(NtpError::Protocol(ProtocolError::UnexpectedMode(m))) if m == mode
            ));
        }
    }

    /// A reply whose origin differs from our nonce in any bit is refused.
    #[test]
    fn origin_must_match_exactly(flip in 0u32..64) {
        let mut server = stub_server(0.0, move |p: &mut Packet| {
            p.origin_timestamp =
                TimestampFormat::from_bits(p.origin_timestamp.to_bits() ^ (1u64 << flip));
        });
        prop_assert!(matches!(
            query(&mut server),
            Err(NtpError::Protocol(ProtocolError::OriginTimestampMismatch))
        ));
    }

    /// Replies of any length other than 48 bytes are malformed.
    #[test]
    fn wrong_length_replies_rejected(reply in prop::collection::vec(any::<u8>(), 0..128)) {
        prop_assume!(reply.len() != 48);
        let mut transport = move |_: &[u8]| -> io::Result<Vec<u8>> { Ok(reply.clone()) };
        prop_assert!(matches!(query(&mut transport), Err(NtpError::MalformedPacket(_))));
    }
}
