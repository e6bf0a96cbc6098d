//! Blocking UDP transport.

use log::debug;

use crate::protocol::PORT;
use crate::query::Transport;
use std::io;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

/// How long to wait for a reply when no timeout is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Which address families a [`UdpTransport`] may use.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum IpFamily {
    /// The first resolved address of either family.
    #[default]
    Any,
    /// IPv4 only.
    V4,
    /// IPv6 only.
    V6,
}

impl IpFamily {
    fn admits(self, addr: &SocketAddr) -> bool {
        match self {
            IpFamily::Any => true,
            IpFamily::V4 => addr.is_ipv4(),
            IpFamily::V6 => addr.is_ipv6(),
        }
    }
}

/// Select the wildcard bind address matching the target address family.
fn bind_addr_for(target: &SocketAddr) -> SocketAddr {
    match target {
        SocketAddr::V4(_) => SocketAddr::from(([0, 0, 0, 0], 0)),
        SocketAddr::V6(_) => SocketAddr::from(([0u16; 8], 0)),
    }
}

/// Sends each request as one datagram over a fresh socket and waits for one datagram back.
///
/// ```no_run
/// use std::time::Duration;
/// use sntp_client::udp::UdpTransport;
///
/// let mut transport = UdpTransport::new("time.nist.gov").timeout(Duration::from_secs(2));
/// let response = sntp_client::query(&mut transport)?;
/// response.validate()?;
/// println!("offset: {:.6}s", response.clock_offset);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UdpTransport {
    host: String,
    port: u16,
    family: IpFamily,
    local_address: Option<IpAddr>,
    ttl: Option<u32>,
    timeout: Duration,
}

impl UdpTransport {
    /// A transport for `host` (a name or an IP literal) on the standard NTP port.
    pub fn new(host: impl Into<String>) -> Self {
        UdpTransport {
            host: host.into(),
            port: PORT,
            family: IpFamily::Any,
            local_address: None,
            ttl: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Use a non-standard server port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Only use server addresses of this family.
    pub fn family(mut self, family: IpFamily) -> Self {
        self.family = family;
        self
    }

    /// Send from this local address instead of the wildcard address.
    ///
    /// Only server addresses of the same family are used.
    pub fn local_address(mut self, addr: IpAddr) -> Self {
        self.local_address = Some(addr);
        self
    }

    /// Set the IP time-to-live of outgoing packets.
    pub fn ttl(mut self, ttl: u32) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// How long to wait for the reply. A zero duration selects [`DEFAULT_TIMEOUT`].
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn effective_timeout(&self) -> Duration {
        if self.timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            self.timeout
        }
    }

    fn resolve(&self) -> io::Result<SocketAddr> {
        let family_matches = |addr: &SocketAddr| {
            self.family.admits(addr)
                && self
                    .local_address
                    .is_none_or(|local| local.is_ipv4() == addr.is_ipv4())
        };
        (self.host.as_str(), self.port)
            .to_socket_addrs()?
            .find(family_matches)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "address resolved to no socket addresses",
                )
            })
    }
}

impl Transport for UdpTransport {
    fn round_trip(&mut self, request: &[u8]) -> io::Result<Vec<u8>> {
        let target = self.resolve()?;
        let bind = match self.local_address {
            Some(ip) => SocketAddr::new(ip, 0),
            None => bind_addr_for(&target),
        };

        let sock = UdpSocket::bind(bind)?;
        sock.connect(target)?;
        if let Some(ttl) = self.ttl {
            sock.set_ttl(ttl)?;
        }
        let timeout = self.effective_timeout();
        sock.set_read_timeout(Some(timeout))?;
        sock.set_write_timeout(Some(timeout))?;

        let sz = sock.send(request)?;
        debug!("{:?}", sock.local_addr());
        debug!("sent: {} bytes to {}", sz, target);

        // A datagram longer than the request is truncated to its length.
        let mut recv_buf = vec![0u8; request.len()];
        let recv_len = sock.recv(&mut recv_buf)?;
        debug!("recv: {} bytes", recv_len);
        recv_buf.truncate(recv_len);
        Ok(recv_buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::thread;

    /// Bind a loopback socket that answers one datagram with `reply(request)`.
    fn one_shot_server(reply: fn(&[u8]) -> Vec<u8>) -> (u16, thread::JoinHandle<()>) {
        let sock = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        sock.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        let port = sock.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            let mut buf = [0u8; 512];
            let (n, peer) = sock.recv_from(&mut buf).unwrap();
            sock.send_to(&reply(&buf[..n]), peer).unwrap();
        });
        (port, handle)
    }

    #[test]
    fn builder_defaults() {
        let t = UdpTransport::new("pool.ntp.org");
        assert_eq!(t.port, 123);
        assert_eq!(t.timeout, Duration::from_secs(5));
        assert_eq!(t.family, IpFamily::Any);
        assert_eq!(t.local_address, None);
        assert_eq!(t.ttl, None);
        assert_eq!(t.clone().timeout(Duration::ZERO).effective_timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn bind_addr_matches_family() {
        let v4: SocketAddr = "192.0.2.1:123".parse().unwrap();
        let v6: SocketAddr = "[2001:db8::1]:123".parse().unwrap();
        assert!(bind_addr_for(&v4).is_ipv4());
        assert!(bind_addr_for(&v6).is_ipv6());
    }

    #[test]
    fn resolve_honors_local_address_family() {
        let t = UdpTransport::new("::1").local_address(Ipv4Addr::LOCALHOST.into());
        assert_eq!(t.resolve().unwrap_err().kind(), io::ErrorKind::InvalidInput);
        let t = UdpTransport::new("127.0.0.1").port(1123);
        assert_eq!(t.resolve().unwrap(), "127.0.0.1:1123".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn resolve_honors_family() {
        let t = UdpTransport::new("127.0.0.1").family(IpFamily::V6);
        assert_eq!(t.resolve().unwrap_err().kind(), io::ErrorKind::InvalidInput);
        let t = UdpTransport::new("::1").family(IpFamily::V4);
        assert_eq!(t.resolve().unwrap_err().kind(), io::ErrorKind::InvalidInput);
        let t = UdpTransport::new("::1").port(1123).family(IpFamily::V6);
        assert_eq!(t.resolve().unwrap(), "[::1]:1123".parse::<SocketAddr>().unwrap());
        let t = UdpTransport::new("127.0.0.1").family(IpFamily::V4);
        assert!(t.resolve().unwrap().is_ipv4());
    }

    #[test]
    fn family_combines_with_local_address() {
        let t = UdpTransport::new("127.0.0.1")
            .family(IpFamily::V4)
            .local_address("::1".parse::<IpAddr>().unwrap());
        assert_eq!(t.resolve().unwrap_err().kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn round_trip_over_loopback() {
        let (port, handle) = one_shot_server(|req| req.iter().rev().copied().collect());
        let mut t = UdpTransport::new("127.0.0.1")
            .port(port)
            .local_address(Ipv4Addr::LOCALHOST.into())
            .ttl(8);
        let reply = t.round_trip(&[1, 2, 3, 4]).unwrap();
        assert_eq!(reply, vec![4, 3, 2, 1]);
        handle.join().unwrap();
    }

    #[test]
    fn oversized_reply_is_truncated_to_request_length() {
        let (port, handle) = one_shot_server(|_| vec![7u8; 100]);
        let mut t = UdpTransport::new("127.0.0.1").port(port);
        let reply = t.round_trip(&[0u8; 48]).unwrap();
        assert_eq!(reply.len(), 48);
        handle.join().unwrap();
    }

    #[test]
    fn silent_server_times_out() {
        let sock = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let port = sock.local_addr().unwrap().port();
        let mut t = UdpTransport::new("127.0.0.1")
            .port(port)
            .timeout(Duration::from_millis(50));
        let err = t.round_trip(&[0u8; 48]).unwrap_err();
        assert!(
            matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut),
            "{err:?}"
        );
        drop(sock);
    }
}
