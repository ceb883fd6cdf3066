//! TCP-over-WiFi Transport
//!
//! Nonblocking socket phase machine: the server role listens on the
//! configured port and accepts one peer at a time, the client role dials the
//! configured remote with a throttled retry. A disconnect returns to the
//! listening/dialing phase; the bridged stream resumes when a peer comes
//! back.

use bridge_config::{NetworkConfig, SocketRole};
use bridge_core::{Transport, TransportError};
use std::io::{ErrorKind, Read, Write};
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Minimum gap between client connect attempts.
const CONNECT_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Timeout for a single client connect attempt.
const CONNECT_TIMEOUT: Duration = Duration::from_millis(250);

/// Socket read chunk per poll pass.
const READ_CHUNK: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TcpPhase {
    /// Socket layer not up yet
    Idle,
    /// Server role: listening for a peer
    Listening,
    /// Client role: between dial attempts
    Dialing,
    /// Peer attached, stream established
    Connected,
}

pub struct TcpTransport {
    role: SocketRole,
    local: SocketAddr,
    remote: SocketAddr,
    phase: TcpPhase,
    listener: Option<TcpListener>,
    stream: Option<TcpStream>,
    last_dial: Option<Instant>,
}

impl TcpTransport {
    /// Build the transport from the persisted network configuration. The
    /// socket layer comes up lazily on the first `poll`.
    pub fn new(network: &NetworkConfig) -> Self {
        info!(
            role = ?network.role,
            port = network.port,
            remote = %network.remote_ip,
            "TCP transport configured"
        );
        Self {
            role: network.role,
            local: SocketAddr::from((Ipv4Addr::UNSPECIFIED, network.port)),
            remote: SocketAddr::from((network.remote_ip, network.port)),
            phase: TcpPhase::Idle,
            listener: None,
            stream: None,
            last_dial: None,
        }
    }

    fn attach(&mut self, stream: TcpStream, peer: SocketAddr) {
        if let Err(err) = stream.set_nonblocking(true) {
            warn!(%err, "failed to make peer stream nonblocking; dropping it");
            return;
        }
        let _ = stream.set_nodelay(true);
        info!(%peer, "TCP peer connected");
        self.stream = Some(stream);
        self.phase = TcpPhase::Connected;
    }

    fn disconnect(&mut self) {
        info!("TCP peer disconnected");
        self.stream = None;
        self.phase = match self.role {
            SocketRole::Server => TcpPhase::Listening,
            SocketRole::Client => TcpPhase::Dialing,
        };
    }

    fn poll_idle(&mut self) {
        match self.role {
            SocketRole::Server => match TcpListener::bind(self.local) {
                Ok(listener) => {
                    if let Err(err) = listener.set_nonblocking(true) {
                        warn!(%err, "listener nonblocking setup failed");
                        return;
                    }
                    info!(addr = %self.local, "TCP server listening");
                    self.listener = Some(listener);
                    self.phase = TcpPhase::Listening;
                }
                Err(err) => warn!(addr = %self.local, %err, "TCP bind failed; will retry"),
            },
            SocketRole::Client => {
                self.phase = TcpPhase::Dialing;
            }
        }
    }

    fn poll_listening(&mut self) {
        let accepted = match self.listener.as_ref() {
            Some(listener) => listener.accept(),
            None => {
                self.phase = TcpPhase::Idle;
                return;
            }
        };
        match accepted {
            Ok((stream, peer)) => self.attach(stream, peer),
            Err(err) if err.kind() == ErrorKind::WouldBlock => {}
            Err(err) => warn!(%err, "TCP accept failed"),
        }
    }

    fn poll_dialing(&mut self) {
        // Throttle dial attempts; each one blocks up to CONNECT_TIMEOUT.
        if let Some(last) = self.last_dial {
            if last.elapsed() < CONNECT_RETRY_INTERVAL {
                return;
            }
        }
        self.last_dial = Some(Instant::now());
        match TcpStream::connect_timeout(&self.remote, CONNECT_TIMEOUT) {
            Ok(stream) => self.attach(stream, self.remote),
            Err(err) => debug!(remote = %self.remote, %err, "TCP dial failed; will retry"),
        }
    }

    fn poll_connected(&mut self, rx: &mut Vec<u8>) {
        let mut drop_peer = true;
        if let Some(stream) = self.stream.as_mut() {
            drop_peer = false;
            let mut chunk = [0u8; READ_CHUNK];
            loop {
                match stream.read(&mut chunk) {
                    Ok(0) => {
                        // Orderly shutdown by the peer.
                        drop_peer = true;
                        break;
                    }
                    Ok(n) => rx.extend_from_slice(&chunk[..n]),
                    Err(err) if err.kind() == ErrorKind::WouldBlock => break,
                    Err(err) if err.kind() == ErrorKind::Interrupted => {}
                    Err(err) => {
                        warn!(%err, "TCP read failed");
                        drop_peer = true;
                        break;
                    }
                }
            }
        }
        if drop_peer {
            self.disconnect();
        }
    }
}

impl Transport for TcpTransport {
    fn is_connected(&self) -> bool {
        self.phase == TcpPhase::Connected
    }

    fn is_link_up(&self) -> bool {
        // The socket layer standing ready is the host analog of the WiFi
        // association being up.
        matches!(self.phase, TcpPhase::Listening | TcpPhase::Connected)
    }

    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(TransportError::NotConnected);
        };
        let mut written = 0;
        let result = loop {
            if written == data.len() {
                break Ok(());
            }
            match stream.write(&data[written..]) {
                Ok(0) => break Err(TransportError::SendFailed("peer closed the stream".into())),
                Ok(n) => written += n,
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    // Socket buffer full; give the kernel a moment. A peer
                    // that stops draining for good stalls this core and the
                    // watchdog takes over.
                    std::thread::sleep(Duration::from_millis(1));
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => break Err(TransportError::Io(err)),
            }
        };
        if result.is_err() {
            self.disconnect();
        }
        result
    }

    fn poll(&mut self, rx: &mut Vec<u8>) {
        match self.phase {
            TcpPhase::Idle => self.poll_idle(),
            TcpPhase::Listening => self.poll_listening(),
            TcpPhase::Dialing => self.poll_dialing(),
            TcpPhase::Connected => self.poll_connected(rx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_config::TransportKind;

    fn server_config(port: u16) -> NetworkConfig {
        NetworkConfig {
            transport: TransportKind::Wifi,
            role: SocketRole::Server,
            port,
            ..NetworkConfig::default()
        }
    }

    fn poll_until<F: Fn(&TcpTransport, &[u8]) -> bool>(
        transport: &mut TcpTransport,
        rx: &mut Vec<u8>,
        pred: F,
    ) {
        for _ in 0..500 {
            transport.poll(rx);
            if pred(transport, rx) {
                return;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        panic!("condition not reached");
    }

    #[test]
    fn test_server_accepts_reads_and_writes() {
        // Port 0 is not usable here (the peer needs the address), so bind a
        // throwaway listener to pick a free port first.
        let probe = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = probe.local_addr().unwrap().port();
        drop(probe);

        let mut transport = TcpTransport::new(&server_config(port));
        let mut rx = Vec::new();

        assert!(!transport.is_link_up());
        transport.poll(&mut rx);
        assert!(transport.is_link_up());
        assert!(!transport.is_connected());

        let mut peer = TcpStream::connect(("127.0.0.1", port)).unwrap();
        poll_until(&mut transport, &mut rx, |t, _| t.is_connected());

        peer.write_all(b"over the air").unwrap();
        poll_until(&mut transport, &mut rx, |_, rx| !rx.is_empty());
        assert_eq!(rx, b"over the air");

        transport.send(b"echo").unwrap();
        let mut got = [0u8; 4];
        peer.read_exact(&mut got).unwrap();
        assert_eq!(&got, b"echo");
    }

    #[test]
    fn test_server_returns_to_listening_on_peer_close() {
        let probe = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = probe.local_addr().unwrap().port();
        drop(probe);

        let mut transport = TcpTransport::new(&server_config(port));
        let mut rx = Vec::new();
        transport.poll(&mut rx);

        let peer = TcpStream::connect(("127.0.0.1", port)).unwrap();
        poll_until(&mut transport, &mut rx, |t, _| t.is_connected());

        drop(peer);
        poll_until(&mut transport, &mut rx, |t, _| !t.is_connected());
        // Link stays up; only the peer went away.
        assert!(transport.is_link_up());
    }

    #[test]
    fn test_send_without_peer_fails() {
        let mut transport = TcpTransport::new(&server_config(1));
        assert!(matches!(
            transport.send(b"nope"),
            Err(TransportError::NotConnected)
        ));
    }
}
