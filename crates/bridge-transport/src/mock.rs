//! Mock Transport
//!
//! Capture/inject transport used by unit and integration tests; no radio
//! and no sockets.

use bridge_core::{Transport, TransportError};

#[derive(Default)]
pub struct MockTransport {
    connected: bool,
    link_up: bool,
    fail_next_send: bool,
    pending_rx: Vec<u8>,
    sent: Vec<Vec<u8>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
        self.link_up = connected || self.link_up;
    }

    pub fn set_link_up(&mut self, link_up: bool) {
        self.link_up = link_up;
        if !link_up {
            self.connected = false;
        }
    }

    /// Make the next `send` call fail once.
    pub fn fail_next_send(&mut self) {
        self.fail_next_send = true;
    }

    /// Queue bytes to be handed out by the next `poll`.
    pub fn inject_received(&mut self, data: &[u8]) {
        self.pending_rx.extend_from_slice(data);
    }

    /// Batches captured from `send`, in call order.
    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }
}

impl Transport for MockTransport {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn is_link_up(&self) -> bool {
        self.link_up
    }

    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if self.fail_next_send {
            self.fail_next_send = false;
            return Err(TransportError::SendFailed("mock failure".into()));
        }
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        self.sent.push(data.to_vec());
        Ok(())
    }

    fn poll(&mut self, rx: &mut Vec<u8>) {
        rx.append(&mut self.pending_rx);
    }
}
