//! BLE Notification Transport
//!
//! Thin veneer over the vendor GATT stack, which lives behind a `BleLink`
//! handle: a connected flag plus two byte channels, one carrying outbound
//! notifications and one carrying peer writes. The vendor side (or a test)
//! holds the matching `BlePeer`. Outbound batches are chunked to the
//! notification payload limit.

use bridge_core::{Transport, TransportError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use tracing::{info, warn};

/// Largest payload carried by a single notification (ATT_MTU 247 minus the
/// 3-byte notification header).
pub const NOTIFY_PAYLOAD_MAX: usize = 244;

/// The core-side handle onto the vendor BLE stack.
pub struct BleLink {
    connected: Arc<AtomicBool>,
    notify_tx: Sender<Vec<u8>>,
    incoming_rx: Receiver<Vec<u8>>,
}

/// The vendor/peer-side handle; tests drive the link through this.
pub struct BlePeer {
    pub connected: Arc<AtomicBool>,
    pub notify_rx: Receiver<Vec<u8>>,
    pub incoming_tx: Sender<Vec<u8>>,
}

/// Create a linked `BleLink`/`BlePeer` pair. The link starts disconnected.
pub fn ble_link_pair() -> (BleLink, BlePeer) {
    let connected = Arc::new(AtomicBool::new(false));
    let (notify_tx, notify_rx) = channel();
    let (incoming_tx, incoming_rx) = channel();
    (
        BleLink {
            connected: Arc::clone(&connected),
            notify_tx,
            incoming_rx,
        },
        BlePeer {
            connected,
            notify_rx,
            incoming_tx,
        },
    )
}

pub struct BleTransport {
    link: BleLink,
}

impl BleTransport {
    pub fn new(link: BleLink) -> Self {
        info!("BLE transport configured");
        Self { link }
    }
}

impl Transport for BleTransport {
    fn is_connected(&self) -> bool {
        self.link.connected.load(Ordering::Acquire)
    }

    fn is_link_up(&self) -> bool {
        // BLE has no association phase separate from the connection itself.
        self.is_connected()
    }

    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        for chunk in data.chunks(NOTIFY_PAYLOAD_MAX) {
            self.link
                .notify_tx
                .send(chunk.to_vec())
                .map_err(|_| TransportError::SendFailed("BLE stack went away".into()))?;
        }
        Ok(())
    }

    fn poll(&mut self, rx: &mut Vec<u8>) {
        loop {
            match self.link.incoming_rx.try_recv() {
                Ok(bytes) => rx.extend_from_slice(&bytes),
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => {
                    if self.is_connected() {
                        warn!("BLE stack channel closed; marking link down");
                        self.link.connected.store(false, Ordering::Release);
                    }
                    return;
                }
            }
        }
    }
}
