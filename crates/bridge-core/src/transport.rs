//! Transport Contract
//!
//! The uniform surface the core consumes from whichever wireless transport
//! was selected at boot. The core calls all four operations from the
//! polling loops and branches only on connected / link-up / send-result;
//! everything else about the radio stack stays behind the implementation.

use crate::error::TransportError;

/// A wireless transport carrying the bridged byte stream.
pub trait Transport: Send {
    /// Whether a peer is attached and `send` can be attempted.
    fn is_connected(&self) -> bool;

    /// Whether the wireless association itself is up, independent of queue
    /// activity. Drives the solid-on LED state.
    fn is_link_up(&self) -> bool;

    /// Submit one batch of bytes. At-most-once: on failure the caller drops
    /// the batch and records the sticky error bit, it never retries.
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Periodic maintenance: advance connection phases and append any bytes
    /// received since the last call to `rx`.
    fn poll(&mut self, rx: &mut Vec<u8>);
}
