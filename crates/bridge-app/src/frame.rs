//! Frame Pipeline
//!
//! The veneer standing where the full command/frame protocol would sit: a
//! transparent bridge from the UART receive queue to the wireless send
//! queue. Bytes accumulate until either the batch threshold is reached or
//! the receive-timeout window closes behind the last byte, then go out
//! through `request_send` as one batch.

use bridge_core::pump::request_send;
use bridge_core::{Bridge, QueueKind, SoftwareTimer, QUEUE_CAPACITY};
use tracing::trace;

/// Flush as soon as this many bytes are pending.
const FLUSH_THRESHOLD: usize = 512;

pub struct FramePipeline {
    pending: Vec<u8>,
}

impl FramePipeline {
    pub fn new() -> Self {
        Self {
            pending: Vec::with_capacity(FLUSH_THRESHOLD),
        }
    }

    /// One Core0 loop iteration's worth of frame processing.
    pub fn process(&mut self, bridge: &Bridge) {
        for _ in 0..QUEUE_CAPACITY {
            let Some(byte) = bridge.dequeue_byte(QueueKind::UartRecv) else {
                break;
            };
            // Every received byte reopens the receive window.
            bridge.clear_timer(SoftwareTimer::ReceiveTimeout);
            self.pending.push(byte);
            if self.pending.len() >= FLUSH_THRESHOLD {
                self.flush(bridge);
            }
        }

        // Quiet line for a full receive-timeout period: ship the partial
        // batch instead of holding it forever.
        if !self.pending.is_empty() && bridge.is_elapsed(SoftwareTimer::ReceiveTimeout) {
            self.flush(bridge);
        }
    }

    fn flush(&mut self, bridge: &Bridge) {
        trace!(bytes = self.pending.len(), "forwarding batch to wireless send");
        request_send(bridge, &self.pending);
        self.pending.clear();
    }
}

impl Default for FramePipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_core::ResetHook;
    use std::sync::Arc;

    struct NoReset;

    impl ResetHook for NoReset {
        fn force_reset(&self) {}
    }

    fn test_bridge() -> Bridge {
        Bridge::new(Arc::new(NoReset))
    }

    #[test]
    fn test_small_batch_waits_for_receive_window() {
        let bridge = test_bridge();
        let mut pipeline = FramePipeline::new();

        assert!(bridge.enqueue(QueueKind::UartRecv, b"abc"));
        pipeline.process(&bridge);
        // Window still open; nothing forwarded yet.
        assert_eq!(bridge.queue_len(QueueKind::WirelessSend), 0);

        for _ in 0..500 {
            bridge.tick();
        }
        pipeline.process(&bridge);
        assert_eq!(bridge.queue_len(QueueKind::WirelessSend), 3);

        let mut out = [0u8; 3];
        assert!(bridge.dequeue(QueueKind::WirelessSend, &mut out));
        assert_eq!(&out, b"abc");
    }

    #[test]
    fn test_threshold_flushes_immediately() {
        let bridge = test_bridge();
        let mut pipeline = FramePipeline::new();

        let burst = vec![0x42u8; FLUSH_THRESHOLD];
        assert!(bridge.enqueue(QueueKind::UartRecv, &burst));
        pipeline.process(&bridge);
        assert_eq!(bridge.queue_len(QueueKind::WirelessSend), FLUSH_THRESHOLD);
    }

    #[test]
    fn test_new_bytes_reopen_window() {
        let bridge = test_bridge();
        let mut pipeline = FramePipeline::new();

        assert!(bridge.enqueue(QueueKind::UartRecv, b"a"));
        pipeline.process(&bridge);
        for _ in 0..499 {
            bridge.tick();
        }

        // A fresh byte just before expiry restarts the window.
        assert!(bridge.enqueue(QueueKind::UartRecv, b"b"));
        pipeline.process(&bridge);
        bridge.tick();
        pipeline.process(&bridge);
        assert_eq!(bridge.queue_len(QueueKind::WirelessSend), 0);

        for _ in 0..500 {
            bridge.tick();
        }
        pipeline.process(&bridge);
        assert_eq!(bridge.queue_len(QueueKind::WirelessSend), 2);
    }
}
