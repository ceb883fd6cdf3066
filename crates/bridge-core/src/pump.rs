//! Wireless Bridge Pumps
//!
//! Bounded-iteration loops moving bytes between the queues and the active
//! transport, one byte per queue operation, stopping at the first failure
//! on either side. Remaining bytes simply wait for the next loop iteration.

use crate::error::{
    ERR_DROP_UART_SEND, ERR_DROP_WIRELESS_RECV, ERR_DROP_WIRELESS_SEND, ERR_WIRELESS_SEND_FAILED,
};
use crate::state::{Bridge, QueueKind, QUEUE_CAPACITY};
use crate::transport::Transport;
use tracing::{debug, warn};

/// Inbound pump: wireless receive queue → UART send queue.
///
/// Runs at most one UART-send-capacity's worth of iterations per call so a
/// single loop pass stays bounded. Stops early when the source runs empty or
/// the destination fills; a full destination drops the byte in hand and
/// raises the UART-send drop bit.
pub fn pump_inbound(bridge: &Bridge) {
    for _ in 0..QUEUE_CAPACITY {
        let Some(byte) = bridge.dequeue_byte(QueueKind::WirelessRecv) else {
            break;
        };
        if !bridge.enqueue(QueueKind::UartSend, &[byte]) {
            warn!("UART send queue full; dropping inbound byte");
            bridge.set_error_bits(ERR_DROP_UART_SEND);
            break;
        }
    }
}

/// Outbound pump: wireless send queue → transport.
///
/// Drains up to the queue's full capacity into a scratch buffer one byte at
/// a time, then submits everything drained as a single send — but only when
/// the transport reports itself connected. A failed send loses the batch
/// (at-most-once delivery) and sets the send-failure bit; the next pass
/// starts over with fresh data.
pub fn pump_outbound(bridge: &Bridge, transport: &mut dyn Transport) {
    let mut scratch = [0u8; QUEUE_CAPACITY];
    let mut drained = 0;
    while drained < QUEUE_CAPACITY {
        let Some(byte) = bridge.dequeue_byte(QueueKind::WirelessSend) else {
            break;
        };
        scratch[drained] = byte;
        drained += 1;
    }

    if drained == 0 {
        return;
    }

    if transport.is_connected() {
        match transport.send(&scratch[..drained]) {
            Ok(()) => debug!(bytes = drained, "outbound batch sent"),
            Err(err) => {
                warn!(bytes = drained, %err, "outbound send failed; batch dropped");
                bridge.set_error_bits(ERR_WIRELESS_SEND_FAILED);
            }
        }
    }
}

/// Ingress point for the frame/command layer: push application bytes toward
/// the wireless transport.
///
/// Enqueues one byte at a time and stops at the first full-queue failure,
/// silently truncating the request beyond the drop bit. Callers size their
/// requests to expected free capacity or accept the truncation.
pub fn request_send(bridge: &Bridge, data: &[u8]) {
    for &byte in data {
        if !bridge.enqueue(QueueKind::WirelessSend, &[byte]) {
            warn!("wireless send queue full; truncating send request");
            bridge.set_error_bits(ERR_DROP_WIRELESS_SEND);
            break;
        }
    }
}

/// Transport-side ingress: bytes received over the air enter the wireless
/// receive queue here, one byte at a time, dropping on overflow.
pub fn accept_received(bridge: &Bridge, data: &[u8]) {
    for &byte in data {
        if !bridge.enqueue(QueueKind::WirelessRecv, &[byte]) {
            warn!("wireless receive queue full; dropping received bytes");
            bridge.set_error_bits(ERR_DROP_WIRELESS_RECV);
            break;
        }
    }
}
