//! Sticky Error Bits and Transport Errors

use thiserror::Error;

/// The device reset because the watchdog guard expired.
pub const ERR_WDT_RESET: u32 = 1 << 0;
/// UART overrun reported by the serial driver.
pub const ERR_UART_OVERRUN: u32 = 1 << 1;
/// UART break condition reported by the serial driver.
pub const ERR_UART_BREAK: u32 = 1 << 2;
/// UART parity error reported by the serial driver.
pub const ERR_UART_PARITY: u32 = 1 << 3;
/// UART framing error reported by the serial driver.
pub const ERR_UART_FRAMING: u32 = 1 << 4;
/// Bytes dropped: wireless/USB send queue was full.
pub const ERR_DROP_WIRELESS_SEND: u32 = 1 << 7;
/// Bytes dropped: UART send queue was full.
pub const ERR_DROP_UART_SEND: u32 = 1 << 8;
/// Bytes dropped: UART receive queue was full.
pub const ERR_DROP_UART_RECV: u32 = 1 << 9;
/// Bytes dropped: wireless receive queue was full (reserved).
pub const ERR_DROP_WIRELESS_RECV: u32 = 1 << 11;
/// The active transport reported a send failure.
pub const ERR_WIRELESS_SEND_FAILED: u32 = 1 << 12;

/// Errors reported by a wireless transport.
///
/// The core never retries on these: already-dequeued bytes are lost and the
/// matching sticky bit records that it happened.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No peer on the other end of the transport
    #[error("transport is not connected")]
    NotConnected,

    /// The underlying socket or link rejected the write
    #[error("transport send failed: {0}")]
    SendFailed(String),

    /// I/O error from the platform socket layer
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}
