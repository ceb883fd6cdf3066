//! UART Driver
//!
//! Serial side of the bridge. The read half runs as its own task — the host
//! analog of the UART receive interrupt — feeding the UART receive queue
//! and raising the drop bit on overflow. The transmit pump is called from
//! Core0's loop and drains the UART send queue to the wire.

use anyhow::Context;
use bridge_config::{DataBits, Parity, StopBits, UartConfig};
use bridge_core::error::ERR_DROP_UART_RECV;
use bridge_core::{Bridge, QueueKind};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::{info, warn};

/// Largest block moved to the wire per transmit pump call.
const TX_CHUNK: usize = 256;

fn map_data_bits(bits: DataBits) -> tokio_serial::DataBits {
    match bits {
        DataBits::Five => tokio_serial::DataBits::Five,
        DataBits::Six => tokio_serial::DataBits::Six,
        DataBits::Seven => tokio_serial::DataBits::Seven,
        DataBits::Eight => tokio_serial::DataBits::Eight,
    }
}

fn map_stop_bits(bits: StopBits) -> tokio_serial::StopBits {
    match bits {
        StopBits::One => tokio_serial::StopBits::One,
        StopBits::Two => tokio_serial::StopBits::Two,
    }
}

fn map_parity(parity: Parity) -> tokio_serial::Parity {
    match parity {
        Parity::None => tokio_serial::Parity::None,
        Parity::Even => tokio_serial::Parity::Even,
        Parity::Odd => tokio_serial::Parity::Odd,
    }
}

pub struct UartDriver {
    writer: WriteHalf<SerialStream>,
}

impl UartDriver {
    /// Open the serial device with the persisted line parameters and spawn
    /// the receive task.
    pub fn open(config: &UartConfig, bridge: Arc<Bridge>) -> anyhow::Result<Self> {
        let stream = tokio_serial::new(&config.device, config.baud_rate)
            .data_bits(map_data_bits(config.data_bits))
            .stop_bits(map_stop_bits(config.stop_bits))
            .parity(map_parity(config.parity))
            .open_native_async()
            .with_context(|| format!("opening serial device {}", config.device))?;

        info!(
            device = %config.device,
            baud = config.baud_rate,
            "UART opened"
        );

        let (reader, writer) = tokio::io::split(stream);
        tokio::spawn(rx_task(reader, bridge));

        Ok(Self { writer })
    }

    /// Transmit pump: move one bounded block from the UART send queue to the
    /// wire. Called once per Core0 loop iteration.
    pub async fn pump_tx(&mut self, bridge: &Bridge) {
        let Some(block) = drain_uart_send(bridge, TX_CHUNK) else {
            return;
        };
        if let Err(err) = self.writer.write_all(&block).await {
            // The bytes are gone either way; the serial contract has no
            // retry, same as the wireless side.
            warn!(%err, "UART write failed; block dropped");
        }
    }
}

/// Take up to `max` bytes from the UART send queue as one block.
fn drain_uart_send(bridge: &Bridge, max: usize) -> Option<Vec<u8>> {
    let len = bridge.queue_len(QueueKind::UartSend).min(max);
    if len == 0 {
        return None;
    }
    let mut block = vec![0u8; len];
    // This is the queue's only consumer, so the occupied count cannot have
    // shrunk between the length read and the dequeue.
    if bridge.dequeue(QueueKind::UartSend, &mut block) {
        Some(block)
    } else {
        None
    }
}

/// Receive task: bytes off the wire into the UART receive queue.
async fn rx_task(mut reader: ReadHalf<SerialStream>, bridge: Arc<Bridge>) {
    let mut chunk = [0u8; 256];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => {
                // Some platforms report a transient zero-length read.
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
            Ok(n) => {
                for &byte in &chunk[..n] {
                    if !bridge.enqueue(QueueKind::UartRecv, &[byte]) {
                        warn!("UART receive queue full; dropping bytes");
                        bridge.set_error_bits(ERR_DROP_UART_RECV);
                        break;
                    }
                }
            }
            Err(err) => {
                warn!(%err, "UART read failed");
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_core::ResetHook;

    struct NoReset;

    impl ResetHook for NoReset {
        fn force_reset(&self) {}
    }

    #[test]
    fn test_drain_uart_send_bounded_block() {
        let bridge = Bridge::new(Arc::new(NoReset));
        assert!(drain_uart_send(&bridge, TX_CHUNK).is_none());

        let data: Vec<u8> = (0..400).map(|i| (i % 256) as u8).collect();
        assert!(bridge.enqueue(QueueKind::UartSend, &data));

        let first = drain_uart_send(&bridge, TX_CHUNK).unwrap();
        assert_eq!(first, data[..TX_CHUNK]);
        let second = drain_uart_send(&bridge, TX_CHUNK).unwrap();
        assert_eq!(second, data[TX_CHUNK..]);
        assert!(drain_uart_send(&bridge, TX_CHUNK).is_none());
    }
}
