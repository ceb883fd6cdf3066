//! The Two Core Superloops
//!
//! Fixed hand-partitioned responsibilities, no shared scheduler: Core0 owns
//! the serial-facing path, Core1 owns the wireless-facing path, and each
//! loop iteration starts with its half of the cooperative watchdog clear.
//! Every step is a bounded poll; nothing in a loop waits on the other core.

use crate::frame::FramePipeline;
use crate::led::{LedControl, StatusLed};
use crate::uart::UartDriver;
use bridge_core::pump::{accept_received, pump_inbound, pump_outbound};
use bridge_core::{Bridge, Core, Transport};
use std::sync::Arc;
use std::time::Duration;

/// Pacing delay per loop iteration, so the tick producer always gets CPU
/// time on small hosts. On the board these loops spin freely.
const LOOP_PACE: Duration = Duration::from_micros(100);

/// Core0: watchdog turn → frame processing → inbound pump → UART transmit.
pub async fn core0_loop(bridge: Arc<Bridge>, mut uart: UartDriver, mut frame: FramePipeline) {
    loop {
        bridge.maybe_clear_watchdog(Core::Core0);
        frame.process(&bridge);
        pump_inbound(&bridge);
        uart.pump_tx(&bridge).await;
        tokio::time::sleep(LOOP_PACE).await;
    }
}

/// Core1: watchdog turn → LED → transport maintenance → outbound pump.
pub async fn core1_loop(
    bridge: Arc<Bridge>,
    mut transport: Box<dyn Transport>,
    mut led_control: LedControl,
    mut led: Box<dyn StatusLed>,
) {
    let mut rx = Vec::new();
    loop {
        bridge.maybe_clear_watchdog(Core::Core1);
        led_control.update(&bridge, transport.is_link_up(), led.as_mut());

        rx.clear();
        transport.poll(&mut rx);
        if !rx.is_empty() {
            accept_received(&bridge, &rx);
        }

        pump_outbound(&bridge, transport.as_mut());
        tokio::time::sleep(LOOP_PACE).await;
    }
}
