//! Serial↔Wireless Bridge Application
//!
//! Wires the shared bridge state, the selected wireless transport, the UART
//! driver, and the 1 ms tick producer into the two core superloops. The
//! startup sequence mirrors a power-on boot: fault trap first, then
//! configuration, then peripherals, then the stabilization wait, and only
//! then the loops.

use anyhow::Context;
use bridge_config::{BridgeSettings, TransportKind};
use bridge_core::{Bridge, SoftwareTimer, Transport};
use bridge_transport::{ble_link_pair, BlePeer, BleTransport, TcpTransport};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

pub mod cores;
pub mod frame;
pub mod led;
pub mod reset;
pub mod uart;

use led::{LedControl, LogLed};
use reset::{AbortReset, ResetCause};

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Build the transport named by the persisted configuration.
///
/// The BLE variant hands back the vendor-side peer handle; the caller keeps
/// it alive for the life of the process (on a plain host there is no vendor
/// stack behind it, so the BLE link simply stays down).
fn select_transport(settings: &BridgeSettings) -> (Box<dyn Transport>, Option<BlePeer>) {
    match settings.network.transport {
        TransportKind::Wifi => (Box::new(TcpTransport::new(&settings.network)), None),
        TransportKind::Ble => {
            let (link, peer) = ble_link_pair();
            (Box::new(BleTransport::new(link)), Some(peer))
        }
    }
}

/// Power-on sequence followed by the two core loops. Never returns in
/// normal operation.
pub async fn run(settings: BridgeSettings) -> anyhow::Result<()> {
    info!("=== serial-wireless-bridge v{} ===", env!("CARGO_PKG_VERSION"));

    // Fault trap before anything else: a panic anywhere is a fatal fault
    // and forces a reset, never an unwind-and-continue.
    let reset_hook = Arc::new(AbortReset::new(reset::default_sentinel()));
    reset::install_fault_trap(reset_hook.clone());
    let reset_cause = reset::take_reset_cause(reset_hook.sentinel());

    let bridge = Arc::new(Bridge::new(reset_hook));

    let (transport, _ble_peer) = select_transport(&settings);

    let uart = uart::UartDriver::open(&settings.uart, Arc::clone(&bridge))
        .context("opening UART")?;

    // Start the 1 ms tick producer. From here on the watchdog guard is
    // running and the loops must keep clearing it.
    tokio::spawn(tick_task(Arc::clone(&bridge)));

    // Stabilization wait before entering the loops.
    while !bridge.is_elapsed(SoftwareTimer::BootStabilization) {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    if reset_cause == ResetCause::Watchdog {
        info!("previous reset was watchdog-forced");
        bridge.set_error_bits(bridge_core::error::ERR_WDT_RESET);
    }

    info!("entering core loops");
    tokio::spawn(cores::core1_loop(
        Arc::clone(&bridge),
        transport,
        LedControl::new(),
        Box::new(LogLed::new()),
    ));
    cores::core0_loop(bridge, uart, frame::FramePipeline::new()).await;

    unreachable!("core0 loop never returns");
}

/// The periodic tick producer: the single source advancing every software
/// timer, 1 ms period.
async fn tick_task(bridge: Arc<Bridge>) {
    let mut interval = tokio::time::interval(Duration::from_millis(1));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Burst);
    loop {
        interval.tick().await;
        bridge.tick();
    }
}
