//! Wireless Transports
//!
//! The two boot-selectable implementations of the core's `Transport`
//! contract — a TCP socket over WiFi and BLE notifications — plus a mock
//! for tests. Selection happens exactly once, from the persisted
//! configuration, before the core loops start.

mod ble;
mod mock;
mod tcp;

pub use ble::{ble_link_pair, BleLink, BlePeer, BleTransport};
pub use mock::MockTransport;
pub use tcp::TcpTransport;
