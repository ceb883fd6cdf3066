//! Persisted Bridge Configuration
//!
//! Host analog of the flash-persisted configuration image: UART line
//! parameters plus the network/transport selection. Loaded exactly once
//! during startup and never re-read; changing it takes a reboot, the same
//! contract the flash image had.

mod settings;

pub use settings::{
    BridgeSettings, ConfigError, DataBits, NetworkConfig, Parity, SocketRole, StopBits,
    TransportKind, UartConfig,
};
