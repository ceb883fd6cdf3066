//! Configuration Types and Loading

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// TCP socket port used by the WiFi transport.
pub const TCP_PORT: u16 = 7777;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// UART data bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

/// UART stop bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopBits {
    One,
    Two,
}

/// UART parity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// UART line configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UartConfig {
    /// Serial device path, the host stand-in for the fixed UART pin pair
    pub device: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Data bits per character
    pub data_bits: DataBits,
    /// Stop bits
    pub stop_bits: StopBits,
    /// Parity mode
    pub parity: Parity,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            device: "/dev/ttyUSB0".to_string(),
            baud_rate: 115_200,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
        }
    }
}

/// Which wireless transport carries the bridged stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// TCP socket over WiFi
    Wifi,
    /// BLE notifications
    Ble,
}

/// Whether the TCP transport dials out or accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocketRole {
    Client,
    Server,
}

/// Network configuration for the wireless side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Transport selected at boot
    pub transport: TransportKind,
    /// Regulatory country code for the radio
    pub country_code: String,
    /// Local IP address on the WiFi network
    pub local_ip: Ipv4Addr,
    /// Access point SSID
    pub ap_ssid: String,
    /// Access point password
    pub ap_password: String,
    /// Peer address when acting as a TCP client
    pub remote_ip: Ipv4Addr,
    /// Client or server role for the TCP socket
    pub role: SocketRole,
    /// TCP port
    pub port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::Wifi,
            country_code: "JP".to_string(),
            local_ip: Ipv4Addr::new(192, 168, 10, 100),
            ap_ssid: String::new(),
            ap_password: String::new(),
            remote_ip: Ipv4Addr::new(192, 168, 10, 200),
            role: SocketRole::Server,
            port: TCP_PORT,
        }
    }
}

/// The full persisted configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeSettings {
    pub uart: UartConfig,
    pub network: NetworkConfig,
}

impl BridgeSettings {
    /// Load settings by layering defaults, an optional file, and
    /// `BRIDGE_`-prefixed environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder =
            Config::builder().add_source(Config::try_from(&BridgeSettings::default())?);

        if let Some(path) = path {
            info!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(File::from(path));
        }

        let settings: BridgeSettings = builder
            .add_source(Environment::with_prefix("BRIDGE").separator("__"))
            .build()?
            .try_deserialize()?;

        info!(
            transport = ?settings.network.transport,
            role = ?settings.network.role,
            baud = settings.uart.baud_rate,
            "configuration loaded"
        );
        Ok(settings)
    }
}
