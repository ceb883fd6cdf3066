//! Serial-to-Wireless Bridge - Main Entry Point

use bridge_app::{init_logging, run};
use bridge_config::BridgeSettings;
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    // The persisted configuration image; absent means factory defaults.
    let config_path = Path::new("bridge.toml");
    let settings = BridgeSettings::load(config_path.exists().then_some(config_path))?;

    run(settings).await
}
