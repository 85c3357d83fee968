use crate::cli::{NewDeviceArgs, RunArgs};
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};
use uhppote_core::MacAddress;
use uhppote_emulator::{Snapshot, load_dir, snapshot};
use uhppote_network::{ServerConfig, UdpServer};

/// Serve every device in the devices directory until Ctrl-C.
pub async fn run(args: RunArgs, debug: bool) -> Result<()> {
    let devices = load_dir(&args.devices)
        .with_context(|| format!("loading devices from {}", args.devices.display()))?;
    if devices.is_empty() {
        warn!(dir = %args.devices.display(), "no devices loaded");
    }

    let config = ServerConfig {
        bind_addr: args.bind,
        debug,
    };
    let mut server = UdpServer::new(config, devices);
    server.start().await?;

    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;

    let devices = server.stop().await?;
    info!(devices = devices.len(), "shutdown complete");
    Ok(())
}

/// Create a snapshot file for a new device. Returns its path.
pub fn new_device(args: &NewDeviceArgs) -> Result<PathBuf> {
    fs::create_dir_all(&args.dir)
        .with_context(|| format!("creating {}", args.dir.display()))?;

    let path = args
        .dir
        .join(snapshot::file_name(args.serial_number, args.gzip));
    Snapshot::new(args.serial_number, random_mac()).create(&path)?;

    info!(serial_number = %args.serial_number, path = %path.display(), "created device");
    Ok(path)
}

/// A random locally administered unicast MAC address.
fn random_mac() -> MacAddress {
    let mut bytes: [u8; 6] = rand::random();
    bytes[0] = (bytes[0] | 0x02) & 0xfe;
    MacAddress::new(bytes)
}
