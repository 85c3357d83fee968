use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use uhppote_core::SerialNumber;
use uhppote_core::constants::DEFAULT_BIND_ADDR;

const DEFAULT_DEVICES_DIR: &str = "./devices";

#[derive(Debug, Parser)]
#[command(name = "uhppote-simulator", version, about = "UT0311-L0x access controller simulator")]
pub struct Cli {
    /// Log every datagram received and sent as a hex dump
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load the device snapshots and answer controller requests
    Run(RunArgs),

    /// Write a snapshot for a new, factory fresh controller
    NewDevice(NewDeviceArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// UDP address to listen on
    #[arg(long, env = "UHPPOTE_BIND", default_value = DEFAULT_BIND_ADDR)]
    pub bind: SocketAddr,

    /// Directory holding the device snapshots
    #[arg(long, env = "UHPPOTE_DEVICES", default_value = DEFAULT_DEVICES_DIR)]
    pub devices: PathBuf,
}

#[derive(Debug, Args)]
pub struct NewDeviceArgs {
    /// Controller serial number
    pub serial_number: SerialNumber,

    /// Directory to write the snapshot to
    #[arg(long, env = "UHPPOTE_DEVICES", default_value = DEFAULT_DEVICES_DIR)]
    pub dir: PathBuf,

    /// Write a gzip compressed snapshot
    #[arg(long)]
    pub gzip: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_with_options() {
        let cli = Cli::try_parse_from([
            "uhppote-simulator",
            "--debug",
            "run",
            "--bind",
            "127.0.0.1:60001",
            "--devices",
            "/tmp/devices",
        ])
        .unwrap();

        assert!(cli.debug);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.bind, "127.0.0.1:60001".parse::<SocketAddr>().unwrap());
        assert_eq!(args.devices, PathBuf::from("/tmp/devices"));
    }

    #[test]
    fn test_debug_after_subcommand() {
        let cli = Cli::try_parse_from(["uhppote-simulator", "run", "--debug"]).unwrap();
        assert!(cli.debug);
    }

    #[test]
    fn test_new_device() {
        let cli =
            Cli::try_parse_from(["uhppote-simulator", "new-device", "405419896", "--gzip"]).unwrap();

        let Command::NewDevice(args) = cli.command else {
            panic!("expected new-device");
        };
        assert_eq!(args.serial_number, SerialNumber::new(405419896));
        assert!(args.gzip);
    }

    #[test]
    fn test_new_device_rejects_bad_serial() {
        assert!(Cli::try_parse_from(["uhppote-simulator", "new-device", "twelve"]).is_err());
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["uhppote-simulator"]).is_err());
    }
}
