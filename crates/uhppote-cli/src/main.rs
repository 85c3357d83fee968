//! `uhppote-simulator`: answers UT0311-L0x controller requests on UDP for
//! a directory of simulated devices.

mod cli;
mod commands;
mod trace;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    trace::init_tracing(cli.debug);

    match cli.command {
        Command::Run(args) => commands::run(args, cli.debug).await,
        Command::NewDevice(args) => {
            let path = commands::new_device(&args)?;
            println!("{}", path.display());
            Ok(())
        }
    }
}
