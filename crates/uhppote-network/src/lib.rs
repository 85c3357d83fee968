//! UDP transport for the controller simulator.
//!
//! [`UdpServer`] owns the socket and every loaded [`Device`]. Each datagram
//! is validated once, decoded once and then offered to every device in turn;
//! any replies are sent back to the source address from a separate task.
//!
//! # Example
//!
//! ```no_run
//! use uhppote_network::{ServerConfig, UdpServer};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let devices = uhppote_emulator::load_dir("./devices".as_ref())?;
//! let mut server = UdpServer::new(ServerConfig::default(), devices);
//!
//! server.start().await?;
//! tokio::signal::ctrl_c().await?;
//! server.stop().await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`Device`]: uhppote_emulator::Device

mod server;

pub use server::{ServerConfig, ServerState, UdpServer, UdpServerError};
