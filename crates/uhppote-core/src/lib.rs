pub mod bcd;
pub mod constants;
pub mod error;
pub mod time;
pub mod types;

pub use error::{Error, Result};
pub use time::{Date, DateTime, SystemDate, SystemTime};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
