//! Event listener registration.

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddrV4};

/// Host that receives unsolicited event frames. Absent by default.
///
/// Serialized as `"ip:port"` or `null`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Listener(Option<SocketAddrV4>);

impl Listener {
    /// Register `address:port`. `0.0.0.0:0` clears the registration.
    pub fn set(&mut self, address: Ipv4Addr, port: u16) {
        self.0 = if address.is_unspecified() && port == 0 {
            None
        } else {
            Some(SocketAddrV4::new(address, port))
        };
    }

    pub fn get(&self) -> Option<SocketAddrV4> {
        self.0
    }

    /// Address and port as sent on the wire, zero when unregistered.
    pub fn to_wire(&self) -> (Ipv4Addr, u16) {
        match self.0 {
            Some(addr) => (*addr.ip(), addr.port()),
            None => (Ipv4Addr::UNSPECIFIED, 0),
        }
    }
}
