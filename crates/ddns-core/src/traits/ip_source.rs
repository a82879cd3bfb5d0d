// # IP Source Trait
//
// Defines the interface for detecting the caller's current public address.
//
// ## Implementations
//
// - HTTP echo services: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{IpFamily, IpSource};
//
// let source = /* IpSource implementation */;
// match source.current(IpFamily::V4).await {
//     Ok(Some(ip)) => println!("public IPv4 is {ip}"),
//     Ok(None) => println!("IPv4 detection disabled"),
//     Err(e) => println!("no IPv4 this round: {e}"),
// }
// ```

use async_trait::async_trait;
use std::fmt;
use std::net::IpAddr;

/// Address family (v4 or v6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IpFamily {
    V4,
    V6,
}

impl IpFamily {
    /// Both families, in lookup order
    pub const ALL: [IpFamily; 2] = [IpFamily::V4, IpFamily::V6];

    /// Family of an address
    pub fn of(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => IpFamily::V4,
            IpAddr::V6(_) => IpFamily::V6,
        }
    }

    /// Character every textual address of this family contains
    pub fn separator(self) -> char {
        match self {
            IpFamily::V4 => '.',
            IpFamily::V6 => ':',
        }
    }

    /// Parse an echo-service answer as an address of this family
    ///
    /// Surrounding whitespace is ignored. Returns `None` for empty text,
    /// text without the family separator, or an address of the other family.
    pub fn parse(self, text: &str) -> Option<IpAddr> {
        let text = text.trim();
        if text.is_empty() || !text.contains(self.separator()) {
            return None;
        }
        text.parse::<IpAddr>()
            .ok()
            .filter(|ip| IpFamily::of(ip) == self)
    }
}

impl fmt::Display for IpFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpFamily::V4 => f.write_str("ipv4"),
            IpFamily::V6 => f.write_str("ipv6"),
        }
    }
}

/// Trait for public IP lookups
///
/// Implementations perform outbound requests only; they keep no state
/// between calls and never retry beyond walking their own endpoint list.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current public address for a family
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ip))`: The current address
    /// - `Ok(None)`: The family is disabled
    /// - `Err(Error)`: No endpoint produced a valid address
    async fn current(&self, family: IpFamily) -> Result<Option<IpAddr>, crate::Error>;

    /// Name of the source (for logging)
    fn source_name(&self) -> &'static str;
}
